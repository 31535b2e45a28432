//! Keyhop - password-keyed LSB covert channel
//!
//! Hides a short text payload in the low bits of an image's pixels or an
//! audio file's samples. The units that carry the payload are chosen from
//! a digest of the password, so only the same password (and scheme) finds
//! them again.
//!
//! ## Pipeline
//!
//! ```text
//! password → Digest → Fold (X, Y, step, seed) → Traversal → Codec → Carrier
//! ```
//!
//! - **Digest**: SHA-256 (default), MD5, SHA3-256 or BLAKE3
//! - **Fold**: XOR folds of the digest, CRC step folds, 64-bit seed
//! - **Traversal**: fixed-step, seeded Fisher-Yates permutation, or chained hop
//! - **Codec**: 3/3/2 bits per RGB pixel, 4/4 bits per stereo 16-bit frame
//! - **Frame**: `start + payload [+ delimiter + metadata] + end`
//!
//! ## Example
//!
//! ```no_run
//! use keyhop::{embed, extract, PixelCarrier, Scheme};
//!
//! let mut carrier = PixelCarrier::filled(256, 256, [128, 128, 128]);
//! let scheme = Scheme::default();
//!
//! embed(&mut carrier, b"test123", "hello", &scheme).unwrap();
//!
//! let found = extract(&carrier, b"test123", &scheme, None).unwrap();
//! assert_eq!(found.payload, "hello");
//! ```

pub mod carrier;
pub mod cli;
pub mod codec;
pub mod config;
pub mod digest;
pub mod engine;
pub mod error;
pub mod frame;
pub mod keys;
pub mod scheme;
pub mod traverse;

pub use carrier::{Carrier, PixelCarrier, SampleCarrier, Unit};
pub use engine::{embed, embed_with_metadata, extract, EmbedReport, Extracted};
pub use error::{KeyhopError, Result};
pub use scheme::Scheme;
