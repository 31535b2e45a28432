//! Key derivation: fold a password digest into small traversal parameters.

use crate::digest::{digest, PasswordDigest};
use crate::error::{KeyhopError, Result};
use crate::scheme::{Scheme, StepFold};
use serde::{Deserialize, Serialize};

/// Bytes at the end of the digest reserved for the hop distance Y
pub const HOP_WINDOW: usize = 4;

/// Parameters derived from one password
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedParams {
    /// X: XOR of every digest byte except the last four
    pub offset: u8,
    /// Y: XOR of the last four digest bytes
    pub hop: u8,
    /// Stride seed for the fixed-step strategy
    pub step: u8,
    /// PRNG seed for the permutation strategy
    pub seed: u64,
}

impl DerivedParams {
    pub fn derive(digest: &PasswordDigest, step_fold: StepFold) -> Result<Self> {
        let bytes = digest.as_bytes();
        let len = bytes.len();
        if len <= HOP_WINDOW {
            return Err(KeyhopError::InvalidWindow {
                start: 0,
                end: len,
                len,
            });
        }
        let split = len - HOP_WINDOW;
        let offset = fold_xor(bytes, 0, split)?;
        let hop = fold_xor(bytes, split, len)?;
        let step = match step_fold {
            StepFold::Xor => offset,
            StepFold::Crc8 => crc8(bytes),
            StepFold::Crc32 => (crc32fast::hash(bytes) & 0xFF) as u8,
            StepFold::Crc16 => (crc16_ccitt(bytes) % 256) as u8,
        };
        let seed = seed_from_digest(bytes)?;
        Ok(Self {
            offset,
            hop,
            step,
            seed,
        })
    }
}

/// Digest the password and derive its parameters under `scheme`
pub fn derive_params(password: &[u8], scheme: &Scheme) -> Result<DerivedParams> {
    let d = digest(password, scheme.hash);
    let params = DerivedParams::derive(&d, scheme.step_fold)?;
    log::debug!(
        "derived {:?} params: X={} Y={} step={} ({:?})",
        scheme.hash,
        params.offset,
        params.hop,
        params.step,
        scheme.step_fold
    );
    Ok(params)
}

/// XOR-accumulate `digest[start..end]`, seeded with the first byte of the window
pub fn fold_xor(digest: &[u8], start: usize, end: usize) -> Result<u8> {
    if start >= end || end > digest.len() {
        return Err(KeyhopError::InvalidWindow {
            start,
            end,
            len: digest.len(),
        });
    }
    let window = &digest[start..end];
    Ok(window[1..].iter().fold(window[0], |acc, &b| acc ^ b))
}

/// First eight digest bytes as a big-endian integer
pub fn seed_from_digest(digest: &[u8]) -> Result<u64> {
    let head: [u8; 8] = digest
        .get(..8)
        .and_then(|s| s.try_into().ok())
        .ok_or(KeyhopError::InvalidWindow {
            start: 0,
            end: 8,
            len: digest.len(),
        })?;
    Ok(u64::from_be_bytes(head))
}

/// CRC-8, polynomial 0x07, zero init, no reflection
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &b in data {
        crc ^= b;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x07
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// CRC-16-CCITT, polynomial 0x1021, init 0xFFFF, MSB first
pub fn crc16_ccitt(data: &[u8]) -> u16 {
    let mut crc = 0xFFFFu16;
    for &b in data {
        for i in 0..8 {
            let bit = (b >> (7 - i)) & 1 == 1;
            let top = crc & 0x8000 != 0;
            crc <<= 1;
            if top ^ bit {
                crc ^= 0x1021;
            }
        }
    }
    crc
}
