//! Caller-facing embed and extract.
//!
//! Both operations are stateless: everything they need is re-derived from
//! the password and the [`Scheme`] on each call. Embedding validates the
//! whole frame placement before the first unit is written, so a failed
//! embed leaves the carrier untouched.

use crate::carrier::Carrier;
use crate::error::{KeyhopError, Result};
use crate::frame::{build_frame, raw_frame, ExtractedFrame, FrameScanner, ScanStatus};
use crate::keys::{derive_params, DerivedParams};
use crate::scheme::{Framing, Scheme};
use crate::traverse::{resolve, Traversal, Walk};
use serde::Serialize;
use std::collections::HashSet;

/// Where an embedded frame ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedReport {
    pub frame_len: usize,
    /// Physical unit of each frame symbol, in frame order. With a one-bit
    /// codec a byte covers eight consecutive entries.
    pub addresses: Vec<usize>,
    pub params: DerivedParams,
}

/// Text recovered from a carrier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extracted {
    pub payload: String,
    pub metadata: Option<String>,
}

/// Hide `payload` in `carrier` under `password`
pub fn embed<C: Carrier + ?Sized>(
    carrier: &mut C,
    password: &[u8],
    payload: &str,
    scheme: &Scheme,
) -> Result<EmbedReport> {
    embed_with_metadata(carrier, password, payload, None, scheme)
}

/// Hide `payload` followed by a delimited `metadata` field
pub fn embed_with_metadata<C: Carrier + ?Sized>(
    carrier: &mut C,
    password: &[u8],
    payload: &str,
    metadata: Option<&str>,
    scheme: &Scheme,
) -> Result<EmbedReport> {
    scheme.validate()?;
    if payload.len() > scheme.max_payload {
        return Err(KeyhopError::PayloadTooLong {
            needed: payload.len(),
            available: scheme.max_payload,
        });
    }

    let frame = match scheme.framing {
        Framing::Marked => build_frame(
            payload.as_bytes(),
            metadata.map(str::as_bytes),
            &scheme.markers,
            scheme.delimiter_required(),
        )?,
        Framing::Raw => raw_frame(payload.as_bytes(), metadata.map(str::as_bytes))?,
    };
    if frame.len() > scheme.safety_bound {
        return Err(KeyhopError::PayloadTooLong {
            needed: frame.len(),
            available: scheme.safety_bound,
        });
    }

    let params = derive_params(password, scheme)?;
    scheme.codec.check_channels(carrier.channel_count())?;

    let symbols: Vec<u8> = frame
        .iter()
        .flat_map(|&byte| scheme.codec.symbols(byte))
        .collect();
    let capacity = carrier.capacity();
    if symbols.len() > capacity {
        return Err(KeyhopError::PayloadTooLong {
            needed: symbols.len(),
            available: capacity,
        });
    }
    let traversal = Traversal::from_params(&params, scheme, capacity)?;
    if symbols.len() > traversal.span() {
        return Err(KeyhopError::PayloadTooLong {
            needed: symbols.len(),
            available: traversal.span(),
        });
    }

    let resident = carrier.resident_units();
    let addresses = traversal
        .plan(&symbols)
        .into_iter()
        .map(|a| resolve(a, capacity, resident, scheme.overflow))
        .collect::<Result<Vec<_>>>()?;
    log::debug!("{} plan: {:?}", scheme.strategy, addresses);

    let mut seen = HashSet::with_capacity(addresses.len());
    if let Some(&address) = addresses.iter().find(|&&a| !seen.insert(a)) {
        return Err(KeyhopError::AddressReuse { address });
    }

    if scheme.collision_check && scheme.framing == Framing::Marked {
        check_collision(carrier, &addresses, scheme)?;
    }

    for (&symbol, &address) in symbols.iter().zip(&addresses) {
        let mut unit = carrier.get_unit(address)?;
        scheme.codec.pack(symbol, &mut unit)?;
        carrier.set_unit(address, &unit)?;
    }

    log::info!(
        "embedded {}-byte frame over {} of {} units ({})",
        frame.len(),
        addresses.len(),
        capacity,
        scheme.strategy
    );
    Ok(EmbedReport {
        frame_len: frame.len(),
        addresses,
        params,
    })
}

/// Recover a payload hidden under `password`.
///
/// Without `expected_length` the frame markers are searched for, reading at
/// most `scheme.safety_bound` bytes. With it, exactly that many payload
/// bytes are read after the start marker positions, or from the first
/// address under raw framing, where the length is mandatory.
pub fn extract<C: Carrier + ?Sized>(
    carrier: &C,
    password: &[u8],
    scheme: &Scheme,
    expected_length: Option<usize>,
) -> Result<Extracted> {
    scheme.validate()?;
    let capacity = carrier.capacity();
    if capacity == 0 {
        return Err(KeyhopError::MarkerNotFound);
    }
    let params = derive_params(password, scheme)?;
    let traversal = Traversal::from_params(&params, scheme, capacity)?;
    let reader = Reader {
        carrier,
        traversal: &traversal,
        scheme,
    };

    let frame = match (expected_length, scheme.framing) {
        (Some(n), _) => reader.fixed_length(n)?,
        (None, Framing::Marked) => reader.scan()?,
        (None, Framing::Raw) => {
            return Err(KeyhopError::InvalidScheme(
                "raw framing needs an expected length".into(),
            ))
        }
    };
    let extracted = Extracted {
        payload: into_text(frame.payload)?,
        metadata: frame.metadata.map(into_text).transpose()?,
    };
    log::info!(
        "extracted {}-byte payload ({})",
        extracted.payload.len(),
        scheme.strategy
    );
    Ok(extracted)
}

/// Longest payload a carrier of `capacity` units can take under `scheme`,
/// before any password-dependent span limit
pub fn max_payload(capacity: usize, scheme: &Scheme) -> usize {
    let overhead = match scheme.framing {
        Framing::Raw => 0,
        Framing::Marked => {
            scheme.markers.start.len()
                + scheme.markers.end.len()
                + usize::from(scheme.delimiter_required())
        }
    };
    (capacity / scheme.codec.units_per_byte())
        .min(scheme.safety_bound)
        .saturating_sub(overhead)
        .min(scheme.max_payload)
}

fn check_collision<C: Carrier + ?Sized>(
    carrier: &C,
    addresses: &[usize],
    scheme: &Scheme,
) -> Result<()> {
    let start = scheme.markers.start_bytes();
    let units = scheme.codec.units_per_byte();
    let symbols = addresses
        .iter()
        .take(start.len() * units)
        .map(|&a| carrier.get_unit(a).map(|unit| scheme.codec.unpack(&unit)))
        .collect::<Result<Vec<u8>>>()?;
    let existing: Vec<u8> = symbols
        .chunks(units)
        .map(|chunk| scheme.codec.assemble(chunk))
        .collect();
    if existing == start {
        let address = addresses.first().copied().unwrap_or_default();
        log::warn!("start marker already present at unit {}", address);
        return Err(KeyhopError::CollisionDetected { address });
    }
    Ok(())
}

struct Reader<'a, C: Carrier + ?Sized> {
    carrier: &'a C,
    traversal: &'a Traversal,
    scheme: &'a Scheme,
}

impl<C: Carrier + ?Sized> Reader<'_, C> {
    /// Symbol stored at a logical address
    fn read(&self, address: usize) -> Result<u8> {
        let physical = resolve(
            address,
            self.carrier.capacity(),
            self.carrier.resident_units(),
            self.scheme.overflow,
        )?;
        Ok(self.scheme.codec.unpack(&self.carrier.get_unit(physical)?))
    }

    /// Next byte along `walk`, spanning as many units as the codec needs.
    /// `None` once the walk runs out.
    fn next_byte(&self, walk: &mut Walk, previous: Option<u8>) -> Result<Option<u8>> {
        let codec = self.scheme.codec;
        let units = codec.units_per_byte();
        let mut symbols = [0u8; 8];
        for slot in symbols.iter_mut().take(units) {
            let Some(address) = walk.advance(previous) else {
                return Ok(None);
            };
            *slot = self.read(address)?;
        }
        Ok(Some(codec.assemble(&symbols[..units])))
    }

    fn scan(&self) -> Result<ExtractedFrame> {
        let limit = self
            .scheme
            .safety_bound
            .min(self.traversal.span() / self.scheme.codec.units_per_byte());
        let mut scanner = FrameScanner::new(&self.scheme.markers, self.scheme.start_search);
        let mut walk = self.traversal.walk();
        let mut previous = None;

        for _ in 0..limit {
            let Some(byte) = self.next_byte(&mut walk, previous)? else {
                break;
            };
            previous = Some(byte);
            match scanner.push(byte) {
                ScanStatus::NeedMore => {}
                ScanStatus::Complete => return scanner.into_frame(),
                ScanStatus::Rejected => break,
            }
        }
        log::debug!(
            "no frame within {} units (start seen: {})",
            limit,
            scanner.is_collecting()
        );
        Err(KeyhopError::MarkerNotFound)
    }

    fn fixed_length(&self, length: usize) -> Result<ExtractedFrame> {
        let skip = match self.scheme.framing {
            Framing::Marked => self.scheme.markers.start.len(),
            Framing::Raw => 0,
        };
        let needed = skip.saturating_add(length);
        let needed_units = needed.saturating_mul(self.scheme.codec.units_per_byte());
        let available = self.carrier.capacity().min(self.traversal.span());
        if needed_units > available {
            return Err(KeyhopError::PayloadTooLong {
                needed: needed_units,
                available,
            });
        }

        let mut walk = self.traversal.walk();
        let mut previous = None;
        let mut payload = Vec::with_capacity(length);
        for index in 0..needed {
            let byte = self
                .next_byte(&mut walk, previous)?
                .ok_or(KeyhopError::MarkerNotFound)?;
            previous = Some(byte);
            if index >= skip {
                payload.push(byte);
            }
        }
        Ok(ExtractedFrame {
            payload,
            metadata: None,
        })
    }
}

fn into_text(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|_| KeyhopError::NotText)
}
