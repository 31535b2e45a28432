//! Channel codec: spreads one payload byte over the low bits of a unit.
//!
//! Rgb332 (8-bit channels):
//! ```text
//! value  b7 b6 b5 | b4 b3 b2 | b1 b0
//!        ch0[2:0] | ch1[2:0] | ch2[1:0]
//! ```
//! Stereo44 (16-bit channels): high nibble in ch0[3:0], low nibble in ch1[3:0].
//!
//! RedLsb carries a single bit in ch0[0], so a byte takes eight units,
//! most significant bit first. The engine splits bytes into per-unit
//! symbols with [`CodecKind::symbols`] and joins them with
//! [`CodecKind::assemble`].

use crate::carrier::Unit;
use crate::error::{KeyhopError, Result};
use crate::scheme::CodecKind;

const RGB_FIELDS: [(u32, u16); 3] = [(5, 0b111), (2, 0b111), (0, 0b11)];
const NIBBLE: u16 = 0x0F;

impl CodecKind {
    /// Channels the codec touches
    pub fn required_channels(self) -> usize {
        match self {
            Self::Rgb332 => 3,
            Self::Stereo44 => 2,
            Self::RedLsb => 1,
        }
    }

    /// Payload bits carried by one unit
    pub fn bits_per_unit(self) -> u32 {
        match self {
            Self::Rgb332 | Self::Stereo44 => 8,
            Self::RedLsb => 1,
        }
    }

    /// Units spent on one payload byte
    pub fn units_per_byte(self) -> usize {
        (8 / self.bits_per_unit()) as usize
    }

    /// Per-unit symbols of `byte`, most significant first
    pub fn symbols(self, byte: u8) -> impl Iterator<Item = u8> {
        let bits = self.bits_per_unit();
        let mask = ((1u16 << bits) - 1) as u8;
        (0..8 / bits)
            .rev()
            .map(move |i| (byte >> (i * bits)) & mask)
    }

    /// Join symbols read back in unit order into one byte
    pub fn assemble(self, symbols: &[u8]) -> u8 {
        let bits = self.bits_per_unit();
        symbols
            .iter()
            .fold(0u16, |acc, &s| (acc << bits) | u16::from(s))
            as u8
    }

    /// Whether every byte value survives a pack/unpack on `channels` channels
    pub fn lossless_on(self, channels: usize) -> bool {
        channels >= self.required_channels()
    }

    /// Check before any mutation that the carrier layout suits the codec
    pub fn check_channels(self, channels: usize) -> Result<()> {
        if self.lossless_on(channels) {
            Ok(())
        } else {
            Err(KeyhopError::CodecMismatch {
                codec: format!("{:?}", self),
                required: self.required_channels(),
                available: channels,
            })
        }
    }

    /// Write one symbol into the low bits of `unit`, leaving higher bits intact.
    /// For the byte codecs a symbol is the whole byte.
    pub fn pack(self, value: u8, unit: &mut Unit) -> Result<()> {
        let v = u16::from(value);
        match self {
            Self::Rgb332 => {
                self.check_channels(unit.len())?;
                for (i, &(shift, mask)) in RGB_FIELDS.iter().enumerate() {
                    let ch = unit.channels()[i];
                    unit.set_channel(i, (ch & !mask) | ((v >> shift) & mask))?;
                }
            }
            Self::Stereo44 => {
                if unit.is_empty() {
                    return Err(KeyhopError::CodecMismatch {
                        codec: format!("{:?}", self),
                        required: 1,
                        available: 0,
                    });
                }
                let nibbles = [v >> 4, v & NIBBLE];
                for (i, nibble) in nibbles.into_iter().enumerate().take(unit.len()) {
                    let ch = unit.channels()[i];
                    unit.set_channel(i, (ch & !NIBBLE) | nibble)?;
                }
            }
            Self::RedLsb => {
                let red = unit.channel(0).ok_or_else(|| KeyhopError::CodecMismatch {
                    codec: format!("{:?}", self),
                    required: 1,
                    available: 0,
                })?;
                unit.set_channel(0, (red & !1) | (v & 1))?;
            }
        }
        Ok(())
    }

    /// Read a symbol back out of `unit`; a mono unit yields a zero low nibble
    /// under Stereo44
    pub fn unpack(self, unit: &Unit) -> u8 {
        let ch = |i: usize| unit.channel(i).unwrap_or(0);
        let v = match self {
            Self::Rgb332 => RGB_FIELDS
                .iter()
                .enumerate()
                .fold(0u16, |acc, (i, &(shift, mask))| acc | ((ch(i) & mask) << shift)),
            Self::Stereo44 => ((ch(0) & NIBBLE) << 4) | (ch(1) & NIBBLE),
            Self::RedLsb => ch(0) & 1,
        };
        v as u8
    }
}
