//! Carrier abstraction: an addressable array of fixed-width units.
//!
//! The engine only ever sees decoded units. Container formats (BMP, PNG, WAV)
//! are turned into carriers by the caller before embedding or extracting.

use crate::error::{KeyhopError, Result};

/// Most channels a unit can expose (RGBA)
pub const MAX_CHANNELS: usize = 4;

/// One addressable element: a pixel or a multi-channel sample frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unit {
    values: [u16; MAX_CHANNELS],
    len: usize,
}

impl Unit {
    /// Build a unit from channel values; extra channels beyond `MAX_CHANNELS` are dropped
    pub fn new(channels: &[u16]) -> Self {
        let len = channels.len().min(MAX_CHANNELS);
        let mut values = [0u16; MAX_CHANNELS];
        values[..len].copy_from_slice(&channels[..len]);
        Self { values, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn channels(&self) -> &[u16] {
        &self.values[..self.len]
    }

    pub fn channel(&self, index: usize) -> Option<u16> {
        self.channels().get(index).copied()
    }

    /// Overwrite one channel
    pub fn set_channel(&mut self, index: usize, value: u16) -> Result<()> {
        if index >= self.len {
            return Err(KeyhopError::ChannelOutOfRange {
                index,
                channels: self.len,
            });
        }
        self.values[index] = value;
        Ok(())
    }
}

/// Storage the engine embeds into.
///
/// `capacity` is the number of units the carrier claims to hold. Some
/// containers declare more units than they physically carry; those report
/// the smaller figure through `resident_units` and the traversal's overflow
/// policy decides what happens to addresses past it.
pub trait Carrier {
    fn capacity(&self) -> usize;

    fn resident_units(&self) -> usize {
        self.capacity()
    }

    fn channel_count(&self) -> usize;

    fn get_unit(&self, address: usize) -> Result<Unit>;

    fn set_unit(&mut self, address: usize, unit: &Unit) -> Result<()>;
}

/// Row-major 8-bit pixels with 3 (RGB) or 4 (RGBA) channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelCarrier {
    width: u32,
    height: u32,
    channels: usize,
    data: Vec<u8>,
}

impl PixelCarrier {
    pub fn from_raw(width: u32, height: u32, channels: usize, data: Vec<u8>) -> Result<Self> {
        if !(3..=4).contains(&channels) {
            return Err(KeyhopError::UnsupportedMedia(format!(
                "{} channels per pixel",
                channels
            )));
        }
        let expected = width as usize * height as usize * channels;
        if data.len() != expected {
            return Err(KeyhopError::UnsupportedMedia(format!(
                "pixel buffer holds {} bytes, {}x{}x{} needs {}",
                data.len(),
                width,
                height,
                channels,
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Uniformly filled RGB image
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Self {
            width,
            height,
            channels: 3,
            data,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    fn check(&self, address: usize) -> Result<usize> {
        if address >= self.capacity() {
            return Err(KeyhopError::AddressOutOfBounds {
                address,
                capacity: self.capacity(),
            });
        }
        Ok(address * self.channels)
    }
}

impl Carrier for PixelCarrier {
    fn capacity(&self) -> usize {
        self.width as usize * self.height as usize
    }

    fn channel_count(&self) -> usize {
        self.channels
    }

    fn get_unit(&self, address: usize) -> Result<Unit> {
        let base = self.check(address)?;
        let mut values = [0u16; MAX_CHANNELS];
        for (slot, &byte) in values.iter_mut().zip(&self.data[base..base + self.channels]) {
            *slot = u16::from(byte);
        }
        Ok(Unit::new(&values[..self.channels]))
    }

    fn set_unit(&mut self, address: usize, unit: &Unit) -> Result<()> {
        let base = self.check(address)?;
        for (i, &value) in unit.channels().iter().take(self.channels).enumerate() {
            self.data[base + i] =
                u8::try_from(value).map_err(|_| KeyhopError::ChannelOverflow { value, bits: 8 })?;
        }
        Ok(())
    }
}

/// Interleaved 16-bit PCM; one unit is one frame (a sample per channel)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleCarrier {
    channels: usize,
    samples: Vec<i16>,
    declared_frames: usize,
}

impl SampleCarrier {
    pub fn new(channels: usize, samples: Vec<i16>) -> Result<Self> {
        if channels == 0 {
            return Err(KeyhopError::UnsupportedMedia("zero audio channels".into()));
        }
        let frames = samples.len() / channels;
        Self::with_declared_frames(channels, samples, frames)
    }

    /// Carrier whose header claims `declared` frames regardless of how many
    /// samples are actually present
    pub fn with_declared_frames(
        channels: usize,
        samples: Vec<i16>,
        declared: usize,
    ) -> Result<Self> {
        if channels == 0 || channels > MAX_CHANNELS {
            return Err(KeyhopError::UnsupportedMedia(format!(
                "{} audio channels",
                channels
            )));
        }
        Ok(Self {
            channels,
            samples,
            declared_frames: declared,
        })
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<i16> {
        self.samples
    }

    fn check(&self, address: usize) -> Result<usize> {
        if address >= self.resident_units() {
            return Err(KeyhopError::AddressOutOfBounds {
                address,
                capacity: self.resident_units(),
            });
        }
        Ok(address * self.channels)
    }
}

impl Carrier for SampleCarrier {
    fn capacity(&self) -> usize {
        self.declared_frames
    }

    fn resident_units(&self) -> usize {
        (self.samples.len() / self.channels).min(self.declared_frames)
    }

    fn channel_count(&self) -> usize {
        self.channels
    }

    fn get_unit(&self, address: usize) -> Result<Unit> {
        let base = self.check(address)?;
        let mut values = [0u16; MAX_CHANNELS];
        for (slot, &sample) in values
            .iter_mut()
            .zip(&self.samples[base..base + self.channels])
        {
            *slot = sample as u16;
        }
        Ok(Unit::new(&values[..self.channels]))
    }

    fn set_unit(&mut self, address: usize, unit: &Unit) -> Result<()> {
        let base = self.check(address)?;
        for (i, &value) in unit.channels().iter().take(self.channels).enumerate() {
            self.samples[base + i] = value as i16;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_get_set() {
        let mut carrier = PixelCarrier::filled(4, 2, [10, 20, 30]);
        assert_eq!(carrier.capacity(), 8);
        assert_eq!(carrier.channel_count(), 3);

        let unit = carrier.get_unit(5).unwrap();
        assert_eq!(unit.channels(), &[10, 20, 30]);

        carrier.set_unit(5, &Unit::new(&[1, 2, 3])).unwrap();
        assert_eq!(carrier.get_unit(5).unwrap().channels(), &[1, 2, 3]);
        assert_eq!(&carrier.as_raw()[15..18], &[1, 2, 3]);
        assert_eq!(carrier.get_unit(4).unwrap().channels(), &[10, 20, 30]);
    }

    #[test]
    fn test_pixel_out_of_bounds() {
        let mut carrier = PixelCarrier::filled(2, 2, [0, 0, 0]);
        assert!(matches!(
            carrier.get_unit(4),
            Err(KeyhopError::AddressOutOfBounds {
                address: 4,
                capacity: 4
            })
        ));
        assert!(carrier.set_unit(100, &Unit::new(&[0, 0, 0])).is_err());
    }

    #[test]
    fn test_pixel_channel_overflow() {
        let mut carrier = PixelCarrier::filled(1, 1, [0, 0, 0]);
        let err = carrier.set_unit(0, &Unit::new(&[256, 0, 0])).unwrap_err();
        assert!(matches!(err, KeyhopError::ChannelOverflow { value: 256, .. }));
    }

    #[test]
    fn test_pixel_from_raw_validates_length() {
        assert!(PixelCarrier::from_raw(2, 2, 3, vec![0; 11]).is_err());
        assert!(PixelCarrier::from_raw(2, 2, 2, vec![0; 8]).is_err());
        let rgba = PixelCarrier::from_raw(2, 2, 4, vec![7; 16]).unwrap();
        assert_eq!(rgba.get_unit(3).unwrap().len(), 4);
    }

    #[test]
    fn test_sample_units_are_frames() {
        let samples = vec![1, -1, 2, -2, 3, -3];
        let mut carrier = SampleCarrier::new(2, samples).unwrap();
        assert_eq!(carrier.capacity(), 3);

        let unit = carrier.get_unit(1).unwrap();
        assert_eq!(unit.channels(), &[2, (-2i16) as u16]);

        carrier.set_unit(2, &Unit::new(&[0x7FFF, 0x8000])).unwrap();
        assert_eq!(&carrier.samples()[4..], &[i16::MAX, i16::MIN]);
    }

    #[test]
    fn test_declared_frames_exceed_resident() {
        let carrier = SampleCarrier::with_declared_frames(1, vec![0; 10], 16).unwrap();
        assert_eq!(carrier.capacity(), 16);
        assert_eq!(carrier.resident_units(), 10);
        assert!(carrier.get_unit(9).is_ok());
        assert!(carrier.get_unit(10).is_err());
    }

    #[test]
    fn test_unit_rejects_out_of_range_channel() {
        let mut unit = Unit::new(&[1, 2]);
        assert!(matches!(
            unit.set_channel(3, 9),
            Err(KeyhopError::ChannelOutOfRange {
                index: 3,
                channels: 2
            })
        ));
        assert_eq!(unit.channels(), &[1, 2]);
        assert_eq!(unit.channel(2), None);

        unit.set_channel(1, 9).unwrap();
        assert_eq!(unit.channels(), &[1, 9]);
    }
}
