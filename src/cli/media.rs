use crate::carrier::{Carrier, PixelCarrier, SampleCarrier};
use crate::error::{KeyhopError, Result};
use crate::scheme::CodecKind;
use image::{ImageFormat, RgbImage};
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// A carrier file decoded into memory
#[derive(Debug, Clone)]
pub enum Media {
    Image(PixelCarrier),
    Audio {
        carrier: SampleCarrier,
        spec: hound::WavSpec,
        /// File bytes up to the first sample, declared data length included
        header: Vec<u8>,
    },
}

impl Media {
    pub fn carrier(&self) -> &dyn Carrier {
        match self {
            Media::Image(c) => c,
            Media::Audio { carrier, .. } => carrier,
        }
    }

    pub fn carrier_mut(&mut self) -> &mut dyn Carrier {
        match self {
            Media::Image(c) => c,
            Media::Audio { carrier, .. } => carrier,
        }
    }

    /// Codec matching the unit layout
    pub fn codec(&self) -> CodecKind {
        match self {
            Media::Image(_) => CodecKind::Rgb332,
            Media::Audio { .. } => CodecKind::Stereo44,
        }
    }

    /// Codec to use when a scheme asks for `requested`. Red-lsb fits either
    /// media; the byte codecs follow the unit layout.
    pub fn codec_for(&self, requested: CodecKind) -> CodecKind {
        match requested {
            CodecKind::RedLsb => CodecKind::RedLsb,
            _ => self.codec(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Media::Image(_) => "image",
            Media::Audio { .. } => "audio",
        }
    }
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"))
}

/// Load a WAV file (16-bit PCM) or any image the `image` crate can decode
pub fn load_media(path: &Path) -> Result<Media> {
    if is_wav(path) {
        load_wav(path)
    } else {
        let rgb = image::open(path)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        let carrier = PixelCarrier::from_raw(width, height, 3, rgb.into_raw())?;
        log::debug!("loaded {}x{} image from {}", width, height, path.display());
        Ok(Media::Image(carrier))
    }
}

/// The frame count comes from the header. A data chunk shorter than the
/// header claims is read up to where it ends; addresses past it are left
/// to the scheme's overflow policy.
fn load_wav(path: &Path) -> Result<Media> {
    let bytes = fs::read(path)?;
    let header_len = hound::WavReader::new(Cursor::new(bytes.as_slice()))?
        .into_inner()
        .position() as usize;
    let mut reader = hound::WavReader::new(Cursor::new(bytes.as_slice()))?;
    let spec = reader.spec();
    if spec.bits_per_sample != 16 || spec.sample_format != hound::SampleFormat::Int {
        return Err(KeyhopError::UnsupportedMedia(format!(
            "{}-bit {:?} audio, need 16-bit PCM",
            spec.bits_per_sample, spec.sample_format
        )));
    }
    let declared = reader.duration() as usize;
    let declared_samples = reader.len();
    let mut samples = Vec::with_capacity((declared_samples as usize).min(bytes.len() / 2));
    for sample in reader.samples::<i16>() {
        match sample {
            Ok(s) => samples.push(s),
            Err(hound::Error::IoError(e)) => {
                log::warn!(
                    "{} ends after {} of {} declared samples ({})",
                    path.display(),
                    samples.len(),
                    declared_samples,
                    e
                );
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }
    let carrier =
        SampleCarrier::with_declared_frames(usize::from(spec.channels), samples, declared)?;
    log::debug!(
        "loaded {} frames x {} channels from {}",
        carrier.resident_units(),
        spec.channels,
        path.display()
    );
    Ok(Media::Audio {
        carrier,
        spec,
        header: bytes[..header_len].to_vec(),
    })
}

/// Write media back out. Images are refused in lossy formats. Truncated
/// audio keeps its original header and gets only its resident samples back.
pub fn save_media(media: &Media, path: &Path) -> Result<()> {
    match media {
        Media::Image(carrier) => {
            let format = ImageFormat::from_path(path)?;
            if format == ImageFormat::Jpeg {
                return Err(KeyhopError::UnsupportedMedia(
                    "JPEG output would destroy the low bits".into(),
                ));
            }
            let (width, height) = carrier.dimensions();
            let img = RgbImage::from_raw(width, height, carrier.as_raw().to_vec()).ok_or_else(
                || KeyhopError::UnsupportedMedia("pixel buffer does not match dimensions".into()),
            )?;
            img.save_with_format(path, format)?;
        }
        Media::Audio {
            carrier, header, ..
        } if carrier.resident_units() < carrier.capacity() => {
            let mut out = Vec::with_capacity(header.len() + carrier.samples().len() * 2);
            out.extend_from_slice(header);
            for &sample in carrier.samples() {
                out.extend_from_slice(&sample.to_le_bytes());
            }
            fs::write(path, out)?;
        }
        Media::Audio { carrier, spec, .. } => {
            let mut writer = hound::WavWriter::create(path, *spec)?;
            for &sample in carrier.samples() {
                writer.write_sample(sample)?;
            }
            writer.finalize()?;
        }
    }
    Ok(())
}
