use crate::cli::media::{load_media, Media};
use crate::engine::max_payload;
use crate::error::Result;
use crate::scheme::{Scheme, StrategyKind};
use std::path::Path;

/// Display information about a carrier file
pub fn show_info(path: &Path) -> Result<String> {
    let media = load_media(path)?;
    let carrier = media.carrier();

    let mut output = String::new();

    output.push_str("Keyhop Carrier Information\n");
    output.push_str("==========================\n\n");

    output.push_str(&format!("File: {}\n", path.display()));
    output.push_str(&format!("Kind: {}\n", media.kind()));
    match &media {
        Media::Image(pixels) => {
            let (width, height) = pixels.dimensions();
            output.push_str(&format!("Dimensions: {}x{}\n", width, height));
        }
        Media::Audio { spec, .. } => {
            output.push_str(&format!("Sample rate: {} Hz\n", spec.sample_rate));
        }
    }
    output.push_str(&format!("Channels: {}\n", carrier.channel_count()));
    output.push_str(&format!("Capacity: {} units\n", carrier.capacity()));
    if carrier.resident_units() != carrier.capacity() {
        output.push_str(&format!("Resident: {} units\n", carrier.resident_units()));
    }
    output.push_str(&format!("Codec: {:?}\n", media.codec()));
    output.push('\n');

    output.push_str("Maximum payload:\n");
    for kind in [
        StrategyKind::FixedStep,
        StrategyKind::Permutation,
        StrategyKind::ChainedHop,
    ] {
        let scheme = Scheme::preset(kind);
        output.push_str(&format!(
            "  {}: {} bytes\n",
            kind,
            max_payload(carrier.capacity(), &scheme)
        ));
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    #[test]
    fn test_show_info() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cover.png");
        RgbImage::from_pixel(4, 3, Rgb([0, 0, 0])).save(&path).unwrap();

        let info = show_info(&path).unwrap();
        assert!(info.contains("Kind: image"));
        assert!(info.contains("Dimensions: 4x3"));
        assert!(info.contains("Capacity: 12 units"));
        assert!(info.contains("fixed-step: 8 bytes"));
        assert!(info.contains("chained-hop: 8 bytes"));
    }
}
