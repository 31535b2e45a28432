use crate::cli::media::load_media;
use crate::engine::{extract, Extracted};
use crate::error::Result;
use crate::scheme::Scheme;
use std::path::Path;

/// Options for the extract command
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub password: String,
    pub scheme: Scheme,
    /// Read exactly this many payload bytes instead of searching for markers
    pub length: Option<usize>,
}

/// Recover the payload hidden in the carrier at `input_path`
pub fn extract_from_file(input_path: &Path, options: &ExtractOptions) -> Result<Extracted> {
    let media = load_media(input_path)?;
    let scheme = options
        .scheme
        .clone()
        .with_codec(media.codec_for(options.scheme.codec));
    extract(
        media.carrier(),
        options.password.as_bytes(),
        &scheme,
        options.length,
    )
}
