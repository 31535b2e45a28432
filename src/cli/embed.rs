use crate::cli::media::{load_media, save_media};
use crate::engine::{embed_with_metadata, EmbedReport};
use crate::error::Result;
use crate::scheme::Scheme;
use std::path::Path;

/// Timestamp layout written by `--timestamp`
pub const TIMESTAMP_FORMAT: &str = "%H/%M/%S/%d/%m/%Y";

/// Options for the embed command
#[derive(Debug, Clone, Default)]
pub struct EmbedOptions {
    pub password: String,
    pub scheme: Scheme,
    pub metadata: Option<String>,
    /// Use the current local time as metadata
    pub timestamp: bool,
}

/// Embed `payload` into the carrier at `input_path` and write it to `output_path`.
/// The codec is chosen from the media type unless the scheme asks for red-lsb.
pub fn embed_file(
    input_path: &Path,
    output_path: &Path,
    payload: &str,
    options: &EmbedOptions,
) -> Result<EmbedReport> {
    let mut media = load_media(input_path)?;
    let scheme = options
        .scheme
        .clone()
        .with_codec(media.codec_for(options.scheme.codec));

    let metadata = if options.timestamp {
        Some(chrono::Local::now().format(TIMESTAMP_FORMAT).to_string())
    } else {
        options.metadata.clone()
    };

    let report = embed_with_metadata(
        media.carrier_mut(),
        options.password.as_bytes(),
        payload,
        metadata.as_deref(),
        &scheme,
    )?;
    save_media(&media, output_path)?;
    Ok(report)
}
