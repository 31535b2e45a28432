use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyhopError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Audio error: {0}")]
    Audio(#[from] hound::Error),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Invalid scheme: {0}")]
    InvalidScheme(String),

    #[error("Invalid digest window {start}..{end} for a {len}-byte digest")]
    InvalidWindow { start: usize, end: usize, len: usize },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Payload too long: frame needs {needed} units, only {available} available")]
    PayloadTooLong { needed: usize, available: usize },

    #[error("Address {address} out of bounds for carrier of {capacity} units")]
    AddressOutOfBounds { address: usize, capacity: usize },

    #[error("Traversal revisits unit {address} within a single frame")]
    AddressReuse { address: usize },

    #[error("Marker not found: wrong password or no hidden payload")]
    MarkerNotFound,

    #[error("Collision detected: a frame keyed to this password already starts at unit {address}")]
    CollisionDetected { address: usize },

    #[error("Codec {codec} needs {required} channels, carrier has {available}")]
    CodecMismatch {
        codec: String,
        required: usize,
        available: usize,
    },

    #[error("Channel {index} out of range for a {channels}-channel unit")]
    ChannelOutOfRange { index: usize, channels: usize },

    #[error("Channel value {value} does not fit a {bits}-bit channel")]
    ChannelOverflow { value: u16, bits: u32 },

    #[error("Recovered payload is not valid UTF-8")]
    NotText,

    #[error("Unsupported media: {0}")]
    UnsupportedMedia(String),
}

pub type Result<T> = std::result::Result<T, KeyhopError>;
