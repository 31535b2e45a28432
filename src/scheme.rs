use crate::error::{KeyhopError, Result};
use serde::{Deserialize, Serialize};

/// Hash used to turn a password into a digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Md5,
    Sha3,
    Blake3,
}

impl std::str::FromStr for HashAlgorithm {
    type Err = KeyhopError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "md5" => Ok(Self::Md5),
            "sha3" | "sha3-256" => Ok(Self::Sha3),
            "blake3" => Ok(Self::Blake3),
            _ => Err(KeyhopError::UnsupportedAlgorithm(format!("hash: {}", s))),
        }
    }
}

/// Traversal strategy options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    #[default]
    FixedStep,
    Permutation,
    ChainedHop,
}

impl std::str::FromStr for StrategyKind {
    type Err = KeyhopError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fixed-step" | "fixed" | "step" => Ok(Self::FixedStep),
            "permutation" | "shuffle" => Ok(Self::Permutation),
            "chained-hop" | "chained" | "hop" => Ok(Self::ChainedHop),
            _ => Err(KeyhopError::UnsupportedAlgorithm(format!(
                "strategy: {}",
                s
            ))),
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::FixedStep => "fixed-step",
            Self::Permutation => "permutation",
            Self::ChainedHop => "chained-hop",
        };
        f.write_str(name)
    }
}

/// Reduction used to derive the fixed-step stride from the digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StepFold {
    /// Reuse the XOR offset X
    #[default]
    Xor,
    /// CRC-8 (poly 0x07) of the digest
    Crc8,
    /// Low byte of the IEEE CRC-32 of the digest
    Crc32,
    /// CRC-16-CCITT of the digest, mod 256
    Crc16,
}

impl std::str::FromStr for StepFold {
    type Err = KeyhopError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "xor" => Ok(Self::Xor),
            "crc8" => Ok(Self::Crc8),
            "crc32" => Ok(Self::Crc32),
            "crc16" | "crc16-ccitt" => Ok(Self::Crc16),
            _ => Err(KeyhopError::UnsupportedAlgorithm(format!("fold: {}", s))),
        }
    }
}

/// Bit layout of one payload byte inside a carrier unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CodecKind {
    /// 3/3/2 bits over three 8-bit channels
    #[default]
    Rgb332,
    /// 4/4 bits over two 16-bit channels
    Stereo44,
    /// One bit in the lowest bit of the first (red) channel, eight units per byte
    #[serde(rename = "red-lsb")]
    RedLsb,
}

impl std::str::FromStr for CodecKind {
    type Err = KeyhopError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "rgb332" | "rgb" => Ok(Self::Rgb332),
            "stereo44" | "stereo" | "audio" => Ok(Self::Stereo44),
            "red-lsb" | "redlsb" | "lsb" => Ok(Self::RedLsb),
            _ => Err(KeyhopError::UnsupportedAlgorithm(format!("codec: {}", s))),
        }
    }
}

/// What happens when a logical address has no physical unit behind it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OverflowPolicy {
    /// Remap into the first half of the declared capacity
    #[default]
    FoldHalf,
    /// Fail with `AddressOutOfBounds`
    Strict,
}

impl std::str::FromStr for OverflowPolicy {
    type Err = KeyhopError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fold-half" | "fold" => Ok(Self::FoldHalf),
            "strict" => Ok(Self::Strict),
            _ => Err(KeyhopError::UnsupportedAlgorithm(format!(
                "overflow policy: {}",
                s
            ))),
        }
    }
}

/// How extraction looks for the start marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StartSearch {
    /// Consume units until the start marker shows up anywhere
    #[default]
    Scan,
    /// The frame must begin with the start marker
    Anchored,
}

impl std::str::FromStr for StartSearch {
    type Err = KeyhopError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "scan" => Ok(Self::Scan),
            "anchored" => Ok(Self::Anchored),
            _ => Err(KeyhopError::UnsupportedAlgorithm(format!(
                "start search: {}",
                s
            ))),
        }
    }
}

/// Whether the payload travels inside start/end markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Framing {
    /// `start + payload [+ delimiter + metadata] + end`
    #[default]
    Marked,
    /// Bare payload bytes from the first address on; extraction needs the length
    Raw,
}

impl std::str::FromStr for Framing {
    type Err = KeyhopError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "marked" | "framed" => Ok(Self::Marked),
            "raw" | "unframed" => Ok(Self::Raw),
            _ => Err(KeyhopError::UnsupportedAlgorithm(format!("framing: {}", s))),
        }
    }
}

/// Frame delimiters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markers {
    pub start: String,
    pub end: String,
    /// Separates the payload from trailing metadata
    pub delimiter: Option<char>,
}

impl Markers {
    pub fn new(start: &str, end: &str, delimiter: Option<char>) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
            delimiter,
        }
    }

    pub fn start_bytes(&self) -> &[u8] {
        self.start.as_bytes()
    }

    pub fn end_bytes(&self) -> &[u8] {
        self.end.as_bytes()
    }

    /// Delimiter as a single byte. `validate` guarantees it is ASCII.
    pub fn delimiter_byte(&self) -> Option<u8> {
        self.delimiter.map(|c| c as u8)
    }

    fn validate(&self) -> Result<()> {
        if self.start.is_empty() || self.end.is_empty() {
            return Err(KeyhopError::InvalidScheme(
                "start and end markers must not be empty".into(),
            ));
        }
        if !self.start.is_ascii() || !self.end.is_ascii() {
            return Err(KeyhopError::InvalidScheme("markers must be ASCII".into()));
        }
        if let Some(d) = self.delimiter {
            if !d.is_ascii() {
                return Err(KeyhopError::InvalidScheme(format!(
                    "delimiter {:?} is not ASCII",
                    d
                )));
            }
        }
        Ok(())
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self::new("@@", "#@", Some('#'))
    }
}

/// Complete parameter set shared by the embedding and extracting side.
/// Both sides must agree on every field; only the password is secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scheme {
    pub strategy: StrategyKind,
    pub hash: HashAlgorithm,
    pub step_fold: StepFold,
    /// Added to the folded step; 1 keeps the stride non-zero
    pub step_bias: usize,
    pub codec: CodecKind,
    pub markers: Markers,
    pub framing: Framing,
    pub start_search: StartSearch,
    pub overflow: OverflowPolicy,
    /// Longest payload accepted by `embed`, in bytes
    pub max_payload: usize,
    /// Most frame bytes read while searching for the markers
    pub safety_bound: usize,
    /// Refuse to embed over a frame already keyed to the same password
    pub collision_check: bool,
}

impl Default for Scheme {
    fn default() -> Self {
        Self::preset(StrategyKind::default())
    }
}

impl Scheme {
    pub const DEFAULT_MAX_PAYLOAD: usize = 64;
    pub const DEFAULT_SAFETY_BOUND: usize = 256;

    /// Defaults for a strategy, matching the variant it comes from
    pub fn preset(strategy: StrategyKind) -> Self {
        let (hash, markers) = match strategy {
            StrategyKind::FixedStep | StrategyKind::Permutation => {
                (HashAlgorithm::Sha256, Markers::default())
            }
            StrategyKind::ChainedHop => (HashAlgorithm::Md5, Markers::new("*", "#@", Some('#'))),
        };
        Self {
            strategy,
            hash,
            step_fold: StepFold::Xor,
            step_bias: 1,
            codec: CodecKind::Rgb332,
            markers,
            framing: Framing::Marked,
            start_search: StartSearch::Scan,
            overflow: OverflowPolicy::FoldHalf,
            max_payload: Self::DEFAULT_MAX_PAYLOAD,
            safety_bound: Self::DEFAULT_SAFETY_BOUND,
            collision_check: true,
        }
    }

    pub fn with_codec(mut self, codec: CodecKind) -> Self {
        self.codec = codec;
        self
    }

    /// Chained-hop addressing depends on the delimiter, so it is always framed
    pub fn delimiter_required(&self) -> bool {
        self.strategy == StrategyKind::ChainedHop
    }

    /// Longest frame a legal payload without metadata can produce.
    /// `None` when the sum does not fit a `usize`.
    pub fn max_frame_len(&self) -> Option<usize> {
        match self.framing {
            Framing::Raw => Some(self.max_payload),
            Framing::Marked => self
                .markers
                .start
                .len()
                .checked_add(self.max_payload)?
                .checked_add(1)?
                .checked_add(self.markers.end.len()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.markers.validate()?;
        if self.delimiter_required() {
            if self.markers.delimiter.is_none() {
                return Err(KeyhopError::InvalidScheme(
                    "chained-hop needs a delimiter".into(),
                ));
            }
            if self.framing == Framing::Raw {
                return Err(KeyhopError::InvalidScheme(
                    "chained-hop needs marked framing".into(),
                ));
            }
            if self.codec.units_per_byte() != 1 {
                return Err(KeyhopError::InvalidScheme(format!(
                    "chained-hop hops by whole bytes, {:?} spreads a byte over {} units",
                    self.codec,
                    self.codec.units_per_byte()
                )));
            }
        }
        if self.max_payload == 0 {
            return Err(KeyhopError::InvalidScheme(
                "max_payload must be positive".into(),
            ));
        }
        if self.step_bias.checked_add(usize::from(u8::MAX)).is_none() {
            return Err(KeyhopError::InvalidScheme(format!(
                "step_bias {} is too large",
                self.step_bias
            )));
        }
        let longest = self.max_frame_len().ok_or_else(|| {
            KeyhopError::InvalidScheme(format!("max_payload {} is too large", self.max_payload))
        })?;
        if self.safety_bound <= longest {
            return Err(KeyhopError::InvalidScheme(format!(
                "safety_bound {} must exceed the longest frame ({})",
                self.safety_bound, longest
            )));
        }
        Ok(())
    }

    /// Serialize scheme to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize scheme from JSON bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let scheme: Self = serde_json::from_slice(data)?;
        scheme.validate()?;
        Ok(scheme)
    }
}
