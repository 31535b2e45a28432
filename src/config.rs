//! TOML scheme files.
//!
//! Every field is optional. Missing fields take the preset of the named
//! strategy (fixed-step when no strategy is given):
//!
//! ```toml
//! strategy = "chained-hop"
//! safety_bound = 128
//!
//! [markers]
//! start = "*"
//! ```

use crate::error::Result;
use crate::scheme::{
    CodecKind, Framing, HashAlgorithm, OverflowPolicy, Scheme, StartSearch, StepFold,
    StrategyKind,
};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarkerOverrides {
    pub start: Option<String>,
    pub end: Option<String>,
    pub delimiter: Option<char>,
}

/// A scheme as written in a file, before preset defaults are filled in
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemeOverrides {
    pub strategy: Option<StrategyKind>,
    pub hash: Option<HashAlgorithm>,
    pub step_fold: Option<StepFold>,
    pub step_bias: Option<usize>,
    pub codec: Option<CodecKind>,
    pub markers: Option<MarkerOverrides>,
    pub framing: Option<Framing>,
    pub start_search: Option<StartSearch>,
    pub overflow: Option<OverflowPolicy>,
    pub max_payload: Option<usize>,
    pub safety_bound: Option<usize>,
    pub collision_check: Option<bool>,
}

impl SchemeOverrides {
    pub fn into_scheme(self) -> Scheme {
        let mut scheme = Scheme::preset(self.strategy.unwrap_or_default());
        if let Some(hash) = self.hash {
            scheme.hash = hash;
        }
        if let Some(fold) = self.step_fold {
            scheme.step_fold = fold;
        }
        if let Some(bias) = self.step_bias {
            scheme.step_bias = bias;
        }
        if let Some(codec) = self.codec {
            scheme.codec = codec;
        }
        if let Some(markers) = self.markers {
            if let Some(start) = markers.start {
                scheme.markers.start = start;
            }
            if let Some(end) = markers.end {
                scheme.markers.end = end;
            }
            if markers.delimiter.is_some() {
                scheme.markers.delimiter = markers.delimiter;
            }
        }
        if let Some(framing) = self.framing {
            scheme.framing = framing;
        }
        if let Some(search) = self.start_search {
            scheme.start_search = search;
        }
        if let Some(overflow) = self.overflow {
            scheme.overflow = overflow;
        }
        if let Some(max) = self.max_payload {
            scheme.max_payload = max;
        }
        if let Some(bound) = self.safety_bound {
            scheme.safety_bound = bound;
        }
        if let Some(check) = self.collision_check {
            scheme.collision_check = check;
        }
        scheme
    }
}

/// Parse and validate a scheme from TOML text
pub fn scheme_from_toml(content: &str) -> Result<Scheme> {
    let overrides: SchemeOverrides = toml::from_str(content)?;
    let scheme = overrides.into_scheme();
    scheme.validate()?;
    Ok(scheme)
}

/// Load a scheme file
pub fn load_scheme<P: AsRef<Path>>(path: P) -> Result<Scheme> {
    let content = fs::read_to_string(path.as_ref())?;
    log::debug!("loaded scheme from {}", path.as_ref().display());
    scheme_from_toml(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeyhopError;

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(scheme_from_toml("").unwrap(), Scheme::default());
    }

    #[test]
    fn test_missing_fields_follow_strategy_preset() {
        let scheme = scheme_from_toml("strategy = \"chained-hop\"\nsafety_bound = 128\n").unwrap();
        assert_eq!(scheme.hash, HashAlgorithm::Md5);
        assert_eq!(scheme.markers.start, "*");
        assert_eq!(scheme.safety_bound, 128);
    }

    #[test]
    fn test_all_fields() {
        let text = r##"
strategy = "permutation"
hash = "blake3"
step_fold = "crc16"
step_bias = 3
codec = "stereo44"
start_search = "anchored"
overflow = "strict"
max_payload = 32
safety_bound = 100
collision_check = false

[markers]
start = "<<"
end = ">>"
delimiter = "|"
"##;
        let scheme = scheme_from_toml(text).unwrap();
        assert_eq!(scheme.strategy, StrategyKind::Permutation);
        assert_eq!(scheme.hash, HashAlgorithm::Blake3);
        assert_eq!(scheme.step_fold, StepFold::Crc16);
        assert_eq!(scheme.step_bias, 3);
        assert_eq!(scheme.codec, CodecKind::Stereo44);
        assert_eq!(scheme.start_search, StartSearch::Anchored);
        assert_eq!(scheme.overflow, OverflowPolicy::Strict);
        assert_eq!(scheme.max_payload, 32);
        assert_eq!(scheme.markers.end, ">>");
        assert_eq!(scheme.markers.delimiter, Some('|'));
        assert!(!scheme.collision_check);
    }

    #[test]
    fn test_raw_red_lsb_file() {
        let scheme =
            scheme_from_toml("strategy = \"permutation\"\ncodec = \"red-lsb\"\nframing = \"raw\"\n")
                .unwrap();
        assert_eq!(scheme.codec, CodecKind::RedLsb);
        assert_eq!(scheme.framing, Framing::Raw);
    }

    #[test]
    fn test_invalid_bound_rejected() {
        let err = scheme_from_toml("safety_bound = 10\n").unwrap_err();
        assert!(matches!(err, KeyhopError::InvalidScheme(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(matches!(
            scheme_from_toml("passphrase = \"x\"\n"),
            Err(KeyhopError::Toml(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scheme.toml");
        fs::write(&path, "strategy = \"permutation\"\n").unwrap();
        let scheme = load_scheme(&path).unwrap();
        assert_eq!(scheme, Scheme::preset(StrategyKind::Permutation));
        assert!(matches!(
            load_scheme(dir.path().join("missing.toml")),
            Err(KeyhopError::Io(_))
        ));
    }
}
