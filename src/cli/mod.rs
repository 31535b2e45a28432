pub mod derive;
pub mod embed;
pub mod extract;
pub mod info;
pub mod media;

pub use derive::*;
pub use embed::*;
pub use extract::*;
pub use info::*;
pub use media::*;

use crate::config::load_scheme;
use crate::error::Result;
use crate::scheme::{CodecKind, Framing, HashAlgorithm, Scheme, StepFold, StrategyKind};
use std::path::PathBuf;

/// Scheme selection shared by embed and extract. A config file is the
/// base when given; the remaining flags override it.
#[derive(Debug, Clone, Default)]
pub struct SchemeFlags {
    pub config: Option<PathBuf>,
    pub strategy: Option<StrategyKind>,
    pub hash: Option<HashAlgorithm>,
    pub fold: Option<StepFold>,
    pub codec: Option<CodecKind>,
    pub framing: Option<Framing>,
    pub safety_bound: Option<usize>,
}

impl SchemeFlags {
    pub fn into_scheme(self) -> Result<Scheme> {
        let mut scheme = match (&self.config, self.strategy) {
            (Some(path), _) => load_scheme(path)?,
            (None, strategy) => Scheme::preset(strategy.unwrap_or_default()),
        };
        if let Some(strategy) = self.strategy {
            scheme.strategy = strategy;
        }
        if let Some(hash) = self.hash {
            scheme.hash = hash;
        }
        if let Some(fold) = self.fold {
            scheme.step_fold = fold;
        }
        if let Some(codec) = self.codec {
            scheme.codec = codec;
        }
        if let Some(framing) = self.framing {
            scheme.framing = framing;
        }
        if let Some(bound) = self.safety_bound {
            scheme.safety_bound = bound;
        }
        scheme.validate()?;
        Ok(scheme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_pick_preset() {
        let flags = SchemeFlags {
            strategy: Some(StrategyKind::ChainedHop),
            ..Default::default()
        };
        let scheme = flags.into_scheme().unwrap();
        assert_eq!(scheme, Scheme::preset(StrategyKind::ChainedHop));
    }

    #[test]
    fn test_flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scheme.toml");
        std::fs::write(&path, "strategy = \"permutation\"\nmax_payload = 16\n").unwrap();

        let flags = SchemeFlags {
            config: Some(path),
            hash: Some(HashAlgorithm::Sha3),
            safety_bound: Some(40),
            ..Default::default()
        };
        let scheme = flags.into_scheme().unwrap();
        assert_eq!(scheme.strategy, StrategyKind::Permutation);
        assert_eq!(scheme.hash, HashAlgorithm::Sha3);
        assert_eq!(scheme.max_payload, 16);
        assert_eq!(scheme.safety_bound, 40);
    }

    #[test]
    fn test_flags_pick_codec_and_framing() {
        let flags = SchemeFlags {
            strategy: Some(StrategyKind::Permutation),
            codec: Some(CodecKind::RedLsb),
            framing: Some(Framing::Raw),
            ..Default::default()
        };
        let scheme = flags.into_scheme().unwrap();
        assert_eq!(scheme.codec, CodecKind::RedLsb);
        assert_eq!(scheme.framing, Framing::Raw);
    }

    #[test]
    fn test_flags_validate() {
        let flags = SchemeFlags {
            safety_bound: Some(5),
            ..Default::default()
        };
        assert!(flags.into_scheme().is_err());
    }
}
