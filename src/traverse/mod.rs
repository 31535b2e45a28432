//! Address traversal: which carrier unit holds the i-th frame byte.
//!
//! The three strategies share one cursor shape, [`Walk::advance`], so the
//! engine drives embedding and extraction with a single loop.

pub mod chained;
pub mod fixed_step;
pub mod permutation;

pub use chained::{ChainedHop, ChainedWalk};
pub use fixed_step::{FixedStep, FixedStepWalk};
pub use permutation::{full_permutation, Permutation, PermutationWalk};

use crate::error::{KeyhopError, Result};
use crate::keys::DerivedParams;
use crate::scheme::{OverflowPolicy, Scheme, StrategyKind};

/// A traversal bound to one set of derived parameters and one capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    FixedStep(FixedStep),
    Permutation(Permutation),
    ChainedHop(ChainedHop),
}

impl Traversal {
    pub fn from_params(params: &DerivedParams, scheme: &Scheme, capacity: usize) -> Result<Self> {
        let traversal = match scheme.strategy {
            StrategyKind::FixedStep => {
                let step = usize::from(params.step)
                    .checked_add(scheme.step_bias)
                    .ok_or_else(|| {
                        KeyhopError::InvalidScheme(format!(
                            "step_bias {} overflows the stride",
                            scheme.step_bias
                        ))
                    })?;
                Self::FixedStep(FixedStep::new(usize::from(params.offset), step, capacity)?)
            }
            StrategyKind::Permutation => {
                Self::Permutation(Permutation::new(params.seed, capacity)?)
            }
            StrategyKind::ChainedHop => {
                let delimiter = scheme.markers.delimiter_byte().ok_or_else(|| {
                    KeyhopError::InvalidScheme("chained-hop needs a delimiter".into())
                })?;
                Self::ChainedHop(ChainedHop::new(
                    params.offset,
                    params.hop,
                    capacity,
                    delimiter,
                    scheme.markers.start.len(),
                )?)
            }
        };
        Ok(traversal)
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::FixedStep(_) => StrategyKind::FixedStep,
            Self::Permutation(_) => StrategyKind::Permutation,
            Self::ChainedHop(_) => StrategyKind::ChainedHop,
        }
    }

    /// Distinct addresses reachable before the sequence repeats
    pub fn span(&self) -> usize {
        match self {
            Self::FixedStep(t) => t.span(),
            Self::Permutation(t) => t.span(),
            Self::ChainedHop(t) => t.span(),
        }
    }

    /// Fresh cursor at the first address
    pub fn walk(&self) -> Walk {
        match self {
            Self::FixedStep(t) => Walk::FixedStep(t.walk()),
            Self::Permutation(t) => Walk::Permutation(t.walk()),
            Self::ChainedHop(t) => Walk::ChainedHop(t.walk()),
        }
    }

    /// Logical address of every byte in `frame`
    pub fn plan(&self, frame: &[u8]) -> Vec<usize> {
        match self {
            Self::ChainedHop(t) => t.plan(frame),
            Self::FixedStep(t) => t.walk().take(frame.len()).collect(),
            Self::Permutation(t) => t.walk().take(frame.len()).collect(),
        }
    }
}

/// Cursor over a traversal
#[derive(Debug, Clone)]
pub enum Walk {
    FixedStep(FixedStepWalk),
    Permutation(PermutationWalk),
    ChainedHop(ChainedWalk),
}

impl Walk {
    /// Next logical address. `previous` is the byte at the last address and
    /// only matters to chained-hop. `None` once the strategy runs out.
    pub fn advance(&mut self, previous: Option<u8>) -> Option<usize> {
        match self {
            Self::FixedStep(w) => w.next(),
            Self::Permutation(w) => w.next(),
            Self::ChainedHop(w) => w.advance(previous),
        }
    }
}

/// Map a logical address onto a unit that is physically present.
///
/// Addresses below `resident` pass through. Past it, `FoldHalf` folds the
/// address into the first half of the declared `capacity`.
pub fn resolve(
    address: usize,
    capacity: usize,
    resident: usize,
    policy: OverflowPolicy,
) -> Result<usize> {
    if address < resident {
        return Ok(address);
    }
    let half = capacity / 2;
    match policy {
        OverflowPolicy::FoldHalf if half > 0 && address % half < resident => {
            let folded = address % half;
            log::warn!(
                "address {} is past the {} resident units, folded to {}",
                address,
                resident,
                folded
            );
            Ok(folded)
        }
        _ => Err(KeyhopError::AddressOutOfBounds {
            address,
            capacity: resident,
        }),
    }
}
