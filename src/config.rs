//! Runtime settings of a survey deployment.
use crate::primitives::dlog::DiscreteLogTable;
#[cfg(feature = "serde")]
use serde::{Serialize, Deserialize};
#[cfg(feature = "borsh")]
use borsh::{BorshSerialize, BorshDeserialize};

/// Largest absolute plaintext the querier's lookup table covers.
pub const DEFAULT_DLOG_BOUND: u32 = 10_000;
/// Children per node of the combination tree.
pub const DEFAULT_BRANCHING: usize = 2;

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SurveyConfig {
    pub dlog_bound: u32,
    pub branching: usize,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        SurveyConfig {
            dlog_bound: DEFAULT_DLOG_BOUND,
            branching: DEFAULT_BRANCHING,
        }
    }
}

impl SurveyConfig {
    pub fn with_dlog_bound(mut self, bound: u32) -> SurveyConfig {
        self.dlog_bound = bound;
        self
    }

    pub fn with_branching(mut self, branching: usize) -> SurveyConfig {
        self.branching = branching;
        self
    }

    pub fn dlog_table(&self) -> DiscreteLogTable {
        DiscreteLogTable::new(self.dlog_bound)
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn defaults_and_builders() {
        let config = SurveyConfig::default();
        assert_eq!(config.dlog_bound, DEFAULT_DLOG_BOUND);
        let config = config.with_dlog_bound(5).with_branching(3);
        assert_eq!(config.branching, 3);
        assert_eq!(config.dlog_table().bound(), 5);
    }
}
