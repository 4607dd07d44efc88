//! Round scoped identifiers for grouping attributes awaiting switching.
use std::fmt::{Display, Formatter, Result as FmtResult};
#[cfg(feature = "serde")]
use serde::{Serialize, Deserialize};
#[cfg(feature = "borsh")]
use borsh::{BorshSerialize, BorshDeserialize};

/// Opaque identifier, unique within one round. The round is part of the id so
/// an id left over from an earlier round never matches a current one.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TempId {
    round: u64,
    sequence: u64,
}

impl Display for TempId {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}:{}", self.round, self.sequence)
    }
}

#[derive(Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TempIdAllocator {
    round: u64,
    next: u64,
}

impl TempIdAllocator {
    pub fn new() -> TempIdAllocator {
        TempIdAllocator::default()
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    /// Hands out the next id of the current round; ids are never reused.
    pub fn allocate(&mut self) -> TempId {
        let id = TempId { round: self.round, sequence: self.next };
        self.next += 1;
        id
    }

    /// Starts a new round, invalidating every id allocated so far.
    pub fn next_round(&mut self) {
        self.round += 1;
        self.next = 0;
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use std::collections::HashSet;

    #[test]
    fn unique_within_round() {
        let mut ids = TempIdAllocator::new();
        let allocated: HashSet<TempId> = (0..100).map(|_| ids.allocate()).collect();
        assert_eq!(allocated.len(), 100);
    }

    #[test]
    fn rounds_do_not_collide() {
        let mut ids = TempIdAllocator::new();
        let first = ids.allocate();
        ids.next_round();
        let second = ids.allocate();
        assert_ne!(first, second);
        assert_eq!(ids.round(), 1);
        assert_eq!(second.to_string(), "1:0");
    }
}
