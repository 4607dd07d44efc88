//! Lookup table from `m·G` back to `m` for small plaintexts.
//!
//! Aggregates of survey answers are counts and sums, so their plaintexts stay
//! small; the querier builds one table and reuses it for every deliverable.
use std::collections::HashMap;
use rabe_bn::{G1, Group};
use crate::error::{ColaggError, Result};
use crate::utils::tools::point_bytes;

/// Precomputed `m·G` for every `m` in `[-bound, bound]`
#[derive(Clone, Debug)]
pub struct DiscreteLogTable {
    bound: i64,
    points: HashMap<Vec<u8>, i64>,
}

impl DiscreteLogTable {
    pub fn new(bound: u32) -> DiscreteLogTable {
        let bound = i64::from(bound);
        let g = G1::one();
        let mut points = HashMap::with_capacity(2 * bound as usize + 1);
        let mut positive = G1::zero();
        for m in 0..=bound {
            // the infinity point and affine points always encode
            if let Ok(bytes) = point_bytes(&positive) {
                points.insert(bytes, m);
            }
            if m > 0 {
                if let Ok(bytes) = point_bytes(&-positive) {
                    points.insert(bytes, -m);
                }
            }
            positive = positive + g;
        }
        DiscreteLogTable { bound, points }
    }

    pub fn bound(&self) -> i64 {
        self.bound
    }

    pub fn lookup(&self, point: &G1) -> Result<i64> {
        self.points
            .get(&point_bytes(point)?)
            .copied()
            .ok_or(ColaggError::DecryptionOutOfRange)
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::utils::tools::i64_to_fr;

    #[test]
    fn lookup_inside_bound() {
        let table = DiscreteLogTable::new(20);
        for m in [-20i64, -1, 0, 1, 19, 20] {
            let point = G1::one() * i64_to_fr(m).unwrap();
            assert_eq!(table.lookup(&point).unwrap(), m);
        }
    }

    #[test]
    fn lookup_outside_bound() {
        let table = DiscreteLogTable::new(20);
        let point = G1::one() * i64_to_fr(21).unwrap();
        assert_eq!(table.lookup(&point), Err(ColaggError::DecryptionOutOfRange));
    }
}
