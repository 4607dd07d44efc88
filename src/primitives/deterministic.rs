//! Deterministic ciphertexts and the grouping keys derived from them.
//!
//! A deterministic ciphertext is a single point, equal for equal plaintexts
//! under the same collective tag secret and not decryptable without it.
//! Sequences of them identify groups; [`GroupingKey`] turns such a sequence
//! into an ordered, hashable map key.
use std::fmt::{Display, Formatter, Result as FmtResult};
use rabe_bn::G1;
use crate::error::Result;
use crate::utils::{hash::sha3_digest, tools::{point_bytes, to_hex}};
#[cfg(feature = "serde")]
use serde::{Serialize, Deserialize};
#[cfg(feature = "borsh")]
use borsh::{BorshSerialize, BorshDeserialize};

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeterministicCipherText {
    pub point: G1,
}

impl DeterministicCipherText {
    pub fn new(point: G1) -> DeterministicCipherText {
        DeterministicCipherText { point }
    }
}

/// The deterministic form of one response's grouping attributes, in order.
#[derive(Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeterministicAttributes(pub Vec<DeterministicCipherText>);

impl DeterministicAttributes {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Derives the grouping key: SHA3-256 over the length prefixed canonical
    /// encoding of every point, so the key depends on order and length.
    pub fn key(&self) -> Result<GroupingKey> {
        let parts = self.0
            .iter()
            .map(|d| point_bytes(&d.point))
            .collect::<Result<Vec<_>>>()?;
        Ok(GroupingKey(sha3_digest(&parts)))
    }
}

impl From<Vec<DeterministicCipherText>> for DeterministicAttributes {
    fn from(values: Vec<DeterministicCipherText>) -> Self {
        DeterministicAttributes(values)
    }
}

/// Canonical identifier of a group
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroupingKey(pub [u8; 32]);

impl Display for GroupingKey {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", to_hex(&self.0))
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use rabe_bn::Group;
    use crate::utils::tools::i64_to_fr;

    fn det(m: i64) -> DeterministicCipherText {
        DeterministicCipherText::new(G1::one() * i64_to_fr(m).unwrap())
    }

    #[test]
    fn equal_sequences_equal_keys() {
        let a = DeterministicAttributes(vec![det(0), det(1)]);
        // same point computed differently
        let b = DeterministicAttributes(vec![det(0), DeterministicCipherText::new(G1::one() + G1::zero())]);
        assert_eq!(a, b);
        assert_eq!(a.key().unwrap(), b.key().unwrap());
    }

    #[test]
    fn order_and_length_matter() {
        let a = DeterministicAttributes(vec![det(0), det(1)]);
        let swapped = DeterministicAttributes(vec![det(1), det(0)]);
        let shorter = DeterministicAttributes(vec![det(0)]);
        assert_ne!(a.key().unwrap(), swapped.key().unwrap());
        assert_ne!(a.key().unwrap(), shorter.key().unwrap());
        assert_ne!(DeterministicAttributes::default().key().unwrap(), shorter.key().unwrap());
    }

    #[test]
    fn display_is_hex() {
        let key = DeterministicAttributes::default().key().unwrap();
        assert_eq!(key.to_string().len(), 64);
    }
}
