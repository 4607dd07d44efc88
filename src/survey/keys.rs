//! Raw keys of the local pre-aggregation buffer.
use std::fmt::{Display, Formatter, Result as FmtResult};
use crate::error::Result;
use crate::primitives::vector::CipherVector;
use crate::utils::tools::to_hex;
#[cfg(feature = "serde")]
use serde::{Serialize, Deserialize};
#[cfg(feature = "borsh")]
use borsh::{BorshSerialize, BorshDeserialize};

/// The canonical bytes of a still probabilistic grouping vector.
///
/// Two raw keys are equal only for byte identical ciphertexts, i.e. repeated
/// submissions of the same encrypted payload. Equal plaintexts under fresh
/// randomness get different raw keys; they meet again after deterministic
/// switching. The empty vector maps to the default group key.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawKey(Vec<u8>);

impl RawKey {
    pub fn default_group() -> RawKey {
        RawKey(Vec::new())
    }

    pub fn from_vector(vector: &CipherVector) -> Result<RawKey> {
        Ok(RawKey(vector.to_bytes()?))
    }

    pub fn is_default_group(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for RawKey {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        if self.is_default_group() {
            write!(f, "default")
        } else {
            // two encoded points per ciphertext, too long for logs
            write!(f, "{}..", to_hex(&self.0[..8.min(self.0.len())]))
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::primitives::elgamal::KeyPair;

    #[test]
    fn empty_vector_is_default_group() {
        let key = RawKey::from_vector(&CipherVector::default()).unwrap();
        assert_eq!(key, RawKey::default_group());
        assert!(key.is_default_group());
        assert_eq!(key.to_string(), "default");
    }

    #[test]
    fn byte_equality_only() {
        let keys = KeyPair::generate();
        let a = CipherVector::encrypt(&keys.public, &[1, 2]).unwrap();
        let b = CipherVector::encrypt(&keys.public, &[1, 2]).unwrap();
        assert_eq!(RawKey::from_vector(&a).unwrap(), RawKey::from_vector(&a.clone()).unwrap());
        assert_ne!(RawKey::from_vector(&a).unwrap(), RawKey::from_vector(&b).unwrap());
        assert!(!RawKey::from_vector(&a).unwrap().is_default_group());
    }
}
