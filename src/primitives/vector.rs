//! Fixed-length vectors of ElGamal ciphertexts.
//!
//! Survey answers travel as `CipherVector`s: one ciphertext per grouping or
//! aggregating attribute. Elementwise addition never pads or truncates, a
//! length mismatch is an error.
use rabe_bn::G1;
use crate::error::{ColaggError, Result};
use crate::primitives::dlog::DiscreteLogTable;
use crate::primitives::elgamal::{encrypt_int, CipherText, KeyPair};
#[cfg(feature = "serde")]
use serde::{Serialize, Deserialize};
#[cfg(feature = "borsh")]
use borsh::{BorshSerialize, BorshDeserialize};

#[derive(Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CipherVector(pub Vec<CipherText>);

impl CipherVector {
    /// `len` fresh encryptions of zero under `pk`.
    pub fn null(len: usize, pk: &G1) -> Result<CipherVector> {
        (0..len).map(|_| encrypt_int(pk, 0)).collect::<Result<Vec<_>>>().map(CipherVector)
    }

    pub fn encrypt(pk: &G1, values: &[i64]) -> Result<CipherVector> {
        values.iter().map(|m| encrypt_int(pk, *m)).collect::<Result<Vec<_>>>().map(CipherVector)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CipherText> {
        self.0.iter()
    }

    pub fn check_len(&self, other: &CipherVector) -> Result<()> {
        if self.len() != other.len() {
            return Err(ColaggError::VectorLengthMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        Ok(())
    }

    /// Elementwise homomorphic sum `self + other`.
    pub fn add(&self, other: &CipherVector) -> Result<CipherVector> {
        self.check_len(other)?;
        Ok(CipherVector(
            self.0.iter().zip(other.0.iter()).map(|(a, b)| a.add(b)).collect(),
        ))
    }

    /// In-place variant of [`CipherVector::add`], `self` is untouched on error.
    pub fn add_assign(&mut self, other: &CipherVector) -> Result<()> {
        self.check_len(other)?;
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a = a.add(b);
        }
        Ok(())
    }

    pub fn sub(&self, other: &CipherVector) -> Result<CipherVector> {
        self.check_len(other)?;
        Ok(CipherVector(
            self.0.iter().zip(other.0.iter()).map(|(a, b)| a.sub(b)).collect(),
        ))
    }

    /// Canonical byte encoding; an empty vector encodes to no bytes at all.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        for ct in self.0.iter() {
            bytes.extend(ct.to_bytes()?);
        }
        Ok(bytes)
    }

    pub fn decrypt(&self, keys: &KeyPair, table: &DiscreteLogTable) -> Result<Vec<i64>> {
        self.0.iter().map(|ct| keys.decrypt(ct, table)).collect()
    }
}

impl From<Vec<CipherText>> for CipherVector {
    fn from(cts: Vec<CipherText>) -> Self {
        CipherVector(cts)
    }
}

impl<'a> IntoIterator for &'a CipherVector {
    type Item = &'a CipherText;
    type IntoIter = std::slice::Iter<'a, CipherText>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use proptest::prelude::*;

    #[test]
    fn add_vectors() {
        let keys = KeyPair::generate();
        let table = DiscreteLogTable::new(100);
        let a = CipherVector::encrypt(&keys.public, &[1, 2, 3, 6]).unwrap();
        let b = CipherVector::encrypt(&keys.public, &[2, 4, 8, 6]).unwrap();
        assert_eq!(a.add(&b).unwrap().decrypt(&keys, &table).unwrap(), vec![3, 6, 11, 12]);
        assert_eq!(a.sub(&b).unwrap().decrypt(&keys, &table).unwrap(), vec![-1, -2, -5, 0]);
        let null = CipherVector::null(4, &keys.public).unwrap();
        assert_eq!(a.add(&null).unwrap().decrypt(&keys, &table).unwrap(), vec![1, 2, 3, 6]);
    }

    #[test]
    fn length_mismatch() {
        let keys = KeyPair::generate();
        let mut a = CipherVector::encrypt(&keys.public, &[1, 2, 3]).unwrap();
        let b = CipherVector::encrypt(&keys.public, &[1, 2]).unwrap();
        let before = a.clone();
        assert_eq!(
            a.add(&b),
            Err(ColaggError::VectorLengthMismatch { expected: 3, actual: 2 })
        );
        assert!(a.add_assign(&b).is_err());
        assert_eq!(a, before);
    }

    #[test]
    fn empty_vector_has_no_bytes() {
        assert!(CipherVector::default().to_bytes().unwrap().is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn addition_commutes(values in proptest::collection::vec((-50i64..50, -50i64..50), 1..5)) {
            let keys = KeyPair::generate();
            let table = DiscreteLogTable::new(100);
            let left: Vec<i64> = values.iter().map(|v| v.0).collect();
            let right: Vec<i64> = values.iter().map(|v| v.1).collect();
            let a = CipherVector::encrypt(&keys.public, &left).unwrap();
            let b = CipherVector::encrypt(&keys.public, &right).unwrap();
            let ab = a.add(&b).unwrap();
            let ba = b.add(&a).unwrap();
            prop_assert_eq!(&ab, &ba);
            prop_assert_eq!(ab.decrypt(&keys, &table).unwrap(), ba.decrypt(&keys, &table).unwrap());
        }

        #[test]
        fn addition_associates(values in proptest::collection::vec((0i64..30, 0i64..30, 0i64..30), 1..4)) {
            let keys = KeyPair::generate();
            let table = DiscreteLogTable::new(100);
            let encrypt = |pick: fn(&(i64, i64, i64)) -> i64| {
                let plain: Vec<i64> = values.iter().map(pick).collect();
                CipherVector::encrypt(&keys.public, &plain).unwrap()
            };
            let a = encrypt(|v| v.0);
            let b = encrypt(|v| v.1);
            let c = encrypt(|v| v.2);
            let left = a.add(&b).unwrap().add(&c).unwrap();
            let right = a.add(&b.add(&c).unwrap()).unwrap();
            prop_assert_eq!(left.decrypt(&keys, &table).unwrap(), right.decrypt(&keys, &table).unwrap());
        }
    }
}
