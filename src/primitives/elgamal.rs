//! Additive ElGamal on the G1 group of the BN254 curve.
//!
//! * Key pair: `x` random, `X = x·G`
//! * Encryption of `m`: `(K, C) = (r·G, m·G + r·X)` with fresh `r`
//! * Homomorphic addition is pointwise addition of `K` and `C`
//! * Decryption: `C - x·K = m·G`, followed by a discrete logarithm lookup
//!
//! # Examples
//!
//! ```
//! use colagg::primitives::elgamal::*;
//! use colagg::primitives::dlog::DiscreteLogTable;
//! let keys = KeyPair::generate();
//! let table = DiscreteLogTable::new(100);
//! let sum = encrypt_int(&keys.public, 4).unwrap().add(&encrypt_int(&keys.public, 5).unwrap());
//! assert_eq!(keys.decrypt(&sum, &table).unwrap(), 9);
//! ```
use std::ops::Neg;
use rabe_bn::{Fr, G1, Group};
use rand::Rng;
use crate::error::Result;
use crate::primitives::dlog::DiscreteLogTable;
use crate::utils::tools::{i64_to_fr, point_bytes};
#[cfg(feature = "serde")]
use serde::{Serialize, Deserialize};
#[cfg(feature = "borsh")]
use borsh::{BorshSerialize, BorshDeserialize};

/// An ElGamal key pair.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeyPair {
    pub secret: Fr,
    pub public: G1,
}

impl KeyPair {
    pub fn generate() -> KeyPair {
        let mut rng = rand::thread_rng();
        let secret: Fr = rng.gen();
        KeyPair { secret, public: G1::one() * secret }
    }

    /// Decrypts `ct` to the point `m·G`.
    pub fn decrypt_point(&self, ct: &CipherText) -> G1 {
        ct.c - ct.k * self.secret
    }

    /// Decrypts `ct` to a small integer using `table`.
    pub fn decrypt(&self, ct: &CipherText, table: &DiscreteLogTable) -> Result<i64> {
        table.lookup(&self.decrypt_point(ct))
    }
}

/// An ElGamal ciphertext `(K, C)`.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CipherText {
    pub k: G1,
    pub c: G1,
}

impl CipherText {
    /// The trivial encryption of zero (both points at infinity).
    pub fn zero() -> CipherText {
        CipherText { k: G1::zero(), c: G1::zero() }
    }

    pub fn add(&self, other: &CipherText) -> CipherText {
        CipherText { k: self.k + other.k, c: self.c + other.c }
    }

    pub fn sub(&self, other: &CipherText) -> CipherText {
        CipherText { k: self.k - other.k, c: self.c - other.c }
    }

    pub fn neg(&self) -> CipherText {
        CipherText { k: self.k.neg(), c: self.c.neg() }
    }

    /// Adds a fresh encryption of zero, unlinking the result from `self`.
    pub fn rerandomize(&self, pk: &G1) -> CipherText {
        let r: Fr = rand::thread_rng().gen();
        CipherText { k: self.k + G1::one() * r, c: self.c + *pk * r }
    }

    /// Canonical bytes of both points, equal iff the ciphertexts are equal.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = point_bytes(&self.k)?;
        bytes.extend(point_bytes(&self.c)?);
        Ok(bytes)
    }
}

/// Encrypts the integer `m` under the public key `pk`.
pub fn encrypt_int(pk: &G1, m: i64) -> Result<CipherText> {
    let r: Fr = rand::thread_rng().gen();
    let m = i64_to_fr(m)?;
    Ok(CipherText {
        k: G1::one() * r,
        c: G1::one() * m + *pk * r,
    })
}
