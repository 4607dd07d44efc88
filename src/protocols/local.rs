//! Switching performed by a single holder of the whole secret key.
use rabe_bn::{Fr, G1, Group};
use rand::Rng;
use crate::error::Result;
use crate::primitives::{
    deterministic::{DeterministicAttributes, DeterministicCipherText},
    elgamal::{CipherText, KeyPair},
    vector::CipherVector,
};
use crate::protocols::{DeterministicSwitching, KeySwitching};

/// An authority made of one server: the ElGamal key pair plus the secret
/// scalar that tags deterministic ciphertexts.
#[derive(Clone, Debug)]
pub struct LocalAuthority {
    keys: KeyPair,
    tag: Fr,
}

impl LocalAuthority {
    pub fn generate() -> LocalAuthority {
        let tag: Fr = rand::thread_rng().gen();
        LocalAuthority { keys: KeyPair::generate(), tag }
    }

    pub fn public(&self) -> G1 {
        self.keys.public
    }

    pub fn keys(&self) -> &KeyPair {
        &self.keys
    }
}

impl DeterministicSwitching for LocalAuthority {
    fn switch_to_deterministic(&self, vector: &CipherVector) -> Result<DeterministicAttributes> {
        // s·(C - x·K) = s·m·G
        Ok(vector
            .iter()
            .map(|ct| DeterministicCipherText::new((ct.c - ct.k * self.keys.secret) * self.tag))
            .collect::<Vec<_>>()
            .into())
    }
}

impl KeySwitching for LocalAuthority {
    fn switch_to_key(&self, vector: &CipherVector, target: &G1) -> Result<CipherVector> {
        let mut rng = rand::thread_rng();
        Ok(vector
            .iter()
            .map(|ct| {
                let v: Fr = rng.gen();
                CipherText {
                    k: G1::one() * v,
                    c: ct.c - ct.k * self.keys.secret + *target * v,
                }
            })
            .collect::<Vec<_>>()
            .into())
    }
}
