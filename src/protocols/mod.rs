//! Capabilities the survey pipeline consumes from the collective authority
//!
//! Currently those are:
//! * deterministic switching (probabilistic ciphertext to comparable tag)
//! * key switching (ciphertext under the collective key to the querier key)
//! * tree shaped broadcast/collect transport
//!
//! Switching is exposed as traits so that a pipeline driver receives the
//! authority it talks to explicitly. [`local::LocalAuthority`] holds the whole
//! secret and is meant for tests and single server deployments,
//! [`collective::CollectiveAuthority`] splits it across nodes.
use std::collections::BTreeMap;
use rabe_bn::G1;
use crate::error::Result;
use crate::primitives::{deterministic::DeterministicAttributes, vector::CipherVector};

pub mod collective;
pub mod local;
pub mod transport;

pub trait DeterministicSwitching {
    /// Switches every ciphertext of `vector` to its deterministic form.
    fn switch_to_deterministic(&self, vector: &CipherVector) -> Result<DeterministicAttributes>;
}

pub trait KeySwitching {
    /// Re-encrypts `vector` under `target` without exposing the plaintext.
    fn switch_to_key(&self, vector: &CipherVector, target: &G1) -> Result<CipherVector>;
}

/// Applies [`DeterministicSwitching`] to every entry of `vectors`.
pub fn switch_all_to_deterministic<S, K>(
    switching: &S,
    vectors: &BTreeMap<K, CipherVector>,
) -> Result<BTreeMap<K, DeterministicAttributes>>
where
    S: DeterministicSwitching + ?Sized,
    K: Ord + Clone,
{
    vectors
        .iter()
        .map(|(id, vector)| Ok((id.clone(), switching.switch_to_deterministic(vector)?)))
        .collect()
}

/// Applies [`KeySwitching`] to every entry of `vectors`.
pub fn switch_all_to_key<S, K>(
    switching: &S,
    vectors: &BTreeMap<K, CipherVector>,
    target: &G1,
) -> Result<BTreeMap<K, CipherVector>>
where
    S: KeySwitching + ?Sized,
    K: Ord + Clone,
{
    vectors
        .iter()
        .map(|(id, vector)| Ok((id.clone(), switching.switch_to_key(vector, target)?)))
        .collect()
}
