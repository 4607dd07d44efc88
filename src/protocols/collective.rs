//! Switching run jointly by the servers of a collective authority.
//!
//! Every node `i` holds an additive share `x_i` of the collective secret
//! (`X = Σ x_i·G`) and a tag secret `s_i`. No node ever holds `x` or `Π s_i`.
//!
//! * Deterministic switching passes each ciphertext through all nodes, node
//!   `i` maps `(K, C)` to `(s_i·K, s_i·(C - x_i·K))`. Once every share is
//!   removed, `C = (Π s_i)·m·G`.
//! * Key switching collects one share per node, `(v_i·G, -x_i·K + v_i·Q)`,
//!   and adds them to `(0, C)`: the result encrypts `m` under `Q`.
//!
//! Shares are split without a dealer and without verification, the
//! verifiable secret sharing of a production deployment is out of scope.
use rabe_bn::{Fr, G1, Group};
use rand::Rng;
use tracing::debug;
use crate::error::Result;
use crate::primitives::{
    deterministic::{DeterministicAttributes, DeterministicCipherText},
    elgamal::CipherText,
    vector::CipherVector,
};
use crate::protocols::{DeterministicSwitching, KeySwitching};
#[cfg(feature = "serde")]
use serde::{Serialize, Deserialize};
#[cfg(feature = "borsh")]
use borsh::{BorshSerialize, BorshDeserialize};

/// One server of the collective authority
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AuthorityNode {
    pub name: String,
    secret: Fr,
    tag: Fr,
    pub public: G1,
}

impl AuthorityNode {
    pub fn generate(name: &str) -> AuthorityNode {
        let mut rng = rand::thread_rng();
        let secret: Fr = rng.gen();
        AuthorityNode {
            name: name.to_string(),
            secret,
            tag: rng.gen(),
            public: G1::one() * secret,
        }
    }

    /// This node's step of the deterministic switching chain.
    pub fn deterministic_step(&self, ct: &CipherText) -> CipherText {
        CipherText {
            k: ct.k * self.tag,
            c: (ct.c - ct.k * self.secret) * self.tag,
        }
    }

    /// This node's contribution to switching `ct` to the key `target`.
    pub fn key_switch_share(&self, ct: &CipherText, target: &G1) -> CipherText {
        let v: Fr = rand::thread_rng().gen();
        CipherText {
            k: G1::one() * v,
            c: *target * v - ct.k * self.secret,
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CollectiveAuthority {
    nodes: Vec<AuthorityNode>,
    public: G1,
}

impl CollectiveAuthority {
    /// Creates an authority of `n` nodes named `node-0` .. `node-{n-1}`.
    pub fn generate(n: usize) -> CollectiveAuthority {
        CollectiveAuthority::from_nodes((0..n).map(|i| AuthorityNode::generate(&format!("node-{}", i))).collect())
    }

    pub fn from_nodes(nodes: Vec<AuthorityNode>) -> CollectiveAuthority {
        let public = nodes.iter().fold(G1::zero(), |acc, node| acc + node.public);
        CollectiveAuthority { nodes, public }
    }

    /// The collective public key `X`.
    pub fn public(&self) -> G1 {
        self.public
    }

    pub fn nodes(&self) -> &[AuthorityNode] {
        &self.nodes
    }
}

impl DeterministicSwitching for CollectiveAuthority {
    fn switch_to_deterministic(&self, vector: &CipherVector) -> Result<DeterministicAttributes> {
        debug!(nodes = self.nodes.len(), len = vector.len(), "deterministic switching");
        Ok(vector
            .iter()
            .map(|ct| {
                let tagged = self.nodes.iter().fold(*ct, |acc, node| node.deterministic_step(&acc));
                DeterministicCipherText::new(tagged.c)
            })
            .collect::<Vec<_>>()
            .into())
    }
}

impl KeySwitching for CollectiveAuthority {
    fn switch_to_key(&self, vector: &CipherVector, target: &G1) -> Result<CipherVector> {
        debug!(nodes = self.nodes.len(), len = vector.len(), "key switching");
        Ok(vector
            .iter()
            .map(|ct| {
                let start = CipherText { k: G1::zero(), c: ct.c };
                self.nodes
                    .iter()
                    .fold(start, |acc, node| acc.add(&node.key_switch_share(ct, target)))
            })
            .collect::<Vec<_>>()
            .into())
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::primitives::{dlog::DiscreteLogTable, elgamal::KeyPair};

    #[test]
    fn collective_key_switch() {
        let authority = CollectiveAuthority::generate(3);
        let querier = KeyPair::generate();
        let table = DiscreteLogTable::new(100);
        let v = CipherVector::encrypt(&authority.public(), &[5, 0, -2, 99]).unwrap();
        let switched = authority.switch_to_key(&v, &querier.public).unwrap();
        assert_eq!(switched.decrypt(&querier, &table).unwrap(), vec![5, 0, -2, 99]);
    }

    #[test]
    fn collective_deterministic_switch() {
        let authority = CollectiveAuthority::generate(4);
        let pk = authority.public();
        let a = authority
            .switch_to_deterministic(&CipherVector::encrypt(&pk, &[1, 7]).unwrap())
            .unwrap();
        let b = authority
            .switch_to_deterministic(&CipherVector::encrypt(&pk, &[1, 7]).unwrap())
            .unwrap();
        let c = authority
            .switch_to_deterministic(&CipherVector::encrypt(&pk, &[7, 1]).unwrap())
            .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.0[0], c.0[1]);
    }

    #[test]
    fn different_authorities_different_tags() {
        let first = CollectiveAuthority::generate(2);
        let second = CollectiveAuthority::generate(2);
        let a = first
            .switch_to_deterministic(&CipherVector::encrypt(&first.public(), &[1]).unwrap())
            .unwrap();
        let b = second
            .switch_to_deterministic(&CipherVector::encrypt(&second.public(), &[1]).unwrap())
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn single_node_matches_key_pair() {
        let authority = CollectiveAuthority::generate(1);
        assert_eq!(authority.public(), authority.nodes()[0].public);
        assert_eq!(authority.nodes()[0].name, "node-0");
    }
}
