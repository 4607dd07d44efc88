//! The survey aggregation pipeline.
//!
//! A round moves client responses through these phases:
//!
//! 1. local collection and pre-aggregation by raw ciphertext bytes
//! 2. deterministic switching of the pending grouping attributes (external)
//! 3. local grouping by [`GroupingKey`]
//! 4. collective combination across the authority's nodes (external transport)
//! 5. key switching to the querier (external) and delivery
//!
//! [`store::SurveyStore`] owns the state of one node, [`round::run_round`]
//! drives a complete round over several nodes.
use std::collections::BTreeMap;
use crate::error::{ColaggError, Result};
use crate::primitives::{
    deterministic::{DeterministicAttributes, GroupingKey},
    dlog::DiscreteLogTable,
    elgamal::KeyPair,
    vector::CipherVector,
};
#[cfg(feature = "serde")]
use serde::{Serialize, Deserialize};
#[cfg(feature = "borsh")]
use borsh::{BorshSerialize, BorshDeserialize};

pub mod ids;
pub mod keys;
pub mod round;
pub mod shared;
pub mod store;

/// A response as submitted by a client. An empty grouping vector puts the
/// response in the default group.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClientResponse {
    pub probabilistic_grouping_attributes: CipherVector,
    pub aggregating_attributes: CipherVector,
}

impl ClientResponse {
    pub fn new(grouping: CipherVector, aggregating: CipherVector) -> ClientResponse {
        ClientResponse {
            probabilistic_grouping_attributes: grouping,
            aggregating_attributes: aggregating,
        }
    }

    /// A response belonging to the default group.
    pub fn ungrouped(aggregating: CipherVector) -> ClientResponse {
        ClientResponse::new(CipherVector::default(), aggregating)
    }
}

/// Identity of a group: its deterministic representative, used for
/// comparison, and one probabilistic encryption of the same attributes, used
/// for delivery to the querier.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroupIdentity {
    pub deterministic: DeterministicAttributes,
    pub attributes: CipherVector,
}

/// Groups and their aggregated vectors, keyed by grouping key. Used both for
/// the result of one node and for the combination over all nodes.
#[derive(Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroupingResult {
    pub groups: BTreeMap<GroupingKey, GroupIdentity>,
    pub aggregates: BTreeMap<GroupingKey, CipherVector>,
}

impl GroupingResult {
    /// Builds a result from its two halves, which must cover the same keys.
    pub fn new(
        groups: BTreeMap<GroupingKey, GroupIdentity>,
        aggregates: BTreeMap<GroupingKey, CipherVector>,
    ) -> Result<GroupingResult> {
        let result = GroupingResult { groups, aggregates };
        result.check_paired()?;
        Ok(result)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn check_paired(&self) -> Result<()> {
        if let Some(key) = self.groups.keys().find(|k| !self.aggregates.contains_key(*k)) {
            return Err(ColaggError::UnpairedGroup(*key));
        }
        if let Some(key) = self.aggregates.keys().find(|k| !self.groups.contains_key(*k)) {
            return Err(ColaggError::UnpairedGroup(*key));
        }
        Ok(())
    }

    /// Checks that a group with these deterministic attributes and this
    /// aggregate can be added under `key`.
    fn check_group(
        &self,
        key: &GroupingKey,
        deterministic: &DeterministicAttributes,
        aggregate: &CipherVector,
    ) -> Result<()> {
        if let Some(existing) = self.groups.get(key) {
            if existing.deterministic != *deterministic {
                return Err(ColaggError::DuplicateGroupKey(*key));
            }
        }
        if let Some(mine) = self.aggregates.get(key) {
            mine.check_len(aggregate)?;
        }
        Ok(())
    }

    /// Adds one group member. A new key keeps `attributes` as the group's
    /// probabilistic representative, an existing key sums `aggregate` into
    /// its aggregate. Nothing changes on error.
    pub fn add_group(
        &mut self,
        key: GroupingKey,
        deterministic: &DeterministicAttributes,
        attributes: &CipherVector,
        aggregate: &CipherVector,
    ) -> Result<()> {
        self.check_group(&key, deterministic, aggregate)?;
        self.groups.entry(key).or_insert_with(|| GroupIdentity {
            deterministic: deterministic.clone(),
            attributes: attributes.clone(),
        });
        match self.aggregates.get_mut(&key) {
            Some(mine) => mine.add_assign(aggregate)?,
            None => {
                self.aggregates.insert(key, aggregate.clone());
            }
        }
        Ok(())
    }

    /// Adds `other` into `self`: identities are united, aggregates of a key
    /// present on both sides are summed. Nothing changes on error.
    pub fn combine(&mut self, other: &GroupingResult) -> Result<()> {
        other.check_paired()?;
        let pairs: Vec<(&GroupingKey, &GroupIdentity, &CipherVector)> = other
            .groups
            .iter()
            .filter_map(|(key, identity)| other.aggregates.get(key).map(|aggregate| (key, identity, aggregate)))
            .collect();
        for (key, identity, aggregate) in pairs.iter() {
            self.check_group(key, &identity.deterministic, aggregate)?;
        }
        for (key, identity, aggregate) in pairs {
            self.add_group(*key, &identity.deterministic, &identity.attributes, aggregate)?;
        }
        Ok(())
    }
}

/// One final group, encrypted for the querier.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeliverableRecord {
    pub grouping_attributes: CipherVector,
    pub aggregating_attributes: CipherVector,
}

impl DeliverableRecord {
    /// Decrypts both halves with the querier's key pair.
    pub fn decrypt(&self, querier: &KeyPair, table: &DiscreteLogTable) -> Result<(Vec<i64>, Vec<i64>)> {
        Ok((
            self.grouping_attributes.decrypt(querier, table)?,
            self.aggregating_attributes.decrypt(querier, table)?,
        ))
    }
}

/// Decrypts every record, in order.
pub fn decrypt_deliverables(
    records: &[DeliverableRecord],
    querier: &KeyPair,
    table: &DiscreteLogTable,
) -> Result<Vec<(Vec<i64>, Vec<i64>)>> {
    records.iter().map(|r| r.decrypt(querier, table)).collect()
}
