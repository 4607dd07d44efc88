//! The per node state machine of an aggregation round.
//!
//! `SurveyStore` owns every buffer of the round and never performs I/O: the
//! results of switching and of the collective combination are computed
//! elsewhere and handed back through the `push_*` calls. Every mutating call
//! validates its input completely before touching any state, so a rejected
//! call leaves the store as it was.
//!
//! # Examples
//!
//! ```
//! use colagg::primitives::{dlog::DiscreteLogTable, elgamal::KeyPair, vector::CipherVector};
//! use colagg::survey::{store::SurveyStore, ClientResponse};
//! let keys = KeyPair::generate();
//! let mut store = SurveyStore::new("node-0");
//! let answer = CipherVector::encrypt(&keys.public, &[1, 0, 1]).unwrap();
//! store.insert_client_response(ClientResponse::ungrouped(answer.clone())).unwrap();
//! store.insert_client_response(ClientResponse::ungrouped(answer)).unwrap();
//! let aggregated = store.poll_locally_aggregated_responses();
//! assert_eq!(aggregated.len(), 1);
//! let table = DiscreteLogTable::new(10);
//! let sum = aggregated.values().next().unwrap().decrypt(&keys, &table).unwrap();
//! assert_eq!(sum, vec![2, 0, 2]);
//! ```
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};
use crate::error::{ColaggError, Result};
use crate::primitives::{
    deterministic::{DeterministicAttributes, GroupingKey},
    vector::CipherVector,
};
use crate::survey::{
    ids::{TempId, TempIdAllocator},
    keys::RawKey,
    ClientResponse, DeliverableRecord, GroupIdentity, GroupingResult,
};
#[cfg(feature = "serde")]
use serde::{Serialize, Deserialize};
#[cfg(feature = "borsh")]
use borsh::{BorshSerialize, BorshDeserialize};

/// Pre-aggregated responses sharing one raw key.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocalEntry {
    pub grouping: CipherVector,
    pub aggregate: CipherVector,
}

/// A pre-aggregated entry handed out for switching under a [`TempId`].
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct PendingEntry {
    raw: RawKey,
    entry: LocalEntry,
}

/// State of one node for one aggregation round.
///
/// The whole value is serializable, a restart safe deployment checkpoints it
/// keyed by [`SurveyStore::round`].
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SurveyStore {
    name: String,
    ids: TempIdAllocator,
    client_responses: Vec<ClientResponse>,
    local_aggregates: BTreeMap<RawKey, LocalEntry>,
    temp_ids: BTreeMap<RawKey, TempId>,
    pending: BTreeMap<TempId, PendingEntry>,
    local_grouping: GroupingResult,
    cothority_grouping: GroupingResult,
    deliverables: BTreeMap<GroupingKey, DeliverableRecord>,
}

impl SurveyStore {
    pub fn new(name: &str) -> SurveyStore {
        SurveyStore {
            name: name.to_string(),
            ids: TempIdAllocator::new(),
            client_responses: Vec::new(),
            local_aggregates: BTreeMap::new(),
            temp_ids: BTreeMap::new(),
            pending: BTreeMap::new(),
            local_grouping: GroupingResult::default(),
            cothority_grouping: GroupingResult::default(),
            deliverables: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn round(&self) -> u64 {
        self.ids.round()
    }

    /// Discards all round state. Identifiers of the previous round become unknown.
    pub fn new_round(&mut self) {
        self.ids.next_round();
        self.client_responses.clear();
        self.local_aggregates.clear();
        self.temp_ids.clear();
        self.pending.clear();
        self.local_grouping = GroupingResult::default();
        self.cothority_grouping = GroupingResult::default();
        self.deliverables.clear();
        info!(node = %self.name, round = self.round(), "new round");
    }

    /// Every response inserted this round, in insertion order.
    pub fn client_responses(&self) -> &[ClientResponse] {
        &self.client_responses
    }

    /// Stores `response` and pre-aggregates it with byte identical grouping
    /// vectors. Fails with `VectorLengthMismatch` when the aggregating vector
    /// does not fit the entry it would be added to.
    pub fn insert_client_response(&mut self, response: ClientResponse) -> Result<()> {
        let raw = RawKey::from_vector(&response.probabilistic_grouping_attributes)?;
        if let Some(existing) = self.local_aggregates.get(&raw) {
            existing.aggregate.check_len(&response.aggregating_attributes)?;
        }
        // later polls merge into the entry already handed out for switching
        if let Some(pending) = self.temp_ids.get(&raw).and_then(|id| self.pending.get(id)) {
            pending.entry.aggregate.check_len(&response.aggregating_attributes)?;
        }
        self.client_responses.push(response.clone());
        match self.local_aggregates.get_mut(&raw) {
            Some(existing) => existing.aggregate.add_assign(&response.aggregating_attributes)?,
            None => {
                self.local_aggregates.insert(raw.clone(), LocalEntry {
                    grouping: response.probabilistic_grouping_attributes,
                    aggregate: response.aggregating_attributes,
                });
            }
        }
        debug!(node = %self.name, key = %raw, responses = self.client_responses.len(), "inserted client response");
        Ok(())
    }

    /// Returns the pre-aggregated vectors collected since the last poll and
    /// empties the buffer. The response log is not affected.
    pub fn poll_locally_aggregated_responses(&mut self) -> BTreeMap<RawKey, CipherVector> {
        let drained = std::mem::take(&mut self.local_aggregates);
        debug!(node = %self.name, entries = drained.len(), "drained local aggregates");
        drained.into_iter().map(|(raw, entry)| (raw, entry.aggregate)).collect()
    }

    /// Hands every outstanding grouping vector out for deterministic switching.
    ///
    /// Buffered entries move from the local buffer to the pending set, so they
    /// can no longer be drained by [`SurveyStore::poll_locally_aggregated_responses`].
    /// A raw key that already owns a pending id keeps it; the full pending set
    /// is returned on every call.
    pub fn poll_probabilistic_grouping_attributes(&mut self) -> BTreeMap<TempId, CipherVector> {
        let buffered = std::mem::take(&mut self.local_aggregates);
        for (raw, entry) in buffered {
            let pending = self.temp_ids.get(&raw).and_then(|id| self.pending.get_mut(id));
            match pending {
                Some(pending) => {
                    if let Err(e) = pending.entry.aggregate.add_assign(&entry.aggregate) {
                        // insertion checks lengths against pending entries
                        warn!(node = %self.name, key = %raw, error = %e, "could not merge into pending entry");
                        self.local_aggregates.insert(raw, entry);
                    }
                }
                None => {
                    let id = self.ids.allocate();
                    self.temp_ids.insert(raw.clone(), id);
                    self.pending.insert(id, PendingEntry { raw, entry });
                }
            }
        }
        debug!(node = %self.name, pending = self.pending.len(), "pending grouping attributes");
        self.pending
            .iter()
            .map(|(id, pending)| (*id, pending.entry.grouping.clone()))
            .collect()
    }

    /// Clusters the switched attributes by grouping key and sums the
    /// pre-aggregated vectors of every cluster. The result replaces the local
    /// grouping result; the consumed ids cannot be pushed again.
    pub fn push_deterministic_grouping_attributes(
        &mut self,
        attributes: BTreeMap<TempId, DeterministicAttributes>,
    ) -> Result<()> {
        let mut grouping = GroupingResult::default();
        for (id, deterministic) in attributes.iter() {
            let pending = match self.pending.get(id) {
                Some(pending) => pending,
                None => {
                    warn!(node = %self.name, id = %id, "rejecting unknown temporary id");
                    return Err(ColaggError::UnknownTempId(*id));
                }
            };
            if deterministic.len() != pending.entry.grouping.len() {
                return Err(ColaggError::VectorLengthMismatch {
                    expected: pending.entry.grouping.len(),
                    actual: deterministic.len(),
                });
            }
            let key = deterministic.key()?;
            grouping.add_group(key, deterministic, &pending.entry.grouping, &pending.entry.aggregate)?;
        }
        for id in attributes.keys() {
            if let Some(pending) = self.pending.remove(id) {
                self.temp_ids.remove(&pending.raw);
            }
        }
        info!(node = %self.name, ids = attributes.len(), groups = grouping.len(), "local grouping done");
        self.local_grouping = grouping;
        Ok(())
    }

    /// The groups found by the last deterministic grouping on this node.
    pub fn local_grouping(&self) -> &GroupingResult {
        &self.local_grouping
    }

    /// Installs the combination of all nodes' local grouping results,
    /// replacing any earlier collective result.
    pub fn push_cothority_aggregated_groups(
        &mut self,
        groups: BTreeMap<GroupingKey, GroupIdentity>,
        aggregates: BTreeMap<GroupingKey, CipherVector>,
    ) -> Result<()> {
        let result = GroupingResult::new(groups, aggregates)?;
        info!(node = %self.name, groups = result.len(), "collective grouping installed");
        self.cothority_grouping = result;
        Ok(())
    }

    pub fn cothority_grouping(&self) -> &GroupingResult {
        &self.cothority_grouping
    }

    pub fn poll_cothority_aggregated_groups_id(&self) -> BTreeSet<GroupingKey> {
        self.cothority_grouping.groups.keys().copied().collect()
    }

    pub fn poll_cothority_aggregated_groups_attr(&self) -> BTreeMap<GroupingKey, CipherVector> {
        self.cothority_grouping.aggregates.clone()
    }

    /// The probabilistic grouping vector representing each collective group,
    /// to be switched to the querier key alongside the aggregates.
    pub fn poll_cothority_grouping_attributes(&self) -> BTreeMap<GroupingKey, CipherVector> {
        self.cothority_grouping
            .groups
            .iter()
            .map(|(key, identity)| (*key, identity.attributes.clone()))
            .collect()
    }

    /// Joins the querier key encrypted halves into deliverable records.
    /// Both mappings must cover exactly the same keys.
    pub fn push_querier_key_encrypted_data(
        &mut self,
        grouping: BTreeMap<GroupingKey, CipherVector>,
        aggregates: BTreeMap<GroupingKey, CipherVector>,
    ) -> Result<()> {
        let unmatched = grouping
            .keys()
            .find(|k| !aggregates.contains_key(*k))
            .or_else(|| aggregates.keys().find(|k| !grouping.contains_key(*k)));
        if let Some(key) = unmatched {
            warn!(node = %self.name, key = %key, "incomplete delivery pair");
            return Err(ColaggError::IncompleteDeliveryPair(*key));
        }
        let mut aggregates = aggregates;
        for (key, grouping_attributes) in grouping {
            if let Some(aggregating_attributes) = aggregates.remove(&key) {
                self.deliverables.insert(key, DeliverableRecord {
                    grouping_attributes,
                    aggregating_attributes,
                });
            }
        }
        info!(node = %self.name, records = self.deliverables.len(), "deliverables assembled");
        Ok(())
    }

    /// Every record assembled so far, ordered by grouping key. Does not drain.
    pub fn poll_deliverable_results(&self) -> Vec<DeliverableRecord> {
        self.deliverables.values().cloned().collect()
    }

    /// Serializes the complete round state to CBOR.
    #[cfg(feature = "serde")]
    pub fn snapshot(&self) -> Result<Vec<u8>> {
        let bytes = serde_cbor::to_vec(self).map_err(|e| ColaggError::Snapshot(e.to_string()))?;
        debug!(node = %self.name, round = self.round(), bytes = bytes.len(), "snapshot written");
        Ok(bytes)
    }

    /// Restores a store written by [`SurveyStore::snapshot`].
    #[cfg(feature = "serde")]
    pub fn restore(bytes: &[u8]) -> Result<SurveyStore> {
        let store: SurveyStore = serde_cbor::from_slice(bytes).map_err(|e| ColaggError::Snapshot(e.to_string()))?;
        info!(node = %store.name, round = store.round(), "restored from snapshot");
        Ok(store)
    }
}
