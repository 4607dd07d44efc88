//! One complete aggregation round over all nodes of the authority.
//!
//! The driver only sequences the pipeline: every node hands its pending
//! grouping vectors to the authority for deterministic switching and groups
//! locally, the local results travel up the combination tree, the root
//! installs the collective result, has it switched to the querier key and
//! assembles the deliverables. A failing step aborts the round and names
//! the phase and node; no deliverable of an incomplete round is returned.
use rabe_bn::G1;
use tracing::info;
use crate::config::SurveyConfig;
use crate::error::{Phase, RoundError};
use crate::protocols::{
    switch_all_to_deterministic, switch_all_to_key,
    transport::{broadcast_collect, Announce, GroupCombination, TreeNode},
    DeterministicSwitching, KeySwitching,
};
use crate::survey::{store::SurveyStore, DeliverableRecord};

/// Runs a round over `nodes`; the first node is the root of the combination
/// tree and assembles the deliverables for the holder of `querier`.
pub fn run_round<A>(
    nodes: &mut [SurveyStore],
    authority: &A,
    querier: &G1,
    config: &SurveyConfig,
) -> Result<Vec<DeliverableRecord>, RoundError>
where
    A: DeterministicSwitching + KeySwitching + ?Sized,
{
    for node in nodes.iter_mut() {
        let pending = node.poll_probabilistic_grouping_attributes();
        let switched = switch_all_to_deterministic(authority, &pending)
            .map_err(|e| RoundError::new(Phase::DeterministicSwitching, node.name(), e))?;
        node.push_deterministic_grouping_attributes(switched)
            .map_err(|e| RoundError::new(Phase::LocalGrouping, node.name(), e))?;
    }

    let locals = nodes
        .iter()
        .map(|node| (node.name().to_string(), node.local_grouping().clone()))
        .collect();
    let tree = match TreeNode::balanced(locals, config.branching) {
        Some(tree) => tree,
        None => return Ok(Vec::new()),
    };
    let combined = broadcast_collect(&tree, &GroupCombination, &Announce::new("combine groups"))
        .map_err(|e| RoundError::new(Phase::CollectiveCombination, &tree.name, e))?;

    let root = match nodes.first_mut() {
        Some(root) => root,
        None => return Ok(Vec::new()),
    };
    root.push_cothority_aggregated_groups(combined.groups, combined.aggregates)
        .map_err(|e| RoundError::new(Phase::CollectiveCombination, root.name(), e))?;

    let grouping = switch_all_to_key(authority, &root.poll_cothority_grouping_attributes(), querier)
        .map_err(|e| RoundError::new(Phase::KeySwitching, root.name(), e))?;
    let aggregates = switch_all_to_key(authority, &root.poll_cothority_aggregated_groups_attr(), querier)
        .map_err(|e| RoundError::new(Phase::KeySwitching, root.name(), e))?;
    root.push_querier_key_encrypted_data(grouping, aggregates)
        .map_err(|e| RoundError::new(Phase::Delivery, root.name(), e))?;

    let deliverables = root.poll_deliverable_results();
    info!(node = %root.name(), round = root.round(), groups = deliverables.len(), "round complete");
    Ok(deliverables)
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::error::ColaggError;
    use crate::primitives::{elgamal::KeyPair, vector::CipherVector};
    use crate::protocols::collective::CollectiveAuthority;
    use crate::survey::{decrypt_deliverables, ClientResponse};

    fn insert(store: &mut SurveyStore, pk: &G1, grouping: &[i64], aggregating: &[i64]) {
        store
            .insert_client_response(ClientResponse::new(
                CipherVector::encrypt(pk, grouping).unwrap(),
                CipherVector::encrypt(pk, aggregating).unwrap(),
            ))
            .unwrap();
    }

    #[test]
    fn three_node_round() {
        let authority = CollectiveAuthority::generate(3);
        let pk = authority.public();
        let querier = KeyPair::generate();
        let config = SurveyConfig::default().with_dlog_bound(100);
        let mut nodes: Vec<SurveyStore> = (0..3).map(|i| SurveyStore::new(&format!("node-{}", i))).collect();
        insert(&mut nodes[0], &pk, &[1, 0], &[1, 10]);
        insert(&mut nodes[0], &pk, &[0, 1], &[1, 20]);
        insert(&mut nodes[1], &pk, &[1, 0], &[1, 30]);
        insert(&mut nodes[2], &pk, &[1, 0], &[1, 5]);
        insert(&mut nodes[2], &pk, &[0, 1], &[1, 1]);

        let deliverables = run_round(&mut nodes, &authority, &querier.public, &config).unwrap();
        let mut results = decrypt_deliverables(&deliverables, &querier, &config.dlog_table()).unwrap();
        results.sort();
        assert_eq!(results, vec![(vec![0, 1], vec![2, 21]), (vec![1, 0], vec![3, 45])]);
    }

    #[test]
    fn failed_round_names_phase() {
        let authority = CollectiveAuthority::generate(2);
        let pk = authority.public();
        let querier = KeyPair::generate();
        let mut nodes = vec![SurveyStore::new("root"), SurveyStore::new("leaf")];
        insert(&mut nodes[0], &pk, &[1], &[1, 1]);
        insert(&mut nodes[1], &pk, &[1], &[1, 1, 1]);
        let error = run_round(&mut nodes, &authority, &querier.public, &SurveyConfig::default()).unwrap_err();
        assert_eq!(error.phase, Phase::CollectiveCombination);
        assert!(matches!(error.source, ColaggError::VectorLengthMismatch { .. }));
        assert!(nodes[0].poll_deliverable_results().is_empty());
    }

    #[test]
    fn unbounded_branching() {
        let authority = CollectiveAuthority::generate(2);
        let pk = authority.public();
        let querier = KeyPair::generate();
        let config = SurveyConfig::default().with_dlog_bound(10).with_branching(usize::MAX);
        let mut nodes: Vec<SurveyStore> = (0..4).map(|i| SurveyStore::new(&format!("node-{}", i))).collect();
        for node in nodes.iter_mut() {
            insert(node, &pk, &[2], &[1]);
        }
        let deliverables = run_round(&mut nodes, &authority, &querier.public, &config).unwrap();
        let results = decrypt_deliverables(&deliverables, &querier, &config.dlog_table()).unwrap();
        assert_eq!(results, vec![(vec![2], vec![4])]);
    }

    #[test]
    fn empty_round() {
        let authority = CollectiveAuthority::generate(1);
        let querier = KeyPair::generate();
        let mut nodes: Vec<SurveyStore> = Vec::new();
        assert!(run_round(&mut nodes, &authority, &querier.public, &SurveyConfig::default())
            .unwrap()
            .is_empty());
    }
}
