//! Tree shaped broadcast/collect between the nodes of the authority.
//!
//! A request ([`Announce`]) travels from the root down to every child. Leaves
//! reply with their partial result, internal nodes combine the replies of
//! their children with their own local data and reply upward. The exchange is
//! modeled as a pure function over the tree so it can be driven by channels,
//! futures or plain recursion alike.
//!
//! # Examples
//!
//! ```
//! use colagg::protocols::transport::*;
//! let tree = TreeNode::balanced(vec![("a".to_string(), ()), ("b".to_string(), ()), ("c".to_string(), ())], 2).unwrap();
//! let reply = broadcast_collect(&tree, &CountDescendants, &Announce::new("count")).unwrap();
//! assert_eq!(reply.children_count, 3);
//! ```
use std::convert::Infallible;
use tracing::debug;
use crate::error::ColaggError;
use crate::survey::GroupingResult;
#[cfg(feature = "serde")]
use serde::{Serialize, Deserialize};
#[cfg(feature = "borsh")]
use borsh::{BorshSerialize, BorshDeserialize};

/// The request passed from a node to all of its children.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Announce {
    pub message: String,
}

impl Announce {
    pub fn new(message: &str) -> Announce {
        Announce { message: message.to_string() }
    }
}

/// The reply of the descendant counting protocol: the number of nodes in the
/// replying subtree, the replying node included.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reply {
    pub children_count: usize,
}

#[derive(Clone, PartialEq, Debug)]
pub struct TreeNode<L> {
    pub name: String,
    pub local: L,
    pub children: Vec<TreeNode<L>>,
}

impl<L> TreeNode<L> {
    pub fn new(name: &str, local: L) -> TreeNode<L> {
        TreeNode { name: name.to_string(), local, children: Vec::new() }
    }

    pub fn with_child(mut self, child: TreeNode<L>) -> TreeNode<L> {
        self.children.push(child);
        self
    }

    /// Arranges `nodes` into a complete tree where every internal node has up
    /// to `branching` children; the first node becomes the root. Returns
    /// `None` for an empty list.
    pub fn balanced(nodes: Vec<(String, L)>, branching: usize) -> Option<TreeNode<L>> {
        let branching = branching.max(1);
        let mut slots: Vec<Option<(String, L)>> = nodes.into_iter().map(Some).collect();
        Self::build(&mut slots, 0, branching)
    }

    fn build(slots: &mut Vec<Option<(String, L)>>, index: usize, branching: usize) -> Option<TreeNode<L>> {
        let (name, local) = slots.get_mut(index)?.take()?;
        let mut children = Vec::new();
        // children of `index` sit at `branching * index + 1 ..= branching * index + branching`
        let first = branching.checked_mul(index).and_then(|i| i.checked_add(1));
        if let Some(first) = first.filter(|first| *first < slots.len()) {
            let end = first.saturating_add(branching).min(slots.len());
            for child in first..end {
                if let Some(node) = Self::build(slots, child, branching) {
                    children.push(node);
                }
            }
        }
        Some(TreeNode { name, local, children })
    }

    /// Number of nodes in this subtree.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(|c| c.size()).sum::<usize>()
    }
}

/// A protocol run over the tree: how a node turns its local data and the
/// replies of its children into its own reply.
pub trait Collect<L> {
    type Reply;
    type Error;

    fn reply(
        &self,
        node: &str,
        announce: &Announce,
        local: &L,
        children: Vec<Self::Reply>,
    ) -> Result<Self::Reply, Self::Error>;
}

/// Announces `announce` down from `root` and collects the combined reply.
pub fn broadcast_collect<L, P>(root: &TreeNode<L>, protocol: &P, announce: &Announce) -> Result<P::Reply, P::Error>
where
    P: Collect<L>,
{
    let mut replies = Vec::with_capacity(root.children.len());
    for child in root.children.iter() {
        replies.push(broadcast_collect(child, protocol, announce)?);
    }
    debug!(node = %root.name, children = replies.len(), message = %announce.message, "replying");
    protocol.reply(&root.name, announce, &root.local, replies)
}

/// Counts the nodes of the tree
pub struct CountDescendants;

impl<L> Collect<L> for CountDescendants {
    type Reply = Reply;
    type Error = Infallible;

    fn reply(&self, _node: &str, _announce: &Announce, _local: &L, children: Vec<Reply>) -> Result<Reply, Infallible> {
        Ok(Reply {
            children_count: 1 + children.iter().map(|r| r.children_count).sum::<usize>(),
        })
    }
}

/// Sums the local grouping results of all nodes per grouping key.
pub struct GroupCombination;

impl Collect<GroupingResult> for GroupCombination {
    type Reply = GroupingResult;
    type Error = ColaggError;

    fn reply(
        &self,
        _node: &str,
        _announce: &Announce,
        local: &GroupingResult,
        children: Vec<GroupingResult>,
    ) -> Result<GroupingResult, ColaggError> {
        let mut combined = local.clone();
        for child in children.iter() {
            combined.combine(child)?;
        }
        Ok(combined)
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    fn named(n: usize) -> Vec<(String, ())> {
        (0..n).map(|i| (format!("n{}", i), ())).collect()
    }

    #[test]
    fn count_descendants() {
        for (n, branching) in [(1usize, 2usize), (2, 2), (7, 2), (10, 3), (5, 1)] {
            let tree = TreeNode::balanced(named(n), branching).unwrap();
            assert_eq!(tree.size(), n);
            let reply = broadcast_collect(&tree, &CountDescendants, &Announce::new("count")).unwrap();
            assert_eq!(reply.children_count, n);
        }
    }

    #[test]
    fn balanced_shape() {
        let tree = TreeNode::balanced(named(7), 2).unwrap();
        assert_eq!(tree.name, "n0");
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[0].name, "n1");
        assert_eq!(tree.children[1].children[1].name, "n6");
        assert!(TreeNode::<()>::balanced(Vec::new(), 2).is_none());
    }

    #[test]
    fn huge_branching_is_a_star() {
        let tree = TreeNode::balanced(named(3), usize::MAX).unwrap();
        assert_eq!(tree.children.len(), 2);
        assert!(tree.children.iter().all(|c| c.children.is_empty()));
        let reply = broadcast_collect(&tree, &CountDescendants, &Announce::new("count")).unwrap();
        assert_eq!(reply.children_count, 3);

        let chain = TreeNode::balanced(named(3), 0).unwrap();
        assert_eq!(chain.children[0].children[0].name, "n2");
    }

    #[test]
    fn manual_tree() {
        let tree = TreeNode::new("root", ())
            .with_child(TreeNode::new("left", ()).with_child(TreeNode::new("leaf", ())))
            .with_child(TreeNode::new("right", ()));
        let reply = broadcast_collect(&tree, &CountDescendants, &Announce::new("count")).unwrap();
        assert_eq!(reply.children_count, 4);
    }
}
