//! Candidate paths through the road network.

use serde::Serialize;

use super::error::DomainError;
use super::graph::NodeId;

/// An ordered sequence of road network nodes to ride along.
///
/// # Invariants
///
/// - At least two nodes (one hop)
///
/// Whether consecutive nodes are actually connected is a property of a
/// particular graph and is checked when the path is evaluated against it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CandidatePath(Vec<NodeId>);

impl CandidatePath {
    /// Constructs a path from node ids.
    ///
    /// # Errors
    ///
    /// Returns `Err` if fewer than two nodes are given.
    ///
    /// # Examples
    ///
    /// ```
    /// use cycle_router::domain::{CandidatePath, NodeId};
    ///
    /// let path = CandidatePath::new(vec![NodeId(1), NodeId(2), NodeId(3)]).unwrap();
    /// assert_eq!(path.edge_count(), 2);
    ///
    /// assert!(CandidatePath::new(vec![NodeId(1)]).is_err());
    /// ```
    pub fn new(nodes: Vec<NodeId>) -> Result<Self, DomainError> {
        if nodes.len() < 2 {
            return Err(DomainError::PathTooShort(nodes.len()));
        }
        Ok(Self(nodes))
    }

    /// Returns the nodes in riding order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.0
    }

    /// Returns the number of hops (node count minus one).
    pub fn edge_count(&self) -> usize {
        self.0.len() - 1
    }

    /// Iterates consecutive `(from, to)` node pairs.
    pub fn hops(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.0.windows(2).map(|pair| (pair[0], pair[1]))
    }

    /// Returns the first node.
    pub fn origin(&self) -> NodeId {
        // Non-empty by construction
        self.0[0]
    }

    /// Returns the last node.
    pub fn destination(&self) -> NodeId {
        self.0[self.0.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(ids: &[i64]) -> Result<CandidatePath, DomainError> {
        CandidatePath::new(ids.iter().copied().map(NodeId).collect())
    }

    #[test]
    fn rejects_short_paths() {
        assert_eq!(path(&[]), Err(DomainError::PathTooShort(0)));
        assert_eq!(path(&[4]), Err(DomainError::PathTooShort(1)));
    }

    #[test]
    fn hops_are_consecutive_pairs() {
        let p = path(&[1, 2, 3]).unwrap();
        let hops: Vec<_> = p.hops().collect();

        assert_eq!(
            hops,
            vec![(NodeId(1), NodeId(2)), (NodeId(2), NodeId(3))]
        );
        assert_eq!(p.origin(), NodeId(1));
        assert_eq!(p.destination(), NodeId(3));
    }

    #[test]
    fn serializes_as_plain_id_list() {
        let p = path(&[10, 20]).unwrap();
        assert_eq!(serde_json::to_string(&p).unwrap(), "[10,20]");
    }
}
