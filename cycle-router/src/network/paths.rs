//! Shortest and k-shortest path search over the road network.

use pathfinding::prelude::{dijkstra, yen};

use crate::domain::{CandidatePath, NodeId};

use super::graph::{RoadGraph, RoadNetwork};

/// Finds candidate paths between two nodes, weighted by edge length.
pub trait PathEnumerator {
    /// The single shortest path, or `None` if `to` is unreachable.
    fn shortest_path(&self, from: NodeId, to: NodeId) -> Option<CandidatePath>;

    /// Up to `k` distinct loopless paths in ascending length order.
    ///
    /// Returns fewer than `k` when fewer exist and an empty list when `to`
    /// is unreachable or `k` is zero.
    fn k_shortest_paths(&self, from: NodeId, to: NodeId, k: usize) -> Vec<CandidatePath>;
}

/// Path cost in whole millimetres, so costs are totally ordered.
///
/// Edge lengths are bounded by [`MAX_EDGE_LENGTH`](super::graph::MAX_EDGE_LENGTH),
/// so path sums stay far below `u64::MAX`.
fn cost(length: f64) -> u64 {
    (length * 1000.0).round() as u64
}

impl RoadNetwork {
    /// Successors of `id` weighted by their lightest parallel edge.
    fn weighted_successors(&self, id: NodeId) -> Vec<(NodeId, u64)> {
        self.successors(id)
            .iter()
            .filter_map(|&next| {
                self.edges(id, next)
                    .iter()
                    .map(|e| cost(e.length))
                    .min()
                    .map(|c| (next, c))
            })
            .collect()
    }
}

impl PathEnumerator for RoadNetwork {
    fn shortest_path(&self, from: NodeId, to: NodeId) -> Option<CandidatePath> {
        if from == to {
            return None;
        }
        let (nodes, _) = dijkstra(&from, |&n| self.weighted_successors(n), |&n| n == to)?;
        CandidatePath::new(nodes).ok()
    }

    fn k_shortest_paths(&self, from: NodeId, to: NodeId, k: usize) -> Vec<CandidatePath> {
        if k == 0 || from == to {
            return Vec::new();
        }
        yen(&from, |&n| self.weighted_successors(n), |&n| n == to, k)
            .into_iter()
            .filter_map(|(nodes, _)| CandidatePath::new(nodes).ok())
            .collect()
    }
}
