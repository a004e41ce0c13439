//! Per-route metric evaluation.

use serde::Serialize;

use crate::domain::CandidatePath;
use crate::network::{NetworkError, RoadGraph};

/// Share of the safety factor taken from node scores; edges get the rest.
const SAFETY_NODE_WEIGHT: f64 = 0.4;
const SAFETY_EDGE_WEIGHT: f64 = 0.6;

/// Share of the comfort factor taken from node scores; edges get the rest.
const COMFORT_NODE_WEIGHT: f64 = 0.3;
const COMFORT_EDGE_WEIGHT: f64 = 0.7;

/// Raw, un-normalized metrics of one candidate path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteMetrics {
    pub safety_factor: f64,
    pub comfort_factor: f64,
    /// Sum of node street counts, a proxy for intersection density.
    pub street_count: u64,
    /// Share of hops ridden on cycleways, in `[0, 1]`.
    pub cycle_coverage: f64,
    /// Recorded casualties along the path.
    pub incident_count: u64,
    /// Length in metres.
    pub total_length: f64,
}

/// Running sum of the scores that are present.
#[derive(Default)]
struct ScoreMean {
    sum: f64,
    count: usize,
}

impl ScoreMean {
    fn add(&mut self, score: Option<f64>) {
        if let Some(s) = score {
            self.sum += s;
            self.count += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Blend node and edge means; a side with no scores contributes nothing.
fn blend(nodes: &ScoreMean, node_weight: f64, edges: &ScoreMean, edge_weight: f64) -> f64 {
    nodes.mean().map_or(0.0, |m| node_weight * m) + edges.mean().map_or(0.0, |m| edge_weight * m)
}

/// Compute the metrics of `path` on `graph`.
///
/// Node attributes come from every node on the path. Edge attributes come
/// from the lowest-key edge of each hop, while the length is that of the
/// route projection, so it matches the geometry that gets drawn.
///
/// # Errors
///
/// Returns `UnknownNode` or `MissingEdge` if the path does not exist in the
/// graph.
pub fn evaluate<G: RoadGraph + ?Sized>(
    path: &CandidatePath,
    graph: &G,
) -> Result<RouteMetrics, NetworkError> {
    let mut node_safety = ScoreMean::default();
    let mut node_comfort = ScoreMean::default();
    let mut street_count = 0u64;

    for &id in path.nodes() {
        let node = graph.node(id).ok_or(NetworkError::UnknownNode(id))?;
        node_safety.add(node.safety_score);
        node_comfort.add(node.comfort_score);
        street_count += u64::from(node.street_count.unwrap_or(0));
    }

    let mut edge_safety = ScoreMean::default();
    let mut edge_comfort = ScoreMean::default();
    let mut cycleway_hops = 0usize;
    let mut incident_count = 0u64;

    for (from, to) in path.hops() {
        let edge = graph
            .first_edge(from, to)
            .ok_or(NetworkError::MissingEdge { from, to })?;
        edge_safety.add(edge.safety_score);
        edge_comfort.add(edge.comfort_score);
        if edge.is_cycleway() {
            cycleway_hops += 1;
        }
        incident_count += u64::from(edge.casualty_count.unwrap_or(0));
    }

    let hops = path.edge_count();
    let cycle_coverage = if hops == 0 {
        0.0
    } else {
        cycleway_hops as f64 / hops as f64
    };

    Ok(RouteMetrics {
        safety_factor: blend(
            &node_safety,
            SAFETY_NODE_WEIGHT,
            &edge_safety,
            SAFETY_EDGE_WEIGHT,
        ),
        comfort_factor: blend(
            &node_comfort,
            COMFORT_NODE_WEIGHT,
            &edge_comfort,
            COMFORT_EDGE_WEIGHT,
        ),
        street_count,
        cycle_coverage,
        incident_count,
        total_length: graph.project_route(path)?.total_length(),
    })
}
