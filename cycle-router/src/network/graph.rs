//! Road graph access and the in-memory road network.

use std::collections::{HashMap, HashSet};
use std::fmt;

use geo::Coord;
use rstar::RTree;
use rstar::primitives::GeomWithData;

use crate::domain::{CandidatePath, EdgeKey, NodeId, RoadEdge, RoadNode};

use super::error::NetworkError;

/// Longest edge the network accepts, in metres.
///
/// Keeps millimetre path costs far from `u64` overflow.
pub const MAX_EDGE_LENGTH: f64 = 10_000_000.0;

/// R-tree entry: `[lon, lat]` position tagged with its node id.
pub(super) type NodeEntry = GeomWithData<[f64; 2], NodeId>;

/// Read-only access to node and edge attributes.
///
/// Implementors only need to provide node lookup and the parallel edges
/// between an ordered node pair; everything else is derived.
pub trait RoadGraph {
    /// Look up a node by id.
    fn node(&self, id: NodeId) -> Option<&RoadNode>;

    /// Parallel edges from `from` to `to`, ordered by ascending key.
    ///
    /// Empty when the nodes are not connected in that direction.
    fn edges(&self, from: NodeId, to: NodeId) -> &[RoadEdge];

    /// Look up one specific parallel edge.
    fn edge(&self, from: NodeId, to: NodeId, key: EdgeKey) -> Option<&RoadEdge> {
        self.edges(from, to).iter().find(|e| e.key == key)
    }

    fn has_edge(&self, from: NodeId, to: NodeId, key: EdgeKey) -> bool {
        self.edge(from, to, key).is_some()
    }

    /// The lowest-key edge between two nodes.
    fn first_edge(&self, from: NodeId, to: NodeId) -> Option<&RoadEdge> {
        self.edges(from, to).first()
    }

    /// Project a path onto concrete edges for display.
    ///
    /// Each hop uses its shortest parallel edge (lowest key on ties). The
    /// returned segments are the single source of both the reported route
    /// length and the drawn geometry.
    ///
    /// # Errors
    ///
    /// Returns `MissingEdge` if a hop has no edge, or `UnknownNode` if an
    /// edge without geometry has an endpoint missing from the graph.
    fn project_route(&self, path: &CandidatePath) -> Result<RouteProjection, NetworkError> {
        let mut segments = Vec::with_capacity(path.edge_count());

        for (from, to) in path.hops() {
            let edge = self
                .edges(from, to)
                .iter()
                .min_by(|a, b| a.length.total_cmp(&b.length))
                .ok_or(NetworkError::MissingEdge { from, to })?;

            let coords = match &edge.geometry {
                Some(line) => line.0.clone(),
                None => {
                    let a = self.node(from).ok_or(NetworkError::UnknownNode(from))?;
                    let b = self.node(to).ok_or(NetworkError::UnknownNode(to))?;
                    vec![a.coord(), b.coord()]
                }
            };

            segments.push(ProjectedSegment {
                from,
                to,
                key: edge.key,
                length: edge.length,
                coords,
            });
        }

        Ok(RouteProjection { segments })
    }
}

/// One hop of a projected route.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedSegment {
    pub from: NodeId,
    pub to: NodeId,
    /// Key of the parallel edge chosen for this hop.
    pub key: EdgeKey,
    /// Length in metres.
    pub length: f64,
    /// Drawn shape, `x` = lon, `y` = lat.
    pub coords: Vec<Coord<f64>>,
}

/// A path projected onto concrete edges.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteProjection {
    pub segments: Vec<ProjectedSegment>,
}

impl RouteProjection {
    /// Sum of segment lengths in metres.
    pub fn total_length(&self) -> f64 {
        self.segments.iter().map(|s| s.length).sum()
    }

    /// Concatenated geometry, without repeating the shared point where one
    /// segment ends and the next begins.
    pub fn coordinates(&self) -> Vec<Coord<f64>> {
        let mut coords: Vec<Coord<f64>> = Vec::new();
        for segment in &self.segments {
            for &c in &segment.coords {
                if coords.last() != Some(&c) {
                    coords.push(c);
                }
            }
        }
        coords
    }
}

/// An immutable in-memory directed multigraph of the road network.
///
/// Built once at startup (see [`RoadNetworkBuilder`]) and then shared
/// read-only between requests.
pub struct RoadNetwork {
    nodes: HashMap<NodeId, RoadNode>,
    edges: HashMap<(NodeId, NodeId), Vec<RoadEdge>>,
    successors: HashMap<NodeId, Vec<NodeId>>,
    index: RTree<NodeEntry>,
    edge_count: usize,
}

impl RoadNetwork {
    /// Start building a network.
    pub fn builder() -> RoadNetworkBuilder {
        RoadNetworkBuilder::default()
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges, counting parallel edges separately.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Nodes directly reachable from `id`, in ascending id order.
    pub fn successors(&self, id: NodeId) -> &[NodeId] {
        self.successors.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(super) fn index(&self) -> &RTree<NodeEntry> {
        &self.index
    }
}

impl fmt::Debug for RoadNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoadNetwork")
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edge_count)
            .finish()
    }
}

impl RoadGraph for RoadNetwork {
    fn node(&self, id: NodeId) -> Option<&RoadNode> {
        self.nodes.get(&id)
    }

    fn edges(&self, from: NodeId, to: NodeId) -> &[RoadEdge] {
        self.edges
            .get(&(from, to))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Builder for [`RoadNetwork`].
///
/// Validation happens in [`build`](Self::build), so nodes and edges may be
/// added in any order.
#[derive(Debug, Default)]
pub struct RoadNetworkBuilder {
    nodes: HashMap<NodeId, RoadNode>,
    edges: Vec<(NodeId, NodeId, RoadEdge)>,
}

impl RoadNetworkBuilder {
    /// Add a node, replacing any earlier node with the same id.
    pub fn add_node(&mut self, node: RoadNode) -> &mut Self {
        self.nodes.insert(node.id, node);
        self
    }

    /// Add a directed edge from `from` to `to`.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, edge: RoadEdge) -> &mut Self {
        self.edges.push((from, to, edge));
        self
    }

    /// Validate and build the network.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGraph` if a node position is not finite, an edge
    /// refers to an unknown node, an edge length is negative, not finite or
    /// above [`MAX_EDGE_LENGTH`], or two parallel edges share a key.
    pub fn build(self) -> Result<RoadNetwork, NetworkError> {
        for node in self.nodes.values() {
            if !node.lat.is_finite() || !node.lon.is_finite() {
                return Err(NetworkError::InvalidGraph(format!(
                    "node {} has a non-finite position",
                    node.id
                )));
            }
        }

        let edge_count = self.edges.len();
        let mut edges: HashMap<(NodeId, NodeId), Vec<RoadEdge>> = HashMap::new();
        let mut successors: HashMap<NodeId, Vec<NodeId>> = HashMap::new();

        for (from, to, edge) in self.edges {
            for endpoint in [from, to] {
                if !self.nodes.contains_key(&endpoint) {
                    return Err(NetworkError::InvalidGraph(format!(
                        "edge {from} -> {to} refers to unknown node {endpoint}"
                    )));
                }
            }
            if !(0.0..=MAX_EDGE_LENGTH).contains(&edge.length) {
                return Err(NetworkError::InvalidGraph(format!(
                    "edge {from} -> {to} has invalid length {}",
                    edge.length
                )));
            }
            edges.entry((from, to)).or_default().push(edge);
            successors.entry(from).or_default().push(to);
        }

        for ((from, to), parallel) in edges.iter_mut() {
            parallel.sort_by_key(|e| e.key);
            let mut seen = HashSet::new();
            if let Some(dup) = parallel.iter().find(|e| !seen.insert(e.key)) {
                return Err(NetworkError::InvalidGraph(format!(
                    "duplicate edge key {} between {from} and {to}",
                    dup.key.0
                )));
            }
        }

        for next in successors.values_mut() {
            next.sort();
            next.dedup();
        }

        let index = RTree::bulk_load(
            self.nodes
                .values()
                .map(|n| GeomWithData::new([n.lon, n.lat], n.id))
                .collect(),
        );

        Ok(RoadNetwork {
            nodes: self.nodes,
            edges,
            successors,
            index,
            edge_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::LineString;

    fn n(id: i64) -> NodeId {
        NodeId(id)
    }

    fn square() -> RoadNetwork {
        let mut builder = RoadNetwork::builder();
        builder
            .add_node(RoadNode::new(n(1), 0.0, 0.0))
            .add_node(RoadNode::new(n(2), 0.001, 0.0))
            .add_node(RoadNode::new(n(3), 0.001, 0.001))
            .add_edge(n(1), n(2), RoadEdge::new(EdgeKey(1), 120.0))
            .add_edge(n(1), n(2), RoadEdge::new(EdgeKey(0), 150.0))
            .add_edge(n(2), n(3), RoadEdge::new(EdgeKey(0), 110.0));
        builder.build().unwrap()
    }

    #[test]
    fn parallel_edges_sorted_by_key() {
        let network = square();
        let keys: Vec<_> = network.edges(n(1), n(2)).iter().map(|e| e.key).collect();

        assert_eq!(keys, vec![EdgeKey(0), EdgeKey(1)]);
        assert_eq!(network.first_edge(n(1), n(2)).unwrap().length, 150.0);
        assert!(network.has_edge(n(1), n(2), EdgeKey(1)));
        assert!(!network.has_edge(n(2), n(1), EdgeKey(0)));
        assert_eq!(network.edge_count(), 3);
    }

    #[test]
    fn projection_uses_shortest_parallel_edge() {
        let network = square();
        let path = CandidatePath::new(vec![n(1), n(2), n(3)]).unwrap();
        let projection = network.project_route(&path).unwrap();

        assert_eq!(projection.segments[0].key, EdgeKey(1));
        assert_eq!(projection.total_length(), 230.0);
        // Shared joint is not repeated
        assert_eq!(projection.coordinates().len(), 3);
    }

    #[test]
    fn projection_prefers_edge_geometry() {
        let mut builder = RoadNetwork::builder();
        let bend = LineString::from(vec![(0.0, 0.0), (0.0005, 0.0002), (0.001, 0.0)]);
        builder
            .add_node(RoadNode::new(n(1), 0.0, 0.0))
            .add_node(RoadNode::new(n(2), 0.001, 0.0))
            .add_edge(
                n(1),
                n(2),
                RoadEdge::new(EdgeKey(0), 80.0).with_geometry(bend),
            );
        let network = builder.build().unwrap();
        let path = CandidatePath::new(vec![n(1), n(2)]).unwrap();

        let coords = network.project_route(&path).unwrap().coordinates();
        assert_eq!(coords.len(), 3);
        assert_eq!(coords[1], Coord { x: 0.0005, y: 0.0002 });
    }

    #[test]
    fn projection_fails_on_disconnected_hop() {
        let network = square();
        let path = CandidatePath::new(vec![n(3), n(1)]).unwrap();

        assert!(matches!(
            network.project_route(&path),
            Err(NetworkError::MissingEdge { .. })
        ));
    }

    #[test]
    fn build_rejects_dangling_edge() {
        let mut builder = RoadNetwork::builder();
        builder
            .add_node(RoadNode::new(n(1), 0.0, 0.0))
            .add_edge(n(1), n(9), RoadEdge::new(EdgeKey(0), 10.0));

        assert!(matches!(
            builder.build(),
            Err(NetworkError::InvalidGraph(_))
        ));
    }

    #[test]
    fn build_rejects_negative_length() {
        let mut builder = RoadNetwork::builder();
        builder
            .add_node(RoadNode::new(n(1), 0.0, 0.0))
            .add_node(RoadNode::new(n(2), 0.0, 0.0))
            .add_edge(n(1), n(2), RoadEdge::new(EdgeKey(0), -1.0));

        assert!(builder.build().is_err());
    }

    #[test]
    fn build_rejects_oversized_length() {
        let mut builder = RoadNetwork::builder();
        builder
            .add_node(RoadNode::new(n(1), 0.0, 0.0))
            .add_node(RoadNode::new(n(2), 0.0, 0.0))
            .add_edge(n(1), n(2), RoadEdge::new(EdgeKey(0), 1e300));

        assert!(matches!(
            builder.build(),
            Err(NetworkError::InvalidGraph(msg)) if msg.contains("invalid length")
        ));
    }

    #[test]
    fn build_accepts_longest_allowed_edge() {
        let mut builder = RoadNetwork::builder();
        builder
            .add_node(RoadNode::new(n(1), 0.0, 0.0))
            .add_node(RoadNode::new(n(2), 0.0, 0.0))
            .add_edge(n(1), n(2), RoadEdge::new(EdgeKey(0), MAX_EDGE_LENGTH));

        assert!(builder.build().is_ok());
    }

    #[test]
    fn build_rejects_duplicate_keys() {
        let mut builder = RoadNetwork::builder();
        builder
            .add_node(RoadNode::new(n(1), 0.0, 0.0))
            .add_node(RoadNode::new(n(2), 0.0, 0.0))
            .add_edge(n(1), n(2), RoadEdge::new(EdgeKey(0), 1.0))
            .add_edge(n(1), n(2), RoadEdge::new(EdgeKey(0), 2.0));

        assert!(builder.build().is_err());
    }

    #[test]
    fn successors_are_deduplicated() {
        let network = square();
        assert_eq!(network.successors(n(1)), &[n(2)]);
        assert!(network.successors(n(3)).is_empty());
    }
}
