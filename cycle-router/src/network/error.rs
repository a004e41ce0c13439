//! Road network error types.

use std::path::PathBuf;

use crate::domain::NodeId;

/// Errors from loading or querying the road network.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// Graph file could not be read
    #[error("failed to read graph file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// GraphML is not well-formed XML
    #[error("GraphML parse error: {0}")]
    Xml(String),

    /// Graph content violates an invariant (missing position, bad length...)
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// A node id is not part of the graph
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// Consecutive path nodes are not connected
    #[error("no edge from node {from} to node {to}")]
    MissingEdge { from: NodeId, to: NodeId },

    /// Nearest-node lookup on a graph with no nodes
    #[error("road network has no nodes to snap to")]
    EmptyIndex,

    /// Nearest-node lookup with an impossible coordinate
    #[error("invalid coordinate (lat {lat}, lon {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },
}
