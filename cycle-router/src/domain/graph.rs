//! Road network node and edge attributes.
//!
//! Scores and counts that a network export may or may not carry are
//! modelled as `Option`, so "absent" is never confused with zero.

use std::fmt;

use geo::{Coord, LineString};
use serde::Serialize;

/// `highway` tag value of dedicated cycle lanes.
pub const CYCLEWAY: &str = "cycleway";

/// Opaque road network node identifier (an OSM node id in practice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Secondary key distinguishing parallel edges between the same node pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(transparent)]
pub struct EdgeKey(pub u32);

/// A road network node (junction or shape point).
#[derive(Debug, Clone, PartialEq)]
pub struct RoadNode {
    pub id: NodeId,
    /// Longitude (`x`).
    pub lon: f64,
    /// Latitude (`y`).
    pub lat: f64,
    /// Number of streets meeting at this node.
    pub street_count: Option<u32>,
    pub safety_score: Option<f64>,
    pub comfort_score: Option<f64>,
}

impl RoadNode {
    /// Create a node with a position and no attributes.
    pub fn new(id: NodeId, lon: f64, lat: f64) -> Self {
        Self {
            id,
            lon,
            lat,
            street_count: None,
            safety_score: None,
            comfort_score: None,
        }
    }

    pub fn with_street_count(mut self, count: u32) -> Self {
        self.street_count = Some(count);
        self
    }

    pub fn with_safety(mut self, score: f64) -> Self {
        self.safety_score = Some(score);
        self
    }

    pub fn with_comfort(mut self, score: f64) -> Self {
        self.comfort_score = Some(score);
        self
    }

    /// Position as an `x`/`y` (lon/lat) coordinate.
    pub fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }
}

/// A directed road segment between two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadEdge {
    pub key: EdgeKey,
    /// Length in metres.
    pub length: f64,
    /// OSM `highway` tag, e.g. `"residential"` or `"cycleway"`.
    pub highway: Option<String>,
    pub safety_score: Option<f64>,
    pub comfort_score: Option<f64>,
    /// Recorded road casualties on this segment.
    pub casualty_count: Option<u32>,
    /// Drawn shape; a straight line between the end nodes when absent.
    pub geometry: Option<LineString<f64>>,
}

impl RoadEdge {
    /// Create an edge with a key and length and no other attributes.
    pub fn new(key: EdgeKey, length: f64) -> Self {
        Self {
            key,
            length,
            highway: None,
            safety_score: None,
            comfort_score: None,
            casualty_count: None,
            geometry: None,
        }
    }

    pub fn with_highway(mut self, highway: impl Into<String>) -> Self {
        self.highway = Some(highway.into());
        self
    }

    pub fn with_safety(mut self, score: f64) -> Self {
        self.safety_score = Some(score);
        self
    }

    pub fn with_comfort(mut self, score: f64) -> Self {
        self.comfort_score = Some(score);
        self
    }

    pub fn with_casualties(mut self, count: u32) -> Self {
        self.casualty_count = Some(count);
        self
    }

    pub fn with_geometry(mut self, geometry: LineString<f64>) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Whether this edge is a dedicated cycle lane.
    pub fn is_cycleway(&self) -> bool {
        self.highway.as_deref() == Some(CYCLEWAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycleway_detection_is_exact() {
        assert!(RoadEdge::new(EdgeKey(0), 10.0)
            .with_highway("cycleway")
            .is_cycleway());
        assert!(!RoadEdge::new(EdgeKey(0), 10.0)
            .with_highway("residential")
            .is_cycleway());
        assert!(!RoadEdge::new(EdgeKey(0), 10.0).is_cycleway());
    }

    #[test]
    fn node_builders_set_optional_scores() {
        let node = RoadNode::new(NodeId(7), -0.1, 51.5)
            .with_street_count(3)
            .with_safety(0.5);

        assert_eq!(node.street_count, Some(3));
        assert_eq!(node.safety_score, Some(0.5));
        assert_eq!(node.comfort_score, None);
        assert_eq!(node.coord(), Coord { x: -0.1, y: 51.5 });
    }
}
