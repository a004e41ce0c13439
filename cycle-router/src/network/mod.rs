//! Road network access for the planner.
//!
//! The planner talks to the network through three seams:
//! - [`RoadGraph`]: node and edge attributes, and the route projection used
//!   for both reported length and drawn geometry
//! - [`PathEnumerator`]: shortest and k-shortest paths by edge length
//! - [`NodeLocator`]: nearest node to a coordinate
//!
//! [`RoadNetwork`] implements all three over an in-memory graph loaded from
//! an OSMnx GraphML export.

mod error;
mod graph;
mod graphml;
mod paths;
mod spatial;

pub use error::NetworkError;
pub use graph::{
    MAX_EDGE_LENGTH, ProjectedSegment, RoadGraph, RoadNetwork, RoadNetworkBuilder, RouteProjection,
};
pub use graphml::{load_graphml, parse_graphml};
pub use paths::PathEnumerator;
pub use spatial::NodeLocator;
