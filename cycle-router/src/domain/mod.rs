//! Domain types for the cycle route planner.
//!
//! This module contains the validated value types shared by the station
//! directory, the road network and the planner. Types enforce their
//! invariants at construction time, so code that receives them can trust
//! their validity.

mod error;
mod graph;
mod path;
mod station;
mod weights;

pub use error::DomainError;
pub use graph::{CYCLEWAY, EdgeKey, NodeId, RoadEdge, RoadNode};
pub use path::CandidatePath;
pub use station::{StationId, StationRecord, StationRole};
pub use weights::ObjectiveWeights;
