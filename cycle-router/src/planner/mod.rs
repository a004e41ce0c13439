//! Cycle route planning.
//!
//! This module answers "how should I ride from station A to station B?":
//! it resolves station names, snaps them onto the road network, enumerates
//! candidate paths and ranks them by a weighted blend of distance, safety
//! and comfort.
//!
//! Metrics and scores are recomputed for every request and never cached.

mod config;
mod metrics;
mod plan;
mod select;

pub use config::PlannerConfig;
pub use metrics::{RouteMetrics, evaluate};
pub use plan::{
    DirectRoute, ErrorKind, PlanError, PlanFailure, PlanOutcome, PlanStage, PlannedRoute,
    RankedPlan, RoutePlanner, RouteRequest, plan_with_timeout,
};
pub use select::{DEGENERATE_AXIS_SCORE, NormalizedScores, RankedRoute, select_best};
