//! Route planning orchestration.
//!
//! Turns a pair of free-text station names into either a single shortest
//! route or a ranked set of candidates:
//!
//! 1. Resolve both names against the station directory
//! 2. Snap each station onto the nearest road node
//! 3. Enumerate candidate paths between the two nodes
//! 4. Evaluate and rank them, unless every weight is zero
//!
//! Each step either advances the [`PlanStage`] or fails with the stage it
//! was in.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use geo::Coord;
use serde::Serialize;

use crate::domain::{CandidatePath, NodeId, ObjectiveWeights, StationRole};
use crate::network::{NetworkError, NodeLocator, PathEnumerator, RoadGraph};
use crate::stations::{ResolveError, ResolvedStation, StationDirectory};

use super::config::PlannerConfig;
use super::metrics::evaluate;
use super::select::{RankedRoute, select_best};

/// Progress of a single plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlanStage {
    Idle,
    StationsResolved,
    NodesResolved,
    PathsObtained,
    Ranked,
}

/// Machine-readable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    FeedUnavailable,
    StationNotFound,
    StationUnavailable,
    NodeResolutionFailed,
    NoPathFound,
    InvalidWeights,
    Timeout,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::FeedUnavailable => "FeedUnavailable",
            ErrorKind::StationNotFound => "StationNotFound",
            ErrorKind::StationUnavailable => "StationUnavailable",
            ErrorKind::NodeResolutionFailed => "NodeResolutionFailed",
            ErrorKind::NoPathFound => "NoPathFound",
            ErrorKind::InvalidWeights => "InvalidWeights",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::Internal => "Internal",
        };
        f.write_str(name)
    }
}

/// Error from route planning.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// Directory has no stations
    #[error("station availability feed is unavailable")]
    FeedUnavailable,

    /// Station name did not resolve
    #[error(transparent)]
    Station(#[from] ResolveError),

    /// Station could not be snapped onto the road network
    #[error("could not place {role} station '{station}' on the road network: {source}")]
    NodeResolution {
        role: StationRole,
        station: String,
        #[source]
        source: NetworkError,
    },

    /// No path connects the two stations
    #[error("no route found from '{from}' to '{to}'")]
    NoPath { from: String, to: String },

    /// An enumerated path does not exist in the graph
    #[error("candidate path is not part of the road network: {0}")]
    InvalidPath(#[source] NetworkError),

    #[error("{0}")]
    InvalidWeights(String),

    #[error("route planning timed out after {0:?}")]
    Timeout(Duration),

    #[error("internal error: {0}")]
    Internal(String),
}

impl PlanError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlanError::FeedUnavailable => ErrorKind::FeedUnavailable,
            PlanError::Station(ResolveError::NotFound { .. }) => ErrorKind::StationNotFound,
            PlanError::Station(ResolveError::Unavailable { .. }) => ErrorKind::StationUnavailable,
            PlanError::NodeResolution { .. } => ErrorKind::NodeResolutionFailed,
            PlanError::NoPath { .. } | PlanError::InvalidPath(_) => ErrorKind::NoPathFound,
            PlanError::InvalidWeights(_) => ErrorKind::InvalidWeights,
            PlanError::Timeout(_) => ErrorKind::Timeout,
            PlanError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// A failed plan and the stage it failed in.
///
/// `stage` is `None` when the plan never reported back (timeout or a
/// panicked worker).
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct PlanFailure {
    pub stage: Option<PlanStage>,
    #[source]
    pub error: PlanError,
}

impl PlanFailure {
    fn at(stage: PlanStage, error: impl Into<PlanError>) -> Self {
        Self {
            stage: Some(stage),
            error: error.into(),
        }
    }

    fn detached(error: PlanError) -> Self {
        Self { stage: None, error }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

/// Request to plan a ride between two stations.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    /// Free-text start station name.
    pub start: String,
    /// Free-text end station name.
    pub end: String,
    /// All zero selects the single shortest route.
    pub weights: ObjectiveWeights,
}

impl RouteRequest {
    pub fn new(
        start: impl Into<String>,
        end: impl Into<String>,
        weights: ObjectiveWeights,
    ) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            weights,
        }
    }
}

/// The single shortest route, returned when no objective is weighted.
#[derive(Debug, Clone)]
pub struct DirectRoute {
    pub start_station: ResolvedStation,
    pub end_station: ResolvedStation,
    pub path: CandidatePath,
    /// Ridden distance in metres.
    pub total_distance: f64,
    /// Distance from both stations to their road nodes, in metres.
    pub walking_distance: f64,
    /// Drawn route, `x` = lon, `y` = lat.
    pub geometry: Vec<Coord<f64>>,
}

/// A ranked candidate with its drawn route.
#[derive(Debug, Clone)]
pub struct PlannedRoute {
    pub ranked: RankedRoute,
    pub geometry: Vec<Coord<f64>>,
}

/// Candidates ranked best-first.
#[derive(Debug, Clone)]
pub struct RankedPlan {
    pub start_station: ResolvedStation,
    pub end_station: ResolvedStation,
    /// Distance from both stations to their road nodes, in metres.
    pub walking_distance: f64,
    pub routes: Vec<PlannedRoute>,
}

/// Result of a successful plan.
#[derive(Debug, Clone)]
pub enum PlanOutcome {
    DistanceOnly(DirectRoute),
    Ranked(RankedPlan),
}

/// Both ends of the ride, resolved.
#[derive(Debug)]
struct ResolvedStations {
    start: ResolvedStation,
    end: ResolvedStation,
}

/// Both ends of the ride, snapped onto the road network.
#[derive(Debug)]
struct SnappedNodes {
    start: NodeId,
    end: NodeId,
    /// Sum of both approach distances in metres.
    approach: f64,
}

/// Route planner over a station directory and road network.
pub struct RoutePlanner<'a, G, E, L> {
    directory: &'a StationDirectory,
    graph: &'a G,
    paths: &'a E,
    locator: &'a L,
    config: &'a PlannerConfig,
}

impl<'a, N> RoutePlanner<'a, N, N, N>
where
    N: RoadGraph + PathEnumerator + NodeLocator,
{
    /// Create a planner whose graph, path search and node lookup are all
    /// provided by one network.
    pub fn over(
        directory: &'a StationDirectory,
        network: &'a N,
        config: &'a PlannerConfig,
    ) -> Self {
        Self::new(directory, network, network, network, config)
    }
}

impl<'a, G, E, L> RoutePlanner<'a, G, E, L>
where
    G: RoadGraph,
    E: PathEnumerator,
    L: NodeLocator,
{
    /// Create a new planner.
    pub fn new(
        directory: &'a StationDirectory,
        graph: &'a G,
        paths: &'a E,
        locator: &'a L,
        config: &'a PlannerConfig,
    ) -> Self {
        Self {
            directory,
            graph,
            paths,
            locator,
            config,
        }
    }

    /// Plan a ride.
    pub fn plan(&self, request: &RouteRequest) -> Result<PlanOutcome, PlanFailure> {
        let weights = request.weights;
        weights.validate().map_err(|e| {
            PlanFailure::at(PlanStage::Idle, PlanError::InvalidWeights(e.to_string()))
        })?;

        if self.directory.is_empty() {
            return Err(PlanFailure::at(PlanStage::Idle, PlanError::FeedUnavailable));
        }

        let stations = self
            .resolve_stations(request)
            .map_err(|e| PlanFailure::at(PlanStage::Idle, e))?;
        tracing::debug!(
            start = %stations.start.name,
            end = %stations.end.name,
            "resolved stations"
        );

        let nodes = self
            .snap(&stations)
            .map_err(|e| PlanFailure::at(PlanStage::StationsResolved, e))?;
        tracing::debug!(
            start = %nodes.start,
            end = %nodes.end,
            approach_m = nodes.approach,
            "snapped stations to road nodes"
        );

        let no_path = || PlanError::NoPath {
            from: stations.start.name.clone(),
            to: stations.end.name.clone(),
        };
        if nodes.start == nodes.end {
            return Err(PlanFailure::at(PlanStage::NodesResolved, no_path()));
        }

        if weights.is_zero() {
            let path = self
                .paths
                .shortest_path(nodes.start, nodes.end)
                .ok_or_else(|| PlanFailure::at(PlanStage::NodesResolved, no_path()))?;
            let projection = self
                .graph
                .project_route(&path)
                .map_err(|e| PlanFailure::at(PlanStage::PathsObtained, PlanError::InvalidPath(e)))?;
            tracing::debug!(hops = path.edge_count(), "found shortest path");

            return Ok(PlanOutcome::DistanceOnly(DirectRoute {
                total_distance: projection.total_length(),
                walking_distance: nodes.approach,
                geometry: projection.coordinates(),
                path,
                start_station: stations.start,
                end_station: stations.end,
            }));
        }

        let candidates =
            self.paths
                .k_shortest_paths(nodes.start, nodes.end, self.config.candidate_count);
        if candidates.is_empty() {
            return Err(PlanFailure::at(PlanStage::NodesResolved, no_path()));
        }
        tracing::debug!(candidates = candidates.len(), "enumerated candidate paths");

        let ranked = self
            .rank(candidates, weights)
            .map_err(|e| PlanFailure::at(PlanStage::PathsObtained, e))?;

        Ok(PlanOutcome::Ranked(RankedPlan {
            start_station: stations.start,
            end_station: stations.end,
            walking_distance: nodes.approach,
            routes: ranked,
        }))
    }

    fn resolve_stations(&self, request: &RouteRequest) -> Result<ResolvedStations, PlanError> {
        Ok(ResolvedStations {
            start: self.directory.resolve(&request.start, StationRole::Origin)?,
            end: self
                .directory
                .resolve(&request.end, StationRole::Destination)?,
        })
    }

    fn snap(&self, stations: &ResolvedStations) -> Result<SnappedNodes, PlanError> {
        let locate = |station: &ResolvedStation, role: StationRole| {
            self.locator
                .nearest_node(station.lat, station.lon)
                .map_err(|source| PlanError::NodeResolution {
                    role,
                    station: station.name.clone(),
                    source,
                })
        };

        let (start, start_distance) = locate(&stations.start, StationRole::Origin)?;
        let (end, end_distance) = locate(&stations.end, StationRole::Destination)?;

        Ok(SnappedNodes {
            start,
            end,
            approach: start_distance + end_distance,
        })
    }

    fn rank(
        &self,
        candidates: Vec<CandidatePath>,
        weights: ObjectiveWeights,
    ) -> Result<Vec<PlannedRoute>, PlanError> {
        let evaluated = candidates
            .into_iter()
            .map(|path| {
                let metrics = evaluate(&path, self.graph).map_err(PlanError::InvalidPath)?;
                Ok((path, metrics))
            })
            .collect::<Result<Vec<_>, PlanError>>()?;

        let ranked = select_best(&evaluated, weights)
            .map_err(|e| PlanError::InvalidWeights(e.to_string()))?;

        ranked
            .into_iter()
            .map(|route| {
                let geometry = self
                    .graph
                    .project_route(&route.path)
                    .map_err(PlanError::InvalidPath)?
                    .coordinates();
                Ok(PlannedRoute {
                    ranked: route,
                    geometry,
                })
            })
            .collect()
    }
}

/// Plan on the blocking pool, giving up after the configured timeout.
///
/// A plan that overruns is not interrupted; its result is discarded.
pub async fn plan_with_timeout<N>(
    directory: Arc<StationDirectory>,
    network: Arc<N>,
    config: Arc<PlannerConfig>,
    request: RouteRequest,
) -> Result<PlanOutcome, PlanFailure>
where
    N: RoadGraph + PathEnumerator + NodeLocator + Send + Sync + 'static,
{
    let limit = config.request_timeout;
    let task = tokio::task::spawn_blocking(move || {
        RoutePlanner::over(&directory, network.as_ref(), &config).plan(&request)
    });

    match tokio::time::timeout(limit, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(PlanFailure::detached(PlanError::Internal(format!(
            "planning task failed: {e}"
        )))),
        Err(_) => {
            tracing::warn!(timeout = ?limit, "route planning timed out");
            Err(PlanFailure::detached(PlanError::Timeout(limit)))
        }
    }
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
