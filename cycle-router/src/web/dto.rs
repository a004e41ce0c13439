//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::planner::{DirectRoute, PlanOutcome, PlanStage, PlannedRoute};
use crate::stations::{ResolvedStation, StationMatch};

/// Query for station search.
#[derive(Debug, Default, Deserialize)]
pub struct StationSearchRequest {
    /// Part of a station name
    pub query: Option<String>,
}

/// A station in search results.
#[derive(Debug, Serialize)]
pub struct StationSearchResult {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub bikes_available: u32,
}

impl From<StationMatch> for StationSearchResult {
    fn from(m: StationMatch) -> Self {
        Self {
            name: m.name,
            lat: m.lat,
            lon: m.lon,
            bikes_available: m.bikes_available,
        }
    }
}

/// Query for route planning.
///
/// Missing weights count as zero; all zero asks for the shortest route.
#[derive(Debug, Default, Deserialize)]
pub struct PlanRouteRequest {
    /// Start station name
    pub start: Option<String>,

    /// End station name
    pub end: Option<String>,

    /// Weight of route length
    pub distance: Option<f64>,

    /// Weight of rider safety
    pub safety: Option<f64>,

    /// Weight of rider comfort
    pub comfort: Option<f64>,
}

/// A point on a drawn route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl From<Coord<f64>> for LatLon {
    fn from(c: Coord<f64>) -> Self {
        Self { lat: c.y, lon: c.x }
    }
}

/// A resolved station in a route response.
#[derive(Debug, Serialize)]
pub struct StationInfo {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl From<&ResolvedStation> for StationInfo {
    fn from(s: &ResolvedStation) -> Self {
        Self {
            name: s.name.clone(),
            lat: s.lat,
            lon: s.lon,
        }
    }
}

/// Metrics of one ranked route.
#[derive(Debug, Serialize)]
pub struct RankedMetrics {
    /// Metres
    pub route_length: f64,
    pub safety_score: f64,
    pub comfort_score: f64,
    pub combined_score: f64,
    pub street_count: u64,
    /// Share of hops on cycleways
    pub cycleway_coverage: f64,
    pub accidents_count: u64,
}

impl From<&PlannedRoute> for RankedMetrics {
    fn from(route: &PlannedRoute) -> Self {
        let metrics = &route.ranked.metrics;
        Self {
            route_length: metrics.total_length,
            safety_score: metrics.safety_factor,
            comfort_score: metrics.comfort_factor,
            combined_score: route.ranked.combined_score,
            street_count: metrics.street_count,
            cycleway_coverage: metrics.cycle_coverage,
            accidents_count: metrics.incident_count,
        }
    }
}

/// Metrics of the shortest route.
#[derive(Debug, Serialize)]
pub struct DirectMetrics {
    /// Metres ridden
    pub route_length: f64,
    /// Metres between the stations and the road network
    pub walking_distance: f64,
}

impl From<&DirectRoute> for DirectMetrics {
    fn from(route: &DirectRoute) -> Self {
        Self {
            route_length: route.total_distance,
            walking_distance: route.walking_distance,
        }
    }
}

/// Metrics entry, shaped by the kind of plan.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MetricsResult {
    Ranked(RankedMetrics),
    Direct(DirectMetrics),
}

/// Response for route planning.
///
/// `routes[i]` is drawn by `metrics[i]`; routes are best first.
#[derive(Debug, Serialize)]
pub struct PlanRouteResponse {
    pub routes: Vec<Vec<LatLon>>,
    pub metrics: Vec<MetricsResult>,
    pub start_station: StationInfo,
    pub end_station: StationInfo,
    /// Metres between the stations and the road network
    pub walking_distance: f64,
}

impl PlanRouteResponse {
    pub fn from_outcome(outcome: &PlanOutcome) -> Self {
        match outcome {
            PlanOutcome::DistanceOnly(route) => Self {
                routes: vec![points(&route.geometry)],
                metrics: vec![MetricsResult::Direct(DirectMetrics::from(route))],
                start_station: StationInfo::from(&route.start_station),
                end_station: StationInfo::from(&route.end_station),
                walking_distance: route.walking_distance,
            },
            PlanOutcome::Ranked(plan) => Self {
                routes: plan.routes.iter().map(|r| points(&r.geometry)).collect(),
                metrics: plan
                    .routes
                    .iter()
                    .map(|r| MetricsResult::Ranked(RankedMetrics::from(r)))
                    .collect(),
                start_station: StationInfo::from(&plan.start_station),
                end_station: StationInfo::from(&plan.end_station),
                walking_distance: plan.walking_distance,
            },
        }
    }
}

fn points(geometry: &[Coord<f64>]) -> Vec<LatLon> {
    geometry.iter().copied().map(LatLon::from).collect()
}

/// Response for the health check.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub stations: usize,
    pub usable_origins: usize,
    pub feed_updated_at: Option<DateTime<Utc>>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Failure category, e.g. `"StationNotFound"`
    pub kind: String,

    /// Human-readable error message
    pub message: String,

    /// Planning stage the failure happened in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<PlanStage>,
}
