//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domain::ObjectiveWeights;
use crate::planner::{ErrorKind, PlanFailure, PlanOutcome, RouteRequest, plan_with_timeout};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/search", get(search_stations))
        .route("/route", get(plan_route))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let directory = state.directory.snapshot().await;

    Json(HealthResponse {
        status: if directory.is_empty() { "degraded" } else { "ok" },
        stations: directory.len(),
        usable_origins: directory.usable_origin_count(),
        feed_updated_at: directory.feed_updated_at(),
    })
}

/// Search stations by name.
async fn search_stations(
    State(state): State<AppState>,
    Query(req): Query<StationSearchRequest>,
) -> Json<Vec<StationSearchResult>> {
    let query = req.query.unwrap_or_default();
    let directory = state.directory.snapshot().await;

    Json(
        directory
            .search(&query)
            .into_iter()
            .map(StationSearchResult::from)
            .collect(),
    )
}

/// Plan a ride between two stations.
async fn plan_route(
    State(state): State<AppState>,
    Query(req): Query<PlanRouteRequest>,
) -> Result<Json<PlanRouteResponse>, AppError> {
    let start = required(req.start.as_deref(), "start")?;
    let end = required(req.end.as_deref(), "end")?;

    let weights = ObjectiveWeights::new(
        req.distance.unwrap_or(0.0),
        req.safety.unwrap_or(0.0),
        req.comfort.unwrap_or(0.0),
    );
    weights.validate().map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;

    let request = RouteRequest::new(start, end, weights.normalized());
    let directory = state.directory.snapshot().await;
    let outcome = plan_with_timeout(
        directory,
        Arc::clone(&state.network),
        Arc::clone(&state.config),
        request,
    )
    .await
    .map_err(AppError::Plan)?;

    match &outcome {
        PlanOutcome::DistanceOnly(route) => tracing::info!(
            start = %route.start_station.name,
            end = %route.end_station.name,
            length_m = route.total_distance,
            "planned shortest route"
        ),
        PlanOutcome::Ranked(plan) => tracing::info!(
            start = %plan.start_station.name,
            end = %plan.end_station.name,
            routes = plan.routes.len(),
            "planned ranked routes"
        ),
    }

    Ok(Json(PlanRouteResponse::from_outcome(&outcome)))
}

/// A non-blank query parameter.
fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, AppError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest {
            message: format!("missing '{name}' station"),
        })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Plan(PlanFailure),
}

impl From<PlanFailure> for AppError {
    fn from(e: PlanFailure) -> Self {
        AppError::Plan(e)
    }
}

/// HTTP status for a planning failure.
fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::StationNotFound | ErrorKind::NoPathFound => StatusCode::NOT_FOUND,
        ErrorKind::StationUnavailable => StatusCode::CONFLICT,
        ErrorKind::InvalidWeights => StatusCode::BAD_REQUEST,
        ErrorKind::FeedUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::NodeResolutionFailed | ErrorKind::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            AppError::BadRequest { message } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    kind: "BadRequest".to_string(),
                    message,
                    stage: None,
                },
            ),
            AppError::Plan(failure) => (
                status_for(failure.kind()),
                ErrorResponse {
                    kind: failure.kind().to_string(),
                    message: failure.message(),
                    stage: failure.stage,
                },
            ),
        };

        if status.is_server_error() {
            tracing::error!(%status, kind = %body.kind, message = %body.message, "request failed");
        } else {
            tracing::warn!(%status, kind = %body.kind, message = %body.message, "request rejected");
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EdgeKey, NodeId, RoadEdge, RoadNode, StationId, StationRecord};
    use crate::network::RoadNetwork;
    use crate::planner::PlannerConfig;
    use crate::stations::{SharedDirectory, StationDirectory};

    fn station(id: u32, name: &str, lat: f64, lon: f64, bikes: u32) -> StationRecord {
        StationRecord {
            id: StationId(id),
            name: name.to_string(),
            lat,
            lon,
            bikes_available: bikes,
            standard_bikes: bikes,
            e_bikes: 0,
            empty_docks: 5,
            is_valid: true,
        }
    }

    fn state() -> AppState {
        let directory = StationDirectory::new(vec![
            station(1, "Abbey Road", 51.500, -0.100, 4),
            station(2, "Baker Street", 51.500, -0.098, 0),
        ]);

        let mut builder = RoadNetwork::builder();
        builder
            .add_node(RoadNode::new(NodeId(1), -0.100, 51.500))
            .add_node(RoadNode::new(NodeId(2), -0.099, 51.500))
            .add_node(RoadNode::new(NodeId(3), -0.098, 51.500))
            .add_edge(NodeId(1), NodeId(2), RoadEdge::new(EdgeKey(0), 70.0))
            .add_edge(NodeId(2), NodeId(3), RoadEdge::new(EdgeKey(0), 70.0));

        AppState::new(
            SharedDirectory::new(directory),
            builder.build().unwrap(),
            PlannerConfig::default(),
        )
    }

    fn route_query(start: &str, end: &str, weights: (f64, f64, f64)) -> PlanRouteRequest {
        PlanRouteRequest {
            start: Some(start.to_string()),
            end: Some(end.to_string()),
            distance: Some(weights.0),
            safety: Some(weights.1),
            comfort: Some(weights.2),
        }
    }

    #[tokio::test]
    async fn health_reports_counts() {
        let Json(body) = health(State(state())).await;

        assert_eq!(body.status, "ok");
        assert_eq!(body.stations, 2);
        assert_eq!(body.usable_origins, 1);
    }

    #[tokio::test]
    async fn health_degraded_without_stations() {
        let mut state = state();
        state.directory = SharedDirectory::new(StationDirectory::empty());

        let Json(body) = health(State(state)).await;
        assert_eq!(body.status, "degraded");
    }

    #[tokio::test]
    async fn search_matches_names() {
        let Json(hits) = search_stations(
            State(state()),
            Query(StationSearchRequest {
                query: Some("baker".to_string()),
            }),
        )
        .await;

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Baker Street");
    }

    #[tokio::test]
    async fn search_without_query_is_empty() {
        let query = Query(StationSearchRequest::default());
        let Json(hits) = search_stations(State(state()), query).await;
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn zero_weights_plan_shortest_route() {
        let query = route_query("abbey", "baker", (0.0, 0.0, 0.0));
        let Json(body) = plan_route(State(state()), Query(query)).await.unwrap();

        assert_eq!(body.routes.len(), 1);
        assert_eq!(body.routes[0].len(), 3);
        assert!(matches!(
            &body.metrics[0],
            MetricsResult::Direct(m) if m.route_length == 140.0
        ));
    }

    #[tokio::test]
    async fn weighted_plan_is_ranked() {
        let query = route_query("abbey", "baker", (2.0, 1.0, 1.0));
        let Json(body) = plan_route(State(state()), Query(query)).await.unwrap();

        assert_eq!(body.metrics.len(), 1);
        let MetricsResult::Ranked(metrics) = &body.metrics[0] else {
            panic!("expected ranked metrics");
        };
        // Single candidate scores 1.0 on every axis; weights are normalized
        assert!((metrics.combined_score - 1.0).abs() < 1e-12);
        assert_eq!(body.start_station.name, "Abbey Road");
    }

    #[tokio::test]
    async fn missing_station_is_bad_request() {
        let mut query = route_query("abbey", "", (0.0, 0.0, 0.0));
        query.end = None;

        let err = plan_route(State(state()), Query(query)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn negative_weight_is_bad_request() {
        let query = route_query("abbey", "baker", (-1.0, 0.0, 0.0));
        let err = plan_route(State(state()), Query(query)).await.unwrap_err();

        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn overflowing_weights_are_bad_request() {
        let query = route_query("abbey", "baker", (1e308, 1e308, 0.0));
        let err = plan_route(State(state()), Query(query)).await.unwrap_err();

        assert!(matches!(
            &err,
            AppError::BadRequest { message } if message.contains("too large")
        ));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_station_is_not_found() {
        let query = route_query("zzz", "baker", (0.0, 0.0, 0.0));
        let err = plan_route(State(state()), Query(query)).await.unwrap_err();

        let AppError::Plan(failure) = &err else {
            panic!("expected plan failure");
        };
        assert_eq!(failure.kind(), ErrorKind::StationNotFound);
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn origin_without_bikes_is_conflict() {
        let query = route_query("baker", "abbey", (0.0, 0.0, 0.0));
        let err = plan_route(State(state()), Query(query)).await.unwrap_err();

        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn empty_feed_is_service_unavailable() {
        let mut state = state();
        state.directory = SharedDirectory::new(StationDirectory::empty());

        let query = route_query("abbey", "baker", (0.0, 0.0, 0.0));
        let err = plan_route(State(state), Query(query)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn status_mapping() {
        assert_eq!(status_for(ErrorKind::Timeout), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(status_for(ErrorKind::InvalidWeights), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::Internal), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn router_builds() {
        let _router = create_router(state());
    }
}
