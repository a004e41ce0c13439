use std::time::Duration;

use tracing_subscriber::EnvFilter;

use cycle_router::config::ServerConfig;
use cycle_router::network::load_graphml;
use cycle_router::planner::ErrorKind;
use cycle_router::stations::{FeedClient, SharedDirectory, StationDirectory};
use cycle_router::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cycle_router=info,tower_http=info")),
        )
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    // Load the road network (fail fast if unreadable)
    let network = match load_graphml(&config.graph_path) {
        Ok(network) => network,
        Err(e) => {
            tracing::error!(
                path = %config.graph_path.display(),
                error = %e,
                "failed to load road network"
            );
            std::process::exit(1);
        }
    };

    // Fetch the station feed (fail fast if unavailable)
    let client = match FeedClient::new(config.feed.clone()) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "failed to create feed client");
            std::process::exit(1);
        }
    };
    let directory = StationDirectory::fetch(&client).await;
    if directory.is_empty() {
        tracing::error!(
            kind = %ErrorKind::FeedUnavailable,
            url = client.url(),
            "no stations loaded"
        );
        std::process::exit(1);
    }
    let directory = SharedDirectory::new(directory).with_client(client);

    if let Some(period) = config.feed_refresh {
        spawn_refresh(directory.clone(), period);
    }

    let state = AppState::new(directory, network, config.planner.clone());
    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %config.bind_addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!(addr = %config.bind_addr, "cycle route planner listening");
    tracing::info!("  GET /health  - Health check");
    tracing::info!("  GET /search  - Search stations by name");
    tracing::info!("  GET /route   - Plan a route");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}

/// Refresh the station feed in the background every `period`.
fn spawn_refresh(directory: SharedDirectory, period: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await; // First tick is immediate, skip it
        loop {
            interval.tick().await;
            match directory.refresh().await {
                Ok(count) => tracing::info!(stations = count, "refreshed station feed"),
                Err(e) => tracing::warn!(
                    error = %e,
                    "failed to refresh station feed, keeping previous snapshot"
                ),
            }
        }
    });
}
