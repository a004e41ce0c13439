//! Application state for the web layer.

use std::sync::Arc;

use crate::network::RoadNetwork;
use crate::planner::PlannerConfig;
use crate::stations::SharedDirectory;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Latest station directory snapshot
    pub directory: SharedDirectory,

    /// Road network, loaded once at startup
    pub network: Arc<RoadNetwork>,

    /// Route planner configuration
    pub config: Arc<PlannerConfig>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(directory: SharedDirectory, network: RoadNetwork, config: PlannerConfig) -> Self {
        Self {
            directory,
            network: Arc::new(network),
            config: Arc::new(config),
        }
    }
}
