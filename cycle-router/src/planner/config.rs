//! Configuration for the route planner.

use std::time::Duration;

/// Configuration parameters for route planning.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Maximum number of candidate paths ranked per request.
    pub candidate_count: usize,

    /// Wall-clock limit for one plan.
    /// A plan that overruns is reported as timed out.
    pub request_timeout: Duration,
}

impl PlannerConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(candidate_count: usize, request_timeout: Duration) -> Self {
        Self {
            candidate_count,
            request_timeout,
        }
    }

    pub fn with_candidate_count(mut self, count: usize) -> Self {
        self.candidate_count = count;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            candidate_count: 5,
            request_timeout: Duration::from_secs(30),
        }
    }
}
