//! Server configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::planner::PlannerConfig;
use crate::stations::FeedClientConfig;

/// Default interval between station feed refreshes.
const DEFAULT_FEED_REFRESH_SECS: u64 = 300;

/// Errors from reading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("{0} is not set")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed
    #[error("invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Everything needed to start the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// GraphML road network to load
    pub graph_path: PathBuf,

    /// Address to listen on
    pub bind_addr: SocketAddr,

    pub feed: FeedClientConfig,

    pub planner: PlannerConfig,

    /// How often to refresh the station feed; `None` disables refresh.
    pub feed_refresh: Option<Duration>,
}

impl ServerConfig {
    /// Read the configuration from process environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `CYCLE_GRAPH_PATH` | required |
    /// | `CYCLE_BIND_ADDR` | `127.0.0.1:5000` |
    /// | `CYCLE_FEED_URL` | TfL live cycle hire feed |
    /// | `CYCLE_CANDIDATE_COUNT` | `5`, must be positive |
    /// | `CYCLE_ROUTE_TIMEOUT_SECS` | `30`, must be positive |
    /// | `CYCLE_FEED_REFRESH_SECS` | `300`, `0` disables refresh |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`, which returns the value of
    /// a variable if it is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let graph_path = var("CYCLE_GRAPH_PATH")
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing("CYCLE_GRAPH_PATH"))?;

        let bind_addr = parse("CYCLE_BIND_ADDR", var("CYCLE_BIND_ADDR"))?
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 5000)));

        let mut feed = FeedClientConfig::default();
        if let Some(url) = var("CYCLE_FEED_URL") {
            feed = feed.with_url(url);
        }

        let mut planner = PlannerConfig::default();
        if let Some(count) = positive("CYCLE_CANDIDATE_COUNT", var("CYCLE_CANDIDATE_COUNT"))? {
            planner = planner.with_candidate_count(count);
        }
        if let Some(secs) = positive("CYCLE_ROUTE_TIMEOUT_SECS", var("CYCLE_ROUTE_TIMEOUT_SECS"))? {
            planner = planner.with_request_timeout(Duration::from_secs(secs));
        }

        let refresh_secs =
            parse::<u64>("CYCLE_FEED_REFRESH_SECS", var("CYCLE_FEED_REFRESH_SECS"))?
                .unwrap_or(DEFAULT_FEED_REFRESH_SECS);
        let feed_refresh = (refresh_secs > 0).then(|| Duration::from_secs(refresh_secs));

        Ok(Self {
            graph_path,
            bind_addr,
            feed,
            planner,
            feed_refresh,
        })
    }
}

fn parse<T: FromStr>(name: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError> {
    value
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { name, value: v.clone() })
        })
        .transpose()
}

/// Like [`parse`], but zero is rejected too.
fn positive<T>(name: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr + Default + PartialEq,
{
    match parse::<T>(name, value.clone())? {
        Some(v) if v == T::default() => Err(ConfigError::Invalid {
            name,
            value: value.unwrap_or_default(),
        }),
        parsed => Ok(parsed),
    }
}
