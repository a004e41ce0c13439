//! Station feed and lookup error types.

use crate::domain::StationRole;

/// Errors that can occur when fetching or parsing the availability feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Feed returned an error status
    #[error("feed error {status}: {message}")]
    Api { status: u16, message: String },

    /// Payload is not a well-formed station feed
    #[error("XML parse error: {message}")]
    Xml { message: String },

    /// Feed parsed but contained no stations
    #[error("feed contained no stations")]
    Empty,

    /// Refresh requested on a directory with no feed client
    #[error("no feed client configured")]
    NoClient,
}

/// Errors from resolving a station name.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    /// No station name contains the query
    #[error("no station matching '{query}'{}", did_you_mean(.suggestions))]
    NotFound {
        query: String,
        /// Similar station names, best first
        suggestions: Vec<String>,
    },

    /// Matching stations exist but none can serve this end of the ride
    #[error("no {role} station matching '{query}' is currently usable")]
    Unavailable { query: String, role: StationRole },
}

fn did_you_mean(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}
