//! Cycle hire station feed and name lookup.
//!
//! Fetches the live availability feed, turns it into an immutable
//! [`StationDirectory`] snapshot and resolves free-text station names
//! against it. [`SharedDirectory`] holds the current snapshot and swaps it
//! on refresh.

mod client;
mod directory;
mod error;
mod feed;
mod matching;
mod shared;

pub use client::{FeedClient, FeedClientConfig};
pub use directory::{ResolvedStation, StationDirectory, StationMatch};
pub use error::{FeedError, ResolveError};
pub use feed::{RawStation, StationsFeed, ingest, parse_feed};
pub use matching::{normalize_name, suggest};
pub use shared::SharedDirectory;
