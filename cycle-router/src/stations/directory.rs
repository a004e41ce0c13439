//! Immutable station directory snapshot.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{StationId, StationRecord, StationRole};

use super::client::FeedClient;
use super::error::{FeedError, ResolveError};
use super::feed::{ingest, parse_feed};
use super::matching::{normalize_name, suggest};

/// A station search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationMatch {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub bikes_available: u32,
}

/// A station name resolved to a position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedStation {
    pub id: StationId,
    /// Canonical name from the feed.
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// One feed snapshot of every station, in feed order.
///
/// Never mutated after construction; a refresh builds a new directory.
#[derive(Debug, Clone, Default)]
pub struct StationDirectory {
    stations: Vec<StationRecord>,
    /// `normalize_name` of each station name, parallel to `stations`.
    search_keys: Vec<String>,
    feed_updated_at: Option<DateTime<Utc>>,
    fetched_at: Option<DateTime<Utc>>,
}

impl StationDirectory {
    /// Build a directory from already-ingested records.
    pub fn new(stations: Vec<StationRecord>) -> Self {
        let search_keys = stations.iter().map(|s| normalize_name(&s.name)).collect();
        Self {
            stations,
            search_keys,
            feed_updated_at: None,
            fetched_at: None,
        }
    }

    /// A directory with no stations.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse and ingest a raw feed payload.
    pub fn from_payload(xml: &str) -> Result<Self, FeedError> {
        let feed = parse_feed(xml)?;
        let mut directory = Self::new(ingest(&feed));
        directory.feed_updated_at = feed.updated_at();
        directory.fetched_at = Some(Utc::now());
        Ok(directory)
    }

    /// Fetch and ingest the feed, failing on any fetch or parse error.
    pub async fn try_fetch(client: &FeedClient) -> Result<Self, FeedError> {
        let payload = client.fetch().await?;
        let directory = Self::from_payload(&payload)?;
        if directory.is_empty() {
            return Err(FeedError::Empty);
        }
        Ok(directory)
    }

    /// Fetch and ingest the feed.
    ///
    /// Never fails: a fetch or parse error is logged and yields an empty
    /// directory, which callers treat as "feed unavailable".
    pub async fn fetch(client: &FeedClient) -> Self {
        match Self::try_fetch(client).await {
            Ok(directory) => {
                tracing::info!(
                    stations = directory.len(),
                    usable_origins = directory.usable_origin_count(),
                    "loaded station feed"
                );
                directory
            }
            Err(e) => {
                tracing::warn!(url = client.url(), error = %e, "station feed unavailable");
                Self::empty()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn stations(&self) -> &[StationRecord] {
        &self.stations
    }

    /// Number of stations with a bike to pick up.
    pub fn usable_origin_count(&self) -> usize {
        self.stations
            .iter()
            .filter(|s| s.is_usable_as(StationRole::Origin))
            .count()
    }

    /// Publication time reported by the feed.
    pub fn feed_updated_at(&self) -> Option<DateTime<Utc>> {
        self.feed_updated_at
    }

    /// When this snapshot was fetched.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Records whose search key contains `key`, in feed order.
    fn matching<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a StationRecord> + 'a {
        self.stations
            .iter()
            .zip(&self.search_keys)
            .filter(move |(_, k)| k.contains(key))
            .map(|(s, _)| s)
    }

    /// Valid stations whose name contains `query`, in feed order.
    ///
    /// A blank query matches nothing.
    pub fn search(&self, query: &str) -> Vec<StationMatch> {
        let key = normalize_name(query);
        if key.is_empty() {
            return Vec::new();
        }

        self.matching(&key)
            .filter(|s| s.is_valid)
            .map(|s| StationMatch {
                name: s.name.clone(),
                lat: s.lat,
                lon: s.lon,
                bikes_available: s.bikes_available,
            })
            .collect()
    }

    /// Resolve a free-text station name for one end of a ride.
    ///
    /// Matching is a case- and punctuation-insensitive substring test. Of
    /// the matching stations, the first one in feed order that is usable
    /// for `role` wins.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no station name contains the query (with similar
    ///   names as suggestions)
    /// - `Unavailable` if names match but none is usable for `role`
    pub fn resolve(&self, query: &str, role: StationRole) -> Result<ResolvedStation, ResolveError> {
        let key = normalize_name(query);
        let mut matched = false;

        if !key.is_empty() {
            for station in self.matching(&key) {
                matched = true;
                if station.is_usable_as(role) {
                    return Ok(ResolvedStation {
                        id: station.id,
                        name: station.name.clone(),
                        lat: station.lat,
                        lon: station.lon,
                    });
                }
            }
        }

        if matched {
            return Err(ResolveError::Unavailable {
                query: query.to_string(),
                role,
            });
        }

        let candidates = self
            .stations
            .iter()
            .zip(&self.search_keys)
            .filter(|(s, _)| s.is_valid)
            .map(|(s, k)| (k.as_str(), s.name.as_str()));
        Err(ResolveError::NotFound {
            query: query.to_string(),
            suggestions: suggest(query, candidates),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(id: u32, name: &str, bikes: u32, is_valid: bool) -> StationRecord {
        StationRecord {
            id: StationId(id),
            name: name.to_string(),
            lat: 51.5 + id as f64 * 0.001,
            lon: -0.1,
            bikes_available: bikes,
            standard_bikes: bikes,
            e_bikes: 0,
            empty_docks: 10,
            is_valid,
        }
    }

    fn directory() -> StationDirectory {
        StationDirectory::new(vec![
            station(1, "Liverpool Street Station", 3, true),
            station(2, "King's Cross Station", 0, true),
            station(3, "Kings Cross Road", 4, false),
            station(4, "Waterloo Station 1", 6, true),
            station(5, "Waterloo Station 2", 2, true),
        ])
    }

    #[test]
    fn resolve_origin_with_bikes() {
        let resolved = directory()
            .resolve("Liverpool Street", StationRole::Origin)
            .unwrap();

        assert_eq!(resolved.name, "Liverpool Street Station");
        assert_eq!(resolved.id, StationId(1));
        assert_eq!(resolved.lat, 51.501);
    }

    #[test]
    fn resolve_origin_without_bikes_is_unavailable() {
        let dir = StationDirectory::new(vec![station(1, "Liverpool Street Station", 0, true)]);

        assert_eq!(
            dir.resolve("Liverpool Street", StationRole::Origin),
            Err(ResolveError::Unavailable {
                query: "Liverpool Street".to_string(),
                role: StationRole::Origin,
            })
        );
        assert!(dir.resolve("Liverpool Street", StationRole::Destination).is_ok());
    }

    #[test]
    fn resolve_ignores_punctuation_and_case() {
        let resolved = directory()
            .resolve("kings cross", StationRole::Destination)
            .unwrap();

        assert_eq!(resolved.name, "King's Cross Station");
    }

    #[test]
    fn resolve_skips_invalid_matches() {
        // "Kings Cross Road" has bikes but is invalid; King's Cross Station has none
        let err = directory()
            .resolve("kings cross", StationRole::Origin)
            .unwrap_err();

        assert!(matches!(err, ResolveError::Unavailable { .. }));
    }

    #[test]
    fn resolve_returns_first_usable_in_feed_order() {
        let resolved = directory().resolve("waterloo", StationRole::Origin).unwrap();
        assert_eq!(resolved.id, StationId(4));
    }

    #[test]
    fn resolve_not_found_suggests_names() {
        let err = directory()
            .resolve("Waterlo Statoin", StationRole::Origin)
            .unwrap_err();

        match err {
            ResolveError::NotFound { suggestions, .. } => {
                assert!(!suggestions.is_empty());
                assert!(suggestions[0].starts_with("Waterloo Station"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn resolve_blank_query_is_not_found() {
        assert!(matches!(
            directory().resolve("   ", StationRole::Destination),
            Err(ResolveError::NotFound { .. })
        ));
    }

    #[test]
    fn search_returns_valid_matches_in_order() {
        let hits = directory().search("cross");

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "King's Cross Station");
        assert_eq!(hits[0].bikes_available, 0);

        let hits = directory().search("STATION");
        let names: Vec<_> = hits.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Liverpool Street Station",
                "King's Cross Station",
                "Waterloo Station 1",
                "Waterloo Station 2",
            ]
        );
    }

    #[test]
    fn search_blank_query_is_empty() {
        assert!(directory().search("").is_empty());
    }

    #[test]
    fn counts() {
        let dir = directory();
        assert_eq!(dir.len(), 5);
        assert_eq!(dir.usable_origin_count(), 3);
        assert!(StationDirectory::empty().is_empty());
    }

    #[test]
    fn from_payload_keeps_feed_time() {
        let xml = r#"<stations lastUpdate="1700000000000">
  <station><id>1</id><name>Abbey Road</name><lat>51.53</lat><long>-0.18</long>
  <nbBikes>2</nbBikes><nbStandardBikes>2</nbStandardBikes><nbEBikes>0</nbEBikes>
  <nbEmptyDocks>5</nbEmptyDocks></station>
</stations>"#;
        let dir = StationDirectory::from_payload(xml).unwrap();

        assert_eq!(dir.len(), 1);
        assert!(dir.stations()[0].is_valid);
        assert_eq!(dir.feed_updated_at().map(|t| t.timestamp()), Some(1_700_000_000));
        assert!(dir.fetched_at().is_some());
    }

    #[tokio::test]
    async fn unreachable_feed_yields_empty_directory() {
        // Nothing listens on port 9 locally; the fetch fails fast
        let client = FeedClient::new(
            crate::stations::FeedClientConfig::new()
                .with_url("http://127.0.0.1:9/feed.xml")
                .with_timeout_secs(2),
        )
        .unwrap();

        let dir = StationDirectory::fetch(&client).await;

        assert!(dir.is_empty());
        assert_eq!(dir.usable_origin_count(), 0);
    }
}
