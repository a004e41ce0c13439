//! Availability feed parsing.
//!
//! The feed is an XML document of `<station>` elements. Every field is
//! deserialized as optional text and converted station by station, so a
//! malformed entry only invalidates itself.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::{StationId, StationRecord};

use super::error::FeedError;

/// Root `<stations>` element.
#[derive(Debug, Default, Deserialize)]
pub struct StationsFeed {
    /// Publication time in epoch milliseconds.
    #[serde(rename = "@lastUpdate", default)]
    pub last_update: Option<String>,
    #[serde(rename = "station", default)]
    pub stations: Vec<RawStation>,
}

impl StationsFeed {
    /// Publication time, when present and well-formed.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        let millis = self.last_update.as_deref()?.trim().parse::<i64>().ok()?;
        DateTime::from_timestamp_millis(millis)
    }
}

/// One `<station>` element, unvalidated.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStation {
    pub id: Option<String>,
    pub name: Option<String>,
    pub lat: Option<String>,
    #[serde(rename = "long")]
    pub lon: Option<String>,
    pub nb_bikes: Option<String>,
    pub nb_standard_bikes: Option<String>,
    #[serde(rename = "nbEBikes")]
    pub nb_e_bikes: Option<String>,
    pub nb_empty_docks: Option<String>,
}

/// Parse the XML payload.
pub fn parse_feed(xml: &str) -> Result<StationsFeed, FeedError> {
    quick_xml::de::from_str(xml).map_err(|e| FeedError::Xml {
        message: e.to_string(),
    })
}

/// Convert every raw station into a record, in feed order.
pub fn ingest(feed: &StationsFeed) -> Vec<StationRecord> {
    feed.stations.iter().map(convert).collect()
}

/// Convert one station. Fields that fail to parse are left at their
/// default and mark the record invalid.
fn convert(raw: &RawStation) -> StationRecord {
    let mut failed: Vec<&'static str> = Vec::new();
    let mut record = StationRecord::default();

    match field::<u32>(&raw.id) {
        Some(id) => record.id = StationId(id),
        None => failed.push("id"),
    }
    match raw.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => record.name = name.to_string(),
        None => failed.push("name"),
    }
    match field::<f64>(&raw.lat).filter(|v| v.is_finite() && v.abs() <= 90.0) {
        Some(lat) => record.lat = lat,
        None => failed.push("lat"),
    }
    match field::<f64>(&raw.lon).filter(|v| v.is_finite() && v.abs() <= 180.0) {
        Some(lon) => record.lon = lon,
        None => failed.push("long"),
    }

    let counts = [
        ("nbBikes", &raw.nb_bikes, &mut record.bikes_available),
        ("nbStandardBikes", &raw.nb_standard_bikes, &mut record.standard_bikes),
        ("nbEBikes", &raw.nb_e_bikes, &mut record.e_bikes),
        ("nbEmptyDocks", &raw.nb_empty_docks, &mut record.empty_docks),
    ];
    for (name, value, slot) in counts {
        match field::<u32>(value) {
            Some(v) => *slot = v,
            None => failed.push(name),
        }
    }

    record.is_valid = failed.is_empty();
    if !record.is_valid {
        tracing::warn!(
            id = raw.id.as_deref().unwrap_or("?"),
            name = raw.name.as_deref().unwrap_or("?"),
            fields = ?failed,
            "station has unparsable fields, marking invalid"
        );
    }
    record
}

fn field<T: FromStr>(value: &Option<String>) -> Option<T> {
    value.as_deref()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<stations lastUpdate="1700000000000" version="2.0">
  <station>
    <id>1</id>
    <name>River Street , Clerkenwell</name>
    <terminalName>001023</terminalName>
    <lat>51.52916347</lat>
    <long>-0.109970527</long>
    <installed>true</installed>
    <nbBikes>8</nbBikes>
    <nbStandardBikes>7</nbStandardBikes>
    <nbEBikes>1</nbEBikes>
    <nbEmptyDocks>10</nbEmptyDocks>
    <nbDocks>19</nbDocks>
  </station>
  <station>
    <id>2</id>
    <name>Phillimore Gardens, Kensington</name>
    <lat>not-a-number</lat>
    <long>-0.197574246</long>
    <nbBikes>3</nbBikes>
    <nbStandardBikes>3</nbStandardBikes>
    <nbEBikes>0</nbEBikes>
    <nbEmptyDocks>34</nbEmptyDocks>
  </station>
  <station>
    <id>3</id>
    <name>Christopher Street, Liverpool Street</name>
    <lat>51.52128377</lat>
    <long>-0.084605692</long>
    <nbBikes>0</nbBikes>
    <nbStandardBikes>0</nbStandardBikes>
    <nbEBikes>0</nbEBikes>
  </station>
</stations>"#;

    #[test]
    fn parses_valid_station() {
        let feed = parse_feed(SAMPLE).unwrap();
        let records = ingest(&feed);

        assert_eq!(records.len(), 3);
        let first = &records[0];
        assert!(first.is_valid);
        assert_eq!(first.id, StationId(1));
        assert_eq!(first.name, "River Street , Clerkenwell");
        assert_eq!(first.lat, 51.52916347);
        assert_eq!(first.lon, -0.109970527);
        assert_eq!(first.bikes_available, 8);
        assert_eq!(first.standard_bikes, 7);
        assert_eq!(first.e_bikes, 1);
        assert_eq!(first.empty_docks, 10);
    }

    #[test]
    fn bad_field_only_invalidates_its_station() {
        let records = ingest(&parse_feed(SAMPLE).unwrap());

        assert!(!records[1].is_valid);
        assert_eq!(records[1].name, "Phillimore Gardens, Kensington");
        assert_eq!(records[1].lat, 0.0);
        // Missing nbEmptyDocks
        assert!(!records[2].is_valid);
        assert!(records[0].is_valid);
    }

    #[test]
    fn last_update_is_epoch_millis() {
        let feed = parse_feed(SAMPLE).unwrap();
        let at = feed.updated_at().unwrap();

        assert_eq!(at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn empty_feed_has_no_stations() {
        let feed = parse_feed("<stations></stations>").unwrap();

        assert!(ingest(&feed).is_empty());
        assert!(feed.updated_at().is_none());
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(matches!(
            parse_feed("<stations><station><id>1</id></stations>"),
            Err(FeedError::Xml { .. })
        ));
    }

    #[test]
    fn blank_name_is_invalid() {
        let raw = RawStation {
            id: Some("9".into()),
            name: Some("   ".into()),
            lat: Some("51.5".into()),
            lon: Some("-0.1".into()),
            nb_bikes: Some("1".into()),
            nb_standard_bikes: Some("1".into()),
            nb_e_bikes: Some("0".into()),
            nb_empty_docks: Some("4".into()),
        };

        assert!(!convert(&raw).is_valid);
    }
}
