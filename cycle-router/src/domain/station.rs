//! Docking station types.

use std::fmt;

use serde::Serialize;

/// Numeric station identifier as published by the availability feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(transparent)]
pub struct StationId(pub u32);

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which end of a ride a station is being resolved for.
///
/// Origins need a bike to pick up; destinations only need to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StationRole {
    Origin,
    Destination,
}

impl fmt::Display for StationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationRole::Origin => f.write_str("origin"),
            StationRole::Destination => f.write_str("destination"),
        }
    }
}

/// One docking station from a feed snapshot.
///
/// Records are built once per feed fetch and never mutated afterwards.
/// When a field fails to parse the record is kept with `is_valid = false`
/// and that field left at its default, so one bad entry never hides the
/// rest of the feed.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StationRecord {
    pub id: StationId,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub bikes_available: u32,
    pub standard_bikes: u32,
    pub e_bikes: u32,
    pub empty_docks: u32,
    /// True iff every required field parsed.
    pub is_valid: bool,
}

impl StationRecord {
    /// Whether this station can serve as the given end of a ride.
    ///
    /// Invalid records are never usable. Origins additionally need at
    /// least one bike available.
    pub fn is_usable_as(&self, role: StationRole) -> bool {
        if !self.is_valid {
            return false;
        }
        match role {
            StationRole::Origin => self.bikes_available > 0,
            StationRole::Destination => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(bikes: u32, is_valid: bool) -> StationRecord {
        StationRecord {
            id: StationId(1),
            name: "River Street , Clerkenwell".to_string(),
            lat: 51.529163,
            lon: -0.10997,
            bikes_available: bikes,
            standard_bikes: bikes,
            e_bikes: 0,
            empty_docks: 7,
            is_valid,
        }
    }

    #[test]
    fn origin_needs_a_bike() {
        assert!(station(3, true).is_usable_as(StationRole::Origin));
        assert!(!station(0, true).is_usable_as(StationRole::Origin));
    }

    #[test]
    fn destination_ignores_bike_count() {
        assert!(station(0, true).is_usable_as(StationRole::Destination));
    }

    #[test]
    fn invalid_station_is_never_usable() {
        assert!(!station(5, false).is_usable_as(StationRole::Origin));
        assert!(!station(5, false).is_usable_as(StationRole::Destination));
    }

    #[test]
    fn role_display() {
        assert_eq!(StationRole::Origin.to_string(), "origin");
        assert_eq!(StationRole::Destination.to_string(), "destination");
    }
}
