//! Nearest-node lookup.

use geo::{Distance, Haversine, Point};

use crate::domain::NodeId;

use super::error::NetworkError;
use super::graph::RoadNetwork;

/// Metres per degree of arc on the mean Earth radius used by [`Haversine`].
const METRES_PER_DEGREE: f64 = 6_371_008.8 * std::f64::consts::PI / 180.0;

/// Leaves room for the planar bound being slightly optimistic.
const LOWER_BOUND_SLACK: f64 = 0.99;

/// Snaps a geographic coordinate onto the road network.
pub trait NodeLocator {
    /// The node closest to `(lat, lon)` and its distance in metres.
    fn nearest_node(&self, lat: f64, lon: f64) -> Result<(NodeId, f64), NetworkError>;
}

impl NodeLocator for RoadNetwork {
    fn nearest_node(&self, lat: f64, lon: f64) -> Result<(NodeId, f64), NetworkError> {
        if !lat.is_finite() || !lon.is_finite() || lat.abs() > 90.0 || lon.abs() > 180.0 {
            return Err(NetworkError::InvalidCoordinate { lat, lon });
        }

        // The index is in raw degrees, where a degree of longitude is shorter
        // than a degree of latitude. Walk outwards in planar order until no
        // further node can beat the best great-circle distance.
        let origin = Point::new(lon, lat);
        let mut best: Option<(NodeId, f64)> = None;
        let neighbours = self.index().nearest_neighbor_iter_with_distance_2(&[lon, lat]);
        for (entry, distance_2) in neighbours {
            let planar = distance_2.sqrt();
            if best.is_some_and(|(_, found)| lower_bound_metres(lat, planar) > found) {
                break;
            }

            let [x, y] = *entry.geom();
            let metres = Haversine.distance(origin, Point::new(x, y));
            let closer = match best {
                None => true,
                Some((id, best_metres)) => {
                    metres < best_metres || (metres == best_metres && entry.data < id)
                }
            };
            if closer {
                best = Some((entry.data, metres));
            }
        }
        best.ok_or(NetworkError::EmptyIndex)
    }
}

/// Smallest great-circle distance, in metres, of any point `planar` degrees
/// away from a point at latitude `lat`.
///
/// Every such point lies within `planar` degrees of latitude, so a degree
/// of longitude there is no shorter than at the highest latitude reached.
fn lower_bound_metres(lat: f64, planar: f64) -> f64 {
    let shrink = (lat.abs() + planar).min(90.0).to_radians().cos();
    planar * METRES_PER_DEGREE * shrink * LOWER_BOUND_SLACK
}
