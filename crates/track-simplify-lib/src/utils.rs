//! Utility functions for geodesic measurements and coordinate conversions

use crate::{EARTH_RADIUS_M, GeoPoint};
use geo::{Coord, Rect};

/// Convert a GPX waypoint to a geographic point
#[inline(always)]
pub fn waypoint_to_geo_point(waypoint: &gpx::Waypoint) -> GeoPoint {
    GeoPoint::from(waypoint.point())
}

/// Calculate the Haversine distance between two points in meters
///
/// Uses the same Earth radius as the planar projection, so both agree on short distances.
#[inline]
pub fn haversine_distance(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let delta_lat = (p2.latitude - p1.latitude).to_radians();
    let delta_lon = (p2.longitude - p1.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Total length of a track in meters (sum of Haversine distances between neighbours)
pub fn path_length(track: &[GeoPoint]) -> f64 {
    track
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Bounding box of a track in degrees (x = longitude, y = latitude)
///
/// Returns `None` for an empty track.
pub fn bounding_box(track: &[GeoPoint]) -> Option<Rect<f64>> {
    let first = track.first()?;
    let mut min = Coord {
        x: first.longitude,
        y: first.latitude,
    };
    let mut max = min;

    for point in &track[1..] {
        min.x = min.x.min(point.longitude);
        min.y = min.y.min(point.latitude);
        max.x = max.x.max(point.longitude);
        max.y = max.y.max(point.latitude);
    }

    Some(Rect::new(min, max))
}
