//! Local planar projection for distance computation
//!
//! Tracks are projected with an equirectangular approximation centered on their own mean
//! latitude, so that Euclidean point-to-segment distances in meters can stand in for
//! geodesic ones over the few hundred kilometers a track typically spans.
//!
//! Planar points of two different tracks use different reference latitudes and must not
//! be mixed.

use crate::GeoPoint;
use geo::Point;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A projected point: x (easting) and y (northing) in meters
pub type PlanarPoint = Point<f64>;

/// Equirectangular projection around a fixed reference latitude
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projector {
    /// Reference latitude in degrees
    reference_latitude: f64,
    /// Precomputed cos(reference_latitude)
    cos_reference: f64,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Projector {
    /// Create a projector around the given reference latitude (degrees)
    pub fn new(reference_latitude: f64) -> Self {
        Self {
            reference_latitude,
            cos_reference: reference_latitude.to_radians().cos(),
        }
    }

    /// Create a projector centered on the mean latitude of the track
    ///
    /// An empty track gets the equator as reference; it has nothing to project anyway.
    pub fn for_track(track: &[GeoPoint]) -> Self {
        if track.is_empty() {
            return Self::new(0.0);
        }
        let sum: f64 = track.iter().map(|p| p.latitude).sum();
        Self::new(sum / track.len() as f64)
    }

    /// Reference latitude in degrees
    #[inline]
    pub fn reference_latitude(&self) -> f64 {
        self.reference_latitude
    }

    /// Project a single point to planar meters
    #[inline(always)]
    pub fn project_point(&self, point: &GeoPoint) -> PlanarPoint {
        let x = EARTH_RADIUS_M * point.longitude.to_radians() * self.cos_reference;
        let y = EARTH_RADIUS_M * point.latitude.to_radians();
        Point::new(x, y)
    }

    /// Convert planar meters back to degrees
    ///
    /// At a polar reference latitude every longitude projects to x = 0, so the longitude
    /// cannot be recovered and 0 is returned for it.
    #[inline]
    pub fn unproject(&self, point: &PlanarPoint) -> GeoPoint {
        let latitude = (point.y() / EARTH_RADIUS_M).to_degrees();
        let longitude = if self.cos_reference.abs() > f64::EPSILON {
            (point.x() / (EARTH_RADIUS_M * self.cos_reference)).to_degrees()
        } else {
            0.0
        };
        GeoPoint::new(latitude, longitude)
    }

    /// Project every point of a track, keeping order
    pub fn project(&self, track: &[GeoPoint]) -> Vec<PlanarPoint> {
        track.iter().map(|p| self.project_point(p)).collect()
    }
}

/// Project a track around its own mean latitude
///
/// # Arguments
/// * `track` - Points in traversal order (may be empty)
///
/// # Returns
/// One planar point per input point, in the same order
pub fn project(track: &[GeoPoint]) -> Vec<PlanarPoint> {
    #[cfg(feature = "profiling")]
    profiling::scope!("projection::project");
    Projector::for_track(track).project(track)
}
