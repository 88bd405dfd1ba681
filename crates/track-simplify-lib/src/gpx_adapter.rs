//! GPX documents as simplification input
//!
//! Every track segment and every route is simplified on its own, with its own projection.
//! Retained waypoints are kept as they are (elevation, time, name, ...); standalone
//! waypoints and metadata are copied unchanged.

use crate::{GeoPoint, Result, Simplifier, SimplifyStats, utils};
use rayon::prelude::*;

/// Read the positions of a track segment, in order
pub fn gpx_segment_points(segment: &gpx::TrackSegment) -> Vec<GeoPoint> {
    segment
        .points
        .iter()
        .map(utils::waypoint_to_geo_point)
        .collect()
}

/// Drop the waypoints the simplifier does not retain, keeping order
fn retain_waypoints(
    points: &mut Vec<gpx::Waypoint>,
    simplifier: &Simplifier,
) -> Result<SimplifyStats> {
    let track: Vec<GeoPoint> = points.iter().map(utils::waypoint_to_geo_point).collect();
    let indices = simplifier.indices(&track)?;
    let stats = SimplifyStats::compute(&track, &indices);

    let mut idx = 0;
    points.retain(|_| {
        let keep = indices.contains(idx);
        idx += 1;
        keep
    });

    Ok(stats)
}

/// Simplify a single track segment with the simplifier's configured epsilon
pub fn simplify_gpx_segment(
    segment: &gpx::TrackSegment,
    simplifier: &Simplifier,
) -> Result<(gpx::TrackSegment, SimplifyStats)> {
    let mut simplified = segment.clone();
    let stats = retain_waypoints(&mut simplified.points, simplifier)?;
    Ok((simplified, stats))
}

/// Simplify all track segments and routes of a GPX document
///
/// # Returns
/// A new document with the same tracks, segments and routes, each reduced to its
/// retained waypoints, plus the combined statistics. The first invalid segment aborts the
/// whole document.
pub fn simplify_gpx(gpx: &gpx::Gpx, simplifier: &Simplifier) -> Result<(gpx::Gpx, SimplifyStats)> {
    #[cfg(feature = "profiling")]
    profiling::scope!("gpx_adapter::simplify_gpx");

    let mut simplified = gpx.clone();

    let segment_stats: Vec<SimplifyStats> = simplified
        .tracks
        .par_iter_mut()
        .flat_map(|track| track.segments.par_iter_mut())
        .map(|segment| retain_waypoints(&mut segment.points, simplifier))
        .collect::<Result<_>>()?;

    let route_stats: Vec<SimplifyStats> = simplified
        .routes
        .par_iter_mut()
        .map(|route| retain_waypoints(&mut route.points, simplifier))
        .collect::<Result<_>>()?;

    let mut total = SimplifyStats::default();
    for stats in segment_stats.iter().chain(&route_stats) {
        total.combine(stats);
    }

    tracing::debug!(
        "Simplified GPX: {} segments, {} routes, {} -> {} points",
        segment_stats.len(),
        route_stats.len(),
        total.original_points,
        total.retained_points
    );

    Ok((simplified, total))
}
