//! Track Simplify Library - Douglas-Peucker Simplification for GPS Tracks
//!
//! This library reduces an ordered sequence of geographic positions (a GPS track) to an
//! order-preserving subsequence that keeps the shape of the track within a tolerance given
//! in meters. Points along near-straight stretches are discarded, corners are kept.
//!
//! # Architecture
//!
//! - **[`Projector`]**: Equirectangular projection centered on the track's mean latitude
//! - **[`reduce_indices`]**: Iterative Ramer-Douglas-Peucker over projected points
//! - **[`TrackInput`]**: Tabular or parallel-array tracks, simplified into the same shape
//! - **[`Simplifier`]**: Configured front end with statistics and parallel batches
//! - **[`simplify_gpx`]**: Per-segment simplification of whole GPX documents
//!
//! # Performance Characteristics
//!
//! - **Projection**: O(N)
//! - **Reduction**: O(N log N) typical, O(N²) worst case, bounded stack memory
//! - **Batches**: parallel across tracks, sequential within a track

mod gpx_adapter;
mod projection;
mod rdp;
mod simplifier;
mod stats;
mod track;
pub mod utils;

// Public API exports
pub use gpx_adapter::{gpx_segment_points, simplify_gpx, simplify_gpx_segment};
pub use projection::{EARTH_RADIUS_M, PlanarPoint, Projector, project};
pub use rdp::{
    Cancellation, Deadline, IndexSet, NeverCancel, point_segment_distance, reduce_indices,
    reduce_indices_with,
};
pub use simplifier::{Config, Simplifier, simplify, simplify_indices, simplify_track};
pub use stats::SimplifyStats;
pub use track::{CellValue, GeoPoint, Table, TrackInput};

/// Error types for the simplification engine
#[derive(Debug, thiserror::Error)]
pub enum SimplifyError {
    #[error("Invalid epsilon: {0} (must be finite and non-negative)")]
    InvalidEpsilon(f64),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Non-finite coordinate at index {index}: ({latitude}, {longitude})")]
    NonFiniteCoordinate {
        index: usize,
        latitude: f64,
        longitude: f64,
    },

    #[error("Non-finite planar point at index {index}: ({x}, {y})")]
    NonFinitePlanarPoint { index: usize, x: f64, y: f64 },

    #[error("Coordinate out of range at index {index}: ({latitude}, {longitude})")]
    CoordinateOutOfRange {
        index: usize,
        latitude: f64,
        longitude: f64,
    },

    #[error("Simplification cancelled after {iterations} iterations")]
    Cancelled { iterations: usize },
}

pub type Result<T> = std::result::Result<T, SimplifyError>;
