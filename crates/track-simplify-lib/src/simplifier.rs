//! Simplifier - Top-level entry points for simplifying tracks
//!
//! This module validates inputs, projects tracks, runs the reduction and re-indexes the
//! original (unprojected) input so the caller gets back the shape it supplied.

use crate::rdp::validate_epsilon;
use crate::track::validate_points;
use crate::{
    Cancellation, GeoPoint, IndexSet, NeverCancel, Result, SimplifyStats, TrackInput, projection,
    rdp,
};

use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the simplifier
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Default tolerance in meters, used when no epsilon is passed explicitly.
    /// Default: 10.0
    pub epsilon_meters: f64,
    /// Name of the latitude column for tabular input. Default: "latitude"
    pub latitude_column: String,
    /// Name of the longitude column for tabular input. Default: "longitude"
    pub longitude_column: String,
    /// Also reject points outside [-90, 90] / [-180, 180] degrees (default false).
    /// Non-finite coordinates are always rejected.
    pub strict_ranges: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            epsilon_meters: 10.0,
            latitude_column: "latitude".to_string(),
            longitude_column: "longitude".to_string(),
            strict_ranges: false,
        }
    }
}

/// Configured simplification front end
///
/// Stateless apart from its configuration; a single instance can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Simplifier {
    config: Config,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Simplifier {
    /// Create a new simplifier with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Indices of the points to keep, using the configured epsilon
    pub fn indices(&self, track: &[GeoPoint]) -> Result<IndexSet> {
        self.indices_with_epsilon(track, self.config.epsilon_meters)
    }

    /// Indices of the points to keep
    ///
    /// Validation happens before any computation: the epsilon first, then every
    /// coordinate. A single bad point rejects the whole track.
    pub fn indices_with_epsilon(&self, track: &[GeoPoint], epsilon: f64) -> Result<IndexSet> {
        self.indices_cancellable(track, epsilon, &NeverCancel)
    }

    /// Like [`Simplifier::indices_with_epsilon`], polling `cancel` during the reduction
    pub fn indices_cancellable<C: Cancellation + ?Sized>(
        &self,
        track: &[GeoPoint],
        epsilon: f64,
        cancel: &C,
    ) -> Result<IndexSet> {
        validate_epsilon(epsilon)?;
        validate_points(track, self.config.strict_ranges)?;

        let planar = projection::project(track);
        rdp::reduce_indices_with(&planar, epsilon, cancel)
    }

    /// Simplify a track of points, using the configured epsilon
    pub fn simplify_track(&self, track: &[GeoPoint]) -> Result<Vec<GeoPoint>> {
        Ok(self.indices(track)?.select(track))
    }

    /// Simplify a track and report what was kept
    pub fn simplify_with_stats(&self, track: &[GeoPoint]) -> Result<(Vec<GeoPoint>, SimplifyStats)> {
        let indices = self.indices(track)?;
        let stats = SimplifyStats::compute(track, &indices);
        tracing::debug!(
            "Simplified track: {} -> {} points ({:.1}% removed)",
            stats.original_points,
            stats.retained_points,
            stats.compression_ratio() * 100.0
        );
        Ok((indices.select(track), stats))
    }

    /// Simplify a tabular or parallel-array track, using the configured epsilon
    pub fn simplify(&self, input: &TrackInput) -> Result<TrackInput> {
        self.simplify_with_epsilon(input, self.config.epsilon_meters)
    }

    /// Simplify a tabular or parallel-array track
    ///
    /// # Returns
    /// The same variant as `input`: a table with the same columns and an ordered subset of
    /// its rows, or two arrays filtered by the same indices
    pub fn simplify_with_epsilon(&self, input: &TrackInput, epsilon: f64) -> Result<TrackInput> {
        validate_epsilon(epsilon)?;
        let points =
            input.geo_points(&self.config.latitude_column, &self.config.longitude_column)?;
        let indices = self.indices_with_epsilon(&points, epsilon)?;
        Ok(input.select(&indices))
    }

    /// Simplify many independent tracks in parallel, using the configured epsilon
    ///
    /// Each track gets its own projection. The first failing track aborts the batch.
    pub fn simplify_many<T>(&self, tracks: &[T]) -> Result<Vec<IndexSet>>
    where
        T: AsRef<[GeoPoint]> + Sync,
    {
        #[cfg(feature = "profiling")]
        profiling::scope!("simplifier::simplify_many");

        tracks
            .par_iter()
            .map(|track| self.indices(track.as_ref()))
            .collect()
    }
}

/// Simplify a tabular or parallel-array track with the default configuration
///
/// # Arguments
/// * `input` - The track, in either supported shape
/// * `epsilon_meters` - Tolerance in meters (finite, non-negative)
pub fn simplify(input: &TrackInput, epsilon_meters: f64) -> Result<TrackInput> {
    Simplifier::default().simplify_with_epsilon(input, epsilon_meters)
}

/// Simplify a point sequence with the default configuration
pub fn simplify_track(track: &[GeoPoint], epsilon_meters: f64) -> Result<Vec<GeoPoint>> {
    Ok(simplify_indices(track, epsilon_meters)?.select(track))
}

/// Indices to keep from a point sequence, with the default configuration
pub fn simplify_indices(track: &[GeoPoint], epsilon_meters: f64) -> Result<IndexSet> {
    Simplifier::default().indices_with_epsilon(track, epsilon_meters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CellValue, SimplifyError, Table};

    fn create_test_track() -> Vec<GeoPoint> {
        // Around London: straight north-east then straight east
        let mut track = Vec::new();
        for i in 0..50 {
            track.push(GeoPoint::new(
                51.5074 + i as f64 * 0.001,
                -0.1278 + i as f64 * 0.001,
            ));
        }
        for i in 1..50 {
            track.push(GeoPoint::new(51.5564, -0.0788 + i as f64 * 0.001));
        }
        track
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.epsilon_meters, 10.0);
        assert_eq!(config.latitude_column, "latitude");
        assert_eq!(config.longitude_column, "longitude");
        assert!(!config.strict_ranges);
    }

    #[test]
    fn test_simplify_track_keeps_corner() {
        let track = create_test_track();
        let simplifier = Simplifier::default();
        let simplified = simplifier.simplify_track(&track).unwrap();

        assert_eq!(simplified.len(), 3);
        assert_eq!(simplified[0], track[0]);
        assert_eq!(simplified[1], track[49]);
        assert_eq!(simplified[2], track[track.len() - 1]);
    }

    #[test]
    fn test_simplify_with_stats() {
        let track = create_test_track();
        let (simplified, stats) = Simplifier::default().simplify_with_stats(&track).unwrap();
        assert_eq!(stats.original_points, track.len());
        assert_eq!(stats.retained_points, simplified.len());
        assert!(stats.compression_ratio() > 0.9);
        assert!(stats.length_ratio() <= 1.0 + 1e-9);
        assert!(stats.length_ratio() > 0.99);
    }

    #[test]
    fn test_invalid_epsilon_checked_before_schema() {
        let input = TrackInput::parallel(vec![1.0, 2.0], vec![1.0]);
        assert!(matches!(
            simplify(&input, -1.0),
            Err(SimplifyError::InvalidEpsilon(_))
        ));
        assert!(matches!(
            simplify(&input, 1.0),
            Err(SimplifyError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_non_finite_rejects_whole_call() {
        let mut track = create_test_track();
        track[10].longitude = f64::NAN;
        assert!(matches!(
            simplify_indices(&track, 10.0),
            Err(SimplifyError::NonFiniteCoordinate { index: 10, .. })
        ));
    }

    #[test]
    fn test_non_finite_rejected_in_short_tracks() {
        let track = [GeoPoint::new(f64::INFINITY, 0.0)];
        assert!(simplify_indices(&track, 10.0).is_err());
    }

    #[test]
    fn test_strict_ranges() {
        let track = [GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 200.0)];
        assert!(simplify_indices(&track, 10.0).is_ok());

        let simplifier = Simplifier::new(Config {
            strict_ranges: true,
            ..Config::default()
        });
        assert!(matches!(
            simplifier.indices(&track),
            Err(SimplifyError::CoordinateOutOfRange { index: 1, .. })
        ));
    }

    #[test]
    fn test_custom_column_names() {
        let table = Table::from_rows(
            ["lat", "lon"],
            vec![
                vec![0.0.into(), 0.0.into()],
                vec![0.0.into(), 0.5.into()],
                vec![0.0.into(), 1.0.into()],
            ],
        )
        .unwrap();
        let input = TrackInput::from(table);

        // Default column names are missing
        assert!(matches!(
            simplify(&input, 1.0),
            Err(SimplifyError::SchemaMismatch(_))
        ));

        let simplifier = Simplifier::new(Config {
            latitude_column: "lat".to_string(),
            longitude_column: "lon".to_string(),
            ..Config::default()
        });
        match simplifier.simplify(&input).unwrap() {
            TrackInput::Tabular(table) => {
                assert_eq!(table.len(), 2);
                assert_eq!(table.get(1, "lon"), Some(&CellValue::Float(1.0)));
            }
            other => panic!("expected tabular output, got {:?}", other),
        }
    }

    #[test]
    fn test_simplify_parallel_arrays() {
        let track = create_test_track();
        let input = TrackInput::parallel(
            track.iter().map(|p| p.latitude).collect(),
            track.iter().map(|p| p.longitude).collect(),
        );

        match simplify(&input, 10.0).unwrap() {
            TrackInput::ParallelArrays {
                latitudes,
                longitudes,
            } => {
                assert_eq!(latitudes.len(), 3);
                assert_eq!(longitudes.len(), 3);
                assert_eq!(latitudes[1], track[49].latitude);
                assert_eq!(longitudes[1], track[49].longitude);
            }
            other => panic!("expected parallel arrays, got {:?}", other),
        }
    }

    #[test]
    fn test_simplify_empty_inputs() {
        let input = TrackInput::parallel(Vec::new(), Vec::new());
        assert_eq!(simplify(&input, 1.0).unwrap(), input);

        let input = TrackInput::from(Table::new(["latitude", "longitude", "time"]));
        assert_eq!(simplify(&input, 1.0).unwrap(), input);
    }

    #[test]
    fn test_simplify_many() {
        let tracks: Vec<Vec<GeoPoint>> = (0..8).map(|_| create_test_track()).collect();
        let results = Simplifier::default().simplify_many(&tracks).unwrap();
        assert_eq!(results.len(), 8);
        for indices in &results {
            assert_eq!(indices.as_slice(), &[0, 49, 98]);
        }
    }

    #[test]
    fn test_simplify_many_propagates_errors() {
        let mut tracks: Vec<Vec<GeoPoint>> = (0..4).map(|_| create_test_track()).collect();
        tracks[2][0].latitude = f64::NAN;
        assert!(Simplifier::default().simplify_many(&tracks).is_err());
    }

    #[test]
    fn test_indices_cancellable() {
        use std::sync::atomic::AtomicBool;

        let track = create_test_track();
        let cancelled = AtomicBool::new(true);
        let result = Simplifier::default().indices_cancellable(&track, 10.0, &cancelled);
        assert!(matches!(result, Err(SimplifyError::Cancelled { .. })));
    }
}
