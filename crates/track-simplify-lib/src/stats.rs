//! Summary statistics of a simplification

use crate::{GeoPoint, IndexSet, utils};

/// What a simplification kept and how much of the path length survived
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimplifyStats {
    /// Number of points before simplification
    pub original_points: usize,
    /// Number of points kept
    pub retained_points: usize,
    /// Haversine path length of the input in meters
    pub original_length_m: f64,
    /// Haversine path length of the simplified track in meters
    pub simplified_length_m: f64,
}

impl SimplifyStats {
    /// Compute statistics for `indices` selected from `track`
    pub fn compute(track: &[GeoPoint], indices: &IndexSet) -> Self {
        let simplified = indices.select(track);
        Self {
            original_points: track.len(),
            retained_points: simplified.len(),
            original_length_m: utils::path_length(track),
            simplified_length_m: utils::path_length(&simplified),
        }
    }

    /// Fraction of points removed (0 = nothing removed)
    pub fn compression_ratio(&self) -> f64 {
        if self.original_points == 0 {
            return 0.0;
        }
        1.0 - self.retained_points as f64 / self.original_points as f64
    }

    /// Simplified length over original length (1 for a zero-length input)
    ///
    /// Never above 1: every retained segment is a shortcut of the original path.
    pub fn length_ratio(&self) -> f64 {
        if self.original_length_m <= 0.0 {
            return 1.0;
        }
        self.simplified_length_m / self.original_length_m
    }

    /// Add the counts and lengths of another simplification
    pub fn combine(&mut self, other: &SimplifyStats) {
        self.original_points += other.original_points;
        self.retained_points += other.retained_points;
        self.original_length_m += other.original_length_m;
        self.simplified_length_m += other.simplified_length_m;
    }
}
