use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use track_simplify_lib::SimplifyStats;

/// Outcome of simplifying one GPX file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// File that was read
    pub input: PathBuf,
    /// File that was written (None on dry runs)
    pub output: Option<PathBuf>,
    /// Tolerance used, in meters
    pub epsilon_meters: f64,
    /// Combined statistics over all segments and routes of the file
    pub stats: SimplifyStats,
}

impl FileReport {
    /// One JSON object on a single line
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for FileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} -> {} points ({:.1}% removed), length {:.3} km -> {:.3} km",
            self.input.display(),
            self.stats.original_points,
            self.stats.retained_points,
            self.stats.compression_ratio() * 100.0,
            self.stats.original_length_m / 1000.0,
            self.stats.simplified_length_m / 1000.0,
        )?;
        match &self.output {
            Some(output) => write!(f, ", written to {}", output.display()),
            None => write!(f, " (dry run)"),
        }
    }
}
