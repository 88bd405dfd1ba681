use clap::Parser;
use std::path::PathBuf;
use track_simplify_lib::Config;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Track Simplify - Reduce GPS tracks with Douglas-Peucker while keeping their shape
pub struct Settings {
    /// GPX files to simplify
    #[clap(value_name = "FILE", required = true)]
    pub gpx_files: Vec<PathBuf>,

    /// Tolerance in meters: maximum distance of a dropped point from the simplified line
    #[clap(short, long, default_value = "10.0", value_parser = parse_epsilon)]
    pub epsilon: f64,

    /// Directory for the simplified files (default: next to each input)
    #[clap(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Only report what would be kept, write nothing
    #[clap(long)]
    pub dry_run: bool,

    /// Print one JSON report per file instead of text
    #[clap(long)]
    pub json: bool,

    /// Reject files with coordinates outside [-90, 90] / [-180, 180] degrees
    #[clap(long)]
    pub strict_ranges: bool,

    /// Log at debug level regardless of RUST_LOG
    #[clap(short, long)]
    pub verbose: bool,
}

impl Settings {
    /// Parse settings from the command line, exiting with usage on error
    pub fn from_cli() -> Self {
        Settings::parse()
    }

    /// Library configuration for these settings
    pub fn simplifier_config(&self) -> Config {
        Config {
            epsilon_meters: self.epsilon,
            strict_ranges: self.strict_ranges,
            ..Config::default()
        }
    }
}

fn parse_epsilon(value: &str) -> Result<f64, String> {
    let epsilon: f64 = value
        .parse()
        .map_err(|e| format!("not a number: {}", e))?;
    if !epsilon.is_finite() || epsilon < 0.0 {
        return Err(format!("{} is not a finite, non-negative distance", value));
    }
    Ok(epsilon)
}
