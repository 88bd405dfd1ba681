use super::{AppError, FileReport, Settings};
use rayon::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use track_simplify_lib::{Simplifier, SimplifyStats, simplify_gpx};

/// Simplifies the GPX files named in the settings
pub struct SimplifyApp {
    settings: Settings,
    simplifier: Simplifier,
}

impl SimplifyApp {
    pub fn new(settings: Settings) -> Self {
        let simplifier = Simplifier::new(settings.simplifier_config());
        Self {
            settings,
            simplifier,
        }
    }

    /// Process every file and print one report per file to `out`, in argument order
    ///
    /// Files are processed in parallel. A failing file is logged and does not stop the
    /// others.
    ///
    /// # Returns
    /// The number of files that failed
    pub fn run<W: Write>(&self, out: &mut W) -> usize {
        let results: Vec<Result<FileReport, AppError>> = self
            .settings
            .gpx_files
            .par_iter()
            .map(|path| self.process_file(path))
            .collect();

        let mut total = SimplifyStats::default();
        let mut failures = 0;

        for (path, result) in self.settings.gpx_files.iter().zip(results) {
            let outcome = result.and_then(|report| {
                self.write_report(out, &report)?;
                Ok(report)
            });
            match outcome {
                Ok(report) => total.combine(&report.stats),
                Err(e) => {
                    tracing::error!("Failed to simplify {}: {}", path.display(), e);
                    failures += 1;
                }
            }
        }

        if self.settings.gpx_files.len() > 1 {
            tracing::info!(
                "Total: {} -> {} points ({:.1}% removed)",
                total.original_points,
                total.retained_points,
                total.compression_ratio() * 100.0
            );
        }

        failures
    }

    /// Read, simplify and (unless dry-running) write a single GPX file
    pub fn process_file(&self, path: &Path) -> Result<FileReport, AppError> {
        profiling::scope!("process_file");

        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let gpx = gpx::read(reader)?;

        let (mut simplified, stats) = simplify_gpx(&gpx, &self.simplifier)?;
        // The writer rejects documents of unknown version
        if matches!(simplified.version, gpx::GpxVersion::Unknown) {
            simplified.version = gpx::GpxVersion::Gpx11;
        }
        tracing::debug!(
            "{}: {} -> {} points",
            path.display(),
            stats.original_points,
            stats.retained_points
        );

        let output = if self.settings.dry_run {
            None
        } else {
            let output = output_path(path, self.settings.output_dir.as_deref());
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            write_gpx_file(&simplified, &output)?;
            Some(output)
        };

        Ok(FileReport {
            input: path.to_path_buf(),
            output,
            epsilon_meters: self.simplifier.config().epsilon_meters,
            stats,
        })
    }

    fn write_report<W: Write>(&self, out: &mut W, report: &FileReport) -> Result<(), AppError> {
        if self.settings.json {
            writeln!(out, "{}", report.to_json_line()?)?;
        } else {
            writeln!(out, "{}", report)?;
        }
        Ok(())
    }
}

/// Write `gpx` to `path`, removing the partial file if writing fails
fn write_gpx_file(gpx: &gpx::Gpx, path: &Path) -> Result<(), AppError> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    let result = gpx::write(gpx, &mut writer)
        .map_err(AppError::from)
        .and_then(|()| writer.flush().map_err(AppError::from));

    if let Err(e) = result {
        drop(writer);
        if let Err(remove_err) = std::fs::remove_file(path) {
            tracing::warn!("Could not remove {}: {}", path.display(), remove_err);
        }
        return Err(e);
    }
    Ok(())
}

/// Where the simplified version of `input` is written: `<stem>.simplified.gpx`, in
/// `output_dir` if given, otherwise next to the input
pub fn output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "track".to_string());
    let file_name = format!("{}.simplified.gpx", stem);

    match output_dir {
        Some(dir) => dir.join(file_name),
        None => input.with_file_name(file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint};

    /// Fresh directory under the system temp dir, unique per test
    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "track-simplify-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Write an L-shaped track (straight east, then straight north) to `path`
    fn write_test_gpx(path: &Path) {
        let mut gpx = Gpx::default();
        gpx.version = GpxVersion::Gpx11;
        let mut track = Track::default();
        let mut segment = TrackSegment::default();

        for i in 0..30 {
            segment
                .points
                .push(Waypoint::new(geo::Point::new(2.35 + i as f64 * 0.0005, 48.85)));
        }
        for i in 1..30 {
            segment.points.push(Waypoint::new(geo::Point::new(
                2.3645,
                48.85 + i as f64 * 0.0005,
            )));
        }

        track.segments.push(segment);
        gpx.tracks.push(track);
        let writer = std::io::BufWriter::new(std::fs::File::create(path).unwrap());
        gpx::write(&gpx, writer).unwrap();
    }

    fn create_app(args: &[&str]) -> SimplifyApp {
        let mut argv = vec!["track-simplify"];
        argv.extend_from_slice(args);
        SimplifyApp::new(Settings::try_parse_from(argv).unwrap())
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("/data/ride.gpx"), None),
            PathBuf::from("/data/ride.simplified.gpx")
        );
        assert_eq!(
            output_path(Path::new("/data/ride.gpx"), Some(Path::new("/out"))),
            PathBuf::from("/out/ride.simplified.gpx")
        );
    }

    #[test]
    fn test_process_file_writes_simplified_gpx() {
        let dir = test_dir("write");
        let input = dir.join("ride.gpx");
        write_test_gpx(&input);

        let app = create_app(&["-e", "1", input.to_str().unwrap()]);
        let report = app.process_file(&input).unwrap();

        assert_eq!(report.stats.original_points, 59);
        assert_eq!(report.stats.retained_points, 3);
        let output = report.output.unwrap();
        assert_eq!(output, dir.join("ride.simplified.gpx"));

        let reader = std::io::BufReader::new(std::fs::File::open(&output).unwrap());
        let written = gpx::read(reader).unwrap();
        assert_eq!(written.tracks[0].segments[0].points.len(), 3);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let dir = test_dir("failed-write");
        let output = dir.join("broken.simplified.gpx");

        // Unknown version is rejected by the writer
        let gpx = Gpx::default();
        let result = write_gpx_file(&gpx, &output);
        assert!(matches!(result, Err(AppError::Gpx(_))));
        assert!(!output.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = test_dir("dry-run");
        let input = dir.join("ride.gpx");
        write_test_gpx(&input);

        let app = create_app(&["--dry-run", input.to_str().unwrap()]);
        let report = app.process_file(&input).unwrap();
        assert!(report.output.is_none());
        assert!(!dir.join("ride.simplified.gpx").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_run_reports_and_counts_failures() {
        let dir = test_dir("run");
        let input = dir.join("ride.gpx");
        write_test_gpx(&input);
        let missing = dir.join("missing.gpx");

        let out_dir = dir.join("out");
        let app = create_app(&[
            "--json",
            "--output-dir",
            out_dir.to_str().unwrap(),
            input.to_str().unwrap(),
            missing.to_str().unwrap(),
        ]);

        let mut out = Vec::new();
        let failures = app.run(&mut out);
        assert_eq!(failures, 1);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1);
        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["stats"]["original_points"], 59);
        assert!(out_dir.join("ride.simplified.gpx").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
