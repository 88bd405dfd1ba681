use super::logging::setup_logging;
use crate::app::{Settings, SimplifyApp};
use std::process::ExitCode;

/// Native entry point
pub fn native_main() -> ExitCode {
    let settings = Settings::from_cli();
    setup_logging(settings.verbose);

    tracing::info!(
        "Simplifying {} file(s) with epsilon = {} m",
        settings.gpx_files.len(),
        settings.epsilon
    );

    let app = SimplifyApp::new(settings);
    let failures = app.run(&mut std::io::stdout().lock());

    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        tracing::error!("{} file(s) failed", failures);
        ExitCode::FAILURE
    }
}
