/*!
Logging setup for the command-line front end.

Logs go to stderr so that reports printed on stdout (text or JSON lines) stay clean.
With the `profiling` feature, `profiling::scope!` blocks in this crate and in the library
show up as tracing spans in the same output.
*/

use tracing_subscriber::prelude::*;

/// Initialize logging with sensible defaults.
///
/// Behavior:
/// - `verbose` forces debug level.
/// - Otherwise RUST_LOG is honored; if it is not set, debug builds log at debug and
///   release builds at info.
pub fn setup_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                EnvFilter::new("debug")
            } else {
                EnvFilter::new("info")
            }
        })
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);
    tracing_subscriber::registry().with(fmt_layer).init();

    tracing::debug!(
        "Logging initialized ({} {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
}
