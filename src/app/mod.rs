pub(crate) mod report;
pub(crate) mod settings;
pub(crate) mod state;

pub use report::FileReport;
pub use settings::Settings;
pub use state::SimplifyApp;

/// Errors of the command-line front end
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GPX error: {0}")]
    Gpx(#[from] gpx::errors::GpxError),

    #[error("Simplification error: {0}")]
    Simplify(#[from] track_simplify_lib::SimplifyError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
