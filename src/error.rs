use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Every way a command can fail.
///
/// The variants group into configuration, authentication, network/API and
/// local I/O failures. None of them is retried; `main` prints the message
/// and exits with status 1.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Letterboxd authentication failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response from {url}: {reason}")]
    UnexpectedResponse { url: String, reason: String },

    #[error(
        "No Letterboxd data was found in {}. Make sure the path is correct or run with -d to download your data.",
        .0.display()
    )]
    ExportNotFound(PathBuf),

    #[error("Invalid export file {}: {reason}", .path.display())]
    InvalidExport { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for failures the user fixes by editing the config or credentials.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Error::Config(_) | Error::Auth(_))
    }
}
