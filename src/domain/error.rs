use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal problems with the run's inputs, surfaced before any walk starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Directory '{}' does not exist", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Path '{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("{name} must be a positive integer (got {value})")]
    InvalidLimit { name: &'static str, value: usize },

    #[error("{var} environment variable not set")]
    MissingCredential { var: &'static str },

    #[error("Invalid exclusion pattern \"{pattern}\": {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Failures of the remote model call. Fatal to the run, never to the scan.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("API credential was rejected (HTTP {status}): {message}")]
    InvalidCredential { status: u16, message: String },

    #[error("Rate limited by the model API: {0}")]
    RateLimited(String),

    #[error("Model request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),
}

/// Why a single entry was left out of the context. Never aborts a walk.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("permission denied")]
    PermissionDenied,

    #[error("vanished during scan")]
    Vanished,

    #[error("filesystem loop")]
    FilesystemLoop,

    #[error("{0}")]
    Io(String),
}

impl SkipReason {
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => SkipReason::PermissionDenied,
            io::ErrorKind::NotFound => SkipReason::Vanished,
            _ => SkipReason::Io(err.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("README generation failed: {0}")]
    Collaborator(#[from] ModelError),

    #[error("No readable files found under '{}'. Cannot generate README.", .0.display())]
    EmptyContext(PathBuf),
}
