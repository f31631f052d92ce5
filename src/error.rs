//! Error types for configuration and lens/zoom parameters.
//!
//! The streaming data path itself never fails: missing series, missing assignments and
//! empty windows all have defined fallbacks. Errors only come from caller-supplied
//! parameters that are wrong from the start.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Magnifier radius (or bar half-width) must be positive.
    #[error("Magnifier radius must be greater than 0, got {0}")]
    InvalidLensRadius(f64),

    /// Magnifier power must be at least 1.
    #[error("Magnifier power must be greater than or equal to 1, got {0}")]
    InvalidLensPower(f64),

    /// Zoom factors must be finite and positive.
    #[error("Zoom factor must be finite and greater than 0, got {0}")]
    InvalidZoomFactor(f64),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Config files are recognised by their extension.
    #[error("Unsupported config format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::InvalidLensRadius(-2.0);
        assert!(err.to_string().contains("radius"));
        assert!(err.to_string().contains("-2"));

        let err = Error::UnsupportedFormat(PathBuf::from("stream.toml"));
        assert!(err.to_string().contains("stream.toml"));
    }
}
