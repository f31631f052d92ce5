//! Loading and saving [`StreamConfig`] as JSON or YAML files.
//!
//! The format is picked from the file extension: `.json`, `.yaml` or `.yml`. Programmatic
//! controllers are never written and come back empty on load.

use std::path::Path;

use crate::config::StreamConfig;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

fn format_of(path: &Path) -> Result<Format> {
    match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
        Some("json") => Ok(Format::Json),
        Some("yaml") | Some("yml") => Ok(Format::Yaml),
        _ => Err(Error::UnsupportedFormat(path.to_path_buf())),
    }
}

impl StreamConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: StreamConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let cfg: StreamConfig = serde_yaml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Read and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let format = format_of(path)?;
        let text = std::fs::read_to_string(path)?;
        let cfg = match format {
            Format::Json => Self::from_json_str(&text)?,
            Format::Yaml => Self::from_yaml_str(&text)?,
        };
        tracing::debug!(path = %path.display(), "loaded stream config");
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = match format_of(path)? {
            Format::Json => self.to_json_string()?,
            Format::Yaml => self.to_yaml_string()?,
        };
        std::fs::write(path, text)?;
        Ok(())
    }
}
