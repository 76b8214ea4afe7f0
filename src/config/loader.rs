use crate::config::schema::{EditorConfig, ValidationError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read editor config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("editor config is not valid TOML: {0}")]
    Parse(#[from] toml_edit::de::Error),

    #[error("invalid editor config: {0}")]
    Invalid(#[from] ValidationError),

    /// Parse or validation failure in a config read from disk.
    #[error("{}: {source}", path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<ConfigError>,
    },
}

impl ConfigError {
    /// File the error came from, if it was read from disk.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::InFile { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Validation issues, with any file context stripped.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            ConfigError::Invalid(err) => Some(err),
            ConfigError::InFile { source, .. } => source.validation(),
            _ => None,
        }
    }
}

/// Parse and validate config TOML.
pub fn load_from_str(input: &str) -> Result<EditorConfig, ConfigError> {
    let config: EditorConfig = toml_edit::de::from_str(input)?;
    config.validate()?;
    Ok(config)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<EditorConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = load_from_str(&contents).map_err(|source| ConfigError::InFile {
        path: path.to_path_buf(),
        source: Box::new(source),
    })?;
    debug!(path = %path.display(), ?config, "loaded editor config");
    Ok(config)
}

/// Load `path` when given, otherwise fall back to the built-in defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<EditorConfig, ConfigError> {
    match path {
        Some(path) => load_from_path(path),
        None => Ok(EditorConfig::default()),
    }
}
