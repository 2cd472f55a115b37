//! Host session configuration.
//!
//! Hosts hand the engine a JSON-encoded object naming the document the
//! session is bound to. Parsing and validation happen once, here at the
//! boundary; the engine only ever sees the typed form.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::line::DocumentHandle;

/// Errors raised while parsing session configuration.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    /// The configuration string was not valid JSON or had the wrong shape.
    #[error("malformed session configuration: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The document handle was present but empty.
    #[error("session configuration names an empty document handle")]
    EmptyHandle,
}

/// Typed configuration for one editing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Handle of the remote document this session edits.
    pub document: DocumentHandle,
}

impl SessionConfig {
    pub fn new(document: DocumentHandle) -> Self {
        Self { document }
    }

    /// Parse the host's JSON configuration, e.g. `{"document": "page/alpha"}`.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = serde_json::from_str(raw)?;
        if config.document.as_str().is_empty() {
            return Err(ConfigError::EmptyHandle);
        }
        Ok(config)
    }
}
