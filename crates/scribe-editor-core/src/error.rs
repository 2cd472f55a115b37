//! Error types for the editing engine.
//!
//! No error here crashes a host: every failure degrades to "no structural
//! update this cycle" and leaves stored state untouched.

use scribe_api::{ConfigError, DocumentHandle};
use thiserror::Error;

/// Errors surfaced by the external document store.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StoreError {
    /// The store has no document under this handle.
    #[error("unknown document: {0}")]
    UnknownDocument(DocumentHandle),

    /// The underlying transport or backend failed.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Errors surfaced by the external command bus.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BusError {
    /// Publishing the command failed.
    #[error("command publish failed: {0}")]
    Publish(String),
}

/// Errors raised by an editing session.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SessionError {
    /// Session configuration was missing or malformed; no session was
    /// created.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A store read failed; the affected diff cycle emitted nothing.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The command bus rejected a publish.
    #[error(transparent)]
    Bus(#[from] BusError),

    /// An event referenced a line handle the surface no longer has.
    #[error("no line node at position {0}")]
    StaleNode(usize),
}
