//! scribe-api: shared types for the scribe structural document editor.
//!
//! This crate defines the data model exchanged between the editing engine
//! (`scribe-editor-core`), the external document store, and the command bus:
//! - Line records and the keyed document structure
//! - Document handles and versions
//! - The versioned line-update command
//! - Host session configuration

pub mod command;
pub mod config;
pub mod line;

pub use command::{Command, UpdateLines};
pub use config::{ConfigError, SessionConfig};
pub use line::{DocumentHandle, DocumentStructure, DocumentVersion, ElementKind, LineId, LineRecord};
