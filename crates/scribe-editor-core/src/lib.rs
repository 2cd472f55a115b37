//! scribe-editor-core: structural document-editing engine.
//!
//! This crate keeps a server-held line-based document model synchronized
//! with user edits on an editable surface:
//! - `Surface`/`LineNode` - the engine's model of the host editing surface
//! - `structure` - build a normalized structure from the surface and render
//!   it back (exact round-trip)
//! - `caret` - measure and restore char-offset cursor positions
//! - `format` - swap a line's element kind in place, preserving identity,
//!   content, and caret
//! - `diff`/`emit` - per-line change detection against the external store
//!   and batched, versioned update commands on the external bus
//! - `EditSession` - the view/edit state machine routing focus, blur, key,
//!   and format events
//!
//! The document store and command bus are trait seams ([`DocumentStore`],
//! [`CommandBus`]); [`MemoryStore`] and [`RecordingBus`] are in-crate
//! reference implementations.

pub mod caret;
pub mod diff;
pub mod emit;
pub mod error;
pub mod events;
pub mod format;
pub mod ids;
pub mod session;
pub mod store;
pub mod structure;
pub mod surface;

pub use error::{BusError, SessionError, StoreError};
pub use events::{classify, KeyCapture, KeyInput, CAPTURED_COMBOS};
pub use ids::{IdProvider, SequentialIds, UuidIds};
pub use session::{EditSession, SessionMode};
pub use store::{
    CommandBus, DocumentStore, MemoryStore, RecordingBus, StoreCallback, StoreUpdate,
    SubscriptionId,
};
pub use structure::{build_line, build_structure, render_structure};
pub use surface::{Caret, LineNode, NodeIndex, Surface};

pub use scribe_api::{
    Command, ConfigError, DocumentHandle, DocumentStructure, DocumentVersion, ElementKind, LineId,
    LineRecord, SessionConfig, UpdateLines,
};
