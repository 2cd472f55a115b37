//! Line identifier generation.
//!
//! Identifiers are assigned once, at line creation. Generation is allowed to
//! fail: a line created without an identifier stays editable but is excluded
//! from structure building and diffing (degraded mode, not fatal).

use scribe_api::LineId;
use smol_str::SmolStr;

/// Source of unique line identifiers.
pub trait IdProvider {
    /// Produce a fresh unique identifier, or `None` when generation is
    /// unavailable.
    fn generate(&mut self) -> Option<LineId>;
}

/// Default provider backed by v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdProvider for UuidIds {
    fn generate(&mut self) -> Option<LineId> {
        let mut buf = uuid::Uuid::encode_buffer();
        let id = uuid::Uuid::new_v4().hyphenated().encode_lower(&mut buf);
        Some(LineId::new(SmolStr::new(&*id)))
    }
}

/// Deterministic sequential provider, for hosts and tests that need stable
/// identifiers.
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdProvider for SequentialIds {
    fn generate(&mut self) -> Option<LineId> {
        let id = LineId::new(smol_str::format_smolstr!("line-{}", self.next));
        self.next += 1;
        Some(id)
    }
}
