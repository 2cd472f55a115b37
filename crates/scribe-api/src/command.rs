//! Update commands published on the external command bus.

use serde::{Deserialize, Serialize};

use crate::line::{DocumentHandle, DocumentStructure, DocumentVersion};

/// Payload of a line-update command.
///
/// Carries the document version read from the store immediately before the
/// command was built, the handle of the target document, and only the lines
/// that changed in this diff cycle. The authority that applies the command
/// owns version advancement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateLines {
    pub document_version: DocumentVersion,
    pub document: DocumentHandle,
    pub changed_lines: DocumentStructure,
}

/// Commands the editing engine can publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload")]
#[non_exhaustive]
pub enum Command {
    #[serde(rename = "editor.update_lines")]
    UpdateLines(UpdateLines),
}

impl Command {
    pub fn update_lines(
        document_version: DocumentVersion,
        document: DocumentHandle,
        changed_lines: DocumentStructure,
    ) -> Self {
        Command::UpdateLines(UpdateLines {
            document_version,
            document,
            changed_lines,
        })
    }
}
