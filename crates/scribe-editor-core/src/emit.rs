//! Building and publishing the versioned line-update command.

use scribe_api::{Command, DocumentHandle, DocumentStructure};
use tracing::debug;

use crate::error::SessionError;
use crate::store::{CommandBus, DocumentStore};

/// Publish one batched update command for the changed lines of a diff
/// cycle.
///
/// The document version is read from the store immediately before the
/// command is built; the engine never advances it. Callers invoke this only
/// for a non-empty changed set — an empty set publishes nothing, by
/// construction of the blur cycle.
pub async fn emit_update(
    store: &impl DocumentStore,
    bus: &impl CommandBus,
    document: &DocumentHandle,
    changed_lines: DocumentStructure,
) -> Result<(), SessionError> {
    debug_assert!(!changed_lines.is_empty());

    let version = store.version(document).await?;
    debug!(
        document = %document,
        %version,
        lines = changed_lines.len(),
        "publishing line update command"
    );
    bus.publish(Command::update_lines(version, document.clone(), changed_lines))
        .await?;
    Ok(())
}
