//! Change detection between a freshly built structure and the stored
//! document.
//!
//! The baseline is never cached locally: every cycle re-reads the stored
//! value per identifier, so an acknowledged write is picked up on the next
//! comparison without any snapshot bookkeeping in the engine.

use std::collections::BTreeSet;

use scribe_api::{DocumentHandle, DocumentStructure, LineId};
use tracing::{debug, trace};

use crate::error::StoreError;
use crate::store::DocumentStore;

/// Compare `structure` against the stored document, returning the
/// identifiers whose records changed.
///
/// An identifier counts as changed when the store holds no value under it
/// or the stored record differs by value. Comparisons are independent per
/// identifier. Identifiers present only in the store are not reported
/// (deletion is outside this contract).
pub async fn changed_lines(
    structure: &DocumentStructure,
    document: &DocumentHandle,
    store: &impl DocumentStore,
) -> Result<BTreeSet<LineId>, StoreError> {
    let mut changed = BTreeSet::new();
    for record in structure.iter() {
        let stored = store.line(document, &record.id).await?;
        let differs = stored.as_ref() != Some(record);
        trace!(id = %record.id, differs, "line compared against store");
        if differs {
            changed.insert(record.id.clone());
        }
    }
    debug!(
        document = %document,
        candidates = structure.len(),
        changed = changed.len(),
        "diff cycle compared structure against store"
    );
    Ok(changed)
}

/// Restrict a structure to the given identifiers, preserving the records.
pub fn select(structure: &DocumentStructure, ids: &BTreeSet<LineId>) -> DocumentStructure {
    structure
        .iter()
        .filter(|record| ids.contains(&record.id))
        .cloned()
        .collect()
}
