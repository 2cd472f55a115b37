//! Structure building and rendering: the round-trip between a live surface
//! and the normalized [`DocumentStructure`].
//!
//! Building walks the surface's line nodes in document order and produces a
//! fresh keyed structure each call — the result never aliases a previous
//! snapshot. Rendering is the inverse: it clears the surface and appends one
//! node per record in `order`. Rendering then rebuilding yields an equal
//! structure (content, kind, id, and order all preserved).

use scribe_api::{DocumentStructure, LineRecord};
use tracing::{debug, warn};

use crate::surface::{LineNode, NodeIndex, Surface};

/// Build the normalized structure for the whole surface.
///
/// Lines without a stable identifier cannot be tracked and are skipped.
pub fn build_structure(surface: &Surface) -> DocumentStructure {
    let mut structure = DocumentStructure::new();
    for (idx, node) in surface.iter() {
        match line_record(node, idx.index()) {
            Some(record) => {
                structure.insert(record);
            }
            None => {
                warn!(
                    position = idx.index(),
                    "line without identifier skipped during structure build"
                );
            }
        }
    }
    debug!(lines = structure.len(), "structure built from surface");
    structure
}

/// Build a single-entry structure for one line node.
///
/// This is the blur cycle's scoped build. Returns `None` for a stale handle
/// or a line in degraded (identifier-less) mode.
pub fn build_line(surface: &Surface, idx: NodeIndex) -> Option<DocumentStructure> {
    let node = surface.get(idx)?;
    let record = line_record(node, idx.index())?;
    let mut structure = DocumentStructure::new();
    structure.insert(record);
    Some(structure)
}

fn line_record(node: &LineNode, order: usize) -> Option<LineRecord> {
    let id = node.id.clone()?;
    Some(LineRecord::new(id, node.kind, node.content.as_str(), order))
}

/// Populate `surface` from a structure: clear it, then append one node per
/// record in rendering order.
///
/// Nodes are marked editable only when the session is currently editing.
/// Rendering never assigns focus.
pub fn render_structure(structure: &DocumentStructure, surface: &mut Surface, editable: bool) {
    surface.clear();
    for record in structure.in_order() {
        surface.push(
            LineNode::new(Some(record.id.clone()), record.kind, record.content.as_str())
                .editable(editable),
        );
    }
    debug!(lines = surface.len(), editable, "surface rendered from structure");
}
