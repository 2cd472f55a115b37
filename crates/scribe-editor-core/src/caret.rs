//! Caret measurement and restoration.
//!
//! Offsets are counted in chars from the start of a node's content to the
//! active selection start. The pairing is exact: restoring a measured offset
//! puts the caret back where it was, for any offset within the content.

use tracing::trace;

use crate::surface::{Caret, NodeIndex, Surface};

/// Measure the caret offset relative to `node`.
///
/// Returns 0 when there is no active caret or the caret sits in a different
/// node — absence of a selection is the default case, not an error.
pub fn measure(surface: &Surface, node: NodeIndex) -> usize {
    match surface.caret() {
        Some(caret) if caret.node == node => {
            let len = surface.get(node).map(|n| n.content_len()).unwrap_or(0);
            caret.offset.min(len)
        }
        _ => 0,
    }
}

/// Place the caret at char position `offset` inside `node`, clamped to the
/// content length.
///
/// Offset 0 is skipped silently: it is the no-op default (focusing a node
/// already put the caret at its start), so there is nothing to restore.
pub fn restore(surface: &mut Surface, node: NodeIndex, offset: usize) {
    if offset == 0 {
        return;
    }
    let Some(line) = surface.get(node) else {
        trace!(node = node.index(), "caret restore on stale handle, skipped");
        return;
    };
    let clamped = offset.min(line.content_len());
    surface.set_caret(Some(Caret {
        node,
        offset: clamped,
    }));
}

/// Place the caret at the end of `node`'s content.
pub fn place_at_end(surface: &mut Surface, node: NodeIndex) {
    let Some(line) = surface.get(node) else {
        return;
    };
    let end = line.content_len();
    surface.set_caret(Some(Caret { node, offset: end }));
}
