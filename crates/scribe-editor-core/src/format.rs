//! In-place format conversion: swap a line's element kind while preserving
//! its identifier, content, position, and the user's caret.

use scribe_api::ElementKind;
use tracing::debug;

use crate::caret;
use crate::ids::IdProvider;
use crate::surface::{LineNode, NodeIndex, Surface};

/// Convert the focused line to `target`, or create a fresh empty line of
/// that kind when nothing is focused (format actions without a selection
/// insert rather than no-op).
///
/// Conversion measures the caret against the old node first, replaces the
/// node in place with one of the target kind carrying the same identifier
/// and content verbatim, refocuses, and re-applies the measured offset
/// against the new node. Returns the handle of the resulting node.
pub fn convert_focused(
    surface: &mut Surface,
    focus: Option<NodeIndex>,
    target: ElementKind,
    ids: &mut impl IdProvider,
) -> NodeIndex {
    match focus.and_then(|idx| surface.get(idx).cloned().map(|node| (idx, node))) {
        Some((idx, old)) => {
            let offset = caret::measure(surface, idx);

            let replacement = LineNode {
                id: old.id.clone(),
                kind: target,
                content: old.content.clone(),
                editable: true,
                focused: false,
            };
            surface.replace(idx, replacement);
            surface.focus(idx);
            caret::restore(surface, idx, offset);

            debug!(
                from = %old.kind,
                to = %target,
                id = old.id.as_ref().map(|id| id.as_str()).unwrap_or("<untracked>"),
                "line format converted"
            );
            idx
        }
        None => create_line(surface, target, ids),
    }
}

/// Append a brand-new empty editable line of `target` kind and focus it.
///
/// The identifier comes from the provider; on generation failure the line is
/// created without one and stays untracked.
pub fn create_line(
    surface: &mut Surface,
    target: ElementKind,
    ids: &mut impl IdProvider,
) -> NodeIndex {
    let id = ids.generate();
    if id.is_none() {
        debug!(kind = %target, "identifier generation failed, creating untracked line");
    }
    let idx = surface.push(LineNode::new(id, target, "").editable(true));
    surface.focus(idx);
    idx
}
