//! The editable surface: an ordered collection of line nodes plus caret and
//! focus state.
//!
//! This is the engine's stand-in for a host editing surface. Hosts mirror
//! user edits into it (text changes, focus movement) and the engine reads it
//! back out as a normalized structure. Nodes are addressed by [`NodeIndex`]
//! handles rather than by identity; a handle stays valid as long as no node
//! before it is removed.

use scribe_api::{ElementKind, LineId};

/// Handle to one line node in a [`Surface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeIndex(pub(crate) usize);

impl NodeIndex {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Caret position: the active selection start within one node, in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caret {
    pub node: NodeIndex,
    pub offset: usize,
}

/// One structural unit of the edited document.
///
/// `id` is `None` only when identifier generation failed at creation time;
/// such a line stays editable but cannot be individually diffed or tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineNode {
    pub id: Option<LineId>,
    pub kind: ElementKind,
    pub content: String,
    pub editable: bool,
    pub focused: bool,
}

impl LineNode {
    pub fn new(id: Option<LineId>, kind: ElementKind, content: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            content: content.into(),
            editable: false,
            focused: false,
        }
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// Content length in chars (the unit of caret offsets).
    pub fn content_len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Ordered line nodes with at most one caret and at most one focus marker.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    nodes: Vec<LineNode>,
    caret: Option<Caret>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a node, returning its handle.
    pub fn push(&mut self, node: LineNode) -> NodeIndex {
        self.nodes.push(node);
        NodeIndex(self.nodes.len() - 1)
    }

    pub fn get(&self, idx: NodeIndex) -> Option<&LineNode> {
        self.nodes.get(idx.0)
    }

    pub fn get_mut(&mut self, idx: NodeIndex) -> Option<&mut LineNode> {
        self.nodes.get_mut(idx.0)
    }

    /// Replace the node at `idx` in place, returning the old node.
    ///
    /// The handle keeps addressing the same position, so replacement
    /// preserves visual order.
    pub fn replace(&mut self, idx: NodeIndex, node: LineNode) -> Option<LineNode> {
        let slot = self.nodes.get_mut(idx.0)?;
        Some(std::mem::replace(slot, node))
    }

    /// Iterate nodes in document order with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &LineNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeIndex(i), n))
    }

    /// Handle of the last node, if any.
    pub fn last(&self) -> Option<NodeIndex> {
        self.nodes.len().checked_sub(1).map(NodeIndex)
    }

    /// Find a node by its stable identifier.
    pub fn find(&self, id: &LineId) -> Option<NodeIndex> {
        self.nodes
            .iter()
            .position(|n| n.id.as_ref() == Some(id))
            .map(NodeIndex)
    }

    /// Remove every node and drop the caret.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.caret = None;
    }

    /// Toggle the editability flag on every node.
    pub fn set_all_editable(&mut self, editable: bool) {
        for node in &mut self.nodes {
            node.editable = editable;
        }
    }

    /// Move focus to `idx`: the previous focus marker is cleared before the
    /// new one is set, and the caret resets to the start of the node.
    ///
    /// Returns false (leaving the surface untouched) when `idx` is stale.
    pub fn focus(&mut self, idx: NodeIndex) -> bool {
        if idx.0 >= self.nodes.len() {
            return false;
        }
        for node in &mut self.nodes {
            node.focused = false;
        }
        self.nodes[idx.0].focused = true;
        self.caret = Some(Caret {
            node: idx,
            offset: 0,
        });
        true
    }

    /// Clear any focus marker and the caret.
    pub fn clear_focus(&mut self) {
        for node in &mut self.nodes {
            node.focused = false;
        }
        self.caret = None;
    }

    /// Handle of the node currently carrying the focus marker.
    pub fn focused(&self) -> Option<NodeIndex> {
        self.nodes
            .iter()
            .position(|n| n.focused)
            .map(NodeIndex)
    }

    pub fn caret(&self) -> Option<Caret> {
        self.caret
    }

    pub(crate) fn set_caret(&mut self, caret: Option<Caret>) {
        self.caret = caret;
    }
}
