//! Line records and the keyed document structure.
//!
//! A document is a flat sequence of line nodes (headings, paragraphs, list
//! items, ...). The normalized form is a map from line identifier to
//! [`LineRecord`]; visual order is carried explicitly on each record rather
//! than implied by map iteration.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Opaque identifier of a line node. Immutable once assigned.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(SmolStr);

impl LineId {
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LineId {
    fn from(s: &str) -> Self {
        Self(SmolStr::new(s))
    }
}

/// Element kind of a line node, mapped to and from its surface tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    #[serde(rename = "h1")]
    H1,
    #[serde(rename = "h2")]
    H2,
    #[serde(rename = "h3")]
    H3,
    #[serde(rename = "h4")]
    H4,
    #[serde(rename = "h5")]
    H5,
    #[serde(rename = "h6")]
    H6,
    #[serde(rename = "p")]
    Paragraph,
    #[serde(rename = "li")]
    ListItem,
    #[serde(rename = "blockquote")]
    Quote,
}

impl ElementKind {
    /// The surface tag for this kind.
    pub fn tag(self) -> &'static str {
        match self {
            ElementKind::H1 => "h1",
            ElementKind::H2 => "h2",
            ElementKind::H3 => "h3",
            ElementKind::H4 => "h4",
            ElementKind::H5 => "h5",
            ElementKind::H6 => "h6",
            ElementKind::Paragraph => "p",
            ElementKind::ListItem => "li",
            ElementKind::Quote => "blockquote",
        }
    }

    /// Parse a surface tag. Unknown tags are not representable.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "h1" => Some(ElementKind::H1),
            "h2" => Some(ElementKind::H2),
            "h3" => Some(ElementKind::H3),
            "h4" => Some(ElementKind::H4),
            "h5" => Some(ElementKind::H5),
            "h6" => Some(ElementKind::H6),
            "p" => Some(ElementKind::Paragraph),
            "li" => Some(ElementKind::ListItem),
            "blockquote" => Some(ElementKind::Quote),
            _ => None,
        }
    }

    pub fn is_heading(self) -> bool {
        matches!(
            self,
            ElementKind::H1
                | ElementKind::H2
                | ElementKind::H3
                | ElementKind::H4
                | ElementKind::H5
                | ElementKind::H6
        )
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One normalized line of the document.
///
/// `content` is the serialized inline markup plus plain text of the line.
/// `order` is the line's visual position among its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecord {
    pub id: LineId,
    pub kind: ElementKind,
    pub content: SmolStr,
    pub order: usize,
}

impl LineRecord {
    pub fn new(id: LineId, kind: ElementKind, content: impl Into<SmolStr>, order: usize) -> Self {
        Self {
            id,
            kind,
            content: content.into(),
            order,
        }
    }
}

/// Normalized, serializable representation of a document's lines.
///
/// Keyed by line identifier. Equality is keyed (insertion order never
/// matters); rendering order comes from each record's `order` field via
/// [`DocumentStructure::in_order`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentStructure {
    lines: HashMap<LineId, LineRecord>,
}

impl DocumentStructure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under its own id, replacing any previous record.
    pub fn insert(&mut self, record: LineRecord) -> Option<LineRecord> {
        self.lines.insert(record.id.clone(), record)
    }

    pub fn get(&self, id: &LineId) -> Option<&LineRecord> {
        self.lines.get(id)
    }

    pub fn contains(&self, id: &LineId) -> bool {
        self.lines.contains_key(id)
    }

    pub fn remove(&mut self, id: &LineId) -> Option<LineRecord> {
        self.lines.remove(id)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Identifiers present in the structure, in unspecified order.
    pub fn ids(&self) -> impl Iterator<Item = &LineId> {
        self.lines.keys()
    }

    /// Records in unspecified order (keyed access).
    pub fn iter(&self) -> impl Iterator<Item = &LineRecord> {
        self.lines.values()
    }

    /// Records sorted by their explicit `order` field (ties broken by id so
    /// the result is deterministic). This is the rendering order.
    pub fn in_order(&self) -> Vec<&LineRecord> {
        let mut records: Vec<&LineRecord> = self.lines.values().collect();
        records.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        records
    }
}

impl FromIterator<LineRecord> for DocumentStructure {
    fn from_iter<I: IntoIterator<Item = LineRecord>>(iter: I) -> Self {
        let mut structure = Self::new();
        for record in iter {
            structure.insert(record);
        }
        structure
    }
}

/// Monotonically increasing document version.
///
/// Read from the external store immediately before building an update
/// command; the engine never increments it locally.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DocumentVersion(pub u64);

impl fmt::Display for DocumentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Opaque reference to the externally owned document an editing session is
/// bound to. Supplied via configuration, never owned by the engine.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentHandle(SmolStr);

impl DocumentHandle {
    pub fn new(handle: impl Into<SmolStr>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentHandle {
    fn from(s: &str) -> Self {
        Self(SmolStr::new(s))
    }
}
