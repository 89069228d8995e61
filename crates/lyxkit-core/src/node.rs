//! The document tree element.

use std::fmt;

use indexmap::IndexMap;

use crate::{
    catalog::{DEFAULT_RANK, Form, HEADING_MAX, ObjectClass, ObjectSpec, PRIMARY_SENTINEL},
    identifier::Id,
    tree::NodeId,
};

/// The `(command, category, details)` triple naming an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ObjectKey {
    command: Id,
    category: Id,
    details: Id,
}

impl ObjectKey {
    pub fn new(command: &str, category: &str, details: &str) -> Self {
        Self {
            command: Id::new(command),
            category: Id::new(category),
            details: Id::new(details),
        }
    }

    /// The key of synthetic nodes.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn command(&self) -> Id {
        self.command
    }

    pub fn category(&self) -> Id {
        self.category
    }

    pub fn details(&self) -> Id {
        self.details
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for word in [self.command, self.category, self.details] {
            if word.is_empty() {
                continue;
            }
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{word}")?;
            first = false;
        }
        Ok(())
    }
}

/// What a node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The synthetic top of every tree; holds the prologue and the document.
    Root,
    /// An object known to the catalog.
    Environment,
    /// Synthetic wrapper grouping a heading with its subordinate content.
    Section,
    /// An object the catalog does not know, kept verbatim.
    Unknown(Form),
    /// Indentation marker, only used to validate `\begin_deeper`.
    Deeper,
}

/// A sequence of raw lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Content(Vec<String>);

impl Content {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.0.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `true` when there is no line with visible content.
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(|line| line.trim().is_empty())
    }

    /// The lines joined with `\n`.
    pub fn joined(&self) -> String {
        self.0.join("\n")
    }

    pub(crate) fn take(&mut self) -> Content {
        std::mem::take(self)
    }
}

impl<S: Into<String>> FromIterator<S> for Content {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// One element of the document tree.
///
/// Nodes are created detached and become part of a [`Tree`](crate::tree::Tree)
/// through [`Tree::append`](crate::tree::Tree::append), which enforces the
/// nesting rules.
#[derive(Debug, Clone)]
pub struct Node {
    kind: NodeKind,
    key: ObjectKey,
    spec: Option<ObjectSpec>,
    rank: i32,
    inline: Option<String>,
    attributes: IndexMap<String, String>,
    /// Spacing between a field name and its value, when not a single space.
    separators: IndexMap<String, String>,
    text: Content,
    gap: Content,
    tail: Content,
    open: bool,
    opened_by_marker: bool,
    closed_by_marker: bool,
    continued: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    fn with_kind(kind: NodeKind, key: ObjectKey, spec: Option<ObjectSpec>, rank: i32) -> Self {
        Self {
            kind,
            key,
            spec,
            rank,
            inline: None,
            attributes: IndexMap::new(),
            separators: IndexMap::new(),
            text: Content::new(),
            gap: Content::new(),
            tail: Content::new(),
            open: true,
            opened_by_marker: true,
            closed_by_marker: false,
            continued: false,
            parent: None,
            children: Vec::new(),
        }
    }

    pub(crate) fn root() -> Self {
        Self::with_kind(NodeKind::Root, ObjectKey::empty(), None, PRIMARY_SENTINEL)
    }

    /// A known object described by `spec`.
    pub fn environment(key: ObjectKey, spec: ObjectSpec, inline: Option<String>) -> Self {
        let mut node = Self::with_kind(NodeKind::Environment, key, Some(spec), spec.rank());
        node.inline = inline;
        node
    }

    /// A fresh copy of a font toggle that an outer end marker interrupted.
    ///
    /// The copy continues the toggle after the interruption; the input has
    /// no opening marker for it, so none is written back.
    pub fn continuation(of: &Node) -> Self {
        let mut node = Self::with_kind(of.kind, of.key, of.spec, of.rank);
        node.inline = of.inline.clone();
        node.opened_by_marker = false;
        node
    }

    /// A wrapper for a heading of the given rank.
    pub fn section(rank: i32) -> Self {
        Self::with_kind(NodeKind::Section, ObjectKey::empty(), None, rank)
    }

    /// An object missing from the catalog.
    pub fn unknown(key: ObjectKey, form: Form, inline: Option<String>) -> Self {
        let mut node = Self::with_kind(NodeKind::Unknown(form), key, None, DEFAULT_RANK);
        node.inline = inline;
        node
    }

    /// The marker validated when a `\begin_deeper` continues a paragraph.
    pub fn deeper() -> Self {
        Self::with_kind(
            NodeKind::Deeper,
            ObjectKey::new("deeper", "", ""),
            None,
            DEFAULT_RANK,
        )
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn key(&self) -> ObjectKey {
        self.key
    }

    pub fn spec(&self) -> Option<&ObjectSpec> {
        self.spec.as_ref()
    }

    pub fn class(&self) -> Option<ObjectClass> {
        self.spec.map(|spec| spec.class())
    }

    pub fn rank(&self) -> i32 {
        self.rank
    }

    /// Remainder of the opening line after the key, if any.
    pub fn inline(&self) -> Option<&str> {
        self.inline.as_deref()
    }

    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Whitespace written between the field `name` and its value.
    pub fn field_separator(&self, name: &str) -> &str {
        self.separators.get(name).map_or(" ", String::as_str)
    }

    pub fn text(&self) -> &Content {
        &self.text
    }

    /// Lines between a paragraph's `\end_layout` and the `\begin_deeper`
    /// that continued it.
    pub fn gap(&self) -> &Content {
        &self.gap
    }

    pub fn tail(&self) -> &Content {
        &self.tail
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// `false` for nodes whose opening line is implied, see
    /// [`Node::continuation`].
    pub fn opened_by_marker(&self) -> bool {
        self.opened_by_marker
    }

    /// `true` once the node's own end marker has closed it.
    pub fn closed_by_marker(&self) -> bool {
        self.closed_by_marker
    }

    /// `true` for a paragraph continued by a `\begin_deeper` block.
    pub fn is_continued(&self) -> bool {
        self.continued
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// HTML tag from the catalog; wrappers render as `section`.
    pub fn tag(&self) -> &'static str {
        match self.kind {
            NodeKind::Section => "section",
            NodeKind::Environment => self.spec.map_or("span", |spec| spec.tag()),
            NodeKind::Root | NodeKind::Unknown(_) | NodeKind::Deeper => "",
        }
    }

    pub fn is_root(&self) -> bool {
        self.kind == NodeKind::Root
    }

    pub fn is_section(&self) -> bool {
        self.kind == NodeKind::Section
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.kind, NodeKind::Unknown(_))
    }

    pub fn is_deeper(&self) -> bool {
        self.kind == NodeKind::Deeper
    }

    pub fn is_heading(&self) -> bool {
        self.spec.is_some_and(|spec| spec.is_heading())
    }

    pub fn is_paragraph(&self) -> bool {
        self.spec.is_some_and(|spec| spec.is_paragraph())
    }

    pub fn is_inset(&self) -> bool {
        self.spec.is_some_and(|spec| spec.is_inset())
    }

    pub fn is_design(&self) -> bool {
        self.spec.is_some_and(|spec| spec.is_design())
    }

    pub fn is_markup(&self) -> bool {
        self.spec.is_some_and(|spec| spec.is_markup())
    }

    /// A paragraph-level node: a layout, or a section wrapping one.
    pub fn is_paragraph_like(&self) -> bool {
        self.is_paragraph() || self.is_section()
    }

    /// Regular content rank: neither primary nor heading.
    pub fn has_regular_rank(&self) -> bool {
        self.rank > HEADING_MAX
    }

    /// Short human-readable name for diagnostics.
    pub fn describe(&self) -> String {
        match self.kind {
            NodeKind::Root => "document root".to_string(),
            NodeKind::Section => format!("section (rank {})", self.rank),
            NodeKind::Deeper => "deeper block".to_string(),
            NodeKind::Environment | NodeKind::Unknown(_) => self.key.to_string(),
        }
    }

    pub(crate) fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    pub(crate) fn set_continued(&mut self) {
        self.continued = true;
    }

    pub(crate) fn set_closed_by_marker(&mut self) {
        self.open = false;
        self.closed_by_marker = true;
    }

    pub(crate) fn text_mut(&mut self) -> &mut Content {
        &mut self.text
    }

    pub(crate) fn tail_mut(&mut self) -> &mut Content {
        &mut self.tail
    }

    pub(crate) fn gap_mut(&mut self) -> &mut Content {
        &mut self.gap
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut IndexMap<String, String> {
        &mut self.attributes
    }

    pub(crate) fn separators_mut(&mut self) -> &mut IndexMap<String, String> {
        &mut self.separators
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn test_key_display_skips_empty_words() {
        assert_eq!(
            ObjectKey::new("inset", "CommandInset", "ref").to_string(),
            "inset CommandInset ref"
        );
        assert_eq!(ObjectKey::new("layout", "Standard", "").to_string(), "layout Standard");
        assert_eq!(ObjectKey::empty().to_string(), "");
    }

    #[test]
    fn test_environment_takes_rank_from_spec() {
        let spec = *Catalog::standard().lookup("layout", "Subsection", "").unwrap();
        let node = Node::environment(ObjectKey::new("layout", "Subsection", ""), spec, None);
        assert_eq!(node.rank(), 3);
        assert!(node.is_heading());
        assert!(node.is_open());
        assert_eq!(node.tag(), "h3");
    }

    #[test]
    fn test_synthetic_nodes() {
        let section = Node::section(2);
        assert!(section.is_section());
        assert_eq!(section.tag(), "section");
        assert_eq!(section.describe(), "section (rank 2)");

        let unknown = Node::unknown(ObjectKey::new("inset", "Hologram", ""), Form::Begin, None);
        assert!(unknown.is_unknown());
        assert_eq!(unknown.rank(), DEFAULT_RANK);
        assert_eq!(unknown.describe(), "inset Hologram");
    }

    #[test]
    fn test_continuation_copies_key_without_opening_marker() {
        let spec = *Catalog::standard().lookup("shape", "italic", "").unwrap();
        let shape = Node::environment(ObjectKey::new("shape", "italic", ""), spec, None);
        let copy = Node::continuation(&shape);
        assert_eq!(copy.key(), shape.key());
        assert!(copy.is_open());
        assert!(shape.opened_by_marker());
        assert!(!copy.opened_by_marker());
    }

    #[test]
    fn test_content_joined() {
        let content: Content = ["Hello", "", "World"].into_iter().collect();
        assert_eq!(content.joined(), "Hello\n\nWorld");
        assert!(!content.is_blank());
        assert!(Content::from_iter(["", "  "]).is_blank());
    }
}
