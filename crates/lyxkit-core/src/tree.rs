//! Arena-backed document tree.
//!
//! Nodes live in a single vector and refer to each other by [`NodeId`].
//! All structural mutation goes through [`Tree`], which upholds three
//! invariants:
//!
//! - a closed node gains no children and no attributes;
//! - every child passed [`can_nest`] against its parent when it was appended;
//! - a section's first child is its heading.

use log::trace;
use thiserror::Error;

use crate::{
    nesting::{Rejection, can_nest},
    node::{Content, Node},
};

/// Index of a node inside its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Structural mutation refused by the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error(transparent)]
    Nesting(#[from] Rejection),

    #[error("`{0}` is closed")]
    Closed(String),

    #[error("`{0}` already has a parent")]
    AlreadyAttached(String),

    #[error("`{0}` cannot be reopened")]
    NotReopenable(String),
}

/// A document tree rooted at a synthetic root node.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// A tree holding only the open root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::root()],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).children()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent()
    }

    /// Moves a detached node into the arena.
    pub fn add(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Appends the detached node `child` to `parent`.
    ///
    /// Fails when the nesting rules reject the pair.
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let child_node = self.node(child);
        if child_node.parent.is_some() || child == self.root() {
            return Err(TreeError::AlreadyAttached(child_node.describe()));
        }
        can_nest(child_node, self.node(parent))?;

        trace!(parent = parent.0, child = child.0; "Appending node");
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Checks whether `child` could be appended to `parent` right now.
    pub fn accepts(&self, parent: NodeId, child: NodeId) -> Result<(), Rejection> {
        can_nest(self.node(child), self.node(parent))
    }

    /// Closes a node. Closing twice is a no-op.
    pub fn close(&mut self, id: NodeId) {
        self.nodes[id.0].set_open(false);
    }

    /// Closes a node because its own end marker was read.
    pub fn close_by_marker(&mut self, id: NodeId) {
        self.nodes[id.0].set_closed_by_marker();
    }

    /// Reopens a paragraph so that a `\begin_deeper` block can continue it.
    ///
    /// Lines collected in the paragraph's tail since it was closed move to
    /// its gap, so they are written back between `\end_layout` and
    /// `\begin_deeper`.
    pub fn reopen(&mut self, id: NodeId) -> Result<(), TreeError> {
        let node = &mut self.nodes[id.0];
        if !node.is_paragraph() || node.is_continued() {
            return Err(TreeError::NotReopenable(node.describe()));
        }
        let tail = node.tail_mut().take();
        *node.gap_mut() = tail;
        node.set_continued();
        node.set_open(true);
        Ok(())
    }

    /// Routes a raw line: into the text of an open node, else its tail.
    pub fn push_line(&mut self, id: NodeId, line: impl Into<String>) {
        let node = &mut self.nodes[id.0];
        if node.is_open() {
            node.text_mut().push(line);
        } else {
            node.tail_mut().push(line);
        }
    }

    /// Appends a line to the text of a node, open or not.
    ///
    /// Used when assembling a node before it is attached.
    pub fn push_text(&mut self, id: NodeId, line: impl Into<String>) {
        self.nodes[id.0].text_mut().push(line);
    }

    pub fn push_tail(&mut self, id: NodeId, line: impl Into<String>) {
        self.nodes[id.0].tail_mut().push(line);
    }

    /// Sets an attribute on an open node.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), TreeError> {
        let node = &mut self.nodes[id.0];
        if !node.is_open() {
            return Err(TreeError::Closed(node.describe()));
        }
        node.attributes_mut().insert(name.into(), value.into());
        Ok(())
    }

    /// Sets an attribute read from a field line, keeping the spacing that
    /// separated the name from the value.
    pub fn set_field(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<String>,
        separator: &str,
    ) -> Result<(), TreeError> {
        self.set_attribute(id, name, value)?;
        let separators = self.nodes[id.0].separators_mut();
        if separator == " " {
            separators.shift_remove(name);
        } else {
            separators.insert(name.to_string(), separator.to_string());
        }
        Ok(())
    }

    /// Pre-order iterator over `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![id],
        }
    }

    /// Iterator from `id`'s parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), |&current| self.parent(current))
    }

    /// Text of `id` and every descendant, tails included, in document order.
    pub fn text_content(&self, id: NodeId) -> Content {
        let mut content = Content::new();
        self.collect_text(id, &mut content, false);
        content
    }

    fn collect_text(&self, id: NodeId, content: &mut Content, with_tail: bool) {
        let node = self.node(id);
        for line in node.text().lines() {
            content.push(line.as_str());
        }
        for &child in node.children() {
            self.collect_text(child, content, true);
        }
        if with_tail {
            for line in node.tail().lines() {
                content.push(line.as_str());
            }
        }
    }
}

/// See [`Tree::descendants`].
pub struct Descendants<'t> {
    tree: &'t Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
