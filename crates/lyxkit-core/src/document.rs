//! A parsed LyX document.

use crate::{
    node::Node,
    tree::{NodeId, Tree},
};

/// Document language assumed when the header does not set one.
pub const DEFAULT_LANGUAGE: &str = "english";

/// A document tree plus convenience accessors for its skeleton.
///
/// The tree's root holds the prologue comment as text, the `\lyxformat`
/// setting and the `document` node, which in turn holds `header` and `body`.
#[derive(Debug, Clone, Default)]
pub struct Document {
    tree: Tree,
}

impl Document {
    pub fn new(tree: Tree) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        self.tree.node(id)
    }

    /// The `document` node.
    pub fn document(&self) -> Option<NodeId> {
        self.child_with_command(self.tree.root(), "document")
    }

    pub fn header(&self) -> Option<NodeId> {
        self.document()
            .and_then(|document| self.child_with_command(document, "header"))
    }

    pub fn body(&self) -> Option<NodeId> {
        self.document()
            .and_then(|document| self.child_with_command(document, "body"))
    }

    /// File format number from `\lyxformat`.
    pub fn format(&self) -> Option<u32> {
        let id = self.child_with_command(self.tree.root(), "lyxformat")?;
        let node = self.tree.node(id);
        node.key().category().to_string().parse().ok()
    }

    /// Value of a header setting, e.g. `setting("textclass")`.
    pub fn setting(&self, name: &str) -> Option<String> {
        let header = self.header()?;
        let id = self.child_with_command(header, name)?;
        let node = self.tree.node(id);
        let mut value = node.key().category().to_string();
        for extra in [
            node.key().details().to_string(),
            node.inline().unwrap_or_default().to_string(),
        ] {
            if !extra.is_empty() {
                value.push(' ');
                value.push_str(&extra);
            }
        }
        Some(value)
    }

    /// Document language from the header, or [`DEFAULT_LANGUAGE`].
    pub fn language(&self) -> String {
        self.setting("language")
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
    }

    /// Layout modules listed in the header's `\begin_modules` block.
    pub fn modules(&self) -> Vec<String> {
        let Some(modules) = self
            .header()
            .and_then(|header| self.child_with_command(header, "modules"))
        else {
            return Vec::new();
        };
        self.tree
            .node(modules)
            .text()
            .lines()
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn child_with_command(&self, parent: NodeId, command: &str) -> Option<NodeId> {
        self.tree
            .children(parent)
            .iter()
            .copied()
            .find(|&child| self.tree.node(child).key().command() == command)
    }
}
