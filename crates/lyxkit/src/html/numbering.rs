//! Section numbers and the table of contents.
//!
//! Numbers are computed on the document tree before any HTML is built.
//! A heading's level is its rank minus one, so with LyX's default depth of 3
//! sections, subsections and subsubsections are numbered. Counters restart
//! inside every section; unnumbered headings and everything below them are
//! skipped.
//!
//! Theorem-like paragraphs are numbered when a theorem module is loaded:
//! `theorems-sec` and `theorems-chap` restart the count in every section or
//! chapter and prefix it with that heading's number, any other theorem
//! module counts through the whole document.

use std::collections::HashMap;

use lyxkit_core::{NodeId, Tree};
use markup5ever_rcdom::Handle;

use super::dom;

/// Depth used when the header does not set `\secnumdepth` or `\tocdepth`.
pub(crate) const DEFAULT_DEPTH: i32 = 3;

const CHAPTER_RANK: i32 = 1;
const SECTION_RANK: i32 = 2;

/// How theorem-like paragraphs are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TheoremNumbering {
    /// One counter for the whole document.
    Global,
    /// The counter restarts in every heading of this rank.
    Within(i32),
}

impl TheoremNumbering {
    /// Numbering selected by the document's layout modules, if any.
    pub fn from_modules(modules: &[String]) -> Option<Self> {
        let loaded = |name: &str| modules.iter().any(|module| module == name);
        if loaded("theorems-chap") {
            Some(Self::Within(CHAPTER_RANK))
        } else if loaded("theorems-sec") {
            Some(Self::Within(SECTION_RANK))
        } else if modules.iter().any(|module| module.starts_with("theorems-")) {
            Some(Self::Global)
        } else {
            None
        }
    }
}

/// One line of the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TocEntry {
    pub level: i32,
    pub label: String,
    pub anchor: String,
    pub title: String,
}

/// Numbers of the headings of one document.
#[derive(Debug, Clone, Default)]
pub(crate) struct Outline {
    labels: HashMap<NodeId, String>,
    anchors: HashMap<NodeId, String>,
    entries: Vec<TocEntry>,
    theorems: HashMap<NodeId, String>,
}

impl Outline {
    /// Walks the section wrappers below `container`.
    pub fn build(tree: &Tree, container: NodeId, secnumdepth: i32, tocdepth: i32) -> Self {
        let mut outline = Self::default();
        outline.walk(tree, container, "", secnumdepth, tocdepth);
        outline
    }

    /// Visible number of a heading, if it is numbered.
    pub fn label(&self, heading: NodeId) -> Option<&str> {
        self.labels.get(&heading).map(String::as_str)
    }

    /// `id` given to a heading listed in the table of contents.
    pub fn anchor(&self, heading: NodeId) -> Option<&str> {
        self.anchors.get(&heading).map(String::as_str)
    }

    pub fn entries(&self) -> &[TocEntry] {
        &self.entries
    }

    /// Number of a theorem-like paragraph, e.g. `2.1`.
    pub fn theorem(&self, paragraph: NodeId) -> Option<&str> {
        self.theorems.get(&paragraph).map(String::as_str)
    }

    /// Numbers the theorem-like paragraphs below `container`.
    ///
    /// Run after [`Outline::build`]: scoped numbers reuse heading labels.
    pub fn number_theorems(
        &mut self,
        tree: &Tree,
        container: NodeId,
        numbering: TheoremNumbering,
    ) {
        let mut prefix: Option<String> = None;
        let mut counter = 0;
        for id in tree.descendants(container) {
            let node = tree.node(id);
            if node.is_section() {
                let TheoremNumbering::Within(scope) = numbering else {
                    continue;
                };
                if node.rank() > scope {
                    continue;
                }
                counter = 0;
                prefix = tree
                    .children(id)
                    .first()
                    .filter(|_| node.rank() == scope)
                    .and_then(|heading| self.labels.get(heading))
                    .cloned();
            } else if node.spec().is_some_and(|spec| spec.is_numbered_theorem()) {
                counter += 1;
                let number = match &prefix {
                    Some(prefix) => format!("{prefix}.{counter}"),
                    None => counter.to_string(),
                };
                self.theorems.insert(id, number);
            }
        }
    }

    fn walk(&mut self, tree: &Tree, container: NodeId, prefix: &str, secnumdepth: i32, tocdepth: i32) {
        let mut counter = 0;
        for &section in tree.children(container) {
            if !tree.node(section).is_section() {
                continue;
            }
            let Some(&heading) = tree.children(section).first() else {
                continue;
            };
            let node = tree.node(heading);
            let level = node.rank() - 1;
            let numbered = node.spec().is_some_and(|spec| spec.is_numbered());
            if !numbered || level > secnumdepth.max(tocdepth) {
                continue;
            }

            counter += 1;
            let label = if prefix.is_empty() {
                counter.to_string()
            } else {
                format!("{prefix}.{counter}")
            };
            if level <= secnumdepth {
                self.labels.insert(heading, label.clone());
            }
            if level <= tocdepth {
                let anchor = format!("{}_{label}", node.key().category());
                self.anchors.insert(heading, anchor.clone());
                self.entries.push(TocEntry {
                    level,
                    label: label.clone(),
                    anchor,
                    title: tree.text_content(heading).lines().concat().trim().to_string(),
                });
            }
            self.walk(tree, section, &label, secnumdepth, tocdepth);
        }
    }
}

/// The entries as nested `ul` lists of links.
pub(crate) fn toc_list(entries: &[TocEntry]) -> Handle {
    let root = dom::element("ul", &[]);
    let base = entries.iter().map(|entry| entry.level).min().unwrap_or(0);
    let mut stack: Vec<(i32, Handle, Option<Handle>)> = vec![(base, root.clone(), None)];

    for entry in entries {
        while stack.len() > 1 && stack.last().is_some_and(|(level, _, _)| entry.level < *level) {
            stack.pop();
        }
        let deeper = stack
            .last()
            .filter(|(level, _, _)| entry.level > *level)
            .and_then(|(_, _, item)| item.clone());
        if let Some(item) = deeper {
            let list = dom::element("ul", &[]);
            dom::append(&item, list.clone());
            stack.push((entry.level, list, None));
        }

        let item = dom::element("li", &[]);
        let href = format!("#{}", entry.anchor);
        let link = dom::element("a", &[("href", href.as_str())]);
        dom::append_text(&link, &format!("{} {}", entry.label, entry.title));
        dom::append(&item, link);
        if let Some((_, list, last)) = stack.last_mut() {
            dom::append(list, item.clone());
            *last = Some(item);
        }
    }
    root
}
