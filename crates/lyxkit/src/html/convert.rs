//! Document tree to DOM conversion.
//!
//! [`Converter`] walks the tree in document order. Every node becomes at most
//! one element whose tag comes from the catalog; its text follows, then its
//! children, and its tail lands in the parent after it. Nodes that only
//! exist in the LyX format (settings, unknown objects, notes) produce no
//! element, but their tails are still rendered.

use log::trace;
use markup5ever_rcdom::Handle;

use lyxkit_core::{Content, Node, NodeId, NodeKind, Tree, catalog::ObjectClass};

use super::{Error, dom, inset, language, numbering::Outline};
use crate::config::HtmlConfig;

pub(crate) struct Converter<'d> {
    tree: &'d Tree,
    config: &'d HtmlConfig,
    outline: Outline,
    footnotes: usize,
    figures: usize,
    tables: usize,
    caption_prefix: Option<String>,
}

impl<'d> Converter<'d> {
    pub fn new(tree: &'d Tree, config: &'d HtmlConfig, outline: Outline) -> Self {
        Self {
            tree,
            config,
            outline,
            footnotes: 0,
            figures: 0,
            tables: 0,
            caption_prefix: None,
        }
    }

    pub fn tree(&self) -> &'d Tree {
        self.tree
    }

    pub fn config(&self) -> &'d HtmlConfig {
        self.config
    }

    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    /// Converts the children of `id` into `parent`.
    ///
    /// Consecutive list paragraphs of the same kind share one list element.
    pub fn children(&mut self, id: NodeId, parent: &Handle) -> Result<(), Error> {
        let tree = self.tree;
        let mut group: Option<(&'static str, Handle)> = None;

        for &child in tree.children(id) {
            let node = tree.node(child);
            let Some(tag) = node.spec().and_then(|spec| spec.group()) else {
                group = None;
                self.node(child, parent)?;
                continue;
            };
            let list = match &group {
                Some((open, list)) if *open == tag => list.clone(),
                _ => {
                    let list = dom::element(tag, &[]);
                    dom::append(parent, list.clone());
                    group = Some((tag, list.clone()));
                    list
                }
            };
            if tag == "dl" {
                self.definition(child, &list)?;
            } else {
                self.node(child, &list)?;
            }
        }
        Ok(())
    }

    /// Converts one node and appends its tail.
    pub fn node(&mut self, id: NodeId, parent: &Handle) -> Result<(), Error> {
        let node = self.tree.node(id);
        match node.kind() {
            NodeKind::Root => self.children(id, parent)?,
            NodeKind::Section => {
                let section = dom::element("section", &[("class", "section")]);
                dom::append(parent, section.clone());
                self.children(id, &section)?;
            }
            NodeKind::Environment => self.environment(id, parent)?,
            NodeKind::Unknown(_) | NodeKind::Deeper => {
                trace!(node = node.describe().as_str(); "Skipping node without HTML form");
            }
        }
        dom::append_text(parent, &joined(node.tail()));
        Ok(())
    }

    fn environment(&mut self, id: NodeId, parent: &Handle) -> Result<(), Error> {
        let node = self.tree.node(id);
        let Some(spec) = node.spec() else {
            return Ok(());
        };
        match spec.class() {
            ObjectClass::Layout => self.layout(id, parent),
            ObjectClass::Inset => inset::convert(self, id, parent),
            ObjectClass::Design => self.design(id, parent),
            ObjectClass::ParagraphSetting => {
                paragraph_setting(node, parent);
                Ok(())
            }
            // Skeleton, settings and table markup are handled by their owners.
            ObjectClass::Primary | ObjectClass::Setting | ObjectClass::Markup => Ok(()),
        }
    }

    /// Creates the element of `node` with its class and data attributes.
    pub fn open(&self, node: &Node, tag: &str) -> Handle {
        let element = dom::element(tag, &[("class", class_name(node).as_str())]);
        self.data_attributes(node, &element);
        element
    }

    /// Mirrors the node's attributes as `data-*` when configured; otherwise
    /// only a file name survives.
    pub fn data_attributes(&self, node: &Node, element: &Handle) {
        for (name, value) in node.attributes() {
            if self.config.keep_data() || name == "filename" {
                dom::set_attribute(element, &format!("data-{name}"), &value.replace('"', ""));
            }
        }
    }

    /// Appends the node's own text, then converts its children.
    pub fn content(&mut self, id: NodeId, element: &Handle) -> Result<(), Error> {
        dom::append_text(element, &joined(self.tree.node(id).text()));
        self.children(id, element)
    }

    fn layout(&mut self, id: NodeId, parent: &Handle) -> Result<(), Error> {
        let node = self.tree.node(id);
        let tag = node.tag();
        let element = self.open(node, tag);

        if node.is_heading() {
            if let Some(anchor) = self.outline.anchor(id) {
                dom::set_attribute(&element, "id", anchor);
            }
            if let Some(label) = self.outline.label(id) {
                let span = dom::element("span", &[("class", "label")]);
                dom::append_text(&span, &format!("{label} "));
                dom::append(&element, span);
            }
        }
        if let Some(number) = self.outline.theorem(id) {
            let name = node.key().category().to_string();
            dom::set_attribute(&element, "id", &format!("{name}_{number}"));
            let span = dom::element("span", &[("class", "label")]);
            dom::append_text(&span, &format!("{name} {number}. "));
            dom::append(&element, span);
        }
        dom::append(parent, element.clone());
        self.content(id, &element)
    }

    /// A description item: the first word is the term.
    fn definition(&mut self, id: NodeId, list: &Handle) -> Result<(), Error> {
        let node = self.tree.node(id);
        let class = class_name(node);
        let item = dom::element("div", &[("class", format!("{class} item").as_str())]);
        dom::append(list, item.clone());

        let text = joined(node.text());
        let (term, rest) = match text.trim_start().split_once(char::is_whitespace) {
            Some((term, rest)) => (term.to_string(), rest.to_string()),
            None => (text.trim().to_string(), String::new()),
        };
        let dt = dom::element("dt", &[("class", class.as_str())]);
        dom::append_text(&dt, &term);
        dom::append(&item, dt);

        let dd = self.open(node, "dd");
        dom::append_text(&dd, &rest);
        dom::append(&item, dd.clone());
        self.children(id, &dd)?;
        dom::append_text(list, &joined(node.tail()));
        Ok(())
    }

    fn design(&mut self, id: NodeId, parent: &Handle) -> Result<(), Error> {
        let node = self.tree.node(id);
        let command = node.key().command().to_string();
        let value = node.key().category().to_string();

        if node.spec().is_some_and(|spec| spec.closes_immediately()) {
            match command.as_str() {
                "backslash" => dom::append_text(parent, "\\"),
                "SpecialChar" => dom::append_text(parent, special_char(&value)),
                "lyxline" => dom::append(parent, dom::element("hr", &[])),
                _ => {}
            }
            return Ok(());
        }

        let element = self.open(node, node.tag());
        if let Some(style) = design_style(&command, &value) {
            dom::add_style(&element, &style);
        }
        if command == "lang" {
            if let Some(code) = language::code(&value) {
                dom::set_attribute(&element, "lang", code);
            }
            let dir = if language::is_rtl(&value) { "rtl" } else { "ltr" };
            dom::set_attribute(&element, "dir", dir);
        }
        dom::append(parent, element.clone());
        self.content(id, &element)
    }

    pub fn next_footnote(&mut self) -> usize {
        self.footnotes += 1;
        self.footnotes
    }

    /// Label for the caption of the next float of `kind`.
    pub fn start_float(&mut self, kind: &str) {
        self.caption_prefix = match kind {
            "figure" => {
                self.figures += 1;
                Some(format!("Figure {}: ", self.figures))
            }
            "table" => {
                self.tables += 1;
                Some(format!("Table {}: ", self.tables))
            }
            _ => None,
        };
    }

    pub fn end_float(&mut self) {
        self.caption_prefix = None;
    }

    pub fn take_caption_prefix(&mut self) -> Option<String> {
        self.caption_prefix.take()
    }
}

/// Lines of LyX text as they read in the output.
///
/// LyX breaks long lines after a space, so the lines are concatenated.
pub(crate) fn joined(content: &Content) -> String {
    content.lines().concat()
}

/// Class attribute of a node: its key, with a trailing `*` made CSS-safe.
pub(crate) fn class_name(node: &Node) -> String {
    let class = node.key().to_string();
    match class.strip_suffix('*') {
        Some(stripped) => format!("{stripped}_"),
        None => class,
    }
}

fn paragraph_setting(node: &Node, parent: &Handle) {
    let command = node.key().command();
    let value = node.key().category().to_string();
    if command == "align" {
        let align = match value.as_str() {
            "block" => "justify",
            other => other,
        };
        dom::add_style(parent, &format!("text-align: {align}"));
    } else if command == "noindent" {
        dom::add_style(parent, "text-indent: 0");
    }
}

fn design_style(command: &str, value: &str) -> Option<String> {
    let style = match (command, value) {
        ("series", "bold") => "font-weight: bold",
        ("series", "medium") => "font-weight: normal",
        ("shape", "italic") => "font-style: italic",
        ("shape", "slanted") => "font-style: oblique",
        ("shape", "smallcaps") => "font-variant: small-caps",
        ("shape", "up") => "font-style: normal",
        ("family", "sans") => "font-family: sans-serif",
        ("family", "typewriter") => "font-family: monospace",
        ("family", "roman") => "font-family: serif",
        ("size", size) => return font_size(size).map(|size| format!("font-size: {size}")),
        ("bar", "under") => "text-decoration: underline",
        ("strikeout", "on") | ("xout", "on") => "text-decoration: line-through",
        ("uuline", "on") => "text-decoration: underline double",
        ("uwave", "on") => "text-decoration: underline wavy",
        ("noun", "on") => "font-variant: small-caps",
        ("color", color) => return Some(format!("color: {color}")),
        _ => return None,
    };
    Some(style.to_string())
}

fn font_size(size: &str) -> Option<&'static str> {
    let css = match size {
        "tiny" => "xx-small",
        "scriptsize" => "x-small",
        "footnotesize" | "small" => "small",
        "normal" => "medium",
        "large" => "large",
        "larger" => "x-large",
        "largest" | "huge" => "xx-large",
        "giant" => "xxx-large",
        _ => return None,
    };
    Some(css)
}

fn special_char(name: &str) -> &'static str {
    match name {
        "ldots" => "\u{2026}",
        "menuseparator" => "\u{25b8}",
        "softhyphen" => "\u{ad}",
        "ligaturebreak" => "\u{200c}",
        "nobreakdash" => "\u{2011}",
        "slash" => "/",
        "LyX" => "LyX",
        "TeX" => "TeX",
        "LaTeX" => "LaTeX",
        "LaTeX2e" => "LaTeX2\u{3b5}",
        "xetex" => "XeTeX",
        _ => "",
    }
}
