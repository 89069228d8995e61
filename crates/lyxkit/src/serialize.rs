//! Writing a document tree back as LyX text.
//!
//! The serializer is the inverse of the parser: every line the parser kept
//! (opening markers, attribute lines, text, blank lines, tails) is written
//! back in document order. Markers the parser inferred are not invented;
//! an object closed by an outer marker gets no end marker of its own. The
//! exception is a paragraph followed by a deeper block, which must end
//! before `\begin_deeper` to be read back.
//!
//! Two constructs have no node of their own and are regenerated:
//!
//! - section wrappers write only their children;
//! - a paragraph holding paragraphs is written as the paragraph, followed by
//!   its children inside a `\begin_deeper` ... `\end_deeper` block.

use log::debug;

use lyxkit_core::{
    Document, Node, NodeId, NodeKind, Tree,
    catalog::{EndToken, Form, ObjectSpec},
};

use crate::error::SerializeError;

/// Serializes a whole document.
///
/// # Errors
///
/// Returns [`SerializeError::MissingRequiredField`] when an object lacks an
/// attribute line the catalog marks as required.
pub fn serialize(document: &Document) -> Result<String, SerializeError> {
    let language = document.language();
    let mut serializer = Serializer::new(document.tree(), &language);
    serializer.node(document.root())?;
    debug!(bytes = serializer.out.len(); "Document serialized");
    Ok(serializer.out)
}

/// Serializes the subtree rooted at `id`.
///
/// `language` closes `\lang` toggles; pass the document language.
pub fn serialize_node(tree: &Tree, id: NodeId, language: &str) -> Result<String, SerializeError> {
    let mut serializer = Serializer::new(tree, language);
    serializer.node(id)?;
    Ok(serializer.out)
}

struct Serializer<'t> {
    tree: &'t Tree,
    language: &'t str,
    out: String,
}

impl<'t> Serializer<'t> {
    fn new(tree: &'t Tree, language: &'t str) -> Self {
        Self {
            tree,
            language,
            out: String::new(),
        }
    }

    fn node(&mut self, id: NodeId) -> Result<(), SerializeError> {
        let node = self.tree.node(id);
        match node.kind() {
            NodeKind::Root => {
                self.lines(node.text().lines());
                self.children(node.children())
            }
            NodeKind::Section => {
                self.children(node.children())?;
                self.lines(node.tail().lines());
                Ok(())
            }
            NodeKind::Environment => self.environment(node),
            NodeKind::Unknown(form) => self.unknown(node, form),
            // Deeper markers only exist while validating.
            NodeKind::Deeper => Ok(()),
        }
    }

    fn children(&mut self, children: &[NodeId]) -> Result<(), SerializeError> {
        for &child in children {
            self.node(child)?;
        }
        Ok(())
    }

    fn environment(&mut self, node: &'t Node) -> Result<(), SerializeError> {
        let Some(spec) = node.spec() else {
            return Ok(());
        };
        if spec.is_markup() {
            if spec.closes_immediately() {
                self.line(&start_tag(node));
            } else {
                self.element(node)?;
            }
            self.lines(node.tail().lines());
            return Ok(());
        }

        if node.opened_by_marker() {
            let line = opening(node, spec.class().form(), spec.has_inline_argument());
            self.line(&line);
        }
        self.fields(node, spec)?;
        self.lines(node.text().lines());

        let children = node.children();
        let split = children
            .iter()
            .position(|&child| self.tree.node(child).is_paragraph_like())
            .unwrap_or(children.len());
        let deeper = node.is_paragraph() && (node.is_continued() || split < children.len());

        if deeper {
            self.children(&children[..split])?;
            // `\begin_deeper` only follows a finished paragraph, so the end
            // marker is written even when an outer marker closed the input.
            self.closing_line(node, spec);
            self.lines(node.gap().lines());
            self.line("\\begin_deeper");
            self.children(&children[split..])?;
            self.line("\\end_deeper");
        } else {
            self.children(children)?;
            self.end_marker(node, spec);
        }
        self.lines(node.tail().lines());
        Ok(())
    }

    /// Attribute lines, in the order the catalog declares them.
    fn fields(&mut self, node: &Node, spec: &ObjectSpec) -> Result<(), SerializeError> {
        for field in spec.fields() {
            let Some(value) = node.attribute(field.name()) else {
                if field.is_required() {
                    return Err(SerializeError::MissingRequiredField {
                        object: node.describe(),
                        field: field.name(),
                    });
                }
                continue;
            };
            let indent = spec.field_indent();
            let name = field.name();
            let separator = node.field_separator(name);
            let line = if field.is_quoted() {
                format!("{indent}{name}{separator}\"{value}\"")
            } else if value.is_empty() {
                format!("{indent}{name}")
            } else {
                format!("{indent}{name}{separator}{value}")
            };
            self.line(&line);
        }
        Ok(())
    }

    fn end_marker(&mut self, node: &Node, spec: &ObjectSpec) {
        if node.closed_by_marker() {
            self.closing_line(node, spec);
        }
    }

    fn closing_line(&mut self, node: &Node, spec: &ObjectSpec) {
        let command = node.key().command();
        let line = match spec.end_token() {
            EndToken::Standard => format!("\\end_{command}"),
            EndToken::Sentinel(word) => format!("\\{command} {word}"),
            EndToken::DocumentLanguage => format!("\\{command} {}", self.language),
            EndToken::None => return,
        };
        self.line(&line);
    }

    fn unknown(&mut self, node: &Node, form: Form) -> Result<(), SerializeError> {
        match form {
            Form::Tag => self.element(node)?,
            Form::Begin | Form::Bare => {
                self.line(&opening(node, form, false));
                self.lines(node.text().lines());
                if form == Form::Begin && node.closed_by_marker() {
                    self.line(&format!("\\end_{}", node.key().command()));
                }
            }
        }
        self.lines(node.tail().lines());
        Ok(())
    }

    /// An embedded element with its text and children.
    ///
    /// Elements closed without an end tag were self-closed in the input.
    fn element(&mut self, node: &Node) -> Result<(), SerializeError> {
        let tag = start_tag(node);
        if !node.closed_by_marker() && node.text().is_empty() && node.children().is_empty() {
            self.line(&format!("{}/>", &tag[..tag.len() - 1]));
            return Ok(());
        }
        self.line(&tag);
        self.lines(node.text().lines());
        self.children(node.children())?;
        if node.closed_by_marker() {
            self.line(&format!("</{}>", node.key().command()));
        }
        Ok(())
    }

    fn line(&mut self, line: &str) {
        self.out.push_str(line);
        self.out.push('\n');
    }

    fn lines(&mut self, lines: &[String]) {
        for line in lines {
            self.line(line);
        }
    }
}

/// Rebuilds the opening line of a begin/end or bare object.
///
/// Words are joined with single spaces, the way the classifier split them.
fn opening(node: &Node, form: Form, inline_argument: bool) -> String {
    let key = node.key();
    let mut line = match form {
        Form::Begin => format!("\\begin_{}", key.command()),
        Form::Bare | Form::Tag => format!("\\{}", key.command()),
    };
    let category = key.category().to_string();
    let details = key.details().to_string();
    let inline = node.inline();

    if !category.is_empty() || !details.is_empty() || inline.is_some() {
        line.push(' ');
        line.push_str(&category);
    }
    if !inline_argument && (!details.is_empty() || inline.is_some()) {
        line.push(' ');
        line.push_str(&details);
    }
    if let Some(inline) = inline {
        line.push(' ');
        line.push_str(inline);
    }
    line
}

fn start_tag(node: &Node) -> String {
    let mut tag = format!("<{}", node.key().command());
    for (name, value) in node.attributes() {
        tag.push(' ');
        tag.push_str(name);
        tag.push_str("=\"");
        escape_attribute(&mut tag, value);
        tag.push('"');
    }
    tag.push('>');
    tag
}

fn escape_attribute(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
