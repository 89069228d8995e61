//! Embedded table blocks.
//!
//! A `Tabular` inset holds a `<lyxtabular>` block written in an XML-like
//! markup. The block is collected from the line stream, normalised into
//! well-formed XML and parsed with `roxmltree`. Elements become markup nodes;
//! the text of each cell is fed back through the [`Builder`] with the cell as
//! a floor, so cell contents are ordinary validated nodes.

use std::collections::VecDeque;

use log::debug;

use lyxkit_core::{Node, NodeId, ObjectKey, catalog::Form};

use crate::{
    builder::{Builder, FloorKind},
    error::{Diagnostic, ErrorCode},
    source::{Halt, LineSource, SourceLine},
};

const OPEN: &str = "<lyxtabular";
const CLOSE: &str = "</lyxtabular>";
const CELL: &str = "cell";

/// Parses the block starting at `first` and attaches it to the stack top.
pub(crate) fn parse_block(
    builder: &mut Builder<'_>,
    first: &SourceLine,
    source: &mut dyn LineSource,
) -> Result<(), Halt> {
    let lines = collect(first, source)?;
    let xml = normalize(builder, &lines);
    let document = roxmltree::Document::parse(&xml).map_err(|err| malformed(&lines, &err))?;
    debug!(line = first.number, lines = lines.len(); "Parsed embedded table");

    let mut converter = Converter {
        builder,
        xml: &xml,
        lines: &lines,
        starts: line_starts(&xml),
    };
    converter.ordered(document.root_element())
}

/// Reads lines up to the `</lyxtabular>` matching `first`.
fn collect(first: &SourceLine, source: &mut dyn LineSource) -> Result<Vec<SourceLine>, Halt> {
    let mut lines = vec![first.clone()];
    let mut depth = 1usize;
    while depth > 0 {
        let Some(line) = source.next_line()? else {
            return Err(Diagnostic::error("embedded table is never closed")
                .with_code(ErrorCode::E103)
                .with_label(first.span, "table starts here")
                .with_line(first.number)
                .with_help(format!("add the closing `{CLOSE}` line"))
                .into());
        };
        let trimmed = line.text.trim_start();
        if trimmed.starts_with(OPEN) {
            depth += 1;
        } else if trimmed.starts_with(CLOSE) {
            depth -= 1;
        }
        lines.push(line);
    }
    Ok(lines)
}

/// Rewrites the block as XML, one output line per input line.
///
/// Void elements (`<features>`, `<column>`) are written unclosed and get
/// self-closed here. Inside cells only known element names are tags, so
/// cell text that happens to start with `<` stays text.
fn normalize(builder: &Builder<'_>, lines: &[SourceLine]) -> String {
    let catalog = builder.catalog();
    let mut xml = String::new();
    let mut cells = 0usize;

    for (index, line) in lines.iter().enumerate() {
        if index > 0 {
            xml.push('\n');
        }
        let text = line.text.as_str();
        let tag = tag_name(text).filter(|(name, _)| cells == 0 || catalog.markup(name).is_some());
        let Some((name, closing)) = tag else {
            escape_into(&mut xml, text);
            continue;
        };

        let trimmed = text.trim_end();
        let self_closed = trimmed.ends_with("/>");
        if name == CELL && !self_closed {
            if closing {
                cells = cells.saturating_sub(1);
            } else {
                cells += 1;
            }
        }
        let void = !closing
            && !self_closed
            && catalog
                .markup(name)
                .is_some_and(|spec| spec.closes_immediately());
        if void {
            xml.push_str(&trimmed[..trimmed.len() - 1]);
            xml.push_str("/>");
        } else {
            xml.push_str(text);
        }
    }
    xml
}

/// Name of the element a tag line opens or closes.
fn tag_name(line: &str) -> Option<(&str, bool)> {
    let rest = line.trim_start().strip_prefix('<')?;
    let (closing, rest) = match rest.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, rest),
    };
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .unwrap_or(rest.len());
    let name = &rest[..end];
    (!name.is_empty() && line.trim_end().ends_with('>')).then_some((name, closing))
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn line_starts(xml: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(xml.match_indices('\n').map(|(index, _)| index + 1))
        .collect()
}

/// Splits a text node into the lines it spans.
///
/// The first newline ends the preceding tag line and the last one precedes
/// the following tag. Returns whether a leading newline was dropped.
fn text_lines(text: &str) -> (bool, Vec<&str>) {
    let (skipped, rest) = match text.strip_prefix('\n') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    if rest.is_empty() {
        return (skipped, Vec::new());
    }
    let rest = rest.strip_suffix('\n').unwrap_or(rest);
    (skipped, rest.split('\n').collect())
}

fn malformed(lines: &[SourceLine], err: &roxmltree::Error) -> Halt {
    let first = &lines[0];
    let span = lines
        .iter()
        .fold(first.span, |span, line| span.union(line.span));
    Diagnostic::error(format!("malformed embedded table: {err}"))
        .with_code(ErrorCode::E104)
        .with_label(span, "cannot be read as a table")
        .with_line(first.number + err.pos().row as usize - 1)
        .into()
}

struct Converter<'b, 'p, 'l> {
    builder: &'b mut Builder<'p>,
    xml: &'l str,
    lines: &'l [SourceLine],
    starts: Vec<usize>,
}

impl Converter<'_, '_, '_> {
    /// Captured line holding byte `offset` of the normalised block.
    fn line_index(&self, offset: usize) -> usize {
        self.starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }

    fn line(&self, index: usize) -> &SourceLine {
        &self.lines[index.min(self.lines.len() - 1)]
    }

    /// Converts an element placed by ordering against the stack top.
    ///
    /// The element stays on the stack, closed, so the lines after it land in
    /// its tail.
    fn ordered(&mut self, element: roxmltree::Node<'_, '_>) -> Result<(), Halt> {
        let line = self.line(self.line_index(element.range().start)).clone();
        let id = self.node(element, &line);
        self.builder.order(id, &line)?;
        self.fill(element, id, &line)
    }

    fn child(&mut self, element: roxmltree::Node<'_, '_>, parent: NodeId) -> Result<(), Halt> {
        let line = self.line(self.line_index(element.range().start)).clone();
        let id = self.node(element, &line);
        self.builder
            .tree_mut()
            .append(parent, id)
            .map_err(|err| misplaced(&err.to_string(), &line))?;
        self.builder.attach_frame(id, &line)?;
        self.fill(element, id, &line)?;
        self.builder.pop();
        Ok(())
    }

    fn node(&mut self, element: roxmltree::Node<'_, '_>, line: &SourceLine) -> NodeId {
        let name = element.tag_name().name();
        let key = ObjectKey::new(name, "", "");
        let node = match self.builder.catalog().markup(name) {
            Some(spec) => Node::environment(key, *spec, None),
            None => {
                self.builder
                    .report_unknown(format!("<{name}>"), ErrorCode::W203, line);
                Node::unknown(key, Form::Tag, None)
            }
        };
        self.builder.tree_mut().add(node)
    }

    fn fill(
        &mut self,
        element: roxmltree::Node<'_, '_>,
        id: NodeId,
        line: &SourceLine,
    ) -> Result<(), Halt> {
        for attribute in element.attributes() {
            self.builder
                .tree_mut()
                .set_attribute(id, attribute.name(), attribute.value())
                .map_err(|err| misplaced(&err.to_string(), line))?;
        }

        let is_cell = self
            .builder
            .tree()
            .node(id)
            .spec()
            .is_some_and(|spec| spec.is_cell());
        if is_cell {
            self.cell(element)?;
        } else {
            for child in element.children() {
                if child.is_element() {
                    self.child(child, id)?;
                } else if let Some(text) = child.text().filter(|t| !t.trim().is_empty()) {
                    let (_, lines) = text_lines(text);
                    for text in lines {
                        self.builder.tree_mut().push_text(id, text);
                    }
                }
            }
        }

        // Elements written as `<name/>` have no end marker to give back.
        let self_closed = self
            .xml
            .get(element.range())
            .is_some_and(|source| source.ends_with("/>"));
        let tree = self.builder.tree_mut();
        let void = tree
            .node(id)
            .spec()
            .is_some_and(|spec| spec.closes_immediately());
        if self_closed || void {
            tree.close(id);
        } else {
            tree.close_by_marker(id);
        }
        Ok(())
    }

    /// Feeds the cell's text back through the builder, rooted at the cell.
    fn cell(&mut self, element: roxmltree::Node<'_, '_>) -> Result<(), Halt> {
        self.builder.push_floor(FloorKind::Cell);
        for child in element.children() {
            if child.is_element() {
                self.ordered(child)?;
                continue;
            }
            let Some(text) = child.text() else {
                continue;
            };
            let (skipped, texts) = text_lines(text);
            let first = self.line_index(child.range().start) + usize::from(skipped);
            let mut queue: VecDeque<SourceLine> = texts
                .into_iter()
                .enumerate()
                .map(|(offset, text)| {
                    let origin = self.line(first + offset);
                    SourceLine {
                        text: text.to_string(),
                        number: origin.number,
                        span: origin.span,
                    }
                })
                .collect();
            self.builder.run(&mut queue)?;
        }
        self.builder.unwind_floor();
        Ok(())
    }
}

fn misplaced(message: &str, line: &SourceLine) -> Halt {
    Diagnostic::error(format!("malformed embedded table: {message}"))
        .with_code(ErrorCode::E104)
        .with_label(line.span, "unexpected element")
        .with_line(line.number)
        .into()
}
