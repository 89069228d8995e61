//! The structural parser.
//!
//! [`Builder`] consumes classified lines and grows a [`Tree`]. Its only state
//! is the branch stack: the chain of nodes from the root to the innermost
//! node that may still receive content. The top of the stack may be closed,
//! in which case plain lines land in that node's tail.
//!
//! Two constructs pin part of the stack with a floor that ordering never
//! unwinds past: the paragraph continued by a `\begin_deeper` block, and a
//! table cell whose contents are fed back through the builder.

use indexmap::IndexSet;
use log::{debug, trace, warn};

use lyxkit_core::{
    Document, Node, NodeId, ObjectKey, Tree, TreeError,
    catalog::{Catalog, Form, ObjectSpec},
    document::DEFAULT_LANGUAGE,
    nesting::{Rejection, can_nest},
};

use crate::{
    ParseConfig,
    classifier::{self, BEGIN, Context, END, Event, Opening},
    embedded,
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    source::{Halt, LineSource, SourceLine},
    span::Span,
};

/// One entry of the branch stack.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frame {
    pub id: NodeId,
    /// Line that opened the node.
    pub line: usize,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FloorKind {
    Deeper,
    Cell,
}

/// Frames below `depth` belong to an enclosing construct.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Floor {
    depth: usize,
    kind: FloorKind,
}

pub(crate) struct Builder<'a> {
    catalog: &'static Catalog,
    config: &'a ParseConfig,
    tree: Tree,
    stack: Vec<Frame>,
    floors: Vec<Floor>,
    diagnostics: DiagnosticCollector,
    unknown_keys: IndexSet<String>,
    language: String,
}

impl<'a> Builder<'a> {
    pub fn new(config: &'a ParseConfig) -> Self {
        let tree = Tree::new();
        let root = Frame {
            id: tree.root(),
            line: 0,
            span: Span::default(),
        };
        Self {
            catalog: Catalog::standard(),
            config,
            tree,
            stack: vec![root],
            floors: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
            unknown_keys: IndexSet::new(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    // ============================================================================
    // Main Entry Methods
    // ============================================================================

    /// Consumes every line of `source`.
    pub fn run(&mut self, source: &mut dyn LineSource) -> Result<(), Halt> {
        while let Some(line) = source.next_line()? {
            self.step(&line, source)?;
        }
        Ok(())
    }

    /// Closes what is still open and hands out the document.
    pub fn finish(mut self) -> Result<(Document, Vec<Diagnostic>), ParseError> {
        let anchors: Vec<usize> = self
            .floors
            .iter()
            .filter(|floor| floor.kind == FloorKind::Deeper)
            .map(|floor| floor.depth - 1)
            .collect();
        for &anchor in &anchors {
            let frame = self.stack[anchor];
            warn!(line = frame.line; "Deeper block never closed");
            self.diagnostics.emit(
                Diagnostic::warning("`\\begin_deeper` block is never closed")
                    .with_code(ErrorCode::W202)
                    .with_label(frame.span, "continues this paragraph")
                    .with_line(frame.line)
                    .with_help("add `\\end_deeper` after the indented paragraphs"),
            );
        }

        // A paragraph continued by a deeper block is reported with the block.
        for (index, frame) in self.stack.iter().enumerate().skip(1) {
            let node = self.tree.node(frame.id);
            if node.is_open() && !node.is_section() && !anchors.contains(&index) {
                warn!(line = frame.line, node = node.describe().as_str(); "Unterminated object");
                self.diagnostics.emit(
                    Diagnostic::warning(format!("`{}` is never closed", node.describe()))
                        .with_code(ErrorCode::W202)
                        .with_label(frame.span, "opened here")
                        .with_line(frame.line),
                );
            }
        }
        for frame in self.stack.drain(..) {
            self.tree.close(frame.id);
        }

        debug!(nodes = self.tree.len(); "Parse finished");
        let warnings = self.diagnostics.finish()?;
        Ok((Document::new(self.tree), warnings))
    }

    /// Turns a fatal halt into the error returned to the caller.
    pub fn fail(self, fatal: Diagnostic) -> ParseError {
        self.diagnostics.fail(fatal)
    }

    fn step(&mut self, line: &SourceLine, source: &mut dyn LineSource) -> Result<(), Halt> {
        let verbatim = self.verbatim_command();
        let top = self.tree.node(self.top());
        let ctx = Context {
            catalog: self.catalog,
            verbatim: verbatim.as_deref(),
            table_context: top.is_open() && top.spec().is_some_and(|s| s.is_table_bearing()),
            in_header: self.in_header(),
            language: &self.language,
        };
        let event = classifier::classify(line, &ctx)?;
        trace!(line = line.number, event:?; "Classified line");

        match event {
            Event::Begin(opening) => self.begin(opening, line, source),
            Event::End(command) => self.end(command, line),
            Event::BeginDeeper => self.begin_deeper(line, source),
            Event::EndDeeper => {
                self.end_deeper(line);
                Ok(())
            }
            Event::EmbeddedBlockStart => embedded::parse_block(self, line, source),
            Event::Text => {
                self.text(line);
                Ok(())
            }
        }
    }

    // ============================================================================
    // Opening
    // ============================================================================

    fn begin(
        &mut self,
        opening: Opening<'_>,
        line: &SourceLine,
        source: &mut dyn LineSource,
    ) -> Result<(), Halt> {
        let key = ObjectKey::new(opening.command, opening.category, opening.details);
        let inline = opening.inline.map(str::to_string);

        let spec = match opening.form {
            Form::Bare if self.in_header() => {
                self.catalog.setting(opening.command, opening.category)
            }
            _ => self
                .catalog
                .lookup(opening.command, opening.category, opening.details)
                .copied(),
        };
        let Some(spec) = spec.filter(|spec| spec.class().form() == opening.form) else {
            return self.unknown(key, opening.form, inline, line, source);
        };

        if spec.is_heading() {
            let section = self.tree.add(Node::section(spec.rank()));
            self.order(section, line)?;
            let heading = self.tree.add(Node::environment(key, spec, inline));
            self.attach(section, heading, line)?;
        } else {
            let id = self.tree.add(Node::environment(key, spec, inline));
            self.order(id, line)?;
            if spec.closes_immediately() {
                self.tree.close(id);
            }
        }
        debug!(line = line.number, key = key.to_string().as_str(); "Opened object");

        if spec.is_setting() && opening.command == "language" {
            self.language = opening.category.to_string();
        }
        Ok(())
    }

    fn unknown(
        &mut self,
        key: ObjectKey,
        form: Form,
        inline: Option<String>,
        line: &SourceLine,
        source: &mut dyn LineSource,
    ) -> Result<(), Halt> {
        let name = match form {
            Form::Begin => key.to_string(),
            Form::Bare | Form::Tag => format!("\\{}", key.command()),
        };
        self.report_unknown(name, ErrorCode::W200, line);

        let id = self.tree.add(Node::unknown(key, form, inline));
        self.order(id, line)?;
        if form == Form::Begin {
            let command = key.command().to_string();
            self.capture(id, &command, line, source)
        } else {
            self.tree.close(id);
            Ok(())
        }
    }

    /// Reports an unknown object or element once per distinct name.
    pub(crate) fn report_unknown(&mut self, name: String, code: ErrorCode, line: &SourceLine) {
        if self.unknown_keys.contains(&name) {
            return;
        }
        warn!(line = line.number, key = name.as_str(); "Unknown object, kept verbatim");
        self.diagnostics.emit(
            Diagnostic::warning(format!("unknown object `{name}`"))
                .with_code(code)
                .with_label(line.span, "not in the catalog")
                .with_line(line.number)
                .with_help("the object is kept verbatim"),
        );
        self.unknown_keys.insert(name);
    }

    /// Copies the body of an unknown begin/end object verbatim.
    fn capture(
        &mut self,
        id: NodeId,
        command: &str,
        opening: &SourceLine,
        source: &mut dyn LineSource,
    ) -> Result<(), Halt> {
        let mut depth = 0usize;
        while let Some(line) = source.next_line()? {
            if line.text.starts_with(BEGIN) {
                depth += 1;
            } else if let Some(rest) = line.text.strip_prefix(END) {
                if depth == 0 {
                    if rest.trim_end() == command {
                        self.tree.close_by_marker(id);
                        return Ok(());
                    }
                    // Someone else's end marker: the object was left open.
                    self.tree.close(id);
                    return self.step(&line, source);
                }
                depth -= 1;
            }
            self.tree.push_line(id, line.text);
        }
        self.unterminated(id, opening);
        Ok(())
    }

    /// Unwinds the stack until its top accepts `id`, then attaches it.
    pub(crate) fn order(&mut self, id: NodeId, line: &SourceLine) -> Result<(), Halt> {
        let floor = self.floor_depth();
        loop {
            let top = self.top();
            let Err(rejection) = self.tree.accepts(top, id) else {
                break;
            };
            if self.stack.len() <= floor {
                return Err(self.exhausted(id, &rejection, line).into());
            }
            trace!(node = self.tree.node(top).describe().as_str(); "Unwinding");
            self.tree.close(top);
            self.stack.pop();
        }
        let parent = self.top();
        self.attach(parent, id, line)
    }

    /// Appends `id` to `parent` and pushes it.
    pub(crate) fn attach(
        &mut self,
        parent: NodeId,
        id: NodeId,
        line: &SourceLine,
    ) -> Result<(), Halt> {
        self.tree
            .append(parent, id)
            .map_err(|err| self.misplaced(err, line))?;
        self.attach_frame(id, line)
    }

    /// Pushes an already appended node.
    pub(crate) fn attach_frame(&mut self, id: NodeId, line: &SourceLine) -> Result<(), Halt> {
        self.stack.push(Frame {
            id,
            line: line.number,
            span: line.span,
        });

        let max_depth = self.config.max_depth();
        if self.stack.len() > max_depth {
            return Err(Diagnostic::error(format!("nesting deeper than {max_depth} levels"))
                .with_code(ErrorCode::E101)
                .with_label(line.span, "too deeply nested")
                .with_line(line.number)
                .with_help("raise `max_depth` in the parser configuration")
                .into());
        }
        Ok(())
    }

    // ============================================================================
    // Closing
    // ============================================================================

    fn end(&mut self, command: &str, line: &SourceLine) -> Result<(), Halt> {
        let floor = self.floor_depth();
        let found = (floor..self.stack.len()).rev().find(|&index| {
            let node = self.tree.node(self.stack[index].id);
            node.is_open() && node.key().command() == command
        });
        let Some(index) = found else {
            self.stray(&format!("{END}{command}"), line);
            return Ok(());
        };

        let target = self.stack[index].id;
        let mut interrupted = Vec::new();
        for frame in self.stack.drain(index + 1..) {
            let node = self.tree.node(frame.id);
            if node.is_open() && node.is_design() {
                interrupted.push(frame.id);
            }
            self.tree.close(frame.id);
        }
        self.tree.close_by_marker(target);
        debug!(line = line.number, command; "Closed object");

        // Font toggles cut by another toggle's end continue after it.
        if self.tree.node(target).is_design() && !interrupted.is_empty() {
            self.stack.pop();
            for id in interrupted {
                let copy = Node::continuation(self.tree.node(id));
                let copy = self.tree.add(copy);
                self.order(copy, line)?;
            }
        }
        Ok(())
    }

    fn stray(&mut self, marker: &str, line: &SourceLine) {
        warn!(line = line.number, marker; "Ignoring stray end marker");
        self.diagnostics.emit(
            Diagnostic::warning(format!("stray end marker `{marker}`"))
                .with_code(ErrorCode::W201)
                .with_label(line.span, "nothing open to close")
                .with_line(line.number)
                .with_help("the marker is ignored"),
        );
    }

    fn unterminated(&mut self, id: NodeId, opening: &SourceLine) {
        let described = self.tree.node(id).describe();
        warn!(line = opening.number, node = described.as_str(); "Unterminated object");
        self.diagnostics.emit(
            Diagnostic::warning(format!("`{described}` is never closed"))
                .with_code(ErrorCode::W202)
                .with_label(opening.span, "opened here")
                .with_line(opening.number),
        );
        self.tree.close(id);
    }

    // ============================================================================
    // Deeper Blocks
    // ============================================================================

    fn begin_deeper(&mut self, line: &SourceLine, source: &mut dyn LineSource) -> Result<(), Halt> {
        let top = self.top();
        let node = self.tree.node(top);
        if node.is_unknown() && !node.is_open() {
            return self.capture_tail(top, line, source);
        }
        if node.is_open() || !node.is_paragraph() {
            let reason = format!("`{}` is not a finished paragraph", node.describe());
            return Err(self.no_paragraph(reason, line).into());
        }

        self.tree
            .reopen(top)
            .map_err(|err| self.no_paragraph(err.to_string(), line))?;
        if let Err(rejection) = can_nest(&Node::deeper(), self.tree.node(top)) {
            return Err(self.no_paragraph(rejection.to_string(), line).into());
        }

        debug!(line = line.number; "Deeper block opened");
        self.push_floor(FloorKind::Deeper);
        Ok(())
    }

    fn end_deeper(&mut self, line: &SourceLine) {
        let Some(floor) = self
            .floors
            .last()
            .copied()
            .filter(|floor| floor.kind == FloorKind::Deeper)
        else {
            self.stray("\\end_deeper", line);
            return;
        };
        for frame in self.stack.drain(floor.depth..) {
            self.tree.close(frame.id);
        }
        let paragraph = self.top();
        self.tree.close(paragraph);
        self.floors.pop();
        debug!(line = line.number; "Deeper block closed");
    }

    /// Keeps a deeper block following an unknown object in its tail.
    fn capture_tail(
        &mut self,
        id: NodeId,
        opening: &SourceLine,
        source: &mut dyn LineSource,
    ) -> Result<(), Halt> {
        self.tree.push_tail(id, opening.text.clone());
        let mut depth = 1usize;
        while depth > 0 {
            let Some(line) = source.next_line()? else {
                self.unterminated(id, opening);
                return Ok(());
            };
            if line.text.starts_with(BEGIN) {
                depth += 1;
            } else if line.text.starts_with(END) {
                depth -= 1;
            }
            self.tree.push_tail(id, line.text);
        }
        Ok(())
    }

    fn no_paragraph(&self, reason: String, line: &SourceLine) -> Diagnostic {
        Diagnostic::error(format!("deeper block without a paragraph: {reason}"))
            .with_code(ErrorCode::E102)
            .with_label(line.span, "nothing to continue")
            .with_line(line.number)
            .with_help("`\\begin_deeper` must follow the `\\end_layout` of a regular paragraph")
    }

    // ============================================================================
    // Text
    // ============================================================================

    fn text(&mut self, line: &SourceLine) {
        let top = self.top();
        let node = self.tree.node(top);
        let field = node
            .spec()
            .filter(|_| node.is_open() && node.children().is_empty())
            .and_then(|spec| field_line(spec, &line.text));

        match field {
            Some(field) => {
                trace!(line = line.number, name = field.name; "Attribute");
                if let Err(err) = self
                    .tree
                    .set_field(top, field.name, field.value, field.separator)
                {
                    debug!(err:%; "Attribute dropped");
                }
            }
            None => self.tree.push_line(top, line.text.clone()),
        }
    }

    // ============================================================================
    // Stack Helpers
    // ============================================================================

    pub(crate) fn catalog(&self) -> &'static Catalog {
        self.catalog
    }

    pub(crate) fn tree(&self) -> &Tree {
        &self.tree
    }

    pub(crate) fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub(crate) fn top(&self) -> NodeId {
        self.stack
            .last()
            .map_or_else(|| self.tree.root(), |frame| frame.id)
    }

    /// Removes the top frame.
    pub(crate) fn pop(&mut self) {
        if self.stack.len() > self.floor_depth() {
            self.stack.pop();
        }
    }

    pub(crate) fn push_floor(&mut self, kind: FloorKind) {
        self.floors.push(Floor {
            depth: self.stack.len(),
            kind,
        });
    }

    /// Closes and pops everything above the innermost floor, then drops it.
    pub(crate) fn unwind_floor(&mut self) {
        let Some(floor) = self.floors.pop() else {
            return;
        };
        for frame in self.stack.drain(floor.depth..) {
            self.tree.close(frame.id);
        }
    }

    fn floor_depth(&self) -> usize {
        self.floors.last().map_or(1, |floor| floor.depth)
    }

    fn verbatim_command(&self) -> Option<String> {
        let node = self.tree.node(self.top());
        (node.is_open() && node.spec().is_some_and(|spec| spec.is_verbatim()))
            .then(|| node.key().command().to_string())
    }

    fn in_header(&self) -> bool {
        self.stack.iter().any(|frame| {
            let node = self.tree.node(frame.id);
            node.is_open() && node.spec().is_some_and(|spec| spec.is_settings_scope())
        })
    }

    fn exhausted(&self, id: NodeId, rejection: &Rejection, line: &SourceLine) -> Diagnostic {
        let trail: Vec<String> = self
            .stack
            .iter()
            .map(|frame| self.tree.node(frame.id).describe())
            .collect();
        let innermost = self.stack[self.floor_depth() - 1];
        Diagnostic::error(format!(
            "cannot place `{}`: {}",
            self.tree.node(id).describe(),
            rejection.reason
        ))
        .with_code(ErrorCode::E100)
        .with_label(line.span, "no open branch accepts this object")
        .with_secondary_label(innermost.span, "innermost branch that cannot be closed")
        .with_line(line.number)
        .with_help(format!("open branch: {}", trail.join(" > ")))
    }

    fn misplaced(&self, err: TreeError, line: &SourceLine) -> Diagnostic {
        Diagnostic::error(format!("cannot place object: {err}"))
            .with_code(ErrorCode::E100)
            .with_label(line.span, "rejected here")
            .with_line(line.number)
    }
}

/// A recognised attribute line.
#[derive(Debug, PartialEq, Eq)]
struct FieldLine<'a> {
    name: &'static str,
    value: String,
    separator: &'a str,
}

/// Recognises an attribute line declared by `spec`, e.g. `status open`.
fn field_line<'a>(spec: &ObjectSpec, text: &'a str) -> Option<FieldLine<'a>> {
    let trimmed = text.trim_start();
    let name_end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
    let (name, rest) = trimmed.split_at(name_end);
    let value = rest.trim();
    let separator = if value.is_empty() {
        ""
    } else {
        &rest[..rest.len() - rest.trim_start().len()]
    };

    let field = spec.field(name)?;
    let value = if field.is_quoted() {
        value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value)
    } else {
        value
    };
    Some(FieldLine {
        name: field.name(),
        value: value.to_string(),
        separator,
    })
}
