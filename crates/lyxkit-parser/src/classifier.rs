//! Line classification.
//!
//! Every input line is turned into one [`Event`] before the builder acts on
//! it. Classification depends on a little context taken from the branch
//! stack: an open verbatim region swallows everything up to its end marker,
//! an open table inset recognises the start of an embedded block, and inside
//! the header bare lines are document settings rather than font toggles.

use lyxkit_core::catalog::{Catalog, EndToken, Form};

use crate::{
    error::{Diagnostic, ErrorCode},
    source::SourceLine,
};

pub(crate) const BEGIN: &str = "\\begin_";
pub(crate) const END: &str = "\\end_";
const DEEPER: &str = "deeper";
const EMBEDDED_START: &str = "<lyxtabular";

/// The parsed opening line of an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Opening<'l> {
    pub form: Form,
    pub command: &'l str,
    pub category: &'l str,
    pub details: &'l str,
    pub inline: Option<&'l str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event<'l> {
    Begin(Opening<'l>),
    End(&'l str),
    BeginDeeper,
    EndDeeper,
    EmbeddedBlockStart,
    Text,
}

/// What the classifier needs to know about the branch stack.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Context<'c> {
    pub catalog: &'c Catalog,
    /// Command of the open verbatim region on top of the stack.
    pub verbatim: Option<&'c str>,
    /// The top of the stack is an open table inset.
    pub table_context: bool,
    pub in_header: bool,
    pub language: &'c str,
}

pub(crate) fn classify<'l>(line: &'l SourceLine, ctx: &Context<'_>) -> Result<Event<'l>, Diagnostic> {
    let text = line.text.as_str();

    if let Some(command) = ctx.verbatim {
        return Ok(match text.strip_prefix(END).map(str::trim_end) {
            Some(rest) if rest == command => Event::End(rest),
            _ => Event::Text,
        });
    }

    if ctx.table_context && text.trim_start().starts_with(EMBEDDED_START) {
        return Ok(Event::EmbeddedBlockStart);
    }

    if let Some(rest) = text.strip_prefix(BEGIN) {
        let (command, remainder) = split_command(rest);
        if command.is_empty() {
            return Err(malformed(line, "missing object name after `\\begin_`"));
        }
        if command == DEEPER {
            return Ok(Event::BeginDeeper);
        }
        return Ok(Event::Begin(split_opening(
            ctx.catalog,
            Form::Begin,
            command,
            remainder,
        )));
    }

    if let Some(rest) = text.strip_prefix(END) {
        let command = rest.trim_end();
        if command.is_empty() {
            return Err(malformed(line, "missing object name after `\\end_`"));
        }
        if command == DEEPER {
            return Ok(Event::EndDeeper);
        }
        return Ok(Event::End(command));
    }

    let Some(rest) = text.strip_prefix('\\') else {
        return Ok(Event::Text);
    };
    let (command, remainder) = split_command(rest);
    if command.is_empty() {
        return Ok(Event::Text);
    }

    let opening = split_opening(ctx.catalog, Form::Bare, command, remainder);
    if !ctx.in_header && closes_design(&opening, ctx) {
        return Ok(Event::End(command));
    }
    Ok(Event::Begin(opening))
}

/// A bare line whose value is its command's closing sentinel.
fn closes_design(opening: &Opening<'_>, ctx: &Context<'_>) -> bool {
    if !opening.details.is_empty() || opening.inline.is_some() {
        return false;
    }
    let Some(spec) = ctx.catalog.lookup(opening.command, opening.category, "") else {
        return false;
    };
    if !spec.is_design() {
        return false;
    }
    match spec.end_token() {
        EndToken::Sentinel(word) => opening.category == word,
        EndToken::DocumentLanguage => opening.category == ctx.language,
        EndToken::Standard | EndToken::None => false,
    }
}

fn split_command(rest: &str) -> (&str, Option<&str>) {
    match rest.split_once(' ') {
        Some((command, remainder)) => (command, Some(remainder)),
        None => (rest, None),
    }
}

/// Splits what follows the command into category, details and inline text.
///
/// Words are separated by single spaces so the line can be rebuilt exactly.
pub(crate) fn split_opening<'l>(
    catalog: &Catalog,
    form: Form,
    command: &'l str,
    remainder: Option<&'l str>,
) -> Opening<'l> {
    let mut opening = Opening {
        form,
        command,
        category: "",
        details: "",
        inline: None,
    };
    let Some(rest) = remainder else {
        return opening;
    };
    if catalog.whole_category(command) {
        opening.category = rest;
        return opening;
    }

    let (category, after) = split_command(rest);
    opening.category = category;
    let takes_argument = catalog
        .lookup(command, category, "")
        .is_some_and(|spec| spec.has_inline_argument());
    if takes_argument {
        opening.inline = after;
        return opening;
    }
    if let Some(after) = after {
        let (details, inline) = split_command(after);
        opening.details = details;
        opening.inline = inline;
    }
    opening
}

fn malformed(line: &SourceLine, message: &str) -> Diagnostic {
    Diagnostic::error(format!("malformed opening line: {message}"))
        .with_code(ErrorCode::E001)
        .with_label(line.span, "cannot split into command, category and details")
        .with_line(line.number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    fn line(text: &str) -> SourceLine {
        SourceLine {
            text: text.to_string(),
            number: 1,
            span: Span::new(0..text.len()),
        }
    }

    fn body() -> Context<'static> {
        Context {
            catalog: Catalog::standard(),
            verbatim: None,
            table_context: false,
            in_header: false,
            language: "english",
        }
    }

    #[test]
    fn test_begin_with_details_and_inline() {
        let source = line("\\begin_inset CommandInset ref extra words");
        let event = classify(&source, &body()).unwrap();
        assert_eq!(
            event,
            Event::Begin(Opening {
                form: Form::Begin,
                command: "inset",
                category: "CommandInset",
                details: "ref",
                inline: Some("extra words"),
            })
        );
    }

    #[test]
    fn test_layout_takes_whole_category() {
        let source = line("\\begin_layout Plain Layout");
        let Event::Begin(opening) = classify(&source, &body()).unwrap() else {
            panic!("expected begin");
        };
        assert_eq!(opening.category, "Plain Layout");
        assert_eq!(opening.details, "");
    }

    #[test]
    fn test_formula_inline_argument() {
        let source = line("\\begin_inset Formula $a b$");
        let Event::Begin(opening) = classify(&source, &body()).unwrap() else {
            panic!("expected begin");
        };
        assert_eq!(opening.category, "Formula");
        assert_eq!(opening.details, "");
        assert_eq!(opening.inline, Some("$a b$"));

        let source = line("\\begin_inset Formula ");
        let Event::Begin(opening) = classify(&source, &body()).unwrap() else {
            panic!("expected begin");
        };
        assert_eq!(opening.inline, Some(""));
    }

    #[test]
    fn test_end_and_deeper() {
        let ctx = body();
        assert_eq!(
            classify(&line("\\end_layout"), &ctx).unwrap(),
            Event::End("layout")
        );
        assert_eq!(
            classify(&line("\\begin_deeper"), &ctx).unwrap(),
            Event::BeginDeeper
        );
        assert_eq!(
            classify(&line("\\end_deeper"), &ctx).unwrap(),
            Event::EndDeeper
        );
    }

    #[test]
    fn test_malformed_markers() {
        let err = classify(&line("\\begin_"), &body()).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E001));
        let err = classify(&line("\\end_ "), &body()).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E001));
    }

    #[test]
    fn test_design_sentinels() {
        let ctx = body();
        assert_eq!(
            classify(&line("\\series default"), &ctx).unwrap(),
            Event::End("series")
        );
        assert_eq!(
            classify(&line("\\color inherit"), &ctx).unwrap(),
            Event::End("color")
        );
        assert_eq!(
            classify(&line("\\lang english"), &ctx).unwrap(),
            Event::End("lang")
        );
        assert!(matches!(
            classify(&line("\\lang hebrew"), &ctx).unwrap(),
            Event::Begin(_)
        ));
        assert!(matches!(
            classify(&line("\\series bold"), &ctx).unwrap(),
            Event::Begin(_)
        ));
    }

    #[test]
    fn test_header_bare_lines_never_end() {
        let ctx = Context {
            in_header: true,
            ..body()
        };
        let source = line("\\color default");
        let Event::Begin(opening) = classify(&source, &ctx).unwrap() else {
            panic!("expected begin");
        };
        assert_eq!(opening.form, Form::Bare);
        assert_eq!(opening.command, "color");
    }

    #[test]
    fn test_verbatim_region() {
        let ctx = Context {
            verbatim: Some("inset"),
            ..body()
        };
        assert_eq!(classify(&line("\\frac{1}{2}"), &ctx).unwrap(), Event::Text);
        assert_eq!(classify(&line("\\end_layout"), &ctx).unwrap(), Event::Text);
        assert_eq!(
            classify(&line("\\end_inset"), &ctx).unwrap(),
            Event::End("inset")
        );
        assert_eq!(
            classify(&line("\\end_inset  "), &ctx).unwrap(),
            Event::End("inset")
        );
        assert_eq!(classify(&line("\\end_insets"), &ctx).unwrap(), Event::Text);
    }

    #[test]
    fn test_embedded_block_start() {
        let source = line("<lyxtabular version=\"3\" rows=\"1\" columns=\"1\">");
        assert_eq!(classify(&source, &body()).unwrap(), Event::Text);
        let ctx = Context {
            table_context: true,
            ..body()
        };
        assert_eq!(
            classify(&source, &ctx).unwrap(),
            Event::EmbeddedBlockStart
        );
    }

    #[test]
    fn test_plain_text() {
        let ctx = body();
        assert_eq!(classify(&line("Hello world"), &ctx).unwrap(), Event::Text);
        assert_eq!(classify(&line(""), &ctx).unwrap(), Event::Text);
        assert_eq!(classify(&line("\\"), &ctx).unwrap(), Event::Text);
    }
}
