//! HTML rendering of parsed documents.
//!
//! Rendering builds an `rcdom` tree and serializes it with `html5ever`:
//!
//! ```text
//! Document
//!     ↓ numbering (section labels, table of contents)
//! Outline
//!     ↓ convert (one element per node, catalog tags)
//! DOM
//!     ↓ serialize
//! HTML text
//! ```
//!
//! Formulas are left as TeX between MathJax delimiters; the MathJax script
//! is linked from the page head unless disabled in [`HtmlConfig`].

mod convert;
mod dom;
mod inset;
mod language;
mod numbering;
mod table;

use log::{debug, info};

use lyxkit_core::Document;

use crate::config::HtmlConfig;
use convert::Converter;
use numbering::{DEFAULT_DEPTH, Outline, TheoremNumbering};

const MATHJAX: &str = "https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js";

/// Errors that can occur while rendering HTML.
///
/// Converted into [`LyxError`](crate::LyxError) at the crate boundary.
#[derive(Debug)]
pub enum Error {
    /// A conversion or serialization failure described by `message`.
    Render(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Render(msg) => write!(f, "Render error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

/// Renders `document` as a complete HTML page.
///
/// # Errors
///
/// Returns [`Error::Render`] if the DOM cannot be serialized.
pub fn render(document: &Document, config: &HtmlConfig) -> Result<String, Error> {
    let tree = document.tree();
    let container = document.body().unwrap_or_else(|| document.root());

    let secnumdepth = if config.numbering() {
        depth(document, "secnumdepth")
    } else {
        i32::MIN
    };
    let tocdepth = if config.toc() {
        depth(document, "tocdepth")
    } else {
        i32::MIN
    };
    let mut outline = Outline::build(tree, container, secnumdepth, tocdepth);
    debug!(secnumdepth, tocdepth, entries = outline.entries().len(); "Built outline");
    let theorems = config
        .numbering()
        .then(|| TheoremNumbering::from_modules(&document.modules()))
        .flatten();
    if let Some(numbering) = theorems {
        debug!(numbering:?; "Numbering theorems");
        outline.number_theorems(tree, container, numbering);
    }

    let language = document.language();
    let html = dom::element("html", &[]);
    if let Some(code) = language::code(&language) {
        dom::set_attribute(&html, "lang", code);
    }
    if language::is_rtl(&language) {
        dom::set_attribute(&html, "dir", "rtl");
    }

    dom::append(&html, head(document, config));

    let body = dom::element("body", &[]);
    let mut converter = Converter::new(tree, config, outline);
    converter.children(container, &body)?;
    if !config.js_in_head() {
        for script in scripts(config) {
            dom::append(&body, script);
        }
    }
    dom::append(&html, body);

    let output = format!("<!DOCTYPE html>\n{}\n", dom::to_html(&html)?);
    info!(bytes = output.len(); "Rendered HTML");
    Ok(output)
}

/// `\secnumdepth` or `\tocdepth` from the header.
fn depth(document: &Document, name: &str) -> i32 {
    document
        .setting(name)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(DEFAULT_DEPTH)
}

fn head(document: &Document, config: &HtmlConfig) -> markup5ever_rcdom::Handle {
    let head = dom::element("head", &[]);
    dom::append(&head, dom::element("meta", &[("charset", "utf-8")]));
    dom::append(
        &head,
        dom::element(
            "meta",
            &[("name", "viewport"), ("content", "width=device-width, initial-scale=1")],
        ),
    );

    if let Some(title) = title(document) {
        let element = dom::element("title", &[]);
        dom::append_text(&element, &title);
        dom::append(&head, element);
    }
    if config.mathjax() {
        dom::append(&head, dom::element("script", &[("src", MATHJAX), ("async", "")]));
    }
    for css in config.css_files() {
        dom::append(&head, dom::element("link", &[("rel", "stylesheet"), ("href", css.as_str())]));
    }
    if config.js_in_head() {
        for script in scripts(config) {
            dom::append(&head, script);
        }
    }
    head
}

/// Text of the first `Title` layout.
fn title(document: &Document) -> Option<String> {
    let tree = document.tree();
    let id = tree
        .descendants(document.root())
        .find(|&id| tree.node(id).describe() == "layout Title")?;
    let title = tree.text_content(id).lines().concat().trim().to_string();
    (!title.is_empty()).then_some(title)
}

fn scripts(config: &HtmlConfig) -> Vec<markup5ever_rcdom::Handle> {
    config
        .js_files()
        .iter()
        .map(|js| dom::element("script", &[("src", js.as_str())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyxkit_parser::{ParseConfig, parse};

    const DOCUMENT: &str = "\\lyxformat 544
\\begin_document
\\begin_header
\\textclass article
\\language english
\\secnumdepth 3
\\tocdepth 3
\\end_header

\\begin_body

\\begin_layout Title
My Paper
\\end_layout

\\begin_layout Section
Introduction
\\end_layout

\\begin_layout Standard
Some
\\series bold
bold
\\series default
 text with
\\begin_inset Formula $x^2$
\\end_inset

.
\\end_layout

\\begin_layout Itemize
one
\\end_layout

\\begin_layout Itemize
two
\\end_layout

\\begin_layout Subsection
Details
\\end_layout

\\begin_layout Standard
\\begin_inset Foot
status open

\\begin_layout Plain Layout
note
\\end_layout

\\end_inset

\\end_layout

\\end_body
\\end_document
";

    fn render_with(config: &HtmlConfig) -> String {
        let parsed = parse(DOCUMENT, &ParseConfig::default()).unwrap();
        render(parsed.document(), config).unwrap()
    }

    #[test]
    fn test_page_skeleton() {
        let html = render_with(&HtmlConfig::default());
        assert!(html.starts_with("<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">"));
        assert!(html.contains("<title>My Paper</title>"));
        assert!(html.contains(MATHJAX));
        assert!(html.ends_with("</body></html>\n"));
    }

    #[test]
    fn test_headings_are_numbered() {
        let html = render_with(&HtmlConfig::default());
        assert!(html.contains("<span class=\"label\">1 </span>Introduction"));
        assert!(html.contains("<span class=\"label\">1.1 </span>Details"));
        assert!(html.contains("id=\"Section_1\""));
    }

    #[test]
    fn test_numbering_can_be_disabled() {
        let html = render_with(&HtmlConfig::default().with_numbering(false).with_mathjax(false));
        assert!(!html.contains("class=\"label\">1 "));
        assert!(!html.contains(MATHJAX));
    }

    #[test]
    fn test_inline_content() {
        let html = render_with(&HtmlConfig::default());
        assert!(html.contains("<span class=\"series bold\" style=\"font-weight: bold\">bold</span>"));
        assert!(html.contains("\\(x^2\\)"));
        assert_eq!(html.matches("<ul>").count(), 1);
        assert_eq!(html.matches("<li").count(), 2);
    }

    #[test]
    fn test_footnotes_are_numbered() {
        let html = render_with(&HtmlConfig::default());
        assert!(html.contains("<aside class=\"inset Foot\"><span class=\"label\">1</span>"));
    }

    #[test]
    fn test_assets() {
        let config = HtmlConfig::default()
            .with_css_files(vec!["style.css".to_string()])
            .with_js_files(vec!["app.js".to_string()], false);
        let html = render_with(&config);
        assert!(html.contains("<link rel=\"stylesheet\" href=\"style.css\">"));
        assert!(html.contains("<script src=\"app.js\"></script></body>"));
    }

    #[test]
    fn test_theorems_numbered_by_section_module() {
        let source = "\\begin_document
\\begin_header
\\textclass article
\\begin_modules
theorems-ams
theorems-sec
\\end_modules
\\end_header
\\begin_body
\\begin_layout Section
Results
\\end_layout
\\begin_layout Theorem
Every claim holds.
\\end_layout
\\begin_layout Proof
Obvious.
\\end_layout
\\begin_layout Lemma
Another.
\\end_layout
\\end_body
\\end_document
";
        let parsed = parse(source, &ParseConfig::default()).unwrap();
        let html = render(parsed.document(), &HtmlConfig::default()).unwrap();

        assert!(html.contains("id=\"Theorem_1.1\""));
        assert!(html.contains("<span class=\"label\">Theorem 1.1. </span>Every claim holds."));
        assert!(html.contains("<span class=\"label\">Lemma 1.2. </span>Another."));
        assert!(!html.contains("Proof 1"));

        let plain = render(parsed.document(), &HtmlConfig::default().with_numbering(false)).unwrap();
        assert!(!plain.contains("Theorem 1"));
    }
}
