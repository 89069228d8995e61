//! lyxkit - Reading, rewriting and rendering LyX documents.
//!
//! Parsing, round-trip serialization, and HTML rendering for the LyX file
//! format. The parser produces a validated document tree; the serializer
//! writes it back byte for byte; the renderer turns it into an HTML page.

pub mod config;
pub mod html;
pub mod io;
pub mod serialize;

mod error;

pub use lyxkit_core::{catalog, identifier, nesting};
pub use lyxkit_core::{Content, Document, Node, NodeId, NodeKind, ObjectKey, Tree};
pub use lyxkit_parser::{Diagnostic, ErrorCode, ParseError, Parsed, Severity};

pub use error::{LyxError, SerializeError};

use std::path::Path;

use log::{debug, info, trace};

use config::AppConfig;

/// Builder for parsing, serializing and rendering LyX documents.
///
/// # Examples
///
/// ```rust,no_run
/// use lyxkit::{DocumentBuilder, config::AppConfig};
///
/// let source = "\\begin_layout Standard\nHello\n\\end_layout\n";
///
/// // With custom config
/// let config = AppConfig::default();
/// let builder = DocumentBuilder::new(config);
///
/// // Parse source to a document tree
/// let parsed = builder.parse(source)
///     .expect("Failed to parse");
///
/// // Write it back unchanged
/// let text = builder.serialize(parsed.document())
///     .expect("Failed to serialize");
/// assert_eq!(text, source);
///
/// // Or use default config
/// let builder = DocumentBuilder::default();
/// ```
#[derive(Default)]
pub struct DocumentBuilder {
    config: AppConfig,
}

impl DocumentBuilder {
    /// Create a new document builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including parser and HTML settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse LyX source text into a document tree.
    ///
    /// Unknown objects do not fail the parse; they are kept verbatim and
    /// reported in [`Parsed::warnings`].
    ///
    /// # Arguments
    ///
    /// * `source` - LyX source text
    ///
    /// # Errors
    ///
    /// Returns `LyxError::Parse` for structural errors, carrying the source
    /// for diagnostic rendering.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use lyxkit::DocumentBuilder;
    ///
    /// let builder = DocumentBuilder::default();
    /// let parsed = builder.parse("\\begin_layout Standard\nHello\n\\end_layout\n")
    ///     .expect("Failed to parse document");
    /// println!("{} warnings", parsed.warnings().len());
    /// ```
    pub fn parse(&self, source: &str) -> Result<Parsed, LyxError> {
        info!(bytes = source.len(); "Parsing document");

        let parsed = lyxkit_parser::parse(source, &self.config.parser().parse_config())
            .map_err(|err| LyxError::new_parse_error(err, source))?;

        debug!(
            nodes = parsed.document().tree().len(),
            warnings = parsed.warnings().len();
            "Document parsed successfully"
        );
        trace!(document:? = parsed.document(); "Parsed document");

        Ok(parsed)
    }

    /// Parse the LyX file at `path` without loading it as a whole.
    ///
    /// # Errors
    ///
    /// Returns `LyxError::Io` if the file cannot be read, or
    /// `LyxError::Parse` for structural errors. Streamed parse errors carry
    /// no source text; use [`DocumentBuilder::parse`] when snippets matter.
    pub fn parse_file(&self, path: &Path) -> Result<Parsed, LyxError> {
        io::read_document(path, &self.config.parser().parse_config())
    }

    /// Write a document tree back as LyX text.
    ///
    /// # Errors
    ///
    /// Returns `LyxError::Serialize` if a node lacks a field the catalog
    /// requires.
    pub fn serialize(&self, document: &Document) -> Result<String, LyxError> {
        let text = serialize::serialize(document)?;
        debug!(bytes = text.len(); "Document serialized");
        Ok(text)
    }

    /// Render a document tree as an HTML page.
    ///
    /// # Arguments
    ///
    /// * `document` - A parsed document
    ///
    /// # Errors
    ///
    /// Returns `LyxError::Render` if the page cannot be produced.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use lyxkit::DocumentBuilder;
    ///
    /// let builder = DocumentBuilder::default();
    /// let parsed = builder.parse("\\begin_layout Standard\nHello\n\\end_layout\n")
    ///     .expect("Failed to parse");
    ///
    /// let page = builder.render_html(parsed.document())
    ///     .expect("Failed to render document");
    ///
    /// println!("{}", page);
    /// ```
    pub fn render_html(&self, document: &Document) -> Result<String, LyxError> {
        info!("Rendering HTML");
        let page = html::render(document, self.config.html())?;
        Ok(page)
    }

    /// Serialize `document` and atomically replace the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `LyxError::Serialize` or `LyxError::Io`.
    pub fn write_file(&self, document: &Document, path: &Path) -> Result<(), LyxError> {
        let text = self.serialize(document)?;
        io::write_document(path, &text)
    }
}
