//! # LyX Parser
//!
//! Streaming structural parser for the LyX file format. Lines are read one
//! at a time, classified, and placed into a [`lyxkit_core::Tree`] whose
//! nesting is validated on every insertion.
//!
//! ## Usage
//!
//! ```
//! # use lyxkit_parser::{parse, ParseConfig, ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = "\\begin_layout Standard\nHello\n\\end_layout\n";
//!     let parsed = parse(source, &ParseConfig::default())?;
//!
//!     let document = parsed.document();
//!     let paragraph = document.tree().children(document.root())[0];
//!     assert_eq!(document.node(paragraph).text().joined(), "Hello");
//!     assert!(parsed.warnings().is_empty());
//!     Ok(())
//! }
//! ```
//!
//! Unknown objects never fail a parse: they are kept verbatim and reported
//! as warnings. Structural damage the parser cannot recover from, such as a
//! table block that never ends, is a [`ParseError`].

mod builder;
mod classifier;
mod embedded;
pub mod error;
#[cfg(test)]
mod parser_tests;
mod source;
mod span;

pub use error::{Diagnostic, ErrorCode, ParseError, ReadError, Severity};
pub use span::Span;

use std::io::BufRead;

use log::info;

use lyxkit_core::Document;

use builder::Builder;
use source::{Halt, LineSource, ReaderLines, StrLines};

/// Default bound on the branch stack depth.
pub const DEFAULT_MAX_DEPTH: usize = 4096;

/// Configuration for a parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseConfig {
    max_depth: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseConfig {
    /// Create a configuration bounding the branch stack at `max_depth`.
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

/// A successfully parsed document with its non-fatal diagnostics.
#[derive(Debug, Clone)]
pub struct Parsed {
    document: Document,
    warnings: Vec<Diagnostic>,
}

impl Parsed {
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn into_parts(self) -> (Document, Vec<Diagnostic>) {
        (self.document, self.warnings)
    }
}

/// Parse LyX source text into a document tree.
///
/// # Errors
///
/// Returns a [`ParseError`] whose first diagnostic is the fatal one; any
/// warnings collected before it follow.
pub fn parse(source: &str, config: &ParseConfig) -> Result<Parsed, ParseError> {
    parse_lines(&mut StrLines::new(source), config).map_err(|err| match err {
        ReadError::Parse(err) => err,
        ReadError::Io(err) => Diagnostic::error(format!("failed to read input: {err}")).into(),
    })
}

/// Parse a LyX document from a reader, line by line.
///
/// The input is never held in memory as a whole.
pub fn parse_reader(reader: impl BufRead, config: &ParseConfig) -> Result<Parsed, ReadError> {
    parse_lines(&mut ReaderLines::new(reader.lines()), config)
}

fn parse_lines(source: &mut dyn LineSource, config: &ParseConfig) -> Result<Parsed, ReadError> {
    let mut builder = Builder::new(config);
    match builder.run(source) {
        Ok(()) => {
            let (document, warnings) = builder.finish()?;
            info!(warnings = warnings.len(); "Document parsed");
            Ok(Parsed { document, warnings })
        }
        Err(Halt::Fatal(fatal)) => Err(builder.fail(fatal).into()),
        Err(Halt::Io(err)) => Err(err.into()),
    }
}
