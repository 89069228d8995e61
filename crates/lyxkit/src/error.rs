//! Error types for lyxkit operations.
//!
//! This module provides the main error type [`LyxError`] which wraps the
//! error conditions that can occur while reading, rewriting and rendering
//! documents.

use std::io;

use thiserror::Error;

use lyxkit_parser::{ParseError, ReadError};

/// The main error type for lyxkit operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant carries the parser's diagnostics together with the
/// source they point into, so callers can render labelled snippets.
#[derive(Debug, Error)]
pub enum LyxError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Serialization error: {0}")]
    Serialize(#[from] SerializeError),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<crate::html::Error> for LyxError {
    fn from(error: crate::html::Error) -> Self {
        match error {
            crate::html::Error::Render(message) => Self::Render(message),
        }
    }
}

impl LyxError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }

    /// Convert a streaming read failure.
    ///
    /// The streamed text is not kept, so parse diagnostics come back with an
    /// empty source.
    pub fn from_read_error(err: ReadError) -> Self {
        match err {
            ReadError::Io(err) => Self::Io(err),
            ReadError::Parse(err) => Self::new_parse_error(err, String::new()),
        }
    }
}

/// A tree that cannot be written back as LyX text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializeError {
    #[error("`{object}` is missing its required `{field}` line")]
    MissingRequiredField { object: String, field: &'static str },
}
