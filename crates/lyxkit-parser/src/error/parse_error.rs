//! Error types returned by the parse entry points.

use std::{fmt, io};

use thiserror::Error;

use crate::error::Diagnostic;

/// A failed parse: the fatal diagnostic first, then earlier warnings.
#[derive(Debug)]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The diagnostic that aborted the parse.
    pub fn fatal(&self) -> Option<&Diagnostic> {
        self.diagnostics.iter().find(|d| d.severity().is_error())
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(first) = self.diagnostics.first() {
            write!(f, "{first}")?;
            if self.diagnostics.len() > 1 {
                write!(f, " (+{} more)", self.diagnostics.len() - 1)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::new(vec![diagnostic])
    }
}

/// Failure of [`parse_reader`](crate::parse_reader).
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
