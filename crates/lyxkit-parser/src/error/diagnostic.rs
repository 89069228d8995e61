//! A single error or warning.

use std::fmt;

use crate::{
    error::{ErrorCode, Label, Severity},
    span::Span,
};

/// An error or warning with its location in the source.
///
/// ```text
/// error[E100]: no open object accepts `layout Standard` (line 14)
///    |
/// 14 | \begin_layout Standard
///    | ^^^^^^^^^^^^^^^^^^^^^^ rejected here
///    |
///    = help: open branch: document root > document > body > layout Itemize
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    line: Option<usize>,
    help: Option<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// 1-based line number the diagnostic refers to.
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            line: None,
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{code}]")?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(line) = self.line {
            write!(f, " (line {line})")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_defaults() {
        let diag = Diagnostic::error("stack exhausted");
        assert!(diag.severity().is_error());
        assert!(diag.code().is_none());
        assert!(diag.labels().is_empty());
        assert!(diag.line().is_none());
        assert!(diag.help().is_none());
    }

    #[test]
    fn test_diagnostic_builder_chain() {
        let diag = Diagnostic::error("unterminated table")
            .with_code(ErrorCode::E103)
            .with_label(Span::new(40..80), "table starts here")
            .with_secondary_label(Span::new(20..39), "inside this inset")
            .with_line(3)
            .with_help("add the closing `</lyxtabular>` line");

        assert_eq!(diag.code(), Some(ErrorCode::E103));
        assert_eq!(diag.labels().len(), 2);
        assert!(diag.labels()[0].is_primary());
        assert!(diag.labels()[1].is_secondary());
        assert_eq!(diag.help(), Some("add the closing `</lyxtabular>` line"));
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::warning("stray end marker `\\end_inset`")
            .with_code(ErrorCode::W201)
            .with_line(12);
        assert_eq!(
            diag.to_string(),
            "warning[W201]: stray end marker `\\end_inset` (line 12)"
        );
        assert_eq!(Diagnostic::error("oops").to_string(), "error: oops");
    }
}
