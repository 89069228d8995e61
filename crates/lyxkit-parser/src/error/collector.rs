//! Accumulates warnings during a parse.

use crate::error::{Diagnostic, ParseError};

/// Collects the diagnostics of one parse.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Turns the collected warnings into an error led by `fatal`.
    pub fn fail(self, fatal: Diagnostic) -> ParseError {
        let mut diagnostics = Vec::with_capacity(self.diagnostics.len() + 1);
        diagnostics.push(fatal);
        diagnostics.extend(self.diagnostics);
        ParseError::new(diagnostics)
    }

    /// Returns the warnings, or an error if any error was emitted.
    pub fn finish(self) -> Result<Vec<Diagnostic>, ParseError> {
        if self.diagnostics.iter().any(|d| d.severity().is_error()) {
            let (mut errors, warnings): (Vec<_>, Vec<_>) = self
                .diagnostics
                .into_iter()
                .partition(|d| d.severity().is_error());
            errors.extend(warnings);
            Err(ParseError::new(errors))
        } else {
            Ok(self.diagnostics)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_finish_returns_warnings() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(Diagnostic::warning("unknown object").with_code(ErrorCode::W200));
        collector.emit(Diagnostic::warning("stray end").with_code(ErrorCode::W201));

        let warnings = collector.finish().unwrap();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[1].code(), Some(ErrorCode::W201));
    }

    #[test]
    fn test_finish_with_error_puts_errors_first() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(Diagnostic::warning("earlier warning"));
        collector.emit(Diagnostic::error("fatal"));

        let err = collector.finish().unwrap_err();
        assert_eq!(err.diagnostics()[0].message(), "fatal");
        assert_eq!(err.diagnostics().len(), 2);
    }

    #[test]
    fn test_fail_keeps_warnings() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(Diagnostic::warning("w"));
        let err = collector.fail(Diagnostic::error("boom"));
        assert_eq!(err.to_string(), "error: boom (+1 more)");
    }
}
