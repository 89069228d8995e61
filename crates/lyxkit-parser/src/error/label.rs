//! Source locations attached to a diagnostic.

use crate::span::Span;

/// A message pointing at a span of the source.
///
/// The primary label marks the offending line; secondary labels point at
/// related lines, such as where an unterminated object was opened.
#[derive(Debug, Clone)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        let primary = Label::primary(Span::new(10..22), "opened here");
        assert!(primary.is_primary());
        assert_eq!(primary.span().len(), 12);
        assert_eq!(primary.message(), "opened here");

        let secondary = Label::secondary(Span::new(0..4), "context");
        assert!(secondary.is_secondary());
    }
}
