//! Diagnostics reported while parsing a LyX document.
//!
//! A parse either succeeds with a list of warnings, or fails with a
//! [`ParseError`] holding the fatal [`Diagnostic`] first and any warnings
//! gathered before it.
//!
//! ```
//! # use lyxkit_parser::error::{Diagnostic, ErrorCode};
//! # use lyxkit_parser::Span;
//!
//! let diag = Diagnostic::warning("unknown object `inset Hologram`")
//!     .with_code(ErrorCode::W200)
//!     .with_label(Span::new(120..143), "not in the grammar catalog")
//!     .with_line(9)
//!     .with_help("the object is kept verbatim");
//! assert_eq!(diag.line(), Some(9));
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::{ParseError, ReadError};
pub use severity::Severity;
