//! Codes identifying each kind of diagnostic.
//!
//! - `E0xx`: a line could not be classified
//! - `E1xx`: the document structure could not be rebuilt
//! - `W2xx`: warnings; parsing continued

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// An opening marker without a command, e.g. a bare `\begin_`.
    E001,

    /// No open object accepts the new one, even after closing every frame
    /// the parser may close.
    E100,

    /// The nesting depth limit was exceeded.
    E101,

    /// `\begin_deeper` does not follow a regular paragraph.
    E102,

    /// An embedded table block never reaches its closing tag.
    E103,

    /// An embedded table block is not well-formed markup.
    E104,

    /// An object key missing from the grammar catalog. The object is kept
    /// verbatim.
    W200,

    /// An end marker with no open object to close.
    W201,

    /// Objects still open when the input ended.
    W202,

    /// A table element missing from the grammar catalog.
    W203,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::W200 => "W200",
            ErrorCode::W201 => "W201",
            ErrorCode::W202 => "W202",
            ErrorCode::W203 => "W203",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "malformed opening line",
            ErrorCode::E100 => "branch stack exhausted",
            ErrorCode::E101 => "nesting too deep",
            ErrorCode::E102 => "deeper block without paragraph",
            ErrorCode::E103 => "unterminated embedded block",
            ErrorCode::E104 => "malformed embedded block",
            ErrorCode::W200 => "unknown object",
            ErrorCode::W201 => "stray end marker",
            ErrorCode::W202 => "unterminated object",
            ErrorCode::W203 => "unknown table element",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
