//! Forward-only streams of input lines.
//!
//! The builder pulls lines one at a time. Sub-parsers (embedded tables,
//! unknown object bodies) pull from the same stream, so a document is never
//! materialised as a whole.

use std::{collections::VecDeque, io};

use crate::{error::Diagnostic, span::Span};

/// One physical line without its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SourceLine {
    pub text: String,
    /// 1-based line number.
    pub number: usize,
    pub span: Span,
}

/// Why a parse stopped early.
#[derive(Debug)]
pub(crate) enum Halt {
    Io(io::Error),
    Fatal(Diagnostic),
}

impl From<Diagnostic> for Halt {
    fn from(diagnostic: Diagnostic) -> Self {
        Halt::Fatal(diagnostic)
    }
}

impl From<io::Error> for Halt {
    fn from(err: io::Error) -> Self {
        Halt::Io(err)
    }
}

pub(crate) trait LineSource {
    fn next_line(&mut self) -> Result<Option<SourceLine>, Halt>;
}

/// Lines of an in-memory string, with exact byte spans.
pub(crate) struct StrLines<'a> {
    rest: &'a str,
    offset: usize,
    number: usize,
}

impl<'a> StrLines<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            rest: source,
            offset: 0,
            number: 0,
        }
    }
}

impl LineSource for StrLines<'_> {
    fn next_line(&mut self) -> Result<Option<SourceLine>, Halt> {
        if self.rest.is_empty() {
            return Ok(None);
        }
        let (raw, rest) = match self.rest.find('\n') {
            Some(end) => (&self.rest[..end], &self.rest[end + 1..]),
            None => (self.rest, ""),
        };
        let consumed = self.rest.len() - rest.len();
        let text = raw.strip_suffix('\r').unwrap_or(raw);

        self.number += 1;
        let line = SourceLine {
            text: text.to_string(),
            number: self.number,
            span: Span::new(self.offset..self.offset + text.len()),
        };
        self.offset += consumed;
        self.rest = rest;
        Ok(Some(line))
    }
}

/// Lines of a reader; spans assume `\n` terminators.
pub(crate) struct ReaderLines<I> {
    lines: I,
    offset: usize,
    number: usize,
}

impl<I> ReaderLines<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            offset: 0,
            number: 0,
        }
    }
}

impl<I> LineSource for ReaderLines<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    fn next_line(&mut self) -> Result<Option<SourceLine>, Halt> {
        let Some(text) = self.lines.next().transpose()? else {
            return Ok(None);
        };
        self.number += 1;
        let span = Span::new(self.offset..self.offset + text.len());
        self.offset += text.len() + 1;
        Ok(Some(SourceLine {
            text,
            number: self.number,
            span,
        }))
    }
}

/// Lines already split off the main stream, such as table cell contents.
impl LineSource for VecDeque<SourceLine> {
    fn next_line(&mut self) -> Result<Option<SourceLine>, Halt> {
        Ok(self.pop_front())
    }
}
