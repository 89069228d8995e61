//! Reading and writing LyX files.
//!
//! Documents are read as a line stream and never held in memory as a
//! whole. Every write goes to a temporary file in the destination directory
//! that is then renamed over the target, so an interrupted write never
//! leaves a truncated document behind.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use log::{debug, info};
use tempfile::NamedTempFile;

use lyxkit_parser::{ParseConfig, Parsed};

use crate::LyxError;

/// Extension of LyX documents.
pub const LYX_EXTENSION: &str = "lyx";

const EMPTY_DOCUMENT: &str = "#LyX 2.3 created this file. For more info see https://www.lyx.org/
\\lyxformat 544
\\begin_document
\\begin_header
\\textclass article
\\language english
\\inputencoding utf8
\\secnumdepth 3
\\tocdepth 3
\\end_header

\\begin_body

\\begin_layout Standard

\\end_layout

\\end_body
\\end_document
";

/// Parse the document at `path`, streaming it line by line.
///
/// # Errors
///
/// Returns [`LyxError::Io`] if the file cannot be read and
/// [`LyxError::Parse`] if its structure is broken.
pub fn read_document(path: &Path, config: &ParseConfig) -> Result<Parsed, LyxError> {
    info!(path:? = path; "Reading document");
    let file = File::open(path)?;
    lyxkit_parser::parse_reader(BufReader::new(file), config).map_err(LyxError::from_read_error)
}

/// Atomically replace the contents of `path` with `text`.
///
/// # Errors
///
/// Returns [`LyxError::Io`] if the temporary file cannot be written or
/// renamed over `path`.
pub fn write_document(path: &Path, text: &str) -> Result<(), LyxError> {
    let mut file = NamedTempFile::new_in(directory(path))?;
    file.write_all(text.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| err.error)?;
    debug!(path:? = path, bytes = text.len(); "Document written");
    Ok(())
}

/// `path` with its extension set to `extension`.
///
/// A path that already carries the extension is returned unchanged.
pub fn correct_name(path: &Path, extension: &str) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == extension) {
        return path.to_path_buf();
    }
    path.with_extension(extension)
}

/// The text of a minimal valid document with one empty paragraph.
pub fn create_empty_document() -> String {
    EMPTY_DOCUMENT.to_string()
}

/// Rewrite `path` one line at a time.
///
/// `transform` receives every line without its line break. The file is only
/// replaced when at least one line changed; the return value tells whether
/// it was.
///
/// # Errors
///
/// Returns [`LyxError::Io`] if reading, writing or the final rename fails.
pub fn transform_lines(
    path: &Path,
    mut transform: impl FnMut(&str) -> String,
) -> Result<bool, LyxError> {
    let mut reader = BufReader::new(File::open(path)?);
    let temp = NamedTempFile::new_in(directory(path))?;
    let mut writer = BufWriter::new(temp);

    let mut changed = 0usize;
    let mut buffer = String::new();
    loop {
        buffer.clear();
        if reader.read_line(&mut buffer)? == 0 {
            break;
        }
        let (line, ending) = match buffer.strip_suffix('\n') {
            Some(line) => (line, "\n"),
            None => (buffer.as_str(), ""),
        };
        let replaced = transform(line);
        if replaced != line {
            changed += 1;
        }
        writer.write_all(replaced.as_bytes())?;
        writer.write_all(ending.as_bytes())?;
    }

    if changed == 0 {
        debug!(path:? = path; "No lines changed");
        return Ok(false);
    }
    let temp = writer.into_inner().map_err(|err| err.into_error())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| err.error)?;
    info!(path:? = path, lines = changed; "Lines replaced");
    Ok(true)
}

fn directory(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
