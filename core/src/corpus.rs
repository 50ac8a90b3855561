//! Corpus loading.
//!
//! A corpus is line oriented. A line of the form `[[Title]]` starts a new
//! document whose identifier is `Title`; the lines that follow, joined with
//! single spaces, form its body.

use crate::error::{Result, RetrievalError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lines shorter than this (in chars) are skipped.
pub const MIN_LINE_LEN: usize = 4;

const MARKER_OPEN: &str = "[[";
const MARKER_CLOSE: &str = "]]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub id: String,
    pub text: String,
}

/// Identifier carried by a document marker line, if `line` is one.
///
/// `[[` without a closing `]]`, or a marker with nothing between the
/// brackets, is not a marker.
pub fn marker_id(line: &str) -> Option<&str> {
    let line = line.trim_end();
    if line.len() < MARKER_OPEN.len() + MARKER_CLOSE.len() {
        return None;
    }
    let inner = line.strip_prefix(MARKER_OPEN)?.strip_suffix(MARKER_CLOSE)?.trim();
    if inner.is_empty() { None } else { Some(inner) }
}

struct Accumulator {
    docs: Vec<RawDocument>,
    current: Option<RawDocument>,
    orphan_lines: usize,
}

impl Accumulator {
    fn new() -> Self {
        Self { docs: Vec::new(), current: None, orphan_lines: 0 }
    }

    fn push_line(&mut self, line: &str) {
        if line.chars().count() < MIN_LINE_LEN {
            return;
        }
        if let Some(id) = marker_id(line) {
            self.flush();
            self.current = Some(RawDocument { id: id.to_string(), text: String::new() });
            return;
        }
        match self.current.as_mut() {
            Some(doc) => {
                if !doc.text.is_empty() {
                    doc.text.push(' ');
                }
                doc.text.push_str(line);
            }
            None => self.orphan_lines += 1,
        }
    }

    fn flush(&mut self) {
        if let Some(doc) = self.current.take() {
            self.docs.push(doc);
        }
    }

    fn finish(mut self, source: &str) -> Vec<RawDocument> {
        self.flush();
        if self.orphan_lines > 0 {
            tracing::warn!(source, lines = self.orphan_lines, "dropped body lines before the first document marker");
        }
        self.docs
    }
}

/// Parse documents from a line stream. `source` names the stream in errors and logs.
pub fn load<R: BufRead>(reader: R, source: &Path) -> Result<Vec<RawDocument>> {
    let mut acc = Accumulator::new();
    for line in reader.lines() {
        let line = line.map_err(|e| RetrievalError::CorpusLoad { path: source.to_path_buf(), source: e })?;
        acc.push_line(&line);
    }
    Ok(acc.finish(&source.display().to_string()))
}

/// Parse documents from `text` held in memory.
pub fn load_str(text: &str) -> Vec<RawDocument> {
    let mut acc = Accumulator::new();
    for line in text.lines() {
        acc.push_line(line);
    }
    acc.finish("<memory>")
}

pub fn load_path<P: AsRef<Path>>(path: P) -> Result<Vec<RawDocument>> {
    let path = path.as_ref();
    let f = File::open(path).map_err(|e| RetrievalError::CorpusLoad { path: path.to_path_buf(), source: e })?;
    let docs = load(BufReader::new(f), path)?;
    tracing::debug!(path = %path.display(), docs = docs.len(), "loaded corpus file");
    Ok(docs)
}

/// Load a single file, or every regular file under a directory in sorted
/// path order.
pub fn load_paths<P: AsRef<Path>>(root: P) -> Result<Vec<RawDocument>> {
    let root = root.as_ref();
    let meta = std::fs::metadata(root).map_err(|e| RetrievalError::CorpusLoad { path: root.to_path_buf(), source: e })?;
    if meta.is_file() {
        return load_path(root);
    }

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
            RetrievalError::CorpusLoad { path, source: e.into() }
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    let mut docs = Vec::new();
    for file in &files {
        docs.extend(load_path(file)?);
    }
    tracing::info!(root = %root.display(), files = files.len(), docs = docs.len(), "loaded corpus");
    Ok(docs)
}
