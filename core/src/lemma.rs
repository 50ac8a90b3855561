//! Boundary to an external lemmatizer.
//!
//! Lemmatization needs a linguistic pipeline (tokenizer, tagger, lemma
//! dictionary) that this crate does not ship. The [`Lemmatizer`] trait is the
//! single capability the normalizer consumes; [`CommandLemmatizer`] talks to
//! an external process over stdin/stdout.

use crate::error::{Result, RetrievalError};
use parking_lot::Mutex;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

pub trait Lemmatizer: Send + Sync {
    /// Lemmas of `text` in source order.
    fn lemmatize(&self, text: &str) -> Result<Vec<String>>;
}

struct Pipeline {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// Line protocol: one line of text in, one line of space-separated lemmas out.
///
/// The process is spawned on first use and kept alive; starting a tagging
/// pipeline per call is far too slow for a whole corpus. A dead process is
/// respawned on the next call.
pub struct CommandLemmatizer {
    program: String,
    args: Vec<String>,
    pipeline: Mutex<Option<Pipeline>>,
}

impl CommandLemmatizer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args, pipeline: Mutex::new(None) }
    }

    /// Parse a shell-like command line (whitespace separated, no quoting).
    pub fn from_command_line(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| {
            RetrievalError::InvalidConfig("empty lemmatizer command".into())
        })?;
        Ok(Self::new(program, parts.collect()))
    }

    fn unavailable(&self, cause: impl std::fmt::Display) -> RetrievalError {
        RetrievalError::NormalizationUnavailable { reason: format!("{}: {cause}", self.program) }
    }

    fn spawn(&self) -> Result<Pipeline> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| self.unavailable(e))?;
        let stdin = child.stdin.take().ok_or_else(|| self.unavailable("no stdin pipe"))?;
        let stdout = child.stdout.take().ok_or_else(|| self.unavailable("no stdout pipe"))?;
        tracing::info!(program = %self.program, pid = child.id(), "lemmatizer started");
        Ok(Pipeline { child, stdin, stdout: BufReader::new(stdout) })
    }

    fn round_trip(&self, pipeline: &mut Pipeline, text: &str) -> Result<Vec<String>> {
        // The protocol is line based; embedded newlines would desync it.
        let flat: String = text.chars().map(|c| if c == '\n' || c == '\r' { ' ' } else { c }).collect();
        writeln!(pipeline.stdin, "{flat}").map_err(|e| self.unavailable(e))?;
        pipeline.stdin.flush().map_err(|e| self.unavailable(e))?;
        let mut line = String::new();
        let n = pipeline.stdout.read_line(&mut line).map_err(|e| self.unavailable(e))?;
        if n == 0 {
            return Err(self.unavailable("process closed its output"));
        }
        Ok(line.split_whitespace().map(str::to_string).collect())
    }
}

impl Lemmatizer for CommandLemmatizer {
    fn lemmatize(&self, text: &str) -> Result<Vec<String>> {
        let mut guard = self.pipeline.lock();
        if guard.is_none() {
            *guard = Some(self.spawn()?);
        }
        let pipeline = guard.as_mut().ok_or_else(|| self.unavailable("not running"))?;
        match self.round_trip(pipeline, text) {
            Ok(lemmas) => Ok(lemmas),
            Err(e) => {
                if let Some(mut dead) = guard.take() {
                    let _ = dead.child.kill();
                    let _ = dead.child.wait();
                }
                tracing::warn!(program = %self.program, error = %e, "lemmatizer failed");
                Err(e)
            }
        }
    }
}

impl Drop for CommandLemmatizer {
    fn drop(&mut self) {
        if let Some(mut p) = self.pipeline.get_mut().take() {
            drop(p.stdin);
            let _ = p.child.wait();
        }
    }
}
