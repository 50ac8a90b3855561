use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One quiz item: the question is category and clue joined by a space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub category: String,
    pub clue: String,
    pub answer: String,
}

impl Question {
    pub fn text(&self) -> String {
        format!("{} {}", self.category, self.clue)
    }
}

/// Parse repeated 4-line records: category, clue, answer, blank separator.
/// The separator after the final record may be missing; a non-blank
/// separator line is skipped with a warning.
pub fn parse_questions<R: BufRead>(reader: R) -> Result<Vec<Question>> {
    let mut lines = reader.lines().enumerate();
    let mut out = Vec::new();

    loop {
        let category = loop {
            match lines.next() {
                None => return Ok(out),
                Some((_, line)) => {
                    let line = line?;
                    if !line.trim().is_empty() {
                        break line;
                    }
                }
            }
        };
        let mut field = |name: &str| -> Result<String> {
            match lines.next() {
                Some((_, line)) => Ok(line?),
                None => bail!("question record {} ends before its {name} line", out.len() + 1),
            }
        };
        let clue = field("clue")?;
        let answer = field("answer")?;
        if let Some((n, line)) = lines.next() {
            let line = line?;
            if !line.trim().is_empty() {
                tracing::warn!(line = n + 1, record = out.len() + 1, text = %line, "expected a blank separator; skipping line");
            }
        }
        out.push(Question { category, clue, answer: answer.trim().to_string() });
    }
}

pub fn load_questions<P: AsRef<Path>>(path: P) -> Result<Vec<Question>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("opening questions file {}", path.display()))?;
    parse_questions(BufReader::new(f)).with_context(|| format!("parsing questions file {}", path.display()))
}
