pub mod questions;

use anyhow::Result;
use questions::Question;
use serde::Serialize;
use std::io::Write;
use topone_core::{Hit, IndexStats, NormalizationMode, QueryEngine, RankingFunction};

pub const NULL_MARKER: &str = "NULL";

#[derive(Debug, Serialize)]
pub struct Outcome {
    pub question: String,
    pub expected: String,
    pub hit: Option<Hit>,
    pub error: Option<String>,
    pub correct: bool,
}

#[derive(Debug, Serialize)]
pub struct EvalReport {
    pub generated_at: String,
    pub ranking: RankingFunction,
    pub mode: NormalizationMode,
    pub index: IndexStats,
    pub questions: usize,
    pub answered: usize,
    pub correct: usize,
    pub precision_at_1: f64,
    pub outcomes: Vec<Outcome>,
}

/// `answer,docid,score`, or `answer,NULL,NULL` when there is no hit.
pub fn result_line(expected: &str, hit: Option<&Hit>) -> String {
    match hit {
        Some(h) => format!("{},{},{}", expected, h.doc_id, h.score),
        None => format!("{expected},{NULL_MARKER},{NULL_MARKER}"),
    }
}

/// Run every question through `engine`, writing one result line per question.
///
/// A failing query is logged and reported as a miss; the batch continues.
pub fn evaluate<W: Write>(engine: &QueryEngine, questions: &[Question], out: &mut W) -> Result<EvalReport> {
    let mut outcomes = Vec::with_capacity(questions.len());
    for q in questions {
        let text = q.text();
        let (hit, error) = match engine.retrieve(&text) {
            Ok(hit) => (hit, None),
            Err(e) => {
                tracing::warn!(question = %text, error = %e, "query failed");
                (None, Some(e.to_string()))
            }
        };
        writeln!(out, "{}", result_line(&q.answer, hit.as_ref()))?;
        let correct = hit.as_ref().is_some_and(|h| h.doc_id == q.answer);
        outcomes.push(Outcome { question: text, expected: q.answer.clone(), hit, error, correct });
    }

    let answered = outcomes.iter().filter(|o| o.hit.is_some()).count();
    let correct = outcomes.iter().filter(|o| o.correct).count();
    let precision_at_1 = if questions.is_empty() { 0.0 } else { correct as f64 / questions.len() as f64 };
    tracing::info!(questions = questions.len(), answered, correct, precision_at_1, "evaluation complete");

    Ok(EvalReport {
        generated_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into()),
        ranking: engine.config().ranking,
        mode: engine.config().mode,
        index: engine.index().stats(),
        questions: questions.len(),
        answered,
        correct,
        precision_at_1,
        outcomes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_hits_and_misses() {
        let hit = Hit { doc_id: "Tucson, Arizona".into(), score: 1.5 };
        assert_eq!(result_line("Tucson", Some(&hit)), "Tucson,Tucson, Arizona,1.5");
        assert_eq!(result_line("Tucson", None), "Tucson,NULL,NULL");
    }
}
