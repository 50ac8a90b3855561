//! Top-1 query engine over an immutable index.

use crate::config::{EngineConfig, NormalizationMode};
use crate::error::{Result, RetrievalError};
use crate::index::{DocId, InvertedIndex};
use crate::lemma::Lemmatizer;
use crate::normalizer::{Normalizer, Term};
use crate::scorer::{Scorer, TermMatches};
use crate::tokenizer::has_alphanumeric;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// The single best document for a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    pub doc_id: String,
    pub score: f32,
}

/// A normalized query, ready to be resolved against the index.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub raw_text: String,
    pub terms: Vec<Term>,
    pub mode: NormalizationMode,
}

/// Answers queries against one index under one fixed configuration.
///
/// Cheap to clone and safe to share across threads; queries never mutate
/// the index.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    index: Arc<InvertedIndex>,
    normalizer: Normalizer,
    scorer: Scorer,
    config: EngineConfig,
}

impl QueryEngine {
    /// Fails with [`RetrievalError::ModeMismatch`] if `config.mode` is not
    /// the mode the index was built with.
    pub fn new(index: Arc<InvertedIndex>, config: EngineConfig, lemmatizer: Option<Arc<dyn Lemmatizer>>) -> Result<Self> {
        config.validate()?;
        if index.mode() != config.mode {
            return Err(RetrievalError::ModeMismatch { index: index.mode(), engine: config.mode });
        }
        let mut normalizer = Normalizer::new(config.mode, config.proximity_window);
        if let Some(l) = lemmatizer {
            normalizer = normalizer.with_lemmatizer(l);
        }
        let scorer = Scorer::new(config.ranking, config.bm25, &index);
        Ok(Self { index, normalizer, scorer, config })
    }

    pub fn config(&self) -> &EngineConfig { &self.config }

    pub fn index(&self) -> &InvertedIndex { &self.index }

    pub fn parse(&self, text: &str) -> Result<Query> {
        if !has_alphanumeric(text) {
            return Err(RetrievalError::QuerySyntax(text.to_string()));
        }
        let terms = self.normalizer.normalize(text)?;
        Ok(Query { raw_text: text.to_string(), terms, mode: self.normalizer.mode() })
    }

    /// Best document for `text`, or `Ok(None)` when nothing matches.
    pub fn retrieve(&self, text: &str) -> Result<Option<Hit>> {
        if self.index.is_empty() {
            return Ok(None);
        }
        let query = self.parse(text)?;
        Ok(self.execute(&query))
    }

    pub fn execute(&self, query: &Query) -> Option<Hit> {
        let matches = self.resolve(&query.terms);
        let candidates: BTreeSet<DocId> = matches.iter().flat_map(|m| m.freqs.keys().copied()).collect();
        if candidates.is_empty() {
            tracing::debug!(query = %query.raw_text, "no candidates");
            return None;
        }

        let mut best: Option<(DocId, f32)> = None;
        for doc_id in candidates {
            let score = self.scorer.score(&matches, doc_id, &self.index);
            best = match best {
                None => Some((doc_id, score)),
                Some(current) => {
                    if self.outranks((doc_id, score), current) { Some((doc_id, score)) } else { Some(current) }
                }
            };
        }

        let (doc_id, score) = best?;
        let doc = self.index.document(doc_id)?;
        tracing::debug!(query = %query.raw_text, doc = %doc.external_id, score, "top hit");
        Some(Hit { doc_id: doc.external_id.clone(), score })
    }

    /// Higher score wins; equal scores go to the lexicographically smaller id.
    fn outranks(&self, challenger: (DocId, f32), holder: (DocId, f32)) -> bool {
        match challenger.1.total_cmp(&holder.1) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => {
                let a = self.index.document(challenger.0).map(|d| d.external_id.as_str());
                let b = self.index.document(holder.0).map(|d| d.external_id.as_str());
                a < b
            }
        }
    }

    /// Merge repeated query terms and look each one up once.
    fn resolve(&self, terms: &[Term]) -> Vec<TermMatches> {
        let mut slots: HashMap<&Term, usize> = HashMap::new();
        let mut out: Vec<TermMatches> = Vec::new();
        for term in terms {
            match slots.get(term) {
                Some(&i) => out[i].query_frequency += 1,
                None => {
                    slots.insert(term, out.len());
                    out.push(TermMatches::collect(term, &self.index));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RankingFunction;
    use crate::corpus::RawDocument;

    fn engine(mode: NormalizationMode, ranking: RankingFunction, docs: &[(&str, &str)]) -> QueryEngine {
        let raw = docs.iter().map(|(id, t)| RawDocument { id: id.to_string(), text: t.to_string() }).collect();
        let config = EngineConfig::new(ranking, mode);
        let index = InvertedIndex::build(raw, &Normalizer::new(mode, config.proximity_window)).unwrap();
        QueryEngine::new(Arc::new(index), config, None).unwrap()
    }

    #[test]
    fn punctuation_only_query_is_syntax_error() {
        let e = engine(NormalizationMode::Standard, RankingFunction::Bm25, &[("a", "cat")]);
        assert!(matches!(e.retrieve("?!  --"), Err(RetrievalError::QuerySyntax(_))));
    }

    #[test]
    fn stopword_only_query_is_no_match() {
        let e = engine(NormalizationMode::Stem, RankingFunction::Bm25, &[("a", "the cat")]);
        assert_eq!(e.retrieve("the and").unwrap(), None);
    }

    #[test]
    fn repeated_query_terms_are_merged() {
        let e = engine(NormalizationMode::Standard, RankingFunction::Classic, &[("a", "cat dog"), ("b", "dog")]);
        let q = e.parse("cat cat dog").unwrap();
        let m = e.resolve(&q.terms);
        assert_eq!(m.len(), 2);
        assert_eq!(m[0].query_frequency, 2);
    }

    #[test]
    fn repeated_query_terms_count_under_both_rankings() {
        for ranking in [RankingFunction::Bm25, RankingFunction::Classic] {
            let e = engine(NormalizationMode::Standard, ranking, &[("b", "cat filler"), ("a", "dog filler")]);
            let once = e.retrieve("cat").unwrap().unwrap();
            let twice = e.retrieve("cat cat").unwrap().unwrap();
            assert_eq!(twice.doc_id, "b");
            assert!((twice.score - 2.0 * once.score).abs() < 1e-5, "{ranking}: {} vs {}", twice.score, once.score);
            assert_eq!(e.retrieve("cat cat dog").unwrap().unwrap().doc_id, "b", "{ranking}");
        }
    }

    #[test]
    fn parsed_query_carries_its_mode() {
        let e = engine(NormalizationMode::Biword, RankingFunction::Bm25, &[("a", "cat sat")]);
        let q = e.parse("cat sat").unwrap();
        assert_eq!(q.mode, NormalizationMode::Biword);
        assert_eq!(q.raw_text, "cat sat");
        assert_eq!(q.terms.len(), 1);
    }

    #[test]
    fn mode_mismatch_is_rejected() {
        let n = Normalizer::new(NormalizationMode::Standard, 2);
        let index = Arc::new(InvertedIndex::build(vec![], &n).unwrap());
        let err = QueryEngine::new(index, EngineConfig::new(RankingFunction::Bm25, NormalizationMode::Stem), None).unwrap_err();
        assert!(matches!(err, RetrievalError::ModeMismatch { .. }));
    }
}
