//! Top-1 retrieval core: corpus loading, term normalization, an in-memory
//! inverted index, BM25 / classic TF-IDF scoring and a single-hit query
//! engine.

pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod index;
pub mod lemma;
pub mod normalizer;
pub mod scorer;
pub mod tokenizer;

pub use config::{Bm25Params, EngineConfig, NormalizationMode, RankingFunction};
pub use corpus::RawDocument;
pub use engine::{Hit, Query, QueryEngine};
pub use error::{Result, RetrievalError};
pub use index::{DocId, Document, IndexStats, InvertedIndex, Posting};
pub use lemma::{CommandLemmatizer, Lemmatizer};
pub use normalizer::{Biword, Normalizer, Term};
pub use scorer::{Scorer, TermMatches};

use std::sync::Arc;

/// Build an index from `docs` and wrap it in an engine for `config`.
pub fn build_engine(
    docs: Vec<RawDocument>,
    config: EngineConfig,
    lemmatizer: Option<Arc<dyn Lemmatizer>>,
) -> Result<QueryEngine> {
    let mut normalizer = Normalizer::new(config.mode, config.proximity_window);
    if let Some(l) = lemmatizer.clone() {
        normalizer = normalizer.with_lemmatizer(l);
    }
    let index = InvertedIndex::build(docs, &normalizer)?;
    QueryEngine::new(Arc::new(index), config, lemmatizer)
}
