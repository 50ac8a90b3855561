use std::path::PathBuf;
use thiserror::Error;

use crate::config::NormalizationMode;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("failed to load corpus from {path}: {source}")]
    CorpusLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("lemmatizer unavailable: {reason}")]
    NormalizationUnavailable { reason: String },

    /// Normalization failed while ingesting a specific document.
    #[error("failed to normalize document {document:?}: {source}")]
    Normalization {
        document: String,
        #[source]
        source: Box<RetrievalError>,
    },

    #[error("query cannot be tokenized: {0:?}")]
    QuerySyntax(String),

    #[error("index was built with mode {index} but engine is configured for {engine}")]
    ModeMismatch {
        index: NormalizationMode,
        engine: NormalizationMode,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, RetrievalError>;
