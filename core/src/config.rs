//! Construction-time configuration for an index and its query engine.
//!
//! Every field is fixed for the lifetime of one engine. To compare settings,
//! build one engine per configuration.

use crate::error::{Result, RetrievalError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_PROXIMITY_WINDOW: u32 = 2;

/// How raw text is turned into index terms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationMode {
    /// Lower-cased alphanumeric tokens, nothing else.
    #[default]
    #[serde(alias = "none")]
    Standard,
    Stem,
    Lemma,
    Biword,
}

impl NormalizationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NormalizationMode::Standard => "none",
            NormalizationMode::Stem => "stem",
            NormalizationMode::Lemma => "lemma",
            NormalizationMode::Biword => "biword",
        }
    }
}

impl fmt::Display for NormalizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NormalizationMode {
    type Err = RetrievalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "standard" => Ok(NormalizationMode::Standard),
            "stem" | "stemming" => Ok(NormalizationMode::Stem),
            "lemma" | "lemmatization" => Ok(NormalizationMode::Lemma),
            "biword" => Ok(NormalizationMode::Biword),
            other => Err(RetrievalError::InvalidConfig(format!(
                "unknown normalization mode {other:?} (expected none, stem, lemma or biword)"
            ))),
        }
    }
}

/// Ranking function used by the scorer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingFunction {
    #[default]
    Bm25,
    /// TF-IDF cosine, the classic vector-space model.
    Classic,
}

impl fmt::Display for RankingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankingFunction::Bm25 => f.write_str("bm25"),
            RankingFunction::Classic => f.write_str("classic"),
        }
    }
}

impl FromStr for RankingFunction {
    type Err = RetrievalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bm25" => Ok(RankingFunction::Bm25),
            "classic" | "tfidf" | "cosine" => Ok(RankingFunction::Classic),
            other => Err(RetrievalError::InvalidConfig(format!(
                "unknown ranking function {other:?} (expected bm25 or classic)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    pub k1: f32,
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub ranking: RankingFunction,
    pub mode: NormalizationMode,
    pub bm25: Bm25Params,
    /// Maximum distance between the two tokens of a biword phrase.
    pub proximity_window: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ranking: RankingFunction::default(),
            mode: NormalizationMode::default(),
            bm25: Bm25Params::default(),
            proximity_window: DEFAULT_PROXIMITY_WINDOW,
        }
    }
}

impl EngineConfig {
    pub fn new(ranking: RankingFunction, mode: NormalizationMode) -> Self {
        Self { ranking, mode, ..Self::default() }
    }

    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            RetrievalError::InvalidConfig(format!("cannot open {}: {e}", path.display()))
        })?;
        let cfg: EngineConfig = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            RetrievalError::InvalidConfig(format!("cannot parse {}: {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.proximity_window == 0 {
            return Err(RetrievalError::InvalidConfig("proximity_window must be at least 1".into()));
        }
        if !(self.bm25.k1.is_finite() && self.bm25.k1 >= 0.0) {
            return Err(RetrievalError::InvalidConfig(format!("bm25.k1 must be >= 0, got {}", self.bm25.k1)));
        }
        if !(0.0..=1.0).contains(&self.bm25.b) {
            return Err(RetrievalError::InvalidConfig(format!("bm25.b must be within [0, 1], got {}", self.bm25.b)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_selectors() {
        assert_eq!("none".parse::<NormalizationMode>().unwrap(), NormalizationMode::Standard);
        assert_eq!("BIWORD".parse::<NormalizationMode>().unwrap(), NormalizationMode::Biword);
        assert_eq!("classic".parse::<RankingFunction>().unwrap(), RankingFunction::Classic);
        assert!("lucene".parse::<RankingFunction>().is_err());
    }

    #[test]
    fn partial_json_takes_defaults() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"mode":"stem"}"#).unwrap();
        assert_eq!(cfg.mode, NormalizationMode::Stem);
        assert_eq!(cfg.ranking, RankingFunction::Bm25);
        assert_eq!(cfg.proximity_window, 2);
        assert_eq!(cfg.bm25, Bm25Params { k1: 1.2, b: 0.75 });
    }

    #[test]
    fn rejects_zero_window() {
        let cfg = EngineConfig { proximity_window: 0, ..EngineConfig::default() };
        assert!(cfg.validate().is_err());
    }
}
