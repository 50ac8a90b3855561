//! Text → term normalization under the four supported modes.

use crate::config::NormalizationMode;
use crate::error::{Result, RetrievalError};
use crate::lemma::Lemmatizer;
use crate::tokenizer::{has_alphanumeric, tokenize, tokenize_stemmed};
use std::fmt;
use std::sync::Arc;

/// Two tokens that must co-occur within `window` positions of each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Biword {
    pub first: String,
    pub second: String,
    pub window: u32,
}

impl fmt::Display for Biword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{} {}\"~{}", self.first, self.second, self.window)
    }
}

/// A query-side term: a single index term or a biword phrase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Word(String),
    Phrase(Biword),
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Word(w) => f.write_str(w),
            Term::Phrase(p) => fmt::Display::fmt(p, f),
        }
    }
}

#[derive(Clone)]
pub struct Normalizer {
    mode: NormalizationMode,
    window: u32,
    lemmatizer: Option<Arc<dyn Lemmatizer>>,
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer")
            .field("mode", &self.mode)
            .field("window", &self.window)
            .field("lemmatizer", &self.lemmatizer.is_some())
            .finish()
    }
}

impl Normalizer {
    pub fn new(mode: NormalizationMode, window: u32) -> Self {
        Self { mode, window, lemmatizer: None }
    }

    pub fn with_lemmatizer(mut self, lemmatizer: Arc<dyn Lemmatizer>) -> Self {
        self.lemmatizer = Some(lemmatizer);
        self
    }

    pub fn mode(&self) -> NormalizationMode { self.mode }

    pub fn window(&self) -> u32 { self.window }

    /// Positioned index terms for a document body.
    ///
    /// Biword indexes store plain tokens; phrases are resolved against their
    /// positions at query time.
    pub fn index_terms(&self, text: &str) -> Result<Vec<(String, usize)>> {
        match self.mode {
            NormalizationMode::Standard | NormalizationMode::Biword => Ok(tokenize(text)),
            NormalizationMode::Stem => Ok(tokenize_stemmed(text)),
            NormalizationMode::Lemma => {
                let lemmas = self.lemmas(text)?;
                Ok(lemmas.into_iter().enumerate().map(|(pos, l)| (l, pos)).collect())
            }
        }
    }

    /// Query terms for `text` under the active mode, in source order.
    pub fn normalize(&self, text: &str) -> Result<Vec<Term>> {
        match self.mode {
            NormalizationMode::Biword => Ok(self.biwords(text).into_iter().map(Term::Phrase).collect()),
            _ => Ok(self.index_terms(text)?.into_iter().map(|(t, _)| Term::Word(t)).collect()),
        }
    }

    /// One phrase per adjacent token pair. Fewer than two tokens yield none.
    pub fn biwords(&self, text: &str) -> Vec<Biword> {
        let tokens: Vec<String> = tokenize(text).into_iter().map(|(t, _)| t).collect();
        tokens
            .windows(2)
            .map(|pair| Biword { first: pair[0].clone(), second: pair[1].clone(), window: self.window })
            .collect()
    }

    fn lemmas(&self, text: &str) -> Result<Vec<String>> {
        let lemmatizer = self.lemmatizer.as_ref().ok_or_else(|| RetrievalError::NormalizationUnavailable {
            reason: "no lemmatizer configured".into(),
        })?;
        let lemmas = lemmatizer.lemmatize(text)?;
        Ok(lemmas
            .into_iter()
            .filter(|l| has_alphanumeric(l))
            .map(|l| l.to_lowercase())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Suffixless;

    impl Lemmatizer for Suffixless {
        fn lemmatize(&self, text: &str) -> Result<Vec<String>> {
            Ok(text
                .split_whitespace()
                .map(|w| w.trim_end_matches('s').to_string())
                .collect())
        }
    }

    fn words(terms: Vec<Term>) -> Vec<String> {
        terms.into_iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn standard_lowercases_and_strips_punctuation() {
        let n = Normalizer::new(NormalizationMode::Standard, 2);
        assert_eq!(words(n.normalize("The Cat-sat, on THE mat!").unwrap()), vec!["the", "cat", "sat", "on", "the", "mat"]);
    }

    #[test]
    fn stem_drops_stopwords() {
        let n = Normalizer::new(NormalizationMode::Stem, 2);
        assert_eq!(words(n.normalize("The dogs are barking").unwrap()), vec!["dog", "bark"]);
    }

    #[test]
    fn biword_pairs_adjacent_tokens() {
        let n = Normalizer::new(NormalizationMode::Biword, 2);
        let terms = n.normalize("Cat sat on").unwrap();
        assert_eq!(words(terms), vec!["\"cat sat\"~2", "\"sat on\"~2"]);
        assert!(n.normalize("cat").unwrap().is_empty());
    }

    #[test]
    fn lemma_without_lemmatizer_is_unavailable() {
        let n = Normalizer::new(NormalizationMode::Lemma, 2);
        assert!(matches!(n.normalize("cats"), Err(RetrievalError::NormalizationUnavailable { .. })));
    }

    #[test]
    fn lemma_delegates_and_drops_punctuation() {
        let n = Normalizer::new(NormalizationMode::Lemma, 2).with_lemmatizer(Arc::new(Suffixless));
        assert_eq!(words(n.normalize("Cats sat . mats").unwrap()), vec!["cat", "sat", "mat"]);
    }
}
