use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;
use std::collections::HashSet;

lazy_static! {
    static ref RE: Regex = Regex::new(r"[\p{L}\p{N}]+").expect("valid regex");
    static ref POSSESSIVE: Regex = Regex::new(r"['’]s\b").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","an","and","are","as","at","be","but","by","for","if","in","into","is","it",
            "no","not","of","on","or","such","that","the","their","then","there","these",
            "they","this","to","was","will","with"
        ];
        words.iter().copied().collect()
    };
}

/// Upper bound on stemmer passes. Porter2 output settles after one or two.
const MAX_STEM_PASSES: usize = 8;

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Tokenize text into (term, position) using NFKC normalization and lowercasing.
/// Possessive `'s` is dropped; then every run of letters/digits is a token
/// and everything else separates tokens.
pub fn tokenize(text: &str) -> Vec<(String, usize)> {
    let lowered = text.nfkc().collect::<String>().to_lowercase();
    let normalized = POSSESSIVE.replace_all(&lowered, "");
    RE.find_iter(&normalized)
        .enumerate()
        .map(|(pos, mat)| (mat.as_str().to_string(), pos))
        .collect()
}

/// Like [`tokenize`], with stopword removal and stemming. Removed stopwords
/// still consume a position.
pub fn tokenize_stemmed(text: &str) -> Vec<(String, usize)> {
    tokenize(text)
        .into_iter()
        .filter(|(token, _)| !is_stopword(token))
        .map(|(token, pos)| (stem(&token), pos))
        .collect()
}

/// Stem a single lower-cased token. Applied to a fixed point so that
/// `stem(&stem(x)) == stem(x)`.
pub fn stem(token: &str) -> String {
    let mut current = STEMMER.stem(token).into_owned();
    for _ in 1..MAX_STEM_PASSES {
        let next = STEMMER.stem(&current);
        if next == current {
            break;
        }
        current = next.into_owned();
    }
    current
}

/// True if `token` contains at least one letter or digit.
pub fn has_alphanumeric(token: &str) -> bool {
    token.chars().any(char::is_alphanumeric)
}
