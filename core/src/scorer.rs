//! Ranking functions.
//!
//! BM25 (Okapi):
//!   idf(t)  = ln(1 + (N - df + 0.5) / (df + 0.5))
//!   tf'(t)  = tf * (k1 + 1) / (tf + k1 * (1 - b + b * |d| / avgdl))
//!   score   = sum over query terms of idf * tf' (repeats count each time)
//!
//! Classic (TF-IDF cosine):
//!   idf(t)  = 1 + ln(N / df)
//!   score   = sum over query terms of (qtf * idf) * (tf * idf) / sqrt(|d|)
//!
//! A biword phrase is scored as a pseudo-term whose frequency is the number
//! of proximity matches in the document and whose document frequency is the
//! number of matching documents.

use crate::config::{Bm25Params, RankingFunction};
use crate::index::{DocId, InvertedIndex};
use crate::normalizer::{Biword, Term};
use std::collections::HashMap;

/// Per-document frequencies of one query term, resolved against an index.
#[derive(Debug, Clone, PartialEq)]
pub struct TermMatches {
    pub term: Term,
    /// Occurrences of the term in the query.
    pub query_frequency: u32,
    pub freqs: HashMap<DocId, u32>,
}

impl TermMatches {
    pub fn collect(term: &Term, index: &InvertedIndex) -> Self {
        let freqs = match term {
            Term::Word(w) => index
                .postings(w)
                .map(|plist| plist.iter().map(|p| (p.doc_id, p.term_frequency)).collect())
                .unwrap_or_default(),
            Term::Phrase(phrase) => phrase_matches(phrase, index),
        };
        Self { term: term.clone(), query_frequency: 1, freqs }
    }

    pub fn doc_freq(&self) -> u32 { self.freqs.len() as u32 }

    pub fn frequency(&self, doc_id: DocId) -> u32 {
        self.freqs.get(&doc_id).copied().unwrap_or(0)
    }
}

/// Documents where both tokens of `phrase` occur within its window, with
/// the number of matching positions of the first token.
pub fn phrase_matches(phrase: &Biword, index: &InvertedIndex) -> HashMap<DocId, u32> {
    let (Some(first), Some(second)) = (index.postings(&phrase.first), index.postings(&phrase.second)) else {
        return HashMap::new();
    };
    // Both lists are sorted by doc_id: merge-intersect.
    let mut out = HashMap::new();
    let (mut i, mut j) = (0, 0);
    while i < first.len() && j < second.len() {
        let (a, b) = (&first[i], &second[j]);
        if a.doc_id < b.doc_id {
            i += 1;
        } else if a.doc_id > b.doc_id {
            j += 1;
        } else {
            let freq = proximity_frequency(&a.positions, &b.positions, phrase.window);
            if freq > 0 {
                out.insert(a.doc_id, freq);
            }
            i += 1;
            j += 1;
        }
    }
    out
}

/// Count positions in `first` that have a distinct position in `second` at
/// most `window` away. Both slices must be ascending.
pub fn proximity_frequency(first: &[u32], second: &[u32], window: u32) -> u32 {
    let mut count = 0;
    for &p in first {
        let lo = p.saturating_sub(window);
        let hi = p.saturating_add(window);
        let start = second.partition_point(|&q| q < lo);
        if second[start..].iter().take_while(|&&q| q <= hi).any(|&q| q != p) {
            count += 1;
        }
    }
    count
}

#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    ranking: RankingFunction,
    bm25: Bm25Params,
    num_docs: u32,
    avg_doc_length: f32,
}

impl Scorer {
    pub fn new(ranking: RankingFunction, bm25: Bm25Params, index: &InvertedIndex) -> Self {
        Self { ranking, bm25, num_docs: index.num_docs(), avg_doc_length: index.avg_doc_length() }
    }

    pub fn ranking(&self) -> RankingFunction { self.ranking }

    pub fn idf(&self, df: u32) -> f32 {
        if df == 0 {
            return 0.0;
        }
        let n = self.num_docs as f32;
        let df = df as f32;
        match self.ranking {
            RankingFunction::Bm25 => (1.0 + (n - df + 0.5) / (df + 0.5)).ln(),
            RankingFunction::Classic => 1.0 + (n / df).ln(),
        }
    }

    /// Contribution of one query term to one document's score.
    pub fn term_score(&self, tf: u32, query_frequency: u32, df: u32, doc_len: u32) -> f32 {
        if tf == 0 || df == 0 || doc_len == 0 {
            return 0.0;
        }
        let idf = self.idf(df);
        let tf = tf as f32;
        let dl = doc_len as f32;
        match self.ranking {
            RankingFunction::Bm25 => {
                if self.avg_doc_length <= 0.0 {
                    return 0.0;
                }
                let Bm25Params { k1, b } = self.bm25;
                let tf_norm = (tf * (k1 + 1.0)) / (tf + k1 * (1.0 - b + b * dl / self.avg_doc_length));
                query_frequency as f32 * idf * tf_norm
            }
            RankingFunction::Classic => {
                let query_weight = query_frequency as f32 * idf;
                let doc_weight = tf * idf;
                query_weight * doc_weight / dl.sqrt()
            }
        }
    }

    pub fn score(&self, terms: &[TermMatches], doc_id: DocId, index: &InvertedIndex) -> f32 {
        let doc_len = index.doc_length(doc_id);
        terms
            .iter()
            .map(|t| self.term_score(t.frequency(doc_id), t.query_frequency, t.doc_freq(), doc_len))
            .sum()
    }
}
