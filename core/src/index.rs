use crate::config::NormalizationMode;
use crate::corpus::RawDocument;
use crate::error::{Result, RetrievalError};
use crate::normalizer::Normalizer;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

pub type DocId = u32;

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub external_id: String,
    pub raw_text: String,
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    pub doc_id: DocId,
    pub term_frequency: u32,
    /// Ascending token positions of the term in the document.
    pub positions: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexStats {
    pub num_docs: u32,
    pub num_terms: usize,
    pub avg_doc_length: f32,
    pub replaced_ids: Vec<String>,
}

/// In-memory inverted index. Built once by [`InvertedIndex::build`]; there
/// are no mutating methods afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct InvertedIndex {
    mode: NormalizationMode,
    postings: HashMap<String, Vec<Posting>>, // postings sorted by doc_id
    doc_lengths: Vec<u32>,
    docs: Vec<Document>,
    doc_id_map: HashMap<String, DocId>,
    avg_doc_length: f32,
    replaced_ids: Vec<String>,
}

impl InvertedIndex {
    /// Build an index from raw documents, normalizing each under the
    /// normalizer's mode.
    ///
    /// Colliding identifiers are resolved last-write-wins: only the final
    /// occurrence of an id is indexed, at that occurrence's position in the
    /// input. Replaced ids are logged and kept in [`Self::replaced_ids`].
    pub fn build(raw_docs: Vec<RawDocument>, normalizer: &Normalizer) -> Result<Self> {
        let (raw_docs, replaced_ids) = last_write_wins(raw_docs);

        let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();
        let mut doc_lengths: Vec<u32> = Vec::with_capacity(raw_docs.len());
        let mut docs: Vec<Document> = Vec::with_capacity(raw_docs.len());
        let mut doc_id_map: HashMap<String, DocId> = HashMap::with_capacity(raw_docs.len());
        let mut total_len: u64 = 0;

        for raw in raw_docs {
            let doc_id = docs.len() as DocId;
            let tokens = normalizer.index_terms(&raw.text).map_err(|e| RetrievalError::Normalization {
                document: raw.id.clone(),
                source: Box::new(e),
            })?;

            // Group positions per term; order of first occurrence keeps the
            // postings layout independent of hash iteration order.
            let mut order: Vec<String> = Vec::new();
            let mut positions: HashMap<String, Vec<u32>> = HashMap::new();
            for (term, pos) in &tokens {
                positions
                    .entry(term.clone())
                    .or_insert_with(|| {
                        order.push(term.clone());
                        Vec::new()
                    })
                    .push(*pos as u32);
            }
            for term in order {
                if let Some(pos) = positions.remove(&term) {
                    postings.entry(term).or_default().push(Posting {
                        doc_id,
                        term_frequency: pos.len() as u32,
                        positions: pos,
                    });
                }
            }

            let len = tokens.len() as u32;
            total_len += len as u64;
            doc_lengths.push(len);
            doc_id_map.insert(raw.id.clone(), doc_id);
            docs.push(Document {
                external_id: raw.id,
                raw_text: raw.text,
                terms: tokens.into_iter().map(|(t, _)| t).collect(),
            });
        }

        let avg_doc_length = if docs.is_empty() { 0.0 } else { total_len as f32 / docs.len() as f32 };
        let index = Self {
            mode: normalizer.mode(),
            postings,
            doc_lengths,
            docs,
            doc_id_map,
            avg_doc_length,
            replaced_ids,
        };
        tracing::info!(
            mode = %index.mode,
            num_docs = index.num_docs(),
            num_terms = index.num_terms(),
            avg_len = index.avg_doc_length,
            "index built"
        );
        Ok(index)
    }

    pub fn mode(&self) -> NormalizationMode { self.mode }

    pub fn num_docs(&self) -> u32 { self.docs.len() as u32 }

    pub fn num_terms(&self) -> usize { self.postings.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    pub fn avg_doc_length(&self) -> f32 { self.avg_doc_length }

    pub fn postings(&self, term: &str) -> Option<&[Posting]> {
        self.postings.get(term).map(Vec::as_slice)
    }

    /// Number of documents containing `term`.
    pub fn doc_freq(&self, term: &str) -> u32 {
        self.postings.get(term).map_or(0, |p| p.len() as u32)
    }

    pub fn doc_length(&self, doc_id: DocId) -> u32 {
        self.doc_lengths.get(doc_id as usize).copied().unwrap_or(0)
    }

    pub fn doc_lengths(&self) -> &[u32] { &self.doc_lengths }

    pub fn document(&self, doc_id: DocId) -> Option<&Document> {
        self.docs.get(doc_id as usize)
    }

    pub fn document_by_id(&self, external_id: &str) -> Option<&Document> {
        self.doc_id_map.get(external_id).and_then(|&id| self.document(id))
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> + '_ {
        self.docs.iter()
    }

    pub fn replaced_ids(&self) -> &[String] { &self.replaced_ids }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            num_docs: self.num_docs(),
            num_terms: self.num_terms(),
            avg_doc_length: self.avg_doc_length,
            replaced_ids: self.replaced_ids.clone(),
        }
    }
}

fn last_write_wins(raw_docs: Vec<RawDocument>) -> (Vec<RawDocument>, Vec<String>) {
    let mut last: HashMap<&str, usize> = HashMap::with_capacity(raw_docs.len());
    for (i, doc) in raw_docs.iter().enumerate() {
        last.insert(doc.id.as_str(), i);
    }
    if last.len() == raw_docs.len() {
        return (raw_docs, Vec::new());
    }
    let keep: HashSet<usize> = last.into_values().collect();

    let mut replaced: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(keep.len());
    for (i, doc) in raw_docs.into_iter().enumerate() {
        if keep.contains(&i) {
            kept.push(doc);
        } else if seen.insert(doc.id.clone()) {
            tracing::warn!(id = %doc.id, "duplicate document id; keeping the last occurrence");
            replaced.push(doc.id);
        }
    }
    (kept, replaced)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, text: &str) -> RawDocument {
        RawDocument { id: id.into(), text: text.into() }
    }

    #[test]
    fn builds_postings_and_lengths() {
        let n = Normalizer::new(NormalizationMode::Standard, 2);
        let idx = InvertedIndex::build(vec![raw("D1", "the cat sat on the mat"), raw("D2", "dogs bark")], &n).unwrap();
        assert_eq!(idx.num_docs(), 2);
        assert_eq!(idx.doc_lengths(), &[6, 2]);
        assert_eq!(idx.avg_doc_length(), 4.0);
        let the = idx.postings("the").unwrap();
        assert_eq!(the, &[Posting { doc_id: 0, term_frequency: 2, positions: vec![0, 4] }]);
        assert_eq!(idx.doc_freq("dogs"), 1);
        assert_eq!(idx.doc_freq("fish"), 0);
        assert_eq!(idx.document_by_id("D2").unwrap().terms, vec!["dogs", "bark"]);
    }

    #[test]
    fn duplicate_ids_keep_last_body() {
        let n = Normalizer::new(NormalizationMode::Standard, 2);
        let idx = InvertedIndex::build(
            vec![raw("A", "old text"), raw("B", "other"), raw("A", "new text")],
            &n,
        )
        .unwrap();
        assert_eq!(idx.num_docs(), 2);
        assert_eq!(idx.replaced_ids(), &["A".to_string()]);
        assert_eq!(idx.document_by_id("A").unwrap().raw_text, "new text");
        assert_eq!(idx.doc_freq("old"), 0);
    }

    #[test]
    fn every_posting_points_at_a_stored_document() {
        let n = Normalizer::new(NormalizationMode::Stem, 2);
        let idx = InvertedIndex::build(vec![raw("x", "running dogs"), raw("y", "a dog runs")], &n).unwrap();
        for doc in idx.documents() {
            for term in &doc.terms {
                for p in idx.postings(term).unwrap() {
                    assert!(idx.document(p.doc_id).is_some());
                }
            }
        }
        assert_eq!(idx.doc_freq("dog"), 2);
    }
}
