//! TF-IDF vectorizer over word n-grams.
//!
//! Weights are `tf * idf` with smoothed `idf = ln((1 + N) / (1 + df)) + 1`, and every
//! vector is L2-normalized, so cosine similarity between two vectors is their dot product.

use crate::engine::CancelToken;
use crate::error::{Result, SearchError};
use crate::tokenizer::analyze;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type TermId = u32;

/// Sparse vector as `(term_id, weight)` pairs sorted by term id.
pub type SparseVector = Vec<(TermId, f32)>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    pub max_features: usize,
    pub ngram_range: (usize, usize),
    /// Minimum number of documents a term must appear in.
    pub min_df: u32,
    /// Maximum share of documents a term may appear in.
    pub max_df: f32,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self { max_features: 10_000, ngram_range: (1, 3), min_df: 1, max_df: 0.8 }
    }
}

impl VectorizerConfig {
    /// Upper document-frequency bound for a corpus of `num_docs` documents.
    pub fn max_doc_count(&self, num_docs: usize) -> f32 {
        self.max_df * num_docs as f32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vectorizer {
    pub config: VectorizerConfig,
    pub vocabulary: HashMap<String, TermId>,
    pub idf: Vec<f32>,
}

impl Vectorizer {
    /// Fit a vocabulary over `documents` and return the vectorizer together with the
    /// normalized TF-IDF row of every document, in input order.
    pub fn fit_transform(
        config: VectorizerConfig,
        documents: &[String],
        cancel: Option<&CancelToken>,
    ) -> Result<(Self, Vec<SparseVector>)> {
        if documents.is_empty() {
            return Err(SearchError::EmptyCorpus);
        }
        let num_docs = documents.len();

        let mut doc_counts: Vec<HashMap<String, u32>> = Vec::with_capacity(num_docs);
        let mut df: HashMap<String, u32> = HashMap::new();
        let mut totals: HashMap<String, u64> = HashMap::new();
        for doc in documents {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                return Err(SearchError::Cancelled);
            }
            let mut counts: HashMap<String, u32> = HashMap::new();
            for gram in analyze(doc, config.ngram_range) {
                *counts.entry(gram).or_insert(0) += 1;
            }
            for (term, c) in counts.iter() {
                *df.entry(term.clone()).or_insert(0) += 1;
                *totals.entry(term.clone()).or_insert(0) += *c as u64;
            }
            doc_counts.push(counts);
        }

        let max_doc = config.max_doc_count(num_docs);
        if max_doc < config.min_df as f32 {
            return Err(SearchError::DocumentFrequencyBounds { max_doc, min_df: config.min_df });
        }
        let mut kept: Vec<(String, u64)> = totals
            .into_iter()
            .filter(|(term, _)| {
                let d = df[term];
                d >= config.min_df && d as f32 <= max_doc
            })
            .collect();
        if kept.is_empty() {
            return Err(SearchError::EmptyVocabulary);
        }
        if kept.len() > config.max_features {
            kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            kept.truncate(config.max_features);
        }
        kept.sort_by(|a, b| a.0.cmp(&b.0));

        let n = num_docs as f32;
        let mut vocabulary: HashMap<String, TermId> = HashMap::with_capacity(kept.len());
        let mut idf: Vec<f32> = Vec::with_capacity(kept.len());
        for (tid, (term, _)) in kept.into_iter().enumerate() {
            let df_t = df[&term] as f32;
            idf.push(((1.0 + n) / (1.0 + df_t)).ln() + 1.0);
            vocabulary.insert(term, tid as TermId);
        }

        let vectorizer = Self { config, vocabulary, idf };
        let mut rows = Vec::with_capacity(num_docs);
        for counts in doc_counts {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                return Err(SearchError::Cancelled);
            }
            rows.push(vectorizer.weigh(counts));
        }
        Ok((vectorizer, rows))
    }

    pub fn num_features(&self) -> usize { self.idf.len() }

    /// Project text into the fitted vector space. Unknown terms contribute nothing.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: HashMap<String, u32> = HashMap::new();
        for gram in analyze(text, self.config.ngram_range) {
            if self.vocabulary.contains_key(&gram) {
                *counts.entry(gram).or_insert(0) += 1;
            }
        }
        self.weigh(counts)
    }

    fn weigh(&self, counts: HashMap<String, u32>) -> SparseVector {
        let mut vector: SparseVector = counts
            .into_iter()
            .filter_map(|(term, tf)| {
                let tid = *self.vocabulary.get(&term)?;
                Some((tid, tf as f32 * self.idf[tid as usize]))
            })
            .collect();
        vector.sort_by_key(|(tid, _)| *tid);
        l2_normalize(&mut vector);
        vector
    }
}

/// Scale to unit Euclidean length; all-zero vectors are left untouched.
pub fn l2_normalize(vector: &mut SparseVector) {
    let norm = vector.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
    if norm == 0.0 { return; }
    for (_, w) in vector.iter_mut() { *w /= norm; }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn smoothed_idf_and_unit_rows() {
        let corpus = docs(&["apple banana", "apple cherry", "durian"]);
        let (v, rows) = Vectorizer::fit_transform(VectorizerConfig::default(), &corpus, None).unwrap();
        let banana = v.vocabulary["banana"] as usize;
        let expected = (4.0f32 / 2.0).ln() + 1.0;
        assert!((v.idf[banana] - expected).abs() < 1e-6);
        for row in &rows {
            let norm: f32 = row.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn max_df_drops_common_terms() {
        let corpus = docs(&["common alpha", "common beta", "common gamma"]);
        let (v, _) = Vectorizer::fit_transform(VectorizerConfig::default(), &corpus, None).unwrap();
        assert!(!v.vocabulary.contains_key("common"));
        assert!(v.vocabulary.contains_key("alpha"));
        assert!(v.vocabulary.contains_key("common alpha"));
    }

    #[test]
    fn max_features_keeps_most_frequent() {
        let config = VectorizerConfig { max_features: 2, ngram_range: (1, 1), ..Default::default() };
        let corpus = docs(&["zeta zeta zeta beta", "alpha alpha omega", "solo"]);
        let (v, _) = Vectorizer::fit_transform(config, &corpus, None).unwrap();
        assert_eq!(v.num_features(), 2);
        assert_eq!(v.vocabulary["alpha"], 0);
        assert_eq!(v.vocabulary["zeta"], 1);
    }

    #[test]
    fn all_stopword_corpus_has_no_vocabulary() {
        let corpus = docs(&["the and of", "a to in"]);
        let err = Vectorizer::fit_transform(VectorizerConfig::default(), &corpus, None).unwrap_err();
        assert!(matches!(err, SearchError::EmptyVocabulary));
    }

    #[test]
    fn single_document_is_below_min_df() {
        let err = Vectorizer::fit_transform(VectorizerConfig::default(), &docs(&["lonely physics notes"]), None).unwrap_err();
        assert!(matches!(err, SearchError::DocumentFrequencyBounds { min_df: 1, .. }));
    }

    #[test]
    fn transform_ignores_unknown_terms() {
        let corpus = docs(&["apple banana", "cherry"]);
        let (v, _) = Vectorizer::fit_transform(VectorizerConfig::default(), &corpus, None).unwrap();
        assert!(v.transform("kiwi mango").is_empty());
        let q = v.transform("apple kiwi");
        assert_eq!(q.len(), 1);
        assert!((q[0].1 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cancelled_fit_stops() {
        let token = CancelToken::new();
        token.cancel();
        let err = Vectorizer::fit_transform(VectorizerConfig::default(), &docs(&["x1 y2"]), Some(&token)).unwrap_err();
        assert!(matches!(err, SearchError::Cancelled));
    }
}
