//! The search engine service.
//!
//! A [`SearchEngine`] owns at most one [`IndexSnapshot`]. Builds and loads assemble a
//! complete candidate snapshot without holding any lock and only take the write lock
//! to swap it in, so readers never observe a partially replaced index.

use crate::error::{Result, SearchError};
use crate::index::IndexSnapshot;
use crate::material::{MaterialId, MaterialRecord};
use crate::persist::{load_snapshot, save_snapshot};
use crate::suggest::generate_suggestions;
use crate::vectorizer::VectorizerConfig;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const MAX_MATCHED_TERMS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub material_id: MaterialId,
    /// Percent relevance in [0, 100], rounded to two decimals.
    pub score: f32,
    /// Query words found verbatim in the prepared document. Unordered; at most five.
    pub matched_terms: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    pub documents: usize,
    pub features: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub top_k: usize,
    /// Similarities must be strictly greater than this to be returned.
    pub min_score: f32,
}

impl Default for SearchOptions {
    fn default() -> Self { Self { top_k: 20, min_score: 0.1 } }
}

/// Cooperative cancellation flag for long index builds.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self { Self::default() }
    pub fn cancel(&self) { self.0.store(true, Ordering::Relaxed); }
    pub fn is_cancelled(&self) -> bool { self.0.load(Ordering::Relaxed) }
}

#[derive(Default)]
pub struct SearchEngine {
    config: VectorizerConfig,
    index: RwLock<Option<Arc<IndexSnapshot>>>,
}

impl SearchEngine {
    pub fn new() -> Self { Self::default() }

    pub fn with_config(config: VectorizerConfig) -> Self {
        Self { config, index: RwLock::new(None) }
    }

    pub fn is_built(&self) -> bool { self.index.read().is_some() }

    /// The current snapshot, if any. Holding it keeps that index alive across rebuilds.
    pub fn snapshot(&self) -> Option<Arc<IndexSnapshot>> { self.index.read().clone() }

    pub fn stats(&self) -> Option<BuildStats> {
        self.snapshot().map(|s| BuildStats { documents: s.num_docs(), features: s.num_features() })
    }

    pub fn document_ids(&self) -> Vec<MaterialId> {
        self.snapshot().map(|s| s.document_ids.clone()).unwrap_or_default()
    }

    pub fn build_index(&self, materials: &[MaterialRecord]) -> Result<BuildStats> {
        self.build(materials, None)
    }

    pub fn build_index_cancellable(&self, materials: &[MaterialRecord], cancel: &CancelToken) -> Result<BuildStats> {
        self.build(materials, Some(cancel))
    }

    fn build(&self, materials: &[MaterialRecord], cancel: Option<&CancelToken>) -> Result<BuildStats> {
        if materials.is_empty() {
            tracing::warn!("no materials to index");
            return Err(SearchError::EmptyCorpus);
        }
        let candidate = IndexSnapshot::build(materials, self.config.clone(), cancel)?;
        let stats = BuildStats { documents: candidate.num_docs(), features: candidate.num_features() };
        *self.index.write() = Some(Arc::new(candidate));
        tracing::info!(documents = stats.documents, features = stats.features, "index built");
        Ok(stats)
    }

    /// Build and report success as a boolean, logging the failure reason.
    pub fn rebuild(&self, materials: &[MaterialRecord]) -> bool {
        match self.build_index(materials) {
            Ok(_) => true,
            Err(SearchError::EmptyCorpus) => false,
            Err(e) => {
                tracing::error!(error = %e, "index build failed");
                false
            }
        }
    }

    /// Rank `materials` against `query`. Builds the index first when none exists.
    pub fn try_search(&self, query: &str, materials: &[MaterialRecord], opts: SearchOptions) -> Result<Vec<SearchResult>> {
        let snapshot = match self.snapshot() {
            Some(s) => s,
            None => {
                self.build_index(materials)?;
                self.snapshot().ok_or(SearchError::NotBuilt)?
            }
        };
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let query = query.to_lowercase();
        let similarities = snapshot.similarities(&query);
        let mut ranked: Vec<(usize, f32)> = similarities
            .into_iter()
            .enumerate()
            .filter(|(_, sim)| *sim > opts.min_score)
            .collect();
        // stable: equal similarities keep row order
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(opts.top_k);

        let by_id: HashMap<MaterialId, &MaterialRecord> = materials.iter().map(|m| (m.id, m)).collect();
        let mut results = Vec::with_capacity(ranked.len());
        for (row, sim) in ranked {
            let material_id = snapshot.document_ids[row];
            if !by_id.contains_key(&material_id) {
                continue;
            }
            results.push(SearchResult {
                material_id,
                score: percent(sim),
                matched_terms: matched_terms(&query, &snapshot.documents[row]),
            });
        }
        Ok(results)
    }

    /// Like [`try_search`](Self::try_search) but never fails: errors are logged and
    /// turned into an empty result list.
    pub fn search(&self, query: &str, materials: &[MaterialRecord], opts: SearchOptions) -> Vec<SearchResult> {
        match self.try_search(query, materials, opts) {
            Ok(results) => results,
            Err(SearchError::EmptyCorpus) => Vec::new(),
            Err(e) => {
                tracing::error!(error = %e, query, "search failed");
                Vec::new()
            }
        }
    }

    pub fn suggest(&self, query: &str, materials: &[MaterialRecord], max_suggestions: usize) -> Vec<String> {
        generate_suggestions(query, materials, max_suggestions)
    }

    pub fn save_index(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let snapshot = self.snapshot().ok_or_else(|| {
            tracing::warn!("index not built, nothing to save");
            SearchError::NotBuilt
        })?;
        save_snapshot(path, &snapshot).inspect_err(|e| {
            tracing::error!(error = %e, path = %path.display(), "failed to save index");
        })?;
        tracing::info!(path = %path.display(), documents = snapshot.num_docs(), "index saved");
        Ok(())
    }

    /// Replace the in-memory index with the one stored at `path`. On any error the
    /// current index is left as it was.
    pub fn load_index(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let (header, snapshot) = load_snapshot(path).inspect_err(|e| {
            tracing::warn!(error = %e, path = %path.display(), "failed to load index");
        })?;
        let loaded = header.built.then(|| Arc::new(snapshot));
        *self.index.write() = loaded;
        tracing::info!(path = %path.display(), documents = header.num_docs, features = header.num_features, "index loaded");
        Ok(())
    }
}

fn percent(similarity: f32) -> f32 {
    (similarity * 100.0 * 100.0).round() / 100.0
}

/// Intersection of whitespace-split query words and document words, capped at five.
pub fn matched_terms(query: &str, document: &str) -> BTreeSet<String> {
    let doc_words: HashSet<&str> = document.split_whitespace().collect();
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|w| doc_words.contains(w))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .take(MAX_MATCHED_TERMS)
        .collect()
}
