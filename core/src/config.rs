use crate::engine::SearchOptions;
use crate::persist::DEFAULT_INDEX_FILE;
use crate::suggest::DEFAULT_MAX_SUGGESTIONS;
use crate::vectorizer::VectorizerConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub top_k: usize,
    pub min_score: f32,
    pub index_path: PathBuf,
    pub max_suggestions: usize,
    /// Results per page in the web layer.
    pub page_size: usize,
    pub vectorizer: VectorizerConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        let opts = SearchOptions::default();
        Self {
            top_k: opts.top_k,
            min_score: opts.min_score,
            index_path: PathBuf::from(DEFAULT_INDEX_FILE),
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            page_size: 12,
            vectorizer: VectorizerConfig::default(),
        }
    }
}

impl SearchConfig {
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions { top_k: self.top_k, min_score: self.min_score }
    }
}
