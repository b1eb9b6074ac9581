use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("no materials to index")]
    EmptyCorpus,
    #[error("no terms remain after pruning the vocabulary")]
    EmptyVocabulary,
    #[error("max_df allows {max_doc} documents, fewer than min_df {min_df}")]
    DocumentFrequencyBounds { max_doc: f32, min_df: u32 },
    #[error("index has not been built")]
    NotBuilt,
    #[error("index build was cancelled")]
    Cancelled,
    #[error("index file not found: {0}")]
    IndexNotFound(PathBuf),
    #[error("incompatible index format (expected version {expected}, found {found})")]
    IncompatibleFormat { expected: u32, found: u32 },
    #[error("index file is not a search index (bad magic)")]
    BadMagic,
    #[error("index file is corrupt: {0}")]
    Corrupt(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoding error: {0}")]
    Encode(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, SearchError>;
