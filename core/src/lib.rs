pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod keyword;
pub mod material;
pub mod persist;
pub mod prepare;
pub mod suggest;
pub mod tokenizer;
pub mod vectorizer;

pub use config::SearchConfig;
pub use engine::{BuildStats, CancelToken, SearchEngine, SearchOptions, SearchResult};
pub use error::SearchError;
pub use index::{IndexSnapshot, Posting};
pub use keyword::keyword_search;
pub use material::{MaterialId, MaterialRecord, MaterialType};
pub use prepare::prepare_document;
pub use suggest::{generate_suggestions, needs_suggestions, SUGGESTION_THRESHOLD};
pub use vectorizer::{TermId, Vectorizer, VectorizerConfig};
