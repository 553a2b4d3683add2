use serde::{Deserialize, Serialize};
use std::fmt;

pub mod accumulator;
pub mod batch;
pub mod dedup;
pub mod error;
pub mod index;
pub mod query;
pub mod search;
pub mod tokenizer;

pub use accumulator::ShardedAccumulator;
pub use batch::{run_queries, run_queries_joined, run_queries_with};
pub use dedup::find_and_remove_duplicates;
pub use error::{IndexError, Result};
pub use index::SearchIndex;
pub use query::{ExecutionMode, Query};

pub type DocId = i32;
pub type Rating = i32;

/// Upper bound on the number of results returned by a single query.
pub const MAX_RESULT_DOCUMENT_COUNT: usize = 5;
/// Relevances closer than this are ranked by rating instead.
pub const RELEVANCE_EPSILON: f64 = 1e-6;
/// Shard count of the accumulator used by parallel queries.
pub const DEFAULT_SHARD_COUNT: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    #[default]
    Actual,
    Irrelevant,
    Banned,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentData {
    pub rating: Rating,
    pub status: DocumentStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub id: DocId,
    pub relevance: f64, // sum of tf * idf over matched plus-words
    pub rating: Rating,
}

impl fmt::Display for RankedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ document_id = {}, relevance = {}, rating = {} }}",
            self.id, self.relevance, self.rating
        )
    }
}

/// Predicate accepting only documents with the given status.
pub fn status_filter(status: DocumentStatus) -> impl Fn(DocId, DocumentStatus, Rating) -> bool + Sync + Send + Copy {
    move |_, document_status, _| document_status == status
}
