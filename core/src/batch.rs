//! Run many independent queries against one index on the rayon pool.
//!
//! Queries only read the index, so a shared `&SearchIndex` is all the
//! coordination needed. Output order always follows input order.

use crate::error::Result;
use crate::index::SearchIndex;
use crate::query::ExecutionMode;
use crate::{status_filter, DocumentStatus, RankedResult};
use rayon::prelude::*;

/// Top documents for each query, in the order the queries were given.
///
/// Fails with the first error raised by any query.
pub fn run_queries<Q>(index: &SearchIndex, queries: &[Q]) -> Result<Vec<Vec<RankedResult>>>
where
    Q: AsRef<str> + Sync,
{
    run_queries_with(index, queries, ExecutionMode::Sequential)
}

/// Like [`run_queries`], with each query itself run in `mode`.
pub fn run_queries_with<Q>(
    index: &SearchIndex,
    queries: &[Q],
    mode: ExecutionMode,
) -> Result<Vec<Vec<RankedResult>>>
where
    Q: AsRef<str> + Sync,
{
    let results = queries
        .par_iter()
        .map(|query| {
            index.find_top_documents_with(mode, query.as_ref(), status_filter(DocumentStatus::Actual))
        })
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(queries = queries.len(), ?mode, "processed query batch");
    Ok(results)
}

/// Results of every query concatenated, query by query.
pub fn run_queries_joined<Q>(index: &SearchIndex, queries: &[Q]) -> Result<Vec<RankedResult>>
where
    Q: AsRef<str> + Sync,
{
    Ok(run_queries(index, queries)?.into_iter().flatten().collect())
}
