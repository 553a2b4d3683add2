//! TF-IDF ranking and document matching over a [`SearchIndex`].

use crate::accumulator::ShardedAccumulator;
use crate::error::Result;
use crate::index::SearchIndex;
use crate::query::{ExecutionMode, Query};
use crate::{
    status_filter, DocId, DocumentStatus, RankedResult, Rating, DEFAULT_SHARD_COUNT,
    MAX_RESULT_DOCUMENT_COUNT, RELEVANCE_EPSILON,
};
use rayon::prelude::*;
use std::collections::BTreeMap;

impl SearchIndex {
    pub fn parse_query<'q>(&self, raw_query: &'q str) -> Result<Query<'q>> {
        Query::parse(raw_query, |word| self.is_stop_word(word))
    }

    /// Top documents with status `Actual`.
    pub fn find_top_documents(&self, raw_query: &str) -> Result<Vec<RankedResult>> {
        self.find_top_documents_by_status(raw_query, DocumentStatus::Actual)
    }

    pub fn find_top_documents_by_status(
        &self,
        raw_query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<RankedResult>> {
        self.find_top_documents_by(raw_query, status_filter(status))
    }

    pub fn find_top_documents_by<P>(&self, raw_query: &str, predicate: P) -> Result<Vec<RankedResult>>
    where
        P: Fn(DocId, DocumentStatus, Rating) -> bool + Sync,
    {
        self.find_top_documents_with(ExecutionMode::Sequential, raw_query, predicate)
    }

    /// Rank documents matching `raw_query` and accepted by `predicate`.
    ///
    /// Documents containing any minus-word are dropped whatever the
    /// predicate says. At most [`MAX_RESULT_DOCUMENT_COUNT`] results are
    /// returned, best first.
    pub fn find_top_documents_with<P>(
        &self,
        mode: ExecutionMode,
        raw_query: &str,
        predicate: P,
    ) -> Result<Vec<RankedResult>>
    where
        P: Fn(DocId, DocumentStatus, Rating) -> bool + Sync,
    {
        let query = self.parse_query(raw_query)?;
        let mut matched = self.find_all_documents(mode, &query, &predicate);
        let total_hits = matched.len();
        sort_by_rank(&mut matched);
        matched.truncate(MAX_RESULT_DOCUMENT_COUNT);
        tracing::debug!(?mode, total_hits, returned = matched.len(), "query evaluated");
        Ok(matched)
    }

    fn find_all_documents<P>(&self, mode: ExecutionMode, query: &Query<'_>, predicate: &P) -> Vec<RankedResult>
    where
        P: Fn(DocId, DocumentStatus, Rating) -> bool + Sync,
    {
        let mut document_to_relevance: BTreeMap<DocId, f64> = match mode {
            ExecutionMode::Sequential => {
                let mut relevance = BTreeMap::new();
                for word in &query.plus_words {
                    self.score_word(word, predicate, |id, delta| {
                        *relevance.entry(id).or_insert(0.0) += delta;
                    });
                }
                relevance
            }
            ExecutionMode::Parallel => {
                let relevance = ShardedAccumulator::new(DEFAULT_SHARD_COUNT);
                query.plus_words.par_iter().for_each(|word| {
                    self.score_word(word, predicate, |id, delta| relevance.accumulate(id, delta));
                });
                tracing::trace!(shards = relevance.shard_count(), words = query.plus_words.len(), "draining relevance shards");
                relevance.into_ordered_map()
            }
        };

        for word in &query.minus_words {
            if let Some(postings) = self.postings(word) {
                for id in postings.keys() {
                    document_to_relevance.remove(id);
                }
            }
        }

        document_to_relevance
            .into_iter()
            .filter_map(|(id, relevance)| {
                let data = self.document_data(id).ok()?;
                Some(RankedResult { id, relevance, rating: data.rating })
            })
            .collect()
    }

    /// Feed `tf * idf` of every accepted document under `word` to `add`.
    fn score_word<P, F>(&self, word: &str, predicate: &P, mut add: F)
    where
        P: Fn(DocId, DocumentStatus, Rating) -> bool,
        F: FnMut(DocId, f64),
    {
        let (Some(postings), Some(idf)) = (self.postings(word), self.inverse_document_freq(word)) else {
            return;
        };
        for (&id, &term_freq) in postings {
            let Ok(data) = self.document_data(id) else { continue };
            if predicate(id, data.status, data.rating) {
                add(id, term_freq * idf);
            }
        }
    }

    fn contains_word(&self, word: &str, id: DocId) -> bool {
        self.postings(word).is_some_and(|p| p.contains_key(&id))
    }

    /// Plus-words of `raw_query` found in document `id`, with its status.
    ///
    /// The word list is empty if any minus-word is found in the document.
    pub fn match_document<'q>(&self, raw_query: &'q str, id: DocId) -> Result<(Vec<&'q str>, DocumentStatus)> {
        self.match_document_with(ExecutionMode::Sequential, raw_query, id)
    }

    pub fn match_document_with<'q>(
        &self,
        mode: ExecutionMode,
        raw_query: &'q str,
        id: DocId,
    ) -> Result<(Vec<&'q str>, DocumentStatus)> {
        let query = self.parse_query(raw_query)?;
        let status = self.document_data(id)?.status;

        let excluded = match mode {
            ExecutionMode::Sequential => query.minus_words.iter().any(|w| self.contains_word(w, id)),
            ExecutionMode::Parallel => query.minus_words.par_iter().any(|w| self.contains_word(w, id)),
        };
        if excluded {
            return Ok((Vec::new(), status));
        }

        let matched = match mode {
            ExecutionMode::Sequential => {
                query.plus_words.iter().copied().filter(|w| self.contains_word(w, id)).collect()
            }
            ExecutionMode::Parallel => {
                query.plus_words.par_iter().copied().filter(|w| self.contains_word(w, id)).collect()
            }
        };
        Ok((matched, status))
    }
}

/// Order by relevance, best first. Runs of neighbours closer than
/// [`RELEVANCE_EPSILON`] are ordered by rating, best first, then by id.
/// Runs are chained neighbour to neighbour, so the ends of one run may be
/// more than [`RELEVANCE_EPSILON`] apart.
pub fn sort_by_rank(results: &mut [RankedResult]) {
    results.sort_by(|a, b| b.relevance.total_cmp(&a.relevance).then(a.id.cmp(&b.id)));
    for tied in results.chunk_by_mut(|a, b| (a.relevance - b.relevance).abs() < RELEVANCE_EPSILON) {
        tied.sort_by(|a, b| b.rating.cmp(&a.rating).then(a.id.cmp(&b.id)));
    }
}
