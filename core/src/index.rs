//! In-memory inverted index.
//!
//! Four structures are kept in step: the live id set, per-document word
//! frequencies, per-word postings and per-document metadata. `add_document`
//! and `remove_document_with` are the only writers and either update all four or
//! none.

use crate::error::{IndexError, Result};
use crate::query::ExecutionMode;
use crate::tokenizer::{split, unique_non_empty, validate_symbols};
use crate::{DocId, DocumentData, DocumentStatus, Rating};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

pub type WordFrequencies = BTreeMap<String, f64>;

static EMPTY_FREQUENCIES: WordFrequencies = BTreeMap::new();

#[derive(Debug, Default)]
pub struct SearchIndex {
    stop_words: BTreeSet<String>,
    word_to_document_freqs: BTreeMap<String, BTreeMap<DocId, f64>>,
    document_to_word_freqs: BTreeMap<DocId, WordFrequencies>,
    documents: BTreeMap<DocId, DocumentData>,
    document_ids: BTreeSet<DocId>,
}

impl SearchIndex {
    /// Build an index with the given stop words. Empty words are ignored;
    /// a word with a control character is rejected.
    pub fn new<I, S>(stop_words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self { stop_words: unique_non_empty(stop_words)?, ..Self::default() })
    }

    /// Build an index from a space-separated list of stop words.
    pub fn from_stop_words_text(text: &str) -> Result<Self> {
        Self::new(split(text))
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    fn split_into_words_no_stop<'t>(&self, text: &'t str) -> Result<Vec<&'t str>> {
        let mut words = Vec::new();
        for word in split(text) {
            validate_symbols(word)?;
            if !self.is_stop_word(word) {
                words.push(word);
            }
        }
        Ok(words)
    }

    pub fn add_document(
        &mut self,
        id: DocId,
        text: &str,
        status: DocumentStatus,
        ratings: &[Rating],
    ) -> Result<()> {
        if self.documents.contains_key(&id) {
            return Err(IndexError::DuplicateId(id));
        }
        if id < 0 {
            return Err(IndexError::NegativeId(id));
        }

        // Nothing below may fail: the index is only touched once every word is valid.
        let words = self.split_into_words_no_stop(text)?;
        let mut word_freqs = WordFrequencies::new();
        if !words.is_empty() {
            let inv_word_count = 1.0 / words.len() as f64;
            for word in &words {
                *word_freqs.entry((*word).to_string()).or_insert(0.0) += inv_word_count;
            }
        }

        for (word, freq) in &word_freqs {
            self.word_to_document_freqs.entry(word.clone()).or_default().insert(id, *freq);
        }
        tracing::debug!(id, words = words.len(), distinct = word_freqs.len(), "added document");
        self.document_to_word_freqs.insert(id, word_freqs);
        self.documents.insert(id, DocumentData { rating: compute_average_rating(ratings), status });
        self.document_ids.insert(id);
        Ok(())
    }

    /// Remove a document from every structure. Unknown ids are ignored.
    pub fn remove_document(&mut self, id: DocId) {
        self.remove_document_with(ExecutionMode::Sequential, id);
    }

    /// Like [`remove_document`](Self::remove_document), pruning the
    /// document's postings in `mode`. Words left without postings are
    /// dropped in both modes.
    pub fn remove_document_with(&mut self, mode: ExecutionMode, id: DocId) {
        let Some(word_freqs) = self.document_to_word_freqs.remove(&id) else {
            return;
        };
        match mode {
            ExecutionMode::Sequential => {
                for word in word_freqs.keys() {
                    if let Some(postings) = self.word_to_document_freqs.get_mut(word) {
                        postings.remove(&id);
                        if postings.is_empty() {
                            self.word_to_document_freqs.remove(word);
                        }
                    }
                }
            }
            ExecutionMode::Parallel => {
                // detach the affected postings so workers own them exclusively
                let affected: Vec<(String, BTreeMap<DocId, f64>)> = word_freqs
                    .into_keys()
                    .filter_map(|word| self.word_to_document_freqs.remove_entry(&word))
                    .collect();
                let kept: Vec<_> = affected
                    .into_par_iter()
                    .filter_map(|(word, mut postings)| {
                        postings.remove(&id);
                        (!postings.is_empty()).then_some((word, postings))
                    })
                    .collect();
                self.word_to_document_freqs.extend(kept);
            }
        }
        self.documents.remove(&id);
        self.document_ids.remove(&id);
        tracing::debug!(id, ?mode, "removed document");
    }

    /// Word frequencies of a document; empty for unknown ids.
    pub fn word_frequencies(&self, id: DocId) -> &WordFrequencies {
        self.document_to_word_freqs.get(&id).unwrap_or(&EMPTY_FREQUENCIES)
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Live document ids in ascending order.
    pub fn document_ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.document_ids.iter().copied()
    }

    pub fn document_data(&self, id: DocId) -> Result<DocumentData> {
        self.documents.get(&id).copied().ok_or(IndexError::UnknownDocument(id))
    }

    pub(crate) fn postings(&self, word: &str) -> Option<&BTreeMap<DocId, f64>> {
        self.word_to_document_freqs.get(word)
    }

    /// `ln(N / df)`; `None` for words not in the index.
    pub(crate) fn inverse_document_freq(&self, word: &str) -> Option<f64> {
        self.postings(word).map(|p| (self.document_count() as f64 / p.len() as f64).ln())
    }
}

impl<'a> IntoIterator for &'a SearchIndex {
    type Item = &'a DocId;
    type IntoIter = std::collections::btree_set::Iter<'a, DocId>;

    fn into_iter(self) -> Self::IntoIter {
        self.document_ids.iter()
    }
}

/// Truncating integer mean; zero for no ratings.
pub fn compute_average_rating(ratings: &[Rating]) -> Rating {
    if ratings.is_empty() {
        return 0;
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    (sum / ratings.len() as i64) as Rating
}
