use crate::error::Result;
use crate::tokenizer::{classify, split};
use std::collections::BTreeSet;

/// How an index scan is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    #[default]
    Sequential,
    /// Fan plus-words out over the rayon pool.
    Parallel,
}

/// A parsed query. Words borrow from the raw query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query<'a> {
    pub plus_words: BTreeSet<&'a str>,
    pub minus_words: BTreeSet<&'a str>,
}

impl<'a> Query<'a> {
    /// Parse `text`, dropping words for which `is_stop_word` holds.
    ///
    /// A word may land in both sets ("cat -cat"); the sets are not
    /// reconciled against each other.
    pub fn parse<F>(text: &'a str, is_stop_word: F) -> Result<Self>
    where
        F: Fn(&str) -> bool,
    {
        let mut query = Query::default();
        for raw in split(text) {
            let (word, is_minus) = classify(raw)?;
            if is_stop_word(word) {
                continue;
            }
            if is_minus {
                query.minus_words.insert(word);
            } else {
                query.plus_words.insert(word);
            }
        }
        Ok(query)
    }
}
