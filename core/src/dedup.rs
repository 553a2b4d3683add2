use crate::index::SearchIndex;
use crate::DocId;
use std::collections::BTreeSet;

/// Remove documents whose set of words equals that of a lower id.
///
/// Frequencies are ignored: only word identity is compared. The scan runs to
/// completion before anything is removed. Returns the removed ids, ascending.
pub fn find_and_remove_duplicates(index: &mut SearchIndex) -> Vec<DocId> {
    let duplicates: Vec<DocId> = {
        let mut seen: BTreeSet<Vec<&str>> = BTreeSet::new();
        index
            .document_ids()
            .filter(|&id| {
                let vocabulary = index.word_frequencies(id).keys().map(String::as_str).collect();
                !seen.insert(vocabulary)
            })
            .collect()
    };

    for &id in &duplicates {
        tracing::info!(id, "found duplicate document");
        index.remove_document(id);
    }
    duplicates
}
