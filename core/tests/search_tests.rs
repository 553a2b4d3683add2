use search_core::{
    find_and_remove_duplicates, status_filter, DocumentStatus, ExecutionMode, IndexError, SearchIndex,
    MAX_RESULT_DOCUMENT_COUNT, RELEVANCE_EPSILON,
};

fn sample_index() -> SearchIndex {
    let mut idx = SearchIndex::new(Vec::<String>::new()).unwrap();
    idx.add_document(1, "big wild cat walk in the city", DocumentStatus::Actual, &[1, 2, 3]).unwrap();
    idx.add_document(2, "not all heroes wear capes in the city", DocumentStatus::Actual, &[4, 5]).unwrap();
    idx.add_document(3, "minus words not easy at all", DocumentStatus::Actual, &[7, 11, 4]).unwrap();
    idx
}

fn ids(results: &[search_core::RankedResult]) -> Vec<i32> {
    results.iter().map(|r| r.id).collect()
}

#[test]
fn city_query_ranks_shorter_document_first() {
    let idx = sample_index();
    let results = idx.find_top_documents("city").unwrap();
    assert_eq!(ids(&results), vec![1, 2]);
    let idf = (3.0f64 / 2.0).ln();
    assert!((results[0].relevance - idf / 7.0).abs() < RELEVANCE_EPSILON);
    assert!((results[1].relevance - idf / 8.0).abs() < RELEVANCE_EPSILON);
}

#[test]
fn unknown_word_finds_nothing() {
    assert!(sample_index().find_top_documents("bell").unwrap().is_empty());
}

#[test]
fn minus_word_excludes_matching_documents() {
    let idx = sample_index();
    assert_eq!(ids(&idx.find_top_documents("city words -big").unwrap()), vec![3, 2]);
    let only_city = idx.find_top_documents("city -big").unwrap();
    assert_eq!(ids(&only_city), vec![2]);
}

#[test]
fn word_in_both_sets_excludes_its_documents() {
    let idx = sample_index();
    assert!(idx.find_top_documents("city -city").unwrap().is_empty());
    assert_eq!(ids(&idx.find_top_documents("cat easy -cat").unwrap()), vec![3]);
}

#[test]
fn stored_rating_is_truncated_mean() {
    let idx = sample_index();
    let results = idx.find_top_documents("easy").unwrap();
    assert_eq!(results[0].rating, 7);
}

#[test]
fn status_and_predicate_filters() {
    let mut idx = sample_index();
    idx.add_document(4, "city of dogs", DocumentStatus::Banned, &[9]).unwrap();
    assert_eq!(ids(&idx.find_top_documents_by_status("city", DocumentStatus::Banned).unwrap()), vec![4]);
    let even = idx.find_top_documents_by("city", |id, _, _| id % 2 == 0).unwrap();
    assert_eq!(ids(&even), vec![4, 2]);
    let rated = idx.find_top_documents_by("city", |_, _, rating| rating > 3).unwrap();
    assert_eq!(ids(&rated), vec![4, 2]);
}

#[test]
fn results_are_capped_and_tied_by_rating() {
    let mut idx = SearchIndex::default();
    for id in 0..8 {
        idx.add_document(id, "same words here", DocumentStatus::Actual, &[id]).unwrap();
    }
    idx.add_document(8, "other text", DocumentStatus::Actual, &[]).unwrap();
    let results = idx.find_top_documents("words").unwrap();
    assert_eq!(results.len(), MAX_RESULT_DOCUMENT_COUNT);
    assert_eq!(ids(&results), vec![7, 6, 5, 4, 3]);
}

#[test]
fn results_sorted_by_relevance_then_rating() {
    let mut idx = SearchIndex::default();
    idx.add_document(1, "a b c d", DocumentStatus::Actual, &[1]).unwrap();
    idx.add_document(2, "a b", DocumentStatus::Actual, &[2]).unwrap();
    idx.add_document(3, "a x", DocumentStatus::Actual, &[5]).unwrap();
    idx.add_document(4, "y z", DocumentStatus::Actual, &[0]).unwrap();
    let results = idx.find_top_documents("a b").unwrap();
    for pair in results.windows(2) {
        let diff = pair[0].relevance - pair[1].relevance;
        assert!(diff > -RELEVANCE_EPSILON);
        if diff.abs() < RELEVANCE_EPSILON {
            assert!(pair[0].rating >= pair[1].rating);
        }
    }
    assert_eq!(results[0].id, 2);
}

#[test]
fn parallel_mode_matches_sequential() {
    let idx = sample_index();
    for query in ["city", "city words -big", "not all easy wild cat", "bell", "in the city -heroes"] {
        let seq = idx
            .find_top_documents_with(ExecutionMode::Sequential, query, status_filter(DocumentStatus::Actual))
            .unwrap();
        let par = idx
            .find_top_documents_with(ExecutionMode::Parallel, query, status_filter(DocumentStatus::Actual))
            .unwrap();
        assert_eq!(ids(&seq), ids(&par), "query {query:?}");
        for (s, p) in seq.iter().zip(&par) {
            assert!((s.relevance - p.relevance).abs() < RELEVANCE_EPSILON);
            assert_eq!(s.rating, p.rating);
        }
    }
}

#[test]
fn invalid_queries_rejected() {
    let idx = sample_index();
    assert_eq!(idx.find_top_documents("city --big"), Err(IndexError::InvalidNegation("--big".into())));
    assert_eq!(idx.find_top_documents("city -"), Err(IndexError::InvalidNegation("-".into())));
    assert!(matches!(idx.find_top_documents("ci\u{10}ty"), Err(IndexError::InvalidToken(_))));
}

#[test]
fn match_document_reports_words_and_status() {
    let mut idx = sample_index();
    idx.add_document(5, "cat in the box", DocumentStatus::Irrelevant, &[]).unwrap();
    for mode in [ExecutionMode::Sequential, ExecutionMode::Parallel] {
        let (words, status) = idx.match_document_with(mode, "the cat city cat", 1).unwrap();
        assert_eq!(words, vec!["cat", "city", "the"]);
        assert_eq!(status, DocumentStatus::Actual);

        let (words, status) = idx.match_document_with(mode, "cat box -in", 5).unwrap();
        assert!(words.is_empty());
        assert_eq!(status, DocumentStatus::Irrelevant);
    }
    assert_eq!(idx.match_document("cat", 42), Err(IndexError::UnknownDocument(42)));
}

#[test]
fn duplicate_add_keeps_original() {
    let mut idx = sample_index();
    let before = idx.word_frequencies(1).clone();
    assert_eq!(
        idx.add_document(1, "brand new text", DocumentStatus::Banned, &[100]),
        Err(IndexError::DuplicateId(1))
    );
    assert_eq!(idx.word_frequencies(1), &before);
    assert_eq!(idx.document_data(1).unwrap().status, DocumentStatus::Actual);
}

#[test]
fn removed_document_disappears() {
    let mut idx = sample_index();
    idx.remove_document(1);
    assert!(idx.word_frequencies(1).is_empty());
    assert_eq!(idx.document_ids().collect::<Vec<_>>(), vec![2, 3]);
    assert_eq!(idx.document_count(), 2);
    assert_eq!(ids(&idx.find_top_documents("city").unwrap()), vec![2]);
    assert!(idx.find_top_documents("wild").unwrap().is_empty());
    idx.remove_document(99);
    assert_eq!(idx.document_count(), 2);
}

#[test]
fn readded_document_uses_new_content() {
    let mut idx = sample_index();
    idx.remove_document(2);
    idx.add_document(2, "fresh fresh paint", DocumentStatus::Actual, &[]).unwrap();
    let freqs = idx.word_frequencies(2);
    assert_eq!(freqs.keys().map(String::as_str).collect::<Vec<_>>(), vec!["fresh", "paint"]);
    assert!((freqs["fresh"] - 2.0 / 3.0).abs() < 1e-12);
    assert_eq!(ids(&idx.find_top_documents("city").unwrap()), vec![1]);
}

#[test]
fn stop_words_never_indexed_or_matched() {
    let mut idx = SearchIndex::from_stop_words_text("in the").unwrap();
    idx.add_document(1, "cat in the city", DocumentStatus::Actual, &[]).unwrap();
    assert!(!idx.word_frequencies(1).contains_key("in"));
    assert!(idx.find_top_documents("in").unwrap().is_empty());
    assert_eq!(ids(&idx.find_top_documents("cat -the").unwrap()), vec![1]);
}

#[test]
fn duplicates_removed_by_vocabulary() {
    let mut idx = SearchIndex::from_stop_words_text("and with").unwrap();
    idx.add_document(1, "funny pet and nasty rat", DocumentStatus::Actual, &[7, 2, 7]).unwrap();
    idx.add_document(2, "funny pet with curly hair", DocumentStatus::Actual, &[1, 2]).unwrap();
    idx.add_document(3, "funny pet with curly hair", DocumentStatus::Actual, &[1, 2]).unwrap();
    idx.add_document(4, "funny pet and curly hair", DocumentStatus::Actual, &[1, 2]).unwrap();
    idx.add_document(5, "funny funny pet and nasty nasty rat", DocumentStatus::Actual, &[1, 2]).unwrap();
    idx.add_document(6, "funny pet and not very nasty rat", DocumentStatus::Actual, &[1, 2]).unwrap();
    idx.add_document(7, "very nasty rat and not very funny pet", DocumentStatus::Actual, &[1, 2]).unwrap();
    idx.add_document(8, "pet with rat and rat and rat", DocumentStatus::Actual, &[1, 2]).unwrap();
    idx.add_document(9, "nasty rat with curly hair", DocumentStatus::Actual, &[1, 2]).unwrap();

    let removed = find_and_remove_duplicates(&mut idx);
    assert_eq!(removed, vec![3, 4, 5, 7]);
    assert_eq!(idx.document_count(), 5);
    assert_eq!(idx.document_ids().collect::<Vec<_>>(), vec![1, 2, 6, 8, 9]);
}

#[test]
fn parallel_removal_matches_sequential() {
    let mut seq = sample_index();
    let mut par = sample_index();
    seq.remove_document_with(ExecutionMode::Sequential, 1);
    par.remove_document_with(ExecutionMode::Parallel, 1);
    assert_eq!(seq.document_ids().collect::<Vec<_>>(), par.document_ids().collect::<Vec<_>>());
    assert!(par.word_frequencies(1).is_empty());
    assert!(par.match_document("city", 1).is_err());
    for query in ["city", "wild cat", "not all easy"] {
        assert_eq!(seq.find_top_documents(query).unwrap(), par.find_top_documents(query).unwrap());
    }
    assert!(par.find_top_documents("wild").unwrap().is_empty());
}
