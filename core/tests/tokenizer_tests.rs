use topone_core::tokenizer::{stem, tokenize, tokenize_stemmed};

#[test]
fn it_normalizes_and_stems() {
    let toks = tokenize_stemmed("Running Runners RUN! The ﬁsh's menu.");
    let words: Vec<String> = toks.into_iter().map(|(w, _)| w).collect();
    // Stemming to "run" should appear
    assert!(words.contains(&"run".to_string()));
    // NFKC folds the "ﬁ" ligature
    assert!(words.contains(&"fish".to_string()));
}

#[test]
fn it_filters_stopwords_only_when_stemming() {
    let stemmed: Vec<String> = tokenize_stemmed("The quick brown fox and the lazy dog").into_iter().map(|(w, _)| w).collect();
    assert!(!stemmed.contains(&"the".to_string()));
    assert!(!stemmed.contains(&"and".to_string()));

    let plain: Vec<String> = tokenize("The quick brown fox and the lazy dog").into_iter().map(|(w, _)| w).collect();
    assert_eq!(plain.len(), 8);
    assert_eq!(plain[0], "the");
}

#[test]
fn digits_are_tokens() {
    let words: Vec<String> = tokenize("Apollo 11 landed in 1969").into_iter().map(|(w, _)| w).collect();
    assert_eq!(words, vec!["apollo", "11", "landed", "in", "1969"]);
}

#[test]
fn stemming_already_stemmed_text_is_a_no_op() {
    let text = "organizations generously computing relational";
    let once: Vec<String> = tokenize_stemmed(text).into_iter().map(|(w, _)| w).collect();
    let twice: Vec<String> = once.iter().map(|w| stem(w)).collect();
    assert_eq!(once, twice);
}
