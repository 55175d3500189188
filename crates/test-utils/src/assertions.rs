// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Assertions over ranked completion texts

/// Assert that `first` appears in `texts` and ranks above `second`
///
/// `second` may be missing entirely.
pub fn assert_ranked_before<S: AsRef<str>>(texts: &[S], first: &str, second: &str) {
    let position = |wanted: &str| texts.iter().position(|t| t.as_ref() == wanted);
    let Some(first_pos) = position(first) else {
        panic!("Expected '{first}' in {:?}", as_strs(texts));
    };
    if let Some(second_pos) = position(second) {
        assert!(
            first_pos < second_pos,
            "Expected '{first}' (#{first_pos}) before '{second}' (#{second_pos}) in {:?}",
            as_strs(texts)
        );
    }
}

/// Assert that every text in `expected` is present
pub fn assert_contains_all<S: AsRef<str>>(texts: &[S], expected: &[&str]) {
    for wanted in expected {
        assert!(
            texts.iter().any(|t| t.as_ref() == *wanted),
            "Expected '{wanted}' in {:?}",
            as_strs(texts)
        );
    }
}

/// Assert that no text in `unexpected` is present
pub fn assert_excludes<S: AsRef<str>>(texts: &[S], unexpected: &[&str]) {
    for unwanted in unexpected {
        assert!(
            !texts.iter().any(|t| t.as_ref() == *unwanted),
            "Did not expect '{unwanted}' in {:?}",
            as_strs(texts)
        );
    }
}

fn as_strs<S: AsRef<str>>(texts: &[S]) -> Vec<&str> {
    texts.iter().map(AsRef::as_ref).collect()
}
