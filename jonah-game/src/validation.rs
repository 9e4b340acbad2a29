//! Answer matching for verse, keyword and numeric questions.
//!
//! Matching is case and whitespace-insensitive so that "마태복음 18장 14절" and
//! "마태복음18장14절" are the same citation. The numeric check only trims.

use serde::{Deserialize, Serialize};

/// Strip every whitespace character and lowercase the remainder.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<String>().to_lowercase()
}

/// True when `text` matches any accepted surface form of a citation.
#[must_use]
pub fn validate_verse_answer<S: AsRef<str>>(text: &str, accepted_variants: &[S]) -> bool {
    let normalized = normalize(text);
    accepted_variants
        .iter()
        .any(|variant| normalize(variant.as_ref()) == normalized)
}

#[must_use]
pub fn validate_keyword(text: &str, expected_keyword: &str) -> bool {
    normalize(text) == normalize(expected_keyword)
}

/// Trim-only comparison used by the arithmetic puzzle.
#[must_use]
pub fn validate_exact_numeric(text: &str, expected: &str) -> bool {
    text.trim() == expected
}

/// How a question decides whether an answer is correct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerCheck {
    Verse { accepted: Vec<String> },
    Keyword { expected: String },
    Exact { expected: String },
}

impl AnswerCheck {
    #[must_use]
    pub fn accepts(&self, text: &str) -> bool {
        match self {
            Self::Verse { accepted } => validate_verse_answer(text, accepted),
            Self::Keyword { expected } => validate_keyword(text, expected),
            Self::Exact { expected } => validate_exact_numeric(text, expected),
        }
    }

    /// First accepted form; used by scripted playthroughs.
    #[must_use]
    pub fn canonical(&self) -> Option<&str> {
        match self {
            Self::Verse { accepted } => accepted.first().map(String::as_str),
            Self::Keyword { expected } | Self::Exact { expected } => {
                (!expected.is_empty()).then_some(expected.as_str())
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Verse { accepted } => accepted.is_empty(),
            Self::Keyword { expected } | Self::Exact { expected } => expected.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAPTER1: [&str; 3] = ["마태복음18장14절", "마18:14", "마태복음18:14"];

    #[test]
    fn normalize_strips_whitespace_and_case() {
        assert_eq!(normalize("  Jonah 1:3 \t\n"), "jonah1:3");
        assert_eq!(normalize("마태복음 18장 14절"), "마태복음18장14절");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        for sample in ["  A b C ", "요나 1 : 3", "ΑΣ Σ", "İstanbul", "\u{3000}full width\u{3000}"] {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "sample {sample:?}");
        }
    }

    #[test]
    fn every_accepted_variant_matches_itself() {
        for variant in CHAPTER1 {
            assert!(validate_verse_answer(variant, &CHAPTER1));
        }
    }

    #[test]
    fn verse_answers_ignore_spacing_and_case() {
        assert!(validate_verse_answer(" 마 18 : 14 ", &CHAPTER1));
        assert!(validate_verse_answer("마태복음 18장 14절", &CHAPTER1));
        assert!(validate_verse_answer("JONAH 1:3", &["jonah1:3"]));
        assert!(!validate_verse_answer("마18:15", &CHAPTER1));
        assert!(!validate_verse_answer("", &CHAPTER1));
        assert!(!validate_verse_answer("마18:14", &[] as &[&str]));
    }

    #[test]
    fn keywords_compare_normalized_forms() {
        assert!(validate_keyword("폭풍 속 요나", "폭풍속요나"));
        assert!(validate_keyword("Storm", " storm "));
        assert!(!validate_keyword("니느웨", "니느웨구원"));
    }

    #[test]
    fn exact_numeric_only_trims() {
        assert!(validate_exact_numeric("  237 ", "237"));
        assert!(!validate_exact_numeric("238", "237"));
        assert!(!validate_exact_numeric("2 37", "237"));
    }

    #[test]
    fn answer_check_dispatches_by_kind() {
        let verse: AnswerCheck =
            serde_json::from_str(r#"{"kind":"verse","accepted":["요나1:3","욘1:3"]}"#).unwrap();
        assert!(verse.accepts("욘 1:3"));
        let keyword = AnswerCheck::Keyword {
            expected: "니느웨구원".into(),
        };
        assert!(keyword.accepts("니느웨 구원"));
        let exact = AnswerCheck::Exact {
            expected: "237".into(),
        };
        assert!(exact.accepts("237\n"));
        assert!(!exact.accepts("0237"));
        assert!(!exact.is_empty());
        assert!(AnswerCheck::Verse { accepted: vec![] }.is_empty());
    }
}
