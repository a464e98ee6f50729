//! Answer checking for repeat sessions.

use std::collections::HashMap;

use crate::types::{AnswerDetail, Word};

/// Result of grading the answers submitted for one word.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Whether every answer fragment was given correctly.
    pub is_correct: bool,
    /// Per-position detail, ordered by position.
    pub details: Vec<AnswerDetail>,
}

/// Grade submitted answers against the word's answer fragments.
///
/// Answers are keyed by the fragment position rendered as a string. The word
/// is correct only if exactly the required positions were submitted and each
/// one matches after trimming, ignoring case.
pub fn check_answers(word: &Word, submitted: &HashMap<String, String>) -> CheckResult {
    let mut expected: Vec<_> = word.parts.iter().filter(|p| p.answer).collect();
    expected.sort_by_key(|p| p.position);

    let details: Vec<AnswerDetail> = expected
        .iter()
        .map(|part| {
            let position = part.position.to_string();
            let given = submitted.get(&position).cloned();
            let correct = given
                .as_deref()
                .map(|g| answers_match(g, &part.word))
                .unwrap_or(false);
            AnswerDetail {
                position,
                submitted: given,
                expected: part.word.clone(),
                correct,
            }
        })
        .collect();

    let is_correct = submitted.len() == expected.len() && details.iter().all(|d| d.correct);

    CheckResult { is_correct, details }
}

/// Compare one submitted fragment to the correct text.
pub fn answers_match(submitted: &str, correct: &str) -> bool {
    normalize(submitted) == normalize(correct)
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WordPart;
    use chrono::Utc;

    fn word(parts: Vec<WordPart>) -> Word {
        Word {
            id: 7,
            accepted: true,
            chosen: false,
            reset_time: Utc::now(),
            comment: None,
            mechanism: None,
            parts,
            stats: vec![],
            categories: vec![],
        }
    }

    fn answers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_whitespace_and_case_are_ignored() {
        let w = word(vec![WordPart::prompt(0, "hello"), WordPart::answer(1, "hola")]);
        let result = check_answers(&w, &answers(&[("1", " Hola ")]));
        assert!(result.is_correct);
        assert_eq!(result.details.len(), 1);
        assert!(result.details[0].correct);
    }

    #[test]
    fn test_unicode_case_folding() {
        assert!(answers_match("ÉCOLE", "école"));
    }

    #[test]
    fn test_inner_whitespace_is_significant() {
        assert!(!answers_match("buenos  dias", "buenos dias"));
    }

    #[test]
    fn test_wrong_fragment_fails_whole_word() {
        let w = word(vec![
            WordPart::prompt(0, "the house"),
            WordPart::answer(1, "la"),
            WordPart::answer(2, "casa"),
        ]);
        let result = check_answers(&w, &answers(&[("1", "la"), ("2", "cosa")]));
        assert!(!result.is_correct);
        assert!(result.details[0].correct);
        assert!(!result.details[1].correct);
    }

    #[test]
    fn test_size_mismatch_is_incorrect() {
        let w = word(vec![WordPart::prompt(0, "dog"), WordPart::answer(1, "perro")]);
        let result = check_answers(&w, &answers(&[("1", "perro"), ("5", "extra")]));
        assert!(!result.is_correct);

        let result = check_answers(&w, &HashMap::new());
        assert!(!result.is_correct);
        assert_eq!(result.details[0].submitted, None);
    }

    #[test]
    fn test_missing_position_is_incorrect() {
        let w = word(vec![WordPart::prompt(0, "cat"), WordPart::answer(1, "gato")]);
        let result = check_answers(&w, &answers(&[("2", "gato")]));
        assert!(!result.is_correct);
    }

    #[test]
    fn test_details_follow_position_order() {
        let w = word(vec![
            WordPart::answer(4, "b"),
            WordPart::prompt(0, "p"),
            WordPart::answer(2, "a"),
        ]);
        let result = check_answers(&w, &answers(&[("2", "a"), ("4", "b")]));
        let positions: Vec<_> = result.details.iter().map(|d| d.position.as_str()).collect();
        assert_eq!(positions, vec!["2", "4"]);
        assert!(result.is_correct);
    }
}
