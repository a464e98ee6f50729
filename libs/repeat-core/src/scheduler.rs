//! Review interval scheduling.
//!
//! A correct answer pushes the word's reset time out along a fixed table
//! indexed by how many attempts the word has in total. An incorrect answer
//! always brings it back to one day.

use chrono::{DateTime, Duration, Utc};

/// Day offsets by attempt count (1-based), clamped to the last entry.
pub const INTERVAL_DAYS: [i64; 9] = [1, 3, 7, 14, 30, 60, 90, 180, 365];

/// Offset applied after an incorrect answer.
pub const RELEARN_DAYS: i64 = 1;

/// Day offset for a word with `attempts` recorded attempts (including the
/// one just graded).
pub fn interval_days(attempts: usize) -> i64 {
    let index = attempts.saturating_sub(1).min(INTERVAL_DAYS.len() - 1);
    INTERVAL_DAYS[index]
}

/// New reset time after grading.
pub fn next_reset_time(correct: bool, attempts: usize, now: DateTime<Utc>) -> DateTime<Utc> {
    let days = if correct {
        interval_days(attempts)
    } else {
        RELEARN_DAYS
    };
    now + Duration::days(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_correct_answer_is_one_day() {
        let now = Utc::now();
        assert_eq!(next_reset_time(true, 1, now), now + Duration::days(1));
    }

    #[test]
    fn ninth_attempt_reaches_a_year() {
        let now = Utc::now();
        assert_eq!(next_reset_time(true, 9, now), now + Duration::days(365));
    }

    #[test]
    fn long_history_is_clamped() {
        let now = Utc::now();
        assert_eq!(next_reset_time(true, 21, now), now + Duration::days(365));
        assert_eq!(interval_days(1000), 365);
    }

    #[test]
    fn table_is_followed_in_order() {
        let days: Vec<i64> = (1..=9).map(interval_days).collect();
        assert_eq!(days, INTERVAL_DAYS.to_vec());
    }

    #[test]
    fn incorrect_always_resets_to_one_day() {
        let now = Utc::now();
        for attempts in [1, 5, 9, 30] {
            assert_eq!(next_reset_time(false, attempts, now), now + Duration::days(1));
        }
    }

    #[test]
    fn zero_attempts_uses_first_entry() {
        assert_eq!(interval_days(0), 1);
    }
}
