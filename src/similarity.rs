//! Scoring a generated answer against the visible text of select options.

/// Score returned when one string contains the other.
pub const SUBSTRING_SCORE: f64 = 0.8;

/// Words this short never count as a match.
const MIN_WORD_LEN: usize = 3;

/// Words longer than this may match by containment.
const CONTAINMENT_WORD_LEN: usize = 4;

/// How closely `value` matches the option label `option`, in `0.0..=1.0`.
///
/// Case-insensitive. Containment either way scores [`SUBSTRING_SCORE`].
/// Otherwise each word of `value` (3+ chars) that matches some word of
/// `option` (3+ chars) counts once; a match is equality, or containment when
/// the contained word is longer than 4 chars. The count is divided by the
/// larger of the two word counts, short words included.
pub fn similarity(value: &str, option: &str) -> f64 {
    let value = value.to_lowercase();
    let option = option.to_lowercase();

    if value.contains(&option) || option.contains(&value) {
        return SUBSTRING_SCORE;
    }

    let value_words: Vec<&str> = value.split_whitespace().collect();
    let option_words: Vec<&str> = option.split_whitespace().collect();

    let matches = value_words
        .iter()
        .filter(|w| w.chars().count() >= MIN_WORD_LEN)
        .filter(|w| {
            option_words
                .iter()
                .filter(|o| o.chars().count() >= MIN_WORD_LEN)
                .any(|o| words_match(w, o))
        })
        .count();

    let longest = value_words.len().max(option_words.len());
    if longest == 0 {
        return 0.0;
    }
    matches as f64 / longest as f64
}

fn words_match(a: &str, b: &str) -> bool {
    a == b
        || (a.chars().count() > CONTAINMENT_WORD_LEN && b.contains(a))
        || (b.chars().count() > CONTAINMENT_WORD_LEN && a.contains(b))
}

/// Index of the best scoring option, if any scores above zero.
/// Ties go to the earliest option.
pub fn best_match<S: AsRef<str>>(value: &str, options: &[S]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, option) in options.iter().enumerate() {
        let score = similarity(value, option.as_ref());
        if score > best.map_or(0.0, |(_, s)| s) {
            best = Some((i, score));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_scores_fixed_value() {
        assert_eq!(similarity("Software Engineer", "Engineer"), 0.8);
        assert_eq!(similarity("eng", "Engineering Manager"), 0.8);
        assert_eq!(similarity("MANAGER", "manager"), 0.8);
    }

    #[test]
    fn word_overlap_divides_by_longest_word_count() {
        // "hiking" is contained in "hiking,", "climbing" matches exactly;
        // five words on the left.
        let score = similarity("I like hiking and climbing", "Outdoor activities: hiking, climbing");
        assert!((score - 0.4).abs() < 1e-9, "score was {score}");
    }

    #[test]
    fn short_words_never_match_but_still_count() {
        // "of" and "to" are ignored for matching; the only shared word is "team".
        let score = similarity("head of team", "team to lead");
        assert!((score - 1.0 / 3.0).abs() < 1e-9, "score was {score}");
    }

    #[test]
    fn containment_needs_long_inner_word() {
        // "art" is too short to match "artist" by containment.
        assert_eq!(similarity("art lover", "working artist"), 0.0);
        assert!(similarity("painting lover", "paintings gallery") > 0.0);
    }

    #[test]
    fn unrelated_strings_score_zero() {
        assert_eq!(similarity("Investor", "Student"), 0.0);
    }

    #[test]
    fn best_match_prefers_highest_then_earliest() {
        let options = ["Engineer", "Manager", "Other"];
        assert_eq!(best_match("Software Engineer", &options), Some((0, 0.8)));
        assert_eq!(best_match("Founder", &options), None);

        let tied = ["Product Design", "Design Product"];
        assert_eq!(best_match("design", &tied).map(|(i, _)| i), Some(0));
    }
}
