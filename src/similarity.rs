//! Classic 0-100 string similarity scores.
//!
//! - [`ratio`]: normalized indel similarity, `2 * LCS / (len_a + len_b)`.
//! - [`partial_ratio`]: best [`ratio`] of the shorter string against every
//!   equally long window of the longer one. This is the exhaustive window
//!   search, not the matching-block anchored variant, so it can score higher
//!   when the best window would run past the end of the longer string.
//! - [`token_sort_ratio`]: [`ratio`] after [`full_process`] and sorting the
//!   whitespace tokens of both strings.
//!
//! Scores are computed over characters and rounded half-to-even. Two equal
//! strings always score 100; otherwise an empty side scores 0.

use itertools::Itertools;

pub fn ratio(a: &str, b: &str) -> u8 {
    if a == b {
        return 100;
    }
    let a = a.chars().collect::<Vec<_>>();
    let b = b.chars().collect::<Vec<_>>();
    char_ratio(&a, &b)
}

pub fn partial_ratio(a: &str, b: &str) -> u8 {
    if a == b {
        return 100;
    }
    let a = a.chars().collect::<Vec<_>>();
    let b = b.chars().collect::<Vec<_>>();
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let (shorter, longer) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    let mut best = 0u8;
    for window in longer.windows(shorter.len()) {
        let score = char_ratio(shorter, window);
        if score == 100 {
            return 100;
        }
        best = best.max(score);
    }
    best
}

pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Removes the Latin-1 supplement (U+0080..=U+00FF), turns everything that
/// is not a letter, digit or `_` into a space, lowercases and trims. Letters
/// of other scripts are kept.
pub fn full_process(value: &str) -> String {
    let processed = value
        .chars()
        .filter(|ch| !('\u{80}'..='\u{ff}').contains(ch))
        .map(|ch| {
            if ch.is_alphanumeric() || ch == '_' {
                ch
            } else {
                ' '
            }
        })
        .flat_map(char::to_lowercase)
        .collect::<String>();
    processed.trim().to_string()
}

fn sorted_tokens(value: &str) -> String {
    full_process(value).split_whitespace().sorted().join(" ")
}

fn char_ratio(a: &[char], b: &[char]) -> u8 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100;
    }
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let matches = lcs_len(a, b);
    let score = (200 * matches) as f64 / total as f64;
    score.round_ties_even() as u8
}

/// Longest common subsequence length, two-row dynamic programming.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];
    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb {
                previous[j] + 1
            } else {
                current[j].max(previous[j + 1])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_matches_reference_vectors() {
        assert_eq!(ratio("this is a test", "this is a test!"), 97);
        assert_eq!(ratio("fuzzy wuzzy was a bear", "wuzzy fuzzy was a bear"), 91);
        assert_eq!(ratio("", ""), 100);
        assert_eq!(ratio("", "main"), 0);
        assert_eq!(ratio("abc", "xyz"), 0);
    }

    #[test]
    fn partial_ratio_finds_embedded_string() {
        assert_eq!(partial_ratio("this is a test", "this is a test!"), 100);
        assert_eq!(partial_ratio("oak ave", "456 oak ave, springfield"), 100);
        assert_eq!(partial_ratio("", "oak"), 0);
    }

    #[test]
    fn token_sort_ratio_ignores_word_order_and_punctuation() {
        assert_eq!(
            token_sort_ratio("fuzzy wuzzy was a bear", "wuzzy fuzzy was a bear"),
            100
        );
        assert_eq!(token_sort_ratio("Main St, Springfield", "springfield main st"), 100);
    }

    #[test]
    fn full_process_normalizes_separators() {
        assert_eq!(full_process("  123 Main-St., Apt_4 "), "123 main st   apt_4");
        assert_eq!(full_process("Café"), "caf");
    }

    #[test]
    fn full_process_keeps_letters_outside_latin1() {
        assert_eq!(full_process("łódź"), "łdź");
        assert_eq!(full_process("北京市, 朝阳区"), "北京市  朝阳区");
        assert_eq!(full_process("ул. Ленина"), "ул  ленина");
    }

    #[test]
    fn token_sort_ratio_scores_non_latin_scripts() {
        assert_eq!(token_sort_ratio("北京", "上海"), 0);
        assert_eq!(token_sort_ratio("Москва, ул. Ленина", "ленина ул москва"), 100);
        assert!(token_sort_ratio("北京市 朝阳", "上海市 浦东") < 50);
    }

    #[test]
    fn lcs_len_counts_subsequence() {
        let a = "abcbdab".chars().collect::<Vec<_>>();
        let b = "bdcaba".chars().collect::<Vec<_>>();
        assert_eq!(lcs_len(&a, &b), 4);
    }
}
