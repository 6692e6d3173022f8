//! Partial string similarity used by the fuzzy keyword phase.
//!
//! Scores live on a 0 to 100 scale. [`ratio`] is the normalized Indel
//! similarity of two strings (insertions and deletions only, so a
//! substitution costs two edits). [`partial_ratio`] slides the shorter string
//! over the longer one and keeps the best window, which makes a keyword score
//! high whenever it appears, possibly with a typo, anywhere in an utterance.

use std::collections::HashSet;

/// Length of the longest common subsequence, two-row dynamic programming.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut prev_row = vec![0usize; b.len() + 1];
    let mut curr_row = vec![0usize; b.len() + 1];

    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            curr_row[j + 1] = if ca == cb {
                prev_row[j] + 1
            } else {
                prev_row[j + 1].max(curr_row[j])
            };
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b.len()]
}

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    (200 * lcs_len(a, b)) as f64 / total as f64
}

/// Normalized Indel similarity of two strings.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

/// Best [`ratio`] of the shorter string against any equally long window of
/// the longer one, including the partial windows hanging off either edge.
///
/// Either side empty scores 0 (both empty scores 100).
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() || b.is_empty() {
        return if a.is_empty() && b.is_empty() { 100.0 } else { 0.0 };
    }

    let (needle, haystack) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    let n = needle.len();
    let h = haystack.len();
    let alphabet: HashSet<char> = needle.iter().copied().collect();

    let mut best = 0.0f64;
    let mut consider = |window: &[char]| {
        let score = ratio_chars(needle, window);
        if score > best {
            best = score;
        }
        best >= 100.0
    };

    // A window whose outer edge character never occurs in the needle scores
    // no better than the same window without it, so it can be skipped.

    // leading edge: haystack[..i]
    for i in 1..n {
        if alphabet.contains(&haystack[i - 1]) && consider(&haystack[..i]) {
            return 100.0;
        }
    }

    // full-length windows
    for start in 0..=(h - n) {
        if alphabet.contains(&haystack[start + n - 1]) && consider(&haystack[start..start + n]) {
            return 100.0;
        }
    }

    // trailing edge: haystack[i..]
    for start in (h - n + 1)..h {
        if alphabet.contains(&haystack[start]) && consider(&haystack[start..]) {
            return 100.0;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_ratio_basics() {
        assert!(approx(ratio("", ""), 100.0));
        assert!(approx(ratio("abc", ""), 0.0));
        assert!(approx(ratio("wetter", "wetter"), 100.0));
        // one substitution is two Indel edits: 2 * 5 / 12
        assert!(approx(ratio("wetter", "wotter"), 1000.0 / 12.0));
        assert!(approx(ratio("abc", "xyz"), 0.0));
    }

    #[test]
    fn test_ratio_counts_unicode_scalars() {
        assert!(approx(ratio("lösche", "lösche"), 100.0));
        // ö vs o differ, 5 of 6 shared
        assert!(approx(ratio("lösche", "losche"), 1000.0 / 12.0));
    }

    #[test]
    fn test_partial_ratio_contained_keyword() {
        assert!(approx(
            partial_ratio("wetter", "wie ist das wetter heute"),
            100.0
        ));
        assert!(approx(
            partial_ratio("wie ist das wetter heute", "wetter"),
            100.0
        ));
    }

    #[test]
    fn test_partial_ratio_tolerates_typos() {
        let score = partial_ratio("reminder", "set a remindr for me");
        assert!(score >= 85.0, "score was {score}");
        assert!(score < 100.0);
    }

    #[test]
    fn test_partial_ratio_edge_windows() {
        // "wea" hangs off the end: 2 * 3 / 7
        assert!(approx(partial_ratio("wear", "what do i wea"), 600.0 / 7.0));
        // "pac" at the start
        assert!(approx(partial_ratio("pack", "pac it up"), 600.0 / 7.0));
    }

    #[test]
    fn test_partial_ratio_unrelated() {
        assert!(partial_ratio("weather", "xyzxyz completely unrelated gibberish") < 80.0);
        assert!(approx(partial_ratio("abc", "xyz"), 0.0));
    }

    #[test]
    fn test_partial_ratio_empty() {
        assert!(approx(partial_ratio("", "anything"), 0.0));
        assert!(approx(partial_ratio("anything", ""), 0.0));
        assert!(approx(partial_ratio("", ""), 100.0));
    }

    #[test]
    fn test_partial_ratio_is_symmetric() {
        let pairs = [
            ("remind", "erinnere mich"),
            ("show routines", "show me all routines"),
            ("koffer", "ich packe den kofer"),
        ];
        for (a, b) in pairs {
            assert!(approx(partial_ratio(a, b), partial_ratio(b, a)));
        }
    }
}
