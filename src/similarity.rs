//! Matching-block string similarity.
//!
//! Ratcliff/Obershelp: find the longest common block, recurse on the pieces
//! to its left and right, and score `2 * matched / total_len`. Comparison is
//! case-insensitive and measured in characters, not bytes.

/// Similarity of `a` and `b` in `[0.0, 1.0]`. Two empty strings score `1.0`.
///
/// The block search breaks ties by position, which can make a single pass
/// order-dependent; taking the larger count of both orders keeps the ratio
/// symmetric.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matched = matching_chars(&a, &b).max(matching_chars(&b, &a));
    2.0 * matched as f64 / total as f64
}

/// Round a score to two decimals for presentation.
pub fn round2(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }

    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]` as `(i, j, len)`.
/// Earliest block wins on ties.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let width = bhi - blo;
    let mut prev = vec![0usize; width + 1];
    let mut cur = vec![0usize; width + 1];
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);

    for i in alo..ahi {
        for j in blo..bhi {
            let col = j - blo + 1;
            if a[i] == b[j] {
                let k = prev[col - 1] + 1;
                cur[col] = k;
                if k > best_k {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_k = k;
                }
            } else {
                cur[col] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    (best_i, best_j, best_k)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identical_strings() {
        assert!(close(ratio("The Gathering", "The Gathering"), 1.0));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(close(ratio("ARKHAM", "arkham"), 1.0));
    }

    #[test]
    fn test_both_empty() {
        assert!(close(ratio("", ""), 1.0));
    }

    #[test]
    fn test_one_empty() {
        assert!(close(ratio("abc", ""), 0.0));
        assert!(close(ratio("", "abc"), 0.0));
    }

    #[test]
    fn test_disjoint() {
        assert!(close(ratio("abc", "xyz"), 0.0));
    }

    #[test]
    fn test_shifted_overlap() {
        // "bcd" is the only block: 2 * 3 / 8
        assert!(close(ratio("abcd", "bcde"), 0.75));
    }

    #[test]
    fn test_blocks_on_both_sides() {
        // "ab" and "de" match around a differing middle: 2 * 4 / 10
        assert!(close(ratio("abXde", "abYde"), 0.8));
    }

    #[test]
    fn test_symmetric() {
        let pairs = [
            ("arkham", "dunwich"),
            ("The Dunwich Legacy", "dunwich"),
            ("abab", "baba"),
            ("Night of the Zealot", "zealot night"),
        ];
        for (a, b) in pairs {
            assert!(close(ratio(a, b), ratio(b, a)), "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_in_unit_range() {
        let pairs = [("a", "aaaa"), ("shotgun", "Lightning Gun"), ("x", "y")];
        for (a, b) in pairs {
            let r = ratio(a, b);
            assert!((0.0..=1.0).contains(&r), "{} out of range", r);
        }
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        assert!(close(ratio("Çthulhu", "çthulhu"), 1.0));
    }

    #[test]
    fn test_round2() {
        assert!(close(round2(0.666666), 0.67));
        assert!(close(round2(0.5), 0.5));
        assert!(close(round2(1.0), 1.0));
    }
}
