//! Gestalt (Ratcliff/Obershelp) string similarity.
//!
//! [`ratio`] returns `2 * M / T`, where `M` is the number of characters in
//! matching blocks and `T` is the combined length of both inputs. Inputs are
//! lowercased and their whitespace collapsed first, so strings that differ
//! only in case or spacing score exactly `1.0`.
//!
//! Matching blocks are found greedily: the longest common block is taken,
//! then the procedure recurses on the text to its left and to its right.
//! Among equally long blocks the one that appears first in `a` wins.

/// Lowercase and collapse runs of whitespace into single spaces.
pub fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Similarity of two strings in `[0.0, 1.0]`, case and whitespace insensitive.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = normalize(a).chars().collect();
    let b: Vec<char> = normalize(b).chars().collect();
    ratio_chars(&a, &b)
}

/// Case-insensitive, whitespace-insensitive equality.
pub fn same_text(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(a, b) as f64 / total as f64
}

/// Total size of all matching blocks between `a` and `b`.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_block(a, b, alo, ahi, blo, bhi);
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
fn longest_block(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best) = (alo, blo, 0);
    let width = bhi - blo;
    // run[x + 1]: length of the common suffix ending at the current a[i] and b[blo + x]
    let mut prev = vec![0usize; width + 1];
    let mut curr = vec![0usize; width + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            let x = j - blo + 1;
            if a[i] == b[j] {
                let k = prev[x - 1] + 1;
                curr[x] = k;
                if k > best {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best = k;
                }
            } else {
                curr[x] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    (best_i, best_j, best)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn identical_strings_score_one() {
        assert_eq!(ratio("Study of X", "Study of X"), 1.0);
    }

    #[test]
    fn case_and_whitespace_are_ignored() {
        assert_eq!(ratio("  Study   of X ", "study OF x"), 1.0);
        assert!(same_text("Jane  Doe", " jane doe"));
    }

    #[test]
    fn empty_inputs() {
        assert_eq!(ratio("", ""), 1.0);
        assert_eq!(ratio("abc", ""), 0.0);
        assert_eq!(ratio("", "abc"), 0.0);
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert_eq!(ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn two_separate_blocks() {
        // "ab" and "cd" match: 2 * 4 / 12
        assert!(approx(ratio("qabxcd", "abycdf"), 8.0 / 12.0));
    }

    #[test]
    fn shifted_overlap() {
        assert!(approx(ratio("abcd", "bcde"), 0.75));
    }

    #[test]
    fn exact_boundary_value() {
        assert_eq!(ratio("abcde", "abcdx"), 0.8);
    }

    #[test]
    fn short_name_against_long_name() {
        // " doe" and "jon" match: 2 * 7 / 19
        let score = ratio("Jon Doe", "Jonathan Doe");
        assert!(approx(score, 14.0 / 19.0));
        assert!(score < 0.80);
    }

    #[test]
    fn non_ascii_characters() {
        assert_eq!(ratio("Müller", "MÜLLER"), 1.0);
        assert!(ratio("Müller", "Muller") > 0.8);
    }
}
