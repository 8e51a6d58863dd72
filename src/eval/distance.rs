// ============================================================
// Layer 7 — Edit Distance
// ============================================================
// Levenshtein distance over any comparable tokens: characters
// for CER, words for WER. Unit cost for insert, delete and
// substitute; two rolling rows keep memory at O(len(b)).
//
// Reference: Levenshtein (1966) Binary codes capable of
//            correcting deletions, insertions and reversals

pub fn levenshtein<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, x) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, y) in b.iter().enumerate() {
            let substitute = prev[j] + usize::from(x != y);
            curr[j + 1] = substitute.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_identical_is_zero() {
        assert_eq!(levenshtein(&chars("exam"), &chars("exam")), 0);
    }

    #[test]
    fn test_against_empty() {
        assert_eq!(levenshtein(&chars(""), &chars("abc")), 3);
        assert_eq!(levenshtein(&chars("abc"), &chars("")), 3);
    }

    #[test]
    fn test_classic_pair() {
        assert_eq!(levenshtein(&chars("kitten"), &chars("sitting")), 3);
    }

    #[test]
    fn test_over_words() {
        let a: Vec<&str> = "the cat sat".split_whitespace().collect();
        let b: Vec<&str> = "the cat sat down".split_whitespace().collect();
        assert_eq!(levenshtein(&a, &b), 1);
    }
}
