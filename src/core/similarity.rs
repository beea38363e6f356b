//! Ratcliff/Obershelp similarity: twice the number of characters in matching
//! runs divided by the combined length of both strings.

use difflib::sequencematcher::SequenceMatcher;

pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// Similarity of `a` and `b` on a 0-1 scale. Two empty strings score 1.0.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let mut matcher = SequenceMatcher::new(&a, &b);
    f64::from(matcher.ratio())
}

/// Picks the candidate most similar to `word`, provided it scores at least
/// `cutoff`. Ties go to the lexicographically greatest candidate.
pub fn closest_match<'c, I>(word: &str, candidates: I, cutoff: f64) -> Option<&'c str>
where
    I: IntoIterator<Item = &'c str>,
{
    let mut best: Option<(f64, &'c str)> = None;
    for candidate in candidates {
        let score = ratio(candidate, word);
        if score < cutoff {
            continue;
        }
        let better = match best {
            None => true,
            Some((best_score, best_candidate)) => {
                score > best_score || (score == best_score && candidate > best_candidate)
            }
        };
        if better {
            best = Some((score, candidate));
        }
    }
    best.map(|(_, candidate)| candidate)
}
