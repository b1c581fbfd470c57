//! Subsequence matching and ranking of candidate labels.
//!
//! A query matches a label when every query character appears in the label in
//! order, ignoring case. Among the possible alignments the matcher keeps the one
//! with the most adjacent matched pairs and, after that, the most matches that
//! land on a word start. Ranking orders matches by that score, then by shorter
//! label, then by original position.

use std::cmp::Ordering;

/// Quality of one alignment. Field order is comparison priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Score {
    /// Matched characters that directly follow the previous matched character.
    pub contiguous: u32,
    /// Matched characters at the start of the label or right after a separator.
    pub anchored: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyMatch {
    pub score: Score,
    /// Char offsets into the label, ascending.
    pub positions: Vec<usize>,
}

/// One ranked row: which candidate it is and how it matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub index: usize,
    pub score: Score,
    pub positions: Vec<usize>,
    label_len: usize,
}

pub fn fuzzy_match(query: &str, label: &str) -> Option<FuzzyMatch> {
    let needle = query.chars().map(fold).collect::<Vec<_>>();
    if needle.is_empty() {
        return Some(FuzzyMatch {
            score: Score::default(),
            positions: Vec::new(),
        });
    }

    let chars = label.chars().collect::<Vec<_>>();
    let folded = chars.iter().copied().map(fold).collect::<Vec<_>>();
    if !is_subsequence(&needle, &folded) {
        return None;
    }

    best_alignment(&needle, &chars, &folded)
}

/// Matches every label against `query` and returns the survivors best first.
///
/// An empty query keeps every candidate in its original order.
pub fn rank<S: AsRef<str>>(query: &str, labels: &[S]) -> Vec<MatchResult> {
    let mut results = labels
        .iter()
        .enumerate()
        .filter_map(|(index, label)| {
            let label = label.as_ref();
            fuzzy_match(query, label).map(|found| MatchResult {
                index,
                score: found.score,
                positions: found.positions,
                label_len: label.chars().count(),
            })
        })
        .collect::<Vec<_>>();

    if !query.is_empty() {
        results.sort_by(compare_results);
    }
    results
}

fn compare_results(left: &MatchResult, right: &MatchResult) -> Ordering {
    right
        .score
        .cmp(&left.score)
        .then_with(|| left.label_len.cmp(&right.label_len))
        .then_with(|| left.index.cmp(&right.index))
}

fn fold(ch: char) -> char {
    ch.to_lowercase().next().unwrap_or(ch)
}

fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '-' | '_' | '.' | '/')
}

fn is_anchor(chars: &[char], at: usize) -> bool {
    at == 0 || is_separator(chars[at - 1])
}

fn is_subsequence(needle: &[char], haystack: &[char]) -> bool {
    let mut remaining = haystack.iter();
    needle
        .iter()
        .all(|wanted| remaining.any(|candidate| candidate == wanted))
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    score: Score,
    prev: Option<usize>,
}

// cells[j][i] holds the best alignment of needle[..=j] whose last match is at i.
fn best_alignment(needle: &[char], chars: &[char], folded: &[char]) -> Option<FuzzyMatch> {
    let width = chars.len();
    let mut cells = vec![vec![None::<Cell>; width]; needle.len()];

    for (at, ch) in folded.iter().enumerate() {
        if *ch == needle[0] {
            cells[0][at] = Some(Cell {
                score: Score {
                    contiguous: 0,
                    anchored: u32::from(is_anchor(chars, at)),
                },
                prev: None,
            });
        }
    }

    for row in 1..needle.len() {
        let (done, rest) = cells.split_at_mut(row);
        let previous = &done[row - 1];
        let current = &mut rest[0];
        // best cell of the previous row strictly before at - 1
        let mut gapped: Option<(Score, usize)> = None;

        for at in 1..width {
            if at >= 2
                && let Some(cell) = previous[at - 2]
                && gapped.is_none_or(|(score, _)| cell.score > score)
            {
                gapped = Some((cell.score, at - 2));
            }

            if folded[at] != needle[row] {
                continue;
            }

            let adjacent = previous[at - 1].map(|cell| {
                let score = Score {
                    contiguous: cell.score.contiguous + 1,
                    ..cell.score
                };
                (score, at - 1)
            });
            let chosen = match (adjacent, gapped) {
                (Some(adjacent), Some(gapped)) if gapped.0 > adjacent.0 => Some(gapped),
                (Some(adjacent), _) => Some(adjacent),
                (None, gapped) => gapped,
            };

            if let Some((score, prev)) = chosen {
                current[at] = Some(Cell {
                    score: Score {
                        anchored: score.anchored + u32::from(is_anchor(chars, at)),
                        ..score
                    },
                    prev: Some(prev),
                });
            }
        }
    }

    let last = needle.len() - 1;
    let (mut at, best) = cells[last]
        .iter()
        .enumerate()
        .filter_map(|(at, cell)| cell.map(|cell| (at, cell)))
        .fold(None::<(usize, Cell)>, |best, (at, cell)| match best {
            Some((_, kept)) if kept.score >= cell.score => best,
            _ => Some((at, cell)),
        })?;

    let mut positions = vec![at; needle.len()];
    for row in (0..last).rev() {
        let cell = cells[row + 1][at]?;
        at = cell.prev?;
        positions[row] = at;
    }

    Some(FuzzyMatch {
        score: best.score,
        positions,
    })
}

#[cfg(test)]
mod tests {
    use super::{Score, fuzzy_match, rank};

    fn labels(results: &[super::MatchResult], source: &[&str]) -> Vec<String> {
        results
            .iter()
            .map(|result| source[result.index].to_string())
            .collect()
    }

    #[test]
    fn empty_query_keeps_insertion_order() {
        let source = ["zeta", "alpha", "kube-system", "a"];
        let ranked = rank("", &source);
        assert_eq!(labels(&ranked, &source), vec!["zeta", "alpha", "kube-system", "a"]);
        assert!(ranked.iter().all(|result| result.positions.is_empty()));
    }

    #[test]
    fn pro_matches_prod_and_production_but_not_staging() {
        let source = ["prod", "staging", "production"];
        let ranked = rank("pro", &source);
        assert_eq!(labels(&ranked, &source), vec!["prod", "production"]);
    }

    #[test]
    fn subsequence_matches_ignore_case_and_gaps() {
        let found = fuzzy_match("KSy", "kube-system").expect("subsequence should match");
        assert_eq!(found.positions, vec![0, 5, 6]);
        assert!(fuzzy_match("ks", "kube").is_none());
        assert!(fuzzy_match("oo", "o").is_none());
        assert!(fuzzy_match("dev", "ved").is_none());
    }

    #[test]
    fn alignment_prefers_contiguous_run_over_first_occurrence() {
        let found = fuzzy_match("web", "w-e-b-web").expect("should match");
        assert_eq!(found.positions, vec![6, 7, 8]);
        assert_eq!(found.score.contiguous, 2);
    }

    #[test]
    fn anchors_count_after_separators() {
        let found = fuzzy_match("cm", "coredns-metrics").expect("should match");
        assert_eq!(found.positions, vec![0, 8]);
        assert_eq!(
            found.score,
            Score {
                contiguous: 0,
                anchored: 2
            }
        );
    }

    #[test]
    fn contiguity_outranks_anchoring_and_length() {
        let source = ["a-p-i", "xxapixx"];
        let ranked = rank("api", &source);
        assert_eq!(labels(&ranked, &source), vec!["xxapixx", "a-p-i"]);
    }

    #[test]
    fn anchoring_outranks_length() {
        let source = ["xapi", "api-gateway"];
        let ranked = rank("api", &source);
        assert_eq!(labels(&ranked, &source), vec!["api-gateway", "xapi"]);
    }

    #[test]
    fn full_ties_fall_back_to_insertion_order() {
        let source = ["db-two", "db-one"];
        let ranked = rank("db", &source);
        assert_eq!(labels(&ranked, &source), vec!["db-two", "db-one"]);
    }

    #[test]
    fn ranking_is_repeatable() {
        let source = ["payments", "pay", "api-pay", "plain", "ops-pay-x"];
        assert_eq!(rank("pay", &source), rank("pay", &source));
    }

    #[test]
    fn positions_are_char_offsets() {
        let found = fuzzy_match("é", "café-x").expect("should match");
        assert_eq!(found.positions, vec![3]);
    }
}
