//! Approximate string matching by longest matching blocks.
//!
//! Implements Gestalt pattern matching (Ratcliff/Obershelp): the similarity of
//! two strings is `2*M / T`, where `M` is the number of characters in the
//! matching blocks found by recursively taking the longest common block and
//! `T` is the combined length. Sequences are compared by `char`.
//!
//! The block search is asymmetric: ties between equally long blocks go to the
//! earliest block in `a`, then the earliest in `b`. Callers that need
//! reproducible scores must keep the argument order stable.

use ahash::{AHashMap, AHashSet};
use oncostage_common::{OncostageError, Result};

/// Sequences at least this long have their popular characters dropped from the index.
const AUTOJUNK_MIN_LEN: usize = 200;

/// A matching block: `a[a_start..a_start + size] == b[b_start..b_start + size]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub a_start: usize,
    pub b_start: usize,
    pub size: usize,
}

/// Compares a pair of strings. `b` is indexed once, so score many `a` values
/// against a fixed `b` with [`SequenceMatcher::set_seq1`].
#[derive(Debug, Clone)]
pub struct SequenceMatcher {
    a: Vec<char>,
    b: Vec<char>,
    /// char -> ascending positions in `b`, popular chars removed
    b2j: AHashMap<char, Vec<usize>>,
    b_counts: AHashMap<char, usize>,
}

impl SequenceMatcher {
    pub fn new(a: &str, b: &str) -> Self {
        let mut matcher = Self {
            a: a.chars().collect(),
            b: Vec::new(),
            b2j: AHashMap::new(),
            b_counts: AHashMap::new(),
        };
        matcher.set_seq2(b);
        matcher
    }

    pub fn set_seq1(&mut self, a: &str) {
        self.a.clear();
        self.a.extend(a.chars());
    }

    pub fn set_seq2(&mut self, b: &str) {
        self.b = b.chars().collect();
        self.b2j.clear();
        self.b_counts.clear();

        for (j, &c) in self.b.iter().enumerate() {
            self.b2j.entry(c).or_default().push(j);
            *self.b_counts.entry(c).or_default() += 1;
        }

        let n = self.b.len();
        if n >= AUTOJUNK_MIN_LEN {
            let ntest = n / 100 + 1;
            let popular: AHashSet<char> = self
                .b2j
                .iter()
                .filter(|(_, idxs)| idxs.len() > ntest)
                .map(|(&c, _)| c)
                .collect();
            for c in popular {
                self.b2j.remove(&c);
            }
        }
    }

    /// Longest matching block in `a[alo..ahi]` and `b[blo..bhi]`.
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Match {
        let (a, b) = (&self.a, &self.b);
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0usize);

        // j2len[j] = length of the longest block ending at a[i-1], b[j]
        let mut j2len: AHashMap<usize, usize> = AHashMap::new();
        for i in alo..ahi {
            let mut next_j2len = AHashMap::new();
            if let Some(positions) = self.b2j.get(&a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let prev = if j > 0 { j2len.get(&(j - 1)).copied().unwrap_or(0) } else { 0 };
                    let k = prev + 1;
                    next_j2len.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = next_j2len;
        }

        // Popular characters are absent from the index; grow across them.
        while best_i > alo && best_j > blo && a[best_i - 1] == b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && a[best_i + best_size] == b[best_j + best_size]
        {
            best_size += 1;
        }

        Match { a_start: best_i, b_start: best_j, size: best_size }
    }

    /// Non-overlapping matching blocks in ascending order, adjacent blocks merged.
    pub fn matching_blocks(&self) -> Vec<Match> {
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let m = self.find_longest_match(alo, ahi, blo, bhi);
            if m.size == 0 {
                continue;
            }
            blocks.push(m);
            if alo < m.a_start && blo < m.b_start {
                pending.push((alo, m.a_start, blo, m.b_start));
            }
            if m.a_start + m.size < ahi && m.b_start + m.size < bhi {
                pending.push((m.a_start + m.size, ahi, m.b_start + m.size, bhi));
            }
        }
        blocks.sort_by_key(|m| (m.a_start, m.b_start, m.size));

        let mut merged: Vec<Match> = Vec::with_capacity(blocks.len());
        for m in blocks {
            if let Some(last) = merged.last_mut() {
                if last.a_start + last.size == m.a_start && last.b_start + last.size == m.b_start {
                    last.size += m.size;
                    continue;
                }
            }
            merged.push(m);
        }
        merged
    }

    /// Similarity in `[0, 1]`; two empty strings score 1.0.
    pub fn ratio(&self) -> f64 {
        let matches = self.matching_blocks().iter().map(|m| m.size).sum();
        calculate_ratio(matches, self.a.len() + self.b.len())
    }

    /// Upper bound on [`ratio`](Self::ratio) from character multisets.
    pub fn quick_ratio(&self) -> f64 {
        let mut available: AHashMap<char, usize> = AHashMap::new();
        let mut matches = 0;
        for c in &self.a {
            let left = available
                .entry(*c)
                .or_insert_with(|| self.b_counts.get(c).copied().unwrap_or(0));
            if *left > 0 {
                *left -= 1;
                matches += 1;
            }
        }
        calculate_ratio(matches, self.a.len() + self.b.len())
    }

    /// Upper bound on [`ratio`](Self::ratio) from lengths alone.
    pub fn real_quick_ratio(&self) -> f64 {
        let (la, lb) = (self.a.len(), self.b.len());
        calculate_ratio(la.min(lb), la + lb)
    }
}

fn calculate_ratio(matches: usize, length: usize) -> f64 {
    if length > 0 {
        2.0 * matches as f64 / length as f64
    } else {
        1.0
    }
}

/// Similarity ratio of `a` against `b`.
pub fn ratio(a: &str, b: &str) -> f64 {
    SequenceMatcher::new(a, b).ratio()
}

/// Scores every possibility against `word` and keeps those at or above `cutoff`,
/// best first. Equal scores order by the phrase itself, greatest first.
fn scored_matches<'a>(word: &str, possibilities: &'a [String], cutoff: f64) -> Vec<(f64, &'a str)> {
    let mut matcher = SequenceMatcher::new("", word);
    let mut scored = Vec::new();

    for x in possibilities {
        matcher.set_seq1(x);
        if matcher.real_quick_ratio() >= cutoff && matcher.quick_ratio() >= cutoff {
            let score = matcher.ratio();
            if score >= cutoff {
                scored.push((score, x.as_str()));
            }
        }
    }

    scored.sort_by(|(sa, xa), (sb, xb)| sb.total_cmp(sa).then_with(|| xb.cmp(xa)));
    scored
}

/// The single closest possibility to `word` with a ratio of at least `cutoff`.
///
/// `cutoff` is not validated; values above 1.0 never match.
pub fn best_close_match<'a>(word: &str, possibilities: &'a [String], cutoff: f64) -> Option<&'a str> {
    scored_matches(word, possibilities, cutoff)
        .into_iter()
        .next()
        .map(|(_, x)| x)
}

/// Up to `n` possibilities closest to `word`, best first.
pub fn get_close_matches<'a>(
    word: &str,
    possibilities: &'a [String],
    n: usize,
    cutoff: f64,
) -> Result<Vec<&'a str>> {
    if n == 0 {
        return Err(OncostageError::InvalidParameter(format!("n must be > 0: {}", n)));
    }
    if !(0.0..=1.0).contains(&cutoff) {
        return Err(OncostageError::InvalidParameter(format!(
            "cutoff must be in [0.0, 1.0]: {}",
            cutoff
        )));
    }

    Ok(scored_matches(word, possibilities, cutoff)
        .into_iter()
        .take(n)
        .map(|(_, x)| x)
        .collect())
}
