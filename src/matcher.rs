//! Longest-matching-block sequence matcher.
//!
//! Finds the longest run of equal symbols, then recurses on the pieces to its
//! left and right. Among equally long runs the one starting earliest in the
//! reference wins, then the one starting earliest in the candidate, which
//! makes the result a pure function of the two inputs.

use std::collections::HashMap;

/// Candidates shorter than this never have popular symbols junked.
const AUTOJUNK_MIN_LEN: usize = 200;

/// `(ref_start, cand_start, len)` of a run of equal symbols.
pub type MatchingBlock = (usize, usize, usize);

pub struct SequenceMatcher<'a> {
    reference: &'a [&'a str],
    candidate: &'a [&'a str],
    /// Candidate positions of every symbol still allowed to seed a match.
    candidate_index: HashMap<&'a str, Vec<usize>>,
}

impl<'a> SequenceMatcher<'a> {
    pub fn new(reference: &'a [&'a str], candidate: &'a [&'a str], autojunk: bool) -> Self {
        let mut candidate_index: HashMap<&str, Vec<usize>> = HashMap::new();
        for (j, symbol) in candidate.iter().enumerate() {
            candidate_index.entry(*symbol).or_default().push(j);
        }
        if autojunk && candidate.len() >= AUTOJUNK_MIN_LEN {
            let threshold = candidate.len() / 100 + 1;
            candidate_index.retain(|_, positions| positions.len() <= threshold);
        }
        Self {
            reference,
            candidate,
            candidate_index,
        }
    }

    /// Longest block of equal symbols inside `reference[alo..ahi]` and `candidate[blo..bhi]`.
    fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> MatchingBlock {
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
        // Length of the match ending at candidate position j, for the previous reference row.
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut new_j2len = HashMap::new();
            if let Some(positions) = self.candidate_index.get(self.reference[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j.checked_sub(1).and_then(|p| j2len.get(&p)).copied().unwrap_or(0) + 1;
                    new_j2len.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = new_j2len;
        }
        (best_i, best_j, best_size)
    }

    /// Matching blocks in increasing order, adjacent blocks merged, closed by a
    /// zero-length sentinel at `(len(reference), len(candidate))`.
    pub fn matching_blocks(&self) -> Vec<MatchingBlock> {
        let (la, lb) = (self.reference.len(), self.candidate.len());
        let mut queue = vec![(0, la, 0, lb)];
        let mut blocks = Vec::new();
        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.find_longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            blocks.push((i, j, k));
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }
        blocks.sort_unstable();

        let mut merged: Vec<MatchingBlock> = Vec::with_capacity(blocks.len() + 1);
        for (i, j, k) in blocks {
            match merged.last_mut() {
                Some((pi, pj, pk)) if *pi + *pk == i && *pj + *pk == j => *pk += k,
                _ => merged.push((i, j, k)),
            }
        }
        merged.push((la, lb, 0));
        merged
    }
}
