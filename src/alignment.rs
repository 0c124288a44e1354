use std::fmt;
use std::rc::Rc;

use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::matcher::SequenceMatcher;
use crate::types::AlignmentScoring;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Equal,
    Insert,
    Delete,
    Replace,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tag::Equal => "equal",
            Tag::Insert => "insert",
            Tag::Delete => "delete",
            Tag::Replace => "replace",
        };
        f.pad(name)
    }
}

/// One edit-script entry: `reference[ref_start..ref_end]` against
/// `candidate[cand_start..cand_end]`.
///
/// The ops of one alignment cover both sequences back to back, with no gaps
/// and no overlaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentOp {
    pub tag: Tag,
    pub ref_start: usize,
    pub ref_end: usize,
    pub cand_start: usize,
    pub cand_end: usize,
}

impl AlignmentOp {
    pub fn new(tag: Tag, ref_start: usize, ref_end: usize, cand_start: usize, cand_end: usize) -> Self {
        Self {
            tag,
            ref_start,
            ref_end,
            cand_start,
            cand_end,
        }
    }

    pub fn ref_range(&self) -> std::ops::Range<usize> {
        self.ref_start..self.ref_end
    }

    pub fn cand_range(&self) -> std::ops::Range<usize> {
        self.cand_start..self.cand_end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Longest matching block first, then recurse on both sides
    #[default]
    Blocks,
    /// Minimal-cost dynamic programming alignment
    Lcs,
}

/// Compares a reference symbol stream against a candidate one.
///
/// Holds no state between calls; comparing several candidates against one
/// reference is just several independent calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aligner {
    algorithm: Algorithm,
    autojunk: bool,
}

impl Aligner {
    pub fn new(algorithm: Algorithm, autojunk: bool) -> Self {
        Self { algorithm, autojunk }
    }

    pub fn opcodes(&self, reference: &[&str], candidate: &[&str]) -> Vec<AlignmentOp> {
        match self.algorithm {
            Algorithm::Blocks => {
                opcodes_from_blocks(&SequenceMatcher::new(reference, candidate, self.autojunk).matching_blocks())
            }
            Algorithm::Lcs => align(&SymbolScoring, reference, candidate).opcodes(),
        }
    }
}

/// Converts sorted matching blocks, closed by a zero-length sentinel, into ops.
fn opcodes_from_blocks(blocks: &[(usize, usize, usize)]) -> Vec<AlignmentOp> {
    let (mut i, mut j) = (0, 0);
    let mut ops = Vec::new();
    for &(ai, bj, size) in blocks {
        let tag = match (i < ai, j < bj) {
            (true, true) => Some(Tag::Replace),
            (true, false) => Some(Tag::Delete),
            (false, true) => Some(Tag::Insert),
            (false, false) => None,
        };
        if let Some(tag) = tag {
            ops.push(AlignmentOp::new(tag, i, ai, j, bj));
        }
        i = ai + size;
        j = bj + size;
        if size > 0 {
            ops.push(AlignmentOp::new(Tag::Equal, ai, i, bj, j));
        }
    }
    ops
}

/// Gap costs for the dynamic programming aligner. Extending a gap is cheaper
/// than opening one, so changed words cluster into few ops.
pub struct SymbolScoring;

impl AlignmentScoring<&str> for SymbolScoring {
    fn insert_score(&self, _inserted: &&str, previous_is_same: bool) -> f64 {
        if previous_is_same {
            0.3
        } else {
            0.7
        }
    }

    fn mutation_score(&self, left: &&str, right: &&str) -> f64 {
        if left == right {
            0.
        } else {
            1.
        }
    }
}

/// Single step of a DP alignment, by position in each sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentOperation {
    Mutation { left: usize, right: usize },
    InsertLeft { left: usize },
    InsertRight { right: usize },
}

#[derive(Debug, Clone)]
pub enum PathList<T> {
    End,
    Node {
        payload: T,
        previous: Rc<PathList<T>>,
    },
}

impl<T: Clone> PathList<T> {
    pub fn extract_path(&self) -> Vec<T> {
        let mut out = vec![];
        let mut current = self;
        while let PathList::Node { payload, previous } = current {
            out.push(payload.clone());
            current = previous;
        }
        out.reverse();
        out
    }
}

struct AlignmentData {
    score: f64,
    path: Rc<PathList<AlignmentOperation>>,
}

impl AlignmentData {
    pub fn new() -> Self {
        Self {
            score: 0.,
            path: Rc::new(PathList::End),
        }
    }
    pub fn unreachable() -> Self {
        Self {
            score: f64::INFINITY,
            path: Rc::new(PathList::End),
        }
    }
}

struct AlignmentState {
    last_was_mutation: AlignmentData,
    last_was_insert_left: AlignmentData,
    last_was_insert_right: AlignmentData,
}

impl AlignmentState {
    /// Ties go to a gap predecessor, the right one first. Read back from the
    /// end, this keeps gaps late and matches as early as possible.
    #[allow(clippy::collapsible_else_if)]
    pub fn pick_best(
        &self,
        payload: AlignmentOperation,
        mutation_score: f64,
        insert_left_score: f64,
        insert_right_score: f64,
    ) -> AlignmentData {
        let (score, previous) = if insert_right_score <= insert_left_score {
            if insert_right_score <= mutation_score {
                (insert_right_score, self.last_was_insert_right.path.clone())
            } else {
                (mutation_score, self.last_was_mutation.path.clone())
            }
        } else {
            if insert_left_score <= mutation_score {
                (insert_left_score, self.last_was_insert_left.path.clone())
            } else {
                (mutation_score, self.last_was_mutation.path.clone())
            }
        };
        AlignmentData {
            score,
            path: Rc::new(PathList::Node { payload, previous }),
        }
    }

    /// Same preference as [`AlignmentState::pick_best`], for the final cell.
    #[allow(clippy::collapsible_else_if)]
    pub fn extract_best(self) -> AlignmentData {
        if self.last_was_insert_right.score <= self.last_was_insert_left.score {
            if self.last_was_insert_right.score <= self.last_was_mutation.score {
                self.last_was_insert_right
            } else {
                self.last_was_mutation
            }
        } else {
            if self.last_was_insert_left.score <= self.last_was_mutation.score {
                self.last_was_insert_left
            } else {
                self.last_was_mutation
            }
        }
    }

    pub fn insert_left_score<T, S: AlignmentScoring<T>>(&self, scoring: &S, l: &T, l_index: usize) -> AlignmentData {
        let mutation_score = self.last_was_mutation.score + scoring.insert_score(l, false);
        let insert_left_score = self.last_was_insert_left.score + scoring.insert_score(l, true);
        let insert_right_score = self.last_was_insert_right.score + scoring.insert_score(l, false);
        self.pick_best(
            AlignmentOperation::InsertLeft { left: l_index },
            mutation_score,
            insert_left_score,
            insert_right_score,
        )
    }

    pub fn insert_right_score<T, S: AlignmentScoring<T>>(&self, scoring: &S, r: &T, r_index: usize) -> AlignmentData {
        let mutation_score = self.last_was_mutation.score + scoring.insert_score(r, false);
        let insert_left_score = self.last_was_insert_left.score + scoring.insert_score(r, false);
        let insert_right_score = self.last_was_insert_right.score + scoring.insert_score(r, true);
        self.pick_best(
            AlignmentOperation::InsertRight { right: r_index },
            mutation_score,
            insert_left_score,
            insert_right_score,
        )
    }

    pub fn mutation_score<T, S: AlignmentScoring<T>>(
        &self,
        scoring: &S,
        (l, l_index): (&T, usize),
        (r, r_index): (&T, usize),
    ) -> AlignmentData {
        let s = scoring.mutation_score(l, r);
        let mutation_score = self.last_was_mutation.score + s;
        let insert_left_score = self.last_was_insert_left.score + s;
        let insert_right_score = self.last_was_insert_right.score + s;
        self.pick_best(
            AlignmentOperation::Mutation {
                left: l_index,
                right: r_index,
            },
            mutation_score,
            insert_left_score,
            insert_right_score,
        )
    }
}

type AlignmentLineDS = Vec<AlignmentState>;

/// Minimal-cost alignment of `left` (reference) against `right` (candidate).
///
/// Keeps one row of the DP table at a time; each cell remembers the cheapest
/// path ending in a mutation, a left gap or a right gap.
pub fn align<'a, T, S: AlignmentScoring<T>>(scoring: &S, left: &'a [T], right: &'a [T]) -> Alignment<'a, T> {
    let result_path = {
        let mut current: AlignmentLineDS = Vec::with_capacity(left.len() + 1);
        current.push(AlignmentState {
            last_was_mutation: AlignmentData::new(),
            last_was_insert_left: AlignmentData::unreachable(),
            last_was_insert_right: AlignmentData::unreachable(),
        });
        for (l_index, l) in left.iter().enumerate() {
            let state = AlignmentState {
                last_was_mutation: AlignmentData::unreachable(),
                last_was_insert_left: current[l_index].insert_left_score(scoring, l, l_index),
                last_was_insert_right: AlignmentData::unreachable(),
            };
            current.push(state);
        }
        let mut next = Vec::with_capacity(left.len() + 1);
        for (r_index, r) in right.iter().enumerate() {
            next.push(AlignmentState {
                last_was_mutation: AlignmentData::unreachable(),
                last_was_insert_left: AlignmentData::unreachable(),
                last_was_insert_right: current[0].insert_right_score(scoring, r, r_index),
            });
            for (l_index, l) in left.iter().enumerate() {
                let col = l_index + 1;
                let state = AlignmentState {
                    last_was_mutation: current[col - 1].mutation_score(scoring, (l, l_index), (r, r_index)),
                    last_was_insert_left: next[col - 1].insert_left_score(scoring, l, l_index),
                    last_was_insert_right: current[col].insert_right_score(scoring, r, r_index),
                };
                next.push(state);
            }

            std::mem::swap(&mut current, &mut next);
            next.clear()
        }
        current
            .pop()
            .map(|state| state.extract_best().path)
            .unwrap_or_else(|| Rc::new(PathList::End))
    };
    Alignment {
        left,
        right,
        operations: result_path.extract_path(),
    }
}

#[derive(Debug)]
pub struct Alignment<'a, T> {
    left: &'a [T],
    right: &'a [T],
    operations: Vec<AlignmentOperation>,
}

impl<T: PartialEq> Alignment<'_, T> {
    pub fn operations(&self) -> &[AlignmentOperation] {
        &self.operations
    }

    /// Groups the step-by-step path into ops. Runs between equal symbols
    /// become `replace` when both sides moved, `delete`/`insert` otherwise.
    pub fn opcodes(&self) -> Vec<AlignmentOp> {
        let mut ops = Vec::new();
        let (mut i, mut j) = (0, 0);
        let (mut run_i, mut run_j) = (0, 0);
        let mut run_equal: Option<bool> = None;
        let flush = |ops: &mut Vec<AlignmentOp>, equal: bool, (si, sj): (usize, usize), (ei, ej): (usize, usize)| {
            let tag = match (equal, si < ei, sj < ej) {
                (true, _, _) => Tag::Equal,
                (false, true, true) => Tag::Replace,
                (false, true, false) => Tag::Delete,
                (false, false, _) => Tag::Insert,
            };
            ops.push(AlignmentOp::new(tag, si, ei, sj, ej));
        };
        for operation in self.operations.iter() {
            let (equal, di, dj) = match *operation {
                AlignmentOperation::Mutation { left, right } => (self.left[left] == self.right[right], 1, 1),
                AlignmentOperation::InsertLeft { .. } => (false, 1, 0),
                AlignmentOperation::InsertRight { .. } => (false, 0, 1),
            };
            match run_equal {
                Some(current) if current == equal => {}
                Some(current) => {
                    flush(&mut ops, current, (run_i, run_j), (i, j));
                    run_i = i;
                    run_j = j;
                    run_equal = Some(equal);
                }
                None => run_equal = Some(equal),
            }
            i += di;
            j += dj;
        }
        if let Some(current) = run_equal {
            flush(&mut ops, current, (run_i, run_j), (i, j));
        }
        ops
    }
}

/// Colored, one-line-per-op rendering of an alignment for terminal output.
pub fn pretty(ops: &[AlignmentOp], reference: &[&str], candidate: &[&str]) -> Vec<String> {
    ops.iter()
        .map(|op| {
            let left = reference[op.ref_range()].join(" ");
            let right = candidate[op.cand_range()].join(" ");
            let header = format!(
                "{:>7} ref[{}..{}] cand[{}..{}]",
                op.tag, op.ref_start, op.ref_end, op.cand_start, op.cand_end
            );
            match op.tag {
                Tag::Equal => format!("{}  {}", header.dimmed(), right),
                Tag::Delete => format!("{}  {}", header, left.red().strikethrough()),
                Tag::Insert => format!("{}  {}", header, right.green()),
                Tag::Replace => format!("{}  {} -> {}", header, left.red(), right.green()),
            }
        })
        .collect()
}
