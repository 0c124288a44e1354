//! Deciding which aligned candidate symbols are reported as different.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::alignment::{AlignmentOp, Tag};
use crate::types::NormalizedSymbol;

/// What to do with a candidate symbol the alignment left unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SuppressionMode {
    /// Report every unmatched candidate symbol
    #[default]
    Windowed,
    /// Drop unmatched symbols whose text occurs anywhere in the reference.
    /// Hides moved and repaginated words, and also any real change that
    /// happens to reuse a reference word.
    Global,
}

/// Candidate symbol positions flagged as different on one page, ascending.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DifferenceSpan {
    pub indices: Vec<usize>,
}

impl DifferenceSpan {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&index).is_ok()
    }
}

/// Applies `mode` to the candidate ranges of every non-equal op.
///
/// `delete` ops have an empty candidate range and so never flag anything.
pub fn difference_span(
    ops: &[AlignmentOp],
    reference: &[NormalizedSymbol],
    candidate: &[NormalizedSymbol],
    mode: SuppressionMode,
) -> DifferenceSpan {
    let vocabulary: HashSet<&str> = match mode {
        SuppressionMode::Windowed => HashSet::new(),
        SuppressionMode::Global => reference.iter().map(NormalizedSymbol::text).collect(),
    };
    let indices = ops
        .iter()
        .filter(|op| op.tag != Tag::Equal)
        .flat_map(|op| op.cand_range())
        .filter(|&index| match candidate.get(index) {
            Some(symbol) => !vocabulary.contains(symbol.text()),
            None => {
                log::warn!("alignment op points past the candidate ({} symbols): {}", candidate.len(), index);
                false
            }
        })
        .collect();
    DifferenceSpan { indices }
}
