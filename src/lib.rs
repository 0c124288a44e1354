//! Word-level differences between page-aligned documents.
//!
//! Each page of every candidate document is compared against the same page of
//! a reference document:
//!
//! 1. the page's words are normalized into a symbol stream ([`tokenizer`]),
//! 2. the candidate stream is aligned against the reference stream ([`alignment`]),
//! 3. unmatched candidate symbols are filtered by a suppression policy ([`policy`]),
//! 4. what is left is mapped back to word boxes on the page ([`mapping`]).
//!
//! [`pipeline::run`] wraps this with loading, highlighting and side-by-side
//! page previews.
//!
//! ```
//! use pagediff::{Comparator, DiffConfig, Region, Token};
//!
//! let words = |text: &[&str]| -> Vec<Token> {
//!     text.iter()
//!         .enumerate()
//!         .map(|(i, w)| Token::new(*w, Region::new(i as f32 * 10., 0., i as f32 * 10. + 8., 10.), 0))
//!         .collect()
//! };
//! let reference = words(&["The", "cat", "sat"]);
//! let candidate = words(&["The", "dog", "sat"]);
//!
//! let diff = Comparator::new(&DiffConfig::default()).compare_tokens(&reference, &candidate);
//! assert_eq!(diff.span.indices, vec![1]);
//! assert_eq!(diff.regions, vec![candidate[1].region]);
//! ```

pub mod alignment;
pub mod annotate;
pub mod config;
pub mod document;
pub mod error;
pub mod mapping;
pub mod matcher;
pub mod pipeline;
pub mod policy;
pub mod render;
pub mod tokenizer;
pub mod types;

pub use alignment::{Aligner, Algorithm, AlignmentOp, Tag};
pub use annotate::{Annotator, Color, Highlight, HighlightLayer};
pub use config::{DiffConfig, RenderConfig, Settings};
pub use document::{Document, DocumentLoader, JsonLoader, Page};
pub use error::{DocumentLoadError, Error, Result};
pub use pipeline::{run, Comparator, Comparison, ComparisonJob, PageDiff, PageOutcome, RunSummary, Slot};
pub use policy::{DifferenceSpan, SuppressionMode};
pub use tokenizer::{NormalizationConfig, Normalizer, WhitespaceMode};
pub use types::{NormalizedSymbol, Region, Token};
