//! Page-by-page comparison of a reference document against candidates, and
//! the full run that annotates, renders and writes the combined artifact.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;

use crate::alignment::{pretty, Aligner, AlignmentOp};
use crate::annotate::{Annotator, Color, HighlightLayer};
use crate::config::{DiffConfig, RenderConfig, Settings};
use crate::document::{Document, DocumentLoader, Page};
use crate::error::{Error, Result};
use crate::mapping::regions_for_span;
use crate::policy::{difference_span, DifferenceSpan, SuppressionMode};
use crate::render::{compose_side_by_side, rasterize_page, save_png};
use crate::tokenizer::{validate_page, Normalizer};
use crate::types::{NormalizedSymbol, Region, Token};

pub const REPORT_FILE: &str = "combined_comparison.json";

/// Input slot of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Reference,
    /// Zero-based candidate position
    Candidate(usize),
}

/// The files of one comparison and where its output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonJob {
    pub reference: PathBuf,
    pub candidates: Vec<PathBuf>,
    pub output_dir: PathBuf,
}

impl ComparisonJob {
    pub fn new(reference: impl Into<PathBuf>, candidates: Vec<PathBuf>, output_dir: impl Into<PathBuf>) -> Result<Self> {
        if candidates.is_empty() {
            return Err(Error::Config("at least one candidate document is required".to_string()));
        }
        Ok(Self {
            reference: reference.into(),
            candidates,
            output_dir: output_dir.into(),
        })
    }

    pub fn path(&self, slot: Slot) -> Option<&Path> {
        match slot {
            Slot::Reference => Some(self.reference.as_path()),
            Slot::Candidate(i) => self.candidates.get(i).map(PathBuf::as_path),
        }
    }

    /// Replaces the file in `slot`. A candidate slot one past the end appends.
    pub fn set(&mut self, slot: Slot, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        match slot {
            Slot::Reference => self.reference = path,
            Slot::Candidate(i) if i < self.candidates.len() => self.candidates[i] = path,
            Slot::Candidate(i) if i == self.candidates.len() => self.candidates.push(path),
            Slot::Candidate(i) => {
                return Err(Error::Config(format!(
                    "candidate slot {} is not next to the {} existing ones",
                    i,
                    self.candidates.len()
                )))
            }
        }
        Ok(())
    }

    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        std::iter::once(Slot::Reference).chain((0..self.candidates.len()).map(Slot::Candidate))
    }
}

/// Result of comparing one candidate page against the reference page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageDiff {
    pub ops: Vec<AlignmentOp>,
    pub span: DifferenceSpan,
    /// Regions of the flagged candidate tokens, in span order
    pub regions: Vec<Region>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PageOutcome {
    Compared {
        page_index: usize,
        /// One entry per candidate, in candidate order
        candidates: Vec<PageDiff>,
    },
    Skipped {
        page_index: usize,
        reason: String,
    },
}

impl PageOutcome {
    pub fn page_index(&self) -> usize {
        match self {
            PageOutcome::Compared { page_index, .. } | PageOutcome::Skipped { page_index, .. } => *page_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    /// Reference first, then candidates
    pub documents: Vec<PathBuf>,
    pub page_counts: Vec<usize>,
    /// Pages compared: the page count of the shortest document
    pub compared_pages: usize,
    pub pages: Vec<PageOutcome>,
}

impl Comparison {
    pub fn skipped_pages(&self) -> usize {
        self.pages
            .iter()
            .filter(|p| matches!(p, PageOutcome::Skipped { .. }))
            .count()
    }

    pub fn flagged_tokens(&self) -> usize {
        self.pages
            .iter()
            .map(|p| match p {
                PageOutcome::Compared { candidates, .. } => candidates.iter().map(|d| d.span.len()).sum(),
                PageOutcome::Skipped { .. } => 0,
            })
            .sum()
    }
}

/// Tokenize, normalize, align and map, with one configuration for every document.
#[derive(Debug, Clone)]
pub struct Comparator {
    normalizer: Normalizer,
    aligner: Aligner,
    suppression: SuppressionMode,
}

impl Comparator {
    pub fn new(config: &DiffConfig) -> Self {
        Self {
            normalizer: config.normalizer(),
            aligner: config.aligner(),
            suppression: config.suppression,
        }
    }

    fn diff_symbols(&self, reference: &[NormalizedSymbol], candidate: &[NormalizedSymbol], tokens: &[Token]) -> PageDiff {
        let ref_text: Vec<&str> = reference.iter().map(NormalizedSymbol::text).collect();
        let cand_text: Vec<&str> = candidate.iter().map(NormalizedSymbol::text).collect();
        let ops = self.aligner.opcodes(&ref_text, &cand_text);
        let span = difference_span(&ops, reference, candidate, self.suppression);
        let regions = regions_for_span(&span, candidate, tokens);
        PageDiff { ops, span, regions }
    }

    /// Colored op listing for one candidate page, for debugging alignments.
    pub fn describe(&self, reference: &[Token], candidate: &[Token]) -> Vec<String> {
        let reference = self.normalizer.symbols(reference);
        let candidate = self.normalizer.symbols(candidate);
        let ref_text: Vec<&str> = reference.iter().map(NormalizedSymbol::text).collect();
        let cand_text: Vec<&str> = candidate.iter().map(NormalizedSymbol::text).collect();
        pretty(&self.aligner.opcodes(&ref_text, &cand_text), &ref_text, &cand_text)
    }

    /// Compares one candidate page's tokens against the reference page's.
    pub fn compare_tokens(&self, reference: &[Token], candidate: &[Token]) -> PageDiff {
        let reference = self.normalizer.symbols(reference);
        let symbols = self.normalizer.symbols(candidate);
        self.diff_symbols(&reference, &symbols, candidate)
    }

    /// Compares the same page of every candidate against the reference page.
    ///
    /// Fails with [`Error::MalformedInput`] if any of the pages has tokens that
    /// cannot be mapped back to regions.
    pub fn compare_page(&self, page_index: usize, reference: &Page, candidates: &[&Page]) -> Result<Vec<PageDiff>> {
        validate_page(page_index, reference.extract_tokens())?;
        for page in candidates {
            validate_page(page_index, page.extract_tokens())?;
        }
        let reference = self.normalizer.symbols(reference.extract_tokens());
        Ok(candidates
            .iter()
            .map(|page| {
                let tokens = page.extract_tokens();
                self.diff_symbols(&reference, &self.normalizer.symbols(tokens), tokens)
            })
            .collect())
    }

    /// Compares every page the documents have in common, in parallel.
    ///
    /// Pages past the end of the shortest document are not compared. A page
    /// with malformed tokens is reported as skipped and the others still run.
    pub fn compare_documents(&self, reference: &Document, candidates: &[Document]) -> Comparison {
        let documents: Vec<&Document> = std::iter::once(reference).chain(candidates).collect();
        let page_counts: Vec<usize> = documents.iter().map(|d| d.page_count()).collect();
        let compared_pages = page_counts.iter().copied().min().unwrap_or(0);
        if page_counts.iter().any(|&count| count != compared_pages) {
            log::info!(
                "page counts differ {:?}; comparing the first {} pages only",
                page_counts,
                compared_pages
            );
        }

        let pages = (0..compared_pages)
            .into_par_iter()
            .map(|page_index| {
                let pages: Vec<&Page> = documents.iter().filter_map(|d| d.page(page_index)).collect();
                let result = match pages.split_first() {
                    Some((reference_page, candidate_pages)) if candidate_pages.len() == candidates.len() => {
                        self.compare_page(page_index, reference_page, candidate_pages)
                    }
                    _ => Err(Error::MalformedInput {
                        page: page_index,
                        reason: "page missing from a document".to_string(),
                    }),
                };
                match result {
                    Ok(diffs) => {
                        log::debug!(
                            "page {}: {} flagged",
                            page_index,
                            diffs.iter().map(|d| d.span.len()).sum::<usize>()
                        );
                        PageOutcome::Compared {
                            page_index,
                            candidates: diffs,
                        }
                    }
                    Err(err) => {
                        log::warn!("skipping page {}: {}", page_index, err);
                        PageOutcome::Skipped {
                            page_index,
                            reason: err.to_string(),
                        }
                    }
                }
            })
            .collect();

        Comparison {
            documents: documents.iter().map(|d| d.path.clone()).collect(),
            page_counts,
            compared_pages,
            pages,
        }
    }
}

/// One highlight layer per candidate, colored by candidate position.
pub fn annotate(comparison: &Comparison, candidate_count: usize, render: &RenderConfig) -> Result<Vec<HighlightLayer>> {
    let mut layers = vec![HighlightLayer::new(); candidate_count];
    for page in &comparison.pages {
        let PageOutcome::Compared { page_index, candidates } = page else {
            continue;
        };
        for (slot, (layer, diff)) in layers.iter_mut().zip(candidates).enumerate() {
            layer.annotate(*page_index, &diff.regions, render.color_for(slot), render.opacity)?;
        }
    }
    Ok(layers)
}

/// Reference page, then each highlighted candidate page, left to right, one
/// PNG per compared page.
fn render_pages(
    reference: &Document,
    candidates: &[Document],
    layers: &[HighlightLayer],
    comparison: &Comparison,
    render: &RenderConfig,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    comparison
        .pages
        .par_iter()
        .filter(|p| matches!(p, PageOutcome::Compared { .. }))
        .map(|outcome| -> Result<PathBuf> {
            let page_index = outcome.page_index();
            let missing = || Error::Render(format!("page {} vanished before rendering", page_index));
            let mut images = Vec::with_capacity(candidates.len() + 1);
            images.push(rasterize_page(reference.page(page_index).ok_or_else(missing)?, &[], render)?);
            for (document, layer) in candidates.iter().zip(layers) {
                let page = document.page(page_index).ok_or_else(missing)?;
                images.push(rasterize_page(page, layer.page(page_index), render)?);
            }
            let combined = compose_side_by_side(&images)?;
            let path = output_dir.join(format!("page_{:04}.png", page_index + 1));
            save_png(&combined, &path)?;
            Ok(path)
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    #[serde(flatten)]
    comparison: &'a Comparison,
    /// Highlight color of each candidate
    colors: Vec<Color>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub report: PathBuf,
    pub images: Vec<PathBuf>,
    pub compared_pages: usize,
    pub skipped_pages: usize,
    pub flagged_tokens: usize,
}

/// Loads `path`, attributing a failure to the load stage.
pub fn load_document(loader: &dyn DocumentLoader, path: &Path) -> Result<Document> {
    loader.load(path).map_err(|source| Error::Load {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads every document of `job`, compares, annotates and writes the report
/// and the composed page images into `job.output_dir`.
pub fn run(job: &ComparisonJob, loader: &dyn DocumentLoader, settings: &Settings) -> Result<RunSummary> {
    settings.render.validate()?;
    let reference = load_document(loader, &job.reference)?;
    let candidates = job
        .candidates
        .iter()
        .map(|path| load_document(loader, path))
        .collect::<Result<Vec<_>>>()?;

    let comparison = Comparator::new(&settings.diff).compare_documents(&reference, &candidates);
    let layers = annotate(&comparison, candidates.len(), &settings.render)?;

    let output_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| Error::Output { path, source }
    };
    fs::create_dir_all(&job.output_dir).map_err(output_error(&job.output_dir))?;
    let images = if settings.render.enabled {
        render_pages(&reference, &candidates, &layers, &comparison, &settings.render, &job.output_dir)?
    } else {
        Vec::new()
    };

    let report = Report {
        comparison: &comparison,
        colors: (0..candidates.len()).map(|slot| settings.render.color_for(slot)).collect(),
    };
    let report_path = job.output_dir.join(REPORT_FILE);
    fs::write(&report_path, serde_json::to_string_pretty(&report)?).map_err(output_error(&report_path))?;
    log::info!(
        "compared {} pages ({} skipped), {} flagged tokens",
        comparison.compared_pages,
        comparison.skipped_pages(),
        comparison.flagged_tokens()
    );

    Ok(RunSummary {
        report: report_path,
        images,
        compared_pages: comparison.compared_pages,
        skipped_pages: comparison.skipped_pages(),
        flagged_tokens: comparison.flagged_tokens(),
    })
}
