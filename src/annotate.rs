//! Marking changed regions on candidate pages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Region;

/// RGB color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const RED: Color = Color::new(1., 0., 0.);
    pub const GREEN: Color = Color::new(0., 1., 0.);
    pub const BLUE: Color = Color::new(0., 0., 1.);
    pub const MAGENTA: Color = Color::new(1., 0., 1.);
    pub const CYAN: Color = Color::new(0., 1., 1.);
    pub const YELLOW: Color = Color::new(1., 1., 0.);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn is_valid(&self) -> bool {
        [self.r, self.g, self.b].iter().all(|c| (0.0..=1.0).contains(c))
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        [self.r, self.g, self.b].map(|c| (c.clamp(0., 1.) * 255.).round() as u8)
    }
}

/// Default highlight colors, one per candidate, reused in order when there
/// are more candidates than colors.
pub fn default_palette() -> Vec<Color> {
    vec![
        Color::RED,
        Color::GREEN,
        Color::BLUE,
        Color::MAGENTA,
        Color::CYAN,
        Color::YELLOW,
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub region: Region,
    pub color: Color,
    pub opacity: f32,
}

/// Receives the regions to mark on a page.
pub trait Annotator {
    fn annotate(&mut self, page_index: usize, regions: &[Region], color: Color, opacity: f32) -> Result<()>;
}

/// In-memory highlights for one document, keyed by page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HighlightLayer {
    pages: BTreeMap<usize, Vec<Highlight>>,
}

impl HighlightLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self, page_index: usize) -> &[Highlight] {
        self.pages.get(&page_index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.pages.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Annotator for HighlightLayer {
    fn annotate(&mut self, page_index: usize, regions: &[Region], color: Color, opacity: f32) -> Result<()> {
        if !color.is_valid() {
            return Err(Error::Annotate(format!("color {:?} has a channel outside [0, 1]", color)));
        }
        if !(0.0..=1.0).contains(&opacity) {
            return Err(Error::Annotate(format!("opacity {} is outside [0, 1]", opacity)));
        }
        if regions.is_empty() {
            return Ok(());
        }
        let highlights = self.pages.entry(page_index).or_default();
        highlights.extend(regions.iter().map(|&region| Highlight { region, color, opacity }));
        log::debug!("page {}: {} highlights", page_index, highlights.len());
        Ok(())
    }
}
