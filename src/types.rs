use serde::{Deserialize, Serialize};

pub trait AlignmentScoring<T> {
    fn insert_score(&self, inserted: &T, previous_is_same: bool) -> f64;
    fn mutation_score(&self, left: &T, right: &T) -> f64;
}

/// Axis-aligned box on a page, in points, with the origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Region {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Finite coordinates, not inverted, and a non-zero extent on both axes.
    pub fn is_well_formed(&self) -> bool {
        [self.x0, self.y0, self.x1, self.y1]
            .iter()
            .all(|c| c.is_finite())
            && self.width() > 0.
            && self.height() > 0.
    }
}

impl From<[f32; 4]> for Region {
    fn from(bbox: [f32; 4]) -> Self {
        Region::new(bbox[0], bbox[1], bbox[2], bbox[3])
    }
}

/// A unit of extracted text and where it sits on its page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Raw text as extracted; `None` when the extractor produced no text
    pub text: Option<String>,
    pub region: Region,
    /// Zero-based page this token was extracted from
    pub page_index: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, region: Region, page_index: usize) -> Self {
        Self {
            text: Some(text.into()),
            region,
            page_index,
        }
    }

    /// A word the extractor located but could not read.
    pub fn without_text(region: Region, page_index: usize) -> Self {
        Self {
            text: None,
            region,
            page_index,
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Empty or whitespace-only text. A token without text is not whitespace.
    pub fn is_whitespace(&self) -> bool {
        self.text().is_some_and(|text| text.chars().all(char::is_whitespace))
    }
}

/// Comparison unit derived from a [`Token`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedSymbol {
    pub text: String,
    /// Position of the originating token in the page's unfiltered token list.
    pub token_index: usize,
}

impl NormalizedSymbol {
    pub fn text(&self) -> &str {
        &self.text
    }
}
