//! Configuration for comparisons and previews.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::alignment::{Aligner, Algorithm};
use crate::annotate::{default_palette, Color};
use crate::error::{Error, Result};
use crate::policy::SuppressionMode;
use crate::tokenizer::{NormalizationConfig, Normalizer};

/// Everything that decides which words count as different.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    pub normalization: NormalizationConfig,
    pub suppression: SuppressionMode,
    pub algorithm: Algorithm,
    /// Ignore symbols that are very common in long candidates when seeding
    /// matches. Off unless asked for: it hides changes among short common words.
    pub autojunk: bool,
}

impl DiffConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_normalization(mut self, normalization: NormalizationConfig) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn with_suppression(mut self, suppression: SuppressionMode) -> Self {
        self.suppression = suppression;
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_autojunk(mut self, autojunk: bool) -> Self {
        self.autojunk = autojunk;
        self
    }

    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.normalization.clone())
    }

    pub fn aligner(&self) -> Aligner {
        Aligner::new(self.algorithm, self.autojunk)
    }
}

/// Page preview settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Write composed page images next to the report
    pub enabled: bool,
    pub dpi: u32,
    pub opacity: f32,
    /// Highlight color per candidate, cycled
    pub palette: Vec<Color>,
    /// Outline every word box in gray
    pub outline_tokens: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dpi: 150,
            opacity: 0.4,
            palette: default_palette(),
            outline_tokens: true,
        }
    }
}

impl RenderConfig {
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Highlight color for the candidate at `slot` (zero-based).
    pub fn color_for(&self, slot: usize) -> Color {
        if self.palette.is_empty() {
            return Color::RED;
        }
        self.palette[slot % self.palette.len()]
    }

    pub fn validate(&self) -> Result<()> {
        if self.dpi == 0 || self.dpi > 1200 {
            return Err(Error::Config(format!("dpi must be in 1..=1200, got {}", self.dpi)));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(Error::Config(format!("opacity must be in [0, 1], got {}", self.opacity)));
        }
        if let Some(bad) = self.palette.iter().find(|c| !c.is_valid()) {
            return Err(Error::Config(format!("palette color {:?} is outside [0, 1]", bad)));
        }
        Ok(())
    }
}

/// Settings file contents, e.g. `pagediff.json`:
///
/// ```json
/// { "diff": { "suppression": "global", "normalization": { "lowercase": true } },
///   "render": { "dpi": 100 } }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub diff: DiffConfig,
    pub render: RenderConfig,
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let settings: Settings = serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        settings.render.validate()?;
        Ok(settings)
    }
}
