use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{NormalizedSymbol, Token};

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WhitespaceMode {
    /// Drop every whitespace character
    #[default]
    Remove,
    /// Replace each whitespace run with a single space and trim the ends
    Collapse,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    pub whitespace: WhitespaceMode,
    pub lowercase: bool,
    /// Drop everything that is not alphanumeric, `_` or whitespace
    pub strip_punctuation: bool,
}

#[derive(PartialEq, Debug)]
enum CharType {
    WhiteSpace,
    Word,
    Other,
}

fn char_type(c: char) -> CharType {
    if c.is_whitespace() {
        CharType::WhiteSpace
    } else if c.is_alphanumeric() || c == '_' {
        CharType::Word
    } else {
        CharType::Other
    }
}

/// Turns a page's tokens into the symbol stream the aligner compares.
///
/// One `Normalizer` is shared by every document of a comparison, so reference
/// and candidates always go through the same function.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizationConfig,
}

impl Normalizer {
    pub fn new(config: NormalizationConfig) -> Self {
        Self { config }
    }

    pub fn normalize(&self, text: &str) -> String {
        let mut out = if self.config.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        if self.config.strip_punctuation {
            out.retain(|c| char_type(c) != CharType::Other);
        }
        match self.config.whitespace {
            WhitespaceMode::Remove => WHITESPACE_RUN.replace_all(&out, "").into_owned(),
            WhitespaceMode::Collapse => WHITESPACE_RUN.replace_all(out.trim(), " ").into_owned(),
        }
    }

    /// Normalizes a page in token order.
    ///
    /// Whitespace-only tokens, and tokens that normalize to nothing, produce no
    /// symbol. Each symbol keeps the index of its token in `tokens`.
    pub fn symbols(&self, tokens: &[Token]) -> Vec<NormalizedSymbol> {
        tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| !token.is_whitespace())
            .filter_map(|(token_index, token)| {
                let text = self.normalize(token.text()?);
                if text.is_empty() {
                    None
                } else {
                    Some(NormalizedSymbol { text, token_index })
                }
            })
            .collect()
    }
}

/// Rejects a page whose tokens cannot be mapped back to regions.
///
/// Whitespace-only tokens are never compared or annotated, so their regions
/// are not checked.
pub fn validate_page(page_index: usize, tokens: &[Token]) -> Result<()> {
    for (i, token) in tokens.iter().enumerate() {
        if token.page_index != page_index {
            return Err(Error::MalformedInput {
                page: page_index,
                reason: format!(
                    "token {} claims page {} but was extracted from page {}",
                    i, token.page_index, page_index
                ),
            });
        }
        let Some(text) = token.text() else {
            return Err(Error::MalformedInput {
                page: page_index,
                reason: format!("token {} at {:?} has no text", i, token.region),
            });
        };
        if text.contains('\0') {
            return Err(Error::MalformedInput {
                page: page_index,
                reason: format!("token {} contains a NUL character", i),
            });
        }
        if !token.is_whitespace() && !token.region.is_well_formed() {
            return Err(Error::MalformedInput {
                page: page_index,
                reason: format!("token {} ({:?}) has region {:?}", i, text, token.region),
            });
        }
    }
    Ok(())
}
