//! Documents as ordered pages of positioned words.
//!
//! Parsing and rendering real document formats is left to a [`DocumentLoader`].
//! [`JsonLoader`] reads the word dump such a renderer produces: one entry per
//! word with its bounding box, per page.
//!
//! ```json
//! { "pages": [ { "width": 612, "height": 792,
//!                "words": [ { "text": "Hello", "bbox": [72, 72, 101, 84] } ] } ] }
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::DocumentLoadError;
use crate::types::{Region, Token};

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub index: usize,
    /// Page size in points
    pub width: f32,
    pub height: f32,
    tokens: Vec<Token>,
}

impl Page {
    pub fn new(index: usize, width: f32, height: f32, tokens: Vec<Token>) -> Self {
        Self {
            index,
            width,
            height,
            tokens,
        }
    }

    /// Words of this page in extraction order.
    pub fn extract_tokens(&self) -> &[Token] {
        &self.tokens
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub path: PathBuf,
    pages: Vec<Page>,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, pages: Vec<Page>) -> Self {
        Self {
            path: path.into(),
            pages,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }
}

pub trait DocumentLoader: Sync {
    fn load(&self, path: &Path) -> Result<Document, DocumentLoadError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct WordDump {
    pages: Vec<PageDump>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PageDump {
    width: f32,
    height: f32,
    #[serde(default)]
    words: Vec<WordEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WordEntry {
    /// `null` when the extractor could not read the word
    text: Option<String>,
    /// `[x0, y0, x1, y1]`
    bbox: [f32; 4],
}

/// Loads JSON word dumps.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLoader;

impl JsonLoader {
    pub fn parse_str(&self, path: &Path, json: &str) -> Result<Document, DocumentLoadError> {
        into_document(path, serde_json::from_str(json)?)
    }
}

impl DocumentLoader for JsonLoader {
    fn load(&self, path: &Path) -> Result<Document, DocumentLoadError> {
        let reader = BufReader::new(File::open(path)?);
        into_document(path, serde_json::from_reader(reader)?)
    }
}

fn into_document(path: &Path, dump: WordDump) -> Result<Document, DocumentLoadError> {
    let mut pages = Vec::with_capacity(dump.pages.len());
    for (index, page) in dump.pages.into_iter().enumerate() {
        if !(page.width.is_finite() && page.height.is_finite() && page.width > 0. && page.height > 0.) {
            return Err(DocumentLoadError::Invalid(format!(
                "page {} has size {}x{}",
                index, page.width, page.height
            )));
        }
        let tokens = page
            .words
            .into_iter()
            .map(|word| match word.text {
                Some(text) => Token::new(text, Region::from(word.bbox), index),
                None => Token::without_text(Region::from(word.bbox), index),
            })
            .collect();
        pages.push(Page::new(index, page.width, page.height, tokens));
    }
    log::debug!("loaded {} ({} pages)", path.display(), pages.len());
    Ok(Document::new(path, pages))
}

/// Serializes a document back into the word dump format.
pub fn to_json(document: &Document) -> serde_json::Result<String> {
    let dump = WordDump {
        pages: document
            .pages()
            .iter()
            .map(|page| PageDump {
                width: page.width,
                height: page.height,
                words: page
                    .extract_tokens()
                    .iter()
                    .map(|token| WordEntry {
                        text: token.text.clone(),
                        bbox: [token.region.x0, token.region.y0, token.region.x1, token.region.y1],
                    })
                    .collect(),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&dump)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "pages": [
            { "width": 100, "height": 50,
              "words": [ { "text": "Hello", "bbox": [1, 2, 30, 12] },
                         { "text": "world", "bbox": [32, 2, 60, 12] } ] },
            { "width": 100, "height": 50 }
        ]
    }"#;

    #[test]
    fn test_parse_str() {
        let doc = JsonLoader.parse_str(Path::new("sample.json"), SAMPLE).unwrap();
        assert_eq!(doc.page_count(), 2);
        let first = doc.page(0).unwrap();
        assert_eq!(first.extract_tokens().len(), 2);
        assert_eq!(first.extract_tokens()[1].text(), Some("world"));
        assert_eq!(first.extract_tokens()[1].region, Region::new(32., 2., 60., 12.));
        let second = doc.page(1).unwrap();
        assert!(second.extract_tokens().is_empty());
        assert_eq!(second.index, 1);
    }

    #[test]
    fn test_tokens_carry_page_index() {
        let doc = JsonLoader.parse_str(Path::new("sample.json"), SAMPLE).unwrap();
        assert!(doc.page(0).unwrap().extract_tokens().iter().all(|t| t.page_index == 0));
    }

    #[test]
    fn test_null_text_is_kept_as_unreadable_word() {
        let json = r#"{ "pages": [ { "width": 100, "height": 50,
            "words": [ { "text": null, "bbox": [1, 2, 30, 12] }, { "text": "ok", "bbox": [32, 2, 60, 12] } ] } ] }"#;
        let doc = JsonLoader.parse_str(Path::new("null.json"), json).unwrap();
        let tokens = doc.page(0).unwrap().extract_tokens();
        assert_eq!(tokens[0].text(), None);
        assert_eq!(tokens[0].region, Region::new(1., 2., 30., 12.));
        assert_eq!(tokens[1].text(), Some("ok"));
        assert!(to_json(&doc).unwrap().contains("null"));
    }

    #[test]
    fn test_rejects_bad_page_size() {
        let json = r#"{ "pages": [ { "width": 0, "height": 50 } ] }"#;
        assert!(matches!(
            JsonLoader.parse_str(Path::new("bad.json"), json),
            Err(DocumentLoadError::Invalid(_))
        ));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            JsonLoader.parse_str(Path::new("bad.json"), "{ not json"),
            Err(DocumentLoadError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            JsonLoader.load(Path::new("/nonexistent/doc.json")),
            Err(DocumentLoadError::Io(_))
        ));
    }

    #[test]
    fn test_json_round_trip_keeps_tokens() {
        let doc = JsonLoader.parse_str(Path::new("sample.json"), SAMPLE).unwrap();
        let json = to_json(&doc).unwrap();
        let again = JsonLoader.parse_str(Path::new("sample.json"), &json).unwrap();
        assert_eq!(doc, again);
    }
}
