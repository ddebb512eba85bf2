pub mod video;
pub mod web;

use std::collections::HashMap;
use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use crate::error::Result;

pub use video::TranscriptExtractor;
pub use web::WebPageExtractor;

/// One unit of extracted text content from a source.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub content: String,
    pub metadata: Option<HashMap<String, String>>,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Document {
            content: content.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(content: impl Into<String>, metadata: HashMap<String, String>) -> Self {
        Document {
            content: content.into(),
            metadata: Some(metadata),
        }
    }
}

/// Capability: given a URL, return one or more text documents.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, url: &Url) -> Result<Vec<Document>>;
}

/// Join document contents in order with a blank-line separator.
///
/// An empty input yields an empty string; the orchestrator rejects that
/// before summarization.
pub fn aggregate(documents: &[Document]) -> String {
    documents
        .iter()
        .map(|d| d.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
