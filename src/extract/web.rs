use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::ClientBuilder;
use scraper::{Html, Node, Selector};
use url::Url;

use crate::error::{AppError, Result};
use super::{Document, Extractor};

// Browser-like agent; some sites reject obvious non-browser clients.
const USER_AGENT: &str = "Mozilla/5.0";

// Create static selectors to avoid recompiling them each time
static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("body").expect("Failed to parse body selector")
});

/// Extracts plain text from an arbitrary web page.
pub struct WebPageExtractor {
    timeout: Duration,
    accept_invalid_certs: bool,
}

impl WebPageExtractor {
    pub fn new(timeout: Duration, accept_invalid_certs: bool) -> Self {
        WebPageExtractor {
            timeout,
            accept_invalid_certs,
        }
    }

    async fn fetch_html(&self, url: &Url) -> Result<String> {
        let client = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .timeout(self.timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()
            .map_err(|e| AppError::Extraction(format!("Failed to build HTTP client: {}", e)))?;

        let response = client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| AppError::Extraction(format!("Failed to fetch {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Extraction(format!("HTTP {} from {}", status, url)));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::Extraction(format!("Failed to read body from {}: {}", url, e)))
    }
}

#[async_trait]
impl Extractor for WebPageExtractor {
    async fn extract(&self, url: &Url) -> Result<Vec<Document>> {
        let html = self.fetch_html(url).await?;

        let text = html_to_text(&html);
        if text.is_empty() {
            return Err(AppError::Extraction(format!(
                "No readable text found at {}",
                url
            )));
        }

        let metadata = HashMap::from([("source".to_string(), url.to_string())]);
        Ok(vec![Document::with_metadata(text, metadata)])
    }
}

/// Strip markup from an HTML document, returning whitespace-normalized text.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let Some(body) = document.select(&BODY_SELECTOR).next() else {
        return String::new();
    };

    let mut result = String::with_capacity(html.len() / 4);
    for node in body.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        // Script and style bodies are text nodes too; skip them.
        let in_skipped_subtree = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .map_or(false, |el| matches!(el.name(), "script" | "style" | "noscript"))
        });
        if in_skipped_subtree {
            continue;
        }
        let trimmed = text.text.trim();
        if !trimmed.is_empty() {
            if !result.is_empty() {
                result.push('\n');
            }
            result.push_str(trimmed);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_body_text() {
        let html = "<html><head><title>t</title></head><body><p>Hello world.</p></body></html>";
        assert_eq!(html_to_text(html), "Hello world.");
    }

    #[test]
    fn skips_script_and_style_content() {
        let html = "<html><body><script>var x = 1;</script><style>p{}</style><p>Visible</p></body></html>";
        assert_eq!(html_to_text(html), "Visible");
    }

    #[test]
    fn normalizes_whitespace_across_elements() {
        let html = "<html><body><h1>  Title </h1>\n\n  <p> One </p><p>Two</p></body></html>";
        assert_eq!(html_to_text(html), "Title\nOne\nTwo");
    }

    #[test]
    fn empty_body_yields_empty_string() {
        assert_eq!(html_to_text("<html><body>   </body></html>"), "");
    }
}
