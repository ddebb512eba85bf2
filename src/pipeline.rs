use std::time::Duration;

use tokio::time::timeout;
use url::Url;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::extract::{aggregate, Extractor, TranscriptExtractor, WebPageExtractor};
use crate::llm::{GroqClient, Summarizer};
use crate::source::{self, SourceKind};

/// One summarization request; discarded when the pipeline completes.
#[derive(Debug, Clone)]
pub struct Request {
    pub url: String,
    pub credential: String,
}

#[derive(Debug, Clone)]
pub struct SummaryResult {
    pub text: String,
    pub source: SourceKind,
}

/// Linear pipeline: validate → classify → extract → aggregate → summarize.
///
/// Generic over the extractor variants and the summarizer so tests can
/// substitute mocks. No stage retries; every failure is terminal for the
/// request.
pub struct Pipeline<V, W, S> {
    video: V,
    web: W,
    summarizer: S,
    fetch_timeout: Duration,
    llm_timeout: Duration,
}

impl Pipeline<TranscriptExtractor, WebPageExtractor, GroqClient> {
    /// Production wiring. Builds fresh extractors and a fresh LLM client;
    /// nothing here is shared across requests.
    pub fn from_config(config: &Config) -> Self {
        Pipeline::new(
            TranscriptExtractor::new(config.fetch_timeout),
            WebPageExtractor::new(config.fetch_timeout, config.danger_accept_invalid_certs),
            GroqClient::new(config.llm_timeout),
            config.fetch_timeout,
            config.llm_timeout,
        )
    }
}

impl<V, W, S> Pipeline<V, W, S>
where
    V: Extractor,
    W: Extractor,
    S: Summarizer,
{
    pub fn new(
        video: V,
        web: W,
        summarizer: S,
        fetch_timeout: Duration,
        llm_timeout: Duration,
    ) -> Self {
        Pipeline {
            video,
            web,
            summarizer,
            fetch_timeout,
            llm_timeout,
        }
    }

    pub async fn run(&self, request: &Request) -> Result<SummaryResult> {
        let url = validate(request)?;
        let kind = source::classify(&url);
        tracing::info!(url = %url, source = kind.as_str(), "extracting content");

        let documents = match kind {
            SourceKind::Video => self.extract_bounded(&self.video, &url).await?,
            SourceKind::GenericWeb => self.extract_bounded(&self.web, &url).await?,
        };

        let text = aggregate(&documents);
        if text.trim().is_empty() {
            return Err(AppError::Validation(
                "extracted content is empty, nothing to summarize".to_string(),
            ));
        }

        tracing::info!(chars = text.len(), "calling summarization model");
        let summary = timeout(
            self.llm_timeout,
            self.summarizer.summarize(&text, &request.credential),
        )
        .await
        .map_err(|_| {
            AppError::RemoteService(format!(
                "Model call timed out after {}s",
                self.llm_timeout.as_secs()
            ))
        })??;

        Ok(SummaryResult {
            text: summary,
            source: kind,
        })
    }

    async fn extract_bounded<E: Extractor>(
        &self,
        extractor: &E,
        url: &Url,
    ) -> Result<Vec<crate::extract::Document>> {
        timeout(self.fetch_timeout, extractor.extract(url))
            .await
            .map_err(|_| {
                AppError::Extraction(format!(
                    "Content fetch timed out after {}s",
                    self.fetch_timeout.as_secs()
                ))
            })?
    }
}

/// Reject bad input before any network I/O happens.
fn validate(request: &Request) -> Result<Url> {
    if request.credential.trim().is_empty() {
        return Err(AppError::Validation("missing API key".to_string()));
    }
    if request.url.trim().is_empty() {
        return Err(AppError::Validation("missing URL".to_string()));
    }
    let url = Url::parse(request.url.trim())
        .map_err(|_| AppError::Validation(format!("invalid URL: {}", request.url)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::Validation(format!(
            "invalid URL: unsupported scheme '{}'",
            url.scheme()
        )));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str, credential: &str) -> Request {
        Request {
            url: url.to_string(),
            credential: credential.to_string(),
        }
    }

    #[test]
    fn rejects_blank_credential() {
        let err = validate(&request("https://example.com", "")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("missing API key"));
    }

    #[test]
    fn rejects_blank_url() {
        let err = validate(&request("   ", "abc")).unwrap_err();
        assert!(err.to_string().contains("missing URL"));
    }

    #[test]
    fn rejects_malformed_url() {
        let err = validate(&request("not a url", "abc")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("invalid URL"));
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = validate(&request("ftp://example.com/file", "abc")).unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn accepts_valid_request() {
        let url = validate(&request("https://example.com/article", "abc")).unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
    }
}
