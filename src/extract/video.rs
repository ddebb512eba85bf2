use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;
use url::Url;

use crate::error::{AppError, Result};
use crate::source;
use super::{Document, Extractor};

const USER_AGENT: &str = "Mozilla/5.0";

static SEGMENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<text[^>]*>([^<]*)</text>").expect("Failed to compile segment regex")
});

/// One caption track entry from the watch page's player response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: Option<String>,
}

/// Fetches the caption transcript for a video URL.
///
/// Intentionally skips extended video metadata (title, author) for speed;
/// the transcript text is all the summarizer needs.
pub struct TranscriptExtractor {
    timeout: Duration,
}

impl TranscriptExtractor {
    pub fn new(timeout: Duration) -> Self {
        TranscriptExtractor { timeout }
    }

    fn client(&self) -> Result<Client> {
        ClientBuilder::new()
            .user_agent(USER_AGENT)
            .timeout(self.timeout)
            .build()
            .map_err(|e| AppError::Extraction(format!("Failed to build HTTP client: {}", e)))
    }

    async fn fetch_watch_page(&self, client: &Client, video_id: &str) -> Result<String> {
        let watch_url = format!("https://www.youtube.com/watch?v={}", video_id);
        let response = client
            .get(&watch_url)
            .send()
            .await
            .map_err(|e| AppError::Extraction(format!("Failed to fetch video page: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Extraction(format!(
                "HTTP {} fetching video page for {}",
                status, video_id
            )));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::Extraction(format!("Failed to read video page: {}", e)))
    }

    async fn fetch_track(&self, client: &Client, track: &CaptionTrack) -> Result<String> {
        let response = client
            .get(&track.base_url)
            .send()
            .await
            .map_err(|e| AppError::Extraction(format!("Failed to fetch transcript: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Extraction(format!(
                "HTTP {} fetching transcript",
                status
            )));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::Extraction(format!("Failed to read transcript: {}", e)))
    }
}

#[async_trait]
impl Extractor for TranscriptExtractor {
    async fn extract(&self, url: &Url) -> Result<Vec<Document>> {
        let video_id = source::video_id(url).ok_or_else(|| {
            AppError::Extraction(format!("Could not parse a video ID from {}", url))
        })?;

        let client = self.client()?;
        let page = self.fetch_watch_page(&client, &video_id).await?;

        let tracks = caption_tracks(&page)?;
        let track = pick_track(&tracks).ok_or_else(|| {
            AppError::Extraction(format!(
                "No transcript available for video {} (video may be private or uncaptioned)",
                video_id
            ))
        })?;

        let xml = self.fetch_track(&client, track).await?;
        let text = transcript_text(&xml);
        if text.is_empty() {
            return Err(AppError::Extraction(format!(
                "Transcript for video {} is empty",
                video_id
            )));
        }

        let mut metadata = HashMap::from([("video_id".to_string(), video_id)]);
        if let Some(lang) = &track.language_code {
            metadata.insert("language".to_string(), lang.clone());
        }

        Ok(vec![Document::with_metadata(text, metadata)])
    }
}

/// Locate and deserialize the `captionTracks` array embedded in the watch
/// page's player response. Absence means the video has no captions (or is
/// private/unavailable).
fn caption_tracks(page: &str) -> Result<Vec<CaptionTrack>> {
    let Some(raw) = json_array_after(page, "\"captionTracks\":") else {
        return Ok(Vec::new());
    };
    serde_json::from_str(raw)
        .map_err(|e| AppError::Extraction(format!("Failed to parse caption track list: {}", e)))
}

/// Prefer an English track, else the first one listed.
fn pick_track(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
    tracks
        .iter()
        .find(|t| {
            t.language_code
                .as_deref()
                .map_or(false, |lang| lang.starts_with("en"))
        })
        .or_else(|| tracks.first())
}

/// Return the balanced JSON array that follows `key` in `source`.
fn json_array_after<'a>(source: &'a str, key: &str) -> Option<&'a str> {
    let rest = &source[source.find(key)? + key.len()..];
    let start = rest.find('[')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, b) in rest.bytes().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&rest[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Flatten a timedtext XML document into plain text.
fn transcript_text(xml: &str) -> String {
    let segments: Vec<String> = SEGMENT_REGEX
        .captures_iter(xml)
        .map(|caps| decode_entities(caps[1].trim()))
        .filter(|s| !s.is_empty())
        .collect();
    segments.join(" ")
}

// Timedtext escapes a small fixed set; `&amp;` first so double-escaped
// sequences resolve in one pass.
fn decode_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_caption_tracks_from_player_response() {
        let page = r#"... "captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=en","languageCode":"en","kind":"asr"},{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=de","languageCode":"de"}]}} ..."#;
        let tracks = caption_tracks(page).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].language_code.as_deref(), Some("en"));
        assert_eq!(
            tracks[0].base_url,
            "https://www.youtube.com/api/timedtext?v=abc&lang=en"
        );
    }

    #[test]
    fn no_caption_tracks_yields_empty_list() {
        let tracks = caption_tracks("<html>no captions here</html>").unwrap();
        assert!(tracks.is_empty());
    }

    #[test]
    fn prefers_english_track() {
        let tracks = vec![
            CaptionTrack {
                base_url: "de".into(),
                language_code: Some("de".into()),
            },
            CaptionTrack {
                base_url: "en".into(),
                language_code: Some("en-US".into()),
            },
        ];
        assert_eq!(pick_track(&tracks).unwrap().base_url, "en");
    }

    #[test]
    fn falls_back_to_first_track() {
        let tracks = vec![CaptionTrack {
            base_url: "fr".into(),
            language_code: Some("fr".into()),
        }];
        assert_eq!(pick_track(&tracks).unwrap().base_url, "fr");
    }

    #[test]
    fn json_array_scan_handles_brackets_in_strings() {
        let s = r#"{"key":[{"a":"val]ue"},{"b":2}],"next":1}"#;
        assert_eq!(
            json_array_after(s, "\"key\":"),
            Some(r#"[{"a":"val]ue"},{"b":2}]"#)
        );
    }

    #[test]
    fn flattens_timedtext_xml() {
        let xml = r#"<?xml version="1.0"?><transcript><text start="0" dur="2.1">Hello</text><text start="2.1" dur="1.0">world &amp;#39;again&amp;#39;</text></transcript>"#;
        assert_eq!(transcript_text(xml), "Hello world 'again'");
    }

    #[test]
    fn empty_transcript_is_empty_string() {
        assert_eq!(transcript_text("<transcript></transcript>"), "");
    }
}
