use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// How a URL's content should be acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Video,
    GenericWeb,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Video => "video",
            SourceKind::GenericWeb => "web",
        }
    }
}

const VIDEO_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtu.be",
];

/// Classify a URL as a video-hosting link or a generic web page.
///
/// Pure and total: every parsed URL maps to exactly one variant.
pub fn classify(url: &Url) -> SourceKind {
    match url.host_str() {
        Some(host) if VIDEO_HOSTS.contains(&host.to_ascii_lowercase().as_str()) => {
            SourceKind::Video
        }
        _ => SourceKind::GenericWeb,
    }
}

// Compile the video-ID patterns once
static VIDEO_ID_REGEXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"youtube\.com/watch\?(?:[^#]*&)?v=([A-Za-z0-9_-]{11})",
        r"youtu\.be/([A-Za-z0-9_-]{11})",
        r"youtube\.com/embed/([A-Za-z0-9_-]{11})",
        r"youtube\.com/shorts/([A-Za-z0-9_-]{11})",
        r"youtube\.com/live/([A-Za-z0-9_-]{11})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Failed to compile video ID regex"))
    .collect()
});

/// Extract the 11-character video ID from the supported URL shapes.
pub fn video_id(url: &Url) -> Option<String> {
    let s = url.as_str();
    VIDEO_ID_REGEXES
        .iter()
        .find_map(|re| re.captures(s))
        .and_then(|caps| caps.get(1).map(|m| m.as_str().to_string()))
}
