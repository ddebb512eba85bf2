use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Deserialize)]
pub struct SummarizeRequest {
    pub url: String,
    pub api_key: String,
}

#[derive(Serialize)]
pub struct SummarizeResponse {
    pub url: String,
    pub summary: String,
    /// "video" or "web", per the classifier.
    pub source: String,
    pub summarized_at: DateTime<Utc>,
}
