use axum::{
    routing::post,
    Router,
    extract::{Json, State},
};
use tower_http::cors::{CorsLayer, Any};
use chrono::Utc;
use std::time::Duration;

use crate::api::models::{SummarizeRequest, SummarizeResponse};
use crate::error::{AppError, Result};
use crate::pipeline::{Pipeline, Request};
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/summarize", post(summarize_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

/// Failures render through `AppError::into_response`, which carries the
/// status mapping and the `{ "error": ... }` body.
async fn summarize_handler(
    State(state): State<AppState>,
    Json(req): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>> {
    tracing::info!(url = %req.url, "processing summarize request");
    let start = std::time::Instant::now();

    // Fresh pipeline and clients per request; the only shared state is config.
    let pipeline = Pipeline::from_config(&state.config);
    let request = Request {
        url: req.url.clone(),
        credential: req.api_key,
    };

    // Overall ceiling above the per-stage bounds so a response always goes out.
    let overall = state.config.fetch_timeout + state.config.llm_timeout + Duration::from_secs(5);
    let result = tokio::time::timeout(overall, pipeline.run(&request))
        .await
        .map_err(|_| {
            AppError::RemoteService(format!(
                "Request processing timed out after {}s",
                overall.as_secs()
            ))
        })?;

    tracing::info!(elapsed = ?start.elapsed(), "request finished");

    match result {
        Ok(summary) => {
            tracing::info!(url = %req.url, "summarization succeeded");
            Ok(Json(SummarizeResponse {
                url: req.url,
                summary: summary.text,
                source: summary.source.as_str().to_string(),
                summarized_at: Utc::now(),
            }))
        }
        Err(err) => {
            tracing::warn!(url = %req.url, error = %err, "summarization failed");
            Err(err)
        }
    }
}
