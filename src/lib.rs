pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod llm;
pub mod pipeline;
pub mod source;

use std::sync::Arc;
use config::Config;

/// Application state that will be shared across handlers.
///
/// Holds configuration only; credentials arrive with each request and are
/// never stored here.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}
