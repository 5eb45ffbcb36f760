//! mcg-api library interface
//!
//! Exposes the router, application state and the generation/Mochi components
//! for the binary and for integration testing.

pub mod api;
pub mod error;
pub mod generation;
pub mod mochi;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use mcg_common::config::ServiceConfig;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::generation::{FlashcardGenerator, ModelClient, OpenAiBackend, RetryPolicy};
use crate::mochi::MochiClient;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Generation pipeline
    pub generator: Arc<FlashcardGenerator>,
    /// Mochi proxy client
    pub mochi: Arc<MochiClient>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(generator: FlashcardGenerator, mochi: MochiClient) -> Self {
        Self {
            generator: Arc::new(generator),
            mochi: Arc::new(mochi),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Wire the production components from configuration
    pub fn from_config(config: &ServiceConfig) -> mcg_common::Result<Self> {
        let backend = OpenAiBackend::new(&config.openai)?;
        info!(model = backend.model(), "Generative backend configured");

        let client = ModelClient::new(
            Arc::new(backend),
            RetryPolicy::from_config(&config.generation),
        );
        let generator = FlashcardGenerator::from_config(client, &config.generation);

        let policy = generator.retry_policy();
        info!(
            max_attempts = policy.max_attempts,
            retry_delay_ms = policy.delay.as_millis() as u64,
            min_note_chars = generator.min_note_chars(),
            "Generation pipeline ready"
        );
        let mochi = MochiClient::new(&config.mochi)?;

        Ok(Self::new(generator, mochi))
    }

    /// Remember the most recent failure for `/health`
    pub async fn record_error(&self, message: impl Into<String>) {
        *self.last_error.write().await = Some(message.into());
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::ui_routes())
        .merge(api::generate_routes())
        .merge(api::mochi_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}
