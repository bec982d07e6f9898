//! API server

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::assistant::Assistant;
use crate::chat::MessageStore;
use crate::knowledge::KnowledgeBase;
use crate::search::{HybridSearchEngine, SearchConfig};

use super::routes::{
    clear_messages, health_check, list_faq, list_messages, search_faq, search_stats, send_message,
    simulate, AppState,
};

/// Configuration for the API server
pub struct ApiServerConfig {
    pub host: String,
    pub port: u16,
    /// Load the embedding model at startup. Disable for keyword-only
    /// deployments (and tests) that must not download model files.
    pub semantic_search: bool,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("TALLYASSIST_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("TALLYASSIST_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            semantic_search: true,
        }
    }
}

/// API server
pub struct ApiServer {
    config: ApiServerConfig,
}

impl ApiServer {
    pub fn new(config: ApiServerConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self {
            config: ApiServerConfig::default(),
        }
    }

    /// Load the knowledge base, initialize the search engine, and serve.
    pub async fn start(self) -> Result<()> {
        let knowledge = KnowledgeBase::with_builtin()?;

        let mut engine = if self.config.semantic_search {
            HybridSearchEngine::with_default_model(SearchConfig::default()).await
        } else {
            HybridSearchEngine::new(SearchConfig::default())
        };
        engine.initialize(knowledge.load_all().to_vec()).await;

        let state = Arc::new(AppState {
            engine,
            knowledge,
            messages: RwLock::new(MessageStore::new()),
            assistant: Assistant::from_env(),
        });

        let app = router(state);

        let addr = format!("{}:{}", self.config.host, self.config.port);
        info!("starting API server on {addr}");

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Build the router. Split out so tests can serve a prepared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/messages",
            get(list_messages).post(send_message).delete(clear_messages),
        )
        .route("/api/faq", get(list_faq))
        .route("/api/faq/search", get(search_faq))
        .route("/api/simulate", post(simulate))
        .route("/api/search/stats", get(search_stats))
        .with_state(state)
        .layer(CorsLayer::permissive())
}
