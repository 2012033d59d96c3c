//! Application startup and lifecycle management.

use crate::config::GymChatConfig;
use crate::handlers;
use crate::middleware::metrics_middleware;
use crate::models::GymData;
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::TextProvider;
use crate::services::{ConversationStore, GymChatbot};
use axum::{
    body::Body,
    http::Request,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: GymChatConfig,
    pub chatbot: Arc<GymChatbot>,
}

/// Assemble the HTTP surface around `state`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/chat", post(handlers::chat))
        .route("/clear", post(handlers::clear_chat))
        .route("/history", get(handlers::get_history))
        .route("/save_conversation", post(handlers::save_conversation))
        .route("/gym_data", get(handlers::gym_data))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                let request_id = req
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        // Browser front-ends are served from other origins.
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(config: GymChatConfig) -> Result<Self, AppError> {
        let provider = GeminiTextProvider::new(GeminiConfig {
            api_key: config.google.api_key.clone(),
            model: config.google.model.clone(),
            api_base: config.google.api_base.clone(),
            timeout: Duration::from_secs(config.google.timeout_secs),
        })
        .map_err(|e| {
            tracing::error!("Failed to initialize Gemini client: {}", e);
            AppError::ConfigError(anyhow::anyhow!("Gemini client: {}", e))
        })?;

        tracing::info!(
            model = %config.google.model,
            timeout_secs = config.google.timeout_secs,
            "Initialized Gemini text provider"
        );

        Self::build_with_provider(config, Arc::new(provider)).await
    }

    /// Build around an already constructed model provider.
    pub async fn build_with_provider(
        config: GymChatConfig,
        provider: Arc<dyn TextProvider>,
    ) -> Result<Self, AppError> {
        let gym_data = match &config.gym_data_path {
            Some(path) => {
                let data = GymData::load(path).map_err(|e| {
                    tracing::error!("Failed to load gym data from {}: {}", path.display(), e);
                    e
                })?;
                tracing::info!(path = %path.display(), "Loaded gym data");
                data
            }
            None => GymData::default(),
        };

        let store = match config.chat.max_history {
            Some(max) => ConversationStore::with_max_turns(max),
            None => ConversationStore::new(),
        };

        tokio::fs::create_dir_all(&config.chat.conversations_dir)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to create conversations directory {}: {}",
                    config.chat.conversations_dir.display(),
                    e
                );
                AppError::from(e)
            })?;

        let chatbot = GymChatbot::new(Arc::new(gym_data), Arc::new(store), provider)
            .with_history_window(config.chat.history_window);

        let state = AppState {
            config: config.clone(),
            chatbot: Arc::new(chatbot),
        };
        let router = build_router(state);

        let addr = config.common.address();
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping server");
}
