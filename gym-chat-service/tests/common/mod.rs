//! Shared setup for gym-chat-service integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use gym_chat_service::{
    config::{ChatConfig, GoogleConfig, GymChatConfig},
    models::GymData,
    services::{
        metrics,
        providers::{mock::MockTextProvider, TextProvider},
        ConversationStore, GymChatbot,
    },
    startup::{build_router, AppState},
};
use http_body_util::BodyExt;
use secrecy::Secret;
use service_core::config::Config;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub fn test_config(conversations_dir: PathBuf) -> GymChatConfig {
    GymChatConfig {
        common: Config {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        google: GoogleConfig {
            api_key: Secret::new("test-api-key".to_string()),
            model: "mock-model".to_string(),
            api_base: "http://127.0.0.1:9".to_string(),
            timeout_secs: 5,
        },
        chat: ChatConfig {
            history_window: 3,
            max_history: None,
            conversations_dir,
        },
        gym_data_path: None,
        otlp_endpoint: None,
    }
}

/// Router over a mock model provider and a throwaway conversations directory.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub provider: Arc<MockTextProvider>,
    pub conversations_dir: PathBuf,
    _dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_provider(MockTextProvider::new("Stay hydrated and keep training!"))
    }

    pub fn failing(message: &str) -> Self {
        Self::with_provider(MockTextProvider::failing(message))
    }

    pub fn with_provider(provider: MockTextProvider) -> Self {
        metrics::init_metrics().expect("Failed to initialize metrics");

        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        // Not created up front: handlers must create it on demand.
        let conversations_dir = dir.path().join("conversations");
        let config = test_config(conversations_dir.clone());

        let provider = Arc::new(provider);
        let dyn_provider: Arc<dyn TextProvider> = provider.clone();
        let chatbot = GymChatbot::new(
            Arc::new(GymData::default()),
            Arc::new(ConversationStore::new()),
            dyn_provider,
        )
        .with_history_window(config.chat.history_window);

        let state = AppState {
            config,
            chatbot: Arc::new(chatbot),
        };

        Self {
            router: build_router(state.clone()),
            state,
            provider,
            conversations_dir,
            _dir: dir,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn post_json(&self, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_empty(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn chat(&self, message: &str) -> (StatusCode, serde_json::Value) {
        let body = serde_json::json!({ "message": message }).to_string();
        self.post_json("/chat", &body).await
    }

    pub async fn raw(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let (status, text) = self.raw(request).await;
        let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    pub fn history_len(&self) -> usize {
        self.state.chatbot.store().len().unwrap()
    }
}
