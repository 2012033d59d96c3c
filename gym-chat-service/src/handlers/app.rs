use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use service_core::error::AppError;

use crate::models::GymData;
use crate::startup::AppState;

pub const SERVICE_BANNER: &str = "Gym Chatbot API is running!";

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub message: &'static str,
    pub endpoints: Vec<&'static str>,
}

pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: SERVICE_BANNER,
        endpoints: vec![
            "POST /chat - Send message to chatbot",
            "POST /clear - Clear chat history",
            "GET /history - Get chat history",
            "POST /save_conversation - Save chat history to a file",
            "GET /gym_data - Get gym reference data",
            "GET /health - Liveness probe",
            "GET /ready - Readiness probe",
            "GET /metrics - Prometheus metrics",
        ],
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Liveness probe: answers as long as the process serves HTTP.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        message: "Gym Chatbot API is running",
    })
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub provider: &'static str,
    pub model: String,
}

/// Readiness probe: the model provider must be configured and reachable.
pub async fn readiness_check(State(state): State<AppState>) -> Result<Json<ReadyResponse>, AppError> {
    let provider = state.chatbot.provider();

    provider.health_check().await.map_err(|e| {
        tracing::warn!(provider = provider.name(), error = %e, "Readiness check failed");
        AppError::ServiceUnavailable(format!("Model provider not ready: {}", e))
    })?;

    Ok(Json(ReadyResponse {
        status: "ready",
        provider: provider.name(),
        model: provider.model().to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct GymDataResponse<'a> {
    pub data: &'a GymData,
    pub status: &'static str,
}

/// The reference data exactly as loaded at startup, keys in stored order.
pub async fn gym_data(State(state): State<AppState>) -> Result<Response, AppError> {
    let body = serde_json::to_vec(&GymDataResponse {
        data: state.chatbot.gym_data(),
        status: "success",
    })
    .map_err(|e| AppError::InternalError(anyhow::anyhow!("Error getting gym data: {}", e)))?;

    Ok((
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        body,
    )
        .into_response())
}

pub async fn metrics() -> impl IntoResponse {
    crate::services::metrics::get_metrics()
}
