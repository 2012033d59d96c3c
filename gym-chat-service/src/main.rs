use gym_chat_service::config::GymChatConfig;
use gym_chat_service::services::metrics;
use gym_chat_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    // Loaded before tracing exists, so failures go to stderr through the returned error.
    let config = GymChatConfig::load()
        .map_err(|e| std::io::Error::other(format!("Configuration error: {}", e)))?;

    init_tracing(
        "gym-chat-service",
        "info",
        config.otlp_endpoint.as_deref(),
    )
    .map_err(|e| std::io::Error::other(format!("Tracing setup error: {:#}", e)))?;

    metrics::init_metrics().map_err(|e| {
        tracing::error!("Failed to initialize metrics: {}", e);
        std::io::Error::other(format!("Metrics error: {}", e))
    })?;

    tracing::info!(
        model = %config.google.model,
        history_window = config.chat.history_window,
        conversations_dir = %config.chat.conversations_dir.display(),
        "Starting gym-chat-service"
    );

    let application = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    application.run_until_stopped().await
}
