//! Integration tests for history management and the reference-data endpoints.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::TestApp;

#[tokio::test]
async fn history_lists_turns_in_order() {
    let app = TestApp::new();
    app.chat("first question").await;
    app.chat("second question").await;

    let (status, body) = app.get("/history").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["count"], 2);
    assert_eq!(body["history"][0]["user"], "first question");
    assert_eq!(body["history"][1]["user"], "second question");
    assert_eq!(body["history"][1]["bot"], "Stay hydrated and keep training!");
}

#[tokio::test]
async fn clear_empties_history() {
    let app = TestApp::new();
    app.chat("hello").await;

    let (status, body) = app.post_empty("/clear").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Chat history cleared successfully");
    assert_eq!(body["status"], "success");

    let (_, body) = app.get("/history").await;
    assert_eq!(body["count"], 0);
    assert_eq!(body["history"], serde_json::json!([]));

    // Clearing an empty history is fine too.
    let (status, _) = app.post_empty("/clear").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn save_conversation_defaults_filename() {
    let app = TestApp::new();
    app.chat("hi").await;

    let (status, body) = app.post_empty("/save_conversation").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Conversation saved as gym_conversation.json");
    assert_eq!(body["status"], "success");

    let written =
        std::fs::read_to_string(app.conversations_dir.join("gym_conversation.json")).unwrap();
    assert_eq!(
        written,
        "[\n  {\n    \"user\": \"hi\",\n    \"bot\": \"Stay hydrated and keep training!\"\n  }\n]"
    );
}

#[tokio::test]
async fn save_conversation_with_filename_and_empty_object() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json("/save_conversation", r#"{"filename": "monday.json"}"#)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Conversation saved as monday.json");
    let written = std::fs::read_to_string(app.conversations_dir.join("monday.json")).unwrap();
    assert_eq!(written, "[]");

    let (status, body) = app.post_json("/save_conversation", "{}").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Conversation saved as gym_conversation.json");
}

#[tokio::test]
async fn save_conversation_overwrites_existing_file() {
    let app = TestApp::new();
    app.post_empty("/save_conversation").await;

    app.chat("later").await;
    app.post_empty("/save_conversation").await;

    let written =
        std::fs::read_to_string(app.conversations_dir.join("gym_conversation.json")).unwrap();
    let turns: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(turns.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn save_conversation_rejects_unsafe_filenames() {
    let app = TestApp::new();

    for filename in ["../escape.json", "nested/file.json", "..", ""] {
        let body = serde_json::json!({ "filename": filename }).to_string();
        let (status, body) = app.post_json("/save_conversation", &body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {:?}", filename);
        assert_eq!(body["status"], "error");
    }

    assert!(!app.conversations_dir.join("file.json").exists());
}

#[tokio::test]
async fn save_conversation_trims_filename() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json("/save_conversation", r#"{"filename": " spaced.json\n"}"#)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Conversation saved as spaced.json");
    assert!(app.conversations_dir.join("spaced.json").is_file());
    assert!(!app.conversations_dir.join(" spaced.json\n").exists());
}

#[tokio::test]
async fn save_conversation_write_failure_is_500() {
    let app = TestApp::new();
    app.chat("hello").await;
    // A directory where the file should go makes the write fail.
    std::fs::create_dir_all(app.conversations_dir.join("gym_conversation.json")).unwrap();

    let (status, body) = app.post_empty("/save_conversation").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    let error = body["error"].as_str().unwrap();
    assert!(
        error.starts_with("Error saving conversation:"),
        "unexpected error: {}",
        error
    );
    assert_eq!(app.history_len(), 1);
}

#[tokio::test]
async fn gym_data_is_stable_and_ordered() {
    let app = TestApp::new();

    let request = || {
        Request::builder()
            .uri("/gym_data")
            .body(Body::empty())
            .unwrap()
    };
    let (status, first) = app.raw(request()).await;
    let (_, second) = app.raw(request()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);

    // Keys keep their declared order rather than being sorted.
    let basic = first.find("\"basic\"").unwrap();
    let premium = first.find("\"premium\"").unwrap();
    let elite = first.find("\"elite\"").unwrap();
    assert!(basic < premium && premium < elite);

    let monday = first.find("\"monday\"").unwrap();
    let friday = first.find("\"friday\"").unwrap();
    assert!(monday < friday);

    let body: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["membership_plans"]["elite"]["price"], "$79.99/month");
    assert_eq!(body["data"]["gym_hours"]["weekdays"], "5:00 AM - 11:00 PM");
}

#[tokio::test]
async fn index_and_health() {
    let app = TestApp::new();

    let (status, body) = app.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Gym Chatbot API is running!");
    assert!(body["endpoints"].as_array().unwrap().len() >= 5);

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["message"], "Gym Chatbot API is running");
}

#[tokio::test]
async fn readiness_reflects_provider() {
    let app = TestApp::new();
    let (status, body) = app.get("/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["provider"], "mock");

    let app = TestApp::failing("no key");
    let (status, body) = app.get("/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn metrics_exposes_request_counters() {
    let app = TestApp::new();
    app.get("/health").await;

    let (status, text) = app
        .raw(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("http_requests_total"));
}
