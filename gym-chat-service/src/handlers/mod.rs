//! HTTP handlers for the gym chat service.

pub mod app;
pub mod chat;

pub use app::{gym_data, health_check, index, metrics, readiness_check};
pub use chat::{chat, clear_chat, get_history, save_conversation};
