pub mod chatbot;
pub mod conversation_store;
pub mod keyword_matcher;
pub mod metrics;
pub mod prompt;
pub mod providers;

pub use chatbot::GymChatbot;
pub use conversation_store::{ConversationStore, StoreError};
