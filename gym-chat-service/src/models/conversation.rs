//! Conversation turn model.

use serde::{Deserialize, Serialize};

/// One user message paired with the assistant's reply.
///
/// Serialized as `{"user": "...", "bot": "..."}` in `/history` responses and
/// saved conversation files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub user: String,
    pub bot: String,
}

impl ConversationTurn {
    pub fn new(user: impl Into<String>, bot: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            bot: bot.into(),
        }
    }
}
