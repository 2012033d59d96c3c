//! The chat pipeline: match context, compose prompt, call the model, record the turn.

use crate::models::{ConversationTurn, GymData};
use crate::services::conversation_store::{ConversationStore, StoreError};
use crate::services::keyword_matcher::format_gym_info;
use crate::services::metrics;
use crate::services::prompt::compose_prompt;
use crate::services::providers::{ProviderError, TextProvider};
use std::sync::Arc;
use std::time::Instant;

/// Default number of prior turns included in each prompt.
pub const DEFAULT_HISTORY_WINDOW: usize = 3;

/// Gym assistant: owns the reference data, the conversation history and the
/// model provider.
pub struct GymChatbot {
    gym_data: Arc<GymData>,
    store: Arc<ConversationStore>,
    provider: Arc<dyn TextProvider>,
    history_window: usize,
}

impl GymChatbot {
    pub fn new(
        gym_data: Arc<GymData>,
        store: Arc<ConversationStore>,
        provider: Arc<dyn TextProvider>,
    ) -> Self {
        Self {
            gym_data,
            store,
            provider,
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }

    pub fn with_history_window(mut self, history_window: usize) -> Self {
        self.history_window = history_window;
        self
    }

    pub fn gym_data(&self) -> &GymData {
        &self.gym_data
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn provider(&self) -> &dyn TextProvider {
        self.provider.as_ref()
    }

    /// Answer `user_message` and record the exchange.
    ///
    /// A model failure is not an error here: the caller gets an apology
    /// string and nothing is appended. Only a broken history store fails.
    pub async fn get_response(&self, user_message: &str) -> Result<String, StoreError> {
        let gym_info = format_gym_info(user_message, &self.gym_data);
        let history = self.store.last(self.history_window)?;
        let prompt = compose_prompt(&gym_info, &history, user_message);

        let provider = self.provider.name();
        let model = self.provider.model().to_string();
        let start = Instant::now();

        match self.provider.generate(&prompt).await {
            Ok(response) => {
                metrics::record_genai_request(
                    provider,
                    &model,
                    "success",
                    start.elapsed().as_secs_f64(),
                );
                metrics::record_tokens(&model, response.input_tokens, response.output_tokens);

                tracing::info!(
                    provider = %provider,
                    model = %model,
                    context_len = gym_info.len(),
                    history_turns = history.len(),
                    input_tokens = response.input_tokens,
                    output_tokens = response.output_tokens,
                    finish_reason = response.finish_reason.as_str(),
                    "Model response received"
                );

                self.store
                    .append(ConversationTurn::new(user_message, response.text.clone()))?;
                metrics::set_conversation_turns(self.store.len()?);

                Ok(response.text)
            }
            Err(e) => {
                metrics::record_genai_request(
                    provider,
                    &model,
                    "error",
                    start.elapsed().as_secs_f64(),
                );
                metrics::record_provider_error(provider, e.error_type());

                tracing::warn!(
                    provider = %provider,
                    model = %model,
                    error = %e,
                    "Model call failed, replying with apology"
                );

                Ok(apology(&e))
            }
        }
    }
}

/// Reply text used when the model call fails.
pub fn apology(error: &ProviderError) -> String {
    format!("Sorry, I encountered an error: {}", error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::mock::MockTextProvider;

    fn chatbot(provider: Arc<MockTextProvider>) -> GymChatbot {
        GymChatbot::new(
            Arc::new(GymData::default()),
            Arc::new(ConversationStore::new()),
            provider,
        )
    }

    #[tokio::test]
    async fn test_success_appends_turn() {
        let provider = Arc::new(MockTextProvider::new("Lift with your legs."));
        let bot = chatbot(provider.clone());

        let reply = bot.get_response("How do I deadlift?").await.unwrap();
        assert_eq!(reply, "Lift with your legs.");

        let history = bot.store().all().unwrap();
        assert_eq!(
            history,
            vec![ConversationTurn::new("How do I deadlift?", "Lift with your legs.")]
        );
    }

    #[tokio::test]
    async fn test_failure_returns_apology_without_append() {
        let provider = Arc::new(MockTextProvider::failing("quota exhausted"));
        let bot = chatbot(provider);

        let reply = bot.get_response("Hello").await.unwrap();
        assert_eq!(reply, "Sorry, I encountered an error: API error: quota exhausted");
        assert!(bot.store().is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_prompt_uses_last_three_turns() {
        let provider = Arc::new(MockTextProvider::new("ok"));
        let bot = chatbot(provider.clone());

        for label in ["A", "B", "C", "D"] {
            bot.store()
                .append(ConversationTurn::new(format!("msg {}", label), "ok"))
                .unwrap();
        }
        bot.get_response("next").await.unwrap();

        let prompt = provider.last_prompt().unwrap();
        assert!(!prompt.contains("msg A"));
        let b = prompt.find("User: msg B").unwrap();
        let c = prompt.find("User: msg C").unwrap();
        let d = prompt.find("User: msg D").unwrap();
        assert!(b < c && c < d);
    }

    #[tokio::test]
    async fn test_prompt_includes_matched_context() {
        let provider = Arc::new(MockTextProvider::new("ok"));
        let bot = chatbot(provider.clone());

        bot.get_response("How much does membership cost?")
            .await
            .unwrap();

        let prompt = provider.last_prompt().unwrap();
        assert!(prompt.contains("**MEMBERSHIP PLANS:**"));
        assert!(prompt.contains("• Elite: $79.99/month"));
        assert!(prompt.contains("No previous conversation."));
    }

    #[tokio::test]
    async fn test_custom_history_window() {
        let provider = Arc::new(MockTextProvider::new("ok"));
        let bot = chatbot(provider.clone()).with_history_window(1);

        bot.store()
            .append(ConversationTurn::new("older", "ok"))
            .unwrap();
        bot.store()
            .append(ConversationTurn::new("newer", "ok"))
            .unwrap();
        bot.get_response("next").await.unwrap();

        let prompt = provider.last_prompt().unwrap();
        assert!(prompt.contains("User: newer"));
        assert!(!prompt.contains("User: older"));
    }
}
