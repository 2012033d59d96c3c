//! Prompt composition for the gym assistant.

use crate::models::ConversationTurn;

/// Persona and ground rules sent ahead of every question.
pub const GYM_PERSONA: &str = "\
You are a helpful gym assistant chatbot. You provide information about:
- Workout routines and exercises
- Gym equipment usage and safety
- Nutrition and diet advice
- Membership plans and gym services
- Class schedules and programs
- Fitness goals and training plans
- Injury prevention and recovery
- Gym etiquette and rules

Always be encouraging, professional, and safety-focused in your responses.
If asked about medical conditions, always recommend consulting healthcare professionals.";

/// Rendered in place of the history block before the first exchange.
pub const NO_HISTORY_PLACEHOLDER: &str = "No previous conversation.";

/// Render prior turns oldest first as `User:`/`Bot:` pairs separated by a blank line.
pub fn format_chat_history(turns: &[ConversationTurn]) -> String {
    if turns.is_empty() {
        return NO_HISTORY_PLACEHOLDER.to_string();
    }

    turns
        .iter()
        .map(|turn| format!("User: {}\nBot: {}\n\n", turn.user, turn.bot))
        .collect()
}

/// Build the full prompt from the matched context snippet, recent history
/// and the new user message.
pub fn compose_prompt(gym_info: &str, history: &[ConversationTurn], user_message: &str) -> String {
    format!(
        "{persona}\n\n\
         Gym Information Available:\n\
         {gym_info}\n\n\
         Chat History:\n\
         {history}\n\n\
         User Question: {user_message}\n\n\
         Please provide a helpful, accurate response about gym-related topics.\n\
         Use the gym information provided above when relevant.\n",
        persona = GYM_PERSONA,
        gym_info = gym_info,
        history = format_chat_history(history),
        user_message = user_message,
    )
}
