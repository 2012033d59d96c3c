//! Domain models for the gym chat service.

pub mod conversation;
pub mod gym_data;

pub use conversation::ConversationTurn;
pub use gym_data::{GymData, GymHours, MembershipPlan, OrderedMap};
