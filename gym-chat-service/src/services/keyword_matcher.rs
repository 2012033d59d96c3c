//! Keyword matching of free-text questions against gym reference sections.
//!
//! The rules are a flat, ordered table. Every rule whose keywords appear in the
//! lower-cased query contributes its whole section; rules are not exclusive,
//! so "what time do classes start" pulls in both the schedule and the hours.

use crate::models::GymData;

/// A block of reference data that can be spliced into a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Membership,
    Schedule,
    Hours,
    Equipment,
}

/// Ordered (keywords, section) rules. Matching is by substring.
pub const KEYWORD_RULES: &[(&[&str], Section)] = &[
    (&["membership", "plan", "price", "cost"], Section::Membership),
    (&["schedule", "class", "time", "when"], Section::Schedule),
    (&["hours", "open", "close", "time"], Section::Hours),
    (&["equipment", "machine", "weights"], Section::Equipment),
];

/// Sections whose keywords occur in `query`, in rule order.
pub fn match_sections(query: &str) -> Vec<Section> {
    let query = query.to_lowercase();
    KEYWORD_RULES
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|k| query.contains(k)))
        .map(|(_, section)| *section)
        .collect()
}

/// Context snippet for `query`: every matched section rendered in full, or an
/// empty string when nothing matches.
pub fn format_gym_info(query: &str, data: &GymData) -> String {
    match_sections(query)
        .into_iter()
        .map(|section| section.render(data))
        .collect()
}

impl Section {
    pub fn render(self, data: &GymData) -> String {
        let mut out = String::new();
        match self {
            Section::Membership => {
                out.push_str("\n**MEMBERSHIP PLANS:**\n");
                for (name, plan) in data.membership_plans.iter() {
                    out.push_str(&format!("• {}: {}\n", title_case(name), plan.price));
                    for benefit in &plan.benefits {
                        out.push_str(&format!("  - {}\n", benefit));
                    }
                }
            }
            Section::Schedule => {
                out.push_str("\n**CLASS SCHEDULE:**\n");
                for (day, classes) in data.class_schedule.iter() {
                    out.push_str(&format!("• {}: {}\n", title_case(day), classes.join(", ")));
                }
            }
            Section::Hours => {
                out.push_str("\n**GYM HOURS:**\n");
                out.push_str(&format!("• Weekdays: {}\n", data.gym_hours.weekdays));
                out.push_str(&format!("• Weekends: {}\n", data.gym_hours.weekends));
            }
            Section::Equipment => {
                out.push_str("\n**AVAILABLE EQUIPMENT:**\n");
                out.push_str("• ");
                out.push_str(&data.equipment.join("\n• "));
            }
        }
        out
    }
}

/// Upper-case the first letter of each word and lower-case the rest,
/// e.g. "premium" -> "Premium", "open gym" -> "Open Gym".
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
