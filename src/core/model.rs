//! # Data Model
//!
//! ```text
//! CompanyData
//! ├── company_id, name
//! └── users: Vec<UserChatHistory>
//!     ├── user_id, name
//!     └── messages: Vec<Message>   // append-only, chronological
//! ```
//!
//! Ids are only unique within their parent collection. Each parent hands out
//! child ids from its own monotonic counter (see [`next_child_id`]), so a new
//! id never collides with an existing sibling even if the collection was
//! loaded with gaps.
//!
//! Field names serialize in camelCase (`companyId`, `isQuery`, ...) so seed
//! files written for the web front-end load unchanged.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub content: String,
    /// `true` for user-submitted messages, `false` for replies.
    pub is_query: bool,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn query(id: String, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            content: content.into(),
            is_query: true,
            timestamp,
        }
    }

    pub fn reply(id: String, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            content: content.into(),
            is_query: false,
            timestamp,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserChatHistory {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Next message id to hand out. 0 = not primed yet.
    #[serde(skip)]
    next_message_id: u64,
}

impl UserChatHistory {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_messages(user_id, name, Vec::new())
    }

    pub fn with_messages(
        user_id: impl Into<String>,
        name: impl Into<String>,
        messages: Vec<Message>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            messages,
            next_message_id: 0,
        }
    }

    /// Allocates the id for the next appended message.
    pub(crate) fn next_message_id(&mut self) -> String {
        let ids: Vec<&str> = self.messages.iter().map(|m| m.id.as_str()).collect();
        next_child_id(&mut self.next_message_id, &ids)
    }

    pub fn message_count_label(&self) -> String {
        match self.messages.len() {
            1 => "1 message".to_string(),
            n => format!("{n} messages"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompanyData {
    pub company_id: String,
    pub name: String,
    #[serde(default)]
    pub users: Vec<UserChatHistory>,
    #[serde(skip)]
    next_user_id: u64,
}

impl CompanyData {
    pub fn new(
        company_id: impl Into<String>,
        name: impl Into<String>,
        users: Vec<UserChatHistory>,
    ) -> Self {
        Self {
            company_id: company_id.into(),
            name: name.into(),
            users,
            next_user_id: 0,
        }
    }

    pub fn user(&self, user_id: &str) -> Option<&UserChatHistory> {
        self.users.iter().find(|u| u.user_id == user_id)
    }

    pub(crate) fn user_mut(&mut self, user_id: &str) -> Option<&mut UserChatHistory> {
        self.users.iter_mut().find(|u| u.user_id == user_id)
    }

    /// Allocates the id for the next added user.
    pub(crate) fn next_user_id(&mut self) -> String {
        let ids: Vec<&str> = self.users.iter().map(|u| u.user_id.as_str()).collect();
        next_child_id(&mut self.next_user_id, &ids)
    }
}

/// Hands out the next child id from `counter` (0 = not primed yet).
///
/// The counter is primed one past both the child count and the largest
/// numeric child id, so densely numbered children continue at `len + 1`.
/// Once the counter reaches `u64::MAX` and that id is taken, the lowest free
/// number is used instead.
fn next_child_id(counter: &mut u64, existing: &[&str]) -> String {
    let taken = |n: u64| existing.iter().any(|id| id.parse::<u64>() == Ok(n));

    if *counter == 0 {
        let max_numeric = existing
            .iter()
            .filter_map(|id| id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        *counter = max_numeric.max(existing.len() as u64).saturating_add(1);
    }
    if taken(*counter) {
        // len + 1 candidates for len ids: one of them is free
        *counter = (1..=existing.len() as u64 + 1)
            .find(|n| !taken(*n))
            .unwrap_or(1);
    }

    let id = *counter;
    *counter = counter.saturating_add(1);
    id.to_string()
}

/// How the chat input accepts queries.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    #[default]
    Text,
    Audio,
}

impl InputMode {
    pub fn toggled(self) -> Self {
        match self {
            InputMode::Text => InputMode::Audio,
            InputMode::Audio => InputMode::Text,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InputMode::Text => "text",
            InputMode::Audio => "audio",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: &str) -> Message {
        Message::query(id.to_string(), "hi", Utc::now())
    }

    #[test]
    fn test_message_ids_continue_from_count() {
        let mut user = UserChatHistory::with_messages("1", "user 1", vec![msg("1"), msg("2")]);
        assert_eq!(user.next_message_id(), "3");
        assert_eq!(user.next_message_id(), "4");
    }

    #[test]
    fn test_message_ids_skip_past_gaps() {
        // Two messages, but one already uses id 7
        let mut user = UserChatHistory::with_messages("1", "user 1", vec![msg("1"), msg("7")]);
        assert_eq!(user.next_message_id(), "8");
    }

    #[test]
    fn test_message_ids_at_top_of_range_fall_back_to_free_ids() {
        let max = u64::MAX.to_string();
        let mut user = UserChatHistory::with_messages("1", "user 1", vec![msg(&max), msg("1")]);
        assert_eq!(user.next_message_id(), "2");
        user.messages.push(msg("2"));
        assert_eq!(user.next_message_id(), "3");
    }

    #[test]
    fn test_counter_reaching_max_reuses_lowest_free_id() {
        let below_max = (u64::MAX - 1).to_string();
        let mut company =
            CompanyData::new("1", "Company 1", vec![UserChatHistory::new(below_max, "a")]);
        assert_eq!(company.next_user_id(), u64::MAX.to_string());
        company.users.push(UserChatHistory::new(u64::MAX.to_string(), "b"));
        assert_eq!(company.next_user_id(), "1");
    }

    #[test]
    fn test_user_ids_ignore_non_numeric_ids() {
        let mut company = CompanyData::new(
            "1",
            "Company 1",
            vec![UserChatHistory::new("alpha", "a"), UserChatHistory::new("beta", "b")],
        );
        assert_eq!(company.next_user_id(), "3");
    }

    #[test]
    fn test_empty_company_starts_at_one() {
        let mut company = CompanyData::new("3", "Company 3", vec![]);
        assert_eq!(company.next_user_id(), "1");
    }

    #[test]
    fn test_message_count_label() {
        let mut user = UserChatHistory::new("1", "user 1");
        assert_eq!(user.message_count_label(), "0 messages");
        user.messages.push(msg("1"));
        assert_eq!(user.message_count_label(), "1 message");
        user.messages.push(msg("2"));
        assert_eq!(user.message_count_label(), "2 messages");
    }

    #[test]
    fn test_input_mode_toggles() {
        assert_eq!(InputMode::default(), InputMode::Text);
        assert_eq!(InputMode::Text.toggled(), InputMode::Audio);
        assert_eq!(InputMode::Audio.toggled(), InputMode::Text);
    }

    #[test]
    fn test_message_json_uses_camel_case() {
        let json = r#"{"id":"1","content":"hi","isQuery":true,"timestamp":"2023-06-15T10:30:00Z"}"#;
        let message: Message = serde_json::from_str(json).unwrap();
        assert!(message.is_query);
        assert_eq!(message.timestamp.to_rfc3339(), "2023-06-15T10:30:00+00:00");
    }
}
