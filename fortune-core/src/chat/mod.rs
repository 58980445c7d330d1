//! The two-persona conversation layer.
//!
//! Conversations belong to one of two agents: 小碧 (the fortune interpreter)
//! or 小娜 (the memory companion). Both share one persisted conversation
//! list; the manager in [`manager`] owns the lifecycle and the completion
//! round-trip.

mod manager;
mod prompts;

pub use manager::{ChatConfig, ChatManager, CompletionGateway};
pub use prompts::{
    compose_system_prompt, default_prompt, default_title, fallback_reply, fortune_context,
    greeting, is_default_title, memory_year_context, reset_prompt_override, set_prompt_override,
    stored_prompt, year_switch_notice,
};

use serde::{Deserialize, Serialize};

/// Message id reserved for the per-conversation greeting. Greetings are
/// display-only and are never sent to the model.
pub const GREETING_ID: &str = "welcome";

/// Which persona a conversation belongs to. Serialized as the original
/// lowercase tags so stored conversations round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Agent {
    Xiaobi,
    Xiaona,
}

impl Agent {
    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Agent::Xiaobi => "小碧",
            Agent::Xiaona => "小娜",
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Agent::Xiaobi => "xiaobi",
            Agent::Xiaona => "xiaona",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One chat bubble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
}

/// One conversation thread. Field names match the original persisted JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub agent: Agent,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: i64,
}

/// What a send attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The model answered and its reply was appended.
    Replied,
    /// The completion failed; the persona's canned apology was appended.
    Fallback,
    /// Nothing happened: blank input, no active conversation, or a send
    /// already in flight.
    Ignored,
}
