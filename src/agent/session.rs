//! Conversation session and its append-only transcript
//!
//! A [`Session`] is created when the UI starts, handed by `&mut` to every
//! turn, and dropped when the UI exits. The transcript only ever grows, and
//! only by whole exchanges: a user turn and the assistant turn answering it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::Message;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message in the transcript. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    fn to_message(&self) -> Message {
        match self.role {
            Role::User => Message::user(&self.content),
            Role::Assistant => Message::assistant(&self.content),
        }
    }
}

/// Ordered history of one session
#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    /// The last user turn, if any
    pub fn last_user(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|t| t.role == Role::User)
    }

    /// The last assistant turn, if any
    pub fn last_assistant(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|t| t.role == Role::Assistant)
    }

    /// The most recent `window` turns as LLM messages.
    ///
    /// The window never opens on an assistant turn, so the model always sees
    /// a question before its answer.
    pub fn context_messages(&self, window: usize) -> Vec<Message> {
        let start = self.turns.len().saturating_sub(window);
        self.turns[start..]
            .iter()
            .skip_while(|t| t.role == Role::Assistant)
            .map(Turn::to_message)
            .collect()
    }

    fn push_exchange(&mut self, user: &str, assistant: &str) {
        self.turns.push(Turn::new(Role::User, user));
        self.turns.push(Turn::new(Role::Assistant, assistant));
    }
}

/// One conversation session
#[derive(Debug, Clone, Default)]
pub struct Session {
    transcript: Transcript,
}

impl Session {
    /// Start a session with an empty transcript
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn len(&self) -> usize {
        self.transcript.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcript.is_empty()
    }

    /// Commit a completed exchange. The agent is the only caller.
    pub(crate) fn record_exchange(&mut self, user: &str, assistant: &str) {
        self.transcript.push_exchange(user, assistant);
    }
}
