//! Data models for conversation state

use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in a conversation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Transcript line form used in prompts and summarization requests
impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.role, self.content)
    }
}

/// State of a single session: a running summary plus the unsummarized tail
///
/// A turn lives either in `history` or folded into `summary`, never both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    id: String,
    history: Vec<Turn>,
    summary: Option<String>,
}

impl ConversationState {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            history: Vec::new(),
            summary: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Turns in chronological order
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Append a turn at the end of the timeline
    pub fn push(&mut self, turn: Turn) {
        self.history.push(turn);
    }

    /// Install a freshly computed summary and drop everything before `preserve_from`
    pub(crate) fn apply_compaction(&mut self, summary: String, preserve_from: usize) {
        self.summary = Some(summary);
        self.history.drain(..preserve_from);
    }
}
