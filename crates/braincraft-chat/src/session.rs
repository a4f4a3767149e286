//! Conversation session: an append-only message history.

use chrono::{DateTime, Local, TimeZone};
use uuid::Uuid;

use crate::extract::extract;
use crate::prompts::AGENT_INSTRUCTION;
use crate::types::{Message, Role, SessionSummary};

/// Ordered message history for one conversation.
///
/// The first message is always the agent system instruction. Messages are
/// only ever appended, a whole turn at a time.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    id: Uuid,
    started_at: i64,
    last_message_at: i64,
    messages: Vec<Message>,
}

impl ConversationSession {
    /// Start a session seeded with the agent instruction.
    pub fn new() -> Self {
        let now = Local::now().timestamp();
        Self {
            id: Uuid::new_v4(),
            started_at: now,
            last_message_at: now,
            messages: vec![Message::system(AGENT_INSTRUCTION)],
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// User and assistant messages, without the system instruction.
    pub fn history(&self) -> &[Message] {
        &self.messages[1..]
    }

    /// Number of completed turns.
    pub fn turn_count(&self) -> usize {
        self.history().len() / 2
    }

    pub fn last_message_at(&self) -> i64 {
        self.last_message_at
    }

    /// Code of the most recent diagram the assistant produced, if any.
    pub fn latest_diagram(&self) -> Option<String> {
        self.messages
            .iter()
            .rev()
            .filter(|m| m.role() == Role::Assistant)
            .find_map(|m| extract(m.content()))
            .map(|d| d.diagram_code)
    }

    /// Whether the session has been idle longer than `timeout_minutes`.
    pub fn is_expired(&self, timeout_minutes: u32) -> bool {
        let now = Local::now().timestamp();
        now - self.last_message_at > i64::from(timeout_minutes) * 60
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id,
            started_at: format_epoch(self.started_at),
            last_message_at: format_epoch(self.last_message_at),
            message_count: self.history().len(),
        }
    }

    /// Append a completed turn. Called only after the model call succeeded.
    pub(crate) fn commit_turn(&mut self, user: &str, assistant: &str) {
        self.messages.push(Message::user(user));
        self.messages.push(Message::assistant(assistant));
        self.last_message_at = Local::now().timestamp();
    }

    #[cfg(test)]
    pub(crate) fn backdate(&mut self, secs: i64) {
        self.last_message_at -= secs;
    }
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Format epoch seconds as ISO 8601 string.
fn format_epoch(epoch: i64) -> String {
    Local
        .timestamp_opt(epoch, 0)
        .single()
        .map(|dt: DateTime<Local>| dt.to_rfc3339())
        .unwrap_or_else(|| epoch.to_string())
}
