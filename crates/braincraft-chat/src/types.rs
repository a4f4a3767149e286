//! Shared value types for the diagram agent.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Messages
// =============================================================================

/// Author of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
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

/// A single conversation message. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
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

// =============================================================================
// Diagrams
// =============================================================================

/// Mermaid diagram family, detected from the leading keyword of the code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramType {
    #[default]
    Flowchart,
    Sequence,
    Class,
    #[serde(rename = "er")]
    EntityRelationship,
    Gantt,
    Pie,
}

impl DiagramType {
    /// Wire name, as sent to the frontend.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagramType::Flowchart => "flowchart",
            DiagramType::Sequence => "sequence",
            DiagramType::Class => "class",
            DiagramType::EntityRelationship => "er",
            DiagramType::Gantt => "gantt",
            DiagramType::Pie => "pie",
        }
    }
}

impl fmt::Display for DiagramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagram pulled out of a model reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramResult {
    /// Inner content of the fenced block, trimmed at both ends.
    pub diagram_code: String,
    pub diagram_type: DiagramType,
    /// Reply text with the fenced block removed, trimmed. May be empty.
    pub explanation: String,
}

// =============================================================================
// Turn results
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnStatus {
    Success,
    Error,
}

/// Outcome of one `chat` turn. Failures are reported here, not as `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurnResult {
    pub response_text: String,
    pub diagram: Option<DiagramResult>,
    pub status: TurnStatus,
}

impl ChatTurnResult {
    /// Successful turn: explanation plus diagram, or the plain reply.
    pub fn success(raw_reply: &str, diagram: Option<DiagramResult>) -> Self {
        let response_text = match &diagram {
            Some(d) => d.explanation.clone(),
            None => raw_reply.to_string(),
        };
        Self {
            response_text,
            diagram,
            status: TurnStatus::Success,
        }
    }

    /// Failed turn carrying an already-classified, user-safe message.
    pub fn error(classified_message: &str) -> Self {
        Self {
            response_text: format!("Error: {}", classified_message),
            diagram: None,
            status: TurnStatus::Error,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TurnStatus::Success
    }
}

/// Listing entry for an active session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub started_at: String,
    pub last_message_at: String,
    /// Number of user/assistant messages (the system instruction is excluded).
    pub message_count: usize,
}
