//! The two diagram capabilities: generate and refine.
//!
//! Each capability is one model call under a fixed system instruction.
//! Capabilities hold no state; an invocation is built fresh per call and
//! consumed when sent.

use tracing::debug;

use crate::error::ModelError;
use crate::model::ModelClient;
use crate::prompts::{GENERATE_INSTRUCTION, REFINE_INSTRUCTION};
use crate::types::{Message, Role};

/// A diagram operation the agent can run against the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    /// Create a diagram from a description.
    Generate { description: String },
    /// Rework existing diagram code according to feedback.
    Refine { current_code: String, feedback: String },
}

impl Capability {
    pub fn name(&self) -> &'static str {
        match self {
            Capability::Generate { .. } => "generate_mermaid",
            Capability::Refine { .. } => "refine_mermaid",
        }
    }

    /// Fixed system instruction for this capability.
    pub fn instruction(&self) -> &'static str {
        match self {
            Capability::Generate { .. } => GENERATE_INSTRUCTION,
            Capability::Refine { .. } => REFINE_INSTRUCTION,
        }
    }

    /// The user turn carrying this capability's parameters.
    pub fn user_turn(&self) -> String {
        match self {
            Capability::Generate { description } => description.clone(),
            Capability::Refine {
                current_code,
                feedback,
            } => format!("Current diagram:\n{}\n\nFeedback: {}", current_code, feedback),
        }
    }

    /// Standalone invocation: system instruction plus the user turn.
    pub fn invocation(&self) -> CapabilityInvocation {
        CapabilityInvocation {
            capability: self.name(),
            messages: vec![
                Message::system(self.instruction()),
                Message::user(self.user_turn()),
            ],
        }
    }

    /// Invocation inside a conversation.
    ///
    /// The conversation's system instructions are merged with this
    /// capability's instruction into one leading system message; the remaining
    /// history follows in order, then this capability's user turn.
    pub fn invocation_in_context(&self, history: &[Message]) -> CapabilityInvocation {
        let mut system = history
            .iter()
            .filter(|m| m.role() == Role::System)
            .map(Message::content)
            .collect::<Vec<_>>()
            .join("\n\n");
        if !system.is_empty() {
            system.push_str("\n\n");
        }
        system.push_str(self.instruction());

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::system(system));
        messages.extend(history.iter().filter(|m| m.role() != Role::System).cloned());
        messages.push(Message::user(self.user_turn()));

        CapabilityInvocation {
            capability: self.name(),
            messages,
        }
    }

    /// Run this capability standalone and return the model's raw text.
    pub async fn run(&self, model: &dyn ModelClient) -> Result<String, ModelError> {
        self.invocation().send(model).await
    }
}

/// Ordered messages for one capability call.
#[derive(Debug, Clone)]
pub struct CapabilityInvocation {
    capability: &'static str,
    messages: Vec<Message>,
}

impl CapabilityInvocation {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Send to the model. Consumes the invocation; it is never reused.
    pub async fn send(self, model: &dyn ModelClient) -> Result<String, ModelError> {
        debug!(
            capability = self.capability,
            messages = self.messages.len(),
            "Invoking capability"
        );
        model.invoke(&self.messages).await
    }
}
