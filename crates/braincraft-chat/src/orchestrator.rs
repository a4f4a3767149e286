//! Diagram agent: runs conversation turns and direct capability calls.
//!
//! Each turn routes the message, calls the model with the full history as
//! context, extracts and classifies any diagram, and commits the turn to the
//! session only when the model call succeeded.

use std::sync::Arc;

use braincraft_core::config::ModelConfig;
use tracing::{debug, info, warn};

use crate::capability::Capability;
use crate::error::ChatError;
use crate::extract::extract;
use crate::mistral::MistralClient;
use crate::model::ModelClient;
use crate::router::{TurnRoute, TurnRouter};
use crate::session::ConversationSession;
use crate::types::{ChatTurnResult, DiagramResult, Message};

/// Default limit on user message length, in characters.
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 4000;

/// Conversational diagram agent.
///
/// Holds only the model client and routing rules; conversation state lives
/// in the [`ConversationSession`] passed to [`DiagramAgent::chat`].
#[derive(Clone)]
pub struct DiagramAgent {
    model: Arc<dyn ModelClient>,
    router: TurnRouter,
    max_message_length: usize,
}

impl DiagramAgent {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self {
            model,
            router: TurnRouter::new(),
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
        }
    }

    /// Build an agent backed by the Mistral API.
    ///
    /// Fails fast with [`ChatError::Configuration`] when the API key is
    /// missing, so a misconfigured deployment never starts serving turns.
    pub fn from_config(config: &ModelConfig) -> Result<Self, ChatError> {
        let client = MistralClient::from_config(config)?;
        info!(model = %config.model, "Diagram agent initialized");
        Ok(Self::new(Arc::new(client)).with_max_message_length(config.max_message_length))
    }

    pub fn with_max_message_length(mut self, max: usize) -> Self {
        self.max_message_length = max;
        self
    }

    /// Fresh session seeded with the agent instruction.
    pub fn new_session(&self) -> ConversationSession {
        ConversationSession::new()
    }

    /// Run one conversation turn.
    ///
    /// Never returns `Err`: failures come back as a result with
    /// `status = error` and a classified message, and leave `session`
    /// exactly as it was.
    pub async fn chat(&self, session: &mut ConversationSession, message: &str) -> ChatTurnResult {
        info!(
            session_id = %session.id(),
            preview = %preview(message),
            "Processing chat message"
        );

        match self.run_turn(session, message).await {
            Ok((raw, diagram)) => {
                session.commit_turn(message, &raw);
                info!(
                    session_id = %session.id(),
                    turns = session.turn_count(),
                    diagram = diagram.as_ref().map(|d| d.diagram_type.as_str()),
                    "Chat turn completed"
                );
                ChatTurnResult::success(&raw, diagram)
            }
            Err(e) => {
                let classified = e.user_message();
                warn!(session_id = %session.id(), error = %e, "Chat turn failed");
                ChatTurnResult::error(&classified)
            }
        }
    }

    /// Generate a diagram from a description, outside any conversation.
    pub async fn generate_diagram(&self, description: &str) -> Result<DiagramResult, ChatError> {
        self.validate(description)?;
        let capability = Capability::Generate {
            description: description.to_string(),
        };
        self.run_direct(capability).await
    }

    /// Refine existing diagram code, outside any conversation.
    pub async fn refine_diagram(
        &self,
        current_code: &str,
        feedback: &str,
    ) -> Result<DiagramResult, ChatError> {
        self.validate(feedback)?;
        let capability = Capability::Refine {
            current_code: current_code.to_string(),
            feedback: feedback.to_string(),
        };
        self.run_direct(capability).await
    }

    /// Reject empty and over-long messages before any model call.
    pub fn validate(&self, message: &str) -> Result<(), ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if message.chars().count() > self.max_message_length {
            return Err(ChatError::MessageTooLong(self.max_message_length));
        }
        Ok(())
    }

    // -- Private helpers --

    async fn run_turn(
        &self,
        session: &ConversationSession,
        message: &str,
    ) -> Result<(String, Option<DiagramResult>), ChatError> {
        self.validate(message)?;

        let current = session.latest_diagram();
        let route = self.router.route(message, current.as_deref());
        debug!(route = route.label(), "Routed chat turn");

        let raw = match route {
            TurnRoute::Converse => {
                let mut context = session.messages().to_vec();
                context.push(Message::user(message));
                self.model.invoke(&context).await?
            }
            TurnRoute::Capability(capability) => {
                capability
                    .invocation_in_context(session.messages())
                    .send(self.model.as_ref())
                    .await?
            }
        };

        let diagram = extract(&raw);
        Ok((raw, diagram))
    }

    async fn run_direct(&self, capability: Capability) -> Result<DiagramResult, ChatError> {
        info!(capability = capability.name(), "Running capability");
        let raw = capability.run(self.model.as_ref()).await.map_err(|e| {
            warn!(capability = capability.name(), error = %e, "Capability failed");
            ChatError::from(e)
        })?;
        extract(&raw).ok_or_else(|| {
            debug!(preview = %preview(&raw), "Capability reply had no diagram");
            ChatError::NoDiagram
        })
    }
}

/// First 100 characters, for log lines.
fn preview(text: &str) -> String {
    text.chars().take(100).collect()
}

// =============================================================================
// Tests
// =============================================================================
