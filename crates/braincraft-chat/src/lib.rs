//! Conversational diagram agent for BrainCraft.
//!
//! Turns natural-language requests into Mermaid.js diagrams: routes each
//! turn to a capability, calls the language model, and extracts and
//! classifies the diagram embedded in the model's reply.

pub mod capability;
pub mod classify;
pub mod error;
pub mod error_classifier;
pub mod extract;
pub mod mistral;
pub mod model;
pub mod orchestrator;
pub mod prompts;
pub mod router;
pub mod session;
pub mod store;
pub mod types;

pub use capability::{Capability, CapabilityInvocation};
pub use classify::classify;
pub use error::{ChatError, ModelError};
pub use error_classifier::classify_error;
pub use extract::extract;
pub use mistral::MistralClient;
pub use model::{MockModelClient, ModelClient};
pub use orchestrator::DiagramAgent;
pub use router::{TurnRoute, TurnRouter};
pub use session::ConversationSession;
pub use store::SessionStore;
pub use types::{
    ChatTurnResult, DiagramResult, DiagramType, Message, Role, SessionSummary, TurnStatus,
};
