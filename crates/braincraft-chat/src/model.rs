//! Language-model client seam.
//!
//! The agent only needs "ordered messages in, text out". [`MistralClient`]
//! talks to the real API; [`MockModelClient`] scripts replies for tests and
//! local development.
//!
//! [`MistralClient`]: crate::mistral::MistralClient

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ModelError;
use crate::types::Message;

/// Anything that can answer an ordered conversation with text.
///
/// Implementations must be cancel-safe: dropping the returned future
/// abandons the request with no other effect.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn invoke(&self, messages: &[Message]) -> Result<String, ModelError>;
}

// =============================================================================
// Mock implementation
// =============================================================================

/// Scripted model client.
///
/// Replies are consumed front to back; once the script is exhausted the
/// fallback reply is returned. Every call's messages are recorded.
#[derive(Debug, Default)]
pub struct MockModelClient {
    script: Mutex<VecDeque<Result<String, ModelError>>>,
    fallback: String,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl MockModelClient {
    pub fn new() -> Self {
        Self {
            fallback: "```mermaid\ngraph TD\n    A[Start] --> B[End]\n```".to_string(),
            ..Self::default()
        }
    }

    /// Queue a successful reply.
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.push(Ok(reply.into()));
        self
    }

    /// Queue a failure.
    pub fn with_error(self, error: ModelError) -> Self {
        self.push(Err(error));
        self
    }

    /// Reply returned once the script runs out.
    pub fn with_fallback(mut self, reply: impl Into<String>) -> Self {
        self.fallback = reply.into();
        self
    }

    /// Messages sent on each call so far, in call order.
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn push(&self, item: Result<String, ModelError>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(item);
        }
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn invoke(&self, messages: &[Message]) -> Result<String, ModelError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(messages.to_vec());
        }
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_script_then_fallback() {
        let mock = MockModelClient::new()
            .with_reply("first")
            .with_error(ModelError::Timeout(5))
            .with_fallback("later");

        let msgs = [Message::user("hi")];
        assert_eq!(mock.invoke(&msgs).await.unwrap(), "first");
        assert!(matches!(mock.invoke(&msgs).await, Err(ModelError::Timeout(5))));
        assert_eq!(mock.invoke(&msgs).await.unwrap(), "later");
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_records_messages() {
        let mock = MockModelClient::new();
        let msgs = [Message::system("sys"), Message::user("draw a graph")];
        let reply = mock.invoke(&msgs).await.unwrap();
        assert!(reply.contains("```mermaid"));

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], msgs.to_vec());
    }

    #[tokio::test]
    async fn test_mock_usable_as_trait_object() {
        let client: std::sync::Arc<dyn ModelClient> =
            std::sync::Arc::new(MockModelClient::new().with_reply("ok"));
        assert_eq!(client.invoke(&[]).await.unwrap(), "ok");
    }
}
