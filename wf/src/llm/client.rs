//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless LLM client - each call is independent (fresh context)
///
/// Every pipeline stage is one call through this trait. Whatever tool
/// invocation the provider performs behind the call is opaque here: the
/// caller only ever sees the final text.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request (blocking until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::llm::{StopReason, TokenUsage};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tracing::debug;

    /// Scripted reply for a mock rule
    #[derive(Debug, Clone)]
    pub enum MockReply {
        /// Respond with this text
        Text(String),
        /// Fail with an API error carrying this message
        Fail(String),
        /// Respond with this text, stopped at the token limit
        Truncated(String),
        /// Never respond (exercise timeouts)
        Hang,
    }

    /// Mock LLM client for unit tests
    ///
    /// Stages run concurrently, so replies are chosen by matching a needle
    /// against the system prompt and user messages rather than by call order.
    /// The first matching rule wins.
    pub struct MockLlmClient {
        rules: Vec<(String, MockReply)>,
        call_count: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl MockLlmClient {
        pub fn new(rules: Vec<(&str, MockReply)>) -> Self {
            debug!(rule_count = %rules.len(), "MockLlmClient::new: called");
            Self {
                rules: rules.into_iter().map(|(n, r)| (n.to_string(), r)).collect(),
                call_count: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        /// Every user message received so far, in arrival order
        pub fn received_queries(&self) -> Vec<String> {
            self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            debug!("MockLlmClient::complete: called");
            self.call_count.fetch_add(1, Ordering::SeqCst);

            let query = request
                .messages
                .iter()
                .map(|m| m.content.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            if let Ok(mut prompts) = self.prompts.lock() {
                prompts.push(query.clone());
            }

            let haystack = format!("{}\n{}", request.system_prompt, query);
            let reply = self
                .rules
                .iter()
                .find(|(needle, _)| haystack.contains(needle.as_str()))
                .map(|(_, reply)| reply.clone());

            match reply {
                Some(MockReply::Text(text)) => Ok(CompletionResponse::text(text)),
                Some(MockReply::Truncated(text)) => Ok(CompletionResponse {
                    content: Some(text),
                    stop_reason: StopReason::MaxTokens,
                    usage: TokenUsage::default(),
                }),
                Some(MockReply::Fail(message)) => Err(LlmError::ApiError { status: 500, message }),
                Some(MockReply::Hang) => {
                    tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
                    Err(LlmError::InvalidResponse("mock hang elapsed".to_string()))
                }
                None => {
                    debug!("MockLlmClient::complete: no matching rule");
                    Err(LlmError::InvalidResponse("No matching mock rule".to_string()))
                }
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_client_matches_rules() {
            let client = MockLlmClient::new(vec![
                ("weather", MockReply::Text("sunny".to_string())),
                ("hotel", MockReply::Text("grand hotel".to_string())),
            ]);

            let resp = client
                .complete(CompletionRequest::single("You look up weather", "Beijing", 100))
                .await
                .unwrap();
            assert_eq!(resp.content, Some("sunny".to_string()));

            let resp = client
                .complete(CompletionRequest::single("You find a hotel", "Beijing", 100))
                .await
                .unwrap();
            assert_eq!(resp.content, Some("grand hotel".to_string()));

            assert_eq!(client.call_count(), 2);
            assert_eq!(client.received_queries(), vec!["Beijing", "Beijing"]);
        }

        #[tokio::test]
        async fn test_mock_client_errors_without_rule() {
            let client = MockLlmClient::new(vec![]);
            let result = client.complete(CompletionRequest::single("Test", "q", 10)).await;
            assert!(result.is_err());
        }

        #[tokio::test]
        async fn test_mock_client_fail_rule() {
            let client = MockLlmClient::new(vec![("boom", MockReply::Fail("exploded".to_string()))]);
            let err = client
                .complete(CompletionRequest::single("boom", "q", 10))
                .await
                .unwrap_err();
            assert!(matches!(err, LlmError::ApiError { status: 500, .. }));
        }
    }
}
