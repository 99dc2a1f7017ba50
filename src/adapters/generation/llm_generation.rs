//! Generation service backed by an `AIProvider`.
//!
//! Every call is bounded by a timeout. Provider errors, elapsed timeouts,
//! blank output and unparseable JSON all come back as a typed
//! `GenerationError`; nothing is retried here.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::conversation::{JsonExtractor, ResponseSanitizer};
use crate::ports::{
    AIError, AIProvider, CompletionRequest, FinishReason, GenerationError, GenerationService,
    MessageRole, Prompt, RequestMetadata, RequestPurpose,
};

/// Tuning for generation calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub timeout: Duration,
    pub classify_temperature: f32,
    pub generate_temperature: f32,
    pub classify_max_tokens: u32,
    pub generate_max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            classify_temperature: 0.2,
            generate_temperature: 0.7,
            classify_max_tokens: 500,
            generate_max_tokens: 150,
        }
    }
}

impl GenerationSettings {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_generate_temperature(mut self, temperature: f32) -> Self {
        self.generate_temperature = temperature;
        self
    }
}

/// `GenerationService` over any `AIProvider`.
#[derive(Clone)]
pub struct LlmGenerationService {
    provider: Arc<dyn AIProvider>,
    settings: GenerationSettings,
    extractor: JsonExtractor,
    sanitizer: ResponseSanitizer,
}

impl LlmGenerationService {
    pub fn new(provider: Arc<dyn AIProvider>, settings: GenerationSettings) -> Self {
        Self {
            provider,
            settings,
            extractor: JsonExtractor::new(),
            sanitizer: ResponseSanitizer::new(),
        }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    fn request(&self, purpose: RequestPurpose, prompt: &Prompt) -> CompletionRequest {
        let trace_id = Uuid::new_v4().to_string();
        let metadata = match prompt.session_id {
            Some(id) => RequestMetadata::for_session(id, trace_id),
            None => RequestMetadata::new(trace_id),
        };

        let request = CompletionRequest::new(purpose, metadata)
            .with_system_prompt(prompt.system.clone())
            .with_message(MessageRole::User, prompt.user.clone());

        match purpose {
            RequestPurpose::Classify => request
                .with_temperature(self.settings.classify_temperature)
                .with_max_tokens(self.settings.classify_max_tokens)
                .with_json_response(),
            RequestPurpose::Generate => request
                .with_temperature(self.settings.generate_temperature)
                .with_max_tokens(self.settings.generate_max_tokens),
        }
    }

    /// Runs one completion under the timeout, returning non-blank content.
    /// A filtered completion is a provider refusal; a truncated one cannot
    /// hold a complete JSON object.
    async fn complete(&self, purpose: RequestPurpose, prompt: &Prompt) -> Result<String, GenerationError> {
        let request = self.request(purpose, prompt);
        tracing::debug!(
            purpose = ?purpose,
            session_id = ?prompt.session_id,
            prompt_chars = prompt.len(),
            "Sending generation request"
        );

        let response = tokio::time::timeout(self.settings.timeout, self.provider.complete(request))
            .await
            .map_err(|_| GenerationError::Timeout {
                after_secs: self.settings.timeout.as_secs(),
            })??;

        tracing::debug!(
            purpose = ?purpose,
            session_id = ?prompt.session_id,
            model = %response.model,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            finish_reason = ?response.finish_reason,
            "Generation response received"
        );

        match (purpose, response.finish_reason) {
            (_, FinishReason::ContentFilter) => {
                return Err(GenerationError::Provider(AIError::content_filtered(
                    "completion stopped by provider filter",
                )));
            }
            (RequestPurpose::Classify, FinishReason::Length) => {
                return Err(GenerationError::MalformedOutput(
                    "classification truncated at token limit".to_string(),
                ));
            }
            _ => {}
        }

        if response.content.trim().is_empty() {
            return Err(GenerationError::EmptyOutput);
        }
        Ok(response.content)
    }
}

#[async_trait]
impl GenerationService for LlmGenerationService {
    async fn classify(&self, prompt: Prompt) -> Result<serde_json::Value, GenerationError> {
        let content = self.complete(RequestPurpose::Classify, &prompt).await?;
        self.extractor
            .extract_object(&content)
            .map_err(|e| GenerationError::MalformedOutput(e.to_string()))
    }

    async fn generate(&self, prompt: Prompt) -> Result<String, GenerationError> {
        let content = self.complete(RequestPurpose::Generate, &prompt).await?;
        let cleaned = self
            .sanitizer
            .sanitize(&content)
            .map_err(|e| GenerationError::MalformedOutput(e.to_string()))?;

        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            return Err(GenerationError::EmptyOutput);
        }
        Ok(cleaned.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError, MockResponse};
    use crate::domain::foundation::SessionId;
    use crate::ports::TokenUsage;

    fn service(provider: MockAIProvider) -> LlmGenerationService {
        LlmGenerationService::new(Arc::new(provider), GenerationSettings::default())
    }

    fn prompt() -> Prompt {
        Prompt::new("system", "task")
    }

    fn stopped(content: &str, finish_reason: FinishReason) -> MockAIProvider {
        let provider = MockAIProvider::new();
        provider.push(MockResponse::Success {
            content: content.to_string(),
            usage: TokenUsage::new(40, 500),
            finish_reason,
        });
        provider
    }

    mod classify {
        use super::*;

        #[tokio::test]
        async fn parses_json_object() {
            let svc = service(MockAIProvider::new().with_response(r#"{"stance":"pro"}"#));
            let value = svc.classify(prompt()).await.unwrap();
            assert_eq!(value["stance"], "pro");
        }

        #[tokio::test]
        async fn accepts_fenced_json() {
            let svc = service(
                MockAIProvider::new().with_response("```json\n{\"tone\":\"calm\"}\n```"),
            );
            assert_eq!(svc.classify(prompt()).await.unwrap()["tone"], "calm");
        }

        #[tokio::test]
        async fn invalid_json_is_malformed() {
            let svc = service(MockAIProvider::new().with_response("I think they are pro."));
            let err = svc.classify(prompt()).await.unwrap_err();
            assert_eq!(err.reason(), "malformed_output");
        }

        #[tokio::test]
        async fn blank_output_is_empty() {
            let svc = service(MockAIProvider::new().with_response("   "));
            assert_eq!(svc.classify(prompt()).await, Err(GenerationError::EmptyOutput));
        }

        #[tokio::test]
        async fn truncated_classification_is_malformed() {
            let svc = service(stopped(r#"{"stance":"pro","key_values":["fair"#, FinishReason::Length));
            let err = svc.classify(prompt()).await.unwrap_err();
            assert!(matches!(err, GenerationError::MalformedOutput(_)));
        }

        #[tokio::test]
        async fn truncated_but_complete_object_is_still_rejected() {
            let svc = service(stopped(r#"{"stance":"pro"}"#, FinishReason::Length));
            assert_eq!(svc.classify(prompt()).await.unwrap_err().reason(), "malformed_output");
        }

        #[tokio::test]
        async fn sends_json_mode_request_with_session() {
            let provider = MockAIProvider::new().with_response("{}");
            let svc = service(provider.clone());
            let id = SessionId::new();
            svc.classify(prompt().for_session(id)).await.unwrap();

            let calls = provider.get_calls();
            assert!(calls[0].json_response);
            assert_eq!(calls[0].purpose, RequestPurpose::Classify);
            assert_eq!(calls[0].metadata.session_id, Some(id));
            assert_eq!(calls[0].system_prompt.as_deref(), Some("system"));
        }
    }

    mod generate {
        use super::*;

        #[tokio::test]
        async fn returns_trimmed_text() {
            let svc = service(MockAIProvider::new().with_response("  Hello there.  "));
            assert_eq!(svc.generate(prompt()).await.unwrap(), "Hello there.");
        }

        #[tokio::test]
        async fn strips_injection_markers() {
            let svc = service(MockAIProvider::new().with_response("[INST]Hi[/INST]"));
            assert_eq!(svc.generate(prompt()).await.unwrap(), "Hi");
        }

        #[tokio::test]
        async fn marker_only_output_is_empty() {
            let svc = service(MockAIProvider::new().with_response("<|im_end|>"));
            assert_eq!(svc.generate(prompt()).await, Err(GenerationError::EmptyOutput));
        }

        #[tokio::test]
        async fn provider_error_is_typed() {
            let svc = service(MockAIProvider::new().with_error(MockError::AuthenticationFailed));
            assert_eq!(
                svc.generate(prompt()).await,
                Err(GenerationError::Provider(AIError::AuthenticationFailed))
            );
        }

        #[tokio::test]
        async fn truncated_reply_is_kept() {
            let svc = service(stopped("That is a fair point, and", FinishReason::Length));
            assert_eq!(svc.generate(prompt()).await.unwrap(), "That is a fair point, and");
        }

        #[tokio::test]
        async fn filtered_reply_is_a_provider_error() {
            let svc = service(stopped("", FinishReason::ContentFilter));
            assert!(matches!(
                svc.generate(prompt()).await,
                Err(GenerationError::Provider(AIError::ContentFiltered { .. }))
            ));
        }

        #[tokio::test]
        async fn slow_provider_times_out() {
            let provider = MockAIProvider::new()
                .with_response("late")
                .with_delay(Duration::from_millis(200));
            let svc = LlmGenerationService::new(
                Arc::new(provider),
                GenerationSettings::default().with_timeout(Duration::from_millis(20)),
            );

            assert!(matches!(
                svc.generate(prompt()).await,
                Err(GenerationError::Timeout { .. })
            ));
        }

        #[tokio::test]
        async fn does_not_retry() {
            let provider = MockAIProvider::new().with_error(MockError::Network {
                message: "reset".into(),
            });
            let svc = service(provider.clone());
            assert!(svc.generate(prompt()).await.is_err());
            assert_eq!(provider.call_count(), 1);
        }
    }
}
