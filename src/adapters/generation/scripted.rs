//! Scripted generation service for tests.
//!
//! Classify and generate results are queued separately and consumed in
//! order. When a queue runs dry the service answers with a failure, so a
//! test that forgets to script a call sees the fallback path. Every prompt
//! is recorded.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::ports::{AIError, GenerationError, GenerationService, Prompt};

#[derive(Debug, Default)]
struct Script {
    classify: VecDeque<Result<serde_json::Value, GenerationError>>,
    generate: VecDeque<Result<String, GenerationError>>,
    classify_prompts: Vec<Prompt>,
    generate_prompts: Vec<Prompt>,
}

/// Generation double with queued results.
#[derive(Debug, Clone, Default)]
pub struct ScriptedGeneration {
    script: Arc<Mutex<Script>>,
    delay: Duration,
}

impl ScriptedGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classification(self, value: serde_json::Value) -> Self {
        self.lock().classify.push_back(Ok(value));
        self
    }

    pub fn with_classify_error(self, error: GenerationError) -> Self {
        self.lock().classify.push_back(Err(error));
        self
    }

    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.lock().generate.push_back(Ok(text.into()));
        self
    }

    pub fn with_generate_error(self, error: GenerationError) -> Self {
        self.lock().generate.push_back(Err(error));
        self
    }

    /// Delay applied before every answer.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn classify_prompts(&self) -> Vec<Prompt> {
        self.lock().classify_prompts.clone()
    }

    pub fn generate_prompts(&self) -> Vec<Prompt> {
        self.lock().generate_prompts.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().expect("generation script poisoned")
    }

    fn exhausted() -> GenerationError {
        GenerationError::Provider(AIError::unavailable("no scripted result left"))
    }
}

#[async_trait]
impl GenerationService for ScriptedGeneration {
    async fn classify(&self, prompt: Prompt) -> Result<serde_json::Value, GenerationError> {
        let next = {
            let mut script = self.lock();
            script.classify_prompts.push(prompt);
            script.classify.pop_front()
        };
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        next.unwrap_or_else(|| Err(Self::exhausted()))
    }

    async fn generate(&self, prompt: Prompt) -> Result<String, GenerationError> {
        let next = {
            let mut script = self.lock();
            script.generate_prompts.push(prompt);
            script.generate.pop_front()
        };
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        next.unwrap_or_else(|| Err(Self::exhausted()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn replays_results_in_order() {
        let gen = ScriptedGeneration::new()
            .with_reply("one")
            .with_generate_error(GenerationError::EmptyOutput)
            .with_classification(json!({"stance": "pro"}));

        assert_eq!(gen.generate(Prompt::new("s", "u")).await.unwrap(), "one");
        assert_eq!(
            gen.generate(Prompt::new("s", "u")).await,
            Err(GenerationError::EmptyOutput)
        );
        assert_eq!(gen.classify(Prompt::new("s", "u")).await.unwrap()["stance"], "pro");
    }

    #[tokio::test]
    async fn exhausted_queue_fails() {
        let gen = ScriptedGeneration::new();
        assert!(gen.generate(Prompt::new("s", "u")).await.is_err());
        assert!(gen.classify(Prompt::new("s", "u")).await.is_err());
    }

    #[tokio::test]
    async fn records_prompts() {
        let gen = ScriptedGeneration::new().with_reply("x");
        gen.generate(Prompt::new("sys", "task")).await.unwrap();
        assert_eq!(gen.generate_prompts()[0].user, "task");
        assert!(gen.classify_prompts().is_empty());
    }
}
