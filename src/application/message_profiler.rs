//! Message Profiler - re-estimates the counterpart from their latest message.
//!
//! Always returns a complete `Profile`. Any generation failure, non-object
//! output or output with no recognisable fields yields the default profile
//! and a `ProfileSource::Fallback` carrying the reason.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::conversation::{ContextWindow, History};
use crate::domain::foundation::SessionId;
use crate::domain::profile::{Profile, ProfileDraft};
use crate::domain::topic::TopicContext;
use crate::ports::GenerationService;

use super::prompts;

/// Where a profile came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProfileSource {
    Generated,
    Fallback { reason: String },
}

impl ProfileSource {
    pub fn fallback(reason: impl Into<String>) -> Self {
        ProfileSource::Fallback {
            reason: reason.into(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ProfileSource::Fallback { .. })
    }
}

/// A profile plus its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedProfile {
    pub profile: Profile,
    pub source: ProfileSource,
}

/// Derives a fresh profile from the latest utterance and history.
#[derive(Clone)]
pub struct MessageProfiler {
    generation: Arc<dyn GenerationService>,
    window: ContextWindow,
}

impl MessageProfiler {
    pub fn new(generation: Arc<dyn GenerationService>, window: ContextWindow) -> Self {
        Self { generation, window }
    }

    /// Profiles `latest`. Does not assume whether `latest` is already the
    /// last entry of `history`.
    pub async fn profile(
        &self,
        session_id: SessionId,
        topic: &TopicContext,
        history: &History,
        latest: &str,
    ) -> DerivedProfile {
        let window = self.window.window(history);
        if window.was_truncated() {
            tracing::debug!(
                session_id = %session_id,
                omitted = window.omitted,
                sent = window.messages.len(),
                "History windowed for profiling"
            );
        }

        let prompt = prompts::message_profile(session_id, topic, &window, latest);
        let value = match self.generation.classify(prompt).await {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(
                    session_id = %session_id,
                    reason = err.reason(),
                    error = %err,
                    "Message profiling failed, using default profile"
                );
                return Self::fallback(err.reason());
            }
        };

        match ProfileDraft::from_json(&value) {
            Some(draft) if !draft.is_empty() => DerivedProfile {
                profile: draft.into_profile(&Profile::default()),
                source: ProfileSource::Generated,
            },
            Some(_) => {
                tracing::warn!(session_id = %session_id, reason = "no_profile_fields", "Classification had no usable fields");
                Self::fallback("no_profile_fields")
            }
            None => {
                tracing::warn!(session_id = %session_id, reason = "not_an_object", "Classification was not a JSON object");
                Self::fallback("not_an_object")
            }
        }
    }

    fn fallback(reason: &str) -> DerivedProfile {
        DerivedProfile {
            profile: Profile::default(),
            source: ProfileSource::fallback(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::generation::ScriptedGeneration;
    use crate::domain::conversation::Message;
    use crate::domain::foundation::TopicId;
    use crate::domain::profile::{Readiness, Stance};
    use crate::ports::{AIError, GenerationError};
    use proptest::prelude::*;
    use serde_json::json;

    fn topic() -> TopicContext {
        TopicContext::new(TopicId::new("t").unwrap(), "Remote work", "", vec![]).unwrap()
    }

    fn profiler(gen: ScriptedGeneration) -> MessageProfiler {
        MessageProfiler::new(Arc::new(gen), ContextWindow::default())
    }

    fn history() -> History {
        let mut history = History::new();
        history.push(Message::assistant("What draws you to that view?").unwrap());
        history.push(Message::user("I hate commuting").unwrap());
        history
    }

    mod success {
        use super::*;

        #[tokio::test]
        async fn maps_classification_to_profile() {
            let gen = ScriptedGeneration::new().with_classification(json!({
                "stance": "pro",
                "confidence": 0.9,
                "style": "casual",
                "change_readiness": 2,
                "key_values": ["family time"],
                "guidance": {"effective": ["personal stories"], "avoid": ["statistics"]}
            }));
            let derived = profiler(gen)
                .profile(SessionId::new(), &topic(), &history(), "I hate commuting")
                .await;

            assert_eq!(derived.source, ProfileSource::Generated);
            assert_eq!(derived.profile.stance(), Stance::Pro);
            assert_eq!(derived.profile.style(), "casual");
            assert_eq!(derived.profile.change_readiness(), Readiness::new(2).unwrap());
            assert_eq!(derived.profile.key_values(), ["family time".to_string()]);
        }

        #[tokio::test]
        async fn missing_fields_take_defaults() {
            let gen = ScriptedGeneration::new().with_classification(json!({"stance": "against"}));
            let derived = profiler(gen)
                .profile(SessionId::new(), &topic(), &history(), "No.")
                .await;

            assert_eq!(derived.profile.stance(), Stance::Anti);
            assert_eq!(derived.profile.change_readiness(), Readiness::MIDPOINT);
            assert!(derived.profile.key_values().is_empty());
        }

        #[tokio::test]
        async fn sends_latest_message_in_prompt() {
            let gen = ScriptedGeneration::new().with_classification(json!({"stance": "pro"}));
            profiler(gen.clone())
                .profile(SessionId::new(), &topic(), &history(), "I hate commuting")
                .await;

            let prompts = gen.classify_prompts();
            assert_eq!(prompts.len(), 1);
            assert!(prompts[0].user.contains("\"I hate commuting\""));
        }
    }

    mod failure {
        use super::*;

        #[tokio::test]
        async fn generation_error_gives_default() {
            let gen = ScriptedGeneration::new()
                .with_classify_error(GenerationError::Provider(AIError::AuthenticationFailed));
            let derived = profiler(gen)
                .profile(SessionId::new(), &topic(), &history(), "hi")
                .await;

            assert_eq!(derived.profile, Profile::default());
            assert_eq!(derived.source, ProfileSource::fallback("provider_error"));
        }

        #[tokio::test]
        async fn timeout_gives_default() {
            let gen = ScriptedGeneration::new()
                .with_classify_error(GenerationError::Timeout { after_secs: 30 });
            let derived = profiler(gen)
                .profile(SessionId::new(), &topic(), &history(), "hi")
                .await;
            assert_eq!(derived.source, ProfileSource::fallback("timeout"));
        }

        #[tokio::test]
        async fn non_object_gives_default() {
            let gen = ScriptedGeneration::new().with_classification(json!(["pro"]));
            let derived = profiler(gen)
                .profile(SessionId::new(), &topic(), &history(), "hi")
                .await;
            assert_eq!(derived.profile, Profile::default());
            assert!(derived.source.is_fallback());
        }

        #[tokio::test]
        async fn unrecognised_fields_give_default() {
            let gen = ScriptedGeneration::new().with_classification(json!({"mood_ring": "blue"}));
            let derived = profiler(gen)
                .profile(SessionId::new(), &topic(), &history(), "hi")
                .await;
            assert_eq!(derived.source, ProfileSource::fallback("no_profile_fields"));
        }
    }

    fn arbitrary_json() -> impl Strategy<Value = serde_json::Value> {
        let leaf = prop_oneof![
            Just(serde_json::Value::Null),
            any::<bool>().prop_map(serde_json::Value::from),
            any::<f64>().prop_map(|f| json!(f)),
            any::<i64>().prop_map(serde_json::Value::from),
            ".{0,20}".prop_map(serde_json::Value::from),
        ];
        leaf.prop_recursive(3, 24, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(serde_json::Value::from),
                prop::collection::hash_map(
                    prop_oneof![
                        Just("stance".to_string()),
                        Just("confidence".to_string()),
                        Just("change_readiness".to_string()),
                        Just("key_values".to_string()),
                        Just("guidance".to_string()),
                        Just("tone".to_string()),
                        "[a-z]{1,8}",
                    ],
                    inner,
                    0..6
                )
                .prop_map(|m| serde_json::Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn any_output_yields_complete_profile(value in arbitrary_json()) {
            let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            let gen = ScriptedGeneration::new().with_classification(value);
            let derived = rt.block_on(
                profiler(gen).profile(SessionId::new(), &topic(), &History::new(), "hi"),
            );
            let profile = derived.profile;

            prop_assert!((0.0..=1.0).contains(&profile.confidence().value()));
            prop_assert!(profile.change_readiness().value() <= 10);
            prop_assert!(!profile.style().is_empty());
            prop_assert!(!profile.emotional_state().is_empty());
            prop_assert!(profile.key_values().len() <= crate::domain::profile::MAX_LIST_ITEMS);
        }
    }
}
