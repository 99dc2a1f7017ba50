//! Survey Profiler - initial profile from the pre-conversation questionnaire.
//!
//! The stance comes from the survey average and the fixed bands; that part
//! never calls the generation service. Generation only elaborates the rest
//! of the profile, and whatever stance it returns is overridden.

use std::sync::Arc;

use crate::domain::foundation::SessionId;
use crate::domain::profile::{Profile, ProfileDraft};
use crate::domain::survey::{StanceBand, SurveyAnswers};
use crate::domain::topic::TopicContext;
use crate::ports::GenerationService;

use super::message_profiler::{DerivedProfile, ProfileSource};
use super::prompts;

/// Survey-derived profile with the arithmetic behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyProfile {
    pub average: f64,
    pub band: StanceBand,
    pub derived: DerivedProfile,
}

impl SurveyProfile {
    pub fn profile(&self) -> &Profile {
        &self.derived.profile
    }
}

#[derive(Clone)]
pub struct SurveyProfiler {
    generation: Arc<dyn GenerationService>,
}

impl SurveyProfiler {
    pub fn new(generation: Arc<dyn GenerationService>) -> Self {
        Self { generation }
    }

    pub async fn profile(
        &self,
        session_id: SessionId,
        topic: &TopicContext,
        answers: &SurveyAnswers,
    ) -> SurveyProfile {
        let average = answers.average();
        let band = StanceBand::of(average);
        let stance = band.stance();
        let fallback = Profile::survey_default(stance);

        for (question, _) in answers.iter() {
            if !topic.has_question(question) {
                tracing::debug!(session_id = %session_id, question, "Survey answer for a question not in the topic");
            }
        }

        tracing::info!(
            session_id = %session_id,
            answers = answers.len(),
            average,
            stance = stance.label(),
            "Survey classified"
        );

        let prompt = prompts::survey_profile(session_id, topic, answers, average, band);
        let derived = match self.generation.classify(prompt).await {
            Ok(value) => match ProfileDraft::from_json(&value) {
                Some(draft) if !draft.is_empty() => {
                    if draft.stance.is_some_and(|s| s != stance) {
                        tracing::debug!(
                            session_id = %session_id,
                            "Generated stance differs from survey band, keeping survey stance"
                        );
                    }
                    DerivedProfile {
                        profile: draft.into_profile(&fallback).with_stance(stance),
                        source: ProfileSource::Generated,
                    }
                }
                Some(_) => Self::fallback(session_id, fallback, "no_profile_fields"),
                None => Self::fallback(session_id, fallback, "not_an_object"),
            },
            Err(err) => Self::fallback(session_id, fallback, err.reason()),
        };

        SurveyProfile {
            average,
            band,
            derived,
        }
    }

    fn fallback(session_id: SessionId, profile: Profile, reason: &str) -> DerivedProfile {
        tracing::warn!(
            session_id = %session_id,
            reason,
            "Survey elaboration failed, using survey default profile"
        );
        DerivedProfile {
            profile,
            source: ProfileSource::fallback(reason),
        }
    }
}
