//! The immutable record of a finished session.

use serde::{Deserialize, Serialize};

use crate::domain::conversation::History;
use crate::domain::foundation::{SessionId, Timestamp, TopicId};
use crate::domain::profile::{Profile, Stance};
use crate::domain::survey::SurveyAnswers;
use crate::domain::topic::TopicContext;

/// Everything persistence needs about a finalized session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedSession {
    pub session_id: SessionId,
    pub topic_id: TopicId,
    pub topic_title: String,
    pub target_stance: Stance,
    pub pre_survey: SurveyAnswers,
    pub post_survey: SurveyAnswers,
    pub pre_average: f64,
    pub post_average: f64,
    /// Post average minus pre average.
    pub stance_shift: f64,
    pub history: History,
    pub final_profile: Profile,
    pub started_at: Timestamp,
    pub last_activity_at: Timestamp,
    pub finalized_at: Timestamp,
}

impl FinalizedSession {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session_id: SessionId,
        topic: &TopicContext,
        target_stance: Stance,
        pre_survey: SurveyAnswers,
        post_survey: SurveyAnswers,
        history: History,
        final_profile: Profile,
        started_at: Timestamp,
        last_activity_at: Timestamp,
    ) -> Self {
        let pre_average = pre_survey.average();
        let post_average = post_survey.average();
        Self {
            session_id,
            topic_id: topic.id().clone(),
            topic_title: topic.title().to_string(),
            target_stance,
            pre_survey,
            post_survey,
            pre_average,
            post_average,
            stance_shift: post_average - pre_average,
            history,
            final_profile,
            started_at,
            last_activity_at,
            finalized_at: Timestamp::now(),
        }
    }

    /// True when the post-survey moved toward the target stance.
    pub fn moved_toward_target(&self) -> bool {
        match self.target_stance {
            Stance::Pro => self.stance_shift > 0.0,
            Stance::Anti => self.stance_shift < 0.0,
            Stance::Mixed | Stance::Unknown => false,
        }
    }
}
