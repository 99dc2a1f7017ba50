//! Per-session service handles.
//!
//! A `SessionServices` bundle is cloned into every orchestrator. The
//! generation client and the archive are shared and stateless; nothing in
//! here is a process-wide singleton.

use std::sync::Arc;

use crate::domain::conversation::{ContextWindow, ReplyLimits, StageSelector, StageThresholds, WindowLimits};
use crate::domain::profile::Stance;
use crate::ports::{GenerationService, SessionArchive};

use super::{MessageProfiler, ReplyPlanner, SurveyProfiler};

/// Tunables for the turn loop.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConversationSettings {
    pub thresholds: StageThresholds,
    pub reply_limits: ReplyLimits,
    pub window: WindowLimits,
    /// Target used when the pre-survey event names none.
    pub target_stance: Option<Stance>,
}

/// Collaborators injected into each session.
#[derive(Clone)]
pub struct SessionServices {
    pub generation: Arc<dyn GenerationService>,
    pub archive: Arc<dyn SessionArchive>,
    pub settings: ConversationSettings,
}

impl SessionServices {
    pub fn new(
        generation: Arc<dyn GenerationService>,
        archive: Arc<dyn SessionArchive>,
        settings: ConversationSettings,
    ) -> Self {
        Self {
            generation,
            archive,
            settings,
        }
    }

    pub fn survey_profiler(&self) -> SurveyProfiler {
        SurveyProfiler::new(Arc::clone(&self.generation))
    }

    pub fn message_profiler(&self) -> MessageProfiler {
        MessageProfiler::new(
            Arc::clone(&self.generation),
            ContextWindow::new(self.settings.window),
        )
    }

    pub fn reply_planner(&self) -> ReplyPlanner {
        ReplyPlanner::new(
            Arc::clone(&self.generation),
            self.settings.reply_limits,
            ContextWindow::new(self.settings.window),
        )
    }

    pub fn stage_selector(&self) -> StageSelector {
        StageSelector::new(self.settings.thresholds)
    }
}
