//! Turn-loop configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::application::ConversationSettings;
use crate::domain::conversation::{ReplyLimits, StageThresholds, WindowLimits};
use crate::domain::profile::Stance;

/// Stage thresholds, reply limits, history window and target stance
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ConversationConfig {
    /// Turns that stay in rapport (T1)
    #[serde(default = "default_rapport_turns")]
    pub rapport_turns: usize,

    /// Turns that stay in explore or earlier (T2)
    #[serde(default = "default_explore_turns")]
    pub explore_turns: usize,

    /// Readiness below which the conversation wraps up (R_min)
    #[serde(default = "default_min_readiness")]
    pub min_readiness: u8,

    #[serde(default = "default_max_reply_words")]
    pub max_reply_words: usize,

    #[serde(default = "default_max_reply_sentences")]
    pub max_reply_sentences: usize,

    /// Most messages sent to the generation service per call
    #[serde(default = "default_history_max_messages")]
    pub history_max_messages: usize,

    /// Approximate token budget for history per call
    #[serde(default = "default_history_token_budget")]
    pub history_token_budget: usize,

    /// Fixed target stance ("pro" or "anti"); derived per session when unset
    pub target_stance: Option<String>,
}

impl ConversationConfig {
    /// Validate conversation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.explore_turns < self.rapport_turns {
            return Err(ValidationError::InvalidStageOrder {
                rapport: self.rapport_turns,
                explore: self.explore_turns,
            });
        }
        if self.min_readiness > 10 {
            return Err(ValidationError::InvalidReadiness(self.min_readiness));
        }
        if self.max_reply_words == 0 {
            return Err(ValidationError::InvalidReplyLimits("max_reply_words must be > 0"));
        }
        if self.max_reply_sentences == 0 {
            return Err(ValidationError::InvalidReplyLimits(
                "max_reply_sentences must be > 0",
            ));
        }
        if self.history_max_messages == 0 {
            return Err(ValidationError::InvalidHistoryWindow(
                "history_max_messages must be > 0",
            ));
        }
        if self.history_token_budget == 0 {
            return Err(ValidationError::InvalidHistoryWindow(
                "history_token_budget must be > 0",
            ));
        }
        self.target()?;
        Ok(())
    }

    /// Parsed target stance
    pub fn target(&self) -> Result<Option<Stance>, ValidationError> {
        match self.target_stance.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => match raw.parse::<Stance>() {
                Ok(stance) if stance.is_polar() => Ok(Some(stance)),
                _ => Err(ValidationError::InvalidTargetStance(raw.to_string())),
            },
        }
    }

    /// Settings for the orchestrator
    pub fn settings(&self) -> Result<ConversationSettings, ValidationError> {
        self.validate()?;
        let thresholds =
            StageThresholds::new(self.rapport_turns, self.explore_turns, self.min_readiness)
                .map_err(|_| ValidationError::InvalidStageOrder {
                    rapport: self.rapport_turns,
                    explore: self.explore_turns,
                })?;

        Ok(ConversationSettings {
            thresholds,
            reply_limits: ReplyLimits {
                max_words: self.max_reply_words,
                max_sentences: self.max_reply_sentences,
            },
            window: WindowLimits {
                max_messages: self.history_max_messages,
                token_budget: self.history_token_budget,
            },
            target_stance: self.target()?,
        })
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            rapport_turns: default_rapport_turns(),
            explore_turns: default_explore_turns(),
            min_readiness: default_min_readiness(),
            max_reply_words: default_max_reply_words(),
            max_reply_sentences: default_max_reply_sentences(),
            history_max_messages: default_history_max_messages(),
            history_token_budget: default_history_token_budget(),
            target_stance: None,
        }
    }
}

fn default_rapport_turns() -> usize {
    1
}

fn default_explore_turns() -> usize {
    3
}

fn default_min_readiness() -> u8 {
    3
}

fn default_max_reply_words() -> usize {
    35
}

fn default_max_reply_sentences() -> usize {
    2
}

fn default_history_max_messages() -> usize {
    20
}

fn default_history_token_budget() -> usize {
    4_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_domain_defaults() {
        let settings = ConversationConfig::default().settings().unwrap();
        assert_eq!(settings.thresholds, StageThresholds::default());
        assert_eq!(settings.reply_limits, ReplyLimits::default());
        assert_eq!(settings.window, WindowLimits::default());
        assert_eq!(settings.target_stance, None);
    }

    #[test]
    fn test_explore_before_rapport_is_invalid() {
        let config = ConversationConfig {
            rapport_turns: 4,
            explore_turns: 2,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidStageOrder { .. })
        ));
    }

    #[test]
    fn test_readiness_out_of_scale_is_invalid() {
        let config = ConversationConfig {
            min_readiness: 11,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidReadiness(11)));
    }

    #[test]
    fn test_zero_words_is_invalid() {
        let config = ConversationConfig {
            max_reply_words: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_target_stance_parsing() {
        let config = ConversationConfig {
            target_stance: Some("anti".to_string()),
            ..Default::default()
        };
        assert_eq!(config.target().unwrap(), Some(Stance::Anti));

        let mixed = ConversationConfig {
            target_stance: Some("mixed".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            mixed.validate(),
            Err(ValidationError::InvalidTargetStance(_))
        ));
    }
}
