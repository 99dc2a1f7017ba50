//! Conversational stages and the stage selector.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;
use crate::domain::profile::{Profile, Readiness, Stance};

/// Phase of the dialogue policy for one turn.
///
/// Recomputed every turn, never stored as its own entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Rapport,
    Explore,
    Challenge,
    WrapUp,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Rapport => "rapport",
            Stage::Explore => "explore",
            Stage::Challenge => "challenge",
            Stage::WrapUp => "wrap_up",
        }
    }

    /// Stages that come before the position is contested.
    pub fn is_opening(&self) -> bool {
        matches!(self, Stage::Rapport | Stage::Explore)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Turn and readiness thresholds driving stage selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageThresholds {
    /// Turns up to and including this one are rapport (T1).
    pub rapport_turns: usize,
    /// Turns up to and including this one are explore (T2).
    pub explore_turns: usize,
    /// Readiness below this ends persuasion (R_min).
    pub min_readiness: u8,
}

impl StageThresholds {
    /// Creates thresholds, requiring T1 <= T2 and R_min within the readiness scale.
    pub fn new(
        rapport_turns: usize,
        explore_turns: usize,
        min_readiness: u8,
    ) -> Result<Self, ValidationError> {
        if explore_turns < rapport_turns {
            return Err(ValidationError::out_of_range(
                "explore_turns",
                rapport_turns as i64,
                i64::MAX,
                explore_turns as i64,
            ));
        }
        if min_readiness > Readiness::MAX {
            return Err(ValidationError::out_of_range(
                "min_readiness",
                Readiness::MIN as i64,
                Readiness::MAX as i64,
                min_readiness as i64,
            ));
        }
        Ok(Self {
            rapport_turns,
            explore_turns,
            min_readiness,
        })
    }
}

impl Default for StageThresholds {
    fn default() -> Self {
        Self {
            rapport_turns: 1,
            explore_turns: 3,
            min_readiness: 3,
        }
    }
}

/// Maps (turn count, profile, target stance) to a stage.
///
/// A pure function of its inputs: the same arguments always give the same
/// stage. Once the turn count passes the explore threshold the selector
/// only moves between challenge and wrap-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageSelector {
    thresholds: StageThresholds,
}

impl StageSelector {
    pub fn new(thresholds: StageThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &StageThresholds {
        &self.thresholds
    }

    pub fn select(&self, turn_count: usize, profile: &Profile, target: Stance) -> Stage {
        let t = &self.thresholds;
        if turn_count <= t.rapport_turns {
            Stage::Rapport
        } else if turn_count <= t.explore_turns {
            Stage::Explore
        } else if profile.stance() == target
            || profile.change_readiness().value() < t.min_readiness
        {
            Stage::WrapUp
        } else {
            Stage::Challenge
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn profile(stance: Stance, readiness: u8) -> Profile {
        Profile::new(stance).with_readiness(Readiness::new(readiness).unwrap())
    }

    fn selector() -> StageSelector {
        StageSelector::default()
    }

    mod thresholds {
        use super::*;

        #[test]
        fn defaults_match_documented_values() {
            let t = StageThresholds::default();
            assert_eq!((t.rapport_turns, t.explore_turns, t.min_readiness), (1, 3, 3));
        }

        #[test]
        fn rejects_explore_before_rapport() {
            assert!(StageThresholds::new(3, 2, 3).is_err());
            assert!(StageThresholds::new(2, 2, 3).is_ok());
        }

        #[test]
        fn rejects_readiness_above_scale() {
            assert!(StageThresholds::new(1, 3, 11).is_err());
        }
    }

    mod selection {
        use super::*;

        #[test]
        fn first_turns_are_rapport() {
            let p = profile(Stance::Anti, 9);
            assert_eq!(selector().select(0, &p, Stance::Pro), Stage::Rapport);
            assert_eq!(selector().select(1, &p, Stance::Pro), Stage::Rapport);
        }

        #[test]
        fn turns_two_and_three_are_explore() {
            let p = profile(Stance::Pro, 9);
            assert_eq!(selector().select(2, &p, Stance::Pro), Stage::Explore);
            assert_eq!(selector().select(3, &p, Stance::Pro), Stage::Explore);
        }

        #[test]
        fn matching_target_wraps_up() {
            let p = profile(Stance::Pro, 9);
            assert_eq!(selector().select(4, &p, Stance::Pro), Stage::WrapUp);
        }

        #[test]
        fn low_readiness_wraps_up() {
            let p = profile(Stance::Anti, 2);
            assert_eq!(selector().select(4, &p, Stance::Pro), Stage::WrapUp);
        }

        #[test]
        fn readiness_at_minimum_still_challenges() {
            let p = profile(Stance::Anti, 3);
            assert_eq!(selector().select(4, &p, Stance::Pro), Stage::Challenge);
        }

        #[test]
        fn moves_back_from_challenge_to_wrap_up() {
            let s = selector();
            assert_eq!(s.select(5, &profile(Stance::Anti, 6), Stance::Pro), Stage::Challenge);
            assert_eq!(s.select(6, &profile(Stance::Pro, 6), Stance::Pro), Stage::WrapUp);
        }

        #[test]
        fn custom_thresholds_shift_boundaries() {
            let s = StageSelector::new(StageThresholds::new(0, 0, 5).unwrap());
            let p = profile(Stance::Anti, 4);
            assert_eq!(s.select(0, &p, Stance::Pro), Stage::Rapport);
            assert_eq!(s.select(1, &p, Stance::Pro), Stage::WrapUp);
        }
    }

    fn any_stance() -> impl Strategy<Value = Stance> {
        prop_oneof![
            Just(Stance::Pro),
            Just(Stance::Anti),
            Just(Stance::Mixed),
            Just(Stance::Unknown),
        ]
    }

    proptest! {
        #[test]
        fn selection_is_pure(
            turn in 0usize..50,
            stance in any_stance(),
            target in any_stance(),
            readiness in 0u8..=10,
        ) {
            let p = profile(stance, readiness);
            let first = selector().select(turn, &p, target);
            let second = selector().select(turn, &p.clone(), target);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn early_turns_ignore_profile(
            turn in 0usize..=1,
            stance in any_stance(),
            target in any_stance(),
            readiness in 0u8..=10,
        ) {
            prop_assert_eq!(selector().select(turn, &profile(stance, readiness), target), Stage::Rapport);
        }

        #[test]
        fn reaching_target_after_explore_wraps_up(
            turn in 4usize..100,
            stance in any_stance(),
            readiness in 0u8..=10,
        ) {
            prop_assert_eq!(selector().select(turn, &profile(stance, readiness), stance), Stage::WrapUp);
        }

        #[test]
        fn never_returns_to_opening_stages(
            turn in 4usize..100,
            stance in any_stance(),
            target in any_stance(),
            readiness in 0u8..=10,
        ) {
            prop_assert!(!selector().select(turn, &profile(stance, readiness), target).is_opening());
        }
    }
}
