//! Reply policy: what the next utterance may and may not do.
//!
//! The policy is the contract handed to the generation service. It is
//! derived from the stage and profile alone, never from prompt wording.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Stage;
use crate::domain::profile::{Profile, Stance};

/// A conversational move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tactic {
    Validation,
    Empathy,
    OpenQuestion,
    CuriosityProbe,
    Reflection,
    Counterpoint,
    ConcreteExample,
    CommonGround,
    AffirmAutonomy,

    Argument,
    Statistic,
    ExpertCitation,
    InfoDump,
    RepeatedCitation,
    PersuasivePush,

    FalseUrgency,
    EmotionalExploitation,
    FabricatedFacts,
    PersonalAttack,
}

impl Tactic {
    /// Tactics forbidden in every stage.
    pub const MANIPULATIVE: [Tactic; 4] = [
        Tactic::FalseUrgency,
        Tactic::EmotionalExploitation,
        Tactic::FabricatedFacts,
        Tactic::PersonalAttack,
    ];

    pub fn is_manipulative(&self) -> bool {
        Self::MANIPULATIVE.contains(self)
    }

    /// Instruction phrasing.
    pub fn describe(&self) -> &'static str {
        match self {
            Tactic::Validation => "validate their feelings and reasoning",
            Tactic::Empathy => "show genuine empathy",
            Tactic::OpenQuestion => "ask an open question about their reasoning",
            Tactic::CuriosityProbe => "probe with curiosity into why they hold this view",
            Tactic::Reflection => "reflect back what they said in your own words",
            Tactic::Counterpoint => {
                "offer exactly one concrete counterpoint tied to a value they stated"
            }
            Tactic::ConcreteExample => "use at most one concrete example or datum",
            Tactic::CommonGround => "summarize the common ground you found",
            Tactic::AffirmAutonomy => "affirm that the decision is entirely theirs",
            Tactic::Argument => "arguments for either side",
            Tactic::Statistic => "statistics, numbers or percentages",
            Tactic::ExpertCitation => "citing experts, studies or research",
            Tactic::InfoDump => "listing several facts at once",
            Tactic::RepeatedCitation => "more than one 'studies show' style reference",
            Tactic::PersuasivePush => "any further attempt to change their mind",
            Tactic::FalseUrgency => "false urgency or pressure",
            Tactic::EmotionalExploitation => "exploiting fear, guilt or shame",
            Tactic::FabricatedFacts => "invented or unverifiable facts",
            Tactic::PersonalAttack => "attacking or belittling the person",
        }
    }
}

impl fmt::Display for Tactic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// Length limits applied to every reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyLimits {
    pub max_words: usize,
    pub max_sentences: usize,
}

impl Default for ReplyLimits {
    fn default() -> Self {
        Self {
            max_words: 35,
            max_sentences: 2,
        }
    }
}

/// Constraints gating the next utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyPolicy {
    pub stage: Stage,
    pub goal: String,
    pub permitted: Vec<Tactic>,
    pub forbidden: Vec<Tactic>,
    /// Maximum questions in the reply.
    pub question_budget: u8,
    pub limits: ReplyLimits,
    /// Side the reply argues for.
    pub advocate: Stance,
    /// Reply must explicitly pick up something the counterpart just said.
    pub must_reference_latest: bool,
}

impl ReplyPolicy {
    /// Builds the policy for `stage`. The advocated side is always the
    /// opposite of the counterpart's current stance, so it flips when they do.
    pub fn for_stage(stage: Stage, profile: &Profile, target: Stance, limits: ReplyLimits) -> Self {
        let (goal, permitted, forbidden, question_budget) = match stage {
            Stage::Rapport => (
                "Build rapport and understand why they hold their view.",
                vec![Tactic::Validation, Tactic::Empathy, Tactic::OpenQuestion],
                vec![
                    Tactic::Argument,
                    Tactic::Statistic,
                    Tactic::ExpertCitation,
                    Tactic::Counterpoint,
                ],
                1,
            ),
            Stage::Explore => (
                "Explore the values and experiences behind their view.",
                vec![
                    Tactic::CuriosityProbe,
                    Tactic::Reflection,
                    Tactic::Validation,
                    Tactic::Empathy,
                ],
                vec![Tactic::Statistic, Tactic::ExpertCitation],
                1,
            ),
            Stage::Challenge => (
                "Respectfully challenge their view from the other side.",
                vec![
                    Tactic::Counterpoint,
                    Tactic::ConcreteExample,
                    Tactic::Validation,
                    Tactic::OpenQuestion,
                ],
                vec![Tactic::InfoDump, Tactic::RepeatedCitation],
                1,
            ),
            Stage::WrapUp => (
                "Close warmly without pushing further.",
                vec![Tactic::CommonGround, Tactic::AffirmAutonomy, Tactic::Validation],
                vec![
                    Tactic::PersuasivePush,
                    Tactic::Counterpoint,
                    Tactic::Argument,
                    Tactic::Statistic,
                ],
                0,
            ),
        };

        let mut forbidden = forbidden;
        forbidden.extend(Tactic::MANIPULATIVE);

        Self {
            stage,
            goal: goal.to_string(),
            permitted,
            forbidden,
            question_budget,
            limits,
            advocate: advocate_for(profile.stance(), target),
            must_reference_latest: true,
        }
    }

    /// Policy for the first utterance, before the counterpart has said
    /// anything: rapport content with no facts, numbers or experts.
    pub fn opening(profile: &Profile, target: Stance, limits: ReplyLimits) -> Self {
        let mut policy = Self::for_stage(Stage::Rapport, profile, target, limits);
        policy.goal = "Open the conversation warmly and invite them to share their view."
            .to_string();
        policy.forbidden.push(Tactic::InfoDump);
        policy.must_reference_latest = false;
        policy
    }

    pub fn permits(&self, tactic: Tactic) -> bool {
        self.permitted.contains(&tactic) && !self.forbids(tactic)
    }

    pub fn forbids(&self, tactic: Tactic) -> bool {
        self.forbidden.contains(&tactic)
    }

    /// Renders the policy as an instruction block for the generation prompt.
    pub fn render_instructions(&self) -> String {
        let mut lines = vec![
            format!("Stage: {}", self.stage),
            format!("Goal: {}", self.goal),
        ];

        if self.stage == Stage::Challenge {
            lines.push(format!(
                "Gently argue the {} side of the topic.",
                self.advocate.label()
            ));
        }

        lines.push("You may:".to_string());
        lines.extend(self.permitted.iter().map(|t| format!("- {}", t.describe())));
        lines.push("Never use:".to_string());
        lines.extend(self.forbidden.iter().map(|t| format!("- {}", t.describe())));

        lines.push(match self.question_budget {
            0 => "Do not ask any questions.".to_string(),
            1 => "Ask at most one question.".to_string(),
            n => format!("Ask at most {} questions.", n),
        });
        lines.push(format!(
            "Keep it to at most {} sentences and {} words.",
            self.limits.max_sentences, self.limits.max_words
        ));
        if self.must_reference_latest {
            lines.push(
                "Refer explicitly to one specific thing they just said.".to_string(),
            );
        }

        lines.join("\n")
    }
}

/// Side to argue for: the opposite of a committed stance, otherwise the target.
pub fn advocate_for(current: Stance, target: Stance) -> Stance {
    if current.is_polar() {
        current.opposite()
    } else {
        target
    }
}
