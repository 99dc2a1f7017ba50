//! Stance of the counterpart relative to the topic's proposition.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Position held on the topic's proposition.
///
/// `Pro` means agreeing with the proposition the probe questions state,
/// `Anti` disagreeing with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    Pro,
    Anti,
    Mixed,
    #[default]
    Unknown,
}

const MIXED_TOKENS: &[&str] = &[
    "mixed", "neutral", "undecided", "ambivalent", "unsure", "torn", "both",
];
const ANTI_TOKENS: &[&str] = &[
    "anti", "against", "oppose", "opposed", "opposes", "opposing", "con", "disagree",
    "disagrees", "negative", "skeptical", "sceptical",
];
const PRO_TOKENS: &[&str] = &[
    "pro", "favor", "favour", "favorable", "favourable", "support", "supports", "supportive",
    "agree", "agrees", "positive", "for",
];
const NEGATIONS: &[&str] = &["not", "no", "never"];

impl Stance {
    /// Short machine label.
    pub fn label(&self) -> &'static str {
        match self {
            Stance::Pro => "pro",
            Stance::Anti => "anti",
            Stance::Mixed => "mixed",
            Stance::Unknown => "unknown",
        }
    }

    /// Human phrasing used inside prompts.
    pub fn description(&self) -> &'static str {
        match self {
            Stance::Pro => "in favor",
            Stance::Anti => "against",
            Stance::Mixed => "mixed or undecided",
            Stance::Unknown => "not yet clear",
        }
    }

    /// True for the two committed positions.
    pub fn is_polar(&self) -> bool {
        matches!(self, Stance::Pro | Stance::Anti)
    }

    /// The committed position on the other side; non-polar stances map to themselves.
    pub fn opposite(&self) -> Stance {
        match self {
            Stance::Pro => Stance::Anti,
            Stance::Anti => Stance::Pro,
            other => *other,
        }
    }

    /// Reads free-form stance phrasing ("strongly in favor", "neutral/mixed",
    /// "not in favor") into a stance. Anything unrecognised is `Unknown`.
    pub fn parse_lenient(raw: &str) -> Stance {
        let lowered = raw.trim().to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();

        let has = |set: &[&str]| tokens.iter().any(|t| set.contains(t));

        if has(MIXED_TOKENS) {
            return Stance::Mixed;
        }
        let anti = has(ANTI_TOKENS);
        let pro = has(PRO_TOKENS);
        let negated = has(NEGATIONS);

        match (pro, anti) {
            (true, false) if negated => Stance::Anti,
            (true, false) => Stance::Pro,
            (false, true) => Stance::Anti,
            (true, true) => Stance::Mixed,
            (false, false) => Stance::Unknown,
        }
    }
}

impl fmt::Display for Stance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Stance {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pro" => Ok(Stance::Pro),
            "anti" => Ok(Stance::Anti),
            "mixed" => Ok(Stance::Mixed),
            "unknown" => Ok(Stance::Unknown),
            other => Err(ValidationError::invalid_format(
                "stance",
                format!("expected pro, anti, mixed or unknown, got '{}'", other),
            )),
        }
    }
}
