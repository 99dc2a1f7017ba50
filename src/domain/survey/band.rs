//! Fixed band classification of a survey average.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::profile::Stance;

/// Averages strictly below this are anti-leaning.
pub const ANTI_BELOW: f64 = 4.0;

/// Averages at or above this are pro-leaning.
pub const PRO_FROM: f64 = 6.0;

/// Band an average falls into, with its survey wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StanceBand {
    Low,
    Middle,
    High,
}

impl StanceBand {
    /// Classifies an average on the 0-10 scale. Pure arithmetic.
    pub fn of(average: f64) -> Self {
        if average < ANTI_BELOW {
            StanceBand::Low
        } else if average < PRO_FROM {
            StanceBand::Middle
        } else {
            StanceBand::High
        }
    }

    pub fn stance(&self) -> Stance {
        match self {
            StanceBand::Low => Stance::Anti,
            StanceBand::Middle => Stance::Mixed,
            StanceBand::High => Stance::Pro,
        }
    }

    /// Wording shown to the generation service alongside the stance.
    pub fn wording(&self) -> &'static str {
        match self {
            StanceBand::Low => "strongly against",
            StanceBand::Middle => "neutral/mixed",
            StanceBand::High => "strongly in favor",
        }
    }
}

impl fmt::Display for StanceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wording())
    }
}

/// Stance for a survey average.
pub fn classify_average(average: f64) -> Stance {
    StanceBand::of(average).stance()
}
