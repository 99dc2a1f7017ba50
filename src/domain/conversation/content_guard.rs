//! Denylist check for utterances that must stay free of facts and figures.

use std::fmt;

/// Phrases that mark an appeal to evidence or authority.
pub const CITATION_MARKERS: &[&str] = &[
    "studies show",
    "study shows",
    "a study",
    "studies have",
    "research shows",
    "research suggests",
    "research has",
    "according to",
    "expert",
    "scientists",
    "statistic",
    "data shows",
    "data show",
    "evidence shows",
    "surveys show",
    "percent",
    "per cent",
];

/// Why an utterance was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardViolation {
    NumericToken(String),
    PercentSign,
    CitationMarker(&'static str),
}

impl fmt::Display for GuardViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardViolation::NumericToken(token) => write!(f, "numeric token '{}'", token),
            GuardViolation::PercentSign => write!(f, "percent sign"),
            GuardViolation::CitationMarker(marker) => write!(f, "citation marker '{}'", marker),
        }
    }
}

/// Rejects text containing digits, percent signs or citation phrases.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentGuard;

impl ContentGuard {
    pub fn new() -> Self {
        Self
    }

    pub fn check(&self, text: &str) -> Result<(), GuardViolation> {
        if text.contains('%') {
            return Err(GuardViolation::PercentSign);
        }

        if let Some(token) = text
            .split_whitespace()
            .find(|word| word.chars().any(|c| c.is_ascii_digit()))
        {
            return Err(GuardViolation::NumericToken(token.to_string()));
        }

        let lowered = text.to_lowercase();
        if let Some(marker) = CITATION_MARKERS.iter().copied().find(|m| lowered.contains(m)) {
            return Err(GuardViolation::CitationMarker(marker));
        }

        Ok(())
    }

    pub fn is_clean(&self, text: &str) -> bool {
        self.check(text).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_empathy() {
        let guard = ContentGuard::new();
        assert!(guard.is_clean("I'd love to hear what matters most to you here. What shapes your view?"));
    }

    #[test]
    fn rejects_numbers() {
        assert_eq!(
            ContentGuard::new().check("Over 70 million people agree."),
            Err(GuardViolation::NumericToken("70".to_string()))
        );
    }

    #[test]
    fn rejects_percent_sign() {
        assert_eq!(ContentGuard::new().check("Most %"), Err(GuardViolation::PercentSign));
    }

    #[test]
    fn rejects_citation_markers_case_insensitively() {
        assert!(matches!(
            ContentGuard::new().check("Studies show otherwise."),
            Err(GuardViolation::CitationMarker("studies show"))
        ));
        assert!(!ContentGuard::new().is_clean("Many experts disagree."));
        assert!(!ContentGuard::new().is_clean("According to the report, it's fine."));
    }

    #[test]
    fn violation_displays_reason() {
        let violation = GuardViolation::CitationMarker("according to");
        assert_eq!(violation.to_string(), "citation marker 'according to'");
    }
}
