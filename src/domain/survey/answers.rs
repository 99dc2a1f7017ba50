//! Answers to one survey.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{SurveyRating, StanceBand};

/// Ratings keyed by question text.
///
/// Built leniently: out-of-range or fractional ratings are clamped onto
/// the scale with a warning and blank questions are dropped, so a survey
/// never dead-ends the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, f64>")]
pub struct SurveyAnswers(BTreeMap<String, SurveyRating>);

impl SurveyAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an answer, replacing any earlier one for the same question.
    pub fn with(mut self, question: impl Into<String>, rating: SurveyRating) -> Self {
        self.insert(question, rating);
        self
    }

    pub fn insert(&mut self, question: impl Into<String>, rating: SurveyRating) {
        let question = question.into().trim().to_string();
        if !question.is_empty() {
            self.0.insert(question, rating);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, question: &str) -> Option<SurveyRating> {
        self.0.get(question).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SurveyRating)> {
        self.0.iter().map(|(q, r)| (q.as_str(), *r))
    }

    /// Arithmetic mean of the ratings. An empty survey averages to the
    /// scale midpoint.
    pub fn average(&self) -> f64 {
        if self.0.is_empty() {
            return SurveyRating::MIDPOINT.value() as f64;
        }
        let total: u32 = self.0.values().map(|r| r.value() as u32).sum();
        total as f64 / self.0.len() as f64
    }

    pub fn band(&self) -> StanceBand {
        StanceBand::of(self.average())
    }
}

impl From<BTreeMap<String, f64>> for SurveyAnswers {
    fn from(raw: BTreeMap<String, f64>) -> Self {
        let mut answers = SurveyAnswers::new();
        for (question, value) in raw {
            let (rating, adjusted) = SurveyRating::clamped(value);
            if adjusted {
                tracing::warn!(
                    question = %question,
                    raw = value,
                    rating = rating.value(),
                    "Survey rating adjusted onto the 0-10 scale"
                );
            }
            answers.insert(question, rating);
        }
        answers
    }
}

impl FromIterator<(String, SurveyRating)> for SurveyAnswers {
    fn from_iter<I: IntoIterator<Item = (String, SurveyRating)>>(iter: I) -> Self {
        let mut answers = SurveyAnswers::new();
        for (question, rating) in iter {
            answers.insert(question, rating);
        }
        answers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::Stance;
    use proptest::prelude::*;

    fn rating(v: u8) -> SurveyRating {
        SurveyRating::new(v).unwrap()
    }

    mod average {
        use super::*;

        #[test]
        fn empty_survey_is_midpoint() {
            assert_eq!(SurveyAnswers::new().average(), 5.0);
            assert_eq!(SurveyAnswers::new().band().stance(), Stance::Mixed);
        }

        #[test]
        fn computes_mean() {
            let answers = SurveyAnswers::new().with("Q1", rating(9)).with("Q2", rating(8));
            assert_eq!(answers.average(), 8.5);
            assert_eq!(answers.band().stance(), Stance::Pro);
        }

        #[test]
        fn later_answer_replaces_earlier() {
            let answers = SurveyAnswers::new().with("Q1", rating(1)).with("Q1", rating(9));
            assert_eq!(answers.len(), 1);
            assert_eq!(answers.get("Q1"), Some(rating(9)));
        }

        #[test]
        fn blank_questions_are_dropped() {
            let answers = SurveyAnswers::new().with("  ", rating(1));
            assert!(answers.is_empty());
        }
    }

    mod deserialization {
        use super::*;

        #[test]
        fn reads_json_object() {
            let answers: SurveyAnswers = serde_json::from_str(r#"{"Q1": 9, "Q2": 8}"#).unwrap();
            assert_eq!(answers.average(), 8.5);
        }

        #[test]
        fn clamps_out_of_range_values() {
            let answers: SurveyAnswers =
                serde_json::from_str(r#"{"Q1": 14, "Q2": -3, "Q3": 6.6}"#).unwrap();
            assert_eq!(answers.get("Q1"), Some(rating(10)));
            assert_eq!(answers.get("Q2"), Some(rating(0)));
            assert_eq!(answers.get("Q3"), Some(rating(7)));
        }

        #[test]
        fn serializes_as_plain_numbers() {
            let answers = SurveyAnswers::new().with("Q1", rating(3));
            assert_eq!(serde_json::to_string(&answers).unwrap(), r#"{"Q1":3}"#);
        }
    }

    proptest! {
        #[test]
        fn uniform_answers_classify_by_value(v in 0u8..=10, n in 1usize..6) {
            let answers: SurveyAnswers = (0..n)
                .map(|i| (format!("Q{}", i), rating(v)))
                .collect();
            let expected = if v < 4 {
                Stance::Anti
            } else if v < 6 {
                Stance::Mixed
            } else {
                Stance::Pro
            };
            prop_assert_eq!(answers.band().stance(), expected);
        }
    }
}
