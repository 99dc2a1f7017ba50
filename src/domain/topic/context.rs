use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::foundation::{TopicId, ValidationError};

/// Raw topic entry as stored in a catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub questions: Vec<String>,
}

/// Immutable descriptor of a discussion subject and its probe questions.
///
/// Questions are non-empty and unique, in catalog order. A topic with no
/// questions is valid; the survey then averages to the neutral midpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TopicRecord", into = "TopicRecord")]
pub struct TopicContext {
    id: TopicId,
    title: String,
    description: String,
    questions: Vec<String>,
}

impl TopicContext {
    /// Creates a validated topic.
    pub fn new(
        id: TopicId,
        title: impl Into<String>,
        description: impl Into<String>,
        questions: Vec<String>,
    ) -> Result<Self, ValidationError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::empty_field("title"));
        }

        let mut seen = HashSet::new();
        let mut cleaned = Vec::with_capacity(questions.len());
        for question in questions {
            let question = question.trim().to_string();
            if question.is_empty() {
                return Err(ValidationError::empty_field("questions"));
            }
            if !seen.insert(question.clone()) {
                return Err(ValidationError::invalid_format(
                    "questions",
                    format!("duplicate question '{}'", question),
                ));
            }
            cleaned.push(question);
        }

        Ok(Self {
            id,
            title,
            description: description.into().trim().to_string(),
            questions: cleaned,
        })
    }

    pub fn id(&self) -> &TopicId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    /// True when `question` is one of this topic's probe questions.
    pub fn has_question(&self, question: &str) -> bool {
        self.questions.iter().any(|q| q == question)
    }

    /// Description for prompts, falling back to the title when none is set.
    pub fn prompt_description(&self) -> &str {
        if self.description.is_empty() {
            &self.title
        } else {
            &self.description
        }
    }
}

impl TryFrom<TopicRecord> for TopicContext {
    type Error = ValidationError;

    fn try_from(record: TopicRecord) -> Result<Self, Self::Error> {
        TopicContext::new(
            TopicId::new(record.id)?,
            record.title,
            record.description,
            record.questions,
        )
    }
}

impl From<TopicContext> for TopicRecord {
    fn from(topic: TopicContext) -> Self {
        TopicRecord {
            id: topic.id.as_str().to_string(),
            title: topic.title,
            description: topic.description,
            questions: topic.questions,
        }
    }
}
