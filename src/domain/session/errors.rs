//! Session-specific error types.
//!
//! These are contract violations by the caller: events out of order,
//! events after finalization, unknown sessions. Generation failures never
//! show up here; they are recovered to defaults where they happen.

use crate::domain::foundation::{DomainError, ErrorCode, SessionId, TopicId, ValidationError};

use super::SessionStatus;

/// Session-specific errors.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Event not valid in the current lifecycle status.
    InvalidTransition {
        status: SessionStatus,
        event: &'static str,
    },
    /// Event arrived after the session was finalized.
    Finalized,
    /// A turn was attempted before the survey seeded a profile.
    ProfileNotSeeded,
    /// Session was not found.
    NotFound(SessionId),
    /// Topic was not found in the catalog.
    TopicNotFound(TopicId),
    /// Event payload failed validation.
    ValidationFailed { field: String, message: String },
    /// Collaborator failure outside the generation service.
    Infrastructure(String),
}

impl SessionError {
    pub fn invalid_transition(status: SessionStatus, event: &'static str) -> Self {
        SessionError::InvalidTransition { status, event }
    }
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SessionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }
    pub fn infrastructure(message: impl Into<String>) -> Self {
        SessionError::Infrastructure(message.into())
    }
    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
            SessionError::Finalized => ErrorCode::SessionFinalized,
            SessionError::ProfileNotSeeded => ErrorCode::ProfileNotSeeded,
            SessionError::NotFound(_) => ErrorCode::SessionNotFound,
            SessionError::TopicNotFound(_) => ErrorCode::TopicNotFound,
            SessionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SessionError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }
    pub fn message(&self) -> String {
        match self {
            SessionError::InvalidTransition { status, event } => {
                format!("Event '{}' is not valid while the session is {}", event, status)
            }
            SessionError::Finalized => "Session is finalized and no longer accepts events".to_string(),
            SessionError::ProfileNotSeeded => {
                "No profile has been seeded; submit the pre-survey first".to_string()
            }
            SessionError::NotFound(id) => format!("Session not found: {}", id),
            SessionError::TopicNotFound(id) => format!("Topic not found: {}", id),
            SessionError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            SessionError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for SessionError {}

impl From<ValidationError> for SessionError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::EmptyField { field } => {
                SessionError::validation(field, "cannot be empty")
            }
            ValidationError::OutOfRange {
                field,
                min,
                max,
                actual,
            } => SessionError::validation(
                field,
                format!("must be between {} and {}, got {}", min, max, actual),
            ),
            ValidationError::InvalidFormat { field, reason } => {
                SessionError::validation(field, reason)
            }
        }
    }
}

impl From<SessionError> for DomainError {
    fn from(err: SessionError) -> Self {
        let domain = DomainError::new(err.code(), err.message());
        match err {
            SessionError::InvalidTransition { status, event } => domain
                .with_detail("status", status.label())
                .with_detail("event", event),
            SessionError::NotFound(id) => domain.with_detail("session_id", id.to_string()),
            SessionError::TopicNotFound(id) => domain.with_detail("topic_id", id.to_string()),
            _ => domain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_variants() {
        assert_eq!(SessionError::Finalized.code(), ErrorCode::SessionFinalized);
        assert_eq!(
            SessionError::invalid_transition(SessionStatus::NotStarted, "user_message").code(),
            ErrorCode::InvalidStateTransition
        );
        assert_eq!(SessionError::ProfileNotSeeded.code(), ErrorCode::ProfileNotSeeded);
    }

    #[test]
    fn message_names_event_and_status() {
        let err = SessionError::invalid_transition(SessionStatus::Surveyed, "end_conversation");
        assert_eq!(
            err.to_string(),
            "Event 'end_conversation' is not valid while the session is surveyed"
        );
    }

    #[test]
    fn validation_errors_convert() {
        let err: SessionError = ValidationError::empty_field("content").into();
        assert_eq!(err, SessionError::validation("content", "cannot be empty"));
    }

    #[test]
    fn converts_to_domain_error_with_details() {
        let domain: DomainError =
            SessionError::invalid_transition(SessionStatus::InChat, "pre_survey_submitted").into();
        assert_eq!(domain.code, ErrorCode::InvalidStateTransition);
        assert_eq!(domain.details.get("status").map(String::as_str), Some("in_chat"));
    }
}
