//! Unified error types for quizbank.
//!
//! Every failure maps to a stable, named kind so callers can branch on
//! `kind()` rather than parsing messages. An empty generation result is
//! deliberately not an error: a valid request that matches zero questions
//! returns an empty quiz.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for quizbank operations.
#[derive(Error, Debug)]
pub enum QuizError {
    /// Malformed question or request. Recoverable by correcting input.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Goal-add below the minimum question threshold.
    #[error(
        "insufficient questions for goal '{goal}': {available} available, {required} required"
    )]
    InsufficientQuestions {
        goal: String,
        available: usize,
        required: usize,
    },

    /// Goal-remove blocked because the bank still holds questions for it.
    #[error("goal '{goal}' is in use: {count} question(s) in the bank")]
    GoalInUse { goal: String, count: usize },

    /// Template mode with no template matching the request.
    #[error("no template matches goal '{goal}' with the requested filters")]
    NoTemplate { goal: String },

    /// I/O failure on a backing file. Surfaced, never retried automatically.
    #[error("persistence error at {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON or TOML encode/decode failure.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },

    /// Engine defect, e.g. a template producing a structurally invalid
    /// question. Not correctable by the caller.
    #[error("internal error: {message}")]
    Internal { message: String },
}

/// A specialized Result type for quizbank operations.
pub type Result<T> = std::result::Result<T, QuizError>;

impl QuizError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an insufficient-questions error.
    pub fn insufficient_questions(
        goal: impl Into<String>,
        available: usize,
        required: usize,
    ) -> Self {
        Self::InsufficientQuestions {
            goal: goal.into(),
            available,
            required,
        }
    }

    /// Create a goal-in-use error.
    pub fn goal_in_use(goal: impl Into<String>, count: usize) -> Self {
        Self::GoalInUse {
            goal: goal.into(),
            count,
        }
    }

    /// Create a no-template error.
    pub fn no_template(goal: impl Into<String>) -> Self {
        Self::NoTemplate { goal: goal.into() }
    }

    /// Create a persistence error from an I/O error.
    pub fn persistence(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The stable kind name for this error.
    ///
    /// This is the contract callers branch on; messages may change, kinds
    /// may not.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::InsufficientQuestions { .. } => "insufficient_questions",
            Self::GoalInUse { .. } => "goal_in_use",
            Self::NoTemplate { .. } => "no_template",
            Self::Persistence { .. } => "persistence",
            Self::Serde { .. } => "serde",
            Self::Config { .. } => "config",
            Self::Internal { .. } => "internal",
        }
    }
}

impl From<serde_json::Error> for QuizError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = QuizError::validation("question text is empty");
        assert_eq!(err.to_string(), "validation error: question text is empty");
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn test_insufficient_questions_display() {
        let err = QuizError::insufficient_questions("GATE AE", 8, 10);
        assert!(err.to_string().contains("GATE AE"));
        assert!(err.to_string().contains("8 available"));
        assert!(err.to_string().contains("10 required"));
        assert_eq!(err.kind(), "insufficient_questions");
    }

    #[test]
    fn test_goal_in_use_display() {
        let err = QuizError::goal_in_use("GATE AE", 3);
        assert_eq!(
            err.to_string(),
            "goal 'GATE AE' is in use: 3 question(s) in the bank"
        );
        assert_eq!(err.kind(), "goal_in_use");
    }

    #[test]
    fn test_no_template_display() {
        let err = QuizError::no_template("UPSC");
        assert!(err.to_string().contains("UPSC"));
        assert_eq!(err.kind(), "no_template");
    }

    #[test]
    fn test_persistence_display() {
        let err = QuizError::persistence(
            "/tmp/bank.json",
            io::Error::new(io::ErrorKind::NotFound, "file not found"),
        );
        assert!(err.to_string().contains("persistence error"));
        assert!(err.to_string().contains("/tmp/bank.json"));
        assert_eq!(err.kind(), "persistence");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: QuizError = json_err.into();
        assert!(matches!(err, QuizError::Serde { .. }));
        assert_eq!(err.kind(), "serde");
    }

    #[test]
    fn test_kinds_are_distinct() {
        let errors = vec![
            QuizError::validation("x"),
            QuizError::insufficient_questions("g", 0, 10),
            QuizError::goal_in_use("g", 1),
            QuizError::no_template("g"),
            QuizError::persistence("/tmp/x", io::Error::new(io::ErrorKind::Other, "x")),
            QuizError::serde("x"),
            QuizError::config("x"),
            QuizError::internal("x"),
        ];
        let mut kinds: Vec<&str> = errors.iter().map(|e| e.kind()).collect();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), 8);
    }
}
