use serde::Serialize;
use utoipa::ToSchema;

/// Failures at the decoding boundary. Scoring and resolution themselves never fail.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// First-time onboarding requires every question to be answered.
    #[error("unanswered risk questions: {}", .missing.join(", "))]
    IncompleteQuiz { missing: Vec<String> },
    /// An answer value that is neither an integer nor a numeric string.
    #[error("answer for '{question}' is not an integer: {received}")]
    InvalidAnswerValue { question: String, received: String },
    /// A question bank override that cannot be scored against.
    #[error("invalid question bank: {0}")]
    InvalidQuestionBank(String),
}

/// Structured error output for callers that print or forward JSON.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g. "incomplete_quiz", "invalid_input")
    pub error: String,
    /// Human-readable description of what went wrong
    pub message: String,
    /// Which field caused the error (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// The value that was received (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<serde_json::Value>,
    /// Hint about what the correct usage looks like
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_hint: Option<String>,
}

/// Error codes shared by the core and its callers
pub mod codes {
    pub const INCOMPLETE_QUIZ: &str = "incomplete_quiz";
    pub const INVALID_ANSWER: &str = "invalid_answer";
    pub const INVALID_QUESTION_BANK: &str = "invalid_question_bank";
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const API_ERROR: &str = "api_error";
    pub const CONNECTION_ERROR: &str = "connection_error";
}

impl ErrorBody {
    pub fn new(error: &str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            field: None,
            received: None,
            docs_hint: None,
        }
    }

    pub fn with_docs_hint(mut self, hint: impl Into<String>) -> Self {
        self.docs_hint = Some(hint.into());
        self
    }
}

impl From<&CoreError> for ErrorBody {
    fn from(err: &CoreError) -> Self {
        match err {
            CoreError::IncompleteQuiz { missing } => ErrorBody {
                error: codes::INCOMPLETE_QUIZ.to_string(),
                message: "Please answer all risk questions before finishing.".to_string(),
                field: Some("answers".to_string()),
                received: Some(serde_json::json!(missing)),
                docs_hint: Some(
                    "Pass --edit to resubmit an existing profile without answering every question."
                        .to_string(),
                ),
            },
            CoreError::InvalidAnswerValue { question, received } => ErrorBody {
                error: codes::INVALID_ANSWER.to_string(),
                message: err.to_string(),
                field: Some(question.clone()),
                received: Some(serde_json::Value::String(received.clone())),
                docs_hint: Some("Answer values are the integer value of the chosen option.".to_string()),
            },
            CoreError::InvalidQuestionBank(_) => ErrorBody::new(
                codes::INVALID_QUESTION_BANK,
                err.to_string(),
            ),
        }
    }
}
