use std::path::PathBuf;

/// Result type for trivia machine operations
pub type TriviaResult<T> = Result<T, TriviaError>;

/// Errors raised by the trivia machine and its collaborators
///
/// Game outcomes (wrong answers, missing games, queue rejections) are never
/// errors: they travel to the listener as events.
#[derive(Debug, thiserror::Error)]
pub enum TriviaError {
    #[error("Failed to fetch a trivia question after {attempts} attempt(s)")]
    TooManyFetchAttempts { attempts: u32 },

    #[error("Trivia question source failed: {0}")]
    QuestionSource(String),

    #[error("Malformed trivia question: {0}")]
    MalformedQuestion(String),

    #[error("Invalid trivia action: {0}")]
    InvalidAction(String),

    #[error("Repository operation failed: {0}")]
    Repository(String),

    #[error("Trivia event listener failed: {0}")]
    Listener(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to read question bank at {path:?}: {source}")]
    QuestionBank {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Question bank parsing failed: {0}")]
    QuestionBankParse(#[from] serde_json::Error),
}
