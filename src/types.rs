use serde::{Deserialize, Serialize};

use crate::error::{TriviaError, TriviaResult};

/// Opaque ID types for type safety
pub type ActionId = String;
pub type EventId = String;
pub type GameId = String;
pub type TriviaId = String;
pub type UserId = String;

/// Normalizes a Twitch channel name into the form every store keys on
pub fn channel_key(twitch_channel: &str) -> String {
    twitch_channel.trim().to_lowercase()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpecialTriviaStatus {
    Shiny,
    Toxic,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TriviaDifficulty {
    #[default]
    Unknown,
    Easy,
    Medium,
    Hard,
}

/// Whether free-text (question/answer) trivia may be served
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionAnswerTriviaConditions {
    #[default]
    Allowed,
    NotAllowed,
    Required,
}

impl QuestionAnswerTriviaConditions {
    pub fn permits(&self, question: &TriviaQuestion) -> bool {
        match self {
            Self::Allowed => true,
            Self::NotAllowed => !question.is_question_answer(),
            Self::Required => question.is_question_answer(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TriviaFetchOptions {
    pub twitch_channel: String,
    #[serde(default)]
    pub question_answer_trivia_conditions: QuestionAnswerTriviaConditions,
}

impl TriviaFetchOptions {
    pub fn new(twitch_channel: impl Into<String>) -> Self {
        Self {
            twitch_channel: twitch_channel.into(),
            question_answer_trivia_conditions: QuestionAnswerTriviaConditions::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriviaQuestionKind {
    MultipleChoice {
        responses: Vec<String>,
        correct_index: usize,
    },
    TrueFalse {
        correct_answer: bool,
    },
    QuestionAnswer {
        correct_answers: Vec<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TriviaQuestion {
    pub trivia_id: TriviaId,
    pub question: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub difficulty: TriviaDifficulty,
    #[serde(default = "default_trivia_source")]
    pub source: String,
    pub kind: TriviaQuestionKind,
}

fn default_trivia_source() -> String {
    "local".to_string()
}

impl TriviaQuestion {
    pub fn is_question_answer(&self) -> bool {
        matches!(self.kind, TriviaQuestionKind::QuestionAnswer { .. })
    }

    /// Human readable correct answer(s), e.g. for "the answer was ..." messages
    pub fn correct_answers(&self) -> Vec<String> {
        match &self.kind {
            TriviaQuestionKind::MultipleChoice {
                responses,
                correct_index,
            } => responses
                .get(*correct_index)
                .map(|response| vec![format!("[{}] {}", choice_letter(*correct_index), response)])
                .unwrap_or_default(),
            TriviaQuestionKind::TrueFalse { correct_answer } => {
                vec![correct_answer.to_string()]
            }
            TriviaQuestionKind::QuestionAnswer { correct_answers } => correct_answers.clone(),
        }
    }

    /// Reject questions that could never be answered correctly
    pub fn validate(&self) -> TriviaResult<()> {
        if self.trivia_id.trim().is_empty() {
            return Err(TriviaError::MalformedQuestion(
                "trivia ID is blank".to_string(),
            ));
        }

        if self.question.trim().is_empty() {
            return Err(TriviaError::MalformedQuestion(format!(
                "question text is blank ({})",
                self.trivia_id
            )));
        }

        match &self.kind {
            TriviaQuestionKind::MultipleChoice {
                responses,
                correct_index,
            } => {
                if responses.len() < 2 {
                    return Err(TriviaError::MalformedQuestion(format!(
                        "multiple choice question {} needs at least 2 responses",
                        self.trivia_id
                    )));
                }
                if responses.len() > 26 {
                    return Err(TriviaError::MalformedQuestion(format!(
                        "multiple choice question {} has too many responses",
                        self.trivia_id
                    )));
                }
                if *correct_index >= responses.len() {
                    return Err(TriviaError::MalformedQuestion(format!(
                        "multiple choice question {} has correct index {} out of range",
                        self.trivia_id, correct_index
                    )));
                }
            }
            TriviaQuestionKind::TrueFalse { .. } => {}
            TriviaQuestionKind::QuestionAnswer { correct_answers } => {
                if correct_answers.iter().all(|answer| answer.trim().is_empty()) {
                    return Err(TriviaError::MalformedQuestion(format!(
                        "question answer question {} has no correct answers",
                        self.trivia_id
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Letter shown next to a multiple choice response ("A", "B", ...)
pub fn choice_letter(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckAnswerResult {
    Correct,
    Incorrect,
    InvalidInput,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CutenessResult {
    pub twitch_channel: String,
    pub user_id: UserId,
    pub user_name: String,
    pub cuteness: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TriviaScoreResult {
    pub twitch_channel: String,
    pub user_id: UserId,
    /// Positive while on a win streak, negative while on a loss streak
    pub streak: i64,
    pub trivia_wins: u64,
    pub trivia_losses: u64,
    pub super_trivia_wins: u64,
    pub updated_at: String,
}

impl TriviaScoreResult {
    pub fn total(&self) -> u64 {
        self.trivia_wins + self.trivia_losses
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToxicTriviaPunishment {
    pub user_id: UserId,
    pub user_name: String,
    pub number_of_punishments: u32,
    /// Always zero or negative
    pub punished_by_points: i64,
    pub cuteness_result: CutenessResult,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToxicTriviaPunishmentResult {
    pub total_points_stolen: i64,
    pub punishments: Vec<ToxicTriviaPunishment>,
}
