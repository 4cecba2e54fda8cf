//! Inbound actions and outbound events of the trivia game machine
//!
//! Both are closed enums; the engine dispatches with an exhaustive `match`.

use crate::error::{TriviaError, TriviaResult};
use crate::types::*;
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

fn new_id() -> String {
    ulid::Ulid::new().to_string()
}

fn require_positive(field: &str, value: i64) -> TriviaResult<()> {
    if value <= 0 {
        return Err(TriviaError::InvalidAction(format!(
            "{} must be positive, got {}",
            field, value
        )));
    }
    Ok(())
}

fn require_product(field: &str, factors: &[i64]) -> TriviaResult<()> {
    factors
        .iter()
        .try_fold(1i64, |acc, factor| acc.checked_mul(*factor))
        .map(|_| ())
        .ok_or_else(|| TriviaError::InvalidAction(format!("{} overflows", field)))
}

fn require_end_time(seconds_to_live: u64, now: Instant) -> TriviaResult<()> {
    now.checked_add(Duration::from_secs(seconds_to_live))
        .map(|_| ())
        .ok_or_else(|| {
            TriviaError::InvalidAction(format!(
                "seconds_to_live {} is out of range",
                seconds_to_live
            ))
        })
}

/// Requests a normal (single user) trivia game
#[derive(Debug, Clone)]
pub struct StartNewTriviaGameAction {
    pub action_id: ActionId,
    pub twitch_channel: String,
    pub user_id: UserId,
    pub user_name: String,
    pub fetch_options: TriviaFetchOptions,
    pub points_for_winning: i64,
    pub seconds_to_live: u64,
    pub is_shiny_trivia_enabled: bool,
    pub shiny_multiplier: i64,
}

impl StartNewTriviaGameAction {
    pub fn new(
        twitch_channel: impl Into<String>,
        user_id: impl Into<String>,
        user_name: impl Into<String>,
    ) -> Self {
        let twitch_channel = twitch_channel.into();
        Self {
            action_id: new_id(),
            fetch_options: TriviaFetchOptions::new(twitch_channel.clone()),
            twitch_channel,
            user_id: user_id.into(),
            user_name: user_name.into(),
            points_for_winning: 5,
            seconds_to_live: 45,
            is_shiny_trivia_enabled: false,
            shiny_multiplier: 1,
        }
    }

    /// Reject numbers that would break point or time arithmetic
    pub fn validate(&self, now: Instant) -> TriviaResult<()> {
        require_positive("points_for_winning", self.points_for_winning)?;
        require_positive("shiny_multiplier", self.shiny_multiplier)?;
        require_product(
            "points_for_winning * shiny_multiplier",
            &[self.points_for_winning, self.shiny_multiplier],
        )?;
        require_end_time(self.seconds_to_live, now)
    }
}

/// Requests one or more channel-wide super trivia games
#[derive(Debug, Clone)]
pub struct StartNewSuperTriviaGameAction {
    pub action_id: ActionId,
    pub creation_time: Instant,
    pub twitch_channel: String,
    pub fetch_options: TriviaFetchOptions,
    /// How many games this request asks for; extra games wait in the queue
    pub number_of_games: u32,
    pub points_for_winning: i64,
    pub per_user_attempts: u32,
    /// Unit used when computing toxic punishments
    pub regular_trivia_points_for_winning: i64,
    pub seconds_to_live: u64,
    pub is_shiny_trivia_enabled: bool,
    pub shiny_multiplier: i64,
    pub is_toxic_trivia_enabled: bool,
    pub toxic_multiplier: i64,
    pub toxic_trivia_punishment_multiplier: i64,
    /// Set on the copies held by the queue so they are never queued again
    pub is_queue_action_consumed: bool,
}

impl StartNewSuperTriviaGameAction {
    pub fn new(twitch_channel: impl Into<String>) -> Self {
        let twitch_channel = twitch_channel.into();
        Self {
            action_id: new_id(),
            creation_time: Instant::now(),
            fetch_options: TriviaFetchOptions::new(twitch_channel.clone()),
            twitch_channel,
            number_of_games: 1,
            points_for_winning: 25,
            per_user_attempts: 2,
            regular_trivia_points_for_winning: 5,
            seconds_to_live: 60,
            is_shiny_trivia_enabled: false,
            shiny_multiplier: 1,
            is_toxic_trivia_enabled: false,
            toxic_multiplier: 1,
            toxic_trivia_punishment_multiplier: 0,
            is_queue_action_consumed: false,
        }
    }

    /// Reject numbers that would break point, punishment or time arithmetic
    pub fn validate(&self, now: Instant) -> TriviaResult<()> {
        require_positive("points_for_winning", self.points_for_winning)?;
        require_positive("per_user_attempts", i64::from(self.per_user_attempts))?;
        require_positive(
            "regular_trivia_points_for_winning",
            self.regular_trivia_points_for_winning,
        )?;
        require_positive("shiny_multiplier", self.shiny_multiplier)?;
        require_positive("toxic_multiplier", self.toxic_multiplier)?;
        if self.toxic_trivia_punishment_multiplier < 0 {
            return Err(TriviaError::InvalidAction(format!(
                "toxic_trivia_punishment_multiplier must not be negative, got {}",
                self.toxic_trivia_punishment_multiplier
            )));
        }

        require_product(
            "points_for_winning * shiny_multiplier",
            &[self.points_for_winning, self.shiny_multiplier],
        )?;
        require_product(
            "points_for_winning * toxic_multiplier",
            &[self.points_for_winning, self.toxic_multiplier],
        )?;
        require_product(
            "toxic punishment per user",
            &[
                i64::from(self.per_user_attempts),
                self.toxic_trivia_punishment_multiplier,
                self.regular_trivia_points_for_winning,
            ],
        )?;
        require_end_time(self.seconds_to_live, now)
    }

    /// Copy of this request as it is stored in the super trivia queue
    pub fn to_queued_copy(&self) -> Self {
        Self {
            action_id: new_id(),
            number_of_games: 1,
            is_queue_action_consumed: true,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckAnswerAction {
    pub action_id: ActionId,
    pub twitch_channel: String,
    pub user_id: UserId,
    pub user_name: String,
    pub answer: String,
}

impl CheckAnswerAction {
    pub fn new(
        twitch_channel: impl Into<String>,
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            action_id: new_id(),
            twitch_channel: twitch_channel.into(),
            user_id: user_id.into(),
            user_name: user_name.into(),
            answer: answer.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClearSuperTriviaQueueAction {
    pub action_id: ActionId,
    pub twitch_channel: String,
}

impl ClearSuperTriviaQueueAction {
    pub fn new(twitch_channel: impl Into<String>) -> Self {
        Self {
            action_id: new_id(),
            twitch_channel: twitch_channel.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum TriviaAction {
    StartNewGame(StartNewTriviaGameAction),
    StartNewSuperGame(StartNewSuperTriviaGameAction),
    CheckAnswer(CheckAnswerAction),
    /// Super trivia answers carry the same payload as normal answers
    CheckSuperAnswer(CheckAnswerAction),
    ClearSuperTriviaQueue(ClearSuperTriviaQueueAction),
}

impl TriviaAction {
    pub fn action_id(&self) -> &str {
        match self {
            Self::StartNewGame(action) => &action.action_id,
            Self::StartNewSuperGame(action) => &action.action_id,
            Self::CheckAnswer(action) | Self::CheckSuperAnswer(action) => &action.action_id,
            Self::ClearSuperTriviaQueue(action) => &action.action_id,
        }
    }

    pub fn twitch_channel(&self) -> &str {
        match self {
            Self::StartNewGame(action) => &action.twitch_channel,
            Self::StartNewSuperGame(action) => &action.twitch_channel,
            Self::CheckAnswer(action) | Self::CheckSuperAnswer(action) => &action.twitch_channel,
            Self::ClearSuperTriviaQueue(action) => &action.twitch_channel,
        }
    }

    /// Check the numeric fields of start requests; answers always pass
    pub fn validate(&self, now: Instant) -> TriviaResult<()> {
        match self {
            Self::StartNewGame(action) => action.validate(now),
            Self::StartNewSuperGame(action) => action.validate(now),
            Self::CheckAnswer(_) | Self::CheckSuperAnswer(_) | Self::ClearSuperTriviaQueue(_) => {
                Ok(())
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::StartNewGame(_) => "start_new_game",
            Self::StartNewSuperGame(_) => "start_new_super_game",
            Self::CheckAnswer(_) => "check_answer",
            Self::CheckSuperAnswer(_) => "check_super_answer",
            Self::ClearSuperTriviaQueue(_) => "clear_super_trivia_queue",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum TriviaEvent {
    NewGame {
        event_id: EventId,
        action_id: ActionId,
        game_id: GameId,
        twitch_channel: String,
        user_id: UserId,
        user_name: String,
        emote: String,
        points_for_winning: i64,
        seconds_to_live: u64,
        special_trivia_status: Option<SpecialTriviaStatus>,
        question: TriviaQuestion,
    },
    NewSuperGame {
        event_id: EventId,
        action_id: ActionId,
        game_id: GameId,
        twitch_channel: String,
        emote: String,
        points_for_winning: i64,
        per_user_attempts: u32,
        seconds_to_live: u64,
        remaining_queue_size: usize,
        special_trivia_status: Option<SpecialTriviaStatus>,
        question: TriviaQuestion,
    },
    NewQueuedSuperGame {
        event_id: EventId,
        action_id: ActionId,
        twitch_channel: String,
        number_of_games: usize,
        queue_size: usize,
    },
    GameAlreadyInProgress {
        event_id: EventId,
        action_id: ActionId,
        game_id: GameId,
        twitch_channel: String,
        user_id: UserId,
        user_name: String,
    },
    GameNotReadyCheckAnswer {
        event_id: EventId,
        action_id: ActionId,
        twitch_channel: String,
        user_id: UserId,
        user_name: String,
        answer: String,
    },
    WrongUserCheckAnswer {
        event_id: EventId,
        action_id: ActionId,
        game_id: GameId,
        twitch_channel: String,
        user_id: UserId,
        user_name: String,
        answer: String,
    },
    TooLateToAnswerCheckAnswer {
        event_id: EventId,
        action_id: ActionId,
        game_id: GameId,
        twitch_channel: String,
        user_id: UserId,
        user_name: String,
        answer: String,
        emote: String,
        question: TriviaQuestion,
        score_result: TriviaScoreResult,
    },
    InvalidAnswerInput {
        event_id: EventId,
        action_id: ActionId,
        game_id: GameId,
        twitch_channel: String,
        user_id: UserId,
        user_name: String,
        answer: String,
        emote: String,
        special_trivia_status: Option<SpecialTriviaStatus>,
        question: TriviaQuestion,
    },
    IncorrectAnswer {
        event_id: EventId,
        action_id: ActionId,
        game_id: GameId,
        twitch_channel: String,
        user_id: UserId,
        user_name: String,
        answer: String,
        emote: String,
        special_trivia_status: Option<SpecialTriviaStatus>,
        question: TriviaQuestion,
        score_result: TriviaScoreResult,
    },
    CorrectAnswer {
        event_id: EventId,
        action_id: ActionId,
        game_id: GameId,
        twitch_channel: String,
        user_id: UserId,
        user_name: String,
        answer: String,
        emote: String,
        points_for_winning: i64,
        special_trivia_status: Option<SpecialTriviaStatus>,
        question: TriviaQuestion,
        cuteness_result: CutenessResult,
        score_result: TriviaScoreResult,
    },
    OutOfTime {
        event_id: EventId,
        action_id: ActionId,
        game_id: GameId,
        twitch_channel: String,
        user_id: UserId,
        user_name: String,
        emote: String,
        points_for_winning: i64,
        special_trivia_status: Option<SpecialTriviaStatus>,
        question: TriviaQuestion,
        /// `None` when the loss could not be recorded
        score_result: Option<TriviaScoreResult>,
    },
    SuperGameNotReadyCheckAnswer {
        event_id: EventId,
        action_id: ActionId,
        twitch_channel: String,
        user_id: UserId,
        user_name: String,
        answer: String,
    },
    IncorrectSuperAnswer {
        event_id: EventId,
        action_id: ActionId,
        game_id: GameId,
        twitch_channel: String,
        user_id: UserId,
        user_name: String,
        answer: String,
        emote: String,
        check_answer_result: CheckAnswerResult,
    },
    CorrectSuperAnswer {
        event_id: EventId,
        action_id: ActionId,
        game_id: GameId,
        twitch_channel: String,
        user_id: UserId,
        user_name: String,
        answer: String,
        emote: String,
        points_for_winning: i64,
        remaining_queue_size: usize,
        special_trivia_status: Option<SpecialTriviaStatus>,
        question: TriviaQuestion,
        toxic_trivia_punishment_result: Option<ToxicTriviaPunishmentResult>,
        cuteness_result: CutenessResult,
        score_result: TriviaScoreResult,
    },
    OutOfTimeSuperGame {
        event_id: EventId,
        action_id: ActionId,
        game_id: GameId,
        twitch_channel: String,
        emote: String,
        points_for_winning: i64,
        remaining_queue_size: usize,
        special_trivia_status: Option<SpecialTriviaStatus>,
        question: TriviaQuestion,
        toxic_trivia_punishment_result: Option<ToxicTriviaPunishmentResult>,
    },
    FailedToFetchQuestion {
        event_id: EventId,
        action_id: ActionId,
        twitch_channel: String,
        user_id: UserId,
        user_name: String,
    },
    FailedToFetchQuestionSuperTrivia {
        event_id: EventId,
        action_id: ActionId,
        twitch_channel: String,
    },
    ClearedSuperTriviaQueue {
        event_id: EventId,
        action_id: ActionId,
        twitch_channel: String,
        number_of_games_removed: usize,
        previous_queue_size: usize,
    },
    RejectedAction {
        event_id: EventId,
        action_id: ActionId,
        twitch_channel: String,
        reason: String,
    },
}

impl TriviaEvent {
    /// Fresh ID for a newly produced event
    pub fn new_event_id() -> EventId {
        new_id()
    }

    pub fn event_id(&self) -> &str {
        match self {
            Self::NewGame { event_id, .. }
            | Self::NewSuperGame { event_id, .. }
            | Self::NewQueuedSuperGame { event_id, .. }
            | Self::GameAlreadyInProgress { event_id, .. }
            | Self::GameNotReadyCheckAnswer { event_id, .. }
            | Self::WrongUserCheckAnswer { event_id, .. }
            | Self::TooLateToAnswerCheckAnswer { event_id, .. }
            | Self::InvalidAnswerInput { event_id, .. }
            | Self::IncorrectAnswer { event_id, .. }
            | Self::CorrectAnswer { event_id, .. }
            | Self::OutOfTime { event_id, .. }
            | Self::SuperGameNotReadyCheckAnswer { event_id, .. }
            | Self::IncorrectSuperAnswer { event_id, .. }
            | Self::CorrectSuperAnswer { event_id, .. }
            | Self::OutOfTimeSuperGame { event_id, .. }
            | Self::FailedToFetchQuestion { event_id, .. }
            | Self::FailedToFetchQuestionSuperTrivia { event_id, .. }
            | Self::ClearedSuperTriviaQueue { event_id, .. }
            | Self::RejectedAction { event_id, .. } => event_id,
        }
    }

    pub fn action_id(&self) -> &str {
        match self {
            Self::NewGame { action_id, .. }
            | Self::NewSuperGame { action_id, .. }
            | Self::NewQueuedSuperGame { action_id, .. }
            | Self::GameAlreadyInProgress { action_id, .. }
            | Self::GameNotReadyCheckAnswer { action_id, .. }
            | Self::WrongUserCheckAnswer { action_id, .. }
            | Self::TooLateToAnswerCheckAnswer { action_id, .. }
            | Self::InvalidAnswerInput { action_id, .. }
            | Self::IncorrectAnswer { action_id, .. }
            | Self::CorrectAnswer { action_id, .. }
            | Self::OutOfTime { action_id, .. }
            | Self::SuperGameNotReadyCheckAnswer { action_id, .. }
            | Self::IncorrectSuperAnswer { action_id, .. }
            | Self::CorrectSuperAnswer { action_id, .. }
            | Self::OutOfTimeSuperGame { action_id, .. }
            | Self::FailedToFetchQuestion { action_id, .. }
            | Self::FailedToFetchQuestionSuperTrivia { action_id, .. }
            | Self::ClearedSuperTriviaQueue { action_id, .. }
            | Self::RejectedAction { action_id, .. } => action_id,
        }
    }

    pub fn twitch_channel(&self) -> &str {
        match self {
            Self::NewGame { twitch_channel, .. }
            | Self::NewSuperGame { twitch_channel, .. }
            | Self::NewQueuedSuperGame { twitch_channel, .. }
            | Self::GameAlreadyInProgress { twitch_channel, .. }
            | Self::GameNotReadyCheckAnswer { twitch_channel, .. }
            | Self::WrongUserCheckAnswer { twitch_channel, .. }
            | Self::TooLateToAnswerCheckAnswer { twitch_channel, .. }
            | Self::InvalidAnswerInput { twitch_channel, .. }
            | Self::IncorrectAnswer { twitch_channel, .. }
            | Self::CorrectAnswer { twitch_channel, .. }
            | Self::OutOfTime { twitch_channel, .. }
            | Self::SuperGameNotReadyCheckAnswer { twitch_channel, .. }
            | Self::IncorrectSuperAnswer { twitch_channel, .. }
            | Self::CorrectSuperAnswer { twitch_channel, .. }
            | Self::OutOfTimeSuperGame { twitch_channel, .. }
            | Self::FailedToFetchQuestion { twitch_channel, .. }
            | Self::FailedToFetchQuestionSuperTrivia { twitch_channel, .. }
            | Self::ClearedSuperTriviaQueue { twitch_channel, .. }
            | Self::RejectedAction { twitch_channel, .. } => twitch_channel,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::NewGame { .. } => "new_game",
            Self::NewSuperGame { .. } => "new_super_game",
            Self::NewQueuedSuperGame { .. } => "new_queued_super_game",
            Self::GameAlreadyInProgress { .. } => "game_already_in_progress",
            Self::GameNotReadyCheckAnswer { .. } => "game_not_ready_check_answer",
            Self::WrongUserCheckAnswer { .. } => "wrong_user_check_answer",
            Self::TooLateToAnswerCheckAnswer { .. } => "too_late_to_answer_check_answer",
            Self::InvalidAnswerInput { .. } => "invalid_answer_input",
            Self::IncorrectAnswer { .. } => "incorrect_answer",
            Self::CorrectAnswer { .. } => "correct_answer",
            Self::OutOfTime { .. } => "out_of_time",
            Self::SuperGameNotReadyCheckAnswer { .. } => "super_game_not_ready_check_answer",
            Self::IncorrectSuperAnswer { .. } => "incorrect_super_answer",
            Self::CorrectSuperAnswer { .. } => "correct_super_answer",
            Self::OutOfTimeSuperGame { .. } => "out_of_time_super_game",
            Self::FailedToFetchQuestion { .. } => "failed_to_fetch_question",
            Self::FailedToFetchQuestionSuperTrivia { .. } => {
                "failed_to_fetch_question_super_trivia"
            }
            Self::ClearedSuperTriviaQueue { .. } => "cleared_super_trivia_queue",
            Self::RejectedAction { .. } => "rejected_action",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queued_copy_is_consumed_single_game() {
        let mut action = StartNewSuperTriviaGameAction::new("Chan");
        action.number_of_games = 4;

        let copy = action.to_queued_copy();
        assert_ne!(copy.action_id, action.action_id);
        assert_eq!(copy.number_of_games, 1);
        assert!(copy.is_queue_action_consumed);
        assert_eq!(copy.creation_time, action.creation_time);
        assert_eq!(copy.twitch_channel, "Chan");
    }

    #[test]
    fn test_action_accessors() {
        let action = TriviaAction::CheckSuperAnswer(CheckAnswerAction::new("chan", "u1", "User", "b"));
        assert_eq!(action.twitch_channel(), "chan");
        assert_eq!(action.name(), "check_super_answer");
        assert!(!action.action_id().is_empty());
    }

    #[test]
    fn test_defaults_are_valid() {
        let now = Instant::now();
        assert!(StartNewTriviaGameAction::new("chan", "u1", "User").validate(now).is_ok());
        assert!(StartNewSuperTriviaGameAction::new("chan").validate(now).is_ok());
    }

    #[test]
    fn test_rejects_non_positive_points_and_multipliers() {
        let now = Instant::now();

        let mut action = StartNewTriviaGameAction::new("chan", "u1", "User");
        action.points_for_winning = -5;
        assert!(matches!(action.validate(now), Err(TriviaError::InvalidAction(_))));

        let mut action = StartNewTriviaGameAction::new("chan", "u1", "User");
        action.shiny_multiplier = 0;
        assert!(action.validate(now).is_err());

        let mut action = StartNewSuperTriviaGameAction::new("chan");
        action.regular_trivia_points_for_winning = -50;
        assert!(action.validate(now).is_err());

        let mut action = StartNewSuperTriviaGameAction::new("chan");
        action.toxic_multiplier = -2;
        assert!(action.validate(now).is_err());

        let mut action = StartNewSuperTriviaGameAction::new("chan");
        action.per_user_attempts = 0;
        assert!(action.validate(now).is_err());

        let mut action = StartNewSuperTriviaGameAction::new("chan");
        action.toxic_trivia_punishment_multiplier = -1;
        assert!(action.validate(now).is_err());
    }

    #[test]
    fn test_rejects_overflowing_points_and_lifetimes() {
        let now = Instant::now();

        let mut action = StartNewTriviaGameAction::new("chan", "u1", "User");
        action.seconds_to_live = u64::MAX;
        assert!(action.validate(now).is_err());

        let mut action = StartNewTriviaGameAction::new("chan", "u1", "User");
        action.points_for_winning = i64::MAX;
        action.shiny_multiplier = 2;
        assert!(action.validate(now).is_err());

        let mut action = StartNewSuperTriviaGameAction::new("chan");
        action.toxic_trivia_punishment_multiplier = i64::MAX;
        assert!(action.validate(now).is_err());

        let mut action = StartNewSuperTriviaGameAction::new("chan");
        action.seconds_to_live = u64::MAX;
        assert!(action.validate(now).is_err());
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let event = TriviaEvent::ClearedSuperTriviaQueue {
            event_id: "e1".to_string(),
            action_id: "a1".to_string(),
            twitch_channel: "chan".to_string(),
            number_of_games_removed: 3,
            previous_queue_size: 3,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["t"], "cleared_super_trivia_queue");
        assert_eq!(json["number_of_games_removed"], 3);
        assert_eq!(event.name(), "cleared_super_trivia_queue");
        assert_eq!(event.event_id(), "e1");
        assert_eq!(event.action_id(), "a1");
    }
}
