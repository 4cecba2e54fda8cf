use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use super::toxic::calculate_toxic_punishment;
use super::{enqueue, TriviaCollaborators};
use crate::answer::AnswerCheckExtras;
use crate::config::TriviaSettings;
use crate::error::{TriviaError, TriviaResult};
use crate::protocol::*;
use crate::state::{
    QueuedTriviaGameStore, SuperTriviaGameState, TriviaEmoteGenerator, TriviaGame,
    TriviaGameState, TriviaGameStore,
};
use crate::trivia::{RetryingQuestionSource, TriviaQuestionSource};
use crate::types::*;

/// Applies actions to the game stores and produces events
///
/// Owned by the action loop. Every store lives here, so game state has a
/// single writer and needs no locking.
pub struct TriviaGameEngine {
    collaborators: TriviaCollaborators,
    question_source: RetryingQuestionSource,
    games: TriviaGameStore,
    queue: QueuedTriviaGameStore,
    emotes: TriviaEmoteGenerator,
    first_question_delay: Duration,
    queue_timeout: Duration,
    action_tx: mpsc::Sender<TriviaAction>,
    event_tx: mpsc::Sender<TriviaEvent>,
}

impl TriviaGameEngine {
    pub fn new(
        settings: &TriviaSettings,
        collaborators: TriviaCollaborators,
        action_tx: mpsc::Sender<TriviaAction>,
        event_tx: mpsc::Sender<TriviaEvent>,
    ) -> Self {
        let question_source = RetryingQuestionSource::new(
            Arc::clone(&collaborators.question_source),
            settings.max_fetch_attempts,
        );

        Self {
            collaborators,
            question_source,
            games: TriviaGameStore::new(settings.super_trivia_cooldown),
            queue: QueuedTriviaGameStore::new(settings.max_super_trivia_game_queue_size),
            emotes: TriviaEmoteGenerator::new(settings.emotes.clone()),
            first_question_delay: settings.super_trivia_first_question_delay,
            queue_timeout: settings.queue_timeout,
            action_tx,
            event_tx,
        }
    }

    pub fn games(&self) -> &TriviaGameStore {
        &self.games
    }

    pub fn queue(&self) -> &QueuedTriviaGameStore {
        &self.queue
    }

    /// Process actions in order, stopping at the first error
    pub async fn process_batch(&mut self, batch: Vec<TriviaAction>) -> TriviaResult<()> {
        let total = batch.len();
        for (index, action) in batch.into_iter().enumerate() {
            if let Err(e) = self.process_action(action).await {
                let skipped = total - index - 1;
                if skipped > 0 {
                    tracing::warn!("Skipping {} queued trivia action(s)", skipped);
                }
                return Err(e);
            }
        }
        Ok(())
    }

    pub async fn process_action(&mut self, action: TriviaAction) -> TriviaResult<()> {
        tracing::debug!(
            "Processing {} action {} for {}",
            action.name(),
            action.action_id(),
            action.twitch_channel()
        );

        if let Err(e) = action.validate(Instant::now()) {
            tracing::warn!(
                "Rejected {} action {} for {}: {}",
                action.name(),
                action.action_id(),
                action.twitch_channel(),
                e
            );
            self.emit(TriviaEvent::RejectedAction {
                event_id: TriviaEvent::new_event_id(),
                action_id: action.action_id().to_string(),
                twitch_channel: action.twitch_channel().to_string(),
                reason: e.to_string(),
            })
            .await;
            return Ok(());
        }

        match action {
            TriviaAction::StartNewGame(action) => self.start_new_game(action).await,
            TriviaAction::StartNewSuperGame(action) => self.start_new_super_game(action).await,
            TriviaAction::CheckAnswer(action) => self.check_answer(action).await,
            TriviaAction::CheckSuperAnswer(action) => self.check_super_answer(action).await,
            TriviaAction::ClearSuperTriviaQueue(action) => {
                self.clear_super_trivia_queue(action).await
            }
        }
    }

    /// Expire dead games, then promote queued super games
    ///
    /// Runs once per tick. Failures are logged per game.
    pub async fn run_housekeeping(&mut self) {
        for game in self.games.remove_expired_games(Instant::now()) {
            match game {
                TriviaGame::Normal(game) => self.expire_normal_game(game).await,
                TriviaGame::Super(game) => self.expire_super_game(game).await,
            }
        }

        let mut busy_channels = self.games.get_active_super_game_channels();
        busy_channels.extend(self.games.cooldowns().get_twitch_channels_in_cooldown());

        for action in self.queue.pop_queued_super_games(&busy_channels) {
            tracing::debug!(
                "Promoting queued super trivia {} in {}",
                action.action_id,
                action.twitch_channel
            );
            let twitch_channel = action.twitch_channel.clone();
            if let Err(e) = self.start_new_super_game(action).await {
                tracing::error!(
                    "Failed to start queued super trivia in {}: {}",
                    twitch_channel,
                    e
                );
            }
        }
    }

    async fn emit(&self, event: TriviaEvent) {
        let what = format!("{} event {}", event.name(), event.event_id());
        enqueue(&self.event_tx, event, self.queue_timeout, "event", &what).await;
    }

    async fn resubmit(&self, action: TriviaAction) {
        let what = format!("{} action {}", action.name(), action.action_id());
        enqueue(&self.action_tx, action, self.queue_timeout, "action", &what).await;
    }

    async fn start_new_game(&mut self, action: StartNewTriviaGameAction) -> TriviaResult<()> {
        let now = Instant::now();

        if let Some(existing) = self
            .games
            .get_normal_game(&action.twitch_channel, &action.user_id)
        {
            if !existing.is_out_of_time(now) {
                let game_id = existing.game_id.clone();
                self.emit(TriviaEvent::GameAlreadyInProgress {
                    event_id: TriviaEvent::new_event_id(),
                    action_id: action.action_id,
                    game_id,
                    twitch_channel: action.twitch_channel,
                    user_id: action.user_id,
                    user_name: action.user_name,
                })
                .await;
                return Ok(());
            }
        }

        if let Some(stale) = self
            .games
            .remove_normal_game(&action.twitch_channel, &action.user_id)
        {
            self.expire_normal_game(stale).await;
        }

        let emote = self.emotes.next_emote(&action.twitch_channel);
        let question = match self
            .question_source
            .fetch_trivia(&emote, &action.fetch_options)
            .await
        {
            Ok(question) => question,
            Err(e) => {
                tracing::warn!(
                    "No trivia question for {} in {}: {}",
                    action.user_name,
                    action.twitch_channel,
                    e
                );
                self.emit(TriviaEvent::FailedToFetchQuestion {
                    event_id: TriviaEvent::new_event_id(),
                    action_id: action.action_id,
                    twitch_channel: action.twitch_channel,
                    user_id: action.user_id,
                    user_name: action.user_name,
                })
                .await;
                return Ok(());
            }
        };

        let is_shiny = action.is_shiny_trivia_enabled
            && self
                .collaborators
                .special
                .is_shiny_trivia_question(&action.twitch_channel)
                .await;
        let (special_trivia_status, points_for_winning) = if is_shiny {
            (
                Some(SpecialTriviaStatus::Shiny),
                action.points_for_winning.saturating_mul(action.shiny_multiplier),
            )
        } else {
            (None, action.points_for_winning)
        };

        let game = TriviaGameState {
            game_id: ulid::Ulid::new().to_string(),
            action_id: action.action_id.clone(),
            twitch_channel: action.twitch_channel.clone(),
            user_id: action.user_id.clone(),
            user_name: action.user_name.clone(),
            emote: emote.clone(),
            question: question.clone(),
            base_points_for_winning: action.points_for_winning,
            points_for_winning,
            seconds_to_live: action.seconds_to_live,
            end_time: end_time(action.seconds_to_live)?,
            special_trivia_status,
        };
        let game_id = game.game_id.clone();
        self.games.add_normal_game(game);

        tracing::info!(
            "Started trivia {} for {} in {} ({})",
            game_id,
            action.user_name,
            action.twitch_channel,
            question.trivia_id
        );

        self.emit(TriviaEvent::NewGame {
            event_id: TriviaEvent::new_event_id(),
            action_id: action.action_id,
            game_id,
            twitch_channel: action.twitch_channel,
            user_id: action.user_id,
            user_name: action.user_name,
            emote,
            points_for_winning,
            seconds_to_live: action.seconds_to_live,
            special_trivia_status,
            question,
        })
        .await;
        Ok(())
    }

    async fn start_new_super_game(
        &mut self,
        action: StartNewSuperTriviaGameAction,
    ) -> TriviaResult<()> {
        let now = Instant::now();

        if action.creation_time + self.first_question_delay >= now {
            self.resubmit(TriviaAction::StartNewSuperGame(action)).await;
            return Ok(());
        }

        let is_active = self
            .games
            .get_super_game(&action.twitch_channel)
            .is_some_and(|game| !game.is_out_of_time(now));

        let queued = self.queue.add_super_games(is_active, &action);
        if queued.amount_added > 0 {
            tracing::info!(
                "Queued {} super trivia game(s) in {} ({} waiting)",
                queued.amount_added,
                action.twitch_channel,
                queued.new_queue_size
            );
            self.emit(TriviaEvent::NewQueuedSuperGame {
                event_id: TriviaEvent::new_event_id(),
                action_id: action.action_id.clone(),
                twitch_channel: action.twitch_channel.clone(),
                number_of_games: queued.amount_added,
                queue_size: queued.new_queue_size,
            })
            .await;
        }

        if is_active {
            self.queue.forget_action(&action.action_id);
            return Ok(());
        }

        // Anything still stored here is expired but not yet reaped
        if let Some(stale) = self.games.remove_super_game(&action.twitch_channel) {
            self.expire_super_game(stale).await;
        }

        if self
            .games
            .cooldowns()
            .is_twitch_channel_in_cooldown(&action.twitch_channel)
        {
            self.resubmit(TriviaAction::StartNewSuperGame(action)).await;
            return Ok(());
        }

        let emote = self.emotes.next_emote(&action.twitch_channel);
        let question = match self
            .question_source
            .fetch_trivia(&emote, &action.fetch_options)
            .await
        {
            Ok(question) => question,
            Err(e) => {
                tracing::warn!(
                    "No super trivia question for {}: {}",
                    action.twitch_channel,
                    e
                );
                self.queue.forget_action(&action.action_id);
                self.emit(TriviaEvent::FailedToFetchQuestionSuperTrivia {
                    event_id: TriviaEvent::new_event_id(),
                    action_id: action.action_id,
                    twitch_channel: action.twitch_channel,
                })
                .await;
                return Ok(());
            }
        };

        let special = &self.collaborators.special;
        let special_trivia_status = if action.is_shiny_trivia_enabled
            && special.is_shiny_trivia_question(&action.twitch_channel).await
        {
            Some(SpecialTriviaStatus::Shiny)
        } else if action.is_toxic_trivia_enabled
            && special.is_toxic_trivia_question(&action.twitch_channel).await
        {
            Some(SpecialTriviaStatus::Toxic)
        } else {
            None
        };
        let points_for_winning = match special_trivia_status {
            Some(SpecialTriviaStatus::Shiny) => {
                action.points_for_winning.saturating_mul(action.shiny_multiplier)
            }
            Some(SpecialTriviaStatus::Toxic) => {
                action.points_for_winning.saturating_mul(action.toxic_multiplier)
            }
            None => action.points_for_winning,
        };

        let game = SuperTriviaGameState {
            game_id: ulid::Ulid::new().to_string(),
            action_id: action.action_id.clone(),
            twitch_channel: action.twitch_channel.clone(),
            emote: emote.clone(),
            question: question.clone(),
            base_points_for_winning: action.points_for_winning,
            points_for_winning,
            regular_trivia_points_for_winning: action.regular_trivia_points_for_winning,
            per_user_attempts: action.per_user_attempts,
            seconds_to_live: action.seconds_to_live,
            end_time: end_time(action.seconds_to_live)?,
            toxic_trivia_punishment_multiplier: action.toxic_trivia_punishment_multiplier,
            special_trivia_status,
            answered_user_ids: Default::default(),
        };
        let game_id = game.game_id.clone();
        self.games.add_super_game(game);
        self.queue.forget_action(&action.action_id);

        let remaining_queue_size = self.queue.get_queued_super_games_size(&action.twitch_channel);
        tracing::info!(
            "Started super trivia {} in {} ({}, {} queued)",
            game_id,
            action.twitch_channel,
            question.trivia_id,
            remaining_queue_size
        );

        self.emit(TriviaEvent::NewSuperGame {
            event_id: TriviaEvent::new_event_id(),
            action_id: action.action_id,
            game_id,
            twitch_channel: action.twitch_channel,
            emote,
            points_for_winning,
            per_user_attempts: action.per_user_attempts,
            seconds_to_live: action.seconds_to_live,
            remaining_queue_size,
            special_trivia_status,
            question,
        })
        .await;
        Ok(())
    }

    async fn check_answer(&mut self, action: CheckAnswerAction) -> TriviaResult<()> {
        let now = Instant::now();

        let Some(game) = self
            .games
            .get_normal_game(&action.twitch_channel, &action.user_id)
            .cloned()
        else {
            self.emit(TriviaEvent::GameNotReadyCheckAnswer {
                event_id: TriviaEvent::new_event_id(),
                action_id: action.action_id,
                twitch_channel: action.twitch_channel,
                user_id: action.user_id,
                user_name: action.user_name,
                answer: action.answer,
            })
            .await;
            return Ok(());
        };

        if game.user_id != action.user_id {
            self.emit(TriviaEvent::WrongUserCheckAnswer {
                event_id: TriviaEvent::new_event_id(),
                action_id: action.action_id,
                game_id: game.game_id,
                twitch_channel: action.twitch_channel,
                user_id: action.user_id,
                user_name: action.user_name,
                answer: action.answer,
            })
            .await;
            return Ok(());
        }

        if game.is_out_of_time(now) {
            let score_result = self
                .collaborators
                .scores
                .increment_trivia_losses(&game.twitch_channel, &game.user_id)
                .await?;
            self.games.remove_normal_game(&game.twitch_channel, &game.user_id);

            tracing::info!(
                "{} answered trivia {} too late in {}",
                action.user_name,
                game.game_id,
                action.twitch_channel
            );
            self.emit(TriviaEvent::TooLateToAnswerCheckAnswer {
                event_id: TriviaEvent::new_event_id(),
                action_id: action.action_id,
                game_id: game.game_id,
                twitch_channel: action.twitch_channel,
                user_id: action.user_id,
                user_name: action.user_name,
                answer: action.answer,
                emote: game.emote,
                question: game.question,
                score_result,
            })
            .await;
            return Ok(());
        }

        let extras = AnswerCheckExtras {
            twitch_channel: action.twitch_channel.clone(),
            user_id: action.user_id.clone(),
            user_name: action.user_name.clone(),
        };
        let result = self
            .collaborators
            .answer_checker
            .check_answer(&action.answer, &game.question, &extras)
            .await?;

        match result {
            CheckAnswerResult::InvalidInput => {
                self.emit(TriviaEvent::InvalidAnswerInput {
                    event_id: TriviaEvent::new_event_id(),
                    action_id: action.action_id,
                    game_id: game.game_id,
                    twitch_channel: action.twitch_channel,
                    user_id: action.user_id,
                    user_name: action.user_name,
                    answer: action.answer,
                    emote: game.emote,
                    special_trivia_status: game.special_trivia_status,
                    question: game.question,
                })
                .await;
            }
            CheckAnswerResult::Incorrect => {
                let score_result = self
                    .collaborators
                    .scores
                    .increment_trivia_losses(&game.twitch_channel, &game.user_id)
                    .await?;
                self.games.remove_normal_game(&game.twitch_channel, &game.user_id);

                tracing::info!(
                    "{} got trivia {} wrong in {}",
                    action.user_name,
                    game.game_id,
                    action.twitch_channel
                );
                self.emit(TriviaEvent::IncorrectAnswer {
                    event_id: TriviaEvent::new_event_id(),
                    action_id: action.action_id,
                    game_id: game.game_id,
                    twitch_channel: action.twitch_channel,
                    user_id: action.user_id,
                    user_name: action.user_name,
                    answer: action.answer,
                    emote: game.emote,
                    special_trivia_status: game.special_trivia_status,
                    question: game.question,
                    score_result,
                })
                .await;
            }
            CheckAnswerResult::Correct => {
                let special = &self.collaborators.special;
                if game.is_shiny() {
                    special
                        .shiny_trivia_win(&game.twitch_channel, &game.user_id)
                        .await?;
                } else if game.is_toxic() {
                    special
                        .toxic_trivia_win(&game.twitch_channel, &game.user_id)
                        .await?;
                }

                let cuteness_result = self
                    .collaborators
                    .cuteness
                    .fetch_cuteness_incremented_by(
                        game.points_for_winning,
                        &game.twitch_channel,
                        &game.user_id,
                        &action.user_name,
                    )
                    .await?;
                let score_result = self
                    .collaborators
                    .scores
                    .increment_trivia_wins(&game.twitch_channel, &game.user_id)
                    .await?;
                self.games.remove_normal_game(&game.twitch_channel, &game.user_id);

                tracing::info!(
                    "{} won trivia {} in {} (+{})",
                    action.user_name,
                    game.game_id,
                    action.twitch_channel,
                    game.points_for_winning
                );
                self.emit(TriviaEvent::CorrectAnswer {
                    event_id: TriviaEvent::new_event_id(),
                    action_id: action.action_id,
                    game_id: game.game_id,
                    twitch_channel: action.twitch_channel,
                    user_id: action.user_id,
                    user_name: action.user_name,
                    answer: action.answer,
                    emote: game.emote,
                    points_for_winning: game.points_for_winning,
                    special_trivia_status: game.special_trivia_status,
                    question: game.question,
                    cuteness_result,
                    score_result,
                })
                .await;
            }
        }

        Ok(())
    }

    async fn check_super_answer(&mut self, action: CheckAnswerAction) -> TriviaResult<()> {
        let now = Instant::now();

        let is_ready = self
            .games
            .get_super_game(&action.twitch_channel)
            .is_some_and(|game| !game.is_out_of_time(now));
        if !is_ready {
            self.emit(TriviaEvent::SuperGameNotReadyCheckAnswer {
                event_id: TriviaEvent::new_event_id(),
                action_id: action.action_id,
                twitch_channel: action.twitch_channel,
                user_id: action.user_id,
                user_name: action.user_name,
                answer: action.answer,
            })
            .await;
            return Ok(());
        }

        let Some(game) = self.games.get_super_game_mut(&action.twitch_channel) else {
            return Ok(());
        };
        if !game.is_eligible_to_answer(&action.user_id) {
            tracing::debug!(
                "{} has no super trivia attempts left in {}",
                action.user_name,
                action.twitch_channel
            );
            return Ok(());
        }
        game.increment_answer_count(&action.user_id);
        let game = game.clone();

        if let Err(e) = self
            .collaborators
            .user_names
            .set_user_name(&action.user_id, &action.user_name)
            .await
        {
            tracing::warn!("Failed to remember user name of {}: {}", action.user_id, e);
        }

        let extras = AnswerCheckExtras {
            twitch_channel: action.twitch_channel.clone(),
            user_id: action.user_id.clone(),
            user_name: action.user_name.clone(),
        };
        let result = self
            .collaborators
            .answer_checker
            .check_answer(&action.answer, &game.question, &extras)
            .await?;

        if result != CheckAnswerResult::Correct {
            self.emit(TriviaEvent::IncorrectSuperAnswer {
                event_id: TriviaEvent::new_event_id(),
                action_id: action.action_id,
                game_id: game.game_id,
                twitch_channel: action.twitch_channel,
                user_id: action.user_id,
                user_name: action.user_name,
                answer: action.answer,
                emote: game.emote,
                check_answer_result: result,
            })
            .await;
            return Ok(());
        }

        let mut points_for_winning = game.points_for_winning;
        let mut toxic_trivia_punishment_result = None;
        if game.is_shiny() {
            self.collaborators
                .special
                .shiny_trivia_win(&game.twitch_channel, &action.user_id)
                .await?;
        } else if game.is_toxic() {
            toxic_trivia_punishment_result = calculate_toxic_punishment(
                &self.collaborators,
                &game.twitch_channel,
                &game.answered_user_ids,
                Some(action.user_id.as_str()),
                game.toxic_trivia_punishment_multiplier,
                game.regular_trivia_points_for_winning,
            )
            .await?;
            if let Some(punishment) = &toxic_trivia_punishment_result {
                points_for_winning =
                    points_for_winning.saturating_add(punishment.total_points_stolen);
            }
            self.collaborators
                .special
                .toxic_trivia_win(&game.twitch_channel, &action.user_id)
                .await?;
        }

        let cuteness_result = self
            .collaborators
            .cuteness
            .fetch_cuteness_incremented_by(
                points_for_winning,
                &game.twitch_channel,
                &action.user_id,
                &action.user_name,
            )
            .await?;
        let score_result = self
            .collaborators
            .scores
            .increment_super_trivia_wins(&game.twitch_channel, &action.user_id)
            .await?;
        self.games.remove_super_game(&game.twitch_channel);
        let remaining_queue_size = self.queue.get_queued_super_games_size(&game.twitch_channel);

        tracing::info!(
            "{} won super trivia {} in {} (+{})",
            action.user_name,
            game.game_id,
            action.twitch_channel,
            points_for_winning
        );
        self.emit(TriviaEvent::CorrectSuperAnswer {
            event_id: TriviaEvent::new_event_id(),
            action_id: action.action_id,
            game_id: game.game_id,
            twitch_channel: action.twitch_channel,
            user_id: action.user_id,
            user_name: action.user_name,
            answer: action.answer,
            emote: game.emote,
            points_for_winning,
            remaining_queue_size,
            special_trivia_status: game.special_trivia_status,
            question: game.question,
            toxic_trivia_punishment_result,
            cuteness_result,
            score_result,
        })
        .await;
        Ok(())
    }

    async fn clear_super_trivia_queue(
        &mut self,
        action: ClearSuperTriviaQueueAction,
    ) -> TriviaResult<()> {
        let cleared = self.queue.clear_queued_super_games(&action.twitch_channel);

        tracing::info!(
            "Cleared {} queued super trivia game(s) in {}",
            cleared.amount_removed,
            action.twitch_channel
        );
        self.emit(TriviaEvent::ClearedSuperTriviaQueue {
            event_id: TriviaEvent::new_event_id(),
            action_id: action.action_id,
            twitch_channel: action.twitch_channel,
            number_of_games_removed: cleared.amount_removed,
            previous_queue_size: cleared.old_queue_size,
        })
        .await;
        Ok(())
    }

    /// Terminal handling of a normal game that ran out of time
    ///
    /// The game is already gone from the store, so the event goes out even
    /// when the loss cannot be recorded.
    async fn expire_normal_game(&self, game: TriviaGameState) {
        let score_result = match self
            .collaborators
            .scores
            .increment_trivia_losses(&game.twitch_channel, &game.user_id)
            .await
        {
            Ok(score_result) => Some(score_result),
            Err(e) => {
                tracing::error!(
                    "Failed to record the timeout of trivia {} for {}: {}",
                    game.game_id,
                    game.user_id,
                    e
                );
                None
            }
        };

        tracing::info!(
            "Trivia {} for {} in {} ran out of time",
            game.game_id,
            game.user_name,
            game.twitch_channel
        );
        self.emit(TriviaEvent::OutOfTime {
            event_id: TriviaEvent::new_event_id(),
            action_id: game.action_id,
            game_id: game.game_id,
            twitch_channel: game.twitch_channel,
            user_id: game.user_id,
            user_name: game.user_name,
            emote: game.emote,
            points_for_winning: game.points_for_winning,
            special_trivia_status: game.special_trivia_status,
            question: game.question,
            score_result,
        })
        .await;
    }

    /// Terminal handling of a super game already removed from the store
    async fn expire_super_game(&self, game: SuperTriviaGameState) {
        let toxic_trivia_punishment_result = if game.is_toxic() {
            calculate_toxic_punishment(
                &self.collaborators,
                &game.twitch_channel,
                &game.answered_user_ids,
                None,
                game.toxic_trivia_punishment_multiplier,
                game.regular_trivia_points_for_winning,
            )
            .await
            .unwrap_or_else(|e| {
                tracing::error!(
                    "Failed to punish toxic super trivia {} in {}: {}",
                    game.game_id,
                    game.twitch_channel,
                    e
                );
                None
            })
        } else {
            None
        };
        let remaining_queue_size = self.queue.get_queued_super_games_size(&game.twitch_channel);

        tracing::info!(
            "Super trivia {} in {} ran out of time",
            game.game_id,
            game.twitch_channel
        );
        self.emit(TriviaEvent::OutOfTimeSuperGame {
            event_id: TriviaEvent::new_event_id(),
            action_id: game.action_id,
            game_id: game.game_id,
            twitch_channel: game.twitch_channel,
            emote: game.emote,
            points_for_winning: game.points_for_winning,
            remaining_queue_size,
            special_trivia_status: game.special_trivia_status,
            question: game.question,
            toxic_trivia_punishment_result,
        })
        .await;
    }
}

fn end_time(seconds_to_live: u64) -> TriviaResult<Instant> {
    Instant::now()
        .checked_add(Duration::from_secs(seconds_to_live))
        .ok_or_else(|| {
            TriviaError::InvalidAction(format!(
                "seconds_to_live {} is out of range",
                seconds_to_live
            ))
        })
}
