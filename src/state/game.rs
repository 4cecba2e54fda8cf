use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tokio::time::Instant;

use super::cooldown::SuperTriviaCooldownHelper;
use crate::types::*;

/// A running normal trivia game, owned by one user
#[derive(Debug, Clone)]
pub struct TriviaGameState {
    pub game_id: GameId,
    pub action_id: ActionId,
    pub twitch_channel: String,
    pub user_id: UserId,
    pub user_name: String,
    pub emote: String,
    pub question: TriviaQuestion,
    pub base_points_for_winning: i64,
    pub points_for_winning: i64,
    pub seconds_to_live: u64,
    pub end_time: Instant,
    pub special_trivia_status: Option<SpecialTriviaStatus>,
}

impl TriviaGameState {
    pub fn is_out_of_time(&self, now: Instant) -> bool {
        now >= self.end_time
    }

    pub fn is_shiny(&self) -> bool {
        self.special_trivia_status == Some(SpecialTriviaStatus::Shiny)
    }

    pub fn is_toxic(&self) -> bool {
        self.special_trivia_status == Some(SpecialTriviaStatus::Toxic)
    }
}

/// A running channel-wide super trivia game
#[derive(Debug, Clone)]
pub struct SuperTriviaGameState {
    pub game_id: GameId,
    pub action_id: ActionId,
    pub twitch_channel: String,
    pub emote: String,
    pub question: TriviaQuestion,
    pub base_points_for_winning: i64,
    pub points_for_winning: i64,
    pub regular_trivia_points_for_winning: i64,
    pub per_user_attempts: u32,
    pub seconds_to_live: u64,
    pub end_time: Instant,
    pub toxic_trivia_punishment_multiplier: i64,
    pub special_trivia_status: Option<SpecialTriviaStatus>,
    /// Answer attempts made so far, per user
    pub answered_user_ids: HashMap<UserId, u32>,
}

impl SuperTriviaGameState {
    pub fn is_out_of_time(&self, now: Instant) -> bool {
        now >= self.end_time
    }

    pub fn is_shiny(&self) -> bool {
        self.special_trivia_status == Some(SpecialTriviaStatus::Shiny)
    }

    pub fn is_toxic(&self) -> bool {
        self.special_trivia_status == Some(SpecialTriviaStatus::Toxic)
    }

    pub fn is_eligible_to_answer(&self, user_id: &str) -> bool {
        self.answered_user_ids.get(user_id).copied().unwrap_or(0) < self.per_user_attempts
    }

    pub fn increment_answer_count(&mut self, user_id: &str) -> u32 {
        let count = self.answered_user_ids.entry(user_id.to_string()).or_insert(0);
        *count += 1;
        *count
    }
}

/// Either kind of stored game, as handed back by expiry scans
#[derive(Debug, Clone)]
pub enum TriviaGame {
    Normal(TriviaGameState),
    Super(SuperTriviaGameState),
}

/// In-memory store of active games
///
/// Owns the super trivia cooldowns: removing a super game, for any reason,
/// starts its channel's cooldown.
#[derive(Debug, Clone)]
pub struct TriviaGameStore {
    normal_games: HashMap<(String, UserId), TriviaGameState>,
    super_games: HashMap<String, SuperTriviaGameState>,
    cooldowns: SuperTriviaCooldownHelper,
}

impl TriviaGameStore {
    pub fn new(super_trivia_cooldown: Duration) -> Self {
        Self {
            normal_games: HashMap::new(),
            super_games: HashMap::new(),
            cooldowns: SuperTriviaCooldownHelper::new(super_trivia_cooldown),
        }
    }

    fn normal_key(twitch_channel: &str, user_id: &str) -> (String, UserId) {
        (channel_key(twitch_channel), user_id.to_string())
    }

    pub fn cooldowns(&self) -> &SuperTriviaCooldownHelper {
        &self.cooldowns
    }

    /// Store a normal game, replacing (and returning) any previous one
    pub fn add_normal_game(&mut self, game: TriviaGameState) -> Option<TriviaGameState> {
        let key = Self::normal_key(&game.twitch_channel, &game.user_id);
        self.normal_games.insert(key, game)
    }

    pub fn get_normal_game(&self, twitch_channel: &str, user_id: &str) -> Option<&TriviaGameState> {
        self.normal_games.get(&Self::normal_key(twitch_channel, user_id))
    }

    pub fn remove_normal_game(
        &mut self,
        twitch_channel: &str,
        user_id: &str,
    ) -> Option<TriviaGameState> {
        self.normal_games.remove(&Self::normal_key(twitch_channel, user_id))
    }

    /// Store a super game, replacing (and returning) any previous one
    pub fn add_super_game(&mut self, game: SuperTriviaGameState) -> Option<SuperTriviaGameState> {
        self.super_games.insert(channel_key(&game.twitch_channel), game)
    }

    pub fn get_super_game(&self, twitch_channel: &str) -> Option<&SuperTriviaGameState> {
        self.super_games.get(&channel_key(twitch_channel))
    }

    pub fn get_super_game_mut(&mut self, twitch_channel: &str) -> Option<&mut SuperTriviaGameState> {
        self.super_games.get_mut(&channel_key(twitch_channel))
    }

    pub fn remove_super_game(&mut self, twitch_channel: &str) -> Option<SuperTriviaGameState> {
        let removed = self.super_games.remove(&channel_key(twitch_channel));
        if removed.is_some() {
            self.cooldowns.update(twitch_channel);
        }
        removed
    }

    /// Channels (normalized) that currently hold a super game
    pub fn get_active_super_game_channels(&self) -> HashSet<String> {
        self.super_games.keys().cloned().collect()
    }

    /// Remove and return every game whose end time has passed
    pub fn remove_expired_games(&mut self, now: Instant) -> Vec<TriviaGame> {
        let mut expired = Vec::new();

        let normal_keys: Vec<_> = self
            .normal_games
            .iter()
            .filter(|(_, game)| game.is_out_of_time(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in normal_keys {
            if let Some(game) = self.normal_games.remove(&key) {
                expired.push(TriviaGame::Normal(game));
            }
        }

        let super_channels: Vec<_> = self
            .super_games
            .iter()
            .filter(|(_, game)| game.is_out_of_time(now))
            .map(|(channel, _)| channel.clone())
            .collect();
        for channel in super_channels {
            if let Some(game) = self.remove_super_game(&channel) {
                expired.push(TriviaGame::Super(game));
            }
        }

        expired
    }

    pub fn normal_game_count(&self) -> usize {
        self.normal_games.len()
    }

    pub fn super_game_count(&self) -> usize {
        self.super_games.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> TriviaQuestion {
        TriviaQuestion {
            trivia_id: "q1".to_string(),
            question: "Is water wet?".to_string(),
            category: None,
            difficulty: TriviaDifficulty::Unknown,
            source: "test".to_string(),
            kind: TriviaQuestionKind::TrueFalse {
                correct_answer: true,
            },
        }
    }

    fn normal_game(channel: &str, user_id: &str, seconds_to_live: u64) -> TriviaGameState {
        TriviaGameState {
            game_id: ulid::Ulid::new().to_string(),
            action_id: "a1".to_string(),
            twitch_channel: channel.to_string(),
            user_id: user_id.to_string(),
            user_name: user_id.to_uppercase(),
            emote: "📚".to_string(),
            question: question(),
            base_points_for_winning: 5,
            points_for_winning: 5,
            seconds_to_live,
            end_time: Instant::now() + Duration::from_secs(seconds_to_live),
            special_trivia_status: None,
        }
    }

    fn super_game(channel: &str, seconds_to_live: u64) -> SuperTriviaGameState {
        SuperTriviaGameState {
            game_id: ulid::Ulid::new().to_string(),
            action_id: "a2".to_string(),
            twitch_channel: channel.to_string(),
            emote: "🧠".to_string(),
            question: question(),
            base_points_for_winning: 25,
            points_for_winning: 25,
            regular_trivia_points_for_winning: 5,
            per_user_attempts: 2,
            seconds_to_live,
            end_time: Instant::now() + Duration::from_secs(seconds_to_live),
            toxic_trivia_punishment_multiplier: 0,
            special_trivia_status: None,
            answered_user_ids: HashMap::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_normal_games_keyed_by_channel_and_user() {
        let mut store = TriviaGameStore::new(Duration::from_secs(5));
        store.add_normal_game(normal_game("Chan", "u1", 30));
        store.add_normal_game(normal_game("chan", "u2", 30));

        assert!(store.get_normal_game("CHAN", "u1").is_some());
        assert!(store.get_normal_game("chan", "u3").is_none());
        assert_eq!(store.normal_game_count(), 2);

        assert!(store.remove_normal_game("chan", "u1").is_some());
        assert!(store.get_normal_game("chan", "u1").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_removing_super_game_starts_cooldown() {
        let mut store = TriviaGameStore::new(Duration::from_secs(5));
        store.add_super_game(super_game("Chan", 30));
        assert!(!store.cooldowns().is_twitch_channel_in_cooldown("chan"));

        assert!(store.remove_super_game("chan").is_some());
        assert!(store.cooldowns().is_twitch_channel_in_cooldown("chan"));

        // Nothing removed, nothing restarted
        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(store.remove_super_game("chan").is_none());
        assert!(!store.cooldowns().is_twitch_channel_in_cooldown("chan"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_expired_games() {
        let mut store = TriviaGameStore::new(Duration::from_secs(5));
        store.add_normal_game(normal_game("chan", "fast", 10));
        store.add_normal_game(normal_game("chan", "slow", 60));
        store.add_super_game(super_game("chan", 10));

        assert!(store.remove_expired_games(Instant::now()).is_empty());

        tokio::time::advance(Duration::from_secs(10)).await;
        let expired = store.remove_expired_games(Instant::now());
        assert_eq!(expired.len(), 2);
        assert!(expired
            .iter()
            .any(|game| matches!(game, TriviaGame::Normal(g) if g.user_id == "fast")));
        assert!(expired
            .iter()
            .any(|game| matches!(game, TriviaGame::Super(_))));
        assert!(store.get_normal_game("chan", "slow").is_some());
        assert_eq!(store.super_game_count(), 0);
        assert!(store.cooldowns().is_twitch_channel_in_cooldown("chan"));

        assert!(store.remove_expired_games(Instant::now()).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_answer_eligibility() {
        let mut game = super_game("chan", 30);
        game.per_user_attempts = 2;

        assert!(game.is_eligible_to_answer("u1"));
        assert_eq!(game.increment_answer_count("u1"), 1);
        assert!(game.is_eligible_to_answer("u1"));
        assert_eq!(game.increment_answer_count("u1"), 2);
        assert!(!game.is_eligible_to_answer("u1"));
        assert!(game.is_eligible_to_answer("u2"));
    }
}
