//! Score, cuteness and user name storage used by the game engine
//!
//! The engine only sees the traits. The in-memory implementations keep
//! everything for the lifetime of the process.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::TriviaResult;
use crate::types::*;

#[async_trait]
pub trait TriviaScoreRepository: Send + Sync {
    async fn increment_trivia_wins(
        &self,
        twitch_channel: &str,
        user_id: &str,
    ) -> TriviaResult<TriviaScoreResult>;

    async fn increment_trivia_losses(
        &self,
        twitch_channel: &str,
        user_id: &str,
    ) -> TriviaResult<TriviaScoreResult>;

    async fn increment_super_trivia_wins(
        &self,
        twitch_channel: &str,
        user_id: &str,
    ) -> TriviaResult<TriviaScoreResult>;

    async fn fetch_trivia_score(
        &self,
        twitch_channel: &str,
        user_id: &str,
    ) -> TriviaResult<TriviaScoreResult>;
}

#[async_trait]
pub trait CutenessRepository: Send + Sync {
    /// Add `amount` (which may be negative) and return the new balance
    async fn fetch_cuteness_incremented_by(
        &self,
        amount: i64,
        twitch_channel: &str,
        user_id: &str,
        user_name: &str,
    ) -> TriviaResult<CutenessResult>;

    async fn fetch_cuteness(
        &self,
        twitch_channel: &str,
        user_id: &str,
    ) -> TriviaResult<Option<CutenessResult>>;
}

#[async_trait]
pub trait UserNameRepository: Send + Sync {
    async fn fetch_user_name(&self, user_id: &str) -> TriviaResult<Option<String>>;

    async fn set_user_name(&self, user_id: &str, user_name: &str) -> TriviaResult<()>;
}

type ChannelUserKey = (String, UserId);

fn user_key(twitch_channel: &str, user_id: &str) -> ChannelUserKey {
    (channel_key(twitch_channel), user_id.to_string())
}

#[derive(Clone, Default)]
pub struct InMemoryScoreRepository {
    scores: Arc<RwLock<HashMap<ChannelUserKey, TriviaScoreResult>>>,
}

impl InMemoryScoreRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn update(
        &self,
        twitch_channel: &str,
        user_id: &str,
        apply: impl FnOnce(&mut TriviaScoreResult) + Send,
    ) -> TriviaScoreResult {
        let mut scores = self.scores.write().await;
        let score = scores
            .entry(user_key(twitch_channel, user_id))
            .or_insert_with(|| empty_score(twitch_channel, user_id));
        apply(score);
        score.updated_at = chrono::Utc::now().to_rfc3339();
        score.clone()
    }
}

fn empty_score(twitch_channel: &str, user_id: &str) -> TriviaScoreResult {
    TriviaScoreResult {
        twitch_channel: channel_key(twitch_channel),
        user_id: user_id.to_string(),
        streak: 0,
        trivia_wins: 0,
        trivia_losses: 0,
        super_trivia_wins: 0,
        updated_at: chrono::Utc::now().to_rfc3339(),
    }
}

#[async_trait]
impl TriviaScoreRepository for InMemoryScoreRepository {
    async fn increment_trivia_wins(
        &self,
        twitch_channel: &str,
        user_id: &str,
    ) -> TriviaResult<TriviaScoreResult> {
        Ok(self
            .update(twitch_channel, user_id, |score| {
                score.trivia_wins += 1;
                score.streak = if score.streak >= 0 { score.streak + 1 } else { 1 };
            })
            .await)
    }

    async fn increment_trivia_losses(
        &self,
        twitch_channel: &str,
        user_id: &str,
    ) -> TriviaResult<TriviaScoreResult> {
        Ok(self
            .update(twitch_channel, user_id, |score| {
                score.trivia_losses += 1;
                score.streak = if score.streak <= 0 { score.streak - 1 } else { -1 };
            })
            .await)
    }

    async fn increment_super_trivia_wins(
        &self,
        twitch_channel: &str,
        user_id: &str,
    ) -> TriviaResult<TriviaScoreResult> {
        Ok(self
            .update(twitch_channel, user_id, |score| {
                score.super_trivia_wins += 1;
            })
            .await)
    }

    async fn fetch_trivia_score(
        &self,
        twitch_channel: &str,
        user_id: &str,
    ) -> TriviaResult<TriviaScoreResult> {
        Ok(self
            .scores
            .read()
            .await
            .get(&user_key(twitch_channel, user_id))
            .cloned()
            .unwrap_or_else(|| empty_score(twitch_channel, user_id)))
    }
}

#[derive(Clone, Default)]
pub struct InMemoryCutenessRepository {
    balances: Arc<RwLock<HashMap<ChannelUserKey, CutenessResult>>>,
}

impl InMemoryCutenessRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CutenessRepository for InMemoryCutenessRepository {
    async fn fetch_cuteness_incremented_by(
        &self,
        amount: i64,
        twitch_channel: &str,
        user_id: &str,
        user_name: &str,
    ) -> TriviaResult<CutenessResult> {
        let mut balances = self.balances.write().await;
        let balance = balances
            .entry(user_key(twitch_channel, user_id))
            .or_insert_with(|| CutenessResult {
                twitch_channel: channel_key(twitch_channel),
                user_id: user_id.to_string(),
                user_name: user_name.to_string(),
                cuteness: 0,
            });
        balance.cuteness = balance.cuteness.saturating_add(amount);
        balance.user_name = user_name.to_string();
        Ok(balance.clone())
    }

    async fn fetch_cuteness(
        &self,
        twitch_channel: &str,
        user_id: &str,
    ) -> TriviaResult<Option<CutenessResult>> {
        Ok(self
            .balances
            .read()
            .await
            .get(&user_key(twitch_channel, user_id))
            .cloned())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryUserNameRepository {
    names: Arc<RwLock<HashMap<UserId, String>>>,
}

impl InMemoryUserNameRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserNameRepository for InMemoryUserNameRepository {
    async fn fetch_user_name(&self, user_id: &str) -> TriviaResult<Option<String>> {
        Ok(self.names.read().await.get(user_id).cloned())
    }

    async fn set_user_name(&self, user_id: &str, user_name: &str) -> TriviaResult<()> {
        self.names
            .write()
            .await
            .insert(user_id.to_string(), user_name.to_string());
        Ok(())
    }
}
