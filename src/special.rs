//! Shiny and toxic trivia: rolls and bookkeeping hooks

use async_trait::async_trait;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::TriviaResult;
use crate::types::{channel_key, UserId};

#[async_trait]
pub trait SpecialTriviaHelper: Send + Sync {
    async fn is_shiny_trivia_question(&self, twitch_channel: &str) -> bool;

    async fn is_toxic_trivia_question(&self, twitch_channel: &str) -> bool;

    /// Called when `user_id` wins a shiny game
    async fn shiny_trivia_win(&self, twitch_channel: &str, user_id: &str) -> TriviaResult<()>;

    /// Called when `user_id` wins a toxic game
    async fn toxic_trivia_win(&self, twitch_channel: &str, user_id: &str) -> TriviaResult<()>;

    /// Called once per user punished by a toxic game
    async fn toxic_trivia_punishment(
        &self,
        twitch_channel: &str,
        user_id: &str,
    ) -> TriviaResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialTriviaOccurrence {
    ShinyWin,
    ToxicWin,
    ToxicPunishment,
}

/// Rolls special statuses with fixed probabilities and counts outcomes
#[derive(Clone)]
pub struct ProbabilisticSpecialTriviaHelper {
    shiny_probability: f64,
    toxic_probability: f64,
    occurrences: Arc<RwLock<HashMap<(String, UserId, SpecialTriviaOccurrence), u64>>>,
}

impl ProbabilisticSpecialTriviaHelper {
    pub fn new(shiny_probability: f64, toxic_probability: f64) -> Self {
        Self {
            shiny_probability: shiny_probability.clamp(0.0, 1.0),
            toxic_probability: toxic_probability.clamp(0.0, 1.0),
            occurrences: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn occurrences(
        &self,
        twitch_channel: &str,
        user_id: &str,
        occurrence: SpecialTriviaOccurrence,
    ) -> u64 {
        self.occurrences
            .read()
            .await
            .get(&(channel_key(twitch_channel), user_id.to_string(), occurrence))
            .copied()
            .unwrap_or(0)
    }

    async fn record(&self, twitch_channel: &str, user_id: &str, occurrence: SpecialTriviaOccurrence) {
        *self
            .occurrences
            .write()
            .await
            .entry((channel_key(twitch_channel), user_id.to_string(), occurrence))
            .or_insert(0) += 1;
    }
}

#[async_trait]
impl SpecialTriviaHelper for ProbabilisticSpecialTriviaHelper {
    async fn is_shiny_trivia_question(&self, _twitch_channel: &str) -> bool {
        rand::rng().random_bool(self.shiny_probability)
    }

    async fn is_toxic_trivia_question(&self, _twitch_channel: &str) -> bool {
        rand::rng().random_bool(self.toxic_probability)
    }

    async fn shiny_trivia_win(&self, twitch_channel: &str, user_id: &str) -> TriviaResult<()> {
        tracing::info!("{} won a shiny trivia in {}", user_id, twitch_channel);
        self.record(twitch_channel, user_id, SpecialTriviaOccurrence::ShinyWin)
            .await;
        Ok(())
    }

    async fn toxic_trivia_win(&self, twitch_channel: &str, user_id: &str) -> TriviaResult<()> {
        tracing::info!("{} won a toxic trivia in {}", user_id, twitch_channel);
        self.record(twitch_channel, user_id, SpecialTriviaOccurrence::ToxicWin)
            .await;
        Ok(())
    }

    async fn toxic_trivia_punishment(
        &self,
        twitch_channel: &str,
        user_id: &str,
    ) -> TriviaResult<()> {
        self.record(
            twitch_channel,
            user_id,
            SpecialTriviaOccurrence::ToxicPunishment,
        )
        .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_certain_and_impossible_rolls() {
        let always = ProbabilisticSpecialTriviaHelper::new(1.0, 1.0);
        let never = ProbabilisticSpecialTriviaHelper::new(0.0, 0.0);

        for _ in 0..20 {
            assert!(always.is_shiny_trivia_question("chan").await);
            assert!(always.is_toxic_trivia_question("chan").await);
            assert!(!never.is_shiny_trivia_question("chan").await);
            assert!(!never.is_toxic_trivia_question("chan").await);
        }
    }

    #[tokio::test]
    async fn test_out_of_range_probability_is_clamped() {
        let helper = ProbabilisticSpecialTriviaHelper::new(7.0, -1.0);
        assert!(helper.is_shiny_trivia_question("chan").await);
        assert!(!helper.is_toxic_trivia_question("chan").await);
    }

    #[tokio::test]
    async fn test_hooks_are_counted_per_channel_and_user() {
        let helper = ProbabilisticSpecialTriviaHelper::new(0.0, 0.0);
        helper.shiny_trivia_win("Chan", "u1").await.unwrap();
        helper.shiny_trivia_win("chan", "u1").await.unwrap();
        helper.toxic_trivia_punishment("chan", "u2").await.unwrap();

        assert_eq!(
            helper
                .occurrences("chan", "u1", SpecialTriviaOccurrence::ShinyWin)
                .await,
            2
        );
        assert_eq!(
            helper
                .occurrences("chan", "u2", SpecialTriviaOccurrence::ToxicPunishment)
                .await,
            1
        );
        assert_eq!(
            helper
                .occurrences("chan", "u2", SpecialTriviaOccurrence::ToxicWin)
                .await,
            0
        );
    }
}
