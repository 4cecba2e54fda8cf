use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tokio::time::Instant;

use crate::types::channel_key;

/// Tracks per-channel quiet periods after a super trivia game ends
#[derive(Debug, Clone)]
pub struct SuperTriviaCooldownHelper {
    cooldown: Duration,
    cooldowns: HashMap<String, Instant>,
}

impl SuperTriviaCooldownHelper {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            cooldowns: HashMap::new(),
        }
    }

    pub fn is_twitch_channel_in_cooldown(&self, twitch_channel: &str) -> bool {
        let now = Instant::now();
        self.cooldowns
            .get(&channel_key(twitch_channel))
            .is_some_and(|until| *until > now)
    }

    /// Channels (normalized) whose cooldown has not elapsed yet
    pub fn get_twitch_channels_in_cooldown(&self) -> HashSet<String> {
        let now = Instant::now();
        self.cooldowns
            .iter()
            .filter(|(_, until)| **until > now)
            .map(|(channel, _)| channel.clone())
            .collect()
    }

    /// Start (or restart) the cooldown for a channel
    pub fn update(&mut self, twitch_channel: &str) {
        let now = Instant::now();
        self.cooldowns.retain(|_, until| *until > now);
        self.cooldowns
            .insert(channel_key(twitch_channel), now + self.cooldown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_expires() {
        let mut helper = SuperTriviaCooldownHelper::new(Duration::from_secs(10));
        assert!(!helper.is_twitch_channel_in_cooldown("chan"));

        helper.update("Chan");
        assert!(helper.is_twitch_channel_in_cooldown("chan"));
        assert!(helper.is_twitch_channel_in_cooldown("CHAN"));
        assert_eq!(
            helper.get_twitch_channels_in_cooldown(),
            HashSet::from(["chan".to_string()])
        );

        tokio::time::advance(Duration::from_secs(11)).await;
        assert!(!helper.is_twitch_channel_in_cooldown("chan"));
        assert!(helper.get_twitch_channels_in_cooldown().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_cooldown_never_blocks() {
        let mut helper = SuperTriviaCooldownHelper::new(Duration::ZERO);
        helper.update("chan");
        assert!(!helper.is_twitch_channel_in_cooldown("chan"));
    }
}
