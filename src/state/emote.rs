use std::collections::HashMap;

use crate::config::FALLBACK_TRIVIA_EMOTE;
use crate::types::channel_key;

/// Hands out emotes round-robin per channel so chat can tell questions apart
#[derive(Debug, Clone)]
pub struct TriviaEmoteGenerator {
    emotes: Vec<String>,
    positions: HashMap<String, usize>,
}

impl TriviaEmoteGenerator {
    pub fn new(emotes: Vec<String>) -> Self {
        Self {
            emotes,
            positions: HashMap::new(),
        }
    }

    pub fn next_emote(&mut self, twitch_channel: &str) -> String {
        if self.emotes.is_empty() {
            return FALLBACK_TRIVIA_EMOTE.to_string();
        }

        let position = self.positions.entry(channel_key(twitch_channel)).or_insert(0);
        let emote = self.emotes[*position % self.emotes.len()].clone();
        *position = (*position + 1) % self.emotes.len();
        emote
    }
}
