//! Runtime settings for the trivia game machine, loaded from the environment

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{TriviaError, TriviaResult};

/// Emotes rotated through per channel when no override is configured
pub const DEFAULT_TRIVIA_EMOTES: &[&str] = &[
    "🏫", "🖍️", "✏️", "🧑‍🎓", "👨‍🎓", "👩‍🎓", "🧑‍🏫", "👨‍🏫", "👩‍🏫", "📚", "🧠", "💡",
];

/// Emote used when a generator has no emotes to rotate through
pub const FALLBACK_TRIVIA_EMOTE: &str = "❓";

#[derive(Debug, Clone)]
pub struct TriviaSettings {
    /// Pause between two ticks of the action loop and of the event loop
    pub sleep_interval: Duration,
    /// Bounded wait when pushing into the action or event queue
    pub queue_timeout: Duration,
    pub action_queue_capacity: usize,
    pub event_queue_capacity: usize,
    /// Minimum age of a super trivia request before its question may appear
    pub super_trivia_first_question_delay: Duration,
    /// Quiet period after a super trivia game ends in a channel
    pub super_trivia_cooldown: Duration,
    pub max_super_trivia_game_queue_size: usize,
    pub max_fetch_attempts: u32,
    pub shiny_probability: f64,
    pub toxic_probability: f64,
    pub emotes: Vec<String>,
    /// JSON file with local trivia questions (built-in bank when unset)
    pub question_bank_path: Option<PathBuf>,
}

impl Default for TriviaSettings {
    fn default() -> Self {
        Self {
            sleep_interval: Duration::from_millis(500),
            queue_timeout: Duration::from_secs(3),
            action_queue_capacity: 1024,
            event_queue_capacity: 1024,
            super_trivia_first_question_delay: Duration::from_secs(5),
            super_trivia_cooldown: Duration::from_secs(10),
            max_super_trivia_game_queue_size: 50,
            max_fetch_attempts: 3,
            shiny_probability: 0.02,
            toxic_probability: 0.03,
            emotes: DEFAULT_TRIVIA_EMOTES
                .iter()
                .map(|emote| emote.to_string())
                .collect(),
            question_bank_path: None,
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env_string(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring unparseable value {:?} for {}", raw, key);
            None
        }
    }
}

impl TriviaSettings {
    /// Load settings from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let emotes = env_string("TRIVIA_EMOTES")
            .map(|raw| {
                raw.split(',')
                    .map(|emote| emote.trim().to_string())
                    .filter(|emote| !emote.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|emotes| !emotes.is_empty())
            .unwrap_or(defaults.emotes);

        Self {
            sleep_interval: env_parse("TRIVIA_SLEEP_MILLIS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.sleep_interval),
            queue_timeout: env_parse("TRIVIA_QUEUE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.queue_timeout),
            action_queue_capacity: env_parse::<usize>("TRIVIA_ACTION_QUEUE_CAPACITY")
                .unwrap_or(defaults.action_queue_capacity)
                .max(1),
            event_queue_capacity: env_parse::<usize>("TRIVIA_EVENT_QUEUE_CAPACITY")
                .unwrap_or(defaults.event_queue_capacity)
                .max(1),
            super_trivia_first_question_delay: env_parse("SUPER_TRIVIA_FIRST_QUESTION_DELAY_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.super_trivia_first_question_delay),
            super_trivia_cooldown: env_parse("SUPER_TRIVIA_COOLDOWN_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.super_trivia_cooldown),
            max_super_trivia_game_queue_size: env_parse("MAX_SUPER_TRIVIA_GAME_QUEUE_SIZE")
                .unwrap_or(defaults.max_super_trivia_game_queue_size),
            max_fetch_attempts: env_parse::<u32>("TRIVIA_MAX_FETCH_ATTEMPTS")
                .unwrap_or(defaults.max_fetch_attempts)
                .max(1),
            shiny_probability: env_parse::<f64>("SHINY_TRIVIA_PROBABILITY")
                .filter(|p| p.is_finite())
                .unwrap_or(defaults.shiny_probability)
                .clamp(0.0, 1.0),
            toxic_probability: env_parse::<f64>("TOXIC_TRIVIA_PROBABILITY")
                .filter(|p| p.is_finite())
                .unwrap_or(defaults.toxic_probability)
                .clamp(0.0, 1.0),
            emotes,
            question_bank_path: env_string("TRIVIA_QUESTION_BANK").map(PathBuf::from),
        }
    }

    /// Check the settings a game machine cannot run without
    pub fn validate(&self) -> TriviaResult<()> {
        if self.emotes.is_empty() {
            return Err(TriviaError::Config(
                "At least one trivia emote is required".to_string(),
            ));
        }
        if self.sleep_interval.is_zero() {
            return Err(TriviaError::Config(
                "Sleep interval must be greater than zero".to_string(),
            ));
        }
        if self.action_queue_capacity == 0 || self.event_queue_capacity == 0 {
            return Err(TriviaError::Config(
                "Queue capacities must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.shiny_probability)
            || !(0.0..=1.0).contains(&self.toxic_probability)
        {
            return Err(TriviaError::Config(
                "Special trivia probabilities must be between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }
}
