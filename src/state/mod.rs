//! In-memory stores owned by the game engine
//!
//! Only the action loop touches these, so none of them carry locks.

mod cooldown;
mod emote;
mod game;
mod queue;

pub use cooldown::SuperTriviaCooldownHelper;
pub use emote::TriviaEmoteGenerator;
pub use game::{SuperTriviaGameState, TriviaGame, TriviaGameState, TriviaGameStore};
pub use queue::{AddQueuedGamesResult, ClearQueuedGamesResult, QueuedTriviaGameStore};
