// Public API for integration tests and embedding the game machine in a bot

pub mod answer;
pub mod config;
pub mod error;
pub mod machine;
pub mod protocol;
pub mod repository;
pub mod special;
pub mod state;
pub mod trivia;
pub mod types;
