use async_trait::async_trait;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use twitch_trivia::config::TriviaSettings;
use twitch_trivia::error::{TriviaError, TriviaResult};
use twitch_trivia::machine::{TriviaCollaborators, TriviaEventListener, TriviaGameMachine};
use twitch_trivia::protocol::TriviaEvent;
use twitch_trivia::trivia::LocalQuestionBank;

/// Writes every event to the log as JSON
struct LoggingListener;

#[async_trait]
impl TriviaEventListener for LoggingListener {
    async fn on_new_trivia_event(&self, event: TriviaEvent) -> TriviaResult<()> {
        let json =
            serde_json::to_string(&event).map_err(|e| TriviaError::Listener(e.to_string()))?;
        tracing::info!("{} in {}: {}", event.name(), event.twitch_channel(), json);
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "twitch_trivia=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting trivia game machine...");

    let settings = TriviaSettings::from_env();

    let question_bank = match &settings.question_bank_path {
        Some(path) => match LocalQuestionBank::load(path).await {
            Ok(bank) if !bank.is_empty() => bank,
            Ok(_) => {
                tracing::warn!("Question bank {} is empty, using built-in questions", path.display());
                LocalQuestionBank::built_in()
            }
            Err(e) => {
                tracing::warn!("{}. Using built-in questions.", e);
                LocalQuestionBank::built_in()
            }
        },
        None => LocalQuestionBank::built_in(),
    };
    tracing::info!("Serving {} trivia questions", question_bank.len());

    let (collaborators, _) = TriviaCollaborators::in_memory(
        Arc::new(question_bank),
        settings.shiny_probability,
        settings.toxic_probability,
    );

    let machine = TriviaGameMachine::start(settings, collaborators)
        .expect("Failed to start trivia game machine");
    machine
        .set_event_listener(Some(Arc::new(LoggingListener)))
        .await;

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
    }

    machine.shutdown();
}
