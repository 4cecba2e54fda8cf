//! The running trivia game machine
//!
//! Two spawned tasks: the action loop owns the [`TriviaGameEngine`] and is
//! the only writer of game state; the event loop hands produced events to
//! whichever listener is currently installed.

mod engine;
mod toxic;

use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;

pub use engine::TriviaGameEngine;
pub use toxic::{calculate_toxic_punishment, sort_toxic_punishments};

use crate::answer::{DefaultAnswerChecker, TriviaAnswerChecker};
use crate::config::TriviaSettings;
use crate::error::TriviaResult;
use crate::protocol::{TriviaAction, TriviaEvent};
use crate::repository::{
    CutenessRepository, InMemoryCutenessRepository, InMemoryScoreRepository,
    InMemoryUserNameRepository, TriviaScoreRepository, UserNameRepository,
};
use crate::special::{ProbabilisticSpecialTriviaHelper, SpecialTriviaHelper};
use crate::trivia::TriviaQuestionSource;

/// Receives every event the machine produces, in order
#[async_trait]
pub trait TriviaEventListener: Send + Sync {
    async fn on_new_trivia_event(&self, event: TriviaEvent) -> TriviaResult<()>;
}

/// Everything the engine talks to outside its own stores
#[derive(Clone)]
pub struct TriviaCollaborators {
    pub question_source: Arc<dyn TriviaQuestionSource>,
    pub answer_checker: Arc<dyn TriviaAnswerChecker>,
    pub scores: Arc<dyn TriviaScoreRepository>,
    pub cuteness: Arc<dyn CutenessRepository>,
    pub user_names: Arc<dyn UserNameRepository>,
    pub special: Arc<dyn SpecialTriviaHelper>,
}

/// Concrete handles to the in-memory collaborators, for inspection
#[derive(Clone)]
pub struct InMemoryCollaborators {
    pub scores: InMemoryScoreRepository,
    pub cuteness: InMemoryCutenessRepository,
    pub user_names: InMemoryUserNameRepository,
    pub special: ProbabilisticSpecialTriviaHelper,
}

impl TriviaCollaborators {
    /// Wire a question source to the default checker and in-memory storage
    pub fn in_memory(
        question_source: Arc<dyn TriviaQuestionSource>,
        shiny_probability: f64,
        toxic_probability: f64,
    ) -> (Self, InMemoryCollaborators) {
        let parts = InMemoryCollaborators {
            scores: InMemoryScoreRepository::new(),
            cuteness: InMemoryCutenessRepository::new(),
            user_names: InMemoryUserNameRepository::new(),
            special: ProbabilisticSpecialTriviaHelper::new(shiny_probability, toxic_probability),
        };

        let collaborators = Self {
            question_source,
            answer_checker: Arc::new(DefaultAnswerChecker),
            scores: Arc::new(parts.scores.clone()),
            cuteness: Arc::new(parts.cuteness.clone()),
            user_names: Arc::new(parts.user_names.clone()),
            special: Arc::new(parts.special.clone()),
        };

        (collaborators, parts)
    }
}

type ListenerSlot = Arc<RwLock<Option<Arc<dyn TriviaEventListener>>>>;

/// Push into a bounded queue, dropping the item if the queue stays full
pub(crate) async fn enqueue<T>(
    tx: &mpsc::Sender<T>,
    item: T,
    timeout: Duration,
    queue: &str,
    what: &str,
) -> bool {
    match tx.send_timeout(item, timeout).await {
        Ok(()) => true,
        Err(mpsc::error::SendTimeoutError::Timeout(_)) => {
            tracing::warn!(
                "Dropped {} after waiting {:?} for the {} queue",
                what,
                timeout,
                queue
            );
            false
        }
        Err(mpsc::error::SendTimeoutError::Closed(_)) => {
            tracing::warn!("Dropped {}: {} queue is closed", what, queue);
            false
        }
    }
}

/// Handle to a running trivia game machine
///
/// Cheap to clone; every clone submits into the same action queue.
#[derive(Clone)]
pub struct TriviaGameMachine {
    action_tx: mpsc::Sender<TriviaAction>,
    listener: ListenerSlot,
    queue_timeout: Duration,
    tasks: Arc<Vec<JoinHandle<()>>>,
}

impl TriviaGameMachine {
    /// Spawn the action and event loops
    pub fn start(
        settings: TriviaSettings,
        collaborators: TriviaCollaborators,
    ) -> TriviaResult<Self> {
        settings.validate()?;

        let (action_tx, action_rx) = mpsc::channel(settings.action_queue_capacity);
        let (event_tx, event_rx) = mpsc::channel(settings.event_queue_capacity);
        let listener: ListenerSlot = Arc::new(RwLock::new(None));

        let engine = TriviaGameEngine::new(&settings, collaborators, action_tx.clone(), event_tx);

        let action_loop = tokio::spawn(run_action_loop(
            engine,
            action_rx,
            settings.sleep_interval,
        ));
        let event_loop = tokio::spawn(run_event_loop(
            event_rx,
            listener.clone(),
            settings.sleep_interval,
        ));

        tracing::info!(
            "Trivia game machine started (tick every {:?})",
            settings.sleep_interval
        );

        Ok(Self {
            action_tx,
            listener,
            queue_timeout: settings.queue_timeout,
            tasks: Arc::new(vec![action_loop, event_loop]),
        })
    }

    /// Queue an action for the next tick; dropped with a warning if the
    /// queue stays full for longer than the queue timeout
    pub async fn submit_action(&self, action: TriviaAction) {
        let what = format!("{} action {}", action.name(), action.action_id());
        enqueue(&self.action_tx, action, self.queue_timeout, "action", &what).await;
    }

    /// Install (or with `None`, remove) the event listener
    pub async fn set_event_listener(&self, listener: Option<Arc<dyn TriviaEventListener>>) {
        *self.listener.write().await = listener;
    }

    /// Stop both loops; queued actions and events are discarded
    pub fn shutdown(&self) {
        for task in self.tasks.iter() {
            task.abort();
        }
        tracing::info!("Trivia game machine stopped");
    }
}

async fn run_action_loop(
    mut engine: TriviaGameEngine,
    mut action_rx: mpsc::Receiver<TriviaAction>,
    sleep_interval: Duration,
) {
    loop {
        let mut batch = Vec::new();
        while let Ok(action) = action_rx.try_recv() {
            batch.push(action);
        }

        if !batch.is_empty() {
            match AssertUnwindSafe(engine.process_batch(batch))
                .catch_unwind()
                .await
            {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!("Trivia action batch aborted: {}", e),
                Err(_) => tracing::error!("Trivia action batch panicked"),
            }
        }

        if AssertUnwindSafe(engine.run_housekeeping())
            .catch_unwind()
            .await
            .is_err()
        {
            tracing::error!("Trivia housekeeping panicked");
        }

        tokio::time::sleep(sleep_interval).await;
    }
}

async fn run_event_loop(
    mut event_rx: mpsc::Receiver<TriviaEvent>,
    listener: ListenerSlot,
    sleep_interval: Duration,
) {
    loop {
        let current = listener.read().await.clone();

        if let Some(current) = current {
            while let Ok(event) = event_rx.try_recv() {
                let name = event.name();
                let event_id = event.event_id().to_string();

                match AssertUnwindSafe(current.on_new_trivia_event(event))
                    .catch_unwind()
                    .await
                {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        tracing::error!("Listener failed on {} event {}: {}", name, event_id, e)
                    }
                    Err(_) => tracing::error!("Listener panicked on {} event {}", name, event_id),
                }
            }
        }

        tokio::time::sleep(sleep_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_enqueue_drops_when_full() {
        let (tx, mut rx) = mpsc::channel(1);
        assert!(enqueue(&tx, 1, Duration::from_millis(10), "test", "first").await);
        assert!(!enqueue(&tx, 2, Duration::from_millis(10), "test", "second").await);
        assert_eq!(rx.try_recv().ok(), Some(1));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_enqueue_drops_when_closed() {
        let (tx, rx) = mpsc::channel::<u32>(1);
        drop(rx);
        assert!(!enqueue(&tx, 1, Duration::from_millis(10), "test", "item").await);
    }

    #[tokio::test]
    async fn test_start_rejects_invalid_settings() {
        let (collaborators, _) = TriviaCollaborators::in_memory(
            Arc::new(crate::trivia::LocalQuestionBank::built_in()),
            0.0,
            0.0,
        );
        let settings = TriviaSettings {
            emotes: Vec::new(),
            ..TriviaSettings::default()
        };
        assert!(TriviaGameMachine::start(settings, collaborators).is_err());
    }
}
