mod local;

use async_trait::async_trait;
use std::sync::Arc;

pub use local::LocalQuestionBank;

use crate::error::{TriviaError, TriviaResult};
use crate::types::{TriviaFetchOptions, TriviaQuestion};

/// Anything that can hand out trivia questions
#[async_trait]
pub trait TriviaQuestionSource: Send + Sync {
    /// Fetch a question for the game that will be shown with `emote`
    async fn fetch_trivia(
        &self,
        emote: &str,
        fetch_options: &TriviaFetchOptions,
    ) -> TriviaResult<TriviaQuestion>;

    /// Get the name of this source
    fn name(&self) -> &str;
}

/// Retries a source a bounded number of times before giving up
///
/// Malformed questions count as failed attempts.
pub struct RetryingQuestionSource {
    inner: Arc<dyn TriviaQuestionSource>,
    max_attempts: u32,
}

impl RetryingQuestionSource {
    pub fn new(inner: Arc<dyn TriviaQuestionSource>, max_attempts: u32) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
        }
    }
}

#[async_trait]
impl TriviaQuestionSource for RetryingQuestionSource {
    async fn fetch_trivia(
        &self,
        emote: &str,
        fetch_options: &TriviaFetchOptions,
    ) -> TriviaResult<TriviaQuestion> {
        for attempt in 1..=self.max_attempts {
            let result = self
                .inner
                .fetch_trivia(emote, fetch_options)
                .await
                .and_then(|question| question.validate().map(|_| question));

            match result {
                Ok(question) => return Ok(question),
                Err(e) => {
                    tracing::warn!(
                        "Trivia source {} failed for {} (attempt {}/{}): {}",
                        self.inner.name(),
                        fetch_options.twitch_channel,
                        attempt,
                        self.max_attempts,
                        e
                    );
                }
            }
        }

        Err(TriviaError::TooManyFetchAttempts {
            attempts: self.max_attempts,
        })
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TriviaDifficulty, TriviaQuestionKind};
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails a fixed number of times, then succeeds
    struct FlakySource {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl TriviaQuestionSource for FlakySource {
        async fn fetch_trivia(
            &self,
            _emote: &str,
            _fetch_options: &TriviaFetchOptions,
        ) -> TriviaResult<TriviaQuestion> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(TriviaError::QuestionSource("timeout".to_string()));
            }
            Ok(TriviaQuestion {
                trivia_id: "tf".to_string(),
                question: "Rust has a borrow checker.".to_string(),
                category: None,
                difficulty: TriviaDifficulty::Easy,
                source: "flaky".to_string(),
                kind: TriviaQuestionKind::TrueFalse {
                    correct_answer: true,
                },
            })
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    #[tokio::test]
    async fn test_retry_recovers_within_budget() {
        let inner = Arc::new(FlakySource {
            failures: 2,
            calls: AtomicU32::new(0),
        });
        let source = RetryingQuestionSource::new(inner.clone(), 3);

        let question = source
            .fetch_trivia("📚", &TriviaFetchOptions::new("chan"))
            .await
            .unwrap();
        assert_eq!(question.trivia_id, "tf");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up() {
        let inner = Arc::new(FlakySource {
            failures: 10,
            calls: AtomicU32::new(0),
        });
        let source = RetryingQuestionSource::new(inner.clone(), 3);

        let result = source
            .fetch_trivia("📚", &TriviaFetchOptions::new("chan"))
            .await;
        assert!(matches!(
            result,
            Err(TriviaError::TooManyFetchAttempts { attempts: 3 })
        ));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }
}
