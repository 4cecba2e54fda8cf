//! Local question bank, loaded from a JSON file or built in

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;

use super::TriviaQuestionSource;
use crate::error::{TriviaError, TriviaResult};
use crate::types::*;

pub struct LocalQuestionBank {
    questions: Vec<TriviaQuestion>,
    /// Last question served per channel, so repeats are avoided when possible
    last_served: RwLock<HashMap<String, TriviaId>>,
}

impl LocalQuestionBank {
    /// Build a bank from questions, skipping malformed ones
    pub fn with_questions(questions: Vec<TriviaQuestion>) -> Self {
        let total = questions.len();
        let questions: Vec<_> = questions
            .into_iter()
            .filter(|question| match question.validate() {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("Skipping trivia question: {}", e);
                    false
                }
            })
            .collect();

        if questions.len() != total {
            tracing::warn!(
                "Loaded {} of {} trivia questions",
                questions.len(),
                total
            );
        }

        Self {
            questions,
            last_served: RwLock::new(HashMap::new()),
        }
    }

    /// Load a JSON array of questions from disk
    pub async fn load(path: impl AsRef<Path>) -> TriviaResult<Self> {
        let path = path.as_ref();
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| TriviaError::QuestionBank {
                    path: path.to_path_buf(),
                    source,
                })?;
        let questions: Vec<TriviaQuestion> = serde_json::from_str(&contents)?;

        tracing::info!(
            "Loaded {} trivia questions from {}",
            questions.len(),
            path.display()
        );
        Ok(Self::with_questions(questions))
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Small bank used when no question file is configured
    pub fn built_in() -> Self {
        let question = |trivia_id: &str, text: &str, category: &str, kind| TriviaQuestion {
            trivia_id: trivia_id.to_string(),
            question: text.to_string(),
            category: Some(category.to_string()),
            difficulty: TriviaDifficulty::Easy,
            source: "built_in".to_string(),
            kind,
        };
        let responses = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        Self::with_questions(vec![
            question(
                "builtin-1",
                "Which planet is closest to the sun?",
                "Space",
                TriviaQuestionKind::MultipleChoice {
                    responses: responses(&["Venus", "Mercury", "Mars", "Earth"]),
                    correct_index: 1,
                },
            ),
            question(
                "builtin-2",
                "Octopuses have three hearts.",
                "Animals",
                TriviaQuestionKind::TrueFalse {
                    correct_answer: true,
                },
            ),
            question(
                "builtin-3",
                "What is the chemical symbol for gold?",
                "Science",
                TriviaQuestionKind::QuestionAnswer {
                    correct_answers: responses(&["Au"]),
                },
            ),
            question(
                "builtin-4",
                "Which of these is a pokémon?",
                "Games",
                TriviaQuestionKind::MultipleChoice {
                    responses: responses(&["Snorlax", "Gumba", "Kirby"]),
                    correct_index: 0,
                },
            ),
            question(
                "builtin-5",
                "The Great Wall of China is visible from the moon with the naked eye.",
                "Geography",
                TriviaQuestionKind::TrueFalse {
                    correct_answer: false,
                },
            ),
            question(
                "builtin-6",
                "Which ocean is the largest?",
                "Geography",
                TriviaQuestionKind::QuestionAnswer {
                    correct_answers: responses(&["Pacific", "Pacific Ocean"]),
                },
            ),
        ])
    }
}

#[async_trait]
impl TriviaQuestionSource for LocalQuestionBank {
    async fn fetch_trivia(
        &self,
        emote: &str,
        fetch_options: &TriviaFetchOptions,
    ) -> TriviaResult<TriviaQuestion> {
        let candidates: Vec<&TriviaQuestion> = self
            .questions
            .iter()
            .filter(|question| {
                fetch_options
                    .question_answer_trivia_conditions
                    .permits(question)
            })
            .collect();

        if candidates.is_empty() {
            return Err(TriviaError::QuestionSource(format!(
                "No local trivia question matches {:?}",
                fetch_options.question_answer_trivia_conditions
            )));
        }

        let channel = channel_key(&fetch_options.twitch_channel);
        let mut last_served = self.last_served.write().await;
        let fresh: Vec<&TriviaQuestion> = match last_served.get(&channel) {
            Some(last_id) if candidates.len() > 1 => candidates
                .iter()
                .copied()
                .filter(|question| &question.trivia_id != last_id)
                .collect(),
            _ => candidates,
        };

        let question = fresh
            .choose(&mut rand::rng())
            .map(|question| (*question).clone())
            .ok_or_else(|| TriviaError::QuestionSource("Question bank is empty".to_string()))?;

        tracing::debug!(
            "Serving local trivia question {} to {} ({})",
            question.trivia_id,
            fetch_options.twitch_channel,
            emote
        );
        last_served.insert(channel, question.trivia_id.clone());
        Ok(question)
    }

    fn name(&self) -> &str {
        "local"
    }
}
