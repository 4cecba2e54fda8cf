//! Answer checking for trivia questions

use async_trait::async_trait;

use crate::error::TriviaResult;
use crate::types::*;

/// Who answered, for checkers that care (e.g. to log or rate limit)
#[derive(Debug, Clone)]
pub struct AnswerCheckExtras {
    pub twitch_channel: String,
    pub user_id: UserId,
    pub user_name: String,
}

#[async_trait]
pub trait TriviaAnswerChecker: Send + Sync {
    async fn check_answer(
        &self,
        answer: &str,
        question: &TriviaQuestion,
        extras: &AnswerCheckExtras,
    ) -> TriviaResult<CheckAnswerResult>;
}

/// Checks answers locally against the question's own data
#[derive(Debug, Clone, Default)]
pub struct DefaultAnswerChecker;

const LEADING_ARTICLES: &[&str] = &["a", "an", "the"];

/// Lowercase, drop punctuation and leading articles, collapse whitespace
fn normalize(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c)
            } else if c.is_whitespace() {
                Some(' ')
            } else {
                None
            }
        })
        .collect();

    let mut words: Vec<&str> = cleaned.split_whitespace().collect();
    if words.len() > 1 && LEADING_ARTICLES.contains(&words[0]) {
        words.remove(0);
    }
    words.join(" ")
}

fn without_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Resolve a multiple choice answer to a response index
fn choice_index(answer: &str, responses: &[String]) -> Option<usize> {
    let trimmed = answer.trim();

    let mut chars = trimmed.chars();
    if let (Some(letter), None) = (chars.next(), chars.next()) {
        if letter.is_ascii_alphabetic() {
            let index = (letter.to_ascii_uppercase() as u8 - b'A') as usize;
            if index < responses.len() {
                return Some(index);
            }
        }
    }

    if let Ok(number) = trimmed.parse::<usize>() {
        if (1..=responses.len()).contains(&number) {
            return Some(number - 1);
        }
    }

    let normalized = normalize(trimmed);
    if normalized.is_empty() {
        return None;
    }
    responses
        .iter()
        .position(|response| normalize(response) == normalized)
}

fn parse_true_false(answer: &str) -> Option<bool> {
    match normalize(answer).as_str() {
        "true" | "t" | "yes" | "y" => Some(true),
        "false" | "f" | "no" | "n" => Some(false),
        _ => None,
    }
}

impl DefaultAnswerChecker {
    pub fn check(answer: &str, question: &TriviaQuestion) -> CheckAnswerResult {
        let verdict = |correct: bool| {
            if correct {
                CheckAnswerResult::Correct
            } else {
                CheckAnswerResult::Incorrect
            }
        };

        match &question.kind {
            TriviaQuestionKind::MultipleChoice {
                responses,
                correct_index,
            } => match choice_index(answer, responses) {
                Some(index) => verdict(index == *correct_index),
                None => CheckAnswerResult::InvalidInput,
            },
            TriviaQuestionKind::TrueFalse { correct_answer } => match parse_true_false(answer) {
                Some(value) => verdict(value == *correct_answer),
                None => CheckAnswerResult::InvalidInput,
            },
            TriviaQuestionKind::QuestionAnswer { correct_answers } => {
                let normalized = normalize(answer);
                if normalized.is_empty() {
                    return CheckAnswerResult::InvalidInput;
                }
                let compact = without_whitespace(&normalized);

                verdict(correct_answers.iter().any(|correct| {
                    let correct = normalize(correct);
                    correct == normalized || without_whitespace(&correct) == compact
                }))
            }
        }
    }
}

#[async_trait]
impl TriviaAnswerChecker for DefaultAnswerChecker {
    async fn check_answer(
        &self,
        answer: &str,
        question: &TriviaQuestion,
        extras: &AnswerCheckExtras,
    ) -> TriviaResult<CheckAnswerResult> {
        let result = Self::check(answer, question);
        tracing::debug!(
            "Checked answer {:?} from {} in {} for {}: {:?}",
            answer,
            extras.user_name,
            extras.twitch_channel,
            question.trivia_id,
            result
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(kind: TriviaQuestionKind) -> TriviaQuestion {
        TriviaQuestion {
            trivia_id: "q".to_string(),
            question: "?".to_string(),
            category: None,
            difficulty: TriviaDifficulty::Unknown,
            source: "test".to_string(),
            kind,
        }
    }

    fn planets() -> TriviaQuestion {
        question(TriviaQuestionKind::MultipleChoice {
            responses: vec![
                "Venus".to_string(),
                "Mercury".to_string(),
                "Mars".to_string(),
            ],
            correct_index: 1,
        })
    }

    #[test]
    fn test_multiple_choice_by_letter_number_and_text() {
        let q = planets();
        assert_eq!(DefaultAnswerChecker::check("b", &q), CheckAnswerResult::Correct);
        assert_eq!(DefaultAnswerChecker::check(" B ", &q), CheckAnswerResult::Correct);
        assert_eq!(DefaultAnswerChecker::check("2", &q), CheckAnswerResult::Correct);
        assert_eq!(DefaultAnswerChecker::check("mercury!", &q), CheckAnswerResult::Correct);
        assert_eq!(DefaultAnswerChecker::check("a", &q), CheckAnswerResult::Incorrect);
        assert_eq!(DefaultAnswerChecker::check("Mars", &q), CheckAnswerResult::Incorrect);
    }

    #[test]
    fn test_multiple_choice_invalid_input() {
        let q = planets();
        assert_eq!(DefaultAnswerChecker::check("d", &q), CheckAnswerResult::InvalidInput);
        assert_eq!(DefaultAnswerChecker::check("4", &q), CheckAnswerResult::InvalidInput);
        assert_eq!(DefaultAnswerChecker::check("pluto", &q), CheckAnswerResult::InvalidInput);
        assert_eq!(DefaultAnswerChecker::check("", &q), CheckAnswerResult::InvalidInput);
    }

    #[test]
    fn test_true_false() {
        let q = question(TriviaQuestionKind::TrueFalse {
            correct_answer: false,
        });
        assert_eq!(DefaultAnswerChecker::check("No", &q), CheckAnswerResult::Correct);
        assert_eq!(DefaultAnswerChecker::check("f", &q), CheckAnswerResult::Correct);
        assert_eq!(DefaultAnswerChecker::check("TRUE", &q), CheckAnswerResult::Incorrect);
        assert_eq!(DefaultAnswerChecker::check("maybe", &q), CheckAnswerResult::InvalidInput);
    }

    #[test]
    fn test_question_answer_normalization() {
        let q = question(TriviaQuestionKind::QuestionAnswer {
            correct_answers: vec!["The Pacific Ocean".to_string(), "Pacific".to_string()],
        });
        assert_eq!(DefaultAnswerChecker::check("pacific ocean", &q), CheckAnswerResult::Correct);
        assert_eq!(DefaultAnswerChecker::check("PACIFIC.", &q), CheckAnswerResult::Correct);
        assert_eq!(DefaultAnswerChecker::check("pacificocean", &q), CheckAnswerResult::Correct);
        assert_eq!(DefaultAnswerChecker::check("atlantic", &q), CheckAnswerResult::Incorrect);
        assert_eq!(DefaultAnswerChecker::check(" ?! ", &q), CheckAnswerResult::InvalidInput);
    }

    #[test]
    fn test_lone_article_is_kept() {
        assert_eq!(normalize("A"), "a");
        assert_eq!(normalize("  the   Beatles "), "beatles");
    }

    #[tokio::test]
    async fn test_trait_delegates_to_check() {
        let extras = AnswerCheckExtras {
            twitch_channel: "chan".to_string(),
            user_id: "u1".to_string(),
            user_name: "User".to_string(),
        };
        let result = DefaultAnswerChecker
            .check_answer("b", &planets(), &extras)
            .await
            .unwrap();
        assert_eq!(result, CheckAnswerResult::Correct);
    }
}
