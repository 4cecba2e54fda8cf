use std::collections::HashMap;

use super::TriviaCollaborators;
use crate::error::TriviaResult;
use crate::types::*;

/// Sort punishments harshest first, ties broken by user name
pub fn sort_toxic_punishments(punishments: &mut [ToxicTriviaPunishment]) {
    punishments.sort_by(|a, b| {
        a.punished_by_points
            .cmp(&b.punished_by_points)
            .then_with(|| a.user_name.to_lowercase().cmp(&b.user_name.to_lowercase()))
    });
}

/// Punish everyone who answered a toxic super game, except the winner
///
/// Each attempt costs `multiplier * regular_trivia_points_for_winning`
/// cuteness. Returns `None` when nobody is punished or either factor is not
/// positive, so every punishment is at most zero.
pub async fn calculate_toxic_punishment(
    collaborators: &TriviaCollaborators,
    twitch_channel: &str,
    answered_user_ids: &HashMap<UserId, u32>,
    winner_user_id: Option<&str>,
    toxic_trivia_punishment_multiplier: i64,
    regular_trivia_points_for_winning: i64,
) -> TriviaResult<Option<ToxicTriviaPunishmentResult>> {
    let pool: Vec<(&UserId, u32)> = answered_user_ids
        .iter()
        .filter(|(user_id, _)| Some(user_id.as_str()) != winner_user_id)
        .map(|(user_id, attempts)| (user_id, *attempts))
        .collect();

    if toxic_trivia_punishment_multiplier <= 0
        || regular_trivia_points_for_winning <= 0
        || pool.is_empty()
    {
        return Ok(None);
    }

    let mut total_points_stolen: i64 = 0;
    let mut punishments = Vec::with_capacity(pool.len());

    for (user_id, attempts) in pool {
        let points_lost = i64::from(attempts)
            .saturating_mul(toxic_trivia_punishment_multiplier)
            .saturating_mul(regular_trivia_points_for_winning);
        let punished_by_points = -points_lost;
        total_points_stolen = total_points_stolen.saturating_add(points_lost);

        let user_name = match collaborators.user_names.fetch_user_name(user_id).await {
            Ok(Some(name)) => name,
            Ok(None) => user_id.clone(),
            Err(e) => {
                tracing::warn!("Failed to resolve user name for {}: {}", user_id, e);
                user_id.clone()
            }
        };

        let cuteness_result = collaborators
            .cuteness
            .fetch_cuteness_incremented_by(punished_by_points, twitch_channel, user_id, &user_name)
            .await?;
        collaborators
            .special
            .toxic_trivia_punishment(twitch_channel, user_id)
            .await?;

        punishments.push(ToxicTriviaPunishment {
            user_id: user_id.clone(),
            user_name,
            number_of_punishments: attempts,
            punished_by_points,
            cuteness_result,
        });
    }

    sort_toxic_punishments(&mut punishments);

    tracing::info!(
        "Toxic trivia in {} punished {} user(s) for {} points",
        twitch_channel,
        punishments.len(),
        total_points_stolen
    );

    Ok(Some(ToxicTriviaPunishmentResult {
        total_points_stolen,
        punishments,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{CutenessRepository, UserNameRepository};
    use crate::special::SpecialTriviaOccurrence;
    use crate::trivia::LocalQuestionBank;
    use std::sync::Arc;

    fn answered(entries: &[(&str, u32)]) -> HashMap<UserId, u32> {
        entries
            .iter()
            .map(|(user_id, attempts)| (user_id.to_string(), *attempts))
            .collect()
    }

    fn punishment(user_name: &str, punished_by_points: i64) -> ToxicTriviaPunishment {
        ToxicTriviaPunishment {
            user_id: user_name.to_string(),
            user_name: user_name.to_string(),
            number_of_punishments: 1,
            punished_by_points,
            cuteness_result: CutenessResult {
                twitch_channel: "chan".to_string(),
                user_id: user_name.to_string(),
                user_name: user_name.to_string(),
                cuteness: punished_by_points,
            },
        }
    }

    #[tokio::test]
    async fn test_winner_is_spared_and_others_pay_per_attempt() {
        let (collaborators, parts) =
            TriviaCollaborators::in_memory(Arc::new(LocalQuestionBank::built_in()), 0.0, 0.0);

        let result = calculate_toxic_punishment(
            &collaborators,
            "chan",
            &answered(&[("a", 2), ("b", 1)]),
            Some("b"),
            1,
            50,
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(result.total_points_stolen, 100);
        assert_eq!(result.punishments.len(), 1);
        assert_eq!(result.punishments[0].user_id, "a");
        assert_eq!(result.punishments[0].user_name, "a");
        assert_eq!(result.punishments[0].punished_by_points, -100);
        assert_eq!(result.punishments[0].number_of_punishments, 2);

        let cuteness = parts.cuteness.fetch_cuteness("chan", "a").await.unwrap();
        assert_eq!(cuteness.map(|c| c.cuteness), Some(-100));
        assert_eq!(
            parts
                .special
                .occurrences("chan", "a", SpecialTriviaOccurrence::ToxicPunishment)
                .await,
            1
        );
    }

    #[tokio::test]
    async fn test_no_punishment_without_multiplier_or_losers() {
        let (collaborators, _) =
            TriviaCollaborators::in_memory(Arc::new(LocalQuestionBank::built_in()), 0.0, 0.0);

        let answered_by = answered(&[("a", 2)]);
        let none = calculate_toxic_punishment(&collaborators, "chan", &answered_by, None, 0, 50)
            .await
            .unwrap();
        assert!(none.is_none());

        let none = calculate_toxic_punishment(&collaborators, "chan", &answered_by, Some("a"), 1, 50)
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_negative_points_never_reward_losers() {
        let (collaborators, parts) =
            TriviaCollaborators::in_memory(Arc::new(LocalQuestionBank::built_in()), 0.0, 0.0);

        let result = calculate_toxic_punishment(
            &collaborators,
            "chan",
            &answered(&[("a", 1)]),
            None,
            1,
            -50,
        )
        .await
        .unwrap();
        assert!(result.is_none());
        assert!(parts.cuteness.fetch_cuteness("chan", "a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_huge_punishments_saturate() {
        let (collaborators, _) =
            TriviaCollaborators::in_memory(Arc::new(LocalQuestionBank::built_in()), 0.0, 0.0);

        let result = calculate_toxic_punishment(
            &collaborators,
            "chan",
            &answered(&[("a", 3), ("b", 3)]),
            None,
            i64::MAX,
            2,
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(result.total_points_stolen, i64::MAX);
        assert!(result
            .punishments
            .iter()
            .all(|p| p.punished_by_points == -i64::MAX));
    }

    #[tokio::test]
    async fn test_total_matches_sum_and_names_are_resolved() {
        let (collaborators, _) =
            TriviaCollaborators::in_memory(Arc::new(LocalQuestionBank::built_in()), 0.0, 0.0);
        collaborators
            .user_names
            .set_user_name("u2", "zed")
            .await
            .unwrap();

        let result = calculate_toxic_punishment(
            &collaborators,
            "chan",
            &answered(&[("u1", 1), ("u2", 1), ("u3", 3)]),
            None,
            2,
            5,
        )
        .await
        .unwrap()
        .unwrap();

        let sum: i64 = result
            .punishments
            .iter()
            .map(|p| p.punished_by_points.abs())
            .sum();
        assert_eq!(result.total_points_stolen, sum);
        assert!(result.punishments.iter().all(|p| p.punished_by_points <= 0));

        let order: Vec<_> = result
            .punishments
            .iter()
            .map(|p| (p.user_name.as_str(), p.punished_by_points))
            .collect();
        assert_eq!(order, vec![("u3", -30), ("u1", -10), ("zed", -10)]);
    }

    #[test]
    fn test_sort_is_case_insensitive_on_ties() {
        let mut punishments = vec![
            punishment("bob", -5),
            punishment("Alice", -5),
            punishment("carol", -20),
        ];
        sort_toxic_punishments(&mut punishments);

        let names: Vec<_> = punishments.iter().map(|p| p.user_name.as_str()).collect();
        assert_eq!(names, vec!["carol", "Alice", "bob"]);
    }
}
