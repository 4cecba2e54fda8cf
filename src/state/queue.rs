use std::collections::{HashMap, HashSet, VecDeque};

use crate::protocol::StartNewSuperTriviaGameAction;
use crate::types::{channel_key, ActionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddQueuedGamesResult {
    pub amount_added: usize,
    pub old_queue_size: usize,
    pub new_queue_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearQueuedGamesResult {
    pub amount_removed: usize,
    pub old_queue_size: usize,
}

/// Per-channel FIFO of super trivia requests waiting for their turn
#[derive(Debug, Clone)]
pub struct QueuedTriviaGameStore {
    max_queue_size: usize,
    queues: HashMap<String, VecDeque<StartNewSuperTriviaGameAction>>,
    /// Requests whose extra games were already queued; guards re-submissions
    queued_action_ids: HashSet<ActionId>,
}

impl QueuedTriviaGameStore {
    pub fn new(max_queue_size: usize) -> Self {
        Self {
            max_queue_size,
            queues: HashMap::new(),
            queued_action_ids: HashSet::new(),
        }
    }

    /// Queue the games of `action` that cannot start right now
    ///
    /// While a game is running every requested game waits; otherwise the
    /// request itself starts and only the remainder waits.
    pub fn add_super_games(
        &mut self,
        is_super_trivia_game_currently_in_progress: bool,
        action: &StartNewSuperTriviaGameAction,
    ) -> AddQueuedGamesResult {
        let key = channel_key(&action.twitch_channel);
        let old_queue_size = self.get_queued_super_games_size(&key);

        if action.is_queue_action_consumed || self.queued_action_ids.contains(&action.action_id) {
            return AddQueuedGamesResult {
                amount_added: 0,
                old_queue_size,
                new_queue_size: old_queue_size,
            };
        }

        self.queued_action_ids.insert(action.action_id.clone());

        let requested = action.number_of_games as usize;
        let wanted = if is_super_trivia_game_currently_in_progress {
            requested
        } else {
            requested.saturating_sub(1)
        };
        let room = self.max_queue_size.saturating_sub(old_queue_size);
        let amount_added = wanted.min(room);

        if amount_added > 0 {
            let queue = self.queues.entry(key).or_default();
            for _ in 0..amount_added {
                queue.push_back(action.to_queued_copy());
            }
        }

        if amount_added < wanted {
            tracing::warn!(
                "Super trivia queue for {} is full ({}), dropped {} game(s)",
                action.twitch_channel,
                self.max_queue_size,
                wanted - amount_added
            );
        }

        AddQueuedGamesResult {
            amount_added,
            old_queue_size,
            new_queue_size: old_queue_size + amount_added,
        }
    }

    /// Pop the oldest queued request of every channel not in `excluded`
    pub fn pop_queued_super_games(
        &mut self,
        excluded: &HashSet<String>,
    ) -> Vec<StartNewSuperTriviaGameAction> {
        let mut popped = Vec::new();

        for (channel, queue) in self.queues.iter_mut() {
            if excluded.contains(channel) {
                continue;
            }
            if let Some(action) = queue.pop_front() {
                popped.push(action);
            }
        }

        self.queues.retain(|_, queue| !queue.is_empty());
        popped
    }

    pub fn get_queued_super_games_size(&self, twitch_channel: &str) -> usize {
        self.queues
            .get(&channel_key(twitch_channel))
            .map(VecDeque::len)
            .unwrap_or(0)
    }

    pub fn clear_queued_super_games(&mut self, twitch_channel: &str) -> ClearQueuedGamesResult {
        let removed = self
            .queues
            .remove(&channel_key(twitch_channel))
            .unwrap_or_default();

        ClearQueuedGamesResult {
            amount_removed: removed.len(),
            old_queue_size: removed.len(),
        }
    }

    /// Drop the re-submission guard once a request has reached its outcome
    pub fn forget_action(&mut self, action_id: &str) {
        self.queued_action_ids.remove(action_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(channel: &str, number_of_games: u32) -> StartNewSuperTriviaGameAction {
        let mut action = StartNewSuperTriviaGameAction::new(channel);
        action.number_of_games = number_of_games;
        action
    }

    #[test]
    fn test_single_game_without_active_game_is_not_queued() {
        let mut store = QueuedTriviaGameStore::new(10);
        let result = store.add_super_games(false, &request("chan", 1));
        assert_eq!(result.amount_added, 0);
        assert_eq!(store.get_queued_super_games_size("chan"), 0);
    }

    #[test]
    fn test_active_game_queues_every_requested_game() {
        let mut store = QueuedTriviaGameStore::new(10);
        let result = store.add_super_games(true, &request("Chan", 3));
        assert_eq!(
            result,
            AddQueuedGamesResult {
                amount_added: 3,
                old_queue_size: 0,
                new_queue_size: 3,
            }
        );
        assert_eq!(store.get_queued_super_games_size("chan"), 3);
    }

    #[test]
    fn test_idle_channel_queues_remainder() {
        let mut store = QueuedTriviaGameStore::new(10);
        let result = store.add_super_games(false, &request("chan", 3));
        assert_eq!(result.amount_added, 2);
    }

    #[test]
    fn test_queue_is_clamped() {
        let mut store = QueuedTriviaGameStore::new(4);
        store.add_super_games(true, &request("chan", 3));
        let result = store.add_super_games(true, &request("chan", 3));
        assert_eq!(result.amount_added, 1);
        assert_eq!(result.old_queue_size, 3);
        assert_eq!(store.get_queued_super_games_size("chan"), 4);
    }

    #[test]
    fn test_resubmitted_action_is_not_queued_twice() {
        let mut store = QueuedTriviaGameStore::new(10);
        let action = request("chan", 3);

        assert_eq!(store.add_super_games(false, &action).amount_added, 2);
        assert_eq!(store.add_super_games(false, &action).amount_added, 0);
        assert_eq!(store.get_queued_super_games_size("chan"), 2);

        store.forget_action(&action.action_id);
        assert_eq!(store.add_super_games(false, &action).amount_added, 2);
    }

    #[test]
    fn test_queued_copies_are_never_requeued() {
        let mut store = QueuedTriviaGameStore::new(10);
        store.add_super_games(true, &request("chan", 1));
        let popped = store.pop_queued_super_games(&HashSet::new());
        assert_eq!(popped.len(), 1);
        assert!(popped[0].is_queue_action_consumed);

        assert_eq!(store.add_super_games(true, &popped[0]).amount_added, 0);
    }

    #[test]
    fn test_pop_skips_excluded_channels_and_is_fifo() {
        let mut store = QueuedTriviaGameStore::new(10);
        let first = request("one", 1);
        let second = request("one", 1);
        store.add_super_games(true, &first);
        store.add_super_games(true, &second);
        store.add_super_games(true, &request("two", 1));

        let excluded = HashSet::from(["two".to_string()]);
        let popped = store.pop_queued_super_games(&excluded);
        assert_eq!(popped.len(), 1);
        assert_eq!(popped[0].twitch_channel, "one");
        assert_eq!(popped[0].creation_time, first.creation_time);
        assert_eq!(store.get_queued_super_games_size("one"), 1);
        assert_eq!(store.get_queued_super_games_size("two"), 1);

        let popped = store.pop_queued_super_games(&HashSet::new());
        assert_eq!(popped.len(), 2);
        assert_eq!(store.get_queued_super_games_size("one"), 0);
        assert_eq!(store.get_queued_super_games_size("two"), 0);
    }

    #[test]
    fn test_clear_reports_removed_games() {
        let mut store = QueuedTriviaGameStore::new(10);
        store.add_super_games(true, &request("chan", 3));

        let result = store.clear_queued_super_games("CHAN");
        assert_eq!(
            result,
            ClearQueuedGamesResult {
                amount_removed: 3,
                old_queue_size: 3,
            }
        );
        assert_eq!(store.get_queued_super_games_size("chan"), 0);

        let result = store.clear_queued_super_games("chan");
        assert_eq!(result.amount_removed, 0);
    }
}
