use std::cell::RefCell;
use std::rc::Rc;

use chrono::Local;
use itertools::Itertools;
use log::warn;

use crate::error::StorageError;
use crate::model::{PlayerBest, Scope, ScoreRecord};
use crate::storage::{KeyValueStore, KEY_LEADERBOARD};

/// Leaderboard cap: after every insert the list is re-sorted and only the
/// best entries survive, so an old fast time is never displaced by a newer
/// slow one.
pub const MAX_LEADERBOARD_ENTRIES: usize = 1000;

/// Persistent ranked collection of completed play-throughs, ordered ascending
/// by total time. The in-memory list mirrors the stored value; an unreadable
/// stored leaderboard starts over empty rather than failing the game.
pub struct ScoreStore {
    store: Rc<RefCell<dyn KeyValueStore>>,
    records: Vec<ScoreRecord>,
}

impl ScoreStore {
    pub fn new(store: Rc<RefCell<dyn KeyValueStore>>) -> Self {
        let records = Self::load(&store);
        Self { store, records }
    }

    fn load(store: &Rc<RefCell<dyn KeyValueStore>>) -> Vec<ScoreRecord> {
        let Some(contents) = store.borrow().read(KEY_LEADERBOARD) else {
            return Vec::new();
        };
        match serde_json::from_str(&contents) {
            Ok(records) => records,
            Err(e) => {
                warn!(target: "scores", "discarding unreadable leaderboard: {}", e);
                Vec::new()
            }
        }
    }

    /// Append a result, re-rank, trim to the cap, persist. A storage failure
    /// is returned for reporting but the in-memory leaderboard keeps the
    /// record, so the session can still show standings.
    pub fn record(&mut self, record: ScoreRecord) -> Result<(), StorageError> {
        self.records.push(record);
        // stable sort: equal times keep insertion order
        self.records.sort_by_key(|r| r.total_time_seconds);
        self.records.truncate(MAX_LEADERBOARD_ENTRIES);

        let contents = serde_json::to_string(&self.records)?;
        self.store.borrow_mut().write(KEY_LEADERBOARD, &contents)?;
        Ok(())
    }

    /// Best `n` records in ascending-time order, optionally narrowed to
    /// today's local calendar date.
    pub fn top_n(&self, scope: Scope, n: usize) -> Vec<ScoreRecord> {
        let today = Local::now().date_naive();
        self.records
            .iter()
            .filter(|r| match scope {
                Scope::All => true,
                Scope::Today => r.completed_on() == Some(today),
            })
            .take(n)
            .cloned()
            .collect()
    }

    /// The player's fastest record with its leaderboard standing. Rank is
    /// looked up as 1 + the first index of that time in the ascending list
    /// of all times, so tied times share one rank value.
    pub fn best_for(&self, player_name: &str) -> Option<PlayerBest> {
        let best = self
            .records
            .iter()
            .filter(|r| r.player_name == player_name)
            .min_by_key(|r| r.total_time_seconds)?;

        let times: Vec<u32> = self
            .records
            .iter()
            .map(|r| r.total_time_seconds)
            .sorted()
            .collect();
        let rank = times
            .iter()
            .position(|&t| t == best.total_time_seconds)
            .map(|index| index + 1)
            .unwrap_or(1);

        Some(PlayerBest {
            record: best.clone(),
            rank,
            total_players: self.records.len(),
        })
    }

    /// Standing a finished-but-unsubmitted time would take: one place behind
    /// every strictly faster record.
    pub fn estimated_rank(&self, total_time_seconds: u32) -> usize {
        1 + self
            .records
            .iter()
            .filter(|r| r.total_time_seconds < total_time_seconds)
            .count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use uuid::Uuid;

    fn store() -> Rc<RefCell<dyn KeyValueStore>> {
        Rc::new(RefCell::new(MemoryStore::new()))
    }

    fn record(name: &str, time: u32) -> ScoreRecord {
        ScoreRecord {
            player_name: name.to_string(),
            total_time_seconds: time,
            completed_at: Local::now().timestamp(),
            levels_completed: 3,
            playthrough_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_records_are_kept_in_ascending_time_order() {
        let mut scores = ScoreStore::new(store());
        scores.record(record("b", 95)).unwrap();
        scores.record(record("a", 80)).unwrap();
        scores.record(record("d", 110)).unwrap();

        let top = scores.top_n(Scope::All, 10);
        let times: Vec<u32> = top.iter().map(|r| r.total_time_seconds).collect();
        assert_eq!(times, vec![80, 95, 110]);
    }

    #[test]
    fn test_leaderboard_survives_a_reload() {
        let shared = store();
        {
            let mut scores = ScoreStore::new(Rc::clone(&shared));
            scores.record(record("a", 80)).unwrap();
            scores.record(record("b", 95)).unwrap();
        }
        let reloaded = ScoreStore::new(shared);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.top_n(Scope::All, 1)[0].player_name, "a");
    }

    #[test]
    fn test_unreadable_leaderboard_starts_empty() {
        let shared = store();
        shared
            .borrow_mut()
            .write(KEY_LEADERBOARD, "not json at all")
            .unwrap();
        let scores = ScoreStore::new(shared);
        assert!(scores.is_empty());
    }

    #[test]
    fn test_cap_keeps_the_best_thousand() {
        let mut scores = ScoreStore::new(store());
        for time in 1..=1001u32 {
            scores.record(record("p", time)).unwrap();
        }
        assert_eq!(scores.len(), MAX_LEADERBOARD_ENTRIES);
        let top = scores.top_n(Scope::All, MAX_LEADERBOARD_ENTRIES);
        assert_eq!(top.first().unwrap().total_time_seconds, 1);
        // the slowest insert is the one that fell off
        assert!(top.iter().all(|r| r.total_time_seconds <= 1000));
        let times: Vec<u32> = top.iter().map(|r| r.total_time_seconds).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_best_for_uses_lookup_rank_with_tie_collapse() {
        // times 80, 95, 95, 110: both 95s resolve to the first index of 95
        let mut scores = ScoreStore::new(store());
        scores.record(record("a", 80)).unwrap();
        scores.record(record("b", 95)).unwrap();
        scores.record(record("c", 95)).unwrap();
        scores.record(record("d", 110)).unwrap();

        let best_c = scores.best_for("c").unwrap();
        assert_eq!(best_c.rank, 2);
        assert_eq!(best_c.total_players, 4);
        assert_eq!(best_c.record.total_time_seconds, 95);

        let best_b = scores.best_for("b").unwrap();
        assert_eq!(best_b.rank, 2);

        let best_d = scores.best_for("d").unwrap();
        assert_eq!(best_d.rank, 4);
    }

    #[test]
    fn test_best_for_picks_the_players_fastest_run() {
        let mut scores = ScoreStore::new(store());
        scores.record(record("a", 200)).unwrap();
        scores.record(record("a", 150)).unwrap();
        scores.record(record("a", 175)).unwrap();

        let best = scores.best_for("a").unwrap();
        assert_eq!(best.record.total_time_seconds, 150);
        assert_eq!(best.rank, 1);
        assert_eq!(best.total_players, 3);
    }

    #[test]
    fn test_best_for_unknown_player_is_none() {
        let mut scores = ScoreStore::new(store());
        scores.record(record("a", 80)).unwrap();
        assert!(scores.best_for("nobody").is_none());
    }

    #[test]
    fn test_estimated_rank_counts_strictly_faster_records() {
        let mut scores = ScoreStore::new(store());
        scores.record(record("a", 80)).unwrap();
        scores.record(record("b", 95)).unwrap();
        scores.record(record("c", 110)).unwrap();

        assert_eq!(scores.estimated_rank(70), 1);
        assert_eq!(scores.estimated_rank(95), 2);
        assert_eq!(scores.estimated_rank(200), 4);
    }

    #[test]
    fn test_today_scope_filters_by_calendar_date() {
        let mut scores = ScoreStore::new(store());
        scores.record(record("today", 90)).unwrap();
        let mut old = record("lastweek", 80);
        old.completed_at = Local::now().timestamp() - 7 * 24 * 3600;
        scores.record(old).unwrap();

        let today = scores.top_n(Scope::Today, 10);
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].player_name, "today");

        let all = scores.top_n(Scope::All, 10);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_top_n_truncates() {
        let mut scores = ScoreStore::new(store());
        for time in [80, 95, 110, 130] {
            scores.record(record("p", time)).unwrap();
        }
        assert_eq!(scores.top_n(Scope::All, 2).len(), 2);
    }
}
