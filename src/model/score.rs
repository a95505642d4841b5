use chrono::{Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One completed play-through. Immutable once created; lives in the capped,
/// time-ascending leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub player_name: String,
    pub total_time_seconds: u32,
    /// Unix seconds of submission.
    pub completed_at: i64,
    pub levels_completed: u32,
    pub playthrough_id: Uuid,
}

impl ScoreRecord {
    /// Local calendar date of submission; `None` for timestamps outside the
    /// representable range.
    pub fn completed_on(&self) -> Option<NaiveDate> {
        Local
            .timestamp_opt(self.completed_at, 0)
            .single()
            .map(|dt| dt.date_naive())
    }
}

/// Leaderboard slice selector: the whole board, or only records submitted
/// today (local calendar date).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Today,
}

/// A player's best result with its standing in the full leaderboard.
///
/// `rank` is derived by looking up the best time's first position in the
/// ascending list of all times, so equal times collapse onto the same rank
/// value. `total_players` counts records, not distinct names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerBest {
    pub record: ScoreRecord,
    pub rank: usize,
    pub total_players: usize,
}

impl PlayerBest {
    /// Share of the field this result beats, rounded to whole percent.
    pub fn percent_beaten(&self) -> u32 {
        if self.total_players == 0 {
            return 0;
        }
        let ahead = (self.rank - 1) as f64;
        ((ahead / self.total_players as f64) * 100.0).round() as u32
    }
}
