use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, TimestampSeconds};
use uuid::Uuid;

/// Cross-level progress for one play-through. Owned by the session
/// controller; everything here survives a snapshot/restore.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub player_name: String,
    /// 1-based level number.
    pub current_level: u32,
    /// Sum of completed level times.
    pub cumulative_time_seconds: u32,
    pub hints_remaining: u32,
    /// Countdown for the level in progress.
    pub time_remaining_seconds: u32,
    #[serde_as(as = "TimestampSeconds")]
    pub level_started_at: SystemTime,
    pub playthrough_id: Uuid,
}

impl Session {
    pub fn new(player_name: String, max_hints: u32) -> Self {
        Self {
            player_name,
            current_level: 1,
            cumulative_time_seconds: 0,
            hints_remaining: max_hints,
            time_remaining_seconds: 0,
            level_started_at: SystemTime::now(),
            playthrough_id: Uuid::new_v4(),
        }
    }

    /// Whole seconds since the current level started. Interruption time is
    /// deliberately not subtracted; a resumed session pays for its absence.
    pub fn elapsed_this_level(&self, now: SystemTime) -> u32 {
        now.duration_since(self.level_started_at)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0)
    }
}

/// Outcome of one completed level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelResult {
    pub level: u32,
    pub level_time_seconds: u32,
    pub cumulative_time_seconds: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_new_session_starts_at_level_one() {
        let session = Session::new("ada".to_string(), 3);
        assert_eq!(session.current_level, 1);
        assert_eq!(session.cumulative_time_seconds, 0);
        assert_eq!(session.hints_remaining, 3);
    }

    #[test]
    fn test_elapsed_counts_whole_seconds() {
        let mut session = Session::new("ada".to_string(), 3);
        let start = SystemTime::now();
        session.level_started_at = start;
        assert_eq!(session.elapsed_this_level(start + Duration::from_secs(42)), 42);
        assert_eq!(
            session.elapsed_this_level(start + Duration::from_millis(42_900)),
            42
        );
    }

    #[test]
    fn test_elapsed_saturates_on_clock_rewind() {
        let mut session = Session::new("ada".to_string(), 3);
        let start = SystemTime::now();
        session.level_started_at = start + Duration::from_secs(60);
        assert_eq!(session.elapsed_this_level(start), 0);
    }

    #[test]
    fn test_session_serde_round_trip_keeps_counters() {
        let mut session = Session::new("ada".to_string(), 3);
        session.current_level = 2;
        session.cumulative_time_seconds = 77;
        session.hints_remaining = 1;
        session.time_remaining_seconds = 43;

        let json = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back.player_name, "ada");
        assert_eq!(back.current_level, 2);
        assert_eq!(back.cumulative_time_seconds, 77);
        assert_eq!(back.hints_remaining, 1);
        assert_eq!(back.time_remaining_seconds, 43);
        assert_eq!(back.playthrough_id, session.playthrough_id);
    }
}
