use crate::model::{Board, LevelResult, ScoreRecord, Tile};

/// Everything the session controller reports back to the presentation layer.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A new arrangement to render: level start, accepted move, restart or
    /// resume.
    BoardUpdated(Board),
    /// Countdown heartbeat for the timer display.
    CountdownTick {
        seconds_left: u32,
        elapsed_this_level: u32,
    },
    /// The countdown hit zero; the attempt is over.
    TimeExpired {
        levels_completed: u32,
        total_time_seconds: u32,
    },
    LevelCompleted(LevelResult),
    /// The last level was completed; `estimated_rank` is the standing this
    /// time would take on the current leaderboard before submission.
    PlaythroughCompleted {
        total_time_seconds: u32,
        estimated_rank: usize,
    },
    /// Hint granted: highlight this tile.
    HintRevealed(Tile),
    HintBudgetChanged(u32),
    ScoreRecorded(ScoreRecord),
}
