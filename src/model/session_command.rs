use crate::model::SessionSnapshot;

/// Everything the presentation layer may ask of the session controller.
/// Clicks, timer ticks and screen-button presses all arrive through this one
/// funnel.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Begin a fresh play-through for the named player.
    StartGame(String),
    /// The player tapped the tile at this grid position.
    TileClick(usize),
    UseHint,
    /// One second of wall clock elapsed; emitted by the driver's recurring
    /// timer primitive.
    Tick,
    /// Reshuffle the current level with a fresh budget; hints are not
    /// refilled.
    RestartLevel,
    /// Move on after a level-complete acknowledgement.
    AdvanceLevel,
    /// Start over from level 1 with a fresh hint allowance, keeping the
    /// player name.
    PlayAgain,
    /// Save and stop without ending the play-through.
    Quit,
    /// Pick up a previously saved play-through.
    Resume(SessionSnapshot),
    /// The player declined the resume offer; the saved snapshot is dropped.
    DeclineResume,
    /// Persist the finished play-through to the leaderboard.
    SubmitScore,
}
