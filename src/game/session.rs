use log::{error, trace, warn};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::SystemTime;

use chrono::Local;
use uuid::Uuid;

use crate::destroyable::Destroyable;
use crate::error::GameError;
use crate::events::{EventEmitter, EventHandler, EventObserver, Unsubscriber};
use crate::game::scheduler::{TickScheduler, TimerHandle};
use crate::game::ScoreStore;
use crate::model::{
    Board, GameConfig, LevelResult, ScoreRecord, Session, SessionCommand, SessionEvent,
    SessionSnapshot, Tile,
};
use crate::storage::{KeyValueStore, KEY_LAST_PLAYER_NAME};

/// The session state machine. Owns the live `Session`/`Board` pair, the
/// score store and the countdown handle; driven entirely by
/// `SessionCommand`s from the presentation layer and answering with
/// `SessionEvent`s. There is exactly one countdown registration alive at a
/// time: starting or restarting a level cancels the previous handle before
/// scheduling a fresh one.
pub struct SessionController {
    config: GameConfig,
    session: Option<Session>,
    board: Option<Board>,
    is_active: bool,
    store: Rc<RefCell<dyn KeyValueStore>>,
    scores: ScoreStore,
    scheduler: Rc<dyn TickScheduler>,
    countdown: Option<TimerHandle>,
    event_emitter: EventEmitter<SessionEvent>,
    command_subscription: Option<Unsubscriber<SessionCommand>>,
    self_ref: Weak<RefCell<Self>>,
}

impl Destroyable for SessionController {
    fn destroy(&mut self) {
        self.cancel_countdown();
        if let Some(subscription) = self.command_subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl EventHandler<SessionCommand> for SessionController {
    fn handle_event(&mut self, command: &SessionCommand) {
        self.handle_command(command.clone());
    }
}

impl SessionController {
    pub fn new(
        config: GameConfig,
        store: Rc<RefCell<dyn KeyValueStore>>,
        scheduler: Rc<dyn TickScheduler>,
        command_observer: EventObserver<SessionCommand>,
        event_emitter: EventEmitter<SessionEvent>,
    ) -> Rc<RefCell<Self>> {
        let scores = ScoreStore::new(Rc::clone(&store));
        let controller = Rc::new(RefCell::new(Self {
            config,
            session: None,
            board: None,
            is_active: false,
            store,
            scores,
            scheduler,
            countdown: None,
            event_emitter,
            command_subscription: None,
            self_ref: Weak::new(),
        }));
        controller.borrow_mut().self_ref = Rc::downgrade(&controller);

        let handler = Rc::clone(&controller);
        let subscription = command_observer.subscribe(move |command| {
            handler.borrow_mut().handle_event(command);
        });
        controller.borrow_mut().command_subscription = Some(subscription);
        controller
    }

    fn handle_command(&mut self, command: SessionCommand) {
        trace!(target: "session", "command: {:?}", command);
        match command {
            SessionCommand::StartGame(player_name) => self.start_game(&player_name),
            SessionCommand::TileClick(position) => self.handle_click(position),
            SessionCommand::UseHint => {
                if let Err(e) = self.use_hint() {
                    trace!(target: "session", "hint request ignored: {}", e);
                }
            }
            SessionCommand::Tick => self.tick(),
            SessionCommand::RestartLevel => self.restart_level(),
            SessionCommand::AdvanceLevel => self.advance_level(),
            SessionCommand::PlayAgain => self.play_again(),
            SessionCommand::Quit => self.quit(),
            SessionCommand::Resume(snapshot) => self.resume(snapshot),
            SessionCommand::DeclineResume => {
                SessionSnapshot::clear(&mut *self.store.borrow_mut());
            }
            SessionCommand::SubmitScore => self.submit_score(),
        }
    }

    /// Scramble seed override for reproducing a reported level.
    pub fn seed_from_env() -> Option<u64> {
        std::env::var("SEED").ok().and_then(|v| v.parse::<u64>().ok())
    }

    pub fn start_game(&mut self, player_name: &str) {
        if let Err(e) = self
            .store
            .borrow_mut()
            .write(KEY_LAST_PLAYER_NAME, player_name)
        {
            warn!(target: "session", "could not remember player name: {}", e);
        }
        self.session = Some(Session::new(
            player_name.to_string(),
            self.config.max_hints,
        ));
        self.event_emitter
            .emit(&SessionEvent::HintBudgetChanged(self.config.max_hints));
        self.start_level();
    }

    /// Build, scramble and present the board for the session's current
    /// level, resetting the countdown budget. A missing or degenerate level
    /// configuration refuses to start rather than proceeding with an
    /// unplayable board.
    fn start_level(&mut self) {
        let (level_number, size, budget) = {
            let Some(session) = self.session.as_ref() else {
                return;
            };
            let Some(level) = self.config.level(session.current_level) else {
                warn!(target: "session", "no level {} configured", session.current_level);
                return;
            };
            (session.current_level, level.size, level.time_budget_seconds)
        };

        let mut board = match Board::new(size) {
            Ok(board) => board,
            Err(e) => {
                error!(target: "session", "level {} refused: {}", level_number, e);
                return;
            }
        };
        let seed = board.shuffle(Self::seed_from_env());
        trace!(target: "session", "level {} started: {}x{} grid, seed {}", level_number, size, size, seed);

        if let Some(session) = self.session.as_mut() {
            session.time_remaining_seconds = budget;
            session.level_started_at = SystemTime::now();
        }
        self.board = Some(board);
        self.is_active = true;

        self.save_snapshot();
        self.start_countdown();
        self.emit_board();
        self.event_emitter.emit(&SessionEvent::CountdownTick {
            seconds_left: budget,
            elapsed_this_level: 0,
        });
    }

    /// One second of countdown. Past zero the attempt ends with
    /// `TimeExpired`; the clock itself is cancelled here but reacting to the
    /// signal (screens, restart offers) is the driver's job.
    pub fn tick(&mut self) {
        if !self.is_active {
            return;
        }
        let now = SystemTime::now();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.time_remaining_seconds = session.time_remaining_seconds.saturating_sub(1);
        let seconds_left = session.time_remaining_seconds;
        let elapsed_this_level = session.elapsed_this_level(now);

        self.event_emitter.emit(&SessionEvent::CountdownTick {
            seconds_left,
            elapsed_this_level,
        });
        if seconds_left == 0 {
            self.time_expired();
        }
    }

    fn time_expired(&mut self) {
        self.cancel_countdown();
        self.is_active = false;
        SessionSnapshot::clear(&mut *self.store.borrow_mut());

        let (levels_completed, total_time_seconds) = self
            .session
            .as_ref()
            .map(|s| (s.current_level - 1, s.cumulative_time_seconds))
            .unwrap_or((0, 0));
        trace!(target: "session", "time expired with {} levels completed", levels_completed);
        self.event_emitter.emit(&SessionEvent::TimeExpired {
            levels_completed,
            total_time_seconds,
        });
    }

    /// A click on the tile at `position`. Non-adjacent clicks recover
    /// locally: nothing moves, nothing is emitted.
    pub fn handle_click(&mut self, position: usize) {
        if !self.is_active {
            return;
        }
        let Some(board) = self.board.as_mut() else {
            return;
        };
        match board.slide(position) {
            Ok(()) => {
                let solved = board.is_solved();
                self.save_snapshot();
                self.emit_board();
                if solved {
                    self.complete_level();
                }
            }
            Err(GameError::InvalidMove { position }) => {
                trace!(target: "session", "ignored click on non-adjacent position {}", position);
            }
            Err(e) => warn!(target: "session", "move failed: {}", e),
        }
    }

    /// Spend one hint and name the first misplaced tile in solved order.
    /// `Ok(None)` is only possible when there is no active level or the
    /// board is already solved.
    pub fn use_hint(&mut self) -> Result<Option<Tile>, GameError> {
        if !self.is_active {
            return Ok(None);
        }
        let Some(session) = self.session.as_mut() else {
            return Ok(None);
        };
        if session.hints_remaining == 0 {
            return Err(GameError::NoHintsRemaining);
        }
        session.hints_remaining -= 1;
        let remaining = session.hints_remaining;
        let target = self.board.as_ref().and_then(|b| b.hint_target());

        self.event_emitter
            .emit(&SessionEvent::HintBudgetChanged(remaining));
        if let Some(tile) = target {
            self.event_emitter.emit(&SessionEvent::HintRevealed(tile));
        }
        Ok(target)
    }

    fn complete_level(&mut self) {
        self.cancel_countdown();
        self.is_active = false;
        let now = SystemTime::now();

        let result = {
            let Some(session) = self.session.as_mut() else {
                return;
            };
            let level_time = session.elapsed_this_level(now);
            session.cumulative_time_seconds += level_time;
            LevelResult {
                level: session.current_level,
                level_time_seconds: level_time,
                cumulative_time_seconds: session.cumulative_time_seconds,
            }
        };
        trace!(
            target: "session",
            "level {} completed in {}s ({}s cumulative)",
            result.level, result.level_time_seconds, result.cumulative_time_seconds
        );

        let finished = self.config.is_last_level(result.level);
        let total_time_seconds = result.cumulative_time_seconds;
        self.event_emitter
            .emit(&SessionEvent::LevelCompleted(result));
        if finished {
            let estimated_rank = self.scores.estimated_rank(total_time_seconds);
            self.event_emitter.emit(&SessionEvent::PlaythroughCompleted {
                total_time_seconds,
                estimated_rank,
            });
        }
    }

    pub fn advance_level(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if self.config.is_last_level(session.current_level) {
            trace!(target: "session", "already on the last level");
            return;
        }
        session.current_level += 1;
        self.start_level();
    }

    /// Fresh scramble and full budget for the current level. The hint budget
    /// carries over; only a new play-through refills it.
    pub fn restart_level(&mut self) {
        if self.session.is_none() {
            return;
        }
        self.start_level();
    }

    /// Back to level 1 with a clean slate for the same player.
    pub fn play_again(&mut self) {
        let max_hints = self.config.max_hints;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.current_level = 1;
        session.cumulative_time_seconds = 0;
        session.hints_remaining = max_hints;
        session.playthrough_id = Uuid::new_v4();
        self.event_emitter
            .emit(&SessionEvent::HintBudgetChanged(max_hints));
        self.start_level();
    }

    /// Save for later and stop the clock without ending the play-through.
    pub fn quit(&mut self) {
        self.save_snapshot();
        self.cancel_countdown();
        self.is_active = false;
    }

    /// Pick an interrupted play-through back up. Remaining time is recomputed
    /// from the original level start, so the interruption itself costs
    /// countdown time; a fully expired budget ends the attempt on the next
    /// tick.
    pub fn resume(&mut self, snapshot: SessionSnapshot) {
        let mut session = snapshot.session;
        let board = snapshot.board;
        let Some(level) = self.config.level(session.current_level) else {
            warn!(target: "session", "snapshot references unknown level {}", session.current_level);
            return;
        };

        let elapsed_this_level = session.elapsed_this_level(SystemTime::now());
        session.time_remaining_seconds =
            level.time_budget_seconds.saturating_sub(elapsed_this_level);
        let seconds_left = session.time_remaining_seconds;
        let hints_remaining = session.hints_remaining;

        self.session = Some(session);
        self.board = Some(board);
        self.is_active = true;
        self.start_countdown();
        self.emit_board();
        self.event_emitter
            .emit(&SessionEvent::HintBudgetChanged(hints_remaining));
        self.event_emitter.emit(&SessionEvent::CountdownTick {
            seconds_left,
            elapsed_this_level,
        });
    }

    /// Put the finished play-through on the leaderboard. A storage failure
    /// is reported and play continues; the saved snapshot is dropped either
    /// way because the run is over.
    pub fn submit_score(&mut self) {
        let record = {
            let Some(session) = self.session.as_ref() else {
                return;
            };
            ScoreRecord {
                player_name: session.player_name.clone(),
                total_time_seconds: session.cumulative_time_seconds,
                completed_at: Local::now().timestamp(),
                levels_completed: session.current_level,
                playthrough_id: session.playthrough_id,
            }
        };
        if let Err(e) = self.scores.record(record.clone()) {
            error!(target: "session", "score not persisted: {}", e);
        }
        SessionSnapshot::clear(&mut *self.store.borrow_mut());
        self.event_emitter
            .emit(&SessionEvent::ScoreRecorded(record));
    }

    /// Saved play-through waiting for a resume decision, if any.
    pub fn pending_snapshot(&self) -> Option<SessionSnapshot> {
        SessionSnapshot::load(&*self.store.borrow())
    }

    /// Prefill for the name field; convenience only, never authoritative.
    pub fn last_player_name(&self) -> Option<String> {
        self.store.borrow().read(KEY_LAST_PLAYER_NAME)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn scores(&self) -> &ScoreStore {
        &self.scores
    }

    fn save_snapshot(&self) {
        let (Some(session), Some(board)) = (self.session.as_ref(), self.board.as_ref()) else {
            return;
        };
        let snapshot = SessionSnapshot::new(session.clone(), board.clone());
        if let Err(e) = snapshot.save(&mut *self.store.borrow_mut()) {
            warn!(target: "session", "snapshot not saved: {}", e);
        }
    }

    fn emit_board(&self) {
        if let Some(board) = self.board.as_ref() {
            self.event_emitter
                .emit(&SessionEvent::BoardUpdated(board.clone()));
        }
    }

    fn start_countdown(&mut self) {
        self.cancel_countdown();
        let me = self.self_ref.clone();
        let handle = self.scheduler.every_second(Box::new(move || {
            if let Some(controller) = me.upgrade() {
                controller.borrow_mut().tick();
            }
        }));
        self.countdown = Some(handle);
    }

    fn cancel_countdown(&mut self) {
        if let Some(handle) = self.countdown.take() {
            handle.cancel();
        }
    }
}
