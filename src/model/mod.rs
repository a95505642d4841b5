mod board;
mod level;
mod score;
mod session;
mod session_command;
mod session_event;
pub mod snapshot;
mod tile;

pub use board::{Board, MIN_GRID_SIZE};
pub use level::{GameConfig, LevelConfig};
pub use score::{PlayerBest, Scope, ScoreRecord};
pub use session::{LevelResult, Session};
pub use session_command::SessionCommand;
pub use session_event::SessionEvent;
pub use snapshot::{SessionSnapshot, SNAPSHOT_VERSION};
pub use tile::Tile;
