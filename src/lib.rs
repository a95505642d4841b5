mod destroyable;
pub mod error;
pub mod events;
pub mod game;
pub mod model;
pub mod storage;

pub use destroyable::Destroyable;
pub use error::{GameError, StorageError};
