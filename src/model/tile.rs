use serde::{Deserialize, Serialize};

/// One puzzle piece. `correct_index` is its slot in the solved arrangement
/// and never changes after creation; `current_index` is wherever the piece
/// sits right now. Exactly one tile per board is the blank, and its home is
/// always the bottom-right corner.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Tile {
    pub correct_index: usize,
    pub current_index: usize,
    pub is_blank: bool,
}

impl Tile {
    pub fn new(correct_index: usize, is_blank: bool) -> Self {
        Self {
            correct_index,
            current_index: correct_index,
            is_blank,
        }
    }

    pub fn is_home(&self) -> bool {
        self.current_index == self.correct_index
    }
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_blank {
            write!(f, "_@{}", self.current_index)
        } else {
            write!(f, "{}@{}", self.correct_index, self.current_index)
        }
    }
}

impl std::fmt::Debug for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}
