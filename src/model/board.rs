use log::trace;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::model::Tile;

/// Smallest playable grid; a 1x1 board has no legal moves at all.
pub const MIN_GRID_SIZE: usize = 2;

/// Shuffle length per unit of grid size. Long enough that the scramble is
/// thoroughly mixed for every supported size.
const SHUFFLE_STEPS_PER_SIZE: usize = 100;

/// The full arrangement for one level attempt: N*N tiles, stored by
/// `correct_index` so a tile keeps a stable identity while its position
/// changes. `blank_position` mirrors the blank tile's `current_index` so the
/// neighbor math never has to search for it.
///
/// Every mutation routes through [`Board::slide`], which only accepts swaps
/// with a grid-neighbor of the blank. Shuffling is a long walk of such legal
/// moves rather than a direct permutation, which keeps every scrambled board
/// inside the solvable half of the configuration space.
#[derive(Clone, Serialize, Deserialize)]
pub struct Board {
    size: usize,
    tiles: Vec<Tile>,
    blank_position: usize,
    shuffle_seed: Option<u64>,
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut output = String::new();
        output.push('\n');
        for row in 0..self.size {
            for col in 0..self.size {
                let position = row * self.size + col;
                match self.tile_at(position) {
                    Some(tile) if tile.is_blank => output.push_str("  __"),
                    Some(tile) => output.push_str(&format!("{:>4}", tile.correct_index)),
                    None => output.push_str("   ?"),
                }
            }
            output.push('\n');
        }
        write!(f, "{}", output)
    }
}

impl Board {
    /// Builds a solved board: tile `i` sits at position `i`, the bottom-right
    /// tile is the blank.
    pub fn new(size: usize) -> Result<Self, GameError> {
        if size < MIN_GRID_SIZE {
            return Err(GameError::InvalidConfiguration { size });
        }
        let cell_count = size * size;
        let tiles = (0..cell_count)
            .map(|i| Tile::new(i, i == cell_count - 1))
            .collect();
        Ok(Self {
            size,
            tiles,
            blank_position: cell_count - 1,
            shuffle_seed: None,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cell_count(&self) -> usize {
        self.size * self.size
    }

    pub fn blank_position(&self) -> usize {
        self.blank_position
    }

    /// Seed of the scramble this board was produced by, if it has been
    /// shuffled.
    pub fn shuffle_seed(&self) -> Option<u64> {
        self.shuffle_seed
    }

    /// Tiles in `correct_index` order.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// The tile currently sitting at a grid position.
    pub fn tile_at(&self, position: usize) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.current_index == position)
    }

    /// Grid positions whose tile may slide into the blank: the up/down/left/
    /// right neighbors of the blank, bounded by the grid edges.
    pub fn possible_moves(&self) -> Vec<usize> {
        let row = self.blank_position / self.size;
        let col = self.blank_position % self.size;
        let mut moves = Vec::with_capacity(4);
        if row > 0 {
            moves.push(self.blank_position - self.size);
        }
        if row + 1 < self.size {
            moves.push(self.blank_position + self.size);
        }
        if col > 0 {
            moves.push(self.blank_position - 1);
        }
        if col + 1 < self.size {
            moves.push(self.blank_position + 1);
        }
        moves
    }

    /// True iff the two positions are orthogonal grid neighbors. Positions on
    /// opposite row ends are not neighbors even though their indices differ
    /// by one, and anything outside the grid is a neighbor of nothing.
    pub fn is_adjacent(&self, a: usize, b: usize) -> bool {
        let cells = self.cell_count();
        if a >= cells || b >= cells {
            return false;
        }
        let (row_a, col_a) = (a / self.size, a % self.size);
        let (row_b, col_b) = (b / self.size, b % self.size);
        (row_a == row_b && col_a.abs_diff(col_b) == 1)
            || (col_a == col_b && row_a.abs_diff(row_b) == 1)
    }

    /// The single mutating primitive: swap the tile at `from` with the blank.
    /// Both user clicks and shuffle steps come through here. Rejects any
    /// position that is not currently a neighbor of the blank, which also
    /// covers the blank's own position and indices outside the grid.
    pub fn slide(&mut self, from: usize) -> Result<(), GameError> {
        if !self.is_adjacent(from, self.blank_position) {
            return Err(GameError::InvalidMove { position: from });
        }
        let moved = self
            .tiles
            .iter()
            .position(|t| t.current_index == from)
            .expect("a position inside the grid always holds a tile");
        let blank = self
            .tiles
            .iter()
            .position(|t| t.is_blank)
            .expect("every board has a blank tile");

        self.tiles[moved].current_index = self.blank_position;
        self.tiles[blank].current_index = from;
        self.blank_position = from;
        Ok(())
    }

    /// True iff every tile is back in its solved slot.
    pub fn is_solved(&self) -> bool {
        self.tiles.iter().all(|t| t.is_home())
    }

    /// Scrambles by walking `size * 100` uniformly random legal moves from
    /// the current arrangement. Because only legal moves are applied, the
    /// result is always reachable from solved, hence always solvable; a
    /// direct random permutation would be unsolvable about half the time.
    /// If the walk happens to land back on the solved arrangement, one more
    /// legal move is applied so a level never starts complete.
    ///
    /// Returns the seed actually used so a scramble can be reproduced.
    pub fn shuffle(&mut self, seed: Option<u64>) -> u64 {
        let seed = seed.unwrap_or_else(|| rand::rng().next_u64());
        let mut rng = StdRng::seed_from_u64(seed);

        let steps = self.size * SHUFFLE_STEPS_PER_SIZE;
        for _ in 0..steps {
            let moves = self.possible_moves();
            if let Some(&chosen) = moves.choose(&mut rng) {
                self.slide(chosen)
                    .expect("possible_moves only yields neighbors of the blank");
            }
        }

        if self.is_solved() {
            if let Some(&first) = self.possible_moves().first() {
                self.slide(first)
                    .expect("possible_moves only yields neighbors of the blank");
            }
        }

        self.shuffle_seed = Some(seed);
        trace!(target: "board", "shuffled {}x{} board with seed {}: {:?}", self.size, self.size, seed, self);
        seed
    }

    /// First misplaced non-blank tile in `correct_index` scan order; the
    /// presentation layer highlights it as the hint target. `None` only when
    /// the board is already solved.
    pub fn hint_target(&self) -> Option<Tile> {
        self.tiles
            .iter()
            .find(|t| !t.is_home() && !t.is_blank)
            .copied()
    }
}
