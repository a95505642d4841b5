use serde::{Deserialize, Serialize};

/// Static definition of one level: grid dimension, countdown budget and the
/// picture the presentation layer cuts into tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub size: usize,
    pub time_budget_seconds: u32,
    pub image_asset: String,
}

/// The level ladder plus the hint allowance granted at the start of each full
/// play-through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub levels: Vec<LevelConfig>,
    pub max_hints: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            levels: vec![
                LevelConfig {
                    size: 4,
                    time_budget_seconds: 120,
                    image_asset: "puzzle1.jpg".to_string(),
                },
                LevelConfig {
                    size: 6,
                    time_budget_seconds: 120,
                    image_asset: "puzzle2.jpg".to_string(),
                },
                LevelConfig {
                    size: 8,
                    time_budget_seconds: 120,
                    image_asset: "puzzle3.jpg".to_string(),
                },
            ],
            max_hints: 3,
        }
    }
}

impl GameConfig {
    /// Level lookup by 1-based level number.
    pub fn level(&self, number: u32) -> Option<&LevelConfig> {
        if number == 0 {
            return None;
        }
        self.levels.get(number as usize - 1)
    }

    pub fn level_count(&self) -> u32 {
        self.levels.len() as u32
    }

    pub fn is_last_level(&self, number: u32) -> bool {
        number >= self.level_count()
    }
}
