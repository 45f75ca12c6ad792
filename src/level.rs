use serde::{Deserialize, Serialize};

use crate::*;

/// Most diamonds a single cell can hold; bounded by the [`TileValue`]
/// representation.
pub const MAX_TILE_DIAMONDS: u8 = TileValue::MAX as u8;

/// One category of board cell: how many tiles of this kind the level holds
/// and the diamond range each of them may carry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileTypeSpec {
    pub count: CellCount,
    #[serde(default)]
    pub is_bomb: bool,
    #[serde(default)]
    pub min_diamonds: u8,
    #[serde(default)]
    pub max_diamonds: u8,
}

/// Declarative difficulty definition for one level. Immutable once loaded;
/// the generator turns it into a concrete [`BoardLayout`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSpec {
    pub board_size: Coord,
    pub diamonds: u16,
    pub digs: u16,
    pub gold_score: u32,
    pub silver_score: u32,
    pub bronze_score: u32,
    pub tile_types: Vec<TileTypeSpec>,
}

impl LevelSpec {
    pub const fn total_cells(&self) -> CellCount {
        mult(self.board_size, self.board_size)
    }

    pub fn bomb_tile_count(&self) -> CellCount {
        self.tile_types
            .iter()
            .filter(|t| t.is_bomb)
            .map(|t| t.count)
            .sum()
    }

    /// Checks that the spec can produce a board at all: tile counts must
    /// cover the grid exactly, every non-bomb diamond range must be one a
    /// cell can represent, and the diamond total must fit between the
    /// summed per-type minimums and maximums. Thresholds must be ordered so
    /// the rank function stays monotonic.
    pub fn validate(&self) -> Result<()> {
        let expected = u32::from(self.total_cells());
        let mut declared: u32 = 0;
        let mut min_sum: u32 = 0;
        let mut max_sum: u32 = 0;

        for tile_type in &self.tile_types {
            let count = u32::from(tile_type.count);
            declared += count;
            if !tile_type.is_bomb {
                let (min, max) = (tile_type.min_diamonds, tile_type.max_diamonds);
                if min > max || max > MAX_TILE_DIAMONDS {
                    log::warn!("Tile type declares an unusable diamond range {}..={}", min, max);
                    return Err(SpecViolation::InvalidDiamondRange { min, max }.into());
                }
                min_sum += u32::from(min) * count;
                max_sum += u32::from(max) * count;
            }
        }

        let total = u32::from(self.diamonds);

        if declared != expected {
            log::warn!(
                "Level declares {} tiles but the board needs {}",
                declared,
                expected
            );
            return Err(SpecViolation::TileCountMismatch { declared, expected }.into());
        }
        if min_sum > total {
            log::warn!("Too many diamonds required to spawn: {} > {}", min_sum, total);
            return Err(SpecViolation::TooManyRequiredDiamonds { min_sum, total }.into());
        }
        if max_sum < total {
            log::warn!("Not enough diamonds can spawn: {} < {}", max_sum, total);
            return Err(SpecViolation::NotEnoughDiamondCapacity { max_sum, total }.into());
        }
        if self.gold_score < self.silver_score || self.silver_score < self.bronze_score {
            log::warn!(
                "Rank thresholds out of order: gold {}, silver {}, bronze {}",
                self.gold_score,
                self.silver_score,
                self.bronze_score
            );
            return Err(SpecViolation::UnorderedThresholds.into());
        }

        Ok(())
    }

    /// Rank achieved by `score` on this level.
    pub fn rank_for_score(&self, score: u32) -> Rank {
        if score >= self.gold_score {
            Rank::Gold
        } else if score >= self.silver_score {
            Rank::Silver
        } else if score >= self.bronze_score {
            Rank::Bronze
        } else {
            Rank::Unranked
        }
    }

    /// Score needed to reach the next rank up, if there is one.
    pub fn next_rank_score(&self, score: u32) -> Option<u32> {
        match self.rank_for_score(score) {
            Rank::Unranked => Some(self.bronze_score),
            Rank::Bronze => Some(self.silver_score),
            Rank::Silver => Some(self.gold_score),
            Rank::Gold => None,
        }
    }
}

/// Tiered score classification. A level only counts as completed when the
/// final score reaches at least [`Rank::Bronze`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rank {
    Gold,
    Silver,
    Bronze,
    Unranked,
}

impl Rank {
    pub const fn is_ranked(self) -> bool {
        !matches!(self, Self::Unranked)
    }
}

/// Ordered list of level specs, each validated on load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCatalogue {
    levels: Vec<LevelSpec>,
}

impl LevelCatalogue {
    pub fn new(levels: Vec<LevelSpec>) -> Result<Self> {
        if levels.is_empty() {
            log::warn!("Level catalogue has no levels");
            return Err(GameError::EmptyCatalogue);
        }
        for level in &levels {
            level.validate()?;
        }
        Ok(Self { levels })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let levels: Vec<LevelSpec> = serde_json::from_str(json).map_err(|err| {
            log::warn!("Level catalogue failed to parse: {}", err);
            GameError::MalformedCatalogue
        })?;
        Self::new(levels)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level at 1-based `index` (HUD numbering), clamped into range.
    pub fn level(&self, index: usize) -> &LevelSpec {
        let clamped = index.saturating_sub(1).min(self.levels.len() - 1);
        &self.levels[clamped]
    }

    pub fn iter(&self) -> impl Iterator<Item = &LevelSpec> {
        self.levels.iter()
    }
}
