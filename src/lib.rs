//! Computational core of a dig-for-diamonds puzzle: procedural board
//! generation under declarative difficulty constraints, a tile state
//! machine with bomb chain reactions, a keyed object pool, and a session
//! controller tying them together. Presentation, audio, and input live
//! outside this crate and consume the events it emits.

use core::ops::{Index, IndexMut};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use board::*;
pub use error::*;
pub use generator::*;
pub use level::*;
pub use pool::*;
pub use scheduler::*;
pub use session::*;
pub use tile::*;
pub use types::*;

mod board;
mod error;
mod generator;
mod level;
mod pool;
mod scheduler;
mod session;
mod tile;
mod types;

/// Generated contents of one level: an N×N grid of [`TileValue`]s plus
/// cached diamond accounting. Produced once per level start by a
/// [`BoardGenerator`], then owned by the [`BoardSim`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardLayout {
    tiles: Array2<TileValue>,
    diamond_total: u16,
}

impl BoardLayout {
    pub fn from_tiles(tiles: Array2<TileValue>) -> Self {
        let diamond_total = tiles
            .iter()
            .filter(|&&value| value > 0)
            .map(|&value| u16::from(value.unsigned_abs()))
            .sum();
        Self {
            tiles,
            diamond_total,
        }
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.tiles.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    pub fn total_cells(&self) -> CellCount {
        self.tiles.len().try_into().unwrap()
    }

    /// Sum of all positive cell values.
    pub fn diamond_total(&self) -> u16 {
        self.diamond_total
    }

    pub fn bomb_count(&self) -> CellCount {
        self.tiles
            .iter()
            .filter(|&&value| value == BOMB)
            .count()
            .try_into()
            .unwrap()
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn value_at(&self, coords: Coord2) -> TileValue {
        self[coords]
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.tiles.iter_neighbors(coords)
    }
}

impl Index<Coord2> for BoardLayout {
    type Output = TileValue;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.tiles[coords.to_nd_index()]
    }
}

impl IndexMut<Coord2> for BoardLayout {
    fn index_mut(&mut self, coords: Coord2) -> &mut Self::Output {
        &mut self.tiles[coords.to_nd_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_counts_diamonds_and_bombs() {
        let mut tiles = Array2::zeros((2, 2));
        tiles[[0, 0]] = 3;
        tiles[[1, 0]] = BOMB;
        tiles[[1, 1]] = 2;
        let layout = BoardLayout::from_tiles(tiles);

        assert_eq!(layout.size(), (2, 2));
        assert_eq!(layout.diamond_total(), 5);
        assert_eq!(layout.bomb_count(), 1);
        assert_eq!(layout.value_at((0, 1)), 0);
    }

    #[test]
    fn coords_outside_the_grid_are_rejected() {
        let layout = BoardLayout::from_tiles(Array2::zeros((2, 2)));
        assert_eq!(layout.validate_coords((1, 1)), Ok((1, 1)));
        assert_eq!(layout.validate_coords((2, 0)), Err(GameError::InvalidCoords));
    }
}
