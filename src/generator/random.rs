use ndarray::Array2;

use super::*;

/// Seeded uniform-random placement: tile types are shuffled across the
/// grid, every cell gets its type minimum, and the surplus diamonds land
/// on uniformly chosen cells with remaining headroom.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RandomBoardGenerator {
    seed: u64,
}

impl RandomBoardGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

/// One grid cell's slot in the flat pre-placement list.
#[derive(Copy, Clone, Debug)]
struct Slot {
    is_bomb: bool,
    min: u8,
    max: u8,
}

impl BoardGenerator for RandomBoardGenerator {
    fn generate(self, spec: &LevelSpec) -> Result<BoardLayout> {
        use rand::prelude::*;

        // Unsatisfiable specs must fail before anything is allocated.
        spec.validate()?;

        let side = usize::from(spec.board_size);
        let total_cells = usize::from(spec.total_cells());

        // Expand each tile type into `count` slots; bombs carry no diamonds
        // regardless of what the type declares.
        let mut slots = Vec::with_capacity(total_cells);
        for tile_type in &spec.tile_types {
            let slot = if tile_type.is_bomb {
                Slot {
                    is_bomb: true,
                    min: 0,
                    max: 0,
                }
            } else {
                Slot {
                    is_bomb: false,
                    min: tile_type.min_diamonds,
                    max: tile_type.max_diamonds,
                }
            };
            for _ in 0..tile_type.count {
                slots.push(slot);
            }
        }

        let mut rng = SmallRng::seed_from_u64(self.seed);

        // Fisher-Yates, so placement is uniform over all permutations.
        for i in (1..slots.len()).rev() {
            let j = rng.random_range(0..=i);
            slots.swap(i, j);
        }

        // Every cell starts at its slot minimum.
        let mut tiles: Array2<TileValue> = Array2::zeros((side, side));
        let mut placed: u16 = 0;
        let mut index = 0;
        for x in 0..side {
            for y in 0..side {
                let slot = slots[index];
                tiles[[x, y]] = if slot.is_bomb {
                    BOMB
                } else {
                    placed += u16::from(slot.min);
                    slot.min as TileValue
                };
                index += 1;
            }
        }

        // Remaining diamonds go to uniformly random cells that still have
        // headroom; a fixed scan order here would bias placement.
        let mut surplus = spec.diamonds - placed;
        let mut open: Vec<(usize, u8)> = slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.is_bomb && slot.max > slot.min)
            .map(|(flat, slot)| (flat, slot.max - slot.min))
            .collect();

        while surplus > 0 {
            let Some(pick) = (!open.is_empty()).then(|| rng.random_range(0..open.len())) else {
                log::warn!("Ran out of headroom with {} diamonds left to place", surplus);
                break;
            };
            let (flat, headroom) = &mut open[pick];
            tiles[[*flat / side, *flat % side]] += 1;
            surplus -= 1;
            *headroom -= 1;
            if *headroom == 0 {
                open.swap_remove(pick);
            }
        }

        let layout = BoardLayout::from_tiles(tiles);

        // double check diamond total
        if layout.diamond_total() != spec.diamonds {
            log::warn!(
                "Generated board diamond mismatch, actual: {}, requested: {}",
                layout.diamond_total(),
                spec.diamonds
            );
        }

        Ok(layout)
    }
}
