use core::time::Duration;
use ndarray::Array2;

use crate::*;

/// Presentation delay between a dig and the resulting explosion.
pub const EXPLODE_DELAY: Duration = Duration::from_millis(300);

/// Per-cell stagger of the hint sweep; total delay is this times `x + y`,
/// which sweeps the board diagonally.
pub const HINT_SWEEP_STEP: Duration = Duration::from_millis(50);

/// Hint cooldown between uses.
pub const HINT_COOLDOWN: Duration = Duration::from_secs(3);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DigOutcome {
    /// The tile was clickable; its explosion is now scheduled.
    Scheduled,
    /// The tile was already dug or recycled; nothing happened.
    AlreadyTriggered,
}

impl DigOutcome {
    pub const fn was_scheduled(self) -> bool {
        matches!(self, Self::Scheduled)
    }
}

/// Everything the outside world needs to know about board mutations.
/// Presentation, audio, and the flow controller all consume these.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BoardEvent {
    TileStateChanged {
        coords: Coord2,
        phase: TilePhase,
        value: TileValue,
    },
    /// Explosion burst sized by the tile's diamond count squared.
    EffectBurst { coords: Coord2, magnitude: u32 },
    /// Hint reveal burst; magnitude scales with the diamond count so richer
    /// tiles glow brighter.
    HintBurst { coords: Coord2, magnitude: u32 },
    /// A sweep reveal was queued for the presentation layer.
    HintScheduled { coords: Coord2, delay: Duration },
    /// A bomb went off: full board-clear burst.
    BombExploded { coords: Coord2 },
    /// Diamonds left play when this tile exploded.
    DiamondsRemoved { coords: Coord2, count: u8 },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum TileAction {
    Explode(Coord2),
    Reveal(Coord2),
}

/// The four pooled objects each live tile borrows.
#[derive(Copy, Clone, Debug)]
struct TileHandles {
    tile: Handle,
    cover: Handle,
    hint_fx: Handle,
    explosion_fx: Handle,
}

/// Live state of one generated level: tile phases, their pooled handles,
/// and the delayed explosion/reveal continuations. All timing is driven
/// through [`BoardSim::tick`]; nothing here blocks.
#[derive(Clone, Debug)]
pub struct BoardSim {
    layout: BoardLayout,
    phases: Array2<TilePhase>,
    handles: Array2<Option<TileHandles>>,
    scheduler: Scheduler<TileAction>,
    events: Vec<BoardEvent>,
}

impl BoardSim {
    /// Builds the live board from a generated layout, borrowing a tile,
    /// cover, and two effect handles per cell. Every tile starts
    /// `Clickable`.
    pub fn materialize(layout: BoardLayout, pool: &mut HandlePool) -> Result<Self> {
        let size = layout.size();
        let dim = size.to_nd_index();
        let mut sim = Self {
            layout,
            phases: Array2::from_elem(dim, TilePhase::Hidden),
            handles: Array2::default(dim),
            scheduler: Scheduler::new(),
            events: Vec::new(),
        };

        let (x_end, y_end) = size;
        for x in 0..x_end {
            for y in 0..y_end {
                let coords = (x, y);
                let value = sim.layout[coords];
                let handles = TileHandles {
                    tile: pool.acquire(PoolKey::for_tile_value(value))?,
                    cover: pool.acquire(PoolKey::Cover)?,
                    hint_fx: pool.acquire(PoolKey::HintBurst)?,
                    explosion_fx: pool.acquire(PoolKey::ExplosionBurst)?,
                };
                sim.handles[coords.to_nd_index()] = Some(handles);
                sim.set_phase(coords, TilePhase::Clickable);
            }
        }

        Ok(sim)
    }

    pub fn size(&self) -> Coord2 {
        self.layout.size()
    }

    pub fn value_at(&self, coords: Coord2) -> TileValue {
        self.layout[coords]
    }

    pub fn phase_at(&self, coords: Coord2) -> TilePhase {
        self.phases[coords.to_nd_index()]
    }

    pub fn diamond_total(&self) -> u16 {
        self.layout.diamond_total()
    }

    /// Pending delayed continuations; exposed for the flow controller to
    /// know whether explosions are still in flight.
    pub fn pending_actions(&self) -> usize {
        self.scheduler.pending()
    }

    /// Drains accumulated board events in emission order.
    pub fn take_events(&mut self) -> Vec<BoardEvent> {
        core::mem::take(&mut self.events)
    }

    /// Player dig. A clickable tile stops being clickable immediately and
    /// explodes after [`EXPLODE_DELAY`]; anything else is a no-op.
    pub fn dig(&mut self, coords: Coord2) -> Result<DigOutcome> {
        let coords = self.layout.validate_coords(coords)?;

        if !self.phase_at(coords).is_clickable() {
            return Ok(DigOutcome::AlreadyTriggered);
        }

        self.set_phase(coords, TilePhase::Exploding);
        self.scheduler.schedule(EXPLODE_DELAY, TileAction::Explode(coords));
        log::debug!("Dig at {:?}, value {}", coords, self.layout[coords]);
        Ok(DigOutcome::Scheduled)
    }

    /// Schedules the staggered reveal animation across every still
    /// clickable tile. Tile state never changes; this only leaks
    /// information.
    pub fn hint_sweep(&mut self) {
        let (x_end, y_end) = self.size();
        for x in 0..x_end {
            for y in 0..y_end {
                let coords = (x, y);
                if !self.phase_at(coords).is_clickable() {
                    continue;
                }
                let delay = HINT_SWEEP_STEP * (u32::from(x) + u32::from(y));
                self.scheduler.schedule(delay, TileAction::Reveal(coords));
                self.events.push(BoardEvent::HintScheduled { coords, delay });
            }
        }
    }

    /// Advances the board clock, firing due explosions and reveals.
    pub fn tick(&mut self, dt: Duration, pool: &mut HandlePool) {
        for action in self.scheduler.advance(dt) {
            match action {
                TileAction::Explode(coords) => self.explode(coords, pool),
                TileAction::Reveal(coords) => self.reveal(coords),
            }
        }
    }

    /// Returns every still-borrowed handle to the pool and invalidates all
    /// pending continuations. Safe to call at any point during teardown,
    /// including when tiles have already been recycled.
    pub fn recycle_all(&mut self, pool: &mut HandlePool) {
        self.scheduler.cancel_all();

        let (x_end, y_end) = self.size();
        for x in 0..x_end {
            for y in 0..y_end {
                let coords = (x, y);
                if let Some(handles) = self.handles[coords.to_nd_index()].take() {
                    self.release_all(handles, pool);
                }
                self.phases[coords.to_nd_index()] = TilePhase::Recycled;
            }
        }
    }

    fn explode(&mut self, coords: Coord2, pool: &mut HandlePool) {
        let Some(handles) = self.handles[coords.to_nd_index()].take() else {
            // Already recycled; a stale continuation has nothing to do.
            return;
        };

        let value = self.layout[coords];

        // The cover comes off first so the burst is visible.
        pool.release(handles.cover);
        let magnitude = u32::from(value.unsigned_abs()).pow(2);
        self.events.push(BoardEvent::EffectBurst { coords, magnitude });

        if value < 0 {
            // Bombs reveal their surroundings, they never force more digs.
            self.events.push(BoardEvent::BombExploded { coords });
            let neighbors: Vec<_> = self.layout.iter_neighbors(coords).collect();
            for neighbor in neighbors {
                self.reveal(neighbor);
            }
        } else if value > 0 {
            self.events.push(BoardEvent::DiamondsRemoved {
                coords,
                count: value.unsigned_abs(),
            });
        }

        self.set_phase(coords, TilePhase::Recycled);
        pool.release(handles.hint_fx);
        pool.release(handles.explosion_fx);
        pool.release(handles.tile);
    }

    fn reveal(&mut self, coords: Coord2) {
        if !self.phase_at(coords).is_clickable() {
            return;
        }
        let value = self.layout[coords];
        let magnitude = if value > 0 {
            u32::from(value.unsigned_abs()).pow(2) * 3
        } else {
            0
        };
        self.events.push(BoardEvent::HintBurst { coords, magnitude });
    }

    fn set_phase(&mut self, coords: Coord2, phase: TilePhase) {
        self.phases[coords.to_nd_index()] = phase;
        self.events.push(BoardEvent::TileStateChanged {
            coords,
            phase,
            value: self.layout[coords],
        });
    }

    fn release_all(&self, handles: TileHandles, pool: &mut HandlePool) {
        pool.release(handles.cover);
        pool.release(handles.hint_fx);
        pool.release(handles.explosion_fx);
        pool.release(handles.tile);
    }
}
