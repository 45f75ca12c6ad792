//! Full-session flow: generate, dig, chain, rank, advance.

use core::time::Duration;
use gemfield::*;

fn catalogue() -> LevelCatalogue {
    LevelCatalogue::new(vec![
        // Level 1: the minimal single-diamond board.
        LevelSpec {
            board_size: 2,
            diamonds: 1,
            digs: 4,
            gold_score: 1,
            silver_score: 1,
            bronze_score: 1,
            tile_types: vec![
                TileTypeSpec {
                    count: 3,
                    is_bomb: false,
                    min_diamonds: 0,
                    max_diamonds: 0,
                },
                TileTypeSpec {
                    count: 1,
                    is_bomb: false,
                    min_diamonds: 0,
                    max_diamonds: 1,
                },
            ],
        },
        // Level 2: bombs in play.
        LevelSpec {
            board_size: 3,
            diamonds: 8,
            digs: 6,
            gold_score: 8,
            silver_score: 5,
            bronze_score: 3,
            tile_types: vec![
                TileTypeSpec {
                    count: 2,
                    is_bomb: true,
                    min_diamonds: 0,
                    max_diamonds: 0,
                },
                TileTypeSpec {
                    count: 7,
                    is_bomb: false,
                    min_diamonds: 1,
                    max_diamonds: 2,
                },
            ],
        },
    ])
    .unwrap()
}

fn cell_with(board: &BoardSim, pred: impl Fn(TileValue) -> bool) -> Coord2 {
    let (x_end, y_end) = board.size();
    for x in 0..x_end {
        for y in 0..y_end {
            if pred(board.value_at((x, y))) {
                return (x, y);
            }
        }
    }
    panic!("no matching cell");
}

#[test]
fn single_diamond_level_completes_gold() {
    let mut flow = GameFlow::new(catalogue(), 11);
    flow.start_level(1).unwrap();

    let target = cell_with(flow.board().unwrap(), |value| value == 1);
    assert!(flow.dig(target).unwrap().was_scheduled());

    let events = flow.tick(EXPLODE_DELAY);
    assert!(events
        .iter()
        .any(|event| matches!(event, BoardEvent::DiamondsRemoved { count: 1, .. })));

    assert_eq!(flow.diamonds_remaining(), 0);
    assert_eq!(flow.state(), FlowState::LevelCompleted);
    assert_eq!(flow.rank(), Rank::Gold);

    // The completed board's handles all went back before level 2 starts.
    flow.next_level().unwrap();
    assert_eq!(flow.current_level(), 2);
    assert_eq!(flow.state(), FlowState::InGame);
    assert_eq!(flow.diamonds_remaining(), 8);
}

#[test]
fn bomb_dig_reveals_neighbors_without_scoring() {
    let mut flow = GameFlow::new(catalogue(), 3);
    flow.start_level(2).unwrap();
    flow.tick(Duration::ZERO);

    let bomb = cell_with(flow.board().unwrap(), |value| value == BOMB);
    flow.dig(bomb).unwrap();
    let events = flow.tick(EXPLODE_DELAY);

    assert!(events
        .iter()
        .any(|event| matches!(event, BoardEvent::BombExploded { .. })));
    assert!(!events
        .iter()
        .any(|event| matches!(event, BoardEvent::DiamondsRemoved { .. })));
    assert_eq!(flow.score(), 0);
    assert_eq!(flow.diamonds_remaining(), 8);
    assert_eq!(flow.state(), FlowState::InGame);

    // Revealed neighbors are still diggable afterwards.
    let board = flow.board().unwrap();
    let revealed: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            BoardEvent::HintBurst { coords, .. } => Some(*coords),
            _ => None,
        })
        .collect();
    assert!(!revealed.is_empty());
    for coords in revealed {
        assert_eq!(board.phase_at(coords), TilePhase::Clickable);
    }
}

#[test]
fn hud_snapshots_follow_the_whole_session() {
    let mut flow = GameFlow::new(catalogue(), 99);
    flow.start_level(2).unwrap();

    flow.hint();
    let target = cell_with(flow.board().unwrap(), |value| value > 0);
    flow.dig(target).unwrap();
    flow.tick(EXPLODE_DELAY);

    let snapshots = flow.take_snapshots();
    assert!(snapshots.len() >= 3);
    let last = snapshots.last().unwrap();
    assert_eq!(last.level, 2);
    assert_eq!(last.hints_remaining, DEFAULT_HINTS - 1);
    assert!(last.score >= 1);
    assert_eq!(last.digs_remaining, 5);
    assert_eq!(
        i32::from(flow.board().unwrap().diamond_total()) - last.score as i32,
        last.diamonds_remaining
    );
}
