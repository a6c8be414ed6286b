//! Board tests - move scenarios and terminal detection

use rand::rngs::mock::StepRng;
use rand::rngs::StdRng;
use rand::SeedableRng;

use tiles2048::core::{Board, EngineError};
use tiles2048::types::{Direction, GameStatus, TileId, WIN_VALUE};

fn board(rows: [[u32; 4]; 4]) -> Board {
    Board::from_rows(rows).unwrap()
}

fn row0(b: &Board) -> [u32; 4] {
    b.grid()[0]
}

#[test]
fn test_pair_merges_toward_left() {
    let b = board([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
    let s = b.shift(Direction::Left);
    assert_eq!(row0(&s.board), [4, 0, 0, 0]);
    assert_eq!(s.score_gained, 4);
    assert_eq!(s.board.score(), 4);
}

#[test]
fn test_four_equal_tiles_make_two_merges() {
    let b = board([[2, 2, 2, 2], [0; 4], [0; 4], [0; 4]]);
    let s = b.shift(Direction::Left);
    assert_eq!(row0(&s.board), [4, 4, 0, 0]);
    assert_eq!(s.score_gained, 8);
    assert_eq!(s.merges, 2);
}

#[test]
fn test_merge_across_gap() {
    let b = board([[2, 0, 2, 4], [0; 4], [0; 4], [0; 4]]);
    let s = b.shift(Direction::Left);
    assert_eq!(row0(&s.board), [4, 4, 0, 0]);
    assert_eq!(s.score_gained, 4);
}

#[test]
fn test_merge_result_never_remerges() {
    let b = board([[4, 2, 2, 0], [0; 4], [0; 4], [0; 4]]);
    let s = b.shift(Direction::Right);
    // 2+2 -> 4 at the right edge; the existing 4 slides next to it, no 8.
    assert_eq!(row0(&s.board), [0, 0, 4, 4]);
    assert_eq!(s.score_gained, 4);
}

#[test]
fn test_three_equal_merge_at_leading_edge() {
    let b = board([[2, 2, 2, 0], [0; 4], [0; 4], [0; 4]]);
    assert_eq!(row0(&b.shift(Direction::Left).board), [4, 2, 0, 0]);
    assert_eq!(row0(&b.shift(Direction::Right).board), [0, 0, 2, 4]);
}

#[test]
fn test_columns_move_independently() {
    let b = board([[2, 0, 4, 0], [2, 0, 4, 0], [0, 8, 0, 0], [0, 8, 0, 2]]);
    let up = b.shift(Direction::Up).board;
    assert_eq!(
        up.grid(),
        [[4, 16, 8, 2], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]
    );
    assert_eq!(up.score(), 4 + 16 + 8);
}

#[test]
fn test_move_spawns_exactly_one_tile() {
    let mut rng = StdRng::seed_from_u64(7);
    let b = board([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
    let r = b.apply_move(Direction::Left, &mut rng);
    assert!(r.event.changed);
    assert_eq!(r.board.tile_count(), 2);
    let spawned = r.event.spawned.unwrap();
    assert!(spawned.value == 2 || spawned.value == 4);
    assert_ne!(spawned.position(), (0, 0));
    assert_eq!(r.board.tile_at(spawned.row, spawned.col), Some(spawned));
}

#[test]
fn test_unchanged_move_is_identity() {
    let mut rng = StdRng::seed_from_u64(7);
    let b = board([[2, 4, 8, 16], [0; 4], [0; 4], [0; 4]]).with_score(100);
    let r = b.apply_move(Direction::Left, &mut rng);
    assert!(!r.event.changed);
    assert!(r.event.spawned.is_none());
    assert_eq!(r.board, b);
    assert_eq!(r.board.score(), 100);
}

#[test]
fn test_input_board_is_not_mutated() {
    let mut rng = StdRng::seed_from_u64(1);
    let b = board([[2, 2, 4, 4], [0; 4], [0; 4], [0; 4]]);
    let before = b.clone();
    let _ = b.moved(Direction::Left, &mut rng);
    assert_eq!(b, before);
}

#[test]
fn test_checkerboard_is_game_over() {
    let b = board([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
    assert!(b.is_game_over());
    assert!(!b.has_won());
    assert_eq!(b.status(), GameStatus::Lost);

    let mut rng = StdRng::seed_from_u64(1);
    for d in Direction::ALL {
        let r = b.apply_move(d, &mut rng);
        assert!(!r.event.changed);
        assert_eq!(r.board, b);
    }
}

#[test]
fn test_board_with_empty_cell_is_not_over() {
    let b = board([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 0]]);
    assert!(!b.is_game_over());
    assert_eq!(b.status(), GameStatus::Playing);
}

#[test]
fn test_reaching_win_value() {
    let mut rng = StdRng::seed_from_u64(3);
    let b = board([[0, 1024, 0, 1024], [0; 4], [0; 4], [0; 4]]);
    assert!(!b.has_won());
    let r = b.apply_move(Direction::Left, &mut rng);
    assert_eq!(r.board.value_at(0, 0), WIN_VALUE);
    assert!(r.board.has_won());
    assert_eq!(r.event.status, GameStatus::Won);
    assert_eq!(r.board.score(), 2048);
}

#[test]
fn test_terminal_policy() {
    let mut rng = StdRng::seed_from_u64(3);
    let won = board([[2048, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);

    let r = won.apply_move(Direction::Right, &mut rng);
    assert!(!r.event.changed);
    assert_eq!(r.board, won);

    assert_eq!(
        won.try_move(Direction::Right, &mut rng).unwrap_err(),
        EngineError::Terminal(GameStatus::Won)
    );
}

#[test]
fn test_ids_survive_and_merges_are_fresh() {
    let mut rng = StepRng::new(0, 0);
    let b = board([[2, 2, 0, 8], [0; 4], [0; 4], [0; 4]]);
    let ids: Vec<TileId> = b.tiles().map(|t| t.id).collect();

    let r = b.apply_move(Direction::Left, &mut rng);
    let merged = r.board.tile_at(0, 0).unwrap();
    let eight = r.board.tile_at(0, 1).unwrap();

    assert_eq!(merged.value, 4);
    assert!(!ids.contains(&merged.id));
    assert_eq!(merged.merged_from, Some([ids[0], ids[1]]));
    assert_eq!(eight.id, ids[2]);

    let spawned = r.event.spawned.unwrap();
    assert!(!ids.contains(&spawned.id));
    assert_ne!(spawned.id, merged.id);
}

#[test]
fn test_motions_report_every_tile() {
    let b = board([[0, 2, 0, 2], [0, 0, 4, 0], [0; 4], [0; 4]]);
    let s = b.shift(Direction::Left);
    assert_eq!(s.motions.len(), 3);
    assert!(s.motions.iter().filter(|m| m.merged).all(|m| m.to == (0, 0)));
    let four = s.motions.iter().find(|m| m.from == (1, 2)).unwrap();
    assert_eq!(four.to, (1, 0));
    assert!(!four.merged);
}

#[test]
fn test_legal_moves_indexed_by_direction() {
    let b = board([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
    let legal = b.legal_moves();
    assert!(!legal[Direction::Left.index()]);
    assert!(!legal[Direction::Up.index()]);
    assert!(legal[Direction::Right.index()]);
    assert!(legal[Direction::Down.index()]);
}

#[test]
fn test_queries() {
    let b = board([[2, 0, 0, 0], [0, 64, 0, 0], [0; 4], [0, 0, 0, 8]]);
    assert_eq!(b.size(), 4);
    assert_eq!(b.tile_count(), 3);
    assert_eq!(b.empty_count(), 13);
    assert_eq!(b.empty_positions().len(), 13);
    assert_eq!(b.max_tile(), 64);
    assert_eq!(b.tile_sum(), 74);
    assert_eq!(b.value_at(1, 1), 64);
    assert_eq!(b.value_at(9, 9), 0);
    assert!(b.tile_at(0, 1).is_none());
}

#[test]
fn test_empty_board() {
    let b = Board::empty();
    assert_eq!(b.tile_count(), 0);
    assert_eq!(b.status(), GameStatus::Playing);
    assert_eq!(b.legal_moves(), [false; 4]);
}
