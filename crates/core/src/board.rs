//! Board module - grid state and the move transition
//!
//! The board is a 4x4 grid where each cell is empty or holds one [`Tile`].
//! Uses a flat array (row-major, `row * SIZE + col`) for cache locality and
//! zero-allocation moves.
//!
//! Boards are values: every transition takes `&self` and returns a new
//! board, so a caller holding the previous board never sees it change.

use std::fmt;

use arrayvec::ArrayVec;
use rand::Rng;

use crate::error::EngineError;
use crate::rng::{pick_index, spawn_value};
use crate::slide::{line_positions, resolve_line, Slot, TileMotion, SIZE};
use crate::types::{
    Direction, GameStatus, MoveEvent, Tile, TileId, BOARD_SIZE, CELL_COUNT, START_TILES,
    WIN_VALUE,
};

/// Per-tile motions of one shift
pub type Motions = ArrayVec<TileMotion, CELL_COUNT>;

/// The game board
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    /// Flat array of cells, row-major order
    cells: [Option<Tile>; CELL_COUNT],
    score: u32,
    /// Next id to hand out; carried along so derived boards never reuse ids
    next_id: u32,
}

/// Result of sliding and merging without a spawn
#[derive(Debug, Clone)]
pub struct Shift {
    pub board: Board,
    /// Any tile changed position (every merge moves at least one tile)
    pub changed: bool,
    pub score_gained: u32,
    pub merges: u32,
    pub motions: Motions,
}

/// Result of a full move (shift plus spawn)
#[derive(Debug, Clone)]
pub struct MoveResult {
    pub board: Board,
    pub event: MoveEvent,
    pub motions: Motions,
}

impl MoveResult {
    fn unchanged(board: &Board, direction: Direction, status: GameStatus) -> Self {
        Self {
            board: board.clone(),
            event: MoveEvent {
                direction,
                changed: false,
                score_gained: 0,
                merges: 0,
                spawned: None,
                status,
            },
            motions: ArrayVec::new(),
        }
    }
}

impl Board {
    /// Create an empty board with no tiles and zero score
    pub fn empty() -> Self {
        Self {
            cells: [None; CELL_COUNT],
            score: 0,
            next_id: 1,
        }
    }

    /// Create a fresh game board: empty grid seeded with two random tiles
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut board = Self::empty();
        for _ in 0..START_TILES {
            board.spawn_random(rng);
        }
        board
    }

    /// Build a board from explicit values (0 = empty).
    ///
    /// Ids are assigned in row-major order starting at 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use tiles2048_core::Board;
    ///
    /// let board = Board::from_rows([
    ///     [2, 2, 0, 0],
    ///     [0, 0, 0, 0],
    ///     [0, 0, 4, 0],
    ///     [0, 0, 0, 0],
    /// ])
    /// .unwrap();
    /// assert_eq!(board.tile_count(), 3);
    /// assert!(Board::from_rows([[3, 0, 0, 0]; 4]).is_err());
    /// ```
    pub fn from_rows(rows: [[u32; SIZE]; SIZE]) -> Result<Self, EngineError> {
        let mut board = Self::empty();
        for (row, values) in rows.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                if value == 0 {
                    continue;
                }
                if value < 2 || !value.is_power_of_two() {
                    return Err(EngineError::InvalidTileValue(value));
                }
                let id = board.allocate_id();
                board.put(Tile::new(id, row as u8, col as u8, value));
            }
        }
        Ok(board)
    }

    /// Same board with a different running score
    pub fn with_score(mut self, score: u32) -> Self {
        self.score = score;
        self
    }

    /// Calculate flat index from (row, col)
    #[inline(always)]
    fn index(row: u8, col: u8) -> Option<usize> {
        if row >= BOARD_SIZE || col >= BOARD_SIZE {
            return None;
        }
        Some(row as usize * SIZE + col as usize)
    }

    fn put(&mut self, tile: Tile) {
        if let Some(idx) = Self::index(tile.row, tile.col) {
            self.cells[idx] = Some(tile);
        }
    }

    fn allocate_id(&mut self) -> TileId {
        let id = TileId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Place one tile (2 or 4) on a uniformly random empty cell
    fn spawn_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Tile> {
        let empties = self.empty_positions();
        let (row, col) = empties[pick_index(rng, empties.len())?];
        let value = spawn_value(rng);
        let tile = Tile::new(self.allocate_id(), row, col, value);
        self.put(tile);
        Some(tile)
    }

    /// Board dimension (cells per side)
    pub fn size(&self) -> u8 {
        BOARD_SIZE
    }

    /// Cumulative merge score of this game
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Tile at (row, col), `None` if empty or out of bounds
    pub fn tile_at(&self, row: u8, col: u8) -> Option<Tile> {
        Self::index(row, col).and_then(|idx| self.cells[idx])
    }

    /// Value at (row, col), 0 if empty or out of bounds
    pub fn value_at(&self, row: u8, col: u8) -> u32 {
        self.tile_at(row, col).map(|t| t.value).unwrap_or(0)
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Option<Tile>] {
        &self.cells
    }

    /// Tiles in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.cells.iter().flatten()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles().count()
    }

    pub fn empty_count(&self) -> usize {
        CELL_COUNT - self.tile_count()
    }

    /// Empty (row, col) positions in row-major order
    pub fn empty_positions(&self) -> ArrayVec<(u8, u8), CELL_COUNT> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_none())
            .map(|(i, _)| ((i / SIZE) as u8, (i % SIZE) as u8))
            .collect()
    }

    /// Largest tile value, 0 on an empty board
    pub fn max_tile(&self) -> u32 {
        self.tiles().map(|t| t.value).max().unwrap_or(0)
    }

    /// Sum of all tile values
    pub fn tile_sum(&self) -> u64 {
        self.tiles().map(|t| t.value as u64).sum()
    }

    /// Write values into a row-major grid (0 = empty)
    pub fn write_grid(&self, out: &mut [[u32; SIZE]; SIZE]) {
        for (row, line) in out.iter_mut().enumerate() {
            for (col, v) in line.iter_mut().enumerate() {
                *v = self.cells[row * SIZE + col].map(|t| t.value).unwrap_or(0);
            }
        }
    }

    /// Values as a row-major grid (0 = empty)
    pub fn grid(&self) -> [[u32; SIZE]; SIZE] {
        let mut out = [[0u32; SIZE]; SIZE];
        self.write_grid(&mut out);
        out
    }

    /// True if any tile reached [`WIN_VALUE`]
    pub fn has_won(&self) -> bool {
        self.tiles().any(|t| t.value >= WIN_VALUE)
    }

    /// True if the grid is full and no two neighbours share a value
    pub fn is_game_over(&self) -> bool {
        if self.empty_count() > 0 {
            return false;
        }

        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let v = self.value_at(row, col);
                if col + 1 < BOARD_SIZE && self.value_at(row, col + 1) == v {
                    return false;
                }
                if row + 1 < BOARD_SIZE && self.value_at(row + 1, col) == v {
                    return false;
                }
            }
        }

        true
    }

    /// Current lifecycle status (Won takes precedence over Lost)
    pub fn status(&self) -> GameStatus {
        if self.has_won() {
            GameStatus::Won
        } else if self.is_game_over() {
            GameStatus::Lost
        } else {
            GameStatus::Playing
        }
    }

    /// Whether sliding toward `direction` would change the board
    pub fn can_move(&self, direction: Direction) -> bool {
        self.shift(direction).changed
    }

    /// Changing directions, indexed by [`Direction::index`]
    pub fn legal_moves(&self) -> [bool; 4] {
        Direction::ALL.map(|d| self.can_move(d))
    }

    /// Slide and merge toward `direction` without spawning.
    ///
    /// Unmerged tiles keep their ids. Each merge creates a new tile with a
    /// fresh id and `merged_from` set to the two absorbed ids.
    pub fn shift(&self, direction: Direction) -> Shift {
        let mut next = Board {
            cells: [None; CELL_COUNT],
            score: self.score,
            next_id: self.next_id,
        };
        let mut motions = Motions::new();
        let mut score_gained: u32 = 0;
        let mut merges: u32 = 0;

        for lane in 0..BOARD_SIZE {
            let positions = line_positions(direction, lane);
            let line = positions.map(|(row, col)| self.tile_at(row, col));

            for (slot, &(row, col)) in resolve_line(&line).iter().zip(positions.iter()) {
                match *slot {
                    Slot::Single(tile) => {
                        motions.push(TileMotion::new(tile, (row, col), false));
                        next.put(Tile {
                            row,
                            col,
                            merged_from: None,
                            ..tile
                        });
                    }
                    Slot::Merged { target, source } => {
                        let value = slot.value();
                        let id = next.allocate_id();
                        motions.push(TileMotion::new(target, (row, col), true));
                        motions.push(TileMotion::new(source, (row, col), true));
                        next.put(Tile {
                            id,
                            row,
                            col,
                            value,
                            merged_from: Some([target.id, source.id]),
                        });
                        score_gained = score_gained.saturating_add(value);
                        merges += 1;
                    }
                }
            }
        }

        next.score = self.score.saturating_add(score_gained);
        let changed = motions.iter().any(TileMotion::moved);

        Shift {
            board: next,
            changed,
            score_gained,
            merges,
            motions,
        }
    }

    /// Apply a move: shift, then spawn one tile if the board changed.
    ///
    /// A move that changes nothing returns an identical board with no spawn.
    /// A move on a won or lost board is a no-op as well; use
    /// [`Board::try_move`] to have that reported as an error instead.
    pub fn apply_move<R: Rng + ?Sized>(&self, direction: Direction, rng: &mut R) -> MoveResult {
        let status = self.status();
        if status.is_terminal() {
            return MoveResult::unchanged(self, direction, status);
        }

        let Shift {
            mut board,
            changed,
            score_gained,
            merges,
            motions,
        } = self.shift(direction);

        if !changed {
            return MoveResult::unchanged(self, direction, status);
        }

        let spawned = board.spawn_random(rng);
        let status = board.status();

        MoveResult {
            board,
            event: MoveEvent {
                direction,
                changed: true,
                score_gained,
                merges,
                spawned,
                status,
            },
            motions,
        }
    }

    /// Apply a move and return only the resulting board
    pub fn moved<R: Rng + ?Sized>(&self, direction: Direction, rng: &mut R) -> Board {
        self.apply_move(direction, rng).board
    }

    /// Like [`Board::apply_move`] but rejects moves on a finished game
    pub fn try_move<R: Rng + ?Sized>(
        &self,
        direction: Direction,
        rng: &mut R,
    ) -> Result<MoveResult, EngineError> {
        let status = self.status();
        if status.is_terminal() {
            return Err(EngineError::Terminal(status));
        }
        Ok(self.apply_move(direction, rng))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.grid().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, v) in line.iter().enumerate() {
                if j > 0 {
                    f.write_str(" ")?;
                }
                if *v == 0 {
                    write!(f, "{:>5}", ".")?;
                } else {
                    write!(f, "{:>5}", v)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn board(rows: [[u32; 4]; 4]) -> Board {
        Board::from_rows(rows).unwrap()
    }

    #[test]
    fn test_board_index_calculation() {
        assert_eq!(Board::index(0, 0), Some(0));
        assert_eq!(Board::index(0, 3), Some(3));
        assert_eq!(Board::index(1, 0), Some(4));
        assert_eq!(Board::index(3, 3), Some(15));
        assert_eq!(Board::index(4, 0), None);
        assert_eq!(Board::index(0, 4), None);
    }

    #[test]
    fn test_new_board_has_two_small_tiles() {
        let mut rng = StdRng::seed_from_u64(42);
        let b = Board::new(&mut rng);
        assert_eq!(b.tile_count(), 2);
        assert_eq!(b.score(), 0);
        assert!(b.tiles().all(|t| t.value == 2 || t.value == 4));
        let ids: Vec<TileId> = b.tiles().map(|t| t.id).collect();
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn test_spawn_uses_first_empty_cell_on_zero_stream() {
        let mut rng = StepRng::new(0, 0);
        let b = board([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let result = b.apply_move(Direction::Right, &mut rng);
        let spawned = result.event.spawned.unwrap();
        assert_eq!(spawned.position(), (0, 0));
        assert_eq!(spawned.value, 4);
        assert_eq!(result.board.value_at(0, 3), 2);
    }

    #[test]
    fn test_shift_keeps_ids_of_sliding_tiles() {
        let b = board([[0, 0, 0, 2], [0; 4], [0; 4], [0; 4]]);
        let id = b.tile_at(0, 3).unwrap().id;
        let s = b.shift(Direction::Left);
        assert!(s.changed);
        assert_eq!(s.board.tile_at(0, 0).unwrap().id, id);
        assert_eq!(s.motions.len(), 1);
        assert_eq!(s.motions[0].from, (0, 3));
        assert_eq!(s.motions[0].to, (0, 0));
    }

    #[test]
    fn test_merge_gets_fresh_id_and_sources() {
        let b = board([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let a = b.tile_at(0, 0).unwrap().id;
        let c = b.tile_at(0, 1).unwrap().id;
        let s = b.shift(Direction::Left);
        let merged = s.board.tile_at(0, 0).unwrap();
        assert_eq!(merged.value, 4);
        assert_ne!(merged.id, a);
        assert_ne!(merged.id, c);
        assert_eq!(merged.merged_from, Some([a, c]));
        assert_eq!(s.score_gained, 4);
        assert_eq!(s.merges, 1);
    }

    #[test]
    fn test_merged_from_cleared_on_next_shift() {
        let b = board([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let once = b.shift(Direction::Left).board;
        let twice = once.shift(Direction::Right).board;
        assert_eq!(twice.tile_at(0, 3).unwrap().merged_from, None);
    }

    #[test]
    fn test_noop_move_keeps_merged_from() {
        let b = board([[0, 0, 2, 2], [0; 4], [0; 4], [0; 4]]);
        let merged = b.shift(Direction::Right).board;
        let tile = merged.tile_at(0, 3).unwrap();
        assert!(tile.merged_from.is_some());

        let r = merged.apply_move(Direction::Right, &mut StepRng::new(0, 0));
        assert!(!r.event.changed);
        assert_eq!(r.board, merged);
        assert_eq!(r.board.tile_at(0, 3), Some(tile));
    }

    #[test]
    fn test_merged_from_cleared_by_next_changing_move() {
        let b = board([[0, 0, 2, 2], [0; 4], [0; 4], [0; 4]]);
        let merged = b.shift(Direction::Right).board;
        let r = merged.apply_move(Direction::Left, &mut StepRng::new(0, 0));
        assert!(r.event.changed);
        assert_eq!(r.board.tile_at(0, 0).unwrap().merged_from, None);
    }

    #[test]
    fn test_shift_does_not_touch_input() {
        let b = board([[2, 2, 4, 4], [0; 4], [0; 4], [0; 4]]);
        let before = b.clone();
        let _ = b.shift(Direction::Left);
        assert_eq!(b, before);
    }

    #[test]
    fn test_no_op_shift_unchanged() {
        let b = board([[2, 4, 0, 0], [4, 2, 0, 0], [0; 4], [0; 4]]);
        let s = b.shift(Direction::Left);
        assert!(!s.changed);
        assert_eq!(s.score_gained, 0);
    }

    #[test]
    fn test_vertical_moves() {
        let b = board([[2, 0, 0, 0], [2, 0, 0, 0], [4, 0, 0, 0], [0; 4]]);
        let up = b.shift(Direction::Up).board;
        assert_eq!(up.grid()[0][0], 4);
        assert_eq!(up.grid()[1][0], 4);
        assert_eq!(up.grid()[2][0], 0);

        let down = b.shift(Direction::Down).board;
        assert_eq!(down.grid()[3][0], 4);
        assert_eq!(down.grid()[2][0], 4);
        assert_eq!(down.grid()[1][0], 0);
    }

    #[test]
    fn test_game_over_checkerboard() {
        let b = board([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert!(b.is_game_over());
        assert_eq!(b.status(), GameStatus::Lost);
        assert_eq!(b.legal_moves(), [false; 4]);
    }

    #[test]
    fn test_full_board_with_pair_is_not_over() {
        let b = board([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 4]]);
        assert!(!b.is_game_over());
        assert!(b.can_move(Direction::Left));
        assert!(b.can_move(Direction::Up));
    }

    #[test]
    fn test_won_takes_precedence() {
        let b = board([
            [2048, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 2],
        ]);
        assert!(b.has_won());
        assert!(b.is_game_over());
        assert_eq!(b.status(), GameStatus::Won);
    }

    #[test]
    fn test_try_move_rejects_terminal() {
        let mut rng = StdRng::seed_from_u64(1);
        let b = board([[1024, 1024, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let won = b.moved(Direction::Left, &mut rng);
        assert!(won.has_won());
        let err = won.try_move(Direction::Right, &mut rng).unwrap_err();
        assert_eq!(err, EngineError::Terminal(GameStatus::Won));
        // Lenient variant leaves the board untouched.
        assert_eq!(won.moved(Direction::Right, &mut rng), won);
    }

    #[test]
    fn test_from_rows_rejects_bad_values() {
        assert_eq!(
            Board::from_rows([[1, 0, 0, 0], [0; 4], [0; 4], [0; 4]]),
            Err(EngineError::InvalidTileValue(1))
        );
        assert_eq!(
            Board::from_rows([[0; 4], [0; 4], [0, 6, 0, 0], [0; 4]]),
            Err(EngineError::InvalidTileValue(6))
        );
    }

    #[test]
    fn test_display_grid() {
        let b = board([[2, 0, 0, 0], [0; 4], [0; 4], [0, 0, 0, 2048]]);
        let text = b.to_string();
        assert_eq!(text.lines().count(), 4);
        assert!(text.lines().next().unwrap().trim_start().starts_with('2'));
        assert!(text.lines().last().unwrap().ends_with("2048"));
    }
}
