use arrayvec::ArrayVec;

use crate::slide::SIZE;
use crate::types::{GameStatus, Tile, CELL_COUNT};

/// Observable state of a game, copied out for renderers and the adapter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    pub grid: [[u32; SIZE]; SIZE],
    pub board_hash: u64,
    pub tiles: ArrayVec<Tile, CELL_COUNT>,
    pub score: u32,
    pub status: GameStatus,
    pub episode_id: u32,
    pub seed: u64,
    pub move_count: u32,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        self.grid = [[0u32; SIZE]; SIZE];
        self.board_hash = grid_hash(&self.grid);
        self.tiles.clear();
        self.score = 0;
        self.status = GameStatus::Playing;
        self.episode_id = 0;
        self.seed = 0;
        self.move_count = 0;
    }

    pub fn playable(&self) -> bool {
        self.status == GameStatus::Playing
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        let mut s = Self {
            grid: [[0u32; SIZE]; SIZE],
            board_hash: 0,
            tiles: ArrayVec::new(),
            score: 0,
            status: GameStatus::Playing,
            episode_id: 0,
            seed: 0,
            move_count: 0,
        };
        s.clear();
        s
    }
}

/// FNV-1a 64-bit over the row-major grid values (little-endian `u32`s)
pub fn grid_hash(grid: &[[u32; SIZE]; SIZE]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    let mut h = OFFSET_BASIS;
    for v in grid.iter().flatten() {
        for b in v.to_le_bytes() {
            h ^= b as u64;
            h = h.wrapping_mul(PRIME);
        }
    }
    h
}
