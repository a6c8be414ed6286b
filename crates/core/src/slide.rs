//! Slide module - line traversal and merge resolution
//!
//! A move is resolved one line at a time. Each line is read starting at the
//! leading edge (the edge tiles move toward), so the tile closest to the
//! destination is placed first and gets the first chance to merge.

use arrayvec::ArrayVec;

use crate::types::{Direction, Tile, TileId, BOARD_SIZE};

pub(crate) const SIZE: usize = BOARD_SIZE as usize;

/// Cell positions of one line, leading edge first.
///
/// `lane` is the row index for horizontal moves and the column index for
/// vertical moves.
pub fn line_positions(direction: Direction, lane: u8) -> [(u8, u8); SIZE] {
    debug_assert!(lane < BOARD_SIZE);
    std::array::from_fn(|i| {
        let near = i as u8;
        let far = BOARD_SIZE - 1 - near;
        match direction {
            Direction::Left => (lane, near),
            Direction::Right => (lane, far),
            Direction::Up => (near, lane),
            Direction::Down => (far, lane),
        }
    })
}

/// Resolved content of one output slot of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    /// A tile that slid without merging
    Single(Tile),
    /// Two equal tiles combined; `target` was placed first
    Merged { target: Tile, source: Tile },
}

impl Slot {
    pub(crate) fn value(&self) -> u32 {
        match self {
            Slot::Single(t) => t.value,
            Slot::Merged { target, .. } => target.value * 2,
        }
    }
}

/// Compact a line (given leading edge first) into its output slots.
///
/// A slot produced by a merge is never merged again in the same pass.
pub(crate) fn resolve_line(line: &[Option<Tile>; SIZE]) -> ArrayVec<Slot, SIZE> {
    let mut out: ArrayVec<Slot, SIZE> = ArrayVec::new();

    for tile in line.iter().flatten() {
        if let Some(Slot::Single(prev)) = out.last().copied() {
            if prev.value == tile.value {
                let last = out.len() - 1;
                out[last] = Slot::Merged {
                    target: prev,
                    source: *tile,
                };
                continue;
            }
        }
        out.push(Slot::Single(*tile));
    }

    out
}

/// Where a pre-move tile ended up after a shift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileMotion {
    pub id: TileId,
    pub from: (u8, u8),
    pub to: (u8, u8),
    /// The tile was absorbed into a merge at `to`
    pub merged: bool,
}

impl TileMotion {
    pub(crate) fn new(tile: Tile, to: (u8, u8), merged: bool) -> Self {
        Self {
            id: tile.id,
            from: tile.position(),
            to,
            merged,
        }
    }

    pub fn moved(&self) -> bool {
        self.from != self.to
    }
}
