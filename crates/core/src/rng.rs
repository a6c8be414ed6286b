//! RNG module - seeded randomness for tile spawns
//!
//! Every spawn helper is generic over [`rand::Rng`], so callers can inject any
//! source. [`TileRng`] is the seeded source owned by a running game: it keeps
//! the episode seed and derives the seed of the next episode from its own
//! stream, so a whole session replays from the first seed.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::types::SPAWN_FOUR_PROBABILITY;

/// Seeded spawn RNG for one game episode
#[derive(Debug, Clone)]
pub struct TileRng {
    seed: u64,
    rng: StdRng,
}

impl TileRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seed this episode was started from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draw the seed for the next episode from the current stream
    pub fn next_episode_seed(&mut self) -> u64 {
        self.rng.next_u64()
    }
}

impl RngCore for TileRng {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// Value of a freshly spawned tile: 4 with probability 0.1, otherwise 2
pub fn spawn_value<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    if rng.gen_bool(SPAWN_FOUR_PROBABILITY) {
        4
    } else {
        2
    }
}

/// Uniform index in `0..len`, `None` when `len == 0`
pub fn pick_index<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Option<usize> {
    if len == 0 {
        None
    } else {
        Some(rng.gen_range(0..len))
    }
}
