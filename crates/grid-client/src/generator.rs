//! Matrix sources for the client.
//!
//! The protocol does not care where the cells come from; anything that can
//! fill a `size × size` grid works. The default source draws small uniform
//! non-negative integers, which keeps logged matrices readable while still
//! exercising the server's row transformation.

use grid_core::Matrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Anything that can produce a square matrix of a requested side length.
pub trait MatrixSource {
    /// Produces a `size × size` matrix.
    fn generate(&mut self, size: usize) -> Matrix;
}

/// Uniformly random cells in a fixed inclusive range.
pub struct UniformRandomSource {
    rng: StdRng,
    low: i32,
    high: i32,
}

impl UniformRandomSource {
    /// Cells in `0..=99`, seeded from the OS entropy pool.
    pub fn new() -> Self {
        Self::with_range(0, 99)
    }

    /// Cells in `low..=high`, seeded from the OS entropy pool.
    ///
    /// `low` must not exceed `high`; the range is inclusive on both ends.
    pub fn with_range(low: i32, high: i32) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            low,
            high,
        }
    }

    /// Deterministic variant for tests and reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            low: 0,
            high: 99,
        }
    }
}

impl Default for UniformRandomSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MatrixSource for UniformRandomSource {
    fn generate(&mut self, size: usize) -> Matrix {
        let cells = (0..size * size)
            .map(|_| self.rng.gen_range(self.low..=self.high))
            .collect();
        Matrix::from_cells(size, cells).expect("generator fills exactly size*size cells")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
