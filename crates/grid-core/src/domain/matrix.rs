//! Square row-major matrix of signed 32-bit cells, plus wire conversion.
//!
//! A [`Matrix`] is owned exclusively by one session for the lifetime of one
//! connection. It is created from wire bytes at decode time, mutated in place
//! by the worker pool, and discarded when the session ends.

use thiserror::Error;

/// Errors constructing a [`Matrix`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatrixError {
    /// The cell buffer does not hold `size × size` cells.
    #[error("cell count {got} does not fill a {size}x{size} matrix")]
    CellCountMismatch { size: usize, got: usize },

    /// The byte buffer is not `size × size × 4` bytes long.
    #[error("byte length {got} does not encode a {size}x{size} matrix ({expected} bytes)")]
    ByteLengthMismatch {
        size: usize,
        expected: usize,
        got: usize,
    },
}

/// A `size × size` grid of `i32` cells stored row-major in one flat buffer.
///
/// The flat layout is what lets the worker pool hand out disjoint `&mut [i32]`
/// row blocks without copying; see [`crate::domain::pool`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    size: usize,
    cells: Vec<i32>,
}

impl Matrix {
    /// Builds a matrix from a flat row-major cell buffer.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::CellCountMismatch`] unless
    /// `cells.len() == size * size`.
    pub fn from_cells(size: usize, cells: Vec<i32>) -> Result<Self, MatrixError> {
        if cells.len() != size * size {
            return Err(MatrixError::CellCountMismatch {
                size,
                got: cells.len(),
            });
        }
        Ok(Self { size, cells })
    }

    /// Builds a matrix from nested rows. Test and generator convenience.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::CellCountMismatch`] if the rows do not form a
    /// square grid.
    pub fn from_rows(rows: Vec<Vec<i32>>) -> Result<Self, MatrixError> {
        let size = rows.len();
        let cells: Vec<i32> = rows.into_iter().flatten().collect();
        Self::from_cells(size, cells)
    }

    /// Decodes a matrix from `size² × 4` big-endian bytes, row-major.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::ByteLengthMismatch`] for any other length.
    pub fn from_be_bytes(size: usize, bytes: &[u8]) -> Result<Self, MatrixError> {
        let expected = size * size * 4;
        if bytes.len() != expected {
            return Err(MatrixError::ByteLengthMismatch {
                size,
                expected,
                got: bytes.len(),
            });
        }
        let cells = bytes
            .chunks_exact(4)
            .map(|c| i32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Ok(Self { size, cells })
    }

    /// Encodes the matrix as `size² × 4` big-endian bytes, row-major.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.cells.len() * 4);
        for cell in &self.cells {
            bytes.extend_from_slice(&cell.to_be_bytes());
        }
        bytes
    }

    /// Side length of the matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of bytes this matrix occupies on the wire.
    pub fn wire_len(&self) -> usize {
        self.size * self.size * 4
    }

    /// Row `r` as a slice.
    pub fn row(&self, r: usize) -> &[i32] {
        &self.cells[r * self.size..(r + 1) * self.size]
    }

    /// The flat row-major cell buffer.
    pub fn cells(&self) -> &[i32] {
        &self.cells
    }

    /// Mutable access to the flat cell buffer, for the worker pool.
    pub fn cells_mut(&mut self) -> &mut [i32] {
        &mut self.cells
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
