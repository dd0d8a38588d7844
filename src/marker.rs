//! Dense one-bit-per-cell marker.
use ndarray::Array2;

use crate::grid::Cell;

const WORD_BITS: usize = u64::BITS as usize;

/// A 2-D bitset over the grid, one bit per cell in row-major order.
#[derive(Debug, Clone)]
pub struct VisitedMarker {
    cols: usize,
    rows: usize,
    words: Vec<u64>,
    count: usize,
}

impl VisitedMarker {
    pub fn new(cols: usize, rows: usize) -> Self {
        let bits = cols * rows;
        Self {
            cols,
            rows,
            words: vec![0; bits.div_ceil(WORD_BITS)],
            count: 0,
        }
    }

    #[inline]
    fn index(&self, cell: Cell) -> (usize, u64) {
        assert!(
            cell.col < self.cols && cell.row < self.rows,
            "cell ({}, {}) outside {}x{} marker",
            cell.col,
            cell.row,
            self.cols,
            self.rows
        );
        let bit = cell.row * self.cols + cell.col;
        (bit / WORD_BITS, 1u64 << (bit % WORD_BITS))
    }

    #[inline]
    pub fn is_marked(&self, cell: Cell) -> bool {
        let (word, mask) = self.index(cell);
        self.words[word] & mask != 0
    }

    /// Sets the bit; returns false if it was already set.
    #[inline]
    pub fn mark(&mut self, cell: Cell) -> bool {
        let (word, mask) = self.index(cell);
        if self.words[word] & mask != 0 {
            return false;
        }
        self.words[word] |= mask;
        self.count += 1;
        true
    }

    #[inline]
    pub fn unmark(&mut self, cell: Cell) {
        let (word, mask) = self.index(cell);
        if self.words[word] & mask != 0 {
            self.words[word] &= !mask;
            self.count -= 1;
        }
    }

    /// Unmarks every cell.
    pub fn clear(&mut self) {
        self.words.fill(0);
        self.count = 0;
    }

    /// Number of marked cells.
    pub fn count(&self) -> usize {
        self.count
    }

    /// The marked cells as a `(rows, cols)` boolean mask.
    pub fn to_mask(&self) -> Array2<bool> {
        Array2::from_shape_fn((self.rows, self.cols), |(row, col)| {
            self.is_marked(Cell::new(col, row))
        })
    }
}
