//! The packed destination block.

use crate::error::{PackError, Result};
use crate::layout::cell::{CELL_SIZE, KernelSideFormat, REGISTER_SIZE};

/// Append-only packed copy of one operand side.
///
/// Holds the packed bytes, a write cursor that only moves forward, and one
/// `i32` running sum per column ("sums of each slice") that the output stage
/// uses to correct for the zero point.
///
/// Width is rounded up to the kernel width and depth up to the register
/// size, so every register block the kernels write fits.
#[derive(Debug, Clone)]
pub struct PackedSideBlock<const CELLS: usize> {
    data: Vec<u8>,
    pos: usize,
    sums_of_each_slice: Vec<i32>,
    width: usize,
    depth: usize,
}

impl<const CELLS: usize> PackedSideBlock<CELLS> {
    const KERNEL_WIDTH: usize = KernelSideFormat::<CELLS>::KERNEL_WIDTH;

    pub fn new(width: usize, depth: usize) -> Result<Self> {
        if width == 0 || depth == 0 {
            return Err(PackError::InvalidGeometry(format!(
                "empty packed block {}x{}",
                width, depth
            )));
        }
        let padded_width = width.div_ceil(Self::KERNEL_WIDTH) * Self::KERNEL_WIDTH;
        let padded_depth = depth.div_ceil(REGISTER_SIZE) * REGISTER_SIZE;
        Ok(Self {
            data: vec![0; padded_width * padded_depth],
            pos: 0,
            sums_of_each_slice: vec![0; padded_width],
            width: padded_width,
            depth: padded_depth,
        })
    }

    pub fn padded_width(&self) -> usize {
        self.width
    }

    pub fn padded_depth(&self) -> usize {
        self.depth
    }

    /// Cursor position in bytes from the start of the block.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left between the cursor and the end of the block.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn sums_of_each_slice(&self) -> &[i32] {
        &self.sums_of_each_slice
    }

    /// The bytes from the cursor on.
    pub fn current_data(&self) -> &[u8] {
        &self.data[self.pos..]
    }

    /// The write sink for one kernel call: the bytes from the cursor on, and
    /// the per-column sums indexed by absolute column.
    pub fn split_current_mut(&mut self) -> (&mut [u8], &mut [i32]) {
        (&mut self.data[self.pos..], self.sums_of_each_slice.as_mut_slice())
    }

    /// Moves the cursor forward by `n` whole cells.
    ///
    /// # Panics
    ///
    /// Panics if that would move the cursor past the end of the block.
    pub fn seek_forward_n_cells(&mut self, n: usize) {
        let next = self.pos + n * CELL_SIZE;
        assert!(
            next <= self.data.len(),
            "cursor {} past end of {}-byte packed block",
            next,
            self.data.len()
        );
        self.pos = next;
    }

    /// Value of column `w`, depth `d`, for a block filled panel by panel
    /// (all depth of columns `0..KERNEL_WIDTH`, then the next panel).
    pub fn value_at(&self, w: usize, d: usize) -> u8 {
        assert!(w < self.width && d < self.depth, "({}, {}) out of range", w, d);
        let panel = w / Self::KERNEL_WIDTH;
        let panel_start = panel * Self::KERNEL_WIDTH * self.depth;
        self.data[panel_start + KernelSideFormat::<CELLS>::panel_offset(w % Self::KERNEL_WIDTH, d)]
    }
}
