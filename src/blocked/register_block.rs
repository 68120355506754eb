//! Completion of partial register blocks.
//!
//! The kernels only take full `KERNEL_WIDTH x REGISTER_SIZE` blocks. At the
//! right and bottom edges of a side map the block is smaller, so it is copied
//! into a zero-filled scratch block first. Zero stays zero under any
//! requantization (offsets are at most 254), so the padding adds nothing to
//! the column sums.

use crate::layout::cell::{KernelSideFormat, REGISTER_SIZE};
use crate::layout::SideMap;

/// Scratch space for one complete register block.
#[derive(Debug, Clone)]
pub struct PackingRegisterBlock<const CELLS: usize> {
    buf: Vec<u8>,
}

impl<const CELLS: usize> Default for PackingRegisterBlock<CELLS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CELLS: usize> PackingRegisterBlock<CELLS> {
    pub fn new() -> Self {
        Self {
            buf: vec![0; KernelSideFormat::<CELLS>::REGISTER_BLOCK_BYTES],
        }
    }

    /// Returns `src` itself when it is a full register block, otherwise a
    /// zero-padded copy of it held in this scratch block.
    ///
    /// # Panics
    ///
    /// Panics if `src` is larger than one register block.
    pub fn complete_src<'a>(&'a mut self, src: &SideMap<'a>) -> SideMap<'a> {
        let kernel_width = KernelSideFormat::<CELLS>::KERNEL_WIDTH;
        assert!(
            src.width() <= kernel_width && src.depth() <= REGISTER_SIZE,
            "{}x{} block does not fit a {}x{} register block",
            src.width(),
            src.depth(),
            kernel_width,
            REGISTER_SIZE
        );
        if src.width() == kernel_width && src.depth() == REGISTER_SIZE {
            return *src;
        }

        self.buf.fill(0);
        for w in 0..src.width() {
            let column = src.row(w, 0);
            self.buf[w * REGISTER_SIZE..][..column.len()].copy_from_slice(column);
        }
        SideMap::from_dense_buffer(&self.buf, kernel_width, REGISTER_SIZE)
    }
}
