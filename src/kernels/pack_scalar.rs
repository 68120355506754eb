//! Scalar packing kernel.
//!
//! Same output bytes, same sums and same rounding draw order as the SSE4.1
//! kernel, one element at a time. It is the fallback on CPUs without SSE4.1
//! and the reference the SIMD kernel is tested against.

use crate::kernels::check_register_block;
use crate::layout::cell::{
    CELL, CELL_DEPTH, CELL_SIZE, CELL_WIDTH, DEPTH_STEP, KernelSideFormat, REGISTER_SIZE,
};
use crate::layout::{PackedSideBlock, SideMap};
use crate::quant::{QuantizationParams, requantize};

/// Packs one `KERNEL_WIDTH x REGISTER_SIZE` register block into `dst`.
///
/// Column sums go to `start_width + column` of the destination sums, and the
/// cursor moves past the block.
///
/// # Panics
///
/// Panics if `src` is not exactly one register block, or `dst` has no room
/// for it.
pub fn pack_register_block_scalar<Q: QuantizationParams, const CELLS: usize>(
    src: &SideMap<'_>,
    dst: &mut PackedSideBlock<CELLS>,
    start_width: usize,
    rounding: &mut Q::Rounding,
) {
    check_register_block(src, dst, start_width);

    let kernel_width = KernelSideFormat::<CELLS>::KERNEL_WIDTH;
    let row_bytes = KernelSideFormat::<CELLS>::ROW_BYTES;
    let cells_per_strip = DEPTH_STEP / CELL_DEPTH;

    let (out, sums) = dst.split_current_mut();
    let mut dst_off = 0;

    for cell_start_depth in (0..REGISTER_SIZE).step_by(DEPTH_STEP) {
        for cell_start_width in (0..kernel_width).step_by(CELL_WIDTH) {
            let column = start_width + cell_start_width;

            // One cell per pair of depth positions, each in its own row.
            for k in 0..cells_per_strip {
                let depth = cell_start_depth + k * CELL_DEPTH;
                let cell = &mut out[dst_off + k * row_bytes..][..CELL_SIZE];
                for w in 0..CELL_WIDTH {
                    for d in 0..CELL_DEPTH {
                        let source = src.get(cell_start_width + w, depth + d);
                        let v = requantize::<Q>(source, rounding);
                        cell[CELL.offset(w, d)] = v;
                        // wraps like the 32-bit SIMD lane add
                        sums[column + w] = sums[column + w].wrapping_add(i32::from(v));
                    }
                }
            }
            dst_off += CELL_SIZE;
        }
        dst_off += (cells_per_strip - 1) * row_bytes;
    }

    dst.seek_forward_n_cells(KernelSideFormat::<CELLS>::CELLS_PER_REGISTER_BLOCK);
}
