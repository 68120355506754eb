//! SSE4.1 packing kernel.

use std::arch::x86_64::*;

use crate::kernels::check_register_block;
use crate::layout::cell::{
    CELL_DEPTH, CELL_SIZE, CELL_WIDTH, DEPTH_STEP, KernelSideFormat, REGISTER_SIZE,
};
use crate::layout::{PackedSideBlock, SideMap};
use crate::quant::{QuantizationParams, requantize_in_place};

/// Requantizes the low 8 bytes of `reg` in place.
///
/// Only the low half is ever stored, so the high half is left alone.
#[inline]
#[target_feature(enable = "sse4.1")]
#[allow(unsafe_op_in_unsafe_fn)]
unsafe fn requantize_low_half<Q: QuantizationParams>(
    reg: &mut __m128i,
    rounding: &mut Q::Rounding,
) {
    if Q::BITS == 8 {
        return;
    }
    let mut bytes = [0u8; 16];
    _mm_storeu_si128(bytes.as_mut_ptr() as *mut __m128i, *reg);
    requantize_in_place::<Q>(&mut bytes[..8], rounding);
    *reg = _mm_loadu_si128(bytes.as_ptr() as *const __m128i);
}

/// Packs one `KERNEL_WIDTH x REGISTER_SIZE` register block into `dst`.
///
/// Per group of 4 columns and strip of 8 depth positions, the 4 source rows
/// are loaded 8 bytes at a time and interleaved into four 4x2 cells. The
/// cells are requantized in depth order, stored one depth-cell row apart,
/// and their bytes summed per column into `sums_of_each_slice`.
///
/// # Safety
///
/// Caller must ensure the CPU supports SSE4.1. Geometry is checked.
#[target_feature(enable = "sse4.1")]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn pack_register_block_sse41<Q: QuantizationParams, const CELLS: usize>(
    src: &SideMap<'_>,
    dst: &mut PackedSideBlock<CELLS>,
    start_width: usize,
    rounding: &mut Q::Rounding,
) {
    check_register_block(src, dst, start_width);

    let kernel_width = KernelSideFormat::<CELLS>::KERNEL_WIDTH;
    let row_bytes = KernelSideFormat::<CELLS>::ROW_BYTES;
    let width_stride = src.width_stride();
    let src_ptr = src.as_ptr();

    let (out, sums) = dst.split_current_mut();
    let mut dst_ptr = out.as_mut_ptr();
    let sums_ptr = sums.as_mut_ptr().add(start_width);

    let one = _mm_set1_epi16(1);
    for cell_start_depth in (0..REGISTER_SIZE).step_by(DEPTH_STEP) {
        for cell_start_width in (0..kernel_width).step_by(CELL_WIDTH) {
            let src_data = src_ptr.add(cell_start_width * width_stride + cell_start_depth);

            // Column w, depths 0..8 of the strip, in the low half.
            let r0 = _mm_loadl_epi64(src_data as *const __m128i);
            let r1 = _mm_loadl_epi64(src_data.add(width_stride) as *const __m128i);
            let r2 = _mm_loadl_epi64(src_data.add(2 * width_stride) as *const __m128i);
            let r3 = _mm_loadl_epi64(src_data.add(3 * width_stride) as *const __m128i);

            // Dword k of cols01 holds depths 2k, 2k+1 of columns 0 and 1.
            let cols01 = _mm_unpacklo_epi16(r0, r1);
            let cols01_odd = _mm_shuffle_epi32::<0x31>(cols01);
            let cols23 = _mm_unpacklo_epi16(r2, r3);
            let cols23_even = _mm_shuffle_epi32::<0x80>(cols23);

            // cells 0 | 2 and cells 1 | 3
            let mut cell0 = _mm_blend_epi16::<0xcc>(cols01, cols23_even);
            requantize_low_half::<Q>(&mut cell0, rounding);
            let mut cell1 = _mm_blend_epi16::<0xcc>(cols01_odd, cols23);
            requantize_low_half::<Q>(&mut cell1, rounding);

            _mm_storel_epi64(dst_ptr as *mut __m128i, cell0);
            _mm_storel_epi64(dst_ptr.add(row_bytes) as *mut __m128i, cell1);

            let mut cell2 = _mm_shuffle_epi32::<0xee>(cell0);
            requantize_low_half::<Q>(&mut cell2, rounding);
            let mut cell3 = _mm_shuffle_epi32::<0xee>(cell1);
            requantize_low_half::<Q>(&mut cell3, rounding);

            _mm_storel_epi64(dst_ptr.add(2 * row_bytes) as *mut __m128i, cell2);
            _mm_storel_epi64(dst_ptr.add(3 * row_bytes) as *mut __m128i, cell3);

            // Bytes 2w and 2w+1 of every cell belong to column w.
            let cell_sums_ptr = sums_ptr.add(cell_start_width) as *mut __m128i;
            let mut column_sums = _mm_loadu_si128(cell_sums_ptr);
            column_sums = _mm_add_epi32(column_sums, _mm_madd_epi16(_mm_cvtepu8_epi16(cell0), one));
            column_sums = _mm_add_epi32(column_sums, _mm_madd_epi16(_mm_cvtepu8_epi16(cell1), one));
            column_sums = _mm_add_epi32(column_sums, _mm_madd_epi16(_mm_cvtepu8_epi16(cell2), one));
            column_sums = _mm_add_epi32(column_sums, _mm_madd_epi16(_mm_cvtepu8_epi16(cell3), one));
            _mm_storeu_si128(cell_sums_ptr, column_sums);

            dst_ptr = dst_ptr.add(CELL_SIZE);
        }
        dst_ptr = dst_ptr.add((DEPTH_STEP / CELL_DEPTH - 1) * row_bytes);
    }

    dst.seek_forward_n_cells(KernelSideFormat::<CELLS>::CELLS_PER_REGISTER_BLOCK);
}
