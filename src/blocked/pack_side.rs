//! Packing of a whole side map, register block by register block.

use crate::blocked::register_block::PackingRegisterBlock;
use crate::error::{PackError, Result};
use crate::kernels::PackKernel;
use crate::layout::cell::{KernelSideFormat, REGISTER_SIZE};
use crate::layout::{PackedSideBlock, SideMap};
use crate::quant::{
    AddmodRounding, ExactRounding, NearestRounding, Quantization, QuantizationParams,
    RoundingMode, RoundingStrategy, XorshiftRounding,
};

/// Packs all of `src` into `dst` with the fastest available kernel.
///
/// See [`pack_side_block_with_kernel`].
pub fn pack_side_block<Q: QuantizationParams, const CELLS: usize>(
    src: &SideMap<'_>,
    dst: &mut PackedSideBlock<CELLS>,
    rounding: &mut Q::Rounding,
) {
    pack_side_block_with_kernel::<Q, CELLS>(PackKernel::detect(), src, dst, rounding);
}

/// Packs all of `src` into `dst` with `kernel`.
///
/// Walks panels of `KERNEL_WIDTH` columns left to right and, inside a panel,
/// register blocks of `REGISTER_SIZE` depth top to bottom. Edge blocks are
/// zero padded. One rounding generator is shared by the whole pass, so the
/// draw order is panel, then depth block, then kernel order.
///
/// # Panics
///
/// Panics if `dst` was not sized for `src` or was already written to.
pub fn pack_side_block_with_kernel<Q: QuantizationParams, const CELLS: usize>(
    kernel: PackKernel,
    src: &SideMap<'_>,
    dst: &mut PackedSideBlock<CELLS>,
    rounding: &mut Q::Rounding,
) {
    let kernel_width = KernelSideFormat::<CELLS>::KERNEL_WIDTH;
    assert_eq!(dst.position(), 0, "packed block already written to");
    assert!(
        dst.padded_width() >= src.width(),
        "packed block width {} < side map width {}",
        dst.padded_width(),
        src.width()
    );
    assert_eq!(
        dst.padded_depth(),
        src.depth().div_ceil(REGISTER_SIZE) * REGISTER_SIZE,
        "packed block depth does not match side map depth {}",
        src.depth()
    );

    log::trace!(
        "packing {}x{} side map to {}-bit with the {} kernel",
        src.width(),
        src.depth(),
        Q::BITS,
        kernel.name()
    );

    let mut register_block = PackingRegisterBlock::<CELLS>::new();
    for start_width in (0..src.width()).step_by(kernel_width) {
        let width = kernel_width.min(src.width() - start_width);
        for start_depth in (0..src.depth()).step_by(REGISTER_SIZE) {
            let depth = REGISTER_SIZE.min(src.depth() - start_depth);
            let block = src.block(start_width, start_depth, width, depth);
            let complete = register_block.complete_src(&block);
            kernel.pack::<Q, CELLS>(&complete, dst, start_width, rounding);
        }
    }
}

/// Packs `src` to `BITS` bits with the rounding `strategy` resolves to for
/// this depth, and returns that rounding mode.
///
/// The generator is created fresh for this pass.
pub fn pack_side_block_with_strategy<const BITS: u32, const CELLS: usize>(
    src: &SideMap<'_>,
    dst: &mut PackedSideBlock<CELLS>,
    strategy: RoundingStrategy,
) -> Result<RoundingMode> {
    let mode = strategy.choose(src.depth());
    log::debug!(
        "{:?} resolves to {:?} at depth {}",
        strategy,
        mode,
        src.depth()
    );

    match mode {
        RoundingMode::Exact if BITS == 8 => {
            pack_side_block::<Quantization<8, ExactRounding>, CELLS>(src, dst, &mut ExactRounding)
        }
        RoundingMode::Exact => return Err(PackError::ExactRoundingBelowFullDepth { bits: BITS }),
        RoundingMode::Nearest => pack_side_block::<Quantization<BITS, NearestRounding>, CELLS>(
            src,
            dst,
            &mut NearestRounding,
        ),
        RoundingMode::ProbabilisticXorshift => {
            pack_side_block::<Quantization<BITS, XorshiftRounding>, CELLS>(
                src,
                dst,
                &mut XorshiftRounding::default(),
            )
        }
        RoundingMode::ProbabilisticAddmod => {
            pack_side_block::<Quantization<BITS, AddmodRounding>, CELLS>(
                src,
                dst,
                &mut AddmodRounding::default(),
            )
        }
    }
    Ok(mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quant::Exact8;

    fn pattern(width: usize, depth: usize) -> Vec<u8> {
        (0..width * depth).map(|i| (i * 13 + 5) as u8).collect()
    }

    #[test]
    fn test_every_value_lands_at_its_packed_offset() {
        let (width, depth) = (10, 37);
        let data = pattern(width, depth);
        let src = SideMap::dense(&data, width, depth).unwrap();
        let mut dst = PackedSideBlock::<2>::new(width, depth).unwrap();

        for kernel in PackKernel::available() {
            let mut dst_k = dst.clone();
            pack_side_block_with_kernel::<Exact8, 2>(kernel, &src, &mut dst_k, &mut ExactRounding);
            for w in 0..dst_k.padded_width() {
                for d in 0..dst_k.padded_depth() {
                    let expected = if w < width && d < depth { data[w * depth + d] } else { 0 };
                    assert_eq!(
                        dst_k.value_at(w, d),
                        expected,
                        "{} at ({}, {})",
                        kernel.name(),
                        w,
                        d
                    );
                }
            }
            assert_eq!(dst_k.remaining(), 0);
        }

        pack_side_block::<Exact8, 2>(&src, &mut dst, &mut ExactRounding);
        for w in 0..width {
            let column: i32 = (0..depth).map(|d| data[w * depth + d] as i32).sum();
            assert_eq!(dst.sums_of_each_slice()[w], column);
        }
        assert!(dst.sums_of_each_slice()[width..].iter().all(|&s| s == 0));
    }

    #[test]
    fn test_strategy_picks_rounding_by_depth() {
        let data = vec![100u8; 8 * 300];
        let shallow = SideMap::new(&data, 8, 32, 300).unwrap();
        let deep = SideMap::dense(&data, 8, 300).unwrap();
        let strategy = RoundingStrategy::NearestIfSmallXorshiftIfLarge;

        let mut dst = PackedSideBlock::<2>::new(8, 32).unwrap();
        let mode = pack_side_block_with_strategy::<4, 2>(&shallow, &mut dst, strategy).unwrap();
        assert_eq!(mode, RoundingMode::Nearest);
        // 100 * 15 + 127 = 1627 -> 6
        assert!(dst.data().iter().all(|&v| v == 6));

        let mut dst = PackedSideBlock::<2>::new(8, 300).unwrap();
        let mode = pack_side_block_with_strategy::<4, 2>(&deep, &mut dst, strategy).unwrap();
        assert_eq!(mode, RoundingMode::ProbabilisticXorshift);
        // 1500 / 255 = 5.88, so probabilistic rounding gives 5 or 6
        assert!((0..8).all(|w| (0..300).all(|d| matches!(dst.value_at(w, d), 5 | 6))));
    }

    #[test]
    fn test_exact_strategy_needs_full_depth() {
        let data = vec![7u8; 4 * 16];
        let src = SideMap::dense(&data, 4, 16).unwrap();

        let mut dst = PackedSideBlock::<1>::new(4, 16).unwrap();
        assert_eq!(
            pack_side_block_with_strategy::<6, 1>(&src, &mut dst, RoundingStrategy::Exact),
            Err(PackError::ExactRoundingBelowFullDepth { bits: 6 })
        );
        assert_eq!(dst.position(), 0);

        let mode =
            pack_side_block_with_strategy::<8, 1>(&src, &mut dst, RoundingStrategy::Exact).unwrap();
        assert_eq!(mode, RoundingMode::Exact);
        assert!(dst.data().iter().all(|&v| v == 7));
    }

    #[test]
    #[should_panic(expected = "already written")]
    fn test_rejects_used_block() {
        let data = vec![0u8; 4 * 16];
        let src = SideMap::dense(&data, 4, 16).unwrap();
        let mut dst = PackedSideBlock::<1>::new(4, 16).unwrap();
        dst.seek_forward_n_cells(1);
        pack_side_block::<Exact8, 1>(&src, &mut dst, &mut ExactRounding);
    }
}
