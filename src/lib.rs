//! Packing of 8-bit GEMM operands for low-precision matrix multiplication.
//!
//! Before a quantized GEMM can run its inner kernel, each operand has to be
//! rearranged into the small tiles that kernel reads, optionally rescaled to
//! fewer than 8 bits, and summed per column so the zero point can be
//! corrected afterwards. This crate does that step with an SSE4.1 kernel and
//! a scalar kernel that produces the same bytes.
//!
//! ## Usage
//!
//! ```
//! use lowpack::{Exact8, ExactRounding, PackedSideBlock, SideMap, pack_side_block};
//!
//! // 12 columns of depth 64, each column contiguous
//! let data: Vec<u8> = (0..12 * 64).map(|i| i as u8).collect();
//! let src = SideMap::dense(&data, 12, 64).unwrap();
//!
//! let mut packed = PackedSideBlock::<3>::new(12, 64).unwrap();
//! pack_side_block::<Exact8, 3>(&src, &mut packed, &mut ExactRounding);
//!
//! assert_eq!(packed.value_at(5, 40), data[5 * 64 + 40]);
//! ```
//!
//! Requantizing to fewer bits with a depth-dependent rounding:
//!
//! ```
//! use lowpack::{PackedSideBlock, RoundingStrategy, SideMap, pack_side_block_with_strategy};
//!
//! let data = vec![200u8; 8 * 512];
//! let src = SideMap::dense(&data, 8, 512).unwrap();
//! let mut packed = PackedSideBlock::<2>::new(8, 512).unwrap();
//!
//! let strategy: RoundingStrategy = "nearest-if-small-addmod-if-large".parse().unwrap();
//! pack_side_block_with_strategy::<5, 2>(&src, &mut packed, strategy).unwrap();
//! assert!(packed.data().iter().all(|&v| v <= 31));
//! ```
//!
//! ## What's inside
//!
//! - 4x2 width-major cells, `CELLS` of them side by side per kernel width
//! - SSE4.1 register-block kernel, plus a bit-identical scalar kernel
//! - Requantization to 1..=8 bits with nearest, Xorshift or add/mod rounding
//! - Per-column sums for zero-point correction

pub mod blocked;
pub mod error;
pub mod kernels;
pub mod layout;
pub mod quant;

pub use blocked::pack_side::{
    pack_side_block, pack_side_block_with_kernel, pack_side_block_with_strategy,
};
pub use error::{PackError, Result};
pub use kernels::PackKernel;
pub use layout::{PackedSideBlock, SideMap};
pub use quant::{
    AddmodRounding, Exact8, ExactRounding, NearestRounding, Quantization, QuantizationParams,
    RoundingMode, RoundingOffsetGenerator, RoundingStrategy, XorshiftRounding,
};

/// Packs one register block: `src` must be exactly `4 * CELLS` columns by
/// 16 depth positions.
///
/// Picks the fastest kernel for your CPU (SSE4.1 > scalar). Column sums are
/// added at `start_width..start_width + 4 * CELLS` and the cursor of `dst`
/// moves past the block.
///
/// # Panics
///
/// Panics if the block has the wrong shape or `dst` has no room for it.
pub fn pack_register_block<Q: QuantizationParams, const CELLS: usize>(
    src: &SideMap<'_>,
    dst: &mut PackedSideBlock<CELLS>,
    start_width: usize,
    rounding: &mut Q::Rounding,
) {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("sse4.1") {
            unsafe {
                kernels::pack_sse::pack_register_block_sse41::<Q, CELLS>(
                    src,
                    dst,
                    start_width,
                    rounding,
                )
            };
            return;
        }
    }

    kernels::pack_scalar::pack_register_block_scalar::<Q, CELLS>(src, dst, start_width, rounding);
}
