//! Property-based tests for requantization and packing.
//!
//! - requantized values stay in range and keep their order
//! - 8-bit packing is a pure permutation of the source
//! - column sums equal the sums of the packed bytes
//! - every kernel produces the same bytes as the scalar kernel

use proptest::prelude::*;

use lowpack::{
    Exact8, NearestRounding, PackKernel, PackedSideBlock, Quantization, QuantizationParams,
    RoundingMode, RoundingOffsetGenerator, SideMap, XorshiftRounding,
    pack_side_block_with_kernel,
};
use lowpack::quant::requantize;

/// A generator that always returns the same offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FixedOffset(u8);

impl RoundingOffsetGenerator for FixedOffset {
    const MODE: RoundingMode = RoundingMode::Nearest;

    fn next(&mut self) -> u8 {
        self.0
    }
}

fn arb_side() -> impl Strategy<Value = (usize, usize, Vec<u8>)> {
    (1usize..40, 1usize..80).prop_flat_map(|(width, depth)| {
        (
            Just(width),
            Just(depth),
            prop::collection::vec(any::<u8>(), width * depth),
        )
    })
}

fn pack<Q: QuantizationParams, const CELLS: usize>(
    kernel: PackKernel,
    width: usize,
    depth: usize,
    data: &[u8],
) -> PackedSideBlock<CELLS> {
    let src = SideMap::dense(data, width, depth).unwrap();
    let mut dst = PackedSideBlock::<CELLS>::new(width, depth).unwrap();
    pack_side_block_with_kernel::<Q, CELLS>(kernel, &src, &mut dst, &mut Q::Rounding::default());
    dst
}

proptest! {
    #[test]
    fn prop_identity_at_full_depth(v in any::<u8>()) {
        let mut rounding = XorshiftRounding::default();
        prop_assert_eq!(requantize::<Quantization<8, XorshiftRounding>>(v, &mut rounding), v);
        prop_assert_eq!(rounding, XorshiftRounding::default());
    }

    #[test]
    fn prop_range_bound(v in any::<u8>(), offset in 0u8..=254) {
        let mut r = FixedOffset(offset);
        prop_assert!(requantize::<Quantization<1, FixedOffset>>(v, &mut r) <= 1);
        prop_assert!(requantize::<Quantization<3, FixedOffset>>(v, &mut r) <= 7);
        prop_assert!(requantize::<Quantization<5, FixedOffset>>(v, &mut r) <= 31);
        prop_assert!(requantize::<Quantization<7, FixedOffset>>(v, &mut r) <= 127);
    }

    #[test]
    fn prop_monotonic_for_any_fixed_offset(
        a in any::<u8>(),
        b in any::<u8>(),
        offset in 0u8..=254,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let mut r = FixedOffset(offset);
        type Q2 = Quantization<2, FixedOffset>;
        prop_assert!(requantize::<Q2>(lo, &mut r) <= requantize::<Q2>(hi, &mut r));
    }

    #[test]
    fn prop_monotonic(a in any::<u8>(), b in any::<u8>()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let mut r = NearestRounding;
        type Q4 = Quantization<4, NearestRounding>;
        type Q6 = Quantization<6, NearestRounding>;
        prop_assert!(requantize::<Q4>(lo, &mut r) <= requantize::<Q4>(hi, &mut r));
        prop_assert!(requantize::<Q6>(lo, &mut r) <= requantize::<Q6>(hi, &mut r));
    }

    #[test]
    fn prop_full_depth_packing_is_a_permutation((width, depth, data) in arb_side()) {
        let packed = pack::<Exact8, 2>(PackKernel::Scalar, width, depth, &data);
        for w in 0..width {
            for d in 0..depth {
                prop_assert_eq!(packed.value_at(w, d), data[w * depth + d]);
            }
        }
        let mut packed_sorted: Vec<u8> = packed.data().to_vec();
        let mut padded: Vec<u8> = data.clone();
        padded.resize(packed_sorted.len(), 0);
        packed_sorted.sort_unstable();
        padded.sort_unstable();
        prop_assert_eq!(packed_sorted, padded);
    }

    #[test]
    fn prop_sums_match_packed_bytes((width, depth, data) in arb_side()) {
        let packed = pack::<Quantization<4, XorshiftRounding>, 3>(
            PackKernel::detect(),
            width,
            depth,
            &data,
        );
        for w in 0..packed.padded_width() {
            let column: i32 = (0..packed.padded_depth())
                .map(|d| i32::from(packed.value_at(w, d)))
                .sum();
            prop_assert_eq!(packed.sums_of_each_slice()[w], column);
        }
    }

    #[test]
    fn prop_kernels_match_scalar((width, depth, data) in arb_side()) {
        let reference =
            pack::<Quantization<5, XorshiftRounding>, 1>(PackKernel::Scalar, width, depth, &data);
        for kernel in PackKernel::available() {
            let packed = pack::<Quantization<5, XorshiftRounding>, 1>(kernel, width, depth, &data);
            prop_assert_eq!(packed.data(), reference.data());
            prop_assert_eq!(packed.sums_of_each_slice(), reference.sums_of_each_slice());
        }

        let reference = pack::<Exact8, 3>(PackKernel::Scalar, width, depth, &data);
        for kernel in PackKernel::available() {
            let packed = pack::<Exact8, 3>(kernel, width, depth, &data);
            prop_assert_eq!(packed.data(), reference.data());
        }
    }
}
