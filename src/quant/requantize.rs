//! Requantization of 8-bit values to a narrower bit depth.

use std::marker::PhantomData;

use super::rounding::{ExactRounding, RoundingMode, RoundingOffsetGenerator};

/// Compile-time quantization policy: a destination bit depth and a rounding
/// offset generator type.
pub trait QuantizationParams {
    const BITS: u32;
    const MAX_VALUE: u8 = ((1u32 << Self::BITS) - 1) as u8;
    type Rounding: RoundingOffsetGenerator;
}

/// The usual [`QuantizationParams`] implementation.
///
/// A bit depth outside `1..=8`, or exact rounding below 8 bits, fails to
/// compile as soon as the parameters are used by a kernel.
///
/// ```
/// use lowpack::quant::requantize;
/// use lowpack::{NearestRounding, Quantization};
///
/// assert_eq!(requantize::<Quantization<4, NearestRounding>>(255, &mut NearestRounding), 15);
/// ```
///
/// Nine bits do not fit the packed byte:
///
/// ```compile_fail
/// use lowpack::quant::requantize;
/// use lowpack::{NearestRounding, Quantization};
///
/// let _ = requantize::<Quantization<9, NearestRounding>>(255, &mut NearestRounding);
/// ```
///
/// Neither does zero:
///
/// ```compile_fail
/// use lowpack::quant::requantize;
/// use lowpack::{XorshiftRounding, Quantization};
///
/// let mut rounding = XorshiftRounding::default();
/// let _ = requantize::<Quantization<0, XorshiftRounding>>(255, &mut rounding);
/// ```
///
/// Exact rounding only exists at 8 bits:
///
/// ```compile_fail
/// use lowpack::quant::requantize;
/// use lowpack::{ExactRounding, Quantization};
///
/// let _ = requantize::<Quantization<4, ExactRounding>>(255, &mut ExactRounding);
/// ```
pub struct Quantization<const BITS: u32, R>(PhantomData<R>);

#[allow(clippy::manual_range_contains)]
impl<const BITS: u32, R: RoundingOffsetGenerator> QuantizationParams for Quantization<BITS, R> {
    const BITS: u32 = {
        assert!(BITS >= 1 && BITS <= 8, "bit depth must be in 1..=8");
        assert!(
            BITS == 8 || !matches!(R::MODE, RoundingMode::Exact),
            "exact rounding needs 8-bit depth"
        );
        BITS
    };
    type Rounding = R;
}

/// Full 8-bit depth: packing copies values unchanged.
pub type Exact8 = Quantization<8, ExactRounding>;

/// Rescales `value` from `[0, 255]` to `[0, 2^BITS - 1]`.
///
/// At 8 bits this is the identity and draws nothing from `rounding`.
/// Otherwise exactly one offset is drawn. `255 * 127 + 254` still fits in
/// 16 bits, so the arithmetic stays in `u16`.
#[inline(always)]
pub fn requantize<Q: QuantizationParams>(value: u8, rounding: &mut Q::Rounding) -> u8 {
    if Q::BITS == 8 {
        return value;
    }
    let scaled = u16::from(value) * u16::from(Q::MAX_VALUE);
    let offset = rounding.next();
    ((scaled + u16::from(offset)) / 255) as u8
}

/// Requantizes `values` left to right, one draw per element below 8 bits.
#[inline]
pub fn requantize_in_place<Q: QuantizationParams>(values: &mut [u8], rounding: &mut Q::Rounding) {
    if Q::BITS == 8 {
        return;
    }
    for v in values.iter_mut() {
        *v = requantize::<Q>(*v, rounding);
    }
}
