//! Quantization policy: destination bit depth and rounding.
//!
//! - `requantize`: the per-element rescale from `[0, 255]` to `[0, 2^bits - 1]`
//! - `rounding`: the rounding offset generators and runtime strategies

pub mod requantize;
pub mod rounding;

pub use requantize::{Exact8, Quantization, QuantizationParams, requantize, requantize_in_place};
pub use rounding::{
    AddmodRounding, ExactRounding, NearestRounding, RoundingMode, RoundingOffsetGenerator,
    RoundingStrategy, XorshiftRounding,
};
