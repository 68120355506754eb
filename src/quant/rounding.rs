//! Rounding offset generators.
//!
//! Requantizing `v` to `b` bits computes `(v * (2^b - 1) + offset) / 255`.
//! The offset decides the rounding: a constant 127 rounds to nearest, a
//! sequence spread over `[0, 254]` rounds probabilistically so that the
//! rounding error averages out along the depth of the multiply.
//!
//! Generators are stateful and consumed one offset per requantized element,
//! in the packing order. Two generators built the same way produce the same
//! sequence.

use std::str::FromStr;

use crate::error::PackError;

/// Below this depth the rounding error of nearest rounding stays small, so
/// the adaptive strategies only switch to probabilistic rounding above it.
pub const PROBABILISTIC_ROUNDING_THRESHOLD: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundingMode {
    /// No requantization at all. Only legal with 8-bit depth.
    Exact,
    Nearest,
    ProbabilisticXorshift,
    ProbabilisticAddmod,
}

/// A deterministic source of rounding offsets in `[0, 254]`.
pub trait RoundingOffsetGenerator: Default {
    const MODE: RoundingMode;

    /// Returns the next offset and advances the state.
    fn next(&mut self) -> u8;

    /// Restores the state the generator had when it was built.
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Stands in for a generator when the bit depth is 8 and nothing is rounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExactRounding;

impl RoundingOffsetGenerator for ExactRounding {
    const MODE: RoundingMode = RoundingMode::Exact;

    // Never drawn: exact quantization is rejected below 8 bits.
    fn next(&mut self) -> u8 {
        0
    }
}

/// Always the midpoint, i.e. round to nearest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NearestRounding;

impl RoundingOffsetGenerator for NearestRounding {
    const MODE: RoundingMode = RoundingMode::Nearest;

    #[inline(always)]
    fn next(&mut self) -> u8 {
        127
    }
}

/// 8-bit Xorshift(7, 5, 3).
///
/// Xorshift visits every *nonzero* byte exactly once per period of 255, so
/// subtracting one gives a uniform offset in `[0, 254]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XorshiftRounding {
    x: u8,
}

impl Default for XorshiftRounding {
    fn default() -> Self {
        Self { x: 128 }
    }
}

impl RoundingOffsetGenerator for XorshiftRounding {
    const MODE: RoundingMode = RoundingMode::ProbabilisticXorshift;

    #[inline(always)]
    fn next(&mut self) -> u8 {
        let result = self.x - 1;
        self.x ^= self.x << 7;
        self.x ^= self.x >> 5;
        self.x ^= self.x << 3;
        result
    }
}

/// Additive low-discrepancy sequence `x += 97 (mod 255)`.
///
/// 97 is coprime with 255, so the period is full, and 97/255 is close to
/// 0.38 which keeps the discrepancy low. Adding one extra when the sum would
/// cross 255 skips 255 itself, which is the `% 255` without a division.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddmodRounding {
    x: u8,
}

impl AddmodRounding {
    const ADD: u8 = 97;
}

impl Default for AddmodRounding {
    fn default() -> Self {
        // must start nonzero
        Self { x: 1 }
    }
}

impl RoundingOffsetGenerator for AddmodRounding {
    const MODE: RoundingMode = RoundingMode::ProbabilisticAddmod;

    #[inline(always)]
    fn next(&mut self) -> u8 {
        let skip = u8::from(self.x >= 255 - Self::ADD);
        self.x = self.x.wrapping_add(Self::ADD + skip);
        self.x
    }
}

/// Runtime choice of rounding, possibly depending on the depth of the
/// multiply the packed operand is used in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundingStrategy {
    Exact,
    Nearest,
    ProbabilisticXorshift,
    ProbabilisticAddmod,
    NearestIfSmallXorshiftIfLarge,
    NearestIfSmallAddmodIfLarge,
}

impl RoundingStrategy {
    /// Resolves the strategy for a reduction of length `depth`.
    pub fn choose(self, depth: usize) -> RoundingMode {
        let large = depth >= PROBABILISTIC_ROUNDING_THRESHOLD;
        match self {
            RoundingStrategy::Exact => RoundingMode::Exact,
            RoundingStrategy::Nearest => RoundingMode::Nearest,
            RoundingStrategy::ProbabilisticXorshift => RoundingMode::ProbabilisticXorshift,
            RoundingStrategy::ProbabilisticAddmod => RoundingMode::ProbabilisticAddmod,
            RoundingStrategy::NearestIfSmallXorshiftIfLarge if large => {
                RoundingMode::ProbabilisticXorshift
            }
            RoundingStrategy::NearestIfSmallAddmodIfLarge if large => {
                RoundingMode::ProbabilisticAddmod
            }
            RoundingStrategy::NearestIfSmallXorshiftIfLarge
            | RoundingStrategy::NearestIfSmallAddmodIfLarge => RoundingMode::Nearest,
        }
    }
}

impl FromStr for RoundingStrategy {
    type Err = PackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "nearest" => Ok(Self::Nearest),
            "xorshift" | "probabilistic-xorshift" => Ok(Self::ProbabilisticXorshift),
            "addmod" | "probabilistic-addmod" => Ok(Self::ProbabilisticAddmod),
            "nearest-if-small-xorshift-if-large" => Ok(Self::NearestIfSmallXorshiftIfLarge),
            "nearest-if-small-addmod-if-large" => Ok(Self::NearestIfSmallAddmodIfLarge),
            other => Err(PackError::UnknownRounding(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period<G: RoundingOffsetGenerator>(draws: usize) -> Vec<u8> {
        let mut g = G::default();
        (0..draws).map(|_| g.next()).collect()
    }

    #[test]
    fn test_xorshift_covers_all_offsets_once_per_period() {
        let mut seen = period::<XorshiftRounding>(255);
        assert_eq!(seen[0], 127, "first offset is the seed minus one");
        seen.sort_unstable();
        let expected: Vec<u8> = (0..=254).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_xorshift_is_periodic() {
        let seq = period::<XorshiftRounding>(510);
        assert_eq!(seq[..255], seq[255..]);
    }

    #[test]
    fn test_addmod_sequence() {
        let seq = period::<AddmodRounding>(4);
        // 1 + 97, 98 + 97, 195 + 98 - 256, 37 + 97
        assert_eq!(seq, vec![98, 195, 37, 134]);
    }

    #[test]
    fn test_addmod_covers_all_offsets_once_per_period() {
        let mut seen = period::<AddmodRounding>(255);
        assert!(seen.iter().all(|&o| o != 255));
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 255);
    }

    #[test]
    fn test_nearest_is_constant() {
        assert!(period::<NearestRounding>(64).iter().all(|&o| o == 127));
    }

    #[test]
    fn test_reset_restarts_sequence() {
        let mut g = XorshiftRounding::default();
        let first: Vec<u8> = (0..10).map(|_| g.next()).collect();
        g.reset();
        let again: Vec<u8> = (0..10).map(|_| g.next()).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn test_strategy_choose() {
        let s = RoundingStrategy::NearestIfSmallAddmodIfLarge;
        assert_eq!(s.choose(255), RoundingMode::Nearest);
        assert_eq!(s.choose(256), RoundingMode::ProbabilisticAddmod);
        assert_eq!(
            RoundingStrategy::NearestIfSmallXorshiftIfLarge.choose(4096),
            RoundingMode::ProbabilisticXorshift
        );
        assert_eq!(RoundingStrategy::Nearest.choose(1 << 20), RoundingMode::Nearest);
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!(
            "Xorshift".parse::<RoundingStrategy>(),
            Ok(RoundingStrategy::ProbabilisticXorshift)
        );
        assert_eq!(
            " nearest-if-small-addmod-if-large ".parse::<RoundingStrategy>(),
            Ok(RoundingStrategy::NearestIfSmallAddmodIfLarge)
        );
        assert_eq!(
            "stochastic".parse::<RoundingStrategy>(),
            Err(PackError::UnknownRounding("stochastic".to_string()))
        );
    }
}
