//! Deterministic fixed-point mathematics library.
//!
//! This module provides a Q32.32 fixed-point number and the operations on it,
//! implemented with integer arithmetic only to ensure identical behavior across
//! platforms and architectures. This is critical for multiplayer lockstep
//! networking where all clients must simulate identically.
//!
//! # Layout
//!
//! A [`FixedNum`] is a single `i64` ("raw value") interpreted as `raw / 2^32`:
//! 32 integer bits including the sign and 32 fractional bits. Every bit pattern
//! is a valid finite value; there is no NaN or infinity.
//!
//! # Safe and fast variants
//!
//! Binary operations come in two flavours with explicit names:
//!
//! - `saturating_*`: overflow is detected and clamped to [`FixedNum::MAX`] or
//!   [`FixedNum::MIN`]. The `+`, `-`, `*` operators use these.
//! - `fast_*`: no overflow checks, two's-complement wraparound. Only valid when
//!   the caller knows the operands are far from the representable boundary.
//!
//! # Example
//!
//! ```rust
//! use lockstep_math::fixed_math::FixedNum;
//!
//! let a: FixedNum = "1.5".parse().unwrap();
//! let b = FixedNum::from_int(2);
//! assert_eq!(a * b, FixedNum::from_int(3));
//! assert_eq!(FixedNum::MAX + FixedNum::ONE, FixedNum::MAX);
//! ```

use serde::{Deserialize, Serialize};

pub use error::FixedError;
pub use lut::{warm_up, LookupTables, LUT_SIZE};

mod arith;
mod convert;
mod error;
mod exp_log;
pub mod lut;
pub mod serde_decimal;
mod trig;


pub(crate) const FRACTIONAL_BITS: u32 = 32;
pub(crate) const NUM_BITS: u32 = i64::BITS;
pub(crate) const INTEGER_BITS: u32 = NUM_BITS - FRACTIONAL_BITS;
pub(crate) const ONE_RAW: i64 = 1 << FRACTIONAL_BITS;
pub(crate) const FRACTION_MASK: i64 = ONE_RAW - 1;
pub(crate) const INTEGER_MASK: i64 = !FRACTION_MASK;

pub(crate) const PI_RAW: i64 = 0x3_243F_6A88;
pub(crate) const FRAC_PI_2_RAW: i64 = 0x1_921F_B544;
pub(crate) const TAU_RAW: i64 = 0x6_487E_D511;
pub(crate) const LN_2_RAW: i64 = 0xB172_17F7;
pub(crate) const LOG2_MAX_RAW: i64 = 0x1F_0000_0000;
pub(crate) const LOG2_MIN_RAW: i64 = -0x20_0000_0000;

/// Fixed-point number type used throughout the simulation.
///
/// Uses the Q32.32 format: 32 bits for the integer part, 32 bits for the
/// fractional part. This provides a range of approximately ±2.1 billion with a
/// precision of ~0.00000000023.
///
/// Values are immutable; every operation returns a new value. Serialization
/// writes the raw `i64`, which is bit-exact in every format.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct FixedNum(i64);

impl FixedNum {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(ONE_RAW);
    pub const NEG_ONE: Self = Self(-ONE_RAW);
    pub const MIN: Self = Self(i64::MIN);
    pub const MAX: Self = Self(i64::MAX);
    /// Smallest positive value, 2^-32.
    pub const EPSILON: Self = Self(1);

    pub const PI: Self = Self(PI_RAW);
    pub const FRAC_PI_2: Self = Self(FRAC_PI_2_RAW);
    /// 2π, rounded up by one raw unit so that `TAU > 2 * PI`.
    pub const TAU: Self = Self(TAU_RAW);
    pub const LN_2: Self = Self(LN_2_RAW);
    /// Exponents at or above this make [`FixedNum::pow2`] saturate (31.0).
    pub const LOG2_MAX: Self = Self(LOG2_MAX_RAW);
    /// Exponents at or below this make [`FixedNum::pow2`] underflow to zero (-32.0).
    pub const LOG2_MIN: Self = Self(LOG2_MIN_RAW);

    /// Number of fractional bits in the raw encoding.
    pub const FRACTIONAL_BITS: u32 = FRACTIONAL_BITS;
    /// Number of integer bits, sign included.
    pub const INTEGER_BITS: u32 = INTEGER_BITS;

    /// Decimal fractional digits a float may carry and still take the fast
    /// bit-shift conversion path. Longer fractions go through exact decimal text.
    pub const PRECISION_CUTOFF: u32 = 3;

    /// Fractional digits emitted by `Display`, `floor(log10(2^32))`.
    pub const DECIMAL_DIGITS: u32 = 9;

    /// Wraps a raw Q32.32 value without scaling.
    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// The underlying Q32.32 encoding.
    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Debug for FixedNum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FixedNum({} / {:#x})", self, self.0)
    }
}
