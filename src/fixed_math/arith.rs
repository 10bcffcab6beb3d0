//! Saturating and fast arithmetic on [`FixedNum`].
//!
//! The saturating variants detect overflow with sign-bit tests on the raw
//! values and clamp to [`FixedNum::MAX`] / [`FixedNum::MIN`]. The fast variants
//! skip the tests and wrap.

use std::ops::{
    Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Rem, RemAssign, Sub, SubAssign,
};

use super::{FixedError, FixedNum, FRACTIONAL_BITS, FRACTION_MASK, INTEGER_MASK, NUM_BITS, ONE_RAW};

/// Adds `y` to `x`, flagging when the sign bit of the sum disagrees with the
/// operand signs.
#[inline]
fn add_tracking_overflow(x: i64, y: i64, overflow: &mut bool) -> i64 {
    let sum = x.wrapping_add(y);
    *overflow |= ((x ^ y ^ sum) & i64::MIN) != 0;
    sum
}

/// Splits a raw value into (unsigned fractional bits, signed integer part).
#[inline]
fn split(raw: i64) -> (u64, i64) {
    ((raw & FRACTION_MASK) as u64, raw >> FRACTIONAL_BITS)
}

impl FixedNum {
    /// Addition clamped to `MIN`/`MAX` on overflow.
    #[inline]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        let x = self.0;
        let y = rhs.0;
        let sum = x.wrapping_add(y);
        // Operands share a sign and the sum's sign differs from it
        if (!(x ^ y) & (x ^ sum) & i64::MIN) != 0 {
            return if x > 0 { Self::MAX } else { Self::MIN };
        }
        Self(sum)
    }

    /// Addition without overflow check. Wraps near the boundary.
    #[inline]
    pub const fn fast_add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }

    /// Subtraction clamped to `MIN`/`MAX` on overflow.
    #[inline]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        let x = self.0;
        let y = rhs.0;
        let diff = x.wrapping_sub(y);
        // Operands differ in sign and the difference's sign differs from x
        if ((x ^ y) & (x ^ diff) & i64::MIN) != 0 {
            return if x < 0 { Self::MIN } else { Self::MAX };
        }
        Self(diff)
    }

    /// Subtraction without overflow check. Wraps near the boundary.
    #[inline]
    pub const fn fast_sub(self, rhs: Self) -> Self {
        Self(self.0.wrapping_sub(rhs.0))
    }

    /// Negation; `-MIN` has no counterpart and yields `MAX`.
    #[inline]
    pub const fn saturating_neg(self) -> Self {
        if self.0 == i64::MIN {
            Self::MAX
        } else {
            Self(-self.0)
        }
    }

    /// Multiplication clamped to `MIN`/`MAX` on overflow.
    ///
    /// The product is assembled from four 32x32 partial products so no wider
    /// intermediate is needed. The result is rounded toward negative infinity.
    pub fn saturating_mul(self, rhs: Self) -> Self {
        let x = self.0;
        let y = rhs.0;

        let signs_equal = ((x ^ y) & i64::MIN) == 0;

        let (x_frac, x_int) = split(x);
        let (y_frac, y_int) = split(y);

        let int_int = x_int * y_int;

        // High half of the integer product must be a sign extension
        let top_carry = int_int >> FRACTIONAL_BITS;
        if top_carry != 0 && top_carry != -1 {
            return if signs_equal { Self::MAX } else { Self::MIN };
        }

        let frac_frac = ((x_frac * y_frac) >> FRACTIONAL_BITS) as i64;
        let mid_1 = x_frac as i64 * y_int;
        let mid_2 = x_int * y_frac as i64;
        let int_int = int_int << FRACTIONAL_BITS;

        let mut overflow = false;
        let mut sum = add_tracking_overflow(frac_frac, mid_1, &mut overflow);
        sum = add_tracking_overflow(sum, mid_2, &mut overflow);
        sum = add_tracking_overflow(sum, int_int, &mut overflow);

        if signs_equal {
            if sum < 0 || (overflow && x > 0) {
                return Self::MAX;
            }
        } else if sum > 0 {
            return Self::MIN;
        }

        // Opposite signs, both magnitudes above one: the product must be below
        // the negative operand
        if !signs_equal {
            let (pos_op, neg_op) = if x > y { (x, y) } else { (y, x) };
            if sum > neg_op && neg_op < -ONE_RAW && pos_op > ONE_RAW {
                return Self::MIN;
            }
        }

        Self(sum)
    }

    /// Multiplication without overflow checks. Wraps near the boundary.
    pub fn fast_mul(self, rhs: Self) -> Self {
        let (x_frac, x_int) = split(self.0);
        let (y_frac, y_int) = split(rhs.0);

        let frac_frac = ((x_frac * y_frac) >> FRACTIONAL_BITS) as i64;
        let mid_1 = (x_frac as i64).wrapping_mul(y_int);
        let mid_2 = x_int.wrapping_mul(y_frac as i64);
        let int_int = x_int.wrapping_mul(y_int) << FRACTIONAL_BITS;

        Self(
            frac_frac
                .wrapping_add(mid_1)
                .wrapping_add(mid_2)
                .wrapping_add(int_int),
        )
    }

    /// Division rounded to nearest (ties away from zero), saturating on
    /// overflow.
    ///
    /// # Errors
    ///
    /// [`FixedError::DivideByZero`] when `rhs` is zero and `self` is not.
    pub fn checked_div(self, rhs: Self) -> Result<Self, FixedError> {
        if self.0 == 0 {
            return Ok(Self::ZERO);
        }
        if rhs.0 == 0 {
            return Err(FixedError::DivideByZero);
        }
        Ok(self.div_nonzero(rhs))
    }

    /// Bit-by-bit unsigned long division over the magnitudes. `rhs` must be
    /// non-zero.
    pub(crate) fn div_nonzero(self, rhs: Self) -> Self {
        let x = self.0;
        let y = rhs.0;
        if x == 0 {
            return Self::ZERO;
        }

        let signs_differ = ((x ^ y) & i64::MIN) != 0;
        let saturated = if signs_differ { Self::MIN } else { Self::MAX };

        let mut remainder = x.unsigned_abs();
        let mut divider = y.unsigned_abs();
        let mut quotient: u64 = 0;
        // One extra bit below the fraction for rounding
        let mut bit_pos = (NUM_BITS / 2 + 1) as i32;

        // Strip trailing zero nibbles from the divider
        while divider & 0xF == 0 && bit_pos >= 4 {
            divider >>= 4;
            bit_pos -= 4;
        }

        while remainder != 0 && bit_pos >= 0 {
            let shift = (remainder.leading_zeros() as i32).min(bit_pos);
            remainder <<= shift;
            bit_pos -= shift;

            let div = remainder / divider;
            remainder %= divider;
            quotient = quotient.wrapping_add(div << bit_pos);

            if div & !(u64::MAX >> bit_pos) != 0 {
                return saturated;
            }

            remainder <<= 1;
            bit_pos -= 1;
        }

        // Round half up on the extra bit
        quotient = quotient.wrapping_add(1);
        let magnitude = (quotient >> 1) as i64;
        Self(if signs_differ { -magnitude } else { magnitude })
    }

    /// Remainder with the sign of `self`. `MIN % -EPSILON` is defined as zero.
    ///
    /// # Errors
    ///
    /// [`FixedError::DivideByZero`] when `rhs` is zero.
    pub fn checked_rem(self, rhs: Self) -> Result<Self, FixedError> {
        if rhs.0 == 0 {
            return Err(FixedError::DivideByZero);
        }
        Ok(Self(self.0.wrapping_rem(rhs.0)))
    }

    /// Unguarded remainder. Panics on a zero divisor and overflows (panics)
    /// for `MIN % -EPSILON`.
    #[inline]
    pub fn fast_rem(self, rhs: Self) -> Self {
        Self(self.0 % rhs.0)
    }

    /// Absolute value; `abs(MIN)` yields `MAX`.
    #[inline]
    pub const fn abs(self) -> Self {
        if self.0 == i64::MIN {
            return Self::MAX;
        }
        self.fast_abs()
    }

    /// Branchless absolute value. Wraps for `MIN`.
    #[inline]
    pub const fn fast_abs(self) -> Self {
        let mask = self.0 >> (NUM_BITS - 1);
        Self(self.0.wrapping_add(mask) ^ mask)
    }

    /// -1, 0 or 1.
    #[inline]
    pub const fn signum(self) -> i32 {
        if self.0 < 0 {
            -1
        } else if self.0 > 0 {
            1
        } else {
            0
        }
    }

    /// Largest integer not greater than `self`.
    #[inline]
    pub const fn floor(self) -> Self {
        Self(self.0 & INTEGER_MASK)
    }

    /// Smallest integer not less than `self`, saturating at the top of the range.
    #[inline]
    pub const fn ceil(self) -> Self {
        if self.0 & FRACTION_MASK != 0 {
            self.floor().saturating_add(Self::ONE)
        } else {
            self
        }
    }

    /// Nearest integer; exact halves go to the even neighbour.
    pub const fn round(self) -> Self {
        let fractional = self.0 & FRACTION_MASK;
        let integral = self.floor();
        let half = 1i64 << (FRACTIONAL_BITS - 1);

        if fractional < half {
            return integral;
        }
        if fractional > half {
            return integral.saturating_add(Self::ONE);
        }

        if integral.0 & ONE_RAW == 0 {
            integral
        } else {
            integral.saturating_add(Self::ONE)
        }
    }

    /// Integer part, rounded toward zero.
    #[inline]
    pub const fn trunc(self) -> Self {
        if self.0 < 0 && self.0 & FRACTION_MASK != 0 {
            self.floor().saturating_add(Self::ONE)
        } else {
            self.floor()
        }
    }

    /// Fractional part, always in `[0, 1)`.
    #[inline]
    pub const fn fract(self) -> Self {
        Self(self.0 & FRACTION_MASK)
    }
}

impl Add for FixedNum {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.saturating_add(rhs)
    }
}

impl Sub for FixedNum {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.saturating_sub(rhs)
    }
}

impl Mul for FixedNum {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.saturating_mul(rhs)
    }
}

impl Div for FixedNum {
    type Output = Self;

    /// # Panics
    ///
    /// Panics when dividing a non-zero value by zero, like integer division.
    /// Use [`FixedNum::checked_div`] to handle that case.
    #[inline]
    fn div(self, rhs: Self) -> Self {
        match self.checked_div(rhs) {
            Ok(quotient) => quotient,
            Err(_) => panic!("attempt to divide by zero"),
        }
    }
}

impl Rem for FixedNum {
    type Output = Self;

    /// # Panics
    ///
    /// Panics when `rhs` is zero, like integer remainder.
    #[inline]
    fn rem(self, rhs: Self) -> Self {
        match self.checked_rem(rhs) {
            Ok(remainder) => remainder,
            Err(_) => panic!("attempt to calculate the remainder with a divisor of zero"),
        }
    }
}

impl Neg for FixedNum {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        self.saturating_neg()
    }
}

impl AddAssign for FixedNum {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for FixedNum {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for FixedNum {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl DivAssign for FixedNum {
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl RemAssign for FixedNum {
    fn rem_assign(&mut self, rhs: Self) {
        *self = *self % rhs;
    }
}
