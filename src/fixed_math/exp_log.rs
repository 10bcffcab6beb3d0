//! Square root, logarithms and powers.

use super::{
    FixedError, FixedNum, FRACTIONAL_BITS, FRACTION_MASK, LOG2_MAX_RAW, LOG2_MIN_RAW, NUM_BITS,
    ONE_RAW,
};

impl FixedNum {
    /// Square root, rounded to nearest.
    ///
    /// Bit-by-bit extraction in two passes so no intermediate wider than 64
    /// bits is needed: the first pass yields the integer-aligned root, the
    /// second refines the low 16 result bits.
    ///
    /// # Errors
    ///
    /// [`FixedError::OutOfRange`] for negative input.
    pub fn sqrt(self) -> Result<Self, FixedError> {
        if self.0 < 0 {
            return Err(FixedError::OutOfRange("sqrt of a negative value"));
        }
        Ok(self.sqrt_unsigned())
    }

    /// `self` must be non-negative.
    pub(crate) fn sqrt_unsigned(self) -> Self {
        let half_bits = NUM_BITS / 2;

        let mut num = self.0 as u64;
        let mut result: u64 = 0;

        // Second-highest bit, lowered to the highest power of four <= num
        let mut bit: u64 = 1 << (NUM_BITS - 2);
        while bit > num {
            bit >>= 2;
        }

        for pass in 0..2 {
            while bit != 0 {
                if num >= result + bit {
                    num -= result + bit;
                    result = (result >> 1) + bit;
                } else {
                    result >>= 1;
                }
                bit >>= 2;
            }

            if pass == 0 {
                if num > (1u64 << half_bits) - 1 {
                    // num = a - (result + 0.5)^2
                    //     = num + result^2 - (result + 0.5)^2
                    //     = num - result - 0.5
                    num -= result;
                    num = (num << half_bits).wrapping_sub(0x8000_0000);
                    result = (result << half_bits).wrapping_add(0x8000_0000);
                } else {
                    num <<= half_bits;
                    result <<= half_bits;
                }

                bit = 1 << (half_bits - 2);
            }
        }

        // Round up when the next bit would be one
        if num > result {
            result += 1;
        }

        Self(result as i64)
    }

    /// Base-2 logarithm, accurate to about 9 decimal places.
    ///
    /// The input is normalised into `[1, 2)` by shifting, which gives the
    /// integer part; each fractional bit is then read off by squaring.
    ///
    /// # Errors
    ///
    /// [`FixedError::OutOfRange`] for zero or negative input.
    pub fn log2(self) -> Result<Self, FixedError> {
        if self.0 <= 0 {
            return Err(FixedError::OutOfRange("log of a non-positive value"));
        }
        Ok(self.log2_positive())
    }

    /// `self` must be positive.
    pub(crate) fn log2_positive(self) -> Self {
        let mut b: i64 = 1 << (FRACTIONAL_BITS - 1);
        let mut y: i64 = 0;

        let mut raw = self.0;
        while raw < ONE_RAW {
            raw <<= 1;
            y -= ONE_RAW;
        }
        while raw >= (ONE_RAW << 1) {
            raw >>= 1;
            y += ONE_RAW;
        }

        let mut z = Self(raw);
        for _ in 0..FRACTIONAL_BITS {
            z = z.fast_mul(z);
            if z.0 >= (ONE_RAW << 1) {
                z = Self(z.0 >> 1);
                y += b;
            }
            b >>= 1;
        }

        Self(y)
    }

    /// Natural logarithm, `log2(x) * ln 2`.
    ///
    /// # Errors
    ///
    /// [`FixedError::OutOfRange`] for zero or negative input.
    pub fn ln(self) -> Result<Self, FixedError> {
        Ok(self.log2()?.fast_mul(Self::LN_2))
    }

    /// 2 raised to `self`, accurate to at least 6 decimal places.
    ///
    /// The fractional part of the exponent is evaluated as the series
    /// `Σ (x·ln2)^n / n!` until a term vanishes; the integer part is applied as
    /// a shift. Negative exponents take the reciprocal. Exponents at or above
    /// [`FixedNum::LOG2_MAX`] saturate to `MAX`, at or below
    /// [`FixedNum::LOG2_MIN`] to zero.
    pub fn pow2(self) -> Self {
        if self.0 == 0 {
            return Self::ONE;
        }
        if self.0 >= LOG2_MAX_RAW {
            return Self::MAX;
        }
        if self.0 <= LOG2_MIN_RAW {
            return Self::ZERO;
        }

        // 2^-x = 1 / 2^x
        let negative = self.0 < 0;
        let x = if negative { -self } else { self };

        if x == Self::ONE {
            return if negative {
                Self(ONE_RAW >> 1)
            } else {
                Self(ONE_RAW << 1)
            };
        }

        if x.0 >= LOG2_MAX_RAW {
            return Self::ONE.div_nonzero(Self::MAX);
        }

        let integer_part = x.to_i32();
        let x = Self(x.0 & FRACTION_MASK);

        let mut result = Self::ONE;
        let mut term = Self::ONE;
        let mut i = 1;
        while term.0 != 0 {
            term = x.fast_mul(term).fast_mul(Self::LN_2).div_nonzero(Self::from_int(i));
            result += term;
            i += 1;
        }

        // Series rounding can push exponents just below 31 past the top
        let result = if result.0 > (i64::MAX >> integer_part) {
            Self::MAX
        } else {
            Self(result.0 << integer_part)
        };
        if negative {
            Self::ONE.div_nonzero(result)
        } else {
            result
        }
    }

    /// `self` raised to `exponent`, computed as `pow2(exponent * log2(self))`.
    /// Accurate to about 5 significant digits.
    ///
    /// # Errors
    ///
    /// [`FixedError::DivideByZero`] for a zero base with a negative exponent,
    /// [`FixedError::OutOfRange`] for a negative base with a non-zero exponent.
    pub fn pow(self, exponent: Self) -> Result<Self, FixedError> {
        if self == Self::ONE || exponent.0 == 0 {
            return Ok(Self::ONE);
        }

        if self.0 == 0 {
            if exponent.0 < 0 {
                return Err(FixedError::DivideByZero);
            }
            return Ok(Self::ZERO);
        }

        let log2 = self.log2()?;
        Ok((exponent * log2).pow2())
    }
}
