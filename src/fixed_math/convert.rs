//! Construction from and extraction to other numeric types and decimal text.
//!
//! Integer conversions are exact shifts. Floats and decimals use a dual path:
//! values with at most [`FixedNum::PRECISION_CUTOFF`] fractional digits are
//! scaled directly, anything finer is routed through exact decimal text so the
//! rounding error does not compound.

use std::fmt;
use std::str::FromStr;

use fixed::types::I32F32;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::{FixedError, FixedNum, FRACTIONAL_BITS, FRACTION_MASK, INTEGER_BITS, ONE_RAW};

const CUTOFF_SCALE: i64 = 10i64.pow(FixedNum::PRECISION_CUTOFF);
const DECIMAL_SCALE: u64 = 10u64.pow(FixedNum::DECIMAL_DIGITS);

/// Longest digit string that always fits in a `u64`.
const MAX_FRACTION_DIGITS: usize = 19;

/// Largest integer magnitude of a literal (the magnitude of `MIN`).
const MAX_INTEGER_MAGNITUDE: u64 = 1 << (INTEGER_BITS - 1);

/// 2^31 as a float; inputs at or beyond it saturate.
const RANGE_LIMIT_F64: f64 = MAX_INTEGER_MAGNITUDE as f64;
const RANGE_LIMIT_F32: f32 = MAX_INTEGER_MAGNITUDE as f32;

impl FixedNum {
    /// Exact conversion from a 32-bit integer.
    #[inline]
    pub const fn from_int(value: i32) -> Self {
        Self((value as i64) << FRACTIONAL_BITS)
    }

    /// Conversion from a 64-bit integer, saturating outside the integer range.
    #[inline]
    pub const fn from_i64(value: i64) -> Self {
        if value > i32::MAX as i64 {
            Self::MAX
        } else if value < i32::MIN as i64 {
            Self::MIN
        } else {
            Self(value << FRACTIONAL_BITS)
        }
    }

    /// Integer part, rounded toward negative infinity.
    #[inline]
    pub const fn to_i64(self) -> i64 {
        self.0 >> FRACTIONAL_BITS
    }

    /// Integer part, rounded toward negative infinity. Always fits.
    #[inline]
    pub const fn to_i32(self) -> i32 {
        (self.0 >> FRACTIONAL_BITS) as i32
    }

    /// Converts a `f64`.
    ///
    /// NaN maps to zero and values beyond ±2^31 saturate. Values with more than
    /// [`FixedNum::PRECISION_CUTOFF`] fractional digits are converted through
    /// their shortest decimal representation.
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        if value >= RANGE_LIMIT_F64 {
            return Self::MAX;
        }
        if value < -RANGE_LIMIT_F64 {
            return Self::MIN;
        }

        if (value * CUTOFF_SCALE as f64) % 1.0 != 0.0 {
            if let Ok(exact) = Self::parse_decimal(&value.to_string()) {
                return exact;
            }
        }

        Self((value * ONE_RAW as f64) as i64)
    }

    /// Converts a `f32` with the same policy as [`FixedNum::from_f64`].
    pub fn from_f32(value: f32) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        if value >= RANGE_LIMIT_F32 {
            return Self::MAX;
        }
        if value < -RANGE_LIMIT_F32 {
            return Self::MIN;
        }

        if (value * CUTOFF_SCALE as f32) % 1.0 != 0.0 {
            if let Ok(exact) = Self::parse_decimal(&value.to_string()) {
                return exact;
            }
        }

        Self((f64::from(value) * ONE_RAW as f64) as i64)
    }

    /// Converts an arbitrary-precision decimal with the same policy as
    /// [`FixedNum::from_f64`].
    pub fn from_decimal(value: Decimal) -> Self {
        let limit = Decimal::from(MAX_INTEGER_MAGNITUDE);
        if value >= limit {
            return Self::MAX;
        }
        if value < -limit {
            return Self::MIN;
        }

        if (value * Decimal::from(CUTOFF_SCALE)) % Decimal::ONE != Decimal::ZERO {
            if let Ok(exact) = Self::parse_decimal(&value.to_string()) {
                return exact;
            }
        }

        let scaled = (value * Decimal::from(ONE_RAW)).trunc();
        Self(scaled.to_i64().unwrap_or(if value.is_sign_negative() {
            i64::MIN
        } else {
            i64::MAX
        }))
    }

    /// Approximate conversion by division; does not round-trip in general.
    #[inline]
    pub fn to_f64_fast(self) -> f64 {
        self.0 as f64 / ONE_RAW as f64
    }

    /// Approximate conversion by division; does not round-trip in general.
    #[inline]
    pub fn to_f32_fast(self) -> f32 {
        (self.0 as f64 / ONE_RAW as f64) as f32
    }

    /// Exact division of the raw value by 2^32.
    pub fn to_decimal_fast(self) -> Decimal {
        Decimal::from(self.0) / Decimal::from(ONE_RAW)
    }

    /// Converts through the decimal text form, parsed by `f64`'s own parser.
    pub fn to_f64(self) -> f64 {
        self.to_string()
            .parse()
            .unwrap_or_else(|_| self.to_f64_fast())
    }

    /// Converts through the decimal text form, parsed by `f32`'s own parser.
    pub fn to_f32(self) -> f32 {
        self.to_string()
            .parse()
            .unwrap_or_else(|_| self.to_f32_fast())
    }

    /// Converts through the decimal text form, parsed by `Decimal`'s own parser.
    pub fn to_decimal(self) -> Decimal {
        Decimal::from_str(&self.to_string()).unwrap_or_else(|_| self.to_decimal_fast())
    }

    /// Parses a decimal literal such as `"-12.375"`.
    ///
    /// Grammar: optional sign, integer digits, optional `.` and fraction
    /// digits, with at least one digit overall. The fraction is scaled into raw
    /// units after dropping trailing digits (rounding half up on the first
    /// dropped digit) until it fits in 32 bits.
    ///
    /// # Errors
    ///
    /// [`FixedError::Parse`] for malformed text, [`FixedError::OutOfRange`] when
    /// the magnitude does not fit the Q32.32 range. `"2147483648"` is accepted
    /// as [`FixedNum::MAX`], matching its display form.
    pub fn parse_decimal(text: &str) -> Result<Self, FixedError> {
        let malformed = || FixedError::Parse(text.to_owned());

        let (negative, body) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };

        let (int_digits, frac_digits) = body.split_once('.').unwrap_or((body, ""));
        if int_digits.is_empty() && frac_digits.is_empty() {
            return Err(malformed());
        }
        if !int_digits.bytes().all(|b| b.is_ascii_digit())
            || !frac_digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }

        let integer: u64 = if int_digits.is_empty() {
            0
        } else {
            int_digits
                .parse()
                .map_err(|_| FixedError::OutOfRange("integer part exceeds the Q32.32 range"))?
        };
        if integer > MAX_INTEGER_MAGNITUDE {
            return Err(FixedError::OutOfRange("integer part exceeds the Q32.32 range"));
        }

        let magnitude = (integer << FRACTIONAL_BITS) + fraction_to_raw(frac_digits.as_bytes());

        let raw = if negative {
            if magnitude > i64::MIN.unsigned_abs() {
                return Err(FixedError::OutOfRange("literal is below FixedNum::MIN"));
            }
            (magnitude as i64).wrapping_neg()
        } else {
            // Exactly 2^31 is what `Display` prints for the top raw values
            if magnitude == i64::MIN.unsigned_abs() {
                i64::MAX
            } else if magnitude > i64::MAX as u64 {
                return Err(FixedError::OutOfRange("literal is above FixedNum::MAX"));
            } else {
                magnitude as i64
            }
        };

        Ok(Self(raw))
    }
}

/// Scales a string of fraction digits into raw fractional units.
///
/// The result is at most `ONE_RAW`, reached only when rounding carries
/// into the integer part.
fn fraction_to_raw(digits: &[u8]) -> u64 {
    let mut length = digits.len().min(MAX_FRACTION_DIGITS);
    let mut fraction = round_digits(digits, length);

    while u64::BITS - fraction.leading_zeros() > INTEGER_BITS {
        length -= 1;
        fraction = round_digits(digits, length);
    }

    (fraction << FRACTIONAL_BITS) / 10u64.pow(length as u32)
}

/// First `length` digits as an integer, rounded half up on the next digit.
fn round_digits(digits: &[u8], length: usize) -> u64 {
    let value = digits[..length]
        .iter()
        .fold(0u64, |acc, d| acc * 10 + u64::from(d - b'0'));
    if digits.get(length).is_some_and(|d| *d >= b'5') {
        value + 1
    } else {
        value
    }
}

impl FromStr for FixedNum {
    type Err = FixedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_decimal(s)
    }
}

impl fmt::Display for FixedNum {
    /// Sign, integer magnitude, then up to [`FixedNum::DECIMAL_DIGITS`]
    /// fractional digits rounded half up with trailing zeros trimmed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.0.unsigned_abs();
        let mut integer = magnitude >> FRACTIONAL_BITS;
        let fraction = magnitude & FRACTION_MASK as u64;

        let mut decimal = (fraction * DECIMAL_SCALE + (ONE_RAW as u64 >> 1)) >> FRACTIONAL_BITS;
        if decimal >= DECIMAL_SCALE {
            integer += 1;
            decimal -= DECIMAL_SCALE;
        }

        let mut text = String::with_capacity(24);
        if self.0 < 0 && (integer != 0 || decimal != 0) {
            text.push('-');
        }
        text.push_str(&integer.to_string());
        if decimal != 0 {
            let digits = format!("{:0width$}", decimal, width = FixedNum::DECIMAL_DIGITS as usize);
            text.push('.');
            text.push_str(digits.trim_end_matches('0'));
        }

        f.pad(&text)
    }
}

impl From<i32> for FixedNum {
    fn from(value: i32) -> Self {
        Self::from_int(value)
    }
}

impl From<I32F32> for FixedNum {
    /// `I32F32` shares the Q32.32 layout, so this is a bit copy.
    fn from(value: I32F32) -> Self {
        Self(value.to_bits())
    }
}

impl From<FixedNum> for I32F32 {
    fn from(value: FixedNum) -> Self {
        I32F32::from_bits(value.0)
    }
}
