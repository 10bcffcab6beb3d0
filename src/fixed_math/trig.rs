//! Trigonometric and inverse trigonometric functions.
//!
//! `sin`, `cos` and `tan` reduce the angle, fold it into the first quadrant and
//! interpolate in the quarter-period tables from [`super::lut`]. The inverse
//! functions are series or rational approximations built on the arithmetic.

use super::lut::{LookupTables, LUT_SIZE};
use super::{FixedError, FixedNum, FRAC_PI_2_RAW, PI_RAW, TAU_RAW};

/// `(2^29)·π` in raw units. 29 is the largest N with `(2^N)·π < MAX`; taking
/// the remainder by each halving of it down to 2π keeps more precision than
/// a single remainder by [`TAU_RAW`].
const LARGE_PI_RAW: i64 = 7_244_019_458_077_122_842;
const LARGE_PI_HALVINGS: u32 = 29;

/// Coefficient of the `atan2` rational approximation, `0.28`.
const ATAN2_COEFFICIENT: FixedNum = FixedNum::from_raw(1_202_590_842);

/// An angle folded into `[0, π/2)` plus the mirroring needed to undo the fold.
struct Folded {
    angle: i64,
    /// Read the table right-to-left (second and fourth quadrants).
    flip_horizontal: bool,
    /// Negate the result (third and fourth quadrants).
    flip_vertical: bool,
}

fn fold_sin_angle(angle: i64) -> Folded {
    let mut clamped_2pi = angle;
    for i in 0..LARGE_PI_HALVINGS {
        clamped_2pi %= LARGE_PI_RAW >> i;
    }
    if angle < 0 {
        clamped_2pi += TAU_RAW;
    }

    let flip_vertical = clamped_2pi >= PI_RAW;

    // (angle % π) from (angle % 2π) without another remainder
    let mut clamped_pi = clamped_2pi;
    while clamped_pi >= PI_RAW {
        clamped_pi -= PI_RAW;
    }

    let flip_horizontal = clamped_pi >= FRAC_PI_2_RAW;

    let mut clamped_pi_over_2 = clamped_pi;
    if clamped_pi_over_2 >= FRAC_PI_2_RAW {
        clamped_pi_over_2 -= FRAC_PI_2_RAW;
    }

    Folded {
        angle: clamped_pi_over_2,
        flip_horizontal,
        flip_vertical,
    }
}

/// Shifts an angle by π/2 for `cos(x) = sin(x + π/2)`, going the other way
/// round for positive input so the sum cannot overflow.
#[inline]
fn cos_to_sin_angle(raw: i64) -> i64 {
    if raw > 0 {
        raw - PI_RAW - FRAC_PI_2_RAW
    } else {
        raw + FRAC_PI_2_RAW
    }
}

impl FixedNum {
    /// Sine of an angle in radians.
    ///
    /// Relative error below 1e-10 typically and below 1e-7 in the worst case
    /// for `x` within `[-2π, 2π]`.
    pub fn sin(self) -> Self {
        let tables = LookupTables::get();
        let folded = fold_sin_angle(self.0);
        let clamped = Self(folded.angle);

        // Interpolate linearly between the two nearest table entries
        let raw_index = clamped.fast_mul(tables.interval());
        let rounded_index = raw_index.round();
        let index_error = raw_index.fast_sub(rounded_index);

        let index = rounded_index.to_i64();
        let step = i64::from(index_error.signum());
        let last = LUT_SIZE as i64 - 1;

        let (nearest, second_nearest) = if folded.flip_horizontal {
            (tables.sin_at(last - index), tables.sin_at(last - index - step))
        } else {
            (tables.sin_at(index), tables.sin_at(index + step))
        };

        let delta = index_error
            .fast_mul(Self(nearest).fast_sub(Self(second_nearest)).fast_abs())
            .0;
        let interpolated = if folded.flip_horizontal {
            nearest - delta
        } else {
            nearest + delta
        };

        Self(if folded.flip_vertical {
            -interpolated
        } else {
            interpolated
        })
    }

    /// Nearest table entry without interpolation.
    ///
    /// Several times faster than [`FixedNum::sin`] but only accurate to 4-5
    /// decimal places.
    pub fn fast_sin(self) -> Self {
        let tables = LookupTables::get();
        let folded = fold_sin_angle(self.0);

        // One table step is 2^15 raw units
        let index = (folded.angle >> 15).min(LUT_SIZE as i64 - 1);

        let nearest = if folded.flip_horizontal {
            tables.sin_at(LUT_SIZE as i64 - 1 - index)
        } else {
            tables.sin_at(index)
        };

        Self(if folded.flip_vertical { -nearest } else { nearest })
    }

    /// Cosine, via `sin(x + π/2)`. Same accuracy as [`FixedNum::sin`].
    pub fn cos(self) -> Self {
        Self(cos_to_sin_angle(self.0)).sin()
    }

    /// Cosine via [`FixedNum::fast_sin`].
    pub fn fast_cos(self) -> Self {
        Self(cos_to_sin_angle(self.0)).fast_sin()
    }

    /// Tangent, interpolated in the tangent table.
    ///
    /// This function has seen far less validation than `sin`/`cos`. Close to
    /// odd multiples of π/2 the table saturates and the result is unreliable.
    pub fn tan(self) -> Self {
        let tables = LookupTables::get();

        let mut clamped_pi = self.0 % PI_RAW;
        let mut flip = false;
        if clamped_pi < 0 {
            clamped_pi = -clamped_pi;
            flip = true;
        }
        if clamped_pi > FRAC_PI_2_RAW {
            flip = !flip;
            clamped_pi = FRAC_PI_2_RAW - (clamped_pi - FRAC_PI_2_RAW);
        }

        let raw_index = Self(clamped_pi).fast_mul(tables.interval());
        let rounded_index = raw_index.round();
        let index_error = raw_index.fast_sub(rounded_index);

        let index = rounded_index.to_i64();
        let nearest = tables.tan_at(index);
        let second_nearest = tables.tan_at(index + i64::from(index_error.signum()));

        let delta = index_error
            .fast_mul(Self(nearest).fast_sub(Self(second_nearest)).fast_abs())
            .0;
        let interpolated = nearest.wrapping_add(delta);

        Self(if flip {
            interpolated.wrapping_neg()
        } else {
            interpolated
        })
    }

    /// Arc tangent by Euler's series, accurate to at least 7 decimal places.
    ///
    /// Inputs above one are inverted first and the result reflected about π/4.
    pub fn atan(self) -> Self {
        if self.0 == 0 {
            return Self::ZERO;
        }

        // atan(-z) = -atan(z)
        let negative = self.0 < 0;
        let mut z = if negative { -self } else { self };

        let two = Self::from_int(2);
        let three = Self::from_int(3);

        let invert = z > Self::ONE;
        if invert {
            z = Self::ONE.div_nonzero(z);
        }

        let mut result = Self::ONE;
        let mut term = Self::ONE;

        let z_sq = z * z;
        let z_sq_2 = z_sq * two;
        let z_sq_plus_one = z_sq + Self::ONE;
        let z_sq_12 = z_sq_plus_one * two;
        let mut dividend = z_sq_2;
        let mut divisor = z_sq_plus_one * three;

        for _ in 2..30 {
            term *= dividend.div_nonzero(divisor);
            result += term;

            dividend += z_sq_2;
            divisor += z_sq_12;

            if term.0 == 0 {
                break;
            }
        }

        result = (result * z).div_nonzero(z_sq_plus_one);

        if invert {
            result = Self::FRAC_PI_2 - result;
        }

        if negative {
            -result
        } else {
            result
        }
    }

    /// Arc cosine as `atan(sqrt(1 - x²) / x)`, shifted by π for negative `x`.
    /// Accurate to at least 7 decimal places.
    ///
    /// # Errors
    ///
    /// [`FixedError::OutOfRange`] when `x` is outside `[-1, 1]`.
    pub fn acos(self) -> Result<Self, FixedError> {
        if self < Self::NEG_ONE || self > Self::ONE {
            return Err(FixedError::OutOfRange("acos argument outside [-1, 1]"));
        }

        if self.0 == 0 {
            return Ok(Self::FRAC_PI_2);
        }

        let root = (Self::ONE - self * self).sqrt_unsigned();
        let result = root.div_nonzero(self).atan();
        Ok(if self.0 < 0 {
            result + Self::PI
        } else {
            result
        })
    }

    /// Angle of the point `(x, y)` = `(other, self)` in `(-π, π]`.
    ///
    /// Uses the rational approximation `z / (1 + 0.28 z²)`, accurate to about
    /// 0.005 rad, with quadrant correction from the signs of `x` and `y`.
    pub fn atan2(self, x: Self) -> Self {
        let y = self;
        if x.0 == 0 {
            return if y.0 > 0 {
                Self::FRAC_PI_2
            } else if y.0 == 0 {
                Self::ZERO
            } else {
                -Self::FRAC_PI_2
            };
        }

        let z = y.div_nonzero(x);

        // The denominator saturated, so |z| is effectively infinite
        let denominator = Self::ONE + ATAN2_COEFFICIENT * z * z;
        if denominator == Self::MAX {
            return if y.0 < 0 {
                -Self::FRAC_PI_2
            } else {
                Self::FRAC_PI_2
            };
        }

        if z.abs() < Self::ONE {
            let atan = z.div_nonzero(denominator);
            if x.0 < 0 {
                if y.0 < 0 {
                    return atan - Self::PI;
                }
                return atan + Self::PI;
            }
            atan
        } else {
            let atan = Self::FRAC_PI_2 - z.div_nonzero(z * z + ATAN2_COEFFICIENT);
            if y.0 < 0 {
                return atan - Self::PI;
            }
            atan
        }
    }
}
