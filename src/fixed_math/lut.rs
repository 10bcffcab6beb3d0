//! Quarter-period sine and tangent lookup tables.
//!
//! Both tables sample `[0, π/2]` at [`LUT_SIZE`] evenly spaced angles and store
//! raw Q32.32 values. They are generated once, on first use or through
//! [`warm_up`], and are read-only afterwards, so any number of threads may
//! consult them without locking.
//!
//! Generation uses `f64` Taylor series restricted to IEEE-754 basic operations,
//! which are correctly rounded, so the tables are identical on every platform.

use lockstep_macros::profile;
use once_cell::sync::Lazy;
use tracing::debug;

use super::{FixedNum, FRAC_PI_2_RAW, ONE_RAW};

/// Entries per table, `(π/2) >> 15` in raw units.
pub const LUT_SIZE: usize = (FRAC_PI_2_RAW >> 15) as usize;

static TABLES: Lazy<LookupTables> = Lazy::new(LookupTables::generate);

/// The shared sine and tangent tables.
pub struct LookupTables {
    sin: Box<[i64]>,
    tan: Box<[i64]>,
    /// Table steps per radian, `(LUT_SIZE - 1) / (π/2)`.
    interval: FixedNum,
}

impl LookupTables {
    /// Returns the process-wide tables, building them on first call.
    #[inline]
    pub fn get() -> &'static LookupTables {
        &TABLES
    }

    #[profile(0)]
    fn generate() -> LookupTables {
        let mut sin = Vec::with_capacity(LUT_SIZE);
        let mut tan = Vec::with_capacity(LUT_SIZE);

        let step = std::f64::consts::FRAC_PI_2 / (LUT_SIZE - 1) as f64;
        for i in 0..LUT_SIZE {
            let angle = i as f64 * step;
            let s = taylor_sin(angle);
            let c = taylor_cos(angle);

            sin.push(to_raw(s));
            tan.push(if c <= 0.0 { i64::MAX } else { to_raw(s / c) });
        }

        let interval = FixedNum::from_int((LUT_SIZE - 1) as i32).div_nonzero(FixedNum::FRAC_PI_2);

        debug!(
            "Generated sin/tan lookup tables: {} entries each, interval {}",
            LUT_SIZE, interval
        );

        LookupTables {
            sin: sin.into_boxed_slice(),
            tan: tan.into_boxed_slice(),
            interval,
        }
    }

    #[inline]
    pub fn sin(&self) -> &[i64] {
        &self.sin
    }

    #[inline]
    pub fn tan(&self) -> &[i64] {
        &self.tan
    }

    #[inline]
    pub fn interval(&self) -> FixedNum {
        self.interval
    }

    /// Sine entry at `index`, clamped into the table.
    #[inline]
    pub(crate) fn sin_at(&self, index: i64) -> i64 {
        self.sin[clamp_index(index)]
    }

    /// Tangent entry at `index`, clamped into the table.
    #[inline]
    pub(crate) fn tan_at(&self, index: i64) -> i64 {
        self.tan[clamp_index(index)]
    }
}

/// Builds the lookup tables now instead of on the first trigonometric call.
pub fn warm_up() {
    Lazy::force(&TABLES);
}

#[inline]
fn clamp_index(index: i64) -> usize {
    index.clamp(0, LUT_SIZE as i64 - 1) as usize
}

/// Rounds to the nearest raw unit, saturating above the range.
fn to_raw(value: f64) -> i64 {
    let scaled = value * ONE_RAW as f64;
    if scaled >= i64::MAX as f64 {
        i64::MAX
    } else {
        scaled.round() as i64
    }
}

/// Maclaurin series for sine, summed until a term no longer changes the total.
fn taylor_sin(x: f64) -> f64 {
    let x_sq = x * x;
    let mut term = x;
    let mut sum = x;
    let mut n = 1.0;
    loop {
        term = term * -x_sq / ((2.0 * n) * (2.0 * n + 1.0));
        let next = sum + term;
        if next == sum {
            return sum;
        }
        sum = next;
        n += 1.0;
    }
}

fn taylor_cos(x: f64) -> f64 {
    let x_sq = x * x;
    let mut term = 1.0;
    let mut sum = 1.0;
    let mut n = 1.0;
    loop {
        term = term * -x_sq / ((2.0 * n - 1.0) * (2.0 * n));
        let next = sum + term;
        if next == sum {
            return sum;
        }
        sum = next;
        n += 1.0;
    }
}
