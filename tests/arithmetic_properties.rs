use lockstep_math::{FixedError, FixedNum};
use proptest::prelude::*;

/// Raw values biased toward the interesting regions: the extremes, values
/// around one and the full range.
fn raw_value() -> impl Strategy<Value = i64> {
    prop_oneof![
        3 => any::<i64>(),
        3 => -(1i64 << 40)..(1i64 << 40),
        2 => -(1i64 << 20)..(1i64 << 20),
        1 => prop::sample::select(vec![
            i64::MIN,
            i64::MIN + 1,
            i64::MAX,
            i64::MAX - 1,
            0,
            1,
            -1,
            1 << 32,
            -(1 << 32),
        ]),
    ]
}

fn clamp_to_i64(value: i128) -> i64 {
    value.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Exact product, floored to the raw grid and clamped.
fn mul_oracle(a: i64, b: i64) -> i64 {
    clamp_to_i64((a as i128 * b as i128) >> 32)
}

/// Exact quotient, rounded half away from zero and clamped.
fn div_oracle(a: i64, b: i64) -> i64 {
    let doubled = ((a as i128).abs() << 33) / (b as i128).abs();
    let magnitude = (doubled + 1) >> 1;
    clamp_to_i64(if (a < 0) != (b < 0) { -magnitude } else { magnitude })
}

// Property: saturating add/sub agree with the integer saturating operations
proptest! {
    #[test]
    fn prop_add_sub_saturate(a in raw_value(), b in raw_value()) {
        let x = FixedNum::from_raw(a);
        let y = FixedNum::from_raw(b);
        prop_assert_eq!((x + y).raw(), a.saturating_add(b));
        prop_assert_eq!((x - y).raw(), a.saturating_sub(b));
        prop_assert_eq!(x.fast_add(y).raw(), a.wrapping_add(b));
        prop_assert_eq!(x.fast_sub(y).raw(), a.wrapping_sub(b));
    }
}

// Property: multiplication is the exact product floored, or saturated
proptest! {
    #[test]
    fn prop_mul_matches_wide_product(a in raw_value(), b in raw_value()) {
        let product = FixedNum::from_raw(a) * FixedNum::from_raw(b);
        prop_assert_eq!(product.raw(), mul_oracle(a, b), "{} * {}", a, b);
    }

    #[test]
    fn prop_mul_is_commutative(a in raw_value(), b in raw_value()) {
        let x = FixedNum::from_raw(a);
        let y = FixedNum::from_raw(b);
        prop_assert_eq!(x * y, y * x);
    }

    #[test]
    fn prop_fast_mul_agrees_when_in_range(a in -(1i64 << 45)..(1i64 << 45), b in -(1i64 << 45)..(1i64 << 45)) {
        let x = FixedNum::from_raw(a);
        let y = FixedNum::from_raw(b);
        prop_assert_eq!(x.fast_mul(y), x * y);
    }
}

// Property: division is the exact quotient rounded to nearest, or saturated
proptest! {
    #[test]
    fn prop_div_matches_wide_quotient(a in raw_value(), b in raw_value()) {
        let result = FixedNum::from_raw(a).checked_div(FixedNum::from_raw(b));
        if b == 0 && a != 0 {
            prop_assert_eq!(result, Err(FixedError::DivideByZero));
        } else if a == 0 {
            prop_assert_eq!(result, Ok(FixedNum::ZERO));
        } else {
            prop_assert_eq!(result.unwrap().raw(), div_oracle(a, b), "{} / {}", a, b);
        }
    }

    #[test]
    fn prop_rem_keeps_dividend_sign(a in raw_value(), b in raw_value()) {
        prop_assume!(b != 0);
        let rem = FixedNum::from_raw(a).checked_rem(FixedNum::from_raw(b)).unwrap();
        prop_assert_eq!(rem.raw(), a.wrapping_rem(b));
        prop_assert!(rem.is_zero() || rem.is_negative() == (a < 0));
        if !(a == i64::MIN && b == -1) {
            prop_assert_eq!(FixedNum::from_raw(a).fast_rem(FixedNum::from_raw(b)), rem);
        }
    }
}

// Property: negation and absolute value never overflow
proptest! {
    #[test]
    fn prop_neg_and_abs_saturate(a in raw_value()) {
        let x = FixedNum::from_raw(a);
        prop_assert_eq!((-x).raw(), a.checked_neg().unwrap_or(i64::MAX));
        prop_assert_eq!(x.abs().raw(), a.checked_abs().unwrap_or(i64::MAX));
        prop_assert!(!x.abs().is_negative());
    }
}

// Property: rounding helpers bracket the value
proptest! {
    #[test]
    fn prop_floor_ceil_bracket(a in raw_value()) {
        let x = FixedNum::from_raw(a);
        prop_assert!(x.floor() <= x);
        prop_assert_eq!(x.floor().fract(), FixedNum::ZERO);
        prop_assert_eq!(x.floor() + x.fract(), x);
        if x.ceil() != FixedNum::MAX {
            prop_assert!(x.ceil() >= x);
            prop_assert!(x.ceil() - x.floor() <= FixedNum::ONE);
        }
        prop_assert!(x.trunc().abs() <= x.abs());
    }
}

// Property: square root rounds to nearest
proptest! {
    #[test]
    fn prop_sqrt_is_nearest(a in 0i64..=i64::MAX) {
        let root = FixedNum::from_raw(a).sqrt().unwrap().raw() as i128;
        // root / 2^32 approximates sqrt(a / 2^32), so root^2 approximates a * 2^32
        let scaled = (a as i128) << 32;
        let lower = if root == 0 { 0 } else { (2 * root - 1) * (2 * root - 1) };
        let upper = (2 * root + 1) * (2 * root + 1);
        prop_assert!(lower <= 4 * scaled && 4 * scaled <= upper, "sqrt raw {} -> {}", a, root);
    }

    #[test]
    fn prop_sqrt_squared_is_close(a in 0i64..=i64::MAX) {
        let root = FixedNum::from_raw(a).sqrt().unwrap();
        let squared = root * root;
        // Half an ULP in the root is magnified by 2·root when squaring
        let allowed = 2 + root.to_i64();
        prop_assert!((squared.raw() - a).abs() <= allowed, "sqrt({})² = {}", a, squared.raw());
    }

    #[test]
    fn prop_sqrt_rejects_negatives(a in i64::MIN..0) {
        prop_assert!(matches!(FixedNum::from_raw(a).sqrt(), Err(FixedError::OutOfRange(_))));
    }
}

// Property: bounded results for every input
proptest! {
    #[test]
    fn prop_trig_ranges(a in raw_value()) {
        let x = FixedNum::from_raw(a);
        prop_assert!(x.sin().abs() <= FixedNum::ONE);
        prop_assert!(x.cos().abs() <= FixedNum::ONE);
        prop_assert!(x.fast_sin().abs() <= FixedNum::ONE);
        prop_assert!(x.atan().abs() <= FixedNum::FRAC_PI_2);
    }

    #[test]
    fn prop_atan2_range(y in raw_value(), x in raw_value()) {
        let angle = FixedNum::from_raw(y).atan2(FixedNum::from_raw(x));
        prop_assert!(angle >= -FixedNum::PI && angle <= FixedNum::PI);
    }

    #[test]
    fn prop_pow2_is_positive_or_zero(a in raw_value()) {
        prop_assert!(!FixedNum::from_raw(a).pow2().is_negative());
    }
}

// Property: decimal text with up to three fractional digits survives a round trip
proptest! {
    #[test]
    fn prop_short_literals_round_trip(negative in any::<bool>(), integer in 0u32..(1 << 31), millis in 0u32..1000) {
        let digits = format!("{:03}", millis);
        let fraction = digits.trim_end_matches('0');
        let mut text = if negative { String::from("-") } else { String::new() };
        text.push_str(&integer.to_string());
        if !fraction.is_empty() {
            text.push('.');
            text.push_str(fraction);
        }

        let value: FixedNum = text.parse().unwrap();
        let expected = if integer == 0 && millis == 0 { String::from("0") } else { text };
        prop_assert_eq!(value.to_string(), expected);
    }

    #[test]
    fn prop_integers_are_exact(a in any::<i32>(), b in any::<i32>()) {
        let sum = FixedNum::from_int(a) + FixedNum::from_int(b);
        prop_assert_eq!(sum, FixedNum::from_i64(a as i64 + b as i64));
        prop_assert_eq!(FixedNum::from_int(a).to_i32(), a);
        prop_assert_eq!(FixedNum::from_int(a).to_string(), a.to_string());
    }
}
