//! Serialize a [`FixedNum`] as decimal text instead of its raw encoding.
//!
//! Meant for hand-edited files such as configs, where `"-6.283"` is easier to
//! read than a raw `i64`. Decimal text keeps nine fractional digits, so values
//! that need the full 32 fractional bits should use the default raw encoding.
//!
//! ```rust
//! use lockstep_math::fixed_math::{serde_decimal, FixedNum};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Range {
//!     #[serde(with = "serde_decimal")]
//!     min: FixedNum,
//! }
//! ```

use serde::de::{self, Deserializer, Visitor};
use serde::Serializer;

use super::FixedNum;

pub fn serialize<S>(value: &FixedNum, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(value)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<FixedNum, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(DecimalVisitor)
}

struct DecimalVisitor;

impl Visitor<'_> for DecimalVisitor {
    type Value = FixedNum;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a decimal string or a number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<FixedNum, E> {
        FixedNum::parse_decimal(v).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<FixedNum, E> {
        Ok(FixedNum::from_i64(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<FixedNum, E> {
        Ok(FixedNum::from_i64(i64::try_from(v).unwrap_or(i64::MAX)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<FixedNum, E> {
        Ok(FixedNum::from_f64(v))
    }
}
