//! Deterministic Q32.32 fixed-point arithmetic for lockstep simulations.
//!
//! Every operation in [`fixed_math`] is computed with integer arithmetic only, so
//! results are identical bit-for-bit on every machine, compiler and optimization
//! level. The [`report`] and [`config`] modules back the `lockstep-math`
//! diagnostics binary.

pub mod config;
pub mod fixed_math;
pub mod report;

pub use fixed_math::{FixedError, FixedNum};

// ============================================================================
// Profiling Macros
// ============================================================================

/// Log a message every 100 000 iterations when the `perf_stats` feature is enabled.
///
/// When the feature is disabled this expands to an empty block and the
/// arguments are never evaluated.
///
/// # Example
/// ```ignore
/// profile_log!(i, "Evaluated {} samples", i);
/// ```
#[macro_export]
#[cfg(feature = "perf_stats")]
macro_rules! profile_log {
    ($counter:expr, $($arg:tt)*) => {
        if $counter % 100_000 == 0 {
            ::tracing::info!($($arg)*);
        }
    };
}

#[macro_export]
#[cfg(not(feature = "perf_stats"))]
macro_rules! profile_log {
    ($counter:expr, $($arg:tt)*) => {};
}
