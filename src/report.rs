//! Accuracy sweeps and cross-machine fingerprints.
//!
//! A sweep evaluates one function on a seeded sample of inputs and compares
//! every result against the `f64` standard library. A fingerprint hashes the
//! raw outputs for the same samples; two machines that print the same
//! fingerprint computed bit-identical results.

use std::fmt;
use std::hash::Hasher;

use clap::ValueEnum;
use lockstep_macros::profile;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::config::ReportConfig;
use crate::fixed_math::{FixedError, FixedNum};

/// Failure of a diagnostics command.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Fixed(#[from] FixedError),

    #[error("invalid RON: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("failed to write RON: {0}")]
    RonWrite(#[from] ron::Error),

    #[error("bincode encoding failed: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Upper bound of the validated `tan` range, 1.4 rad.
const TAN_LIMIT: FixedNum = FixedNum::from_raw(0x1_6666_6666);

/// The single-argument functions covered by sweeps and fingerprints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum FunctionKind {
    Sqrt,
    Log2,
    Ln,
    Pow2,
    Sin,
    FastSin,
    Cos,
    FastCos,
    Tan,
    Atan,
    Acos,
}

impl FunctionKind {
    pub const ALL: [FunctionKind; 11] = [
        FunctionKind::Sqrt,
        FunctionKind::Log2,
        FunctionKind::Ln,
        FunctionKind::Pow2,
        FunctionKind::Sin,
        FunctionKind::FastSin,
        FunctionKind::Cos,
        FunctionKind::FastCos,
        FunctionKind::Tan,
        FunctionKind::Atan,
        FunctionKind::Acos,
    ];

    pub fn evaluate(self, x: FixedNum) -> Result<FixedNum, FixedError> {
        match self {
            FunctionKind::Sqrt => x.sqrt(),
            FunctionKind::Log2 => x.log2(),
            FunctionKind::Ln => x.ln(),
            FunctionKind::Pow2 => Ok(x.pow2()),
            FunctionKind::Sin => Ok(x.sin()),
            FunctionKind::FastSin => Ok(x.fast_sin()),
            FunctionKind::Cos => Ok(x.cos()),
            FunctionKind::FastCos => Ok(x.fast_cos()),
            FunctionKind::Tan => Ok(x.tan()),
            FunctionKind::Atan => Ok(x.atan()),
            FunctionKind::Acos => x.acos(),
        }
    }

    /// The same function computed in `f64`.
    pub fn reference(self, x: f64) -> f64 {
        match self {
            FunctionKind::Sqrt => x.sqrt(),
            FunctionKind::Log2 => x.log2(),
            FunctionKind::Ln => x.ln(),
            FunctionKind::Pow2 => x.exp2(),
            FunctionKind::Sin | FunctionKind::FastSin => x.sin(),
            FunctionKind::Cos | FunctionKind::FastCos => x.cos(),
            FunctionKind::Tan => x.tan(),
            FunctionKind::Atan => x.atan(),
            FunctionKind::Acos => x.acos(),
        }
    }

    /// Inclusive input range worth sampling.
    ///
    /// `pow2` is limited to the exponents that neither saturate nor underflow,
    /// `tan` to the range it has been validated on.
    pub fn domain(self) -> (FixedNum, FixedNum) {
        match self {
            FunctionKind::Sqrt => (FixedNum::ZERO, FixedNum::MAX),
            FunctionKind::Log2 | FunctionKind::Ln => (FixedNum::EPSILON, FixedNum::MAX),
            FunctionKind::Pow2 => (
                FixedNum::LOG2_MIN + FixedNum::EPSILON,
                FixedNum::LOG2_MAX - FixedNum::EPSILON,
            ),
            FunctionKind::Tan => (-TAN_LIMIT, TAN_LIMIT),
            FunctionKind::Acos => (FixedNum::NEG_ONE, FixedNum::ONE),
            FunctionKind::Sin
            | FunctionKind::FastSin
            | FunctionKind::Cos
            | FunctionKind::FastCos
            | FunctionKind::Atan => (FixedNum::MIN, FixedNum::MAX),
        }
    }

    /// Error of `actual` against the reference: absolute while the expected
    /// magnitude is below one, relative above.
    pub fn error(self, x: FixedNum, actual: FixedNum) -> f64 {
        let expected = self.reference(x.to_f64_fast());
        (actual.to_f64_fast() - expected).abs() / expected.abs().max(1.0)
    }
}

/// Outcome of [`run_sweep`].
#[derive(Clone, Debug, Serialize)]
pub struct AccuracyReport {
    pub kind: FunctionKind,
    pub samples: usize,
    /// Inputs the function rejected with an error.
    pub failures: usize,
    pub max_error: f64,
    pub mean_error: f64,
    pub worst_input: Option<FixedNum>,
}

impl fmt::Display for AccuracyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = format!("{:?}", self.kind);
        write!(
            f,
            "{:<8} samples={:>7} failures={:>5} max_err={:.3e} mean_err={:.3e}",
            name, self.samples, self.failures, self.max_error, self.mean_error
        )?;
        if let Some(worst) = self.worst_input {
            write!(f, " worst_x={}", worst)?;
        }
        Ok(())
    }
}

/// The seeded inputs for `kind`: `config.samples` raw values drawn uniformly
/// from the configured range intersected with the function's domain. Empty
/// when the two do not overlap.
pub fn sample_inputs(kind: FunctionKind, config: &ReportConfig) -> Vec<FixedNum> {
    let (domain_min, domain_max) = kind.domain();
    let low = domain_min.max(config.range_min);
    let high = domain_max.min(config.range_max);
    if low > high {
        return Vec::new();
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    (0..config.samples)
        .map(|_| FixedNum::from_raw(rng.random_range(low.raw()..=high.raw())))
        .collect()
}

/// Compare `kind` against its `f64` reference over the configured samples.
#[profile]
pub fn run_sweep(kind: FunctionKind, config: &ReportConfig) -> AccuracyReport {
    let inputs = sample_inputs(kind, config);

    let mut failures = 0;
    let mut evaluated = 0usize;
    let mut total_error = 0.0;
    let mut max_error = 0.0;
    let mut worst_input = None;

    for &x in &inputs {
        let actual = match kind.evaluate(x) {
            Ok(value) => value,
            Err(e) => {
                trace!("{:?}({}) failed: {}", kind, x, e);
                failures += 1;
                continue;
            }
        };

        let error = kind.error(x, actual);
        evaluated += 1;
        total_error += error;
        if error > max_error || worst_input.is_none() {
            trace!("{:?}: new worst error {:.3e} at x = {}", kind, error, x);
            max_error = error;
            worst_input = Some(x);
        }

        crate::profile_log!(evaluated, "{:?}: {} samples evaluated", kind, evaluated);
    }

    AccuracyReport {
        kind,
        samples: inputs.len(),
        failures,
        max_error,
        mean_error: if evaluated > 0 {
            total_error / evaluated as f64
        } else {
            0.0
        },
        worst_input,
    }
}

/// Hash of the raw outputs for the seeded sample set. Rejected inputs
/// contribute `None`.
///
/// The bytes are hashed with `FxHasher`, whose output depends on the pointer
/// width, so compare fingerprints between targets of the same width.
pub fn fingerprint(kind: FunctionKind, config: &ReportConfig) -> Result<u64, ReportError> {
    let outputs: Vec<Option<FixedNum>> = sample_inputs(kind, config)
        .into_iter()
        .map(|x| kind.evaluate(x).ok())
        .collect();

    let bytes = bincode::serialize(&outputs)?;
    let mut hasher = FxHasher::default();
    hasher.write(&bytes);
    Ok(hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(samples: usize) -> ReportConfig {
        ReportConfig {
            samples,
            ..ReportConfig::default()
        }
    }

    #[test]
    fn test_every_kind_evaluates_inside_its_domain() {
        for kind in FunctionKind::ALL {
            let (low, high) = kind.domain();
            for x in [low, high] {
                assert!(kind.evaluate(x).is_ok(), "{kind:?} rejected {x}");
            }
        }
    }

    #[test]
    fn test_samples_respect_range_and_domain() {
        let config = small_config(1_000);
        let inputs = sample_inputs(FunctionKind::Sqrt, &config);
        assert_eq!(inputs.len(), 1_000);
        assert!(inputs.iter().all(|x| !x.is_negative() && *x <= config.range_max));

        let inputs = sample_inputs(FunctionKind::Acos, &config);
        assert!(inputs.iter().all(|x| *x >= FixedNum::NEG_ONE && *x <= FixedNum::ONE));
    }

    #[test]
    fn test_samples_are_seeded() {
        let config = small_config(100);
        assert_eq!(
            sample_inputs(FunctionKind::Sin, &config),
            sample_inputs(FunctionKind::Sin, &config)
        );

        let reseeded = ReportConfig {
            seed: config.seed + 1,
            ..config.clone()
        };
        assert_ne!(
            sample_inputs(FunctionKind::Sin, &config),
            sample_inputs(FunctionKind::Sin, &reseeded)
        );
    }

    #[test]
    fn test_disjoint_range_yields_empty_report() {
        let config = ReportConfig {
            range_min: FixedNum::from_int(5),
            range_max: FixedNum::from_int(10),
            ..small_config(100)
        };
        let report = run_sweep(FunctionKind::Acos, &config);
        assert_eq!(report.samples, 0);
        assert_eq!(report.failures, 0);
        assert_eq!(report.worst_input, None);
        assert_eq!(report.mean_error, 0.0);
    }

    #[test]
    fn test_sweep_error_bounds() {
        let config = small_config(500);
        for kind in FunctionKind::ALL {
            let bound = match kind {
                FunctionKind::FastSin | FunctionKind::FastCos => 1e-4,
                FunctionKind::Pow2 => 1e-6,
                _ => 1e-7,
            };
            let report = run_sweep(kind, &config);
            assert_eq!(report.samples, 500);
            assert_eq!(report.failures, 0, "{kind:?} rejected sampled inputs");
            assert!(report.max_error < bound, "{report}");
            assert!(report.mean_error <= report.max_error);
            assert!(report.worst_input.is_some());
        }
    }

    #[test]
    fn test_fingerprint_is_repeatable() {
        let config = small_config(256);
        let first = fingerprint(FunctionKind::Sin, &config).unwrap();
        assert_eq!(first, fingerprint(FunctionKind::Sin, &config).unwrap());
        assert_ne!(first, fingerprint(FunctionKind::Cos, &config).unwrap());
    }

    #[test]
    fn test_report_display() {
        let report = AccuracyReport {
            kind: FunctionKind::FastSin,
            samples: 10,
            failures: 1,
            max_error: 0.5,
            mean_error: 0.25,
            worst_input: Some(FixedNum::from_int(3)),
        };
        assert_eq!(
            report.to_string(),
            "FastSin  samples=     10 failures=    1 max_err=5.000e-1 mean_err=2.500e-1 worst_x=3"
        );
    }
}
