use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::fixed_math::{serde_decimal, FixedNum};
use crate::report::{FunctionKind, ReportError};

/// Default location of the diagnostics configuration.
pub const DEFAULT_CONFIG_PATH: &str = "assets/report_config.ron";

/// Settings for the accuracy sweeps and fingerprints run by the
/// `lockstep-math` binary.
///
/// The sample set is derived from `seed` alone, so two machines running the
/// same config evaluate exactly the same inputs.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    /// Inputs drawn per function.
    pub samples: usize,
    pub seed: u64,

    // Input range, intersected with each function's own domain
    #[serde(with = "serde_decimal")]
    pub range_min: FixedNum,
    #[serde(with = "serde_decimal")]
    pub range_max: FixedNum,

    pub functions: Vec<FunctionKind>,

    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` takes precedence.
    pub log_filter: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            samples: 10_000,
            seed: 0x5EED_F1C5,
            range_min: FixedNum::from_int(-100),
            range_max: FixedNum::from_int(100),
            functions: FunctionKind::ALL.to_vec(),
            log_filter: String::from("lockstep_math=info"),
        }
    }
}

impl ReportConfig {
    /// Parses a config from RON text. Missing fields take their defaults.
    pub fn from_ron(contents: &str) -> Result<Self, ReportError> {
        Ok(ron::from_str(contents)?)
    }

    /// Reads and parses the config at `path`.
    pub fn try_load(path: &Path) -> Result<Self, ReportError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }

    /// Pretty-printed RON, as written by `lockstep-math write-config`.
    pub fn to_ron(&self) -> Result<String, ReportError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }
}

/// Load the report configuration, falling back to the defaults when the file
/// is missing or malformed. The failure is logged, never returned.
pub fn load_report_config(path: &Path) -> ReportConfig {
    match std::fs::read_to_string(path) {
        Ok(contents) => match ReportConfig::from_ron(&contents) {
            Ok(config) => {
                info!("Loaded report config from {}", path.display());
                config
            }
            Err(e) => {
                error!("Failed to parse report config: {}", e);
                error!("Using default ReportConfig");
                ReportConfig::default()
            }
        },
        Err(e) => {
            error!("Failed to read {}: {}", path.display(), e);
            error!("Using default ReportConfig");
            ReportConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips_through_ron() {
        let config = ReportConfig::default();
        let text = config.to_ron().unwrap();
        assert!(text.contains("range_min: \"-100\""), "ranges are written as decimal text:\n{text}");
        assert_eq!(ReportConfig::from_ron(&text).unwrap(), config);
    }

    #[test]
    fn test_partial_config_fills_in_defaults() {
        let config = ReportConfig::from_ron(
            r#"(samples: 64, range_min: "-0.5", range_max: 2, functions: [Sqrt, FastSin])"#,
        )
        .unwrap();

        assert_eq!(config.samples, 64);
        assert_eq!(config.range_min, "-0.5".parse().unwrap());
        assert_eq!(config.range_max, FixedNum::from_int(2));
        assert_eq!(config.functions, vec![FunctionKind::Sqrt, FunctionKind::FastSin]);
        assert_eq!(config.seed, ReportConfig::default().seed);
        assert_eq!(config.log_filter, "lockstep_math=info");

        let floats = ReportConfig::from_ron("(range_min: -0.5, range_max: 12.25)").unwrap();
        assert_eq!(floats.range_min, "-0.5".parse().unwrap());
        assert_eq!(floats.range_max, "12.25".parse().unwrap());
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        assert!(matches!(
            ReportConfig::from_ron("(samples: \"many\")"),
            Err(ReportError::Ron(_))
        ));
        assert!(matches!(
            ReportConfig::from_ron("(range_min: \"1.2.3\")"),
            Err(ReportError::Ron(_))
        ));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let path = Path::new("does/not/exist/report_config.ron");
        assert!(matches!(ReportConfig::try_load(path), Err(ReportError::Io(_))));
        assert_eq!(load_report_config(path), ReportConfig::default());
    }
}
