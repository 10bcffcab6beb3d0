use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry};

use lockstep_math::config::{load_report_config, ReportConfig, DEFAULT_CONFIG_PATH};
use lockstep_math::fixed_math::{warm_up, LookupTables, LUT_SIZE};
use lockstep_math::report::{fingerprint, run_sweep, FunctionKind, ReportError};
use lockstep_math::{FixedError, FixedNum};

const LOG_PREFIX: &str = "lockstep_math";
const DEFAULT_LOG_FILTER: &str = "lockstep_math=info";

#[derive(Parser)]
#[command(name = "lockstep-math", version, about = "Deterministic Q32.32 fixed-point diagnostics")]
struct Cli {
    /// RON report configuration
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a single operation and print the result with its raw encoding
    Eval {
        op: EvalOp,
        #[arg(allow_hyphen_values = true)]
        x: FixedNum,
        /// Second operand of binary operations; for `atan2` the x coordinate
        #[arg(allow_hyphen_values = true)]
        y: Option<FixedNum>,
    },
    /// Compare each configured function against f64 over seeded samples
    Report,
    /// Hash the raw outputs over seeded samples, for comparing machines
    Fingerprint,
    /// Inspect the sine and tangent lookup tables
    Lut {
        #[arg(long)]
        index: Option<usize>,
    },
    /// Write the default configuration as RON
    WriteConfig { path: PathBuf },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EvalOp {
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
    Pow,
    Atan2,
    Add,
    Sub,
    Mul,
    Div,
}

impl EvalOp {
    fn unary(self) -> Option<FunctionKind> {
        Some(match self {
            EvalOp::Sqrt => FunctionKind::Sqrt,
            EvalOp::Log2 => FunctionKind::Log2,
            EvalOp::Ln => FunctionKind::Ln,
            EvalOp::Pow2 => FunctionKind::Pow2,
            EvalOp::Sin => FunctionKind::Sin,
            EvalOp::FastSin => FunctionKind::FastSin,
            EvalOp::Cos => FunctionKind::Cos,
            EvalOp::FastCos => FunctionKind::FastCos,
            EvalOp::Tan => FunctionKind::Tan,
            EvalOp::Atan => FunctionKind::Atan,
            EvalOp::Acos => FunctionKind::Acos,
            EvalOp::Pow | EvalOp::Atan2 | EvalOp::Add | EvalOp::Sub | EvalOp::Mul | EvalOp::Div => {
                return None
            }
        })
    }

    fn binary(self, x: FixedNum, y: FixedNum) -> Result<FixedNum, FixedError> {
        match self {
            EvalOp::Pow => x.pow(y),
            EvalOp::Atan2 => Ok(x.atan2(y)),
            EvalOp::Add => Ok(x + y),
            EvalOp::Sub => Ok(x - y),
            EvalOp::Mul => Ok(x * y),
            EvalOp::Div => x.checked_div(y),
            _ => Err(FixedError::OutOfRange("not a binary operation")),
        }
    }
}

type FilterHandle = reload::Handle<EnvFilter, Registry>;

fn setup_file_logging() -> std::io::Result<(PathBuf, FilterHandle)> {
    let log_dir = PathBuf::from("logs");
    fs::create_dir_all(&log_dir)?;

    // Keep only the most recent runs
    cleanup_old_logs(&log_dir, 25);

    let now = chrono::Local::now();
    let log_filename = format!("{}_{}.log", LOG_PREFIX, now.format("%Y%m%d_%H%M%S"));
    let log_file_path = log_dir.join(&log_filename);

    // One file per run, never rotated
    let file_appender = RollingFileAppender::new(Rotation::NEVER, &log_dir, &log_filename);

    let file_layer = fmt::layer().with_writer(file_appender).with_ansi(false);

    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok((log_file_path, handle))
}

fn cleanup_old_logs(log_dir: &Path, keep_count: usize) {
    if let Ok(entries) = fs::read_dir(log_dir) {
        let mut log_files: Vec<_> = entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|s| s.starts_with(LOG_PREFIX) && s.ends_with(".log"))
                    .unwrap_or(false)
            })
            .collect();

        // Oldest first
        log_files.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

        if log_files.len() > keep_count {
            for file in log_files.iter().take(log_files.len() - keep_count) {
                let _ = fs::remove_file(file.path());
            }
        }
    }
}

/// `RUST_LOG` wins over the config's `log_filter`.
fn apply_config_filter(handle: &FilterHandle, config: &ReportConfig) {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return;
    }
    match EnvFilter::try_new(&config.log_filter) {
        Ok(filter) => {
            if let Err(e) = handle.reload(filter) {
                warn!("Failed to apply log filter {:?}: {}", config.log_filter, e);
            }
        }
        Err(e) => warn!("Ignoring invalid log filter {:?}: {}", config.log_filter, e),
    }
}

fn eval(op: EvalOp, x: FixedNum, y: Option<FixedNum>) -> Result<(), ReportError> {
    let result = match (op.unary(), y) {
        (Some(kind), None) => kind.evaluate(x)?,
        (None, Some(y)) => op.binary(x, y)?,
        (Some(_), Some(_)) => return Err(FixedError::OutOfRange("unary operation given two operands").into()),
        (None, None) => return Err(FixedError::OutOfRange("binary operation needs a second operand").into()),
    };

    match y {
        Some(y) => println!("{:?}({}, {}) = {}", op, x, y, result),
        None => println!("{:?}({}) = {}", op, x, result),
    }
    println!("raw: {} ({:#018x})", result.raw(), result.raw());
    Ok(())
}

fn print_lut(index: Option<usize>) -> Result<(), ReportError> {
    let tables = LookupTables::get();
    match index {
        Some(index) if index < LUT_SIZE => {
            let angle = FixedNum::from_i64(index as i64).checked_div(tables.interval())?;
            let sin = FixedNum::from_raw(tables.sin()[index]);
            let tan = FixedNum::from_raw(tables.tan()[index]);
            println!("entry {index}: angle {angle} rad");
            println!("  sin {} ({:#018x})", sin, sin.raw());
            println!("  tan {} ({:#018x})", tan, tan.raw());
        }
        Some(_) => return Err(FixedError::OutOfRange("lookup table index").into()),
        None => {
            println!("entries:  {}", LUT_SIZE);
            println!("interval: {} steps/rad", tables.interval());
            println!("sin[last]: {}", FixedNum::from_raw(tables.sin()[LUT_SIZE - 1]));
            println!("tan[last - 1]: {}", FixedNum::from_raw(tables.tan()[LUT_SIZE - 2]));
        }
    }
    Ok(())
}

fn write_config(path: &Path) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, ReportConfig::default().to_ron()?)?;
    info!("Wrote default report config to {}", path.display());
    Ok(())
}

fn run(command: Command, config: &ReportConfig) -> Result<(), ReportError> {
    match command {
        Command::Eval { op, x, y } => eval(op, x, y),
        Command::Report => {
            warm_up();
            for &kind in &config.functions {
                println!("{}", run_sweep(kind, config));
            }
            Ok(())
        }
        Command::Fingerprint => {
            warm_up();
            for &kind in &config.functions {
                let name = format!("{:?}", kind);
                println!("{:<8} {:016x}", name, fingerprint(kind, config)?);
            }
            Ok(())
        }
        Command::Lut { index } => print_lut(index),
        Command::WriteConfig { path } => write_config(&path),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter_handle = match setup_file_logging() {
        Ok((log_file, handle)) => {
            info!("Logging to {}", log_file.display());
            handle
        }
        Err(e) => {
            eprintln!("Failed to set up logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    let config = load_report_config(&cli.config);
    apply_config_filter(&filter_handle, &config);

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
