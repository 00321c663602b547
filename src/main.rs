// Allow panic/unwrap/expect in tests (denied globally via Cargo.toml lints)
#![cfg_attr(
    test,
    allow(clippy::panic, clippy::unwrap_used, clippy::expect_used)
)]

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use loginit::{load_config, FileOutputConfig, LoggerBuilder, Severity};
use std::path::PathBuf;
use tracing::info;

/// Emit structured log records through a configured loginit logger
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML logger config; flags below override it
    #[arg(long, env = "LOGINIT_CONFIG")]
    config: Option<PathBuf>,

    /// Minimum level: trace, debug, info, warn, error or fatal
    #[arg(short, long, env = "LOGINIT_LEVEL")]
    level: Option<Severity>,

    /// Write to this file instead of standard output
    #[arg(long, env = "LOGINIT_FILE")]
    file: Option<PathBuf>,

    /// Rotate the file once it reaches this many megabytes
    #[arg(long, env = "LOGINIT_MAX_SIZE_MB", default_value_t = 100)]
    max_size_mb: u64,

    /// Rotated files to keep (0 keeps all)
    #[arg(long, env = "LOGINIT_MAX_BACKUPS", default_value_t = 0)]
    max_backups: usize,

    /// Days to keep rotated files (0 keeps them forever)
    #[arg(long, env = "LOGINIT_MAX_AGE_DAYS", default_value_t = 28)]
    max_age_days: u32,

    /// Keep rotated files uncompressed
    #[arg(long, env = "LOGINIT_NO_COMPRESS")]
    no_compress: bool,

    /// Tag records with source file and line
    #[arg(long, env = "LOGINIT_SOURCE")]
    source: bool,

    /// strftime pattern for the time attribute, e.g. %Y-%m-%d
    #[arg(long, env = "LOGINIT_TIME_FORMAT")]
    time_format: Option<String>,

    /// Number of records to emit
    #[arg(short = 'n', long, default_value_t = 1)]
    count: u64,

    /// Finish with a fatal record and exit with status 1
    #[arg(long)]
    fatal: bool,

    /// Message of the emitted records
    #[arg(default_value = "hello from loginit")]
    message: String,
}

fn builder_from_args(args: &Args) -> Result<LoggerBuilder> {
    let mut builder = match &args.config {
        Some(path) => LoggerBuilder::from_config(
            load_config(path).wrap_err_with(|| format!("loading {}", path.display()))?,
        ),
        None => LoggerBuilder::new(),
    };

    if let Some(level) = args.level {
        builder = builder.level(level);
    }
    if let Some(file) = &args.file {
        builder = builder.file_output(FileOutputConfig {
            max_size_mb: args.max_size_mb,
            max_backups: args.max_backups,
            max_age_days: args.max_age_days,
            compress: !args.no_compress,
            ..FileOutputConfig::new(file)
        });
    }
    if args.source {
        builder = builder.source(true);
    }
    if let Some(pattern) = &args.time_format {
        builder = builder.time_format(pattern.as_str());
    }
    Ok(builder)
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let logger = builder_from_args(&args)?
        .try_init()
        .wrap_err("configuring logging")?;

    for sequence in 1..=args.count {
        info!(sequence, "{}", args.message);
    }

    if args.fatal {
        loginit::fatal!(count = args.count, "{}", args.message);
    }

    logger.close().wrap_err("closing log file")?;
    Ok(())
}
