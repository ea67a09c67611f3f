use std::path::PathBuf;

use clap::{Args, Parser};

use crate::logging::LogArgs;

#[derive(Debug, Args)]
pub struct BenchArgs {
    /// Directory for the daily CSV log (default: current directory)
    #[arg(long = "log-dir")]
    pub log_dir: Option<PathBuf>,

    /// Calibrate from this counter frequency instead of measuring it
    #[arg(long = "cpu-freq-hz")]
    pub cpu_freq_hz: Option<u64>,
}

#[derive(Debug, Parser)]
#[command(
    name = "timesurface",
    about = "Cycle-accurate timing benchmark for the 277.3 kHz region"
)]
pub struct Cli {
    /// Wait for each half-hour boundary and scan across it, logging to CSV
    #[arg(short = 's', long = "scheduled")]
    pub scheduled: bool,

    /// Configuration file path (default: /etc/timesurface.toml)
    #[arg(long = "config")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub bench: BenchArgs,

    #[command(flatten)]
    pub log: LogArgs,
}
