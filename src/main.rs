mod benchmark;
mod calibrate;
mod cli;
mod clock;
mod config;
mod csvlog;
mod cycles;
mod daemon;
mod error;
mod load;
mod logging;
mod measure;
mod report;
mod scheduler;
mod stats;

use std::io;
use std::path::Path;
use std::process;

use clap::Parser;

use cli::{BenchArgs, Cli};
use config::BenchConfig;
use cycles::{CycleCounter, HardwareCounter};
use load::SyntheticLoad;
use measure::MeasurementEngine;
use scheduler::Scheduler;

/// Build a BenchConfig by layering: defaults → TOML file → CLI overrides.
fn build_config(config_file: Option<&Path>, args: &BenchArgs) -> BenchConfig {
    let mut cfg = match config::load_config(config_file) {
        Ok(c) => c.benchmark,
        Err(e) => {
            log::warn!("{}", e);
            BenchConfig::default()
        }
    };

    if let Some(ref v) = args.log_dir {
        cfg.log_dir = v.clone();
    }
    if let Some(v) = args.cpu_freq_hz {
        cfg.cpu_freq_hz = v;
    }

    cfg.validate();
    cfg
}

fn main() {
    let cli = Cli::parse();

    logging::init(&cli.log, cli.scheduled);
    let cfg = build_config(cli.config_file.as_deref(), &cli.bench);

    let cal = calibrate::calibrate_live(&HardwareCounter, &cfg);
    if let Err(e) = report::write_calibration(&cal, &mut io::stdout().lock()) {
        log::error!("{}", e);
        process::exit(1);
    }

    let engine = MeasurementEngine::new(HardwareCounter, SyntheticLoad::new(HardwareCounter.read()));
    let mut scheduler = Scheduler::new(engine, &cal);

    let result = if cli.scheduled {
        daemon::run(&mut scheduler, &cfg)
    } else {
        benchmark::run(&mut scheduler, &cfg)
    };
    if let Err(e) = result {
        log::error!("{}", e);
        process::exit(1);
    }
}
