use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Error;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub one_shot_samples: usize,
    pub scan_samples: usize,
    pub scan_window_secs: u64,
    pub poll_interval_ms: u64,
    pub calibration_sleep_ms: u64,
    pub warmup_cycles: u64,
    /// Zero means measure the counter frequency at startup.
    pub cpu_freq_hz: u64,
    pub log_dir: PathBuf,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            one_shot_samples: 1_000_000,
            scan_samples: 30_000,
            scan_window_secs: 120,
            poll_interval_ms: 100,
            calibration_sleep_ms: 100,
            warmup_cycles: 72_000_000,
            cpu_freq_hz: 0,
            log_dir: PathBuf::from("."),
        }
    }
}

impl BenchConfig {
    /// Clamp fields to valid ranges.
    pub fn validate(&mut self) {
        self.one_shot_samples = self.one_shot_samples.clamp(1, 100_000_000);
        self.scan_samples = self.scan_samples.clamp(1, 10_000_000);
        self.scan_window_secs = self.scan_window_secs.clamp(1, 1_800);
        self.poll_interval_ms = self.poll_interval_ms.clamp(10, 1_000);
        self.calibration_sleep_ms = self.calibration_sleep_ms.clamp(10, 5_000);
        self.warmup_cycles = self.warmup_cycles.clamp(0, 10_000_000_000);
        self.cpu_freq_hz = self.cpu_freq_hz.clamp(0, 100_000_000_000);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub benchmark: BenchConfig,
}

/// Load configuration from a TOML file.
///
/// - If `explicit_path` is `Some` and the file is missing, returns an error.
/// - If `explicit_path` is `None`, tries `/etc/timesurface.toml`; if missing, returns defaults.
pub fn load_config(explicit_path: Option<&Path>) -> Result<Config, Error> {
    let path = match explicit_path {
        Some(p) => {
            if !p.exists() {
                return Err(Error::InvalidArgs(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            p.to_path_buf()
        }
        None => {
            let default = Path::new("/etc/timesurface.toml");
            if !default.exists() {
                return Ok(Config::default());
            }
            default.to_path_buf()
        }
    };

    let contents = std::fs::read_to_string(&path).map_err(|e| {
        Error::InvalidArgs(format!("failed to read config {}: {}", path.display(), e))
    })?;

    let config: Config = toml::from_str(&contents).map_err(|e| {
        Error::InvalidArgs(format!("failed to parse config {}: {}", path.display(), e))
    })?;

    Ok(config)
}
