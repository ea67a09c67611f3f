use std::thread;
use std::time::{Duration, Instant};

use crate::config::BenchConfig;
use crate::cycles::CycleCounter;

/// Counters slower than this are assumed to tick off a fixed base clock.
pub const BASE_CLOCK_THRESHOLD_HZ: u64 = 20_000_000;

/// Frequency substituted when the counter runs off the 24 MHz base clock.
pub const BASE_CLOCK_HZ: u64 = 24_000_000;

/// One of the three calibrated tick offsets around the 277.3 kHz center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TickOffset {
    Minus1,
    Center,
    Plus1,
}

impl TickOffset {
    pub const ALL: [TickOffset; 3] = [TickOffset::Minus1, TickOffset::Center, TickOffset::Plus1];

    pub fn label(self) -> &'static str {
        match self {
            TickOffset::Minus1 => "-1",
            TickOffset::Center => "0",
            TickOffset::Plus1 => "+1",
        }
    }

    pub fn target_hz(self) -> u64 {
        match self {
            TickOffset::Minus1 => 276_300,
            TickOffset::Center => 277_300,
            TickOffset::Plus1 => 278_300,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationData {
    pub cpu_freq_hz: u64,
    pub tick_center: u64,
    pub tick_minus1: u64,
    pub tick_plus1: u64,
}

impl CalibrationData {
    pub fn tick(&self, offset: TickOffset) -> u64 {
        match offset {
            TickOffset::Minus1 => self.tick_minus1,
            TickOffset::Center => self.tick_center,
            TickOffset::Plus1 => self.tick_plus1,
        }
    }

    pub fn cpu_freq_ghz(&self) -> f64 {
        self.cpu_freq_hz as f64 / 1e9
    }
}

/// Counts cycles across a coarse sleep and scales them to Hz.
pub fn measure_frequency<C: CycleCounter + ?Sized>(counter: &C, sleep: Duration) -> u64 {
    let start_time = Instant::now();
    let start_cycles = counter.read();

    thread::sleep(sleep);

    let end_cycles = counter.read();
    let elapsed_us = start_time.elapsed().as_micros().max(1);

    let cycles = end_cycles.wrapping_sub(start_cycles) as u128;
    (cycles * 1_000_000 / elapsed_us) as u64
}

/// Applies the base-clock correction to a measured frequency.
pub fn effective_frequency(measured_hz: u64) -> u64 {
    if measured_hz < BASE_CLOCK_THRESHOLD_HZ {
        BASE_CLOCK_HZ
    } else {
        measured_hz
    }
}

/// Cycles per period of `target_hz`, truncated.
pub fn derive_tick(freq_hz: u64, target_hz: u64) -> u64 {
    freq_hz / target_hz
}

pub fn calibrate(measured_hz: u64) -> CalibrationData {
    let cpu_freq_hz = effective_frequency(measured_hz);
    CalibrationData {
        cpu_freq_hz,
        tick_center: derive_tick(cpu_freq_hz, TickOffset::Center.target_hz()),
        tick_minus1: derive_tick(cpu_freq_hz, TickOffset::Minus1.target_hz()),
        tick_plus1: derive_tick(cpu_freq_hz, TickOffset::Plus1.target_hz()),
    }
}

/// Calibrates from the configured override, or from a live measurement.
pub fn calibrate_live<C: CycleCounter + ?Sized>(counter: &C, config: &BenchConfig) -> CalibrationData {
    let measured = if config.cpu_freq_hz > 0 {
        log::debug!("using configured frequency {} Hz", config.cpu_freq_hz);
        config.cpu_freq_hz
    } else {
        let hz = measure_frequency(
            counter,
            Duration::from_millis(config.calibration_sleep_ms),
        );
        log::debug!("measured counter frequency {} Hz", hz);
        hz
    };

    if measured < BASE_CLOCK_THRESHOLD_HZ {
        log::info!(
            "counter frequency {} Hz below {} Hz, assuming {} Hz base clock",
            measured,
            BASE_CLOCK_THRESHOLD_HZ,
            BASE_CLOCK_HZ
        );
    }

    calibrate(measured)
}
