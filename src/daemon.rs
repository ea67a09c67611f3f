use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Local;

use crate::clock::LocalClock;
use crate::config::BenchConfig;
use crate::csvlog::CsvLog;
use crate::cycles::CycleCounter;
use crate::error::Error;
use crate::load::Workload;
use crate::scheduler::scan::ScanSettings;
use crate::scheduler::Scheduler;

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

extern "C" fn signal_handler(_sig: libc::c_int) {
    SHUTDOWN.store(true, Ordering::Relaxed);
}

fn install_signal_handlers() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = signal_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&mut sa.sa_mask);
        libc::sigaction(libc::SIGTERM, &sa, std::ptr::null_mut());
        libc::sigaction(libc::SIGINT, &sa, std::ptr::null_mut());
    }
}

pub fn scan_settings(config: &BenchConfig) -> ScanSettings {
    ScanSettings {
        samples: config.scan_samples,
        window_secs: config.scan_window_secs,
        poll_interval: Duration::from_millis(config.poll_interval_ms),
    }
}

/// Runs boundary scans until SIGINT or SIGTERM.
pub fn run<C, W>(scheduler: &mut Scheduler<C, W>, config: &BenchConfig) -> Result<(), Error>
where
    C: CycleCounter,
    W: Workload,
{
    install_signal_handlers();

    let mut log = CsvLog::for_date(&config.log_dir, Local::now().date_naive());
    if let Err(e) = log.ensure_header() {
        log::warn!(
            target: "timesurface::scan",
            "cannot create {}: {}",
            log.path().display(),
            e,
        );
    }

    let settings = scan_settings(config);
    log::info!(
        target: "timesurface::scan",
        "started: log={} samples={} window={}s poll={}ms",
        log.path().display(),
        settings.samples,
        settings.window_secs,
        config.poll_interval_ms,
    );

    let clock = LocalClock::new();
    let visits = scheduler.run_continuous(&clock, &mut log, &settings, &SHUTDOWN);

    log::info!(
        target: "timesurface::scan",
        "shutting down after {} recorded visits",
        visits,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_settings_from_config() {
        let config = BenchConfig {
            scan_samples: 500,
            scan_window_secs: 90,
            poll_interval_ms: 250,
            ..BenchConfig::default()
        };
        let settings = scan_settings(&config);
        assert_eq!(settings.samples, 500);
        assert_eq!(settings.window_secs, 90);
        assert_eq!(settings.poll_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_default_scan_settings() {
        let settings = scan_settings(&BenchConfig::default());
        assert_eq!(settings.samples, 30_000);
        assert_eq!(settings.window_secs, 120);
        assert_eq!(settings.poll_interval, Duration::from_millis(100));
    }
}
