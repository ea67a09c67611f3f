//! Continuous boundary-scan campaign.
//!
//! Idles on the wall clock until XX:29:00 or XX:59:00, then round-robins the
//! configurations for a fixed window, logging one row per completed visit.
//! The window is timed on the monotonic clock so DST changes cannot stretch it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{NaiveDateTime, TimeDelta, Timelike};

use super::Scheduler;
use crate::clock::WallClock;
use crate::csvlog::{LogRecord, RecordSink};
use crate::cycles::CycleCounter;
use crate::error::Error;
use crate::load::Workload;
use crate::stats;

const LOG_TARGET: &str = "timesurface::scan";

/// Minutes at which a scan starts, one minute before each half-hour boundary.
pub const TRIGGER_MINUTES: [u32; 2] = [29, 59];

#[derive(Debug, Clone, Copy)]
pub struct ScanSettings {
    pub samples: usize,
    pub window_secs: u64,
    pub poll_interval: Duration,
}

impl ScanSettings {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// A fired trigger: when it fired and which half-hour mark the window spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    pub triggered_at: NaiveDateTime,
    pub crossing: NaiveDateTime,
}

pub fn is_trigger_instant(t: &NaiveDateTime) -> bool {
    t.second() == 0 && TRIGGER_MINUTES.contains(&t.minute())
}

/// Fires at most once per matching (hour, minute, second).
#[derive(Debug, Default)]
pub struct BoundaryTrigger {
    last: Option<(u32, u32, u32)>,
}

impl BoundaryTrigger {
    pub fn poll(&mut self, now: NaiveDateTime) -> Option<Boundary> {
        if !is_trigger_instant(&now) {
            return None;
        }
        let key = (now.hour(), now.minute(), now.second());
        if self.last == Some(key) {
            return None;
        }
        self.last = Some(key);

        let next = now + TimeDelta::seconds(60);
        let crossing = next
            .date()
            .and_hms_opt(next.hour(), next.minute(), 0)
            .unwrap_or(next);
        Some(Boundary {
            triggered_at: now,
            crossing,
        })
    }

    /// Marks the trigger instant whose second contains `now`, if any, as
    /// already handled. Called when a window ends so an instant that began
    /// inside it is not fired afterwards.
    pub fn suppress(&mut self, now: NaiveDateTime) {
        if is_trigger_instant(&now) {
            self.last = Some((now.hour(), now.minute(), now.second()));
        }
    }
}

impl<C: CycleCounter, W: Workload> Scheduler<C, W> {
    /// Samples configuration `index` and summarizes it into a log row.
    pub fn visit(
        &mut self,
        index: usize,
        samples: usize,
        timestamp: NaiveDateTime,
    ) -> Result<LogRecord, Error> {
        let config = self.configs[index];
        let batch = self.collect(index, samples);
        let quick = stats::quick_stats(&batch)?;
        Ok(LogRecord {
            timestamp,
            kind: config.kind(),
            fft_level: config.level,
            pattern: config.pattern_label(),
            stats: quick,
        })
    }

    /// Round-robins configurations until `window_secs` have passed on the
    /// clock's monotonic reading since `start`. Returns the number of
    /// completed visits.
    pub fn run_scan_window<K, S>(
        &mut self,
        clock: &K,
        sink: &mut S,
        start: Duration,
        settings: &ScanSettings,
        stop: &AtomicBool,
    ) -> usize
    where
        K: WallClock + ?Sized,
        S: RecordSink + ?Sized,
    {
        let window = settings.window();
        let cycle_len = self.configs.len();
        let mut visits = 0usize;

        while clock.monotonic().saturating_sub(start) < window {
            if stop.load(Ordering::Relaxed) {
                break;
            }

            let index = visits % cycle_len;
            let timestamp = clock.now();
            if index == 0 {
                log::info!(
                    target: LOG_TARGET,
                    "[{:02}:{:02}] Cycle {}",
                    timestamp.minute(),
                    timestamp.second(),
                    visits / cycle_len + 1,
                );
            }

            match self.visit(index, settings.samples, timestamp) {
                Ok(record) => {
                    if let Err(e) = sink.append(&record) {
                        log::warn!(target: LOG_TARGET, "failed to log {}: {}", self.configs[index].key(), e);
                    }
                }
                Err(e) => {
                    log::warn!(target: LOG_TARGET, "skipping {}: {}", self.configs[index].key(), e);
                }
            }
            visits += 1;
        }

        visits
    }

    /// Polls the wall clock and runs a scan window at every boundary until
    /// `stop` is set. Returns the total number of visits recorded.
    pub fn run_continuous<K, S>(
        &mut self,
        clock: &K,
        sink: &mut S,
        settings: &ScanSettings,
        stop: &AtomicBool,
    ) -> usize
    where
        K: WallClock + ?Sized,
        S: RecordSink + ?Sized,
    {
        let mut trigger = BoundaryTrigger::default();
        let mut last_minute: Option<u32> = None;
        let mut total = 0usize;

        while !stop.load(Ordering::Relaxed) {
            let mark = clock.monotonic();
            let now = clock.now();

            if let Some(boundary) = trigger.poll(now) {
                log::info!(
                    target: LOG_TARGET,
                    "[{}] starting {}s boundary scan across {}",
                    boundary.triggered_at.format("%Y-%m-%d %H:%M:%S"),
                    settings.window_secs,
                    boundary.crossing.format("%H:%M:%S"),
                );
                let visits = self.run_scan_window(clock, sink, mark, settings, stop);
                total += visits;
                trigger.suppress(clock.now());
                log::info!(
                    target: LOG_TARGET,
                    "boundary scan complete: {} patterns recorded, waiting for next boundary",
                    visits,
                );
            }

            if last_minute != Some(now.minute()) {
                log::info!(
                    target: LOG_TARGET,
                    "Waiting... (Current: {:02}:{:02})",
                    now.minute(),
                    now.second(),
                );
                last_minute = Some(now.minute());
            }

            clock.sleep(settings.poll_interval);
        }

        total
    }
}
