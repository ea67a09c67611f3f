use std::thread;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime};

/// Local wall-clock time, a monotonic reading, and coarse sleeping.
///
/// `now` may jump (DST, NTP steps) and is only fit for matching clock-face
/// instants and stamping rows. Durations are measured with `monotonic`.
pub trait WallClock {
    fn now(&self) -> NaiveDateTime;
    /// Time since a fixed, arbitrary origin; never goes backwards.
    fn monotonic(&self) -> Duration;
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy)]
pub struct LocalClock {
    origin: Instant,
}

impl LocalClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for LocalClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WallClock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn monotonic(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Test double: time moves by `step` on every wall read and by the requested
/// amount on every sleep. Monotonic reads observe without advancing.
#[cfg(test)]
pub struct SimulatedClock {
    now: std::cell::Cell<NaiveDateTime>,
    elapsed: std::cell::Cell<Duration>,
    step: chrono::TimeDelta,
}

#[cfg(test)]
impl SimulatedClock {
    pub fn new(start: NaiveDateTime, step: chrono::TimeDelta) -> Self {
        Self {
            now: std::cell::Cell::new(start),
            elapsed: std::cell::Cell::new(Duration::ZERO),
            step,
        }
    }

    pub fn at(h: u32, m: u32, s: u32, step_secs: i64) -> Self {
        let start = chrono::NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap();
        Self::new(start, chrono::TimeDelta::seconds(step_secs))
    }

    pub fn peek(&self) -> NaiveDateTime {
        self.now.get()
    }

    /// Moves the wall clock only, as a DST change or clock step would.
    pub fn shift(&self, delta: chrono::TimeDelta) {
        self.now.set(self.now.get() + delta);
    }

    fn advance(&self, d: Duration) {
        self.now.set(self.now.get() + chrono::TimeDelta::from_std(d).unwrap());
        self.elapsed.set(self.elapsed.get() + d);
    }
}

#[cfg(test)]
impl WallClock for SimulatedClock {
    fn now(&self) -> NaiveDateTime {
        let t = self.now.get();
        self.advance(self.step.to_std().unwrap());
        t
    }

    fn monotonic(&self) -> Duration {
        self.elapsed.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}
