use crate::cycles::{count_for, count_since, spin_for, CycleCounter};
use crate::load::{FftLoadLevel, Workload};

/// Paired baseline/loaded sampling against an injectable counter and workload.
pub struct MeasurementEngine<C, W> {
    counter: C,
    workload: W,
}

impl<C: CycleCounter, W: Workload> MeasurementEngine<C, W> {
    pub fn new(counter: C, workload: W) -> Self {
        Self { counter, workload }
    }

    pub fn counter(&self) -> &C {
        &self.counter
    }

    /// One sample: busy-loop iterations lost to the load burst.
    ///
    /// Phases, each bounded by `tick` cycles on the counter: counted
    /// baseline, idle gap, then the loaded window whose start is taken before
    /// the workload runs, so however long the burst takes is charged against
    /// the loaded count, then a trailing idle gap.
    #[inline]
    pub fn measure_single(&mut self, tick: u64, level: FftLoadLevel) -> i64 {
        let baseline_ops = count_for(&self.counter, tick);
        spin_for(&self.counter, tick);

        let load_start = self.counter.read();
        self.workload.run(level);
        let loaded_ops = count_since(&self.counter, load_start, tick);
        spin_for(&self.counter, tick);

        baseline_ops as i64 - loaded_ops as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycles::{HardwareCounter, StepCounter};
    use crate::load::SyntheticLoad;

    #[test]
    fn test_noop_load_unit_step_is_zero() {
        let counter = StepCounter::new(0, 1);
        let mut engine = MeasurementEngine::new(&counter, |_: FftLoadLevel| {});
        for &tick in &[2u64, 10, 86, 8654] {
            assert_eq!(engine.measure_single(tick, FftLoadLevel::Load75), 0, "tick {}", tick);
        }
    }

    #[test]
    fn test_golden_delta_equals_consumed_cycles() {
        let counter = StepCounter::new(0, 1);
        let mut engine = MeasurementEngine::new(&counter, |_: FftLoadLevel| counter.advance(5));
        // baseline counts 99, loaded window loses the 5 cycles the burst consumed
        assert_eq!(engine.measure_single(100, FftLoadLevel::Load90), 5);
        assert_eq!(engine.measure_single(100, FftLoadLevel::Load90), 5);
    }

    #[test]
    fn test_load_longer_than_tick_saturates() {
        let counter = StepCounter::new(0, 1);
        let mut engine = MeasurementEngine::new(&counter, |_: FftLoadLevel| counter.advance(500));
        // loaded window is already exhausted, so the delta is the whole baseline
        assert_eq!(engine.measure_single(100, FftLoadLevel::Load80), 99);
    }

    #[test]
    fn test_cycles_consumed_per_sample() {
        let counter = StepCounter::new(0, 1);
        let mut engine = MeasurementEngine::new(&counter, |_: FftLoadLevel| {});
        engine.measure_single(50, FftLoadLevel::Load75);
        // four windows of 50 cycles plus the closing read of each
        assert_eq!(counter.current(), 4 * 51);
    }

    #[test]
    fn test_workload_receives_level() {
        let counter = StepCounter::new(0, 1);
        let mut levels = Vec::new();
        {
            let mut engine =
                MeasurementEngine::new(&counter, |level: FftLoadLevel| levels.push(level));
            engine.measure_single(10, FftLoadLevel::Load85);
            engine.measure_single(10, FftLoadLevel::Load90);
        }
        assert_eq!(levels, vec![FftLoadLevel::Load85, FftLoadLevel::Load90]);
    }

    #[test]
    fn test_hardware_sample_completes() {
        let mut engine = MeasurementEngine::new(HardwareCounter, SyntheticLoad::new(1));
        for level in FftLoadLevel::ALL {
            let _ = engine.measure_single(10_000, level);
        }
    }
}
