//! Campaign configurations and the sampling drivers built on them.

pub mod scan;

use crate::calibrate::{CalibrationData, TickOffset};
use crate::cycles::{spin_for, CycleCounter};
use crate::load::{FftLoadLevel, Workload};
use crate::measure::MeasurementEngine;

/// Length of every dynamic tick-rotation pattern.
pub const PATTERN_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKind {
    Static,
    Dynamic,
}

impl ConfigKind {
    pub fn label(self) -> &'static str {
        match self {
            ConfigKind::Static => "Static",
            ConfigKind::Dynamic => "Dynamic",
        }
    }
}

/// Named six-step tick rotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternName {
    Original,
    Alternating,
    Block,
    Mixed,
    Sweep,
}

impl PatternName {
    pub const ALL: [PatternName; 5] = [
        PatternName::Original,
        PatternName::Alternating,
        PatternName::Block,
        PatternName::Mixed,
        PatternName::Sweep,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PatternName::Original => "Original",
            PatternName::Alternating => "Alternating",
            PatternName::Block => "Block",
            PatternName::Mixed => "Mixed",
            PatternName::Sweep => "Sweep",
        }
    }

    pub fn offsets(self) -> [TickOffset; PATTERN_LEN] {
        use TickOffset::{Center as C, Minus1 as M, Plus1 as P};
        match self {
            PatternName::Original => [M, M, C, P, P, C],
            PatternName::Alternating => [P, M, P, M, P, M],
            PatternName::Block => [P, P, P, M, M, M],
            PatternName::Mixed => [C, M, P, C, P, M],
            PatternName::Sweep => [M, C, P, P, C, M],
        }
    }

    /// e.g. `-1->-1->0->+1->+1->0`
    pub fn notation(self) -> String {
        self.offsets()
            .iter()
            .map(|o| o.label())
            .collect::<Vec<_>>()
            .join("->")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickSchedule {
    Fixed { offset: TickOffset, tick: u64 },
    Rotating { pattern: PatternName, ticks: [u64; PATTERN_LEN] },
}

/// A load level paired with the tick (or tick rotation) to sample it at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configuration {
    pub level: FftLoadLevel,
    pub schedule: TickSchedule,
}

impl Configuration {
    pub fn fixed(level: FftLoadLevel, offset: TickOffset, cal: &CalibrationData) -> Self {
        Self {
            level,
            schedule: TickSchedule::Fixed {
                offset,
                tick: cal.tick(offset),
            },
        }
    }

    pub fn rotating(level: FftLoadLevel, pattern: PatternName, cal: &CalibrationData) -> Self {
        Self {
            level,
            schedule: TickSchedule::Rotating {
                pattern,
                ticks: pattern.offsets().map(|o| cal.tick(o)),
            },
        }
    }

    pub fn kind(&self) -> ConfigKind {
        match self.schedule {
            TickSchedule::Fixed { .. } => ConfigKind::Static,
            TickSchedule::Rotating { .. } => ConfigKind::Dynamic,
        }
    }

    /// Tick for sample `index`.
    #[inline]
    pub fn tick_at(&self, index: usize) -> u64 {
        match self.schedule {
            TickSchedule::Fixed { tick, .. } => tick,
            TickSchedule::Rotating { ticks, .. } => ticks[index % PATTERN_LEN],
        }
    }

    /// `Tick-1` / `Tick0` / `Tick+1` for static, the pattern name for dynamic.
    pub fn pattern_label(&self) -> String {
        match self.schedule {
            TickSchedule::Fixed { offset, .. } => format!("Tick{}", offset.label()),
            TickSchedule::Rotating { pattern, .. } => pattern.name().to_string(),
        }
    }

    /// Report key, unique across the campaign.
    pub fn key(&self) -> String {
        match self.kind() {
            ConfigKind::Static => format!("FFT{} {}", self.level.label(), self.pattern_label()),
            ConfigKind::Dynamic => {
                format!("Dynamic FFT{} {}", self.level.label(), self.pattern_label())
            }
        }
    }
}

/// The 32 campaign configurations: 12 static (level-major, then offset),
/// followed by 20 dynamic (level-major, then pattern).
pub fn build_configurations(cal: &CalibrationData) -> Vec<Configuration> {
    let mut configs = Vec::with_capacity(32);
    for level in FftLoadLevel::ALL {
        for offset in TickOffset::ALL {
            configs.push(Configuration::fixed(level, offset, cal));
        }
    }
    for level in FftLoadLevel::ALL {
        for pattern in PatternName::ALL {
            configs.push(Configuration::rotating(level, pattern, cal));
        }
    }
    configs
}

/// Samples collected for one configuration.
#[derive(Debug, Clone)]
pub struct CampaignEntry {
    pub config: Configuration,
    pub samples: Vec<i64>,
}

/// Every configuration's batch from a one-shot campaign, in campaign order.
#[derive(Debug, Clone, Default)]
pub struct CampaignResults {
    entries: Vec<CampaignEntry>,
}

impl CampaignResults {
    pub fn entries(&self) -> &[CampaignEntry] {
        &self.entries
    }

    pub fn of_kind(&self, kind: ConfigKind) -> impl Iterator<Item = &CampaignEntry> {
        self.entries.iter().filter(move |e| e.config.kind() == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// One-shot campaign progress notifications.
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
    Started { config: &'a Configuration, samples: usize },
    Finished,
}

pub struct Scheduler<C, W> {
    engine: MeasurementEngine<C, W>,
    configs: Vec<Configuration>,
}

impl<C: CycleCounter, W: Workload> Scheduler<C, W> {
    pub fn new(engine: MeasurementEngine<C, W>, cal: &CalibrationData) -> Self {
        Self {
            engine,
            configs: build_configurations(cal),
        }
    }

    /// Busy-waits `cycles` on the engine's counter.
    pub fn warmup(&self, cycles: u64) {
        spin_for(self.engine.counter(), cycles);
    }

    /// Collects `samples` consecutive measurements for configuration `index`.
    pub fn collect(&mut self, index: usize, samples: usize) -> Vec<i64> {
        let config = self.configs[index];
        let mut batch = Vec::with_capacity(samples);
        for i in 0..samples {
            batch.push(self.engine.measure_single(config.tick_at(i), config.level));
        }
        batch
    }

    /// Samples every configuration in order and returns all batches.
    pub fn run_one_shot<F>(&mut self, samples: usize, mut progress: F) -> CampaignResults
    where
        F: FnMut(Progress<'_>),
    {
        let mut entries = Vec::with_capacity(self.configs.len());
        for index in 0..self.configs.len() {
            let config = self.configs[index];
            progress(Progress::Started {
                config: &config,
                samples,
            });
            let batch = self.collect(index, samples);
            progress(Progress::Finished);
            entries.push(CampaignEntry {
                config,
                samples: batch,
            });
        }
        CampaignResults { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibrate::calibrate;
    use crate::cycles::StepCounter;

    fn cal() -> CalibrationData {
        calibrate(2_400_000_000)
    }

    #[test]
    fn test_configuration_counts() {
        let configs = build_configurations(&cal());
        assert_eq!(configs.len(), 32);
        assert_eq!(configs.iter().filter(|c| c.kind() == ConfigKind::Static).count(), 12);
        assert_eq!(configs.iter().filter(|c| c.kind() == ConfigKind::Dynamic).count(), 20);
        assert!(configs[..12].iter().all(|c| c.kind() == ConfigKind::Static));
    }

    #[test]
    fn test_configuration_order_and_keys() {
        let configs = build_configurations(&cal());
        assert_eq!(configs[0].key(), "FFT75% Tick-1");
        assert_eq!(configs[1].key(), "FFT75% Tick0");
        assert_eq!(configs[2].key(), "FFT75% Tick+1");
        assert_eq!(configs[11].key(), "FFT90% Tick+1");
        assert_eq!(configs[12].key(), "Dynamic FFT75% Original");
        assert_eq!(configs[16].key(), "Dynamic FFT75% Sweep");
        assert_eq!(configs[31].key(), "Dynamic FFT90% Sweep");

        let mut keys: Vec<String> = configs.iter().map(|c| c.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 32);
    }

    #[test]
    fn test_static_tick_is_constant() {
        let c = cal();
        let config = Configuration::fixed(FftLoadLevel::Load80, TickOffset::Plus1, &c);
        for i in 0..20 {
            assert_eq!(config.tick_at(i), c.tick_plus1);
        }
    }

    #[test]
    fn test_rotating_ticks_cycle() {
        let c = cal();
        let config = Configuration::rotating(FftLoadLevel::Load75, PatternName::Original, &c);
        let expected = [
            c.tick_minus1,
            c.tick_minus1,
            c.tick_center,
            c.tick_plus1,
            c.tick_plus1,
            c.tick_center,
        ];
        for i in 0..18 {
            assert_eq!(config.tick_at(i), expected[i % 6], "index {}", i);
        }
    }

    #[test]
    fn test_pattern_notation() {
        assert_eq!(PatternName::Original.notation(), "-1->-1->0->+1->+1->0");
        assert_eq!(PatternName::Alternating.notation(), "+1->-1->+1->-1->+1->-1");
        assert_eq!(PatternName::Block.notation(), "+1->+1->+1->-1->-1->-1");
        assert_eq!(PatternName::Mixed.notation(), "0->-1->+1->0->+1->-1");
        assert_eq!(PatternName::Sweep.notation(), "-1->0->+1->+1->0->-1");
    }

    #[test]
    fn test_one_shot_collects_every_configuration() {
        let counter = StepCounter::new(0, 1);
        let engine = MeasurementEngine::new(&counter, |_: FftLoadLevel| {});
        let mut scheduler = Scheduler::new(engine, &calibrate(0));

        let mut started = 0;
        let mut finished = 0;
        let results = scheduler.run_one_shot(12, |p| match p {
            Progress::Started { samples, .. } => {
                assert_eq!(samples, 12);
                started += 1;
            }
            Progress::Finished => finished += 1,
        });

        assert_eq!(started, 32);
        assert_eq!(finished, 32);
        assert_eq!(results.len(), 32);
        assert_eq!(results.of_kind(ConfigKind::Static).count(), 12);
        assert_eq!(results.of_kind(ConfigKind::Dynamic).count(), 20);
        for entry in results.entries() {
            assert_eq!(entry.samples, vec![0; 12], "{}", entry.config.key());
        }
        assert!(results
            .entries()
            .iter()
            .any(|e| e.config.key() == "Dynamic FFT85% Block"));
    }

    #[test]
    fn test_collect_passes_level_and_rotating_ticks() {
        let counter = StepCounter::new(0, 1);
        let mut levels = Vec::new();
        let c = cal();
        assert!(c.tick_minus1 > c.tick_center && c.tick_center > c.tick_plus1);
        {
            let engine =
                MeasurementEngine::new(&counter, |level: FftLoadLevel| levels.push(level));
            let mut scheduler = Scheduler::new(engine, &c);
            // index 12 is Dynamic FFT75% Original
            let batch = scheduler.collect(12, 7);
            assert_eq!(batch.len(), 7);
        }
        assert_eq!(levels, vec![FftLoadLevel::Load75; 7]);

        // each sample spends four windows of tick + 1 reads; sample 6 wraps to the first step
        let ticks = [
            c.tick_minus1,
            c.tick_minus1,
            c.tick_center,
            c.tick_plus1,
            c.tick_plus1,
            c.tick_center,
            c.tick_minus1,
        ];
        let expected: u64 = ticks.iter().map(|t| 4 * (t + 1)).sum();
        assert_eq!(counter.current(), expected);
    }

    #[test]
    fn test_warmup_spins_on_counter() {
        let counter = StepCounter::new(0, 1);
        let engine = MeasurementEngine::new(&counter, |_: FftLoadLevel| {});
        let scheduler = Scheduler::new(engine, &cal());
        scheduler.warmup(1_000);
        assert_eq!(counter.current(), 1_001);
    }
}
