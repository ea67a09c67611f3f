pub mod fft;
pub mod qubit;

use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;

/// Preset FFT workload, named after the share of the 3.6us base period it
/// was sized to occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FftLoadLevel {
    Load75,
    Load80,
    Load85,
    Load90,
}

/// Static parameters of one load level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProfile {
    pub label: &'static str,
    pub duration: &'static str,
    pub size: usize,
    pub repeats: u32,
}

const PROFILES: [LoadProfile; 4] = [
    LoadProfile { label: "75%", duration: "2.70us", size: 64, repeats: 4 },
    LoadProfile { label: "80%", duration: "2.88us", size: 64, repeats: 5 },
    LoadProfile { label: "85%", duration: "3.06us", size: 128, repeats: 6 },
    LoadProfile { label: "90%", duration: "3.24us", size: 128, repeats: 8 },
];

impl FftLoadLevel {
    pub const ALL: [FftLoadLevel; 4] = [
        FftLoadLevel::Load75,
        FftLoadLevel::Load80,
        FftLoadLevel::Load85,
        FftLoadLevel::Load90,
    ];

    pub fn profile(self) -> &'static LoadProfile {
        &PROFILES[self as usize]
    }

    pub fn label(self) -> &'static str {
        self.profile().label
    }
}

/// CPU burst executed between the baseline and loaded windows of a sample.
pub trait Workload {
    fn run(&mut self, level: FftLoadLevel);
}

impl<F: FnMut(FftLoadLevel)> Workload for F {
    fn run(&mut self, level: FftLoadLevel) {
        self(level)
    }
}

/// FFT round trips followed by the fixed qubit gate sequence.
pub struct SyntheticLoad {
    rng: ChaCha8Rng,
}

impl SyntheticLoad {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Workload for SyntheticLoad {
    #[inline]
    fn run(&mut self, level: FftLoadLevel) {
        fft::run_fft_load(level);
        qubit::run_quantum_load(&mut self.rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_table() {
        let expected = [("75%", 64, 4), ("80%", 64, 5), ("85%", 128, 6), ("90%", 128, 8)];
        for (level, (label, size, repeats)) in FftLoadLevel::ALL.iter().zip(expected) {
            let p = level.profile();
            assert_eq!(p.label, label);
            assert_eq!(p.size, size);
            assert_eq!(p.repeats, repeats);
            assert!(p.size.is_power_of_two());
        }
    }

    #[test]
    fn test_closure_workload_sees_level() {
        let mut seen = Vec::new();
        {
            let mut load = |level: FftLoadLevel| seen.push(level);
            load.run(FftLoadLevel::Load85);
            load.run(FftLoadLevel::Load75);
        }
        assert_eq!(seen, vec![FftLoadLevel::Load85, FftLoadLevel::Load75]);
    }

    #[test]
    fn test_synthetic_load_runs_every_level() {
        let mut load = SyntheticLoad::new(7);
        for level in FftLoadLevel::ALL {
            load.run(level);
        }
    }
}
