use std::io::{self, Write};

use crate::config::BenchConfig;
use crate::cycles::CycleCounter;
use crate::error::Error;
use crate::load::Workload;
use crate::report;
use crate::scheduler::{CampaignResults, Scheduler};

/// Samples all 32 configurations once. Progress goes to `progress`, the
/// banner and the statistical report to `out`.
pub fn run_campaign<C, W>(
    scheduler: &mut Scheduler<C, W>,
    config: &BenchConfig,
    out: &mut dyn Write,
    progress: &mut dyn Write,
) -> Result<CampaignResults, Error>
where
    C: CycleCounter,
    W: Workload,
{
    report::write_campaign_banner(config.one_shot_samples, out)?;

    write!(out, "Warming up...")?;
    out.flush()?;
    scheduler.warmup(config.warmup_cycles);
    writeln!(out, " Done.\n")?;

    let mut failed: Option<io::Error> = None;
    let results = scheduler.run_one_shot(config.one_shot_samples, |p| {
        if failed.is_none() {
            if let Err(e) = report::write_progress(&p, progress) {
                failed = Some(e);
            }
        }
    });
    if let Some(e) = failed {
        log::warn!("progress output failed: {}", e);
    }

    log::debug!("collected {} configurations", results.len());
    for entry in results.entries() {
        log::debug!("{}: {} samples", entry.config.key(), entry.samples.len());
    }
    report::write_campaign_report(&results, out)?;
    Ok(results)
}

pub fn run<C, W>(scheduler: &mut Scheduler<C, W>, config: &BenchConfig) -> Result<(), Error>
where
    C: CycleCounter,
    W: Workload,
{
    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut out = stdout.lock();
    let mut progress = stderr.lock();
    run_campaign(scheduler, config, &mut out, &mut progress)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibrate::calibrate;
    use crate::cycles::StepCounter;
    use crate::load::FftLoadLevel;
    use crate::measure::MeasurementEngine;

    #[test]
    fn test_campaign_output() {
        let counter = StepCounter::new(0, 1);
        let engine = MeasurementEngine::new(&counter, |_: FftLoadLevel| {});
        let mut scheduler = Scheduler::new(engine, &calibrate(0));
        let config = BenchConfig {
            one_shot_samples: 2,
            warmup_cycles: 500,
            ..BenchConfig::default()
        };

        let mut out = Vec::new();
        let mut progress = Vec::new();
        let results = run_campaign(&mut scheduler, &config, &mut out, &mut progress).unwrap();

        assert_eq!(results.len(), 32);
        assert!(results.entries().iter().all(|e| e.samples.len() == 2));

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Iterations: 2 per configuration"));
        assert!(out.contains("Warming up... Done."));
        assert!(out.trim_end().ends_with("Done."));

        let progress = String::from_utf8(progress).unwrap();
        assert_eq!(progress.lines().count(), 32);
        assert_eq!(progress.lines().next(), Some("FFT75% Tick-1 (2)... done"));
        assert_eq!(progress.lines().last(), Some("Dynamic FFT90% Sweep (2)... done"));
    }
}
