use std::io::{self, Write};

use crate::calibrate::{CalibrationData, TickOffset};
use crate::error::Error;
use crate::load::FftLoadLevel;
use crate::scheduler::{CampaignResults, ConfigKind, PatternName, Progress};
use crate::stats::{self, Statistics, BIN_WIDTH, FULL_REPORT_BINS};

const RULE: &str = "========================================================";

/// `1M`, `30K`, or the plain number.
pub fn format_count(n: usize) -> String {
    if n >= 1_000_000 && n % 1_000_000 == 0 {
        format!("{}M", n / 1_000_000)
    } else if n >= 1_000 && n % 1_000 == 0 {
        format!("{}K", n / 1_000)
    } else {
        format!("{}", n)
    }
}

/// Period of a target frequency in microseconds.
fn period_us(target_hz: u64) -> f64 {
    1_000_000.0 / target_hz as f64
}

pub fn write_calibration(cal: &CalibrationData, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "CPU Frequency: {:.2} GHz", cal.cpu_freq_ghz())?;
    writeln!(out, "Calibrated for 3.6us base period (277.3 kHz region):")?;
    for offset in TickOffset::ALL {
        let target = offset.target_hz();
        let center = if offset == TickOffset::Center { ", center" } else { "" };
        writeln!(
            out,
            "  Tick {} -> {:.1} kHz ({:.3} us{})",
            cal.tick(offset),
            target as f64 / 1000.0,
            period_us(target),
            center
        )?;
    }
    writeln!(out)
}

pub fn write_campaign_banner(samples: usize, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "Target: 277.3 kHz region (+/-1 kHz)")?;
    writeln!(out, "Iterations: {} per configuration", format_count(samples))?;
    writeln!(out, "Configurations: 32 (12 Static + 20 Dynamic)")?;
    writeln!(out, "Patterns:")?;
    for pattern in PatternName::ALL {
        writeln!(out, "  {}: {}", pattern.name(), pattern.notation())?;
    }
    writeln!(out, "{}", RULE)?;
    writeln!(out)
}

/// `<key> (<N>)...` on start, ` done` on finish.
pub fn write_progress(progress: &Progress<'_>, out: &mut dyn Write) -> io::Result<()> {
    match progress {
        Progress::Started { config, samples } => {
            write!(out, "{} ({})...", config.key(), format_count(*samples))?;
        }
        Progress::Finished => {
            writeln!(out, " done")?;
        }
    }
    out.flush()
}

pub fn write_full_report(name: &str, stats: &Statistics, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{}:", name)?;
    writeln!(out, "  Average: {:.2}", stats.avg)?;
    writeln!(out, "  Std Dev: {:.2}", stats.std_dev)?;
    writeln!(out, "  Range: [{}, {}]", stats.min, stats.max)?;
    writeln!(out, "  Histogram (Top {} bins):", FULL_REPORT_BINS)?;
    for bin in stats.top_bins(FULL_REPORT_BINS) {
        writeln!(
            out,
            "    [{}-{}]: {} ({:.2}%)",
            bin.start,
            bin.start + BIN_WIDTH - 1,
            bin.count,
            bin.percent
        )?;
    }
    writeln!(out)
}

/// Full reports grouped as static-by-level, then dynamic-by-level.
pub fn write_campaign_report(results: &CampaignResults, out: &mut dyn Write) -> Result<(), Error> {
    writeln!(out, "\n{}", RULE)?;
    writeln!(out, "Statistical Analysis")?;
    writeln!(out, "{}\n", RULE)?;

    for level in FftLoadLevel::ALL {
        let profile = level.profile();
        writeln!(
            out,
            "--- FFT {} ({}) + Tick Variations ---\n",
            profile.label, profile.duration
        )?;
        for entry in results
            .of_kind(ConfigKind::Static)
            .filter(|e| e.config.level == level)
        {
            let summary = stats::summarize(&entry.samples)?;
            write_full_report(&entry.config.key(), &summary, out)?;
        }
    }

    writeln!(out, "--- Dynamic Transition (5 patterns x 4 FFT) ---\n")?;
    for entry in results.of_kind(ConfigKind::Dynamic) {
        let summary = stats::summarize(&entry.samples)?;
        write_full_report(&entry.config.key(), &summary, out)?;
    }

    writeln!(out, "{}", RULE)?;
    writeln!(out, "Done.")?;
    Ok(())
}
