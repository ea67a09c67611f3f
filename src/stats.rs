use std::collections::BTreeMap;

use crate::error::Error;

/// Width of a histogram bin, in busy-loop iterations.
pub const BIN_WIDTH: i64 = 20;

/// Number of bins shown in a full report.
pub const FULL_REPORT_BINS: usize = 10;

/// Summary of one sample batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub count: usize,
    pub avg: f64,
    /// Population standard deviation (divides by N).
    pub std_dev: f64,
    pub min: i64,
    pub max: i64,
    /// Bin start (multiple of `BIN_WIDTH`) to number of samples.
    pub histogram: BTreeMap<i64, u64>,
}

/// A histogram bin with its share of the batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinShare {
    pub start: i64,
    pub count: u64,
    pub percent: f64,
}

/// Per-visit summary written to the campaign log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuickStats {
    pub avg: f64,
    pub std_dev: f64,
    pub peak_bin: i64,
    pub peak_percent: f64,
}

/// Start of the bin holding `value`, using floor division so negative
/// values land in the bin below zero.
pub fn bin_start(value: i64) -> i64 {
    value.div_euclid(BIN_WIDTH) * BIN_WIDTH
}

pub fn histogram(data: &[i64]) -> BTreeMap<i64, u64> {
    let mut bins = BTreeMap::new();
    for &v in data {
        *bins.entry(bin_start(v)).or_insert(0) += 1;
    }
    bins
}

/// Mean, population standard deviation, range and histogram of `data`.
pub fn summarize(data: &[i64]) -> Result<Statistics, Error> {
    if data.is_empty() {
        return Err(Error::InsufficientData(
            "cannot summarize an empty sample batch".into(),
        ));
    }

    let n = data.len() as f64;
    let sum: i128 = data.iter().map(|&v| v as i128).sum();
    let avg = sum as f64 / n;

    let variance = data
        .iter()
        .map(|&v| {
            let d = v as f64 - avg;
            d * d
        })
        .sum::<f64>()
        / n;

    let mut min = data[0];
    let mut max = data[0];
    for &v in &data[1..] {
        min = min.min(v);
        max = max.max(v);
    }

    Ok(Statistics {
        count: data.len(),
        avg,
        std_dev: variance.sqrt(),
        min,
        max,
        histogram: histogram(data),
    })
}

impl Statistics {
    /// All bins, most populated first; ties go to the lower bin.
    pub fn ranked_bins(&self) -> Vec<BinShare> {
        let n = self.count as f64;
        let mut bins: Vec<BinShare> = self
            .histogram
            .iter()
            .map(|(&start, &count)| BinShare {
                start,
                count,
                percent: count as f64 / n * 100.0,
            })
            .collect();
        bins.sort_by(|a, b| b.count.cmp(&a.count).then(a.start.cmp(&b.start)));
        bins
    }

    pub fn top_bins(&self, limit: usize) -> Vec<BinShare> {
        let mut bins = self.ranked_bins();
        bins.truncate(limit);
        bins
    }

    pub fn quick(&self) -> QuickStats {
        // summarize() never builds an empty histogram
        let peak = self.top_bins(1).first().copied().unwrap_or(BinShare {
            start: 0,
            count: 0,
            percent: 0.0,
        });
        QuickStats {
            avg: self.avg,
            std_dev: self.std_dev,
            peak_bin: peak.start,
            peak_percent: peak.percent,
        }
    }
}

pub fn quick_stats(data: &[i64]) -> Result<QuickStats, Error> {
    summarize(data).map(|s| s.quick())
}
