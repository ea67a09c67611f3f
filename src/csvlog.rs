use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::error::Error;
use crate::load::FftLoadLevel;
use crate::scheduler::ConfigKind;
use crate::stats::QuickStats;

pub const HEADER: &str =
    "timestamp,hour,minute,type,fft_level,pattern,avg,std_dev,peak_bin,peak_percent";

/// One completed configuration visit of a boundary scan.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp: NaiveDateTime,
    pub kind: ConfigKind,
    pub fft_level: FftLoadLevel,
    pub pattern: String,
    pub stats: QuickStats,
}

/// Destination for campaign rows. Failures are reported, never retried.
pub trait RecordSink {
    fn append(&mut self, record: &LogRecord) -> Result<(), Error>;
}

#[cfg(test)]
impl RecordSink for Vec<LogRecord> {
    fn append(&mut self, record: &LogRecord) -> Result<(), Error> {
        self.push(record.clone());
        Ok(())
    }
}

/// Formats a record as one complete CSV line, newline included.
pub fn format_record(record: &LogRecord) -> String {
    format!(
        "{},{},{},{},{},{},{:.2},{:.2},{},{:.2}\n",
        record.timestamp.format("%Y-%m-%d %H:%M:%S"),
        record.timestamp.hour(),
        record.timestamp.minute(),
        record.kind.label(),
        record.fft_level.label(),
        record.pattern,
        record.stats.avg,
        record.stats.std_dev,
        record.stats.peak_bin,
        record.stats.peak_percent,
    )
}

/// Append-only CSV file; the header is written only into an empty file.
pub struct CsvLog {
    path: PathBuf,
}

impl CsvLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `<dir>/time_surface_<YYYY-MM-DD>.csv`
    pub fn for_date(dir: &Path, date: NaiveDate) -> Self {
        Self::new(dir.join(format!("time_surface_{}.csv", date.format("%Y-%m-%d"))))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the file with its header if it does not exist yet.
    pub fn ensure_header(&self) -> Result<(), Error> {
        self.write_line(None)
    }

    // Each call opens in append mode and issues a single write, so an
    // interrupted process leaves only whole rows behind.
    fn write_line(&self, row: Option<&str>) -> Result<(), Error> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut buf = String::new();
        if file.metadata()?.len() == 0 {
            buf.push_str(HEADER);
            buf.push('\n');
        }
        if let Some(row) = row {
            buf.push_str(row);
        }
        if buf.is_empty() {
            return Ok(());
        }

        file.write_all(buf.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

impl RecordSink for CsvLog {
    fn append(&mut self, record: &LogRecord) -> Result<(), Error> {
        self.write_line(Some(&format_record(record)))
    }
}
