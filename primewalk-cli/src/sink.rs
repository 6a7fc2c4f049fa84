use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use log::info;
use primewalk::error::StatsError;
use primewalk::stats::{CaseReport, StatsSink};

/// Appends one CSV line per case at every checkpoint.
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn append(&self, cursor: i64, reports: &[CaseReport]) -> io::Result<()> {
        let fresh = !self.path.exists();
        let mut file: File = OpenOptions::new().create(true).append(true).open(&self.path)?;
        if fresh {
            writeln!(file, "{}", CaseReport::CSV_HEADER)?;
        }
        for report in reports {
            writeln!(file, "{}", report.csv_row(cursor))?;
        }
        Ok(())
    }
}

impl StatsSink for CsvSink {
    fn on_checkpoint(&mut self, cursor: i64, bound: i64, reports: &[CaseReport]) -> Result<(), StatsError> {
        self.append(cursor, reports)?;
        info!(
            "k={cursor}/{bound} {}",
            reports.iter().map(|r| format!("{}:{}%", r.case, r.percent_primes)).collect::<Vec<_>>().join(" ")
        );
        Ok(())
    }

    fn on_finish(&mut self, reports: &[CaseReport]) -> Result<(), StatsError> {
        for r in reports {
            info!(
                "[{}] primes={} ({}%) composites={} ({}%) extent={}x{}x{} points={} fill={:.4}",
                r.case,
                r.primes,
                r.percent_primes,
                r.composites,
                r.percent_composites,
                r.extent.x,
                r.extent.y,
                r.extent.z,
                r.point_count,
                r.fill_ratio
            );
        }
        info!("statistics written to {}", self.path.display());
        Ok(())
    }
}
