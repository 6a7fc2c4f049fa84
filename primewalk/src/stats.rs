use log::{debug, info};
use serde::Serialize;

use crate::checkpoint::CaseTrack;
use crate::error::StatsError;
use crate::state::Dimensions;
use crate::store::Extent;

/// Per-case summary handed to a [`StatsSink`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CaseReport {
    pub case: String,
    pub iterations: u64,
    pub primes: u64,
    pub percent_primes: u64,
    pub composites: u64,
    pub percent_composites: u64,
    pub extent: Extent,
    pub point_count: usize,
    /// Stored points per lattice cell of the bounding box.
    pub fill_ratio: f64,
}

impl CaseReport {
    pub fn collect(track: &CaseTrack, dims: Dimensions) -> Self {
        let stats = track.state.stats;
        let extent = track.store.bounding_extent();
        let point_count = track.store.len();
        let cells = extent.cells(dims);
        let fill_ratio = if cells == 0 { 0.0 } else { point_count as f64 / cells as f64 };
        Self {
            case: track.id.clone(),
            iterations: stats.iterations,
            primes: stats.primes,
            percent_primes: rounded_percent(stats.primes, stats.iterations),
            composites: stats.composites,
            percent_composites: rounded_percent(stats.composites, stats.iterations),
            extent,
            point_count,
            fill_ratio,
        }
    }

    pub const CSV_HEADER: &'static str =
        "cursor,case,iterations,primes,percent_primes,composites,percent_composites,extent_x,extent_y,extent_z,points,fill_ratio";

    pub fn csv_row(&self, cursor: i64) -> String {
        format!(
            "{cursor},{},{},{},{},{},{},{},{},{},{},{:.6}",
            self.case,
            self.iterations,
            self.primes,
            self.percent_primes,
            self.composites,
            self.percent_composites,
            self.extent.x,
            self.extent.y,
            self.extent.z,
            self.point_count,
            self.fill_ratio
        )
    }
}

/// `part * 100 / total`, rounded half up. Zero when `total` is zero.
pub fn rounded_percent(part: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    let part = u128::from(part);
    let total = u128::from(total);
    // floor(x + 0.5) == floor((2 * part * 100 + total) / (2 * total))
    ((part * 200 + total) / (total * 2)) as u64
}

/// Receives statistics at every checkpoint and once at the end of a run.
pub trait StatsSink {
    /// `cursor` is the next iteration to run, `bound` the exclusive end of the range.
    fn on_checkpoint(&mut self, cursor: i64, bound: i64, reports: &[CaseReport]) -> Result<(), StatsError>;

    fn on_finish(&mut self, reports: &[CaseReport]) -> Result<(), StatsError>;
}

/// Writes reports to the log and nowhere else.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl StatsSink for LogSink {
    fn on_checkpoint(&mut self, cursor: i64, bound: i64, reports: &[CaseReport]) -> Result<(), StatsError> {
        for r in reports {
            debug!(
                "[{}] k={cursor}/{bound} primes={} ({}%) composites={} ({}%) points={}",
                r.case, r.primes, r.percent_primes, r.composites, r.percent_composites, r.point_count
            );
        }
        Ok(())
    }

    fn on_finish(&mut self, reports: &[CaseReport]) -> Result<(), StatsError> {
        for r in reports {
            info!(
                "[{}] finished: iterations={} primes={}% extent={}x{}x{} points={} fill={:.4}",
                r.case, r.iterations, r.percent_primes, r.extent.x, r.extent.y, r.extent.z, r.point_count, r.fill_ratio
            );
        }
        Ok(())
    }
}

impl<S: StatsSink + ?Sized> StatsSink for &mut S {
    fn on_checkpoint(&mut self, cursor: i64, bound: i64, reports: &[CaseReport]) -> Result<(), StatsError> {
        (**self).on_checkpoint(cursor, bound, reports)
    }

    fn on_finish(&mut self, reports: &[CaseReport]) -> Result<(), StatsError> {
        (**self).on_finish(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CaseState, CaseStats, Point};
    use crate::store::{ColorTag, PointStore, StoreMode};

    #[test]
    fn percentages_round_half_up() {
        assert_eq!(rounded_percent(0, 0), 0);
        assert_eq!(rounded_percent(1, 3), 33);
        assert_eq!(rounded_percent(2, 3), 67);
        assert_eq!(rounded_percent(1, 8), 13); // 12.5
        assert_eq!(rounded_percent(1, 200), 1); // 0.5
        assert_eq!(rounded_percent(1, 201), 0);
        assert_eq!(rounded_percent(7, 7), 100);
        assert_eq!(rounded_percent(u64::MAX, u64::MAX), 100);
    }

    #[test]
    fn report_from_track() {
        let mut store = PointStore::new(StoreMode::new(true, None).unwrap());
        for (x, y) in [(0, 0), (1, 0), (1, 1)] {
            store.record(Point::planar(x, y), ColorTag::NoTurn).unwrap();
        }
        let state = CaseState { stats: CaseStats { primes: 1, composites: 2, iterations: 3 }, ..CaseState::new() };
        let track = CaseTrack { id: "c5".into(), state, store };
        let report = CaseReport::collect(&track, Dimensions::Planar);
        assert_eq!(report.percent_primes, 33);
        assert_eq!(report.percent_composites, 67);
        assert_eq!(report.extent, Extent { x: 2, y: 2, z: 1 });
        assert_eq!(report.point_count, 3);
        assert!((report.fill_ratio - 0.75).abs() < 1e-12);
        assert_eq!(report.csv_row(3), "3,c5,3,1,33,2,67,2,2,1,3,0.750000");
        assert_eq!(CaseReport::CSV_HEADER.split(',').count(), report.csv_row(3).split(',').count());
    }

    #[test]
    fn empty_track_reports_zeroes() {
        let track = CaseTrack { id: "c1".into(), state: CaseState::new(), store: PointStore::default() };
        let report = CaseReport::collect(&track, Dimensions::Spatial);
        assert_eq!(report.percent_primes, 0);
        assert_eq!(report.fill_ratio, 0.0);
    }
}
