//! The main iteration loop.
//!
//! Every case is stepped for iteration `k` before any case sees `k + 1`. The driver owns the
//! working [`Snapshot`] directly, so a checkpoint is a plain borrow of the live state.

use std::num::NonZeroU64;

use itertools::Itertools;
use log::{debug, info, warn};

use crate::checkpoint::{CaseTrack, CheckpointManager, Snapshot};
use crate::config::RunConfig;
use crate::error::WalkError;
use crate::generator::{CaseRegistry, SharedGenerator};
use crate::oracle::{PrimalityTest, PrimeOracle, TrialDivision};
use crate::state::{CaseState, Point};
use crate::stats::{CaseReport, StatsSink};
use crate::store::{ColorTag, PointStore, StoreMode};
use crate::turn;

pub struct Driver<S: StatsSink, T: PrimalityTest = TrialDivision> {
    config: RunConfig,
    interval: NonZeroU64,
    mode: StoreMode,
    // index-aligned with `snapshot.cases`
    generators: Vec<SharedGenerator>,
    snapshot: Snapshot,
    oracle: PrimeOracle<T>,
    checkpoints: Option<CheckpointManager>,
    sink: S,
}

impl<S: StatsSink> Driver<S, TrialDivision> {
    pub fn new(config: RunConfig, registry: &CaseRegistry, sink: S) -> Result<Self, WalkError> {
        let oracle = PrimeOracle::new(config.caching);
        Self::with_oracle(config, registry, oracle, sink)
    }
}

impl<S: StatsSink, T: PrimalityTest> Driver<S, T> {
    /// Builds a driver around a caller-supplied (typically pre-seeded) oracle.
    pub fn with_oracle(config: RunConfig, registry: &CaseRegistry, oracle: PrimeOracle<T>, sink: S) -> Result<Self, WalkError> {
        config.validate()?;
        let interval = config.interval()?;
        let mode = config.store_mode()?;
        let entries = registry.resolve(&config.cases)?;
        let generators = entries.iter().map(|e| e.generator.clone()).collect();
        let snapshot = Snapshot {
            cursor: config.min,
            start: config.min,
            dimensions: config.dimensions,
            cases: entries.iter().map(|e| fresh_track(&e.id, mode)).collect::<Result<_, _>>()?,
        };
        Ok(Self { config, interval, mode, generators, snapshot, oracle, checkpoints: None, sink })
    }

    pub fn with_checkpoints(mut self, manager: CheckpointManager) -> Self {
        self.checkpoints = Some(manager);
        self
    }

    /// Runs from the current cursor (or a restored checkpoint) up to `max`.
    pub fn run(&mut self) -> Result<(), WalkError> {
        if self.config.resume {
            self.resume();
        }
        let bound = self.config.max;
        let dims = self.snapshot.dimensions;
        info!(
            "run started: cases=[{}] range=[{}, {bound}) dimensions={dims:?} caching={} dedup={} lifetime={:?}",
            self.snapshot.case_ids().join(","),
            self.snapshot.cursor,
            self.oracle.is_caching(),
            self.mode.dedup,
            self.mode.lifetime
        );

        let mut reported_at = None;
        while self.snapshot.cursor < bound {
            let k = self.snapshot.cursor;
            for (generator, track) in self.generators.iter().zip(self.snapshot.cases.iter_mut()) {
                let n = generator.generate(k, &track.state);
                let outcome = turn::step(&mut self.oracle, n, &mut track.state, dims)?;
                track.store.record(track.state.position, outcome.color())?;
            }
            self.snapshot.cursor = k + 1;
            if (k + 1).abs_diff(self.snapshot.start) % self.interval.get() == 0 {
                self.checkpoint(bound)?;
                reported_at = Some(self.snapshot.cursor);
            }
        }

        if reported_at != Some(self.snapshot.cursor) {
            self.checkpoint(bound)?;
        }
        let reports = self.reports();
        self.sink.on_finish(&reports)?;
        info!(
            "run finished at k={} (prime tests run={}, known primes={}, known composites={})",
            self.snapshot.cursor,
            self.oracle.tests_run(),
            self.oracle.known_prime_count(),
            self.oracle.known_composite_count()
        );
        Ok(())
    }

    fn checkpoint(&mut self, bound: i64) -> Result<(), WalkError> {
        let reports = self.reports();
        self.sink.on_checkpoint(self.snapshot.cursor, bound, &reports)?;
        self.save()?;
        info!("{:.2}% completed (k={}/{bound})", self.progress(bound), self.snapshot.cursor);
        Ok(())
    }

    fn save(&self) -> Result<(), WalkError> {
        if let Some(manager) = &self.checkpoints {
            manager.save(&self.snapshot)?;
        }
        Ok(())
    }

    fn progress(&self, bound: i64) -> f64 {
        let total = bound.abs_diff(self.snapshot.start);
        if total == 0 {
            return 100.0;
        }
        self.snapshot.cursor.abs_diff(self.snapshot.start) as f64 * 100.0 / total as f64
    }

    fn resume(&mut self) {
        let Some(manager) = &self.checkpoints else {
            return;
        };
        let Some(restored) = manager.restore() else {
            debug!("no usable checkpoint at {}, starting fresh", manager.path().display());
            return;
        };
        if !restored.case_ids().eq(self.snapshot.case_ids()) {
            warn!(
                "checkpoint cases [{}] differ from selected cases [{}], starting fresh",
                restored.case_ids().join(","),
                self.snapshot.case_ids().join(",")
            );
            return;
        }
        if restored.dimensions != self.snapshot.dimensions {
            warn!("checkpoint was taken for a {:?} walk, starting fresh", restored.dimensions);
            return;
        }
        if restored.cases.iter().any(|c| c.store.mode() != self.mode) {
            warn!("checkpoint point store mode differs from the configured one, starting fresh");
            return;
        }
        info!("resuming from checkpoint {} at k={}", manager.path().display(), restored.cursor);
        self.snapshot = restored;
    }

    pub fn reports(&self) -> Vec<CaseReport> {
        self.snapshot.cases.iter().map(|c| CaseReport::collect(c, self.snapshot.dimensions)).collect()
    }

    /// Per-case state and point columns, in selection order.
    pub fn cases(&self) -> &[CaseTrack] {
        &self.snapshot.cases
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn cursor(&self) -> i64 {
        self.snapshot.cursor
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn oracle(&self) -> &PrimeOracle<T> {
        &self.oracle
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

fn fresh_track(id: &str, mode: StoreMode) -> Result<CaseTrack, WalkError> {
    let mut store = PointStore::new(mode);
    store.record(Point::ORIGIN, ColorTag::NoTurn)?;
    Ok(CaseTrack { id: id.to_string(), state: CaseState::new(), store })
}
