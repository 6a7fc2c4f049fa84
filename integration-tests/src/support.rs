use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use primewalk::checkpoint::CheckpointManager;
use primewalk::config::RunConfig;
use primewalk::error::StatsError;
use primewalk::oracle::{PrimalityTest, TrialDivision};
use primewalk::state::Dimensions;
use primewalk::stats::{CaseReport, StatsSink};
use tempfile::TempDir;

#[derive(Clone, Debug, Default)]
pub struct SinkState {
    pub checkpoints: Vec<CheckpointEvent>,
    pub finished: Vec<Vec<CaseReport>>,
}

#[derive(Clone, Debug)]
pub struct CheckpointEvent {
    pub cursor: i64,
    pub bound: i64,
    pub reports: Vec<CaseReport>,
}

impl SinkState {
    pub fn cursors(&self) -> Vec<i64> {
        self.checkpoints.iter().map(|e| e.cursor).collect()
    }
}

#[derive(Clone, Default)]
pub struct RecordingSink {
    state: Arc<Mutex<SinkState>>,
}

impl RecordingSink {
    pub fn new() -> (Self, Arc<Mutex<SinkState>>) {
        let state = Arc::new(Mutex::new(SinkState::default()));
        (Self { state: Arc::clone(&state) }, state)
    }
}

impl StatsSink for RecordingSink {
    fn on_checkpoint(&mut self, cursor: i64, bound: i64, reports: &[CaseReport]) -> Result<(), StatsError> {
        let mut guard = self.state.lock().expect("sink state poisoned");
        guard.checkpoints.push(CheckpointEvent { cursor, bound, reports: reports.to_vec() });
        Ok(())
    }

    fn on_finish(&mut self, reports: &[CaseReport]) -> Result<(), StatsError> {
        let mut guard = self.state.lock().expect("sink state poisoned");
        guard.finished.push(reports.to_vec());
        Ok(())
    }
}

pub fn sink_state_snapshot(state: &Arc<Mutex<SinkState>>) -> SinkState {
    state.lock().expect("sink state poisoned").clone()
}

/// Trial division that counts how often it is consulted.
#[derive(Clone, Default)]
pub struct CountingTest {
    calls: Arc<AtomicU64>,
}

impl CountingTest {
    pub fn new() -> (Self, Arc<AtomicU64>) {
        let calls = Arc::new(AtomicU64::new(0));
        (Self { calls: Arc::clone(&calls) }, calls)
    }
}

impl PrimalityTest for CountingTest {
    fn is_prime(&self, n: i64) -> bool {
        self.calls.fetch_add(1, Ordering::Relaxed);
        TrialDivision.is_prime(n)
    }
}

pub fn scratch_dir() -> TempDir {
    tempfile::tempdir().expect("create scratch dir")
}

pub fn checkpoint_in(dir: &Path) -> CheckpointManager {
    CheckpointManager::new(checkpoint_path(dir))
}

pub fn checkpoint_path(dir: &Path) -> PathBuf {
    dir.join("state.ckpt")
}

pub fn run_config(cases: &[&str], min: i64, max: i64, checkpoint_interval: u64) -> RunConfig {
    RunConfig {
        min,
        max,
        checkpoint_interval,
        cases: cases.iter().map(|c| c.to_string()).collect(),
        ..RunConfig::default()
    }
}

pub fn spatial(cfg: RunConfig) -> RunConfig {
    RunConfig { dimensions: Dimensions::Spatial, ..cfg }
}
