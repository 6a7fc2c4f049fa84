use std::path::{Path, PathBuf};

use anyhow::Context;
use primewalk::config::RunConfig;
use serde::{Deserialize, Serialize};

pub const CHECKPOINT_FILE: &str = "state.ckpt";
pub const STATS_FILE: &str = "stats.csv";

/// Contents of a `--config` file.
///
/// ```toml
/// output = "runs"
/// primes = "seeds/primes.txt"
///
/// [run]
/// max = 100000
/// cases = ["c1", "c4"]
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub output: PathBuf,
    pub primes: Option<PathBuf>,
    pub composites: Option<PathBuf>,
    pub run: RunConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { output: PathBuf::from("output"), primes: None, composites: None, run: RunConfig::default() }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Runs are grouped by their iteration bound.
    pub fn run_dir(&self) -> PathBuf {
        self.output.join(self.run.max.to_string())
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.run_dir().join(CHECKPOINT_FILE)
    }

    pub fn stats_path(&self) -> PathBuf {
        self.run_dir().join(STATS_FILE)
    }
}
