use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::state::Dimensions;
use crate::store::StoreMode;

pub const DEFAULT_MIN: i64 = 1;
pub const DEFAULT_MAX: i64 = 200_000;
pub const DEFAULT_CHECKPOINT_INTERVAL: u64 = 5_000;
/// Largest `|k|` for which every built-in formula (at most `30|k| + 1`) fits in an `i64`.
pub const MAX_ABS_ITERATION: i64 = (i64::MAX - 1) / 30;

/// Parameters of a single run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// First iteration index of a fresh run (inclusive).
    pub min: i64,
    /// Iteration bound (exclusive).
    pub max: i64,
    pub checkpoint_interval: u64,
    /// Remember every computed verdict in the oracle.
    pub caching: bool,
    pub dedup: bool,
    /// Starting lifetime of recorded points; `None` disables eviction.
    pub lifetime: Option<u32>,
    pub dimensions: Dimensions,
    pub cases: Vec<String>,
    /// Pick up from an existing checkpoint when one is present.
    pub resume: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN,
            max: DEFAULT_MAX,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            caching: false,
            dedup: true,
            lifetime: None,
            dimensions: Dimensions::Planar,
            cases: (1..=9).map(|i| format!("c{i}")).collect(),
            resume: true,
        }
    }
}

impl RunConfig {
    /// Checks everything that can be checked without the case registry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.interval()?;
        self.store_mode()?;
        if self.min > self.max {
            return Err(ConfigError::InvalidRange { min: self.min, max: self.max });
        }
        if self.min < -MAX_ABS_ITERATION || self.max > MAX_ABS_ITERATION + 1 {
            return Err(ConfigError::RangeOverflow { min: self.min, max: self.max, limit: MAX_ABS_ITERATION });
        }
        if self.cases.is_empty() {
            return Err(ConfigError::NoCases);
        }
        Ok(())
    }

    pub fn interval(&self) -> Result<NonZeroU64, ConfigError> {
        NonZeroU64::new(self.checkpoint_interval).ok_or(ConfigError::ZeroCheckpointInterval)
    }

    pub fn store_mode(&self) -> Result<StoreMode, ConfigError> {
        StoreMode::new(self.dedup, self.lifetime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = RunConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.cases.len(), 9);
        assert_eq!(cfg.cases[8], "c9");
    }

    #[test]
    fn zero_interval_is_rejected() {
        let cfg = RunConfig { checkpoint_interval: 0, ..RunConfig::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroCheckpointInterval));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let cfg = RunConfig { min: 10, max: 5, ..RunConfig::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidRange { min: 10, max: 5 }));
        let empty = RunConfig { min: 5, max: 5, ..RunConfig::default() };
        empty.validate().unwrap();
    }

    #[test]
    fn range_must_keep_formulas_in_bounds() {
        let widest = RunConfig { min: -MAX_ABS_ITERATION, max: MAX_ABS_ITERATION + 1, ..RunConfig::default() };
        widest.validate().unwrap();
        let limit = MAX_ABS_ITERATION;

        let cfg = RunConfig { max: MAX_ABS_ITERATION + 2, ..widest.clone() };
        assert_eq!(cfg.validate(), Err(ConfigError::RangeOverflow { min: -limit, max: limit + 2, limit }));
        let cfg = RunConfig { min: -MAX_ABS_ITERATION - 1, ..widest };
        assert_eq!(cfg.validate(), Err(ConfigError::RangeOverflow { min: -limit - 1, max: limit + 1, limit }));

        let near_top = RunConfig { min: i64::MAX / 10, max: i64::MAX / 10 + 2, ..RunConfig::default() };
        assert!(matches!(near_top.validate(), Err(ConfigError::RangeOverflow { .. })));
    }

    #[test]
    fn zero_lifetime_and_empty_cases_are_rejected() {
        let cfg = RunConfig { lifetime: Some(0), ..RunConfig::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroLifetime));
        let cfg = RunConfig { cases: vec![], ..RunConfig::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::NoCases));
    }
}
