//! Integer generators, one per case, and the registry that names them.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::state::CaseState;

/// Maps iteration `k` to the integer whose primality steers the case.
///
/// `state` is the case's state *before* the step, which gives access to the current
/// sign and the previously tested value. Both belong to this case alone; no generator
/// sees another case's values.
pub trait Generator {
    fn generate(&self, k: i64, state: &CaseState) -> i64;
}

impl<F> Generator for F
where
    F: Fn(i64, &CaseState) -> i64,
{
    fn generate(&self, k: i64, state: &CaseState) -> i64 {
        self(k, state)
    }
}

pub type SharedGenerator = Arc<dyn Generator + Send + Sync>;

#[derive(Clone)]
pub struct CaseEntry {
    pub id: String,
    pub title: String,
    pub generator: SharedGenerator,
}

impl fmt::Debug for CaseEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaseEntry").field("id", &self.id).field("title", &self.title).finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, Default)]
pub struct CaseRegistry {
    entries: Vec<CaseEntry>,
}

impl CaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The nine formulas of the classic prime-figure runs, `c1` through `c9`.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        let builtins: [(&str, &str, fn(i64, &CaseState) -> i64); 9] = [
            ("c1", "n=2k+1", |k, _| 2 * k + 1),
            ("c2", "n=6k+1", |k, _| 6 * k + 1),
            ("c3", "n=6k-1", |k, _| 6 * k - 1),
            ("c4", "n=6k-+1", |k, s| 6 * k - s.sign.value()),
            ("c5", "n=k", |k, _| k),
            ("c6", "n=30k+1", |k, _| 30 * k + 1),
            ("c7", "n=30k-1", |k, _| 30 * k - 1),
            ("c8", "n=30k-+1", |k, s| 30 * k - s.sign.value()),
            ("c9", "n=sum of decimal digits(k)", |k, _| digit_sum(k.unsigned_abs()) as i64),
        ];
        for (id, title, f) in builtins {
            registry.entries.push(CaseEntry { id: id.to_string(), title: title.to_string(), generator: Arc::new(f) });
        }
        registry
    }

    pub fn register<G>(&mut self, id: &str, title: &str, generator: G) -> Result<&mut Self, ConfigError>
    where
        G: Generator + Send + Sync + 'static,
    {
        if self.get(id).is_some() {
            return Err(ConfigError::AlreadyRegistered(id.to_string()));
        }
        self.entries.push(CaseEntry { id: id.to_string(), title: title.to_string(), generator: Arc::new(generator) });
        Ok(self)
    }

    pub fn get(&self, id: &str) -> Option<&CaseEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Looks up the requested cases in order, rejecting unknown and repeated ids.
    pub fn resolve(&self, ids: &[String]) -> Result<Vec<CaseEntry>, ConfigError> {
        if ids.is_empty() {
            return Err(ConfigError::NoCases);
        }
        let mut seen = HashSet::new();
        ids.iter()
            .map(|id| {
                if !seen.insert(id.as_str()) {
                    return Err(ConfigError::DuplicateCase(id.clone()));
                }
                self.get(id).cloned().ok_or_else(|| ConfigError::UnknownCase(id.clone()))
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CaseEntry> {
        self.entries.iter()
    }

    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.id.clone()).collect()
    }
}

pub fn digit_sum(mut n: u64) -> u64 {
    let mut sum = 0;
    while n > 0 {
        sum += n % 10;
        n /= 10;
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Sign;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn digit_sums() {
        assert_eq!(digit_sum(0), 0);
        assert_eq!(digit_sum(1), 1);
        assert_eq!(digit_sum(2), 2);
        assert_eq!(digit_sum(10), 1);
        assert_eq!(digit_sum(29), 11);
        assert_eq!(digit_sum(3435343698124), 55);
    }

    #[test]
    fn builtin_formulas() {
        let registry = CaseRegistry::builtin();
        let plus = CaseState::new();
        let minus = CaseState { sign: Sign::Minus, ..CaseState::new() };
        let value = |id: &str, k: i64, s: &CaseState| registry.get(id).unwrap().generator.generate(k, s);
        assert_eq!(value("c1", 5, &plus), 11);
        assert_eq!(value("c2", 5, &plus), 31);
        assert_eq!(value("c3", 5, &plus), 29);
        assert_eq!(value("c4", 5, &plus), 29);
        assert_eq!(value("c4", 5, &minus), 31);
        assert_eq!(value("c5", 5, &plus), 5);
        assert_eq!(value("c6", 2, &plus), 61);
        assert_eq!(value("c7", 2, &plus), 59);
        assert_eq!(value("c8", 2, &minus), 61);
        assert_eq!(value("c9", 1234, &plus), 10);
        assert_eq!(registry.ids().len(), 9);
    }

    #[test]
    fn custom_generator_can_use_previous_value() {
        let mut registry = CaseRegistry::new();
        registry.register("fib-ish", "n = previous + k", |k: i64, s: &CaseState| s.last_value + k).unwrap();
        let state = CaseState { last_value: 40, ..CaseState::new() };
        assert_eq!(registry.get("fib-ish").unwrap().generator.generate(2, &state), 42);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = CaseRegistry::builtin();
        let err = registry.register("c1", "again", |k: i64, _: &CaseState| k).unwrap_err();
        assert_eq!(err, ConfigError::AlreadyRegistered("c1".into()));
    }

    #[test]
    fn resolve_keeps_requested_order() {
        let registry = CaseRegistry::builtin();
        let resolved = registry.resolve(&ids(&["c9", "c1"])).unwrap();
        assert_eq!(resolved.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(), ["c9", "c1"]);
    }

    #[test]
    fn resolve_rejects_bad_selections() {
        let registry = CaseRegistry::builtin();
        assert_eq!(registry.resolve(&[]).unwrap_err(), ConfigError::NoCases);
        assert_eq!(registry.resolve(&ids(&["c1", "c10"])).unwrap_err(), ConfigError::UnknownCase("c10".into()));
        assert_eq!(registry.resolve(&ids(&["c2", "c2"])).unwrap_err(), ConfigError::DuplicateCase("c2".into()));
    }
}
