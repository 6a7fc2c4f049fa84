//! Cached primality answers.
//!
//! The oracle keeps two disjoint sets of integers whose verdicts are already known.
//! Membership in either set wins over recomputation, so a seeded value is never tested
//! again. With caching enabled every freshly computed verdict is remembered as well.

use std::collections::HashSet;

use itertools::Itertools;

use crate::error::ConfigError;

/// Decides primality from scratch, without any memory of earlier answers.
pub trait PrimalityTest {
    fn is_prime(&self, n: i64) -> bool;
}

/// Trial division by odd divisors up to √n.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrialDivision;

impl PrimalityTest for TrialDivision {
    fn is_prime(&self, n: i64) -> bool {
        if n <= 1 {
            return false;
        }
        if n == 2 {
            return true;
        }
        if n % 2 == 0 {
            return false;
        }
        let mut d: i64 = 3;
        // d <= n / d avoids overflowing d * d near i64::MAX
        while d <= n / d {
            if n % d == 0 {
                return false;
            }
            d += 2;
        }
        true
    }
}

#[derive(Clone, Debug)]
pub struct PrimeOracle<T = TrialDivision> {
    test: T,
    caching: bool,
    known_primes: HashSet<i64>,
    known_composites: HashSet<i64>,
    sorted_primes: Vec<i64>,
    tests_run: u64,
}

impl PrimeOracle<TrialDivision> {
    pub fn new(caching: bool) -> Self {
        Self::with_test(TrialDivision, caching)
    }
}

impl<T: PrimalityTest> PrimeOracle<T> {
    pub fn with_test(test: T, caching: bool) -> Self {
        Self {
            test,
            caching,
            known_primes: HashSet::new(),
            known_composites: HashSet::new(),
            sorted_primes: Vec::new(),
            tests_run: 0,
        }
    }

    pub fn is_prime(&mut self, n: i64) -> bool {
        if self.known_composites.contains(&n) {
            return false;
        }
        if self.known_primes.contains(&n) {
            return true;
        }
        self.tests_run += 1;
        let verdict = self.test.is_prime(n);
        if self.caching {
            if verdict {
                self.known_primes.insert(n);
            } else {
                self.known_composites.insert(n);
            }
        }
        verdict
    }

    /// Adds known verdicts in bulk. Returns how many values were new.
    ///
    /// Seeding is additive and independent of the caching flag. A value that already
    /// sits in the opposite set is rejected and nothing after it is added.
    pub fn seed<I>(&mut self, values: I, is_prime_set: bool) -> Result<usize, ConfigError>
    where
        I: IntoIterator<Item = i64>,
    {
        let mut added = 0;
        for value in values {
            let inserted = if is_prime_set { self.add_prime(value)? } else { self.add_composite(value)? };
            if inserted {
                added += 1;
            }
        }
        Ok(added)
    }

    pub fn add_prime(&mut self, n: i64) -> Result<bool, ConfigError> {
        if self.known_composites.contains(&n) {
            return Err(ConfigError::ConflictingSeed(n));
        }
        Ok(self.known_primes.insert(n))
    }

    pub fn add_composite(&mut self, n: i64) -> Result<bool, ConfigError> {
        if self.known_primes.contains(&n) {
            return Err(ConfigError::ConflictingSeed(n));
        }
        Ok(self.known_composites.insert(n))
    }

    /// Rebuilds the ascending view used by [`Self::kth_prime`].
    pub fn sort_primes(&mut self) {
        self.sorted_primes = self.known_primes.iter().copied().sorted_unstable().collect();
    }

    /// The `i`-th smallest known prime as of the last [`Self::sort_primes`] call.
    pub fn kth_prime(&self, i: usize) -> Option<i64> {
        self.sorted_primes.get(i).copied()
    }

    pub fn is_caching(&self) -> bool {
        self.caching
    }

    pub fn known_prime_count(&self) -> usize {
        self.known_primes.len()
    }

    pub fn known_composite_count(&self) -> usize {
        self.known_composites.len()
    }

    /// Number of times the underlying [`PrimalityTest`] actually ran.
    pub fn tests_run(&self) -> u64 {
        self.tests_run
    }

    pub fn primality_test(&self) -> &T {
        &self.test
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct CountingTest {
        calls: Cell<u64>,
    }

    impl PrimalityTest for CountingTest {
        fn is_prime(&self, n: i64) -> bool {
            self.calls.set(self.calls.get() + 1);
            TrialDivision.is_prime(n)
        }
    }

    #[test]
    fn small_primes() {
        let mut p = PrimeOracle::new(false);
        for n in [2, 3, 5, 7, 11, 97, 7919] {
            assert!(p.is_prime(n), "{n} should be prime");
        }
    }

    #[test]
    fn non_primes() {
        let mut p = PrimeOracle::new(false);
        for n in [1, 4, 6, 8, 9, 10, 25, 49, 3379995] {
            assert!(!p.is_prime(n), "{n} should not be prime");
        }
    }

    #[test]
    fn nothing_at_or_below_one_is_prime() {
        let mut p = PrimeOracle::new(true);
        for n in [-7, -2, -1, 0, 1, i64::MIN] {
            assert!(!p.is_prime(n));
        }
    }

    #[test]
    fn even_numbers_above_two_are_composite() {
        let mut p = PrimeOracle::new(false);
        assert!(p.is_prime(2));
        for n in (4..200).step_by(2) {
            assert!(!p.is_prime(n));
        }
    }

    #[test]
    fn divisor_loop_is_overflow_safe() {
        // 2^31 - 1 is a Mersenne prime; i64::MAX is divisible by 7
        assert!(TrialDivision.is_prime((1i64 << 31) - 1));
        assert!(!TrialDivision.is_prime(i64::MAX));
    }

    #[test]
    fn cached_lookup_skips_second_test() {
        let mut p = PrimeOracle::with_test(CountingTest::default(), true);
        assert!(p.is_prime(7919));
        assert!(p.is_prime(7919));
        assert!(!p.is_prime(7917));
        assert!(!p.is_prime(7917));
        assert_eq!(p.primality_test().calls.get(), 2);
        assert_eq!(p.tests_run(), 2);
        assert_eq!(p.known_prime_count(), 1);
        assert_eq!(p.known_composite_count(), 1);
    }

    #[test]
    fn uncached_lookup_always_tests() {
        let mut p = PrimeOracle::with_test(CountingTest::default(), false);
        p.is_prime(13);
        p.is_prime(13);
        assert_eq!(p.primality_test().calls.get(), 2);
        assert_eq!(p.known_prime_count(), 0);
    }

    #[test]
    fn seeded_sets_override_computation() {
        let mut p = PrimeOracle::with_test(CountingTest::default(), false);
        p.seed([9], true).unwrap();
        p.seed([11], false).unwrap();
        // membership is authoritative even when it disagrees with arithmetic
        assert!(p.is_prime(9));
        assert!(!p.is_prime(11));
        assert_eq!(p.primality_test().calls.get(), 0);
    }

    #[test]
    fn conflicting_seed_is_rejected() {
        let mut p = PrimeOracle::new(false);
        assert_eq!(p.seed([2, 3, 5], true), Ok(3));
        assert_eq!(p.seed([3, 3], true), Ok(0));
        assert_eq!(p.seed([4, 5], false), Err(ConfigError::ConflictingSeed(5)));
        assert_eq!(p.known_composite_count(), 1);
    }

    #[test]
    fn kth_prime_after_sort() {
        let mut p = PrimeOracle::new(false);
        for n in [7, 2, 5, 3] {
            p.add_prime(n).unwrap();
        }
        assert_eq!(p.kth_prime(0), None);
        p.sort_primes();
        p.sort_primes();
        assert_eq!(p.kth_prime(0), Some(2));
        assert_eq!(p.kth_prime(1), Some(3));
        assert_eq!(p.kth_prime(2), Some(5));
        assert_eq!(p.kth_prime(4), None);
    }
}
