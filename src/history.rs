//! # History Deletion Sampling
//!
//! Decides whether the history of a completed workflow is eligible for cleanup.
//!
//! The default policy is a statistical throttle: each call draws a uniform integer
//! in `[0, 10)` and returns `true` only for `0`, so roughly one in ten completed
//! workflows has its history deleted. The randomness source is a trait object so
//! that callers can substitute a deterministic one.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::Arc;

use crate::constants::defaults;

/// Uniform integer sampler used by [`DeleteHistoryCondition::Sampled`]
pub trait RandomSource: Send + Sync + fmt::Debug {
    /// Draw a uniformly distributed integer in `[0, bound)`. `bound` is never zero.
    fn next_below(&self, bound: u32) -> u32;
}

/// Default [`RandomSource`]: a seeded `StdRng` behind a mutex so concurrent draws
/// never interleave generator state.
pub struct ThreadSafeRng {
    rng: Mutex<StdRng>,
}

impl ThreadSafeRng {
    /// Seed from operating system entropy
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sequence for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for ThreadSafeRng {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ThreadSafeRng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadSafeRng").finish_non_exhaustive()
    }
}

impl RandomSource for ThreadSafeRng {
    fn next_below(&self, bound: u32) -> u32 {
        self.rng.lock().gen_range(0..bound)
    }
}

/// Policy deciding, per call, whether a completed workflow's history may be deleted
#[derive(Clone)]
pub enum DeleteHistoryCondition {
    /// True iff a draw from `random` in `[0, one_in)` is zero
    Sampled {
        random: Arc<dyn RandomSource>,
        one_in: u32,
    },
    /// Caller supplied predicate
    Custom(Arc<dyn Fn() -> bool + Send + Sync>),
}

impl DeleteHistoryCondition {
    /// Sample roughly one in `one_in` calls. `one_in == 0` never deletes.
    pub fn sampled(random: Arc<dyn RandomSource>, one_in: u32) -> Self {
        Self::Sampled { random, one_in }
    }

    /// The default one-in-ten sampler
    pub fn default_sampler(random: Arc<dyn RandomSource>) -> Self {
        Self::sampled(random, defaults::DELETE_HISTORY_ONE_IN)
    }

    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(predicate))
    }

    pub fn always() -> Self {
        Self::custom(|| true)
    }

    pub fn never() -> Self {
        Self::custom(|| false)
    }

    /// Evaluate the policy once
    pub fn evaluate(&self) -> bool {
        match self {
            Self::Sampled { one_in: 0, .. } => false,
            Self::Sampled { random, one_in } => random.next_below(*one_in) == 0,
            Self::Custom(predicate) => predicate(),
        }
    }
}

impl fmt::Debug for DeleteHistoryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sampled { one_in, .. } => f
                .debug_struct("Sampled")
                .field("one_in", one_in)
                .finish_non_exhaustive(),
            Self::Custom(_) => f.write_str("Custom"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Returns whatever was last stored, and records the requested bound
    #[derive(Debug, Default)]
    struct FixedRandom {
        value: AtomicU32,
        last_bound: AtomicU32,
    }

    impl RandomSource for FixedRandom {
        fn next_below(&self, bound: u32) -> u32 {
            self.last_bound.store(bound, Ordering::SeqCst);
            self.value.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn test_default_sampler_draws_below_ten() {
        let random = Arc::new(FixedRandom::default());
        let condition = DeleteHistoryCondition::default_sampler(random.clone());

        assert!(condition.evaluate());
        assert_eq!(random.last_bound.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_sampler_true_only_for_zero() {
        let random = Arc::new(FixedRandom::default());
        let condition = DeleteHistoryCondition::default_sampler(random.clone());

        for draw in 1..10 {
            random.value.store(draw, Ordering::SeqCst);
            assert!(!condition.evaluate(), "draw {draw} should not delete");
        }
        random.value.store(0, Ordering::SeqCst);
        assert!(condition.evaluate());
    }

    #[test]
    fn test_zero_rate_never_draws() {
        let random = Arc::new(FixedRandom::default());
        let condition = DeleteHistoryCondition::sampled(random.clone(), 0);

        assert!(!condition.evaluate());
        assert_eq!(random.last_bound.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_custom_conditions() {
        assert!(DeleteHistoryCondition::always().evaluate());
        assert!(!DeleteHistoryCondition::never().evaluate());
    }

    #[test]
    fn test_thread_safe_rng_stays_in_range() {
        let rng = ThreadSafeRng::seeded(42);
        for _ in 0..1000 {
            assert!(rng.next_below(10) < 10);
        }
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let a = ThreadSafeRng::seeded(7);
        let b = ThreadSafeRng::seeded(7);
        let draws_a: Vec<u32> = (0..20).map(|_| a.next_below(1000)).collect();
        let draws_b: Vec<u32> = (0..20).map(|_| b.next_below(1000)).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[test]
    fn test_sampling_rate_is_roughly_one_in_ten() {
        let condition = DeleteHistoryCondition::default_sampler(Arc::new(ThreadSafeRng::seeded(1)));
        let deleted = (0..10_000).filter(|_| condition.evaluate()).count();
        assert!((700..1300).contains(&deleted), "deleted {deleted} of 10000");
    }

    #[test]
    fn test_concurrent_draws() {
        let condition = DeleteHistoryCondition::default_sampler(Arc::new(ThreadSafeRng::new()));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let condition = condition.clone();
                std::thread::spawn(move || (0..1000).filter(|_| condition.evaluate()).count())
            })
            .collect();

        let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert!(total < 4000);
    }
}
