// randtick/crates/randtick/src/sampler.rs

use std::time::Duration;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::error::{Result, TickerError};

/// Pick one interval uniformly from `[min, max)`.
///
/// Draws `r` in `[0, 1)` and returns `min + r * (max - min)`, truncated to
/// whole nanoseconds. `min == max` yields `min`. Reversed bounds are swapped
/// rather than rejected; callers wanting an error should go through
/// [`IntervalSampler::new`].
pub fn sample_interval<R: Rng>(rng: &mut R, min: Duration, max: Duration) -> Duration {
    let (lo, hi) = if max < min { (max, min) } else { (min, max) };
    let span = hi - lo;
    if span.is_zero() {
        return lo;
    }

    let span_nanos = span.as_nanos();
    let r: f64 = rng.random();
    let offset = ((span_nanos as f64) * r) as u128;
    // f64 rounding can land exactly on the span for r close to 1
    let offset = offset.min(span_nanos - 1);

    lo + nanos_to_duration(offset)
}

fn nanos_to_duration(nanos: u128) -> Duration {
    const NANOS_PER_SEC: u128 = 1_000_000_000;
    let secs = u64::try_from(nanos / NANOS_PER_SEC).unwrap_or(u64::MAX);
    Duration::new(secs, (nanos % NANOS_PER_SEC) as u32)
}

/// A validated `[min, max)` range bundled with its own RNG.
#[derive(Debug, Clone)]
pub struct IntervalSampler {
    min: Duration,
    max: Duration,
    rng: StdRng,
}

impl IntervalSampler {
    /// Sampler seeded from the thread RNG. Rejects `max < min` and a zero
    /// `max`.
    pub fn new(min: Duration, max: Duration) -> Result<Self> {
        Self::with_seed(min, max, rand::rng().random())
    }

    /// Sampler with a fixed seed; the same seed always yields the same
    /// interval sequence.
    pub fn with_seed(min: Duration, max: Duration, seed: u64) -> Result<Self> {
        validate_range(min, max)?;
        Ok(Self {
            min,
            max,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn next_interval(&mut self) -> Duration {
        sample_interval(&mut self.rng, self.min, self.max)
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// Derive an independent sampler over the same range. Used to hand each
    /// emission loop its own generator while keeping the parent reproducible.
    pub(crate) fn fork(&mut self) -> Self {
        Self {
            min: self.min,
            max: self.max,
            rng: StdRng::seed_from_u64(self.rng.random()),
        }
    }
}

pub(crate) fn validate_range(min: Duration, max: Duration) -> Result<()> {
    if max < min {
        return Err(TickerError::InvalidRange { min, max });
    }
    if max.is_zero() {
        return Err(TickerError::ZeroInterval);
    }
    Ok(())
}
