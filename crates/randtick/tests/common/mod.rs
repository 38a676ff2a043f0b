use std::time::Duration;

use randtick::{IntervalSampler, RandomTicker};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Timer wheel granularity; paused-clock wakeups round up to the next ms.
pub const TIMER_SLACK: Duration = Duration::from_millis(1);

/// Install a test-friendly subscriber once per test binary.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("debug,randtick=trace"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_test_writer().with_target(true))
        .try_init();
}

pub fn seeded_ticker(min: Duration, max: Duration, seed: u64) -> RandomTicker {
    let sampler = IntervalSampler::with_seed(min, max, seed).expect("valid range");
    RandomTicker::with_sampler(sampler)
}
