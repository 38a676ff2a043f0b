// randtick/crates/randtick/src/lib.rs

pub mod config;
pub mod error;
pub mod sampler;
pub mod stats;
pub mod ticker;

pub use config::{Overflow, TickerConfig};
pub use error::{Result, TickerError};
pub use sampler::{sample_interval, IntervalSampler};
pub use stats::TickerStats;
pub use ticker::{tick, LoopExit, RandomTicker, Tick, Ticks};
