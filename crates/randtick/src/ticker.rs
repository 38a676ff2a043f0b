// randtick/crates/randtick/src/ticker.rs

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, SystemTime};

use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::config::{Overflow, TickerConfig};
use crate::error::{Result, TickerError};
use crate::sampler::IntervalSampler;
use crate::stats::TickerStats;

/// One firing of a ticker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tick {
    /// Monotonic time the loop woke up.
    pub at: Instant,
    pub wall: SystemTime,
    /// Position within the run, starting at 0. Gaps mean ticks were dropped.
    pub seq: u64,
    /// The sampled sleep that preceded this tick.
    pub slept: Duration,
}

/// Why an emission loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopExit {
    /// The alive flag was cleared.
    Stopped,
    /// The receiving side was dropped or closed.
    ConsumerGone,
}

/// Receiving end of one ticker run.
///
/// `recv` returns `None` once the run has ended and the buffer is drained.
/// Dropping a `Ticks` ends its loop the next time the loop tries to publish.
#[derive(Debug)]
pub struct Ticks {
    rx: mpsc::Receiver<Tick>,
    alive: Arc<AtomicBool>,
}

impl Ticks {
    pub async fn recv(&mut self) -> Option<Tick> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> std::result::Result<Tick, TryRecvError> {
        self.rx.try_recv()
    }

    /// Ask the run to end; same semantics as [`RandomTicker::stop`].
    pub fn stop(&self) {
        self.alive.store(false, Ordering::Release);
    }

    /// Stop the run and refuse further ticks. Already-buffered ticks can
    /// still be received.
    pub fn close(&mut self) {
        self.stop();
        self.rx.close();
    }
}

/// Fires at uniformly random intervals in `[min, max)`.
///
/// Constructed idle; [`start`](Self::start) spawns an emission loop on the
/// current tokio runtime and creates a fresh channel, [`stop`](Self::stop)
/// lets the loop finish its current sleep and close the channel.
#[derive(Debug)]
pub struct RandomTicker {
    sampler: IntervalSampler,
    capacity: usize,
    overflow: Overflow,
    alive: Arc<AtomicBool>,
    events: Option<Ticks>,
    handle: Option<JoinHandle<LoopExit>>,
    stats: Arc<TickerStats>,
}

impl RandomTicker {
    pub fn new(min: Duration, max: Duration) -> Result<Self> {
        Ok(Self::with_sampler(IntervalSampler::new(min, max)?))
    }

    /// Build around a caller-supplied sampler, e.g. one with a fixed seed.
    pub fn with_sampler(sampler: IntervalSampler) -> Self {
        Self {
            sampler,
            capacity: 1,
            overflow: Overflow::Block,
            alive: Arc::new(AtomicBool::new(false)),
            events: None,
            handle: None,
            stats: Arc::new(TickerStats::new()),
        }
    }

    pub fn from_config(cfg: &TickerConfig) -> Result<Self> {
        cfg.validate()?;
        let sampler = match cfg.seed {
            Some(seed) => IntervalSampler::with_seed(cfg.min_interval(), cfg.max_interval(), seed)?,
            None => IntervalSampler::new(cfg.min_interval(), cfg.max_interval())?,
        };
        let mut ticker = Self::with_sampler(sampler);
        ticker.capacity = cfg.capacity;
        ticker.overflow = cfg.overflow;
        Ok(ticker)
    }

    /// Begin emitting. Fails if a run is already alive or there is no tokio
    /// runtime to spawn on.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Err(TickerError::AlreadyRunning);
        }
        let ticks = self.spawn_loop()?;
        self.events = Some(ticks);
        Ok(())
    }

    /// Request termination. Takes effect when the in-flight sleep ends, so
    /// the channel closes at most one `max` interval later. Harmless before
    /// `start` or when repeated.
    pub fn stop(&self) {
        if self.alive.swap(false, Ordering::AcqRel) {
            debug!("ticker stop requested");
        }
    }

    /// Stop and wait for the loop to exit. If the ticker still holds the
    /// receiver it is closed first so a loop blocked on a full buffer is
    /// released; a receiver taken via `take_events` must be drained or
    /// dropped by its owner.
    pub async fn shutdown(&mut self) -> Result<Option<LoopExit>> {
        self.stop();
        if let Some(events) = self.events.as_mut() {
            events.rx.close();
        }
        match self.handle.take() {
            Some(handle) => Ok(Some(handle.await?)),
            None => Ok(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// The current run's stream; `None` before the first `start` or after
    /// `take_events`.
    pub fn events(&mut self) -> Option<&mut Ticks> {
        self.events.as_mut()
    }

    /// Move the stream out to a consumer.
    ///
    /// Once taken, [`shutdown`](Self::shutdown) can no longer close it: if
    /// the holder neither drains nor drops it while the buffer is full,
    /// `shutdown` waits indefinitely.
    pub fn take_events(&mut self) -> Option<Ticks> {
        self.events.take()
    }

    pub fn stats(&self) -> Arc<TickerStats> {
        Arc::clone(&self.stats)
    }

    pub fn min_interval(&self) -> Duration {
        self.sampler.min()
    }

    pub fn max_interval(&self) -> Duration {
        self.sampler.max()
    }

    fn spawn_loop(&mut self) -> Result<Ticks> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| TickerError::NoRuntime)?;

        // Each run gets its own flag so a stopped loop stays stopped even if
        // the ticker is restarted before that loop wakes up.
        let alive = Arc::new(AtomicBool::new(true));
        self.alive = Arc::clone(&alive);

        let (tx, rx) = mpsc::channel(self.capacity);
        let run = EmissionLoop {
            sampler: self.sampler.fork(),
            tx,
            alive: Arc::clone(&alive),
            overflow: self.overflow,
            stats: Arc::clone(&self.stats),
        };
        self.stats.record_run();
        self.handle = Some(runtime.spawn(run.run()));

        Ok(Ticks { rx, alive })
    }
}

struct EmissionLoop {
    sampler: IntervalSampler,
    tx: mpsc::Sender<Tick>,
    alive: Arc<AtomicBool>,
    overflow: Overflow,
    stats: Arc<TickerStats>,
}

impl EmissionLoop {
    async fn run(mut self) -> LoopExit {
        debug!(
            min = ?self.sampler.min(),
            max = ?self.sampler.max(),
            overflow = ?self.overflow,
            "emission loop started"
        );

        let mut seq: u64 = 0;
        let exit = loop {
            let interval = self.sampler.next_interval();
            tokio::time::sleep(interval).await;

            // Checked after waking, never mid-sleep.
            if !self.alive.load(Ordering::Acquire) {
                break LoopExit::Stopped;
            }

            let tick = Tick {
                at: Instant::now(),
                wall: SystemTime::now(),
                seq,
                slept: interval,
            };
            seq += 1;

            match self.overflow {
                Overflow::Block => {
                    if self.tx.send(tick).await.is_err() {
                        break LoopExit::ConsumerGone;
                    }
                    self.stats.record_emitted(interval);
                    trace!(seq = tick.seq, slept = ?interval, "tick");
                }
                Overflow::DropNewest => match self.tx.try_send(tick) {
                    Ok(()) => {
                        self.stats.record_emitted(interval);
                        trace!(seq = tick.seq, slept = ?interval, "tick");
                    }
                    Err(TrySendError::Full(_)) => {
                        self.stats.record_dropped(interval);
                        trace!(seq = tick.seq, "consumer behind; tick dropped");
                    }
                    Err(TrySendError::Closed(_)) => break LoopExit::ConsumerGone,
                },
            }
        };

        // The run is dead either way; a consumer-side exit must not leave the
        // ticker looking alive.
        self.alive.store(false, Ordering::Release);
        // Dropping the sender closes the channel for the consumer.
        drop(self.tx);
        debug!(reason = ?exit, ticks = seq, "emission loop exited");
        exit
    }
}

/// Start a ticker with no floor (`min = 0`) and return its stream.
///
/// The run lives until [`Ticks::stop`] is called or the stream is dropped;
/// a stream that is kept but never stopped keeps its loop alive until the
/// runtime shuts down.
pub fn tick(max: Duration) -> Result<Ticks> {
    let mut ticker = RandomTicker::new(Duration::ZERO, max)?;
    ticker.spawn_loop()
}
