//! Run statistics and logging setup.
//!
//! [`Metrics`] accumulates what each tick reports and emits a summary line
//! every `log.interval` ticks.

use crate::registry::Census;
use crate::simulation::TickReport;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counters for a running simulation.
pub struct Metrics {
    tick_count: AtomicU64,
    agent_count: AtomicU64,
    pheromones_processed: AtomicU64,
    births: AtomicU64,
    deaths: AtomicU64,
    hills_founded: AtomicU64,
    interval: u64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl Metrics {
    /// Creates a collector that logs every `interval` ticks. Zero disables
    /// the summary line.
    #[must_use]
    pub fn new(interval: u64) -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            agent_count: AtomicU64::new(0),
            pheromones_processed: AtomicU64::new(0),
            births: AtomicU64::new(0),
            deaths: AtomicU64::new(0),
            hills_founded: AtomicU64::new(0),
            interval,
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick with its duration.
    pub fn record_tick(&self, report: &TickReport, census: &Census, duration: Duration) {
        self.tick_count.fetch_add(1, Ordering::Relaxed);
        self.agent_count.store(report.agents as u64, Ordering::Relaxed);
        self.pheromones_processed
            .fetch_add(report.pheromones_processed as u64, Ordering::Relaxed);
        self.births.store(census.born, Ordering::Relaxed);
        self.deaths.store(census.died, Ordering::Relaxed);
        self.hills_founded
            .store(census.hills_founded, Ordering::Relaxed);

        if self.interval > 0 && report.tick % self.interval == 0 {
            tracing::info!(
                tick = report.tick,
                agents = report.agents,
                pheromones = report.pheromones_processed,
                born = census.born,
                died = census.died,
                killed = census.killed,
                hills_founded = census.hills_founded,
                duration_us = duration.as_micros() as u64,
                "Simulation tick"
            );
        }
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn agent_count(&self) -> u64 {
        self.agent_count.load(Ordering::Relaxed)
    }

    /// Pheromones processed over the whole run.
    #[must_use]
    pub fn pheromones_processed(&self) -> u64 {
        self.pheromones_processed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn births(&self) -> u64 {
        self.births.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn deaths(&self) -> u64 {
        self.deaths.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn hills_founded(&self) -> u64 {
        self.hills_founded.load(Ordering::Relaxed)
    }

    /// Gets elapsed time since metrics creation.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Initialize tracing subscriber for logging.
///
/// Honours `RUST_LOG` and falls back to `info`.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish(),
    )
    .ok();
}
