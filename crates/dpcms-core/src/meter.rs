//! Operation timing
//!
//! The repository and the record store time their operations through a
//! [`Meter`] handed to them at construction. Nothing here is global: callers
//! choose where measurements go.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Receives one measurement per completed operation
pub trait Meter: Send + Sync {
    fn record(&self, operation: &'static str, elapsed: Duration);
}

/// Shared handle passed to the store and repository
pub type SharedMeter = Arc<dyn Meter>;

/// Emits every measurement as a `tracing` debug event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMeter;

impl Meter for TracingMeter {
    fn record(&self, operation: &'static str, elapsed: Duration) {
        tracing::debug!(
            operation,
            elapsed_us = elapsed.as_micros() as u64,
            "Operation timed"
        );
    }
}

/// Discards measurements
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMeter;

impl Meter for NoopMeter {
    fn record(&self, _operation: &'static str, _elapsed: Duration) {}
}

/// Keeps every measurement in memory, in arrival order
#[derive(Debug, Default)]
pub struct MemoryMeter {
    samples: Mutex<Vec<(&'static str, Duration)>>,
}

impl MemoryMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the recorded operations, oldest first
    pub fn operations(&self) -> Vec<&'static str> {
        self.samples
            .lock()
            .map(|samples| samples.iter().map(|(name, _)| *name).collect())
            .unwrap_or_default()
    }

    /// Number of measurements recorded for `operation`
    pub fn count(&self, operation: &str) -> usize {
        self.samples
            .lock()
            .map(|samples| samples.iter().filter(|(name, _)| *name == operation).count())
            .unwrap_or(0)
    }
}

impl Meter for MemoryMeter {
    fn record(&self, operation: &'static str, elapsed: Duration) {
        if let Ok(mut samples) = self.samples.lock() {
            samples.push((operation, elapsed));
        }
    }
}

/// Timer that reports to its meter when dropped
///
/// ```ignore
/// let _timing = Timing::start(&self.meter, "add");
/// // ... work ...
/// // measurement recorded here, on every exit path
/// ```
pub struct Timing {
    meter: SharedMeter,
    operation: &'static str,
    started: Instant,
}

impl Timing {
    /// Start timing; holds its own handle so the owner stays free to mutate
    pub fn start(meter: &SharedMeter, operation: &'static str) -> Self {
        Self {
            meter: Arc::clone(meter),
            operation,
            started: Instant::now(),
        }
    }
}

impl Drop for Timing {
    fn drop(&mut self) {
        self.meter.record(self.operation, self.started.elapsed());
    }
}

/// Run `f` and record how long it took
pub fn measure<T>(meter: &SharedMeter, operation: &'static str, f: impl FnOnce() -> T) -> T {
    let _timing = Timing::start(meter, operation);
    f()
}
