use std::time::Duration;

use async_trait::async_trait;

/// Delay policy between outbound geocoding calls, kept out of the
/// per-record logic so it can be swapped.
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Called between two records of the same batch.
    async fn between_records(&self);

    /// Called between two batches.
    async fn between_batches(&self);
}

/// Fixed sleeps, defaulting to 100 ms between records and 500 ms between
/// batches.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelayPacer {
    pub record_delay: Duration,
    pub batch_delay: Duration,
}

impl FixedDelayPacer {
    pub fn new(record_delay: Duration, batch_delay: Duration) -> Self {
        Self {
            record_delay,
            batch_delay,
        }
    }
}

impl Default for FixedDelayPacer {
    fn default() -> Self {
        Self::new(Duration::from_millis(100), Duration::from_millis(500))
    }
}

#[async_trait]
impl Pacer for FixedDelayPacer {
    async fn between_records(&self) {
        if !self.record_delay.is_zero() {
            tokio::time::sleep(self.record_delay).await;
        }
    }

    async fn between_batches(&self) {
        if !self.batch_delay.is_zero() {
            tokio::time::sleep(self.batch_delay).await;
        }
    }
}

/// No delays at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacing;

#[async_trait]
impl Pacer for NoPacing {
    async fn between_records(&self) {}

    async fn between_batches(&self) {}
}
