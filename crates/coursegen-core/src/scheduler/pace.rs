//! Pacing seam: all deliberate sleeps (per-task cooldown, inter-batch delay)
//! go through this trait so tests can observe pacing without wall-clock waits.

use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait Pacer: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production pacer backed by tokio's timer.
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
