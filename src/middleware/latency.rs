use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use rand::Rng;
use tracing::debug;

/// Artificial delay applied before a request reaches its handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Latency {
    pub base_ms: u64,
    pub jitter_ms: u64,
}

impl Latency {
    pub fn new(base_ms: u64, jitter_ms: u64) -> Self {
        Self { base_ms, jitter_ms }
    }

    /// `base_ms` plus a uniform sample from `0..=jitter_ms`.
    pub fn sample(&self, rng: &mut impl Rng) -> Duration {
        let jitter = if self.jitter_ms > 0 {
            rng.gen_range(0..=self.jitter_ms)
        } else {
            0
        };
        Duration::from_millis(self.base_ms + jitter)
    }
}

pub async fn simulate_latency(
    State(latency): State<Latency>,
    req: Request,
    next: Next,
) -> Response {
    let delay = latency.sample(&mut rand::thread_rng());

    debug!(
        method = %req.method(),
        path = %req.uri().path(),
        delay_ms = delay.as_millis() as u64,
        "Simulating latency"
    );

    tokio::time::sleep(delay).await;
    next.run(req).await
}
