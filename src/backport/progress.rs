//! Progress reporting for backport runs

use async_trait::async_trait;

/// Receives human-readable progress from the engine and orchestrator
///
/// Passed explicitly into each call so callers decide where messages go.
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Called when a step starts or finishes
    async fn on_message(&self, message: &str);

    /// Called when a step fails but the run continues
    async fn on_warning(&self, message: &str) {
        self.on_message(message).await;
    }
}

/// Progress callback that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_message(&self, _message: &str) {}
}
