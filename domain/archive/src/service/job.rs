use async_trait::async_trait;

use crate::command::JobCommand;

/// Job execution substrate: accepts a job descriptor, runs it asynchronously,
/// reports completion through storage callbacks or job-error events.
#[async_trait]
pub trait JobClient: Send + Sync {
    async fn submit(&self, job: JobCommand) -> anyhow::Result<()>;
}
