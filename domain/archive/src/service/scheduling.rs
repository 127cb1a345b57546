use async_trait::async_trait;
use uuid::Uuid;

/// Cooperative batch scheduler over created requests.
#[async_trait]
pub trait RequestScheduleService: Send + Sync {
    /// Page through Created requests in deterministic order, block the ones
    /// conflicting with an in-flight mutation of the same AIPs, flip the rest
    /// to Running and submit one job per request kind. Returns how many were
    /// scheduled. A request is never left Running without a job in flight.
    async fn schedule_pending(&self) -> anyhow::Result<usize>;

    /// Return Blocked requests whose conflict has cleared to Created.
    async fn release_blocked(&self) -> anyhow::Result<usize>;

    /// A job claimed by the execution substrate failed locally.
    async fn handle_job_error(&self, request_id: Uuid, cause: &str) -> anyhow::Result<()>;
}
