use async_trait::async_trait;
use domain_archive::{command::JobCommand, service::JobClient};

/// Hands job commands to the in-process runner task over a channel.
pub struct ChannelJobClient {
    job_tx: flume::Sender<JobCommand>,
}

impl ChannelJobClient {
    pub fn new(job_tx: flume::Sender<JobCommand>) -> Self {
        Self { job_tx }
    }
}

#[async_trait]
impl JobClient for ChannelJobClient {
    async fn submit(&self, job: JobCommand) -> anyhow::Result<()> {
        self.job_tx
            .send_async(job)
            .await
            .map_err(|e| anyhow::anyhow!("job channel closed: {e}"))
    }
}
