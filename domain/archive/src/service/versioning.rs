use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{entity::AipEntity, vo::VersioningMode};

/// Decides last-flag transitions when a new AIP version arrives.
#[async_trait]
pub trait VersioningService: Send + Sync {
    /// Assign the last flag for `new_aip`, demoting the previous last version
    /// when the new one is strictly newer. Flag and index are always mutated
    /// together.
    ///
    /// Under Replace mode, returns the internal id of the AIP the caller must
    /// hand to the deletion orchestrator; the resolver never deletes itself.
    async fn resolve(
        &self,
        new_aip: &mut AipEntity,
        mode: VersioningMode,
    ) -> anyhow::Result<Option<Uuid>>;
}
