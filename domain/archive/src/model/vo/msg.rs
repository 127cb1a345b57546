use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Observational notifications published to the monitoring sink.
/// Nothing in the core consumes them back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ArchiveEvent {
    AipStored {
        aip_id: String,
        session_owner: String,
        session: String,
    },
    AipDeleted {
        aip_id: String,
        provider_id: String,
        session_owner: String,
        session: String,
    },
    VersionReplaced {
        provider_id: String,
        replaced_aip_id: Uuid,
    },
    RequestFailed {
        request_id: Uuid,
        errors: Vec<String>,
    },
}
