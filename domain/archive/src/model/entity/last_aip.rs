use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Last-version index row: one per provider id, pointing at the entity
/// currently flagged last. Mutated only together with the flag itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastAip {
    pub id: Uuid,
    /// Internal id of the last AIP entity.
    pub aip_id: Uuid,
    pub provider_id: String,
}

impl LastAip {
    pub fn new(aip_id: Uuid, provider_id: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            aip_id,
            provider_id: provider_id.to_owned(),
        }
    }
}
