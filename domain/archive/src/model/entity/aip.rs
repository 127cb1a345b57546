use std::collections::HashSet;

use chrono::{DateTime, Utc};
use num_derive::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::vo::oais::ArchivalPackage;

/// One version of one archival package.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AipEntity {
    /// Internal surrogate id.
    pub id: Uuid,
    /// URN-like public identifier, unique system-wide.
    pub aip_id: String,
    /// External identifier shared across versions of the same package.
    pub provider_id: String,
    pub version: i32,
    pub state: AipState,
    /// True for exactly one non-deleted entity per provider id.
    /// Kept in lockstep with the last-version index, never mutated directly.
    pub last: bool,
    /// Manifest checksum, computed when the metadata save phase runs.
    pub checksum: Option<String>,
    /// Storage business ids currently holding at least one file of this package.
    pub storages: HashSet<String>,
    /// OAIS descriptor.
    pub aip: ArchivalPackage,
    pub session_owner: String,
    pub session: String,
    pub errors: Vec<String>,
    pub creation_date: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
}

#[derive(ToPrimitive, FromPrimitive, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AipState {
    /// Produced by an ingestion pipeline, files not yet stored.
    #[default]
    Generated,
    /// All files and the manifest are on their storage locations.
    Stored,
    /// Logically removed.
    Deleted,
    /// A storage step failed.
    Error,
}

impl AipEntity {
    pub fn new(aip: ArchivalPackage, session_owner: &str, session: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            aip_id: Self::urn(&aip.provider_id, aip.version),
            provider_id: aip.provider_id.to_owned(),
            version: aip.version,
            state: AipState::default(),
            last: false,
            checksum: None,
            storages: HashSet::new(),
            aip,
            session_owner: session_owner.to_owned(),
            session: session.to_owned(),
            errors: vec![],
            creation_date: now,
            last_update: now,
        }
    }

    pub fn urn(provider_id: &str, version: i32) -> String {
        format!("URN:AIP:{provider_id}:V{version}")
    }

    pub fn add_error(&mut self, cause: impl Into<String>) {
        self.errors.push(cause.into());
    }

    /// A storage is in use as long as at least one data object still lives there.
    pub fn storage_in_use(&self, storage: &str) -> bool {
        self.aip.content_informations.iter().any(|ci| {
            ci.data_object
                .locations
                .iter()
                .any(|l| l.storage.as_deref() == Some(storage))
        })
    }
}
