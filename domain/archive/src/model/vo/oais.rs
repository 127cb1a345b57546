use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OAIS descriptor of one package version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivalPackage {
    pub provider_id: String,
    /// Submission package this version was derived from.
    pub sip_id: String,
    pub version: i32,
    pub content_informations: Vec<ContentInformation>,
    /// Audit trail.
    pub events: Vec<PackageEvent>,
    pub tags: Vec<String>,
    pub categories: HashSet<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentInformation {
    pub representation: RepresentationInformation,
    pub data_object: DataObject,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepresentationInformation {
    pub mime_type: Option<String>,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

/// One physical or referenced file of the package.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataObject {
    pub data_type: DataType,
    pub filename: String,
    /// Content identity.
    pub checksum: String,
    pub algorithm: String,
    pub file_size: Option<u64>,
    pub locations: Vec<DataObjectLocation>,
}

/// Where one file lives. A location without a storage id is a pending
/// "to store" placeholder resolved by the storage callbacks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataObjectLocation {
    pub storage: Option<String>,
    pub url: String,
    pub store_path: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    #[default]
    RawData,
    Quicklook,
    Thumbnail,
    Document,
    Description,
    /// The package manifest itself.
    Aip,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageEvent {
    pub comment: String,
    pub date: DateTime<Utc>,
}

impl ArchivalPackage {
    pub fn add_event(&mut self, comment: impl Into<String>) {
        self.events.push(PackageEvent {
            comment: comment.into(),
            date: Utc::now(),
        });
    }

    pub fn content_by_checksum_mut(&mut self, checksum: &str) -> Option<&mut ContentInformation> {
        self.content_informations.iter_mut().find(|ci| ci.data_object.checksum == checksum)
    }
}

impl DataObjectLocation {
    pub fn stored(storage: &str, url: &str, store_path: Option<String>) -> Self {
        Self {
            storage: Some(storage.to_owned()),
            url: url.to_owned(),
            store_path,
        }
    }

    pub fn pending(url: &str) -> Self {
        Self {
            storage: None,
            url: url.to_owned(),
            store_path: None,
        }
    }
}
