use serde::{Deserialize, Serialize};

/// How a new version of an already-known provider id is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VersioningMode {
    /// Drop the new version upstream; resolve is not reached.
    Ignore,
    /// Keep every version, the newest one becomes last.
    #[default]
    IncVersion,
    /// An operator decides later; flag logic is the same as IncVersion.
    Manual,
    /// Keep only the newest version, the superseded one is deleted.
    Replace,
}
