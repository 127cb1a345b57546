use domain_archive::model::vo::{oais::DataType, storage::StorageMetadata};
use serde::Deserialize;

/// Runtime configuration, loaded from `config/archive.*` overridden by
/// `ARCHIVE_`-prefixed environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub storages: Vec<StorageBackendConfig>,
    /// Seed a sample ingestion and deletion pass on start-up.
    #[serde(default)]
    pub seed_sample_data: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageBackendConfig {
    pub storage: String,
    #[serde(default)]
    pub store_path: Option<String>,
    #[serde(default)]
    pub accepted_types: Vec<DataType>,
    #[serde(default)]
    pub size_min: Option<u64>,
    #[serde(default)]
    pub size_max: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            tick_ms: default_tick_ms(),
        }
    }
}

fn default_page_size() -> usize {
    200
}

fn default_tick_ms() -> u64 {
    500
}

impl From<StorageBackendConfig> for StorageMetadata {
    fn from(value: StorageBackendConfig) -> Self {
        Self {
            storage: value.storage,
            store_path: value.store_path,
            accepted_types: value.accepted_types.into_iter().collect(),
            size_min: value.size_min,
            size_max: value.size_max,
        }
    }
}

pub fn load() -> anyhow::Result<AppConfig> {
    let config = config::Config::builder()
        .add_source(config::File::with_name("config/archive").required(false))
        .add_source(config::Environment::with_prefix("ARCHIVE").separator("__"))
        .build()?;
    Ok(config.try_deserialize()?)
}
