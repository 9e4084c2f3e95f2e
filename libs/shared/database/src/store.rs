use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use shared_config::{AppConfig, StoreBackend};

use crate::error::StoreError;
use crate::file::JsonFileStore;
use crate::memory::MemoryStore;
use crate::supabase::SupabaseClient;

/// Durable list store keyed by entity-type name.
///
/// `save` replaces the whole collection stored under `key`. Callers never
/// depend on the encoding a backend chooses.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Vec<Value>, StoreError>;

    async fn save(&self, key: &str, records: Vec<Value>) -> Result<(), StoreError>;
}

pub async fn load_records<T>(store: &dyn RecordStore, key: &str) -> Result<Vec<T>, StoreError>
where
    T: DeserializeOwned,
{
    let raw = store.load(key).await?;
    debug!("Loaded {} raw records for '{}'", raw.len(), key);

    raw.into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()
        .map_err(StoreError::from)
}

pub async fn save_records<T>(store: &dyn RecordStore, key: &str, records: &[T]) -> Result<(), StoreError>
where
    T: Serialize,
{
    let raw = records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<Value>, _>>()?;

    store.save(key, raw).await
}

/// Keys become file names and REST paths, so only a plain identifier is accepted.
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

pub fn store_from_config(config: &AppConfig) -> Arc<dyn RecordStore> {
    info!("Using {} record store", config.store_backend);

    match config.store_backend {
        StoreBackend::File => Arc::new(JsonFileStore::new(config.data_dir.clone())),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Supabase => Arc::new(SupabaseClient::new(config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Note {
        id: String,
        body: String,
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("appointments").is_ok());
        assert!(validate_key("custom_packages_2").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("Doctors").is_err());
    }

    #[tokio::test]
    async fn test_typed_helpers_go_through_store() {
        let store = MemoryStore::new();
        let notes = vec![
            Note { id: "N1".into(), body: "first".into() },
            Note { id: "N2".into(), body: "second".into() },
        ];

        save_records(&store, "notes", &notes).await.unwrap();
        let loaded: Vec<Note> = load_records(&store, "notes").await.unwrap();

        assert_eq!(loaded, notes);
    }

    #[tokio::test]
    async fn test_load_records_rejects_wrong_shape() {
        let store = MemoryStore::new();
        store
            .save("notes", vec![serde_json::json!({"unexpected": true})])
            .await
            .unwrap();

        let result: Result<Vec<Note>, _> = load_records(&store, "notes").await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[test]
    fn test_store_from_config_memory() {
        let config = AppConfig::in_memory();
        let _store = store_from_config(&config);
    }
}
