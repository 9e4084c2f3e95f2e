use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;
use crate::store::{validate_key, RecordStore};

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Vec<Value>, StoreError> {
        validate_key(key)?;
        let collections = self
            .collections
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        Ok(collections.get(key).cloned().unwrap_or_default())
    }

    async fn save(&self, key: &str, records: Vec<Value>) -> Result<(), StoreError> {
        validate_key(key)?;
        let mut collections = self
            .collections
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        collections.insert(key.to_string(), records);
        Ok(())
    }
}
