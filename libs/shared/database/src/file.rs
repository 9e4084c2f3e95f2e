use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, error, info};

use crate::error::StoreError;
use crate::store::{validate_key, RecordStore};

/// Stores each collection as a JSON array in `<dir>/<key>.json`.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn load(&self, key: &str) -> Result<Vec<Value>, StoreError> {
        validate_key(key)?;
        let path = self.path_for(key);

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No file at {}, starting with an empty collection", path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                error!("Failed to read {}: {}", path.display(), e);
                return Err(e.into());
            }
        };

        let records: Vec<Value> = serde_json::from_slice(&bytes).map_err(|e| {
            error!("Corrupt record file {}: {}", path.display(), e);
            StoreError::from(e)
        })?;

        info!("Loaded {} records from {}", records.len(), path.display());
        Ok(records)
    }

    async fn save(&self, key: &str, records: Vec<Value>) -> Result<(), StoreError> {
        validate_key(key)?;
        fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(key);
        let tmp_path = self.dir.join(format!("{}.json.tmp", key));
        let body = serde_json::to_vec_pretty(&records)?;

        // Write-then-rename so a failed write never truncates the previous list
        fs::write(&tmp_path, &body).await?;
        fs::rename(&tmp_path, &path).await.map_err(|e| {
            error!("Failed to replace {}: {}", path.display(), e);
            StoreError::from(e)
        })?;

        debug!("Saved {} records to {}", records.len(), path.display());
        Ok(())
    }
}
