use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use super::{RecordStore, StoreError};

/// One pretty-printed JSON file per collection inside `dir`.
///
/// Writes land in a temporary sibling file that is renamed over the target,
/// so a reader sees either the old or the new collection, never a mix.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await?;
        debug!(dir = %dir.display(), "file store opened");
        Ok(Self { dir })
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

#[async_trait]
impl RecordStore for FileStore {
    async fn read_document(&self, name: &str) -> Result<Option<Value>, StoreError> {
        match fs::read(self.path_for(name)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_document(&self, name: &str, body: Value) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(&body)?;
        let tmp = self.dir.join(format!(".{name}.{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, &data).await?;
        if let Err(e) = fs::rename(&tmp, self.path_for(name)).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn delete_document(&self, name: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
