use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{RecordStore, StoreError};

/// Keeps documents in process memory. Used by tests and `STORE_BACKEND=memory`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn docs(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        self.docs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn read_document(&self, name: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.docs().get(name).cloned())
    }

    async fn write_document(&self, name: &str, body: Value) -> Result<(), StoreError> {
        self.docs().insert(name.to_string(), body);
        Ok(())
    }

    async fn delete_document(&self, name: &str) -> Result<(), StoreError> {
        self.docs().remove(name);
        Ok(())
    }
}
