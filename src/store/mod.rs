//! Durable storage for the `users` and `issues` collections plus the
//! single-record session slot. Every collection is read and written as one
//! JSON document; backends only move documents around.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::error::CoreError;
use crate::identity::repo_types::User;
use crate::issues::repo_types::Issue;

pub mod file;
pub mod memory;
pub mod postgres;
mod repository;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::Repository;

pub const USERS: &str = "users";
pub const ISSUES: &str = "issues";
pub const SESSION: &str = "session";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for CoreError {
    fn from(e: StoreError) -> Self {
        CoreError::StorageUnavailable(e.to_string())
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns the stored document, or `None` if it was never written.
    async fn read_document(&self, name: &str) -> Result<Option<Value>, StoreError>;
    /// Replaces the whole document in one step.
    async fn write_document(&self, name: &str, body: Value) -> Result<(), StoreError>;
    async fn delete_document(&self, name: &str) -> Result<(), StoreError>;

    async fn load_users(&self) -> Result<Vec<User>, StoreError> {
        decode_collection(self.read_document(USERS).await?)
    }

    async fn save_users(&self, users: &[User]) -> Result<(), StoreError> {
        self.write_document(USERS, serde_json::to_value(users)?).await
    }

    async fn load_issues(&self) -> Result<Vec<Issue>, StoreError> {
        decode_collection(self.read_document(ISSUES).await?)
    }

    async fn save_issues(&self, issues: &[Issue]) -> Result<(), StoreError> {
        self.write_document(ISSUES, serde_json::to_value(issues)?).await
    }

    async fn load_session(&self) -> Result<Option<User>, StoreError> {
        match self.read_document(SESSION).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    async fn save_session(&self, user: Option<&User>) -> Result<(), StoreError> {
        match user {
            Some(u) => self.write_document(SESSION, serde_json::to_value(u)?).await,
            None => self.delete_document(SESSION).await,
        }
    }
}

fn decode_collection<T: DeserializeOwned>(doc: Option<Value>) -> Result<Vec<T>, StoreError> {
    match doc {
        Some(doc) => Ok(serde_json::from_value(doc)?),
        None => Ok(Vec::new()),
    }
}
