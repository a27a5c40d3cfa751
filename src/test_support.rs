use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::identity::repo_types::User;
use crate::identity::session::Session;
use crate::issues::dto::SubmitIssueRequest;
use crate::issues::repo_types::{Category, Location};
use crate::notify::RecordingSink;
use crate::store::{MemoryStore, RecordStore, Repository, StoreError, USERS};

pub fn memory_repo() -> Repository {
    Repository::new(Arc::new(MemoryStore::new()))
}

pub fn recording_sink() -> Arc<RecordingSink> {
    Arc::new(RecordingSink::default())
}

/// Memory store whose writes to the users collection can be made to fail.
#[derive(Default)]
pub struct FlakyUsers {
    inner: MemoryStore,
    failing: AtomicBool,
}

impl FlakyUsers {
    pub fn fail_users(&self, on: bool) {
        self.failing.store(on, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordStore for FlakyUsers {
    async fn read_document(&self, name: &str) -> Result<Option<Value>, StoreError> {
        self.inner.read_document(name).await
    }

    async fn write_document(&self, name: &str, body: Value) -> Result<(), StoreError> {
        if name == USERS && self.failing.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into());
        }
        self.inner.write_document(name, body).await
    }

    async fn delete_document(&self, name: &str) -> Result<(), StoreError> {
        self.inner.delete_document(name).await
    }
}

/// Stores a user directly, skipping password hashing.
pub async fn signed_in(repo: &Repository, name: &str, is_authority: bool) -> Session {
    let user = User::new(
        name.to_string(),
        format!("{}@example.com", name.to_lowercase()),
        format!("+91-{}", uuid::Uuid::new_v4().simple()),
        "unused".into(),
        is_authority,
    );
    let stored = user.clone();
    repo.update_users(move |users| {
        users.push(stored);
        Ok(())
    })
    .await
    .unwrap();
    Session::signed_in(user)
}

pub fn pothole() -> SubmitIssueRequest {
    SubmitIssueRequest {
        category: Some(Category::Road),
        description: "pothole".into(),
        location: Some(Location {
            latitude: 28.61,
            longitude: 77.20,
        }),
        photo_ref: None,
    }
}
