use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::error;
use uuid::Uuid;

use super::{RecordStore, StoreError};
use crate::error::{CoreError, CoreResult};
use crate::identity::repo_types::User;
use crate::issues::repo_types::Issue;

/// Serialised access to the record store.
///
/// Each collection has its own lock. `update_*` holds it across the whole
/// load, mutate, save sequence, so two writers never interleave on the same
/// collection. Plain reads take no lock.
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn RecordStore>,
    users_lock: Arc<Mutex<()>>,
    issues_lock: Arc<Mutex<()>>,
}

fn unavailable(op: &'static str) -> impl FnOnce(StoreError) -> CoreError {
    move |e| {
        error!(error = %e, op, "record store failure");
        CoreError::from(e)
    }
}

impl Repository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            users_lock: Arc::new(Mutex::new(())),
            issues_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn users(&self) -> CoreResult<Vec<User>> {
        self.store.load_users().await.map_err(unavailable("load users"))
    }

    pub async fn issues(&self) -> CoreResult<Vec<Issue>> {
        self.store.load_issues().await.map_err(unavailable("load issues"))
    }

    pub async fn find_user(&self, id: Uuid) -> CoreResult<Option<User>> {
        Ok(self.users().await?.into_iter().find(|u| u.id == id))
    }

    pub async fn find_issue(&self, id: Uuid) -> CoreResult<Option<Issue>> {
        Ok(self.issues().await?.into_iter().find(|i| i.id == id))
    }

    /// Runs `f` against a fresh copy of the users collection and writes the
    /// result back. Nothing is written when `f` fails.
    pub async fn update_users<T, F>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce(&mut Vec<User>) -> CoreResult<T>,
    {
        let _guard = self.users_lock.lock().await;
        let mut users = self.users().await?;
        let out = f(&mut users)?;
        self.store
            .save_users(&users)
            .await
            .map_err(unavailable("save users"))?;
        Ok(out)
    }

    /// Same as [`Repository::update_users`] for the issues collection.
    pub async fn update_issues<T, F>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce(&mut Vec<Issue>) -> CoreResult<T>,
    {
        let _guard = self.issues_lock.lock().await;
        let mut issues = self.issues().await?;
        let out = f(&mut issues)?;
        self.store
            .save_issues(&issues)
            .await
            .map_err(unavailable("save issues"))?;
        Ok(out)
    }

    /// Runs `f` against both collections, taking the issues lock before the
    /// users lock. Issues are saved first; when the users save then fails the
    /// issues collection is written back as it was, so the caller can retry
    /// the whole operation.
    pub async fn update_all<T, F>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce(&mut Vec<Issue>, &mut Vec<User>) -> CoreResult<T>,
    {
        let _issues_guard = self.issues_lock.lock().await;
        let _users_guard = self.users_lock.lock().await;
        let original = self.issues().await?;
        let mut issues = original.clone();
        let mut users = self.users().await?;
        let out = f(&mut issues, &mut users)?;

        self.store
            .save_issues(&issues)
            .await
            .map_err(unavailable("save issues"))?;
        if let Err(e) = self.store.save_users(&users).await {
            if let Err(undo) = self.store.save_issues(&original).await {
                error!(error = %undo, "issues not restored after failed users save");
            }
            return Err(unavailable("save users")(e));
        }
        Ok(out)
    }

    pub async fn load_session(&self) -> CoreResult<Option<User>> {
        self.store
            .load_session()
            .await
            .map_err(unavailable("load session"))
    }

    pub async fn save_session(&self, user: Option<&User>) -> CoreResult<()> {
        self.store
            .save_session(user)
            .await
            .map_err(unavailable("save session"))
    }
}
