use crate::error::{CoreError, CoreResult};
use crate::identity::repo_types::User;
use crate::store::Repository;

/// The acting principal for one sequence of core operations.
///
/// Holds a copy of the signed-in user record; the record store stays the
/// owner of the real one. Operations that change the user (points, badges)
/// refresh this copy before returning.
#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(user: User) -> Self {
        Self { user: Some(user) }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn require_user(&self) -> CoreResult<&User> {
        self.user.as_ref().ok_or(CoreError::NotAuthenticated)
    }

    pub fn require_authority(&self) -> CoreResult<&User> {
        let user = self.require_user()?;
        if !user.is_authority {
            return Err(CoreError::NotAuthorized);
        }
        Ok(user)
    }

    pub(crate) fn sign_in(&mut self, user: User) {
        self.user = Some(user);
    }

    pub(crate) fn sign_out(&mut self) {
        self.user = None;
    }

    /// Replaces the cached copy if it belongs to the same user.
    pub(crate) fn refresh(&mut self, user: User) {
        if self.user.as_ref().is_some_and(|u| u.id == user.id) {
            self.user = Some(user);
        }
    }

    /// Loads the session stored in the single-record session slot.
    pub async fn restore(repo: &Repository) -> CoreResult<Self> {
        Ok(Self {
            user: repo.load_session().await?,
        })
    }

    /// Writes this session into the session slot, or clears the slot.
    pub async fn persist(&self, repo: &Repository) -> CoreResult<()> {
        repo.save_session(self.user.as_ref()).await
    }
}
