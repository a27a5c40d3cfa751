use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};
use std::sync::Arc;

use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::identity::dto::RegisterRequest;
use crate::identity::password::{hash_password, verify_password};
use crate::identity::repo_types::User;
use crate::identity::session::Session;
use crate::notify::{Notice, NotificationSink};
use crate::store::Repository;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn required(value: &str, field: &str) -> CoreResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CoreError::validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// Registration, login and session resolution.
#[derive(Clone)]
pub struct IdentityService {
    repo: Repository,
    notifier: Arc<dyn NotificationSink>,
}

impl IdentityService {
    pub fn new(repo: Repository, notifier: Arc<dyn NotificationSink>) -> Self {
        Self { repo, notifier }
    }

    fn announce<T>(&self, result: CoreResult<T>) -> CoreResult<T> {
        if let Err(e) = &result {
            self.notifier.notify(Notice::new(e.to_string(), e.severity()));
        }
        result
    }

    /// Creates a user and signs it into `session`. Fails with
    /// `DuplicateIdentity` when the email or phone is already registered, in
    /// which case the users collection is left untouched.
    pub async fn register(&self, session: &mut Session, req: RegisterRequest) -> CoreResult<User> {
        let result = self.create_user(session, req).await;
        if let Ok(user) = &result {
            self.notifier.notify(Notice::success(format!(
                "Registration successful! Welcome to CivicPulse, {}",
                user.name
            )));
        }
        self.announce(result)
    }

    #[instrument(skip(self, session, req))]
    async fn create_user(&self, session: &mut Session, req: RegisterRequest) -> CoreResult<User> {
        let name = required(&req.name, "name")?;
        let email = required(&req.email, "email")?.to_lowercase();
        let phone = required(&req.phone, "phone")?;
        if req.password.is_empty() {
            return Err(CoreError::validation("password is required"));
        }
        if !is_valid_email(&email) {
            warn!(email = %email, "invalid email");
            return Err(CoreError::validation("invalid email"));
        }

        let secret = hash_password(&req.password).map_err(|e| {
            error!(error = %e, "hash_password failed");
            CoreError::validation("password could not be processed")
        })?;
        let candidate = User::new(name, email, phone, secret, req.is_authority);

        let user = self
            .repo
            .update_users(|users| {
                if users
                    .iter()
                    .any(|u| u.email == candidate.email || u.phone == candidate.phone)
                {
                    return Err(CoreError::DuplicateIdentity);
                }
                users.push(candidate.clone());
                Ok(candidate)
            })
            .await
            .inspect_err(|e| {
                if *e == CoreError::DuplicateIdentity {
                    warn!("email or phone already registered");
                }
            })?;

        info!(
            user_id = %user.id,
            email = %user.email,
            authority = user.is_authority,
            "user registered"
        );
        session.sign_in(user.clone());
        session.persist(&self.repo).await?;
        Ok(user)
    }

    /// Signs in the user whose email or phone is `identifier` and whose
    /// credential matches `secret`.
    pub async fn login(
        &self,
        session: &mut Session,
        identifier: &str,
        secret: &str,
    ) -> CoreResult<User> {
        let result = self.authenticate(session, identifier, secret).await;
        if let Ok(user) = &result {
            self.notifier
                .notify(Notice::success(format!("Welcome back, {}", user.name)));
        }
        self.announce(result)
    }

    #[instrument(skip(self, session, secret))]
    async fn authenticate(
        &self,
        session: &mut Session,
        identifier: &str,
        secret: &str,
    ) -> CoreResult<User> {
        let identifier = identifier.trim();
        let users = self.repo.users().await?;
        let user = users
            .into_iter()
            .filter(|u| u.is_identified_by(identifier))
            .find(|u| match verify_password(secret, &u.credential_secret) {
                Ok(ok) => ok,
                Err(e) => {
                    error!(error = %e, user_id = %u.id, "stored credential unreadable");
                    false
                }
            });

        match user {
            Some(user) => {
                info!(user_id = %user.id, "user logged in");
                session.sign_in(user.clone());
                session.persist(&self.repo).await?;
                Ok(user)
            }
            None => {
                warn!("login rejected");
                Err(CoreError::InvalidCredentials)
            }
        }
    }

    /// Ends `session` and empties the session slot if it still holds this
    /// user. Logging out an anonymous session does nothing.
    pub async fn logout(&self, session: &mut Session) -> CoreResult<()> {
        let Some(user_id) = session.current_user().map(|u| u.id) else {
            return Ok(());
        };
        session.sign_out();
        info!(user_id = %user_id, "user logged out");
        self.notifier.notify(Notice::success("Logged out successfully"));

        let result = self.release_slot(user_id).await;
        self.announce(result)
    }

    async fn release_slot(&self, user_id: Uuid) -> CoreResult<()> {
        let active = Session::restore(&self.repo).await?;
        if active.current_user().is_some_and(|u| u.id == user_id) {
            Session::anonymous().persist(&self.repo).await?;
        }
        Ok(())
    }

    /// The signed-in user as currently stored, or `None` for an anonymous
    /// session.
    pub async fn current_user(&self, session: &mut Session) -> CoreResult<Option<User>> {
        self.refresh(session).await?;
        Ok(session.current_user().cloned())
    }

    /// Reloads the signed-in user from the store, dropping the session if
    /// the record is gone.
    pub async fn refresh(&self, session: &mut Session) -> CoreResult<()> {
        let Some(id) = session.current_user().map(|u| u.id) else {
            return Ok(());
        };
        match self.repo.find_user(id).await? {
            Some(user) => session.refresh(user),
            None => session.sign_out(),
        }
        Ok(())
    }

    /// Builds a session for a user id taken from a verified token.
    pub async fn session_for(&self, user_id: Uuid) -> CoreResult<Session> {
        match self.repo.find_user(user_id).await? {
            Some(user) => Ok(Session::signed_in(user)),
            None => {
                warn!(user_id = %user_id, "token for unknown user");
                Err(CoreError::NotAuthenticated)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{RecordingSink, Severity};
    use crate::test_support::{memory_repo, recording_sink};

    fn service() -> (IdentityService, Repository) {
        let (svc, repo, _) = observed();
        (svc, repo)
    }

    fn observed() -> (IdentityService, Repository, Arc<RecordingSink>) {
        let repo = memory_repo();
        let sink = recording_sink();
        (IdentityService::new(repo.clone(), sink.clone()), repo, sink)
    }

    fn request(email: &str, phone: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Anil".into(),
            email: email.into(),
            phone: phone.into(),
            password: "s3cret".into(),
            is_authority: false,
        }
    }

    #[test]
    fn email_shape_is_checked() {
        assert!(is_valid_email("a@x.com"));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email("no at sign.com"));
    }

    #[tokio::test]
    async fn register_signs_in_and_persists() {
        let (svc, repo) = service();
        let mut session = Session::anonymous();
        let user = svc
            .register(&mut session, request(" A@X.com ", "+911"))
            .await
            .unwrap();

        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.reputation_points, 0);
        assert!(user.badges.is_empty());
        assert_ne!(user.credential_secret, "s3cret");
        assert_eq!(session.current_user().map(|u| u.id), Some(user.id));
        assert_eq!(repo.users().await.unwrap(), vec![user]);
    }

    #[tokio::test]
    async fn duplicate_email_leaves_collection_unchanged() {
        let (svc, repo) = service();
        let mut session = Session::anonymous();
        svc.register(&mut session, request("a@x.com", "+911")).await.unwrap();
        let before = repo.users().await.unwrap();

        let mut other = Session::anonymous();
        let err = svc
            .register(&mut other, request("a@x.com", "+922"))
            .await
            .unwrap_err();
        assert_eq!(err, CoreError::DuplicateIdentity);
        assert!(other.current_user().is_none());
        assert_eq!(repo.users().await.unwrap(), before);
    }

    #[tokio::test]
    async fn duplicate_phone_is_rejected() {
        let (svc, _) = service();
        let mut session = Session::anonymous();
        svc.register(&mut session, request("a@x.com", "+911")).await.unwrap();
        let err = svc
            .register(&mut Session::anonymous(), request("b@x.com", "+911"))
            .await
            .unwrap_err();
        assert_eq!(err, CoreError::DuplicateIdentity);
    }

    #[tokio::test]
    async fn missing_fields_fail_validation() {
        let (svc, repo) = service();
        let mut req = request("a@x.com", "+911");
        req.name = "  ".into();
        let err = svc.register(&mut Session::anonymous(), req).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed(_)));
        assert!(repo.users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn login_by_email_or_phone() {
        let (svc, _) = service();
        let registered = svc
            .register(&mut Session::anonymous(), request("a@x.com", "+911"))
            .await
            .unwrap();

        let mut session = Session::anonymous();
        let by_email = svc.login(&mut session, "a@x.com", "s3cret").await.unwrap();
        assert_eq!(by_email.id, registered.id);

        let mut session = Session::anonymous();
        let by_phone = svc.login(&mut session, "+911", "s3cret").await.unwrap();
        assert_eq!(by_phone.id, registered.id);
        assert!(session.current_user().is_some());

        svc.logout(&mut session).await.unwrap();
        assert!(session.current_user().is_none());
    }

    #[tokio::test]
    async fn session_slot_follows_login_and_logout() {
        let (svc, repo) = service();
        let mut first = Session::anonymous();
        let a = svc.register(&mut first, request("a@x.com", "+911")).await.unwrap();
        assert_eq!(repo.load_session().await.unwrap().map(|u| u.id), Some(a.id));

        let mut second = Session::anonymous();
        let b = svc.register(&mut second, request("b@x.com", "+922")).await.unwrap();
        assert_eq!(repo.load_session().await.unwrap().map(|u| u.id), Some(b.id));

        // the slot belongs to b, so a logging out leaves it alone
        svc.logout(&mut first).await.unwrap();
        assert_eq!(repo.load_session().await.unwrap().map(|u| u.id), Some(b.id));

        svc.logout(&mut second).await.unwrap();
        assert!(repo.load_session().await.unwrap().is_none());
        assert!(svc.current_user(&mut second).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn login_rejects_bad_secret_and_unknown_identifier() {
        let (svc, _) = service();
        svc.register(&mut Session::anonymous(), request("a@x.com", "+911"))
            .await
            .unwrap();

        let mut session = Session::anonymous();
        let err = svc.login(&mut session, "a@x.com", "nope").await.unwrap_err();
        assert_eq!(err, CoreError::InvalidCredentials);
        let err = svc.login(&mut session, "z@x.com", "s3cret").await.unwrap_err();
        assert_eq!(err, CoreError::InvalidCredentials);
        assert!(session.current_user().is_none());
    }

    #[tokio::test]
    async fn refresh_picks_up_store_changes() {
        let (svc, repo) = service();
        let mut session = Session::anonymous();
        let user = svc
            .register(&mut session, request("a@x.com", "+911"))
            .await
            .unwrap();

        repo.update_users(|users| {
            users[0].reputation_points = 42;
            Ok(())
        })
        .await
        .unwrap();

        let current = svc.current_user(&mut session).await.unwrap().unwrap();
        assert_eq!(current.reputation_points, 42);
        assert_eq!(session.current_user().unwrap().reputation_points, 42);

        let resolved = svc.session_for(user.id).await.unwrap();
        assert_eq!(resolved.current_user().unwrap().reputation_points, 42);
        assert_eq!(
            svc.session_for(Uuid::new_v4()).await.unwrap_err(),
            CoreError::NotAuthenticated
        );
    }

    #[tokio::test]
    async fn register_announces_welcome_and_duplicates() {
        let (svc, _, sink) = observed();
        svc.register(&mut Session::anonymous(), request("a@x.com", "+911"))
            .await
            .unwrap();
        svc.register(&mut Session::anonymous(), request("a@x.com", "+922"))
            .await
            .unwrap_err();

        assert_eq!(
            sink.notices(),
            vec![
                Notice::success("Registration successful! Welcome to CivicPulse, Anil"),
                Notice::new(
                    "User with this email or phone already exists",
                    Severity::Error
                ),
            ]
        );
    }

    #[tokio::test]
    async fn login_and_logout_announce_outcomes() {
        let (svc, _, sink) = observed();
        svc.register(&mut Session::anonymous(), request("a@x.com", "+911"))
            .await
            .unwrap();
        let registered = sink.messages().len();

        let mut session = Session::anonymous();
        svc.login(&mut session, "a@x.com", "wrong").await.unwrap_err();
        svc.login(&mut session, "a@x.com", "s3cret").await.unwrap();
        svc.logout(&mut session).await.unwrap();
        svc.logout(&mut session).await.unwrap();

        assert_eq!(
            sink.messages()[registered..],
            vec![
                "Invalid credentials",
                "Welcome back, Anil",
                "Logged out successfully",
            ]
        );
    }
}
