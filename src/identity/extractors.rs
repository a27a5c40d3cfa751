use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::error::CoreError;
use crate::identity::jwt::JwtKeys;
use crate::identity::session::Session;
use crate::state::AppState;

/// Resolves the bearer access token into a [`Session`] for the request.
pub struct AuthSession(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = CoreError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Read Authorization header
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(CoreError::NotAuthenticated)?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or(CoreError::NotAuthenticated)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify_access(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            CoreError::NotAuthenticated
        })?;

        let session = state.identity.session_for(claims.sub).await?;
        Ok(AuthSession(session))
    }
}
