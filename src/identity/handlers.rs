use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    error::{ApiError, CoreError},
    identity::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        extractors::AuthSession,
        jwt::JwtKeys,
        repo_types::User,
        session::Session,
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn issue_tokens(keys: &JwtKeys, user: User) -> Result<AuthResponse, ApiError> {
    let access_token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser::from(user),
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let mut session = Session::anonymous();
    let user = state.identity.register(&mut session, payload).await?;
    let keys = JwtKeys::from_ref(&state);
    Ok((StatusCode::CREATED, Json(issue_tokens(&keys, user)?)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let mut session = Session::anonymous();
    let user = state
        .identity
        .login(&mut session, &payload.identifier, &payload.password)
        .await?;
    let keys = JwtKeys::from_ref(&state);
    Ok(Json(issue_tokens(&keys, user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|_| CoreError::NotAuthenticated)?;

    let session = state.identity.session_for(claims.sub).await?;
    let user = session.require_user()?.clone();
    Ok(Json(issue_tokens(&keys, user)?))
}

/// Tokens are stateless; this ends the request's session and clears the
/// session slot.
#[instrument(skip(state, session))]
pub async fn logout(
    State(state): State<AppState>,
    AuthSession(mut session): AuthSession,
) -> Result<StatusCode, ApiError> {
    state.identity.logout(&mut session).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, session))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthSession(mut session): AuthSession,
) -> Result<Json<PublicUser>, ApiError> {
    let user = state
        .identity
        .current_user(&mut session)
        .await?
        .ok_or(CoreError::NotAuthenticated)?;
    Ok(Json(PublicUser::from(user)))
}
