use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::{
    error::CoreError,
    identity::extractors::AuthSession,
    projections::dto::{AuthorityDashboard, GlobalStats, UserDashboard},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/me/dashboard", get(my_dashboard))
        .route("/authority/dashboard", get(authority_dashboard))
}

#[instrument(skip(state))]
pub async fn stats(State(state): State<AppState>) -> Result<Json<GlobalStats>, CoreError> {
    Ok(Json(state.projections.global_stats().await?))
}

#[instrument(skip(state, session))]
pub async fn my_dashboard(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<Json<UserDashboard>, CoreError> {
    Ok(Json(state.projections.user_dashboard(&session).await?))
}

#[instrument(skip(state, session))]
pub async fn authority_dashboard(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<Json<AuthorityDashboard>, CoreError> {
    Ok(Json(state.projections.authority_dashboard(&session).await?))
}
