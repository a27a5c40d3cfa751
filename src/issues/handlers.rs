use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    error::CoreError,
    identity::extractors::AuthSession,
    issues::{
        dto::{
            IssueFilter, QuickSubmitRequest, StatusRequest, SubmitIssueRequest, VoteRequest,
            VoteResult,
        },
        repo_types::Issue,
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/issues", get(list_issues).post(submit_issue))
        .route("/issues/quick", post(quick_submit))
        .route("/issues/:id", get(get_issue))
        .route("/issues/:id/votes", post(cast_vote))
        .route("/issues/:id/status", put(set_status))
}

type Created = (StatusCode, [(header::HeaderName, String); 1], Json<Issue>);

fn created(issue: Issue) -> Created {
    let location = format!("/api/v1/issues/{}", issue.id);
    (StatusCode::CREATED, [(header::LOCATION, location)], Json(issue))
}

#[instrument(skip(state))]
pub async fn list_issues(
    State(state): State<AppState>,
    Query(filter): Query<IssueFilter>,
) -> Result<Json<Vec<Issue>>, CoreError> {
    Ok(Json(state.projections.issues(&filter).await?))
}

#[instrument(skip(state))]
pub async fn get_issue(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Issue>, CoreError> {
    Ok(Json(state.projections.issue(id).await?))
}

#[instrument(skip(state, session, payload))]
pub async fn submit_issue(
    State(state): State<AppState>,
    AuthSession(mut session): AuthSession,
    Json(payload): Json<SubmitIssueRequest>,
) -> Result<Created, CoreError> {
    let issue = state.lifecycle.submit_issue(&mut session, payload).await?;
    Ok(created(issue))
}

#[instrument(skip(state, session, payload))]
pub async fn quick_submit(
    State(state): State<AppState>,
    AuthSession(mut session): AuthSession,
    Json(payload): Json<QuickSubmitRequest>,
) -> Result<Created, CoreError> {
    let issue = state.lifecycle.quick_submit(&mut session, payload).await?;
    Ok(created(issue))
}

#[instrument(skip(state, session))]
pub async fn cast_vote(
    State(state): State<AppState>,
    AuthSession(mut session): AuthSession,
    Path(id): Path<Uuid>,
    Json(payload): Json<VoteRequest>,
) -> Result<Json<VoteResult>, CoreError> {
    let result = state
        .lifecycle
        .cast_vote(&mut session, id, payload.approve)
        .await?;
    Ok(Json(result))
}

#[instrument(skip(state, session))]
pub async fn set_status(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusRequest>,
) -> Result<Json<Issue>, CoreError> {
    let issue = state
        .lifecycle
        .set_status(&session, id, payload.status)
        .await?;
    Ok(Json(issue))
}
