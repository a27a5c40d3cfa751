use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::issues::repo_types::{Category, Location};
use crate::issues::status::IssueStatus;

/// Validated inputs handed over by the glue layer. Missing fields are
/// rejected by the engine, not by deserialisation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitIssueRequest {
    pub category: Option<Category>,
    #[serde(default)]
    pub description: String,
    pub location: Option<Location>,
    #[serde(default)]
    pub photo_ref: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuickSubmitRequest {
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub description: Option<String>,
    pub location: Option<Location>,
    #[serde(default)]
    pub photo_ref: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub approve: bool,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: IssueStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct IssueFilter {
    pub status: Option<IssueStatus>,
}

/// Tally after a successful vote.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VoteResult {
    pub issue_id: Uuid,
    pub yes: u32,
    pub no: u32,
    pub status: IssueStatus,
    pub just_verified: bool,
}
