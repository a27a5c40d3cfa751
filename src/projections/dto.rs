use serde::Serialize;

use crate::issues::repo_types::Issue;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GlobalStats {
    pub total_issues: usize,
    pub resolved_issues: usize,
    pub total_users: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDashboard {
    pub issues_reported: usize,
    pub reputation_points: u32,
    pub badge_count: usize,
    /// Newest first, at most [`RECENT_ISSUES`](super::services::RECENT_ISSUES).
    pub recent_issues: Vec<Issue>,
}

/// Counts over community-verified issues only (`votes.yes >= 3`).
#[derive(Debug, Clone, Serialize)]
pub struct AuthorityDashboard {
    /// Pending or verified, waiting for an authority to pick them up.
    pub awaiting_action: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub issues: Vec<Issue>,
}
