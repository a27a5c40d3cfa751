use tracing::instrument;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::identity::repo_types::User;
use crate::identity::session::Session;
use crate::issues::dto::IssueFilter;
use crate::issues::repo_types::Issue;
use crate::issues::status::IssueStatus;
use crate::projections::dto::{AuthorityDashboard, GlobalStats, UserDashboard};
use crate::store::Repository;

pub const RECENT_ISSUES: usize = 5;

/// Newest first; issues sharing a timestamp keep latest-stored first.
fn newest_first(issues: &mut [Issue]) {
    issues.reverse();
    issues.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

fn count_where(issues: &[Issue], pred: impl Fn(IssueStatus) -> bool) -> usize {
    issues.iter().filter(|i| pred(i.status)).count()
}

pub fn global_stats(users: &[User], issues: &[Issue]) -> GlobalStats {
    GlobalStats {
        total_issues: issues.len(),
        resolved_issues: count_where(issues, |s| s == IssueStatus::Resolved),
        total_users: users.len(),
    }
}

pub fn user_dashboard(user: &User, issues: &[Issue]) -> UserDashboard {
    let mut mine: Vec<Issue> = issues
        .iter()
        .filter(|i| i.reporter_id == user.id)
        .cloned()
        .collect();
    let issues_reported = mine.len();
    newest_first(&mut mine);
    mine.truncate(RECENT_ISSUES);

    UserDashboard {
        issues_reported,
        reputation_points: user.reputation_points,
        badge_count: user.badges.len(),
        recent_issues: mine,
    }
}

pub fn authority_dashboard(issues: &[Issue]) -> AuthorityDashboard {
    let verified: Vec<Issue> = issues
        .iter()
        .filter(|i| i.is_community_verified())
        .cloned()
        .collect();

    AuthorityDashboard {
        awaiting_action: count_where(&verified, |s| {
            matches!(s, IssueStatus::Pending | IssueStatus::Verified)
        }),
        in_progress: count_where(&verified, |s| s == IssueStatus::InProgress),
        resolved: count_where(&verified, |s| s == IssueStatus::Resolved),
        issues: verified,
    }
}

/// Read-only views recomputed from the current collections on every call.
#[derive(Clone)]
pub struct Projections {
    repo: Repository,
}

impl Projections {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    #[instrument(skip(self))]
    pub async fn global_stats(&self) -> CoreResult<GlobalStats> {
        let users = self.repo.users().await?;
        let issues = self.repo.issues().await?;
        Ok(global_stats(&users, &issues))
    }

    #[instrument(skip_all)]
    pub async fn user_dashboard(&self, session: &Session) -> CoreResult<UserDashboard> {
        let user_id = session.require_user()?.id;
        let user = self
            .repo
            .find_user(user_id)
            .await?
            .ok_or(CoreError::NotAuthenticated)?;
        let issues = self.repo.issues().await?;
        Ok(user_dashboard(&user, &issues))
    }

    #[instrument(skip_all)]
    pub async fn authority_dashboard(&self, session: &Session) -> CoreResult<AuthorityDashboard> {
        session.require_authority()?;
        let issues = self.repo.issues().await?;
        Ok(authority_dashboard(&issues))
    }

    /// All issues, optionally filtered by status, newest first.
    pub async fn issues(&self, filter: &IssueFilter) -> CoreResult<Vec<Issue>> {
        let mut issues: Vec<Issue> = self
            .repo
            .issues()
            .await?
            .into_iter()
            .filter(|i| filter.status.map_or(true, |s| i.status == s))
            .collect();
        newest_first(&mut issues);
        Ok(issues)
    }

    pub async fn issue(&self, id: Uuid) -> CoreResult<Issue> {
        self.repo.find_issue(id).await?.ok_or(CoreError::NotFound)
    }
}
