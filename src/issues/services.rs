use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::identity::session::Session;
use crate::issues::dto::{QuickSubmitRequest, SubmitIssueRequest, VoteResult};
use crate::issues::repo_types::{Category, Issue};
use crate::issues::status::IssueStatus;
use crate::notify::{Notice, NotificationSink};
use crate::reputation::badges::Action;
use crate::reputation::services::{apply_award, Award};
use crate::store::Repository;

/// Creates issues, records votes and moves issues through their lifecycle.
///
/// Every public operation reports its outcome to the notification sink,
/// failures included, and leaves the caller's session holding the user
/// record as persisted after any reputation award.
#[derive(Clone)]
pub struct LifecycleEngine {
    repo: Repository,
    notifier: Arc<dyn NotificationSink>,
}

impl LifecycleEngine {
    pub fn new(repo: Repository, notifier: Arc<dyn NotificationSink>) -> Self {
        Self { repo, notifier }
    }

    fn announce<T>(&self, result: CoreResult<T>) -> CoreResult<T> {
        if let Err(e) = &result {
            self.notifier.notify(Notice::new(e.to_string(), e.severity()));
        }
        result
    }

    fn announce_badges(&self, award: &Award) {
        for badge in &award.new_badges {
            self.notifier
                .notify(Notice::success(format!("Badge Unlocked: {}!", badge.name)));
        }
    }

    pub async fn submit_issue(
        &self,
        session: &mut Session,
        req: SubmitIssueRequest,
    ) -> CoreResult<Issue> {
        let result = self.submit(session, req).await;
        self.announce(result)
    }

    #[instrument(skip_all)]
    async fn submit(&self, session: &mut Session, req: SubmitIssueRequest) -> CoreResult<Issue> {
        let reporter = session.require_user()?.clone();

        let category = req
            .category
            .ok_or_else(|| CoreError::validation("category is required"))?;
        let description = req.description.trim();
        if description.is_empty() {
            return Err(CoreError::validation("description is required"));
        }
        let location = req
            .location
            .ok_or_else(|| CoreError::validation("location is required"))?
            .validate()?;
        let photo_ref = req
            .photo_ref
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        let issue = Issue::new(
            category,
            description.to_string(),
            location,
            reporter.id,
            reporter.name.clone(),
            photo_ref,
        );
        let stored = issue.clone();
        let reporter_id = reporter.id;
        let award = self
            .repo
            .update_all(move |issues, users| {
                issues.push(stored);
                let now = OffsetDateTime::now_utc();
                apply_award(users, issues, reporter_id, Action::Report, now)
            })
            .await?;
        info!(
            issue_id = %issue.id,
            reporter_id = %reporter.id,
            category = ?issue.category,
            "issue submitted"
        );
        session.refresh(award.user.clone());

        self.notifier.notify(Notice::success(format!(
            "Issue submitted successfully! You earned {} reputation points.",
            award.points_awarded
        )));
        self.announce_badges(&award);
        Ok(issue)
    }

    /// Submit with defaults: category falls back to `other` and a blank
    /// description is replaced by the category's stock description.
    pub async fn quick_submit(
        &self,
        session: &mut Session,
        req: QuickSubmitRequest,
    ) -> CoreResult<Issue> {
        let category = req.category.unwrap_or(Category::Other);
        let description = req
            .description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| category.stock_description().to_string());

        let issue = self
            .submit_issue(
                session,
                SubmitIssueRequest {
                    category: Some(category),
                    description,
                    location: req.location,
                    photo_ref: req.photo_ref,
                },
            )
            .await?;
        self.notifier.notify(Notice::success("Quick submit completed!"));
        Ok(issue)
    }

    pub async fn cast_vote(
        &self,
        session: &mut Session,
        issue_id: Uuid,
        approve: bool,
    ) -> CoreResult<VoteResult> {
        let result = self.vote(session, issue_id, approve).await;
        self.announce(result)
    }

    #[instrument(skip(self, session))]
    async fn vote(
        &self,
        session: &mut Session,
        issue_id: Uuid,
        approve: bool,
    ) -> CoreResult<VoteResult> {
        let voter = session.require_user()?.id;

        let (outcome, award) = self
            .repo
            .update_all(|issues, users| {
                let issue = issues
                    .iter_mut()
                    .find(|i| i.id == issue_id)
                    .ok_or(CoreError::NotFound)?;
                issue.votes.record(voter, approve)?;

                let before = issue.status;
                issue.status = before.after_votes(issue.votes.yes);
                let outcome = VoteResult {
                    issue_id,
                    yes: issue.votes.yes,
                    no: issue.votes.no,
                    status: issue.status,
                    just_verified: before != issue.status,
                };
                let now = OffsetDateTime::now_utc();
                let award = apply_award(users, issues, voter, Action::Vote, now)?;
                Ok((outcome, award))
            })
            .await
            .inspect_err(|e| {
                if *e == CoreError::AlreadyVoted {
                    warn!(voter_id = %voter, "repeat vote rejected");
                }
            })?;
        info!(voter_id = %voter, yes = outcome.yes, no = outcome.no, "vote recorded");

        if outcome.just_verified {
            info!(issue_id = %issue_id, "issue verified by the community");
            self.notifier
                .notify(Notice::success("Issue has been verified by the community!"));
        }

        session.refresh(award.user.clone());

        self.notifier.notify(Notice::success(format!(
            "Thank you for your vote! You earned {} reputation points.",
            award.points_awarded
        )));
        self.announce_badges(&award);
        Ok(outcome)
    }

    /// Manual status change by an authority account.
    pub async fn set_status(
        &self,
        session: &Session,
        issue_id: Uuid,
        new_status: IssueStatus,
    ) -> CoreResult<Issue> {
        let result = self.change_status(session, issue_id, new_status).await;
        self.announce(result)
    }

    #[instrument(skip(self, session))]
    async fn change_status(
        &self,
        session: &Session,
        issue_id: Uuid,
        new_status: IssueStatus,
    ) -> CoreResult<Issue> {
        let actor = session.require_authority()?.id;

        let issue = self
            .repo
            .update_issues(|issues| {
                let issue = issues
                    .iter_mut()
                    .find(|i| i.id == issue_id)
                    .ok_or(CoreError::NotFound)?;
                issue.status = issue.status.transition_to(new_status)?;
                issue.last_updated = Some(OffsetDateTime::now_utc());
                issue.updated_by = Some(actor);
                Ok(issue.clone())
            })
            .await?;
        info!(actor_id = %actor, status = %issue.status, "issue status changed");

        let notice = if issue.status.is_terminal() {
            "Issue has been marked as resolved. All users will be notified."
        } else {
            "Issue marked as in progress."
        };
        self.notifier.notify(Notice::success(notice));
        Ok(issue)
    }
}
