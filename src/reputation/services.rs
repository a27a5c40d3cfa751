use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::identity::repo_types::User;
use crate::issues::repo_types::Issue;
use crate::reputation::badges::{grant_eligible, Action, Activity, Badge};

/// Result of one award: the updated user plus whatever it just unlocked.
#[derive(Debug, Clone)]
pub struct Award {
    pub user: User,
    pub points_awarded: u32,
    pub new_badges: Vec<Badge>,
}

/// Adds the points for `action` to `user_id` and grants any badges now
/// earned. `issues` must already include the action being rewarded.
///
/// Runs inside [`Repository::update_all`](crate::store::Repository::update_all)
/// so the award is saved together with the issue change it rewards.
pub fn apply_award(
    users: &mut [User],
    issues: &[Issue],
    user_id: Uuid,
    action: Action,
    now: OffsetDateTime,
) -> CoreResult<Award> {
    let Some(user) = users.iter_mut().find(|u| u.id == user_id) else {
        warn!(user_id = %user_id, "award for unknown user");
        return Err(CoreError::NotAuthenticated);
    };

    let points_awarded = action.points();
    user.reputation_points = user.reputation_points.saturating_add(points_awarded);
    let activity = Activity {
        issues_reported: issues.iter().filter(|i| i.reporter_id == user_id).count(),
        points: user.reputation_points,
    };
    let new_badges = grant_eligible(user, action, &activity, now);

    info!(
        user_id = %user_id,
        points = user.reputation_points,
        new_badges = new_badges.len(),
        "reputation awarded"
    );
    Ok(Award {
        user: user.clone(),
        points_awarded,
        new_badges,
    })
}
