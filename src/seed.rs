use time::{Duration, OffsetDateTime};
use tracing::info;
use uuid::Uuid;

use crate::identity::hash_password;
use crate::identity::repo_types::User;
use crate::issues::repo_types::{Category, Issue, Location};
use crate::store::Repository;

const DEMO_AUTHORITY_EMAIL: &str = "authority@demo.com";
const DEMO_AUTHORITY_PHONE: &str = "+919999999999";
const DEMO_AUTHORITY_PASSWORD: &str = "demo123";
const DEMO_VOTES: usize = 5;

fn demo_issue() -> Issue {
    let mut issue = Issue::new(
        Category::Road,
        "Large potholes on the main road are disrupting traffic".into(),
        Location {
            latitude: 28.6139,
            longitude: 77.2090,
        },
        Uuid::new_v4(),
        "Demo Citizen".into(),
        None,
    );
    issue.timestamp = OffsetDateTime::now_utc() - Duration::days(1);
    for _ in 0..DEMO_VOTES {
        // placeholder voters with no user record behind them
        issue.votes.voters.push(Uuid::new_v4());
        issue.votes.yes += 1;
    }
    issue
}

/// Seeds a demo authority and one community-backed issue into an empty store.
/// Returns whether anything was written.
pub async fn seed_demo_data(repo: &Repository) -> anyhow::Result<bool> {
    let secret = hash_password(DEMO_AUTHORITY_PASSWORD)?;
    let seeded = repo
        .update_users(move |users| {
            if !users.is_empty() {
                return Ok(false);
            }
            users.push(User::new(
                "Authority Demo".into(),
                DEMO_AUTHORITY_EMAIL.into(),
                DEMO_AUTHORITY_PHONE.into(),
                secret,
                true,
            ));
            Ok(true)
        })
        .await?;
    if !seeded {
        return Ok(false);
    }

    repo.update_issues(|issues| {
        issues.push(demo_issue());
        Ok(())
    })
    .await?;
    info!(email = DEMO_AUTHORITY_EMAIL, "demo data seeded");
    Ok(true)
}
