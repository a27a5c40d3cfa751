use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::identity::repo_types::User;

/// Qualifying actions and the points each one is worth.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Report,
    Vote,
}

impl Action {
    pub const fn points(self) -> u32 {
        match self {
            Action::Report => 10,
            Action::Vote => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BadgeType {
    Reporter,
    Voter,
    Active,
    Expert,
}

impl BadgeType {
    pub const fn display_name(self) -> &'static str {
        match self {
            BadgeType::Reporter => "First Reporter",
            BadgeType::Voter => "Community Voter",
            BadgeType::Active => "Active Citizen",
            BadgeType::Expert => "Civic Expert",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            BadgeType::Reporter => "fas fa-flag",
            BadgeType::Voter => "fas fa-vote-yea",
            BadgeType::Active => "fas fa-star",
            BadgeType::Expert => "fas fa-trophy",
        }
    }
}

/// Achievement held by a user. Never modified after it is granted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    #[serde(rename = "type")]
    pub kind: BadgeType,
    pub name: String,
    pub icon: String,
    #[serde(with = "time::serde::rfc3339")]
    pub earned_date: OffsetDateTime,
}

impl Badge {
    pub fn earned(kind: BadgeType, at: OffsetDateTime) -> Self {
        Self {
            kind,
            name: kind.display_name().to_string(),
            icon: kind.icon().to_string(),
            earned_date: at,
        }
    }
}

/// What a user has done so far, as seen by the badge rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activity {
    pub issues_reported: usize,
    pub points: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    IssuesReported(usize),
    Points(u32),
}

impl Threshold {
    pub fn is_met(self, activity: &Activity) -> bool {
        match self {
            Threshold::IssuesReported(n) => activity.issues_reported >= n,
            Threshold::Points(p) => activity.points >= p,
        }
    }
}

/// Which actions cause a rule to be looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    On(Action),
    AnyAction,
}

impl Trigger {
    pub fn fires_on(self, action: Action) -> bool {
        match self {
            Trigger::On(a) => a == action,
            Trigger::AnyAction => true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BadgeRule {
    pub badge: BadgeType,
    pub trigger: Trigger,
    pub threshold: Threshold,
}

/// Evaluated top to bottom, each rule independently of the others.
/// The voter rule is measured in points: 10 points is five votes' worth.
pub const BADGE_RULES: [BadgeRule; 4] = [
    BadgeRule {
        badge: BadgeType::Reporter,
        trigger: Trigger::On(Action::Report),
        threshold: Threshold::IssuesReported(1),
    },
    BadgeRule {
        badge: BadgeType::Voter,
        trigger: Trigger::On(Action::Vote),
        threshold: Threshold::Points(10),
    },
    BadgeRule {
        badge: BadgeType::Active,
        trigger: Trigger::AnyAction,
        threshold: Threshold::Points(50),
    },
    BadgeRule {
        badge: BadgeType::Expert,
        trigger: Trigger::AnyAction,
        threshold: Threshold::Points(100),
    },
];

/// Grants every badge the user now qualifies for after `action` and does
/// not hold yet. Returns the newly granted badges in rule order.
pub fn grant_eligible(
    user: &mut User,
    action: Action,
    activity: &Activity,
    now: OffsetDateTime,
) -> Vec<Badge> {
    let mut granted = Vec::new();
    for rule in BADGE_RULES {
        if !rule.trigger.fires_on(action)
            || user.has_badge(rule.badge)
            || !rule.threshold.is_met(activity)
        {
            continue;
        }
        let badge = Badge::earned(rule.badge, now);
        user.badges.push(badge.clone());
        granted.push(badge);
    }
    granted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_user() -> User {
        User::new(
            "Ravi".into(),
            "ravi@example.com".into(),
            "+911234567890".into(),
            "hash".into(),
            false,
        )
    }

    fn tally(issues_reported: usize, points: u32) -> Activity {
        Activity {
            issues_reported,
            points,
        }
    }

    fn kinds(badges: &[Badge]) -> Vec<BadgeType> {
        badges.iter().map(|b| b.kind).collect()
    }

    #[test]
    fn first_report_grants_reporter_only() {
        let mut user = blank_user();
        let granted = grant_eligible(
            &mut user,
            Action::Report,
            &tally(1, 10),
            OffsetDateTime::now_utc(),
        );
        assert_eq!(kinds(&granted), vec![BadgeType::Reporter]);
    }

    #[test]
    fn voter_badge_needs_a_vote_and_ten_points() {
        let mut user = blank_user();
        let activity = tally(0, 8);
        let granted = grant_eligible(&mut user, Action::Vote, &activity, OffsetDateTime::now_utc());
        assert!(granted.is_empty());

        let activity = tally(0, 10);
        let granted = grant_eligible(&mut user, Action::Vote, &activity, OffsetDateTime::now_utc());
        assert_eq!(kinds(&granted), vec![BadgeType::Voter]);
    }

    #[test]
    fn point_badges_fire_on_any_action() {
        let mut user = blank_user();
        let activity = tally(0, 100);
        let granted = grant_eligible(&mut user, Action::Vote, &activity, OffsetDateTime::now_utc());
        assert_eq!(
            kinds(&granted),
            vec![BadgeType::Voter, BadgeType::Active, BadgeType::Expert]
        );
    }

    #[test]
    fn re_evaluation_is_idempotent() {
        let mut user = blank_user();
        let activity = tally(12, 120);
        let now = OffsetDateTime::now_utc();
        grant_eligible(&mut user, Action::Report, &activity, now);
        grant_eligible(&mut user, Action::Vote, &activity, now);
        assert_eq!(user.badges.len(), 4);

        let again = grant_eligible(&mut user, Action::Report, &activity, now);
        assert!(again.is_empty());
        assert_eq!(user.badges.len(), 4);
    }

    #[test]
    fn badge_serialises_type_field() {
        let badge = Badge::earned(BadgeType::Expert, OffsetDateTime::now_utc());
        let json = serde_json::to_value(&badge).unwrap();
        assert_eq!(json["type"], "expert");
        assert_eq!(json["name"], "Civic Expert");
        assert!(json.get("earnedDate").is_some());
    }
}
