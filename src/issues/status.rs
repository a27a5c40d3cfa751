use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Yes-votes needed before a pending issue counts as community-verified.
pub const VERIFICATION_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum IssueStatus {
    Pending,
    Verified,
    InProgress,
    Resolved,
}

/// Transitions an authority may request. `Pending -> Verified` is driven by
/// votes only, see [`IssueStatus::after_votes`].
const MANUAL_TRANSITIONS: &[(IssueStatus, IssueStatus)] = &[
    (IssueStatus::Pending, IssueStatus::InProgress),
    (IssueStatus::Verified, IssueStatus::InProgress),
    (IssueStatus::InProgress, IssueStatus::Resolved),
];

impl IssueStatus {
    #[cfg(test)]
    pub const ALL: [IssueStatus; 4] = [
        IssueStatus::Pending,
        IssueStatus::Verified,
        IssueStatus::InProgress,
        IssueStatus::Resolved,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            IssueStatus::Pending => "pending",
            IssueStatus::Verified => "verified",
            IssueStatus::InProgress => "in-progress",
            IssueStatus::Resolved => "resolved",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, IssueStatus::Resolved)
    }

    pub fn can_transition_to(self, to: IssueStatus) -> bool {
        MANUAL_TRANSITIONS.contains(&(self, to))
    }

    /// Applies a manually requested transition.
    pub fn transition_to(self, to: IssueStatus) -> CoreResult<IssueStatus> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(CoreError::InvalidTransition {
                from: self.to_string(),
                to: to.to_string(),
            })
        }
    }

    /// Status after the tally reaches `yes` approving votes.
    pub fn after_votes(self, yes: u32) -> IssueStatus {
        match self {
            IssueStatus::Pending if yes >= VERIFICATION_THRESHOLD => IssueStatus::Verified,
            other => other,
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
