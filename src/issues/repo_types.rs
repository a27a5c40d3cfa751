use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::issues::status::IssueStatus;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Road,
    Water,
    Electricity,
    Garbage,
    Traffic,
    Other,
}

impl Category {
    /// Description used by quick submit when the reporter left it blank.
    pub const fn stock_description(self) -> &'static str {
        match self {
            Category::Road => "Road damage that needs urgent repair",
            Category::Water => "Water supply or drainage problem",
            Category::Electricity => "Electricity supply problem",
            Category::Garbage => "Garbage has not been collected",
            Category::Traffic => "Traffic problem at this location",
            Category::Other => "Civic problem that needs attention",
        }
    }
}

/// WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn validate(self) -> CoreResult<Location> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(CoreError::validation("latitude must be within [-90, 90]"));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(CoreError::validation("longitude must be within [-180, 180]"));
        }
        Ok(self)
    }
}

/// Community tally. `voters.len() == yes + no` at all times.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Votes {
    pub yes: u32,
    pub no: u32,
    pub voters: Vec<Uuid>,
}

impl Votes {
    pub fn has_voted(&self, voter: Uuid) -> bool {
        self.voters.contains(&voter)
    }

    pub fn record(&mut self, voter: Uuid, approve: bool) -> CoreResult<()> {
        if self.has_voted(voter) {
            return Err(CoreError::AlreadyVoted);
        }
        if approve {
            self.yes += 1;
        } else {
            self.no += 1;
        }
        self.voters.push(voter);
        Ok(())
    }
}

/// Issue record as persisted in the `issues` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: Uuid,
    pub category: Category,
    pub description: String,
    pub location: Location,
    pub reporter_id: Uuid,
    pub reporter_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub status: IssueStatus,
    pub votes: Votes,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_updated: Option<OffsetDateTime>,
    #[serde(default)]
    pub updated_by: Option<Uuid>,
    #[serde(default)]
    pub photo_ref: Option<String>,
}

impl Issue {
    pub fn new(
        category: Category,
        description: String,
        location: Location,
        reporter_id: Uuid,
        reporter_name: String,
        photo_ref: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category,
            description,
            location,
            reporter_id,
            reporter_name,
            timestamp: OffsetDateTime::now_utc(),
            status: IssueStatus::Pending,
            votes: Votes::default(),
            last_updated: None,
            updated_by: None,
            photo_ref,
        }
    }

    pub fn is_community_verified(&self) -> bool {
        self.votes.yes >= crate::issues::status::VERIFICATION_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_vote_from_same_user_is_rejected() {
        let mut votes = Votes::default();
        let voter = Uuid::new_v4();
        votes.record(voter, true).unwrap();
        assert_eq!(votes.record(voter, false), Err(CoreError::AlreadyVoted));
        assert_eq!((votes.yes, votes.no, votes.voters.len()), (1, 0, 1));
    }

    fn at(latitude: f64, longitude: f64) -> Location {
        Location {
            latitude,
            longitude,
        }
    }

    #[test]
    fn location_bounds_are_checked() {
        assert!(at(28.61, 77.20).validate().is_ok());
        assert!(at(91.0, 0.0).validate().is_err());
        assert!(at(0.0, -180.5).validate().is_err());
        assert!(at(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn issue_round_trips_through_camel_case_json() {
        let issue = Issue::new(
            Category::Garbage,
            "overflowing bin".into(),
            at(1.0, 2.0),
            Uuid::new_v4(),
            "Asha".into(),
            None,
        );
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["category"], "garbage");
        assert!(json.get("reporterId").is_some());
        assert!(json["lastUpdated"].is_null());

        let back: Issue = serde_json::from_value(json).unwrap();
        assert_eq!(back, issue);
    }
}
