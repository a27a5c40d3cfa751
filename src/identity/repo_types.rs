use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::reputation::badges::{Badge, BadgeType};

/// User record as persisted in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,                     // unique user ID
    pub name: String,
    pub email: String,                // unique, stored lowercased
    pub phone: String,                // unique
    pub credential_secret: String,    // Argon2 hash, never exposed by the API
    pub is_authority: bool,           // fixed at registration
    pub reputation_points: u32,
    #[serde(default)]
    pub badges: Vec<Badge>,
    #[serde(with = "time::serde::rfc3339")]
    pub join_date: OffsetDateTime,
}

impl User {
    pub fn new(
        name: String,
        email: String,
        phone: String,
        credential_secret: String,
        is_authority: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            phone,
            credential_secret,
            is_authority,
            reputation_points: 0,
            badges: Vec::new(),
            join_date: OffsetDateTime::now_utc(),
        }
    }

    pub fn has_badge(&self, kind: BadgeType) -> bool {
        self.badges.iter().any(|b| b.kind == kind)
    }

    /// True when `identifier` names this user by email or by phone.
    pub fn is_identified_by(&self, identifier: &str) -> bool {
        self.email.eq_ignore_ascii_case(identifier) || self.phone == identifier
    }
}
