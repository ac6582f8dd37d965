use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MembershipId, PersonId};
use crate::api::jsonapi::deserialize_id;
use crate::api::Resource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipRole {
    Leader,
    Member,
}

impl MembershipRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipRole::Leader => "leader",
            MembershipRole::Member => "member",
        }
    }

    pub fn from_leader(leader: bool) -> Self {
        if leader {
            MembershipRole::Leader
        } else {
            MembershipRole::Member
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MembershipAttributes {
    /// The person's id in the people resource
    #[serde(deserialize_with = "deserialize_id")]
    pub account_center_identifier: PersonId,
    pub role: MembershipRole,
    #[serde(default)]
    pub attendance_taker: bool,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
}

/// A person's membership in one group. Never cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MembershipRecord {
    pub id: MembershipId,
    pub person_id: PersonId,
    pub leader: bool,
    pub attendance_taker: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub joined_at: Option<DateTime<Utc>>,
}

impl MembershipRecord {
    pub fn from_resource(resource: Resource<MembershipAttributes>) -> Self {
        let a = resource.attributes;
        Self {
            id: resource.id,
            person_id: a.account_center_identifier,
            leader: a.role == MembershipRole::Leader,
            attendance_taker: a.attendance_taker,
            first_name: a.first_name,
            last_name: a.last_name,
            joined_at: a.joined_at,
        }
    }

    pub fn role(&self) -> MembershipRole {
        MembershipRole::from_leader(self.leader)
    }

    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }
}
