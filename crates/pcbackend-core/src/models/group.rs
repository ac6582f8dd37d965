//! Group record and the enumerations used by group settings.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GroupId, LocationId};
use crate::api::Resource;

// ============================================================================
// Enumerations
// ============================================================================

/// Group type, identified remotely by a numeric group type id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupType {
    SmallGroup,
    SeasonalClasses,
    Online,
    /// Any group type id not known to this client.
    Unique,
}

const SMALL_GROUP_TYPE_ID: u64 = 82050;
const SEASONAL_CLASSES_TYPE_ID: u64 = 82051;
const ONLINE_TYPE_ID: u64 = 156530;

impl GroupType {
    pub fn from_type_id(id: Option<u64>) -> Self {
        match id {
            Some(SMALL_GROUP_TYPE_ID) => GroupType::SmallGroup,
            Some(SEASONAL_CLASSES_TYPE_ID) => GroupType::SeasonalClasses,
            Some(ONLINE_TYPE_ID) => GroupType::Online,
            _ => GroupType::Unique,
        }
    }

    pub fn type_id(&self) -> Option<u64> {
        match self {
            GroupType::SmallGroup => Some(SMALL_GROUP_TYPE_ID),
            GroupType::SeasonalClasses => Some(SEASONAL_CLASSES_TYPE_ID),
            GroupType::Online => Some(ONLINE_TYPE_ID),
            GroupType::Unique => None,
        }
    }

    /// Value posted as `group[group_type_id]`
    pub fn form_value(&self) -> String {
        match self.type_id() {
            Some(id) => id.to_string(),
            None => "unique".to_string(),
        }
    }
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GroupType::SmallGroup => "small_group",
            GroupType::SeasonalClasses => "seasonal_classes",
            GroupType::Online => "online",
            GroupType::Unique => "unique",
        };
        f.write_str(s)
    }
}

impl FromStr for GroupType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "smallgroup" => Ok(GroupType::SmallGroup),
            "seasonalclasses" => Ok(GroupType::SeasonalClasses),
            "online" => Ok(GroupType::Online),
            "unique" => Ok(GroupType::Unique),
            _ => Err(format!("Unknown group type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupEnrollment {
    Closed,
    RequestToJoin,
    OpenSignup,
    #[serde(other)]
    Unknown,
}

impl GroupEnrollment {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupEnrollment::Closed => "closed",
            GroupEnrollment::RequestToJoin => "request_to_join",
            GroupEnrollment::OpenSignup => "open_signup",
            GroupEnrollment::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupLocationType {
    Physical,
    Virtual,
    #[serde(other)]
    Unknown,
}

impl GroupLocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupLocationType::Physical => "physical",
            GroupLocationType::Virtual => "virtual",
            GroupLocationType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupEventsVisibility {
    Members,
    Public,
    #[serde(other)]
    Unknown,
}

impl GroupEventsVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupEventsVisibility::Members => "members",
            GroupEventsVisibility::Public => "public",
            GroupEventsVisibility::Unknown => "unknown",
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// Raw `attributes` object of a Group resource.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupAttributes {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub enrollment_open: bool,
    #[serde(default = "default_enrollment")]
    pub enrollment_strategy: GroupEnrollment,
    #[serde(default = "default_events_visibility")]
    pub events_visibility: GroupEventsVisibility,
    #[serde(default = "default_location_type")]
    pub location_type_preference: GroupLocationType,
    #[serde(default)]
    pub memberships_count: u32,
    #[serde(default)]
    pub public_church_center_web_url: Option<String>,
    #[serde(default)]
    pub virtual_location_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archived_at: Option<DateTime<Utc>>,
}

fn default_enrollment() -> GroupEnrollment {
    GroupEnrollment::Unknown
}

fn default_events_visibility() -> GroupEventsVisibility {
    GroupEventsVisibility::Unknown
}

fn default_location_type() -> GroupLocationType {
    GroupLocationType::Unknown
}

/// Cached snapshot of a remote group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRecord {
    pub id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub schedule: Option<String>,
    pub group_type: GroupType,
    pub contact_email: Option<String>,
    pub location_id: Option<LocationId>,
    pub enrollment_open: bool,
    pub enrollment_strategy: GroupEnrollment,
    pub events_visibility: GroupEventsVisibility,
    pub location_type_preference: GroupLocationType,
    pub memberships_count: u32,
    pub public_church_center_web_url: Option<String>,
    pub virtual_location_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl GroupRecord {
    pub fn from_resource(resource: Resource<GroupAttributes>) -> Self {
        let group_type = GroupType::from_type_id(resource.related_id("group_type"));
        let location_id = resource.related_id("location");
        let a = resource.attributes;
        Self {
            id: resource.id,
            name: a.name,
            description: a.description,
            schedule: a.schedule,
            group_type,
            contact_email: a.contact_email,
            location_id,
            enrollment_open: a.enrollment_open,
            enrollment_strategy: a.enrollment_strategy,
            events_visibility: a.events_visibility,
            location_type_preference: a.location_type_preference,
            memberships_count: a.memberships_count,
            public_church_center_web_url: a.public_church_center_web_url,
            virtual_location_url: a.virtual_location_url,
            created_at: a.created_at,
            archived_at: a.archived_at,
        }
    }

    /// A group is publicly listed exactly when it has a public page URL
    pub fn publicly_visible(&self) -> bool {
        self.public_church_center_web_url.is_some()
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}
