use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::Resource;

#[derive(Debug, Clone, Deserialize)]
pub struct EventAttributes {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub canceled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub canceled: bool,
}

impl EventRecord {
    pub fn from_resource(resource: Resource<EventAttributes>) -> Self {
        let a = resource.attributes;
        Self {
            id: resource.id,
            name: a.name,
            description: a.description,
            starts_at: a.starts_at,
            ends_at: a.ends_at,
            canceled: a.canceled,
        }
    }
}
