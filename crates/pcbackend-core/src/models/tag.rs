use serde::{Deserialize, Serialize};

use super::{Identified, TagId};
use crate::api::Resource;

#[derive(Debug, Clone, Deserialize)]
pub struct TagAttributes {
    pub name: String,
    #[serde(default)]
    pub position: Option<i64>,
}

/// Entry of the global (not group-scoped) tag catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    pub id: TagId,
    pub name: String,
    pub position: Option<i64>,
}

impl TagRecord {
    pub fn from_resource(resource: Resource<TagAttributes>) -> Self {
        Self {
            id: resource.id,
            name: resource.attributes.name,
            position: resource.attributes.position,
        }
    }
}

impl Identified for TagRecord {
    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}
