use serde::Serialize;

use super::PersonId;
use crate::api::Resource;

/// Read-only person record from the people lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonReference {
    pub id: PersonId,
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl PersonReference {
    pub fn from_resource(resource: Resource<serde_json::Map<String, serde_json::Value>>) -> Self {
        Self {
            id: resource.id,
            attributes: resource.attributes,
        }
    }

    /// String attribute by key, `None` when missing or not a string
    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(|v| v.as_str())
    }

    pub fn display_name(&self) -> String {
        if let Some(name) = self.attribute_str("name") {
            return name.to_string();
        }
        format!(
            "{} {}",
            self.attribute_str("first_name").unwrap_or(""),
            self.attribute_str("last_name").unwrap_or("")
        )
        .trim()
        .to_string()
    }
}
