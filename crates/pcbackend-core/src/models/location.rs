//! Meeting locations.
//!
//! Unlike groups and tags, the location endpoints speak a flat legacy format:
//! attributes sit at the top level of each object, with no `attributes`
//! wrapper, and coordinates may be encoded as strings.

use serde::{Deserialize, Serialize};

use super::{Identified, LocationId};
use crate::api::jsonapi::{deserialize_f64, deserialize_id, deserialize_optional_id};

/// How a location is shown to people outside the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayPreference {
    Exact,
    Approximate,
    Hidden,
}

impl DisplayPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayPreference::Exact => "exact",
            DisplayPreference::Approximate => "approximate",
            DisplayPreference::Hidden => "hidden",
        }
    }
}

/// Location object as the legacy endpoint sends it.
#[derive(Debug, Clone, Deserialize)]
struct LegacyLocation {
    #[serde(deserialize_with = "deserialize_id")]
    id: LocationId,
    name: String,
    #[serde(default)]
    formatted_address: Option<String>,
    #[serde(deserialize_with = "deserialize_f64")]
    latitude: f64,
    #[serde(deserialize_with = "deserialize_f64")]
    longitude: f64,
    #[serde(default)]
    shared: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    group_id: Option<u64>,
    #[serde(default)]
    display_preference: Option<DisplayPreference>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "LegacyLocation")]
pub struct LocationRecord {
    pub id: LocationId,
    pub name: String,
    pub formatted_address: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Visible to every group rather than private to one
    pub shared: bool,
    pub display_preference: Option<DisplayPreference>,
}

impl From<LegacyLocation> for LocationRecord {
    fn from(raw: LegacyLocation) -> Self {
        // a location without an owning group is shared
        let shared = raw.shared.unwrap_or(raw.group_id.is_none());
        Self {
            id: raw.id,
            name: raw.name,
            formatted_address: raw.formatted_address.unwrap_or_default(),
            latitude: raw.latitude,
            longitude: raw.longitude,
            shared,
            display_preference: raw.display_preference,
        }
    }
}

impl Identified for LocationRecord {
    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationsResponse {
    #[serde(default)]
    pub locations: Vec<LocationRecord>,
}

/// Response to a location creation: the new object, of which only the id matters.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CreatedLocation {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: LocationId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_locations() {
        let json = r#"{"locations": [
            {"id": 797809, "name": "Davis Home", "formatted_address": "1 Main St",
             "latitude": "34.7304", "longitude": "-86.5861", "group_id": null,
             "display_preference": "approximate"},
            {"id": "12", "name": "Room 4", "formatted_address": null,
             "latitude": 34.1, "longitude": -86.2, "group_id": 2037398}
        ]}"#;
        let parsed: LocationsResponse =
            serde_json::from_str(json).expect("Failed to parse locations");
        assert_eq!(parsed.locations.len(), 2);

        let home = &parsed.locations[0];
        assert_eq!(home.id, 797809);
        assert!((home.latitude - 34.7304).abs() < 1e-9);
        assert!(home.shared);
        assert_eq!(home.display_preference, Some(DisplayPreference::Approximate));

        let room = &parsed.locations[1];
        assert_eq!(room.id, 12);
        assert!(!room.shared);
        assert_eq!(room.formatted_address, "");
    }

    #[test]
    fn test_explicit_shared_flag_wins() {
        let json = r#"{"id": 1, "name": "X", "latitude": 0, "longitude": 0,
            "group_id": 5, "shared": true}"#;
        let record: LocationRecord = serde_json::from_str(json).expect("Failed to parse");
        assert!(record.shared);
    }

    #[test]
    fn test_attributes_wrapper_is_not_accepted() {
        let json = r#"{"id": "1", "type": "Location", "attributes": {"name": "X"}}"#;
        assert!(serde_json::from_str::<LocationRecord>(json).is_err());
    }
}
