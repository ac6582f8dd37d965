//! Endpoint paths, relative to the service base URLs.

use crate::models::{GroupId, LocationId, MembershipId, PersonId};

// ============================================================================
// JSON:API (Service::Api)
// ============================================================================

pub const GROUPS: &str = "/groups/v2/groups";
pub const TAGS: &str = "/groups/v2/tags";
/// People known to the groups product, i.e. anyone ever added to a group
pub const GROUPS_PEOPLE: &str = "/groups/v2/people";
pub const PEOPLE: &str = "/people/v2/people";

pub fn group(id: GroupId) -> String {
    format!("{}/{}", GROUPS, id)
}

pub fn group_memberships(id: GroupId) -> String {
    format!("{}/{}/memberships", GROUPS, id)
}

pub fn group_tags(id: GroupId) -> String {
    format!("{}/{}/tags", GROUPS, id)
}

pub fn group_events(id: GroupId) -> String {
    format!("{}/{}/events", GROUPS, id)
}

pub fn person(id: PersonId) -> String {
    format!("{}/{}", PEOPLE, id)
}

// ============================================================================
// Web frontend (Service::Frontend)
// ============================================================================

pub const FRONTEND_GROUPS: &str = "/groups";

pub fn frontend_group(id: GroupId) -> String {
    format!("{}/{}", FRONTEND_GROUPS, id)
}

pub fn frontend_settings(id: GroupId) -> String {
    format!("{}/{}/settings", FRONTEND_GROUPS, id)
}

pub fn frontend_group_tags(id: GroupId) -> String {
    format!("{}/{}/tags", FRONTEND_GROUPS, id)
}

pub fn frontend_members(id: GroupId) -> String {
    format!("{}/{}/members", FRONTEND_GROUPS, id)
}

pub fn frontend_member_role(id: GroupId, membership_id: MembershipId) -> String {
    format!("{}/{}/members/{}/role", FRONTEND_GROUPS, id, membership_id)
}

pub fn frontend_member_removal(id: GroupId, membership_id: MembershipId) -> String {
    format!("{}/{}/members/{}/removal", FRONTEND_GROUPS, id, membership_id)
}

/// Legacy v1 person record carrying the groups-side id used by member writes
pub fn legacy_person(person_id: PersonId) -> String {
    format!("/api/v1/people/{}.json", person_id)
}

pub fn legacy_locations(id: GroupId) -> String {
    format!("/api/v1/groups/{}/locations.json", id)
}

pub fn legacy_location(id: GroupId, location_id: LocationId) -> String {
    format!("/api/v1/groups/{}/locations/{}.json", id, location_id)
}

/// Parse the trailing numeric segment of a group URL (e.g. a `Location` header)
pub fn group_id_from_url(url: &str) -> Option<GroupId> {
    let path = url.split(['?', '#']).next()?;
    path.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}
