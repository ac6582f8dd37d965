//! In-memory stand-in for the remote service, used by unit tests.
//!
//! `FakeServer` implements `SessionClient` and keeps just enough state to
//! answer the endpoints this crate calls: groups, tags, memberships, events,
//! people, the group settings page and the legacy location/person
//! endpoints. Every request is logged so tests can count remote writes.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::api::{ApiRequest, ApiResponse, Method, RequestBody, Result, Service, SessionClient};

/// Offset between a person id and the groups-side id the member forms expect
const ADD_ID_OFFSET: u64 = 1_000_000;

#[derive(Debug, Clone)]
struct FakeGroup {
    name: String,
    description: Option<String>,
    schedule: Option<String>,
    contact_email: Option<String>,
    group_type_id: u64,
    location_id: Option<u64>,
    enrollment_strategy: String,
    events_visibility: String,
    location_type_preference: String,
    virtual_location_url: Option<String>,
    public_url: Option<String>,
    settings: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
struct FakeTagAssociation {
    id: u64,
    group_id: u64,
    tag_id: u64,
}

#[derive(Debug, Clone)]
struct FakeMembership {
    id: u64,
    group_id: u64,
    person_id: u64,
    role: String,
    attendance_taker: bool,
}

#[derive(Debug, Clone)]
struct FakeLocation {
    owner: Option<u64>,
    name: String,
    formatted_address: String,
    latitude: String,
    longitude: String,
    display_preference: String,
}

#[derive(Debug, Default)]
struct State {
    groups: BTreeMap<u64, FakeGroup>,
    tags: BTreeMap<u64, String>,
    group_tags: Vec<FakeTagAssociation>,
    memberships: Vec<FakeMembership>,
    locations: BTreeMap<u64, FakeLocation>,
    people: BTreeMap<u64, String>,
    events: Vec<(u64, u64, String)>,
    rejected_fields: HashSet<String>,
    page_size: Option<usize>,
    next_id: u64,
    log: Vec<ApiRequest>,
}

impl State {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        9_000_000 + self.next_id
    }

    fn associate_tag(&mut self, group_id: u64, tag_id: u64) {
        let id = self.allocate_id();
        self.group_tags.push(FakeTagAssociation {
            id,
            group_id,
            tag_id,
        });
    }
}

pub(crate) struct FakeServer {
    state: Mutex<State>,
}

impl FakeServer {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut state = self.state.lock().expect("fake server state poisoned");
        f(&mut state)
    }

    // ===== Seeding =====

    pub fn add_group(&self, id: u64, name: &str) {
        self.with_state(|s| {
            s.groups.insert(
                id,
                FakeGroup {
                    name: name.to_string(),
                    description: None,
                    schedule: None,
                    contact_email: None,
                    group_type_id: 82050,
                    location_id: None,
                    enrollment_strategy: "closed".to_string(),
                    events_visibility: "members".to_string(),
                    location_type_preference: "physical".to_string(),
                    virtual_location_url: None,
                    public_url: None,
                    settings: BTreeMap::new(),
                },
            );
        });
    }

    pub fn add_tag(&self, id: u64, name: &str) {
        self.with_state(|s| {
            s.tags.insert(id, name.to_string());
        });
    }

    pub fn tag_group(&self, group_id: u64, tag_id: u64) {
        self.with_state(|s| s.associate_tag(group_id, tag_id));
    }

    pub fn add_person(&self, id: u64, name: &str) {
        self.with_state(|s| {
            s.people.insert(id, name.to_string());
        });
    }

    pub fn add_membership(&self, group_id: u64, person_id: u64, leader: bool) {
        self.with_state(|s| {
            let id = s.allocate_id();
            s.memberships.push(FakeMembership {
                id,
                group_id,
                person_id,
                role: if leader { "leader" } else { "member" }.to_string(),
                attendance_taker: false,
            });
        });
    }

    pub fn add_location(&self, id: u64, name: &str, owner: Option<u64>) {
        self.with_state(|s| {
            s.locations.insert(
                id,
                FakeLocation {
                    owner,
                    name: name.to_string(),
                    formatted_address: format!("{} address", name),
                    latitude: "34.73".to_string(),
                    longitude: "-86.58".to_string(),
                    display_preference: "approximate".to_string(),
                },
            );
        });
    }

    pub fn add_event(&self, group_id: u64, id: u64, name: &str) {
        self.with_state(|s| s.events.push((group_id, id, name.to_string())));
    }

    pub fn set_page_size(&self, size: usize) {
        self.with_state(|s| s.page_size = Some(size));
    }

    /// Any write carrying this form key is answered with 422
    pub fn reject_field(&self, field: &str) {
        self.with_state(|s| {
            s.rejected_fields.insert(field.to_string());
        });
    }

    /// Change a group behind the client's back
    pub fn rename_group(&self, id: u64, name: &str) {
        self.with_state(|s| {
            if let Some(g) = s.groups.get_mut(&id) {
                g.name = name.to_string();
            }
        });
    }

    pub fn remove_group(&self, id: u64) {
        self.with_state(|s| {
            s.groups.remove(&id);
        });
    }

    // ===== Inspection =====

    pub fn group_name(&self, id: u64) -> Option<String> {
        self.with_state(|s| s.groups.get(&id).map(|g| g.name.clone()))
    }

    pub fn group_location_id(&self, id: u64) -> Option<u64> {
        self.with_state(|s| s.groups.get(&id).and_then(|g| g.location_id))
    }

    pub fn group_setting(&self, id: u64, key: &str) -> Option<String> {
        self.with_state(|s| s.groups.get(&id).and_then(|g| g.settings.get(key).cloned()))
    }

    pub fn tag_associations(&self, group_id: u64, tag_id: u64) -> usize {
        self.with_state(|s| {
            s.group_tags
                .iter()
                .filter(|a| a.group_id == group_id && a.tag_id == tag_id)
                .count()
        })
    }

    pub fn has_location(&self, id: u64) -> bool {
        self.with_state(|s| s.locations.contains_key(&id))
    }

    pub fn count_requests(&self, method: &str, path: &str) -> usize {
        self.with_state(|s| {
            s.log
                .iter()
                .filter(|r| r.method.as_str() == method && strip_query(&r.path) == path)
                .count()
        })
    }

    /// Number of requests that were not GETs
    pub fn write_count(&self) -> usize {
        self.with_state(|s| s.log.iter().filter(|r| r.method != Method::GET).count())
    }

    pub fn request_count(&self) -> usize {
        self.with_state(|s| s.log.len())
    }

    /// Form body of the most recent write
    pub fn last_form(&self) -> Vec<(String, String)> {
        self.with_state(|s| {
            s.log
                .iter()
                .rev()
                .find_map(|r| match r.body {
                    RequestBody::Form(ref form) => Some(form.clone()),
                    _ => None,
                })
                .unwrap_or_default()
        })
    }

    pub fn clear_log(&self) {
        self.with_state(|s| s.log.clear());
    }
}

#[async_trait]
impl SessionClient for FakeServer {
    async fn request(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.with_state(|s| {
            s.log.push(request.clone());
            Ok(route(s, &request))
        })
    }
}

// ============================================================================
// Routing
// ============================================================================

fn strip_query(path: &str) -> &str {
    path.split('?').next().unwrap_or(path)
}

/// Query pairs from both the request and any query string embedded in the path
fn all_query(request: &ApiRequest) -> Vec<(String, String)> {
    let mut pairs = request.query.clone();
    if let Some((_, qs)) = request.path.split_once('?') {
        for pair in qs.split('&') {
            if let Some((k, v)) = pair.split_once('=') {
                pairs.push((k.to_string(), v.to_string()));
            }
        }
    }
    pairs
}

fn query_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

fn form_of(request: &ApiRequest) -> Vec<(String, String)> {
    match request.body {
        RequestBody::Form(ref form) => form.clone(),
        _ => Vec::new(),
    }
}

fn not_found() -> ApiResponse {
    ApiResponse::new(404, "not found")
}

fn json_response(status: u16, value: Value) -> ApiResponse {
    ApiResponse::new(status, value.to_string())
}

fn route(s: &mut State, request: &ApiRequest) -> ApiResponse {
    let path = strip_query(&request.path).to_string();
    let segments: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    let query = all_query(request);
    let method = request.method.clone();

    match request.service {
        Service::Api => route_api(s, &method, &segments, &query),
        Service::Frontend => route_frontend(s, &method, &segments, request),
    }
}

fn route_api(
    s: &mut State,
    method: &Method,
    seg: &[&str],
    query: &[(String, String)],
) -> ApiResponse {
    if *method != Method::GET {
        return not_found();
    }
    match seg {
        ["groups", "v2", "groups"] => {
            let filter = query_value(query, "where[name]").map(str::to_string);
            let items = s
                .groups
                .iter()
                .filter(|(_, g)| filter.as_deref().map_or(true, |f| g.name.contains(f)))
                .map(|(id, g)| group_json(*id, g))
                .collect();
            list_response(s, "/groups/v2/groups", items, query)
        }
        ["groups", "v2", "groups", id] => {
            match parse(id).and_then(|id| s.groups.get(&id).map(|g| (id, g))) {
                Some((id, g)) => json_response(
                    200,
                    json!({"data": group_json(id, g), "included": [], "meta": {}}),
                ),
                None => not_found(),
            }
        }
        ["groups", "v2", "groups", id, "memberships"] => {
            let Some(id) = parse(id).filter(|id| s.groups.contains_key(id)) else {
                return not_found();
            };
            let items = s
                .memberships
                .iter()
                .filter(|m| m.group_id == id)
                .map(|m| {
                    json!({"type": "Membership", "id": m.id.to_string(), "attributes": {
                        "account_center_identifier": m.person_id.to_string(),
                        "role": m.role,
                        "attendance_taker": m.attendance_taker,
                        "first_name": s.people.get(&m.person_id),
                    }})
                })
                .collect();
            list_response(s, &format!("/groups/v2/groups/{}/memberships", id), items, query)
        }
        ["groups", "v2", "groups", id, "tags"] => {
            let Some(id) = parse(id).filter(|id| s.groups.contains_key(id)) else {
                return not_found();
            };
            let items = s
                .group_tags
                .iter()
                .filter(|a| a.group_id == id)
                .filter_map(|a| s.tags.get(&a.tag_id).map(|name| tag_json(a.tag_id, name)))
                .collect();
            list_response(s, &format!("/groups/v2/groups/{}/tags", id), items, query)
        }
        ["groups", "v2", "groups", id, "events"] => {
            let Some(id) = parse(id).filter(|id| s.groups.contains_key(id)) else {
                return not_found();
            };
            let items = s
                .events
                .iter()
                .filter(|(g, _, _)| *g == id)
                .map(|(_, eid, name)| {
                    json!({"type": "Event", "id": eid.to_string(), "attributes": {
                        "name": name, "starts_at": "2024-03-01T18:00:00Z", "canceled": false
                    }})
                })
                .collect();
            list_response(s, &format!("/groups/v2/groups/{}/events", id), items, query)
        }
        ["groups", "v2", "people"] => {
            let first = query_value(query, "where[first_name]").map(str::to_string);
            let last = query_value(query, "where[last_name]").map(str::to_string);
            let items = s
                .people
                .iter()
                .filter(|(id, _)| s.memberships.iter().any(|m| m.person_id == **id))
                .filter_map(|(id, name)| {
                    let (first_name, last_name) =
                        name.split_once(' ').unwrap_or((name.as_str(), ""));
                    let keep = first.as_deref().map_or(true, |f| f == first_name)
                        && last.as_deref().map_or(true, |l| l == last_name);
                    keep.then(|| {
                        json!({"type": "Person", "id": id.to_string(), "attributes": {
                            "first_name": first_name, "last_name": last_name
                        }})
                    })
                })
                .collect();
            list_response(s, "/groups/v2/people", items, query)
        }
        ["groups", "v2", "tags"] => {
            let filter = query_value(query, "where[name]").map(|f| f.to_lowercase());
            let items = s
                .tags
                .iter()
                .filter(|(_, name)| {
                    filter
                        .as_deref()
                        .map_or(true, |f| name.to_lowercase().contains(f))
                })
                .map(|(id, name)| tag_json(*id, name))
                .collect();
            list_response(s, "/groups/v2/tags", items, query)
        }
        ["people", "v2", "people"] => {
            let filter = query_value(query, "where[search_name]").map(|f| f.to_lowercase());
            let items = s
                .people
                .iter()
                .filter(|(_, name)| {
                    filter
                        .as_deref()
                        .map_or(true, |f| name.to_lowercase().contains(f))
                })
                .map(|(id, name)| person_json(*id, name))
                .collect();
            list_response(s, "/people/v2/people", items, query)
        }
        ["people", "v2", "people", id] => {
            match parse(id).and_then(|id| s.people.get(&id).map(|n| (id, n))) {
                Some((id, name)) => json_response(
                    200,
                    json!({"data": person_json(id, name), "included": [], "meta": {}}),
                ),
                None => not_found(),
            }
        }
        _ => not_found(),
    }
}

fn route_frontend(
    s: &mut State,
    method: &Method,
    seg: &[&str],
    request: &ApiRequest,
) -> ApiResponse {
    let form = form_of(request);
    if *method != Method::GET {
        if let Some((k, _)) = form.iter().find(|(k, _)| s.rejected_fields.contains(k)) {
            return ApiResponse::new(422, format!("{} is invalid", k));
        }
    }
    let field = |key: &str| form.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone());

    match (method.as_str(), seg) {
        ("POST", ["groups"]) => {
            let Some(name) = field("group[name]") else {
                return ApiResponse::new(422, "name required");
            };
            let id = s.allocate_id();
            let type_id = field("group[group_type_id]")
                .and_then(|v| v.parse().ok())
                .unwrap_or(999);
            s.groups.insert(
                id,
                FakeGroup {
                    name,
                    description: None,
                    schedule: None,
                    contact_email: None,
                    group_type_id: type_id,
                    location_id: None,
                    enrollment_strategy: "closed".to_string(),
                    events_visibility: "members".to_string(),
                    location_type_preference: "physical".to_string(),
                    virtual_location_url: None,
                    public_url: None,
                    settings: BTreeMap::new(),
                },
            );
            let mut response = ApiResponse::new(201, "");
            response.location = Some(format!(
                "https://groups.planningcenteronline.com/groups/{}",
                id
            ));
            response
        }
        ("GET", ["groups", id, "settings"]) => {
            match parse(id).and_then(|id| s.groups.get(&id).map(|g| (id, g))) {
                Some((id, g)) => ApiResponse::new(200, settings_page(s, id, g)),
                None => not_found(),
            }
        }
        ("POST", ["groups", id]) | ("POST", ["groups", id, "settings"]) => {
            let Some(group) = parse(id).and_then(|id| s.groups.get_mut(&id)) else {
                return not_found();
            };
            apply_group_form(group, &form);
            ApiResponse::new(200, "")
        }
        ("DELETE", ["groups", id]) => match parse(id).and_then(|id| s.groups.remove(&id)) {
            Some(_) => ApiResponse::new(200, ""),
            None => not_found(),
        },
        ("POST", ["groups", id, "tags"]) => {
            let (Some(group_id), Some(tag_id)) = (
                parse(id).filter(|id| s.groups.contains_key(id)),
                field("group_tag[tag_id]").and_then(|v| v.parse().ok()),
            ) else {
                return not_found();
            };
            // the real backend happily stores duplicate associations
            s.associate_tag(group_id, tag_id);
            ApiResponse::new(200, "")
        }
        ("DELETE", ["groups", id, "tags", association_id]) => {
            let (Some(group_id), Some(association_id)) = (parse(id), parse(association_id)) else {
                return not_found();
            };
            let before = s.group_tags.len();
            s.group_tags
                .retain(|a| !(a.group_id == group_id && a.id == association_id));
            if s.group_tags.len() == before {
                not_found()
            } else {
                ApiResponse::new(200, "")
            }
        }
        ("POST", ["groups", id, "members"]) => {
            let Some(group_id) = parse(id).filter(|id| s.groups.contains_key(id)) else {
                return not_found();
            };
            let Some(person_id) = field("membership[person_id]")
                .and_then(|v| v.parse::<u64>().ok())
                .and_then(|add_id| add_id.checked_sub(ADD_ID_OFFSET))
            else {
                return ApiResponse::new(422, "person required");
            };
            if s
                .memberships
                .iter()
                .any(|m| m.group_id == group_id && m.person_id == person_id)
            {
                return ApiResponse::new(409, "already a member");
            }
            let id = s.allocate_id();
            s.memberships.push(FakeMembership {
                id,
                group_id,
                person_id,
                role: field("membership[role]").unwrap_or_else(|| "member".to_string()),
                attendance_taker: false,
            });
            ApiResponse::new(201, "")
        }
        ("POST", ["groups", id, "members", membership_id, "role"]) => {
            let (Some(group_id), Some(membership_id)) = (parse(id), parse(membership_id)) else {
                return not_found();
            };
            let Some(m) = s
                .memberships
                .iter_mut()
                .find(|m| m.group_id == group_id && m.id == membership_id)
            else {
                return not_found();
            };
            if let Some(role) = field("role") {
                m.role = role;
            }
            if let Some(taker) = field("attendance_taker") {
                m.attendance_taker = taker == "1";
            }
            if m.role == "leader" {
                m.attendance_taker = false;
            }
            ApiResponse::new(200, "")
        }
        ("POST", ["groups", id, "members", membership_id, "removal"]) => {
            let (Some(group_id), Some(membership_id)) = (parse(id), parse(membership_id)) else {
                return not_found();
            };
            let before = s.memberships.len();
            s.memberships
                .retain(|m| !(m.group_id == group_id && m.id == membership_id));
            if s.memberships.len() == before {
                not_found()
            } else {
                ApiResponse::new(200, "")
            }
        }
        ("GET", ["api", "v1", "people", file]) => {
            let Some(person_id) = json_file_id(file) else {
                return not_found();
            };
            if !s.people.contains_key(&person_id) {
                return not_found();
            }
            json_response(
                200,
                json!({"id": person_id + ADD_ID_OFFSET, "account_center_id": person_id, "errors": []}),
            )
        }
        ("GET", ["api", "v1", "groups", id, "locations.json"]) => {
            let Some(group_id) = parse(id) else {
                return not_found();
            };
            let locations: Vec<Value> = s
                .locations
                .iter()
                .filter(|(_, l)| l.owner.map_or(true, |o| o == group_id))
                .map(|(lid, l)| {
                    json!({
                        "id": lid,
                        "name": l.name,
                        "formatted_address": l.formatted_address,
                        "latitude": l.latitude,
                        "longitude": l.longitude,
                        "group_id": l.owner,
                        "display_preference": l.display_preference,
                    })
                })
                .collect();
            json_response(200, json!({"locations": locations}))
        }
        ("POST", ["api", "v1", "groups", id, "locations.json"]) => {
            if parse(id).is_none() {
                return not_found();
            }
            let id = s.allocate_id();
            let owner = field("location[group_id]").and_then(|v| v.parse().ok());
            let name = field("location[name]").unwrap_or_default();
            s.locations.insert(
                id,
                FakeLocation {
                    owner,
                    name: name.clone(),
                    formatted_address: field("location[formatted_address]").unwrap_or_default(),
                    latitude: field("location[latitude]").unwrap_or_default(),
                    longitude: field("location[longitude]").unwrap_or_default(),
                    display_preference: field("location[display_preference]")
                        .unwrap_or_else(|| "approximate".to_string()),
                },
            );
            json_response(200, json!({"id": id, "name": name}))
        }
        ("DELETE", ["api", "v1", "groups", _, "locations", file]) => {
            let Some(location_id) = json_file_id(file) else {
                return not_found();
            };
            if !s.locations.contains_key(&location_id) {
                return not_found();
            }
            if s.groups.values().any(|g| g.location_id == Some(location_id)) {
                return ApiResponse::new(409, "location is in use");
            }
            s.locations.remove(&location_id);
            ApiResponse::new(200, "")
        }
        _ => not_found(),
    }
}

fn parse(s: &str) -> Option<u64> {
    s.parse().ok()
}

/// `42.json` -> 42
fn json_file_id(file: &str) -> Option<u64> {
    file.strip_suffix(".json").and_then(parse)
}

fn non_empty(v: &str) -> Option<String> {
    if v.is_empty() {
        None
    } else {
        Some(v.to_string())
    }
}

fn apply_group_form(group: &mut FakeGroup, form: &[(String, String)]) {
    for (k, v) in form {
        match k.as_str() {
            "_method" | "__autosave__" => {}
            // the server normalizes surrounding whitespace
            "group[name]" => group.name = v.trim().to_string(),
            "group[description]" => group.description = non_empty(v),
            "group[schedule]" => group.schedule = non_empty(v),
            "group[contact_email]" => group.contact_email = non_empty(v),
            "group[group_type_id]" => group.group_type_id = v.parse().unwrap_or(999),
            "group[location_id]" => group.location_id = v.parse().ok(),
            "group[virtual_location_url]" => group.virtual_location_url = non_empty(v),
            "group[public_enrollment]" => group.enrollment_strategy = v.clone(),
            "group[events_visibility]" => group.events_visibility = v.clone(),
            "group[location_type_preference]" => group.location_type_preference = v.clone(),
            "group[publicly_visible]" => {
                group.public_url = if v == "true" {
                    Some(format!("https://example.churchcenter.com/groups/{}", group.name))
                } else {
                    None
                }
            }
            _ => {
                group.settings.insert(k.clone(), v.clone());
            }
        }
    }
}

fn group_json(id: u64, g: &FakeGroup) -> Value {
    let location = g
        .location_id
        .map(|l| json!({"type": "Location", "id": l.to_string()}))
        .unwrap_or(Value::Null);
    json!({
        "type": "Group",
        "id": id.to_string(),
        "attributes": {
            "name": g.name,
            "description": g.description,
            "schedule": g.schedule,
            "contact_email": g.contact_email,
            "enrollment_open": g.enrollment_strategy != "closed",
            "enrollment_strategy": g.enrollment_strategy,
            "events_visibility": g.events_visibility,
            "location_type_preference": g.location_type_preference,
            "memberships_count": 0,
            "public_church_center_web_url": g.public_url,
            "virtual_location_url": g.virtual_location_url,
            "created_at": "2023-01-05T16:20:00Z",
            "archived_at": null,
            "header_image": {},
        },
        "relationships": {
            "group_type": {"data": {"type": "GroupType", "id": g.group_type_id.to_string()}},
            "location": {"data": location},
        },
        "links": {},
    })
}

fn setting<'a>(g: &'a FakeGroup, key: &str, default: &'a str) -> &'a str {
    g.settings.get(key).map(String::as_str).unwrap_or(default)
}

/// Settings page markup in the shape the frontend serves it
fn settings_page(s: &State, id: u64, g: &FakeGroup) -> String {
    let mut html = String::from("<html><body><form>\n");

    for (key, default) in [
        ("publicly_display_meeting_schedule", "0"),
        ("communication_enabled", "1"),
        ("leader_name_visible_on_public_page", "1"),
        ("request_event_attendance_from_leaders", "0"),
        ("leaders_can_search_people_database", "0"),
    ] {
        let name = format!("group[{}]", key);
        let checked = if setting(g, &name, default) == "1" { " checked" } else { "" };
        html.push_str(&format!(
            "<input type=\"checkbox\" class=\"checkbox\" name=\"{}\" value=\"1\"{}>\n",
            name, checked
        ));
    }

    let topics = setting(g, "group[members_can_create_forum_topics]", "false");
    for value in ["true", "false"] {
        let checked = if topics == value { " checked" } else { "" };
        html.push_str(&format!(
            "<input type=\"radio\" class=\"radio\" \
             name=\"group[members_can_create_forum_topics]\" value=\"{}\"{}>\n",
            value, checked
        ));
    }

    let reply_to = setting(g, "group[attendance_reply_to_person_id]", "");
    html.push_str(
        "<select class=\"select\" name=\"group[attendance_reply_to_person_id]\">\
         <option value=\"\">Nobody</option>",
    );
    for (person_id, name) in &s.people {
        let selected = if person_id.to_string() == reply_to {
            " selected=\"selected\""
        } else {
            ""
        };
        html.push_str(&format!("<option value=\"{}\"{}>{}</option>", person_id, selected, name));
    }
    html.push_str("</select>\n");

    let offset_key = "group[default_event_automated_reminders_schedule_offset]";
    let offset: u64 = setting(g, offset_key, "86400").parse().unwrap_or(86_400);
    let reminders = json!({
        "component": "Components.GroupSettingsEventReminderToggle",
        "automatedRemindersEnabled":
            setting(g, "group[default_event_automated_reminders_enabled]", "false") == "true",
        "scheduleOffset": offset,
    });
    html.push_str(&format!(
        "<div data-react-class=\"AppProvider\" data-react-props=\"{}\"></div>\n",
        reminders.to_string().replace('"', "&quot;")
    ));

    let number = |key: &str| -> Value {
        setting(g, key, "").parse::<u64>().map(Value::from).unwrap_or(Value::Null)
    };
    let open_until = setting(g, "group[enrollment_open_until]", "");
    let enrollment = json!({
        "enrollmentOpenUntil": if open_until.is_empty() {
            Value::Null
        } else {
            Value::String(format!("{}T00:00:00-05:00", open_until))
        },
        "enrollmentLimit": number("group[enrollment_limit]"),
        "memberLimitMaximumAlert": number("group[member_limit_maximum_alert]"),
    });
    html.push_str(&component_script(
        &format!("enrollment_settings_group_{}", id),
        "Components.GroupSettings.EnrollmentSettings",
        &enrollment,
    ));

    let tags: Vec<Value> = s
        .group_tags
        .iter()
        .filter(|a| a.group_id == id)
        .map(|a| {
            json!({
                "id": a.tag_id,
                "name": s.tags.get(&a.tag_id),
                "url": format!("/groups/{}/tags/{}", id, a.id),
            })
        })
        .collect();
    html.push_str(&component_script(
        &format!("tags_group_{}", id),
        "Components.Groups.Tags",
        &json!({ "tags": tags }),
    ));

    html.push_str("</form></body></html>");
    html
}

fn component_script(div_id: &str, component: &str, props: &Value) -> String {
    format!(
        "<div id=\"{id}\"><script>\n//<![CDATA[\n$(function() {{ ReactDOM.render(\
         React.createElement({component}, {props}), document.getElementById(\"{id}\")); }});\n\
         //]]>\n</script></div>\n",
        id = div_id,
        component = component,
        props = props,
    )
}

fn tag_json(id: u64, name: &str) -> Value {
    json!({"type": "Tag", "id": id.to_string(), "attributes": {"name": name, "position": 0}})
}

fn person_json(id: u64, name: &str) -> Value {
    json!({"type": "Person", "id": id.to_string(), "attributes": {"name": name}})
}

fn list_response(
    s: &State,
    base: &str,
    items: Vec<Value>,
    query: &[(String, String)],
) -> ApiResponse {
    let total = items.len();
    let offset: usize = query_value(query, "offset")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let page = s.page_size.unwrap_or(usize::MAX);
    let end = offset.saturating_add(page).min(total);
    let slice: Vec<Value> = items
        .into_iter()
        .skip(offset)
        .take(end.saturating_sub(offset))
        .collect();

    let next = if end < total {
        let mut link = format!("{}?offset={}", base, end);
        for (k, v) in query.iter().filter(|(k, _)| k != "offset") {
            link.push_str(&format!("&{}={}", k, v));
        }
        Value::String(link)
    } else {
        Value::Null
    };

    json_response(
        200,
        json!({
            "data": slice,
            "included": [],
            "links": {"next": next},
            "meta": {"total_count": total, "count": end.saturating_sub(offset)},
        }),
    )
}
