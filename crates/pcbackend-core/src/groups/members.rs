//! Group memberships.
//!
//! Reads go through the JSON API. Writes go through the web frontend, which
//! identifies people by a groups-side id rather than the people id, so every
//! write first looks that id up on the legacy people endpoint.

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::proxy::GroupProxy;
use crate::api::{paths, ApiError, ApiRequest, ResourceQuery, Result, Service, SessionClient};
use crate::models::{GroupId, MembershipAttributes, MembershipRecord, MembershipRole, PersonId};

/// Fresh list of a group's memberships, in server order
pub(crate) async fn list_memberships(
    session: &dyn SessionClient,
    group_id: GroupId,
) -> Result<Vec<MembershipRecord>> {
    let resources = ResourceQuery::<MembershipAttributes>::new(paths::group_memberships(group_id))
        .fetch_all(session)
        .await?;
    Ok(resources.into_iter().map(MembershipRecord::from_resource).collect())
}

#[derive(Debug, Deserialize)]
struct LegacyPerson {
    id: u64,
    account_center_id: u64,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

/// Partial membership change. Unset fields are left as they are.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemberUpdate {
    pub leader: Option<bool>,
    /// Only meaningful for non-leaders
    pub attendance_taker: Option<bool>,
    pub notify: Option<bool>,
}

impl MemberUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leader(mut self, leader: bool) -> Self {
        self.leader = Some(leader);
        self
    }

    pub fn attendance_taker(mut self, taker: bool) -> Self {
        self.attendance_taker = Some(taker);
        self
    }

    pub fn notify(mut self, notify: bool) -> Self {
        self.notify = Some(notify);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.leader.is_none() && self.attendance_taker.is_none() && self.notify.is_none()
    }
}

fn flag(on: bool) -> String {
    if on { "1" } else { "0" }.to_string()
}

pub struct MemberRegistry<'a> {
    group: &'a mut GroupProxy,
}

impl<'a> MemberRegistry<'a> {
    pub(crate) fn new(group: &'a mut GroupProxy) -> Self {
        Self { group }
    }

    pub async fn list(&self) -> Result<Vec<MembershipRecord>> {
        list_memberships(self.group.session(), self.group.id()).await
    }

    async fn find(&self, person_id: PersonId) -> Result<Option<MembershipRecord>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|m| m.person_id == person_id))
    }

    pub async fn get(&self, person_id: PersonId) -> Result<MembershipRecord> {
        self.find(person_id).await?.ok_or_else(|| {
            ApiError::NotFound(format!(
                "person {} is not a member of group {}",
                person_id,
                self.group.id()
            ))
        })
    }

    pub async fn contains(&self, person_id: PersonId) -> Result<bool> {
        Ok(self.find(person_id).await?.is_some())
    }

    /// The id the frontend member forms expect for this person
    async fn groups_person_id(&self, person_id: PersonId) -> Result<u64> {
        let response = self
            .group
            .session()
            .send(ApiRequest::get(Service::Frontend, paths::legacy_person(person_id)))
            .await?;
        let person: LegacyPerson = response.json()?;
        if !person.errors.is_empty() {
            return Err(ApiError::RemoteRejected(format!(
                "person lookup for {} failed: {:?}",
                person_id, person.errors
            )));
        }
        if person.account_center_id != person_id {
            return Err(ApiError::InvalidResponse(format!(
                "person lookup for {} returned account {}",
                person_id, person.account_center_id
            )));
        }
        Ok(person.id)
    }

    /// Add a person. Adding an existing member fails with `Conflict`.
    pub async fn add(&mut self, person_id: PersonId, leader: bool, notify: bool) -> Result<()> {
        let add_id = self.groups_person_id(person_id).await?;
        let role = MembershipRole::from_leader(leader);
        let mut form = vec![
            ("membership[person_id]".to_string(), add_id.to_string()),
            ("membership[role]".to_string(), role.as_str().to_string()),
        ];
        if notify {
            form.push(("notify_member".to_string(), flag(true)));
        }

        let path = paths::frontend_members(self.group.id());
        self.group
            .session()
            .send(ApiRequest::post(Service::Frontend, path).with_form(form))
            .await?;
        info!(group_id = self.group.id(), person_id, role = role.as_str(), "Member added");
        self.group.after_write().await
    }

    pub async fn update(&mut self, person_id: PersonId, update: MemberUpdate) -> Result<()> {
        let current = self.get(person_id).await?;
        if update.is_empty() {
            debug!(group_id = self.group.id(), person_id, "Empty member update");
            return Ok(());
        }

        let mut role = update.leader.map(MembershipRole::from_leader);
        let mut form = vec![("_method".to_string(), "patch".to_string())];

        if let Some(taker) = update.attendance_taker {
            if role.unwrap_or(current.role()) == MembershipRole::Member {
                role = Some(MembershipRole::Member);
                form.push(("attendance_taker".to_string(), flag(taker)));
            } else {
                warn!(
                    group_id = self.group.id(),
                    person_id, "Attendance taker flag ignored for a leader"
                );
            }
        }
        if let Some(role) = role {
            form.push(("role".to_string(), role.as_str().to_string()));
        }
        if let Some(notify) = update.notify {
            form.push(("notify_member".to_string(), flag(notify)));
        }

        self.group
            .session()
            .send(
                ApiRequest::post(
                    Service::Frontend,
                    paths::frontend_member_role(self.group.id(), current.id),
                )
                .with_form(form),
            )
            .await?;
        info!(group_id = self.group.id(), person_id, "Member updated");
        self.group.after_write().await
    }

    /// Remove a person. With `missing_ok`, removing a non-member succeeds quietly.
    pub async fn delete(
        &mut self,
        person_id: PersonId,
        notify: bool,
        missing_ok: bool,
    ) -> Result<()> {
        let Some(current) = self.find(person_id).await? else {
            if missing_ok {
                debug!(group_id = self.group.id(), person_id, "Not a member, nothing to remove");
                return Ok(());
            }
            return Err(ApiError::NotFound(format!(
                "person {} is not a member of group {}",
                person_id,
                self.group.id()
            )));
        };

        let add_id = self.groups_person_id(person_id).await?;
        let form = vec![
            ("membership[person_id]".to_string(), add_id.to_string()),
            ("notify_member".to_string(), flag(notify)),
        ];
        self.group
            .session()
            .send(
                ApiRequest::post(
                    Service::Frontend,
                    paths::frontend_member_removal(self.group.id(), current.id),
                )
                .with_form(form),
            )
            .await?;
        info!(group_id = self.group.id(), person_id, "Member removed");
        self.group.after_write().await
    }
}
