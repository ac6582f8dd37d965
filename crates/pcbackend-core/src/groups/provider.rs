//! Entry point for finding, loading and creating groups.

use std::sync::Arc;

use tracing::info;

use super::proxy::GroupProxy;
use super::tags::TagCatalog;
use crate::api::{paths, ApiError, ApiRequest, ResourceQuery, Result, Service, SessionClient};
use crate::models::{GroupAttributes, GroupId, GroupRecord, GroupType, PersonReference};

type PersonAttributes = serde_json::Map<String, serde_json::Value>;

#[derive(Clone)]
pub struct GroupsProvider {
    session: Arc<dyn SessionClient>,
}

impl GroupsProvider {
    pub fn new(session: Arc<dyn SessionClient>) -> Self {
        Self { session }
    }

    pub async fn get(&self, id: GroupId) -> Result<GroupProxy> {
        GroupProxy::load(Arc::clone(&self.session), id).await
    }

    /// List groups, optionally filtered by name on the server.
    ///
    /// Each proxy is seeded from the listing, so no per-group fetch happens.
    /// List rows are the same group resource the single-group endpoint
    /// returns, attributes and relationships included, so the seeded record
    /// is complete. Frontend-only settings are not part of either and load
    /// on first use through [`GroupProxy::load_settings`].
    pub async fn query(&self, name: Option<&str>) -> Result<Vec<GroupProxy>> {
        let mut query = ResourceQuery::<GroupAttributes>::new(paths::GROUPS);
        if let Some(name) = name {
            query = query.filter("name", name);
        }
        let resources = query.fetch_all(self.session.as_ref()).await?;
        Ok(resources
            .into_iter()
            .map(|r| GroupProxy::new(Arc::clone(&self.session), GroupRecord::from_resource(r)))
            .collect())
    }

    /// Whether a group with exactly this name exists
    pub async fn exists(&self, name: &str) -> Result<bool> {
        Ok(self
            .query(Some(name))
            .await?
            .iter()
            .any(|g| g.name() == name))
    }

    /// Create a group and return its proxy.
    ///
    /// Fails with `Conflict` when a group with the same name already exists.
    pub async fn create(&self, name: &str, group_type: GroupType) -> Result<GroupProxy> {
        if self.exists(name).await? {
            return Err(ApiError::Conflict(format!("a group named {:?} already exists", name)));
        }

        let form = vec![
            ("group[name]".to_string(), name.to_string()),
            ("group[group_type_id]".to_string(), group_type.form_value()),
        ];
        let response = self
            .session
            .send(ApiRequest::post(Service::Frontend, paths::FRONTEND_GROUPS).with_form(form))
            .await?;

        let id = response
            .location
            .as_deref()
            .and_then(paths::group_id_from_url)
            .ok_or_else(|| {
                ApiError::InvalidResponse("group creation response has no location".to_string())
            })?;
        info!(group_id = id, name, "Group created");
        self.get(id).await
    }

    pub fn tags(&self) -> TagCatalog {
        TagCatalog::new(Arc::clone(&self.session))
    }

    /// Search people on the groups side by exact first and/or last name.
    ///
    /// Only people who have ever been added to a group are listed; use
    /// [`crate::PeopleProvider`] to search everyone.
    pub async fn people(
        &self,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<Vec<PersonReference>> {
        let mut query = ResourceQuery::<PersonAttributes>::new(paths::GROUPS_PEOPLE);
        if let Some(first_name) = first_name {
            query = query.filter("first_name", first_name);
        }
        if let Some(last_name) = last_name {
            query = query.filter("last_name", last_name);
        }
        let resources = query.fetch_all(self.session.as_ref()).await?;
        Ok(resources.into_iter().map(PersonReference::from_resource).collect())
    }
}
