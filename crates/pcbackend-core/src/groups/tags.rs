//! Tags: the global catalog and a group's tag associations.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::proxy::GroupProxy;
use super::resolver::{IdentifierResolver, NamedCatalog, TagRef};
use super::settings;
use crate::api::{
    fetch_resource, paths, ApiError, ApiRequest, ResourceQuery, Result, Service, SessionClient,
};
use crate::models::{TagAttributes, TagId, TagRecord};

/// The global tag catalog. Tags are shared by every group.
#[derive(Clone)]
pub struct TagCatalog {
    session: Arc<dyn SessionClient>,
}

impl TagCatalog {
    pub fn new(session: Arc<dyn SessionClient>) -> Self {
        Self { session }
    }

    /// List tags, optionally filtered by name on the server
    pub async fn query(&self, name: Option<&str>) -> Result<Vec<TagRecord>> {
        let mut query = ResourceQuery::<TagAttributes>::new(paths::TAGS);
        if let Some(name) = name {
            query = query.filter("name", name);
        }
        let resources = query.fetch_all(self.session.as_ref()).await?;
        Ok(resources.into_iter().map(TagRecord::from_resource).collect())
    }

    pub async fn get(&self, id: TagId) -> Result<TagRecord> {
        let path = format!("{}/{}", paths::TAGS, id);
        let resource = fetch_resource::<TagAttributes>(self.session.as_ref(), &path).await?;
        Ok(TagRecord::from_resource(resource))
    }

    pub async fn resolve(&self, reference: impl Into<TagRef>) -> Result<TagId> {
        IdentifierResolver::new(self.clone())
            .resolve(reference.into())
            .await
    }

    /// Tags cannot be created through the API; they are managed by admins.
    pub async fn create(&self, name: &str) -> Result<TagRecord> {
        Err(ApiError::Unsupported(format!(
            "cannot create tag {:?}: tag creation is not available remotely",
            name
        )))
    }
}

#[async_trait]
impl NamedCatalog for TagCatalog {
    type Record = TagRecord;

    fn kind(&self) -> &'static str {
        "tag"
    }

    /// Uses the server's name filter, so its matching rule applies
    async fn find_by_name(&self, name: &str) -> Result<Vec<TagRecord>> {
        self.query(Some(name)).await
    }
}

/// A group's tag associations.
pub struct TagSet<'a> {
    group: &'a mut GroupProxy,
}

impl<'a> TagSet<'a> {
    pub(crate) fn new(group: &'a mut GroupProxy) -> Self {
        Self { group }
    }

    fn catalog(&self) -> TagCatalog {
        TagCatalog::new(self.group.session_handle())
    }

    /// Tags currently associated with the group
    pub async fn list(&self) -> Result<Vec<TagRecord>> {
        self.group.tags().await
    }

    /// Search the global catalog
    pub async fn query(&self, name: Option<&str>) -> Result<Vec<TagRecord>> {
        self.catalog().query(name).await
    }

    pub async fn resolve(&self, tag: impl Into<TagRef>) -> Result<TagId> {
        self.catalog().resolve(tag).await
    }

    pub async fn has(&self, tag: impl Into<TagRef>) -> Result<bool> {
        let tag_id = self.resolve(tag).await?;
        self.has_id(tag_id).await
    }

    async fn has_id(&self, tag_id: TagId) -> Result<bool> {
        Ok(self.list().await?.iter().any(|t| t.id == tag_id))
    }

    /// Associate a tag. Adding a tag the group already has does nothing.
    pub async fn add(&mut self, tag: impl Into<TagRef>) -> Result<()> {
        let tag_id = self.resolve(tag).await?;
        if self.has_id(tag_id).await? {
            debug!(group_id = self.group.id(), tag_id, "Tag already present");
            return Ok(());
        }

        let form = vec![("group_tag[tag_id]".to_string(), tag_id.to_string())];
        let path = paths::frontend_group_tags(self.group.id());
        self.group
            .session()
            .send(ApiRequest::post(Service::Frontend, path).with_form(form))
            .await?;
        info!(group_id = self.group.id(), tag_id, "Tag added");
        self.group.after_write().await
    }

    /// Remove a tag association.
    ///
    /// With `missing_ok` a tag the group does not have is a no-op; without
    /// it the call fails with `NotFound`. Removal goes through the
    /// per-association URL listed on the settings page, since associations
    /// have their own ids. Duplicate associations are all removed.
    pub async fn delete(&mut self, tag: impl Into<TagRef>, missing_ok: bool) -> Result<()> {
        let tag_id = self.resolve(tag).await?;
        if !self.has_id(tag_id).await? {
            if missing_ok {
                debug!(group_id = self.group.id(), tag_id, "Tag not present, nothing to delete");
                return Ok(());
            }
            return Err(ApiError::NotFound(format!(
                "group {} does not have tag {}",
                self.group.id(),
                tag_id
            )));
        }

        let html = settings::fetch_settings_page(self.group.session(), self.group.id()).await?;
        let urls: Vec<String> = settings::parse_tag_associations(&html)?
            .into_iter()
            .filter(|a| a.id == tag_id)
            .map(|a| a.url)
            .collect();
        if urls.is_empty() {
            return Err(ApiError::InvalidResponse(format!(
                "settings page of group {} does not list tag {}",
                self.group.id(),
                tag_id
            )));
        }

        for url in urls {
            debug!(group_id = self.group.id(), tag_id, url = %url, "Removing tag association");
            self.group
                .session()
                .send(ApiRequest::delete(Service::Frontend, url))
                .await?;
        }
        info!(group_id = self.group.id(), tag_id, "Tag removed");
        self.group.after_write().await
    }

    pub async fn create(&self, name: &str) -> Result<TagRecord> {
        self.catalog().create(name).await
    }
}
