//! Read-only person lookup.

use std::sync::Arc;

use crate::api::{fetch_resource, paths, ResourceQuery, Result, SessionClient};
use crate::models::{PersonId, PersonReference};

type PersonAttributes = serde_json::Map<String, serde_json::Value>;

/// Filters and paging for a people search.
///
/// A plain string converts into a `search_name` query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeopleQuery {
    filters: Vec<(String, String)>,
    per_page: Option<u32>,
    offset: Option<u32>,
}

impl PeopleQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_name(self, name: impl Into<String>) -> Self {
        self.field("search_name", name)
    }

    /// Add a `where[field]=value` filter
    pub fn field(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    fn to_resource_query(&self) -> ResourceQuery<PersonAttributes> {
        let mut query = ResourceQuery::new(paths::PEOPLE);
        for (field, value) in &self.filters {
            query = query.filter(field, value.clone());
        }
        if let Some(per_page) = self.per_page {
            query = query.per_page(per_page);
        }
        if let Some(offset) = self.offset {
            query = query.offset(offset);
        }
        query
    }
}

impl From<&str> for PeopleQuery {
    fn from(name: &str) -> Self {
        PeopleQuery::new().search_name(name)
    }
}

impl From<String> for PeopleQuery {
    fn from(name: String) -> Self {
        PeopleQuery::new().search_name(name)
    }
}

#[derive(Clone)]
pub struct PeopleProvider {
    session: Arc<dyn SessionClient>,
}

impl PeopleProvider {
    pub fn new(session: Arc<dyn SessionClient>) -> Self {
        Self { session }
    }

    pub async fn query(&self, query: impl Into<PeopleQuery>) -> Result<Vec<PersonReference>> {
        let resources = query
            .into()
            .to_resource_query()
            .fetch_all(self.session.as_ref())
            .await?;
        Ok(resources.into_iter().map(PersonReference::from_resource).collect())
    }

    pub async fn get(&self, id: PersonId) -> Result<PersonReference> {
        let resource =
            fetch_resource::<PersonAttributes>(self.session.as_ref(), &paths::person(id)).await?;
        Ok(PersonReference::from_resource(resource))
    }
}
