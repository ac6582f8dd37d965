//! Generic list/search primitive over JSON:API collections.
//!
//! Multi-record results come back in pages; each page's `links.next` points
//! at the following one. `ResourceQuery` walks the chain and concatenates
//! the records in server order.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::Result;
use super::jsonapi::{Document, Resource};
use super::session::{ApiRequest, Service, SessionClient};

/// Hard stop on pagination so a server that keeps handing out `next`
/// links cannot spin the client forever.
const MAX_PAGES: usize = 1000;

#[derive(Debug, Clone)]
pub struct ResourceQuery<A> {
    service: Service,
    path: String,
    params: Vec<(String, String)>,
    limit: Option<usize>,
    _marker: PhantomData<fn() -> A>,
}

impl<A: DeserializeOwned> ResourceQuery<A> {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            service: Service::Api,
            path: path.into(),
            params: Vec::new(),
            limit: None,
            _marker: PhantomData,
        }
    }

    /// Add a `where[field]=value` filter
    pub fn filter(self, field: &str, value: impl Into<String>) -> Self {
        self.param(format!("where[{}]", field), value)
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn per_page(self, per_page: u32) -> Self {
        self.param("per_page", per_page.to_string())
    }

    pub fn offset(self, offset: u32) -> Self {
        self.param("offset", offset.to_string())
    }

    /// Stop following pages once this many records have been collected
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Fetch every page and return the records in server order
    pub async fn fetch_all(&self, session: &dyn SessionClient) -> Result<Vec<Resource<A>>> {
        let mut results = Vec::new();
        let mut request =
            ApiRequest::get(self.service, self.path.clone()).with_query(self.params.clone());

        for page in 0..MAX_PAGES {
            let response = session.send(request).await?;
            let doc: Document<Vec<Resource<A>>> = response.json()?;
            debug!(path = %self.path, page, count = doc.data.len(), "Fetched page");
            results.extend(doc.data);

            if let Some(limit) = self.limit {
                if results.len() >= limit {
                    results.truncate(limit);
                    break;
                }
            }

            match doc.links.next {
                // the next link already carries the filter and offset
                Some(next) => request = ApiRequest::get(self.service, next),
                None => break,
            }
        }

        Ok(results)
    }
}

/// Fetch a single JSON:API resource
pub async fn fetch_resource<A: DeserializeOwned>(
    session: &dyn SessionClient,
    path: &str,
) -> Result<Resource<A>> {
    let response = session.send(ApiRequest::get(Service::Api, path)).await?;
    let doc: Document<Resource<A>> = response.json()?;
    Ok(doc.data)
}
