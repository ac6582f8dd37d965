//! Turning a caller-supplied reference into a numeric id.
//!
//! Tags and locations can be referred to by id, by exact name, or by a
//! previously fetched record. All three forms resolve to the same id, and a
//! name only resolves when exactly one record matches it.

use async_trait::async_trait;
use tracing::debug;

use crate::api::{ApiError, Result};
use crate::models::{Identified, LocationRecord, TagRecord};

/// A reference to a record of type `R`.
#[derive(Debug, Clone, PartialEq)]
pub enum Reference<R> {
    Id(u64),
    Name(String),
    Record(R),
}

pub type TagRef = Reference<TagRecord>;
pub type LocationRef = Reference<LocationRecord>;

impl<R> From<u64> for Reference<R> {
    fn from(id: u64) -> Self {
        Reference::Id(id)
    }
}

impl<R> From<&str> for Reference<R> {
    fn from(name: &str) -> Self {
        Reference::Name(name.to_string())
    }
}

impl<R> From<String> for Reference<R> {
    fn from(name: String) -> Self {
        Reference::Name(name)
    }
}

impl From<TagRecord> for TagRef {
    fn from(record: TagRecord) -> Self {
        Reference::Record(record)
    }
}

impl From<&TagRecord> for TagRef {
    fn from(record: &TagRecord) -> Self {
        Reference::Record(record.clone())
    }
}

impl From<LocationRecord> for LocationRef {
    fn from(record: LocationRecord) -> Self {
        Reference::Record(record)
    }
}

impl From<&LocationRecord> for LocationRef {
    fn from(record: &LocationRecord) -> Self {
        Reference::Record(record.clone())
    }
}

/// A collection that can be searched by name.
#[async_trait]
pub trait NamedCatalog: Send + Sync {
    type Record: Identified + Send;

    /// Human-readable kind used in error messages ("tag", "location")
    fn kind(&self) -> &'static str;

    /// Records matching `name` under this catalog's matching rule
    async fn find_by_name(&self, name: &str) -> Result<Vec<Self::Record>>;
}

pub struct IdentifierResolver<C> {
    catalog: C,
}

impl<C: NamedCatalog> IdentifierResolver<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    pub async fn resolve(&self, reference: Reference<C::Record>) -> Result<u64> {
        match reference {
            Reference::Id(id) => Ok(self.resolve_id(id)),
            Reference::Record(record) => Ok(self.resolve_record(&record)),
            Reference::Name(name) => self.resolve_name(&name).await,
        }
    }

    /// Ids are taken as given and not checked against the server
    pub fn resolve_id(&self, id: u64) -> u64 {
        id
    }

    pub fn resolve_record(&self, record: &C::Record) -> u64 {
        record.id()
    }

    pub async fn resolve_name(&self, name: &str) -> Result<u64> {
        let mut matches = self.catalog.find_by_name(name).await?;
        match matches.len() {
            0 => Err(ApiError::NotFound(format!(
                "no {} named {:?}",
                self.catalog.kind(),
                name
            ))),
            1 => {
                let record = matches.remove(0);
                debug!(kind = self.catalog.kind(), name, id = record.id(), "Resolved name");
                Ok(record.id())
            }
            n => {
                let names: Vec<&str> = matches.iter().map(|r| r.name()).collect();
                Err(ApiError::AmbiguousReference(format!(
                    "{} {}s match {:?}: {}",
                    n,
                    self.catalog.kind(),
                    name,
                    names.join(", ")
                )))
            }
        }
    }
}
