//! Client library for managing church small groups through the Planning
//! Center API and web frontend.
//!
//! The central type is [`GroupProxy`]: a cached view of one remote group
//! whose setters write through to the server and, unless suspended, re-fetch
//! the record so the cache always reflects what the server stored.
//!
//! ```no_run
//! # async fn demo(backend: pcbackend_core::Backend) -> pcbackend_core::Result<()> {
//! let mut group = backend.groups().get(2037398).await?;
//! {
//!     let mut batch = group.suspend_auto_refresh();
//!     batch.set_schedule("Tuesdays at 7pm").await?;
//!     batch.tag_set().add("Men").await?;
//!     batch.finish().await?;
//! }
//! println!("{} meets {:?}", group.name(), group.schedule());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod backend;
pub mod config;
pub mod groups;
pub mod maps;
pub mod models;
pub mod people;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiError, Credentials, HttpSession, Result, SessionClient};
pub use auth::CredentialStore;
pub use backend::Backend;
pub use config::Config;
pub use groups::{
    GroupProxy, GroupSettings, GroupsProvider, LocationDraft, MemberUpdate, Reference,
    RefreshSuspension,
};
pub use maps::{Geocode, GoogleMaps, Place};
pub use people::{PeopleProvider, PeopleQuery};
