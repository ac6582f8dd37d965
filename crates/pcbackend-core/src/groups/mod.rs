//! Groups: the stateful proxy and its sub-collections.
//!
//! - `GroupsProvider`: find, load and create groups
//! - `GroupProxy`: cached group record with write-through setters
//! - `GroupSettings`: frontend-only settings read from the settings page
//! - `RefreshSuspension`: scoped guard that pauses auto-refresh
//! - `TagSet`, `LocationSet`, `MemberRegistry`: views over one group
//! - `IdentifierResolver`: id / name / record to id

pub mod locations;
pub mod members;
pub mod provider;
pub mod proxy;
pub mod refresh;
pub mod resolver;
pub mod settings;
pub mod tags;

pub use locations::{LocationCatalog, LocationDraft, LocationSet};
pub use members::{MemberRegistry, MemberUpdate};
pub use provider::GroupsProvider;
pub use proxy::GroupProxy;
pub use refresh::RefreshSuspension;
pub use resolver::{IdentifierResolver, LocationRef, NamedCatalog, Reference, TagRef};
pub use settings::GroupSettings;
pub use tags::{TagCatalog, TagSet};
