//! Data models for the remote resources.
//!
//! - `GroupRecord`: cached snapshot owned by a group proxy
//! - `TagRecord`: global tag catalog entry
//! - `LocationRecord`: meeting location (flat legacy wire format)
//! - `MembershipRecord`: a person's membership in one group
//! - `PersonReference`: read-only person lookup result
//! - `EventRecord`: a group event

pub mod event;
pub mod group;
pub mod location;
pub mod membership;
pub mod person;
pub mod tag;

pub use event::{EventAttributes, EventRecord};
pub use group::{
    GroupAttributes, GroupEnrollment, GroupEventsVisibility, GroupLocationType, GroupRecord,
    GroupType,
};
pub use location::{DisplayPreference, LocationRecord, LocationsResponse};
pub use membership::{MembershipAttributes, MembershipRecord, MembershipRole};
pub use person::PersonReference;
pub use tag::{TagAttributes, TagRecord};

pub type GroupId = u64;
pub type TagId = u64;
pub type LocationId = u64;
pub type PersonId = u64;
pub type MembershipId = u64;

/// A fetched record that carries its own numeric id and display name.
pub trait Identified {
    fn id(&self) -> u64;
    fn name(&self) -> &str;
}
