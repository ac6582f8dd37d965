//! Meeting locations visible to a group.
//!
//! Locations live on the legacy v1 endpoints under the web frontend and use
//! the flat wire format. Creating a location does not assign it; use
//! [`GroupProxy::set_location_id`] for that.

use async_trait::async_trait;
use tracing::info;

use super::proxy::GroupProxy;
use super::resolver::{IdentifierResolver, LocationRef, NamedCatalog};
use crate::api::{paths, ApiRequest, Result, Service, SessionClient};
use crate::maps::{AddressComponent, Geocode};
use crate::models::location::CreatedLocation;
use crate::models::{DisplayPreference, GroupId, LocationId, LocationRecord, LocationsResponse};

const DEFAULT_RADIUS: u32 = 1000;

fn round_2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Everything needed to create a location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationDraft {
    pub name: String,
    pub formatted_address: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Shared locations are offered to every group
    pub shared: bool,
    pub display_preference: DisplayPreference,
    /// Center shown in approximate mode; defaults to the coordinates rounded to 2 places
    pub approximate_center: Option<(f64, f64)>,
    pub radius: u32,
    pub address_components: Vec<AddressComponent>,
}

impl LocationDraft {
    /// Draft from geocoded data; the address components are forwarded as-is
    pub fn from_geocode(name: impl Into<String>, geocode: &Geocode) -> Self {
        Self {
            name: name.into(),
            formatted_address: geocode.formatted_address.clone(),
            latitude: geocode.latitude,
            longitude: geocode.longitude,
            shared: true,
            display_preference: DisplayPreference::Approximate,
            approximate_center: None,
            radius: DEFAULT_RADIUS,
            address_components: geocode.address_components.clone(),
        }
    }

    /// Draft for an address that did not come from a geocoder
    pub fn custom(
        name: impl Into<String>,
        formatted_address: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        let formatted_address = formatted_address.into();
        let component = AddressComponent {
            long_name: formatted_address.clone(),
            short_name: formatted_address.clone(),
            types: vec!["custom".to_string(), "full_address".to_string()],
        };
        Self {
            name: name.into(),
            formatted_address,
            latitude,
            longitude,
            shared: true,
            display_preference: DisplayPreference::Approximate,
            approximate_center: None,
            radius: DEFAULT_RADIUS,
            address_components: vec![component],
        }
    }

    pub fn shared(mut self, shared: bool) -> Self {
        self.shared = shared;
        self
    }

    pub fn display_preference(mut self, preference: DisplayPreference) -> Self {
        self.display_preference = preference;
        self
    }

    pub fn approximate_center(mut self, latitude: f64, longitude: f64) -> Self {
        self.approximate_center = Some((latitude, longitude));
        self
    }

    pub fn radius(mut self, radius: u32) -> Self {
        self.radius = radius;
        self
    }

    fn to_form(&self, group_id: GroupId) -> Vec<(String, String)> {
        let (approx_lat, approx_lng) = self
            .approximate_center
            .unwrap_or((round_2(self.latitude), round_2(self.longitude)));
        let owner = if self.shared {
            String::new()
        } else {
            group_id.to_string()
        };

        let mut form: Vec<(String, String)> = [
            ("location[display_preference]", self.display_preference.as_str().to_string()),
            ("location[id]", "new".to_string()),
            ("location[group_id]", owner),
            ("location[permissions][can_share]", "true".to_string()),
            ("location[name]", self.name.clone()),
            ("location[formatted_address]", self.formatted_address.clone()),
            ("location[latitude]", self.latitude.to_string()),
            ("location[longitude]", self.longitude.to_string()),
            ("location[approximation][center][lat]", approx_lat.to_string()),
            ("location[approximation][center][lng]", approx_lng.to_string()),
            ("location[approximation][radius]", self.radius.to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        for (i, component) in self.address_components.iter().enumerate() {
            let prefix = format!("location[address_data][{}]", i);
            form.push((format!("{}[long_name]", prefix), component.long_name.clone()));
            form.push((format!("{}[short_name]", prefix), component.short_name.clone()));
            for kind in &component.types {
                form.push((format!("{}[types][]", prefix), kind.clone()));
            }
        }
        form
    }
}

/// Name lookup over the full location list, matched exactly on the client.
pub struct LocationCatalog<'a> {
    session: &'a dyn SessionClient,
    group_id: GroupId,
}

impl<'a> LocationCatalog<'a> {
    pub fn new(session: &'a dyn SessionClient, group_id: GroupId) -> Self {
        Self { session, group_id }
    }

    pub async fn list(&self) -> Result<Vec<LocationRecord>> {
        let response = self
            .session
            .send(ApiRequest::get(Service::Frontend, paths::legacy_locations(self.group_id)))
            .await?;
        Ok(response.json::<LocationsResponse>()?.locations)
    }
}

#[async_trait]
impl<'a> NamedCatalog for LocationCatalog<'a> {
    type Record = LocationRecord;

    fn kind(&self) -> &'static str {
        "location"
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<LocationRecord>> {
        let mut locations = self.list().await?;
        locations.retain(|l| l.name == name);
        Ok(locations)
    }
}

pub struct LocationSet<'a> {
    group: &'a GroupProxy,
}

impl<'a> LocationSet<'a> {
    pub(crate) fn new(group: &'a GroupProxy) -> Self {
        Self { group }
    }

    fn catalog(&self) -> LocationCatalog<'_> {
        LocationCatalog::new(self.group.session(), self.group.id())
    }

    /// All locations this group may use: its own plus shared ones
    pub async fn query(&self) -> Result<Vec<LocationRecord>> {
        self.catalog().list().await
    }

    pub async fn find(&self, id: LocationId) -> Result<Option<LocationRecord>> {
        Ok(self.query().await?.into_iter().find(|l| l.id == id))
    }

    pub async fn resolve(&self, location: impl Into<LocationRef>) -> Result<LocationId> {
        IdentifierResolver::new(self.catalog())
            .resolve(location.into())
            .await
    }

    pub async fn create(&self, name: &str, geocode: &Geocode, shared: bool) -> Result<LocationId> {
        self.create_with(LocationDraft::from_geocode(name, geocode).shared(shared))
            .await
    }

    pub async fn create_custom(
        &self,
        name: &str,
        formatted_address: &str,
        latitude: f64,
        longitude: f64,
        shared: bool,
    ) -> Result<LocationId> {
        let draft = LocationDraft::custom(name, formatted_address, latitude, longitude);
        self.create_with(draft.shared(shared)).await
    }

    pub async fn create_with(&self, draft: LocationDraft) -> Result<LocationId> {
        let form = draft.to_form(self.group.id());
        let path = paths::legacy_locations(self.group.id());
        let response = self
            .group
            .session()
            .send(ApiRequest::post(Service::Frontend, path).with_form(form))
            .await?;
        let created: CreatedLocation = response.json()?;
        info!(
            group_id = self.group.id(),
            location_id = created.id,
            name = %draft.name,
            "Location created"
        );
        Ok(created.id)
    }

    /// Delete a location. The server refuses (`Conflict`) while a group uses it.
    pub async fn delete(&self, id: LocationId) -> Result<()> {
        let path = paths::legacy_location(self.group.id(), id);
        self.group
            .session()
            .send(ApiRequest::delete(Service::Frontend, path))
            .await?;
        info!(group_id = self.group.id(), location_id = id, "Location deleted");
        Ok(())
    }
}
