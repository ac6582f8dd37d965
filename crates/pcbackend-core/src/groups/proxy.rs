//! The stateful group proxy.
//!
//! A `GroupProxy` owns the last fetched `GroupRecord` and, once loaded, the
//! frontend-only `GroupSettings`. Reads never touch the network. Every setter
//! issues exactly one remote write and then, iff auto-refresh is on,
//! re-fetches the record and the settings page so server-side normalization
//! shows up in the cache. A failed write leaves the cache alone and skips the
//! refresh.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::api::{
    fetch_resource, paths, ApiError, ApiRequest, ResourceQuery, Result, Service, SessionClient,
};
use crate::models::{
    EventAttributes, EventRecord, GroupAttributes, GroupEnrollment, GroupEventsVisibility, GroupId,
    GroupLocationType, GroupRecord, GroupType, LocationId, MembershipRecord, PersonId,
    TagAttributes, TagRecord,
};

use super::locations::LocationSet;
use super::members::{self, MemberRegistry};
use super::refresh::RefreshSuspension;
use super::settings::{self, GroupSettings};
use super::tags::TagSet;

/// Seconds per day, the unit the reminder offset is stored in
const SECONDS_PER_DAY: u32 = 86_400;

/// Valid range for the event reminder offset, in days
const REMINDER_OFFSET_DAYS: std::ops::RangeInclusive<u32> = 1..=10;

/// Which frontend page accepts a setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettingPage {
    /// The group page itself (name, type)
    Group,
    /// The group's settings page
    Settings,
}

/// Verb tunnelled through the `_method` form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormMethod {
    Patch,
    Put,
}

impl FormMethod {
    fn as_str(&self) -> &'static str {
        match self {
            FormMethod::Patch => "patch",
            FormMethod::Put => "put",
        }
    }
}

fn flag(on: bool) -> String {
    if on { "1" } else { "0" }.to_string()
}

fn bool_text(on: bool) -> String {
    if on { "true" } else { "false" }.to_string()
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub struct GroupProxy {
    session: Arc<dyn SessionClient>,
    record: GroupRecord,
    settings: Option<GroupSettings>,
    auto_refresh: bool,
    deleted: bool,
}

impl std::fmt::Debug for GroupProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupProxy")
            .field("id", &self.record.id)
            .field("name", &self.record.name)
            .field("auto_refresh", &self.auto_refresh)
            .field("deleted", &self.deleted)
            .finish()
    }
}

impl GroupProxy {
    pub(crate) fn new(session: Arc<dyn SessionClient>, record: GroupRecord) -> Self {
        Self {
            session,
            record,
            settings: None,
            auto_refresh: true,
            deleted: false,
        }
    }

    /// Fetch a group and wrap it in a proxy
    pub async fn load(session: Arc<dyn SessionClient>, id: GroupId) -> Result<Self> {
        let resource =
            fetch_resource::<GroupAttributes>(session.as_ref(), &paths::group(id)).await?;
        Ok(Self::new(session, GroupRecord::from_resource(resource)))
    }

    pub(crate) fn session(&self) -> &dyn SessionClient {
        self.session.as_ref()
    }

    pub(crate) fn session_handle(&self) -> Arc<dyn SessionClient> {
        Arc::clone(&self.session)
    }

    // ========================================================================
    // Refresh contract
    // ========================================================================

    pub fn auto_refresh(&self) -> bool {
        self.auto_refresh
    }

    pub fn set_auto_refresh(&mut self, on: bool) {
        self.auto_refresh = on;
    }

    /// Disable auto-refresh until the returned guard is dropped.
    ///
    /// The guard dereferences to this proxy. On drop it restores whatever
    /// value auto-refresh had before, so nested suspensions unwind correctly.
    pub fn suspend_auto_refresh(&mut self) -> RefreshSuspension<'_> {
        RefreshSuspension::new(self)
    }

    /// Re-fetch the group record and its settings page, replacing both caches.
    ///
    /// A 404 marks the proxy deleted and is returned as `NotFound`.
    pub async fn refresh(&mut self) -> Result<()> {
        let id = self.record.id;
        match fetch_resource::<GroupAttributes>(self.session(), &paths::group(id)).await {
            Ok(resource) => {
                self.record = GroupRecord::from_resource(resource);
                self.deleted = false;
            }
            Err(e) if e.is_not_found() => {
                warn!(group_id = id, "Group no longer exists");
                self.deleted = true;
                return Err(ApiError::NotFound(format!("group {}", id)));
            }
            Err(e) => return Err(e),
        }
        self.refresh_settings().await?;
        debug!(group_id = id, "Group refreshed");
        Ok(())
    }

    async fn refresh_settings(&mut self) -> Result<()> {
        let html = settings::fetch_settings_page(self.session(), self.id()).await?;
        self.settings = Some(settings::parse_settings(&html)?);
        Ok(())
    }

    /// Refresh iff auto-refresh is on. Called after every successful write.
    pub(crate) async fn after_write(&mut self) -> Result<()> {
        if self.auto_refresh {
            self.refresh().await
        } else {
            Ok(())
        }
    }

    // ========================================================================
    // Cached reads
    // ========================================================================

    pub fn id(&self) -> GroupId {
        self.record.id
    }

    pub fn record(&self) -> &GroupRecord {
        &self.record
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Frontend-only settings as of the last refresh, `None` until first loaded
    pub fn settings(&self) -> Option<&GroupSettings> {
        self.settings.as_ref()
    }

    /// Frontend-only settings, fetching the settings page if nothing is cached
    pub async fn load_settings(&mut self) -> Result<&GroupSettings> {
        if self.settings.is_none() {
            self.refresh_settings().await?;
        }
        self.settings
            .as_ref()
            .ok_or_else(|| ApiError::InvalidResponse("settings page not loaded".to_string()))
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn description(&self) -> Option<&str> {
        self.record.description.as_deref()
    }

    pub fn schedule(&self) -> Option<&str> {
        self.record.schedule.as_deref()
    }

    pub fn group_type(&self) -> GroupType {
        self.record.group_type
    }

    pub fn contact_email(&self) -> Option<&str> {
        self.record.contact_email.as_deref()
    }

    pub fn location_id(&self) -> Option<LocationId> {
        self.record.location_id
    }

    pub fn enrollment_open(&self) -> bool {
        self.record.enrollment_open
    }

    pub fn enrollment_strategy(&self) -> GroupEnrollment {
        self.record.enrollment_strategy
    }

    pub fn events_visibility(&self) -> GroupEventsVisibility {
        self.record.events_visibility
    }

    pub fn location_type_preference(&self) -> GroupLocationType {
        self.record.location_type_preference
    }

    pub fn virtual_location_url(&self) -> Option<&str> {
        self.record.virtual_location_url.as_deref()
    }

    pub fn memberships_count(&self) -> u32 {
        self.record.memberships_count
    }

    pub fn public_church_center_web_url(&self) -> Option<&str> {
        self.record.public_church_center_web_url.as_deref()
    }

    pub fn publicly_visible(&self) -> bool {
        self.record.publicly_visible()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.record.created_at
    }

    pub fn archived_at(&self) -> Option<DateTime<Utc>> {
        self.record.archived_at
    }

    pub fn api_path(&self) -> String {
        paths::group(self.id())
    }

    pub fn frontend_path(&self) -> String {
        paths::frontend_group(self.id())
    }

    pub fn settings_path(&self) -> String {
        paths::frontend_settings(self.id())
    }

    // ========================================================================
    // Read-through collections
    // ========================================================================

    pub async fn memberships(&self) -> Result<Vec<MembershipRecord>> {
        members::list_memberships(self.session(), self.id()).await
    }

    pub async fn tags(&self) -> Result<Vec<TagRecord>> {
        let resources = ResourceQuery::<TagAttributes>::new(paths::group_tags(self.id()))
            .fetch_all(self.session())
            .await?;
        Ok(resources.into_iter().map(TagRecord::from_resource).collect())
    }

    pub async fn events(&self) -> Result<Vec<EventRecord>> {
        let resources = ResourceQuery::<EventAttributes>::new(paths::group_events(self.id()))
            .fetch_all(self.session())
            .await?;
        Ok(resources.into_iter().map(EventRecord::from_resource).collect())
    }

    // ========================================================================
    // Sub-collections
    // ========================================================================

    pub fn tag_set(&mut self) -> TagSet<'_> {
        TagSet::new(self)
    }

    pub fn location_set(&self) -> LocationSet<'_> {
        LocationSet::new(self)
    }

    pub fn members(&mut self) -> MemberRegistry<'_> {
        MemberRegistry::new(self)
    }

    // ========================================================================
    // Writes
    // ========================================================================

    async fn write_setting(
        &mut self,
        page: SettingPage,
        method: FormMethod,
        field: &str,
        value: String,
    ) -> Result<()> {
        let path = match page {
            SettingPage::Group => self.frontend_path(),
            SettingPage::Settings => self.settings_path(),
        };
        let form = vec![
            (field.to_string(), value),
            ("_method".to_string(), method.as_str().to_string()),
        ];
        debug!(group_id = self.id(), field, "Writing group setting");

        self.session
            .send(ApiRequest::post(Service::Frontend, path).with_form(form))
            .await?;
        self.after_write().await
    }

    pub async fn set_name(&mut self, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(ApiError::InvalidValue("group name cannot be empty".to_string()));
        }
        self.write_setting(SettingPage::Group, FormMethod::Patch, "group[name]", name.to_string())
            .await
    }

    pub async fn set_description(&mut self, description: &str) -> Result<()> {
        self.write_setting(
            SettingPage::Settings,
            FormMethod::Put,
            "group[description]",
            description.to_string(),
        )
        .await
    }

    pub async fn set_schedule(&mut self, schedule: &str) -> Result<()> {
        self.write_setting(
            SettingPage::Settings,
            FormMethod::Put,
            "group[schedule]",
            schedule.to_string(),
        )
        .await
    }

    pub async fn set_group_type(&mut self, group_type: GroupType) -> Result<()> {
        self.write_setting(
            SettingPage::Group,
            FormMethod::Patch,
            "group[group_type_id]",
            group_type.form_value(),
        )
        .await
    }

    pub async fn set_contact_email(&mut self, email: Option<&str>) -> Result<()> {
        self.write_setting(
            SettingPage::Settings,
            FormMethod::Patch,
            "group[contact_email]",
            optional(email),
        )
        .await
    }

    /// Assign (or clear) the group's active meeting location
    pub async fn set_location_id(&mut self, location_id: Option<LocationId>) -> Result<()> {
        self.write_setting(
            SettingPage::Settings,
            FormMethod::Patch,
            "group[location_id]",
            optional(location_id),
        )
        .await
    }

    pub async fn set_virtual_location_url(&mut self, url: Option<&str>) -> Result<()> {
        self.write_setting(
            SettingPage::Settings,
            FormMethod::Patch,
            "group[virtual_location_url]",
            optional(url),
        )
        .await
    }

    pub async fn set_enrollment_strategy(&mut self, strategy: GroupEnrollment) -> Result<()> {
        if strategy == GroupEnrollment::Unknown {
            return Err(ApiError::InvalidValue("unknown enrollment strategy".to_string()));
        }
        self.write_setting(
            SettingPage::Settings,
            FormMethod::Put,
            "group[public_enrollment]",
            strategy.as_str().to_string(),
        )
        .await
    }

    pub async fn set_events_visibility(&mut self, visibility: GroupEventsVisibility) -> Result<()> {
        if visibility == GroupEventsVisibility::Unknown {
            return Err(ApiError::InvalidValue("unknown events visibility".to_string()));
        }
        self.write_setting(
            SettingPage::Settings,
            FormMethod::Put,
            "group[events_visibility]",
            visibility.as_str().to_string(),
        )
        .await
    }

    pub async fn set_location_type_preference(
        &mut self,
        preference: GroupLocationType,
    ) -> Result<()> {
        if preference == GroupLocationType::Unknown {
            return Err(ApiError::InvalidValue("unknown location type".to_string()));
        }
        self.write_setting(
            SettingPage::Settings,
            FormMethod::Put,
            "group[location_type_preference]",
            preference.as_str().to_string(),
        )
        .await
    }

    pub async fn set_publicly_visible(&mut self, visible: bool) -> Result<()> {
        self.write_setting(
            SettingPage::Settings,
            FormMethod::Put,
            "group[publicly_visible]",
            bool_text(visible),
        )
        .await
    }

    // The settings below are not part of the JSON record; they read back
    // through `settings()`.

    pub async fn set_publicly_display_meeting_schedule(&mut self, on: bool) -> Result<()> {
        self.write_setting(
            SettingPage::Settings,
            FormMethod::Put,
            "group[publicly_display_meeting_schedule]",
            flag(on),
        )
        .await
    }

    pub async fn set_communication_enabled(&mut self, on: bool) -> Result<()> {
        self.write_setting(
            SettingPage::Settings,
            FormMethod::Put,
            "group[communication_enabled]",
            flag(on),
        )
        .await
    }

    pub async fn set_leader_name_visible_on_public_page(&mut self, on: bool) -> Result<()> {
        self.write_setting(
            SettingPage::Settings,
            FormMethod::Put,
            "group[leader_name_visible_on_public_page]",
            flag(on),
        )
        .await
    }

    /// `true` lets members as well as leaders start message topics
    pub async fn set_members_can_create_forum_topics(&mut self, on: bool) -> Result<()> {
        self.write_setting(
            SettingPage::Settings,
            FormMethod::Put,
            "group[members_can_create_forum_topics]",
            bool_text(on),
        )
        .await
    }

    pub async fn set_default_event_reminders_enabled(&mut self, on: bool) -> Result<()> {
        self.write_setting(
            SettingPage::Settings,
            FormMethod::Patch,
            "group[default_event_automated_reminders_enabled]",
            bool_text(on),
        )
        .await
    }

    /// Days before an event that reminder emails go out (1 to 10)
    pub async fn set_default_event_reminder_offset_days(&mut self, days: u32) -> Result<()> {
        if !REMINDER_OFFSET_DAYS.contains(&days) {
            return Err(ApiError::InvalidValue(format!(
                "reminder offset must be between {} and {} days, got {}",
                REMINDER_OFFSET_DAYS.start(),
                REMINDER_OFFSET_DAYS.end(),
                days
            )));
        }
        self.write_setting(
            SettingPage::Settings,
            FormMethod::Patch,
            "group[default_event_automated_reminders_schedule_offset]",
            (days * SECONDS_PER_DAY).to_string(),
        )
        .await
    }

    pub async fn set_enrollment_open_until(&mut self, date: Option<NaiveDate>) -> Result<()> {
        let value = date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        self.write_setting(
            SettingPage::Settings,
            FormMethod::Put,
            "group[enrollment_open_until]",
            value,
        )
        .await
    }

    pub async fn set_enrollment_limit(&mut self, limit: Option<u32>) -> Result<()> {
        self.write_setting(
            SettingPage::Settings,
            FormMethod::Put,
            "group[enrollment_limit]",
            optional(limit),
        )
        .await
    }

    pub async fn set_member_limit_maximum_alert(&mut self, limit: Option<u32>) -> Result<()> {
        self.write_setting(
            SettingPage::Settings,
            FormMethod::Put,
            "group[member_limit_maximum_alert]",
            optional(limit),
        )
        .await
    }

    pub async fn set_request_event_attendance_from_leaders(&mut self, on: bool) -> Result<()> {
        self.write_setting(
            SettingPage::Settings,
            FormMethod::Put,
            "group[request_event_attendance_from_leaders]",
            flag(on),
        )
        .await
    }

    pub async fn set_attendance_reply_to_person_id(
        &mut self,
        person_id: Option<PersonId>,
    ) -> Result<()> {
        self.write_setting(
            SettingPage::Settings,
            FormMethod::Put,
            "group[attendance_reply_to_person_id]",
            optional(person_id),
        )
        .await
    }

    pub async fn set_leaders_can_search_people_database(&mut self, on: bool) -> Result<()> {
        self.write_setting(
            SettingPage::Settings,
            FormMethod::Put,
            "group[leaders_can_search_people_database]",
            flag(on),
        )
        .await
    }

    /// Delete the remote group. The proxy is marked deleted; no refresh follows.
    pub async fn delete(&mut self) -> Result<()> {
        self.session
            .send(ApiRequest::delete(Service::Frontend, self.frontend_path()))
            .await?;
        info!(group_id = self.id(), "Group deleted");
        self.deleted = true;
        Ok(())
    }
}
