//! Settings that only the web frontend exposes.
//!
//! The JSON record has no field for these, so they are read back from the
//! group's settings page. The page mixes three sources: plain form inputs,
//! JSON props on React mount points, and JSON literals inside inline scripts.
//! Every lookup fails with `InvalidResponse` when the markup it expects is
//! missing, which usually means the frontend changed.
//!
//! `scraper::Html` is not `Send`, so parsing happens in plain functions and
//! only the extracted values cross an `.await`.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{paths, ApiError, ApiRequest, Result, Service, SessionClient};
use crate::models::{GroupId, PersonId, TagId};

const SECONDS_PER_DAY: u64 = 86_400;

const REMINDER_COMPONENT: &str = "Components.GroupSettingsEventReminderToggle";
const ENROLLMENT_SCRIPT_PREFIX: &str = "enrollment_settings_group_";
const TAGS_SCRIPT_PREFIX: &str = "tags_group_";

/// `Components.X, {json}), document.getElementById`
static SCRIPT_JSON: LazyLock<std::result::Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(r"(?s)Components\.[^,\s]+,\s*(\{.*?\})\)\s*,\s*document\.getElementById")
});

/// Frontend-only settings as of the last fetch of the settings page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSettings {
    pub publicly_display_meeting_schedule: bool,
    pub communication_enabled: bool,
    pub leader_name_visible_on_public_page: bool,
    /// `true` when members as well as leaders may start message topics
    pub members_can_create_forum_topics: bool,
    pub default_event_reminders_enabled: bool,
    pub default_event_reminder_offset_days: u32,
    pub enrollment_open_until: Option<NaiveDate>,
    pub enrollment_limit: Option<u32>,
    pub member_limit_maximum_alert: Option<u32>,
    pub request_event_attendance_from_leaders: bool,
    pub attendance_reply_to_person_id: Option<PersonId>,
    pub leaders_can_search_people_database: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReminderProps {
    automated_reminders_enabled: bool,
    schedule_offset: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnrollmentProps {
    enrollment_open_until: Option<String>,
    enrollment_limit: Option<u32>,
    member_limit_maximum_alert: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TagsProps {
    tags: Vec<TagAssociation>,
}

/// One tag association as listed on the settings page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct TagAssociation {
    pub id: TagId,
    /// Removal endpoint; its id is the association's, not the tag's
    pub url: String,
}

/// Fetch the raw settings page
pub(crate) async fn fetch_settings_page(
    session: &dyn SessionClient,
    id: GroupId,
) -> Result<String> {
    let request = ApiRequest::get(Service::Frontend, paths::frontend_settings(id)).expect_html();
    Ok(session.send(request).await?.body)
}

pub(crate) fn parse_settings(html: &str) -> Result<GroupSettings> {
    let page = SettingsPage::new(html);

    let reminders: ReminderProps = page.react_props(REMINDER_COMPONENT)?;
    let enrollment: EnrollmentProps = page.script_json(ENROLLMENT_SCRIPT_PREFIX)?;
    let enrollment_open_until = enrollment
        .enrollment_open_until
        .as_deref()
        .map(parse_date)
        .transpose()?;
    let attendance_reply_to_person_id = page
        .selected("group[attendance_reply_to_person_id]")?
        .map(|v| {
            v.parse().map_err(|_| {
                ApiError::InvalidResponse(format!("reply-to is not a person id: {:?}", v))
            })
        })
        .transpose()?;

    Ok(GroupSettings {
        publicly_display_meeting_schedule: page
            .checkbox("group[publicly_display_meeting_schedule]")?,
        communication_enabled: page.checkbox("group[communication_enabled]")?,
        leader_name_visible_on_public_page: page
            .checkbox("group[leader_name_visible_on_public_page]")?,
        members_can_create_forum_topics: page.radio("group[members_can_create_forum_topics]")?
            == "true",
        default_event_reminders_enabled: reminders.automated_reminders_enabled,
        default_event_reminder_offset_days: (reminders.schedule_offset / SECONDS_PER_DAY) as u32,
        enrollment_open_until,
        enrollment_limit: enrollment.enrollment_limit,
        member_limit_maximum_alert: enrollment.member_limit_maximum_alert,
        request_event_attendance_from_leaders: page
            .checkbox("group[request_event_attendance_from_leaders]")?,
        attendance_reply_to_person_id,
        leaders_can_search_people_database: page
            .checkbox("group[leaders_can_search_people_database]")?,
    })
}

/// Tag associations listed on the settings page, with their removal URLs
pub(crate) fn parse_tag_associations(html: &str) -> Result<Vec<TagAssociation>> {
    let props: TagsProps = SettingsPage::new(html).script_json(TAGS_SCRIPT_PREFIX)?;
    Ok(props.tags)
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    // either a bare date or a full timestamp
    value
        .get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .ok_or_else(|| ApiError::InvalidResponse(format!("unrecognized date {:?}", value)))
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| ApiError::InvalidResponse(format!("invalid selector {:?}: {:?}", css, e)))
}

fn missing(what: String) -> ApiError {
    ApiError::InvalidResponse(format!("settings page has no {}", what))
}

struct SettingsPage {
    document: Html,
}

impl SettingsPage {
    fn new(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    fn inputs(&self, class: &str, name: &str) -> Result<Vec<ElementRef<'_>>> {
        let selector = selector(&format!(r#".{}[name="{}"]"#, class, name))?;
        let found: Vec<_> = self.document.select(&selector).collect();
        if found.is_empty() {
            return Err(missing(format!("{} named {}", class, name)));
        }
        Ok(found)
    }

    fn checkbox(&self, name: &str) -> Result<bool> {
        let inputs = self.inputs("checkbox", name)?;
        Ok(inputs[0].value().attr("checked").is_some())
    }

    fn radio(&self, name: &str) -> Result<String> {
        self.inputs("radio", name)?
            .into_iter()
            .find(|r| r.value().attr("checked").is_some())
            .and_then(|r| r.value().attr("value"))
            .map(str::to_string)
            .ok_or_else(|| missing(format!("checked radio named {}", name)))
    }

    /// `None` when the empty option is selected
    fn selected(&self, name: &str) -> Result<Option<String>> {
        let select = self.inputs("select", name)?;
        let option = selector("option[selected]")?;
        Ok(select[0]
            .select(&option)
            .next()
            .and_then(|o| o.value().attr("value"))
            .filter(|v| !v.is_empty())
            .map(str::to_string))
    }

    fn react_props<T: serde::de::DeserializeOwned>(&self, component: &str) -> Result<T> {
        let selector = selector(r#"[data-react-class="AppProvider"]"#)?;
        for element in self.document.select(&selector) {
            let Some(raw) = element.value().attr("data-react-props") else {
                continue;
            };
            let props: Value = serde_json::from_str(raw)?;
            if props.get("component").and_then(Value::as_str) == Some(component) {
                return Ok(serde_json::from_value(props)?);
            }
        }
        Err(missing(format!("React props for {}", component)))
    }

    fn script_json<T: serde::de::DeserializeOwned>(&self, id_prefix: &str) -> Result<T> {
        let selector = selector(&format!(r#"[id^="{}"] script"#, id_prefix))?;
        let script: String = self
            .document
            .select(&selector)
            .next()
            .ok_or_else(|| missing(format!("script under #{}*", id_prefix)))?
            .text()
            .collect();

        let pattern = SCRIPT_JSON
            .as_ref()
            .map_err(|e| ApiError::InvalidResponse(format!("script pattern: {}", e)))?;
        let json = pattern
            .captures(&script)
            .and_then(|c| c.get(1))
            .ok_or_else(|| missing(format!("component JSON in #{}*", id_prefix)))?;
        Ok(serde_json::from_str(json.as_str())?)
    }
}
