//! The three Google REST calls deskhub needs.

use chrono::{DateTime, SecondsFormat, Utc};
use deskhub_core::config::GoogleConfig;
use deskhub_core::failure::{SourceFailure, ensure_success};
use serde::Deserialize;

use crate::credential::Credential;

/// Google's alias for the user's main calendar
const PRIMARY_CALENDAR_ID: &str = "primary";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageList {
    /// Absent when nothing matched.
    #[serde(default)]
    pub messages: Vec<MessageRef>,
    #[serde(default)]
    pub result_size_estimate: i64,
}

#[derive(Debug, Deserialize)]
pub struct MessageRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct MessageMetadata {
    #[serde(default)]
    payload: Option<MessagePayload>,
}

#[derive(Debug, Deserialize)]
struct MessagePayload {
    #[serde(default)]
    headers: Vec<Header>,
}

#[derive(Debug, Deserialize)]
struct Header {
    name: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<GoogleEvent>,
}

#[derive(Debug, Deserialize)]
pub struct GoogleEvent {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start: Option<EventStart>,
}

/// Timed events carry `dateTime`, all-day events only `date`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStart {
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

pub struct GoogleApi {
    http: reqwest::Client,
    gmail_base_url: String,
    calendar_base_url: String,
}

impl GoogleApi {
    pub fn new(http: reqwest::Client, config: &GoogleConfig) -> Self {
        GoogleApi {
            http,
            gmail_base_url: config.gmail_base_url.trim_end_matches('/').to_string(),
            calendar_base_url: config.calendar_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `users.messages.list` with `q=is:unread`.
    pub async fn list_unread(
        &self,
        credential: &Credential,
        max_results: u32,
    ) -> Result<MessageList, SourceFailure> {
        let max_results = max_results.to_string();

        let response = self
            .http
            .get(format!("{}/users/me/messages", self.gmail_base_url))
            .bearer_auth(&credential.access_token)
            .query(&[("q", "is:unread"), ("maxResults", max_results.as_str())])
            .send()
            .await?;

        Ok(ensure_success(response)?.json().await?)
    }

    /// `users.messages.get` with `format=metadata`, returning the Subject header.
    pub async fn message_subject(
        &self,
        credential: &Credential,
        message_id: &str,
    ) -> Result<Option<String>, SourceFailure> {
        let response = self
            .http
            .get(format!("{}/users/me/messages/{}", self.gmail_base_url, message_id))
            .bearer_auth(&credential.access_token)
            .query(&[("format", "metadata"), ("metadataHeaders", "Subject")])
            .send()
            .await?;

        let metadata: MessageMetadata = ensure_success(response)?.json().await?;

        Ok(metadata
            .payload
            .into_iter()
            .flat_map(|p| p.headers)
            .find(|h| h.name.eq_ignore_ascii_case("Subject"))
            .map(|h| h.value))
    }

    /// `events.list` on the primary calendar: the first event at or after `now`,
    /// with recurring events expanded into single occurrences.
    pub async fn next_event(
        &self,
        credential: &Credential,
        now: DateTime<Utc>,
    ) -> Result<Option<GoogleEvent>, SourceFailure> {
        let time_min = now.to_rfc3339_opts(SecondsFormat::Secs, true);

        let response = self
            .http
            .get(format!(
                "{}/calendars/{}/events",
                self.calendar_base_url, PRIMARY_CALENDAR_ID
            ))
            .bearer_auth(&credential.access_token)
            .query(&[
                ("timeMin", time_min.as_str()),
                ("maxResults", "1"),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ])
            .send()
            .await?;

        let events: EventList = ensure_success(response)?.json().await?;

        Ok(events.items.into_iter().next())
    }
}
