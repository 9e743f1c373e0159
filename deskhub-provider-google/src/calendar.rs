//! Google Calendar source: the next upcoming event on the primary calendar.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use deskhub_core::{CalendarEvent, Source, SourceFailure};

use crate::api::{GoogleApi, GoogleEvent};
use crate::provider::CredentialProvider;

const NO_TITLE: &str = "(no title)";

pub struct CalendarSource {
    api: Arc<GoogleApi>,
    credentials: Arc<CredentialProvider>,
}

impl CalendarSource {
    pub fn new(api: Arc<GoogleApi>, credentials: Arc<CredentialProvider>) -> Self {
        CalendarSource { api, credentials }
    }
}

impl From<GoogleEvent> for CalendarEvent {
    fn from(event: GoogleEvent) -> Self {
        let start = event
            .start
            .and_then(|s| s.date_time.or(s.date))
            .unwrap_or_default();

        CalendarEvent {
            summary: event
                .summary
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| NO_TITLE.to_string()),
            start,
            location: event.location.unwrap_or_default(),
        }
    }
}

#[async_trait]
impl Source for CalendarSource {
    type Record = CalendarEvent;

    fn name(&self) -> &'static str {
        "calendar"
    }

    async fn fetch(&self) -> Result<CalendarEvent, SourceFailure> {
        let credential = self.credentials.obtain().await?;

        let next = self.api.next_event(&credential, Utc::now()).await?;

        Ok(next
            .map(CalendarEvent::from)
            .unwrap_or_else(CalendarEvent::none_upcoming))
    }
}
