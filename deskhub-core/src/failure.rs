//! Failure taxonomy for source fetches and the mapping to placeholder records.

use reqwest::{Response, StatusCode};
use thiserror::Error;

use crate::status::{CalendarEvent, MailStatus, TodoSummary, UNAVAILABLE_COUNT, WeatherReading};

/// Why a source could not produce its record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceFailure {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Upstream returned HTTP {0}")]
    Http(u16),

    #[error("Request timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    Parse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SourceFailure {
    /// Short category tag shown on the dashboard.
    pub fn category(&self) -> &'static str {
        match self {
            SourceFailure::Auth(_) => "auth",
            SourceFailure::Http(_) => "HTTP",
            SourceFailure::Timeout => "timeout",
            SourceFailure::Transport(_) => "network",
            SourceFailure::Parse(_) => "parse",
            SourceFailure::Internal(_) => "internal",
        }
    }

    /// Placeholder text for a source identified by `prefix`, e.g.
    /// `Wea HTTP error: 503` or `Mail error: timeout`.
    pub fn placeholder(&self, prefix: &str) -> String {
        match self {
            SourceFailure::Http(status) => format!("{prefix} HTTP error: {status}"),
            other => format!("{prefix} error: {}", other.category()),
        }
    }

    /// Classify a non-success HTTP status. 401 and 403 mean the credential was rejected.
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                SourceFailure::Auth(format!("upstream rejected credential ({status})"))
            }
            other => SourceFailure::Http(other.as_u16()),
        }
    }
}

impl From<reqwest::Error> for SourceFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceFailure::Timeout
        } else if let Some(status) = err.status() {
            SourceFailure::from_status(status)
        } else if err.is_decode() {
            SourceFailure::Parse(err.to_string())
        } else {
            SourceFailure::Transport(err.to_string())
        }
    }
}

/// Pass a response through if its status is 2xx, otherwise classify it.
pub fn ensure_success(response: Response) -> Result<Response, SourceFailure> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(SourceFailure::from_status(status))
    }
}

/// Builds the sentinel record a source reports when its fetch failed.
pub trait Degrade: Sized {
    fn degraded(failure: &SourceFailure) -> Self;
}

impl Degrade for MailStatus {
    fn degraded(failure: &SourceFailure) -> Self {
        MailStatus {
            unread: UNAVAILABLE_COUNT,
            latest_subject: failure.placeholder("Mail"),
        }
    }
}

impl Degrade for CalendarEvent {
    fn degraded(failure: &SourceFailure) -> Self {
        CalendarEvent {
            summary: failure.placeholder("Cal"),
            start: String::new(),
            location: String::new(),
        }
    }
}

impl Degrade for WeatherReading {
    fn degraded(failure: &SourceFailure) -> Self {
        WeatherReading {
            temp: None,
            description: failure.placeholder("Wea"),
        }
    }
}

impl Degrade for TodoSummary {
    fn degraded(failure: &SourceFailure) -> Self {
        TodoSummary {
            count: UNAVAILABLE_COUNT,
            top: failure.placeholder("Todo"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_failure_keeps_status_in_placeholder() {
        let reading = WeatherReading::degraded(&SourceFailure::Http(503));

        assert_eq!(reading.temp, None);
        assert_eq!(reading.description, "Wea HTTP error: 503");
    }

    #[test]
    fn test_other_failures_are_tagged_by_category() {
        assert_eq!(
            MailStatus::degraded(&SourceFailure::Timeout).latest_subject,
            "Mail error: timeout"
        );
        assert_eq!(
            CalendarEvent::degraded(&SourceFailure::Auth("no token".into())).summary,
            "Cal error: auth"
        );
        assert_eq!(
            TodoSummary::degraded(&SourceFailure::Parse("bad json".into())).top,
            "Todo error: parse"
        );
    }

    #[test]
    fn test_degraded_records_use_sentinels() {
        let failure = SourceFailure::Transport("connection refused".into());

        assert_eq!(MailStatus::degraded(&failure).unread, -1);
        assert_eq!(TodoSummary::degraded(&failure).count, -1);

        let event = CalendarEvent::degraded(&failure);
        assert!(event.start.is_empty());
        assert!(event.location.is_empty());
    }

    #[test]
    fn test_rejected_credential_status_is_auth() {
        assert!(matches!(
            SourceFailure::from_status(StatusCode::UNAUTHORIZED),
            SourceFailure::Auth(_)
        ));
        assert_eq!(
            SourceFailure::from_status(StatusCode::BAD_GATEWAY),
            SourceFailure::Http(502)
        );
    }
}
