//! Records returned by `GET /status`.
//!
//! Every field is always present. Failed sources fill their record with
//! sentinel values (`-1` counts, `null` temperature) and a placeholder string.

use serde::{Deserialize, Serialize};

/// Placeholder subject when the inbox has no unread mail.
pub const NO_UNREAD_MAIL: &str = "No unread mail";

/// Placeholder summary when the calendar has nothing coming up.
pub const NO_UPCOMING_EVENTS: &str = "No upcoming events";

/// Sentinel count for an unavailable source.
pub const UNAVAILABLE_COUNT: i64 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailStatus {
    pub unread: i64,
    pub latest_subject: String,
}

impl MailStatus {
    pub fn empty_inbox() -> Self {
        MailStatus {
            unread: 0,
            latest_subject: NO_UNREAD_MAIL.to_string(),
        }
    }
}

/// Next upcoming event. `start` is an RFC 3339 timestamp, or a plain
/// `YYYY-MM-DD` date for all-day events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub summary: String,
    pub start: String,
    pub location: String,
}

impl CalendarEvent {
    pub fn none_upcoming() -> Self {
        CalendarEvent {
            summary: NO_UPCOMING_EVENTS.to_string(),
            start: String::new(),
            location: String::new(),
        }
    }
}

/// Current conditions. `temp` serializes as `null` when unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub temp: Option<f64>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoSummary {
    pub count: i64,
    pub top: String,
}

/// The full response for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub email: MailStatus,
    pub calendar: CalendarEvent,
    pub weather: WeatherReading,
    pub todos: TodoSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_serializes_null_temperature() {
        let snapshot = StatusSnapshot {
            email: MailStatus::empty_inbox(),
            calendar: CalendarEvent::none_upcoming(),
            weather: WeatherReading {
                temp: None,
                description: "Wea error: timeout".to_string(),
            },
            todos: TodoSummary {
                count: 0,
                top: String::new(),
            },
        };

        let value = serde_json::to_value(&snapshot).unwrap();

        assert!(value["weather"]["temp"].is_null());
        assert_eq!(value["email"]["latest_subject"], "No unread mail");
        assert_eq!(value["calendar"]["start"], "");
    }
}
