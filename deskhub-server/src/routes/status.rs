//! Status endpoint polled by the desk display

use axum::{Json, Router, extract::State, routing::get};
use deskhub_core::StatusSnapshot;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/status", get(status))
}

/// GET /status - Mail, calendar, weather and todos in one response
async fn status(State(state): State<AppState>) -> Json<StatusSnapshot> {
    Json(state.aggregator().aggregate().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::app;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use deskhub_core::{
        Aggregator, CalendarEvent, Degrade, MailStatus, Source, SourceFailure, TodoSummary,
        WeatherReading,
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    struct Stub<R>(Result<R, SourceFailure>);

    #[async_trait]
    impl<R> Source for Stub<R>
    where
        R: Degrade + Clone + Send + Sync + 'static,
    {
        type Record = R;

        fn name(&self) -> &'static str {
            "stub"
        }

        async fn fetch(&self) -> Result<R, SourceFailure> {
            self.0.clone()
        }
    }

    fn healthy() -> AppState {
        AppState::new(Aggregator::new(
            Arc::new(Stub(Ok(MailStatus {
                unread: 4,
                latest_subject: "Lunch?".to_string(),
            }))),
            Arc::new(Stub(Ok(CalendarEvent {
                summary: "Standup".to_string(),
                start: "2026-10-16T09:00:00+03:00".to_string(),
                location: "".to_string(),
            }))),
            Arc::new(Stub(Ok(WeatherReading {
                temp: Some(5.4),
                description: "Overcast".to_string(),
            }))),
            Arc::new(Stub(Ok(TodoSummary {
                count: 2,
                top: "Finish ESP32 dashboard".to_string(),
            }))),
        ))
    }

    fn broken() -> AppState {
        AppState::new(Aggregator::new(
            Arc::new(Stub::<MailStatus>(Err(SourceFailure::Auth("revoked".into())))),
            Arc::new(Stub::<CalendarEvent>(Err(SourceFailure::Timeout))),
            Arc::new(Stub::<WeatherReading>(Err(SourceFailure::Http(503)))),
            Arc::new(Stub::<TodoSummary>(Err(SourceFailure::Transport("down".into())))),
        ))
    }

    async fn get_json(state: AppState, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app(state)
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn assert_shape(body: &serde_json::Value) {
        let mut keys: Vec<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(keys, vec!["calendar", "email", "todos", "weather"]);

        assert!(body["email"]["unread"].is_i64());
        assert!(body["email"]["latest_subject"].is_string());
        assert!(body["calendar"]["summary"].is_string());
        assert!(body["calendar"]["start"].is_string());
        assert!(body["calendar"]["location"].is_string());
        assert!(body["weather"]["temp"].is_number() || body["weather"]["temp"].is_null());
        assert!(body["weather"]["description"].is_string());
        assert!(body["todos"]["count"].is_i64());
        assert!(body["todos"]["top"].is_string());
    }

    #[tokio::test]
    async fn test_status_all_sources_healthy() {
        let (status, body) = get_json(healthy(), "/status").await;

        assert_eq!(status, StatusCode::OK);
        assert_shape(&body);
        assert_eq!(body["email"]["unread"], 4);
        assert_eq!(body["weather"]["temp"], 5.4);
        assert_eq!(body["weather"]["description"], "Overcast");
        assert_eq!(body["todos"]["top"], "Finish ESP32 dashboard");
    }

    #[tokio::test]
    async fn test_status_all_sources_failing_keeps_shape() {
        let (status, body) = get_json(broken(), "/status").await;

        assert_eq!(status, StatusCode::OK);
        assert_shape(&body);
        assert_eq!(body["email"]["unread"], -1);
        assert_eq!(body["email"]["latest_subject"], "Mail error: auth");
        assert_eq!(body["calendar"]["summary"], "Cal error: timeout");
        assert!(body["weather"]["temp"].is_null());
        assert_eq!(body["weather"]["description"], "Wea HTTP error: 503");
        assert_eq!(body["todos"]["count"], -1);
        assert_eq!(body["todos"]["top"], "Todo error: network");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, _) = get_json(healthy(), "/weather").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let response = app(healthy())
            .oneshot(
                Request::get("/status")
                    .header("origin", "http://192.168.0.50")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }
}
