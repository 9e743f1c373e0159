//! Builds a `StatusSnapshot` from the four sources.
//!
//! Each source runs in its own task under its own timeout, so a slow, failing
//! or panicking source only ever affects its own record.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, instrument, warn};

use crate::failure::{Degrade, SourceFailure};
use crate::source::Source;
use crate::status::{CalendarEvent, MailStatus, StatusSnapshot, TodoSummary, WeatherReading};

/// Default per-source time budget.
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(5);

pub type SharedSource<R> = Arc<dyn Source<Record = R>>;

pub struct Aggregator {
    mail: SharedSource<MailStatus>,
    calendar: SharedSource<CalendarEvent>,
    weather: SharedSource<WeatherReading>,
    todos: SharedSource<TodoSummary>,
    timeout: Duration,
}

impl Aggregator {
    pub fn new(
        mail: SharedSource<MailStatus>,
        calendar: SharedSource<CalendarEvent>,
        weather: SharedSource<WeatherReading>,
        todos: SharedSource<TodoSummary>,
    ) -> Self {
        Aggregator {
            mail,
            calendar,
            weather,
            todos,
            timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch every source concurrently. Never fails.
    #[instrument(skip(self), fields(timeout_ms = self.timeout.as_millis() as u64))]
    pub async fn aggregate(&self) -> StatusSnapshot {
        let (email, calendar, weather, todos) = tokio::join!(
            collect(self.mail.clone(), self.timeout),
            collect(self.calendar.clone(), self.timeout),
            collect(self.weather.clone(), self.timeout),
            collect(self.todos.clone(), self.timeout),
        );

        StatusSnapshot {
            email,
            calendar,
            weather,
            todos,
        }
    }
}

async fn collect<R>(source: SharedSource<R>, timeout: Duration) -> R
where
    R: Degrade + Send + 'static,
{
    let name = source.name();
    let started = Instant::now();

    let task = tokio::spawn(async move { tokio::time::timeout(timeout, source.fetch()).await });

    let outcome = match task.await {
        Ok(Ok(result)) => result,
        Ok(Err(_elapsed)) => Err(SourceFailure::Timeout),
        Err(join_err) => Err(SourceFailure::Internal(join_err.to_string())),
    };

    let elapsed_ms = started.elapsed().as_millis() as u64;

    match outcome {
        Ok(record) => {
            debug!(source = name, elapsed_ms, "Source fetched");
            record
        }
        Err(failure) => {
            warn!(source = name, elapsed_ms, error = %failure, "Source degraded");
            R::degraded(&failure)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Fixed<R>(R);

    #[async_trait]
    impl<R> Source for Fixed<R>
    where
        R: Degrade + Clone + Send + Sync + 'static,
    {
        type Record = R;

        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn fetch(&self) -> Result<R, SourceFailure> {
            Ok(self.0.clone())
        }
    }

    struct Failing<R> {
        failure: SourceFailure,
        _record: std::marker::PhantomData<fn() -> R>,
    }

    fn failing<R>(failure: SourceFailure) -> Failing<R> {
        Failing {
            failure,
            _record: std::marker::PhantomData,
        }
    }

    #[async_trait]
    impl<R> Source for Failing<R>
    where
        R: Degrade + Send + 'static,
    {
        type Record = R;

        fn name(&self) -> &'static str {
            "failing"
        }

        async fn fetch(&self) -> Result<R, SourceFailure> {
            Err(self.failure.clone())
        }
    }

    struct Hanging;

    #[async_trait]
    impl Source for Hanging {
        type Record = WeatherReading;

        fn name(&self) -> &'static str {
            "hanging"
        }

        async fn fetch(&self) -> Result<WeatherReading, SourceFailure> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(weather())
        }
    }

    struct Panicking;

    #[async_trait]
    impl Source for Panicking {
        type Record = TodoSummary;

        fn name(&self) -> &'static str {
            "panicking"
        }

        async fn fetch(&self) -> Result<TodoSummary, SourceFailure> {
            panic!("todo backend exploded");
        }
    }

    fn mail() -> MailStatus {
        MailStatus {
            unread: 3,
            latest_subject: "Invoice".to_string(),
        }
    }

    fn event() -> CalendarEvent {
        CalendarEvent {
            summary: "Standup".to_string(),
            start: "2026-10-16T09:00:00Z".to_string(),
            location: "Room 4".to_string(),
        }
    }

    fn weather() -> WeatherReading {
        WeatherReading {
            temp: Some(5.4),
            description: "Overcast".to_string(),
        }
    }

    fn todos() -> TodoSummary {
        TodoSummary {
            count: 2,
            top: "Water plants".to_string(),
        }
    }

    fn healthy() -> Aggregator {
        Aggregator::new(
            Arc::new(Fixed(mail())),
            Arc::new(Fixed(event())),
            Arc::new(Fixed(weather())),
            Arc::new(Fixed(todos())),
        )
    }

    #[tokio::test]
    async fn test_all_sources_healthy() {
        let snapshot = healthy().aggregate().await;

        assert_eq!(snapshot.email, mail());
        assert_eq!(snapshot.calendar, event());
        assert_eq!(snapshot.weather, weather());
        assert_eq!(snapshot.todos, todos());
    }

    #[tokio::test]
    async fn test_one_failure_does_not_affect_others() {
        let aggregator = Aggregator::new(
            Arc::new(failing(SourceFailure::Auth("token revoked".into()))),
            Arc::new(Fixed(event())),
            Arc::new(Fixed(weather())),
            Arc::new(Fixed(todos())),
        );

        let snapshot = aggregator.aggregate().await;

        assert_eq!(snapshot.email.unread, -1);
        assert_eq!(snapshot.email.latest_subject, "Mail error: auth");
        assert_eq!(snapshot.calendar, event());
        assert_eq!(snapshot.weather, weather());
        assert_eq!(snapshot.todos, todos());
    }

    #[tokio::test]
    async fn test_all_sources_failing_still_yields_full_snapshot() {
        let aggregator = Aggregator::new(
            Arc::new(failing(SourceFailure::Timeout)),
            Arc::new(failing(SourceFailure::Http(500))),
            Arc::new(failing(SourceFailure::Http(503))),
            Arc::new(failing(SourceFailure::Parse("bad".into()))),
        );

        let snapshot = aggregator.aggregate().await;

        assert_eq!(snapshot.email.latest_subject, "Mail error: timeout");
        assert_eq!(snapshot.calendar.summary, "Cal HTTP error: 500");
        assert_eq!(snapshot.weather.temp, None);
        assert_eq!(snapshot.weather.description, "Wea HTTP error: 503");
        assert_eq!(snapshot.todos.count, -1);
    }

    #[tokio::test]
    async fn test_slow_source_is_cut_off_by_timeout() {
        let aggregator = Aggregator::new(
            Arc::new(Fixed(mail())),
            Arc::new(Fixed(event())),
            Arc::new(Hanging),
            Arc::new(Fixed(todos())),
        )
        .with_timeout(Duration::from_millis(50));

        let started = Instant::now();
        let snapshot = aggregator.aggregate().await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(snapshot.weather.description, "Wea error: timeout");
        assert_eq!(snapshot.email, mail());
    }

    #[tokio::test]
    async fn test_panicking_source_is_isolated() {
        let aggregator = Aggregator::new(
            Arc::new(Fixed(mail())),
            Arc::new(Fixed(event())),
            Arc::new(Fixed(weather())),
            Arc::new(Panicking),
        );

        let snapshot = aggregator.aggregate().await;

        assert_eq!(snapshot.todos.count, -1);
        assert_eq!(snapshot.todos.top, "Todo error: internal");
        assert_eq!(snapshot.weather, weather());
    }
}
