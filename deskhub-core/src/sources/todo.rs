//! Todo source.
//!
//! There is no todo backend wired up yet, so this returns a fixed summary.
//! A Notion-backed source can replace it without touching the aggregator,
//! using the reserved `TodoConfig` keys.

use async_trait::async_trait;

use crate::config::TodoConfig;
use crate::failure::SourceFailure;
use crate::source::Source;
use crate::status::TodoSummary;

#[derive(Debug, Clone)]
pub struct PlaceholderTodos {
    summary: TodoSummary,
}

impl PlaceholderTodos {
    pub fn new(_config: &TodoConfig) -> Self {
        PlaceholderTodos {
            summary: TodoSummary {
                count: 2,
                top: "Finish ESP32 dashboard".to_string(),
            },
        }
    }
}

#[async_trait]
impl Source for PlaceholderTodos {
    type Record = TodoSummary;

    fn name(&self) -> &'static str {
        "todo"
    }

    async fn fetch(&self) -> Result<TodoSummary, SourceFailure> {
        Ok(self.summary.clone())
    }
}
