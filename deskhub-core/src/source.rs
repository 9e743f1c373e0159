//! The contract every upstream adapter implements.

use async_trait::async_trait;

use crate::failure::{Degrade, SourceFailure};

/// One upstream data source.
///
/// `fetch` reports failures as a typed `SourceFailure`; turning that into a
/// placeholder record is left to the aggregator via `Degrade`.
#[async_trait]
pub trait Source: Send + Sync {
    type Record: Degrade + Send + 'static;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn fetch(&self) -> Result<Self::Record, SourceFailure>;
}
