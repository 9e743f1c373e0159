//! Core types for deskhub.
//!
//! This crate provides the pieces shared by the server and the source providers:
//! - `status` records that make up the `/status` snapshot
//! - `failure` taxonomy for upstream errors and its placeholder mapping
//! - `source` contract implemented by every adapter
//! - `aggregator` that folds all sources into one snapshot
//! - `config` loaded from file and environment

pub mod aggregator;
pub mod config;
pub mod error;
pub mod failure;
pub mod source;
pub mod sources;
pub mod status;

pub use aggregator::Aggregator;
pub use error::{DeskhubError, DeskhubResult};
pub use failure::{Degrade, SourceFailure};
pub use source::Source;
pub use status::*;
