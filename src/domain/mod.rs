//! Core domain layer. No external I/O dependencies.
//!
//! Entities, the key pool, the offline fallback, reply parsing and statistics live here.
//! Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod fallback;
pub mod key_pool;
pub mod response;
pub mod statistics;

pub use entities::{
    ClassificationRequest, ClassificationResult, NewReport, Origin, ReportQuery, ReportRecord,
};
pub use errors::DomainError;
pub use key_pool::{ApiKey, KeyPool};
pub use statistics::{ConfidenceDistribution, ConfidenceStats, StatCount, StatisticsSnapshot};
