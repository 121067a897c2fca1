//! Application use cases. Orchestrate domain logic via ports.

pub mod classification_client;
pub mod detection_service;
pub mod report_service;

pub use classification_client::{ClassificationClient, RetryPolicy};
pub use detection_service::{Detection, DetectionService};
pub use report_service::ReportService;
