//! CivicSense core data models.
//!
//! Reports, the department registry, login sessions and configuration.
//! Everything here is a plain value type; state changes return new
//! snapshots.

#![warn(missing_docs)]

mod id;
mod report;
mod registry;
mod session;
mod config;

pub use id::ReportId;
pub use report::{Category, Report, ReportError, Status, TimelineEntry, Urgency, UrgencyAnalysis};
pub use registry::{Availability, Department, FieldWorker, Registry, RegistryError, Staff};
pub use session::{Role, Session};
pub use config::{
    BoundingBox, Config, ConfigError, DuplicateConfig, GeocoderConfig, RoutingConfig,
    SimilarityWeights,
};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
