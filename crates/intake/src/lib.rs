//! Citizen-facing side of CivicSense.
//!
//! Submitting a report, finding an address for a map pin, logging in with a
//! phone number, and tracking or rating a submitted report.

pub mod geocode;
pub mod session;
pub mod submission;
pub mod tracking;

use civic_core::{ReportError, ReportId};
use civic_storage::StorageError;

pub use geocode::ReverseGeocoder;
pub use session::{login, logout, normalize_phone, validate_phone, current_session};
pub use submission::{submit, MediaFile, ReportDraft};
pub use tracking::{advance, rate, track};

/// Result type for intake operations.
pub type Result<T> = std::result::Result<T, IntakeError>;

/// Errors raised by intake operations. Nothing is written when one is returned.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    /// A required text field is empty
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Category key outside the fixed list
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// No photo attached
    #[error("at least one photo is required")]
    NoPhoto,

    /// No map location picked
    #[error("a location must be selected on the map")]
    NoLocation,

    /// Coordinates do not parse as numbers
    #[error("invalid coordinates: {0}, {1}")]
    InvalidCoordinates(String, String),

    /// Phone number fails validation
    #[error("invalid mobile number: {0}")]
    InvalidPhone(String),

    /// The report does not exist
    #[error("report not found: {0}")]
    NotFound(ReportId),

    /// A report state change was rejected
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Storage failure
    #[error(transparent)]
    Storage(#[from] StorageError),
}
