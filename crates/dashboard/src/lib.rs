//! Administrator side of CivicSense.
//!
//! Loading and auto-routing the report list, status changes and field-worker
//! assignment, analytics over the report set, filtering and CSV export.

pub mod actions;
pub mod export;
pub mod filter;
pub mod samples;
pub mod stats;

use civic_core::{RegistryError, ReportError, ReportId};
use civic_storage::StorageError;

pub use actions::{
    analyze_report, assign_field_worker, clear_all, load_and_route, seed_samples, update_status,
    LoadOutcome,
};
pub use export::{default_file_name, export_csv, export_csv_file, CSV_HEADERS};
pub use filter::ReportFilter;
pub use samples::sample_reports;
pub use stats::{
    category_distribution, kpis, monthly_trends, status_distribution, CategoryStats, Kpis,
    MonthlyTrend, StatusCount,
};

/// Result type for dashboard operations.
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Errors from dashboard operations.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// The report does not exist
    #[error("report not found: {0}")]
    NotFound(ReportId),

    /// Urgency analysis needs at least one photo
    #[error("report {0} has no photo to analyze")]
    NoPhoto(ReportId),

    /// A report state change was rejected
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Staff member belongs to a different department than the report
    #[error("staff {staff} is not part of department {department}")]
    WrongDepartment { staff: String, department: String },

    /// Staff or field worker lookup failed
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Storage failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// CSV encoding failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File write failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
