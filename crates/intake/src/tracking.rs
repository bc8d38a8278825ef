//! Report tracking: lookup by id, simulated progress, and citizen rating.

use civic_core::{Report, ReportId, Time};
use civic_storage::{KeyValueStore, ReportStore};
use tracing::info;

use crate::{IntakeError, Result};

/// Find a report by the id the citizen typed. Surrounding whitespace is ignored.
pub async fn track<S: KeyValueStore>(store: &ReportStore<S>, id: &str) -> Option<Report> {
    store.find(&ReportId::from(id)).await
}

/// Move a report to its next status and persist it.
pub async fn advance<S: KeyValueStore>(
    store: &mut ReportStore<S>,
    id: &ReportId,
    at: Time,
) -> Result<Report> {
    let report = store.find(id).await.ok_or_else(|| IntakeError::NotFound(id.clone()))?;
    let next = report.advance(at)?;
    store.replace(&next).await?;
    info!("Report {} advanced to {}", id, next.status);
    Ok(next)
}

/// Rate a resolved report once.
pub async fn rate<S: KeyValueStore>(
    store: &mut ReportStore<S>,
    id: &ReportId,
    rating: u8,
    feedback: Option<String>,
) -> Result<Report> {
    let report = store.find(id).await.ok_or_else(|| IntakeError::NotFound(id.clone()))?;
    let rated = report.rate(rating, feedback)?;
    store.replace(&rated).await?;
    info!("Report {} rated {}/5", id, rating);
    Ok(rated)
}
