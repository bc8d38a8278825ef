//! Administrative actions on the stored report list.
//!
//! Every action is a read-modify-write of the whole list. Nothing is
//! written when an action fails.

use chrono::{DateTime, Local, Timelike, Utc};
use civic_core::{Registry, Report, ReportId, RoutingConfig, Status, Time};
use civic_storage::{KeyValueStore, ReportStore};
use civic_triage::{analyze, RoutingEngine};
use tracing::{debug, info, warn};

use crate::samples::sample_reports;
use crate::{DashboardError, Result};

/// What a dashboard load did.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    /// The full list after routing
    pub reports: Vec<Report>,

    /// How many reports were routed by this load
    pub routed: usize,

    /// Reports that needed routing but could not be routed
    pub unrouted: Vec<ReportId>,
}

fn route_pending(engine: &RoutingEngine<'_>, reports: Vec<Report>, now: DateTime<Local>) -> LoadOutcome {
    let mut routed = 0;
    let mut unrouted = Vec::new();

    let reports: Vec<Report> = reports
        .into_iter()
        .map(|report| {
            if report.is_routed() {
                return report;
            }
            debug!("Applying routing to report {}", report.id);
            match engine.route_at(&report, now) {
                Some(result) => {
                    routed += 1;
                    result.report
                }
                None => {
                    warn!("Report {} left unrouted", report.id);
                    unrouted.push(report.id.clone());
                    report
                }
            }
        })
        .collect();

    LoadOutcome { reports, routed, unrouted }
}

/// Load every report and route those without a department.
///
/// The list is written back only when at least one report was routed.
pub async fn load_and_route<S: KeyValueStore>(
    store: &mut ReportStore<S>,
    engine: &RoutingEngine<'_>,
    now: DateTime<Local>,
) -> Result<LoadOutcome> {
    let reports = store.load_all().await;
    info!("Loaded {} reports", reports.len());

    let outcome = route_pending(engine, reports, now);
    if outcome.routed > 0 {
        store.save_all(&outcome.reports).await?;
        info!("Routed {} reports", outcome.routed);
    }
    Ok(outcome)
}

/// On first use, store the routed sample reports. Returns `None` when the
/// store already holds reports.
pub async fn seed_samples<S: KeyValueStore>(
    store: &mut ReportStore<S>,
    engine: &RoutingEngine<'_>,
    now: DateTime<Local>,
) -> Result<Option<LoadOutcome>> {
    if !store.load_all().await.is_empty() {
        return Ok(None);
    }

    info!("No reports found, generating sample data");
    let outcome = route_pending(engine, sample_reports(), now);
    store.save_all(&outcome.reports).await?;
    Ok(Some(outcome))
}

async fn find<S: KeyValueStore>(store: &ReportStore<S>, id: &ReportId) -> Result<Report> {
    store.find(id).await.ok_or_else(|| DashboardError::NotFound(id.clone()))
}

/// Move a report forward to `status` and record who did it.
pub async fn update_status<S: KeyValueStore>(
    store: &mut ReportStore<S>,
    id: &ReportId,
    status: Status,
    at: Time,
) -> Result<Report> {
    let report = find(store, id).await?;
    let mut updated = report.transition(
        status,
        format!("Status updated to {} by administrator", status.label()),
        at,
    )?;
    updated.last_updated = Some(at);

    store.replace(&updated).await?;
    info!("Report {} status {} -> {}", id, report.status, status);
    Ok(updated)
}

/// Assign a field worker to a report.
///
/// The report moves to in-progress. A routed report only accepts staff of
/// its assigned department. The worker is marked busy in the returned
/// registry snapshot; `registry` itself is left as it was.
pub async fn assign_field_worker<S: KeyValueStore>(
    store: &mut ReportStore<S>,
    registry: &Registry,
    id: &ReportId,
    staff_id: &str,
    worker_id: &str,
    at: Time,
) -> Result<(Report, Registry)> {
    let report = find(store, id).await?;
    if let (Some(department), Some(staff)) = (&report.assigned_department, registry.staff(staff_id)) {
        if &staff.department != department {
            return Err(DashboardError::WrongDepartment {
                staff: staff_id.to_string(),
                department: department.clone(),
            });
        }
    }
    let next_registry = registry.with_worker_assigned(staff_id, worker_id, id)?;

    let description = match next_registry.field_worker(worker_id) {
        Some(fw) => format!("Assigned to field worker: {} ({})", fw.name, fw.location),
        None => format!("Assigned to field worker: {}", worker_id),
    };

    let mut updated = report.transition(Status::InProgress, description, at)?;
    updated.assigned_staff = Some(staff_id.to_string());
    updated.assigned_field_worker = Some(worker_id.to_string());
    updated.last_updated = Some(at);

    store.replace(&updated).await?;
    info!("Report {} assigned to field worker {}", id, worker_id);
    Ok((updated, next_registry))
}

/// Run urgency analysis on a report with photos and adopt its urgency.
pub async fn analyze_report<S: KeyValueStore>(
    store: &mut ReportStore<S>,
    id: &ReportId,
    config: &RoutingConfig,
    now: DateTime<Local>,
) -> Result<Report> {
    let report = find(store, id).await?;
    if report.photos.is_empty() {
        return Err(DashboardError::NoPhoto(id.clone()));
    }

    let analysis = analyze(&report.description, &report.category, config.is_off_hours(now.hour()));
    let mut updated = report;
    updated.urgency = analysis.detected_urgency;
    updated.urgency_analysis = Some(analysis);
    updated.last_updated = Some(now.with_timezone(&Utc));

    store.replace(&updated).await?;
    info!("Report {} analyzed as {}", id, updated.urgency);
    Ok(updated)
}

/// Remove every report.
pub async fn clear_all<S: KeyValueStore>(store: &mut ReportStore<S>) -> Result<()> {
    store.clear().await?;
    info!("All reports cleared");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use civic_core::{Availability, Category, ReportError, Urgency};
    use civic_storage::MemoryStorage;

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 16, 12, 0, 0).unwrap()
    }

    fn report(id: &str, category: Category) -> Report {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        Report::new(ReportId::from(id), "Issue", "Something is off", category, at)
            .with_location("Somewhere", "23.5", "85.5")
            .with_photo("/photo.jpg", "photo.jpg")
    }

    async fn store_with(reports: &[Report]) -> ReportStore<MemoryStorage> {
        let mut store = ReportStore::new(MemoryStorage::new());
        store.save_all(reports).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_load_routes_only_unrouted() {
        let registry = Registry::seed();
        let config = RoutingConfig::default();
        let engine = RoutingEngine::new(&registry, &config);

        let mut already = report("R-2", Category::Other);
        already.assigned_department = Some("roads".into());
        let mut store = store_with(&[report("R-1", Category::WaterSanitation), already.clone()]).await;

        let outcome = load_and_route(&mut store, &engine, noon()).await.unwrap();
        assert_eq!(outcome.routed, 1);
        assert!(outcome.unrouted.is_empty());

        let stored = store.load_all().await;
        assert_eq!(stored[0].assigned_department.as_deref(), Some("water"));
        assert_eq!(stored[0].status, Status::Acknowledged);
        assert_eq!(stored[1], already);

        // Second load has nothing left to do
        let again = load_and_route(&mut store, &engine, noon()).await.unwrap();
        assert_eq!(again.routed, 0);
    }

    #[tokio::test]
    async fn test_load_with_empty_registry_keeps_reports() {
        let registry = Registry::default();
        let config = RoutingConfig::default();
        let engine = RoutingEngine::new(&registry, &config);
        let original = report("R-1", Category::Other);
        let mut store = store_with(&[original.clone()]).await;

        let outcome = load_and_route(&mut store, &engine, noon()).await.unwrap();
        assert_eq!(outcome.routed, 0);
        assert_eq!(outcome.unrouted, vec![ReportId::from("R-1")]);
        assert_eq!(store.load_all().await, vec![original]);
    }

    #[tokio::test]
    async fn test_seed_samples_only_when_empty() {
        let registry = Registry::seed();
        let config = RoutingConfig::default();
        let engine = RoutingEngine::new(&registry, &config);
        let mut store = ReportStore::new(MemoryStorage::new());

        let outcome = seed_samples(&mut store, &engine, noon()).await.unwrap().unwrap();
        assert_eq!(outcome.routed, 3);
        let stored = store.load_all().await;
        assert_eq!(stored.len(), 3);
        assert!(stored.iter().all(|r| r.is_routed()));

        assert!(seed_samples(&mut store, &engine, noon()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_status_forward_only() {
        let mut store = store_with(&[report("R-1", Category::Other)]).await;
        let id = ReportId::from("R-1");
        let at = Utc.with_ymd_and_hms(2024, 1, 16, 9, 0, 0).unwrap();

        let updated = update_status(&mut store, &id, Status::InProgress, at).await.unwrap();
        assert_eq!(updated.status, Status::InProgress);
        assert_eq!(updated.last_updated, Some(at));
        assert_eq!(updated.timeline.len(), 2);
        assert!(updated.check_invariants().is_ok());

        let err = update_status(&mut store, &id, Status::Acknowledged, at).await.unwrap_err();
        assert!(matches!(err, DashboardError::Report(ReportError::BackwardTransition { .. })));
        assert_eq!(store.find(&id).await.unwrap().status, Status::InProgress);
    }

    #[tokio::test]
    async fn test_assign_field_worker() {
        let registry = Registry::seed();
        let mut store = store_with(&[report("R-1", Category::RoadInfrastructure)]).await;
        let id = ReportId::from("R-1");

        let (updated, next) = assign_field_worker(&mut store, &registry, &id, "staff2", "fw3", Utc::now())
            .await
            .unwrap();
        assert_eq!(updated.status, Status::InProgress);
        assert_eq!(updated.assigned_field_worker.as_deref(), Some("fw3"));
        assert_eq!(
            updated.timeline.last().unwrap().description,
            "Assigned to field worker: Vikash Gupta (Zone C)"
        );
        assert_eq!(next.field_worker("fw3").unwrap().availability, Availability::Busy);
        assert!(registry.field_worker("fw3").unwrap().is_available());
    }

    #[tokio::test]
    async fn test_assign_offline_worker_writes_nothing() {
        let registry = Registry::seed();
        let original = report("R-1", Category::WaterSanitation);
        let mut store = store_with(&[original.clone()]).await;
        let result =
            assign_field_worker(&mut store, &registry, &original.id, "staff3", "fw5", Utc::now()).await;
        assert!(matches!(result, Err(DashboardError::Registry(_))));
        assert_eq!(store.load_all().await, vec![original]);
    }

    #[tokio::test]
    async fn test_assign_staff_outside_routed_department_rejected() {
        let registry = Registry::seed();
        let mut routed = report("R-1", Category::RoadInfrastructure);
        routed.assigned_department = Some("roads".into());
        let mut store = store_with(&[routed.clone()]).await;

        let result =
            assign_field_worker(&mut store, &registry, &routed.id, "staff3", "fw4", Utc::now()).await;
        assert!(matches!(
            result,
            Err(DashboardError::WrongDepartment { ref staff, ref department })
                if staff == "staff3" && department == "roads"
        ));
        assert_eq!(store.load_all().await, vec![routed.clone()]);

        let (updated, _) = assign_field_worker(&mut store, &registry, &routed.id, "staff2", "fw3", Utc::now())
            .await
            .unwrap();
        assert_eq!(updated.assigned_staff.as_deref(), Some("staff2"));
    }

    #[tokio::test]
    async fn test_analyze_report_overrides_urgency() {
        let mut leak = report("R-1", Category::PublicSafety);
        leak.description = "Gas leak with fire near school".into();
        let mut store = store_with(&[leak]).await;

        let analyzed = analyze_report(&mut store, &ReportId::from("R-1"), &RoutingConfig::default(), noon())
            .await
            .unwrap();
        assert_eq!(analyzed.urgency, Urgency::Critical);
        let stored = store.find(&ReportId::from("R-1")).await.unwrap();
        assert_eq!(stored.urgency_analysis.unwrap().detected_urgency, Urgency::Critical);
    }

    #[tokio::test]
    async fn test_analyze_without_photo_rejected() {
        let mut bare = report("R-1", Category::Other);
        bare.photos.clear();
        bare.photo_names.clear();
        let mut store = store_with(&[bare]).await;
        let err = analyze_report(&mut store, &ReportId::from("R-1"), &RoutingConfig::default(), noon())
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::NoPhoto(_)));
    }

    #[tokio::test]
    async fn test_clear_all() {
        let mut store = store_with(&[report("R-1", Category::Other)]).await;
        clear_all(&mut store).await.unwrap();
        assert!(store.load_all().await.is_empty());
    }
}
