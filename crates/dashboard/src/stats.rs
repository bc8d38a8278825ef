//! Dashboard analytics: headline KPIs and chart series.

use civic_core::{Category, Report, Status};
use serde::Serialize;

/// Headline counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub total: usize,
    pub resolved: usize,
    pub in_progress: usize,
    /// Submitted or acknowledged
    pub pending: usize,
}

/// Per-category counts, split by status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub category: Category,
    pub count: usize,
    pub resolved: usize,
    pub pending: usize,
    pub in_progress: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: Status,
    pub count: usize,
}

/// Submissions and resolutions in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTrend {
    /// `January 2024`
    pub month: String,
    pub reports: usize,
    pub resolved: usize,
}

pub fn kpis(reports: &[Report]) -> Kpis {
    reports.iter().fold(Kpis { total: reports.len(), ..Default::default() }, |mut k, r| {
        match r.status {
            Status::Resolved => k.resolved += 1,
            Status::InProgress => k.in_progress += 1,
            Status::Submitted | Status::Acknowledged => k.pending += 1,
        }
        k
    })
}

/// Categories in order of first appearance.
pub fn category_distribution(reports: &[Report]) -> Vec<CategoryStats> {
    let mut stats: Vec<CategoryStats> = Vec::new();
    for report in reports {
        let idx = match stats.iter().position(|s| s.category == report.category) {
            Some(idx) => idx,
            None => {
                stats.push(CategoryStats {
                    category: report.category.clone(),
                    count: 0,
                    resolved: 0,
                    pending: 0,
                    in_progress: 0,
                });
                stats.len() - 1
            }
        };

        let entry = &mut stats[idx];
        entry.count += 1;
        match report.status {
            Status::Resolved => entry.resolved += 1,
            Status::InProgress => entry.in_progress += 1,
            Status::Submitted | Status::Acknowledged => entry.pending += 1,
        }
    }
    stats
}

/// Statuses in order of first appearance; statuses with no reports are omitted.
pub fn status_distribution(reports: &[Report]) -> Vec<StatusCount> {
    let mut counts: Vec<StatusCount> = Vec::new();
    for report in reports {
        match counts.iter_mut().find(|c| c.status == report.status) {
            Some(c) => c.count += 1,
            None => counts.push(StatusCount { status: report.status, count: 1 }),
        }
    }
    counts
}

/// Months in order of first appearance, keyed on the UTC submission date.
pub fn monthly_trends(reports: &[Report]) -> Vec<MonthlyTrend> {
    let mut trends: Vec<MonthlyTrend> = Vec::new();
    for report in reports {
        let month = report.submitted_at.format("%B %Y").to_string();
        let resolved = usize::from(report.status == Status::Resolved);
        match trends.iter_mut().find(|t| t.month == month) {
            Some(t) => {
                t.reports += 1;
                t.resolved += resolved;
            }
            None => trends.push(MonthlyTrend { month, reports: 1, resolved }),
        }
    }
    trends
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use civic_core::ReportId;

    fn report(id: &str, category: Category, month: u32, status: Status) -> Report {
        let at = Utc.with_ymd_and_hms(2024, month, 10, 12, 0, 0).unwrap();
        let mut r = Report::new(ReportId::from(id), "t", "d", category, at);
        if status != Status::Submitted {
            r = r.transition(status, "moved", at).unwrap();
        }
        r
    }

    fn fixture() -> Vec<Report> {
        vec![
            report("R-1", Category::RoadInfrastructure, 1, Status::Submitted),
            report("R-2", Category::WaterSanitation, 1, Status::Resolved),
            report("R-3", Category::RoadInfrastructure, 2, Status::InProgress),
            report("R-4", Category::RoadInfrastructure, 2, Status::Acknowledged),
        ]
    }

    #[test]
    fn test_kpis() {
        assert_eq!(
            kpis(&fixture()),
            Kpis { total: 4, resolved: 1, in_progress: 1, pending: 2 }
        );
        assert_eq!(kpis(&[]), Kpis::default());
    }

    #[test]
    fn test_category_distribution() {
        let stats = category_distribution(&fixture());
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].category, Category::RoadInfrastructure);
        assert_eq!((stats[0].count, stats[0].pending, stats[0].in_progress), (3, 2, 1));
        assert_eq!((stats[1].count, stats[1].resolved), (1, 1));
    }

    #[test]
    fn test_status_distribution_first_seen_order() {
        let counts = status_distribution(&fixture());
        let statuses: Vec<Status> = counts.iter().map(|c| c.status).collect();
        assert_eq!(
            statuses,
            vec![Status::Submitted, Status::Resolved, Status::InProgress, Status::Acknowledged]
        );
        assert!(counts.iter().all(|c| c.count == 1));
    }

    #[test]
    fn test_monthly_trends() {
        let trends = monthly_trends(&fixture());
        assert_eq!(
            trends,
            vec![
                MonthlyTrend { month: "January 2024".into(), reports: 2, resolved: 1 },
                MonthlyTrend { month: "February 2024".into(), reports: 2, resolved: 0 },
            ]
        );
    }
}
