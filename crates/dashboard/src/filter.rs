//! Report list search and filters.

use civic_core::{Category, Report, Status};

/// Search text plus optional status and category filters. All set criteria
/// must match.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    /// Case-insensitive substring of title, id or address
    pub search: Option<String>,
    pub status: Option<Status>,
    pub category: Option<Category>,
}

impl ReportFilter {
    pub fn matches(&self, report: &Report) -> bool {
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            let hit = report.title.to_lowercase().contains(&term)
                || report.id.as_str().to_lowercase().contains(&term)
                || report.address.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }

        self.status.map_or(true, |s| report.status == s)
            && self.category.as_ref().map_or(true, |c| &report.category == c)
    }

    /// Matching reports, in input order.
    pub fn apply(&self, reports: &[Report]) -> Vec<Report> {
        reports.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}
