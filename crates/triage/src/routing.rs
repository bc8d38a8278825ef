//! Rule-based report routing.
//!
//! Maps a report onto a department, a staff member and (when one is free)
//! a field worker, and scores its priority. The engine is a pure function of
//! the report, the injected [`Registry`] and the clock; persisting the result
//! is the caller's job.

use chrono::{DateTime, Local, Timelike, Utc};
use civic_core::{
    Category, Department, FieldWorker, Registry, Report, RoutingConfig, Staff, Status, Urgency,
};
use tracing::{debug, info, warn};

use crate::keywords::{hits, ROUTING_CRITICAL, ROUTING_HIGH};

/// Keyword → department-category labels, tried in order when no department
/// serves the canonical label directly.
const FUZZY_TABLE: &[(&str, &[&str])] = &[
    ("roadinfrastructure", &["Road & Infrastructure", "Traffic & Transportation"]),
    ("watersanitation", &["Water & Sanitation"]),
    ("wastemanagement", &["Waste Management"]),
    ("streetlighting", &["Street Lighting"]),
    ("publicsafety", &["Public Safety"]),
    ("parksrecreation", &["Parks & Recreation"]),
    ("traffictransportation", &["Traffic & Transportation"]),
    ("road", &["Road & Infrastructure", "Traffic & Transportation"]),
    ("water", &["Water & Sanitation"]),
    ("waste", &["Waste Management"]),
    ("light", &["Street Lighting"]),
    ("lighting", &["Street Lighting"]),
    ("safety", &["Public Safety"]),
    ("park", &["Parks & Recreation"]),
    ("traffic", &["Traffic & Transportation"]),
    ("infrastructure", &["Road & Infrastructure"]),
    ("sanitation", &["Water & Sanitation"]),
    ("management", &["Waste Management"]),
    ("recreation", &["Parks & Recreation"]),
    ("transportation", &["Traffic & Transportation"]),
];

/// Substrings → department id, used when neither lookup finds a department.
const FALLBACK_TABLE: &[(&[&str], &str)] = &[
    (&["safety", "emergency"], "safety"),
    (&["road", "infrastructure"], "roads"),
    (&["water", "sanitation"], "water"),
    (&["street", "lighting"], "utilities"),
    (&["traffic", "transportation"], "roads"),
    (&["waste", "management"], "water"),
    (&["parks", "recreation"], "utilities"),
];

/// Department of last resort.
const DEFAULT_DEPARTMENT: &str = "safety";

/// Outcome of routing one report.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingResult {
    /// The routed report: assignment fields set, status acknowledged, one
    /// timeline entry appended
    pub report: Report,

    /// Assigned department id
    pub department_id: String,

    /// Assigned staff id
    pub staff_id: String,

    /// Assigned field worker id, when one was available
    pub field_worker_id: Option<String>,

    /// Urgency after escalation; unchanged on the fallback path
    pub urgency: Urgency,

    /// Priority score, not computed on the fallback path
    pub priority_score: Option<u32>,

    /// Human-readable justification
    pub reason: String,

    /// Whether the fallback table was used (needs manual review)
    pub fallback: bool,
}

/// Priority score and escalated urgency for a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Priority {
    pub score: u32,
    pub urgency: Urgency,
}

/// Routing engine over an injected registry.
pub struct RoutingEngine<'a> {
    registry: &'a Registry,
    config: &'a RoutingConfig,
}

impl<'a> RoutingEngine<'a> {
    /// Create an engine.
    pub fn new(registry: &'a Registry, config: &'a RoutingConfig) -> Self {
        Self { registry, config }
    }

    /// Route using the current local time.
    pub fn route(&self, report: &Report) -> Option<RoutingResult> {
        self.route_at(report, Local::now())
    }

    /// Route as if at `now`. Returns `None` only when no department in the
    /// registry has any staff.
    pub fn route_at(&self, report: &Report, now: DateTime<Local>) -> Option<RoutingResult> {
        debug!("Auto-routing report {} (category {})", report.id, report.category);

        let priority = self.priority(report, now.hour());
        let at = now.with_timezone(&Utc);

        if let Some(department) = self.find_department(&report.category) {
            if let Some(result) = self.assign(report, department, priority, at) {
                info!(
                    "Report {} routed to {} for category {}",
                    report.id,
                    department.name,
                    report.category.label()
                );
                return Some(result);
            }
        }

        match self.fallback(report, at) {
            Some(result) => {
                info!("Report {} fallback-routed to {}", report.id, result.department_id);
                Some(result)
            }
            None => {
                warn!("Failed to route report {}: no suitable department", report.id);
                None
            }
        }
    }

    /// Department serving the category, by exact label then by keyword.
    pub fn find_department(&self, category: &Category) -> Option<&'a Department> {
        let label = category.label();
        let registry = self.registry;
        let staffed = || registry.departments.iter().filter(|d| !d.staff.is_empty());

        if let Some(department) = staffed().find(|d| d.serves(label)) {
            return Some(department);
        }

        let key_lower = category.key().to_lowercase();
        let label_lower = label.to_lowercase();
        for (keyword, labels) in FUZZY_TABLE {
            if !key_lower.contains(keyword) && !label_lower.contains(keyword) {
                continue;
            }
            if let Some(department) = staffed().find(|d| labels.iter().any(|l| d.serves(l))) {
                debug!("Matched category via keyword {:?} to {}", keyword, department.name);
                return Some(department);
            }
        }
        None
    }

    /// Score a report and escalate its urgency. `hour` is the local hour.
    pub fn priority(&self, report: &Report, hour: u32) -> Priority {
        let text = format!("{} {}", report.description, report.title).to_lowercase();
        let mut score = 0;
        let mut urgency = report.urgency;

        let critical = hits(&text, ROUTING_CRITICAL);
        if !critical.is_empty() {
            score += 10 * critical.len() as u32;
            urgency = urgency.escalate(Urgency::Critical);
        }

        let high = hits(&text, ROUTING_HIGH);
        if !high.is_empty() {
            score += 5 * high.len() as u32;
            urgency = urgency.escalate(Urgency::High);
        }

        if report.category.is_critical() {
            score += 5;
            urgency = urgency.escalate(Urgency::Medium);
        } else if report.category.is_high_priority() {
            score += 3;
        }

        if self.config.is_off_hours(hour) {
            score += 2;
        }

        if let Some((lat, lng)) = report.coordinates() {
            if self.config.city_center.contains(lat, lng) {
                score += 2;
            }
        }

        Priority { score, urgency }
    }

    fn assign(
        &self,
        report: &Report,
        department: &Department,
        priority: Priority,
        at: DateTime<Utc>,
    ) -> Option<RoutingResult> {
        let staff = select_staff(department)?;
        let worker = staff.first_available_worker();
        let label = report.category.label();

        let field_note = worker
            .map(|fw| format!(" (Field: {} - {})", fw.name, fw.location))
            .unwrap_or_default();
        let entry = format!(
            "Auto-routed to {} - {} Priority (Score: {}) - Category: {} - Assigned to {}{} - Current workload: {} tasks",
            department.name,
            priority.urgency.as_str().to_uppercase(),
            priority.score,
            label,
            staff.name,
            field_note,
            staff.active_tasks,
        );
        let reason = format!(
            "Routed to {} based on category \"{}\" (Priority: {}, Staff workload: {})",
            department.name, label, priority.score, staff.active_tasks,
        );

        Some(build_result(report, department, staff, worker, Some(priority), reason, entry, at, false))
    }

    /// Department and staff only. Urgency and priority are left for the
    /// manual review.
    fn fallback(&self, report: &Report, at: DateTime<Utc>) -> Option<RoutingResult> {
        let key = report.category.key().to_lowercase();
        let label = report.category.label().to_lowercase();

        let preferred = FALLBACK_TABLE
            .iter()
            .find(|(needles, _)| needles.iter().any(|n| key.contains(n) || label.contains(n)))
            .map(|(_, id)| *id)
            .unwrap_or(DEFAULT_DEPARTMENT);

        let staffed = |id: &str| self.registry.department(id).filter(|d| !d.staff.is_empty());
        let department = staffed(preferred)
            .or_else(|| staffed(DEFAULT_DEPARTMENT))
            .or_else(|| self.registry.departments.iter().find(|d| !d.staff.is_empty()))?;

        let staff = department.staff.iter().min_by_key(|s| s.active_tasks)?;

        let entry = format!(
            "Fallback routing to {} - Category \"{}\" mapped via fallback table - Assigned to {} ({} active tasks)",
            department.name,
            report.category.key(),
            staff.name,
            staff.active_tasks,
        );
        let reason = format!(
            "Fallback routing to {} for category \"{}\" - requires manual review",
            department.name,
            report.category.key(),
        );

        Some(build_result(report, department, staff, None, None, reason, entry, at, true))
    }
}

/// Staff with a free field worker, fewest active tasks first, then most free
/// workers. Falls back to the first staff member.
fn select_staff(department: &Department) -> Option<&Staff> {
    department
        .staff
        .iter()
        .filter(|s| s.available_workers() > 0)
        .min_by(|a, b| {
            a.active_tasks
                .cmp(&b.active_tasks)
                .then_with(|| b.available_workers().cmp(&a.available_workers()))
        })
        .or_else(|| department.staff.first())
}

#[allow(clippy::too_many_arguments)]
fn build_result(
    report: &Report,
    department: &Department,
    staff: &Staff,
    worker: Option<&FieldWorker>,
    priority: Option<Priority>,
    reason: String,
    entry: String,
    at: DateTime<Utc>,
    fallback: bool,
) -> RoutingResult {
    // Never move backwards: a report already past acknowledged keeps its status.
    let status = report.status.max(Status::Acknowledged);
    let mut routed = report
        .transition(status, entry, at)
        .unwrap_or_else(|_| report.clone());

    if let Some(priority) = priority {
        routed.urgency = priority.urgency;
        routed.priority_score = Some(priority.score);
    }
    routed.assigned_department = Some(department.id.clone());
    routed.assigned_staff = Some(staff.id.clone());
    routed.assigned_field_worker = worker.map(|fw| fw.id.clone());
    routed.routed_at = Some(at);
    routed.routing_reason = Some(reason.clone());

    RoutingResult {
        urgency: routed.urgency,
        priority_score: routed.priority_score,
        report: routed,
        department_id: department.id.clone(),
        staff_id: staff.id.clone(),
        field_worker_id: worker.map(|fw| fw.id.clone()),
        reason,
        fallback,
    }
}

/// Route with the default routing settings at the current local time.
pub fn route(report: &Report, registry: &Registry) -> Option<RoutingResult> {
    let config = RoutingConfig::default();
    RoutingEngine::new(registry, &config).route(report)
}
