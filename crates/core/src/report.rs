//! Report model - a single citizen-submitted civic issue.

use serde::{Deserialize, Serialize};

use crate::id::ReportId;
use crate::Time;

/// Issue category.
///
/// Known categories serialize to the keys used by the intake form. Keys
/// that are not recognised are kept as [`Category::Custom`] so they can
/// still be routed through the fallback table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    RoadInfrastructure,
    WaterSanitation,
    WasteManagement,
    StreetLighting,
    PublicSafety,
    ParksRecreation,
    TrafficTransportation,
    Other,
    /// Unrecognised key, stored verbatim.
    Custom(String),
}

impl Category {
    /// Every known category in form order.
    pub const ALL: [Category; 8] = [
        Category::RoadInfrastructure,
        Category::WaterSanitation,
        Category::WasteManagement,
        Category::StreetLighting,
        Category::PublicSafety,
        Category::ParksRecreation,
        Category::TrafficTransportation,
        Category::Other,
    ];

    /// The storage key (`roadInfrastructure`, ...).
    pub fn key(&self) -> &str {
        match self {
            Category::RoadInfrastructure => "roadInfrastructure",
            Category::WaterSanitation => "waterSanitation",
            Category::WasteManagement => "wasteManagement",
            Category::StreetLighting => "streetLighting",
            Category::PublicSafety => "publicSafety",
            Category::ParksRecreation => "parksRecreation",
            Category::TrafficTransportation => "trafficTransportation",
            Category::Other => "other",
            Category::Custom(key) => key,
        }
    }

    /// Canonical department-category label. Custom keys map to themselves.
    pub fn label(&self) -> &str {
        match self {
            Category::RoadInfrastructure => "Road & Infrastructure",
            Category::WaterSanitation => "Water & Sanitation",
            Category::WasteManagement => "Waste Management",
            Category::StreetLighting => "Street Lighting",
            Category::PublicSafety => "Public Safety",
            Category::ParksRecreation => "Parks & Recreation",
            Category::TrafficTransportation => "Traffic & Transportation",
            Category::Other => "Other",
            Category::Custom(key) => key,
        }
    }

    /// Public safety and water are treated as critical categories.
    pub fn is_critical(&self) -> bool {
        matches!(self, Category::PublicSafety | Category::WaterSanitation)
    }

    /// Roads, traffic and street lighting are high-priority categories.
    pub fn is_high_priority(&self) -> bool {
        matches!(
            self,
            Category::RoadInfrastructure | Category::TrafficTransportation | Category::StreetLighting
        )
    }
}

impl From<String> for Category {
    fn from(key: String) -> Self {
        Category::ALL
            .iter()
            .find(|c| c.key() == key)
            .cloned()
            .unwrap_or(Category::Custom(key))
    }
}

impl From<&str> for Category {
    fn from(key: &str) -> Self {
        Category::from(key.to_string())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Custom(key) => key,
            other => other.key().to_string(),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Ordinal severity of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl Urgency {
    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
            Urgency::Critical => "critical",
        }
    }

    /// Raise to `other` if it is more severe. Never lowers.
    pub fn escalate(self, other: Urgency) -> Urgency {
        self.max(other)
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Urgency {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Urgency::Low),
            "medium" => Ok(Urgency::Medium),
            "high" => Ok(Urgency::High),
            "critical" => Ok(Urgency::Critical),
            other => Err(ReportError::UnknownUrgency(other.to_string())),
        }
    }
}

/// Report lifecycle status. Moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Submitted,
    Acknowledged,
    InProgress,
    Resolved,
}

impl Status {
    /// Every status in lifecycle order.
    pub const ALL: [Status; 4] = [
        Status::Submitted,
        Status::Acknowledged,
        Status::InProgress,
        Status::Resolved,
    ];

    /// Wire name (`in-progress`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Submitted => "submitted",
            Status::Acknowledged => "acknowledged",
            Status::InProgress => "in-progress",
            Status::Resolved => "resolved",
        }
    }

    /// Human label.
    pub fn label(&self) -> &'static str {
        match self {
            Status::Submitted => "Submitted",
            Status::Acknowledged => "Acknowledged",
            Status::InProgress => "In Progress",
            Status::Resolved => "Resolved",
        }
    }

    /// Default timeline text for reaching this status.
    pub fn description(&self) -> &'static str {
        match self {
            Status::Submitted => "Report has been submitted and is awaiting review",
            Status::Acknowledged => "Report has been reviewed and acknowledged by authorities",
            Status::InProgress => "Work has begun to address the reported issue",
            Status::Resolved => "Issue has been successfully resolved",
        }
    }

    /// The following status, if any.
    pub fn next(&self) -> Option<Status> {
        match self {
            Status::Submitted => Some(Status::Acknowledged),
            Status::Acknowledged => Some(Status::InProgress),
            Status::InProgress => Some(Status::Resolved),
            Status::Resolved => None,
        }
    }

    /// Submitted or acknowledged.
    pub fn is_pending(&self) -> bool {
        matches!(self, Status::Submitted | Status::Acknowledged)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "submitted" => Ok(Status::Submitted),
            "acknowledged" => Ok(Status::Acknowledged),
            "in-progress" | "in_progress" | "inprogress" => Ok(Status::InProgress),
            "resolved" => Ok(Status::Resolved),
            other => Err(ReportError::UnknownStatus(other.to_string())),
        }
    }
}

/// One entry of the append-only report timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Status reached
    pub status: Status,

    /// When it was reached
    pub timestamp: Time,

    /// Human-readable note
    pub description: String,
}

/// Result of the keyword-based urgency analysis step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrgencyAnalysis {
    /// Urgency the analysis settled on
    pub detected_urgency: Urgency,

    /// Confidence in 0.0..=0.99
    pub confidence: f64,

    /// Why
    pub reasoning: String,

    /// Summary of the visual assessment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_analysis: Option<String>,
}

/// Errors raised by report state changes and validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReportError {
    #[error("cannot move report from {from} back to {to}")]
    BackwardTransition { from: Status, to: Status },

    #[error("report is already resolved")]
    AlreadyResolved,

    #[error("report must be resolved before it can be rated (status: {0})")]
    NotResolved(Status),

    #[error("report has already been rated")]
    AlreadyRated,

    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("report timeline is empty")]
    EmptyTimeline,

    #[error("report timeline must start with submitted, found {0}")]
    TimelineStart(Status),

    #[error("report timeline timestamps go backwards at entry {0}")]
    TimelineOrder(usize),

    #[error("report status {status} does not match last timeline entry {last}")]
    StatusMismatch { status: Status, last: Status },

    #[error("unknown urgency: {0}")]
    UnknownUrgency(String),

    #[error("unknown status: {0}")]
    UnknownStatus(String),
}

/// A citizen-submitted civic issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Unique identifier
    pub id: ReportId,

    /// Short title
    pub title: String,

    /// Full description
    pub description: String,

    /// Issue category
    pub category: Category,

    /// Current urgency
    #[serde(default)]
    pub urgency: Urgency,

    /// Free-text address
    #[serde(default)]
    pub address: String,

    /// Latitude, numeric-as-string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,

    /// Longitude, numeric-as-string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,

    /// Photo references (data URIs or paths)
    #[serde(default)]
    pub photos: Vec<String>,

    /// Photo file names, parallel to `photos`
    #[serde(default)]
    pub photo_names: Vec<String>,

    /// Video references
    #[serde(default)]
    pub videos: Vec<String>,

    /// Video file names, parallel to `videos`
    #[serde(default)]
    pub video_names: Vec<String>,

    /// Current status, always equal to the last timeline entry
    pub status: Status,

    /// Submission channel (web, mobile app, phone call)
    #[serde(default)]
    pub channel: String,

    /// When submitted
    pub submitted_at: Time,

    /// Last administrative update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<Time>,

    /// Status history
    pub timeline: Vec<TimelineEntry>,

    // === Routing ===
    /// Assigned department id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_department: Option<String>,

    /// Assigned staff id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_staff: Option<String>,

    /// Assigned field worker id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_field_worker: Option<String>,

    /// When routed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routed_at: Option<Time>,

    /// Routing justification
    #[serde(default, alias = "aiRoutingReason", skip_serializing_if = "Option::is_none")]
    pub routing_reason: Option<String>,

    /// Routing priority score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_score: Option<u32>,

    /// Last urgency analysis
    #[serde(default, alias = "aiUrgencyAnalysis", skip_serializing_if = "Option::is_none")]
    pub urgency_analysis: Option<UrgencyAnalysis>,

    // === Duplicate overlay ===
    /// Duplicate group id (`group_<mainId>`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate_group: Option<String>,

    /// Whether this report duplicates another
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_duplicate: bool,

    /// Main report of the group, for duplicates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_report_id: Option<ReportId>,

    /// Group size, for main reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate_count: Option<usize>,

    // === Citizen feedback ===
    /// Rating 1-5
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,

    /// Feedback text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl Report {
    /// Create a freshly submitted report with a single `submitted` timeline entry.
    pub fn new(
        id: ReportId,
        title: impl Into<String>,
        description: impl Into<String>,
        category: Category,
        submitted_at: Time,
    ) -> Self {
        let entry = TimelineEntry {
            status: Status::Submitted,
            timestamp: submitted_at,
            description: format!(
                "Report submitted on {} at {}",
                submitted_at.format("%Y-%m-%d"),
                submitted_at.format("%H:%M:%S")
            ),
        };

        Self {
            id,
            title: title.into(),
            description: description.into(),
            category,
            urgency: Urgency::Low,
            address: String::new(),
            latitude: None,
            longitude: None,
            photos: Vec::new(),
            photo_names: Vec::new(),
            videos: Vec::new(),
            video_names: Vec::new(),
            status: Status::Submitted,
            channel: "web".to_string(),
            submitted_at,
            last_updated: None,
            timeline: vec![entry],
            assigned_department: None,
            assigned_staff: None,
            assigned_field_worker: None,
            routed_at: None,
            routing_reason: None,
            priority_score: None,
            urgency_analysis: None,
            duplicate_group: None,
            is_duplicate: false,
            original_report_id: None,
            duplicate_count: None,
            rating: None,
            feedback: None,
        }
    }

    /// Set urgency.
    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }

    /// Set address and coordinates.
    pub fn with_location(
        mut self,
        address: impl Into<String>,
        latitude: impl Into<String>,
        longitude: impl Into<String>,
    ) -> Self {
        self.address = address.into();
        self.latitude = Some(latitude.into());
        self.longitude = Some(longitude.into());
        self
    }

    /// Attach a photo.
    pub fn with_photo(mut self, reference: impl Into<String>, name: impl Into<String>) -> Self {
        self.photos.push(reference.into());
        self.photo_names.push(name.into());
        self
    }

    /// Attach a video.
    pub fn with_video(mut self, reference: impl Into<String>, name: impl Into<String>) -> Self {
        self.videos.push(reference.into());
        self.video_names.push(name.into());
        self
    }

    /// Set submission channel.
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// Replace the text of the initial timeline entry.
    pub fn with_submission_note(mut self, note: impl Into<String>) -> Self {
        if let Some(first) = self.timeline.first_mut() {
            first.description = note.into();
        }
        self
    }

    /// Parsed `(latitude, longitude)`, if both are present and finite.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = self.latitude.as_deref()?.trim().parse::<f64>().ok()?;
        let lng = self.longitude.as_deref()?.trim().parse::<f64>().ok()?;
        (lat.is_finite() && lng.is_finite()).then_some((lat, lng))
    }

    /// `title description`, the text scored by the classifier and detectors.
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }

    /// Whether a department has been assigned.
    pub fn is_routed(&self) -> bool {
        self.assigned_department.is_some()
    }

    /// Return a copy moved to `status` with one timeline entry appended.
    ///
    /// Staying on the same status is allowed (it still records an entry);
    /// moving backwards is not. The entry timestamp is clamped so the
    /// timeline never goes backwards.
    pub fn transition(
        &self,
        status: Status,
        description: impl Into<String>,
        at: Time,
    ) -> Result<Report, ReportError> {
        if status < self.status {
            return Err(ReportError::BackwardTransition { from: self.status, to: status });
        }

        let timestamp = match self.timeline.last() {
            Some(last) if last.timestamp > at => last.timestamp,
            _ => at,
        };

        let mut next = self.clone();
        next.status = status;
        next.timeline.push(TimelineEntry {
            status,
            timestamp,
            description: description.into(),
        });
        Ok(next)
    }

    /// Move to the next lifecycle status with its default description.
    pub fn advance(&self, at: Time) -> Result<Report, ReportError> {
        let next = self.status.next().ok_or(ReportError::AlreadyResolved)?;
        self.transition(next, next.description(), at)
    }

    /// Record a citizen rating. Only once, only after resolution.
    pub fn rate(&self, rating: u8, feedback: Option<String>) -> Result<Report, ReportError> {
        if self.status != Status::Resolved {
            return Err(ReportError::NotResolved(self.status));
        }
        if self.rating.is_some() {
            return Err(ReportError::AlreadyRated);
        }
        if !(1..=5).contains(&rating) {
            return Err(ReportError::InvalidRating(rating));
        }

        let mut next = self.clone();
        next.rating = Some(rating);
        next.feedback = feedback.filter(|f| !f.trim().is_empty());
        Ok(next)
    }

    /// Check the timeline invariants.
    pub fn check_invariants(&self) -> Result<(), ReportError> {
        let first = self.timeline.first().ok_or(ReportError::EmptyTimeline)?;
        if first.status != Status::Submitted {
            return Err(ReportError::TimelineStart(first.status));
        }

        for (i, pair) in self.timeline.windows(2).enumerate() {
            if pair[1].timestamp < pair[0].timestamp {
                return Err(ReportError::TimelineOrder(i + 1));
            }
        }

        // first() succeeded, so last() exists
        if let Some(last) = self.timeline.last() {
            if last.status != self.status {
                return Err(ReportError::StatusMismatch { status: self.status, last: last.status });
            }
        }
        Ok(())
    }

    /// Drop the duplicate overlay fields.
    pub fn without_duplicate_overlay(&self) -> Report {
        let mut next = self.clone();
        next.duplicate_group = None;
        next.is_duplicate = false;
        next.original_report_id = None;
        next.duplicate_count = None;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn sample() -> Report {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        Report::new(
            ReportId::from("R-000000001"),
            "Pothole on Main Street",
            "Large pothole near the market",
            Category::RoadInfrastructure,
            at,
        )
        .with_location("Main Street", "28.6139", "77.2090")
        .with_photo("data:image/png;base64,AAAA", "pothole.png")
    }

    #[test]
    fn test_new_report_satisfies_invariants() {
        let report = sample();
        assert_eq!(report.status, Status::Submitted);
        assert_eq!(report.timeline.len(), 1);
        assert!(report.check_invariants().is_ok());
    }

    #[test]
    fn test_advance_walks_the_lifecycle() {
        let mut report = sample();
        let mut at = report.submitted_at;
        for expected in [Status::Acknowledged, Status::InProgress, Status::Resolved] {
            at += Duration::hours(1);
            report = report.advance(at).unwrap();
            assert_eq!(report.status, expected);
            assert!(report.check_invariants().is_ok());
        }
        assert_eq!(report.timeline.len(), 4);
        assert_eq!(report.advance(at), Err(ReportError::AlreadyResolved));
    }

    #[test]
    fn test_transition_rejects_backwards() {
        let report = sample().advance(Utc::now()).unwrap();
        let err = report.transition(Status::Submitted, "undo", Utc::now()).unwrap_err();
        assert_eq!(
            err,
            ReportError::BackwardTransition { from: Status::Acknowledged, to: Status::Submitted }
        );
    }

    #[test]
    fn test_transition_clamps_timestamp() {
        let report = sample();
        let earlier = report.submitted_at - Duration::hours(3);
        let next = report.transition(Status::Acknowledged, "ack", earlier).unwrap();
        assert_eq!(next.timeline[1].timestamp, report.submitted_at);
        assert!(next.check_invariants().is_ok());
    }

    #[test]
    fn test_transition_does_not_touch_original() {
        let report = sample();
        let _ = report.advance(Utc::now()).unwrap();
        assert_eq!(report.timeline.len(), 1);
        assert_eq!(report.status, Status::Submitted);
    }

    #[test]
    fn test_rate_requires_resolved_and_only_once() {
        let report = sample();
        assert_eq!(report.rate(5, None), Err(ReportError::NotResolved(Status::Submitted)));

        let mut resolved = report.clone();
        for _ in 0..3 {
            resolved = resolved.advance(Utc::now()).unwrap();
        }
        assert_eq!(resolved.rate(0, None), Err(ReportError::InvalidRating(0)));
        assert_eq!(resolved.rate(6, None), Err(ReportError::InvalidRating(6)));

        let rated = resolved.rate(4, Some("Quick fix".to_string())).unwrap();
        assert_eq!(rated.rating, Some(4));
        assert_eq!(rated.feedback.as_deref(), Some("Quick fix"));
        assert_eq!(rated.rate(5, None), Err(ReportError::AlreadyRated));
    }

    #[test]
    fn test_invariant_violations_detected() {
        let mut report = sample();
        report.status = Status::Resolved;
        assert!(matches!(report.check_invariants(), Err(ReportError::StatusMismatch { .. })));

        report.timeline.clear();
        assert_eq!(report.check_invariants(), Err(ReportError::EmptyTimeline));
    }

    #[test]
    fn test_coordinates_parsing() {
        let report = sample();
        let (lat, lng) = report.coordinates().unwrap();
        assert!((lat - 28.6139).abs() < 1e-9);
        assert!((lng - 77.2090).abs() < 1e-9);

        let mut missing = report.clone();
        missing.longitude = Some("not a number".to_string());
        assert!(missing.coordinates().is_none());
    }

    #[test]
    fn test_category_serde_keeps_unknown_keys() {
        let known: Category = serde_json::from_str("\"publicSafety\"").unwrap();
        assert_eq!(known, Category::PublicSafety);
        assert_eq!(known.label(), "Public Safety");

        let custom: Category = serde_json::from_str("\"noiseComplaint\"").unwrap();
        assert_eq!(custom, Category::Custom("noiseComplaint".to_string()));
        assert_eq!(serde_json::to_string(&custom).unwrap(), "\"noiseComplaint\"");
    }

    #[test]
    fn test_report_json_uses_stored_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["category"], "roadInfrastructure");
        assert_eq!(json["status"], "submitted");
        assert!(json.get("submittedAt").is_some());
        assert!(json.get("photoNames").is_some());
        assert!(json.get("isDuplicate").is_none());

        let back: Report = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_string(&Status::InProgress).unwrap(), "\"in-progress\"");
        assert_eq!("In-Progress".parse::<Status>().unwrap(), Status::InProgress);
        assert!(Urgency::Critical > Urgency::High);
        assert_eq!(Urgency::High.escalate(Urgency::Medium), Urgency::High);
    }
}
