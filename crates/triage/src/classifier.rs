//! Urgency classification.
//!
//! Two entry points:
//! - [`classify`]: the intake classifier run on every submission
//! - [`analyze`]: the heavier score-based analysis an administrator can run
//!   on a report with photos; its result may override the stored urgency

use civic_core::{Category, Urgency, UrgencyAnalysis};

use crate::keywords::{
    any_hit, hits, INTAKE_CRITICAL, INTAKE_HIGH, INTAKE_MEDIUM, VISUAL_CRITICAL, VISUAL_HIGH,
    VISUAL_MEDIUM,
};

/// Classify a submission from its text and category.
///
/// Keywords are checked in priority order (critical, high, medium) and the
/// first tier with a hit wins. A medium hit in a critical category is
/// upgraded to high; with no hit at all, critical and high-priority
/// categories still get medium.
pub fn classify(title: &str, description: &str, category: &Category) -> Urgency {
    let text = format!("{} {}", title, description).to_lowercase();

    if any_hit(&text, INTAKE_CRITICAL) {
        return Urgency::Critical;
    }
    if any_hit(&text, INTAKE_HIGH) {
        return Urgency::High;
    }
    if any_hit(&text, INTAKE_MEDIUM) {
        return if category.is_critical() { Urgency::High } else { Urgency::Medium };
    }
    if category.is_critical() || category.is_high_priority() {
        return Urgency::Medium;
    }
    Urgency::Low
}

/// Category risk weight used by [`analyze`].
fn category_risk(category: &Category) -> u32 {
    if category.is_critical() {
        2
    } else if category.is_high_priority() {
        1
    } else {
        0
    }
}

/// `(urgency boost, confidence boost)` per category.
fn category_adjustment(category: &Category) -> Option<(f64, f64)> {
    match category {
        Category::PublicSafety => Some((1.0, 0.1)),
        Category::WaterSanitation => Some((1.0, 0.08)),
        Category::RoadInfrastructure | Category::TrafficTransportation => Some((0.5, 0.05)),
        Category::StreetLighting => Some((0.3, 0.03)),
        _ => None,
    }
}

/// Score-based urgency analysis of a report description.
///
/// Score = 10 per critical keyword + 5 per high + 2 per medium
/// + 3 × category risk + 2 when submitted off-hours.
pub fn analyze(description: &str, category: &Category, off_hours: bool) -> UrgencyAnalysis {
    let text = format!("{} {}", description, category.key()).to_lowercase();

    let critical = hits(&text, VISUAL_CRITICAL);
    let high = hits(&text, VISUAL_HIGH);
    let medium = hits(&text, VISUAL_MEDIUM);

    let score = critical.len() as u32 * 10
        + high.len() as u32 * 5
        + medium.len() as u32 * 2
        + category_risk(category) * 3
        + if off_hours { 2 } else { 0 };

    let (mut urgency, mut confidence, reasoning, photo_analysis) =
        if score >= 15 || !critical.is_empty() {
            (
                Urgency::Critical,
                0.95,
                format!("Critical safety hazard detected - Keywords: {}", critical.join(", ")),
                "Immediate safety risk requiring emergency response",
            )
        } else if score >= 8 || high.len() > 1 {
            (
                Urgency::High,
                0.88,
                format!("Significant infrastructure issue - Keywords: {}", high.join(", ")),
                "Substantial damage requiring prompt attention",
            )
        } else if score >= 4 || !medium.is_empty() {
            (
                Urgency::Medium,
                0.78,
                format!("Moderate maintenance issue - Score: {}", score),
                "Moderate infrastructure maintenance needs",
            )
        } else {
            (
                Urgency::Low,
                0.82,
                format!("Routine maintenance issue - Score: {}", score),
                "Standard maintenance requirements",
            )
        };

    if let Some((urgency_boost, confidence_boost)) = category_adjustment(category) {
        if urgency == Urgency::Medium && urgency_boost >= 1.0 {
            urgency = Urgency::High;
        } else if urgency == Urgency::Low && urgency_boost >= 0.5 {
            urgency = Urgency::Medium;
        }
        confidence = f64::min(confidence + confidence_boost, 0.99);
    }

    UrgencyAnalysis {
        detected_urgency: urgency,
        confidence,
        reasoning,
        photo_analysis: Some(photo_analysis.to_string()),
    }
}
