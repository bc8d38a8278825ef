//! Hotspot aggregation: reports bucketed by location at ~1 km resolution.

use std::collections::HashMap;

use civic_core::{Category, Report, Urgency};
use serde::Serialize;

use crate::duplicates::{collect_groups, DuplicateDetector, DuplicateGroup};

/// Minimum reports for a bucket to count as a hotspot.
const MIN_REPORTS: usize = 2;

/// Bucket size above which a hotspot without high/critical reports is medium.
const MEDIUM_SIZE: usize = 3;

/// A location with multiple reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    /// `hotspot_<n>`, numbered in bucket creation order
    pub id: String,

    /// Bucket key (`<lat*100>_<lng*100>`, rounded)
    pub key: String,

    /// Address of the first report in the bucket
    pub location: String,

    /// Mean latitude of the bucket's reports
    pub latitude: f64,

    /// Mean longitude of the bucket's reports
    pub longitude: f64,

    pub report_count: usize,

    /// Category of the first report
    pub category: Category,

    pub urgency_level: Urgency,

    /// Member reports, with duplicate overlay applied
    pub reports: Vec<Report>,

    /// Duplicate groups that have members in this bucket
    pub duplicate_groups: Vec<DuplicateGroup>,
}

/// Round half up, the way map grids on the dashboard do.
fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

/// Bucket key for a coordinate pair.
pub fn location_key(lat: f64, lng: f64) -> String {
    format!("{}_{}", round_half_up(lat * 100.0), round_half_up(lng * 100.0))
}

fn hotspot_urgency(reports: &[Report]) -> Urgency {
    if reports.iter().any(|r| r.urgency == Urgency::Critical) {
        Urgency::Critical
    } else if reports.iter().any(|r| r.urgency == Urgency::High) {
        Urgency::High
    } else if reports.len() > MEDIUM_SIZE {
        Urgency::Medium
    } else {
        Urgency::Low
    }
}

/// Build hotspots after annotating duplicates with `detector`.
///
/// Reports without parseable coordinates are left out. Result is sorted by
/// descending report count; equal counts keep bucket creation order.
pub fn build_hotspots_with(detector: &DuplicateDetector, reports: &[Report]) -> Vec<Hotspot> {
    let annotated = detector.detect(reports);

    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<(Report, (f64, f64))>> = HashMap::new();

    for report in annotated {
        let Some(coords) = report.coordinates() else {
            continue;
        };
        let key = location_key(coords.0, coords.1);
        if !buckets.contains_key(&key) {
            order.push(key.clone());
        }
        buckets.entry(key).or_default().push((report, coords));
    }

    let mut hotspots: Vec<Hotspot> = order
        .into_iter()
        .filter_map(|key| {
            let members = buckets.remove(&key)?;
            (members.len() >= MIN_REPORTS).then_some((key, members))
        })
        .enumerate()
        .filter_map(|(index, (key, members))| {
            let count = members.len() as f64;
            let latitude = members.iter().map(|(_, c)| c.0).sum::<f64>() / count;
            let longitude = members.iter().map(|(_, c)| c.1).sum::<f64>() / count;
            let reports: Vec<Report> = members.into_iter().map(|(r, _)| r).collect();
            let first = reports.first()?;

            Some(Hotspot {
                id: format!("hotspot_{}", index),
                location: first.address.clone(),
                category: first.category.clone(),
                latitude,
                longitude,
                report_count: reports.len(),
                urgency_level: hotspot_urgency(&reports),
                duplicate_groups: collect_groups(&reports),
                key,
                reports,
            })
        })
        .collect();

    hotspots.sort_by(|a, b| b.report_count.cmp(&a.report_count));
    hotspots
}

/// Build hotspots with the default duplicate settings.
pub fn build_hotspots(reports: &[Report]) -> Vec<Hotspot> {
    build_hotspots_with(&DuplicateDetector::default(), reports)
}
