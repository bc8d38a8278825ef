//! Duplicate detection.
//!
//! Pairwise weighted similarity over location, text, category and
//! submission time, then a greedy single pass that groups each report with
//! the later reports it resembles. The result is an overlay on copies of the
//! input; nothing here is persisted.

use std::collections::{HashMap, HashSet};

use civic_core::{DuplicateConfig, Report, ReportId};
use serde::Serialize;
use tracing::debug;

/// Per-factor similarity of two reports, each in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityBreakdown {
    pub location: f64,
    pub text: f64,
    pub category: f64,
    pub time: f64,
    /// Weighted sum of the four factors
    pub overall: f64,
}

/// A duplicate group as shown to administrators.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    /// `group_<mainId>`
    pub group_id: String,

    /// Members in input order, main report included
    pub reports: Vec<Report>,

    /// The report the others duplicate
    pub main_report: Report,
}

/// Group id for a main report.
pub fn group_id(main: &ReportId) -> String {
    format!("group_{}", main)
}

/// Duplicate detector with configurable threshold and weights.
#[derive(Debug, Clone, Default)]
pub struct DuplicateDetector {
    config: DuplicateConfig,
}

impl DuplicateDetector {
    pub fn new(config: DuplicateConfig) -> Self {
        Self { config }
    }

    /// Similarity of two reports. Symmetric in its arguments.
    pub fn similarity(&self, a: &Report, b: &Report) -> SimilarityBreakdown {
        let location = match (a.coordinates(), b.coordinates()) {
            (Some(p), Some(q)) => {
                let distance = ((q.0 - p.0).powi(2) + (q.1 - p.1).powi(2)).sqrt();
                (1.0 - distance / self.config.radius_degrees).max(0.0)
            }
            _ => 0.0,
        };

        let text = text_similarity(&a.text(), &b.text());
        let category = if a.category == b.category { 1.0 } else { 0.0 };

        let days = (a.submitted_at - b.submitted_at).num_milliseconds().abs() as f64 / 86_400_000.0;
        let time = (1.0 - days / self.config.window_days).max(0.0);

        let w = &self.config.weights;
        let overall = location * w.location + text * w.text + category * w.category + time * w.time;

        SimilarityBreakdown { location, text, category, time, overall }
    }

    /// Whether `b` counts as a duplicate of `a` (strictly above the threshold).
    pub fn is_duplicate(&self, a: &Report, b: &Report) -> bool {
        self.similarity(a, b).overall > self.config.threshold
    }

    /// Annotate duplicates. Output has the same length and order as the input.
    ///
    /// Reports already flagged `is_duplicate` are skipped both as group heads
    /// and as candidates, and so is any report claimed by an earlier group.
    /// Running the result through `detect` again changes nothing.
    pub fn detect(&self, reports: &[Report]) -> Vec<Report> {
        let mut out = reports.to_vec();
        let mut consumed: HashSet<usize> = reports
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_duplicate)
            .map(|(i, _)| i)
            .collect();

        for (i, head) in reports.iter().enumerate() {
            if consumed.contains(&i) {
                continue;
            }

            let matches: Vec<usize> = reports
                .iter()
                .enumerate()
                .skip(i + 1)
                .filter(|(j, other)| !consumed.contains(j) && self.is_duplicate(head, other))
                .map(|(j, _)| j)
                .collect();

            if matches.is_empty() {
                continue;
            }

            let group = group_id(&head.id);
            debug!("Duplicate group {} has {} reports", group, matches.len() + 1);

            let main = &mut out[i];
            main.duplicate_group = Some(group.clone());
            main.duplicate_count = Some(matches.len() + 1);
            main.is_duplicate = false;

            for j in matches {
                consumed.insert(j);
                let duplicate = &mut out[j];
                duplicate.duplicate_group = Some(group.clone());
                duplicate.is_duplicate = true;
                duplicate.original_report_id = Some(head.id.clone());
            }
        }

        out
    }
}

/// Shared words over the longer word count, counting repeated words at most
/// as often as they occur in both texts.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let words_a: Vec<&str> = a.split_whitespace().collect();
    let words_b: Vec<&str> = b.split_whitespace().collect();

    let longest = words_a.len().max(words_b.len());
    if longest == 0 {
        return 0.0;
    }

    let mut remaining: HashMap<&str, usize> = HashMap::new();
    for word in &words_b {
        *remaining.entry(*word).or_default() += 1;
    }

    let common = words_a
        .iter()
        .filter(|word| match remaining.get_mut(*word) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        })
        .count();

    common as f64 / longest as f64
}

/// Annotate duplicates with the default settings.
pub fn detect_duplicates(reports: &[Report]) -> Vec<Report> {
    DuplicateDetector::default().detect(reports)
}

/// Collect groups from annotated reports, in order of first appearance.
pub fn collect_groups(annotated: &[Report]) -> Vec<DuplicateGroup> {
    let mut order: Vec<&str> = Vec::new();
    let mut members: HashMap<&str, Vec<Report>> = HashMap::new();

    for report in annotated {
        if let Some(group) = report.duplicate_group.as_deref() {
            if !members.contains_key(group) {
                order.push(group);
            }
            members.entry(group).or_default().push(report.clone());
        }
    }

    order
        .into_iter()
        .filter_map(|group| {
            let reports = members.remove(group)?;
            let main_report = reports
                .iter()
                .find(|r| !r.is_duplicate)
                .or_else(|| reports.first())?
                .clone();
            Some(DuplicateGroup { group_id: group.to_string(), reports, main_report })
        })
        .collect()
}
