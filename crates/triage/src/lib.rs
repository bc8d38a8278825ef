//! Report triage: urgency classification, routing to departments, duplicate
//! detection and hotspot aggregation.
//!
//! Everything in this crate is synchronous and pure. Callers pass reports
//! and a registry in and get new values back.

pub mod classifier;
pub mod duplicates;
pub mod hotspots;
pub mod keywords;
pub mod routing;

pub use classifier::{analyze, classify};
pub use duplicates::{
    collect_groups, detect_duplicates, DuplicateDetector, DuplicateGroup, SimilarityBreakdown,
};
pub use hotspots::{build_hotspots, build_hotspots_with, Hotspot};
pub use routing::{route, Priority, RoutingEngine, RoutingResult};
