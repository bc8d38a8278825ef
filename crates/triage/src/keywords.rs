//! Keyword tables shared by the classifier, routing and urgency analysis.
//!
//! Matching is plain substring search over lowercased text, so multi-word
//! phrases work and "flooding" also hits "flood".

/// Intake classifier: immediate danger.
pub const INTAKE_CRITICAL: &[&str] = &[
    "emergency",
    "urgent",
    "dangerous",
    "hazardous",
    "life threatening",
    "death",
    "injury",
    "injured",
    "gas leak",
    "fire",
    "explosion",
    "collapsed",
    "collapse",
    "flooding",
    "flood",
    "electrical hazard",
    "live wire",
    "exposed wire",
    "sinkhole",
    "landslide",
    "toxic",
    "poison",
    "chemical spill",
    "water main burst",
    "sewage overflow",
    "immediate danger",
    "safety risk",
    "accident prone",
];

/// Intake classifier: serious damage.
pub const INTAKE_HIGH: &[&str] = &[
    "broken",
    "damaged",
    "not working",
    "malfunctioning",
    "blocked",
    "overflowing",
    "leaking",
    "no water",
    "power outage",
    "street light out",
    "traffic light broken",
    "pothole large",
    "road damage",
    "bridge damage",
    "unsafe",
    "security issue",
    "vandalism",
    "theft",
];

/// Intake classifier: maintenance.
pub const INTAKE_MEDIUM: &[&str] = &[
    "needs repair",
    "maintenance required",
    "worn out",
    "old",
    "deteriorating",
    "faded",
    "minor damage",
    "small pothole",
    "noise complaint",
    "littering",
    "graffiti",
    "overgrown",
    "needs cleaning",
    "slow drainage",
];

/// Routing: each hit adds 10 and forces critical urgency.
pub const ROUTING_CRITICAL: &[&str] = &[
    "emergency",
    "danger",
    "urgent",
    "accident",
    "fire",
    "flood",
    "gas leak",
    "collapse",
    "explosion",
    "toxic",
    "chemical",
    "electrical hazard",
    "live wire",
    "sinkhole",
    "landslide",
    "water main burst",
    "sewage overflow",
    "life threatening",
    "death",
    "injury",
    "injured",
    "hazardous",
    "immediate danger",
    "safety risk",
];

/// Routing: each hit adds 5 and lifts urgency to at least high.
pub const ROUTING_HIGH: &[&str] = &[
    "broken",
    "damaged",
    "not working",
    "malfunctioning",
    "blocked",
    "overflowing",
    "leaking",
    "no water",
    "power outage",
    "traffic light",
    "unsafe",
    "security",
    "vandalism",
    "theft",
    "large pothole",
    "road damage",
    "bridge damage",
];

/// Urgency analysis: visual signs of immediate risk.
pub const VISUAL_CRITICAL: &[&str] = &[
    "emergency",
    "danger",
    "urgent",
    "accident",
    "fire",
    "flood",
    "gas leak",
    "collapse",
    "explosion",
    "toxic",
    "chemical",
    "electrical",
    "live wire",
    "sinkhole",
    "landslide",
    "burst",
    "overflow",
    "life threatening",
    "immediate",
    "hazard",
    "unsafe",
    "broken glass",
    "exposed",
    "leaking gas",
    "structural damage",
    "deep hole",
    "major crack",
];

/// Urgency analysis: substantial damage.
pub const VISUAL_HIGH: &[&str] = &[
    "broken",
    "damaged",
    "not working",
    "malfunctioning",
    "blocked",
    "overflowing",
    "leaking",
    "no water",
    "power outage",
    "street light out",
    "traffic light broken",
    "large pothole",
    "road damage",
    "bridge damage",
    "unsafe",
    "security issue",
    "vandalism",
    "theft",
    "major",
    "severe",
    "significant",
    "extensive",
];

/// Urgency analysis: wear and maintenance.
pub const VISUAL_MEDIUM: &[&str] = &[
    "needs repair",
    "maintenance",
    "worn out",
    "old",
    "deteriorating",
    "faded",
    "minor damage",
    "small pothole",
    "graffiti",
    "overgrown",
    "needs cleaning",
    "slow drainage",
    "moderate",
    "noticeable",
    "some damage",
    "wear and tear",
];

/// Keywords from `list` that occur in `text`. `text` must already be lowercase.
pub fn hits<'a>(text: &str, list: &[&'a str]) -> Vec<&'a str> {
    list.iter().copied().filter(|kw| text.contains(kw)).collect()
}

/// Whether any keyword from `list` occurs in `text`.
pub fn any_hit(text: &str, list: &[&str]) -> bool {
    list.iter().any(|kw| text.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hits_counts_distinct_keywords() {
        let text = "gas leak near the fire station, emergency";
        assert_eq!(hits(text, ROUTING_CRITICAL), vec!["emergency", "fire", "gas leak"]);
    }

    #[test]
    fn test_phrases_match_as_substrings() {
        assert!(any_hit("the street light is not working", INTAKE_HIGH));
        assert!(!any_hit("all good here", INTAKE_HIGH));
    }
}
