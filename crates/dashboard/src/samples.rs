//! Sample reports shown on first use, before any citizen has submitted.

use chrono::{TimeZone, Utc};
use civic_core::{Category, Report, ReportId, Urgency};

struct Sample {
    seq: u32,
    title: &'static str,
    description: &'static str,
    category: Category,
    urgency: Urgency,
    address: &'static str,
    lat: &'static str,
    lng: &'static str,
    photo: (&'static str, &'static str),
    video: Option<(&'static str, &'static str)>,
    channel: &'static str,
    submitted: (u32, u32),
    note: &'static str,
}

/// RPT-001 to RPT-003, unrouted.
pub fn sample_reports() -> Vec<Report> {
    let samples = [
        Sample {
            seq: 1,
            title: "Pothole on Main Street",
            description: "Large pothole causing traffic issues near the market area",
            category: Category::RoadInfrastructure,
            urgency: Urgency::High,
            address: "Main Street, Near City Market",
            lat: "28.6139",
            lng: "77.2090",
            photo: ("/pothole-on-road.jpg", "pothole_main_street.jpg"),
            video: None,
            channel: "Mobile App",
            submitted: (10, 30),
            note: "Report submitted via mobile app",
        },
        Sample {
            seq: 2,
            title: "Water Leakage in Residential Area",
            description: "Continuous water leakage from main pipeline affecting multiple houses",
            category: Category::WaterSanitation,
            urgency: Urgency::Critical,
            address: "Sector 15, Block A",
            lat: "28.6129",
            lng: "77.2095",
            photo: ("/water-leakage-pipeline.jpg", "water_leak_sector15.jpg"),
            video: Some(("/placeholder.mp4", "leak_video.mp4")),
            channel: "Web Portal",
            submitted: (9, 15),
            note: "Report submitted via web portal",
        },
        Sample {
            seq: 3,
            title: "Street Light Not Working",
            description: "Multiple street lights are not functioning in the residential colony",
            category: Category::StreetLighting,
            urgency: Urgency::Medium,
            address: "Green Park Colony, Street 7",
            lat: "28.6119",
            lng: "77.2085",
            photo: ("/broken-street-light.png", "street_light_issue.jpg"),
            video: None,
            channel: "Phone Call",
            submitted: (8, 45),
            note: "Report received via phone call",
        },
    ];

    samples
        .into_iter()
        .filter_map(|s| {
            let at = Utc.with_ymd_and_hms(2024, 1, 15, s.submitted.0, s.submitted.1, 0).single()?;
            let mut report = Report::new(ReportId::sequential(s.seq), s.title, s.description, s.category, at)
                .with_urgency(s.urgency)
                .with_location(s.address, s.lat, s.lng)
                .with_photo(s.photo.0, s.photo.1)
                .with_channel(s.channel)
                .with_submission_note(s.note);
            if let Some((reference, name)) = s.video {
                report = report.with_video(reference, name);
            }
            Some(report)
        })
        .collect()
}
