//! Report drafts and submission.

use civic_core::{Category, Report, ReportId, Time, Urgency};
use civic_storage::{KeyValueStore, ReportStore};
use civic_triage::classify;
use tracing::info;

use crate::{IntakeError, Result};

/// An attached photo or video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// Data URI or path
    pub reference: String,
    /// Original file name
    pub name: String,
}

impl MediaFile {
    pub fn new(reference: impl Into<String>, name: impl Into<String>) -> Self {
        Self { reference: reference.into(), name: name.into() }
    }
}

/// A report being filled in by a citizen.
#[derive(Debug, Clone, Default)]
pub struct ReportDraft {
    pub title: String,
    pub description: String,
    pub category: Option<Category>,
    /// Explicit urgency. When unset, the classifier decides.
    pub urgency: Option<Urgency>,
    pub address: String,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub photos: Vec<MediaFile>,
    pub videos: Vec<MediaFile>,
    pub channel: Option<String>,
}

impl ReportDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>, category: Category) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category: Some(category),
            ..Default::default()
        }
    }

    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude.to_string());
        self.longitude = Some(longitude.to_string());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_photo(mut self, photo: MediaFile) -> Self {
        self.photos.push(photo);
        self
    }

    pub fn with_video(mut self, video: MediaFile) -> Self {
        self.videos.push(video);
        self
    }

    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = Some(urgency);
        self
    }

    /// Urgency the classifier assigns to the current text, as shown while typing.
    pub fn suggested_urgency(&self) -> Urgency {
        match &self.category {
            Some(category) => classify(&self.title, &self.description, category),
            None => Urgency::Low,
        }
    }

    /// Parsed coordinates of the picked location. NaN and infinities count as unparseable.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lat: f64 = self.latitude.as_deref()?.trim().parse().ok()?;
        let lng: f64 = self.longitude.as_deref()?.trim().parse().ok()?;
        (lat.is_finite() && lng.is_finite()).then_some((lat, lng))
    }

    /// Whether the address still needs to be looked up from the coordinates.
    pub fn needs_address(&self) -> bool {
        self.address.trim().is_empty() && self.coordinates().is_some()
    }

    /// Check required fields, photos and location, in that order.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(IntakeError::MissingField("title"));
        }
        if self.description.trim().is_empty() {
            return Err(IntakeError::MissingField("description"));
        }
        match &self.category {
            None => return Err(IntakeError::MissingField("category")),
            Some(Category::Custom(key)) => return Err(IntakeError::UnknownCategory(key.clone())),
            Some(_) => {}
        }
        if self.photos.is_empty() {
            return Err(IntakeError::NoPhoto);
        }

        let (lat, lng) = match (self.latitude.as_deref(), self.longitude.as_deref()) {
            (Some(lat), Some(lng)) if !lat.trim().is_empty() && !lng.trim().is_empty() => (lat, lng),
            _ => return Err(IntakeError::NoLocation),
        };
        if self.coordinates().is_none() {
            return Err(IntakeError::InvalidCoordinates(lat.to_string(), lng.to_string()));
        }
        Ok(())
    }

    /// Validate and turn the draft into a submitted report.
    pub fn into_report(self, id: ReportId, at: Time) -> Result<Report> {
        self.validate()?;
        let urgency = self.suggested_urgency();
        let ReportDraft {
            title,
            description,
            category,
            urgency: explicit,
            address,
            latitude,
            longitude,
            photos,
            videos,
            channel,
        } = self;
        let category = category.ok_or(IntakeError::MissingField("category"))?;

        let mut report = Report::new(id, title.trim(), description.trim(), category, at)
            .with_urgency(explicit.unwrap_or(urgency))
            .with_channel(channel.unwrap_or_else(|| "web".to_string()));
        report.address = address;
        report.latitude = latitude;
        report.longitude = longitude;
        for photo in photos {
            report = report.with_photo(photo.reference, photo.name);
        }
        for video in videos {
            report = report.with_video(video.reference, video.name);
        }
        Ok(report)
    }
}

/// Validate a draft, assign it an id and append it to the store.
pub async fn submit<S: KeyValueStore>(
    store: &mut ReportStore<S>,
    draft: ReportDraft,
    at: Time,
) -> Result<Report> {
    let report = draft.into_report(ReportId::generate(at), at)?;
    store.push(&report).await?;
    info!("Report {} submitted ({} urgency)", report.id, report.urgency);
    Ok(report)
}
