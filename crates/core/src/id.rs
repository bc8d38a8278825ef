//! Report identifiers.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::Time;

/// Identifier of a report.
///
/// Citizen submissions use `R-<digits>`, seeded sample data uses `RPT-<seq>`.
/// Anything else read back from storage is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(String);

impl ReportId {
    /// Prefix used for citizen submissions.
    pub const PREFIX: &'static str = "R";

    /// Generate a new id at `now`.
    ///
    /// The last six digits of the millisecond clock are followed by three
    /// digits of entropy taken from a fresh ULID.
    pub fn generate(now: Time) -> Self {
        let millis = now.timestamp_millis().rem_euclid(1_000_000);
        let entropy = Ulid::new().random() % 1000;
        Self(format!("{}-{:06}{:03}", Self::PREFIX, millis, entropy))
    }

    /// Sequential id used for sample data (`RPT-001`).
    pub fn sequential(seq: u32) -> Self {
        Self(format!("RPT-{:03}", seq))
    }

    /// Borrow the raw string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ReportId {
    fn from(s: &str) -> Self {
        Self(s.trim().to_string())
    }
}

impl From<String> for ReportId {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ReportId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generated_id_format() {
        let now = chrono::Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let id = ReportId::generate(now);
        let digits = id.as_str().strip_prefix("R-").unwrap();
        assert_eq!(digits.len(), 9);
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_sequential_id() {
        assert_eq!(ReportId::sequential(1).as_str(), "RPT-001");
        assert_eq!(ReportId::sequential(42).to_string(), "RPT-042");
    }

    #[test]
    fn test_from_str_trims() {
        let id: ReportId = "  R-123456789 ".parse().unwrap();
        assert_eq!(id.as_str(), "R-123456789");
    }
}
