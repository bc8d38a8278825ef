//! CSV export of the report list.

use std::io::Write;
use std::path::Path;

use civic_core::Report;
use tracing::info;

use crate::Result;

/// Column headers, in order.
pub const CSV_HEADERS: [&str; 13] = [
    "Report ID",
    "Title",
    "Description",
    "Category",
    "Urgency",
    "Address",
    "Latitude",
    "Longitude",
    "Status",
    "Channel",
    "Submitted Date",
    "Rating",
    "Feedback",
];

/// Write `reports` as CSV. Text fields are always quoted.
pub fn export_csv<W: Write>(reports: &[Report], writer: W) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::NonNumeric)
        .from_writer(writer);

    csv.write_record(CSV_HEADERS)?;
    for report in reports {
        let submitted = report.submitted_at.format("%Y-%m-%d %H:%M:%S").to_string();
        let rating = report.rating.map(|r| r.to_string()).unwrap_or_default();
        csv.write_record([
            report.id.as_str(),
            report.title.as_str(),
            report.description.as_str(),
            report.category.key(),
            report.urgency.as_str(),
            report.address.as_str(),
            report.latitude.as_deref().unwrap_or_default(),
            report.longitude.as_deref().unwrap_or_default(),
            report.status.as_str(),
            report.channel.as_str(),
            submitted.as_str(),
            rating.as_str(),
            report.feedback.as_deref().unwrap_or_default(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

/// Write the CSV to `path`.
pub fn export_csv_file(reports: &[Report], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)?;
    export_csv(reports, file)?;
    info!("Exported {} reports to {}", reports.len(), path.display());
    Ok(())
}

/// Default export file name for a given date: `civic-reports-YYYY-MM-DD.csv`.
pub fn default_file_name(date: chrono::NaiveDate) -> String {
    format!("civic-reports-{}.csv", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples::sample_reports;

    fn parse(bytes: &[u8]) -> Vec<csv::StringRecord> {
        csv::Reader::from_reader(bytes)
            .records()
            .collect::<std::result::Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_headers_and_rows() {
        let mut out = Vec::new();
        export_csv(&sample_reports(), &mut out).unwrap();

        let text = String::from_utf8(out.clone()).unwrap();
        let first_line = text.lines().next().unwrap();
        assert!(first_line.starts_with("\"Report ID\",\"Title\""));

        let rows = parse(&out);
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][0], "RPT-001");
        assert_eq!(&rows[0][3], "roadInfrastructure");
        assert_eq!(&rows[0][6], "28.6139");
        assert_eq!(&rows[0][10], "2024-01-15 10:30:00");
        assert_eq!(&rows[0][11], "");
    }

    #[test]
    fn test_quotes_are_escaped() {
        let mut report = sample_reports().remove(0);
        report.title = "The \"big\" one, again".into();
        let mut out = Vec::new();
        export_csv(&[report], &mut out).unwrap();

        let text = String::from_utf8(out.clone()).unwrap();
        assert!(text.contains("\"The \"\"big\"\" one, again\""));
        assert_eq!(&parse(&out)[0][1], "The \"big\" one, again");
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(default_file_name(chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()));
        export_csv_file(&sample_reports(), &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 4);
        assert!(path.ends_with("civic-reports-2024-01-15.csv"));
    }
}
