//! CSV export of the per-image report.

use super::ReportRow;
use crate::error::OutputError;
use chrono::{DateTime, Local};
use std::io::Write;
use std::path::{Path, PathBuf};

const HEADER: [&str; 4] = ["name", "cluster", "kept", "sharpness"];

/// Write rows as CSV
///
/// Columns: name, cluster (noise is -1), kept, sharpness
pub fn export_csv<W: Write>(rows: &[ReportRow], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    csv_writer.write_record(HEADER)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// `reduvis_report_<YYYYmmdd_HHMMSS>.csv`
pub fn report_file_name(at: DateTime<Local>) -> String {
    format!("reduvis_report_{}.csv", at.format("%Y%m%d_%H%M%S"))
}

/// Write the report into `dir` under a timestamped name, returning its path
pub fn write_report_csv(rows: &[ReportRow], dir: &Path) -> Result<PathBuf, OutputError> {
    let path = dir.join(report_file_name(Local::now()));
    let file = std::fs::File::create(&path).map_err(|e| OutputError::Csv {
        path: path.clone(),
        source: e.into(),
    })?;
    export_csv(rows, std::io::BufWriter::new(file)).map_err(|source| OutputError::Csv {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cluster::ClusterLabel;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn rows() -> Vec<ReportRow> {
        vec![
            ReportRow {
                name: "a.jpg".to_string(),
                cluster: ClusterLabel::Cluster(0),
                kept: true,
                sharpness: 812.5,
            },
            ReportRow {
                name: "b, copy.jpg".to_string(),
                cluster: ClusterLabel::Noise,
                kept: true,
                sharpness: 0.0,
            },
        ]
    }

    #[test]
    fn csv_has_header_and_one_line_per_image() {
        let mut buffer = Vec::new();
        export_csv(&rows(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "name,cluster,kept,sharpness");
        assert_eq!(lines[1], "a.jpg,0,true,812.5");
        assert_eq!(lines[2], "\"b, copy.jpg\",-1,true,0.0");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn empty_report_still_has_header() {
        let mut buffer = Vec::new();
        export_csv(&[], &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "name,cluster,kept,sharpness\n");
    }

    #[test]
    fn file_name_is_timestamped() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(report_file_name(at), "reduvis_report_20240309_140507.csv");
    }

    #[test]
    fn report_is_written_into_directory() {
        let dir = TempDir::new().unwrap();
        let path = write_report_csv(&rows(), dir.path()).unwrap();

        assert_eq!(path.parent(), Some(dir.path()));
        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.records().count(), 2);
    }

    #[test]
    fn missing_directory_is_an_output_error() {
        let error = write_report_csv(&rows(), Path::new("/nonexistent/reports")).unwrap_err();
        assert!(matches!(error, OutputError::Csv { .. }));
    }
}
