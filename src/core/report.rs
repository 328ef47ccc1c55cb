/*
 * Writes the asset table as a comma-separated report: one header row followed
 * by one row per record, UTF-8, each row terminated by a newline. Fields that
 * contain a comma, a double quote or a line break are quoted, with inner
 * quotes doubled.
 */
use super::models::{REPORT_COLUMNS, ReportRow};
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug)]
pub enum ReportError {
    Io(io::Error),
}

impl From<io::Error> for ReportError {
    fn from(err: io::Error) -> Self {
        ReportError::Io(err)
    }
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::Io(e) => write!(f, "Could not write report: {e}"),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReportError::Io(e) => Some(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;

pub trait ReportWriterOperations {
    fn write_report(&self, rows: &[ReportRow], destination: &Path) -> Result<()>;
}

#[derive(Default)]
pub struct CoreReportWriter {}

impl CoreReportWriter {
    pub fn new() -> Self {
        CoreReportWriter {}
    }
}

fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn write_line<W: Write, S: AsRef<str>>(writer: &mut W, fields: &[S]) -> io::Result<()> {
    let line: Vec<Cow<'_, str>> = fields.iter().map(|f| escape_field(f.as_ref())).collect();
    writeln!(writer, "{}", line.join(","))
}

/* Renders the report into any writer; used by `CoreReportWriter` and tests. */
pub fn render_report<W: Write>(rows: &[ReportRow], writer: &mut W) -> io::Result<()> {
    write_line(writer, &REPORT_COLUMNS)?;
    for row in rows {
        write_line(writer, row.cells())?;
    }
    Ok(())
}

impl ReportWriterOperations for CoreReportWriter {
    fn write_report(&self, rows: &[ReportRow], destination: &Path) -> Result<()> {
        log::debug!(
            "ReportWriter: Writing {} rows to {destination:?}",
            rows.len()
        );
        let mut writer = BufWriter::new(File::create(destination)?);
        render_report(rows, &mut writer)?;
        writer.flush()?;
        log::info!("ReportWriter: Report saved at {destination:?}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn row(cells: [&str; 7]) -> ReportRow {
        ReportRow(cells.map(str::to_string))
    }

    #[test]
    fn test_render_report_header_and_rows() {
        let rows = vec![
            row(["Read1", "bg", "exr", "/p/bg.exr", "Up-to-date", "ACEScg", "1-10"]),
            row(["Read2", "N/A", "N/A", "", "Missing", "Unknown", "N/A"]),
        ];
        let mut buffer = Vec::new();

        render_report(&rows, &mut buffer).unwrap();

        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "Node,Asset,Type,Path,Status,Colorspace,Range\n\
             Read1,bg,exr,/p/bg.exr,Up-to-date,ACEScg,1-10\n\
             Read2,N/A,N/A,,Missing,Unknown,N/A\n"
        );
    }

    #[test]
    fn test_fields_with_separators_are_quoted() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_write_report_to_disk() {
        // Arrange
        let dir = tempdir().unwrap();
        let destination = dir.path().join("report.csv");
        let writer = CoreReportWriter::new();

        // Act
        writer.write_report(&[], &destination).unwrap();

        // Assert
        let written = fs::read_to_string(&destination).unwrap();
        assert_eq!(written, "Node,Asset,Type,Path,Status,Colorspace,Range\n");
    }

    #[test]
    fn test_write_report_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let destination = dir.path().join("no_such_dir").join("report.csv");
        let result = CoreReportWriter::new().write_report(&[], &destination);
        assert!(matches!(result, Err(ReportError::Io(_))));
    }
}
