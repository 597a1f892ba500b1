use std::io::Write;

use crate::error::MemopError;
use crate::model::{ProcessRecord, TerminationReport, Threshold, TrimOutcome, TrimReport};

/// Write process records one per line: `PID=<id> name=<name> rssMB=<mb>`.
///
/// An empty listing is stated explicitly rather than left blank.
pub fn write_text(
    records: &[ProcessRecord],
    threshold: Threshold,
    writer: &mut impl Write,
) -> Result<(), MemopError> {
    write_text_inner(records, threshold, writer).map_err(MemopError::Output)
}

fn write_text_inner(
    records: &[ProcessRecord],
    threshold: Threshold,
    w: &mut impl Write,
) -> Result<(), std::io::Error> {
    if records.is_empty() {
        writeln!(w, "No processes found using >= {threshold}")?;
    }
    for record in records {
        writeln!(
            w,
            "PID={} name={} rssMB={}",
            record.pid,
            record.name,
            record.resident_mb()
        )?;
    }
    Ok(())
}

/// Write the before/after lines of a trim, plus a note when the request did
/// not go through.
pub fn write_trim_report(report: &TrimReport, writer: &mut impl Write) -> Result<(), MemopError> {
    write_trim_inner(report, writer).map_err(MemopError::Output)
}

fn write_trim_inner(report: &TrimReport, w: &mut impl Write) -> Result<(), std::io::Error> {
    writeln!(w, "Before trim: {}", format_kb(report.before_bytes))?;
    match report.outcome {
        TrimOutcome::Released | TrimOutcome::NothingReleased => {}
        TrimOutcome::Unsupported => {
            writeln!(w, "No working set trim facility available on this platform.")?
        }
        TrimOutcome::Failed { code: Some(code) } => {
            writeln!(w, "Working set trim failed, error={code}")?
        }
        TrimOutcome::Failed { code: None } => writeln!(w, "Working set trim failed")?,
    }
    writeln!(w, "After  trim: {}", format_kb(report.after_bytes))?;
    Ok(())
}

/// Write one termination attempt: `Attempting to terminate PID <id> ... OK`.
pub fn write_termination(
    report: &TerminationReport,
    writer: &mut impl Write,
) -> Result<(), MemopError> {
    writeln!(
        writer,
        "Attempting to terminate PID {} ... {}",
        report.pid,
        if report.terminated { "OK" } else { "FAILED" }
    )
    .map_err(MemopError::Output)
}

fn format_kb(bytes: Option<u64>) -> String {
    match bytes {
        Some(b) => format!("{} KB", b / 1024),
        None => "unavailable".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    fn render_listing(records: &[ProcessRecord], mb: u64) -> String {
        let mut buf = Vec::new();
        write_text(records, Threshold::from_megabytes(mb), &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn render_trim(report: TrimReport) -> String {
        let mut buf = Vec::new();
        write_trim_report(&report, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn listing_line_format() {
        let output = render_listing(&[ProcessRecord::new(101, "b", 200 * MB + 5)], 100);
        assert_eq!(output, "PID=101 name=b rssMB=200\n");
    }

    #[test]
    fn empty_name_still_has_field() {
        let output = render_listing(&[ProcessRecord::new(3, "", 64 * MB)], 1);
        assert_eq!(output, "PID=3 name= rssMB=64\n");
    }

    #[test]
    fn empty_listing_says_so() {
        let output = render_listing(&[], 250);
        assert_eq!(output, "No processes found using >= 250 MB\n");
    }

    #[test]
    fn trim_report_lines() {
        let output = render_trim(TrimReport {
            before_bytes: Some(4096 * 1024),
            outcome: TrimOutcome::Released,
            after_bytes: Some(1024 * 1024),
        });
        assert_eq!(output, "Before trim: 4096 KB\nAfter  trim: 1024 KB\n");
    }

    #[test]
    fn trim_report_unsupported() {
        let output = render_trim(TrimReport {
            before_bytes: None,
            outcome: TrimOutcome::Unsupported,
            after_bytes: None,
        });
        assert!(output.contains("No working set trim facility"));
        assert!(output.starts_with("Before trim: unavailable\n"));
    }

    #[test]
    fn trim_report_failure_code() {
        let output = render_trim(TrimReport {
            before_bytes: Some(2048),
            outcome: TrimOutcome::Failed { code: Some(5) },
            after_bytes: Some(2048),
        });
        assert_eq!(
            output,
            "Before trim: 2 KB\nWorking set trim failed, error=5\nAfter  trim: 2 KB\n"
        );
    }

    #[test]
    fn termination_lines() {
        let mut buf = Vec::new();
        write_termination(
            &TerminationReport {
                pid: 9,
                terminated: true,
            },
            &mut buf,
        )
        .unwrap();
        write_termination(
            &TerminationReport {
                pid: 10,
                terminated: false,
            },
            &mut buf,
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Attempting to terminate PID 9 ... OK\nAttempting to terminate PID 10 ... FAILED\n"
        );
    }
}
