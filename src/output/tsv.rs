use std::io::Write;

use crate::error::MemopError;
use crate::model::ProcessRecord;

/// Write process records as TSV.
///
/// Output: header row + one row per record, in the order given.
/// Columns are tab-separated: pid, name, rss_bytes.
pub fn write_tsv(records: &[ProcessRecord], writer: &mut impl Write) -> Result<(), MemopError> {
    writeln!(writer, "pid\tname\trss_bytes").map_err(MemopError::Output)?;

    for record in records {
        writeln!(
            writer,
            "{}\t{}\t{}",
            record.pid,
            escape_tsv(&record.name),
            record.resident_bytes,
        )
        .map_err(MemopError::Output)?;
    }

    Ok(())
}

/// Escape tabs and newlines in a string for TSV output.
fn escape_tsv(s: &str) -> String {
    s.replace(['\t', '\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(records: &[ProcessRecord]) -> String {
        let mut buf = Vec::new();
        write_tsv(records, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn empty_records_produce_header_only() {
        let output = render(&[]);
        assert_eq!(output, "pid\tname\trss_bytes\n");
    }

    #[test]
    fn rows_keep_input_order() {
        let output = render(&[
            ProcessRecord::new(42, "postgres", 734_003_200),
            ProcessRecord::new(7, "java", 2_147_483_648),
        ]);
        let rows: Vec<&str> = output.lines().skip(1).collect();
        assert_eq!(rows, vec!["42\tpostgres\t734003200", "7\tjava\t2147483648"]);
    }

    #[test]
    fn tab_in_name_is_escaped() {
        let output = render(&[ProcessRecord::new(1, "foo\tbar", 10)]);
        let row = output.lines().nth(1).unwrap();
        assert_eq!(row.split('\t').count(), 3);
        assert!(row.contains("foo bar"));
    }

    #[test]
    fn newline_escape() {
        assert_eq!(escape_tsv("line1\nline2"), "line1 line2");
    }
}
