pub mod json;
pub mod text;
pub mod tsv;

use std::io::Write;

use crate::cli::OutputFormat;
use crate::error::MemopError;
use crate::model::{ProcessRecord, Threshold};

/// Write the processes found for `threshold` in the requested format.
pub fn write_listing(
    records: &[ProcessRecord],
    threshold: Threshold,
    format: OutputFormat,
    writer: &mut impl Write,
) -> Result<(), MemopError> {
    match format {
        OutputFormat::Text => text::write_text(records, threshold, writer),
        OutputFormat::Tsv => tsv::write_tsv(records, writer),
        OutputFormat::Json => json::write_json(records, writer),
    }
}
