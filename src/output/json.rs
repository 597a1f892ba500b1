use std::io::Write;

use crate::error::MemopError;
use crate::model::ProcessRecord;

/// Write process records as a pretty-printed JSON array.
pub fn write_json(records: &[ProcessRecord], writer: &mut impl Write) -> Result<(), MemopError> {
    serde_json::to_writer_pretty(&mut *writer, records)
        .map_err(|e| MemopError::Serialization(e.to_string()))?;
    writeln!(writer).map_err(MemopError::Output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_empty_array() {
        let mut buf = Vec::new();
        write_json(&[], &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value, serde_json::json!([]));
    }

    #[test]
    fn record_fields() {
        let mut buf = Vec::new();
        write_json(&[ProcessRecord::new(4321, "firefox", 524_288_000)], &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                { "pid": 4321, "name": "firefox", "resident_bytes": 524288000u64 }
            ])
        );
    }

    #[test]
    fn empty_name_is_kept() {
        let mut buf = Vec::new();
        write_json(&[ProcessRecord::new(1, "", 0)], &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value[0]["name"], "");
    }
}
