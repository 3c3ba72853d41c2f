//! CSV export of the prediction log

use std::io::BufRead;

use crate::error::AppError;

/// Serialize every log record as CSV. The header is the field set of the
/// first record; later records are serialized positionally against it
/// (divergent records get empty cells for fields they lack).
///
/// Returns `NoData` when the log holds zero records.
pub fn to_csv(reader: impl BufRead) -> Result<String, AppError> {
    let mut records: Vec<serde_json::Map<String, serde_json::Value>> = Vec::new();

    for line in reader.lines() {
        let line = line.map_err(AppError::from)?;
        if line.trim().is_empty() {
            continue;
        }
        let value: serde_json::Value = serde_json::from_str(&line)
            .map_err(|e| AppError::InternalError(format!("Corrupt log record: {}", e)))?;
        match value {
            serde_json::Value::Object(map) => records.push(map),
            _ => {
                return Err(AppError::InternalError(
                    "Corrupt log record: not an object".to_string(),
                ))
            }
        }
    }

    if records.is_empty() {
        return Err(AppError::NoData);
    }

    let header: Vec<String> = records[0].keys().cloned().collect();

    let mut out = String::new();
    out.push_str(&header.iter().map(|h| escape(h)).collect::<Vec<_>>().join(","));
    out.push_str("\r\n");

    for record in &records {
        let row: Vec<String> = header
            .iter()
            .map(|field| record.get(field).map(cell).unwrap_or_default())
            .collect();
        out.push_str(&row.join(","));
        out.push_str("\r\n");
    }

    Ok(out)
}

fn cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => escape(s),
        serde_json::Value::Null => String::new(),
        // Nested objects/arrays land as compact JSON text
        other => escape(&other.to_string()),
    }
}

fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn empty_log_is_no_data() {
        let err = to_csv(Cursor::new("")).unwrap_err();
        assert!(matches!(err, AppError::NoData));
        let err = to_csv(Cursor::new("\n  \n")).unwrap_err();
        assert!(matches!(err, AppError::NoData));
    }

    #[test]
    fn header_comes_from_first_record() {
        let log = "{\"b\":1,\"a\":\"x\"}\n{\"a\":\"y\",\"c\":true}\n";
        let csv = to_csv(Cursor::new(log)).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("a,b"));
        assert_eq!(lines.next(), Some("x,1"));
        // second record has no "b": empty cell, "c" is dropped
        assert_eq!(lines.next(), Some("y,"));
    }

    #[test]
    fn fields_with_commas_and_quotes_are_quoted() {
        let log = "{\"note\":\"a,b \\\"c\\\"\"}\n";
        let csv = to_csv(Cursor::new(log)).unwrap();
        assert!(csv.contains("\"a,b \"\"c\"\"\""));
    }

    #[test]
    fn nested_objects_serialize_as_json_cells() {
        let log = "{\"input\":{\"Heart_Rate\":72.0}}\n";
        let csv = to_csv(Cursor::new(log)).unwrap();
        assert!(csv.lines().nth(1).unwrap().contains("Heart_Rate"));
    }

    #[test]
    fn corrupt_line_fails_the_export() {
        let log = "{\"a\":1}\nnot json\n";
        assert!(matches!(
            to_csv(Cursor::new(log)),
            Err(AppError::InternalError(_))
        ));
    }
}
