//! CSV dump of tabular records.
use serde_json::Value;

use crate::OutputError;

/// Header is the union of record keys in order of first appearance;
/// missing cells are empty.
pub fn records_to_csv(records: &[Value]) -> Result<String, OutputError> {
    let mut headers: Vec<&str> = Vec::new();
    for (i, record) in records.iter().enumerate() {
        let object = record
            .as_object()
            .ok_or_else(|| OutputError::Render(format!("record {} is not an object", i)))?;
        for key in object.keys() {
            if !headers.contains(&key.as_str()) {
                headers.push(key);
            }
        }
    }

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            headers
                .iter()
                .map(|h| record.get(*h).map(cell_text).unwrap_or_default())
                .collect()
        })
        .collect();

    Ok(write_rows(&headers, &rows))
}

pub fn write_rows<H: AsRef<str>>(headers: &[H], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    if headers.is_empty() {
        return out;
    }
    push_row(&mut out, headers.iter().map(|h| h.as_ref()));
    for row in rows {
        push_row(&mut out, row.iter().map(String::as_str));
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    let line: Vec<String> = cells.map(quote).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn quote(cell: &str) -> String {
    if cell.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
