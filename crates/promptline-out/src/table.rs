//! Markdown table extraction from model output.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::csv::write_rows;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl MarkdownTable {
    pub fn to_csv(&self) -> String {
        write_rows(&self.headers, &self.rows)
    }

    /// One JSON object per row, keyed by header.
    pub fn to_records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let object: Map<String, Value> = self
                    .headers
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned().map(Value::String))
                    .collect();
                Value::Object(object)
            })
            .collect()
    }
}

/// Parse the first pipe table found in `text`.
///
/// Lines containing `|` are table lines; the first is the header and the
/// second (the `---` separator) is skipped. Rows whose cell count differs
/// from the header are dropped. Returns `None` when no header is found.
pub fn parse_markdown_table(text: &str) -> Option<MarkdownTable> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.contains('|'))
        .collect();

    let headers = split_cells(lines.first()?);
    if headers.is_empty() {
        return None;
    }

    let rows = lines
        .iter()
        .skip(2)
        .map(|line| split_cells(line))
        .filter(|cells| cells.len() == headers.len())
        .collect();

    Some(MarkdownTable { headers, rows })
}

fn split_cells(line: &str) -> Vec<String> {
    let inner = line.strip_prefix('|').unwrap_or(line);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|cell| cell.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = "Here is the comparison:\n\n\
        | Company | Pricing | Key Features |\n\
        |---|---|---|\n\
        | Acme (acme.io) | $10/mo | Sync, Search, API |\n\
        | Globex | Free tier | Reports |\n\
        | broken row |\n";

    #[test]
    fn test_parse_table() {
        let table = parse_markdown_table(RESPONSE).unwrap();
        assert_eq!(table.headers, vec!["Company", "Pricing", "Key Features"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], "Acme (acme.io)");
    }

    #[test]
    fn test_to_csv_and_records() {
        let table = parse_markdown_table(RESPONSE).unwrap();
        let csv = table.to_csv();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Company,Pricing,Key Features"));
        assert_eq!(lines.next(), Some("Acme (acme.io),$10/mo,\"Sync, Search, API\""));
        assert_eq!(lines.next(), Some("Globex,Free tier,Reports"));
        let records = table.to_records();
        assert_eq!(records[1]["Pricing"], "Free tier");
    }

    #[test]
    fn test_no_table() {
        assert!(parse_markdown_table("no table here").is_none());
    }
}
