//! Stored representations of non-scalar fields.
//!
//! Lists are JSON text, dates are `YYYY-MM-DD` text and enums use their
//! stored spelling. Decoding never fails: a malformed value is logged with
//! its table, column and row id and read as empty.

use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

/// Where a stored value came from, for warnings.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Cell {
    pub table: &'static str,
    pub column: &'static str,
    pub id: i64,
}

impl Cell {
    pub(crate) const fn new(table: &'static str, column: &'static str, id: i64) -> Self {
        Self { table, column, id }
    }

    fn warn_malformed(&self, detail: &str) {
        warn!(
            table = self.table,
            column = self.column,
            id = self.id,
            detail,
            "Malformed stored value, reading as empty"
        );
    }
}

/// Encode a list as JSON text.
pub(crate) fn encode_list<T: Serialize>(items: &[T]) -> serde_json::Result<String> {
    serde_json::to_string(items)
}

/// Decode a JSON list column, failing closed to an empty list.
pub(crate) fn decode_list<T: DeserializeOwned>(raw: Option<String>, cell: Cell) -> Vec<T> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<T>>(&raw) {
        Ok(items) => items,
        Err(e) => {
            cell.warn_malformed(&e.to_string());
            Vec::new()
        }
    }
}

/// Encode a date column.
pub(crate) fn encode_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Decode a date column. Accepts full ISO timestamps by reading the date part.
pub(crate) fn decode_date(raw: Option<String>, cell: Cell) -> Option<NaiveDate> {
    let raw = raw.filter(|s| !s.trim().is_empty())?;
    let date_part = raw.trim().get(..10).unwrap_or(raw.trim());
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            cell.warn_malformed(&format!("not a date: {raw}"));
            None
        }
    }
}

/// Decode an enum column through its stored-spelling parser.
pub(crate) fn decode_enum<T>(
    raw: Option<String>,
    parse: impl Fn(&str) -> Option<T>,
    cell: Cell,
) -> Option<T> {
    let raw = raw?;
    let parsed = parse(&raw);
    if parsed.is_none() {
        cell.warn_malformed(&format!("unknown value: {raw}"));
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    const CELL: Cell = Cell::new("listings", "amenities", 1);

    #[test]
    fn test_decode_list_fails_closed() {
        let items: Vec<String> = decode_list(Some("not json".to_string()), CELL);
        assert!(items.is_empty());

        let items: Vec<String> = decode_list(None, CELL);
        assert!(items.is_empty());

        let items: Vec<String> = decode_list(Some(r#"["gym","pool"]"#.to_string()), CELL);
        assert_eq!(items, vec!["gym", "pool"]);
    }

    #[test]
    fn test_decode_date_accepts_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2025, 7, 4);
        assert_eq!(decode_date(Some("2025-07-04".to_string()), CELL), expected);
        assert_eq!(
            decode_date(Some("2025-07-04T10:00:00.000Z".to_string()), CELL),
            expected
        );
        assert_eq!(decode_date(Some("soon".to_string()), CELL), None);
        assert_eq!(decode_date(Some(String::new()), CELL), None);
    }

    #[test]
    fn test_decode_enum_unknown_is_none() {
        let parse = |s: &str| (s == "yes").then_some(true);
        assert_eq!(decode_enum(Some("yes".to_string()), parse, CELL), Some(true));
        assert_eq!(decode_enum(Some("maybe".to_string()), parse, CELL), None);
    }
}
