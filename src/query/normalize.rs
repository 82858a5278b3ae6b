//! Raw-result normalization into a uniform table plus status string.

use std::fmt;

use serde_json::Value;

use crate::api::Transform;

/// Pipeline status. Display strings are part of the output contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Success,
    SuccessNoResults,
    NonSupportedTransform,
    QueryError(String),
}

impl Status {
    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success | Status::SuccessNoResults)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success => f.write_str("Success"),
            Status::SuccessNoResults => f.write_str("Success - No Results"),
            Status::NonSupportedTransform => f.write_str("Failure - Non-Supported Transform"),
            Status::QueryError(msg) => write!(f, "Failure - query_error: {msg}"),
        }
    }
}

/// Uniform tabular record set.
///
/// Columns are the union of keys across all records in first-seen order;
/// a missing or null value is `None` (the absent-value marker).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Normalize the raw extracted value for an endpoint's transform kind.
///
/// `transform` is `None` for an endpoint outside the registered table
/// (reachable via the rerun override or a forced dispatch): the remote
/// value has no defined normalization and is reported as a non-supported
/// transform, unless it was empty anyway.
pub fn normalize(
    endpoint: &str,
    transform: Option<Transform>,
    raw: Option<Vec<Value>>,
) -> (Option<Table>, Status) {
    let Some(records) = raw else {
        return (None, Status::SuccessNoResults);
    };
    if records.is_empty() {
        return (None, Status::SuccessNoResults);
    }

    match transform {
        Some(Transform::List) => (Some(list_table(endpoint, &records)), Status::Success),
        Some(
            Transform::Default
            | Transform::ListProducts
            | Transform::SingleDomain
            | Transform::KeywordArgs
            | Transform::QueryArgs
            | Transform::QueryArgsHistory,
        ) => (Some(record_table(&records)), Status::Success),
        None => (None, Status::NonSupportedTransform),
    }
}

/// Single-column table named after the endpoint, one row per element.
fn list_table(endpoint: &str, records: &[Value]) -> Table {
    let rows = records
        .iter()
        .map(|v| vec![Some(scalar_cell(v))])
        .collect();
    Table {
        columns: vec![endpoint.to_string()],
        rows,
    }
}

/// Union-of-keys table over a sequence of flat mappings. Non-object
/// records contribute no columns and yield an all-absent row.
fn record_table(records: &[Value]) -> Table {
    let mut columns: Vec<String> = Vec::new();
    for rec in records {
        if let Some(obj) = rec.as_object() {
            for key in obj.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
    }

    let mut rows = Vec::with_capacity(records.len());
    for rec in records {
        let obj = rec.as_object();
        let row = columns
            .iter()
            .map(|col| {
                obj.and_then(|o| o.get(col)).and_then(|v| {
                    if v.is_null() {
                        None
                    } else {
                        Some(scalar_cell(v))
                    }
                })
            })
            .collect();
        rows.push(row);
    }

    Table { columns, rows }
}

/// Render a JSON value as a table cell: strings verbatim, other scalars via
/// their canonical text, nested values as compact JSON.
fn scalar_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_display_strings() {
        assert_eq!(Status::Success.to_string(), "Success");
        assert_eq!(Status::SuccessNoResults.to_string(), "Success - No Results");
        assert_eq!(
            Status::NonSupportedTransform.to_string(),
            "Failure - Non-Supported Transform"
        );
        assert_eq!(
            Status::QueryError("boom".into()).to_string(),
            "Failure - query_error: boom"
        );
    }

    #[test]
    fn absent_raw_is_no_results() {
        let (table, status) = normalize("iris_enrich", Some(Transform::Default), None);
        assert!(table.is_none());
        assert_eq!(status, Status::SuccessNoResults);
    }

    #[test]
    fn empty_raw_is_no_results() {
        let (table, status) = normalize("iris_enrich", Some(Transform::Default), Some(vec![]));
        assert!(table.is_none());
        assert_eq!(status, Status::SuccessNoResults);
    }

    #[test]
    fn list_transform_single_column_named_after_endpoint() {
        let raw = vec![json!("a"), json!("b")];
        let (table, status) = normalize("available_api_calls", Some(Transform::List), Some(raw));
        let table = table.unwrap();
        assert_eq!(status, Status::Success);
        assert_eq!(table.columns, vec!["available_api_calls"]);
        assert_eq!(
            table.rows,
            vec![vec![Some("a".to_string())], vec![Some("b".to_string())]]
        );
    }

    #[test]
    fn record_table_union_of_keys_with_absent_marker() {
        let raw = vec![
            json!({"domain": "a.com", "risk": 10}),
            json!({"domain": "b.com", "registrar": "x"}),
        ];
        let (table, status) = normalize("iris_enrich", Some(Transform::Default), Some(raw));
        let table = table.unwrap();
        assert_eq!(status, Status::Success);
        assert_eq!(table.columns, vec!["domain", "risk", "registrar"]);
        assert_eq!(
            table.rows[0],
            vec![Some("a.com".into()), Some("10".into()), None]
        );
        assert_eq!(
            table.rows[1],
            vec![Some("b.com".into()), None, Some("x".into())]
        );
    }

    #[test]
    fn null_values_are_absent() {
        let raw = vec![json!({"domain": "a.com", "expires": null})];
        let (table, _) = normalize("domain_profile", Some(Transform::SingleDomain), Some(raw));
        let table = table.unwrap();
        assert_eq!(table.rows[0], vec![Some("a.com".into()), None]);
    }

    #[test]
    fn nested_values_render_as_compact_json() {
        let raw = vec![json!({"domain": "a.com", "ips": ["1.1.1.1", "2.2.2.2"]})];
        let (table, _) = normalize("iris_investigate", Some(Transform::KeywordArgs), Some(raw));
        let table = table.unwrap();
        assert_eq!(
            table.rows[0][1],
            Some(r#"["1.1.1.1","2.2.2.2"]"#.to_string())
        );
    }

    #[test]
    fn unrecognized_transform_fails_when_data_present() {
        let raw = vec![json!({"k": "v"})];
        let (table, status) = normalize("brand_monitor", None, Some(raw));
        assert!(table.is_none());
        assert_eq!(status, Status::NonSupportedTransform);
    }

    #[test]
    fn unrecognized_transform_with_empty_raw_is_still_no_results() {
        let (table, status) = normalize("brand_monitor", None, Some(vec![]));
        assert!(table.is_none());
        assert_eq!(status, Status::SuccessNoResults);
    }
}
