//! Decoded-argument dispatch against the instance session, with
//! raw-result extraction per transform kind.
//!
//! Every remote failure is caught here and converted into a status; no
//! retry is attempted. The submitted query is recorded on the instance as
//! part of every dispatch, success or failure, for rerun detection.

use serde_json::Value;

use crate::api::{self, CallArgs, Transform};
use crate::helptext::render_help;
use crate::instance::Instance;
use crate::log_debug;
use crate::query::decode::{decode_keywords, decode_query_args, strip_single_quotes};
use crate::query::normalize::{Status, Table, normalize};
use crate::query::parse::parse_query;

/// Result of running one query through the pipeline.
#[derive(Debug)]
pub struct QueryOutcome {
    pub endpoint: String,
    pub table: Option<Table>,
    pub status: Status,
    /// Rendered help text, present only for the `help` endpoint.
    pub help: Option<String>,
}

/// Parse, decode, dispatch and normalize one query against an instance.
pub fn run_query(query: &str, instance: &mut Instance) -> QueryOutcome {
    let (endpoint, body) = parse_query(query);
    instance.record_query(query);

    if endpoint == "help" {
        let text = render_help(
            body.as_deref(),
            &instance.help,
            &instance.available_endpoints,
        );
        return QueryOutcome {
            endpoint,
            table: None,
            status: Status::SuccessNoResults,
            help: Some(text),
        };
    }

    let transform = api::transform_for(&endpoint);
    // Outside the registered table the default decode/call path applies;
    // normalization then reports the transform as non-supported.
    let effective = transform.unwrap_or(Transform::Default);
    log_debug!("Endpoint: {endpoint}, transform: {effective}, body: {body:?}");

    let mut body = body.unwrap_or_default();
    if endpoint == "iris_enrich" {
        // Users paste quoted, comma-separated domain lists.
        body = strip_single_quotes(&body);
    }

    let args = match effective {
        Transform::Default | Transform::SingleDomain => CallArgs::Positional(body),
        Transform::List | Transform::ListProducts => CallArgs::None,
        Transform::KeywordArgs => CallArgs::Keywords(decode_keywords(&body)),
        Transform::QueryArgs | Transform::QueryArgsHistory => {
            CallArgs::Keywords(decode_query_args(&body))
        }
    };

    let raw = match instance.session.invoke(&endpoint, &args) {
        Ok(value) => extract(effective, value),
        Err(err) => {
            return QueryOutcome {
                endpoint,
                table: None,
                status: Status::QueryError(err.to_string()),
                help: None,
            };
        }
    };

    let (table, status) = normalize(&endpoint, transform, raw);
    QueryOutcome {
        endpoint,
        table,
        status,
        help: None,
    }
}

/// Pull the record sequence out of the raw return value per transform
/// kind. A missing field means no results; a present non-array value is a
/// single record.
fn extract(transform: Transform, value: Value) -> Option<Vec<Value>> {
    match transform {
        Transform::Default | Transform::KeywordArgs | Transform::QueryArgs => {
            field_records(value, "results")
        }
        Transform::ListProducts => field_records(value, "products"),
        Transform::QueryArgsHistory => field_records(value, "history"),
        Transform::SingleDomain => {
            if value.is_null() {
                None
            } else {
                Some(vec![value])
            }
        }
        // The whole return value is the list.
        Transform::List => value.as_array().cloned(),
    }
}

fn field_records(mut value: Value, field: &str) -> Option<Vec<Value>> {
    let field_value = value.get_mut(field).map(Value::take)?;
    match field_value {
        Value::Null => None,
        Value::Array(items) => Some(items),
        single => Some(vec![single]),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::instance::testutil::{MockSession, instance_with_endpoints};
    use crate::query::decode::ArgumentSet;

    fn instance_with_session(session: MockSession) -> Instance {
        let mut inst = instance_with_endpoints(&[]);
        inst.session = Box::new(session);
        inst
    }

    #[test]
    fn default_transform_positional_body_and_results_field() {
        let session = MockSession::default().with_response(
            "iris_enrich",
            json!({"results": [{"domain": "a.com"}, {"domain": "b.com"}]}),
        );
        let calls = session.calls.clone();
        let mut inst = instance_with_session(session);

        let outcome = run_query("iris_enrich\ndomains=a.com,b.com", &mut inst);
        assert_eq!(outcome.status, Status::Success);
        assert_eq!(outcome.table.unwrap().row_count(), 2);

        let recorded = calls.borrow();
        assert_eq!(
            recorded[0],
            (
                "iris_enrich".to_string(),
                CallArgs::Positional("domains=a.com,b.com".to_string())
            )
        );
    }

    #[test]
    fn iris_enrich_strips_single_quotes_before_decoding() {
        let session = MockSession::default()
            .with_response("iris_enrich", json!({"results": []}));
        let calls = session.calls.clone();
        let mut inst = instance_with_session(session);

        run_query("iris_enrich\ndomains='a.com','b.com'", &mut inst);
        let recorded = calls.borrow();
        assert_eq!(
            recorded[0].1,
            CallArgs::Positional("domains=a.com,b.com".to_string())
        );
    }

    #[test]
    fn list_transform_calls_without_args() {
        let session = MockSession::default()
            .with_response("available_api_calls", json!(["iris_enrich", "whois"]));
        let calls = session.calls.clone();
        let mut inst = instance_with_session(session);

        let outcome = run_query("available_api_calls", &mut inst);
        assert_eq!(outcome.status, Status::Success);
        let table = outcome.table.unwrap();
        assert_eq!(table.columns, vec!["available_api_calls"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(calls.borrow()[0].1, CallArgs::None);
    }

    #[test]
    fn list_products_extracts_products_field() {
        let session = MockSession::default().with_response(
            "account_information",
            json!({"products": [{"id": "iris", "usage": 3}]}),
        );
        let mut inst = instance_with_session(session);
        let outcome = run_query("account_information", &mut inst);
        assert_eq!(outcome.status, Status::Success);
        assert_eq!(outcome.table.unwrap().columns, vec!["id", "usage"]);
    }

    #[test]
    fn single_domain_wraps_response_object() {
        let session = MockSession::default()
            .with_response("domain_profile", json!({"domain": "example.com", "risk": 7}));
        let mut inst = instance_with_session(session);
        let outcome = run_query("domain_profile\nexample.com", &mut inst);
        let table = outcome.table.unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.columns, vec!["domain", "risk"]);
    }

    #[test]
    fn keyword_args_decoded_and_passed() {
        let session = MockSession::default()
            .with_response("iris_investigate", json!({"results": [{"domain": "a.com"}]}));
        let calls = session.calls.clone();
        let mut inst = instance_with_session(session);

        run_query(
            "iris_investigate\ndomain=example.com\nincludeSubdomains=true",
            &mut inst,
        );
        let mut expected = ArgumentSet::new();
        expected.insert("domain", "example.com");
        expected.insert("includeSubdomains", "true");
        assert_eq!(calls.borrow()[0].1, CallArgs::Keywords(expected));
    }

    #[test]
    fn query_args_carry_positional_query_key() {
        let session = MockSession::default()
            .with_response("reverse_whois", json!({"results": [{"domain": "a.com"}]}));
        let calls = session.calls.clone();
        let mut inst = instance_with_session(session);

        run_query("reverse_whois\nexample.com\nmode=purchased", &mut inst);
        let mut expected = ArgumentSet::new();
        expected.insert("query", "example.com");
        expected.insert("mode", "purchased");
        assert_eq!(calls.borrow()[0].1, CallArgs::Keywords(expected));
    }

    #[test]
    fn query_args_history_extracts_history_field() {
        let session = MockSession::default().with_response(
            "whois_history",
            json!({"history": [{"date": "2020-01-01"}, {"date": "2021-01-01"}]}),
        );
        let mut inst = instance_with_session(session);
        let outcome = run_query("whois_history\nexample.com", &mut inst);
        assert_eq!(outcome.status, Status::Success);
        assert_eq!(outcome.table.unwrap().row_count(), 2);
    }

    #[test]
    fn missing_results_field_is_no_results() {
        let session = MockSession::default()
            .with_response("iris_enrich", json!({"limit_exceeded": false}));
        let mut inst = instance_with_session(session);
        let outcome = run_query("iris_enrich\ndomains=a.com", &mut inst);
        assert!(outcome.table.is_none());
        assert_eq!(outcome.status, Status::SuccessNoResults);
    }

    #[test]
    fn remote_error_becomes_query_error_status() {
        let session = MockSession {
            fail_with: Some("connection reset by peer".to_string()),
            ..Default::default()
        };
        let mut inst = instance_with_session(session);
        let outcome = run_query("iris_enrich\ndomains=a.com", &mut inst);
        assert!(outcome.table.is_none());
        assert_eq!(
            outcome.status.to_string(),
            "Failure - query_error: connection reset by peer"
        );
        // Recorded even though the call failed.
        assert!(inst.is_rerun("iris_enrich\ndomains=a.com"));
    }

    #[test]
    fn help_bypasses_dispatch() {
        let mut inst = instance_with_endpoints(&["iris_enrich"]);
        let outcome = run_query("help", &mut inst);
        assert!(outcome.table.is_none());
        assert_eq!(outcome.status, Status::SuccessNoResults);
        let help = outcome.help.unwrap();
        assert!(help.contains("Available API"));
        assert!(inst.is_rerun("help"));
    }

    #[test]
    fn unregistered_endpoint_dispatches_with_default_then_unsupported() {
        let session = MockSession::default()
            .with_response("brand_monitor", json!({"results": [{"k": "v"}]}));
        let calls = session.calls.clone();
        let mut inst = instance_with_session(session);

        let outcome = run_query("brand_monitor\nexample.com", &mut inst);
        assert_eq!(
            calls.borrow()[0].1,
            CallArgs::Positional("example.com".to_string())
        );
        assert!(outcome.table.is_none());
        assert_eq!(outcome.status, Status::NonSupportedTransform);
    }
}
