//! Replay session: a `Session` backed by canned endpoint responses loaded
//! from a fixture file (JSON or YAML, picked by extension).
//!
//! Real HTTP transport, credentials and proxying live outside this crate;
//! the replay session is what the CLI binds to so the pipeline can run
//! against recorded API output.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::api::{ApiError, CallArgs, Introspection, Session};

/// On-disk fixture shape.
///
/// `responses` maps endpoint name to the raw return value: the response
/// mapping for record-shaped endpoints, a bare array for list-shaped ones.
/// `help_text` is the introspection dump parsed into the help store.
#[derive(Debug, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub help_text: String,
    #[serde(default)]
    pub responses: HashMap<String, Value>,
}

pub struct ReplaySession {
    fixture: Fixture,
}

impl ReplaySession {
    pub fn new(fixture: Fixture) -> Self {
        Self { fixture }
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fixture file: {path}"))?;
        let lower = path.to_ascii_lowercase();

        let fixture: Fixture = if lower.ends_with(".yaml") || lower.ends_with(".yml") {
            serde_yaml::from_str(&raw).context("failed to parse YAML fixture")?
        } else {
            serde_json::from_str(&raw).context("failed to parse JSON fixture")?
        };
        Ok(Self::new(fixture))
    }
}

impl Session for ReplaySession {
    fn invoke(&self, endpoint: &str, _args: &CallArgs) -> Result<Value, ApiError> {
        self.fixture
            .responses
            .get(endpoint)
            .cloned()
            .ok_or_else(|| {
                ApiError::classify(format!("no recorded response for endpoint '{endpoint}'"))
            })
    }

    fn introspect(&self) -> Introspection {
        Introspection::Text(self.fixture.help_text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_fixture_roundtrip() {
        let path = std::env::temp_dir().join("dtq_fixture_test.json");
        std::fs::write(
            &path,
            r#"{
                "help_text": " |  Methods defined here:",
                "responses": {
                    "available_api_calls": ["iris_enrich"],
                    "iris_enrich": {"results": [{"domain": "a.com"}]}
                }
            }"#,
        )
        .unwrap();

        let session = ReplaySession::from_file(path.to_str().unwrap()).unwrap();
        let value = session
            .invoke("available_api_calls", &CallArgs::None)
            .unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        match session.introspect() {
            Introspection::Text(t) => assert!(t.contains("Methods defined here:")),
            Introspection::Structured(_) => panic!("expected text introspection"),
        }
    }

    #[test]
    fn yaml_fixture_by_extension() {
        let path = std::env::temp_dir().join("dtq_fixture_test.yaml");
        std::fs::write(
            &path,
            "responses:\n  available_api_calls:\n    - iris_enrich\n    - whois\n",
        )
        .unwrap();

        let session = ReplaySession::from_file(path.to_str().unwrap()).unwrap();
        let value = session
            .invoke("available_api_calls", &CallArgs::None)
            .unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[test]
    fn unknown_endpoint_is_api_error() {
        let session = ReplaySession::new(Fixture::default());
        let err = session
            .invoke("iris_enrich", &CallArgs::Positional("x".into()))
            .unwrap_err();
        assert!(err.to_string().contains("no recorded response"));
        assert!(!err.is_bad_credentials());
    }
}
