//! Named instance state and the authentication collaborator.
//!
//! An `Instance` owns an authenticated `Session` plus the state the query
//! pipeline reads: the live capability set, the last submitted query (rerun
//! detection only, not a success marker) and the help store. Instances live
//! in a plain `Registry` map; the design assumes a single interactive
//! caller and takes no locks.

use std::collections::{BTreeSet, HashMap};

use serde_json::Value;

use crate::api::{self, ApiError, CallArgs, Session};
use crate::helptext::HelpStore;
use crate::{log_debug, log_warn};

/// Per-instance options, constructed explicitly at creation and never
/// shared between instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceOptions {
    pub verify_ssl: bool,
    pub rate_limit: bool,
}

impl Default for InstanceOptions {
    fn default() -> Self {
        Self {
            verify_ssl: true,
            rate_limit: true,
        }
    }
}

impl InstanceOptions {
    /// Seed options from `DTQ_VERIFY_SSL` / `DTQ_RATE_LIMIT`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            verify_ssl: env_bool("DTQ_VERIFY_SSL", defaults.verify_ssl),
            rate_limit: env_bool("DTQ_RATE_LIMIT", defaults.rate_limit),
        }
    }
}

fn env_bool(var: &str, default: bool) -> bool {
    match std::env::var(var) {
        Ok(raw) => parse_bool_opt(&raw, default),
        Err(_) => default,
    }
}

/// Lenient string-to-bool coercion for option values: `true`/`false` and
/// `1`/`0`, case-insensitive, whitespace-tolerant. Anything else keeps the
/// default.
pub fn parse_bool_opt(raw: &str, default: bool) -> bool {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => true,
        "false" | "0" => false,
        _ => default,
    }
}

/// One authenticated connection plus the pipeline state keyed to it.
pub struct Instance {
    pub name: String,
    pub options: InstanceOptions,
    pub available_endpoints: BTreeSet<String>,
    pub last_query: Option<String>,
    pub session: Box<dyn Session>,
    pub help: HelpStore,
}

impl Instance {
    /// Authenticate: enumerate the live capability set, refresh the help
    /// store from introspection, and report registered endpoints the
    /// session does not expose.
    ///
    /// The live listing does not include `available_api_calls` itself, so
    /// it is appended.
    pub fn connect(
        name: impl Into<String>,
        options: InstanceOptions,
        session: Box<dyn Session>,
    ) -> Result<Self, ApiError> {
        let name = name.into();
        log_debug!(
            "Connecting instance {name} (verify_ssl={}, rate_limit={})",
            options.verify_ssl,
            options.rate_limit
        );

        let raw = session.invoke("available_api_calls", &CallArgs::None)?;
        let mut available = endpoint_names(&raw);
        available.insert("available_api_calls".to_string());

        for descriptor in api::REGISTERED {
            if !available.contains(descriptor.name) {
                log_warn!(
                    "Registered endpoint {} not exposed by instance {name}",
                    descriptor.name
                );
            }
        }

        let help = HelpStore::from_introspection(session.introspect());
        log_debug!("Instance {name}: {} endpoints, {} help entries", available.len(), help.len());

        Ok(Self {
            name,
            options,
            available_endpoints: available,
            last_query: None,
            session,
            help,
        })
    }

    /// Whether this query is textually identical to the last submission.
    pub fn is_rerun(&self, query: &str) -> bool {
        self.last_query.as_deref() == Some(query)
    }

    /// Record a submission for rerun detection, independent of outcome.
    pub fn record_query(&mut self, query: &str) {
        self.last_query = Some(query.to_string());
    }
}

fn endpoint_names(raw: &Value) -> BTreeSet<String> {
    raw.as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Process-wide instance registry, keyed by instance name.
#[derive(Default)]
pub struct Registry {
    instances: HashMap<String, Instance>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, instance: Instance) {
        self.instances.insert(instance.name.clone(), instance);
    }

    pub fn get(&self, name: &str) -> Option<&Instance> {
        self.instances.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Instance> {
        self.instances.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.instances.contains_key(name)
    }
}
