//! DomainTools API surface: the static endpoint/transform table, the
//! `Session` capability trait and its error type.
//!
//! Transform selection is a closed table (`Transform` enum + `REGISTERED`
//! descriptors) fixed at build time. `Session::invoke` still takes the
//! endpoint name as a string: the live capability set is only known at
//! runtime and the validator's rerun override deliberately allows
//! dispatching endpoints outside the static table with the default
//! transform.

use std::fmt;

use serde_json::Value;

use crate::helptext::HelpEntry;
use crate::query::decode::ArgumentSet;

/// Decode/extract/normalize strategy associated with an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Positional body, `results` field extracted. Also the implicit kind
    /// for endpoints outside the registered table.
    Default,
    /// No arguments; the whole returned value is the list.
    List,
    /// No arguments; `products` field extracted.
    ListProducts,
    /// Positional body; the response object is wrapped in a one-element list.
    SingleDomain,
    /// `key=value` body lines; `results` field extracted.
    KeywordArgs,
    /// First body line is the positional `query`, rest are `key=value`;
    /// `results` field extracted.
    QueryArgs,
    /// Same decode as `QueryArgs`; `history` field extracted.
    QueryArgsHistory,
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Transform::Default => "default",
            Transform::List => "list",
            Transform::ListProducts => "listprod",
            Transform::SingleDomain => "singledom",
            Transform::KeywordArgs => "kargs",
            Transform::QueryArgs => "queryargs",
            Transform::QueryArgsHistory => "queryargs_hist",
        };
        f.write_str(s)
    }
}

/// A registered endpoint and its transform kind. Fixed at build time.
#[derive(Debug, Clone, Copy)]
pub struct EndpointDescriptor {
    pub name: &'static str,
    pub transform: Transform,
}

/// Endpoints with a defined decode/normalize path.
pub const REGISTERED: &[EndpointDescriptor] = &[
    EndpointDescriptor {
        name: "iris_enrich",
        transform: Transform::Default,
    },
    EndpointDescriptor {
        name: "available_api_calls",
        transform: Transform::List,
    },
    EndpointDescriptor {
        name: "account_information",
        transform: Transform::ListProducts,
    },
    EndpointDescriptor {
        name: "iris_investigate",
        transform: Transform::KeywordArgs,
    },
    EndpointDescriptor {
        name: "domain_profile",
        transform: Transform::SingleDomain,
    },
    EndpointDescriptor {
        name: "hosting_history",
        transform: Transform::SingleDomain,
    },
    EndpointDescriptor {
        name: "parsed_whois",
        transform: Transform::SingleDomain,
    },
    EndpointDescriptor {
        name: "reverse_whois",
        transform: Transform::QueryArgs,
    },
    EndpointDescriptor {
        name: "whois_history",
        transform: Transform::QueryArgsHistory,
    },
];

/// Look up the transform for a registered endpoint.
pub fn transform_for(endpoint: &str) -> Option<Transform> {
    REGISTERED
        .iter()
        .find(|d| d.name == endpoint)
        .map(|d| d.transform)
}

/// Whether an endpoint has a registered transform.
pub fn is_registered(endpoint: &str) -> bool {
    transform_for(endpoint).is_some()
}

/// Decoded arguments for a single remote invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArgs {
    /// No arguments (list-shaped endpoints).
    None,
    /// A single positional string.
    Positional(String),
    /// Keyword arguments (for query-args kinds the positional `query`
    /// value is carried as the `query` key).
    Keywords(ArgumentSet),
}

/// Method documentation as exposed by the session, either already
/// structured or as a raw introspection text block to be parsed.
#[derive(Debug, Clone)]
pub enum Introspection {
    Structured(Vec<HelpEntry>),
    Text(String),
}

/// Failure from the remote capability.
///
/// Classification is deliberately narrow: only the literal bad-credentials
/// phrase is recognized, everything else lands in `Api`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    BadCredentials,
    Api(String),
}

const BAD_CREDENTIALS_PHRASE: &str =
    "The credentials you entered do not match an active account.";

impl ApiError {
    /// Classify a raw error message by substring, mirroring what the
    /// upstream client reports for rejected credentials.
    pub fn classify(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        if msg.contains(BAD_CREDENTIALS_PHRASE) {
            ApiError::BadCredentials
        } else {
            ApiError::Api(msg)
        }
    }

    pub fn is_bad_credentials(&self) -> bool {
        matches!(self, ApiError::BadCredentials)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadCredentials => f.write_str(BAD_CREDENTIALS_PHRASE),
            ApiError::Api(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// An authenticated remote capability.
///
/// `invoke` blocks until the remote call returns. The returned value is the
/// response mapping (with `results` / `products` / `history` fields) for
/// record-shaped endpoints, or a bare array for list-shaped ones; field
/// extraction per transform kind happens in the dispatcher.
pub trait Session {
    fn invoke(&self, endpoint: &str, args: &CallArgs) -> Result<Value, ApiError>;

    /// Method documentation for the help store, refreshed once per
    /// authentication.
    fn introspect(&self) -> Introspection;
}
