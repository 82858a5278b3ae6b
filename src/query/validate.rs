//! Advisory query validation.
//!
//! Two independent checks (both warnings may print for one query):
//!   A. the endpoint is `help` or in the instance's live capability set
//!   B. the endpoint is `help` or has a registered transform
//!
//! Either rejection is overridden when the query is textually identical to
//! the instance's last submitted query: the user re-submitted on purpose.
//! The result is advisory only; callers may still force dispatch.

use crate::api;
use crate::instance::Instance;
use crate::log_warn;
use crate::query::parse::parse_query;

/// Decide whether a parsed query may be dispatched. Returns `true` when the
/// query should run.
pub fn validate(query: &str, instance: &Instance) -> bool {
    let mut run = true;
    let is_rerun = instance.is_rerun(query);

    let (endpoint, _) = parse_query(query);

    if endpoint != "help" && !instance.available_endpoints.contains(&endpoint) {
        log_warn!(
            "Endpoint: {endpoint} not in available APIs: {:?}",
            instance.available_endpoints
        );
        run = false;
        if is_rerun {
            log_warn!("Submitting due to rerun");
            run = true;
        }
    }

    if endpoint != "help" && !api::is_registered(&endpoint) {
        log_warn!("Endpoint: {endpoint} data transform not defined - rerun at your own risk");
        run = false;
        if is_rerun {
            log_warn!("Running endpoint: {endpoint} with default transform - errors may occur");
            run = true;
        }
    }

    run
}
