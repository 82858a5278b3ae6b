/*!
shared.rs - helpers shared by the query/methods subcommands.

Focus:
  - fixture / instance-name resolution (flag > env > default)
  - connect_instance: replay session + authentication + rerun-state reload
  - per-instance rerun state persisted across CLI runs
  - output_error: consistent JSON / human error reporting
*/

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::cmd::format::{Role, StyleOptions, box_header, color, emoji};
use crate::instance::{Instance, InstanceOptions};
use crate::{log_debug, log_error};
use crate::session::ReplaySession;

pub const FIXTURE_ENV: &str = "DTQ_FIXTURE";
pub const INSTANCE_ENV: &str = "DTQ_INSTANCE";
pub const DEFAULT_INSTANCE: &str = "default";
pub const STATE_ENV: &str = "DTQ_STATE";
const STATE_FILE: &str = ".dtq_state.json";

/// Flag value, else env var, else none. Blank values are ignored.
pub fn resolve_fixture(flag: Option<String>) -> Option<String> {
    flag.filter(|s| !s.trim().is_empty()).or_else(|| {
        std::env::var(FIXTURE_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
    })
}

/// Flag value, else `DTQ_INSTANCE`, else `default`.
pub fn resolve_instance(flag: Option<String>) -> String {
    flag.filter(|s| !s.trim().is_empty())
        .or_else(|| {
            std::env::var(INSTANCE_ENV)
                .ok()
                .filter(|s| !s.trim().is_empty())
        })
        .unwrap_or_else(|| DEFAULT_INSTANCE.to_string())
}

/// Where per-instance rerun state lives: `DTQ_STATE`, else a dotfile in the
/// home directory, else the temp directory.
pub fn state_path() -> PathBuf {
    if let Some(p) = std::env::var_os(STATE_ENV) {
        return PathBuf::from(p);
    }
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
        .join(STATE_FILE)
}

/// Last submitted query for an instance, from the state file. State IO is
/// best effort: a missing or unreadable file just disables the rerun
/// override.
pub fn load_last_query(state: &Path, instance: &str) -> Option<String> {
    let raw = std::fs::read_to_string(state).ok()?;
    let map: HashMap<String, String> = serde_json::from_str(&raw).ok()?;
    map.get(instance).cloned()
}

/// Record a submission in the state file so an identical re-run in a later
/// process triggers the validator's rerun override. Entries for other
/// instances are kept.
pub fn save_last_query(state: &Path, instance: &str, query: &str) {
    let mut map: HashMap<String, String> = std::fs::read_to_string(state)
        .ok()
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default();
    map.insert(instance.to_string(), query.to_string());
    match serde_json::to_string_pretty(&map) {
        Ok(raw) => {
            if let Err(err) = std::fs::write(state, raw) {
                log_debug!("Could not persist rerun state to {}: {err}", state.display());
            }
        }
        Err(err) => log_debug!("Could not serialize rerun state: {err}"),
    }
}

/// Open the fixture-backed session, authenticate an instance against it and
/// reload the instance's persisted rerun state.
pub fn connect_instance(fixture: &str, name: &str, state: &Path) -> Result<Instance> {
    let session = ReplaySession::from_file(fixture)
        .with_context(|| format!("failed to open fixture '{fixture}'"))?;
    let options = InstanceOptions::from_env();

    match Instance::connect(name, options, Box::new(session)) {
        Ok(mut instance) => {
            instance.last_query = load_last_query(state, name);
            Ok(instance)
        }
        Err(err) if err.is_bad_credentials() => {
            log_error!("Bad credentials, please try again");
            bail!("connection failed: bad credentials")
        }
        Err(err) => {
            log_error!("Unknown error: {err}");
            bail!("connection failed: {err}")
        }
    }
}

/// Report an error in the requested output mode, then bail.
pub fn output_error(json: bool, msg: &str) -> Result<()> {
    if json {
        let err = serde_json::json!({"status":"error","error":msg});
        println!(
            "{}",
            serde_json::to_string_pretty(&err).unwrap_or_else(|_| err.to_string())
        );
    } else {
        let style = StyleOptions::detect();
        let title = format!("{} Error", emoji("error", &style));
        let boxed = box_header(title, Some(color(Role::Error, msg, &style)), &style);
        println!("{boxed}");
    }
    bail!(msg.to_string())
}
