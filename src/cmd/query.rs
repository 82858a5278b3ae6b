/*!
`query.rs`

Implements the `query` subcommand: run one line-oriented query through the
full pipeline (parse, validate, decode, dispatch, normalize) against a
named instance.

Query grammar:
  line 1          endpoint identifier
  lines 2..       argument body, grammar per the endpoint's transform kind
                  (plain string; `key=value` lines; or a positional first
                  line followed by `key=value` lines)

Validation is advisory: a rejected query is not dispatched unless `--force`
is given, but the submission is recorded per instance in a small state file
(see `shared::state_path`) so re-running the identical query in a later
invocation overrides the rejection.

JSON success output:
{
  "status": "Success",
  "endpoint": "iris_enrich",
  "instance": "default",
  "elapsed_ms": 3,
  "row_count": 2,
  "columns": ["domain", ...],
  "rows": [["a.com", ...], ...]
}
*/

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;

use crate::cmd::format::{Role, StyleOptions, box_header, color, emoji, result_table};
use crate::cmd::shared::{
    connect_instance, output_error, resolve_fixture, resolve_instance, save_last_query, state_path,
};
use crate::instance::Registry;
use crate::query::{run_query, validate};

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Query text (line 1 = endpoint, rest = argument body). Use --file
    /// for multi-line queries that are awkward to pass inline.
    #[arg(value_name = "QUERY")]
    pub query: Option<String>,

    /// Read the query text from a file instead
    #[arg(long, value_name = "PATH", conflicts_with = "query")]
    pub file: Option<String>,

    /// Instance name (falls back to DTQ_INSTANCE, then "default")
    #[arg(short = 'i', long)]
    pub instance: Option<String>,

    /// Fixture file backing the session (falls back to DTQ_FIXTURE)
    #[arg(short = 't', long)]
    pub fixture: Option<String>,

    /// Dispatch even when validation rejects the query
    #[arg(long)]
    pub force: bool,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute_query(args: QueryArgs) -> Result<()> {
    let query = match read_query_text(&args) {
        Ok(q) => q,
        Err(e) => return output_error(args.json, &e.to_string()),
    };
    if query.trim().is_empty() {
        return output_error(args.json, "query text is empty");
    }

    let Some(fixture) = resolve_fixture(args.fixture.clone()) else {
        return output_error(args.json, "no fixture specified (use --fixture or DTQ_FIXTURE)");
    };
    let instance_name = resolve_instance(args.instance.clone());

    let state = state_path();
    let mut registry = Registry::new();
    registry.insert(connect_instance(&fixture, &instance_name, &state)?);
    let instance = registry
        .get_mut(&instance_name)
        .context("instance vanished from registry")?;

    if !validate(&query, instance) && !args.force {
        // Record the submission (in memory and in the state file) so an
        // identical re-run overrides the rejection, then decline to dispatch.
        instance.record_query(&query);
        save_last_query(&state, &instance_name, &query);
        if args.json {
            println!(
                "{}",
                serde_json::json!({
                    "status": "rejected",
                    "instance": instance_name,
                    "note": "validation rejected the query; re-run it unchanged or pass --force to dispatch"
                })
            );
        } else {
            let style = StyleOptions::detect();
            println!(
                "{} {}",
                emoji("warn", &style),
                color(
                    Role::Warning,
                    "Query not submitted. Re-run it unchanged (or pass --force) to dispatch anyway.",
                    &style
                )
            );
        }
        return Ok(());
    }

    let started = Instant::now();
    let outcome = run_query(&query, instance);
    let elapsed_ms = started.elapsed().as_millis();
    save_last_query(&state, &instance_name, &query);

    if args.json {
        let mut base = serde_json::json!({
            "status": outcome.status.to_string(),
            "endpoint": outcome.endpoint,
            "instance": instance_name,
            "elapsed_ms": elapsed_ms,
        });
        if let serde_json::Value::Object(ref mut map) = base {
            if let Some(table) = &outcome.table {
                map.insert("row_count".into(), serde_json::json!(table.row_count()));
                map.insert("columns".into(), serde_json::json!(table.columns));
                map.insert("rows".into(), serde_json::json!(table.rows));
            }
            if let Some(help) = &outcome.help {
                map.insert("help".into(), serde_json::json!(help));
            }
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&base).unwrap_or_else(|_| base.to_string())
        );
        return Ok(());
    }

    // Human-readable output
    let style = StyleOptions::detect();

    if let Some(help) = &outcome.help {
        print!("{help}");
        return Ok(());
    }

    let mark = if outcome.status.is_success() {
        color(Role::Success, emoji("success", &style), &style)
    } else {
        color(Role::Error, emoji("error", &style), &style)
    };
    let header = box_header(
        format!("{mark} {} ({})", outcome.status, outcome.endpoint),
        Some(format!("instance={instance_name} • {elapsed_ms} ms")),
        &style,
    );
    println!("{header}");

    match &outcome.table {
        Some(table) => {
            println!("{}", result_table(table, &style));
            println!(
                "\n{} {}",
                emoji("info", &style),
                color(
                    Role::Dim,
                    format!("{} row(s). Use --json for machine-readable output.", table.row_count()),
                    &style
                )
            );
        }
        None => {
            println!(
                "{}",
                color(
                    Role::Dim,
                    format!("{} No rows returned", emoji("info", &style)),
                    &style
                )
            );
        }
    }

    Ok(())
}

fn read_query_text(args: &QueryArgs) -> Result<String> {
    let raw = if let Some(path) = &args.file {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read query file: {path}"))?
    } else if let Some(q) = &args.query {
        q.clone()
    } else {
        anyhow::bail!("no query given (pass QUERY or --file)");
    };
    // Normalize CRLF input before parsing.
    Ok(raw.replace('\r', ""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        cmd: TestSub,
    }

    #[derive(clap::Subcommand, Debug)]
    enum TestSub {
        Query(QueryArgs),
    }

    #[test]
    fn clap_parses_query_with_flags() {
        let cli = TestCli::try_parse_from([
            "t",
            "query",
            "iris_enrich\ndomains=a.com",
            "--json",
            "--force",
            "-i",
            "prod",
        ])
        .unwrap();
        let TestSub::Query(a) = cli.cmd;
        assert_eq!(a.query.as_deref(), Some("iris_enrich\ndomains=a.com"));
        assert!(a.json);
        assert!(a.force);
        assert_eq!(a.instance.as_deref(), Some("prod"));
    }

    #[test]
    fn query_and_file_conflict() {
        let err = TestCli::try_parse_from(["t", "query", "help", "--file", "q.txt"]);
        assert!(err.is_err());
    }

    #[test]
    fn read_query_strips_carriage_returns() {
        let args = QueryArgs {
            query: Some("iris_enrich\r\ndomains=a.com\r\n".into()),
            file: None,
            instance: None,
            fixture: None,
            force: false,
            json: false,
        };
        let q = read_query_text(&args).unwrap();
        assert_eq!(q, "iris_enrich\ndomains=a.com\n");
    }
}
