/*!
`methods.rs`

Implements the `methods` subcommand: the help-renderer surface outside the
query pipeline.

Shapes:
  dtq methods            endpoint availability + transform flags
  dtq methods all        every documented method with availability flags
  dtq methods <name>     stored signature title + description, verbatim

Equivalent to submitting a `help` query (`dtq query "help"` and so on);
this surface just skips the pipeline.
*/

use anyhow::{Context, Result};
use clap::Args;

use crate::api;
use crate::cmd::shared::{
    connect_instance, output_error, resolve_fixture, resolve_instance, state_path,
};
use crate::helptext::render_help;

#[derive(Args, Debug)]
pub struct MethodsArgs {
    /// Method name, or "all" for every documented method. Omit for the
    /// endpoint availability listing.
    #[arg(value_name = "NAME")]
    pub name: Option<String>,

    /// Instance name (falls back to DTQ_INSTANCE, then "default")
    #[arg(short = 'i', long)]
    pub instance: Option<String>,

    /// Fixture file backing the session (falls back to DTQ_FIXTURE)
    #[arg(short = 't', long)]
    pub fixture: Option<String>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute_methods(args: MethodsArgs) -> Result<()> {
    let Some(fixture) = resolve_fixture(args.fixture.clone()) else {
        return output_error(args.json, "no fixture specified (use --fixture or DTQ_FIXTURE)");
    };
    let instance_name = resolve_instance(args.instance.clone());
    let instance = connect_instance(&fixture, &instance_name, &state_path())?;

    if args.json {
        let body = match args.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            None => {
                let endpoints: Vec<_> = instance
                    .available_endpoints
                    .iter()
                    .map(|ep| {
                        serde_json::json!({
                            "endpoint": ep,
                            "transform": api::is_registered(ep),
                        })
                    })
                    .collect();
                serde_json::json!({
                    "status": "ok",
                    "instance": instance_name,
                    "endpoints": endpoints,
                })
            }
            Some("all") => {
                let methods: Vec<_> = instance
                    .help
                    .names()
                    .map(|name| {
                        serde_json::json!({
                            "method": name,
                            "available": instance.available_endpoints.contains(name),
                            "transform": api::is_registered(name),
                        })
                    })
                    .collect();
                serde_json::json!({
                    "status": "ok",
                    "instance": instance_name,
                    "count": methods.len(),
                    "methods": methods,
                })
            }
            Some(name) => {
                let entry = instance
                    .help
                    .get(name)
                    .with_context(|| format!("method '{name}' not in help dictionary"));
                match entry {
                    Err(e) => return output_error(true, &e.to_string()),
                    Ok(entry) => serde_json::json!({
                        "status": "ok",
                        "instance": instance_name,
                        "method": entry.name,
                        "title": entry.title,
                        "description": entry.description,
                    }),
                }
            }
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string())
        );
        return Ok(());
    }

    print!(
        "{}",
        render_help(
            args.name.as_deref(),
            &instance.help,
            &instance.available_endpoints
        )
    );
    Ok(())
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
        Methods(MethodsArgs),
    }

    #[test]
    fn clap_parses_methods_all() {
        let cli = TestCli::try_parse_from(["t", "methods", "all", "--json"]).unwrap();
        let TestSub::Methods(a) = cli.cmd;
        assert_eq!(a.name.as_deref(), Some("all"));
        assert!(a.json);
    }

    #[test]
    fn clap_parses_methods_bare() {
        let cli = TestCli::try_parse_from(["t", "methods"]).unwrap();
        let TestSub::Methods(a) = cli.cmd;
        assert!(a.name.is_none());
    }
}
