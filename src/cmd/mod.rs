/*!
Command dispatcher module: module declarations + re-exports only.

Layout:
  src/cmd/
    mod.rs      (this file)
    query.rs    (QueryArgs + execute_query: the full pipeline)
    methods.rs  (MethodsArgs + execute_methods: help renderer surface)
    shared.rs   (instance/fixture resolution, error output)
    format.rs   (table / box / color formatting utilities)

Conventions:
  - Each subcommand module exposes exactly one public `execute_*` function
    returning `anyhow::Result<()>`.
  - Argument structs derive `clap::Args` and are kept minimal.
*/

pub mod format;
pub mod methods;
pub mod query;
pub mod shared;

pub use methods::{MethodsArgs, execute_methods};
pub use query::{QueryArgs, execute_query};
