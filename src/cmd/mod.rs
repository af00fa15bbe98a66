/*!
Subcommand modules.

  src/cmd/
    mod.rs      (this file)
    serve.rs    (ServeArgs + execute_serve)   run a profile as an MCP stdio server
    list.rs     (ListArgs  + execute_list)    operation names of a profile
    get.rs      (GetArgs   + execute_get)     parameter detail per operation
    call.rs     (CallArgs  + execute_call)    one-shot dispatch from the shell
    shared.rs   registry lookup, schema flattening, --param handling
    format.rs   table / header / color helpers for human output

Conventions:
  - Each subcommand module exposes exactly one public `execute_*` function
    that returns `anyhow::Result<()>`.
  - Argument structs derive `clap::Args` and are kept minimal.
*/

pub mod call;
pub mod format;
pub mod get;
pub mod list;
pub mod serve;
pub mod shared;

pub use call::{CallArgs, execute_call};
pub use get::{GetArgs, execute_get};
pub use list::{ListArgs, execute_list};
pub use serve::{ServeArgs, execute_serve};
