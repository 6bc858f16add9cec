/*!
Subcommand modules for the `lnfi-mcp` binary.

  src/cmd/
    mod.rs      (this file: declarations + re-exports)
    serve.rs    (ServeArgs + execute_serve)   MCP server on stdio
    tools.rs    (ToolsArgs + execute_tools)   browse the catalog offline
    call.rs     (CallArgs  + execute_call)    invoke one tool without MCP
    shared.rs   connection flags, startup wiring, parameter coercion
    format.rs   tables / boxes / color for human output

Conventions:
  - Each subcommand module exposes exactly one public `execute_*` function
    that returns `anyhow::Result<()>`.
  - Argument structs derive `clap::Args`.
*/

pub mod call;
pub mod format;
pub mod serve;
pub mod shared;
pub mod tools;

pub use call::{CallArgs, execute_call};
pub use serve::{ServeArgs, execute_serve};
pub use tools::{ToolsArgs, execute_tools};
