/*!
`call.rs`

Implements the `call` subcommand: invoke one tool through the same registry
the MCP server uses, without an MCP client.

  lnfi-mcp call <TOOL> [--param KEY=VALUE]... [--param-file args.(json|yaml)] [--json]

Parameter handling:
  - --param-file values keep their JSON types
  - --param strings are coerced by the tool's declared field types and
    override file entries
  - validation, alias resolution and SDK errors come from the dispatcher

JSON Success Output:
{
  "status": "ok",
  "tool": "LnfiAssetGetBalance",
  "elapsed_ms": 42,
  "arguments": { ... },
  "result": <parsed JSON of the first text item, or the raw text>
}

JSON Error Output:
{
  "status": "error",
  "tool": "LnfiAssetGetBalance",
  "error": "message",
  "detail": { ... }
}
*/

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{Map, Value, json};

use crate::cmd::format::{Role, StyleOptions, TableOpts, box_header, color, emoji, table};
use crate::cmd::shared::{
    ConnectionArgs, build_arguments, build_registry_from, load_config, load_param_file,
    parse_params,
};
use crate::error::DispatchError;
use crate::registry::{CommandRegistry, Envelope};
use crate::tools;

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Tool name to invoke (case-insensitive)
    #[arg(value_name = "TOOL")]
    pub tool: String,

    /// Provide parameter (KEY=VALUE), repeatable
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Load parameters from file (JSON or YAML). --param overrides file entries
    #[arg(long = "param-file", value_name = "PATH")]
    pub param_file: Option<PathBuf>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub conn: ConnectionArgs,
}

pub fn execute_call(args: CallArgs) -> Result<()> {
    let requested = args.tool.trim();
    let Some(def) = tools::find(requested) else {
        return output_error(
            args.json,
            requested,
            &DispatchError::UnknownCommand(requested.to_string()),
        );
    };

    let params = parse_params(&args.params)?;
    let file = match &args.param_file {
        Some(path) => load_param_file(path)?,
        None => Map::new(),
    };
    let arguments = build_arguments(&def.schema, file, params);

    let config = load_config(&args.conn, None)?;
    let registry = build_registry_from(&config)?;

    let started = Instant::now();
    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    let outcome = rt.block_on(invoke(&registry, def.name, arguments.clone()));
    let elapsed_ms = started.elapsed().as_millis();

    match outcome {
        Ok(envelope) => {
            if args.json {
                let out = json!({
                    "status": "ok",
                    "tool": def.name,
                    "elapsed_ms": elapsed_ms,
                    "arguments": arguments,
                    "result": result_value(&envelope),
                });
                println!("{}", pretty(&out));
            } else {
                let style = StyleOptions::detect();
                println!(
                    "{}",
                    render_success(def.name, elapsed_ms, &arguments, &envelope, &style)
                );
            }
            Ok(())
        }
        Err(err) => output_error(args.json, def.name, &err),
    }
}

async fn invoke(
    registry: &CommandRegistry,
    name: &str,
    arguments: Map<String, Value>,
) -> Result<Envelope, DispatchError> {
    registry.invoke(name, arguments).await
}

/* ---- Output ---- */

/// The first text item parsed as JSON; plain text otherwise.
fn result_value(envelope: &Envelope) -> Value {
    match envelope.first_text() {
        Some(text) => serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.into())),
        None => Value::Null,
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn render_success(
    tool: &str,
    elapsed_ms: u128,
    arguments: &Map<String, Value>,
    envelope: &Envelope,
    style: &StyleOptions,
) -> String {
    let mut out = vec![box_header(
        format!("{} {tool}", emoji("success", style)),
        Some(format!("{elapsed_ms} ms")),
        style,
    )];

    if arguments.is_empty() {
        out.push(color(
            Role::Dim,
            format!("{} No arguments supplied", emoji("info", style)),
            style,
        ));
    } else {
        let rows: Vec<Vec<String>> = arguments
            .iter()
            .map(|(k, v)| {
                let shown = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                vec![k.clone(), shown]
            })
            .collect();
        out.push(color(Role::Accent, "Arguments:", style));
        out.push(table(&["NAME", "VALUE"], &rows, TableOpts::default(), style));
    }

    out.push(String::new());
    out.push(color(Role::Accent, "Result:", style));
    out.push(pretty(&result_value(envelope)));
    out.join("\n")
}

fn output_error(json_mode: bool, tool: &str, err: &DispatchError) -> Result<()> {
    if json_mode {
        let out = json!({
            "status": "error",
            "tool": tool,
            "error": err.to_string(),
            "detail": err.detail(),
        });
        println!("{}", pretty(&out));
    } else {
        let style = StyleOptions::detect();
        let title = format!("{} {tool} failed", emoji("error", &style));
        println!(
            "{}",
            box_header(title, Some(color(Role::Error, err.to_string(), &style)), &style)
        );
        if let DispatchError::HandlerFailure {
            cause: Some(cause), ..
        } = err
        {
            println!("{}", color(Role::Dim, format!("cause: {cause}"), &style));
        }
    }
    anyhow::bail!("{err}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::SdkMethod;
    use crate::sdk::mock::MockSdk;
    use clap::Parser;
    use std::sync::Arc;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        cmd: TestSub,
    }

    #[derive(clap::Subcommand, Debug)]
    enum TestSub {
        Call(CallArgs),
    }

    #[test]
    fn clap_parses_call() {
        let cli = TestCli::try_parse_from([
            "t",
            "call",
            "LnfiTokenApprove",
            "--param",
            "tokenName=SATS",
            "--param",
            "amount=10",
            "--json",
        ])
        .unwrap();
        let TestSub::Call(a) = cli.cmd;
        assert_eq!(a.tool, "LnfiTokenApprove");
        assert_eq!(a.params.len(), 2);
        assert!(a.json);
    }

    #[test]
    fn unknown_tool_fails_before_config() {
        let err = execute_call(CallArgs {
            tool: "LnfiNope".into(),
            params: vec![],
            param_file: None,
            json: true,
            conn: ConnectionArgs::default(),
        })
        .unwrap_err();
        assert!(err.to_string().contains("LnfiNope"));
    }

    #[test]
    fn result_value_parses_json_text() {
        assert_eq!(result_value(&Envelope::json(&json!({"a": 1}))), json!({"a": 1}));
        assert_eq!(result_value(&Envelope::text("plain")), json!("plain"));
    }

    #[tokio::test]
    async fn coerced_cli_params_pass_validation() {
        let sdk = Arc::new(MockSdk::new().reply(SdkMethod::AssetGetBalance, Ok(json!({"SATS": 5}))));
        let registry = tools::build_registry(sdk.clone()).unwrap();
        let def = tools::find("LnfiAssetGetBalance").unwrap();
        let params = parse_params(&[]).unwrap();
        let arguments = build_arguments(&def.schema, Map::new(), params);
        let envelope = invoke(&registry, def.name, arguments).await.unwrap();
        assert_eq!(result_value(&envelope), json!({"SATS": 5}));
    }

    #[tokio::test]
    async fn wrong_type_from_file_is_invalid_argument() {
        let sdk = Arc::new(MockSdk::new());
        let registry = tools::build_registry(sdk.clone()).unwrap();
        let def = tools::find("LnfiTokenTransfer").unwrap();
        let file = json!({"tokenName": "SATS", "amount": "ten", "to": "npub1x"})
            .as_object()
            .cloned()
            .unwrap();
        let arguments = build_arguments(&def.schema, file, vec![]);
        let err = invoke(&registry, def.name, arguments).await.unwrap_err();
        assert!(matches!(err, DispatchError::InvalidArgument { ref field, .. } if field == "amount"));
        assert!(sdk.calls().is_empty());
    }

    #[test]
    fn plain_success_render() {
        let style = StyleOptions::plain(80);
        let mut args = Map::new();
        args.insert("orderId".into(), json!("o-1"));
        let out = render_success("LnfiMarketCancelOrder", 3, &args, &Envelope::json(&json!(true)), &style);
        assert!(out.contains("LnfiMarketCancelOrder"));
        assert!(out.contains("orderId  o-1"));
        assert!(out.trim_end().ends_with("true"));
    }
}
