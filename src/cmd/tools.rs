/*!
`tools.rs`

Implements the `tools` subcommand: browse the tool catalog offline (no key,
no bridge needed).

  lnfi-mcp tools              -> table of all tools
  lnfi-mcp tools <NAME>       -> one tool's parameters (case-insensitive name)
  lnfi-mcp tools [NAME] --json

JSON shapes:

1) all tools
{
  "status":"ok",
  "count": 25,
  "tools":[ {"name":"...","description":"...","sdk":"token.approve","parameters":[...]} ]
}

2) one tool
{
  "status":"ok",
  "name":"LnfiTokenApprove",
  "description":"...",
  "sdk":"token.approve",
  "parameters":[ {"name":"amount","type":"number","required":true,"description":""} ],
  "input_schema": { ...JSON Schema advertised over MCP... }
}
*/

use anyhow::Result;
use clap::Args;
use serde_json::{Value, json};

use crate::cmd::format::{Role, StyleOptions, TableOpts, box_header, color, emoji, table};
use crate::registry::InputSchema;
use crate::tools::{self, Target, ToolDef};

#[derive(Args, Debug)]
pub struct ToolsArgs {
    /// Show a single tool
    #[arg(value_name = "NAME")]
    pub name: Option<String>,

    /// Output JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,
}

pub fn execute_tools(args: ToolsArgs) -> Result<()> {
    let style = StyleOptions::detect();
    match args.name.as_deref().map(str::trim) {
        None | Some("") => {
            let catalog = tools::catalog();
            if args.json {
                println!("{}", pretty(&catalog_json(&catalog)));
            } else {
                println!("{}", render_catalog(&catalog, &style));
            }
            Ok(())
        }
        Some(name) => {
            let Some(def) = tools::find(name) else {
                if args.json {
                    println!("{}", json!({"status":"error","error":format!("tool '{name}' not found")}));
                } else {
                    println!(
                        "{} {}",
                        emoji("error", &style),
                        color(Role::Error, format!("Tool '{name}' not found."), &style)
                    );
                }
                anyhow::bail!("tool '{name}' not found");
            };
            if args.json {
                println!("{}", pretty(&tool_json(&def)));
            } else {
                println!("{}", render_tool(&def, &style));
            }
            Ok(())
        }
    }
}

/* ---- JSON ---- */

fn sdk_label(target: &Target) -> String {
    match target {
        Target::Config => "getConfig".to_string(),
        Target::Sdk(method, _) => method.to_string(),
    }
}

fn params_json(schema: &InputSchema) -> Vec<Value> {
    schema
        .fields()
        .iter()
        .map(|f| {
            json!({
                "name": f.name,
                "type": f.ty.as_str(),
                "required": f.required,
                "description": f.description.unwrap_or(""),
            })
        })
        .collect()
}

fn catalog_json(catalog: &[ToolDef]) -> Value {
    let items: Vec<Value> = catalog
        .iter()
        .map(|d| {
            json!({
                "name": d.name,
                "description": d.description,
                "sdk": sdk_label(&d.target),
                "parameters": params_json(&d.schema),
            })
        })
        .collect();
    json!({"status":"ok","count": items.len(),"tools": items})
}

fn tool_json(def: &ToolDef) -> Value {
    json!({
        "status":"ok",
        "name": def.name,
        "description": def.description,
        "sdk": sdk_label(&def.target),
        "parameters": params_json(&def.schema),
        "input_schema": Value::Object(def.schema.to_json_schema()),
    })
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/* ---- Human Output ---- */

fn param_summary(schema: &InputSchema) -> String {
    if schema.fields().is_empty() {
        return "-".to_string();
    }
    schema
        .fields()
        .iter()
        .map(|f| {
            let mark = if f.required { "" } else { "?" };
            format!("{}{mark}:{}", f.name, f.ty)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_catalog(catalog: &[ToolDef], style: &StyleOptions) -> String {
    let header = box_header(
        format!("{} Lnfi tools ({})", emoji("list", style), catalog.len()),
        None::<&str>,
        style,
    );
    let rows: Vec<Vec<String>> = catalog
        .iter()
        .enumerate()
        .map(|(i, d)| {
            vec![
                (i + 1).to_string(),
                d.name.to_string(),
                param_summary(&d.schema),
                d.description.replace('\n', " "),
            ]
        })
        .collect();
    let tbl = table(
        &["#", "NAME", "PARAMS", "DESCRIPTION"],
        &rows,
        TableOpts {
            min_col_width: 2,
            ..TableOpts::default()
        },
        style,
    );
    format!(
        "{header}\n{tbl}\n\n{} {}",
        emoji("info", style),
        color(
            Role::Dim,
            "Use `lnfi-mcp tools <name>` for one tool's parameters",
            style
        )
    )
}

fn render_tool(def: &ToolDef, style: &StyleOptions) -> String {
    let header = box_header(
        format!("{} {}", emoji("tool", style), def.name),
        Some(format!("sdk={}", sdk_label(&def.target))),
        style,
    );
    let mut out = vec![header, format!("Description: {}", def.description)];

    if def.schema.fields().is_empty() {
        out.push("Parameters: (none)".to_string());
    } else {
        let rows: Vec<Vec<String>> = def
            .schema
            .fields()
            .iter()
            .map(|f| {
                vec![
                    f.name.to_string(),
                    f.ty.to_string(),
                    if f.required { "yes" } else { "no" }.to_string(),
                    f.description.unwrap_or("").to_string(),
                ]
            })
            .collect();
        out.push(color(Role::Accent, "Parameters:", style));
        out.push(table(
            &["NAME", "TYPE", "REQ", "DESCRIPTION"],
            &rows,
            TableOpts::default(),
            style,
        ));
    }
    out.join("\n")
}
