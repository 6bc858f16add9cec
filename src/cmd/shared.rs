/*!
shared.rs - helpers shared by the `serve` and `call` subcommands.

Focus:
  - ConnectionArgs: flags/env that feed `ServerConfig::resolve`
  - load_config / build_registry_from: startup wiring (config -> SDK -> registry)
  - parse_params / load_param_file / build_arguments: CLI input -> tool arguments
  - coerce_value: string -> JSON by declared field type

Startup errors surface as `ConfigError`, so `main` can tell them apart
from ordinary command failures.
*/

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::{ConfigError, ConfigOverrides, FileConfig, ServerConfig};
use crate::registry::{CommandRegistry, FieldType, InputSchema};
use crate::sdk::BridgeSdk;
use crate::tools;

/* ---- Connection Flags ---- */

#[derive(Args, Debug, Default, Clone)]
pub struct ConnectionArgs {
    /// Deployment environment (development|production)
    #[arg(long = "env", env = "LNFI_ENV", value_name = "ENV")]
    pub env: Option<String>,

    /// Nostr relay URL (repeatable, or comma separated in LNFI_RELAYS)
    #[arg(
        long = "relay",
        env = "LNFI_RELAYS",
        value_name = "URL",
        value_delimiter = ','
    )]
    pub relays: Vec<String>,

    /// Market API base URL
    #[arg(long = "base-url", env = "LNFI_BASE_URL", value_name = "URL")]
    pub base_url: Option<String>,

    /// SDK bridge endpoint
    #[arg(long = "bridge-url", env = "LNFI_BRIDGE_URL", value_name = "URL")]
    pub bridge_url: Option<String>,

    /// Config file (YAML, or JSON by .json extension)
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Signer private key (hex or nsec)
    #[arg(
        long = "private-key",
        env = "LNFI_PRIVATE_KEY",
        value_name = "KEY",
        hide_env_values = true
    )]
    pub private_key: Option<String>,
}

/// Resolve the server configuration. `key` (positional) beats `--private-key`.
pub fn load_config(conn: &ConnectionArgs, key: Option<String>) -> Result<ServerConfig, ConfigError> {
    let file = conn.config.as_deref().map(FileConfig::load).transpose()?;
    let overrides = ConfigOverrides {
        env: conn.env.clone(),
        relays: conn.relays.clone(),
        base_url: conn.base_url.clone(),
        bridge_url: conn.bridge_url.clone(),
        private_key: key.or_else(|| conn.private_key.clone()),
    };
    let config = ServerConfig::resolve(file, overrides)?;
    debug!(
        env = %config.env,
        relays = config.relays.len(),
        base_url = %config.base_url,
        bridge_url = %config.bridge_url,
        "configuration resolved"
    );
    Ok(config)
}

/// Bridge-backed registry holding the whole catalog.
pub fn build_registry_from(config: &ServerConfig) -> Result<CommandRegistry> {
    let sdk = BridgeSdk::new(config).context("Failed to create SDK bridge client")?;
    debug!(endpoint = %sdk.endpoint(), "SDK bridge client ready");
    let registry =
        tools::build_registry(Arc::new(sdk)).context("Failed to register tool catalog")?;
    anyhow::ensure!(!registry.is_empty(), "tool catalog is empty");
    Ok(registry)
}

/* ---- Parameter Input ---- */

/// Split repeated `KEY=VALUE` flags. Later duplicates win.
pub fn parse_params(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter()
        .map(|kv| {
            let (k, v) = kv
                .split_once('=')
                .with_context(|| format!("invalid --param (expected KEY=VALUE): {kv}"))?;
            let key = k.trim();
            if key.is_empty() {
                anyhow::bail!("invalid --param (empty key): {kv}");
            }
            Ok((key.to_string(), v.trim().to_string()))
        })
        .collect()
}

/// Read a JSON or YAML object of arguments. Values keep their JSON types.
pub fn load_param_file(path: &Path) -> Result<Map<String, Value>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read param file: {}", path.display()))?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    let value: Value = if is_yaml {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(&raw).context("failed to parse YAML param file")?;
        serde_json::to_value(yaml).context("failed to convert YAML to JSON")?
    } else {
        serde_json::from_str(&raw).context("failed to parse JSON param file")?
    };

    match value {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("param file root must be an object"),
    }
}

/// Merge file values and CLI params (CLI wins). CLI strings are coerced by
/// the declared field type; undeclared keys pass through as strings and are
/// left for the dispatcher to reject.
pub fn build_arguments(
    schema: &InputSchema,
    file: Map<String, Value>,
    params: Vec<(String, String)>,
) -> Map<String, Value> {
    let mut out = file;
    for (key, raw) in params {
        let value = match schema.field(&key) {
            Some(spec) => coerce_value(&raw, spec.ty),
            None => Value::String(raw),
        };
        out.insert(key, value);
    }
    out
}

/// Coerce a raw string using a field type. Unparsable input stays a string.
pub fn coerce_value(raw: &str, ty: FieldType) -> Value {
    match ty {
        FieldType::String => Value::String(raw.to_string()),
        FieldType::Number => raw
            .parse::<i64>()
            .map(Value::from)
            .ok()
            .or_else(|| {
                raw.parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
            })
            .unwrap_or_else(|| Value::String(raw.to_string())),
        FieldType::Boolean => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "y" => Value::Bool(true),
            "false" | "0" | "no" | "n" => Value::Bool(false),
            _ => Value::String(raw.to_string()),
        },
        FieldType::Object => match serde_json::from_str::<Value>(raw) {
            Ok(v @ Value::Object(_)) => v,
            _ => Value::String(raw.to_string()),
        },
    }
}

/* ---- Tests ---- */
