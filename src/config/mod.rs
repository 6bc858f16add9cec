/*!
Process configuration.

`ServerConfig` is assembled once, before the registry is built, from (lowest
to highest precedence):
  1. the built-in profile of the deployment environment
  2. an optional config file (`--config`, YAML or JSON by extension)
  3. CLI flags / environment variables (`ConfigOverrides`, filled by clap)

Only the `development` profile carries defaults (dev relay, market API,
local bridge). `production` needs relays and base URL given explicitly.
Any missing or invalid value is a `ConfigError`, which is fatal at startup.
*/

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::sdk::SignerCredential;

pub const DEV_RELAY: &str = "wss://dev-relay.lnfi.network";
pub const DEV_BASE_URL: &str = "https://market-api.unift.xyz";
pub const DEFAULT_BRIDGE_URL: &str = "http://127.0.0.1:8787";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "missing private key: pass it to the command or set LNFI_PRIVATE_KEY"
    )]
    MissingPrivateKey,

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("unknown environment '{0}' (expected development or production)")]
    UnknownEnvironment(String),

    #[error("{setting} must be set for the {env} environment")]
    MissingSetting { setting: &'static str, env: String },

    #[error("invalid {setting} '{value}': {reason}")]
    InvalidUrl {
        setting: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

/* ---- Deployment Environment ---- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeploymentEnv {
    #[default]
    Development,
    Production,
}

impl DeploymentEnv {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentEnv::Development => "development",
            DeploymentEnv::Production => "production",
        }
    }

    fn default_relays(&self) -> &'static [&'static str] {
        match self {
            DeploymentEnv::Development => &[DEV_RELAY],
            DeploymentEnv::Production => &[],
        }
    }

    fn default_base_url(&self) -> Option<&'static str> {
        match self {
            DeploymentEnv::Development => Some(DEV_BASE_URL),
            DeploymentEnv::Production => None,
        }
    }
}

impl FromStr for DeploymentEnv {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(DeploymentEnv::Development),
            "production" | "prod" => Ok(DeploymentEnv::Production),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }
}

impl fmt::Display for DeploymentEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/* ---- Sources ---- */

/// Contents of a config file. Every key is optional.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub env: Option<String>,
    pub relays: Option<Vec<String>>,
    pub base_url: Option<String>,
    pub bridge_url: Option<String>,
    pub private_key: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &raw)
    }

    pub fn parse(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            serde_json::from_str(raw).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(raw).map_err(|e| e.to_string())
        };
        parsed.map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }
}

/// Values from CLI flags and environment variables.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub env: Option<String>,
    pub relays: Vec<String>,
    pub base_url: Option<String>,
    pub bridge_url: Option<String>,
    pub private_key: Option<String>,
}

/* ---- Resolved Configuration ---- */

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub env: DeploymentEnv,
    pub relays: Vec<Url>,
    pub base_url: Url,
    pub bridge_url: Url,
    pub signer: SignerCredential,
}

impl ServerConfig {
    pub fn resolve(
        file: Option<FileConfig>,
        overrides: ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let file = file.unwrap_or_default();

        let env = match overrides.env.or(file.env) {
            Some(raw) => raw.parse()?,
            None => DeploymentEnv::default(),
        };

        let private_key = overrides
            .private_key
            .or(file.private_key)
            .ok_or(ConfigError::MissingPrivateKey)?;
        let signer = SignerCredential::parse(&private_key)?;

        let relay_sources: Vec<String> = if !overrides.relays.is_empty() {
            overrides.relays
        } else if let Some(relays) = file.relays {
            relays
        } else {
            env.default_relays().iter().map(|s| s.to_string()).collect()
        };
        let relays = relay_sources
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .map(|r| parse_url("relay", r, &["ws", "wss"]))
            .collect::<Result<Vec<_>, _>>()?;
        if relays.is_empty() {
            return Err(ConfigError::MissingSetting {
                setting: "relays",
                env: env.to_string(),
            });
        }

        let base_url = overrides
            .base_url
            .or(file.base_url)
            .or_else(|| env.default_base_url().map(str::to_string))
            .ok_or_else(|| ConfigError::MissingSetting {
                setting: "base URL",
                env: env.to_string(),
            })?;
        let base_url = parse_url("base URL", &base_url, &["http", "https"])?;

        let bridge_url = overrides
            .bridge_url
            .or(file.bridge_url)
            .unwrap_or_else(|| DEFAULT_BRIDGE_URL.to_string());
        let bridge_url = parse_url("bridge URL", &bridge_url, &["http", "https"])?;

        Ok(Self {
            env,
            relays,
            base_url,
            bridge_url,
            signer,
        })
    }
}

fn parse_url(setting: &'static str, raw: &str, schemes: &[&str]) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        setting,
        value: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !schemes.contains(&url.scheme()) {
        return Err(invalid(format!(
            "scheme must be one of {}",
            schemes.join(", ")
        )));
    }
    Ok(url)
}
