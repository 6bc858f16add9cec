/*!
bridge.rs - `LnfiSdk` over HTTP.

The Lnfi SDK runs in a bridge process; every SDK call is a POST to
`<bridge>/v1/call`:

Request:
{
  "method": "token.approve",          // or "getConfig"
  "args": [ { ...object... } ],       // positional arguments
  "env": { "env": "development", "relays": [...], "baseURL": "..." }
}
Header `x-lnfi-signer` carries the signing credential.

Reply:
  { "ok": true,  "result": <json> }
  { "ok": false, "error": { "message": "...", "data": <json|null> } }

No timeout or retry is applied here.
*/

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};
use url::{Host, Url};

use super::{LnfiSdk, SdkError, SdkMethod, SignerCredential};
use crate::config::ServerConfig;

pub const SIGNER_HEADER: &str = "x-lnfi-signer";

#[derive(Debug, Clone, Serialize)]
struct BridgeEnv {
    env: String,
    relays: Vec<String>,
    #[serde(rename = "baseURL")]
    base_url: String,
}

#[derive(Debug, Serialize)]
struct CallRequest<'a> {
    method: &'a str,
    args: &'a [Value],
    env: &'a BridgeEnv,
}

#[derive(Debug, Deserialize)]
struct CallReply {
    ok: bool,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<ReplyError>,
}

#[derive(Debug, Deserialize)]
struct ReplyError {
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

pub struct BridgeSdk {
    http: reqwest::Client,
    endpoint: Url,
    env: BridgeEnv,
    signer: SignerCredential,
}

impl BridgeSdk {
    pub fn new(config: &ServerConfig) -> Result<Self, SdkError> {
        let endpoint = call_endpoint(&config.bridge_url)?;
        let mut builder =
            reqwest::Client::builder().user_agent(concat!("lnfi-mcp/", env!("CARGO_PKG_VERSION")));
        // A bridge on this machine is never reached through a proxy.
        if is_loopback(&config.bridge_url) {
            builder = builder.no_proxy();
        }
        let http = builder.build()
            .map_err(|e| SdkError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoint,
            env: BridgeEnv {
                env: config.env.as_str().to_string(),
                relays: config.relays.iter().map(Url::to_string).collect(),
                base_url: config.base_url.to_string(),
            },
            signer: config.signer.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn post(&self, method: &str, args: &[Value]) -> Result<Value, SdkError> {
        debug!(method, endpoint = %self.endpoint, "bridge call");
        let body = CallRequest {
            method,
            args,
            env: &self.env,
        };
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(SIGNER_HEADER, self.signer.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| SdkError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SdkError::Transport(e.to_string()))?;
        trace!(method, %status, bytes = text.len(), "bridge reply");
        decode_reply(status.as_u16(), &text)
    }
}

/// `<bridge>/v1/call`, keeping every segment of the bridge path.
fn call_endpoint(bridge: &Url) -> Result<Url, SdkError> {
    let mut url = bridge.clone();
    url.path_segments_mut()
        .map_err(|_| SdkError::Transport(format!("bridge URL cannot carry a path: {bridge}")))?
        .pop_if_empty()
        .extend(["v1", "call"]);
    Ok(url)
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        Some(Host::Domain(name)) => name.eq_ignore_ascii_case("localhost"),
        None => false,
    }
}

/// Interpret a bridge reply body.
pub(crate) fn decode_reply(status: u16, body: &str) -> Result<Value, SdkError> {
    let reply: CallReply = serde_json::from_str(body).map_err(|e| {
        SdkError::Malformed(format!("HTTP {status}: {e}"))
    })?;
    match (reply.ok, reply.error) {
        (true, _) if (200..300).contains(&status) => Ok(reply.result),
        (_, Some(err)) => Err(SdkError::Rejected {
            message: err.message,
            cause: err.data,
        }),
        _ => Err(SdkError::Malformed(format!(
            "HTTP {status} without error detail"
        ))),
    }
}

#[async_trait]
impl LnfiSdk for BridgeSdk {
    async fn get_config(&self) -> Result<Value, SdkError> {
        self.post("getConfig", &[]).await
    }

    async fn call(&self, method: SdkMethod, args: Vec<Value>) -> Result<Value, SdkError> {
        self.post(&method.path(), &args).await
    }
}
