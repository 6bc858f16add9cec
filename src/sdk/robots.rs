/*!
Robot-address resolution.

The market and token operator ("robot") addresses are deployment specific,
so agents refer to them by name: `MARKET_ROBOT_ADDR` / `TOKEN_ROBOT_ADDR`
(ASCII case-insensitive). The concrete values come from the SDK's
configuration object, fetched on first need and cached for the process
lifetime. Concurrent first fetches share one `getConfig()` call; a failed
fetch is not cached.
*/

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::{ConfigSnapshot, LnfiSdk, SdkError};
use crate::registry::AddressResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotAlias {
    Market,
    Token,
}

impl RobotAlias {
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("MARKET_ROBOT_ADDR") {
            Some(RobotAlias::Market)
        } else if raw.eq_ignore_ascii_case("TOKEN_ROBOT_ADDR") {
            Some(RobotAlias::Token)
        } else {
            None
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            RobotAlias::Market => "MARKET_ROBOT_ADDR",
            RobotAlias::Token => "TOKEN_ROBOT_ADDR",
        }
    }
}

pub struct RobotAddressBook {
    sdk: Arc<dyn LnfiSdk>,
    snapshot: OnceCell<ConfigSnapshot>,
}

impl RobotAddressBook {
    pub fn new(sdk: Arc<dyn LnfiSdk>) -> Self {
        Self {
            sdk,
            snapshot: OnceCell::new(),
        }
    }

    /// Cached configuration snapshot, fetched once.
    pub async fn snapshot(&self) -> Result<&ConfigSnapshot, SdkError> {
        self.snapshot
            .get_or_try_init(|| async {
                info!("fetching deployment configuration");
                let raw = self.sdk.get_config().await?;
                ConfigSnapshot::from_value(raw)
            })
            .await
    }

    /// Substitute a robot alias; any other string is returned unchanged.
    pub async fn resolve_address(&self, raw: &str) -> Result<String, SdkError> {
        let Some(alias) = RobotAlias::parse(raw) else {
            return Ok(raw.to_string());
        };
        let snapshot = self.snapshot().await?;
        let addr = snapshot.robot_address(alias).ok_or_else(|| {
            SdkError::Malformed(format!("configuration has no {}", alias.key()))
        })?;
        debug!(alias = alias.key(), "substituted robot address");
        Ok(addr.to_string())
    }
}

#[async_trait]
impl AddressResolver for RobotAddressBook {
    async fn resolve(&self, raw: &str) -> anyhow::Result<String> {
        Ok(self.resolve_address(raw).await?)
    }
}
