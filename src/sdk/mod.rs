/*!
Seam to the external Lnfi SDK.

The SDK (order book, balances, settlement, signing, Nostr relays) is an
opaque collaborator. This crate only needs:
  - `getConfig()` returning the deployment configuration object
  - grouped methods (`market.*`, `token.*`, `asset.*`, `marketApi.*`,
    `lock.*`) taking positional JSON arguments and returning JSON

`LnfiSdk` is that surface; `bridge::BridgeSdk` is the shipped
implementation. Tests use `mock::MockSdk`.
*/

pub mod bridge;
#[cfg(test)]
pub mod mock;
pub mod robots;
pub mod signer;

use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub use bridge::BridgeSdk;
pub use robots::{RobotAddressBook, RobotAlias};
pub use signer::SignerCredential;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SdkError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("{message}")]
    Rejected {
        message: String,
        cause: Option<Value>,
    },

    #[error("malformed response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait LnfiSdk: Send + Sync {
    async fn get_config(&self) -> Result<Value, SdkError>;

    async fn call(&self, method: SdkMethod, args: Vec<Value>) -> Result<Value, SdkError>;
}

/* ---- Method Catalog ---- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SdkGroup {
    Market,
    Token,
    Asset,
    MarketApi,
    Lock,
}

impl SdkGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            SdkGroup::Market => "market",
            SdkGroup::Token => "token",
            SdkGroup::Asset => "asset",
            SdkGroup::MarketApi => "marketApi",
            SdkGroup::Lock => "lock",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SdkMethod {
    MarketListOrder,
    MarketTakeOrder,
    MarketCancelOrder,
    MarketRepairOrder,
    TokenApprove,
    TokenTransfer,
    TokenAddAddressBook,
    TokenDeposit,
    TokenWithdraw,
    AssetGetBalance,
    AssetGetTokenList,
    AssetGetAllowance,
    AssetGetFundingRecords,
    AssetGetTokenEvents,
    AssetGetHolders,
    AssetGetHolder,
    AssetGetHolderSummary,
    AssetGetPayeeList,
    MarketApiGetMarketTokenList,
    MarketApiGetMarketOrderListing,
    MarketApiGetOrderHistory,
    MarketApiGetMarketMyOrder,
    MarketApiGetKline,
    LockGetLockList,
}

impl SdkMethod {
    pub fn group(&self) -> SdkGroup {
        use SdkMethod::*;
        match self {
            MarketListOrder | MarketTakeOrder | MarketCancelOrder | MarketRepairOrder => {
                SdkGroup::Market
            }
            TokenApprove | TokenTransfer | TokenAddAddressBook | TokenDeposit | TokenWithdraw => {
                SdkGroup::Token
            }
            AssetGetBalance | AssetGetTokenList | AssetGetAllowance | AssetGetFundingRecords
            | AssetGetTokenEvents | AssetGetHolders | AssetGetHolder | AssetGetHolderSummary
            | AssetGetPayeeList => SdkGroup::Asset,
            MarketApiGetMarketTokenList
            | MarketApiGetMarketOrderListing
            | MarketApiGetOrderHistory
            | MarketApiGetMarketMyOrder
            | MarketApiGetKline => SdkGroup::MarketApi,
            LockGetLockList => SdkGroup::Lock,
        }
    }

    /// Method name within its group, as the SDK spells it.
    pub fn method_name(&self) -> &'static str {
        use SdkMethod::*;
        match self {
            MarketListOrder => "listOrder",
            MarketTakeOrder => "takeOrder",
            MarketCancelOrder => "cancelOrder",
            MarketRepairOrder => "repairOrder",
            TokenApprove => "approve",
            TokenTransfer => "transfer",
            TokenAddAddressBook => "addAddressBook",
            TokenDeposit => "deposit",
            TokenWithdraw => "withdraw",
            AssetGetBalance => "getBalance",
            AssetGetTokenList => "getTokenList",
            AssetGetAllowance => "getAllowance",
            AssetGetFundingRecords => "getFundingRecords",
            AssetGetTokenEvents => "getTokenEvents",
            AssetGetHolders => "getHolders",
            AssetGetHolder => "getHolder",
            AssetGetHolderSummary => "getHolderSummary",
            AssetGetPayeeList => "getPayeeList",
            MarketApiGetMarketTokenList => "getMarketTokenList",
            MarketApiGetMarketOrderListing => "getMarketOrderListing",
            MarketApiGetOrderHistory => "getOrderHistory",
            MarketApiGetMarketMyOrder => "getMarketMyOrder",
            MarketApiGetKline => "getKline",
            LockGetLockList => "getLockList",
        }
    }

    /// Dotted path, e.g. `token.approve`.
    pub fn path(&self) -> String {
        format!("{}.{}", self.group().as_str(), self.method_name())
    }
}

impl fmt::Display for SdkMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.group().as_str(), self.method_name())
    }
}

/* ---- Configuration Snapshot ---- */

/// Deployment configuration as returned by `getConfig()`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConfigSnapshot {
    #[serde(rename = "MARKET_ROBOT_ADDR", default)]
    pub market_robot_addr: Option<String>,
    #[serde(rename = "TOKEN_ROBOT_ADDR", default)]
    pub token_robot_addr: Option<String>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl ConfigSnapshot {
    pub fn from_value(value: Value) -> Result<Self, SdkError> {
        serde_json::from_value(value)
            .map_err(|e| SdkError::Malformed(format!("configuration object: {e}")))
    }

    pub fn robot_address(&self, alias: RobotAlias) -> Option<&str> {
        match alias {
            RobotAlias::Market => self.market_robot_addr.as_deref(),
            RobotAlias::Token => self.token_robot_addr.as_deref(),
        }
    }
}
