/*!
Lnfi tool catalog.

Every tool is a row of data: name, agent-facing description, typed fields,
and the SDK target it forwards to. `build_registry` turns the catalog into
a `CommandRegistry` whose handlers all share one `SdkForward` shape.

Argument mapping to the SDK call (`ArgShape`):
  - None       -> no arguments
  - Object     -> one object argument with the provided fields
                  (absent optional fields are omitted)
  - Fields(..) -> positional arguments in the listed order
                  (absent optional fields are passed as null)
*/

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::RegistryError;
use crate::registry::{
    Arguments, CommandDescriptor, CommandHandler, CommandRegistry, FieldSpec, FieldType,
    InputSchema,
};
use crate::sdk::{LnfiSdk, RobotAddressBook, SdkMethod};

use crate::registry::FieldType::{Number, String as Str};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgShape {
    None,
    Object,
    Fields(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Config,
    Sdk(SdkMethod, ArgShape),
}

#[derive(Debug, Clone)]
pub struct ToolDef {
    pub name: &'static str,
    pub description: &'static str,
    pub schema: InputSchema,
    pub target: Target,
}

fn tool(
    name: &'static str,
    description: &'static str,
    fields: Vec<FieldSpec>,
    target: Target,
) -> ToolDef {
    ToolDef {
        name,
        description,
        schema: InputSchema::new(fields),
        target,
    }
}

fn req(name: &'static str, ty: FieldType) -> FieldSpec {
    FieldSpec::required(name, ty)
}

fn opt(name: &'static str, ty: FieldType) -> FieldSpec {
    FieldSpec::optional(name, ty)
}

fn page_fields() -> [FieldSpec; 2] {
    [opt("page", Number), opt("count", Number)]
}

const APPROVE_TO_HELP: &str =
    "MARKET_ROBOT_ADDR or TOKEN_ROBOT_ADDR (fixed strings), or a nostr address (e.g. npub...)";

/// The full tool catalog, in declaration order.
pub fn catalog() -> Vec<ToolDef> {
    use ArgShape::{Fields, Object};
    use SdkMethod::*;
    use Target::Sdk;

    vec![
        tool(
            "LnfiGetConfig",
            "Lnfi get deployment configuration (robot addresses and environment settings)",
            vec![],
            Target::Config,
        ),
        /* ---- market ---- */
        tool(
            "LnfiMarketListOrder",
            "Lnfi list a new market order. Call LnfiTokenApprove first to authorize amount*price SATS with approveTo set to MARKET_ROBOT_ADDR",
            vec![
                req("side", Str).describe("buy or sell"),
                req("amount", Number),
                req("price", Str),
                req("buyOrSellTokenName", Str),
                req("payTokenName", Str),
            ],
            Sdk(MarketListOrder, Object),
        ),
        tool(
            "LnfiMarketTakeOrder",
            "Lnfi take an existing market order. Call LnfiMarketsGetOrderListing to get the value in SATS, then LnfiTokenApprove with approveTo set to MARKET_ROBOT_ADDR",
            vec![req("orderId", Str)],
            Sdk(MarketTakeOrder, Fields(&["orderId"])),
        ),
        tool(
            "LnfiMarketCancelOrder",
            "Lnfi cancel a market order",
            vec![req("orderId", Str)],
            Sdk(MarketCancelOrder, Fields(&["orderId"])),
        ),
        tool(
            "LnfiMarketRepairOrder",
            "Lnfi repair a market order",
            vec![req("orderId", Str)],
            Sdk(MarketRepairOrder, Fields(&["orderId"])),
        ),
        /* ---- token ---- */
        tool(
            "LnfiTokenApprove",
            "Lnfi approve token spending",
            vec![
                req("tokenName", Str),
                req("amount", Number),
                req("approveTo", Str).describe(APPROVE_TO_HELP).address(),
            ],
            Sdk(TokenApprove, Object),
        ),
        tool(
            "LnfiTokenTransfer",
            "Lnfi transfer tokens",
            vec![req("tokenName", Str), req("amount", Number), req("to", Str)],
            Sdk(TokenTransfer, Object),
        ),
        tool(
            "LnfiTokenAddAddressBook",
            "Lnfi add an address to the address book",
            vec![req("address", Str), req("name", Str)],
            Sdk(TokenAddAddressBook, Object),
        ),
        tool(
            "LnfiTokenDeposit",
            "Lnfi deposit tokens",
            vec![
                req("tokenName", Str).describe("If given as SATS, do not convert to BTC"),
                req("amount", Number),
                opt("to", Str).describe("Receiving user address; omit to deposit to self"),
            ],
            Sdk(TokenDeposit, Object),
        ),
        tool(
            "LnfiTokenWithdraw",
            "Lnfi withdraw tokens to a lightning invoice",
            vec![req("tokenName", Str), req("invoice", Str)],
            Sdk(TokenWithdraw, Object),
        ),
        /* ---- asset ---- */
        tool(
            "LnfiAssetGetBalance",
            "Lnfi get asset balance",
            vec![opt("user", Str).describe("User address; omit to query self")],
            Sdk(AssetGetBalance, Fields(&["user"])),
        ),
        tool(
            "LnfiAssetGetTokenList",
            "Lnfi get token list",
            vec![],
            Sdk(AssetGetTokenList, ArgShape::None),
        ),
        tool(
            "LnfiAssetGetAllowance",
            "Lnfi get token allowance",
            vec![
                req("token", Str),
                opt("owner", Str).describe("Owner address; omit to query self").address(),
                req("spender", Str).describe(APPROVE_TO_HELP).address(),
            ],
            Sdk(AssetGetAllowance, Fields(&["token", "owner", "spender"])),
        ),
        tool(
            "LnfiAssetGetFundingRecords",
            "Lnfi get funding records",
            [
                page_fields().to_vec(),
                vec![
                    opt("type", Str),
                    opt("tokenAddress", Str),
                    opt("address", Str),
                    opt("status", Str),
                ],
            ]
            .concat(),
            Sdk(AssetGetFundingRecords, Object),
        ),
        tool(
            "LnfiAssetGetTokenEvents",
            "Lnfi get token events",
            [
                vec![
                    opt("type", Str),
                    opt("token", Str),
                    opt("eventId", Str),
                    opt("address", Str),
                ],
                page_fields().to_vec(),
            ]
            .concat(),
            Sdk(AssetGetTokenEvents, Object),
        ),
        tool(
            "LnfiAssetGetHolders",
            "Lnfi get token holders",
            [
                vec![req("assetId", Str), opt("owner", Str)],
                page_fields().to_vec(),
            ]
            .concat(),
            Sdk(AssetGetHolders, Object),
        ),
        tool(
            "LnfiAssetGetHolder",
            "Lnfi get holder info",
            vec![req("assetId", Str), opt("owner", Str)],
            Sdk(AssetGetHolder, Fields(&["assetId", "owner"])),
        ),
        tool(
            "LnfiAssetGetHolderSummary",
            "Lnfi get holder summary",
            vec![req("assetId", Str)],
            Sdk(AssetGetHolderSummary, Fields(&["assetId"])),
        ),
        tool(
            "LnfiAssetGetPayeeList",
            "Lnfi get payee list",
            vec![],
            Sdk(AssetGetPayeeList, ArgShape::None),
        ),
        /* ---- market api ---- */
        tool(
            "LnfiMarketsGetTokenList",
            "Lnfi get market token list",
            vec![],
            Sdk(MarketApiGetMarketTokenList, ArgShape::None),
        ),
        tool(
            "LnfiMarketsGetOrderListing",
            "Lnfi get market order listing",
            [
                page_fields().to_vec(),
                vec![
                    opt("token", Str),
                    opt("type", Str).describe(
                        "Order type filter. To buy, query SELL. To sell, query BUY.",
                    ),
                ],
            ]
            .concat(),
            Sdk(MarketApiGetMarketOrderListing, Object),
        ),
        tool(
            "LnfiMarketsGetOrderHistory",
            "Lnfi get order history",
            [
                page_fields().to_vec(),
                vec![
                    opt("type", Str),
                    opt("token", Str),
                    opt("eventId", Str),
                    opt("status", Str),
                    opt("address", Str),
                ],
            ]
            .concat(),
            Sdk(MarketApiGetOrderHistory, Object),
        ),
        tool(
            "LnfiMarketsGetMyOrder",
            "Lnfi get my market orders",
            [
                page_fields().to_vec(),
                vec![
                    opt("type", Str).describe("buy or sell; omit for both"),
                    opt("token", Str).describe("Token address; omit for all tokens"),
                    opt("status", Str),
                    opt("owner", Str),
                ],
            ]
            .concat(),
            Sdk(MarketApiGetMarketMyOrder, Object),
        ),
        tool(
            "LnfiMarketsGetKline",
            "Lnfi get market kline data",
            vec![
                req("tokenAddress", Str),
                opt("startDataTime", Str),
                opt("endDataTime", Str),
            ],
            Sdk(MarketApiGetKline, Object),
        ),
        /* ---- lock ---- */
        tool(
            "LnfiLockGetLockList",
            "Lnfi get lock list",
            [page_fields().to_vec(), vec![opt("owner", Str)]].concat(),
            Sdk(LockGetLockList, Object),
        ),
    ]
}

pub fn find(name: &str) -> Option<ToolDef> {
    catalog().into_iter().find(|t| t.name.eq_ignore_ascii_case(name))
}

/* ---- Handler ---- */

/// Forwards validated arguments to one SDK method.
pub struct SdkForward {
    sdk: Arc<dyn LnfiSdk>,
    target: Target,
}

impl SdkForward {
    pub fn new(sdk: Arc<dyn LnfiSdk>, target: Target) -> Self {
        Self { sdk, target }
    }
}

#[async_trait]
impl CommandHandler for SdkForward {
    async fn call(&self, args: Arguments) -> anyhow::Result<Value> {
        match self.target {
            Target::Config => Ok(self.sdk.get_config().await?),
            Target::Sdk(method, shape) => {
                let sdk_args = match shape {
                    ArgShape::None => Vec::new(),
                    ArgShape::Object => vec![Value::Object(args.to_object())],
                    ArgShape::Fields(names) => args.positional(names),
                };
                Ok(self.sdk.call(method, sdk_args).await?)
            }
        }
    }
}

/// Register the whole catalog against `sdk`, with robot-address resolution.
pub fn build_registry(sdk: Arc<dyn LnfiSdk>) -> Result<CommandRegistry, RegistryError> {
    let robots = Arc::new(RobotAddressBook::new(sdk.clone()));
    let mut registry = CommandRegistry::with_resolver(robots);
    for def in catalog() {
        registry.register(CommandDescriptor::new(
            def.name,
            def.description,
            def.schema,
            SdkForward::new(sdk.clone(), def.target),
        ))?;
    }
    Ok(registry)
}
