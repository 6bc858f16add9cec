//! MCP server surface.
//!
//! `LnfiMcpServer` advertises the registry's catalog as MCP tools and routes
//! `tools/call` into `CommandRegistry::invoke`. Mapping of dispatch results:
//!   - success                         -> CallToolResult::success([text])
//!   - UnknownCommand / InvalidArgument -> protocol error (invalid_params)
//!   - HandlerFailure                  -> CallToolResult::error([message, cause?])
//!
//! `serve_stdio` runs the server on the process standard streams.

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, ErrorData as McpError, Implementation,
    ListToolsResult, PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler, ServiceExt};
use tracing::info;

use crate::error::DispatchError;
use crate::registry::{CommandRegistry, Envelope};

pub const SERVER_NAME: &str = "lnfi-mcp-node-service";

const INSTRUCTIONS: &str = "Lnfi trading tools. Token amounts are numbers; \
approve spending with LnfiTokenApprove (approveTo = MARKET_ROBOT_ADDR) before \
listing or taking market orders.";

#[derive(Clone)]
pub struct LnfiMcpServer {
    registry: Arc<CommandRegistry>,
}

impl LnfiMcpServer {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    /// Catalog as MCP tool descriptors, in name order.
    pub fn tools(&self) -> Vec<Tool> {
        self.registry
            .descriptors()
            .map(|d| {
                Tool::new(
                    d.name().to_string(),
                    d.description().to_string(),
                    Arc::new(d.schema().to_json_schema()),
                )
            })
            .collect()
    }
}

fn envelope_to_result(envelope: Envelope) -> CallToolResult {
    CallToolResult::success(envelope.texts().map(Content::text).collect())
}

fn dispatch_error_to_result(err: DispatchError) -> Result<CallToolResult, McpError> {
    match err {
        DispatchError::UnknownCommand(_) | DispatchError::InvalidArgument { .. } => {
            Err(McpError::invalid_params(err.to_string(), Some(err.detail())))
        }
        DispatchError::HandlerFailure { message, cause, .. } => {
            let mut content = vec![Content::text(message)];
            if let Some(cause) = cause {
                content.push(Content::text(cause.to_string()));
            }
            Ok(CallToolResult::error(content))
        }
    }
}

impl ServerHandler for LnfiMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            next_cursor: None,
            tools: self.tools(),
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let arguments = request.arguments.unwrap_or_default();
        match self.registry.invoke(&request.name, arguments).await {
            Ok(envelope) => Ok(envelope_to_result(envelope)),
            Err(err) => dispatch_error_to_result(err),
        }
    }
}

/// Serve on stdin/stdout until the peer disconnects.
pub async fn serve_stdio(server: LnfiMcpServer) -> Result<()> {
    info!(tools = server.registry.len(), "serving MCP on stdio");
    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .context("Failed to initialize MCP session on stdio")?;
    let reason = service.waiting().await.context("MCP session aborted")?;
    info!(?reason, "MCP session ended");
    Ok(())
}
