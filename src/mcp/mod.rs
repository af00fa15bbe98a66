//! MCP adapter: exposes one profile's registry over stdio.
//!
//! tools/list -> Registry (name, description, input schema)
//! tools/call -> Dispatcher -> CallToolResult (one text item, `isError` from the envelope)
//!
//! Tool failures never surface as JSON-RPC errors; only a cancelled request does.

use anyhow::{Context, Result};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ErrorData as McpError, ServerHandler, ServiceExt, transport::stdio};
use std::sync::Arc;

use crate::relay::{Dispatcher, Invoker, Registry, ResponseEnvelope};
use crate::servers::ServerKind;

pub struct RelayServer<I> {
    kind: ServerKind,
    dispatcher: Arc<Dispatcher<I>>,
}

impl<I> Clone for RelayServer<I> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            dispatcher: Arc::clone(&self.dispatcher),
        }
    }
}

impl<I: Invoker + 'static> RelayServer<I> {
    pub fn new(kind: ServerKind, registry: Arc<Registry>, invoker: I) -> Self {
        Self {
            kind,
            dispatcher: Arc::new(Dispatcher::new(registry, invoker)),
        }
    }

    /// Tool descriptors in registration order.
    pub fn tools(&self) -> Vec<Tool> {
        self.dispatcher
            .registry()
            .iter()
            .map(|op| Tool::new(op.name(), op.description(), Arc::clone(op.input_schema())))
            .collect()
    }

    pub async fn call(&self, request: CallToolRequestParam) -> CallToolResult {
        let envelope = self
            .dispatcher
            .dispatch(&request.name, request.arguments)
            .await;
        into_call_result(envelope)
    }
}

fn into_call_result(envelope: ResponseEnvelope) -> CallToolResult {
    let content = vec![Content::text(envelope.text)];
    if envelope.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

impl<I: Invoker + 'static> ServerHandler for RelayServer<I> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(self.kind.instructions().into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.kind.server_name().into(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let name = request.name.clone();
        // Dropping the dispatch future kills a running child / aborts the HTTP request.
        tokio::select! {
            result = self.call(request) => Ok(result),
            _ = context.ct.cancelled() => {
                tracing::debug!(tool = %name, "call cancelled by client");
                Err(McpError::internal_error(format!("call to '{name}' cancelled"), None))
            }
        }
    }
}

/// Serve `server` on stdin/stdout until the client disconnects.
pub async fn serve_stdio<I: Invoker + 'static>(server: RelayServer<I>) -> Result<()> {
    let name = server.kind.server_name();
    tracing::info!(server = name, tools = server.dispatcher.registry().len(), "serving on stdio");
    let running = server
        .serve(stdio())
        .await
        .with_context(|| format!("Failed to start MCP server '{name}'"))?;
    running.waiting().await.context("MCP server terminated abnormally")?;
    tracing::info!(server = name, "client disconnected");
    Ok(())
}
