//! MCP JSON-RPC protocol bridge.
//!
//! Adapts the [`Catalog`] and [`ToolRegistry`] to the Model Context
//! Protocol. The same bridge serves both transports: Streamable HTTP
//! (mounted at `/mcp` by [`crate::server`]) and stdio (`arkham serve stdio`).
//!
//! * **Resources**: one `arkham://scenario/<id>` per cached scenario
//!   (`text/html`) and one `arkham://note/<name>` per note (`text/plain`).
//! * **Tools**: the registry, via `list_tools` / `call_tool`.
//! * **Prompts**: `summarize-notes`, with an optional `style` argument.

use std::borrow::Cow;
use std::sync::Arc;

use rmcp::model::*;
use rmcp::{ErrorData as McpError, ServerHandler};
use tracing::{debug, warn};

use crate::catalog::{Catalog, ResourceUri};
use crate::error::ArkhamError;
use crate::notes::{summary_prompt, SummaryStyle};
use crate::traits::{validate_params, ToolContext, ToolRegistry, ADD_NOTE_TOOL};

pub const SUMMARIZE_NOTES_PROMPT: &str = "summarize-notes";

/// Bridges the catalog and tool registry to the MCP JSON-RPC protocol.
///
/// Each MCP session receives a clone of this struct (everything is
/// behind `Arc`), so all sessions share one cache and one note store.
#[derive(Clone)]
pub struct McpBridge {
    catalog: Arc<Catalog>,
    tools: Arc<ToolRegistry>,
}

impl McpBridge {
    pub fn new(catalog: Arc<Catalog>, tools: Arc<ToolRegistry>) -> Self {
        Self { catalog, tools }
    }

    /// Convert a registry tool into an rmcp `Tool` descriptor.
    fn to_mcp_tool(tool: &dyn crate::traits::Tool) -> Tool {
        let input_schema: Arc<serde_json::Map<String, serde_json::Value>> =
            match tool.parameters_schema() {
                serde_json::Value::Object(map) => Arc::new(map),
                _ => Arc::new(serde_json::Map::new()),
            };

        Tool {
            name: Cow::Owned(tool.name().to_string()),
            title: None,
            description: Some(Cow::Owned(tool.description().to_string())),
            input_schema,
            output_schema: None,
            annotations: Some(ToolAnnotations::new().read_only(tool.is_read_only())),
            execution: None,
            icons: None,
            meta: None,
        }
    }

    fn summarize_notes_prompt() -> Prompt {
        Prompt {
            name: SUMMARIZE_NOTES_PROMPT.to_string(),
            title: None,
            description: Some("Creates a summary of all notes".to_string()),
            arguments: Some(vec![PromptArgument {
                name: "style".to_string(),
                title: None,
                description: Some("Style of the summary (brief/detailed)".to_string()),
                required: Some(false),
            }]),
            icons: None,
            meta: None,
        }
    }

    fn to_mcp_error(err: ArkhamError) -> McpError {
        match err {
            ArkhamError::NotFound(_) => McpError::resource_not_found(err.to_string(), None),
            ArkhamError::InvalidUri(_) | ArkhamError::Validation(_) => {
                McpError::invalid_params(err.to_string(), None)
            }
            _ => McpError::internal_error(err.to_string(), None),
        }
    }

    /// Every readable resource: cached scenarios first, then notes.
    pub async fn resources(&self) -> Vec<Resource> {
        let mut resources = Vec::new();

        for s in self.catalog.list_scenarios().await.iter() {
            let mut raw = RawResource::new(ResourceUri::scenario(&s.id), s.title.clone());
            raw.description = Some(s.description.clone());
            raw.mime_type = Some("text/html".to_string());
            resources.push(raw.no_annotation());
        }

        for note in self.catalog.notes().await {
            let mut raw =
                RawResource::new(ResourceUri::note(&note.name), format!("Note: {}", note.name));
            raw.description = Some(format!("A simple note named {}", note.name));
            raw.mime_type = Some("text/plain".to_string());
            resources.push(raw.no_annotation());
        }

        resources
    }
}

impl ServerHandler for McpBridge {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder()
                .enable_prompts()
                .enable_resources()
                .enable_tools()
                .build(),
            server_info: Implementation {
                name: "arkham-horror-mcp".to_string(),
                title: Some("Arkham Horror MCP".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Arkham Horror: The Card Game data. Scenarios are listed as resources \
                 (arkham://scenario/<id>). Use the search tool to filter scenarios, cards, \
                 and investigators, and add-note to keep session notes."
                    .to_string(),
            ),
        }
    }

    // ── Resources ────────────────────────────────────────────────────────

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(self.resources().await))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        debug!(uri = %request.uri, "read_resource");
        let text = self
            .catalog
            .read_resource(&request.uri)
            .await
            .map_err(Self::to_mcp_error)?;

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, request.uri)],
        })
    }

    // ── Tools ────────────────────────────────────────────────────────────

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let tools: Vec<Tool> = self
            .tools
            .tools()
            .iter()
            .map(|t| Self::to_mcp_tool(t.as_ref()))
            .collect();
        std::future::ready(Ok(ListToolsResult::with_all_items(tools)))
    }

    fn get_tool(&self, name: &str) -> Option<Tool> {
        self.tools.find(name).map(Self::to_mcp_tool)
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool = self.tools.find(&request.name).ok_or_else(|| {
            McpError::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("Unknown tool: {}", request.name),
                None,
            )
        })?;

        let params = request
            .arguments
            .map(serde_json::Value::Object)
            .unwrap_or(serde_json::Value::Object(serde_json::Map::new()));
        let params = validate_params(&tool.parameters_schema(), &params)
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

        let ctx = ToolContext::new(self.catalog.clone());
        match tool.execute(params, &ctx).await {
            Ok(result) => {
                if tool.name() == ADD_NOTE_TOOL {
                    if let Err(e) = context.peer.notify_resource_list_changed().await {
                        warn!(error = %e, "failed to send resource list changed notification");
                    }
                }
                let text = match result {
                    serde_json::Value::String(s) => s,
                    other => serde_json::to_string_pretty(&other).unwrap_or_default(),
                };
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!("{:#}", e))])),
        }
    }

    // ── Prompts ──────────────────────────────────────────────────────────

    fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListPromptsResult, McpError>> + Send + '_ {
        std::future::ready(Ok(ListPromptsResult::with_all_items(vec![
            Self::summarize_notes_prompt(),
        ])))
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParams,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        if request.name != SUMMARIZE_NOTES_PROMPT {
            return Err(McpError::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("Unknown prompt: {}", request.name),
                None,
            ));
        }

        let style = request
            .arguments
            .as_ref()
            .and_then(|args| args.get("style"))
            .and_then(|v| v.as_str());
        let notes = self.catalog.notes().await;
        let text = summary_prompt(&notes, SummaryStyle::parse(style));

        Ok(GetPromptResult {
            description: Some("Summarize the current notes".to_string()),
            messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
        })
    }
}
