//! Tool extension trait and the built-in tools.
//!
//! Every callable operation is a [`Tool`] registered in a [`ToolRegistry`].
//! The same registry backs `GET /tools/list` / `POST /tools/{name}` on the
//! HTTP server and `list_tools` / `call_tool` on the MCP bridge, so both
//! surfaces always agree.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                ToolRegistry                  │
//! │  search · list_scenarios · get_scenario      │
//! │  list_cards · add-note · (custom Rust tools) │
//! └──────────────┬───────────────────────────────┘
//!                ▼
//!        ToolContext → Catalog
//! ```
//!
//! # Usage
//!
//! ```rust
//! use arkham_horror_mcp::traits::ToolRegistry;
//!
//! let tools = ToolRegistry::with_builtins();
//! assert_eq!(tools.len(), 5);
//! ```

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::search::SearchRequest;

/// Name of the note-taking tool; the MCP bridge announces a resource list
/// change after it runs.
pub const ADD_NOTE_TOOL: &str = "add-note";

// ═══════════════════════════════════════════════════════════════════════
// Tool Trait
// ═══════════════════════════════════════════════════════════════════════

/// A tool that agents can discover and call.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use anyhow::Result;
/// use serde_json::{json, Value};
/// use arkham_horror_mcp::traits::{Tool, ToolContext};
///
/// pub struct ScenarioCountTool;
///
/// #[async_trait]
/// impl Tool for ScenarioCountTool {
///     fn name(&self) -> &str { "scenario_count" }
///     fn description(&self) -> &str { "Count cached scenarios" }
///
///     fn parameters_schema(&self) -> Value {
///         json!({ "type": "object", "properties": {} })
///     }
///
///     async fn execute(&self, _params: Value, ctx: &ToolContext) -> Result<Value> {
///         let scenarios = ctx.catalog().list_scenarios().await;
///         Ok(json!({ "count": scenarios.len() }))
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Route name (`POST /tools/{name}`) and MCP tool name.
    fn name(&self) -> &str;

    /// One-line description for agent discovery.
    fn description(&self) -> &str;

    /// Whether this tool ships with the server. Defaults to `false`.
    fn is_builtin(&self) -> bool {
        false
    }

    /// `false` when calling the tool changes server state.
    fn is_read_only(&self) -> bool {
        true
    }

    /// JSON Schema (`type: "object"`) for the parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute with validated parameters (always a JSON object).
    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value>;
}

/// Serializable tool info for the `/tools/list` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    pub builtin: bool,
    pub parameters: Value,
}

impl ToolInfo {
    pub fn from_tool(tool: &dyn Tool) -> Self {
        Self {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            builtin: tool.is_builtin(),
            parameters: tool.parameters_schema(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ToolContext
// ═══════════════════════════════════════════════════════════════════════

/// Gives tools access to the catalog. Created per invocation.
pub struct ToolContext {
    catalog: Arc<Catalog>,
}

impl ToolContext {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Parameter validation
// ═══════════════════════════════════════════════════════════════════════

/// Check `params` against a tool schema: required keys, declared types and
/// enums. Missing optional keys with a schema `default` are filled in.
pub fn validate_params(schema: &Value, params: &Value) -> Result<Value> {
    let params_obj = match params {
        Value::Object(map) => map.clone(),
        Value::Null => serde_json::Map::new(),
        other => bail!("parameters must be an object, got {}", json_type_name(other)),
    };

    let properties = schema
        .get("properties")
        .and_then(|p| p.as_object())
        .cloned()
        .unwrap_or_default();

    let required: Vec<&str> = schema
        .get("required")
        .and_then(|r| r.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    for field in &required {
        if !params_obj.contains_key(*field) {
            bail!("missing required parameter: {}", field);
        }
    }

    let mut result = params_obj.clone();

    for (prop_name, prop_schema) in &properties {
        let Some(value) = params_obj.get(prop_name) else {
            if let Some(default) = prop_schema.get("default") {
                result.insert(prop_name.clone(), default.clone());
            }
            continue;
        };

        if let Some(expected) = prop_schema.get("type").and_then(|t| t.as_str()) {
            let type_ok = match expected {
                "string" => value.is_string(),
                "integer" => value.is_i64() || value.is_u64(),
                "number" => value.is_number(),
                "boolean" => value.is_boolean(),
                "array" => value.is_array(),
                "object" => value.is_object(),
                _ => true,
            };
            if !type_ok {
                bail!(
                    "parameter '{}' must be of type '{}', got {}",
                    prop_name,
                    expected,
                    json_type_name(value)
                );
            }
        }

        if let Some(allowed) = prop_schema.get("enum").and_then(|e| e.as_array()) {
            if !allowed.contains(value) {
                let allowed: Vec<String> = allowed.iter().map(|v| v.to_string()).collect();
                bail!(
                    "parameter '{}' must be one of [{}], got {}",
                    prop_name,
                    allowed.join(", "),
                    value
                );
            }
        }
    }

    Ok(Value::Object(result))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Built-in Tool Implementations
// ═══════════════════════════════════════════════════════════════════════

/// Scenario / card / investigator search.
pub struct SearchTool;

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Search Arkham Horror LCG scenarios, cards, or investigators by name and attributes"
    }

    fn is_builtin(&self) -> bool {
        true
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "type": { "type": "string", "description": "Object type: scenario, card, or investigator" },
                "name": { "type": "string", "description": "Name or partial name to search for" },
                "min_players": { "type": "integer", "description": "Scenario minimum player count at least this" },
                "max_players": { "type": "integer", "description": "Scenario maximum player count at most this" },
                "difficulty": { "type": "string", "description": "Scenario difficulty (exact, case-insensitive)" },
                "fuzzy": { "type": "boolean", "description": "Rank by name similarity instead of substring match", "default": false },
                "min_similarity": { "type": "number", "description": "Similarity threshold for fuzzy matching (0-1)" },
                "faction": { "type": "string", "description": "Card faction (substring, case-insensitive)" }
            },
            "required": ["type"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        let request: SearchRequest =
            serde_json::from_value(params).context("invalid search parameters")?;
        let results = ctx.catalog().search(&request).await;
        Ok(json!({ "results": results }))
    }
}

/// Cached scenario listing.
pub struct ListScenariosTool;

#[async_trait]
impl Tool for ListScenariosTool {
    fn name(&self) -> &str {
        "list_scenarios"
    }

    fn description(&self) -> &str {
        "List fan-made Arkham Horror scenarios"
    }

    fn is_builtin(&self) -> bool {
        true
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _params: Value, ctx: &ToolContext) -> Result<Value> {
        let scenarios = ctx.catalog().list_scenarios().await;
        Ok(json!({ "scenarios": scenarios.as_slice() }))
    }
}

/// Scenario page content by id.
pub struct GetScenarioTool;

#[async_trait]
impl Tool for GetScenarioTool {
    fn name(&self) -> &str {
        "get_scenario"
    }

    fn description(&self) -> &str {
        "Retrieve the content of a scenario by id"
    }

    fn is_builtin(&self) -> bool {
        true
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "id": { "type": "string", "description": "Scenario id from list_scenarios" }
            },
            "required": ["id"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        let id = params["id"].as_str().unwrap_or("");
        if id.trim().is_empty() {
            bail!("id must not be empty");
        }

        let content = ctx.catalog().get_scenario_detail(id).await?;
        Ok(json!({ "id": id, "content": content }))
    }
}

/// Live card listing.
pub struct ListCardsTool;

#[async_trait]
impl Tool for ListCardsTool {
    fn name(&self) -> &str {
        "list_cards"
    }

    fn description(&self) -> &str {
        "List cards from the card database, optionally filtered by type"
    }

    fn is_builtin(&self) -> bool {
        true
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "type": { "type": "string", "description": "Card type code, e.g. investigator, asset, event" }
            }
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        let type_filter = params.get("type").and_then(|t| t.as_str());
        let cards = ctx.catalog().list_cards(type_filter).await;
        Ok(json!({ "cards": cards }))
    }
}

/// Stores a named note.
pub struct AddNoteTool;

#[async_trait]
impl Tool for AddNoteTool {
    fn name(&self) -> &str {
        ADD_NOTE_TOOL
    }

    fn description(&self) -> &str {
        "Add a new note"
    }

    fn is_builtin(&self) -> bool {
        true
    }

    fn is_read_only(&self) -> bool {
        false
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "content": { "type": "string" }
            },
            "required": ["name", "content"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        let name = params["name"].as_str().unwrap_or("");
        let content = params["content"].as_str().unwrap_or("");
        if name.is_empty() || content.is_empty() {
            bail!("name and content must not be empty");
        }

        ctx.catalog().add_note(name, content).await;
        Ok(Value::String(format!(
            "Added note '{}' with content: {}",
            name, content
        )))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════

/// Registry for tools (built-in and custom Rust).
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Registry pre-loaded with every built-in tool.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(SearchTool));
        registry.register(Box::new(ListScenariosTool));
        registry.register(Box::new(GetScenarioTool));
        registry.register(Box::new(ListCardsTool));
        registry.register(Box::new(AddNoteTool));
        registry
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn tools(&self) -> &[Box<dyn Tool>] {
        &self.tools
    }

    pub fn find(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    pub fn infos(&self) -> Vec<ToolInfo> {
        self.tools.iter().map(|t| ToolInfo::from_tool(t.as_ref())).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// `arkham tools`
pub fn list_tools(registry: &ToolRegistry) {
    for info in registry.infos() {
        let tag = if info.builtin { "builtin" } else { "rust" };
        println!("  POST /tools/{} - {} ({})", info.name, info.description, tag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let registry = ToolRegistry::with_builtins();
        let names: Vec<&str> = registry.tools().iter().map(|t| t.name()).collect();
        assert_eq!(
            names,
            vec!["search", "list_scenarios", "get_scenario", "list_cards", "add-note"]
        );
        assert!(registry.find("add-note").is_some());
        assert!(registry.find("missing").is_none());
    }

    #[test]
    fn test_only_add_note_writes() {
        let registry = ToolRegistry::with_builtins();
        let writers: Vec<&str> = registry
            .tools()
            .iter()
            .filter(|t| !t.is_read_only())
            .map(|t| t.name())
            .collect();
        assert_eq!(writers, vec![ADD_NOTE_TOOL]);
    }

    #[test]
    fn test_validate_missing_required() {
        let schema = SearchTool.parameters_schema();
        let err = validate_params(&schema, &json!({ "name": "blob" })).unwrap_err();
        assert!(err.to_string().contains("missing required parameter: type"));
    }

    #[test]
    fn test_validate_type_mismatch() {
        let schema = SearchTool.parameters_schema();
        let err = validate_params(&schema, &json!({ "type": "scenario", "min_players": "two" }))
            .unwrap_err();
        assert!(err.to_string().contains("must be of type 'integer'"));
    }

    #[test]
    fn test_validate_injects_defaults() {
        let schema = SearchTool.parameters_schema();
        let params = validate_params(&schema, &json!({ "type": "card" })).unwrap();
        assert_eq!(params["fuzzy"], json!(false));
        assert!(params.get("min_similarity").is_none());
    }

    #[test]
    fn test_validate_null_params_as_empty_object() {
        let schema = ListScenariosTool.parameters_schema();
        assert_eq!(validate_params(&schema, &Value::Null).unwrap(), json!({}));
    }

    #[test]
    fn test_validate_enum() {
        let schema = json!({
            "type": "object",
            "properties": { "style": { "type": "string", "enum": ["brief", "detailed"] } }
        });
        assert!(validate_params(&schema, &json!({ "style": "detailed" })).is_ok());
        assert!(validate_params(&schema, &json!({ "style": "verbose" })).is_err());
    }
}
