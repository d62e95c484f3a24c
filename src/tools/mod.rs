//! Tool trait and registry
//!
//! Each tool wraps exactly one backend call. Tools never interpret the
//! backend's answer; whatever JSON comes back is handed to the model.

use crate::error::StewardError;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

pub mod client;
pub mod financial;
pub mod services;

pub use client::FinancialApi;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInput {
    pub tool_name: String,
    pub parameters: Value,
}

/// The backend's JSON answer, passed to the model untouched. Transport
/// failures surface as `Err` from `Tool::execute` instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub data: Value,
}

impl ToolOutput {
    pub fn ok(data: Value) -> Self {
        Self { data }
    }
}

/// Trait for a single tool
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// Parameter schema in the function-declaration dialect the model expects.
    fn parameters(&self) -> Value;
    async fn execute(&self, input: &ToolInput) -> Result<ToolOutput>;
}

/// Tool registry for looking up and executing tools
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a registry holding every backend tool, all sharing one client.
pub fn create_default_registry(api: FinancialApi) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    for op in financial::FinancialOp::ALL {
        registry.register(Arc::new(financial::FinancialTool::new(op, api.clone())));
    }
    for query in services::CatalogQuery::ALL {
        registry.register(Arc::new(services::CatalogTool::new(query, api.clone())));
    }

    registry
}

/// Names of every tool `create_default_registry` registers.
pub fn all_tool_names() -> Vec<&'static str> {
    financial::FinancialOp::ALL
        .iter()
        .map(|op| op.name())
        .chain(services::CatalogQuery::ALL.iter().map(|q| q.name()))
        .collect()
}

//
// ================= Argument Helpers =================
//

fn ensure_object_parameters(input: &ToolInput) -> Result<()> {
    if input.parameters.is_object() {
        Ok(())
    } else {
        Err(StewardError::InvalidToolInput(
            "tool_input must be a JSON object".to_string(),
        ))
    }
}

pub(crate) fn required_str<'a>(input: &'a ToolInput, key: &str) -> Result<&'a str> {
    ensure_object_parameters(input)?;
    input
        .parameters
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| {
            StewardError::InvalidToolInput(format!(
                "{} requires a string '{}'",
                input.tool_name, key
            ))
        })
}

pub(crate) fn required_object<'a>(input: &'a ToolInput, key: &str) -> Result<&'a Value> {
    ensure_object_parameters(input)?;
    input
        .parameters
        .get(key)
        .filter(|v| v.is_object())
        .ok_or_else(|| {
            StewardError::InvalidToolInput(format!(
                "{} requires an object '{}'",
                input.tool_name, key
            ))
        })
}

/// Integers sometimes arrive as floats or strings from the model.
pub(crate) fn optional_i64(input: &ToolInput, key: &str) -> Result<Option<i64>> {
    ensure_object_parameters(input)?;
    match input.parameters.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| bad_integer(input, key)),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| bad_integer(input, key)),
        Some(_) => Err(bad_integer(input, key)),
    }
}

fn bad_integer(input: &ToolInput, key: &str) -> StewardError {
    StewardError::InvalidToolInput(format!(
        "{} expects an integer '{}'",
        input.tool_name, key
    ))
}

//
// ================= Parameter Schemas =================
//

pub(crate) fn string_param(description: &str) -> Value {
    json!({ "type": "STRING", "description": description })
}

pub(crate) fn integer_param(description: &str) -> Value {
    json!({ "type": "INTEGER", "description": description })
}

pub(crate) fn number_param(description: &str) -> Value {
    json!({ "type": "NUMBER", "description": description })
}

pub(crate) fn object_param(description: &str, properties: Value) -> Value {
    json!({ "type": "OBJECT", "description": description, "properties": properties })
}

pub(crate) fn parameters(properties: Value, required: &[&str]) -> Value {
    json!({ "type": "OBJECT", "properties": properties, "required": required })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn input(parameters: Value) -> ToolInput {
        ToolInput {
            tool_name: "get_user_profile".to_string(),
            parameters,
        }
    }

    #[test]
    fn test_required_str() {
        assert_eq!(
            required_str(&input(json!({"user_id": "user-001"})), "user_id").unwrap(),
            "user-001"
        );
        assert!(matches!(
            required_str(&input(json!({"user_id": " "})), "user_id"),
            Err(StewardError::InvalidToolInput(_))
        ));
        assert!(required_str(&input(json!("user-001")), "user_id").is_err());
    }

    #[test]
    fn test_optional_i64_accepts_loose_numbers() {
        assert_eq!(optional_i64(&input(json!({})), "history_days").unwrap(), None);
        assert_eq!(
            optional_i64(&input(json!({"history_days": 90.0})), "history_days").unwrap(),
            Some(90)
        );
        assert_eq!(
            optional_i64(&input(json!({"history_days": "7"})), "history_days").unwrap(),
            Some(7)
        );
        assert!(optional_i64(&input(json!({"history_days": true})), "history_days").is_err());
    }

    #[test]
    fn test_default_registry_holds_every_tool() {
        let api = FinancialApi::new("http://127.0.0.1:8081/api", Duration::from_secs(1)).unwrap();
        let registry = create_default_registry(api);

        assert_eq!(registry.len(), 27);
        assert_eq!(registry.list().len(), all_tool_names().len());
        assert!(registry.get("schedule_meeting").is_some());
        assert!(registry.get("get_all_data_schemas").is_some());
        assert!(registry.get("strategy_builder").is_none());

        for name in registry.list() {
            let tool = registry.get(name).unwrap();
            assert_eq!(tool.parameters()["type"], "OBJECT", "{}", name);
            assert!(!tool.description().is_empty());
        }
    }
}
