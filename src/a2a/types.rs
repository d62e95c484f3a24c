//! A2A wire types: JSON-RPC envelopes, messages and tasks

use serde::{Deserialize, Serialize};
use serde_json::Value;

//
// ================= JSON-RPC =================
//

pub const JSONRPC_VERSION: &str = "2.0";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;
pub const TASK_NOT_FOUND: i64 = -32001;
pub const TASK_NOT_CANCELABLE: i64 = -32002;

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

//
// ================= Messages =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

/// Serialized with an explicit `kind`. On input `kind` may be omitted and is
/// inferred from whichever of `text` or `data` is present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase", try_from = "WirePart")]
pub enum Part {
    Text { text: String },
    Data { data: Value },
}

#[derive(Deserialize)]
struct WirePart {
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

impl TryFrom<WirePart> for Part {
    type Error = String;

    fn try_from(raw: WirePart) -> Result<Self, Self::Error> {
        let kind = match raw.kind {
            Some(kind) => kind,
            None if raw.text.is_some() => "text".to_string(),
            None => "data".to_string(),
        };

        match kind.as_str() {
            "text" => raw
                .text
                .map(|text| Part::Text { text })
                .ok_or_else(|| "text part is missing `text`".to_string()),
            "data" => raw
                .data
                .map(|data| Part::Data { data })
                .ok_or_else(|| "part has neither `text` nor `data`".to_string()),
            other => Err(format!("unsupported part kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: Role,
    pub parts: Vec<Part>,
    pub message_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
    #[serde(default = "message_kind")]
    pub kind: String,
}

fn message_kind() -> String {
    "message".to_string()
}

impl Message {
    pub fn agent_text(text: &str, task_id: &str, context_id: &str) -> Self {
        Self {
            role: Role::Agent,
            parts: vec![Part::Text {
                text: text.to_string(),
            }],
            message_id: uuid::Uuid::new_v4().to_string(),
            task_id: Some(task_id.to_string()),
            context_id: Some(context_id.to_string()),
            kind: message_kind(),
        }
    }

    /// Text parts joined by newlines; data parts rendered as JSON.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .map(|part| match part {
                Part::Text { text } => text.clone(),
                Part::Data { data } => data.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

//
// ================= Tasks =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    Submitted,
    Working,
    InputRequired,
    Completed,
    Canceled,
    Failed,
    Rejected,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Canceled | TaskState::Failed | TaskState::Rejected
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    pub state: TaskState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    pub timestamp: String,
}

impl TaskStatus {
    pub fn new(state: TaskState, message: Option<Message>) -> Self {
        Self {
            state,
            message,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub artifact_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub context_id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub history: Vec<Message>,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    #[serde(default = "task_kind")]
    pub kind: String,
}

fn task_kind() -> String {
    "task".to_string()
}

impl Task {
    pub fn new(context_id: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            context_id: context_id.to_string(),
            status: TaskStatus::new(TaskState::Submitted, None),
            history: Vec::new(),
            artifacts: Vec::new(),
            kind: task_kind(),
        }
    }
}

//
// ================= Method Params =================
//

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSendParams {
    pub message: Message,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQueryParams {
    pub id: String,
    #[serde(default)]
    pub history_length: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskIdParams {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_parts_by_kind() {
        let message: Message = serde_json::from_value(json!({
            "role": "user",
            "messageId": "m-1",
            "parts": [
                {"kind": "text", "text": "Show my goals"},
                {"kind": "data", "data": {"user_id": "user-002"}}
            ]
        }))
        .unwrap();

        assert_eq!(message.kind, "message");
        assert_eq!(message.text(), "Show my goals\n{\"user_id\":\"user-002\"}");
    }

    #[test]
    fn test_parts_without_kind() {
        let message: Message = serde_json::from_value(json!({
            "role": "user",
            "messageId": "m-2",
            "parts": [{"text": "Hello"}, {"data": {"amount": 5}}]
        }))
        .unwrap();

        assert_eq!(
            message.parts,
            vec![
                Part::Text {
                    text: "Hello".to_string()
                },
                Part::Data {
                    data: json!({"amount": 5})
                },
            ]
        );
        assert_eq!(
            serde_json::to_value(&message.parts[0]).unwrap(),
            json!({"kind": "text", "text": "Hello"})
        );

        assert!(serde_json::from_value::<Part>(json!({"kind": "file", "uri": "x"})).is_err());
        assert!(serde_json::from_value::<Part>(json!({})).is_err());
    }

    #[test]
    fn test_task_state_wire_names() {
        assert_eq!(
            serde_json::to_value(TaskState::InputRequired).unwrap(),
            json!("input-required")
        );
        assert!(TaskState::Canceled.is_terminal());
        assert!(!TaskState::Working.is_terminal());
    }

    #[test]
    fn test_error_response_omits_result() {
        let response = JsonRpcResponse::failure(json!(7), JsonRpcError::new(TASK_NOT_FOUND, "Task not found"));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["error"]["code"], -32001);
        assert!(json.get("result").is_none());
    }
}
