//! Gemini API client with function calling
//!
//! Translates the runtime's provider-neutral turns into `generateContent`
//! requests. Uses a long-lived reqwest::Client for connection pooling.

use crate::agent::runtime::{FunctionCall, LlmClient, LlmReply, LlmRequest, Turn};
use crate::error::StewardError;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{error, info};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Reusable Gemini client (connection-pooled)
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, request: &LlmRequest<'_>) -> Result<LlmReply> {
        if self.api_key.is_empty() {
            return Err(StewardError::LlmError(
                "GEMINI_API_KEY not configured".to_string(),
            ));
        }

        let url = format!("{}/models/{}:generateContent", self.base_url, request.model);
        let body = GeminiRequest::from_llm_request(request);

        info!(model = request.model, turns = request.turns.len(), "Calling Gemini API");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini API request failed: {}", e);
                StewardError::LlmError(format!("Gemini API error: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, "Gemini API error response: {}", error_text);
            return Err(StewardError::LlmError(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            StewardError::LlmError(format!("Gemini parse error: {}", e))
        })?;

        gemini_response.into_reply()
    }
}

//
// ================= Wire Types =================
//

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolDeclarations>,
    system_instruction: Content,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<WireFunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<WireFunctionResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolDeclarations {
    function_declarations: Vec<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: i32,
    max_output_tokens: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    finish_reason: Option<String>,
}

fn text_part(text: &str) -> Part {
    Part {
        text: Some(text.to_string()),
        ..Part::default()
    }
}

/// `functionResponse.response` must be a JSON object.
fn response_object(value: &Value) -> Value {
    if value.is_object() {
        value.clone()
    } else {
        json!({ "result": value })
    }
}

/// `None` for a model turn with nothing in it; Gemini rejects empty `parts`.
fn to_content(turn: &Turn) -> Option<Content> {
    let content = match turn {
        Turn::User { text } => Content {
            role: Some("user".to_string()),
            parts: vec![text_part(text)],
        },
        Turn::Model { text, calls } => {
            let mut parts: Vec<Part> = text.iter().map(|t| text_part(t)).collect();
            parts.extend(calls.iter().map(|call| Part {
                function_call: Some(WireFunctionCall {
                    name: call.name.clone(),
                    args: call.args.clone(),
                }),
                ..Part::default()
            }));
            Content {
                role: Some("model".to_string()),
                parts,
            }
        }
        Turn::Tool { responses } => Content {
            role: Some("user".to_string()),
            parts: responses
                .iter()
                .map(|r| Part {
                    function_response: Some(WireFunctionResponse {
                        name: r.name.clone(),
                        response: response_object(&r.response),
                    }),
                    ..Part::default()
                })
                .collect(),
        },
    };

    if content.parts.is_empty() {
        None
    } else {
        Some(content)
    }
}

impl GeminiRequest {
    fn from_llm_request(request: &LlmRequest<'_>) -> Self {
        let declarations: Vec<Value> = request
            .functions
            .iter()
            .map(|f| {
                json!({
                    "name": f.name,
                    "description": f.description,
                    "parameters": f.parameters,
                })
            })
            .collect();

        Self {
            contents: request.turns.iter().filter_map(to_content).collect(),
            tools: if declarations.is_empty() {
                Vec::new()
            } else {
                vec![ToolDeclarations {
                    function_declarations: declarations,
                }]
            },
            system_instruction: Content {
                role: None,
                parts: vec![text_part(request.system_instruction)],
            },
            generation_config: GenerationConfig {
                temperature: 0.3,
                top_p: 0.9,
                top_k: 40,
                max_output_tokens: 2048,
            },
        }
    }
}

impl GeminiResponse {
    fn into_reply(self) -> Result<LlmReply> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| StewardError::LlmError("No response from Gemini API".to_string()))?;

        let finish_reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
        let empty = || {
            StewardError::LlmError(format!(
                "Empty response from Gemini (finish reason: {})",
                finish_reason
            ))
        };

        let content = candidate.content.ok_or_else(empty)?;

        let mut texts = Vec::new();
        let mut calls = Vec::new();
        for part in content.parts {
            if let Some(text) = part.text.filter(|t| !t.is_empty()) {
                texts.push(text);
            }
            if let Some(call) = part.function_call {
                calls.push(FunctionCall {
                    name: call.name,
                    args: call.args,
                });
            }
        }

        if texts.is_empty() && calls.is_empty() {
            return Err(empty());
        }

        Ok(LlmReply {
            text: if texts.is_empty() {
                None
            } else {
                Some(texts.concat())
            },
            calls,
        })
    }
}
