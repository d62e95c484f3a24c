//! A2A server exposing the agent tree over JSON-RPC
//!
//! Each `message/send` runs one user turn synchronously and returns the
//! finished task. Conversations continue across tasks through `contextId`.

use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::agent::card::{agent_card, AgentCard};
use crate::agent::{root_agent, AgentRuntime};
use crate::config::AgentServerConfig;
use crate::error::StewardError;
use crate::gemini::GeminiClient;
use crate::tools::{create_default_registry, FinancialApi};

pub mod store;
pub mod types;

use store::{InMemoryTaskStore, TaskStore};
use types::{
    Artifact, JsonRpcError, JsonRpcRequest, JsonRpcResponse, Message, MessageSendParams, Role,
    Task, TaskIdParams, TaskQueryParams, TaskState, TaskStatus, INTERNAL_ERROR, INVALID_PARAMS,
    INVALID_REQUEST, JSONRPC_VERSION, METHOD_NOT_FOUND, PARSE_ERROR, TASK_NOT_CANCELABLE,
    TASK_NOT_FOUND,
};

type RpcResult<T> = std::result::Result<T, JsonRpcError>;

impl From<StewardError> for JsonRpcError {
    fn from(err: StewardError) -> Self {
        JsonRpcError::new(INTERNAL_ERROR, err.to_string())
    }
}

/// =============================
/// Server State
/// =============================

#[derive(Clone)]
pub struct A2aState {
    runtime: Arc<AgentRuntime>,
    store: Arc<dyn TaskStore>,
    card: Arc<AgentCard>,
    turns: Arc<ContextLocks>,
}

/// One lock per conversation: turns on the same `contextId` run one at a time
/// so each starts from the session the previous one saved.
#[derive(Default)]
struct ContextLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ContextLocks {
    async fn lock_for(&self, context_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(context_id.to_string()).or_default().clone()
    }
}

fn task_not_found(task_id: &str) -> JsonRpcError {
    JsonRpcError::new(TASK_NOT_FOUND, format!("Task not found: {}", task_id))
}

fn parse_params<T: DeserializeOwned>(params: Value) -> RpcResult<T> {
    serde_json::from_value(params)
        .map_err(|e| JsonRpcError::new(INVALID_PARAMS, format!("Invalid params: {}", e)))
}

/// =============================
/// Methods
/// =============================

async fn existing_task(state: &A2aState, task_id: &str) -> RpcResult<Task> {
    state
        .store
        .load_task(task_id)
        .await?
        .ok_or_else(|| task_not_found(task_id))
}

async fn send_message(state: &A2aState, params: MessageSendParams) -> RpcResult<Task> {
    let mut message = params.message;

    if message.role != Role::User {
        return Err(JsonRpcError::new(
            INVALID_PARAMS,
            "message.role must be 'user'",
        ));
    }
    let text = message.text();
    if text.trim().is_empty() {
        return Err(JsonRpcError::new(INVALID_PARAMS, "message has no content"));
    }

    let context_id = match message.task_id.as_deref() {
        Some(task_id) => existing_task(state, task_id).await?.context_id,
        None => message
            .context_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
    };

    let context_lock = state.turns.lock_for(&context_id).await;
    let _turn = context_lock.lock().await;

    // Re-read under the lock so a continued task sees the previous turn.
    let mut task = match message.task_id.as_deref() {
        Some(task_id) => {
            let task = existing_task(state, task_id).await?;
            if task.status.state == TaskState::Canceled {
                return Err(JsonRpcError::new(
                    INVALID_PARAMS,
                    format!("Task {} was canceled", task_id),
                ));
            }
            task
        }
        None => Task::new(&context_id),
    };

    message.task_id = Some(task.id.clone());
    message.context_id = Some(task.context_id.clone());
    task.history.push(message);
    task.status = TaskStatus::new(TaskState::Working, None);
    state.store.save_task(&task).await?;

    info!(task_id = %task.id, context_id = %task.context_id, "A2A message received");

    let mut session = state
        .store
        .load_session(&task.context_id)
        .await?
        .unwrap_or_else(|| state.runtime.new_session());

    match state.runtime.run(&mut session, &text).await {
        Ok(outcome) => {
            let reply = Message::agent_text(&outcome.reply, &task.id, &task.context_id);
            task.history.push(reply.clone());
            task.artifacts.push(Artifact {
                artifact_id: uuid::Uuid::new_v4().to_string(),
                name: Some("response".to_string()),
                parts: reply.parts.clone(),
            });
            task.status = TaskStatus::new(TaskState::Completed, Some(reply));
            state.store.save_session(&task.context_id, &session).await?;

            info!(
                task_id = %task.id,
                agent = %outcome.agent,
                tool_calls = outcome.tool_calls.len(),
                "A2A task completed"
            );
        }
        Err(e) => {
            error!(task_id = %task.id, error = %e, "Agent run failed");
            let reply = Message::agent_text(
                &format!("Sorry, I couldn't complete that request: {}", e),
                &task.id,
                &task.context_id,
            );
            task.status = TaskStatus::new(TaskState::Failed, Some(reply));
        }
    }

    // A cancel that landed while the agent was running wins.
    if let Some(current) = state.store.load_task(&task.id).await? {
        if current.status.state == TaskState::Canceled {
            warn!(task_id = %task.id, "Task canceled during run");
            return Ok(current);
        }
    }

    state.store.save_task(&task).await?;
    Ok(task)
}

async fn get_task(state: &A2aState, params: TaskQueryParams) -> RpcResult<Task> {
    let mut task = state
        .store
        .load_task(&params.id)
        .await?
        .ok_or_else(|| task_not_found(&params.id))?;

    if let Some(limit) = params.history_length {
        let skip = task.history.len().saturating_sub(limit);
        task.history.drain(..skip);
    }

    Ok(task)
}

async fn cancel_task(state: &A2aState, params: TaskIdParams) -> RpcResult<Task> {
    let mut task = state
        .store
        .load_task(&params.id)
        .await?
        .ok_or_else(|| task_not_found(&params.id))?;

    if task.status.state.is_terminal() {
        return Err(JsonRpcError::new(
            TASK_NOT_CANCELABLE,
            format!("Task cannot be canceled: {}", params.id),
        ));
    }

    task.status = TaskStatus::new(TaskState::Canceled, None);
    state.store.save_task(&task).await?;
    info!(task_id = %task.id, "A2A task canceled");

    Ok(task)
}

async fn dispatch(state: &A2aState, request: JsonRpcRequest) -> RpcResult<Value> {
    let task = match request.method.as_str() {
        "message/send" => send_message(state, parse_params(request.params)?).await?,
        "tasks/get" => get_task(state, parse_params(request.params)?).await?,
        "tasks/cancel" => cancel_task(state, parse_params(request.params)?).await?,
        other => {
            return Err(JsonRpcError::new(
                METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
            ))
        }
    };

    Ok(serde_json::to_value(task).map_err(StewardError::from)?)
}

/// =============================
/// HTTP Handlers
/// =============================

async fn rpc(State(state): State<A2aState>, body: Bytes) -> Json<JsonRpcResponse> {
    let raw: Value = match serde_json::from_slice(&body) {
        Ok(raw) => raw,
        Err(e) => {
            return Json(JsonRpcResponse::failure(
                Value::Null,
                JsonRpcError::new(PARSE_ERROR, format!("Parse error: {}", e)),
            ))
        }
    };

    let id = raw.get("id").cloned().unwrap_or(Value::Null);

    let request: JsonRpcRequest = match serde_json::from_value(raw) {
        Ok(request) => request,
        Err(e) => {
            return Json(JsonRpcResponse::failure(
                id,
                JsonRpcError::new(INVALID_REQUEST, format!("Invalid request: {}", e)),
            ))
        }
    };

    if request.jsonrpc != JSONRPC_VERSION {
        return Json(JsonRpcResponse::failure(
            id,
            JsonRpcError::new(INVALID_REQUEST, "jsonrpc must be \"2.0\""),
        ));
    }

    let method = request.method.clone();
    match dispatch(&state, request).await {
        Ok(result) => Json(JsonRpcResponse::success(id, result)),
        Err(error) => {
            warn!(%method, code = error.code, message = %error.message, "JSON-RPC error");
            Json(JsonRpcResponse::failure(id, error))
        }
    }
}

async fn card(State(state): State<A2aState>) -> Json<AgentCard> {
    Json(state.card.as_ref().clone())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Router
/// =============================

pub fn create_router(
    runtime: Arc<AgentRuntime>,
    store: Arc<dyn TaskStore>,
    card_data: AgentCard,
) -> Router {
    let state = A2aState {
        runtime,
        store,
        card: Arc::new(card_data),
        turns: Arc::new(ContextLocks::default()),
    };

    Router::new()
        .route("/", post(rpc))
        .route("/.well-known/agent.json", get(card))
        .route("/.well-known/agent-card.json", get(card))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    config: AgentServerConfig,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    if config.gemini_api_key.is_empty() {
        warn!("GEMINI_API_KEY is not set; every agent turn will fail");
    }

    let api = FinancialApi::new(&config.api_base_url, config.tool_timeout)?;
    let registry = Arc::new(create_default_registry(api));
    let llm = Arc::new(GeminiClient::new(config.gemini_api_key.clone())?);

    let root = root_agent(&config.model);
    let card_data = agent_card(&root, &config.agent_url);
    let runtime = Arc::new(AgentRuntime::new(root, registry, llm));

    info!(
        model = %config.model,
        backend = %config.api_base_url,
        "Agent runtime ready"
    );

    let router = create_router(runtime, Arc::new(InMemoryTaskStore::new()), card_data);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    info!("A2A server listening on http://0.0.0.0:{}", config.port);
    info!("Agent card: {}/.well-known/agent.json", config.agent_url);

    axum::serve(listener, router).await?;

    Ok(())
}
