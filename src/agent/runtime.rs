//! Agent runtime - drives one user turn through the agent tree
//!
//! USER → MODEL → (TOOLS | TRANSFER)* → TEXT
//!
//! The model decides which tools to call and where to route; the runtime
//! only executes those decisions within what the active agent declares.

use super::AgentConfig;
use crate::error::StewardError;
use crate::tools::{ToolInput, ToolRegistry};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Model turns allowed per user message.
pub const MAX_TOOL_ROUNDS: usize = 10;

pub const TRANSFER_TOOL: &str = "transfer_to_agent";

//
// ================= Conversation Model =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionResponse {
    pub name: String,
    pub response: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Turn {
    User {
        text: String,
    },
    Model {
        text: Option<String>,
        calls: Vec<FunctionCall>,
    },
    Tool {
        responses: Vec<FunctionResponse>,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

pub struct LlmRequest<'a> {
    pub model: &'a str,
    pub system_instruction: &'a str,
    pub turns: &'a [Turn],
    pub functions: &'a [FunctionDeclaration],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmReply {
    pub text: Option<String>,
    pub calls: Vec<FunctionCall>,
}

/// A chat model with function calling
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, request: &LlmRequest<'_>) -> Result<LlmReply>;
}

/// Conversation state carried between user messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub active_agent: String,
    pub turns: Vec<Turn>,
}

impl Session {
    pub fn new(agent: &str) -> Self {
        Self {
            active_agent: agent.to_string(),
            turns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub reply: String,
    /// Agent that produced the reply.
    pub agent: String,
    pub tool_calls: Vec<String>,
}

//
// ================= Runtime =================
//

pub struct AgentRuntime {
    root: AgentConfig,
    registry: Arc<ToolRegistry>,
    llm: Arc<dyn LlmClient>,
}

impl AgentRuntime {
    pub fn new(root: AgentConfig, registry: Arc<ToolRegistry>, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            root,
            registry,
            llm,
        }
    }

    pub fn root(&self) -> &AgentConfig {
        &self.root
    }

    pub fn new_session(&self) -> Session {
        Session::new(&self.root.name)
    }

    /// Agents reachable by transfer: sub-agents, the parent, peers and the root.
    fn transfer_targets<'a>(&'a self, agent: &'a AgentConfig) -> Vec<&'a AgentConfig> {
        let mut targets: Vec<&AgentConfig> = agent.sub_agents.iter().collect();

        if let Some(parent) = self.root.parent_of(&agent.name) {
            targets.push(parent);
            targets.extend(parent.sub_agents.iter().filter(|a| a.name != agent.name));
        }
        if agent.name != self.root.name && !targets.iter().any(|a| a.name == self.root.name) {
            targets.push(&self.root);
        }

        targets
    }

    fn system_instruction(&self, agent: &AgentConfig, targets: &[&AgentConfig]) -> String {
        if targets.is_empty() {
            return agent.instruction.clone();
        }

        let mut out = agent.instruction.clone();
        out.push_str(&format!(
            "\n\nYou are the agent '{}'. You can hand the conversation to another agent by calling {} with its name:\n",
            agent.name, TRANSFER_TOOL
        ));
        for target in targets {
            out.push_str(&format!("- {}: {}\n", target.name, target.description));
        }
        out
    }

    fn declarations(&self, agent: &AgentConfig, targets: &[&AgentConfig]) -> Vec<FunctionDeclaration> {
        let mut declarations: Vec<FunctionDeclaration> = agent
            .tools
            .iter()
            .filter_map(|name| match self.registry.get(name) {
                Some(tool) => Some(FunctionDeclaration {
                    name: tool.name().to_string(),
                    description: tool.description().to_string(),
                    parameters: tool.parameters(),
                }),
                None => {
                    warn!(agent = %agent.name, tool = %name, "Declared tool is not registered");
                    None
                }
            })
            .collect();

        if !targets.is_empty() {
            let names: Vec<&str> = targets.iter().map(|a| a.name.as_str()).collect();
            declarations.push(FunctionDeclaration {
                name: TRANSFER_TOOL.to_string(),
                description: "Transfer the conversation to another agent.".to_string(),
                parameters: json!({
                    "type": "OBJECT",
                    "properties": {
                        "agent_name": {
                            "type": "STRING",
                            "description": format!("One of: {}", names.join(", "))
                        }
                    },
                    "required": ["agent_name"]
                }),
            });
        }

        declarations
    }

    fn transfer(
        &self,
        session: &mut Session,
        targets: &[&AgentConfig],
        call: &FunctionCall,
    ) -> Value {
        let requested = call
            .args
            .get("agent_name")
            .and_then(Value::as_str)
            .unwrap_or_default();

        if !targets.iter().any(|a| a.name == requested) {
            warn!(from = %session.active_agent, to = %requested, "Rejected agent transfer");
            return json!({ "error": format!("Cannot transfer to agent '{}'", requested) });
        }

        info!(from = %session.active_agent, to = %requested, "Agent transfer");
        session.active_agent = requested.to_string();
        json!({ "result": format!("Transferred to {}", requested) })
    }

    async fn call_tool(&self, agent: &AgentConfig, call: &FunctionCall) -> Value {
        if !agent.has_tool(&call.name) {
            warn!(agent = %agent.name, tool = %call.name, "Tool not available to agent");
            return json!({
                "error": format!("Tool '{}' is not available to agent '{}'", call.name, agent.name)
            });
        }

        let Some(tool) = self.registry.get(&call.name) else {
            return json!({ "error": StewardError::ToolNotFound(call.name.clone()).to_string() });
        };

        let input = ToolInput {
            tool_name: call.name.clone(),
            parameters: if call.args.is_null() { json!({}) } else { call.args.clone() },
        };

        match tool.execute(&input).await {
            Ok(output) => output.data,
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool execution failed");
                json!({ "error": e.to_string() })
            }
        }
    }

    /// Run one user message to completion, extending `session`.
    pub async fn run(&self, session: &mut Session, user_text: &str) -> Result<RunOutcome> {
        if self.root.find(&session.active_agent).is_none() {
            warn!(agent = %session.active_agent, "Unknown active agent, resetting to root");
            session.active_agent = self.root.name.clone();
        }

        session.turns.push(Turn::User {
            text: user_text.to_string(),
        });

        let mut tool_calls = Vec::new();

        for round in 0..MAX_TOOL_ROUNDS {
            let agent = self
                .root
                .find(&session.active_agent)
                .ok_or_else(|| StewardError::AgentNotFound(session.active_agent.clone()))?;
            let targets = self.transfer_targets(agent);
            let instruction = self.system_instruction(agent, &targets);
            let functions = self.declarations(agent, &targets);

            debug!(
                agent = %agent.name,
                round,
                functions = functions.len(),
                "Calling model"
            );

            let reply = self
                .llm
                .generate(&LlmRequest {
                    model: &agent.model,
                    system_instruction: &instruction,
                    turns: &session.turns,
                    functions: &functions,
                })
                .await?;

            session.turns.push(Turn::Model {
                text: reply.text.clone(),
                calls: reply.calls.clone(),
            });

            if reply.calls.is_empty() {
                info!(agent = %agent.name, rounds = round + 1, "Agent replied");
                return Ok(RunOutcome {
                    reply: reply.text.unwrap_or_default(),
                    agent: agent.name.clone(),
                    tool_calls,
                });
            }

            let mut responses = Vec::with_capacity(reply.calls.len());
            for call in &reply.calls {
                tool_calls.push(call.name.clone());
                let response = if call.name == TRANSFER_TOOL {
                    self.transfer(session, &targets, call)
                } else {
                    self.call_tool(agent, call).await
                };
                responses.push(FunctionResponse {
                    name: call.name.clone(),
                    response,
                });
            }

            session.turns.push(Turn::Tool { responses });
        }

        Err(StewardError::MaxToolRoundsExceeded(format!(
            "Agent '{}' did not answer within {} model turns",
            session.active_agent, MAX_TOOL_ROUNDS
        )))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// What the mock model was shown on one call.
    #[derive(Debug, Clone)]
    pub struct SeenRequest {
        pub system_instruction: String,
        pub functions: Vec<String>,
        pub turns: usize,
    }

    /// Replays scripted replies in order; answers "done" once exhausted.
    pub struct ScriptedLlm {
        replies: Mutex<VecDeque<LlmReply>>,
        seen: Mutex<Vec<SeenRequest>>,
        repeat_last: bool,
    }

    impl ScriptedLlm {
        pub fn new(replies: Vec<LlmReply>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
                repeat_last: false,
            }
        }

        /// Keeps returning the same reply forever.
        pub fn looping(reply: LlmReply) -> Self {
            Self {
                replies: Mutex::new(VecDeque::from(vec![reply])),
                seen: Mutex::new(Vec::new()),
                repeat_last: true,
            }
        }

        pub fn seen(&self) -> Vec<SeenRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    pub fn text(reply: &str) -> LlmReply {
        LlmReply {
            text: Some(reply.to_string()),
            calls: Vec::new(),
        }
    }

    pub fn call(name: &str, args: Value) -> LlmReply {
        LlmReply {
            text: None,
            calls: vec![FunctionCall {
                name: name.to_string(),
                args,
            }],
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn generate(&self, request: &LlmRequest<'_>) -> Result<LlmReply> {
            self.seen.lock().unwrap().push(SeenRequest {
                system_instruction: request.system_instruction.to_string(),
                functions: request.functions.iter().map(|f| f.name.clone()).collect(),
                turns: request.turns.len(),
            });

            let mut replies = self.replies.lock().unwrap();
            let next = if self.repeat_last {
                replies.front().cloned()
            } else {
                replies.pop_front()
            };
            Ok(next.unwrap_or_else(|| text("done")))
        }
    }
}
