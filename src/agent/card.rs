//! A2A agent card advertised at `/.well-known/agent.json`

use super::AgentConfig;
use serde::{Deserialize, Serialize};

pub const CARD_VERSION: &str = "1.0.0";
pub const PROTOCOL_VERSION: &str = "0.3.0";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    pub streaming: bool,
    pub push_notifications: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentSkill {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub examples: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_modes: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    pub name: String,
    pub description: String,
    pub url: String,
    pub version: String,
    pub protocol_version: String,
    pub preferred_transport: String,
    pub default_input_modes: Vec<String>,
    pub default_output_modes: Vec<String>,
    pub capabilities: AgentCapabilities,
    pub skills: Vec<AgentSkill>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn agent_card(root: &AgentConfig, url: &str) -> AgentCard {
    AgentCard {
        name: root.name.clone(),
        description: root.description.clone(),
        url: url.to_string(),
        version: CARD_VERSION.to_string(),
        protocol_version: PROTOCOL_VERSION.to_string(),
        preferred_transport: "JSONRPC".to_string(),
        default_input_modes: strings(&["application/json", "text/plain"]),
        default_output_modes: strings(&["application/json", "text/plain"]),
        capabilities: AgentCapabilities {
            streaming: false,
            push_notifications: false,
        },
        skills: vec![
            AgentSkill {
                id: "chat".to_string(),
                name: "Cymbal Bank AI Agent".to_string(),
                description: "Cymbal Bank AI Agent is a helpful assistant powered by Gemini."
                    .to_string(),
                tags: strings(&["chat"]),
                examples: strings(&[
                    "What is my user profile?",
                    "Show me my bank accounts.",
                    "List my recent transactions.",
                    "What are my current debts?",
                    "Show me my investment portfolio.",
                    "What is my current net worth?",
                    "What was my cash flow for the last 30 days?",
                    "What is my average monthly cash flow?",
                    "What are my financial goals?",
                    "Help me update my goal to save for a new car.",
                ]),
                output_modes: None,
            },
            AgentSkill {
                id: "backend_services".to_string(),
                name: "Cymbal Bank Backend Services".to_string(),
                description:
                    "This skill is used to interact with the Cymbal Bank backend services."
                        .to_string(),
                tags: strings(&["fast_api", "backend_services", "backend"]),
                examples: strings(&[
                    "What are the available endpoints?",
                    "What are the data schemas?",
                ]),
                output_modes: Some(strings(&["application/json"])),
            },
        ],
    }
}
