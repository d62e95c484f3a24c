//! Agent tree for the Cymbal Bank assistant
//!
//! A root agent owns every backend tool and delegates to three specialists,
//! each of which coordinates two focused sub-agents.

use serde::Serialize;

pub mod card;
pub mod prompts;
pub mod runtime;

pub use runtime::{AgentRuntime, LlmClient, Session, MAX_TOOL_ROUNDS};

pub const ROOT_AGENT_NAME: &str = "cymbal_bank_ai_agent";
pub const ROOT_AGENT_DESCRIPTION: &str =
    "A Cymbal Bank AI Agent powered by Gemini for Chatbot and Backend Services";

#[derive(Debug, Clone, Serialize)]
pub struct AgentConfig {
    pub name: String,
    pub description: String,
    pub model: String,
    pub instruction: String,
    /// Names of registry tools this agent may call.
    pub tools: Vec<String>,
    pub sub_agents: Vec<AgentConfig>,
}

impl AgentConfig {
    fn leaf(name: &str, model: &str, description: &str, instruction: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            model: model.to_string(),
            instruction: instruction.to_string(),
            tools: Vec::new(),
            sub_agents: Vec::new(),
        }
    }

    fn with_sub_agents(mut self, sub_agents: Vec<AgentConfig>) -> Self {
        self.sub_agents = sub_agents;
        self
    }

    /// Depth-first lookup by name, including `self`.
    pub fn find(&self, name: &str) -> Option<&AgentConfig> {
        if self.name == name {
            return Some(self);
        }
        self.sub_agents.iter().find_map(|a| a.find(name))
    }

    /// The agent whose `sub_agents` contains `name`.
    pub fn parent_of(&self, name: &str) -> Option<&AgentConfig> {
        if self.sub_agents.iter().any(|a| a.name == name) {
            return Some(self);
        }
        self.sub_agents.iter().find_map(|a| a.parent_of(name))
    }

    pub fn has_tool(&self, tool: &str) -> bool {
        self.tools.iter().any(|t| t == tool)
    }
}

fn travel_agent(model: &str) -> AgentConfig {
    AgentConfig::leaf(
        "travel_agent",
        model,
        "Helps plan trips and optimize for savings using specialized sub-agents.",
        "You orchestrate travel planning. First, use 'travel_planner' to build or refine an \
         itinerary. Then, use 'travel_saver' to propose key savings.",
    )
    .with_sub_agents(vec![
        AgentConfig::leaf(
            "travel_planner",
            model,
            "Creates itineraries and suggests destinations based on budget and preferences.",
            "Draft a simple itinerary with destinations, dates, and activities. Ask for missing \
             constraints (budget, dates, origin) when needed.",
        ),
        AgentConfig::leaf(
            "travel_saver",
            model,
            "Finds cost-saving tactics for travel (timing, routes, accommodations).",
            "Provide cost-saving suggestions (off-peak travel, nearby airports, bundles, loyalty \
             points). Keep the list short and prioritized.",
        ),
    ])
}

fn big_purchases_agent(model: &str) -> AgentConfig {
    AgentConfig::leaf(
        "big_purchases_agent",
        model,
        "Coordinates sub-agents to help plan and evaluate big purchases.",
        "You orchestrate big purchase planning. First, use 'bp_selector' to determine relevance \
         and purchase type. Then, use 'bp_advisor' to provide budgeting and financing guidance. \
         Keep responses concise and actionable.",
    )
    .with_sub_agents(vec![
        AgentConfig::leaf(
            "bp_selector",
            model,
            "Identifies if the query concerns big purchases and classifies the purchase type.",
            "You detect if a user is asking about large purchases (cars, appliances, home \
             upgrades, tuition). If yes, classify the purchase type and surface key factors \
             (budget, financing, timeline).",
        ),
        AgentConfig::leaf(
            "bp_advisor",
            model,
            "Provides guidance on budgeting, financing, and timing for big purchases.",
            "Provide concise advice on budgeting, saving strategies, financing options, and \
             timing for large purchases. Use clear bullet points and short guidance.",
        ),
    ])
}

fn daily_spending_agent(model: &str) -> AgentConfig {
    AgentConfig::leaf(
        "daily_spending_agent",
        model,
        "Analyzes daily spending and offers coaching suggestions.",
        "You orchestrate daily spending analysis. First, use 'ds_categorizer' to categorize and \
         detect spikes. Then, use 'ds_coach' to provide concise coaching tips.",
    )
    .with_sub_agents(vec![
        AgentConfig::leaf(
            "ds_categorizer",
            model,
            "Classifies daily transactions into categories and flags anomalies.",
            "Classify spending by category (groceries, dining, transport, utilities, shopping, \
             other) and flag unusual spikes relative to recent patterns.",
        ),
        AgentConfig::leaf(
            "ds_coach",
            model,
            "Provides short coaching tips to reduce daily spending.",
            "Provide 2-4 concise tips tailored to the spending categories with the highest \
             impact. Keep tone supportive and practical.",
        ),
    ])
}

/// Build the full agent tree; every agent runs on `model`.
pub fn root_agent(model: &str) -> AgentConfig {
    AgentConfig {
        name: ROOT_AGENT_NAME.to_string(),
        description: ROOT_AGENT_DESCRIPTION.to_string(),
        model: model.to_string(),
        instruction: prompts::ROOT_INSTRUCTION.to_string(),
        tools: crate::tools::all_tool_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
        sub_agents: vec![
            big_purchases_agent(model),
            daily_spending_agent(model),
            travel_agent(model),
        ],
    }
}
