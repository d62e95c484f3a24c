//! Service catalog: an OpenAPI-shaped description of every route and record
//! type, consumed by the services tools.

use axum::{extract::State, routing::get, Json, Router};
use schemars::schema_for;
use serde_json::{json, Map, Value};

use super::ApiState;
use crate::models::{
    Account, Advisor, AverageCashFlow, BankPartner, CashFlow, LifeGoal, Meeting, NetWorth,
    NewAccount, NewLifeGoal, NewMeeting, NewSchedule, Schedule, Transaction, User,
};

/// (path, method, summary) for every route below the API prefix.
const ROUTES: &[(&str, &str, &str)] = &[
    ("/users", "get", "List all users"),
    ("/users/{user_id}", "get", "Get a user profile"),
    ("/users/{user_id}/accounts", "get", "List a user's accounts"),
    ("/users/{user_id}/accounts", "post", "Open an account for a user"),
    ("/users/{user_id}/transactions", "get", "List a user's recent transactions"),
    ("/users/{user_id}/debts", "get", "List a user's liability accounts"),
    ("/users/{user_id}/investments", "get", "List a user's investment accounts"),
    ("/users/{user_id}/networth", "get", "Get a user's net worth"),
    ("/users/{user_id}/cashflow", "get", "Get a user's cash flow over the last 30 days"),
    ("/users/{user_id}/average_cashflow", "get", "Get a user's average monthly cash flow"),
    ("/users/{user_id}/goals", "get", "List a user's life goals"),
    ("/users/{user_id}/schedules", "get", "List a user's scheduled transfers"),
    ("/users/{user_id}/schedules", "post", "Create a scheduled transfer"),
    ("/goals", "get", "List all life goals"),
    ("/goals", "post", "Create a life goal"),
    ("/goals/{user_id}", "get", "List a user's life goals"),
    ("/goals/{goal_id}", "put", "Update a life goal"),
    ("/goals/{goal_id}", "delete", "Delete a life goal"),
    ("/partners", "get", "List bank partners"),
    ("/partners/user/{user_id}", "get", "List partners a user is eligible for"),
    ("/schedules", "get", "List all scheduled transfers"),
    ("/schedules/{schedule_id}", "put", "Update a scheduled transfer"),
    ("/schedules/{schedule_id}", "delete", "Delete a scheduled transfer"),
    ("/advisors", "get", "List all advisors"),
    ("/advisors/{advisor_type}", "get", "List advisors of a type"),
    ("/meetings", "get", "List all meetings"),
    ("/meetings", "post", "Schedule a meeting with an advisor"),
    ("/meetings/{user_id}", "get", "List a user's meetings"),
    ("/meetings/{meeting_id}", "delete", "Cancel a meeting"),
    ("/openapi.json", "get", "Describe the service"),
];

fn schemas() -> Map<String, Value> {
    let entries = [
        ("User", schema_for!(User)),
        ("Account", schema_for!(Account)),
        ("NewAccount", schema_for!(NewAccount)),
        ("Transaction", schema_for!(Transaction)),
        ("LifeGoal", schema_for!(LifeGoal)),
        ("NewLifeGoal", schema_for!(NewLifeGoal)),
        ("Schedule", schema_for!(Schedule)),
        ("NewSchedule", schema_for!(NewSchedule)),
        ("Advisor", schema_for!(Advisor)),
        ("Meeting", schema_for!(Meeting)),
        ("NewMeeting", schema_for!(NewMeeting)),
        ("BankPartner", schema_for!(BankPartner)),
        ("NetWorth", schema_for!(NetWorth)),
        ("CashFlow", schema_for!(CashFlow)),
        ("AverageCashFlow", schema_for!(AverageCashFlow)),
    ];

    entries
        .into_iter()
        .map(|(name, schema)| (name.to_string(), schema.to_value()))
        .collect()
}

pub fn document(api_prefix: &str) -> Value {
    let mut paths = Map::new();
    for (path, method, summary) in ROUTES {
        let entry = paths
            .entry(format!("{}{}", api_prefix, path))
            .or_insert_with(|| json!({}));
        if let Some(methods) = entry.as_object_mut() {
            methods.insert(method.to_string(), json!({ "summary": summary }));
        }
    }

    json!({
        "openapi": "3.1.0",
        "info": {
            "title": "AI Financial Steward API",
            "version": env!("CARGO_PKG_VERSION")
        },
        "paths": paths,
        "components": { "schemas": schemas() }
    })
}

async fn openapi(State(state): State<ApiState>) -> Json<Value> {
    Json(document(&state.api_prefix))
}

pub fn routes() -> Router<ApiState> {
    Router::new().route("/openapi.json", get(openapi))
}
