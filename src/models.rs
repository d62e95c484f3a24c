//! Core data models for the financial steward backend

use chrono::NaiveDateTime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Canonical form of a user id: underscores become hyphens.
///
/// Agents frequently spell `user-001` as `user_001`; every user-scoped
/// lookup goes through this before comparing ids.
pub fn normalize_user_id(user_id: &str) -> String {
    user_id.trim().replace('_', "-")
}

//
// ================= Users =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct User {
    pub user_id: String,
    pub name: String,
    pub age: u32,
    pub risk_tolerance: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub credit_score: Option<u32>,
    /// Derived at read time, never trusted from disk.
    #[serde(default)]
    pub net_worth: Option<f64>,
    #[serde(default)]
    pub member_since: Option<i32>,
    #[serde(default)]
    pub financial_blurb: String,
    #[serde(default)]
    pub goals: Vec<String>,
}

//
// ================= Accounts =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Holding {
    pub symbol: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Account {
    pub account_id: String,
    pub user_id: String,
    /// `asset` or `liability`
    pub category: String,
    #[serde(rename = "type")]
    pub account_type: String,
    pub sub_type: String,
    pub description: String,
    /// Signed: liabilities carry a negative balance.
    pub balance: f64,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub holdings: Option<Vec<Holding>>,
    #[serde(default)]
    pub interest_rate: Option<f64>,
}

impl Account {
    pub fn is_liability(&self) -> bool {
        self.category.eq_ignore_ascii_case("liability")
    }

    pub fn is_investment(&self) -> bool {
        self.category.eq_ignore_ascii_case("asset")
            && self.account_type.eq_ignore_ascii_case("investment")
    }
}

/// Request body for opening an account; the id is generated server-side.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NewAccount {
    #[serde(rename = "type")]
    pub account_type: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sub_type: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub holdings: Option<Vec<Holding>>,
    #[serde(default)]
    pub interest_rate: Option<f64>,
}

//
// ================= Transactions =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Transaction {
    pub transaction_id: String,
    pub account_id: String,
    #[serde(default)]
    pub merchant_id: String,
    /// ISO-8601 timestamp as stored; see `finance::parse_timestamp`.
    pub date: String,
    #[serde(default)]
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub category: String,
}

//
// ================= Goals =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct LifeGoal {
    pub goal_id: String,
    pub user_id: String,
    pub description: String,
    pub target_amount: f64,
    pub target_date: String,
    pub current_amount_saved: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NewLifeGoal {
    pub user_id: String,
    pub description: String,
    pub target_amount: f64,
    pub target_date: String,
    #[serde(default)]
    pub current_amount_saved: f64,
}

//
// ================= Schedules =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Schedule {
    pub schedule_id: String,
    pub user_id: String,
    pub source_account_id: String,
    pub destination_account_id: String,
    #[serde(default)]
    pub description: String,
    pub frequency: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NewSchedule {
    pub source_account_id: String,
    pub destination_account_id: String,
    #[serde(default)]
    pub description: String,
    pub frequency: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    pub amount: f64,
}

//
// ================= Advisors & Meetings =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Advisor {
    pub advisor_id: String,
    pub name: String,
    pub advisor_type: String,
    #[serde(default)]
    pub availability: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Meeting {
    pub meeting_id: String,
    pub user_id: String,
    #[serde(default)]
    pub advisor_id: Option<String>,
    pub advisor_name: String,
    pub advisor_type: String,
    pub meeting_time: NaiveDateTime,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NewMeeting {
    #[serde(default)]
    pub meeting_id: Option<String>,
    pub user_id: String,
    #[serde(default)]
    pub advisor_id: Option<String>,
    pub advisor_name: String,
    pub advisor_type: String,
    pub meeting_time: NaiveDateTime,
    #[serde(default)]
    pub notes: Option<String>,
}

//
// ================= Partners =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct EligibilityCriteria {
    #[serde(default)]
    pub minimum_credit_score: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct BankPartner {
    pub partner_id: String,
    pub merchant_id: String,
    pub name: String,
    pub category: String,
    pub benefit_type: String,
    pub benefit_value: f64,
    #[serde(default)]
    pub eligibility_criteria: Option<EligibilityCriteria>,
}

impl BankPartner {
    /// A partner without a credit-score floor is open to everyone; otherwise
    /// the user needs a known score at or above the floor.
    pub fn is_eligible(&self, credit_score: Option<u32>) -> bool {
        match self
            .eligibility_criteria
            .as_ref()
            .and_then(|c| c.minimum_credit_score)
        {
            None => true,
            Some(minimum) => credit_score.is_some_and(|score| score >= minimum),
        }
    }
}

//
// ================= Derived Figures =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct NetWorth {
    pub net_worth: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct CashFlow {
    pub cash_flow_last_30_days: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct AverageCashFlow {
    pub average_monthly_cash_flow: f64,
}
