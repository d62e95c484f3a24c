//! Backend operations exposed to the agents as tools

use super::{
    integer_param, number_param, object_param, optional_i64, parameters, required_object,
    required_str, string_param, FinancialApi, Tool, ToolInput, ToolOutput,
};
use crate::Result;
use serde_json::{json, Value};
use tracing::info;

/// Default look-back for `get_user_transactions_with_history`.
const DEFAULT_HISTORY_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinancialOp {
    GetUserProfile,
    GetUserAccounts,
    CreateUserAccount,
    GetUserTransactions,
    GetUserTransactionsWithHistory,
    GetUserDebts,
    GetUserInvestments,
    GetUserNetworth,
    GetUserCashflow,
    GetUserAverageCashflow,
    GetUserGoals,
    CreateUserGoal,
    UpdateUserGoal,
    DeleteUserGoal,
    GetBankPartners,
    GetUserEligiblePartners,
    GetUserSchedules,
    CreateUserSchedule,
    UpdateUserSchedule,
    DeleteUserSchedule,
    GetAllAdvisors,
    GetAdvisorsByType,
    ScheduleMeeting,
    GetUserMeetings,
    CancelMeeting,
}

impl FinancialOp {
    pub const ALL: [FinancialOp; 25] = [
        FinancialOp::GetUserProfile,
        FinancialOp::GetUserAccounts,
        FinancialOp::CreateUserAccount,
        FinancialOp::GetUserTransactions,
        FinancialOp::GetUserTransactionsWithHistory,
        FinancialOp::GetUserDebts,
        FinancialOp::GetUserInvestments,
        FinancialOp::GetUserNetworth,
        FinancialOp::GetUserCashflow,
        FinancialOp::GetUserAverageCashflow,
        FinancialOp::GetUserGoals,
        FinancialOp::CreateUserGoal,
        FinancialOp::UpdateUserGoal,
        FinancialOp::DeleteUserGoal,
        FinancialOp::GetBankPartners,
        FinancialOp::GetUserEligiblePartners,
        FinancialOp::GetUserSchedules,
        FinancialOp::CreateUserSchedule,
        FinancialOp::UpdateUserSchedule,
        FinancialOp::DeleteUserSchedule,
        FinancialOp::GetAllAdvisors,
        FinancialOp::GetAdvisorsByType,
        FinancialOp::ScheduleMeeting,
        FinancialOp::GetUserMeetings,
        FinancialOp::CancelMeeting,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FinancialOp::GetUserProfile => "get_user_profile",
            FinancialOp::GetUserAccounts => "get_user_accounts",
            FinancialOp::CreateUserAccount => "create_user_account",
            FinancialOp::GetUserTransactions => "get_user_transactions",
            FinancialOp::GetUserTransactionsWithHistory => "get_user_transactions_with_history",
            FinancialOp::GetUserDebts => "get_user_debts",
            FinancialOp::GetUserInvestments => "get_user_investments",
            FinancialOp::GetUserNetworth => "get_user_networth",
            FinancialOp::GetUserCashflow => "get_user_cashflow",
            FinancialOp::GetUserAverageCashflow => "get_user_average_cashflow",
            FinancialOp::GetUserGoals => "get_user_goals",
            FinancialOp::CreateUserGoal => "create_user_goal",
            FinancialOp::UpdateUserGoal => "update_user_goal",
            FinancialOp::DeleteUserGoal => "delete_user_goal",
            FinancialOp::GetBankPartners => "get_bank_partners",
            FinancialOp::GetUserEligiblePartners => "get_user_eligible_partners",
            FinancialOp::GetUserSchedules => "get_user_schedules",
            FinancialOp::CreateUserSchedule => "create_user_schedule",
            FinancialOp::UpdateUserSchedule => "update_user_schedule",
            FinancialOp::DeleteUserSchedule => "delete_user_schedule",
            FinancialOp::GetAllAdvisors => "get_all_advisors",
            FinancialOp::GetAdvisorsByType => "get_advisors_by_type",
            FinancialOp::ScheduleMeeting => "schedule_meeting",
            FinancialOp::GetUserMeetings => "get_user_meetings",
            FinancialOp::CancelMeeting => "cancel_meeting",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            FinancialOp::GetUserProfile => "Gets a user's profile, including derived net worth.",
            FinancialOp::GetUserAccounts => "Fetches all accounts for a specific user.",
            FinancialOp::CreateUserAccount => {
                "Opens a new account for a user. The account id is generated by the bank."
            }
            FinancialOp::GetUserTransactions => {
                "Retrieves a user's transactions from the last 30 days."
            }
            FinancialOp::GetUserTransactionsWithHistory => {
                "Retrieves a user's transactions from the last N days."
            }
            FinancialOp::GetUserDebts => "Retrieves all debt (liability) accounts for a user.",
            FinancialOp::GetUserInvestments => "Retrieves all investment accounts for a user.",
            FinancialOp::GetUserNetworth => "Calculates the net worth of a user.",
            FinancialOp::GetUserCashflow => {
                "Calculates the cash flow for a user over the last 30 days."
            }
            FinancialOp::GetUserAverageCashflow => {
                "Calculates the average monthly cash flow for a user over the last 3 months."
            }
            FinancialOp::GetUserGoals => "Retrieves all life goals for a user.",
            FinancialOp::CreateUserGoal => "Creates a new life goal for a user.",
            FinancialOp::UpdateUserGoal => {
                "Updates fields of an existing life goal; omitted fields are kept."
            }
            FinancialOp::DeleteUserGoal => "Deletes a life goal.",
            FinancialOp::GetBankPartners => "Lists all of the bank's partner merchants.",
            FinancialOp::GetUserEligiblePartners => {
                "Lists the bank partners a user is eligible for based on credit score."
            }
            FinancialOp::GetUserSchedules => "Retrieves all scheduled transfers for a user.",
            FinancialOp::CreateUserSchedule => {
                "Creates a recurring transfer between two of a user's accounts."
            }
            FinancialOp::UpdateUserSchedule => {
                "Updates fields of a scheduled transfer; omitted fields are kept."
            }
            FinancialOp::DeleteUserSchedule => "Deletes a scheduled transfer.",
            FinancialOp::GetAllAdvisors => "Lists every advisor at the bank.",
            FinancialOp::GetAdvisorsByType => {
                "Lists advisors of one type, e.g. financial_planner or tax_advisor."
            }
            FinancialOp::ScheduleMeeting => {
                "Books a meeting between a user and an advisor at a given time."
            }
            FinancialOp::GetUserMeetings => "Retrieves all meetings booked by a user.",
            FinancialOp::CancelMeeting => "Cancels a booked meeting.",
        }
    }

    pub fn parameters(self) -> Value {
        let user_id = || string_param("The unique identifier for the user (e.g., 'user-001')");

        match self {
            FinancialOp::GetUserProfile
            | FinancialOp::GetUserAccounts
            | FinancialOp::GetUserTransactions
            | FinancialOp::GetUserDebts
            | FinancialOp::GetUserInvestments
            | FinancialOp::GetUserNetworth
            | FinancialOp::GetUserCashflow
            | FinancialOp::GetUserAverageCashflow
            | FinancialOp::GetUserGoals
            | FinancialOp::GetUserEligiblePartners
            | FinancialOp::GetUserSchedules
            | FinancialOp::GetUserMeetings => parameters(json!({ "user_id": user_id() }), &["user_id"]),
            FinancialOp::GetUserTransactionsWithHistory => parameters(
                json!({
                    "user_id": user_id(),
                    "history_days": integer_param("How many days back to look (default 30)")
                }),
                &["user_id"],
            ),
            FinancialOp::CreateUserAccount => parameters(
                json!({
                    "user_id": user_id(),
                    "account_data": object_param("The account to open", account_properties())
                }),
                &["user_id", "account_data"],
            ),
            FinancialOp::CreateUserGoal => parameters(
                json!({
                    "goal_data": object_param(
                        "The goal to create, including the owning user_id",
                        goal_properties()
                    )
                }),
                &["goal_data"],
            ),
            FinancialOp::UpdateUserGoal => parameters(
                json!({
                    "goal_id": string_param("The goal to update"),
                    "goal_data": object_param("Fields to change", goal_properties())
                }),
                &["goal_id", "goal_data"],
            ),
            FinancialOp::DeleteUserGoal => parameters(
                json!({ "goal_id": string_param("The goal to delete") }),
                &["goal_id"],
            ),
            FinancialOp::GetBankPartners | FinancialOp::GetAllAdvisors => {
                parameters(json!({}), &[])
            }
            FinancialOp::CreateUserSchedule => parameters(
                json!({
                    "user_id": user_id(),
                    "schedule_data": object_param("The transfer to schedule", schedule_properties())
                }),
                &["user_id", "schedule_data"],
            ),
            FinancialOp::UpdateUserSchedule => parameters(
                json!({
                    "schedule_id": string_param("The schedule to update"),
                    "schedule_data": object_param("Fields to change", schedule_properties())
                }),
                &["schedule_id", "schedule_data"],
            ),
            FinancialOp::DeleteUserSchedule => parameters(
                json!({ "schedule_id": string_param("The schedule to delete") }),
                &["schedule_id"],
            ),
            FinancialOp::GetAdvisorsByType => parameters(
                json!({
                    "advisor_type": string_param("e.g. 'financial_planner', 'investment_advisor', 'tax_advisor'")
                }),
                &["advisor_type"],
            ),
            FinancialOp::ScheduleMeeting => parameters(
                json!({
                    "meeting_data": object_param("The meeting to book", meeting_properties())
                }),
                &["meeting_data"],
            ),
            FinancialOp::CancelMeeting => parameters(
                json!({ "meeting_id": string_param("The meeting to cancel") }),
                &["meeting_id"],
            ),
        }
    }

    async fn call(self, api: &FinancialApi, input: &ToolInput) -> Result<Value> {
        match self {
            FinancialOp::GetUserProfile => api.get_user_profile(required_str(input, "user_id")?).await,
            FinancialOp::GetUserAccounts => {
                api.get_user_accounts(required_str(input, "user_id")?).await
            }
            FinancialOp::CreateUserAccount => {
                api.create_user_account(
                    required_str(input, "user_id")?,
                    required_object(input, "account_data")?,
                )
                .await
            }
            FinancialOp::GetUserTransactions => {
                api.get_user_transactions(required_str(input, "user_id")?).await
            }
            FinancialOp::GetUserTransactionsWithHistory => {
                let history = optional_i64(input, "history_days")?.unwrap_or(DEFAULT_HISTORY_DAYS);
                api.get_user_transactions_with_history(required_str(input, "user_id")?, history)
                    .await
            }
            FinancialOp::GetUserDebts => api.get_user_debts(required_str(input, "user_id")?).await,
            FinancialOp::GetUserInvestments => {
                api.get_user_investments(required_str(input, "user_id")?).await
            }
            FinancialOp::GetUserNetworth => {
                api.get_user_networth(required_str(input, "user_id")?).await
            }
            FinancialOp::GetUserCashflow => {
                api.get_user_cashflow(required_str(input, "user_id")?).await
            }
            FinancialOp::GetUserAverageCashflow => {
                api.get_user_average_cashflow(required_str(input, "user_id")?)
                    .await
            }
            FinancialOp::GetUserGoals => api.get_user_goals(required_str(input, "user_id")?).await,
            FinancialOp::CreateUserGoal => {
                api.create_user_goal(required_object(input, "goal_data")?).await
            }
            FinancialOp::UpdateUserGoal => {
                api.update_user_goal(
                    required_str(input, "goal_id")?,
                    required_object(input, "goal_data")?,
                )
                .await
            }
            FinancialOp::DeleteUserGoal => {
                api.delete_user_goal(required_str(input, "goal_id")?).await
            }
            FinancialOp::GetBankPartners => api.get_bank_partners().await,
            FinancialOp::GetUserEligiblePartners => {
                api.get_user_eligible_partners(required_str(input, "user_id")?)
                    .await
            }
            FinancialOp::GetUserSchedules => {
                api.get_user_schedules(required_str(input, "user_id")?).await
            }
            FinancialOp::CreateUserSchedule => {
                api.create_user_schedule(
                    required_str(input, "user_id")?,
                    required_object(input, "schedule_data")?,
                )
                .await
            }
            FinancialOp::UpdateUserSchedule => {
                api.update_user_schedule(
                    required_str(input, "schedule_id")?,
                    required_object(input, "schedule_data")?,
                )
                .await
            }
            FinancialOp::DeleteUserSchedule => {
                api.delete_user_schedule(required_str(input, "schedule_id")?)
                    .await
            }
            FinancialOp::GetAllAdvisors => api.get_all_advisors().await,
            FinancialOp::GetAdvisorsByType => {
                api.get_advisors_by_type(required_str(input, "advisor_type")?)
                    .await
            }
            FinancialOp::ScheduleMeeting => {
                api.schedule_meeting(required_object(input, "meeting_data")?)
                    .await
            }
            FinancialOp::GetUserMeetings => {
                api.get_user_meetings(required_str(input, "user_id")?).await
            }
            FinancialOp::CancelMeeting => {
                api.cancel_meeting(required_str(input, "meeting_id")?).await
            }
        }
    }
}

fn account_properties() -> Value {
    json!({
        "type": string_param("checking, savings, investment, credit card, loan or property"),
        "description": string_param("A short label for the account"),
        "balance": number_param("Opening balance; negative for liabilities"),
        "category": string_param("asset or liability; inferred when omitted"),
        "sub_type": string_param("Finer-grained account kind"),
        "institution": string_param("Holding institution")
    })
}

fn goal_properties() -> Value {
    json!({
        "user_id": string_param("The unique identifier for the user (e.g., 'user-001')"),
        "description": string_param("What the user is saving for"),
        "target_amount": number_param("Amount to reach"),
        "target_date": string_param("Deadline as YYYY-MM-DD"),
        "current_amount_saved": number_param("Amount saved so far")
    })
}

fn schedule_properties() -> Value {
    json!({
        "source_account_id": string_param("Account the money leaves"),
        "destination_account_id": string_param("Account the money goes to"),
        "description": string_param("A short label for the transfer"),
        "frequency": string_param("e.g. weekly, bi-weekly, monthly"),
        "start_date": string_param("First transfer as YYYY-MM-DD"),
        "end_date": string_param("Last transfer as YYYY-MM-DD"),
        "amount": number_param("Amount per transfer")
    })
}

fn meeting_properties() -> Value {
    json!({
        "user_id": string_param("The unique identifier for the user (e.g., 'user-001')"),
        "advisor_id": string_param("The advisor's id"),
        "advisor_name": string_param("The advisor's name"),
        "advisor_type": string_param("The advisor's specialty"),
        "meeting_time": string_param("Local date-time as YYYY-MM-DDTHH:MM:SS"),
        "notes": string_param("Optional agenda")
    })
}

pub struct FinancialTool {
    op: FinancialOp,
    api: FinancialApi,
}

impl FinancialTool {
    pub fn new(op: FinancialOp, api: FinancialApi) -> Self {
        Self { op, api }
    }
}

#[async_trait::async_trait]
impl Tool for FinancialTool {
    fn name(&self) -> &'static str {
        self.op.name()
    }

    fn description(&self) -> &'static str {
        self.op.description()
    }

    fn parameters(&self) -> Value {
        self.op.parameters()
    }

    async fn execute(&self, input: &ToolInput) -> Result<ToolOutput> {
        info!(tool = self.op.name(), "Executing financial tool");
        let data = self.op.call(&self.api, input).await?;
        Ok(ToolOutput::ok(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StewardError;
    use crate::tools::client::test_support::LiveBackend;

    fn input(op: FinancialOp, parameters: Value) -> ToolInput {
        ToolInput {
            tool_name: op.name().to_string(),
            parameters,
        }
    }

    async fn run(live: &LiveBackend, op: FinancialOp, parameters: Value) -> Value {
        FinancialTool::new(op, live.api.clone())
            .execute(&input(op, parameters))
            .await
            .unwrap()
            .data
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<&str> = FinancialOp::ALL.iter().map(|op| op.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FinancialOp::ALL.len());
    }

    #[test]
    fn test_required_fields_are_declared() {
        let schema = FinancialOp::UpdateUserGoal.parameters();
        assert_eq!(schema["required"], json!(["goal_id", "goal_data"]));
        assert_eq!(schema["properties"]["goal_data"]["type"], "OBJECT");
    }

    #[tokio::test]
    async fn test_missing_argument_is_rejected_before_any_call() {
        let live = LiveBackend::start().await;
        let tool = FinancialTool::new(FinancialOp::GetUserDebts, live.api.clone());

        let err = tool
            .execute(&input(FinancialOp::GetUserDebts, json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, StewardError::InvalidToolInput(_)));
    }

    #[tokio::test]
    async fn test_history_defaults_to_thirty_days() {
        let live = LiveBackend::start().await;

        let default = run(
            &live,
            FinancialOp::GetUserTransactionsWithHistory,
            json!({"user_id": "user-001"}),
        )
        .await;
        assert_eq!(default.as_array().unwrap().len(), 2);

        let long = run(
            &live,
            FinancialOp::GetUserTransactionsWithHistory,
            json!({"user_id": "user-001", "history_days": 365}),
        )
        .await;
        assert_eq!(long.as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_goal_tools_round_trip_through_backend() {
        let live = LiveBackend::start().await;

        let created = run(
            &live,
            FinancialOp::CreateUserGoal,
            json!({"goal_data": {
                "user_id": "user_002",
                "description": "Pay off car",
                "target_amount": 8000,
                "target_date": "2027-06-30"
            }}),
        )
        .await;
        let goal_id = created["goal_id"].as_str().unwrap().to_string();

        let updated = run(
            &live,
            FinancialOp::UpdateUserGoal,
            json!({"goal_id": goal_id, "goal_data": {"current_amount_saved": 1200}}),
        )
        .await;
        assert_eq!(updated["current_amount_saved"], 1200.0);

        let goals = run(&live, FinancialOp::GetUserGoals, json!({"user_id": "user-002"})).await;
        assert_eq!(goals[0]["description"], "Pay off car");

        let deleted = run(&live, FinancialOp::DeleteUserGoal, json!({"goal_id": goal_id})).await;
        assert_eq!(deleted, json!({"status": 204}));
    }

    #[tokio::test]
    async fn test_meeting_conflict_is_surfaced_as_data() {
        let live = LiveBackend::start().await;
        let meeting = json!({"meeting_data": {
            "user_id": "user-001",
            "advisor_id": "adv-002",
            "advisor_name": "Ana Ortiz",
            "advisor_type": "tax_advisor",
            "meeting_time": "2026-03-02T15:30:00"
        }});

        let first = run(&live, FinancialOp::ScheduleMeeting, meeting.clone()).await;
        assert!(first["meeting_id"].is_string());

        let second = run(&live, FinancialOp::ScheduleMeeting, meeting).await;
        assert_eq!(
            second["detail"],
            "This time slot is already booked with the advisor."
        );
    }
}
