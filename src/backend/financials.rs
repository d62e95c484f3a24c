//! Debts, investments and the derived figures: net worth, cash flow and
//! average monthly cash flow.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;

use super::{ApiResult, ApiState, Collection};
use crate::error::StewardError;
use crate::finance::{self, Window, CASH_FLOW_WINDOW_DAYS};
use crate::models::{
    normalize_user_id, Account, AverageCashFlow, CashFlow, NetWorth, Transaction,
};
use std::collections::HashSet;

async fn user_accounts_where<F>(
    state: &ApiState,
    user_id: &str,
    keep: F,
) -> ApiResult<Vec<Account>>
where
    F: Fn(&Account) -> bool,
{
    let user = state.store.require_user(user_id).await?;
    let accounts: Vec<Account> = state.store.load(Collection::Accounts).await?;

    Ok(accounts
        .into_iter()
        .filter(|a| a.user_id == user.user_id && keep(a))
        .collect())
}

/// Accounts whose owner id matches, whether or not `users.json` knows the user.
async fn owned_accounts(state: &ApiState, user_id: &str) -> ApiResult<Vec<Account>> {
    let user_id = normalize_user_id(user_id);
    let accounts: Vec<Account> = state.store.load(Collection::Accounts).await?;

    Ok(accounts.into_iter().filter(|a| a.user_id == user_id).collect())
}

async fn get_debts(
    Path(user_id): Path<String>,
    State(state): State<ApiState>,
) -> ApiResult<Json<Vec<Account>>> {
    Ok(Json(
        user_accounts_where(&state, &user_id, Account::is_liability).await?,
    ))
}

async fn get_investments(
    Path(user_id): Path<String>,
    State(state): State<ApiState>,
) -> ApiResult<Json<Vec<Account>>> {
    Ok(Json(
        user_accounts_where(&state, &user_id, Account::is_investment).await?,
    ))
}

async fn get_net_worth(
    Path(user_id): Path<String>,
    State(state): State<ApiState>,
) -> ApiResult<Json<NetWorth>> {
    let accounts = owned_accounts(&state, &user_id).await?;
    if accounts.is_empty() {
        return Err(StewardError::NotFound(
            "No accounts found for this user".to_string(),
        ));
    }

    Ok(Json(NetWorth {
        net_worth: finance::net_worth(&accounts),
    }))
}

async fn load_user_ledger(
    state: &ApiState,
    user_id: &str,
) -> ApiResult<(Vec<Account>, Vec<Transaction>)> {
    let accounts = owned_accounts(state, user_id).await?;
    let transactions: Vec<Transaction> = state.store.load(Collection::Transactions).await?;
    Ok((accounts, transactions))
}

async fn get_cash_flow(
    Path(user_id): Path<String>,
    State(state): State<ApiState>,
) -> ApiResult<Json<CashFlow>> {
    let (accounts, transactions) = load_user_ledger(&state, &user_id).await?;
    let ids: HashSet<&str> = accounts.iter().map(|a| a.account_id.as_str()).collect();

    Ok(Json(CashFlow {
        cash_flow_last_30_days: finance::cash_flow(
            &transactions,
            &ids,
            Window::ending_now(CASH_FLOW_WINDOW_DAYS),
        ),
    }))
}

async fn get_average_cash_flow(
    Path(user_id): Path<String>,
    State(state): State<ApiState>,
) -> ApiResult<Json<AverageCashFlow>> {
    let (accounts, transactions) = load_user_ledger(&state, &user_id).await?;
    let ids: HashSet<&str> = accounts.iter().map(|a| a.account_id.as_str()).collect();

    Ok(Json(AverageCashFlow {
        average_monthly_cash_flow: finance::average_monthly_cash_flow(
            &transactions,
            &ids,
            Utc::now(),
        ),
    }))
}

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/users/:user_id/debts", get(get_debts))
        .route("/users/:user_id/investments", get(get_investments))
        .route("/users/:user_id/networth", get(get_net_worth))
        .route("/users/:user_id/cashflow", get(get_cash_flow))
        .route("/users/:user_id/average_cashflow", get(get_average_cash_flow))
}
