use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::collections::HashSet;

use super::{ApiResult, ApiState, Collection};
use crate::finance::{self, Window};
use crate::models::{Account, Transaction};

pub const DEFAULT_HISTORY_DAYS: i64 = 30;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub history: Option<i64>,
}

/// Account ids owned by a user, resolved after the user has been validated.
pub(crate) fn account_ids<'a>(accounts: &'a [Account], user_id: &str) -> HashSet<&'a str> {
    accounts
        .iter()
        .filter(|a| a.user_id == user_id)
        .map(|a| a.account_id.as_str())
        .collect()
}

/// Transactions from the last `history` days (default 30).
async fn list_transactions(
    Path(user_id): Path<String>,
    Query(query): Query<HistoryQuery>,
    State(state): State<ApiState>,
) -> ApiResult<Json<Vec<Transaction>>> {
    let user = state.store.require_user(&user_id).await?;
    let accounts: Vec<Account> = state.store.load(Collection::Accounts).await?;
    let transactions: Vec<Transaction> = state.store.load(Collection::Transactions).await?;

    let ids = account_ids(&accounts, &user.user_id);
    let window = Window::ending_now(query.history.unwrap_or(DEFAULT_HISTORY_DAYS));

    Ok(Json(
        finance::transactions_in_window(&transactions, &ids, window)
            .into_iter()
            .cloned()
            .collect(),
    ))
}

pub fn routes() -> Router<ApiState> {
    Router::new().route("/users/:user_id/transactions", get(list_transactions))
}
