use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::info;

use super::{ApiResult, ApiState, Collection};
use crate::models::{Account, NewAccount};

/// Single-letter code embedded in generated account ids.
fn type_code(account_type: &str) -> char {
    match account_type.to_lowercase().as_str() {
        "investment" => 'i',
        "savings" => 's',
        "checking" => 'c',
        "credit card" => 'd',
        "pension" => 'p',
        _ => 'x',
    }
}

fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Next id of the form `acc-{initials}-{code}-{NNN}`.
pub(crate) fn next_account_id(existing: &[Account], user_name: &str, account_type: &str) -> String {
    let prefix = format!("acc-{}-{}-", initials(user_name), type_code(account_type));

    let max = existing
        .iter()
        .filter_map(|acc| acc.account_id.strip_prefix(&prefix))
        .filter_map(|suffix| suffix.parse::<u32>().ok())
        .max()
        .unwrap_or(0);

    format!("{}{:03}", prefix, max + 1)
}

async fn list_accounts(
    Path(user_id): Path<String>,
    State(state): State<ApiState>,
) -> ApiResult<Json<Vec<Account>>> {
    let user = state.store.require_user(&user_id).await?;
    let accounts: Vec<Account> = state.store.load(Collection::Accounts).await?;

    Ok(Json(
        accounts
            .into_iter()
            .filter(|a| a.user_id == user.user_id)
            .collect(),
    ))
}

async fn create_account(
    Path(user_id): Path<String>,
    State(state): State<ApiState>,
    Json(input): Json<NewAccount>,
) -> ApiResult<(StatusCode, Json<Account>)> {
    let user = state.store.require_user(&user_id).await?;

    let account = state
        .store
        .update(Collection::Accounts, |accounts: &mut Vec<Account>| {
            let is_card = input.account_type.eq_ignore_ascii_case("credit card");
            let account = Account {
                account_id: next_account_id(accounts, &user.name, &input.account_type),
                user_id: user.user_id.clone(),
                category: input.category.clone().unwrap_or_else(|| {
                    if is_card { "liability" } else { "asset" }.to_string()
                }),
                sub_type: input
                    .sub_type
                    .clone()
                    .unwrap_or_else(|| input.account_type.clone()),
                account_type: input.account_type.clone(),
                description: input.description.clone(),
                balance: input.balance,
                institution: input.institution.clone(),
                holdings: input.holdings.clone(),
                interest_rate: input.interest_rate,
            };
            accounts.push(account.clone());
            Ok(account)
        })
        .await?;

    info!(account_id = %account.account_id, user_id = %account.user_id, "Account created");

    Ok((StatusCode::CREATED, Json(account)))
}

pub fn routes() -> Router<ApiState> {
    Router::new().route(
        "/users/:user_id/accounts",
        get(list_accounts).post(create_account),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::test_support::TestBackend;
    use serde_json::json;

    #[test]
    fn test_next_account_id() {
        let existing: Vec<Account> = serde_json::from_value(json!([
            {"account_id": "acc-mw-s-001", "user_id": "user-001", "category": "asset", "type": "savings", "sub_type": "savings", "description": "", "balance": 0.0},
            {"account_id": "acc-mw-s-007", "user_id": "user-001", "category": "asset", "type": "savings", "sub_type": "savings", "description": "", "balance": 0.0},
            {"account_id": "acc-mw-s-bad", "user_id": "user-001", "category": "asset", "type": "savings", "sub_type": "savings", "description": "", "balance": 0.0}
        ]))
        .unwrap();

        assert_eq!(next_account_id(&existing, "Marcus Webb", "Savings"), "acc-mw-s-008");
        assert_eq!(next_account_id(&existing, "Marcus Webb", "pension"), "acc-mw-p-001");
        assert_eq!(next_account_id(&existing, "Marcus W.", "boat loan"), "acc-mw-x-001");
    }

    #[tokio::test]
    async fn test_list_accounts_scoped_to_user() {
        let backend = TestBackend::new();

        let (status, body) = backend.get("/api/users/user_001/accounts").await;
        assert_eq!(status, StatusCode::OK);
        let accounts = body.as_array().unwrap();
        assert_eq!(accounts.len(), 3);
        assert!(accounts.iter().all(|a| a["user_id"] == "user-001"));

        let (status, body) = backend.get("/api/users/user-002/accounts").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_create_account() {
        let backend = TestBackend::new();

        let (status, body) = backend
            .call(
                "POST",
                "/api/users/user_001/accounts",
                Some(json!({"type": "credit card", "description": "Travel card", "balance": 0})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["account_id"], "acc-mw-d-002");
        assert_eq!(body["user_id"], "user-001");
        assert_eq!(body["category"], "liability");
        assert_eq!(body["sub_type"], "credit card");

        let (_, body) = backend.get("/api/users/user-001/accounts").await;
        assert_eq!(body.as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_create_account_unknown_user() {
        let backend = TestBackend::new();

        let (status, _) = backend
            .call(
                "POST",
                "/api/users/user-999/accounts",
                Some(json!({"type": "savings"})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
