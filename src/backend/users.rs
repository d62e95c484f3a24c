use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::{ApiResult, ApiState, Collection};
use crate::finance;
use crate::models::{Account, User};

async fn list_users(State(state): State<ApiState>) -> ApiResult<Json<Vec<User>>> {
    let mut users: Vec<User> = state.store.load(Collection::Users).await?;
    let accounts: Vec<Account> = state.store.load(Collection::Accounts).await?;

    for user in &mut users {
        user.net_worth = Some(finance::net_worth(finance::user_accounts(
            &accounts,
            &user.user_id,
        )));
    }

    Ok(Json(users))
}

/// Profile with net worth derived from the user's current balances.
async fn get_user(
    Path(user_id): Path<String>,
    State(state): State<ApiState>,
) -> ApiResult<Json<User>> {
    let mut user = state.store.require_user(&user_id).await?;
    let accounts: Vec<Account> = state.store.load(Collection::Accounts).await?;

    user.net_worth = Some(finance::net_worth(finance::user_accounts(
        &accounts,
        &user.user_id,
    )));

    Ok(Json(user))
}

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:user_id", get(get_user))
}

#[cfg(test)]
mod tests {
    use crate::backend::test_support::TestBackend;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_get_user_with_net_worth() {
        let backend = TestBackend::new();

        let (status, body) = backend.get("/api/users/user-001").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], "user-001");
        assert_eq!(body["net_worth"], 13_000.0);
    }

    #[tokio::test]
    async fn test_underscore_ids_resolve_to_same_user() {
        let backend = TestBackend::new();

        let (_, hyphen) = backend.get("/api/users/user-001").await;
        let (status, underscore) = backend.get("/api/users/user_001").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(hyphen, underscore);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let backend = TestBackend::new();

        let (status, body) = backend.get("/api/users/non-existent-user").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "User not found");
    }

    #[tokio::test]
    async fn test_list_users_derives_net_worth() {
        let backend = TestBackend::new();

        let (status, body) = backend.get("/api/users").await;
        assert_eq!(status, StatusCode::OK);
        let users = body.as_array().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[1]["net_worth"], 0.0);
    }
}
