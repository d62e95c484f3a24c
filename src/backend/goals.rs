use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tracing::info;

use super::store::merge_patch;
use super::{ApiResult, ApiState, Collection};
use crate::error::StewardError;
use crate::models::{LifeGoal, NewLifeGoal};

fn goal_not_found() -> StewardError {
    StewardError::NotFound("Goal not found".to_string())
}

async fn list_goals(State(state): State<ApiState>) -> ApiResult<Json<Vec<LifeGoal>>> {
    Ok(Json(state.store.load(Collection::Goals).await?))
}

async fn user_goals(
    Path(user_id): Path<String>,
    State(state): State<ApiState>,
) -> ApiResult<Json<Vec<LifeGoal>>> {
    let user = state.store.require_user(&user_id).await?;
    let goals: Vec<LifeGoal> = state.store.load(Collection::Goals).await?;

    Ok(Json(
        goals
            .into_iter()
            .filter(|g| g.user_id == user.user_id)
            .collect(),
    ))
}

async fn create_goal(
    State(state): State<ApiState>,
    Json(input): Json<NewLifeGoal>,
) -> ApiResult<(StatusCode, Json<LifeGoal>)> {
    let user = state.store.require_user(&input.user_id).await?;

    let goal = LifeGoal {
        goal_id: format!("goal-{}", uuid::Uuid::new_v4()),
        user_id: user.user_id,
        description: input.description,
        target_amount: input.target_amount,
        target_date: input.target_date,
        current_amount_saved: input.current_amount_saved,
    };

    state
        .store
        .update(Collection::Goals, |goals: &mut Vec<LifeGoal>| {
            goals.push(goal.clone());
            Ok(())
        })
        .await?;

    info!(goal_id = %goal.goal_id, user_id = %goal.user_id, "Goal created");

    Ok((StatusCode::CREATED, Json(goal)))
}

/// Merge the provided fields into the stored goal.
async fn update_goal(
    Path(goal_id): Path<String>,
    State(state): State<ApiState>,
    Json(patch): Json<Value>,
) -> ApiResult<Json<LifeGoal>> {
    let updated = state
        .store
        .update(Collection::Goals, |goals: &mut Vec<LifeGoal>| {
            let goal = goals
                .iter_mut()
                .find(|g| g.goal_id == goal_id)
                .ok_or_else(goal_not_found)?;
            *goal = merge_patch(goal, &patch, "goal_id")?;
            Ok(goal.clone())
        })
        .await?;

    Ok(Json(updated))
}

async fn delete_goal(
    Path(goal_id): Path<String>,
    State(state): State<ApiState>,
) -> ApiResult<StatusCode> {
    state
        .store
        .update(Collection::Goals, |goals: &mut Vec<LifeGoal>| {
            let before = goals.len();
            goals.retain(|g| g.goal_id != goal_id);
            if goals.len() == before {
                return Err(goal_not_found());
            }
            Ok(())
        })
        .await?;

    info!(goal_id = %goal_id, "Goal deleted");

    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/goals", get(list_goals).post(create_goal))
        // GET takes a user id here; PUT and DELETE take a goal id.
        .route(
            "/goals/:id",
            get(user_goals).put(update_goal).delete(delete_goal),
        )
        .route("/users/:user_id/goals", get(user_goals))
}

#[cfg(test)]
mod tests {
    use crate::backend::test_support::TestBackend;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_user_goals_both_routes() {
        let backend = TestBackend::new();

        let (status, by_user_route) = backend.get("/api/users/user_001/goals").await;
        assert_eq!(status, StatusCode::OK);
        let (_, by_goal_route) = backend.get("/api/goals/user-001").await;
        assert_eq!(by_user_route, by_goal_route);
        assert_eq!(by_user_route[0]["goal_id"], "goal-001");

        let (status, body) = backend.get("/api/goals/user-002").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_create_update_delete_goal() {
        let backend = TestBackend::new();

        let (status, created) = backend
            .call(
                "POST",
                "/api/goals",
                Some(json!({
                    "user_id": "user_002",
                    "description": "Save $10,000",
                    "target_amount": 10000,
                    "target_date": "2027-12-31",
                    "current_amount_saved": 0
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let goal_id = created["goal_id"].as_str().unwrap().to_string();
        assert!(goal_id.starts_with("goal-"));
        assert_eq!(created["user_id"], "user-002");

        let (status, updated) = backend
            .call(
                "PUT",
                &format!("/api/goals/{}", goal_id),
                Some(json!({"target_amount": 15000, "goal_id": "ignored"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["target_amount"], 15000.0);
        assert_eq!(updated["goal_id"], goal_id.as_str());

        let (_, goals) = backend.get("/api/users/user-002/goals").await;
        assert_eq!(goals[0]["target_amount"], 15000.0);
        assert_eq!(goals[0]["description"], "Save $10,000");

        let (status, _) = backend
            .call("DELETE", &format!("/api/goals/{}", goal_id), None)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, goals) = backend.get("/api/users/user-002/goals").await;
        assert_eq!(goals, json!([]));

        let (status, body) = backend
            .call("DELETE", &format!("/api/goals/{}", goal_id), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Goal not found");
    }

    #[tokio::test]
    async fn test_update_missing_goal() {
        let backend = TestBackend::new();

        let (status, body) = backend
            .call(
                "PUT",
                "/api/goals/non-existent-goal",
                Some(json!({"description": "Test"})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"detail": "Goal not found"}));
    }

    #[tokio::test]
    async fn test_invalid_update_is_rejected() {
        let backend = TestBackend::new();

        let (status, _) = backend
            .call(
                "PUT",
                "/api/goals/goal-001",
                Some(json!({"target_amount": "a lot"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, goals) = backend.get("/api/goals").await;
        assert_eq!(goals[0]["target_amount"], 10000.0);
    }
}
