use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde_json::Value;
use tracing::info;

use super::store::merge_patch;
use super::{ApiResult, ApiState, Collection};
use crate::error::StewardError;
use crate::models::{NewSchedule, Schedule};

fn schedule_not_found() -> StewardError {
    StewardError::NotFound("Schedule not found".to_string())
}

async fn list_schedules(State(state): State<ApiState>) -> ApiResult<Json<Vec<Schedule>>> {
    Ok(Json(state.store.load(Collection::Schedules).await?))
}

async fn user_schedules(
    Path(user_id): Path<String>,
    State(state): State<ApiState>,
) -> ApiResult<Json<Vec<Schedule>>> {
    let user = state.store.require_user(&user_id).await?;
    let schedules: Vec<Schedule> = state.store.load(Collection::Schedules).await?;

    Ok(Json(
        schedules
            .into_iter()
            .filter(|s| s.user_id == user.user_id)
            .collect(),
    ))
}

async fn create_schedule(
    Path(user_id): Path<String>,
    State(state): State<ApiState>,
    Json(input): Json<NewSchedule>,
) -> ApiResult<(StatusCode, Json<Schedule>)> {
    let user = state.store.require_user(&user_id).await?;

    let schedule = Schedule {
        schedule_id: format!("schedule_{}", uuid::Uuid::new_v4()),
        user_id: user.user_id,
        source_account_id: input.source_account_id,
        destination_account_id: input.destination_account_id,
        description: input.description,
        frequency: input.frequency,
        start_date: input.start_date,
        end_date: input.end_date,
        amount: input.amount,
    };

    state
        .store
        .update(Collection::Schedules, |schedules: &mut Vec<Schedule>| {
            schedules.push(schedule.clone());
            Ok(())
        })
        .await?;

    info!(schedule_id = %schedule.schedule_id, user_id = %schedule.user_id, "Schedule created");

    Ok((StatusCode::CREATED, Json(schedule)))
}

async fn update_schedule(
    Path(schedule_id): Path<String>,
    State(state): State<ApiState>,
    Json(patch): Json<Value>,
) -> ApiResult<Json<Schedule>> {
    let updated = state
        .store
        .update(Collection::Schedules, |schedules: &mut Vec<Schedule>| {
            let schedule = schedules
                .iter_mut()
                .find(|s| s.schedule_id == schedule_id)
                .ok_or_else(schedule_not_found)?;
            *schedule = merge_patch(schedule, &patch, "schedule_id")?;
            Ok(schedule.clone())
        })
        .await?;

    Ok(Json(updated))
}

async fn delete_schedule(
    Path(schedule_id): Path<String>,
    State(state): State<ApiState>,
) -> ApiResult<StatusCode> {
    state
        .store
        .update(Collection::Schedules, |schedules: &mut Vec<Schedule>| {
            let before = schedules.len();
            schedules.retain(|s| s.schedule_id != schedule_id);
            if schedules.len() == before {
                return Err(schedule_not_found());
            }
            Ok(())
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/schedules", get(list_schedules))
        .route(
            "/schedules/:id",
            put(update_schedule).delete(delete_schedule),
        )
        .route(
            "/users/:user_id/schedules",
            get(user_schedules).post(create_schedule),
        )
}
