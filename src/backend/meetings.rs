//! Advisor directory and meeting bookings

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::info;

use super::{ApiResult, ApiState, Collection};
use crate::error::StewardError;
use crate::models::{Advisor, Meeting, NewMeeting};

async fn list_advisors(State(state): State<ApiState>) -> ApiResult<Json<Vec<Advisor>>> {
    Ok(Json(state.store.load(Collection::Advisors).await?))
}

async fn advisors_by_type(
    Path(advisor_type): Path<String>,
    State(state): State<ApiState>,
) -> ApiResult<Json<Vec<Advisor>>> {
    let advisors: Vec<Advisor> = state.store.load(Collection::Advisors).await?;

    let matching: Vec<Advisor> = advisors
        .into_iter()
        .filter(|a| a.advisor_type.eq_ignore_ascii_case(&advisor_type))
        .collect();

    if matching.is_empty() {
        return Err(StewardError::NotFound(format!(
            "No advisors found for type: {}",
            advisor_type
        )));
    }

    Ok(Json(matching))
}

async fn list_meetings(State(state): State<ApiState>) -> ApiResult<Json<Vec<Meeting>>> {
    Ok(Json(state.store.load(Collection::Meetings).await?))
}

async fn user_meetings(
    Path(user_id): Path<String>,
    State(state): State<ApiState>,
) -> ApiResult<Json<Vec<Meeting>>> {
    let user = state.store.require_user(&user_id).await?;
    let meetings: Vec<Meeting> = state.store.load(Collection::Meetings).await?;

    Ok(Json(
        meetings
            .into_iter()
            .filter(|m| m.user_id == user.user_id)
            .collect(),
    ))
}

/// Same advisor at the same instant. Bookings without an advisor id fall
/// back to the advisor name.
fn same_slot(existing: &Meeting, requested: &Meeting) -> bool {
    let same_advisor = match (&existing.advisor_id, &requested.advisor_id) {
        (Some(a), Some(b)) => a == b,
        _ => existing.advisor_name.eq_ignore_ascii_case(&requested.advisor_name),
    };
    same_advisor && existing.meeting_time == requested.meeting_time
}

async fn schedule_meeting(
    State(state): State<ApiState>,
    Json(input): Json<NewMeeting>,
) -> ApiResult<(StatusCode, Json<Meeting>)> {
    let user = state.store.require_user(&input.user_id).await?;

    let meeting = Meeting {
        meeting_id: input
            .meeting_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("meet-{}", uuid::Uuid::new_v4())),
        user_id: user.user_id,
        advisor_id: input.advisor_id,
        advisor_name: input.advisor_name,
        advisor_type: input.advisor_type,
        meeting_time: input.meeting_time,
        notes: input.notes,
    };

    state
        .store
        .update(Collection::Meetings, |meetings: &mut Vec<Meeting>| {
            if meetings.iter().any(|m| same_slot(m, &meeting)) {
                return Err(StewardError::Conflict(
                    "This time slot is already booked with the advisor.".to_string(),
                ));
            }
            meetings.push(meeting.clone());
            Ok(())
        })
        .await?;

    info!(
        meeting_id = %meeting.meeting_id,
        advisor = %meeting.advisor_name,
        time = %meeting.meeting_time,
        "Meeting scheduled"
    );

    Ok((StatusCode::CREATED, Json(meeting)))
}

async fn cancel_meeting(
    Path(meeting_id): Path<String>,
    State(state): State<ApiState>,
) -> ApiResult<StatusCode> {
    state
        .store
        .update(Collection::Meetings, |meetings: &mut Vec<Meeting>| {
            let before = meetings.len();
            meetings.retain(|m| m.meeting_id != meeting_id);
            if meetings.len() == before {
                return Err(StewardError::NotFound("Meeting not found".to_string()));
            }
            Ok(())
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/advisors", get(list_advisors))
        .route("/advisors/:advisor_type", get(advisors_by_type))
        .route("/meetings", get(list_meetings).post(schedule_meeting))
        // GET takes a user id here; DELETE takes a meeting id.
        .route("/meetings/:id", get(user_meetings).delete(cancel_meeting))
}
