use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::{ApiResult, ApiState, Collection};
use crate::models::BankPartner;

async fn list_partners(State(state): State<ApiState>) -> ApiResult<Json<Vec<BankPartner>>> {
    Ok(Json(state.store.load(Collection::Partners).await?))
}

/// Partners whose credit-score floor the user clears.
async fn eligible_partners(
    Path(user_id): Path<String>,
    State(state): State<ApiState>,
) -> ApiResult<Json<Vec<BankPartner>>> {
    let user = state.store.require_user(&user_id).await?;
    let partners: Vec<BankPartner> = state.store.load(Collection::Partners).await?;

    Ok(Json(
        partners
            .into_iter()
            .filter(|p| p.is_eligible(user.credit_score))
            .collect(),
    ))
}

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/partners", get(list_partners))
        .route("/partners/user/:user_id", get(eligible_partners))
}
