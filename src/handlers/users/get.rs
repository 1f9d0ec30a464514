use axum::extract::State;
use serde_json::Value;

use crate::api::extract::UserId;
use crate::api::format::{account_to_api_value, AccountView};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /users/:id - Fetch one account (self or admin)
pub async fn get(State(state): State<AppState>, UserId(id): UserId) -> ApiResult<Value> {
    let account = state
        .accounts
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {} not found", id)))?;

    Ok(ApiResponse::success(account_to_api_value(
        &account,
        AccountView::default(),
    )))
}
