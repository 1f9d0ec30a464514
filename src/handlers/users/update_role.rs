use axum::extract::{Extension, State};
use serde::Deserialize;
use serde_json::Value;

use crate::api::extract::{JsonApi, UserId};
use crate::api::format::{account_to_api_value, AccountView};
use crate::database::models::Role;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthenticatedAccount};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleAttributes {
    pub role: Role,
}

/// PATCH /users/:id/role - Change an account's role (admin only)
pub async fn update_role(
    State(state): State<AppState>,
    UserId(id): UserId,
    Extension(AuthenticatedAccount(caller)): Extension<AuthenticatedAccount>,
    body: JsonApi<RoleAttributes>,
) -> ApiResult<Value> {
    body.ensure_target(id)?;
    let attrs = body.attributes;
    let account = state
        .accounts
        .update_role(id, attrs.role)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {} not found", id)))?;

    tracing::info!(
        "Account {} role set to {} by account {}",
        account.id,
        account.role,
        caller.id
    );

    Ok(ApiResponse::success(account_to_api_value(
        &account,
        AccountView::default(),
    )))
}
