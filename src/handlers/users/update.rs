use axum::extract::{Extension, State};
use serde::Deserialize;
use serde_json::Value;

use crate::api::extract::{JsonApi, UserId};
use crate::api::format::{account_to_api_value, AccountView};
use crate::database::models::AccountChanges;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthenticatedAccount};
use crate::state::AppState;

use super::{hash_password, issue_token, normalize_email};

/// Role changes go through `/users/:id/role`, so `role` is an unknown field here
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateAttributes {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// PATCH /users/:id - Update email and/or password (self or admin)
///
/// Changing the email mints a new access token; the old one stops working
/// and the new one is returned as `accessToken`.
pub async fn update(
    State(state): State<AppState>,
    UserId(id): UserId,
    Extension(AuthenticatedAccount(caller)): Extension<AuthenticatedAccount>,
    body: JsonApi<UpdateAttributes>,
) -> ApiResult<Value> {
    body.ensure_target(id)?;
    let attrs = body.attributes;
    let mut changes = AccountChanges::default();

    if let Some(raw) = attrs.email.as_deref() {
        let email = normalize_email(raw)?;
        changes.access_token = Some(issue_token(&state, &email)?);
        changes.email = Some(email);
    }
    if let Some(plain) = attrs.password {
        changes.password_hash = Some(hash_password(plain, state.config.security.min_password_length).await?);
    }

    if changes.is_empty() {
        return Err(ApiError::bad_request("No updatable attributes supplied"));
    }

    let token_reissued = changes.access_token.is_some();
    let account = state
        .accounts
        .update(id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {} not found", id)))?;

    tracing::info!("Account {} updated by account {}", account.id, caller.id);

    let view = AccountView {
        include_access_token: token_reissued,
    };
    Ok(ApiResponse::success(account_to_api_value(&account, view)))
}
