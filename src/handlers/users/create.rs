use axum::extract::{Extension, State};
use serde::Deserialize;
use serde_json::Value;

use crate::api::extract::JsonApi;
use crate::api::format::{account_to_api_value, AccountView};
use crate::database::models::{NewAccount, Role};
use crate::middleware::{ApiResponse, ApiResult, AuthenticatedAccount};
use crate::state::AppState;

use super::{hash_password, issue_token, normalize_email};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateAttributes {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

/// POST /users - Create an account (admin only)
///
/// Expected Input:
/// ```json
/// { "data": { "type": "users", "attributes": { "email": "a@x.com", "password": "...", "role": "USER" } } }
/// ```
///
/// The response carries the new account's `accessToken`. It is the only
/// time the token is returned.
pub async fn create(
    State(state): State<AppState>,
    Extension(AuthenticatedAccount(caller)): Extension<AuthenticatedAccount>,
    body: JsonApi<CreateAttributes>,
) -> ApiResult<Value> {
    body.reject_client_id()?;
    let attrs = body.attributes;
    let email = normalize_email(&attrs.email)?;
    let password_hash = hash_password(attrs.password, state.config.security.min_password_length).await?;
    let access_token = issue_token(&state, &email)?;

    let account = state
        .accounts
        .insert(NewAccount {
            email,
            password_hash,
            role: attrs.role,
            access_token,
        })
        .await?;

    tracing::info!(
        "Account {} ({}) created by account {}",
        account.id,
        account.role,
        caller.id
    );

    Ok(ApiResponse::created(account_to_api_value(
        &account,
        AccountView::with_token(),
    )))
}
