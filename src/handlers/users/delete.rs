use axum::extract::{Extension, State};

use crate::api::extract::UserId;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthenticatedAccount};
use crate::state::AppState;

/// DELETE /users/:id - Remove an account (admin only)
pub async fn delete(
    State(state): State<AppState>,
    UserId(id): UserId,
    Extension(AuthenticatedAccount(caller)): Extension<AuthenticatedAccount>,
) -> ApiResult<()> {
    if !state.accounts.delete(id).await? {
        return Err(ApiError::not_found(format!("User {} not found", id)));
    }

    tracing::info!("Account {} deleted by account {}", id, caller.id);
    Ok(ApiResponse::<()>::no_content())
}
