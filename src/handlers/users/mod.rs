// handlers/users/mod.rs - /users resource
//
// Every handler runs behind one guard (see app::user_routes):
//   POST   /users            admin
//   GET    /users/:id        self-or-admin
//   PATCH  /users/:id        self-or-admin
//   PATCH  /users/:id/role   admin
//   DELETE /users/:id        admin

pub mod create;
pub mod delete;
pub mod get;
pub mod update;
pub mod update_role;

pub use create::create as user_create;
pub use delete::delete as user_delete;
pub use get::get as user_get;
pub use update::update as user_update;
pub use update_role::update_role as user_update_role;

use crate::auth::password;
use crate::error::ApiError;

/// Trimmed email, or a field error when it cannot be an address
pub(crate) fn normalize_email(raw: &str) -> Result<String, ApiError> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(ApiError::invalid_field("email", "must not be empty"));
    }
    if !email.contains('@') || email.chars().any(char::is_whitespace) {
        return Err(ApiError::invalid_field("email", "must be an email address"));
    }
    Ok(email.to_string())
}

/// Argon2 is CPU-bound, so hashing runs on the blocking pool
pub(crate) async fn hash_password(plain: String, min_length: usize) -> Result<String, ApiError> {
    password::validate_password_strength(&plain, min_length)
        .map_err(|msg| ApiError::invalid_field("password", msg))?;

    tokio::task::spawn_blocking(move || password::hash_password(&plain))
        .await
        .map_err(|e| {
            tracing::error!("Password hashing task failed: {}", e);
            ApiError::internal_server_error("Failed to process password")
        })?
        .map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            ApiError::internal_server_error("Failed to process password")
        })
}

pub(crate) fn issue_token(state: &crate::state::AppState, email: &str) -> Result<String, ApiError> {
    state.signer.issue(email).map_err(|e| {
        tracing::error!("Failed to mint access token: {}", e);
        ApiError::internal_server_error("Failed to issue access token")
    })
}
