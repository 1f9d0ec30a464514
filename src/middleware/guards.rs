use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
    RequestExt,
};

use crate::api::extract::UserId;
use crate::config::SelfOrAdminPolicy;
use crate::database::models::Account;
use crate::error::ApiError;
use crate::state::AppState;

use super::auth::{authenticate_headers, AuthError, GuardError};
use super::credentials::Credentials;

/// The persisted account of the caller, injected into request extensions
/// once a guard allows the request.
#[derive(Clone, Debug)]
pub struct AuthenticatedAccount(pub Account);

/// Admin-only decision for an already authenticated account. The role comes
/// from the stored record, never from a request header.
pub fn check_admin(account: &Account) -> Result<(), GuardError> {
    if account.is_admin() {
        Ok(())
    } else {
        Err(GuardError::Forbidden)
    }
}

/// Self-or-admin decision for an already authenticated account.
pub fn check_self_or_admin(
    policy: SelfOrAdminPolicy,
    account: &Account,
    target_id: i64,
    role_hint: Option<&str>,
) -> Result<(), GuardError> {
    match policy {
        SelfOrAdminPolicy::Observed => {
            // The path id is compared with itself, so the role header never matters
            tracing::debug!(target_id, role_hint = ?role_hint, "self-or-admin passed in observed mode");
            Ok(())
        }
        SelfOrAdminPolicy::Corrected => {
            if account.id == target_id || account.is_admin() {
                Ok(())
            } else {
                Err(GuardError::Forbidden)
            }
        }
    }
}

async fn authenticate_request(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(Credentials, Account), GuardError> {
    authenticate_headers(state.accounts.as_ref(), &state.signer, headers)
        .await
        .map_err(|err| {
            match &err {
                AuthError::Store(db_err) => {
                    tracing::error!("Account lookup failed during authentication: {}", db_err)
                }
                other => tracing::warn!("Authentication rejected: {}", other),
            }
            GuardError::from(err)
        })
}

/// Role Authorizer: authenticate, then require the ADMIN role.
pub async fn authorize_admin(state: &AppState, headers: &HeaderMap) -> Result<Account, GuardError> {
    let (_, account) = authenticate_request(state, headers).await?;
    check_admin(&account).inspect_err(|_| {
        tracing::warn!("Admin access denied for account {}", account.id);
    })?;
    Ok(account)
}

/// Self-or-Admin Authorizer: authenticate, then apply the configured policy.
pub async fn authorize_self_or_admin(
    state: &AppState,
    headers: &HeaderMap,
    target_id: i64,
) -> Result<Account, GuardError> {
    let (credentials, account) = authenticate_request(state, headers).await?;
    decide_self_or_admin(state, &credentials, account, target_id)
}

fn decide_self_or_admin(
    state: &AppState,
    credentials: &Credentials,
    account: Account,
    target_id: i64,
) -> Result<Account, GuardError> {
    check_self_or_admin(
        state.config.security.self_or_admin,
        &account,
        target_id,
        credentials.role_hint.as_deref(),
    )
    .inspect_err(|_| {
        tracing::warn!("Account {} denied access to account {}", account.id, target_id);
    })?;
    Ok(account)
}

/// Middleware gating a route on [`authorize_admin`]
pub async fn require_admin_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let account = authorize_admin(&state, &headers).await?;
    request.extensions_mut().insert(AuthenticatedAccount(account));
    Ok(next.run(request).await)
}

/// Middleware gating a `/users/:id` route on the self-or-admin policy.
///
/// Credentials are checked before the path id is parsed, so an
/// unauthenticated caller fails the same way on every route.
pub async fn require_self_or_admin_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (credentials, account) = authenticate_request(&state, &headers).await?;
    let UserId(target_id) = request.extract_parts::<UserId>().await?;
    let account = decide_self_or_admin(&state, &credentials, account, target_id)?;
    request.extensions_mut().insert(AuthenticatedAccount(account));
    Ok(next.run(request).await)
}
