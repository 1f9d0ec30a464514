use axum::http::HeaderMap;
use thiserror::Error;

use crate::auth::TokenSigner;
use crate::database::models::Account;
use crate::database::{AccountStore, DatabaseError};

use super::credentials::Credentials;

/// Why the token authenticator rejected a request. Only the server log sees
/// this level of detail; callers get [`GuardError::AuthenticationFailed`].
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing or unreadable '{0}' header")]
    MissingCredentials(&'static str),

    #[error("presented token failed verification: {0}")]
    InvalidToken(String),

    #[error("no account for the claimed email")]
    UnknownPrincipal,

    #[error("presented token does not match the token on file")]
    TokenMismatch,

    #[error("account lookup failed: {0}")]
    Store(#[from] DatabaseError),
}

/// Outcome signalled by a guard when it does not allow the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("forbidden")]
    Forbidden,

    #[error("internal failure")]
    InternalFailure,
}

impl From<AuthError> for GuardError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Store(_) => GuardError::InternalFailure,
            _ => GuardError::AuthenticationFailed,
        }
    }
}

/// Verify `credentials` against the account on file.
///
/// Performs exactly one store lookup and never writes. The returned account
/// is the persisted record of the authenticated principal.
pub async fn authenticate(
    store: &dyn AccountStore,
    signer: &TokenSigner,
    credentials: &Credentials,
) -> Result<Account, AuthError> {
    let presented = signer
        .verify(&credentials.token)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    let account = store
        .find_by_email(&credentials.email)
        .await?
        .ok_or(AuthError::UnknownPrincipal)?;

    // A stored token that no longer verifies (rotated secret, expiry) rejects too
    let on_file = signer
        .verify(&account.access_token)
        .map_err(|e| AuthError::InvalidToken(format!("stored token: {}", e)))?;

    if presented != on_file {
        return Err(AuthError::TokenMismatch);
    }

    Ok(account)
}

/// Parse credentials from request headers, then authenticate.
pub async fn authenticate_headers(
    store: &dyn AccountStore,
    signer: &TokenSigner,
    headers: &HeaderMap,
) -> Result<(Credentials, Account), AuthError> {
    let credentials = Credentials::from_headers(headers)?;
    let account = authenticate(store, signer, &credentials).await?;
    Ok((credentials, account))
}
