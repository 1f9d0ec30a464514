use anyhow::{anyhow, Context};

use crate::auth::{password, TokenSigner};
use crate::config::AppConfig;
use crate::database::models::{NewAccount, Role};
use crate::database::{AccountStore, DatabaseError, DatabaseManager, PgAccountStore};

/// Bootstrap an ADMIN account. The access token goes to stdout so it can be captured.
pub async fn handle(email: String, plain_password: String) -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    let signer = TokenSigner::from_config(&config.security).context("invalid token secret")?;

    let email = email.trim().to_string();
    if email.is_empty() || !email.contains('@') {
        return Err(anyhow!("'{}' is not an email address", email));
    }
    password::validate_password_strength(&plain_password, config.security.min_password_length)
        .map_err(|msg| anyhow!(msg))?;

    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&plain_password))
        .await?
        .map_err(|e| anyhow!("failed to hash password: {}", e))?;
    let access_token = signer.issue(&email)?;

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    DatabaseManager::ensure_schema(&pool).await?;

    let store = PgAccountStore::new(pool.clone());
    let result = store
        .insert(NewAccount {
            email: email.clone(),
            password_hash,
            role: Role::Admin,
            access_token,
        })
        .await;
    DatabaseManager::close(pool).await;

    let account = match result {
        Ok(account) => account,
        Err(DatabaseError::Conflict(_)) => return Err(anyhow!("an account with email {} already exists", email)),
        Err(e) => return Err(e.into()),
    };

    tracing::info!("Created admin account {} ({})", account.id, account.email);
    println!("{}", account.access_token);
    Ok(())
}
