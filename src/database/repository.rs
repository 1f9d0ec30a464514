use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Account, AccountChanges, NewAccount, Role};

/// Persistence capability for the `users` table.
///
/// The authorization chain only ever calls [`AccountStore::find_by_email`];
/// the remaining operations back the resource handlers.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DatabaseError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, DatabaseError>;

    async fn insert(&self, account: NewAccount) -> Result<Account, DatabaseError>;

    /// Returns `None` when no row has this id
    async fn update(&self, id: i64, changes: AccountChanges) -> Result<Option<Account>, DatabaseError>;

    async fn update_role(&self, id: i64, role: Role) -> Result<Option<Account>, DatabaseError>;

    /// Returns whether a row was removed
    async fn delete(&self, id: i64) -> Result<bool, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

const ACCOUNT_COLUMNS: &str = "id, email, password_hash, role, access_token, created_at, updated_at";

/// PostgreSQL-backed [`AccountStore`]
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DatabaseError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE email = $1");
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, DatabaseError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = $1");
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (email, password_hash, role, access_token)
             VALUES ($1, $2, $3, $4)
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Account>(&sql)
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(account.role.as_str())
            .bind(&account.access_token)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update(&self, id: i64, changes: AccountChanges) -> Result<Option<Account>, DatabaseError> {
        // COALESCE keeps the current value for every column left as NULL
        let sql = format!(
            "UPDATE users SET
                email = COALESCE($2, email),
                password_hash = COALESCE($3, password_hash),
                access_token = COALESCE($4, access_token),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .bind(changes.email)
            .bind(changes.password_hash)
            .bind(changes.access_token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn update_role(&self, id: i64, role: Role) -> Result<Option<Account>, DatabaseError> {
        let sql = format!(
            "UPDATE users SET role = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .bind(role.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
