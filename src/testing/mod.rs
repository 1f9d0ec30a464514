//! Test doubles shared by the unit and router tests.

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderValue};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::auth::TokenSigner;
use crate::config::{AppConfig, SelfOrAdminPolicy};
use crate::database::models::{Account, AccountChanges, NewAccount, Role};
use crate::database::{AccountStore, DatabaseError};
use crate::middleware::credentials::{ACCESS_TOKEN_HEADER, EMAIL_HEADER, USER_ROLE_HEADER};
use crate::state::AppState;

pub const TEST_SECRET: &[u8] = b"test-secret-test-secret-test-sec";

const SEEDED_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c2VlZGVk$c2VlZGVk";

/// In-memory [`AccountStore`] that counts lookups and writes.
#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<Vec<Account>>,
    next_id: AtomicI64,
    email_lookups: AtomicUsize,
    writes: AtomicUsize,
    fail_lookups: AtomicBool,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    /// Insert an account directly with a fresh token, bypassing the write counter
    pub fn seed(&self, signer: &TokenSigner, email: &str, role: Role) -> Account {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut acct = account(id, email, role);
        acct.access_token = signer.issue(email).expect("issue token");
        self.accounts.lock().unwrap().push(acct.clone());
        acct
    }

    pub fn set_role(&self, id: i64, role: Role) {
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(acct) = accounts.iter_mut().find(|a| a.id == id) {
            acct.role = role;
        }
    }

    pub fn set_access_token(&self, id: i64, token: &str) {
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(acct) = accounts.iter_mut().find(|a| a.id == id) {
            acct.access_token = token.to_string();
        }
    }

    pub fn get(&self, id: i64) -> Option<Account> {
        self.accounts.lock().unwrap().iter().find(|a| a.id == id).cloned()
    }

    pub fn fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }

    pub fn email_lookups(&self) -> usize {
        self.email_lookups.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), DatabaseError> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(DatabaseError::PoolTimedOut);
        }
        Ok(())
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DatabaseError> {
        self.email_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.accounts.lock().unwrap().iter().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, DatabaseError> {
        self.check_available()?;
        Ok(self.get(id))
    }

    async fn insert(&self, new: NewAccount) -> Result<Account, DatabaseError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.iter().any(|a| a.email == new.email) {
            return Err(DatabaseError::Conflict("users_email_key".into()));
        }
        let now = Utc::now();
        let created = Account {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
            access_token: new.access_token,
            created_at: now,
            updated_at: now,
        };
        accounts.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: i64, changes: AccountChanges) -> Result<Option<Account>, DatabaseError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(email) = &changes.email {
            if accounts.iter().any(|a| a.id != id && &a.email == email) {
                return Err(DatabaseError::Conflict("users_email_key".into()));
            }
        }
        let Some(acct) = accounts.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        if let Some(email) = changes.email {
            acct.email = email;
        }
        if let Some(hash) = changes.password_hash {
            acct.password_hash = hash;
        }
        if let Some(token) = changes.access_token {
            acct.access_token = token;
        }
        acct.updated_at = Utc::now();
        Ok(Some(acct.clone()))
    }

    async fn update_role(&self, id: i64, role: Role) -> Result<Option<Account>, DatabaseError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut accounts = self.accounts.lock().unwrap();
        Ok(accounts.iter_mut().find(|a| a.id == id).map(|acct| {
            acct.role = role;
            acct.updated_at = Utc::now();
            acct.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut accounts = self.accounts.lock().unwrap();
        let before = accounts.len();
        accounts.retain(|a| a.id != id);
        Ok(accounts.len() != before)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.check_available()
    }
}

/// Stand-alone account value; its token is not signed
pub fn account(id: i64, email: &str, role: Role) -> Account {
    let now = Utc::now();
    Account {
        id,
        email: email.to_string(),
        password_hash: SEEDED_PASSWORD_HASH.to_string(),
        role,
        access_token: format!("unsigned-token-{}", id),
        created_at: now,
        updated_at: now,
    }
}

pub fn credential_headers(email: Option<&str>, token: Option<&str>, role: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(email) = email {
        headers.insert(EMAIL_HEADER, HeaderValue::from_str(email).unwrap());
    }
    if let Some(token) = token {
        headers.insert(ACCESS_TOKEN_HEADER, HeaderValue::from_str(token).unwrap());
    }
    if let Some(role) = role {
        headers.insert(USER_ROLE_HEADER, HeaderValue::from_str(role).unwrap());
    }
    headers
}

pub fn test_config(policy: SelfOrAdminPolicy) -> AppConfig {
    let vars: HashMap<&str, String> = HashMap::from([
        ("DATABASE_URL", "postgres://localhost/usergate_test".to_string()),
        ("JWT_SECRET", String::from_utf8_lossy(TEST_SECRET).to_string()),
        ("API_ENABLE_REQUEST_LOGGING", "false".to_string()),
        ("SECURITY_MIN_PASSWORD_LENGTH", "8".to_string()),
    ]);
    let mut config = AppConfig::from_source(|key| vars.get(key).cloned()).expect("test config");
    config.security.self_or_admin = policy;
    config
}

pub fn test_state(store: Arc<MemoryAccountStore>, policy: SelfOrAdminPolicy) -> AppState {
    let signer = TokenSigner::new(TEST_SECRET, None).expect("test signer");
    AppState::new(store, signer, test_config(policy))
}
