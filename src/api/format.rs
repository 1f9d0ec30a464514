use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::database::models::Account;

pub const JSON_API_CONTENT_TYPE: &str = "application/vnd.api+json";

/// Resource type name for accounts in request and response documents
pub const USERS_TYPE: &str = "users";

/// Incoming JSON:API document `{ "data": { "type", "id"?, "attributes" } }`
#[derive(Debug, Deserialize)]
pub struct Document<A> {
    pub data: ResourceData<A>,
}

#[derive(Debug, Deserialize)]
pub struct ResourceData<A> {
    #[serde(rename = "type")]
    pub kind: String,
    /// Optional on update, where it must name the path's account
    #[serde(default)]
    pub id: Option<Value>,
    pub attributes: A,
}

/// Controls which secret-bearing attributes are rendered
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountView {
    /// Reveal the access token (only right after it was minted)
    pub include_access_token: bool,
}

impl AccountView {
    pub fn with_token() -> Self {
        Self {
            include_access_token: true,
        }
    }
}

/// Convert an account into the public wire format { type, id, attributes, meta, links }
pub fn account_to_api_value(account: &Account, view: AccountView) -> Value {
    let mut attributes = Map::new();
    attributes.insert("email".into(), Value::String(account.email.clone()));
    attributes.insert("role".into(), Value::String(account.role.as_str().to_string()));
    if view.include_access_token {
        attributes.insert("accessToken".into(), Value::String(account.access_token.clone()));
    }

    let mut obj = Map::new();
    obj.insert("type".into(), Value::String(USERS_TYPE.to_string()));
    obj.insert("id".into(), Value::String(account.id.to_string()));
    obj.insert("attributes".into(), Value::Object(attributes));
    obj.insert(
        "meta".into(),
        json!({
            "createdAt": account.created_at.to_rfc3339(),
            "updatedAt": account.updated_at.to_rfc3339(),
        }),
    );
    obj.insert(
        "links".into(),
        json!({ "self": format!("/{}/{}", USERS_TYPE, account.id) }),
    );

    Value::Object(obj)
}
