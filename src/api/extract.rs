use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::format::{Document, USERS_TYPE};
use crate::error::ApiError;

/// Numeric `:id` path segment; anything else is a 400 in JSON:API form.
#[derive(Debug, Clone, Copy)]
pub struct UserId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::bad_request("User id must be an integer"))?;
        Ok(UserId(id))
    }
}

/// JSON:API request body whose `data.type` must be `users`.
#[derive(Debug)]
pub struct JsonApi<A> {
    /// `data.id` as sent by the client
    pub id: Option<Value>,
    pub attributes: A,
}

impl<A> JsonApi<A> {
    /// A body id, when present, must match the account addressed by the path.
    pub fn ensure_target(&self, path_id: i64) -> Result<(), ApiError> {
        let Some(id) = &self.id else {
            return Ok(());
        };
        let matches = match id {
            Value::String(s) => s.trim().parse::<i64>().ok() == Some(path_id),
            Value::Number(n) => n.as_i64() == Some(path_id),
            _ => false,
        };
        if !matches {
            return Err(ApiError::conflict(format!(
                "Resource id {} does not match endpoint id {}",
                id, path_id
            )));
        }
        Ok(())
    }

    /// Ids are assigned by the server on create.
    pub fn reject_client_id(&self) -> Result<(), ApiError> {
        if self.id.is_some() {
            return Err(ApiError::forbidden("Client-generated ids are not supported"));
        }
        Ok(())
    }
}

#[async_trait]
impl<S, A> FromRequest<S> for JsonApi<A>
where
    S: Send + Sync,
    A: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(document) = Json::<Document<A>>::from_request(req, state)
            .await
            .map_err(json_rejection)?;

        if document.data.kind != USERS_TYPE {
            return Err(ApiError::conflict(format!(
                "Resource type '{}' does not match endpoint type '{}'",
                document.data.kind, USERS_TYPE
            )));
        }

        Ok(JsonApi {
            id: document.data.id,
            attributes: document.data.attributes,
        })
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonSyntaxError(e) => ApiError::invalid_json(e.body_text()),
        JsonRejection::JsonDataError(e) => ApiError::bad_request(e.body_text()),
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::bad_request("Expected request with `Content-Type: application/vnd.api+json`")
        }
        other if other.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            ApiError::payload_too_large("Request body is too large")
        }
        other => ApiError::bad_request(other.body_text()),
    }
}
