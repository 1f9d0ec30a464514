// handlers/status/mod.rs - Public service endpoints (no authentication)

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - Service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "data": {
            "name": "usergate-api",
            "version": version,
            "description": "User management API with token authentication and role-gated access",
            "endpoints": {
                "health": "GET /health (public)",
                "create": "POST /users (admin)",
                "get": "GET /users/:id (self or admin)",
                "update": "PATCH /users/:id (self or admin)",
                "role": "PATCH /users/:id/role (admin)",
                "delete": "DELETE /users/:id (admin)",
            },
            "headers": ["email", "access-token"],
        }
    }))
}

/// GET /health - Liveness plus database reachability
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.accounts.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database": "unavailable"
                    }
                })),
            )
        }
    }
}
