use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::handlers::{status, users};
use crate::middleware::credentials::{ACCESS_TOKEN_HEADER, EMAIL_HEADER, USER_ROLE_HEADER};
use crate::middleware::{require_admin_middleware, require_self_or_admin_middleware};
use crate::state::AppState;

/// Build the full HTTP application around an already constructed state
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new()
        // Public
        .route("/", get(status::root))
        .route("/health", get(status::health))
        // Guarded resource routes
        .merge(user_routes(&state))
        .fallback(|| async { ApiError::not_found("Route not found") })
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

/// Each method gets exactly one guard
fn user_routes(state: &AppState) -> Router<AppState> {
    let admin = middleware::from_fn_with_state(state.clone(), require_admin_middleware);
    let self_or_admin = middleware::from_fn_with_state(state.clone(), require_self_or_admin_middleware);

    Router::new()
        .route("/users", post(users::user_create).route_layer(admin.clone()))
        .route(
            "/users/:id",
            get(users::user_get)
                .patch(users::user_update)
                .put(users::user_update)
                .route_layer(self_or_admin)
                .merge(delete(users::user_delete).route_layer(admin.clone())),
        )
        .route(
            "/users/:id/role",
            patch(users::user_update_role)
                .put(users::user_update_role)
                .route_layer(admin),
        )
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(EMAIL_HEADER),
            HeaderName::from_static(ACCESS_TOKEN_HEADER),
            HeaderName::from_static(USER_ROLE_HEADER),
        ])
}
