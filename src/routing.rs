//! Application router configuration for the relay's JSON API.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;

use crate::{
    AppState, endpoints,
    logging::logging_middleware,
    relay::{
        accounts_balance_endpoint, create_link_token_endpoint, exchange_public_token_endpoint,
        get_transactions_endpoint, health_endpoint, remove_item_endpoint,
        sync_transactions_endpoint,
    },
};

/// Return a router with all the relay's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::HEALTH, get(health_endpoint))
        .route(endpoints::CREATE_LINK_TOKEN, post(create_link_token_endpoint))
        .route(
            endpoints::EXCHANGE_PUBLIC_TOKEN,
            post(exchange_public_token_endpoint),
        )
        .route(endpoints::ACCOUNTS_BALANCE, post(accounts_balance_endpoint))
        .route(endpoints::TRANSACTIONS_SYNC, post(sync_transactions_endpoint))
        .route(endpoints::TRANSACTIONS_GET, post(get_transactions_endpoint))
        .route(endpoints::ITEM_REMOVE, post(remove_item_endpoint))
        .layer(middleware::from_fn(logging_middleware))
        .fallback(get_not_found)
        .with_state(state)
}

/// The JSON 404 response for routes the relay does not serve.
async fn get_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "not found" })),
    )
        .into_response()
}
