//! Defines the endpoints for the account-linking flow: creating a link token
//! and exchanging the resulting public token for an access token.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{AppState, Error, relay::PlaidClient, relay::tokens::store_access_token};

/// The state needed to create a link token.
#[derive(Debug, Clone)]
pub struct LinkTokenState {
    /// The client for the upstream API.
    pub plaid_client: PlaidClient,
}

impl FromRef<AppState> for LinkTokenState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            plaid_client: state.plaid_client.clone(),
        }
    }
}

/// A route handler that creates a link token for starting the link flow.
///
/// The upstream response is returned verbatim.
pub async fn create_link_token_endpoint(
    State(state): State<LinkTokenState>,
) -> Result<Json<Value>, Error> {
    let response = state.plaid_client.create_link_token().await?;

    Ok(Json(response))
}

/// The state needed to exchange a public token.
#[derive(Debug, Clone)]
pub struct ExchangeTokenState {
    /// The client for the upstream API.
    pub plaid_client: PlaidClient,
    /// The database connection holding the access token table.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExchangeTokenState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            plaid_client: state.plaid_client.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for exchanging a public token.
#[derive(Debug, Deserialize)]
pub struct ExchangePublicTokenBody {
    /// The public token produced by the link flow.
    pub public_token: String,
}

/// A route handler that exchanges a public token for an access token.
///
/// The access token is stored against its item ID before responding, so the
/// mapping survives a relay restart. A storage failure is logged but does not
/// fail the request: the client still receives the token it asked for.
pub async fn exchange_public_token_endpoint(
    State(state): State<ExchangeTokenState>,
    Json(body): Json<ExchangePublicTokenBody>,
) -> Result<Json<Value>, Error> {
    let response = state
        .plaid_client
        .exchange_public_token(&body.public_token)
        .await?;

    let access_token = expect_string_field(&response, "access_token")?;
    let item_id = expect_string_field(&response, "item_id")?;

    match state.db_connection.lock() {
        Ok(connection) => {
            if let Err(error) = store_access_token(&connection, item_id, access_token) {
                tracing::error!("could not store the access token for {item_id}: {error}");
            }
        }
        Err(error) => {
            tracing::error!("could not acquire the database lock: {error}");
        }
    }

    Ok(Json(json!({
        "access_token": access_token,
        "item_id": item_id,
    })))
}

fn expect_string_field<'a>(response: &'a Value, field: &'static str) -> Result<&'a str, Error> {
    response
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::UpstreamApi(format!("the exchange response did not include {field}")))
}

// ============================================================================
// TESTS
// ============================================================================
