//! Defines the endpoint for removing a linked item.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde_json::Value;

use crate::{
    AppState, Error,
    relay::{PlaidClient, accounts::AccessTokenBody, tokens::delete_access_tokens},
};

/// The state needed to remove an item.
#[derive(Debug, Clone)]
pub struct RemoveItemState {
    /// The client for the upstream API.
    pub plaid_client: PlaidClient,
    /// The database connection holding the access token table.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RemoveItemState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            plaid_client: state.plaid_client.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that disconnects a linked item upstream and forgets its
/// stored access token.
///
/// The upstream response is returned verbatim. A failure deleting the stored
/// token is logged but does not fail the request, since the item is already
/// gone upstream.
pub async fn remove_item_endpoint(
    State(state): State<RemoveItemState>,
    Json(body): Json<AccessTokenBody>,
) -> Result<Json<Value>, Error> {
    let response = state.plaid_client.remove_item(&body.access_token).await?;

    match state.db_connection.lock() {
        Ok(connection) => {
            if let Err(error) = delete_access_tokens(&connection, &body.access_token) {
                tracing::error!("could not delete the stored access token: {error}");
            }
        }
        Err(error) => {
            tracing::error!("could not acquire the database lock: {error}");
        }
    }

    Ok(Json(response))
}

// ============================================================================
// TESTS
// ============================================================================
