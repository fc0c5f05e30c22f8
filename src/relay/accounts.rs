//! Defines the endpoint for fetching account balances.

use axum::{
    Json,
    extract::{FromRef, State},
};
use serde::Deserialize;
use serde_json::Value;

use crate::{AppState, Error, relay::PlaidClient};

/// The state needed to fetch account balances.
#[derive(Debug, Clone)]
pub struct AccountsState {
    /// The client for the upstream API.
    pub plaid_client: PlaidClient,
}

impl FromRef<AppState> for AccountsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            plaid_client: state.plaid_client.clone(),
        }
    }
}

/// A request body carrying only an access token.
#[derive(Debug, Deserialize)]
pub struct AccessTokenBody {
    /// The access token for the linked item.
    pub access_token: String,
}

/// A route handler that fetches current balances for a linked item.
///
/// The upstream response is returned verbatim.
pub async fn accounts_balance_endpoint(
    State(state): State<AccountsState>,
    Json(body): Json<AccessTokenBody>,
) -> Result<Json<Value>, Error> {
    let response = state
        .plaid_client
        .accounts_balance(&body.access_token)
        .await?;

    Ok(Json(response))
}

// ============================================================================
// TESTS
// ============================================================================
