//! Defines the endpoints for fetching transactions from the upstream API.
//!
//! Both endpoints forward to the upstream `/transactions/get` call. The sync
//! endpoint always asks for the first page of 100 transactions; the paginated
//! endpoint lets the client choose the page.

use axum::{
    Json,
    extract::{FromRef, State},
};
use serde::Deserialize;
use serde_json::Value;

use crate::{AppState, Error, relay::PlaidClient};

const DEFAULT_PAGE_SIZE: u32 = 100;

/// The state needed to fetch transactions.
#[derive(Debug, Clone)]
pub struct TransactionsState {
    /// The client for the upstream API.
    pub plaid_client: PlaidClient,
}

impl FromRef<AppState> for TransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            plaid_client: state.plaid_client.clone(),
        }
    }
}

/// The request body for syncing transactions.
#[derive(Debug, Deserialize)]
pub struct SyncTransactionsBody {
    /// The access token for the linked item.
    pub access_token: String,
    /// The first day to fetch, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// The last day to fetch, `YYYY-MM-DD`.
    pub end_date: Option<String>,
}

/// A route handler that fetches the first page of transactions for an item.
///
/// The upstream response is returned verbatim.
pub async fn sync_transactions_endpoint(
    State(state): State<TransactionsState>,
    Json(body): Json<SyncTransactionsBody>,
) -> Result<Json<Value>, Error> {
    let response = state
        .plaid_client
        .transactions(
            &body.access_token,
            body.start_date.as_deref(),
            body.end_date.as_deref(),
            DEFAULT_PAGE_SIZE,
            0,
        )
        .await?;

    Ok(Json(response))
}

/// The request body for fetching a page of transactions.
#[derive(Debug, Deserialize)]
pub struct GetTransactionsBody {
    /// The access token for the linked item.
    pub access_token: String,
    /// The first day to fetch, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// The last day to fetch, `YYYY-MM-DD`.
    pub end_date: Option<String>,
    /// How many transactions to fetch, defaults to 100.
    #[serde(default = "default_count")]
    pub count: u32,
    /// How many transactions to skip, defaults to 0.
    #[serde(default)]
    pub offset: u32,
}

fn default_count() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// A route handler that fetches a chosen page of transactions for an item.
///
/// The upstream response is returned verbatim.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionsState>,
    Json(body): Json<GetTransactionsBody>,
) -> Result<Json<Value>, Error> {
    let response = state
        .plaid_client
        .transactions(
            &body.access_token,
            body.start_date.as_deref(),
            body.end_date.as_deref(),
            body.count,
            body.offset,
        )
        .await?;

    Ok(Json(response))
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod get_transactions_tests {
    use axum::{Json, Router, routing::post};
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        endpoints,
        relay::testing::{spawn_fake_upstream, test_app_state},
        routing::build_router,
    };

    fn upstream_expecting(count: u64, offset: u64) -> Router {
        Router::new().route(
            "/transactions/get",
            post(move |Json(body): Json<Value>| async move {
                assert_eq!(body["options"]["count"], count);
                assert_eq!(body["options"]["offset"], offset);

                Json(json!({ "transactions": [], "total_transactions": 250 }))
            }),
        )
    }

    #[tokio::test]
    async fn forwards_the_requested_page() {
        let base_url = spawn_fake_upstream(upstream_expecting(50, 200)).await;
        let server = TestServer::new(build_router(test_app_state(&base_url)))
            .expect("Could not create test server.");

        let response = server
            .post(endpoints::TRANSACTIONS_GET)
            .json(&json!({
                "access_token": "access-sandbox-123",
                "count": 50,
                "offset": 200,
            }))
            .await;

        response.assert_status_ok();
    }

    #[tokio::test]
    async fn count_and_offset_default_to_100_and_0() {
        let base_url = spawn_fake_upstream(upstream_expecting(100, 0)).await;
        let server = TestServer::new(build_router(test_app_state(&base_url)))
            .expect("Could not create test server.");

        let response = server
            .post(endpoints::TRANSACTIONS_GET)
            .json(&json!({ "access_token": "access-sandbox-123" }))
            .await;

        response.assert_status_ok();
    }
}
