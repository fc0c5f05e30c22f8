//! Implements a struct that holds the state of the relay server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::relay::PlaidClient;

/// The state of the relay server.
///
/// Route handlers take narrower per-endpoint states extracted from this via
/// `FromRef`, so each handler only sees what it needs.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The client for the upstream financial-data API.
    pub plaid_client: PlaidClient,
    /// The database connection holding the access token table.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState].
    pub fn new(plaid_client: PlaidClient, db_connection: Arc<Mutex<Connection>>) -> Self {
        Self {
            plaid_client,
            db_connection,
        }
    }
}
