//! The backend relay: a thin proxy between the mobile app and the Plaid
//! financial-data API.
//!
//! Each endpoint forwards the request body fields upstream and returns the
//! upstream JSON verbatim. Any failure answers HTTP 500 with
//! `{"error": message}`. The only state the relay keeps is the table of
//! access tokens written during the link flow.

mod accounts;
mod client;
mod health;
mod item;
mod link;
mod tokens;
mod transactions;

pub use accounts::accounts_balance_endpoint;
pub use client::{PlaidClient, PlaidEnvironment};
pub use health::health_endpoint;
pub use item::remove_item_endpoint;
pub use link::{create_link_token_endpoint, exchange_public_token_endpoint};
pub use tokens::{create_access_token_table, delete_access_tokens, store_access_token};
pub use transactions::{get_transactions_endpoint, sync_transactions_endpoint};
