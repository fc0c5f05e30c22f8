//! The API endpoint URIs served by the relay.

/// The health check route.
pub const HEALTH: &str = "/api/health";
/// The route to create a link token for the account-linking flow.
pub const CREATE_LINK_TOKEN: &str = "/api/create_link_token";
/// The route to exchange a public token for an access token.
pub const EXCHANGE_PUBLIC_TOKEN: &str = "/api/exchange_public_token";
/// The route to fetch account balances for a linked item.
pub const ACCOUNTS_BALANCE: &str = "/api/accounts/balance";
/// The route to fetch the first page of transactions for a linked item.
pub const TRANSACTIONS_SYNC: &str = "/api/transactions/sync";
/// The route to fetch a chosen page of transactions for a linked item.
pub const TRANSACTIONS_GET: &str = "/api/transactions/get";
/// The route to disconnect a linked item.
pub const ITEM_REMOVE: &str = "/api/item/remove";

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::HEALTH);
        assert_endpoint_is_valid_uri(endpoints::CREATE_LINK_TOKEN);
        assert_endpoint_is_valid_uri(endpoints::EXCHANGE_PUBLIC_TOKEN);
        assert_endpoint_is_valid_uri(endpoints::ACCOUNTS_BALANCE);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_SYNC);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_GET);
        assert_endpoint_is_valid_uri(endpoints::ITEM_REMOVE);
    }
}
