//! The HTTP client for the upstream financial-data API.
//!
//! The relay performs no business logic of its own: each method sends one
//! typed request to Plaid and hands the JSON response back verbatim. There
//! are no retries, a failed call is reported to the relay's client as-is.

use std::{fmt::Display, str::FromStr, time::Duration};

use serde::Serialize;
use serde_json::Value;

use crate::{Error, ledger::unix_time_millis};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(15);

/// The Plaid environment the relay forwards requests to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaidEnvironment {
    /// The sandbox environment with fake credentials and data.
    #[default]
    Sandbox,
    /// The development environment for testing with real accounts.
    Development,
    /// The production environment.
    Production,
}

impl PlaidEnvironment {
    /// The base URL requests are sent to in this environment.
    pub fn base_url(&self) -> &'static str {
        match self {
            PlaidEnvironment::Sandbox => "https://sandbox.plaid.com",
            PlaidEnvironment::Development => "https://development.plaid.com",
            PlaidEnvironment::Production => "https://production.plaid.com",
        }
    }
}

impl Display for PlaidEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaidEnvironment::Sandbox => write!(f, "sandbox"),
            PlaidEnvironment::Development => write!(f, "development"),
            PlaidEnvironment::Production => write!(f, "production"),
        }
    }
}

impl FromStr for PlaidEnvironment {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "sandbox" => Ok(PlaidEnvironment::Sandbox),
            "development" => Ok(PlaidEnvironment::Development),
            "production" => Ok(PlaidEnvironment::Production),
            other => Err(format!(
                "unknown Plaid environment '{other}', expected sandbox, development or production"
            )),
        }
    }
}

/// A client for the Plaid REST API.
///
/// Credentials are sent as the `PLAID-CLIENT-ID` and `PLAID-SECRET` headers
/// on every request.
#[derive(Debug, Clone)]
pub struct PlaidClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    secret: String,
}

impl PlaidClient {
    /// Create a client that sends requests to `environment`.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(
        environment: PlaidEnvironment,
        client_id: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self, Error> {
        Self::with_base_url(environment.base_url(), client_id, secret)
    }

    /// Create a client that sends requests to `base_url`.
    ///
    /// Tests use this to point the client at a fake upstream server.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn with_base_url(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            client_id: client_id.into(),
            secret: secret.into(),
        })
    }

    /// Create a link token for starting the account-linking flow.
    ///
    /// The request parameters are fixed: the app always links US accounts
    /// with the `auth` and `transactions` products, and identifies the user
    /// by a fresh timestamp-derived ID.
    pub async fn create_link_token(&self) -> Result<Value, Error> {
        let request = LinkTokenCreateRequest {
            user: LinkTokenUser {
                client_user_id: format!("user-{}", unix_time_millis()),
            },
            client_name: "Budget Tracker",
            products: ["auth", "transactions"],
            country_codes: ["US"],
            language: "en",
        };

        self.post("/link/token/create", &request).await
    }

    /// Exchange a public token from the link flow for an access token.
    pub async fn exchange_public_token(&self, public_token: &str) -> Result<Value, Error> {
        self.post(
            "/item/public_token/exchange",
            &ExchangePublicTokenRequest { public_token },
        )
        .await
    }

    /// Fetch the current balances of all accounts behind `access_token`.
    pub async fn accounts_balance(&self, access_token: &str) -> Result<Value, Error> {
        self.post("/accounts/balance/get", &AccessTokenRequest { access_token })
            .await
    }

    /// Fetch a page of transactions for the accounts behind `access_token`.
    pub async fn transactions(
        &self,
        access_token: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
        count: u32,
        offset: u32,
    ) -> Result<Value, Error> {
        let request = TransactionsGetRequest {
            access_token,
            start_date,
            end_date,
            options: TransactionsGetOptions { count, offset },
        };

        self.post("/transactions/get", &request).await
    }

    /// Remove the item behind `access_token`, disconnecting its accounts.
    pub async fn remove_item(&self, access_token: &str) -> Result<Value, Error> {
        self.post("/item/remove", &AccessTokenRequest { access_token })
            .await
    }

    async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Value, Error> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header("PLAID-CLIENT-ID", &self.client_id)
            .header("PLAID-SECRET", &self.secret)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(Error::UpstreamApi(upstream_error_message(status, &text)));
        }

        serde_json::from_str(&text)
            .map_err(|error| Error::UpstreamApi(format!("invalid JSON from upstream: {error}")))
    }
}

/// Summarize a failed upstream response.
///
/// Plaid error bodies carry an `error_message` field, which is pulled out
/// when present so the relay's client sees the actual cause instead of a raw
/// JSON blob.
fn upstream_error_message(status: reqwest::StatusCode, body: &str) -> String {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(|value| value.get("error_message"))
        .and_then(Value::as_str)
        .map(str::to_owned);

    match message {
        Some(message) => format!("upstream responded with {status}: {message}"),
        None => format!("upstream responded with {status}"),
    }
}

#[derive(Debug, Serialize)]
struct LinkTokenUser {
    client_user_id: String,
}

#[derive(Debug, Serialize)]
struct LinkTokenCreateRequest {
    user: LinkTokenUser,
    client_name: &'static str,
    products: [&'static str; 2],
    country_codes: [&'static str; 1],
    language: &'static str,
}

#[derive(Debug, Serialize)]
struct ExchangePublicTokenRequest<'a> {
    public_token: &'a str,
}

#[derive(Debug, Serialize)]
struct AccessTokenRequest<'a> {
    access_token: &'a str,
}

#[derive(Debug, Serialize)]
struct TransactionsGetRequest<'a> {
    access_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<&'a str>,
    options: TransactionsGetOptions,
}

#[derive(Debug, Serialize)]
struct TransactionsGetOptions {
    count: u32,
    offset: u32,
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod upstream_error_message_tests {
    use reqwest::StatusCode;

    use super::upstream_error_message;

    #[test]
    fn uses_the_plaid_error_message_when_present() {
        let body = r#"{"error_code": "INVALID_ACCESS_TOKEN", "error_message": "the access token is invalid"}"#;

        let got = upstream_error_message(StatusCode::BAD_REQUEST, body);

        assert_eq!(
            got,
            "upstream responded with 400 Bad Request: the access token is invalid"
        );
    }

    #[test]
    fn falls_back_to_the_status_for_non_json_bodies() {
        let got = upstream_error_message(StatusCode::BAD_GATEWAY, "<html>nope</html>");

        assert_eq!(got, "upstream responded with 502 Bad Gateway");
    }
}
