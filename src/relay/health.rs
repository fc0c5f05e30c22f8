//! Defines the health check endpoint.

use axum::Json;
use serde_json::{Value, json};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::Error;

/// A route handler reporting that the relay is up.
pub async fn health_endpoint() -> Result<Json<Value>, Error> {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|error| Error::SerializationError(error.to_string()))?;

    Ok(Json(json!({ "status": "ok", "timestamp": timestamp })))
}

#[cfg(test)]
mod health_tests {
    use time::format_description::well_known::Rfc3339;

    use super::health_endpoint;

    #[tokio::test]
    async fn reports_ok_with_a_timestamp() {
        let Ok(response) = health_endpoint().await else {
            panic!("want a healthy response");
        };

        assert_eq!(response.0["status"], "ok");

        let timestamp = response.0["timestamp"]
            .as_str()
            .expect("want a timestamp string");
        assert!(
            time::OffsetDateTime::parse(timestamp, &Rfc3339).is_ok(),
            "want an RFC 3339 timestamp, got {timestamp}"
        );
    }
}
