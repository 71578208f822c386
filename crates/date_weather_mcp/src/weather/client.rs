use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::config::Config;
use crate::core::error::{DateWeatherError, DateWeatherResult};

const DEFAULT_USER_AGENT: &str = concat!("mcp-server-date-weather/", env!("CARGO_PKG_VERSION"));
const MAX_ERROR_BODY: usize = 200;

/// Error body returned by Open-Meteo endpoints, e.g. `{"error": true, "reason": "..."}`
#[derive(Debug, Deserialize)]
struct ProviderError {
    reason: String,
}

/// Build the shared HTTP client with connect and request timeouts
pub fn build_client(config: &Config) -> DateWeatherResult<Client> {
    let user_agent = config
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

    Client::builder()
        .connect_timeout(config.timeout)
        .timeout(config.timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| DateWeatherError::upstream("http client", e.to_string()))
}

/// Issue one GET request and decode the JSON body. Any transport failure,
/// non-success status or undecodable body is an upstream error.
pub async fn get_json<T, Q>(
    client: &Client,
    endpoint: &str,
    url: &str,
    query: &Q,
) -> DateWeatherResult<T>
where
    T: DeserializeOwned,
    Q: Serialize + ?Sized,
{
    tracing::debug!("GET {} ({})", url, endpoint);

    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| DateWeatherError::from_transport(endpoint, e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| DateWeatherError::from_transport(endpoint, e))?;

    if !status.is_success() {
        let detail = serde_json::from_str::<ProviderError>(&body)
            .map(|e| e.reason)
            .unwrap_or_else(|_| truncate_body(&body));
        return Err(DateWeatherError::upstream(
            endpoint,
            format!("HTTP {}: {}", status, detail),
        ));
    }

    serde_json::from_str(&body).map_err(|e| {
        DateWeatherError::upstream(endpoint, format!("unexpected response payload: {}", e))
    })
}

fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(timeout: Duration) -> Client {
        let config = Config {
            timeout,
            ..Config::default()
        };
        build_client(&config).unwrap()
    }

    #[tokio::test]
    async fn test_get_json_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "New York"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let url = format!("{}/v1/search", server.uri());
        let value: Value = get_json(
            &test_client(Duration::from_secs(5)),
            "geocoding",
            &url,
            &[("name", "New York")],
        )
        .await
        .unwrap();

        assert_eq!(value["ok"], true);
    }

    #[tokio::test]
    async fn test_provider_error_reason_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"error": true, "reason": "Latitude must be in range"})),
            )
            .mount(&server)
            .await;

        let err = get_json::<Value, _>(
            &test_client(Duration::from_secs(5)),
            "forecast",
            &server.uri(),
            &[("latitude", "91")],
        )
        .await
        .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("400"));
        assert!(message.contains("Latitude must be in range"));
    }

    #[tokio::test]
    async fn test_non_json_body_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let err = get_json::<Value, [(&str, &str)]>(
            &test_client(Duration::from_secs(5)),
            "forecast",
            &server.uri(),
            &[],
        )
        .await
        .unwrap_err();

        assert!(matches!(err, DateWeatherError::Upstream { .. }));
        assert!(err.to_string().contains("unexpected response payload"));
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let err = get_json::<Value, [(&str, &str)]>(
            &test_client(Duration::from_millis(100)),
            "forecast",
            &server.uri(),
            &[],
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("short"), "short");
        let long = "é".repeat(MAX_ERROR_BODY + 10);
        assert!(truncate_body(&long).ends_with("..."));
    }
}
