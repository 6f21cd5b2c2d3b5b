//! HTTP client for the Sonar GraphQL endpoint

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use sonar_core::{SonarConfig, SonarResult, Transport, TransportError};
use tracing::{debug, info, instrument};

use crate::response;

#[derive(Serialize)]
struct RequestBody<'a> {
    query: &'a str,
    variables: &'a Value,
}

/// Sonar API client
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct SonarClient {
    http: Client,
    endpoint: String,
    api_key: String,
}

impl SonarClient {
    pub fn new(config: &SonarConfig) -> SonarResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .gzip(true)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let endpoint = config.graphql_endpoint();
        info!(endpoint = %endpoint, "Created Sonar client");

        Ok(Self {
            http,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl fmt::Debug for SonarClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SonarClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl Transport for SonarClient {
    #[instrument(skip_all, fields(endpoint = %self.endpoint))]
    async fn execute(&self, query: &str, variables: &Value) -> Result<Value, TransportError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&RequestBody { query, variables })
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        debug!(status, bytes = body.len(), "Received GraphQL response");
        response::interpret(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sonar_core::SonarError;

    #[test]
    fn test_client_uses_graphql_endpoint() {
        let client = SonarClient::new(&SonarConfig::new("https://isp.sonar.software/", "key")).unwrap();
        assert_eq!(client.endpoint(), "https://isp.sonar.software/api/graphql");
    }

    #[test]
    fn test_invalid_url_is_config_error() {
        let err = SonarClient::new(&SonarConfig::new("not a url", "key")).unwrap_err();
        assert!(matches!(err, SonarError::Config(_)));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = SonarClient::new(&SonarConfig::new("https://isp.sonar.software", "s3cret")).unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn test_request_body_shape() {
        let variables = json!({"sorter": {"attribute": "id", "direction": "ASC"}});
        let body = serde_json::to_value(RequestBody {
            query: "query { tickets { entities { id } } }",
            variables: &variables,
        })
        .unwrap();

        assert_eq!(body["query"], "query { tickets { entities { id } } }");
        assert_eq!(body["variables"], variables);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_request_error() {
        let mut config = SonarConfig::new("http://127.0.0.1:9", "key");
        config.timeout_seconds = 2;
        let client = SonarClient::new(&config).unwrap();

        let err = client.execute("query { ping }", &json!({})).await.unwrap_err();
        assert!(matches!(err, TransportError::Request(_)));
    }
}
