//! GraphQL response envelope

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sonar_core::{DecodeError, TransportError};
use tracing::warn;

/// Body of a GraphQL response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Vec<GraphqlErrorEntry>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlErrorEntry {
    pub message: String,
    #[serde(default)]
    pub path: Vec<Value>,
}

impl GraphqlResponse {
    /// Error messages, empty when the response succeeded
    pub fn error_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .flatten()
            .map(|e| e.message.clone())
            .collect()
    }

    /// Resolve into the `data` payload.
    ///
    /// Any reported error fails the whole response, even when partial data
    /// came back. A response without data resolves to `null`.
    pub fn into_data(self) -> Result<Value, TransportError> {
        let messages = self.error_messages();
        if !messages.is_empty() {
            warn!(count = messages.len(), errors = ?messages, "GraphQL response contained errors");
            return Err(TransportError::Graphql { messages });
        }
        Ok(self.data.unwrap_or(Value::Null))
    }
}

/// Interpret a raw HTTP status and body
pub fn interpret(status: u16, body: &str) -> Result<Value, TransportError> {
    if !(200..300).contains(&status) {
        return Err(TransportError::Status {
            status,
            body: body.to_string(),
        });
    }

    let response: GraphqlResponse = serde_json::from_str(body)
        .map_err(|e| DecodeError::InvalidBody(e.to_string()))?;
    response.into_data()
}
