//! Transport abstraction
//!
//! The query layer hands rendered query text and variables to a
//! [`Transport`] and gets back the `data` member of the GraphQL response.
//! Retries and timeouts, if any, belong to the implementation.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::error::TransportError;

/// Executes a GraphQL document against the remote endpoint
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, query: &str, variables: &Value) -> Result<Value, TransportError>;
}

#[async_trait]
impl<'a, T: Transport + ?Sized> Transport for &'a T {
    async fn execute(&self, query: &str, variables: &Value) -> Result<Value, TransportError> {
        (**self).execute(query, variables).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, query: &str, variables: &Value) -> Result<Value, TransportError> {
        (**self).execute(query, variables).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn execute(&self, query: &str, variables: &Value) -> Result<Value, TransportError> {
        (**self).execute(query, variables).await
    }
}

/// A request seen by [`MemoryTransport`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub query: String,
    pub variables: Value,
}

/// In-memory transport for tests and dry runs.
///
/// Answers with queued results in order; once the queue is drained every
/// call gets a `Request` error.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    responses: Mutex<VecDeque<Result<Value, TransportError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful `data` payload
    pub fn respond(self, data: Value) -> Self {
        self.responses.lock().push_back(Ok(data));
        self
    }

    /// Queue a transport failure
    pub fn fail(self, error: TransportError) -> Self {
        self.responses.lock().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().last().cloned()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn execute(&self, query: &str, variables: &Value) -> Result<Value, TransportError> {
        self.requests.lock().push(RecordedRequest {
            query: query.to_string(),
            variables: variables.clone(),
        });

        let response = self.responses.lock().pop_front();
        debug!(queued = response.is_some(), "Memory transport request recorded");
        response.unwrap_or_else(|| Err(TransportError::Request("no response queued".into())))
    }
}
