//! # sonar-client
//!
//! HTTP [`Transport`](sonar_core::Transport) for a Sonar instance.
//!
//! Requests are POSTed as `{query, variables}` to `<url>/api/graphql`
//! with the API key as a bearer token. GraphQL-level errors in a 2xx
//! response are surfaced as transport errors.

pub mod client;
pub mod response;

pub use client::SonarClient;
pub use response::{GraphqlErrorEntry, GraphqlResponse};
