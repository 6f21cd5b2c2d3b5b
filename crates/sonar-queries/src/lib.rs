//! # sonar-queries
//!
//! Query layer for the Sonar GraphQL API.
//!
//! This crate turns fluent filter, sort and pagination calls into a GraphQL
//! document plus its variables, runs it through a [`sonar_core::Transport`],
//! and decodes the response envelope into typed resources.
//!
//! ## Structure
//!
//! - `filters` - Filter model and the `search` payload
//! - `sorts` - Sort directions and the `sorter` payload
//! - `paginator` - The `paginator` payload
//! - `relation` - Nested relation clauses and reverse relation filters
//! - `query` - Clause options and the pure query renderer
//! - `builder` - Fluent `QuerySpec` and its terminal operations
//! - `executor` - Hands a plan to the transport
//! - `decoder` - Response envelope decoding for collections and pages
//! - `mutation` - Single-field mutations
//!
//! ## Example
//!
//! ```
//! use serde_json::Value;
//! use sonar_queries::QuerySpec;
//!
//! let query = QuerySpec::<Value>::new("tickets")
//!     .where_eq("ticketable_type", "Account")
//!     .where_op("status", "!=", "CLOSED")
//!     .sort_desc("updated_at")
//!     .to_graphql()
//!     .unwrap();
//!
//! assert!(query.query.starts_with("query($search: Search, $sorter: Sorter)"));
//! assert_eq!(query.variables["sorter"]["direction"], "DESC");
//! assert_eq!(query.variables["search"]["string_fields"][1]["match"], false);
//! ```

pub mod builder;
pub mod decoder;
pub mod executor;
pub mod filters;
pub mod mutation;
pub mod paginator;
pub mod query;
pub mod relation;
pub mod sorts;

// Re-exports for convenience
pub use builder::QuerySpec;
pub use filters::{
    FilterError, FilterModel, FilterOperator, FilterValue, IntoFilterValues, SearchPayload,
};
pub use mutation::{MutationInput, MutationSpec};
pub use paginator::Paginator;
pub use query::{GraphqlQuery, QueryOptions, QueryPlan};
pub use relation::{RelationFilter, RelationOptions, RelationQuery};
pub use sorts::{SortDirection, Sorter};
