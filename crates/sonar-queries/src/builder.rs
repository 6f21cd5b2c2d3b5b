//! Query Builder
//!
//! Fluent API for constructing a collection query against one remote
//! object, plus the terminal operations that run it.
//!
//! Fluent calls never fail on the spot: the first malformed call is kept and
//! reported by the next render or terminal operation. Terminal operations
//! take `&self` and build a fresh [`QueryPlan`] each time, so paginating
//! never leaves state behind on the builder.

use std::fmt;
use std::marker::PhantomData;

use sonar_core::{
    PageRequest, PaginatedResult, RemoteResource, SonarResult, Transport, WireDecodable,
};
use tracing::info;

use crate::decoder;
use crate::executor;
use crate::filters::{FilterError, FilterModel, FilterOperator, IntoFilterValues};
use crate::paginator::Paginator;
use crate::query::{GraphqlQuery, QueryOptions, QueryPlan};
use crate::relation::{RelationFilter, RelationOptions, RelationQuery};
use crate::sorts::{SortDirection, Sorter};

/// A collection query for resources of kind `R`
pub struct QuerySpec<R> {
    object_name: String,
    filters: FilterModel,
    sorter: Option<Sorter>,
    relations: Vec<RelationOptions>,
    relation_filters: Vec<RelationFilter>,
    invalid: Option<FilterError>,
    _resource: PhantomData<fn() -> R>,
}

impl<R: RemoteResource> QuerySpec<R> {
    /// Query the resource's own remote collection
    pub fn for_resource() -> Self {
        Self::new(R::OBJECT_NAME)
    }
}

impl<R: WireDecodable> QuerySpec<R> {
    /// Create a query against `object_name`, typed by the resource schema
    pub fn new(object_name: impl Into<String>) -> Self {
        Self {
            object_name: object_name.into(),
            filters: FilterModel::with_schema(R::field_types()),
            sorter: None,
            relations: vec![],
            relation_filters: vec![],
            invalid: None,
            _resource: PhantomData,
        }
    }

    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    pub fn filters(&self) -> &FilterModel {
        &self.filters
    }

    pub fn sorter(&self) -> Option<&Sorter> {
        self.sorter.as_ref()
    }

    // Filter methods

    /// Filter `field` equal to one value, or to any of several
    pub fn where_eq(self, field: impl Into<String>, values: impl IntoFilterValues) -> Self {
        self.constrain(field, FilterOperator::Equals, values)
    }

    /// Filter `field` not equal to each given value
    pub fn where_ne(self, field: impl Into<String>, values: impl IntoFilterValues) -> Self {
        self.constrain(field, FilterOperator::NotEquals, values)
    }

    /// Filter with a textual operator (`=` or `!=`)
    pub fn where_op(
        mut self,
        field: impl Into<String>,
        operator: &str,
        values: impl IntoFilterValues,
    ) -> Self {
        match FilterOperator::from_str(operator) {
            Some(operator) => self.constrain(field, operator, values),
            None => {
                self.invalid
                    .get_or_insert(FilterError::UnknownOperator(operator.to_string()));
                self
            }
        }
    }

    fn constrain(
        mut self,
        field: impl Into<String>,
        operator: FilterOperator,
        values: impl IntoFilterValues,
    ) -> Self {
        if self.invalid.is_none() {
            if let Err(e) = self
                .filters
                .add(field, operator, values.into_filter_values())
            {
                self.invalid = Some(e);
            }
        }
        self
    }

    // Sort methods

    /// Sort by an attribute, replacing any earlier sort
    pub fn sort_by(mut self, attribute: impl Into<String>, direction: SortDirection) -> Self {
        self.sorter = Some(Sorter::new(attribute, direction));
        self
    }

    pub fn sort_asc(self, attribute: impl Into<String>) -> Self {
        self.sort_by(attribute, SortDirection::Asc)
    }

    pub fn sort_desc(self, attribute: impl Into<String>) -> Self {
        self.sort_by(attribute, SortDirection::Desc)
    }

    pub fn unsorted(mut self) -> Self {
        self.sorter = None;
        self
    }

    // Relation methods

    /// Filter or sort a nested relation of the selection, replacing earlier
    /// clauses for the same relation. Rendering fails if the resource does
    /// not select `relation`.
    pub fn with<F>(mut self, relation: impl Into<String>, clauses: F) -> Self
    where
        F: FnOnce(RelationQuery) -> RelationQuery,
    {
        match clauses(RelationQuery::new()).into_options(relation.into()) {
            Ok(options) => {
                self.relations.retain(|r| r.relation != options.relation);
                self.relations.push(options);
            }
            Err(e) => {
                self.invalid.get_or_insert(e);
            }
        }
        self
    }

    /// Keep only records with a related record matching `clauses`
    pub fn where_has<F>(mut self, relation: impl Into<String>, clauses: F) -> Self
    where
        F: FnOnce(RelationQuery) -> RelationQuery,
    {
        match clauses(RelationQuery::new()).into_filter(relation.into()) {
            Ok(filter) => self.relation_filters.push(filter),
            Err(e) => {
                self.invalid.get_or_insert(e);
            }
        }
        self
    }

    // Rendering

    /// Clauses for this query, with a paginator if a page is requested
    pub fn options(&self, page: Option<&PageRequest>) -> SonarResult<QueryOptions> {
        if let Some(err) = &self.invalid {
            return Err(err.clone().into());
        }

        Ok(QueryOptions {
            search: self.filters.to_search(),
            relation_filters: self.relation_filters.clone(),
            sorter: self.sorter.clone(),
            paginator: page.map(Paginator::from),
            relations: self.relations.clone(),
        })
    }

    /// Plan for fetching the full collection
    pub fn plan(&self) -> SonarResult<QueryPlan> {
        self.build_plan(None)
    }

    /// Plan for fetching one page
    pub fn page_plan(&self, request: PageRequest) -> SonarResult<QueryPlan> {
        self.build_plan(Some(request))
    }

    fn build_plan(&self, page: Option<PageRequest>) -> SonarResult<QueryPlan> {
        let query = self
            .options(page.as_ref())?
            .render(&self.object_name, &R::selection())?;

        Ok(QueryPlan {
            object_name: self.object_name.clone(),
            query,
            page,
        })
    }

    /// Query document and variables without pagination
    pub fn to_graphql(&self) -> SonarResult<GraphqlQuery> {
        Ok(self.plan()?.query)
    }

    // Terminal operations

    /// Fetch every matching resource.
    ///
    /// Fails with `ResourceNotFound` if the backend returns no entity list;
    /// an empty list is a successful empty result.
    pub async fn get<T>(&self, transport: &T) -> SonarResult<Vec<R>>
    where
        T: Transport + ?Sized,
    {
        let plan = self.plan()?;
        let response = executor::fetch(transport, &plan).await?;
        let items = decoder::decode_collection(&response, &self.object_name)?;

        info!(object = %self.object_name, count = items.len(), "Fetched resources");
        Ok(items)
    }

    /// Fetch the first matching resource, `None` when nothing matches
    pub async fn first<T>(&self, transport: &T) -> SonarResult<Option<R>>
    where
        T: Transport + ?Sized,
    {
        Ok(self.get(transport).await?.into_iter().next())
    }

    /// Fetch one page of `per_page` resources
    pub async fn paginate<T>(
        &self,
        transport: &T,
        per_page: u32,
        page: u32,
        base_path: impl Into<String>,
    ) -> SonarResult<PaginatedResult<R>>
    where
        T: Transport + ?Sized,
    {
        let request = PageRequest::new(per_page, page, base_path)?;
        self.fetch_page(transport, request).await
    }

    /// Fetch the page described by `request`
    pub async fn fetch_page<T>(
        &self,
        transport: &T,
        request: PageRequest,
    ) -> SonarResult<PaginatedResult<R>>
    where
        T: Transport + ?Sized,
    {
        let plan = self.page_plan(request.clone())?;
        let response = executor::fetch(transport, &plan).await?;
        let page = decoder::decode_page(&response, &self.object_name, &request)?;

        info!(
            object = %self.object_name,
            page = page.page,
            count = page.len(),
            total_count = page.total_count,
            "Fetched page"
        );
        Ok(page)
    }
}

impl<R> Clone for QuerySpec<R> {
    fn clone(&self) -> Self {
        Self {
            object_name: self.object_name.clone(),
            filters: self.filters.clone(),
            sorter: self.sorter.clone(),
            relations: self.relations.clone(),
            relation_filters: self.relation_filters.clone(),
            invalid: self.invalid.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R> fmt::Debug for QuerySpec<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuerySpec")
            .field("object_name", &self.object_name)
            .field("filters", &self.filters)
            .field("sorter", &self.sorter)
            .field("relations", &self.relations)
            .field("relation_filters", &self.relation_filters)
            .field("invalid", &self.invalid)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use serde_json::{json, Value};
    use sonar_core::{
        from_json, DecodeError, FieldType, MemoryTransport, Selection, SonarError, TransportError,
    };

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Ticket {
        id: i64,
        subject: String,
    }

    impl WireDecodable for Ticket {
        fn selection() -> Selection {
            Selection::fields(["id", "subject"])
        }

        fn field_types() -> &'static [(&'static str, FieldType)] {
            &[("id", FieldType::Integer), ("status", FieldType::String)]
        }

        fn from_wire(raw: &Value) -> Result<Self, DecodeError> {
            from_json(raw)
        }
    }

    impl RemoteResource for Ticket {
        const OBJECT_NAME: &'static str = "tickets";
    }

    fn tickets() -> QuerySpec<Ticket> {
        QuerySpec::for_resource()
    }

    fn ticket(id: i64) -> Value {
        json!({"id": id, "subject": format!("Ticket {}", id)})
    }

    #[test]
    fn test_integer_equals_emits_one_entry_per_value() {
        let query = tickets().where_eq("id", vec![1, 2, 3]).to_graphql().unwrap();

        assert_eq!(
            query.variables["search"]["integer_fields"],
            json!([
                {"attribute": "id", "search_value": 1, "operator": "EQ"},
                {"attribute": "id", "search_value": 2, "operator": "EQ"},
                {"attribute": "id", "search_value": 3, "operator": "EQ"}
            ])
        );
        assert_eq!(query.variables["search"]["string_fields"], json!([]));
    }

    #[test]
    fn test_string_not_equals_never_matches() {
        let query = tickets()
            .where_ne("status", ["Closed", "Resolved"])
            .to_graphql()
            .unwrap();

        assert_eq!(
            query.variables["search"]["string_fields"],
            json!([
                {"attribute": "status", "search_value": "Closed", "match": false},
                {"attribute": "status", "search_value": "Resolved", "match": false}
            ])
        );
    }

    #[test]
    fn test_repeated_filters_accumulate() {
        let query = tickets()
            .where_eq("id", vec![1, 2, 3])
            .where_op("id", "!=", 4)
            .to_graphql()
            .unwrap();

        let entries = query.variables["search"]["integer_fields"]
            .as_array()
            .unwrap()
            .clone();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries.iter().filter(|e| e["operator"] == "EQ").count(), 3);
        assert_eq!(entries[3], json!({"attribute": "id", "search_value": 4, "operator": "NEQ"}));
    }

    #[test]
    fn test_inferred_type_is_sticky() {
        let query = QuerySpec::<Value>::new("tickets")
            .where_eq("ticket_group_id", 7)
            .where_eq("ticket_group_id", "seven");

        let err = query.to_graphql().unwrap_err();
        assert!(matches!(err, SonarError::InvalidArgument(_)));
        assert_eq!(
            query.filters().field_type("ticket_group_id"),
            Some(FieldType::Integer)
        );
    }

    #[test]
    fn test_declared_type_wins_over_first_value() {
        let err = tickets().where_eq("id", "12").to_graphql().unwrap_err();
        assert!(matches!(err, SonarError::InvalidArgument(_)));
    }

    #[test]
    fn test_unknown_operator_is_deferred() {
        let query = tickets().where_op("id", ">", 4).sort_desc("id");
        let err = query.plan().unwrap_err();
        assert!(matches!(err, SonarError::InvalidArgument(ref m) if m.contains('>')));
    }

    #[test]
    fn test_first_error_is_kept() {
        let query = tickets()
            .where_op("id", "<", 1)
            .where_eq("subject", Vec::<String>::new());
        match query.to_graphql().unwrap_err() {
            SonarError::InvalidArgument(message) => assert!(message.contains('<')),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unconfigured_query_is_bare() {
        let query = tickets().to_graphql().unwrap();
        assert_eq!(query.query, "query { tickets { entities { id subject } } }");
        assert_eq!(query.variables, json!({}));
    }

    #[test]
    fn test_sort_replaces_previous_sort() {
        let query = tickets().sort_asc("id").sort_desc("updated_at");
        assert_eq!(query.sorter(), Some(&Sorter::desc("updated_at")));

        let query = query.unsorted();
        assert!(!query.to_graphql().unwrap().has_variable("sorter"));
    }

    #[tokio::test]
    async fn test_where_has_sends_reverse_relation_filters() {
        let transport = MemoryTransport::new().respond(json!({"tickets": {"entities": [ticket(5)]}}));

        let found = tickets()
            .where_eq("status", "OPEN")
            .where_has("accounts", |accounts| accounts.where_eq("id", 1001))
            .where_has("ticket_replies", |replies| replies)
            .get(&transport)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        let request = transport.last_request().unwrap();
        assert!(request.query.starts_with(
            "query($search: Search, $reverse_relation_filters: [ReverseRelationFilter]) { \
             tickets(search: [$search], reverse_relation_filters: $reverse_relation_filters)"
        ));
        assert_eq!(
            request.variables["reverse_relation_filters"],
            json!([
                {"relation": "accounts", "search": [{
                    "integer_fields": [{"attribute": "id", "search_value": 1001, "operator": "EQ"}],
                    "string_fields": []
                }]},
                {"relation": "ticket_replies", "search": []}
            ])
        );
    }

    #[tokio::test]
    async fn test_sorted_where_has_never_reaches_transport() {
        let transport = MemoryTransport::new();
        let err = tickets()
            .where_has("accounts", |accounts| accounts.sort_asc("id"))
            .get(&transport)
            .await
            .unwrap_err();

        assert!(matches!(err, SonarError::InvalidArgument(msg) if msg.contains("`accounts`")));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_with_unselected_relation_never_reaches_transport() {
        let transport = MemoryTransport::new();
        let err = tickets()
            .with("ticket_replies", |replies| replies.sort_desc("created_at"))
            .first(&transport)
            .await
            .unwrap_err();

        assert!(matches!(err, SonarError::InvalidArgument(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn test_relation_errors_are_deferred() {
        let query = tickets()
            .with("subject", |r| r.where_op("id", "~", 1))
            .where_eq("id", "one");

        let err = query.to_graphql().unwrap_err();
        assert_eq!(
            err.to_string(),
            SonarError::from(FilterError::UnknownOperator("~".into())).to_string()
        );
    }

    #[tokio::test]
    async fn test_get_decodes_entities() {
        let transport = MemoryTransport::new()
            .respond(json!({"tickets": {"entities": [ticket(3), ticket(1)]}}));

        let found = tickets().where_eq("id", [3, 1]).get(&transport).await.unwrap();
        assert_eq!(found.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3, 1]);

        let request = transport.last_request().unwrap();
        assert!(request.query.starts_with("query($search: Search)"));
        assert!(!request.query.contains("page_info"));
    }

    #[tokio::test]
    async fn test_get_null_entities_is_not_found() {
        let transport = MemoryTransport::new().respond(json!({"tickets": {"entities": null}}));
        let err = tickets().get(&transport).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_get_empty_entities_is_empty() {
        let transport = MemoryTransport::new().respond(json!({"tickets": {"entities": []}}));
        assert!(tickets().get(&transport).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_query_never_reaches_transport() {
        let transport = MemoryTransport::new();
        let err = tickets()
            .where_op("id", "~", 1)
            .get(&transport)
            .await
            .unwrap_err();

        assert!(matches!(err, SonarError::InvalidArgument(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_first_on_empty_result_is_none() {
        let transport = MemoryTransport::new().respond(json!({"tickets": {"entities": []}}));
        assert_eq!(tickets().first(&transport).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_first_takes_head() {
        let transport =
            MemoryTransport::new().respond(json!({"tickets": {"entities": [ticket(9), ticket(4)]}}));
        let first = tickets().first(&transport).await.unwrap().unwrap();
        assert_eq!(first.id, 9);
    }

    #[tokio::test]
    async fn test_first_propagates_errors() {
        let transport = MemoryTransport::new().fail(TransportError::Status {
            status: 502,
            body: "bad gateway".into(),
        });
        let err = tickets().first(&transport).await.unwrap_err();
        assert_eq!(err.error_code(), "transport_error");
    }

    #[tokio::test]
    async fn test_paginate_echoes_request() {
        let entities: Vec<Value> = (6..=10).map(ticket).collect();
        let transport = MemoryTransport::new().respond(json!({"tickets": {
            "entities": entities,
            "page_info": {"records_per_page": 5, "page": 2, "total_count": 17}
        }}));

        let page = tickets()
            .sort_desc("updated_at")
            .paginate(&transport, 5, 2, "/tickets")
            .await
            .unwrap();

        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total_count, 17);
        assert_eq!(page.page, 2);
        assert_eq!(page.per_page, 5);
        assert_eq!(page.base_path, "/tickets");
        assert_eq!(page.last_page(), 4);

        let request = transport.last_request().unwrap();
        assert!(request.query.contains("page_info { records_per_page page total_count }"));
        assert_eq!(
            request.variables["paginator"],
            json!({"page": 2, "records_per_page": 5})
        );
    }

    #[tokio::test]
    async fn test_paginate_leaves_no_state_behind() {
        let transport = MemoryTransport::new()
            .respond(json!({"tickets": {
                "entities": [],
                "page_info": {"total_count": 0}
            }}))
            .respond(json!({"tickets": {"entities": []}}));

        let query = tickets();
        query.paginate(&transport, 10, 1, "/").await.unwrap();
        query.get(&transport).await.unwrap();

        let requests = transport.requests();
        assert!(requests[0].variables.get("paginator").is_some());
        assert!(requests[1].variables.get("paginator").is_none());
        assert!(!requests[1].query.contains("page_info"));
    }

    #[tokio::test]
    async fn test_paginate_rejects_zero_page() {
        let transport = MemoryTransport::new();
        let err = tickets().paginate(&transport, 5, 0, "/").await.unwrap_err();
        assert!(matches!(err, SonarError::InvalidArgument(_)));
        assert_eq!(transport.request_count(), 0);
    }
}
