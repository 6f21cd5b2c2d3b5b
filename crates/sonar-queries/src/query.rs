//! Query Model
//!
//! [`QueryOptions`] holds the optional clauses a collection query can carry:
//! `search`, `reverse_relation_filters`, `sorter` and `paginator` on the
//! root field, plus search and sort clauses of nested relations. Rendering
//! is a pure function of the options, the object name and the resource
//! selection: each clause contributes a variable declaration, an argument,
//! and a variable value only when it is present.

use serde::Serialize;
use serde_json::{Map, Value};
use sonar_core::{PageRequest, Selection, SonarError, SonarResult};

use crate::filters::SearchPayload;
use crate::paginator::Paginator;
use crate::relation::{RelationFilter, RelationOptions};
use crate::sorts::Sorter;

/// Fields requested from `page_info` when paginating
pub const PAGE_INFO_FIELDS: [&str; 3] = ["records_per_page", "page", "total_count"];

/// Optional clauses of a collection query
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchPayload>,
    #[serde(
        rename = "reverse_relation_filters",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub relation_filters: Vec<RelationFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorter: Option<Sorter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paginator: Option<Paginator>,
    /// Nested relation clauses; their variables are added by `variables`
    #[serde(skip)]
    pub relations: Vec<RelationOptions>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: SearchPayload) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_relation_filter(mut self, filter: RelationFilter) -> Self {
        self.relation_filters.push(filter);
        self
    }

    pub fn with_sorter(mut self, sorter: Sorter) -> Self {
        self.sorter = Some(sorter);
        self
    }

    pub fn with_paginator(mut self, paginator: Paginator) -> Self {
        self.paginator = Some(paginator);
        self
    }

    /// Add clauses for a nested relation, replacing earlier ones for it
    pub fn with_relation(mut self, options: RelationOptions) -> Self {
        self.relations.retain(|r| r.relation != options.relation);
        self.relations.push(options);
        self
    }

    pub fn is_paginated(&self) -> bool {
        self.paginator.is_some()
    }

    /// Variable declarations: `$name: Type`. Root clauses come first, then
    /// nested relations in the order they were added.
    fn declarations(&self) -> Vec<String> {
        let mut declarations = vec![];
        if self.search.is_some() {
            declarations.push("$search: Search".to_string());
        }
        if !self.relation_filters.is_empty() {
            declarations.push("$reverse_relation_filters: [ReverseRelationFilter]".to_string());
        }
        if self.sorter.is_some() {
            declarations.push("$sorter: Sorter".to_string());
        }
        if self.paginator.is_some() {
            declarations.push("$paginator: Paginator".to_string());
        }
        for relation in &self.relations {
            declarations.extend(relation.declarations());
        }
        declarations
    }

    /// Root field arguments; search and sorter are list arguments remotely
    fn arguments(&self) -> Vec<&'static str> {
        let mut arguments = vec![];
        if self.search.is_some() {
            arguments.push("search: [$search]");
        }
        if !self.relation_filters.is_empty() {
            arguments.push("reverse_relation_filters: $reverse_relation_filters");
        }
        if self.sorter.is_some() {
            arguments.push("sorter: [$sorter]");
        }
        if self.paginator.is_some() {
            arguments.push("paginator: $paginator");
        }
        arguments
    }

    /// Variable payload with one key per present clause
    pub fn variables(&self) -> SonarResult<Value> {
        let mut variables = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for relation in &self.relations {
            if let Some(search) = &relation.search {
                variables.insert(relation.search_variable(), serde_json::to_value(search)?);
            }
            if let Some(sorter) = &relation.sorter {
                variables.insert(relation.sorter_variable(), serde_json::to_value(sorter)?);
            }
        }
        Ok(Value::Object(variables))
    }

    /// Selection with relation arguments bound to their nested fields
    fn bind_relations(&self, object_name: &str, selection: &Selection) -> SonarResult<Selection> {
        let mut selection = selection.clone();
        for relation in &self.relations {
            if !selection.selects(&relation.relation) {
                return Err(SonarError::InvalidArgument(format!(
                    "`{}` is not a selected relation of `{}`",
                    relation.relation, object_name
                )));
            }
            if !relation.is_empty() {
                selection.bind_arguments(&relation.relation, relation.arguments());
            }
        }
        Ok(selection)
    }

    /// Render the query document for `object_name`
    pub fn render(&self, object_name: &str, selection: &Selection) -> SonarResult<GraphqlQuery> {
        let selection = self.bind_relations(object_name, selection)?;
        let mut query = String::from("query");

        let declarations = self.declarations();
        if !declarations.is_empty() {
            query.push_str(&format!("({})", declarations.join(", ")));
        }

        query.push_str(" { ");
        query.push_str(object_name);

        let arguments = self.arguments();
        if !arguments.is_empty() {
            query.push_str(&format!("({})", arguments.join(", ")));
        }

        query.push_str(&format!(" {{ entities {{ {} }}", selection));
        if self.is_paginated() {
            query.push_str(&format!(" page_info {{ {} }}", PAGE_INFO_FIELDS.join(" ")));
        }
        query.push_str(" } }");

        Ok(GraphqlQuery {
            query,
            variables: self.variables()?,
        })
    }
}

/// A rendered GraphQL document and its variables, serialized as the
/// request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphqlQuery {
    pub query: String,
    pub variables: Value,
}

impl GraphqlQuery {
    /// Check if a variable is sent with the document
    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.get(name).is_some()
    }
}

/// Everything needed to run one terminal operation
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub object_name: String,
    pub query: GraphqlQuery,
    /// Present for paginated plans
    pub page: Option<PageRequest>,
}

impl QueryPlan {
    pub fn is_paginated(&self) -> bool {
        self.page.is_some()
    }
}
