//! Relation Clauses
//!
//! Two ways a query can reach into a related collection:
//!
//! - [`RelationOptions`] filter and sort a nested connection in the
//!   selection (`ticket_replies` of each ticket). Their variables are
//!   declared on the root document and bound as arguments of the nested
//!   field.
//! - [`RelationFilter`] restricts the root collection to records that have
//!   a matching related record (`account_statuses` held by account 1001).
//!   All of them travel in the `reverse_relation_filters` variable.

use serde::Serialize;
use sonar_core::FieldArgument;

use crate::filters::{FilterError, FilterModel, FilterOperator, IntoFilterValues, SearchPayload};
use crate::sorts::{SortDirection, Sorter};

/// Fluent clauses for a related collection, built inside
/// `QuerySpec::with` or `QuerySpec::where_has`
#[derive(Debug, Clone, Default)]
pub struct RelationQuery {
    filters: FilterModel,
    sorter: Option<Sorter>,
    invalid: Option<FilterError>,
}

impl RelationQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(self, field: impl Into<String>, values: impl IntoFilterValues) -> Self {
        self.constrain(field, FilterOperator::Equals, values)
    }

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

    /// Sort the related records, replacing any earlier sort
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

    pub(crate) fn into_options(self, relation: String) -> Result<RelationOptions, FilterError> {
        if let Some(err) = self.invalid {
            return Err(err);
        }
        Ok(RelationOptions {
            relation,
            search: self.filters.to_search(),
            sorter: self.sorter,
        })
    }

    pub(crate) fn into_filter(self, relation: String) -> Result<RelationFilter, FilterError> {
        if let Some(err) = self.invalid {
            return Err(err);
        }
        if self.sorter.is_some() {
            return Err(FilterError::SortedRelationFilter(relation));
        }
        Ok(RelationFilter {
            relation,
            search: self.filters.to_search().into_iter().collect(),
        })
    }
}

/// Search and sort clauses of a nested connection
#[derive(Debug, Clone, PartialEq)]
pub struct RelationOptions {
    /// Name of the nested field in the selection
    pub relation: String,
    pub search: Option<SearchPayload>,
    pub sorter: Option<Sorter>,
}

impl RelationOptions {
    pub fn search_variable(&self) -> String {
        format!("{}_search", self.relation)
    }

    pub fn sorter_variable(&self) -> String {
        format!("{}_sorter", self.relation)
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.sorter.is_none()
    }

    /// Root declarations: `$ticket_replies_sorter: Sorter`
    pub(crate) fn declarations(&self) -> Vec<String> {
        let mut declarations = vec![];
        if self.search.is_some() {
            declarations.push(format!("${}: Search", self.search_variable()));
        }
        if self.sorter.is_some() {
            declarations.push(format!("${}: Sorter", self.sorter_variable()));
        }
        declarations
    }

    /// Arguments bound to the nested field
    pub(crate) fn arguments(&self) -> Vec<FieldArgument> {
        let mut arguments = vec![];
        if self.search.is_some() {
            arguments.push(FieldArgument::list("search", self.search_variable()));
        }
        if self.sorter.is_some() {
            arguments.push(FieldArgument::list("sorter", self.sorter_variable()));
        }
        arguments
    }
}

/// One entry of the `reverse_relation_filters` variable
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationFilter {
    pub relation: String,
    /// Empty when any related record qualifies
    pub search: Vec<SearchPayload>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_relation_options_variables() {
        let options = RelationQuery::new()
            .where_eq("incoming", true)
            .sort_desc("created_at")
            .into_options("ticket_replies".into())
            .unwrap();

        assert_eq!(
            options.declarations(),
            vec![
                "$ticket_replies_search: Search".to_string(),
                "$ticket_replies_sorter: Sorter".to_string()
            ]
        );
        let arguments: Vec<String> = options.arguments().iter().map(|a| a.to_string()).collect();
        assert_eq!(
            arguments,
            vec!["search: [$ticket_replies_search]", "sorter: [$ticket_replies_sorter]"]
        );
    }

    #[test]
    fn test_unconstrained_relation_is_empty() {
        let options = RelationQuery::new().into_options("ticket_replies".into()).unwrap();
        assert!(options.is_empty());
        assert!(options.arguments().is_empty());
    }

    #[test]
    fn test_relation_filter_payload() {
        let filter = RelationQuery::new()
            .where_eq("id", 1001)
            .into_filter("accounts".into())
            .unwrap();

        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({
                "relation": "accounts",
                "search": [{
                    "integer_fields": [{"attribute": "id", "search_value": 1001, "operator": "EQ"}],
                    "string_fields": []
                }]
            })
        );
    }

    #[test]
    fn test_relation_filter_without_constraints() {
        let filter = RelationQuery::new().into_filter("accounts".into()).unwrap();
        assert!(filter.search.is_empty());
    }

    #[test]
    fn test_relation_filter_rejects_sorter() {
        let err = RelationQuery::new()
            .sort_asc("id")
            .into_filter("accounts".into())
            .unwrap_err();
        assert_eq!(err, FilterError::SortedRelationFilter("accounts".into()));
    }

    #[test]
    fn test_first_relation_error_wins() {
        let err = RelationQuery::new()
            .where_op("id", "<", 3)
            .where_eq("id", Vec::<i64>::new())
            .into_options("ticket_replies".into())
            .unwrap_err();
        assert_eq!(err, FilterError::UnknownOperator("<".into()));
    }
}
