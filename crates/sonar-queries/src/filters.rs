//! Query Filters
//!
//! Filters are accumulated per attribute. Each attribute belongs to one wire
//! bucket (`integer_fields` or `string_fields`) for the lifetime of the
//! model: either declared by the resource schema or inferred from the first
//! value it is filtered with. Every `add` appends a new constraint group;
//! nothing is ever overwritten.

use std::collections::HashMap;

use serde::Serialize;
use sonar_core::{FieldType, SonarError};
use thiserror::Error;

/// Filter operators understood by the remote `Search` input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FilterOperator {
    /// Equals (=)
    #[serde(rename = "EQ")]
    Equals,
    /// Not equals (!=)
    #[serde(rename = "NEQ")]
    NotEquals,
}

impl FilterOperator {
    /// Parse operator from string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "=" => Some(Self::Equals),
            "!=" => Some(Self::NotEquals),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::NotEquals => "!=",
        }
    }

    /// Operator enum sent for integer attributes
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Equals => "EQ",
            Self::NotEquals => "NEQ",
        }
    }

    /// `match` flag sent for string attributes
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Equals)
    }
}

/// A scalar filter value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Integer(i64),
    String(String),
    Bool(bool),
    Null,
}

impl FilterValue {
    /// Bucket this value belongs to; `None` for null, which fits either
    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            Self::Integer(_) => Some(FieldType::Integer),
            Self::String(_) | Self::Bool(_) => Some(FieldType::String),
            Self::Null => None,
        }
    }

    /// Type inferred for an attribute first filtered with this value
    pub fn inferred_type(&self) -> FieldType {
        self.field_type().unwrap_or(FieldType::String)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::String(_) => "string",
            Self::Bool(_) => "boolean",
            Self::Null => "null",
        }
    }
}

macro_rules! integer_filter_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FilterValue {
                fn from(v: $t) -> Self {
                    Self::Integer(i64::from(v))
                }
            }
        )*
    };
}

integer_filter_value!(i8, i16, i32, i64, u8, u16, u32);

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<&String> for FilterValue {
    fn from(v: &String) -> Self {
        Self::String(v.clone())
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Normalizes a scalar or a sequence into an ordered list of values.
///
/// A sequence expresses "attribute IN (a, b, c)" in a single call.
pub trait IntoFilterValues {
    fn into_filter_values(self) -> Vec<FilterValue>;
}

macro_rules! scalar_filter_values {
    ($($t:ty),*) => {
        $(
            impl IntoFilterValues for $t {
                fn into_filter_values(self) -> Vec<FilterValue> {
                    vec![self.into()]
                }
            }
        )*
    };
}

scalar_filter_values!(FilterValue, i8, i16, i32, i64, u8, u16, u32, bool, String, &str, &String);

impl<T: Into<FilterValue>> IntoFilterValues for Option<T> {
    fn into_filter_values(self) -> Vec<FilterValue> {
        vec![self.into()]
    }
}

impl<T: Into<FilterValue>> IntoFilterValues for Vec<T> {
    fn into_filter_values(self) -> Vec<FilterValue> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<FilterValue>, const N: usize> IntoFilterValues for [T; N] {
    fn into_filter_values(self) -> Vec<FilterValue> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<FilterValue> + Clone> IntoFilterValues for &[T] {
    fn into_filter_values(self) -> Vec<FilterValue> {
        self.iter().cloned().map(Into::into).collect()
    }
}

/// Malformed filter calls
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("unsupported operator `{0}`, expected `=` or `!=`")]
    UnknownOperator(String),

    #[error("no values given for `{0}`")]
    EmptyValues(String),

    #[error("`{field}` is {} field, got {actual} value", article(.expected))]
    TypeMismatch {
        field: String,
        expected: FieldType,
        actual: &'static str,
    },

    #[error("`{0}` relation filter cannot be sorted")]
    SortedRelationFilter(String),
}

fn article(field_type: &FieldType) -> &'static str {
    match field_type {
        FieldType::Integer => "an integer",
        FieldType::String => "a string",
    }
}

impl From<FilterError> for SonarError {
    fn from(err: FilterError) -> Self {
        SonarError::InvalidArgument(err.to_string())
    }
}

/// One accumulated `(operator, values)` group
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub operator: FilterOperator,
    pub values: Vec<FilterValue>,
}

/// All constraints on a single attribute
#[derive(Debug, Clone, PartialEq)]
pub struct FilterField {
    pub name: String,
    pub field_type: FieldType,
    pub constraints: Vec<Constraint>,
}

/// Integer search entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegerSearch {
    pub attribute: String,
    pub search_value: FilterValue,
    pub operator: FilterOperator,
}

/// String search entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringSearch {
    pub attribute: String,
    pub search_value: FilterValue,
    #[serde(rename = "match")]
    pub is_match: bool,
}

/// The `search` variable payload
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchPayload {
    pub integer_fields: Vec<IntegerSearch>,
    pub string_fields: Vec<StringSearch>,
}

impl SearchPayload {
    pub fn len(&self) -> usize {
        self.integer_fields.len() + self.string_fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Filter model - attributes in insertion order, each with its constraints
#[derive(Debug, Clone, Default)]
pub struct FilterModel {
    fields: Vec<FilterField>,
    schema: HashMap<String, FieldType>,
}

impl FilterModel {
    /// Create an empty model that infers every attribute type
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty model with declared attribute types
    pub fn with_schema(schema: &[(&str, FieldType)]) -> Self {
        Self {
            fields: vec![],
            schema: schema
                .iter()
                .map(|(name, field_type)| (name.to_string(), *field_type))
                .collect(),
        }
    }

    /// Append a constraint group for an attribute.
    ///
    /// Fails without touching the model when no values are given or a value
    /// contradicts the attribute's established type.
    pub fn add(
        &mut self,
        field: impl Into<String>,
        operator: FilterOperator,
        values: Vec<FilterValue>,
    ) -> Result<&mut Self, FilterError> {
        let field = field.into();
        let Some(first) = values.first() else {
            return Err(FilterError::EmptyValues(field));
        };

        let position = self.fields.iter().position(|f| f.name == field);
        let expected = match position {
            Some(i) => self.fields[i].field_type,
            None => self
                .schema
                .get(&field)
                .copied()
                .unwrap_or_else(|| first.inferred_type()),
        };

        if let Some(value) = values
            .iter()
            .find(|v| v.field_type().is_some_and(|t| t != expected))
        {
            return Err(FilterError::TypeMismatch {
                field,
                expected,
                actual: value.kind(),
            });
        }

        let constraint = Constraint { operator, values };
        match position {
            Some(i) => self.fields[i].constraints.push(constraint),
            None => self.fields.push(FilterField {
                name: field,
                field_type: expected,
                constraints: vec![constraint],
            }),
        }
        Ok(self)
    }

    /// Add an equals constraint
    pub fn equals(
        &mut self,
        field: impl Into<String>,
        values: impl IntoFilterValues,
    ) -> Result<&mut Self, FilterError> {
        self.add(field, FilterOperator::Equals, values.into_filter_values())
    }

    /// Add a not equals constraint
    pub fn not_equals(
        &mut self,
        field: impl Into<String>,
        values: impl IntoFilterValues,
    ) -> Result<&mut Self, FilterError> {
        self.add(field, FilterOperator::NotEquals, values.into_filter_values())
    }

    pub fn fields(&self) -> &[FilterField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FilterField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Established type of an attribute, if it has been filtered
    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.field(name).map(|f| f.field_type)
    }

    /// Check if any constraints are set
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of filtered attributes
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Remove all constraints for an attribute
    pub fn remove(&mut self, name: &str) {
        self.fields.retain(|f| f.name != name);
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// Flatten every constraint value into one search entry
    pub fn search_payload(&self) -> SearchPayload {
        let mut payload = SearchPayload::default();

        for field in &self.fields {
            for constraint in &field.constraints {
                for value in &constraint.values {
                    match field.field_type {
                        FieldType::Integer => payload.integer_fields.push(IntegerSearch {
                            attribute: field.name.clone(),
                            search_value: value.clone(),
                            operator: constraint.operator,
                        }),
                        FieldType::String => payload.string_fields.push(StringSearch {
                            attribute: field.name.clone(),
                            search_value: value.clone(),
                            is_match: constraint.operator.is_match(),
                        }),
                    }
                }
            }
        }

        payload
    }

    /// The `search` payload, or `None` when nothing is filtered
    pub fn to_search(&self) -> Option<SearchPayload> {
        (!self.is_empty()).then(|| self.search_payload())
    }
}
