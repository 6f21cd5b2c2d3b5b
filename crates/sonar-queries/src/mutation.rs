//! Mutations
//!
//! A mutation calls one remote field with typed arguments and selects the
//! fields of the record it returns:
//!
//! ```text
//! mutation($input: CreateTicketMutationInput!) { create_ticket(input: $input) { id subject } }
//! ```

use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;
use serde_json::{Map, Value};
use sonar_core::{SonarError, SonarResult, Transport, WireDecodable};
use tracing::{debug, info, instrument};

use crate::query::GraphqlQuery;

/// A serializable mutation input with its remote input type
pub trait MutationInput: Serialize {
    fn type_name() -> &'static str;
}

#[derive(Debug, Clone, PartialEq)]
struct Argument {
    name: String,
    graphql_type: String,
    value: Value,
}

/// A single mutation returning a resource of kind `R`
pub struct MutationSpec<R> {
    name: String,
    arguments: Vec<Argument>,
    _resource: PhantomData<fn() -> R>,
}

impl<R: WireDecodable> MutationSpec<R> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: vec![],
            _resource: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a typed argument, e.g. `("id", "Int64Bit!", 12)`.
    /// A later argument with the same name replaces the earlier one.
    pub fn argument(
        mut self,
        name: impl Into<String>,
        graphql_type: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        let argument = Argument {
            name: name.into(),
            graphql_type: graphql_type.into(),
            value: value.into(),
        };
        match self.arguments.iter_mut().find(|a| a.name == argument.name) {
            Some(existing) => *existing = argument,
            None => self.arguments.push(argument),
        }
        self
    }

    /// Pass `input` as the required `input` argument
    pub fn input<I: MutationInput>(self, input: &I) -> SonarResult<Self> {
        let value = serde_json::to_value(input)?;
        Ok(self.argument("input", format!("{}!", I::type_name()), value))
    }

    pub fn render(&self) -> SonarResult<GraphqlQuery> {
        let mut query = String::from("mutation");

        if !self.arguments.is_empty() {
            let declarations: Vec<String> = self
                .arguments
                .iter()
                .map(|a| format!("${}: {}", a.name, a.graphql_type))
                .collect();
            query.push_str(&format!("({})", declarations.join(", ")));
        }

        query.push_str(" { ");
        query.push_str(&self.name);

        if !self.arguments.is_empty() {
            let arguments: Vec<String> = self
                .arguments
                .iter()
                .map(|a| format!("{0}: ${0}", a.name))
                .collect();
            query.push_str(&format!("({})", arguments.join(", ")));
        }
        query.push_str(&format!(" {{ {} }} }}", R::selection()));

        let variables: Map<String, Value> = self
            .arguments
            .iter()
            .map(|a| (a.name.clone(), a.value.clone()))
            .collect();

        Ok(GraphqlQuery {
            query,
            variables: Value::Object(variables),
        })
    }

    /// Run the mutation and decode the returned record
    #[instrument(skip_all, fields(mutation = %self.name))]
    pub async fn execute<T>(&self, transport: &T) -> SonarResult<R>
    where
        T: Transport + ?Sized,
    {
        let rendered = self.render()?;
        debug!(query = %rendered.query, "Executing GraphQL mutation");

        let response = transport
            .execute(&rendered.query, &rendered.variables)
            .await?;

        let raw = match response.get(&self.name) {
            None | Some(Value::Null) => {
                return Err(SonarError::ResourceNotFound {
                    object: self.name.clone(),
                })
            }
            Some(raw) => raw,
        };

        let record = R::from_wire(raw)?;
        info!(mutation = %self.name, "Mutation applied");
        Ok(record)
    }
}

impl<R> Clone for MutationSpec<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            arguments: self.arguments.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R> fmt::Debug for MutationSpec<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationSpec")
            .field("name", &self.name)
            .field("arguments", &self.arguments)
            .finish()
    }
}
