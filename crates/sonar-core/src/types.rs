//! Common types used throughout the query layer

use std::fmt;

use serde::{Deserialize, Serialize};

/// Wire classification of a filter attribute.
///
/// The remote `Search` input keeps integer and string constraints in two
/// separate buckets, so every filtered attribute belongs to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Integer,
    String,
}

impl FieldType {
    /// Name of the search bucket this type serializes into
    pub fn bucket(&self) -> &'static str {
        match self {
            Self::Integer => "integer_fields",
            Self::String => "string_fields",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::String => "string",
        }
    }
}

/// A GraphQL selection set.
///
/// ```
/// use sonar_core::Selection;
///
/// let selection = Selection::new()
///     .field("id")
///     .nested("ticket_replies", Selection::fields(["id", "body"]));
///
/// assert_eq!(selection.to_string(), "id ticket_replies { entities { id body } }");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    fields: Vec<SelectedField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectedField {
    name: String,
    arguments: Vec<FieldArgument>,
    children: Option<Selection>,
    /// Whether the children are wrapped in an `entities` connection
    connection: bool,
}

/// An argument of a selected field, bound to a variable declared on the
/// enclosing document: `sorter: [$ticket_replies_sorter]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldArgument {
    pub name: String,
    pub variable: String,
    /// Wrap the variable in a list (`[$var]`)
    pub list: bool,
}

impl FieldArgument {
    pub fn new(name: impl Into<String>, variable: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variable: variable.into(),
            list: false,
        }
    }

    pub fn list(name: impl Into<String>, variable: impl Into<String>) -> Self {
        Self {
            list: true,
            ..Self::new(name, variable)
        }
    }
}

impl fmt::Display for FieldArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.list {
            write!(f, "{}: [${}]", self.name, self.variable)
        } else {
            write!(f, "{}: ${}", self.name, self.variable)
        }
    }
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a flat selection from field names
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().fold(Self::new(), |sel, name| sel.field(name))
    }

    /// Select a scalar field
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(SelectedField {
            name: name.into(),
            arguments: vec![],
            children: None,
            connection: false,
        });
        self
    }

    /// Select a related collection; its fields are wrapped in `entities`
    pub fn nested(mut self, name: impl Into<String>, children: Selection) -> Self {
        self.fields.push(SelectedField {
            name: name.into(),
            arguments: vec![],
            children: Some(children),
            connection: true,
        });
        self
    }

    /// Select a single related object
    pub fn object(mut self, name: impl Into<String>, children: Selection) -> Self {
        self.fields.push(SelectedField {
            name: name.into(),
            arguments: vec![],
            children: Some(children),
            connection: false,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if a top-level field is selected
    pub fn selects(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Bind arguments to a selected top-level field, replacing any it had.
    /// Returns `false` if the field is not selected.
    pub fn bind_arguments(&mut self, name: &str, arguments: Vec<FieldArgument>) -> bool {
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => {
                field.arguments = arguments;
                true
            }
            None => false,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(&field.name)?;
            if !field.arguments.is_empty() {
                f.write_str("(")?;
                for (j, argument) in field.arguments.iter().enumerate() {
                    if j > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", argument)?;
                }
                f.write_str(")")?;
            }
            match (&field.children, field.connection) {
                (Some(children), true) => write!(f, " {{ entities {{ {} }} }}", children)?,
                (Some(children), false) => write!(f, " {{ {} }}", children)?,
                (None, _) => {}
            }
        }
        Ok(())
    }
}
