//! Query and mutation operations.

use std::fmt;

use crate::builder::{Scope, SelectionStack};
use crate::error::{Error, Result};
use crate::node::{is_valid_name, validate_selection, Node};
use crate::serializer::Serializer;

/// A GraphQL operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OperationType {
    /// A query operation (read-only).
    #[default]
    Query,
    /// A mutation operation (modifies data).
    Mutation,
}

impl OperationType {
    /// The document keyword for this operation type.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A built query or mutation.
///
/// Operations are immutable once built and can be serialized or executed any
/// number of times, from any thread.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    operation_type: OperationType,
    name: Option<String>,
    selection: Vec<Node>,
}

impl Operation {
    /// Build a query.
    ///
    /// # Example
    ///
    /// ```
    /// use horizon_gql::Operation;
    ///
    /// let query = Operation::query(|s| {
    ///     s.field("catCollection").arg("limit", 1).select(|s| {
    ///         s.field("items").select(|s| {
    ///             s.field("name");
    ///             s.field("likes");
    ///         });
    ///     });
    /// })
    /// .unwrap();
    ///
    /// let expected = concat!(
    ///     "query {\n",
    ///     "  catCollection(limit: 1) {\n",
    ///     "    items {\n",
    ///     "      name\n",
    ///     "      likes\n",
    ///     "    }\n",
    ///     "  }\n",
    ///     "}",
    /// );
    /// assert_eq!(query.to_document().unwrap(), expected);
    /// ```
    pub fn query(build: impl FnOnce(&mut Scope<'_>)) -> Result<Self> {
        Self::build(OperationType::Query, None, build)
    }

    /// Build a mutation.
    pub fn mutation(build: impl FnOnce(&mut Scope<'_>)) -> Result<Self> {
        Self::build(OperationType::Mutation, None, build)
    }

    /// Build a named query (`query <name> { ... }`).
    pub fn named_query(
        name: impl Into<String>,
        build: impl FnOnce(&mut Scope<'_>),
    ) -> Result<Self> {
        Self::build(OperationType::Query, Some(name.into()), build)
    }

    /// Build a named mutation (`mutation <name> { ... }`).
    pub fn named_mutation(
        name: impl Into<String>,
        build: impl FnOnce(&mut Scope<'_>),
    ) -> Result<Self> {
        Self::build(OperationType::Mutation, Some(name.into()), build)
    }

    /// Create an operation from an already built selection.
    pub fn from_selection(
        operation_type: OperationType,
        name: Option<String>,
        selection: Vec<Node>,
    ) -> Result<Self> {
        if let Some(ref name) = name
            && !is_valid_name(name)
        {
            return Err(Error::malformed(format!("invalid operation name '{name}'")));
        }
        if selection.is_empty() {
            return Err(Error::malformed(format!(
                "{} has an empty selection",
                operation_type
            )));
        }
        validate_selection(&selection)?;
        Ok(Self {
            operation_type,
            name,
            selection,
        })
    }

    fn build(
        operation_type: OperationType,
        name: Option<String>,
        build: impl FnOnce(&mut Scope<'_>),
    ) -> Result<Self> {
        let mut stack = SelectionStack::new();
        stack.open_root()?;
        build(&mut Scope::new(&mut stack));
        Self::from_selection(operation_type, name, stack.finish()?)
    }

    /// The operation type.
    pub fn operation_type(&self) -> OperationType {
        self.operation_type
    }

    /// The operation name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The top-level selection.
    pub fn selection(&self) -> &[Node] {
        &self.selection
    }

    /// Serialize with default settings: named spreads and one trailing
    /// definition per referenced fragment.
    pub fn to_document(&self) -> Result<String> {
        Serializer::new().serialize(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_types() {
        let query = Operation::query(|s| {
            s.field("me");
        })
        .unwrap();
        assert_eq!(query.operation_type(), OperationType::Query);
        assert_eq!(query.name(), None);

        let mutation = Operation::named_mutation("Like", |s| {
            s.field("likeCat").arg("id", 1);
        })
        .unwrap();
        assert_eq!(mutation.operation_type(), OperationType::Mutation);
        assert_eq!(mutation.name(), Some("Like"));
    }

    #[test]
    fn test_empty_operation_is_malformed() {
        assert!(matches!(
            Operation::query(|_| {}),
            Err(Error::MalformedQuery(_))
        ));
    }

    #[test]
    fn test_invalid_operation_name() {
        let result = Operation::named_query("Cat Query", |s| {
            s.field("me");
        });
        assert!(matches!(result, Err(Error::MalformedQuery(_))));
    }

    #[test]
    fn test_from_selection_validates_nodes() {
        use crate::node::{Field, InlineFragment};

        let empty_inline = vec![Node::InlineFragment(InlineFragment::new("Cat"))];
        let err = Operation::from_selection(OperationType::Query, None, empty_inline)
            .unwrap_err();
        assert!(err.to_string().contains("empty selection"));

        let bad_field = vec![Node::Field(Field::new("bad name {"))];
        assert!(matches!(
            Operation::from_selection(OperationType::Query, None, bad_field),
            Err(Error::MalformedQuery(_))
        ));

        let ok = vec![Node::Field(Field::new("me"))];
        let query = Operation::from_selection(OperationType::Query, None, ok).unwrap();
        assert_eq!(query.to_document().unwrap(), "query {\n  me\n}");
    }

    #[test]
    fn test_operation_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Operation>();
    }

    #[test]
    fn test_keywords() {
        assert_eq!(OperationType::Query.to_string(), "query");
        assert_eq!(OperationType::Mutation.keyword(), "mutation");
    }
}
