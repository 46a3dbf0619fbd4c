//! Named, typed, reusable selections.

use std::fmt;
use std::sync::Arc;

use crate::builder::{Scope, SelectionStack};
use crate::error::{Error, Result};
use crate::node::{is_valid_name, validate_selection, Node};

struct FragmentInner {
    name: String,
    on_type: String,
    selection: Vec<Node>,
}

/// A named fragment: `fragment <name> on <on_type> { ... }`.
///
/// Fragments are immutable and cheap to clone; clones share the same body.
/// Equality is structural, so a fragment rebuilt with the same name, type, and
/// selection compares equal to the original.
///
/// ```
/// use horizon_gql::{Fragment, Operation};
///
/// let cat_fields = Fragment::new("CatFields", "Cat", |s| {
///     s.field("name");
///     s.field("likes");
/// })
/// .unwrap();
///
/// let query = Operation::query(|s| {
///     s.field("cat").arg("id", "1").select(|s| {
///         s.spread(&cat_fields);
///     });
/// })
/// .unwrap();
///
/// let text = query.to_document().unwrap();
/// assert!(text.ends_with("fragment CatFields on Cat {\n  name\n  likes\n}"));
/// ```
#[derive(Clone)]
pub struct Fragment {
    inner: Arc<FragmentInner>,
}

impl Fragment {
    /// Build a fragment whose selection is produced by `build`.
    pub fn new(
        name: impl Into<String>,
        on_type: impl Into<String>,
        build: impl FnOnce(&mut Scope<'_>),
    ) -> Result<Self> {
        let mut stack = SelectionStack::new();
        stack.open_root()?;
        build(&mut Scope::new(&mut stack));
        Self::from_selection(name, on_type, stack.finish()?)
    }

    /// Create a fragment from an already built selection.
    pub fn from_selection(
        name: impl Into<String>,
        on_type: impl Into<String>,
        selection: Vec<Node>,
    ) -> Result<Self> {
        let name = name.into();
        let on_type = on_type.into();
        if !is_valid_name(&name) || name == "on" {
            return Err(Error::malformed(format!("invalid fragment name '{name}'")));
        }
        if !is_valid_name(&on_type) {
            return Err(Error::malformed(format!(
                "invalid type condition '{on_type}' for fragment '{name}'"
            )));
        }
        if selection.is_empty() {
            return Err(Error::malformed(format!(
                "fragment '{name}' has an empty selection"
            )));
        }
        validate_selection(&selection)?;
        Ok(Self {
            inner: Arc::new(FragmentInner {
                name,
                on_type,
                selection,
            }),
        })
    }

    /// The fragment name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The type the fragment applies to.
    pub fn on_type(&self) -> &str {
        &self.inner.on_type
    }

    /// Check if both handles share one body.
    pub(crate) fn same(&self, other: &Fragment) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The fragment selection.
    pub fn selection(&self) -> &[Node] {
        &self.inner.selection
    }
}

impl PartialEq for Fragment {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
            || (self.inner.name == other.inner.name
                && self.inner.on_type == other.inner.on_type
                && self.inner.selection == other.inner.selection)
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fragment")
            .field("name", &self.inner.name)
            .field("on_type", &self.inner.on_type)
            .field("selection", &self.inner.selection)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat_fields() -> Fragment {
        Fragment::new("CatFields", "Cat", |s| {
            s.field("name");
            s.field("likes");
        })
        .unwrap()
    }

    #[test]
    fn test_fragment_accessors() {
        let fragment = cat_fields();
        assert_eq!(fragment.name(), "CatFields");
        assert_eq!(fragment.on_type(), "Cat");
        assert_eq!(fragment.selection().len(), 2);
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(cat_fields(), cat_fields());

        let other = Fragment::new("CatFields", "Cat", |s| {
            s.field("name");
        })
        .unwrap();
        assert_ne!(cat_fields(), other);
    }

    #[test]
    fn test_empty_fragment_is_malformed() {
        let result = Fragment::new("Empty", "Cat", |_| {});
        assert!(matches!(result, Err(Error::MalformedQuery(_))));
    }

    #[test]
    fn test_invalid_fragment_names() {
        assert!(Fragment::new("on", "Cat", |s| {
            s.field("name");
        })
        .is_err());
        assert!(Fragment::new("Cat Fields", "Cat", |s| {
            s.field("name");
        })
        .is_err());
        assert!(Fragment::new("CatFields", "", |s| {
            s.field("name");
        })
        .is_err());
    }

    #[test]
    fn test_from_selection_validates_nodes() {
        use crate::node::{Directive, Field, InlineFragment};

        let empty_inline = vec![Node::InlineFragment(InlineFragment::new("Kitten"))];
        assert!(matches!(
            Fragment::from_selection("CatFields", "Cat", empty_inline),
            Err(Error::MalformedQuery(_))
        ));

        let mut field = Field::new("name");
        field.directives.push(Directive::new("bad directive"));
        let err = Fragment::from_selection("CatFields", "Cat", vec![Node::Field(field)])
            .unwrap_err();
        assert!(err.to_string().contains("bad directive"));
    }

    #[test]
    fn test_fragment_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Fragment>();
    }
}
