//! Selection nodes: fields, inline fragments, and fragment spreads.

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::fragment::Fragment;
use crate::value::Value;

/// Ordered argument map. Insertion order is the rendered order.
pub type Arguments = IndexMap<String, Value>;

/// The kind of a selection node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A selected field.
    Field,
    /// A type-conditioned inline selection (`... on Type { }`).
    InlineFragment,
    /// A reference to a named fragment (`...Name`).
    FragmentSpread,
}

/// One entry of a selection set.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A selected field.
    Field(Field),
    /// A type-conditioned inline selection.
    InlineFragment(InlineFragment),
    /// A reference to a named fragment.
    FragmentSpread(FragmentSpread),
}

impl Node {
    /// Get the node kind.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Field(_) => NodeKind::Field,
            Self::InlineFragment(_) => NodeKind::InlineFragment,
            Self::FragmentSpread(_) => NodeKind::FragmentSpread,
        }
    }

    /// The field name, the type condition, or the referenced fragment name.
    pub fn name(&self) -> &str {
        match self {
            Self::Field(field) => &field.name,
            Self::InlineFragment(inline) => &inline.type_condition,
            Self::FragmentSpread(spread) => &spread.name,
        }
    }

    /// The sub-selection. Always empty for spreads.
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Field(field) => &field.selection,
            Self::InlineFragment(inline) => &inline.selection,
            Self::FragmentSpread(_) => &[],
        }
    }

    /// Directives attached to this node.
    pub fn directives(&self) -> &[Directive] {
        match self {
            Self::Field(field) => &field.directives,
            Self::InlineFragment(inline) => &inline.directives,
            Self::FragmentSpread(spread) => &spread.directives,
        }
    }

    /// Check this node and everything below it: names, aliases, argument and
    /// directive names, and that inline fragments select something.
    ///
    /// Fails with [`Error::MalformedQuery`].
    pub fn validate(&self) -> Result<()> {
        self.validate_head()?;
        if let Self::InlineFragment(inline) = self
            && inline.selection.is_empty()
        {
            return Err(Error::malformed(format!(
                "inline fragment on '{}' has an empty selection",
                inline.type_condition
            )));
        }
        validate_selection(self.children())
    }

    /// Check this node without descending into its selection.
    pub(crate) fn validate_head(&self) -> Result<()> {
        match self {
            Self::Field(field) => {
                check_name("field name", &field.name)?;
                if let Some(ref alias) = field.alias {
                    check_name("alias", alias)?;
                }
                check_arguments(&field.name, &field.arguments)?;
            }
            Self::InlineFragment(inline) => {
                check_name("type condition", &inline.type_condition)?;
            }
            Self::FragmentSpread(spread) => {
                check_name("fragment name", &spread.name)?;
            }
        }
        self.directives().iter().try_for_each(Directive::validate)
    }

    pub(crate) fn directives_mut(&mut self) -> &mut Vec<Directive> {
        match self {
            Self::Field(field) => &mut field.directives,
            Self::InlineFragment(inline) => &mut inline.directives,
            Self::FragmentSpread(spread) => &mut spread.directives,
        }
    }
}

/// A selected field with optional alias, arguments, and sub-selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub(crate) name: String,
    pub(crate) alias: Option<String>,
    pub(crate) arguments: Arguments,
    pub(crate) directives: Vec<Directive>,
    pub(crate) selection: Vec<Node>,
}

impl Field {
    /// Create a leaf field.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            arguments: Arguments::new(),
            directives: Vec::new(),
            selection: Vec::new(),
        }
    }

    /// The field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The output alias, if any.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The field arguments in authored order.
    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    /// The sub-selection (empty for scalar leaves).
    pub fn selection(&self) -> &[Node] {
        &self.selection
    }
}

/// A selection that only applies when the runtime type matches.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineFragment {
    pub(crate) type_condition: String,
    pub(crate) directives: Vec<Directive>,
    pub(crate) selection: Vec<Node>,
}

impl InlineFragment {
    /// Create an inline fragment with an empty body.
    pub fn new(type_condition: impl Into<String>) -> Self {
        Self {
            type_condition: type_condition.into(),
            directives: Vec::new(),
            selection: Vec::new(),
        }
    }

    /// The concrete type this selection is conditioned on.
    pub fn type_condition(&self) -> &str {
        &self.type_condition
    }

    /// The conditioned selection.
    pub fn selection(&self) -> &[Node] {
        &self.selection
    }
}

/// A reference to a named fragment.
///
/// When built from a [`Fragment`] value the spread carries it, so serializers
/// can collect the fragment without it being supplied separately. A spread
/// built from a bare name must be resolved against supplied fragments.
#[derive(Debug, Clone)]
pub struct FragmentSpread {
    pub(crate) name: String,
    pub(crate) fragment: Option<Fragment>,
    pub(crate) directives: Vec<Directive>,
}

impl FragmentSpread {
    /// Spread a fragment value.
    pub fn of(fragment: &Fragment) -> Self {
        Self {
            name: fragment.name().to_string(),
            fragment: Some(fragment.clone()),
            directives: Vec::new(),
        }
    }

    /// Spread a fragment by name only.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fragment: None,
            directives: Vec::new(),
        }
    }

    /// The referenced fragment name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The referenced fragment, when the spread was built from one.
    pub fn fragment(&self) -> Option<&Fragment> {
        self.fragment.as_ref()
    }
}

// The carried fragment is left out: a spread renders as `...Name` either way,
// and conflicting bodies are caught when the fragment is resolved.
impl PartialEq for FragmentSpread {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.directives == other.directives
    }
}

/// A directive such as `@include(if: true)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub(crate) name: String,
    pub(crate) arguments: Arguments,
}

impl Directive {
    /// Create a directive without arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Arguments::new(),
        }
    }

    /// Add an argument.
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    /// `@include(if: condition)`
    pub fn include_if(condition: bool) -> Self {
        Self::new("include").arg("if", condition)
    }

    /// `@skip(if: condition)`
    pub fn skip_if(condition: bool) -> Self {
        Self::new("skip").arg("if", condition)
    }

    /// Check the directive and argument names.
    pub fn validate(&self) -> Result<()> {
        check_name("directive name", &self.name)?;
        check_arguments(&self.name, &self.arguments)
    }

    /// The directive name, without `@`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The directive arguments.
    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }
}

/// Check whether `name` is a valid GraphQL name (`/[_A-Za-z][_0-9A-Za-z]*/`).
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Validate every node of a selection set. See [`Node::validate`].
pub fn validate_selection(nodes: &[Node]) -> Result<()> {
    nodes.iter().try_for_each(Node::validate)
}

fn check_name(what: &str, name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(Error::malformed(format!("invalid {what} '{name}'")))
    }
}

fn check_arguments(owner: &str, arguments: &Arguments) -> Result<()> {
    for name in arguments.keys() {
        if !is_valid_name(name) {
            return Err(Error::malformed(format!(
                "invalid argument name '{name}' on '{owner}'"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("catCollection"));
        assert!(is_valid_name("__typename"));
        assert!(is_valid_name("_1"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("1st"));
        assert!(!is_valid_name("cat-collection"));
        assert!(!is_valid_name("c at"));
    }

    #[test]
    fn test_node_accessors() {
        let mut field = Field::new("items");
        field.selection.push(Node::Field(Field::new("name")));
        let node = Node::Field(field);

        assert_eq!(node.kind(), NodeKind::Field);
        assert_eq!(node.name(), "items");
        assert_eq!(node.children().len(), 1);

        let spread = Node::FragmentSpread(FragmentSpread::named("CatFields"));
        assert_eq!(spread.kind(), NodeKind::FragmentSpread);
        assert!(spread.children().is_empty());
    }

    #[test]
    fn test_validate_rejects_empty_inline_fragment() {
        let node = Node::InlineFragment(InlineFragment::new("Cat"));
        assert!(matches!(node.validate(), Err(Error::MalformedQuery(_))));
        assert!(node.validate_head().is_ok());
    }

    #[test]
    fn test_validate_checks_nested_names() {
        let mut items = Field::new("items");
        items.selection.push(Node::Field(Field::new("bad name {")));
        let err = Node::Field(items).validate().unwrap_err();
        assert!(err.to_string().contains("bad name {"));

        let mut cats = Field::new("cats");
        cats.arguments.insert("first page".into(), Value::from(1));
        assert!(Node::Field(cats).validate().is_err());

        let mut aliased = Field::new("cats");
        aliased.alias = Some("my-cats".into());
        assert!(Node::Field(aliased).validate().is_err());
    }

    #[test]
    fn test_validate_checks_directives() {
        let mut field = Field::new("name");
        field
            .directives
            .push(Directive::new("include").arg("if x", true));
        assert!(Node::Field(field).validate().is_err());

        let mut spread = FragmentSpread::named("CatFields");
        spread.directives.push(Directive::new("not valid"));
        assert!(Node::FragmentSpread(spread).validate().is_err());
    }

    #[test]
    fn test_spread_equality_ignores_carried_fragment() {
        let cat = Fragment::new("CatFields", "Cat", |s| {
            s.field("name");
        })
        .unwrap();
        assert_eq!(FragmentSpread::of(&cat), FragmentSpread::named("CatFields"));
        assert_ne!(FragmentSpread::of(&cat), FragmentSpread::named("DogFields"));
    }

    #[test]
    fn test_directive_helpers() {
        let include = Directive::include_if(true);
        assert_eq!(include.name(), "include");
        assert_eq!(include.arguments()["if"], Value::Boolean(true));

        let skip = Directive::skip_if(false);
        assert_eq!(skip.name(), "skip");
        assert_eq!(skip.arguments()["if"], Value::Boolean(false));
    }
}
