//! Selection builder.
//!
//! Selections are assembled on an explicit stack of open selection sets.
//! Entering a nested selection pushes the parent node, nodes are appended to
//! whatever is on top, and leaving pops the finished node into its own parent.
//!
//! Most code uses the closure surface ([`Scope`]) through
//! [`Operation::query`](crate::Operation::query) or
//! [`Fragment::new`](crate::Fragment::new):
//!
//! ```
//! use horizon_gql::Operation;
//!
//! let query = Operation::query(|s| {
//!     s.field("catCollection").arg("limit", 1).select(|s| {
//!         s.field("items").select(|s| {
//!             s.field("name");
//!             s.field("likes");
//!         });
//!     });
//! })
//! .unwrap();
//!
//! assert!(query.to_document().unwrap().starts_with("query {\n  catCollection(limit: 1) {"));
//! ```

use crate::error::{Error, Result};
use crate::fragment::Fragment;
use crate::node::{
    is_valid_name, validate_selection, Directive, Field, FragmentSpread, InlineFragment, Node,
};
use crate::value::Value;

enum Frame {
    Root(Vec<Node>),
    Field(Field),
    Inline(InlineFragment),
}

impl Frame {
    fn selection_mut(&mut self) -> &mut Vec<Node> {
        match self {
            Frame::Root(nodes) => nodes,
            Frame::Field(field) => &mut field.selection,
            Frame::Inline(inline) => &mut inline.selection,
        }
    }
}

/// Explicit builder context: a stack of open selection sets.
///
/// The stack starts empty. [`open_root`](Self::open_root) opens the top-level
/// selection; every append with no open selection fails with
/// [`Error::MalformedQuery`].
#[derive(Default)]
pub struct SelectionStack {
    frames: Vec<Frame>,
    error: Option<Error>,
}

impl SelectionStack {
    /// Create an empty stack with no open selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the top-level selection set.
    pub fn open_root(&mut self) -> Result<()> {
        if !self.frames.is_empty() {
            return Err(Error::malformed("root selection is already open"));
        }
        self.frames.push(Frame::Root(Vec::new()));
        Ok(())
    }

    /// Number of open selection sets, the root included.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Append a node to the innermost open selection.
    ///
    /// The node and its selection are validated first; see
    /// [`Node::validate`].
    pub fn append(&mut self, node: Node) -> Result<()> {
        node.validate()?;
        self.push(node)
    }

    fn push(&mut self, node: Node) -> Result<()> {
        let frame = self.frames.last_mut().ok_or_else(|| {
            Error::malformed(format!(
                "'{}' used outside of any query or fragment",
                node.name()
            ))
        })?;
        frame.selection_mut().push(node);
        Ok(())
    }

    /// Open a nested selection on `node`, which becomes the append target
    /// until [`leave`](Self::leave).
    pub fn enter(&mut self, node: Node) -> Result<()> {
        if self.frames.is_empty() {
            return Err(Error::malformed(format!(
                "'{}' used outside of any query or fragment",
                node.name()
            )));
        }
        node.validate_head()?;
        validate_selection(node.children())?;
        let frame = match node {
            Node::Field(field) => Frame::Field(field),
            Node::InlineFragment(inline) => Frame::Inline(inline),
            Node::FragmentSpread(spread) => {
                return Err(Error::malformed(format!(
                    "fragment spread '{}' cannot have a selection",
                    spread.name
                )));
            }
        };
        self.frames.push(frame);
        Ok(())
    }

    /// Close the innermost nested selection and append its node to the parent.
    pub fn leave(&mut self) -> Result<()> {
        let node = match self.frames.pop() {
            Some(Frame::Field(field)) if field.selection.is_empty() => {
                return Err(Error::malformed(format!(
                    "field '{}' has an empty selection",
                    field.name
                )));
            }
            Some(Frame::Inline(inline)) if inline.selection.is_empty() => {
                return Err(Error::malformed(format!(
                    "inline fragment on '{}' has an empty selection",
                    inline.type_condition
                )));
            }
            Some(Frame::Field(field)) => Node::Field(field),
            Some(Frame::Inline(inline)) => Node::InlineFragment(inline),
            Some(root @ Frame::Root(_)) => {
                self.frames.push(root);
                return Err(Error::malformed("no nested selection is open"));
            }
            None => return Err(Error::malformed("no nested selection is open")),
        };
        // Children were validated as they were appended.
        self.push(node)
    }

    /// Close the root selection and return it.
    ///
    /// Fails if a nested selection is still open, no root was opened, or an
    /// error was recorded during building.
    pub fn finish(mut self) -> Result<Vec<Node>> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        match self.frames.len() {
            0 => Err(Error::malformed("no root selection was opened")),
            1 => match self.frames.pop() {
                Some(Frame::Root(nodes)) => Ok(nodes),
                _ => Err(Error::malformed("selection stack is corrupted")),
            },
            n => Err(Error::malformed(format!(
                "{} nested selection(s) left open",
                n - 1
            ))),
        }
    }

    /// Keep the first error raised while building through a [`Scope`].
    fn record(&mut self, result: Result<()>) {
        if let Err(error) = result
            && self.error.is_none()
        {
            tracing::debug!(target: "horizon_gql::builder", "Builder error: {}", error);
            self.error = Some(error);
        }
    }

    fn last_node_mut(&mut self) -> Option<&mut Node> {
        self.frames.last_mut()?.selection_mut().last_mut()
    }

    fn take_last_node(&mut self) -> Option<Node> {
        self.frames.last_mut()?.selection_mut().pop()
    }
}

/// Closure surface over a [`SelectionStack`].
///
/// Every call appends to the selection the scope was opened for, in call
/// order. Misuse is recorded and reported when the enclosing operation or
/// fragment finishes building.
pub struct Scope<'a> {
    stack: &'a mut SelectionStack,
}

impl<'a> Scope<'a> {
    /// Wrap a stack. The stack should already have an open selection.
    pub fn new(stack: &'a mut SelectionStack) -> Self {
        Self { stack }
    }

    /// Select a field. Chain `.arg()`, `.alias()` or `.select()` on the
    /// returned handle to refine it.
    pub fn field(&mut self, name: impl Into<String>) -> FieldHandle<'_> {
        let appended = self.stack.append(Node::Field(Field::new(name)));
        let attached = appended.is_ok();
        self.stack.record(appended);
        FieldHandle {
            stack: &mut *self.stack,
            attached,
        }
    }

    /// Select several leaf fields at once.
    pub fn fields<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.field(name);
        }
        self
    }

    /// Type-match: append `... on <type_name> { ... }` built by `build`.
    pub fn on(
        &mut self,
        type_name: impl Into<String>,
        build: impl FnOnce(&mut Scope<'_>),
    ) -> InlineHandle<'_> {
        let entered = self
            .stack
            .enter(Node::InlineFragment(InlineFragment::new(type_name)));
        let attached = entered.is_ok();
        self.stack.record(entered);
        if attached {
            build(&mut Scope::new(&mut *self.stack));
            let left = self.stack.leave();
            self.stack.record(left);
        }
        InlineHandle {
            stack: &mut *self.stack,
            attached,
        }
    }

    /// Include a fragment: append `...<Name>` referencing `fragment`.
    ///
    /// The fragment body is not copied; serializers emit it once per document.
    pub fn spread(&mut self, fragment: &Fragment) -> SpreadHandle<'_> {
        self.push_spread(FragmentSpread::of(fragment))
    }

    /// Include a fragment by name. The fragment must be supplied when
    /// serializing.
    pub fn spread_named(&mut self, name: impl Into<String>) -> SpreadHandle<'_> {
        self.push_spread(FragmentSpread::named(name))
    }

    fn push_spread(&mut self, spread: FragmentSpread) -> SpreadHandle<'_> {
        let appended = self.stack.append(Node::FragmentSpread(spread));
        let attached = appended.is_ok();
        self.stack.record(appended);
        SpreadHandle {
            stack: &mut *self.stack,
            attached,
        }
    }
}

/// Handle to the field just appended by [`Scope::field`].
pub struct FieldHandle<'a> {
    stack: &'a mut SelectionStack,
    attached: bool,
}

impl FieldHandle<'_> {
    fn with_field(&mut self, apply: impl FnOnce(&mut Field) -> Result<()>) {
        if !self.attached {
            return;
        }
        let result = match self.stack.last_node_mut() {
            Some(Node::Field(field)) => apply(field),
            _ => Err(Error::malformed("field handle used after its scope closed")),
        };
        self.stack.record(result);
    }

    /// Rename the field in the response data.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        self.with_field(|field| {
            if !is_valid_name(&alias) {
                return Err(Error::malformed(format!(
                    "invalid alias '{}' for field '{}'",
                    alias, field.name
                )));
            }
            field.alias = Some(alias);
            Ok(())
        });
        self
    }

    /// Add an argument. Re-adding a name replaces its value in place.
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        self.with_field(|field| {
            if !is_valid_name(&name) {
                return Err(Error::malformed(format!(
                    "invalid argument name '{}' on field '{}'",
                    name, field.name
                )));
            }
            field.arguments.insert(name, value);
            Ok(())
        });
        self
    }

    /// Add several arguments in iteration order.
    pub fn args<K, V>(mut self, args: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        for (name, value) in args {
            self = self.arg(name, value);
        }
        self
    }

    /// Attach a directive.
    pub fn directive(mut self, directive: Directive) -> Self {
        self.with_field(|field| {
            directive.validate()?;
            field.directives.push(directive);
            Ok(())
        });
        self
    }

    /// Attach `@include(if: condition)`.
    pub fn include_if(self, condition: bool) -> Self {
        self.directive(Directive::include_if(condition))
    }

    /// Attach `@skip(if: condition)`.
    pub fn skip_if(self, condition: bool) -> Self {
        self.directive(Directive::skip_if(condition))
    }

    /// Give the field a sub-selection built by `build`.
    pub fn select(mut self, build: impl FnOnce(&mut Scope<'_>)) {
        if !self.attached {
            return;
        }
        let Some(node) = self.stack.take_last_node() else {
            self.stack
                .record(Err(Error::malformed("field handle used after its scope closed")));
            return;
        };
        let entered = self.stack.enter(node);
        let ok = entered.is_ok();
        self.stack.record(entered);
        if ok {
            build(&mut Scope::new(&mut *self.stack));
            let left = self.stack.leave();
            self.stack.record(left);
        }
    }
}

/// Handle to the inline fragment just appended by [`Scope::on`].
pub struct InlineHandle<'a> {
    stack: &'a mut SelectionStack,
    attached: bool,
}

impl InlineHandle<'_> {
    /// Attach a directive to the inline fragment.
    pub fn directive(mut self, directive: Directive) -> Self {
        attach_directive(&mut *self.stack, self.attached, directive, |node| {
            matches!(node, Node::InlineFragment(_))
        });
        self
    }

    /// Attach `@include(if: condition)`.
    pub fn include_if(self, condition: bool) -> Self {
        self.directive(Directive::include_if(condition))
    }

    /// Attach `@skip(if: condition)`.
    pub fn skip_if(self, condition: bool) -> Self {
        self.directive(Directive::skip_if(condition))
    }
}

/// Handle to the spread just appended by [`Scope::spread`].
pub struct SpreadHandle<'a> {
    stack: &'a mut SelectionStack,
    attached: bool,
}

impl SpreadHandle<'_> {
    /// Attach a directive to the spread.
    pub fn directive(mut self, directive: Directive) -> Self {
        attach_directive(&mut *self.stack, self.attached, directive, |node| {
            matches!(node, Node::FragmentSpread(_))
        });
        self
    }

    /// Attach `@include(if: condition)`.
    pub fn include_if(self, condition: bool) -> Self {
        self.directive(Directive::include_if(condition))
    }

    /// Attach `@skip(if: condition)`.
    pub fn skip_if(self, condition: bool) -> Self {
        self.directive(Directive::skip_if(condition))
    }
}

fn attach_directive(
    stack: &mut SelectionStack,
    attached: bool,
    directive: Directive,
    expected: impl Fn(&Node) -> bool,
) {
    if !attached {
        return;
    }
    let result = match stack.last_node_mut() {
        Some(node) if expected(node) => directive.validate().map(|()| {
            node.directives_mut().push(directive);
        }),
        _ => Err(Error::malformed("directive target is no longer open")),
    };
    stack.record(result);
}
