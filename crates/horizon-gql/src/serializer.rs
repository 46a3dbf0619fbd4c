//! GraphQL document serializer.
//!
//! Renders an [`Operation`] into document text:
//!
//! - two-space indentation, one selection per line, no trailing newline
//! - arguments as `(a: 1 b: "x")`, lists as `[1, 2]`, objects as `{a: 1}`
//! - spreads as `...Name`, followed after the operation by one
//!   `fragment Name on Type { ... }` block per distinct referenced fragment,
//!   in the order the document first references them
//!
//! In [`FragmentMode::Inline`] every spread is instead resolved in place as
//! `... on Type { ... }` and no fragment blocks are emitted.
//!
//! Output is deterministic: the same operation always yields the same text.

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::fragment::Fragment;
use crate::node::{is_valid_name, Arguments, Directive, FragmentSpread, Node};
use crate::operation::Operation;
use crate::value::Value;

const INDENT: &str = "  ";

/// How fragment spreads are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FragmentMode {
    /// `...Name` at the point of use plus a trailing fragment definition.
    #[default]
    Named,
    /// `... on Type { body }` at the point of use; no fragment definitions.
    Inline,
}

/// Serializer settings and supplied fragments.
///
/// # Example
///
/// ```
/// use horizon_gql::{FragmentMode, Fragment, Operation, Serializer};
///
/// let cat = Fragment::new("CatFields", "Cat", |s| {
///     s.field("name");
/// })
/// .unwrap();
/// let query = Operation::query(|s| {
///     s.field("pet").select(|s| {
///         s.spread_named("CatFields");
///     });
/// })
/// .unwrap();
///
/// let text = Serializer::new()
///     .fragment_mode(FragmentMode::Inline)
///     .fragment(cat)
///     .serialize(&query)
///     .unwrap();
/// assert_eq!(text, "query {\n  pet {\n    ... on Cat {\n      name\n    }\n  }\n}");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Serializer {
    mode: FragmentMode,
    supplied: Vec<Fragment>,
}

impl Serializer {
    /// Create a serializer with named fragment mode and no supplied fragments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fragment mode.
    pub fn fragment_mode(mut self, mode: FragmentMode) -> Self {
        self.mode = mode;
        self
    }

    /// Supply a fragment that name-only spreads may resolve to.
    ///
    /// Supplied fragments are only emitted when the document references them.
    pub fn fragment(mut self, fragment: Fragment) -> Self {
        self.supplied.push(fragment);
        self
    }

    /// Supply several fragments.
    pub fn fragments(mut self, fragments: impl IntoIterator<Item = Fragment>) -> Self {
        self.supplied.extend(fragments);
        self
    }

    /// The configured fragment mode.
    pub fn mode(&self) -> FragmentMode {
        self.mode
    }

    /// Render an operation and the fragments it references.
    pub fn serialize(&self, operation: &Operation) -> Result<String> {
        let mut writer = DocumentWriter::new(self.mode, self.supplied_index()?);
        writer.gather(operation.selection())?;

        writer.out.push_str(operation.operation_type().keyword());
        if let Some(name) = operation.name() {
            writer.out.push(' ');
            writer.out.push_str(name);
        }
        writer.write_block(operation.selection(), 0)?;
        writer.write_fragment_definitions()?;

        tracing::debug!(
            target: "horizon_gql::serializer",
            operation = %operation.operation_type(),
            fragments = writer.collected.len(),
            bytes = writer.out.len(),
            "Serialized operation"
        );
        Ok(writer.out)
    }

    /// Render a fragment definition followed by the definitions of the
    /// fragments it references.
    ///
    /// In inline mode only the fragment's own definition is emitted, with its
    /// spreads resolved in place.
    pub fn serialize_fragment(&self, fragment: &Fragment) -> Result<String> {
        let mut writer = DocumentWriter::new(self.mode, self.supplied_index()?);
        register(&mut writer.available, fragment)?;
        writer.gather(fragment.selection())?;
        writer.collect(fragment)?;
        if self.mode == FragmentMode::Inline {
            writer.active.push(fragment.name().to_string());
            writer.write_definition(fragment)?;
        } else {
            writer.write_fragment_definitions()?;
        }
        Ok(writer.out)
    }

    fn supplied_index(&self) -> Result<IndexMap<String, Fragment>> {
        let mut index = IndexMap::new();
        for fragment in &self.supplied {
            register(&mut index, fragment)?;
        }
        Ok(index)
    }
}

/// Insert `fragment` under its name, failing if a different body already
/// holds that name. Returns `true` when the name was new.
fn register(index: &mut IndexMap<String, Fragment>, fragment: &Fragment) -> Result<bool> {
    match index.get(fragment.name()) {
        Some(existing) if existing == fragment => Ok(false),
        Some(_) => Err(Error::DuplicateFragmentName {
            name: fragment.name().to_string(),
        }),
        None => {
            index.insert(fragment.name().to_string(), fragment.clone());
            Ok(true)
        }
    }
}

struct DocumentWriter {
    mode: FragmentMode,
    /// Supplied fragments plus every fragment carried by a spread.
    available: IndexMap<String, Fragment>,
    /// Carried fragments already walked by `gather`.
    walked: Vec<Fragment>,
    /// Referenced fragments in first-reference order.
    collected: IndexMap<String, Fragment>,
    /// Fragments currently being expanded in inline mode.
    active: Vec<String>,
    out: String,
}

impl DocumentWriter {
    fn new(mode: FragmentMode, supplied: IndexMap<String, Fragment>) -> Self {
        Self {
            mode,
            available: supplied,
            walked: Vec::new(),
            collected: IndexMap::new(),
            active: Vec::new(),
            out: String::new(),
        }
    }

    /// Make every fragment carried below `nodes` available to name-only
    /// spreads, failing on two different bodies under one name.
    fn gather(&mut self, nodes: &[Node]) -> Result<()> {
        for node in nodes {
            if let Node::FragmentSpread(spread) = node
                && let Some(fragment) = spread.fragment()
                && !self.walked.iter().any(|seen| seen.same(fragment))
            {
                register(&mut self.available, fragment)?;
                self.walked.push(fragment.clone());
                self.gather(fragment.selection())?;
            }
            self.gather(node.children())?;
        }
        Ok(())
    }

    fn resolve(&self, spread: &FragmentSpread) -> Result<Fragment> {
        match (spread.fragment(), self.available.get(spread.name())) {
            (Some(carried), Some(known)) if carried != known => {
                Err(Error::DuplicateFragmentName {
                    name: spread.name().to_string(),
                })
            }
            (Some(carried), _) => Ok(carried.clone()),
            (None, Some(known)) => Ok(known.clone()),
            (None, None) => Err(Error::DanglingFragmentReference {
                name: spread.name().to_string(),
            }),
        }
    }

    fn collect(&mut self, fragment: &Fragment) -> Result<()> {
        register(&mut self.collected, fragment).map(|_| ())
    }

    fn write_block(&mut self, nodes: &[Node], depth: usize) -> Result<()> {
        self.out.push_str(" {\n");
        for node in nodes {
            self.write_node(node, depth + 1)?;
        }
        self.indent(depth);
        self.out.push('}');
        Ok(())
    }

    fn write_node(&mut self, node: &Node, depth: usize) -> Result<()> {
        self.indent(depth);
        match node {
            Node::Field(field) => {
                if let Some(alias) = field.alias() {
                    self.out.push_str(alias);
                    self.out.push_str(": ");
                }
                self.out.push_str(field.name());
                self.write_arguments(field.arguments())?;
                self.write_directives(&field.directives)?;
                if !field.selection().is_empty() {
                    self.write_block(field.selection(), depth)?;
                }
            }
            Node::InlineFragment(inline) => {
                self.out.push_str("... on ");
                self.out.push_str(inline.type_condition());
                self.write_directives(&inline.directives)?;
                self.write_block(inline.selection(), depth)?;
            }
            Node::FragmentSpread(spread) => {
                let fragment = self.resolve(spread)?;
                self.collect(&fragment)?;
                match self.mode {
                    FragmentMode::Named => {
                        self.out.push_str("...");
                        self.out.push_str(spread.name());
                        self.write_directives(&spread.directives)?;
                    }
                    FragmentMode::Inline => self.write_inlined(spread, &fragment, depth)?,
                }
            }
        }
        self.out.push('\n');
        Ok(())
    }

    fn write_inlined(
        &mut self,
        spread: &FragmentSpread,
        fragment: &Fragment,
        depth: usize,
    ) -> Result<()> {
        if let Some(start) = self.active.iter().position(|name| name == fragment.name()) {
            let mut cycle = self.active[start..].to_vec();
            cycle.push(fragment.name().to_string());
            return Err(Error::CyclicFragment {
                name: fragment.name().to_string(),
                cycle: cycle.join(" -> "),
            });
        }
        self.out.push_str("... on ");
        self.out.push_str(fragment.on_type());
        self.write_directives(&spread.directives)?;
        self.active.push(fragment.name().to_string());
        self.write_block(fragment.selection(), depth)?;
        self.active.pop();
        Ok(())
    }

    fn write_fragment_definitions(&mut self) -> Result<()> {
        // Writing a definition may collect further fragments; keep going
        // until the list stops growing.
        let mut next = 0;
        while let Some((_, fragment)) = self.collected.get_index(next) {
            let fragment = fragment.clone();
            if !self.out.is_empty() {
                self.out.push('\n');
            }
            self.write_definition(&fragment)?;
            next += 1;
        }
        Ok(())
    }

    fn write_definition(&mut self, fragment: &Fragment) -> Result<()> {
        self.out.push_str("fragment ");
        self.out.push_str(fragment.name());
        self.out.push_str(" on ");
        self.out.push_str(fragment.on_type());
        self.write_block(fragment.selection(), 0)
    }

    fn write_arguments(&mut self, arguments: &Arguments) -> Result<()> {
        if arguments.is_empty() {
            return Ok(());
        }
        self.out.push('(');
        for (i, (name, value)) in arguments.iter().enumerate() {
            if i > 0 {
                self.out.push(' ');
            }
            self.out.push_str(name);
            self.out.push_str(": ");
            write_value(&mut self.out, name, value)?;
        }
        self.out.push(')');
        Ok(())
    }

    fn write_directives(&mut self, directives: &[Directive]) -> Result<()> {
        for directive in directives {
            if !is_valid_name(directive.name()) {
                return Err(Error::malformed(format!(
                    "invalid directive name '{}'",
                    directive.name()
                )));
            }
            self.out.push_str(" @");
            self.out.push_str(directive.name());
            self.write_arguments(directive.arguments())?;
        }
        Ok(())
    }

    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
    }
}

/// Render `value` as a GraphQL input literal.
fn write_value(out: &mut String, argument: &str, value: &Value) -> Result<()> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Int(i) => out.push_str(&i.to_string()),
        Value::Float(f) => {
            if !f.is_finite() {
                return Err(Error::invalid_argument(
                    argument,
                    format!("{f} has no GraphQL literal form"),
                ));
            }
            // Debug formatting always keeps a fraction or exponent.
            out.push_str(&format!("{f:?}"));
        }
        Value::String(s) => write_string(out, s),
        Value::Enum(name) => {
            if !is_valid_name(name) || matches!(name.as_str(), "true" | "false" | "null") {
                return Err(Error::invalid_argument(
                    argument,
                    format!("'{name}' is not a valid enum value"),
                ));
            }
            out.push_str(name);
        }
        Value::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, argument, item)?;
            }
            out.push(']');
        }
        Value::Object(fields) => {
            out.push('{');
            for (i, (key, item)) in fields.iter().enumerate() {
                if !is_valid_name(key) {
                    return Err(Error::invalid_argument(
                        argument,
                        format!("'{key}' is not a valid input field name"),
                    ));
                }
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(key);
                out.push_str(": ");
                write_value(out, argument, item)?;
            }
            out.push('}');
        }
    }
    Ok(())
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}
