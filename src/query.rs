//! Textual query bodies built from field handles.
//!
//! ```rust
//! # use graphql_decl::{query::field, FieldDescriptor, Scalar, TypeRef, Declaration, Registry};
//! # let mut registry = Registry::new();
//! # let character = registry
//! #     .register(Declaration::interface("Character").field("name", FieldDescriptor::new(Scalar::String)))
//! #     .unwrap();
//! # let query = registry
//! #     .register(Declaration::object("Query").field("hero", FieldDescriptor::new(TypeRef::named("Character"))))
//! #     .unwrap();
//! let body = field(&query["hero"]).get([&character["name"]]);
//!
//! assert_eq!(body.to_string(), "hero {\n  name\n}");
//! ```

use std::fmt;

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::{schema::declaration::FieldDescriptor, value::Value};

const INDENT: &str = "  ";

/// One entry of a selection set.
#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    /// A field without sub-selections.
    Leaf(ArcStr),
    /// A field with arguments or sub-selections.
    Field(FieldSelection),
}

impl From<&FieldDescriptor> for Selection {
    fn from(handle: &FieldDescriptor) -> Self {
        Self::Leaf(handle.exposed_name().clone())
    }
}

impl From<FieldSelection> for Selection {
    fn from(selection: FieldSelection) -> Self {
        Self::Field(selection)
    }
}

impl Selection {
    fn write(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        match self {
            Self::Leaf(name) => write!(f, "{}{name}", INDENT.repeat(depth)),
            Self::Field(selection) => selection.write(f, depth),
        }
    }
}

/// A field selection rooted at a field handle.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSelection {
    name: ArcStr,
    arguments: IndexMap<ArcStr, Value>,
    selections: Vec<Selection>,
}

/// Starts a selection of the field behind `handle`.
pub fn field(handle: &FieldDescriptor) -> FieldSelection {
    FieldSelection {
        name: handle.exposed_name().clone(),
        arguments: IndexMap::new(),
        selections: Vec::new(),
    }
}

impl FieldSelection {
    /// Binds an argument; rebinding keeps the first position.
    #[must_use]
    pub fn arg(mut self, name: impl Into<ArcStr>, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    /// Appends sub-selections in the given order.
    #[must_use]
    pub fn get<I>(mut self, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Selection>,
    {
        self.selections.extend(items.into_iter().map(Into::into));
        self
    }

    /// Appends a single sub-selection.
    #[must_use]
    pub fn select(mut self, item: impl Into<Selection>) -> Self {
        self.selections.push(item.into());
        self
    }

    fn write(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{}{}", INDENT.repeat(depth), self.name)?;
        if !self.arguments.is_empty() {
            write!(f, "(")?;
            for (i, (name, value)) in self.arguments.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{name}: {}", value.to_literal())?;
            }
            write!(f, ")")?;
        }
        if self.selections.is_empty() {
            return Ok(());
        }
        write_block(f, &self.selections, depth)
    }
}

impl fmt::Display for FieldSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, 0)
    }
}

fn write_block(f: &mut fmt::Formatter<'_>, selections: &[Selection], depth: usize) -> fmt::Result {
    writeln!(f, " {{")?;
    for selection in selections {
        selection.write(f, depth + 1)?;
        writeln!(f)?;
    }
    write!(f, "{}}}", INDENT.repeat(depth))
}

/// An anonymous query operation.
#[derive(Clone, Debug, PartialEq)]
pub struct Operation {
    selections: Vec<Selection>,
}

/// Wraps `items` into an anonymous `query` operation.
pub fn query<I>(items: I) -> Operation
where
    I: IntoIterator,
    I::Item: Into<Selection>,
{
    Operation {
        selections: items.into_iter().map(Into::into).collect(),
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "query")?;
        write_block(f, &self.selections, 0)
    }
}
