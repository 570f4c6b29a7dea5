//! Per-declaration options blocks.

use std::sync::Arc;

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::schema::{declaration::DeclarationKind, error::DeclarationError, meta::MetaType};

/// Value stored under an option key.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    /// A string, e.g. `name`.
    Str(ArcStr),
    /// A flag, e.g. `abstract`.
    Bool(bool),
    /// Declaration identifiers, e.g. `interfaces`.
    Idents(Vec<ArcStr>),
    /// A prebuilt engine type.
    Type(Arc<MetaType>),
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        Self::Str(s.into())
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<MetaType> for OptionValue {
    fn from(t: MetaType) -> Self {
        Self::Type(Arc::new(t))
    }
}

/// Ordered options attached to a declaration.
///
/// Keys are checked against the options recognized for the declaration kind
/// only when the declaration is registered.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OptionsBlock {
    entries: IndexMap<ArcStr, OptionValue>,
}

impl OptionsBlock {
    /// An empty block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an arbitrary option.
    #[must_use]
    pub fn set(mut self, key: impl Into<ArcStr>, value: impl Into<OptionValue>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Sets `name`.
    #[must_use]
    pub fn name(self, name: &str) -> Self {
        self.set("name", name)
    }

    /// Sets `description`.
    #[must_use]
    pub fn description(self, description: &str) -> Self {
        self.set("description", description)
    }

    /// Sets `graphql_type`.
    #[must_use]
    pub fn graphql_type(self, ty: MetaType) -> Self {
        self.set("graphql_type", ty)
    }

    /// Sets `interfaces`.
    #[must_use]
    pub fn interfaces<I, S>(self, idents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ArcStr>,
    {
        self.set(
            "interfaces",
            OptionValue::Idents(idents.into_iter().map(Into::into).collect()),
        )
    }

    /// Sets `abstract`.
    #[must_use]
    pub fn is_abstract(self, value: bool) -> Self {
        self.set("abstract", value)
    }

    /// Iterates over the options in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&ArcStr, &OptionValue)> {
        self.entries.iter()
    }
}

/// Normalized options of a declaration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TypeOptions {
    /// Compiled type name override.
    pub name: Option<ArcStr>,
    /// Compiled type description override.
    pub description: Option<ArcStr>,
    /// Prebuilt engine type, exclusive with own fields.
    pub graphql_type: Option<Arc<MetaType>>,
    /// Implemented interfaces, objects only.
    pub interfaces: Vec<ArcStr>,
    /// Suppresses materialization.
    pub is_abstract: bool,
}

const OBJECT_OPTIONS: &[&str] = &["name", "description", "graphql_type", "interfaces", "abstract"];
const INTERFACE_OPTIONS: &[&str] = &["name", "description", "graphql_type", "abstract"];
const INPUT_OPTIONS: &[&str] = &["name", "description", "graphql_type", "abstract"];

fn recognized(kind: DeclarationKind) -> &'static [&'static str] {
    match kind {
        DeclarationKind::Object => OBJECT_OPTIONS,
        DeclarationKind::Interface => INTERFACE_OPTIONS,
        DeclarationKind::Input => INPUT_OPTIONS,
    }
}

impl TypeOptions {
    /// Normalizes `block` for a declaration of `kind` named `type_name`.
    ///
    /// Missing options take their defaults. The first key not recognized for
    /// `kind` fails the whole block.
    pub fn resolve(
        type_name: &ArcStr,
        kind: DeclarationKind,
        block: Option<&OptionsBlock>,
    ) -> Result<Self, DeclarationError> {
        let mut options = Self::default();
        let Some(block) = block else {
            return Ok(options);
        };

        let allowed = recognized(kind);
        for (key, value) in block.iter() {
            if !allowed.contains(&key.as_str()) {
                return Err(DeclarationError::UnrecognizedOption {
                    type_name: type_name.clone(),
                    option: key.clone(),
                });
            }
            let invalid = |expected| DeclarationError::InvalidOptionValue {
                type_name: type_name.clone(),
                option: key.clone(),
                expected,
            };
            match (key.as_str(), value) {
                ("name", OptionValue::Str(s)) => options.name = Some(s.clone()),
                ("description", OptionValue::Str(s)) => options.description = Some(s.clone()),
                ("graphql_type", OptionValue::Type(t)) => options.graphql_type = Some(t.clone()),
                ("interfaces", OptionValue::Idents(i)) => options.interfaces = i.clone(),
                ("abstract", OptionValue::Bool(b)) => options.is_abstract = *b,
                ("name" | "description", _) => return Err(invalid("a string")),
                ("graphql_type", _) => return Err(invalid("a prebuilt type")),
                ("interfaces", _) => return Err(invalid("a list of interfaces")),
                _ => return Err(invalid("a boolean")),
            }
        }
        Ok(options)
    }
}
