//! Runtime values and object instances.

use std::{fmt, sync::Arc};

use arcstr::ArcStr;
use derive_more::with_trait::{Display, Error};
use indexmap::IndexMap;

use crate::schema::declaration::{DeclarationKind, TypeDeclaration};

/// Value flowing through resolvers, arguments and instances.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Field never assigned.
    #[default]
    Unset,
    /// Explicit `null`.
    Null,
    /// `Boolean`.
    Boolean(bool),
    /// `Int`.
    Int(i32),
    /// `Float`.
    Float(f64),
    /// `String` and `ID`.
    String(ArcStr),
    /// Enum value, by name.
    Enum(ArcStr),
    /// List of values.
    List(Vec<Value>),
    /// Untyped record, e.g. an input object argument.
    Map(IndexMap<ArcStr, Value>),
    /// Instance of an object declaration.
    Object(Instance),
}

impl Value {
    /// Builds an enum value.
    pub fn enum_value(name: impl Into<ArcStr>) -> Self {
        Self::Enum(name.into())
    }

    /// `true` for [`Value::Null`] and [`Value::Unset`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null | Self::Unset)
    }

    /// Borrows the string of a `String` or `Enum` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Borrows the instance of an `Object` value.
    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Borrows the items of a `List` value.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// Renders this value as a GraphQL input literal.
    pub fn to_literal(&self) -> String {
        let mut out = String::new();
        self.write_literal(&mut out);
        out
    }

    fn write_literal(&self, out: &mut String) {
        match self {
            Self::Unset | Self::Null => out.push_str("null"),
            Self::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            Self::Int(i) => out.push_str(&i.to_string()),
            Self::Float(f) if f.is_finite() => out.push_str(&format!("{f:?}")),
            Self::Float(_) => out.push_str("null"),
            Self::String(s) => out.push_str(&quote(s)),
            Self::Enum(e) => out.push_str(e),
            Self::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.write_literal(out);
                }
                out.push(']');
            }
            Self::Map(map) => write_object_literal(map.iter(), out),
            Self::Object(instance) => {
                write_object_literal(instance.values.iter().filter(|(_, v)| !v.is_null()), out)
            }
        }
    }
}

fn write_object_literal<'a>(entries: impl Iterator<Item = (&'a ArcStr, &'a Value)>, out: &mut String) {
    out.push('{');
    for (i, (k, v)) in entries.enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(k);
        out.push_str(": ");
        v.write_literal(out);
    }
    out.push('}');
}

/// GraphQL string literals share JSON escaping rules.
fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s.into())
    }
}

impl From<ArcStr> for Value {
    fn from(s: ArcStr) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<Instance> for Value {
    fn from(i: Instance) -> Self {
        Self::Object(i)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Error raised while constructing an [`Instance`].
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum ConstructionError {
    /// More positional arguments than declared fields.
    #[display("Number of args exceeds number of fields of `{type_name}`: {given} > {expected}")]
    ArgumentCountExceeded {
        /// Declaration being instantiated.
        type_name: ArcStr,
        /// Positional arguments supplied.
        given: usize,
        /// Declared fields.
        expected: usize,
    },

    /// A keyword naming neither a field nor a settable property.
    #[display("'{keyword}' is an invalid keyword argument for `{type_name}`")]
    UnexpectedKeyword {
        /// Declaration being instantiated.
        type_name: ArcStr,
        /// First offending keyword.
        keyword: String,
    },

    /// Interfaces only describe shared fields.
    #[display("An interface cannot be initialized: `{type_name}`")]
    InterfaceInstantiation {
        /// The interface declaration.
        type_name: ArcStr,
    },
}

/// Value constructed from an object declaration.
///
/// A plain record: fields are addressable by attribute name and never type
/// checked.
#[derive(Clone)]
pub struct Instance {
    declaration: Arc<TypeDeclaration>,
    values: IndexMap<ArcStr, Value>,
}

impl Instance {
    /// Binds `args` positionally in field order, then `kwargs` by attribute
    /// or exposed name, falling back to property setters.
    ///
    /// A keyword naming a field already bound positionally is ignored.
    pub(crate) fn construct<K: AsRef<str>>(
        declaration: &Arc<TypeDeclaration>,
        args: Vec<Value>,
        kwargs: impl IntoIterator<Item = (K, Value)>,
    ) -> Result<Self, ConstructionError> {
        let type_name = declaration.ident().clone();
        if declaration.kind() == DeclarationKind::Interface {
            return Err(ConstructionError::InterfaceInstantiation { type_name });
        }

        let fields = declaration.fields();
        if args.len() > fields.len() {
            return Err(ConstructionError::ArgumentCountExceeded {
                type_name,
                given: args.len(),
                expected: fields.len(),
            });
        }

        let mut values: IndexMap<ArcStr, Value> =
            fields.keys().map(|k| (k.clone(), Value::Unset)).collect();
        let positional = args.len();
        for (slot, val) in values.values_mut().zip(args) {
            *slot = val;
        }

        let mut setters = Vec::new();
        for (key, val) in kwargs {
            let key = key.as_ref();
            let field = fields
                .get_index_of(key)
                .or_else(|| fields.values().position(|f| f.exposed_name() == key));
            if let Some(idx) = field {
                if idx >= positional {
                    values[idx] = val;
                }
                continue;
            }
            match declaration.property(key).and_then(|p| p.set_fn()) {
                Some(setter) => setters.push((setter.clone(), val)),
                None => {
                    return Err(ConstructionError::UnexpectedKeyword {
                        type_name,
                        keyword: key.into(),
                    });
                }
            }
        }

        let mut instance = Self {
            declaration: declaration.clone(),
            values,
        };
        for (setter, val) in setters {
            setter(&mut instance, val);
        }
        Ok(instance)
    }

    /// Declaration this instance was constructed from.
    pub fn declaration(&self) -> &Arc<TypeDeclaration> {
        &self.declaration
    }

    /// Stored value of an attribute.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Stores `value` under `name`, adding the attribute if missing.
    pub fn set(&mut self, name: impl Into<ArcStr>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Resolves an attribute: stored values first, then property getters,
    /// then plain declaration attributes.
    pub fn attribute(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.values.get(name) {
            return Some(v.clone());
        }
        if let Some(getter) = self.declaration.property(name).and_then(|p| p.get_fn()) {
            return Some(getter(self));
        }
        self.declaration.constant(name).cloned()
    }

    /// Stored attributes in field order, followed by attributes set later.
    pub fn values(&self) -> impl Iterator<Item = (&ArcStr, &Value)> {
        self.values.iter()
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.declaration, &other.declaration) && self.values == other.values
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.declaration.ident());
        for (k, v) in &self.values {
            s.field(k, v);
        }
        s.finish()
    }
}
