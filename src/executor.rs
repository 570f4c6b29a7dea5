//! Resolver plumbing shared between declarations and the execution engine.

use std::{any::Any, fmt::Display, sync::Arc};

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::{schema::model::SchemaType, value::Value};

/// Error type for errors that occur during field resolution
///
/// Field errors are represented by a human-readable error message.
///
/// They can be converted to from any type that implements
/// `std::fmt::Display`, which makes error chaining with the `?` operator a
/// breeze:
///
/// ```rust
/// # use graphql_decl::FieldError;
/// fn get_string(data: Vec<u8>) -> Result<String, FieldError> {
///     let s = String::from_utf8(data)?;
///     Ok(s)
/// }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FieldError {
    message: String,
}

impl<T: Display> From<T> for FieldError {
    fn from(e: T) -> Self {
        Self {
            message: e.to_string(),
        }
    }
}

impl FieldError {
    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The result of resolving the value of a field of type `T`
pub type FieldResult<T = Value> = Result<T, FieldError>;

/// Resolver bound to a field: `(source, context, info) -> value`.
pub type Resolver =
    Arc<dyn Fn(&Value, &Context<'_>, &ResolveInfo<'_>) -> FieldResult + Send + Sync>;

/// Opaque execution context handed to resolvers and type predicates.
#[derive(Clone, Copy, Default)]
pub struct Context<'a> {
    data: Option<&'a (dyn Any + Send + Sync)>,
}

impl<'a> Context<'a> {
    /// A context carrying no data.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wraps application data.
    pub fn new(data: &'a (dyn Any + Send + Sync)) -> Self {
        Self { data: Some(data) }
    }

    /// Downcasts the application data to `T`.
    pub fn data<T: Any>(&self) -> Option<&'a T> {
        self.data.and_then(|d| d.downcast_ref::<T>())
    }
}

/// Field argument container
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arguments {
    args: IndexMap<ArcStr, Value>,
}

impl Arguments {
    #[doc(hidden)]
    pub fn new(args: IndexMap<ArcStr, Value>) -> Self {
        Self { args }
    }

    /// Gets an argument by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.args.get(key).filter(|v| !v.is_null())
    }

    /// Gets a string argument by name.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Iterates over the provided arguments in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&ArcStr, &Value)> {
        self.args.iter()
    }
}

/// Information about the field being resolved.
pub struct ResolveInfo<'a> {
    field_name: &'a str,
    parent_type: &'a str,
    arguments: &'a Arguments,
    schema: &'a SchemaType,
}

impl<'a> ResolveInfo<'a> {
    #[doc(hidden)]
    pub fn new(
        field_name: &'a str,
        parent_type: &'a str,
        arguments: &'a Arguments,
        schema: &'a SchemaType,
    ) -> Self {
        Self {
            field_name,
            parent_type,
            arguments,
            schema,
        }
    }

    /// Exposed name of the field being resolved.
    pub fn field_name(&self) -> &'a str {
        self.field_name
    }

    /// Compiled name of the type owning the field.
    pub fn parent_type(&self) -> &'a str {
        self.parent_type
    }

    /// Arguments passed to the field.
    pub fn arguments(&self) -> &'a Arguments {
        self.arguments
    }

    /// The schema the field belongs to.
    pub fn schema(&self) -> &'a SchemaType {
        self.schema
    }
}

/// Resolves `attname` from `source` when a field has no explicit resolver.
pub(crate) fn default_resolve(source: &Value, attname: &str) -> Value {
    match source {
        Value::Object(instance) => instance.attribute(attname).unwrap_or(Value::Null),
        Value::Map(map) => map.get(attname).cloned().unwrap_or(Value::Null),
        _ => Value::Null,
    }
}
