#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod executor;
pub mod integrations;
pub mod query;
pub mod schema;
mod util;
mod value;

#[cfg(test)]
mod tests;

pub use crate::util::to_camel_case;

pub use crate::{
    executor::{Arguments, Context, FieldError, FieldResult, ResolveInfo},
    integrations::async_graphql::{Client, ClientError, ContextData, build_schema},
    query::{field, query},
    schema::{
        ArgumentDescriptor, Attribute, Declaration, DeclarationError, DeclarationKind,
        FieldDescriptor, OptionValue, OptionsBlock, Property, Registry, Scalar, SchemaConfig,
        SchemaType, TypeDeclaration, TypeOptions, TypeRef,
        meta::{self, MetaType},
    },
    value::{ConstructionError, Instance, Value},
};
