//! Declarations, their analysis, and the compiled type graph.

pub mod declaration;
pub mod error;
mod fields;
pub mod meta;
pub mod model;
pub mod options;
pub mod registry;

pub use self::{
    declaration::{
        ArgumentDescriptor, Attribute, Declaration, DeclarationKind, FieldDescriptor, Property,
        Scalar, TypeDeclaration, TypeRef,
    },
    error::DeclarationError,
    model::SchemaType,
    options::{OptionValue, OptionsBlock, TypeOptions},
    registry::{Registry, SchemaConfig},
};
