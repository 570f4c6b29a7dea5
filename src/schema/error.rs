//! Errors raised while analyzing and materializing declarations.

use arcstr::ArcStr;
use derive_more::with_trait::{Display, Error};

use crate::schema::declaration::DeclarationKind;

/// Error in a schema definition.
///
/// Raised while registering or materializing declarations. Every variant
/// points at a programming mistake, none is recoverable.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum DeclarationError {
    /// An options block contains a key not recognized for the kind.
    #[display("Invalid attribute `{option}` in the options of `{type_name}`")]
    UnrecognizedOption {
        /// Declaration carrying the block.
        type_name: ArcStr,
        /// First unrecognized key.
        option: ArcStr,
    },

    /// A recognized option holds a value of the wrong shape.
    #[display("Option `{option}` of `{type_name}` must be {expected}")]
    InvalidOptionValue {
        /// Declaration carrying the block.
        type_name: ArcStr,
        /// Offending key.
        option: ArcStr,
        /// Expected shape.
        expected: &'static str,
    },

    /// Own fields declared next to a prebuilt `graphql_type`.
    #[display("Can't mount fields in `{type_name}` with a defined `graphql_type`")]
    ConflictingFieldDefinition {
        /// Offending declaration.
        type_name: ArcStr,
    },

    /// A prebuilt `graphql_type` of a kind other than the declaration's.
    #[display("`graphql_type` of {kind} `{type_name}` is a `{found}`")]
    KindMismatch {
        /// Offending declaration.
        type_name: ArcStr,
        /// Declared kind.
        kind: DeclarationKind,
        /// Name of the prebuilt type.
        found: ArcStr,
    },

    /// A reference to a type nobody registered.
    #[display("Unknown type `{name}`")]
    UnknownType {
        /// Referenced identifier or name.
        name: ArcStr,
    },

    /// An `interfaces` entry naming a non-interface declaration.
    #[display("`{type_name}` can't implement `{name}`: not an interface")]
    NotAnInterface {
        /// Implementing declaration.
        type_name: ArcStr,
        /// Referenced declaration.
        name: ArcStr,
    },

    /// The root query type is not an object declaration.
    #[display("Root query type `{name}` must be an object")]
    RootNotObject {
        /// Declaration used as root.
        name: ArcStr,
    },

    /// The same identifier or compiled name registered twice.
    #[display("Type `{name}` is already registered")]
    DuplicateType {
        /// Clashing identifier or name.
        name: ArcStr,
    },

    /// An interface's `implements` hook rejected an object.
    #[display("`{interface}` rejected implementor `{object}`: {reason}")]
    ImplementationRejected {
        /// Rejecting interface.
        interface: ArcStr,
        /// Rejected object.
        object: ArcStr,
        /// Reason given by the hook.
        reason: String,
    },

    /// An abstract declaration has no compiled type.
    #[display("`{name}` is abstract and has no compiled type")]
    AbstractType {
        /// Abstract declaration.
        name: ArcStr,
    },
}
