//! Field collection: merging inherited and own fields of a declaration.

use arcstr::ArcStr;
use indexmap::IndexMap;
use tracing::trace;

use crate::schema::declaration::{Attribute, DeclarationKind, FieldDescriptor, TypeDeclaration};

/// Result of scanning a declaration body.
pub(crate) struct CollectedFields {
    /// Final field set: interfaces, then bases, then own fields.
    pub fields: IndexMap<ArcStr, FieldDescriptor>,
    /// Number of field-shaped attributes in the body itself.
    pub own_count: usize,
    /// Body members that are not fields.
    pub attributes: IndexMap<ArcStr, Attribute>,
}

/// Collects the field set of a new declaration.
///
/// Interfaces contribute first, in order, with the first writer winning on
/// name clashes; non-interface bases come next under the same rule. Own
/// fields are scanned in declaration order and always win, replacing an
/// inherited entry in place.
pub(crate) fn collect_fields(
    kind: DeclarationKind,
    attrs: &IndexMap<ArcStr, Attribute>,
    bases: &[&TypeDeclaration],
    interfaces: &[&TypeDeclaration],
    auto_camelcase: bool,
) -> CollectedFields {
    let mut fields = IndexMap::new();

    for parent in interfaces.iter().chain(bases) {
        for (attname, field) in parent.fields() {
            if fields.contains_key(attname) {
                trace!(%kind, parent = %parent.ident(), %attname, "inherited field shadowed");
                continue;
            }
            fields.insert(attname.clone(), field.clone());
        }
    }

    let mut own_count = 0;
    let mut attributes = IndexMap::new();
    for (attname, attr) in attrs {
        match attr.as_field() {
            Some(field) => {
                own_count += 1;
                fields.insert(attname.clone(), field.mount(attname, auto_camelcase));
            }
            None => {
                attributes.insert(attname.clone(), attr.clone());
            }
        }
    }

    CollectedFields {
        fields,
        own_count,
        attributes,
    }
}
