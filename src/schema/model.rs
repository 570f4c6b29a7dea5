//! The finished schema: declarations, implementors and the query root.

use std::{fmt, sync::Arc};

use arcstr::ArcStr;
use fnv::FnvHashMap;
use indexmap::IndexSet;
use tracing::trace;

use crate::{
    executor::Context,
    schema::{
        declaration::{DeclarationKind, TypeDeclaration},
        error::DeclarationError,
        meta::MetaType,
        registry::TypeMap,
    },
    value::Value,
};

/// Finished, read-only schema.
///
/// Cheap to clone; every clone shares the same declarations and compiled
/// types.
#[derive(Clone)]
pub struct SchemaType {
    inner: Arc<SchemaInner>,
}

struct SchemaInner {
    types: TypeMap,
    implementors: FnvHashMap<ArcStr, IndexSet<ArcStr>>,
    query_type: Arc<TypeDeclaration>,
}

impl SchemaType {
    pub(crate) fn new(
        types: TypeMap,
        implementors: FnvHashMap<ArcStr, IndexSet<ArcStr>>,
        query_type: Arc<TypeDeclaration>,
    ) -> Self {
        Self {
            inner: Arc::new(SchemaInner {
                types,
                implementors,
                query_type,
            }),
        }
    }

    /// The root query object.
    pub fn query_type(&self) -> &Arc<TypeDeclaration> {
        &self.inner.query_type
    }

    /// Declaration by identifier or compiled name.
    pub fn declaration(&self, reference: &str) -> Option<&Arc<TypeDeclaration>> {
        self.inner.types.declaration(reference)
    }

    /// All declarations in registration order.
    pub fn declarations(&self) -> impl Iterator<Item = &Arc<TypeDeclaration>> {
        self.inner.types.declarations.values()
    }

    /// Standalone prebuilt types in registration order.
    pub fn prebuilt_types(&self) -> impl Iterator<Item = &Arc<MetaType>> {
        self.inner.types.prebuilt.values()
    }

    /// Compiled type of a declaration, materialized on first access.
    ///
    /// Every call returns the same instance.
    pub fn compiled_type(&self, reference: &str) -> Result<&Arc<MetaType>, DeclarationError> {
        let decl = self
            .declaration(reference)
            .ok_or_else(|| DeclarationError::UnknownType {
                name: reference.into(),
            })?;
        self.inner.types.compiled(decl)
    }

    /// Materializes every non-abstract declaration.
    pub fn compile_all(&self) -> Result<Vec<&Arc<MetaType>>, DeclarationError> {
        self.declarations()
            .filter(|d| !d.is_abstract())
            .map(|d| self.inner.types.compiled(d))
            .collect()
    }

    /// Objects implementing `interface`, in registration order.
    pub fn implementors(&self, interface: &str) -> impl Iterator<Item = &Arc<TypeDeclaration>> {
        let ident = self.declaration(interface).map(|d| d.ident().clone());
        ident
            .and_then(|i| self.inner.implementors.get(&i))
            .into_iter()
            .flatten()
            .filter_map(|i| self.inner.types.declarations.get(i))
    }

    /// Whether `value` belongs to the object declaration `object`.
    ///
    /// Membership is nominal unless the declaration carries its own
    /// predicate. Values whose type can't be determined never match.
    pub fn is_type_of(&self, object: &str, value: &Value, ctx: &Context<'_>) -> bool {
        let Some(decl) = self.declaration(object) else {
            return false;
        };
        if decl.kind() != DeclarationKind::Object {
            return false;
        }
        if let Some(hook) = &decl.is_type_of {
            return hook(value, ctx);
        }

        let Some(instance) = value.as_instance() else {
            trace!(%object, "value is not an instance");
            return false;
        };
        let expected = match self.inner.types.compiled(decl) {
            Ok(t) => t,
            Err(e) => {
                trace!(%object, error = %e, "type of object unavailable");
                return false;
            }
        };
        match self.inner.types.compiled(instance.declaration()) {
            Ok(actual) => actual.name() == expected.name(),
            Err(e) => {
                trace!(
                    %object,
                    instance = %instance.declaration().ident(),
                    error = %e,
                    "type of instance unavailable",
                );
                false
            }
        }
    }

    /// Compiled name of the concrete object type of `value`, seen through
    /// the interface `interface`.
    ///
    /// The interface's own hook is asked first; without one, or when it has
    /// no answer, implementors are tried in registration order.
    pub fn resolve_type(&self, interface: &str, value: &Value, ctx: &Context<'_>) -> Option<ArcStr> {
        let decl = self.declaration(interface)?;
        if let Some(hook) = &decl.resolve_type {
            match hook(value, ctx) {
                Some(name) if !name.is_empty() => return Some(name),
                _ => trace!(%interface, "type resolution hook gave no answer"),
            }
        }
        let resolved = self
            .implementors(interface)
            .find(|object| self.is_type_of(object.ident(), value, ctx))
            .map(|object| object.name().clone());
        if resolved.is_none() {
            trace!(%interface, "no implementor accepted the value");
        }
        resolved
    }
}

impl fmt::Debug for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaType")
            .field("query_type", self.inner.query_type.ident())
            .field(
                "types",
                &self.inner.types.declarations.keys().collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}
