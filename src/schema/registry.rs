//! Type registrar: analyzes declarations and materializes compiled types.

use std::sync::{Arc, OnceLock};

use arcstr::ArcStr;
use fnv::FnvHashMap;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::schema::{
    declaration::{
        Declaration, DeclarationKind, FieldDescriptor, TypeDeclaration, TypeRef,
        is_builtin_scalar,
    },
    error::DeclarationError,
    fields::collect_fields,
    meta::{self, InputObjectMeta, InterfaceMeta, MetaType, ObjectMeta, TypeKind},
    model::SchemaType,
    options::TypeOptions,
};

/// Schema-wide settings.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Expose `snake_case` attribute names as `camelCase`.
    pub auto_camelcase: bool,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            auto_camelcase: true,
        }
    }
}

/// Every type known to a schema.
#[derive(Default)]
pub(crate) struct TypeMap {
    pub declarations: IndexMap<ArcStr, Arc<TypeDeclaration>>,
    pub prebuilt: IndexMap<ArcStr, Arc<MetaType>>,
}

impl TypeMap {
    /// Looks up a declaration by identifier, then by compiled name.
    pub fn declaration(&self, reference: &str) -> Option<&Arc<TypeDeclaration>> {
        self.declarations
            .get(reference)
            .or_else(|| self.declarations.values().find(|d| d.name() == reference))
    }

    /// Compiled name of a referenced type. Abstract declarations have none.
    fn resolve_name(&self, reference: &ArcStr) -> Result<ArcStr, DeclarationError> {
        if let Some(decl) = self.declaration(reference) {
            if decl.is_abstract() {
                return Err(DeclarationError::AbstractType {
                    name: decl.ident().clone(),
                });
            }
            return Ok(decl.name().clone());
        }
        if self.prebuilt.contains_key(reference) || is_builtin_scalar(reference) {
            return Ok(reference.clone());
        }
        Err(DeclarationError::UnknownType {
            name: reference.clone(),
        })
    }

    fn resolve_type(&self, ty: &TypeRef) -> Result<meta::Type, DeclarationError> {
        Ok(match ty {
            TypeRef::Scalar(s) => meta::Type::Named(s.name().into()),
            TypeRef::Named(n) => meta::Type::Named(self.resolve_name(n)?),
            TypeRef::List(t) => meta::Type::List(Box::new(self.resolve_type(t)?)),
            TypeRef::NonNull(t) => meta::Type::NonNull(Box::new(self.resolve_type(t)?)),
        })
    }

    fn compile_arguments(
        &self,
        field: &FieldDescriptor,
    ) -> Result<Vec<meta::Argument>, DeclarationError> {
        field
            .arguments()
            .iter()
            .map(|(name, arg)| {
                Ok(meta::Argument {
                    name: name.clone(),
                    description: arg.description.clone(),
                    arg_type: self.resolve_type(&arg.arg_type)?,
                    default_value: arg.default_value.clone(),
                })
            })
            .collect()
    }

    fn compile_field(&self, field: &FieldDescriptor) -> Result<meta::Field, DeclarationError> {
        Ok(meta::Field {
            name: field.exposed_name().clone(),
            description: field.description_text().cloned(),
            arguments: self.compile_arguments(field)?,
            field_type: self.resolve_type(field.field_type())?,
            deprecation_status: field.deprecation_status().clone(),
        })
    }

    fn compile_input_field(
        &self,
        field: &FieldDescriptor,
    ) -> Result<meta::Argument, DeclarationError> {
        Ok(meta::Argument {
            name: field.exposed_name().clone(),
            description: field.description_text().cloned(),
            arg_type: self.resolve_type(field.field_type())?,
            default_value: field.default().cloned(),
        })
    }

    /// Builds the compiled type of `decl`.
    fn materialize(&self, decl: &TypeDeclaration) -> Result<MetaType, DeclarationError> {
        debug!(ident = %decl.ident(), name = %decl.name(), kind = %decl.kind(), "materializing");
        Ok(match decl.kind() {
            DeclarationKind::Object => {
                let fields = decl
                    .fields()
                    .values()
                    .map(|f| self.compile_field(f))
                    .collect::<Result<_, _>>()?;
                let interfaces = decl
                    .interfaces()
                    .iter()
                    .map(|i| self.resolve_name(i))
                    .collect::<Result<_, _>>()?;
                let mut meta = ObjectMeta::new(decl.name().clone(), fields).interfaces(interfaces);
                meta.description = decl.description().cloned();
                meta.into_meta()
            }
            DeclarationKind::Interface => {
                let fields = decl
                    .fields()
                    .values()
                    .map(|f| self.compile_field(f))
                    .collect::<Result<_, _>>()?;
                let mut meta = InterfaceMeta::new(decl.name().clone(), fields);
                meta.description = decl.description().cloned();
                meta.into_meta()
            }
            DeclarationKind::Input => {
                let fields = decl
                    .fields()
                    .values()
                    .map(|f| self.compile_input_field(f))
                    .collect::<Result<_, _>>()?;
                let mut meta = InputObjectMeta::new(decl.name().clone(), fields);
                meta.description = decl.description().cloned();
                meta.into_meta()
            }
        })
    }

    /// Returns the compiled type of `decl`, materializing it on first use.
    pub fn compiled<'d>(
        &self,
        decl: &'d TypeDeclaration,
    ) -> Result<&'d Arc<MetaType>, DeclarationError> {
        if decl.is_abstract() {
            return Err(DeclarationError::AbstractType {
                name: decl.ident().clone(),
            });
        }
        if let Some(compiled) = decl.compiled.get() {
            return Ok(compiled);
        }
        let compiled = Arc::new(self.materialize(decl)?);
        Ok(decl.compiled.get_or_init(|| compiled))
    }
}

/// Collects declarations while a schema is being defined.
///
/// Registration analyzes each declaration eagerly; compiled types are only
/// built when first requested. [`Registry::finish`] freezes everything into
/// a shareable [`SchemaType`].
#[derive(Default)]
pub struct Registry {
    config: SchemaConfig,
    types: TypeMap,
    implementors: FnvHashMap<ArcStr, IndexSet<ArcStr>>,
}

impl Registry {
    /// Creates an empty registry with the default [`SchemaConfig`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with the given settings.
    pub fn with_config(config: SchemaConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Settings of this registry.
    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// Analyzes and records `declaration`.
    ///
    /// Objects implementing interfaces are added to each interface's
    /// implementor set, after the interface's `implements` hook accepted
    /// them.
    pub fn register(
        &mut self,
        declaration: Declaration,
    ) -> Result<Arc<TypeDeclaration>, DeclarationError> {
        if self.types.declarations.contains_key(&declaration.ident)
            || self.types.prebuilt.contains_key(&declaration.ident)
        {
            return Err(DeclarationError::DuplicateType {
                name: declaration.ident,
            });
        }

        let decl = Arc::new(self.analyze(declaration)?);
        let name = decl.name();
        let clashes = self.types.prebuilt.contains_key(name)
            || self.types.declarations.values().any(|d| {
                d.name() == name || d.name() == decl.ident() || d.ident() == name
            });
        if clashes {
            return Err(DeclarationError::DuplicateType { name: name.clone() });
        }

        if decl.kind() == DeclarationKind::Object && !decl.is_abstract() {
            for iface in decl.interfaces() {
                let hook = self
                    .types
                    .declarations
                    .get(iface)
                    .and_then(|i| i.implements.as_ref());
                if let Some(hook) = hook {
                    hook(&decl).map_err(|reason| DeclarationError::ImplementationRejected {
                        interface: iface.clone(),
                        object: decl.ident().clone(),
                        reason,
                    })?;
                }
            }
            for iface in decl.interfaces() {
                self.implementors
                    .entry(iface.clone())
                    .or_default()
                    .insert(decl.ident().clone());
            }
        }

        debug!(
            ident = %decl.ident(),
            kind = %decl.kind(),
            fields = decl.fields().len(),
            "registered declaration",
        );
        self.types
            .declarations
            .insert(decl.ident().clone(), decl.clone());
        Ok(decl)
    }

    /// Records a standalone prebuilt engine type, e.g. an enum.
    pub fn register_type(&mut self, ty: MetaType) -> Result<(), DeclarationError> {
        let name = ty.name().clone();
        if self.types.declaration(&name).is_some() || self.types.prebuilt.contains_key(&name) {
            return Err(DeclarationError::DuplicateType { name });
        }
        debug!(%name, kind = ?ty.type_kind(), "registered prebuilt type");
        self.types.prebuilt.insert(name, Arc::new(ty));
        Ok(())
    }

    /// Registered declaration by identifier.
    pub fn get(&self, ident: &str) -> Option<&Arc<TypeDeclaration>> {
        self.types.declarations.get(ident)
    }

    /// Identifiers of the objects implementing `interface`, in registration
    /// order.
    pub fn implementors(&self, interface: &str) -> impl Iterator<Item = &ArcStr> {
        self.implementors.get(interface).into_iter().flatten()
    }

    /// Compiled type of a registered declaration, materialized on first use.
    pub fn compiled_type(&self, ident: &str) -> Result<&Arc<MetaType>, DeclarationError> {
        let decl = self
            .types
            .declarations
            .get(ident)
            .ok_or_else(|| DeclarationError::UnknownType { name: ident.into() })?;
        self.types.compiled(decl)
    }

    /// Freezes the registry into a schema rooted at the `query` object.
    pub fn finish(self, query: &str) -> Result<SchemaType, DeclarationError> {
        let root = self
            .types
            .declarations
            .get(query)
            .ok_or_else(|| DeclarationError::UnknownType { name: query.into() })?;
        if root.kind() != DeclarationKind::Object || root.is_abstract() {
            return Err(DeclarationError::RootNotObject {
                name: root.ident().clone(),
            });
        }
        let query = root.clone();
        debug!(query = %query.ident(), types = self.types.declarations.len(), "schema finished");
        Ok(SchemaType::new(self.types, self.implementors, query))
    }

    /// Runs the options resolver and the field collector over `declaration`.
    fn analyze(&self, declaration: Declaration) -> Result<TypeDeclaration, DeclarationError> {
        let Declaration {
            kind,
            ident,
            doc,
            options,
            bases,
            attrs,
            is_type_of,
            resolve_type,
            implements,
        } = declaration;

        let options = TypeOptions::resolve(&ident, kind, options.as_ref())?;

        let mut parents = Vec::with_capacity(bases.len());
        for base in &bases {
            parents.push(self.lookup(base)?);
        }
        let mut interfaces = Vec::with_capacity(options.interfaces.len());
        for name in &options.interfaces {
            let iface = self.lookup(name)?;
            if iface.kind() != DeclarationKind::Interface {
                return Err(DeclarationError::NotAnInterface {
                    type_name: ident,
                    name: name.clone(),
                });
            }
            interfaces.push(iface);
        }
        if kind == DeclarationKind::Object {
            for parent in &parents {
                if parent.kind() == DeclarationKind::Interface
                    && !interfaces.iter().any(|i| Arc::ptr_eq(i, parent))
                {
                    interfaces.push(*parent);
                }
            }
        }
        let bases: Vec<&TypeDeclaration> = parents
            .iter()
            .filter(|p| kind != DeclarationKind::Object || p.kind() != DeclarationKind::Interface)
            .map(|p| Arc::as_ref(p))
            .collect();
        let interface_decls: Vec<&TypeDeclaration> =
            interfaces.iter().map(|i| Arc::as_ref(i)).collect();

        let collected = collect_fields(
            kind,
            &attrs,
            &bases,
            &interface_decls,
            self.config.auto_camelcase,
        );

        let compiled = OnceLock::new();
        let (name, description, fields) = match &options.graphql_type {
            Some(prebuilt) => {
                if collected.own_count > 0 {
                    return Err(DeclarationError::ConflictingFieldDefinition { type_name: ident });
                }
                let expected = match kind {
                    DeclarationKind::Object => TypeKind::Object,
                    DeclarationKind::Interface => TypeKind::Interface,
                    DeclarationKind::Input => TypeKind::InputObject,
                };
                if prebuilt.type_kind() != expected {
                    return Err(DeclarationError::KindMismatch {
                        type_name: ident,
                        kind,
                        found: prebuilt.name().clone(),
                    });
                }
                let fields = reflect_fields(prebuilt);
                let _ = compiled.set(prebuilt.clone());
                (prebuilt.name().clone(), prebuilt.description().cloned(), fields)
            }
            None => (
                options.name.clone().unwrap_or_else(|| ident.clone()),
                options.description.clone().or(doc),
                collected.fields,
            ),
        };

        Ok(TypeDeclaration {
            kind,
            name,
            description,
            is_abstract: options.is_abstract,
            interfaces: interfaces.iter().map(|i| i.ident().clone()).collect(),
            fields,
            attributes: collected.attributes,
            is_type_of,
            resolve_type,
            implements,
            compiled,
            ident,
        })
    }

    fn lookup(&self, ident: &ArcStr) -> Result<&Arc<TypeDeclaration>, DeclarationError> {
        self.types
            .declarations
            .get(ident)
            .ok_or_else(|| DeclarationError::UnknownType { name: ident.clone() })
    }
}

/// Wraps the fields of a prebuilt type back into descriptors, keyed and
/// exposed under their compiled names.
fn reflect_fields(prebuilt: &MetaType) -> IndexMap<ArcStr, FieldDescriptor> {
    match prebuilt {
        MetaType::InputObject(input) => input
            .input_fields
            .iter()
            .map(|arg| {
                let field = meta::Field::new(arg.name.clone(), arg.arg_type.clone());
                let mut descriptor = FieldDescriptor::from_meta(&field);
                if let Some(default) = &arg.default_value {
                    descriptor = descriptor.default_value(default.clone());
                }
                (arg.name.clone(), descriptor.mount(&arg.name, false))
            })
            .collect(),
        _ => prebuilt
            .fields()
            .iter()
            .map(|f| (f.name.clone(), FieldDescriptor::from_meta(f).mount(&f.name, false)))
            .collect(),
    }
}
