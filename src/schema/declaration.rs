//! User-authored type declarations and their field descriptors.

use std::{
    fmt,
    ops::Index,
    sync::{Arc, OnceLock},
};

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::{
    executor::{Context, FieldResult, ResolveInfo, Resolver},
    schema::{
        meta::{self, DeprecationStatus, MetaType, BUILTIN_SCALARS},
        options::OptionsBlock,
    },
    util,
    value::{ConstructionError, Instance, Value},
};

/// Kind of a [`TypeDeclaration`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DeclarationKind {
    /// Output object type.
    Object,
    /// Interface contributing shared fields to objects.
    Interface,
    /// Input object type.
    Input,
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Object => "object",
            Self::Interface => "interface",
            Self::Input => "input object",
        })
    }
}

/// Built-in scalar kinds.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Scalar {
    /// `String`
    String,
    /// `Int`
    Int,
    /// `Float`
    Float,
    /// `Boolean`
    Boolean,
    /// `ID`
    Id,
}

impl Scalar {
    /// GraphQL name of the scalar.
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::Boolean => "Boolean",
            Self::Id => "ID",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "String" => Self::String,
            "Int" => Self::Int,
            "Float" => Self::Float,
            "Boolean" => Self::Boolean,
            "ID" => Self::Id,
            _ => return None,
        })
    }
}

/// Value type of a field, referencing other declarations by identifier.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum TypeRef {
    /// Built-in scalar.
    Scalar(Scalar),
    /// Another declaration (or a registered prebuilt type), by identifier.
    Named(ArcStr),
    /// List of the inner type.
    List(Box<TypeRef>),
    /// Non-null wrapper.
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    /// References a declaration by identifier.
    pub fn named(ident: impl Into<ArcStr>) -> Self {
        Self::Named(ident.into())
    }

    /// Wraps this type into a list.
    #[must_use]
    pub fn list(self) -> Self {
        Self::List(Box::new(self))
    }

    /// Wraps this type into a non-null type.
    #[must_use]
    pub fn non_null(self) -> Self {
        Self::NonNull(Box::new(self))
    }

    /// Reflects a compiled type literal back into a reference.
    pub(crate) fn from_meta(ty: &meta::Type) -> Self {
        match ty {
            meta::Type::Named(n) => {
                Scalar::from_name(n).map_or_else(|| Self::Named(n.clone()), Self::Scalar)
            }
            meta::Type::List(t) => Self::from_meta(t).list(),
            meta::Type::NonNull(t) => Self::from_meta(t).non_null(),
        }
    }
}

impl From<Scalar> for TypeRef {
    fn from(s: Scalar) -> Self {
        Self::Scalar(s)
    }
}

/// Declared argument of a field.
#[derive(Clone, Debug, PartialEq)]
pub struct ArgumentDescriptor {
    pub(crate) arg_type: TypeRef,
    pub(crate) description: Option<ArcStr>,
    pub(crate) default_value: Option<Value>,
}

impl ArgumentDescriptor {
    /// Declares an argument of type `arg_type`.
    pub fn new(arg_type: impl Into<TypeRef>) -> Self {
        Self {
            arg_type: arg_type.into(),
            description: None,
            default_value: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// A typed, named slot of a declaration.
///
/// Once mounted on a declaration the descriptor doubles as the field handle
/// passed to the [query builder](crate::query).
#[derive(Clone)]
pub struct FieldDescriptor {
    attname: ArcStr,
    exposed_name: ArcStr,
    name_override: Option<ArcStr>,
    field_type: TypeRef,
    resolver: Option<Resolver>,
    arguments: IndexMap<ArcStr, ArgumentDescriptor>,
    description: Option<ArcStr>,
    deprecation_status: DeprecationStatus,
    default_value: Option<Value>,
}

impl FieldDescriptor {
    /// Declares a field of type `field_type`.
    pub fn new(field_type: impl Into<TypeRef>) -> Self {
        Self {
            attname: ArcStr::new(),
            exposed_name: ArcStr::new(),
            name_override: None,
            field_type: field_type.into(),
            resolver: None,
            arguments: IndexMap::new(),
            description: None,
            deprecation_status: DeprecationStatus::Current,
            default_value: None,
        }
    }

    /// Overrides the exposed name.
    #[must_use]
    pub fn name(mut self, name: impl Into<ArcStr>) -> Self {
        self.name_override = Some(name.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the field deprecated.
    #[must_use]
    pub fn deprecated(mut self, reason: Option<&str>) -> Self {
        self.deprecation_status = DeprecationStatus::Deprecated(reason.map(ArcStr::from));
        self
    }

    /// Adds an argument; arguments keep their declared names.
    #[must_use]
    pub fn argument(mut self, name: impl Into<ArcStr>, argument: ArgumentDescriptor) -> Self {
        self.arguments.insert(name.into(), argument);
        self
    }

    /// Sets the default value, used by input object fields.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Binds a resolver.
    #[must_use]
    pub fn resolver<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Context<'_>, &ResolveInfo<'_>) -> FieldResult + Send + Sync + 'static,
    {
        self.resolver = Some(Arc::new(f));
        self
    }

    /// Wraps a raw engine field definition.
    pub fn from_meta(field: &meta::Field) -> Self {
        let mut descriptor = Self::new(TypeRef::from_meta(&field.field_type)).name(field.name.clone());
        descriptor.description = field.description.clone();
        descriptor.deprecation_status = field.deprecation_status.clone();
        for arg in &field.arguments {
            descriptor.arguments.insert(
                arg.name.clone(),
                ArgumentDescriptor {
                    arg_type: TypeRef::from_meta(&arg.arg_type),
                    description: arg.description.clone(),
                    default_value: arg.default_value.clone(),
                },
            );
        }
        descriptor
    }

    /// Mounts the descriptor under `attname`, fixing its exposed name.
    pub(crate) fn mount(mut self, attname: &ArcStr, auto_camelcase: bool) -> Self {
        self.attname = attname.clone();
        self.exposed_name = match &self.name_override {
            Some(n) => n.clone(),
            None => util::exposed_name(attname, auto_camelcase).as_ref().into(),
        };
        self
    }

    /// Attribute name the field is mounted under.
    pub fn attname(&self) -> &ArcStr {
        &self.attname
    }

    /// Name exposed in the compiled type.
    pub fn exposed_name(&self) -> &ArcStr {
        &self.exposed_name
    }

    /// Declared value type.
    pub fn field_type(&self) -> &TypeRef {
        &self.field_type
    }

    /// Bound resolver, if any.
    pub fn resolver_fn(&self) -> Option<&Resolver> {
        self.resolver.as_ref()
    }

    /// Declared arguments in declaration order.
    pub fn arguments(&self) -> &IndexMap<ArcStr, ArgumentDescriptor> {
        &self.arguments
    }

    /// Description, if any.
    pub fn description_text(&self) -> Option<&ArcStr> {
        self.description.as_ref()
    }

    /// Deprecation status.
    pub fn deprecation_status(&self) -> &DeprecationStatus {
        &self.deprecation_status
    }

    /// Default value of an input field.
    pub fn default(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("attname", &self.attname)
            .field("exposed_name", &self.exposed_name)
            .field("field_type", &self.field_type)
            .field("has_resolver", &self.resolver.is_some())
            .finish_non_exhaustive()
    }
}

/// Setter invoked for keyword construction arguments naming a property.
pub type Setter = Arc<dyn Fn(&mut Instance, Value) + Send + Sync>;

/// Getter computing a property from an instance.
pub type Getter = Arc<dyn Fn(&Instance) -> Value + Send + Sync>;

/// A non-field attribute computed from, or stored into, an instance.
#[derive(Clone, Default)]
pub struct Property {
    getter: Option<Getter>,
    setter: Option<Setter>,
}

impl Property {
    /// A property without accessors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a getter.
    #[must_use]
    pub fn getter<F>(mut self, f: F) -> Self
    where
        F: Fn(&Instance) -> Value + Send + Sync + 'static,
    {
        self.getter = Some(Arc::new(f));
        self
    }

    /// Adds a setter, making the property settable at construction.
    #[must_use]
    pub fn setter<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Instance, Value) + Send + Sync + 'static,
    {
        self.setter = Some(Arc::new(f));
        self
    }

    pub(crate) fn get_fn(&self) -> Option<&Getter> {
        self.getter.as_ref()
    }

    pub(crate) fn set_fn(&self) -> Option<&Setter> {
        self.setter.as_ref()
    }
}

/// One member of a declaration body.
#[derive(Clone)]
pub enum Attribute {
    /// A field slot.
    Field(FieldDescriptor),
    /// A raw engine field definition.
    EngineField(meta::Field),
    /// A property; never a field.
    Property(Property),
    /// A plain constant; never a field.
    Constant(Value),
}

impl Attribute {
    /// Returns the field descriptor for field-shaped attributes.
    pub(crate) fn as_field(&self) -> Option<FieldDescriptor> {
        match self {
            Self::Field(f) => Some(f.clone()),
            Self::EngineField(f) => Some(FieldDescriptor::from_meta(f)),
            Self::Property(_) | Self::Constant(_) => None,
        }
    }
}

/// Custom type-membership predicate of an object declaration.
pub type IsTypeOfFn = Arc<dyn Fn(&Value, &Context<'_>) -> bool + Send + Sync>;

/// Custom type-resolution hook of an interface declaration, returning the
/// compiled name of the concrete object type.
pub type ResolveTypeFn = Arc<dyn Fn(&Value, &Context<'_>) -> Option<ArcStr> + Send + Sync>;

/// Hook run when an object declares an interface; may reject the object.
pub type ImplementsFn = Arc<dyn Fn(&TypeDeclaration) -> Result<(), String> + Send + Sync>;

/// Raw declaration, as written by the application author.
///
/// Passed to [`Registry::register`](crate::Registry::register).
#[derive(Clone)]
pub struct Declaration {
    pub(crate) kind: DeclarationKind,
    pub(crate) ident: ArcStr,
    pub(crate) doc: Option<ArcStr>,
    pub(crate) options: Option<OptionsBlock>,
    pub(crate) bases: Vec<ArcStr>,
    pub(crate) attrs: IndexMap<ArcStr, Attribute>,
    pub(crate) is_type_of: Option<IsTypeOfFn>,
    pub(crate) resolve_type: Option<ResolveTypeFn>,
    pub(crate) implements: Option<ImplementsFn>,
}

impl Declaration {
    fn new(kind: DeclarationKind, ident: impl Into<ArcStr>) -> Self {
        Self {
            kind,
            ident: ident.into(),
            doc: None,
            options: None,
            bases: Vec::new(),
            attrs: IndexMap::new(),
            is_type_of: None,
            resolve_type: None,
            implements: None,
        }
    }

    /// Starts an object declaration.
    pub fn object(ident: impl Into<ArcStr>) -> Self {
        Self::new(DeclarationKind::Object, ident)
    }

    /// Starts an interface declaration.
    pub fn interface(ident: impl Into<ArcStr>) -> Self {
        Self::new(DeclarationKind::Interface, ident)
    }

    /// Starts an input object declaration.
    pub fn input(ident: impl Into<ArcStr>) -> Self {
        Self::new(DeclarationKind::Input, ident)
    }

    /// Sets the documentation string, the default description.
    #[must_use]
    pub fn doc(mut self, doc: impl Into<ArcStr>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Attaches the options block.
    #[must_use]
    pub fn options(mut self, options: OptionsBlock) -> Self {
        self.options = Some(options);
        self
    }

    /// Adds a parent declaration whose fields are inherited.
    #[must_use]
    pub fn base(mut self, ident: impl Into<ArcStr>) -> Self {
        self.bases.push(ident.into());
        self
    }

    /// Adds a member to the body.
    ///
    /// Re-assigning a name replaces the member but keeps its position.
    #[must_use]
    pub fn attribute(mut self, name: impl Into<ArcStr>, attr: Attribute) -> Self {
        self.attrs.insert(name.into(), attr);
        self
    }

    /// Adds a field.
    #[must_use]
    pub fn field(self, name: impl Into<ArcStr>, field: FieldDescriptor) -> Self {
        self.attribute(name, Attribute::Field(field))
    }

    /// Adds a raw engine field definition.
    #[must_use]
    pub fn engine_field(self, name: impl Into<ArcStr>, field: meta::Field) -> Self {
        self.attribute(name, Attribute::EngineField(field))
    }

    /// Adds a property.
    #[must_use]
    pub fn property(self, name: impl Into<ArcStr>, property: Property) -> Self {
        self.attribute(name, Attribute::Property(property))
    }

    /// Adds a plain constant.
    #[must_use]
    pub fn constant(self, name: impl Into<ArcStr>, value: impl Into<Value>) -> Self {
        self.attribute(name, Attribute::Constant(value.into()))
    }

    /// Replaces the nominal type-membership predicate of an object.
    #[must_use]
    pub fn is_type_of<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Context<'_>) -> bool + Send + Sync + 'static,
    {
        self.is_type_of = Some(Arc::new(f));
        self
    }

    /// Sets the type-resolution hook of an interface.
    #[must_use]
    pub fn resolve_type<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Context<'_>) -> Option<ArcStr> + Send + Sync + 'static,
    {
        self.resolve_type = Some(Arc::new(f));
        self
    }

    /// Sets the hook run for every object implementing this interface.
    #[must_use]
    pub fn implements<F>(mut self, f: F) -> Self
    where
        F: Fn(&TypeDeclaration) -> Result<(), String> + Send + Sync + 'static,
    {
        self.implements = Some(Arc::new(f));
        self
    }
}

/// Analyzed declaration.
///
/// Owns its merged field set and, once materialized, its compiled type.
pub struct TypeDeclaration {
    pub(crate) kind: DeclarationKind,
    pub(crate) ident: ArcStr,
    pub(crate) name: ArcStr,
    pub(crate) description: Option<ArcStr>,
    pub(crate) is_abstract: bool,
    pub(crate) interfaces: Vec<ArcStr>,
    pub(crate) fields: IndexMap<ArcStr, FieldDescriptor>,
    pub(crate) attributes: IndexMap<ArcStr, Attribute>,
    pub(crate) is_type_of: Option<IsTypeOfFn>,
    pub(crate) resolve_type: Option<ResolveTypeFn>,
    pub(crate) implements: Option<ImplementsFn>,
    pub(crate) compiled: OnceLock<Arc<MetaType>>,
}

impl TypeDeclaration {
    /// Declaration kind.
    pub fn kind(&self) -> DeclarationKind {
        self.kind
    }

    /// Declaration identifier.
    pub fn ident(&self) -> &ArcStr {
        &self.ident
    }

    /// Compiled type name.
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// Compiled type description.
    pub fn description(&self) -> Option<&ArcStr> {
        self.description.as_ref()
    }

    /// Whether materialization is suppressed.
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Identifiers of implemented interfaces, in declaration order.
    pub fn interfaces(&self) -> &[ArcStr] {
        &self.interfaces
    }

    /// Merged field set keyed by attribute name.
    pub fn fields(&self) -> &IndexMap<ArcStr, FieldDescriptor> {
        &self.fields
    }

    /// Field handle by attribute name.
    pub fn field(&self, attname: &str) -> Option<&FieldDescriptor> {
        self.fields.get(attname)
    }

    /// Field handle by exposed name.
    pub fn field_by_exposed_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.values().find(|f| f.exposed_name() == name)
    }

    /// Property attribute by name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        match self.attributes.get(name) {
            Some(Attribute::Property(p)) => Some(p),
            _ => None,
        }
    }

    /// Constant attribute by name.
    pub fn constant(&self, name: &str) -> Option<&Value> {
        match self.attributes.get(name) {
            Some(Attribute::Constant(v)) => Some(v),
            _ => None,
        }
    }

    /// The compiled type, if already materialized.
    pub fn compiled_type(&self) -> Option<&Arc<MetaType>> {
        self.compiled.get()
    }

    /// Constructs an instance, see [`Instance`].
    pub fn instantiate<K: AsRef<str>>(
        self: &Arc<Self>,
        args: Vec<Value>,
        kwargs: impl IntoIterator<Item = (K, Value)>,
    ) -> Result<Instance, ConstructionError> {
        Instance::construct(self, args, kwargs)
    }
}

impl Index<&str> for TypeDeclaration {
    type Output = FieldDescriptor;

    /// # Panics
    ///
    /// If no field is mounted under `attname`.
    fn index(&self, attname: &str) -> &FieldDescriptor {
        match self.fields.get(attname) {
            Some(f) => f,
            None => panic!("`{}` has no field `{attname}`", self.ident),
        }
    }
}

impl fmt::Debug for TypeDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDeclaration")
            .field("kind", &self.kind)
            .field("ident", &self.ident)
            .field("name", &self.name)
            .field("is_abstract", &self.is_abstract)
            .field("interfaces", &self.interfaces)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Whether `name` is one of the built-in scalars.
pub(crate) fn is_builtin_scalar(name: &str) -> bool {
    BUILTIN_SCALARS.contains(&name)
}
