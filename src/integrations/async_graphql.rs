use std::{any::Any, sync::Arc};

use arcstr::ArcStr;
use async_graphql::{
    Name, Number, Request, Value as ConstValue,
    dynamic::{
        Enum, EnumItem, Field, FieldFuture, FieldValue, InputObject, InputValue, Interface,
        InterfaceField, Object, ResolverContext, Schema, TypeRef,
    },
};
use derive_more::with_trait::{Display, Error};
use indexmap::IndexMap;
use tracing::debug;

use crate::{
    executor::{Arguments, Context, FieldResult, ResolveInfo, Resolver, default_resolve},
    schema::{
        declaration::{DeclarationKind, FieldDescriptor, TypeDeclaration, is_builtin_scalar},
        error::DeclarationError,
        meta::{self, MetaType},
        model::SchemaType,
    },
    value::Value,
};

/// Error of building or querying an engine schema.
#[derive(Debug, Display, Error)]
pub enum ClientError {
    /// A declaration failed to materialize.
    #[display("Invalid declaration: {source}")]
    Declaration {
        /// Underlying error.
        source: DeclarationError,
    },

    /// The engine rejected the compiled type graph.
    #[display("Failed to build schema: {message}")]
    SchemaBuild {
        /// Engine message.
        message: String,
    },

    /// The query produced errors.
    #[display("Query failed: {}", messages.join("; "))]
    ExecutionFailed {
        /// Engine messages, in reporting order.
        messages: Vec<String>,
    },

    /// The response data couldn't be turned into JSON.
    #[display("Malformed response data: {source}")]
    Json {
        /// Underlying error.
        source: serde_json::Error,
    },
}

impl From<DeclarationError> for ClientError {
    fn from(source: DeclarationError) -> Self {
        Self::Declaration { source }
    }
}

/// Application data made available to resolvers as [`Context`].
#[derive(Clone)]
pub struct ContextData(Arc<dyn Any + Send + Sync>);

impl ContextData {
    /// Wraps application data.
    pub fn new<T: Any + Send + Sync>(data: T) -> Self {
        Self(Arc::new(data))
    }
}

/// Everything a generated field resolver needs.
struct FieldBinding {
    schema: SchemaType,
    parent_type: ArcStr,
    field_name: ArcStr,
    attname: ArcStr,
    field_type: meta::Type,
    arguments: Vec<(ArcStr, Option<Value>)>,
    resolver: Option<Resolver>,
}

impl FieldBinding {
    fn new(
        schema: &SchemaType,
        parent_type: &ArcStr,
        field: &meta::Field,
        descriptor: Option<&FieldDescriptor>,
    ) -> Self {
        Self {
            schema: schema.clone(),
            parent_type: parent_type.clone(),
            field_name: field.name.clone(),
            attname: descriptor.map_or_else(|| field.name.clone(), |d| d.attname().clone()),
            field_type: field.field_type.clone(),
            arguments: field
                .arguments
                .iter()
                .map(|a| (a.name.clone(), a.default_value.clone()))
                .collect(),
            resolver: descriptor.and_then(|d| d.resolver_fn().cloned()),
        }
    }

    fn resolve<'a>(&self, ctx: &ResolverContext<'a>) -> async_graphql::Result<Option<FieldValue<'a>>> {
        let source = ctx
            .parent_value
            .downcast_ref::<Value>()
            .cloned()
            .unwrap_or(Value::Null);
        let data = ctx.ctx.data_opt::<ContextData>();
        let context = data.map_or_else(Context::empty, |d| Context::new(&*d.0));

        let value = match &self.resolver {
            Some(resolver) => {
                let args = Arguments::new(
                    self.arguments
                        .iter()
                        .filter_map(|(name, default)| {
                            let given = ctx.args.get(name).map(|v| from_const(v.as_value()));
                            given.or_else(|| default.clone()).map(|v| (name.clone(), v))
                        })
                        .collect(),
                );
                let info = ResolveInfo::new(&self.field_name, &self.parent_type, &args, &self.schema);
                let result: FieldResult = resolver(&source, &context, &info);
                result.map_err(|e| async_graphql::Error::new(e.message()))?
            }
            None => default_resolve(&source, &self.attname),
        };
        self.output(value, &self.field_type, &context)
    }

    /// Converts a resolved value to the engine representation of `ty`.
    fn output<'a>(
        &self,
        value: Value,
        ty: &meta::Type,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Option<FieldValue<'a>>> {
        if value.is_null() {
            return Ok(None);
        }
        match ty {
            meta::Type::NonNull(inner) => self.output(value, inner, ctx),
            meta::Type::List(inner) => {
                let Value::List(items) = value else {
                    return Err(async_graphql::Error::new(format!(
                        "Expected a list for `{}.{}`",
                        self.parent_type, self.field_name,
                    )));
                };
                let items = items
                    .into_iter()
                    .map(|item| Ok(self.output(item, inner, ctx)?.unwrap_or(FieldValue::NULL)))
                    .collect::<async_graphql::Result<Vec<_>>>()?;
                Ok(Some(FieldValue::list(items)))
            }
            meta::Type::Named(name) => match self.schema.declaration(name) {
                Some(decl) if decl.kind() == DeclarationKind::Interface => {
                    let concrete = self
                        .schema
                        .resolve_type(decl.ident(), &value, ctx)
                        .ok_or_else(|| {
                            async_graphql::Error::new(format!(
                                "Can't resolve the concrete type of `{name}` for `{}.{}`",
                                self.parent_type, self.field_name,
                            ))
                        })?;
                    Ok(Some(FieldValue::owned_any(value).with_type(concrete.to_string())))
                }
                Some(_) => Ok(Some(FieldValue::owned_any(value))),
                None if is_leaf(&self.schema, name) => Ok(Some(FieldValue::value(to_const(&value)))),
                None => Ok(Some(FieldValue::owned_any(value))),
            },
        }
    }
}

fn is_leaf(schema: &SchemaType, name: &str) -> bool {
    is_builtin_scalar(name)
        || schema
            .prebuilt_types()
            .any(|t| t.name() == name && matches!(**t, MetaType::Enum(_)))
}

fn type_ref(ty: &meta::Type) -> TypeRef {
    match ty {
        meta::Type::Named(n) => TypeRef::named(n.to_string()),
        meta::Type::List(t) => TypeRef::List(Box::new(type_ref(t))),
        meta::Type::NonNull(t) => TypeRef::NonNull(Box::new(type_ref(t))),
    }
}

fn input_value(arg: &meta::Argument) -> InputValue {
    let mut input = InputValue::new(arg.name.to_string(), type_ref(&arg.arg_type));
    if let Some(description) = &arg.description {
        input = input.description(description.to_string());
    }
    if let Some(default) = &arg.default_value {
        input = input.default_value(to_const(default));
    }
    input
}

fn output_field(
    schema: &SchemaType,
    parent_type: &ArcStr,
    decl: Option<&TypeDeclaration>,
    field: &meta::Field,
) -> Field {
    let descriptor = decl.and_then(|d| d.field_by_exposed_name(&field.name));
    let binding = Arc::new(FieldBinding::new(schema, parent_type, field, descriptor));
    let mut out = Field::new(field.name.to_string(), type_ref(&field.field_type), move |ctx| {
        let binding = binding.clone();
        FieldFuture::new(async move { binding.resolve(&ctx) })
    });
    if let Some(description) = &field.description {
        out = out.description(description.to_string());
    }
    if field.deprecation_status.is_deprecated() {
        out = out.deprecation(field.deprecation_status.reason());
    }
    for arg in &field.arguments {
        out = out.argument(input_value(arg));
    }
    out
}

fn interface_field(field: &meta::Field) -> InterfaceField {
    let mut out = InterfaceField::new(field.name.to_string(), type_ref(&field.field_type));
    if let Some(description) = &field.description {
        out = out.description(description.to_string());
    }
    if field.deprecation_status.is_deprecated() {
        out = out.deprecation(field.deprecation_status.reason());
    }
    for arg in &field.arguments {
        out = out.argument(input_value(arg));
    }
    out
}

enum EngineType {
    Object(Object),
    Interface(Interface),
    InputObject(InputObject),
    Enum(Enum),
}

fn engine_type(
    schema: &SchemaType,
    decl: Option<&TypeDeclaration>,
    compiled: &MetaType,
) -> EngineType {
    match compiled {
        MetaType::Object(o) => {
            let mut object = Object::new(o.name.to_string());
            if let Some(description) = &o.description {
                object = object.description(description.to_string());
            }
            for iface in &o.interface_names {
                object = object.implement(iface.to_string());
            }
            for field in &o.fields {
                object = object.field(output_field(schema, &o.name, decl, field));
            }
            EngineType::Object(object)
        }
        MetaType::Interface(i) => {
            let mut interface = Interface::new(i.name.to_string());
            if let Some(description) = &i.description {
                interface = interface.description(description.to_string());
            }
            for field in &i.fields {
                interface = interface.field(interface_field(field));
            }
            EngineType::Interface(interface)
        }
        MetaType::InputObject(i) => {
            let mut input = InputObject::new(i.name.to_string());
            if let Some(description) = &i.description {
                input = input.description(description.to_string());
            }
            for field in &i.input_fields {
                input = input.field(input_value(field));
            }
            EngineType::InputObject(input)
        }
        MetaType::Enum(e) => {
            let mut out = Enum::new(e.name.to_string());
            if let Some(description) = &e.description {
                out = out.description(description.to_string());
            }
            for value in &e.values {
                let mut item = EnumItem::new(value.name.to_string());
                if let Some(description) = &value.description {
                    item = item.description(description.to_string());
                }
                if value.deprecation_status.is_deprecated() {
                    item = item.deprecation(value.deprecation_status.reason());
                }
                out = out.item(item);
            }
            EngineType::Enum(out)
        }
    }
}

/// Converts the compiled type graph of `schema` into an engine schema.
///
/// Every non-abstract declaration is materialized on the way. Fields
/// without a resolver read the attribute they are mounted under from the
/// parent value; interface-typed results are tagged with the concrete type
/// picked by [`SchemaType::resolve_type`].
pub fn build_schema(schema: &SchemaType) -> Result<Schema, ClientError> {
    let query = schema.query_type().name().to_string();
    let mut builder = Schema::build(&query, None, None);

    let mut count = 0;
    for decl in schema.declarations().filter(|d| !d.is_abstract()) {
        let compiled = schema.compiled_type(decl.ident())?;
        builder = match engine_type(schema, Some(decl), compiled) {
            EngineType::Object(t) => builder.register(t),
            EngineType::Interface(t) => builder.register(t),
            EngineType::InputObject(t) => builder.register(t),
            EngineType::Enum(t) => builder.register(t),
        };
        count += 1;
    }
    for prebuilt in schema.prebuilt_types() {
        builder = match engine_type(schema, None, prebuilt) {
            EngineType::Object(t) => builder.register(t),
            EngineType::Interface(t) => builder.register(t),
            EngineType::InputObject(t) => builder.register(t),
            EngineType::Enum(t) => builder.register(t),
        };
        count += 1;
    }

    debug!(%query, types = count, "building engine schema");
    builder.finish().map_err(|e| ClientError::SchemaBuild {
        message: e.to_string(),
    })
}

/// Executes queries against a [`SchemaType`].
#[derive(Clone)]
pub struct Client {
    schema: Schema,
}

impl Client {
    /// Builds the engine schema of `schema`.
    pub fn new(schema: &SchemaType) -> Result<Self, ClientError> {
        Ok(Self {
            schema: build_schema(schema)?,
        })
    }

    /// The underlying engine schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Executes `query` without application data.
    pub async fn execute(&self, query: impl Into<String>) -> Result<serde_json::Value, ClientError> {
        self.run(Request::new(query)).await
    }

    /// Executes `query` with `data` available to resolvers as [`Context`].
    pub async fn execute_with(
        &self,
        query: impl Into<String>,
        data: ContextData,
    ) -> Result<serde_json::Value, ClientError> {
        self.run(Request::new(query).data(data)).await
    }

    async fn run(&self, request: Request) -> Result<serde_json::Value, ClientError> {
        let response = self.schema.execute(request).await;
        if !response.errors.is_empty() {
            return Err(ClientError::ExecutionFailed {
                messages: response.errors.into_iter().map(|e| e.message).collect(),
            });
        }
        response
            .data
            .into_json()
            .map_err(|source| ClientError::Json { source })
    }
}

/// Converts an engine value into a [`Value`].
pub fn from_const(value: &ConstValue) -> Value {
    match value {
        ConstValue::Null => Value::Null,
        ConstValue::Boolean(b) => Value::Boolean(*b),
        ConstValue::Number(n) => match n.as_i64().and_then(|i| i32::try_from(i).ok()) {
            Some(i) => Value::Int(i),
            None => n.as_f64().map_or(Value::Null, Value::Float),
        },
        ConstValue::String(s) => Value::String(s.as_str().into()),
        ConstValue::Enum(e) => Value::Enum(e.as_str().into()),
        ConstValue::Binary(b) => Value::List(b.iter().map(|x| Value::Int(i32::from(*x))).collect()),
        ConstValue::List(items) => Value::List(items.iter().map(from_const).collect()),
        ConstValue::Object(map) => Value::Map(
            map.iter()
                .map(|(k, v)| (ArcStr::from(k.as_str()), from_const(v)))
                .collect::<IndexMap<_, _>>(),
        ),
    }
}

/// Converts a [`Value`] into an engine value.
///
/// Instances become objects of their stored attributes.
pub fn to_const(value: &Value) -> ConstValue {
    match value {
        Value::Unset | Value::Null => ConstValue::Null,
        Value::Boolean(b) => ConstValue::Boolean(*b),
        Value::Int(i) => ConstValue::Number(Number::from(*i)),
        Value::Float(f) => Number::from_f64(*f).map_or(ConstValue::Null, ConstValue::Number),
        Value::String(s) => ConstValue::String(s.to_string()),
        Value::Enum(e) => ConstValue::Enum(Name::new(e)),
        Value::List(items) => ConstValue::List(items.iter().map(to_const).collect()),
        Value::Map(map) => {
            ConstValue::Object(map.iter().map(|(k, v)| (Name::new(k), to_const(v))).collect())
        }
        Value::Object(instance) => ConstValue::Object(
            instance
                .values()
                .map(|(k, v)| (Name::new(k), to_const(v)))
                .collect(),
        ),
    }
}
