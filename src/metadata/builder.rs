//! Fluent construction of in-memory metadata.
//!
//! [`MetadataBuilder`] allocates tokens table by table and fills a [`MetadataStore`]. Types are
//! described through closures over a [`TypeDefBuilder`], which in turn hands out
//! [`MethodBuilder`]s and [`PropertyBuilder`]s. Property accessors are synthesized as regular
//! methods of the declaring type (`get_X` / `set_X`, SpecialName), exactly as a compiler emits
//! them.
//!
//! # Example
//!
//! ```rust
//! use dotbridge::metadata::{MetadataBuilder, TypeSig};
//!
//! let mut builder = MetadataBuilder::new("corlib.dll");
//! let object = builder.class("System", "Object", |t| t);
//! let void = builder.class("System", "Void", |t| t.extends(object));
//! let node = builder.define_type("Demo", "Node");
//! builder.with_type(node, |t| {
//!     t.extends(object)
//!         .field("next", node)
//!         .method("Clear", void, |m| m)
//! })?;
//!
//! let store = builder.build();
//! assert_eq!(store.type_count(), 3);
//! # Ok::<(), dotbridge::Error>(())
//! ```

use crate::metadata::{
    flags::{
        CallingConvention, MemberAccess, MethodModifiers, TypeAttributes, MEMBER_ACCESS_MASK,
    },
    rows::{
        AttributeOwner, CustomAttributeArgument, CustomAttributeNamedArgument, CustomAttributeRow,
        FieldRow, GenericParamOwner, GenericParamRow, MethodDefRow, ParamRow, PropertyRow,
        TypeDefRow, TypeRefRow, CONSTRUCTOR_NAME, TYPE_INITIALIZER_NAME,
    },
    signature::TypeSig,
    source::{MetadataSource, MetadataStore},
    token::{Token, TABLE},
};
use crate::{Error::TypeNotFound, Result};

/// Default flags of a type created by the builder (public class)
const DEFAULT_TYPE_FLAGS: u32 = 0x0010_0001;
/// `HideBySig`, the flag every builder method carries
const HIDE_BY_SIG: u32 = 0x0080;
/// `FieldAttributes.Static`
const FIELD_STATIC: u32 = 0x0010;

/// Per-table row counters
#[derive(Default)]
struct RowCounters {
    type_def: u32,
    type_ref: u32,
    method: u32,
    field: u32,
    property: u32,
    generic_param: u32,
    custom_attribute: u32,
}

/// Builds a [`MetadataStore`] one type at a time
pub struct MetadataBuilder {
    store: MetadataStore,
    rows: RowCounters,
}

impl MetadataBuilder {
    /// Create a builder for the named module
    #[must_use]
    pub fn new(module: &str) -> Self {
        MetadataBuilder {
            store: MetadataStore::new(module),
            rows: RowCounters::default(),
        }
    }

    fn next_token(counter: &mut u32, table: u8) -> Token {
        *counter += 1;
        Token::from_parts(table, *counter)
    }

    /// Reserve a `TypeDef` token with an empty public class row.
    ///
    /// Use this to reference a type before describing it (self- and mutually-referencing types).
    pub fn define_type(&mut self, namespace: &str, name: &str) -> Token {
        let row = self.type_def_row(namespace, name);
        let token = row.token;
        self.store.insert_type_def(row);
        token
    }

    fn type_def_row(&mut self, namespace: &str, name: &str) -> TypeDefRow {
        TypeDefRow {
            token: Self::next_token(&mut self.rows.type_def, TABLE::TYPE_DEF),
            namespace: namespace.to_string(),
            name: name.to_string(),
            flags: DEFAULT_TYPE_FLAGS,
            extends: None,
            interfaces: Vec::new(),
            generic_params: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// Describe a previously defined type
    ///
    /// ## Arguments
    /// * 'token' - A token returned by [`MetadataBuilder::define_type`]
    /// * 'describe' - Closure adding base, members and generic parameters
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeNotFound`] if `token` was not defined by this builder.
    pub fn with_type<F>(&mut self, token: Token, describe: F) -> Result<Token>
    where
        F: FnOnce(TypeDefBuilder<'_>) -> TypeDefBuilder<'_>,
    {
        let row = self.store.type_def(token).ok_or(TypeNotFound(token))?;
        Ok(self.describe_type(row, describe))
    }

    /// Define and describe a type in one step
    pub fn class<F>(&mut self, namespace: &str, name: &str, describe: F) -> Token
    where
        F: FnOnce(TypeDefBuilder<'_>) -> TypeDefBuilder<'_>,
    {
        let row = self.type_def_row(namespace, name);
        self.describe_type(row, describe)
    }

    fn describe_type<F>(&mut self, row: TypeDefRow, describe: F) -> Token
    where
        F: FnOnce(TypeDefBuilder<'_>) -> TypeDefBuilder<'_>,
    {
        let finished = describe(TypeDefBuilder { builder: self, row });
        let row = finished.row;
        let token = row.token;
        self.store.insert_type_def(row);
        token
    }

    /// Add a `TypeRef` row naming a type by namespace and name
    pub fn type_ref(&mut self, namespace: &str, name: &str) -> Token {
        let token = Self::next_token(&mut self.rows.type_ref, TABLE::TYPE_REF);
        self.store.insert_type_ref(TypeRefRow {
            token,
            namespace: namespace.to_string(),
            name: name.to_string(),
        });
        token
    }

    /// Attach a custom attribute instance to `owner`
    ///
    /// ## Arguments
    /// * 'owner' - Attributed entity
    /// * 'constructor' - The attribute class constructor
    /// * 'describe' - Closure adding positional and named arguments
    pub fn attribute<F>(&mut self, owner: AttributeOwner, constructor: Token, describe: F) -> Token
    where
        F: FnOnce(AttributeBuilder) -> AttributeBuilder,
    {
        let token = Self::next_token(&mut self.rows.custom_attribute, TABLE::CUSTOM_ATTRIBUTE);
        let finished = describe(AttributeBuilder {
            row: CustomAttributeRow {
                token,
                owner,
                constructor,
                fixed_args: Vec::new(),
                named_args: Vec::new(),
            },
        });
        self.store.insert_custom_attribute(finished.row);
        token
    }

    /// Look up a method of `type_token` by name
    #[must_use]
    pub fn method_by_name(&self, type_token: Token, name: &str) -> Option<Token> {
        self.store.method_by_name(type_token, name)
    }

    /// Look up a field of `type_token` by name
    #[must_use]
    pub fn field_by_name(&self, type_token: Token, name: &str) -> Option<Token> {
        self.store.field_by_name(type_token, name)
    }

    /// Access the store being built
    #[must_use]
    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> MetadataStore {
        self.store
    }
}

/// Describes one type definition; obtained from [`MetadataBuilder::with_type`]
pub struct TypeDefBuilder<'a> {
    builder: &'a mut MetadataBuilder,
    row: TypeDefRow,
}

impl TypeDefBuilder<'_> {
    /// Token of the type being described
    #[must_use]
    pub fn token(&self) -> Token {
        self.row.token
    }

    /// Replace the raw `TypeAttributes`
    #[must_use]
    pub fn flags(mut self, flags: u32) -> Self {
        self.row.flags = flags;
        self
    }

    /// Mark the type as an interface
    #[must_use]
    pub fn interface(mut self) -> Self {
        self.row.flags |= (TypeAttributes::INTERFACE | TypeAttributes::ABSTRACT).bits();
        self
    }

    /// Set the base type
    #[must_use]
    pub fn extends(mut self, base: impl Into<TypeSig>) -> Self {
        self.row.extends = Some(base.into());
        self
    }

    /// Add an implemented interface
    #[must_use]
    pub fn implements(mut self, interface: impl Into<TypeSig>) -> Self {
        self.row.interfaces.push(interface.into());
        self
    }

    /// Append a type-level generic parameter
    #[must_use]
    pub fn generic_param(mut self, name: &str) -> Self {
        let token = MetadataBuilder::next_token(
            &mut self.builder.rows.generic_param,
            TABLE::GENERIC_PARAM,
        );
        let number = u16::try_from(self.row.generic_params.len()).unwrap_or(u16::MAX);
        self.builder.store.insert_generic_param(GenericParamRow {
            token,
            name: name.to_string(),
            number,
            flags: 0,
            owner: GenericParamOwner::Type(self.row.token),
        });
        self.row.generic_params.push(token);
        self
    }

    /// Add a field with explicit raw `FieldAttributes`
    #[must_use]
    pub fn field_with(mut self, name: &str, field_type: impl Into<TypeSig>, flags: u32) -> Self {
        let token = MetadataBuilder::next_token(&mut self.builder.rows.field, TABLE::FIELD);
        self.builder.store.insert_field(FieldRow {
            token,
            name: name.to_string(),
            flags,
            field_type: field_type.into(),
        });
        self.row.fields.push(token);
        self
    }

    /// Add a public instance field
    #[must_use]
    pub fn field(self, name: &str, field_type: impl Into<TypeSig>) -> Self {
        self.field_with(name, field_type, MemberAccess::Public.bits())
    }

    /// Add a public static field
    #[must_use]
    pub fn static_field(self, name: &str, field_type: impl Into<TypeSig>) -> Self {
        self.field_with(name, field_type, MemberAccess::Public.bits() | FIELD_STATIC)
    }

    fn push_method(&mut self, name: &str, flags: u32, return_type: TypeSig) -> MethodBuilder {
        let token = MetadataBuilder::next_token(&mut self.builder.rows.method, TABLE::METHOD_DEF);
        MethodBuilder {
            row: MethodDefRow {
                token,
                name: name.to_string(),
                flags,
                calling_convention: CallingConvention::HAS_THIS,
                declaring_type: self.row.token,
                return_type,
                params: Vec::new(),
            },
        }
    }

    fn finish_method(&mut self, method: MethodBuilder) -> Token {
        let token = method.row.token;
        self.builder.store.insert_method(method.row);
        self.row.methods.push(token);
        token
    }

    /// Add a public instance method
    ///
    /// ## Arguments
    /// * 'name' - Method name
    /// * 'returns' - Return type
    /// * 'describe' - Closure adding parameters and modifiers
    #[must_use]
    pub fn method<F>(mut self, name: &str, returns: impl Into<TypeSig>, describe: F) -> Self
    where
        F: FnOnce(MethodBuilder) -> MethodBuilder,
    {
        let flags = MemberAccess::Public.bits() | HIDE_BY_SIG;
        let method = describe(self.push_method(name, flags, returns.into()));
        self.finish_method(method);
        self
    }

    /// Add a public instance constructor (`.ctor`, SpecialName|RTSpecialName)
    #[must_use]
    pub fn constructor<F>(mut self, returns: impl Into<TypeSig>, describe: F) -> Self
    where
        F: FnOnce(MethodBuilder) -> MethodBuilder,
    {
        let flags = MemberAccess::Public.bits()
            | HIDE_BY_SIG
            | (MethodModifiers::SPECIAL_NAME | MethodModifiers::RTSPECIAL_NAME).bits();
        let method = describe(self.push_method(CONSTRUCTOR_NAME, flags, returns.into()));
        self.finish_method(method);
        self
    }

    /// Add the static type initializer (`.cctor`)
    #[must_use]
    pub fn type_initializer(mut self, returns: impl Into<TypeSig>) -> Self {
        let flags = MemberAccess::Private.bits()
            | HIDE_BY_SIG
            | (MethodModifiers::STATIC
                | MethodModifiers::SPECIAL_NAME
                | MethodModifiers::RTSPECIAL_NAME)
                .bits();
        let mut method = self.push_method(TYPE_INITIALIZER_NAME, flags, returns.into());
        method.row.calling_convention = CallingConvention::empty();
        self.finish_method(method);
        self
    }

    /// Add a property with synthesized accessor methods
    ///
    /// ## Arguments
    /// * 'name' - Property name; accessors are named `get_{name}` and `set_{name}`
    /// * 'property_type' - Property type
    /// * 'describe' - Closure choosing accessors and indexer parameters
    #[must_use]
    pub fn property<F>(mut self, name: &str, property_type: impl Into<TypeSig>, describe: F) -> Self
    where
        F: FnOnce(PropertyBuilder) -> PropertyBuilder,
    {
        let property_type = property_type.into();
        let property = describe(PropertyBuilder {
            getter: false,
            setter: None,
            access: MemberAccess::Public,
            is_static: false,
            index: Vec::new(),
        });

        let mut flags = property.access.bits() | HIDE_BY_SIG | MethodModifiers::SPECIAL_NAME.bits();
        if property.is_static {
            flags |= MethodModifiers::STATIC.bits();
        }

        let getter = if property.getter {
            let mut method =
                self.push_method(&format!("get_{name}"), flags, property_type.clone());
            for (param_name, param_type) in &property.index {
                method = method.param(param_name, param_type.clone());
            }
            Some(self.finish_method(method))
        } else {
            None
        };

        let setter = if let Some(void) = property.setter {
            let mut method = self.push_method(&format!("set_{name}"), flags, void);
            for (param_name, param_type) in &property.index {
                method = method.param(param_name, param_type.clone());
            }
            method = method.param("value", property_type);
            Some(self.finish_method(method))
        } else {
            None
        };

        let token = MetadataBuilder::next_token(&mut self.builder.rows.property, TABLE::PROPERTY);
        self.builder.store.insert_property(PropertyRow {
            token,
            name: name.to_string(),
            getter,
            setter,
        });
        self.row.properties.push(token);
        self
    }
}

/// Describes one method; obtained from [`TypeDefBuilder::method`]
pub struct MethodBuilder {
    row: MethodDefRow,
}

impl MethodBuilder {
    /// Token of the method being described
    #[must_use]
    pub fn token(&self) -> Token {
        self.row.token
    }

    /// Append a parameter
    #[must_use]
    pub fn param(mut self, name: &str, param_type: impl Into<TypeSig>) -> Self {
        let sequence = u16::try_from(self.row.params.len() + 1).unwrap_or(u16::MAX);
        self.row.params.push(ParamRow {
            name: name.to_string(),
            sequence,
            param_type: param_type.into(),
        });
        self
    }

    /// Set the member access
    #[must_use]
    pub fn access(mut self, access: MemberAccess) -> Self {
        self.row.flags = (self.row.flags & !MEMBER_ACCESS_MASK) | access.bits();
        self
    }

    /// Mark the method static
    #[must_use]
    pub fn static_(mut self) -> Self {
        self.row.flags |= MethodModifiers::STATIC.bits();
        self.row.calling_convention.remove(CallingConvention::HAS_THIS);
        self
    }

    /// Mark the method virtual
    #[must_use]
    pub fn virtual_(mut self) -> Self {
        self.row.flags |= MethodModifiers::VIRTUAL.bits();
        self
    }

    /// Use the vararg calling convention
    #[must_use]
    pub fn varargs(mut self) -> Self {
        self.row.calling_convention |= CallingConvention::VARARG;
        self
    }

    /// Replace the raw `MethodAttributes`
    #[must_use]
    pub fn flags(mut self, flags: u32) -> Self {
        self.row.flags = flags;
        self
    }
}

/// Describes one property; obtained from [`TypeDefBuilder::property`]
pub struct PropertyBuilder {
    getter: bool,
    setter: Option<TypeSig>,
    access: MemberAccess,
    is_static: bool,
    index: Vec<(String, TypeSig)>,
}

impl PropertyBuilder {
    /// Synthesize a getter
    #[must_use]
    pub fn get(mut self) -> Self {
        self.getter = true;
        self
    }

    /// Synthesize a setter returning `void`
    #[must_use]
    pub fn set(mut self, void: impl Into<TypeSig>) -> Self {
        self.setter = Some(void.into());
        self
    }

    /// Access of both accessors
    #[must_use]
    pub fn access(mut self, access: MemberAccess) -> Self {
        self.access = access;
        self
    }

    /// Make the accessors static
    #[must_use]
    pub fn static_(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Add an indexer parameter to both accessors
    #[must_use]
    pub fn index(mut self, name: &str, param_type: impl Into<TypeSig>) -> Self {
        self.index.push((name.to_string(), param_type.into()));
        self
    }
}

/// Describes one custom attribute instance; obtained from [`MetadataBuilder::attribute`]
pub struct AttributeBuilder {
    row: CustomAttributeRow,
}

impl AttributeBuilder {
    /// Append a positional constructor argument
    #[must_use]
    pub fn positional(mut self, value: CustomAttributeArgument) -> Self {
        self.row.fixed_args.push(value);
        self
    }

    /// Append a named field argument
    #[must_use]
    pub fn field(mut self, name: &str, value: CustomAttributeArgument) -> Self {
        self.row.named_args.push(CustomAttributeNamedArgument {
            is_field: true,
            name: name.to_string(),
            value,
        });
        self
    }

    /// Append a named property argument
    #[must_use]
    pub fn property(mut self, name: &str, value: CustomAttributeArgument) -> Self {
        self.row.named_args.push(CustomAttributeNamedArgument {
            is_field: false,
            name: name.to_string(),
            value,
        });
        self
    }
}
