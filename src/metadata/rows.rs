//! Typed metadata rows handed out by a [`crate::metadata::MetadataSource`].
//!
//! Rows are plain owned values. A source may build them fresh on every query; the importer reads
//! what it needs and drops them.

use crate::metadata::{
    flags::{CallingConvention, FieldModifiers, MemberAccess, MethodModifiers, TypeAttributes},
    signature::TypeSig,
    token::Token,
};

/// Name of instance constructors
pub const CONSTRUCTOR_NAME: &str = ".ctor";
/// Name of static constructors (type initializers)
pub const TYPE_INITIALIZER_NAME: &str = ".cctor";

/// A `TypeDef` row with its member lists already resolved to tokens
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefRow {
    /// `TypeDef` token
    pub token: Token,
    /// `TypeNamespace` (empty for the global namespace)
    pub namespace: String,
    /// `TypeName`, including the generic arity suffix (e.g. ``List`1``)
    pub name: String,
    /// Raw `TypeAttributes`
    pub flags: u32,
    /// Base type (`Extends`), absent for interfaces and the root object type
    pub extends: Option<TypeSig>,
    /// Implemented interfaces (`InterfaceImpl`)
    pub interfaces: Vec<TypeSig>,
    /// Generic parameters owned by this type
    pub generic_params: Vec<Token>,
    /// Methods, in table order
    pub methods: Vec<Token>,
    /// Fields, in table order
    pub fields: Vec<Token>,
    /// Properties, in table order
    pub properties: Vec<Token>,
}

impl TypeDefRow {
    /// Returns the full name (Namespace.Name) of the type
    #[must_use]
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{0}.{1}", self.namespace, self.name)
        }
    }

    /// True if the type is an interface
    #[must_use]
    pub fn is_interface(&self) -> bool {
        TypeAttributes::is_interface(self.flags)
    }

    /// True if the type declares generic parameters
    #[must_use]
    pub fn has_generic_params(&self) -> bool {
        !self.generic_params.is_empty()
    }
}

/// A `TypeRef` row: a name to be located in some module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRefRow {
    /// `TypeRef` token
    pub token: Token,
    /// `TypeNamespace`
    pub namespace: String,
    /// `TypeName`
    pub name: String,
}

/// A `Param` row combined with the matching type from the method signature
#[derive(Debug, Clone, PartialEq)]
pub struct ParamRow {
    /// Parameter name (may be empty)
    pub name: String,
    /// 1-based position in the method signature
    pub sequence: u16,
    /// Parameter type
    pub param_type: TypeSig,
}

/// A `MethodDef` row with its decoded signature
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDefRow {
    /// `MethodDef` token
    pub token: Token,
    /// Method name
    pub name: String,
    /// Raw `MethodAttributes`
    pub flags: u32,
    /// Calling convention of the signature
    pub calling_convention: CallingConvention,
    /// The type declaring this method
    pub declaring_type: Token,
    /// Return type (`Void` is a regular defined type)
    pub return_type: TypeSig,
    /// Parameters in declared order
    pub params: Vec<ParamRow>,
}

impl MethodDefRow {
    /// Member access of the method
    #[must_use]
    pub fn access(&self) -> MemberAccess {
        MemberAccess::from_flags(self.flags)
    }

    /// True for static methods
    #[must_use]
    pub fn is_static(&self) -> bool {
        MethodModifiers::from_method_flags(self.flags).contains(MethodModifiers::STATIC)
    }

    /// True for instance constructors (`.ctor` with SpecialName|RTSpecialName, not static)
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        let required = MethodModifiers::SPECIAL_NAME | MethodModifiers::RTSPECIAL_NAME;
        let modifiers = MethodModifiers::from_method_flags(self.flags);
        modifiers.contains(required)
            && !modifiers.contains(MethodModifiers::STATIC)
            && self.name == CONSTRUCTOR_NAME
    }

    /// True for the static type initializer
    #[must_use]
    pub fn is_type_initializer(&self) -> bool {
        self.name == TYPE_INITIALIZER_NAME && self.is_static()
    }

    /// True if the signature uses the vararg calling convention
    #[must_use]
    pub fn is_varargs(&self) -> bool {
        self.calling_convention.is_vararg()
    }
}

/// A `Field` row with its decoded signature
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRow {
    /// `Field` token
    pub token: Token,
    /// Field name
    pub name: String,
    /// Raw `FieldAttributes`
    pub flags: u32,
    /// Field type
    pub field_type: TypeSig,
}

impl FieldRow {
    /// Member access of the field
    #[must_use]
    pub fn access(&self) -> MemberAccess {
        MemberAccess::from_flags(self.flags)
    }

    /// True for static fields
    #[must_use]
    pub fn is_static(&self) -> bool {
        FieldModifiers::from_field_flags(self.flags).contains(FieldModifiers::STATIC)
    }
}

/// A `Property` row with its accessors resolved through `MethodSemantics`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRow {
    /// `Property` token
    pub token: Token,
    /// Property name
    pub name: String,
    /// Getter method, if any
    pub getter: Option<Token>,
    /// Setter method, if any
    pub setter: Option<Token>,
}

/// Owner of a generic parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericParamOwner {
    /// Parameter of a generic type definition
    Type(Token),
    /// Parameter of a generic method definition
    Method(Token),
}

/// A `GenericParam` row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericParamRow {
    /// `GenericParam` token
    pub token: Token,
    /// Declared name
    pub name: String,
    /// Zero-based position in the owner's parameter list
    pub number: u16,
    /// Raw `GenericParamAttributes`
    pub flags: u16,
    /// Owning type or method
    pub owner: GenericParamOwner,
}

/// The parent of a custom attribute, as understood by the attribute query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeOwner {
    /// A type, method, field or property, named by its token
    Token(Token),
    /// A parameter, named by its method and 1-based sequence number
    Param {
        /// Method declaring the parameter
        method: Token,
        /// 1-based parameter position
        sequence: u16,
    },
}

/// A decoded custom attribute argument value.
///
/// The importer never interprets these; they travel to the host attribute as opaque payload.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomAttributeArgument {
    /// Boolean value
    Bool(bool),
    /// Character value (16-bit Unicode)
    Char(char),
    /// Signed 32-bit integer (narrower integers are widened)
    I4(i32),
    /// Signed 64-bit integer
    I8(i64),
    /// Unsigned 64-bit integer
    U8(u64),
    /// 64-bit floating point
    R8(f64),
    /// UTF-8 string, `None` for a null string
    String(Option<String>),
    /// Type reference (as string)
    Type(String),
    /// Array of arguments
    Array(Vec<CustomAttributeArgument>),
    /// Enum value (enum type name + underlying value)
    Enum(String, Box<CustomAttributeArgument>),
}

/// A named argument (field or property) in a custom attribute
#[derive(Debug, Clone, PartialEq)]
pub struct CustomAttributeNamedArgument {
    /// Whether this is a field (true) or property (false)
    pub is_field: bool,
    /// Name of the field or property
    pub name: String,
    /// Value of the argument
    pub value: CustomAttributeArgument,
}

/// A `CustomAttribute` row with its value blob decoded
#[derive(Debug, Clone, PartialEq)]
pub struct CustomAttributeRow {
    /// `CustomAttribute` token
    pub token: Token,
    /// Attributed entity
    pub owner: AttributeOwner,
    /// Attribute constructor (`MethodDef` token)
    pub constructor: Token,
    /// Positional constructor arguments
    pub fixed_args: Vec<CustomAttributeArgument>,
    /// Named field and property arguments, in blob order
    pub named_args: Vec<CustomAttributeNamedArgument>,
}
