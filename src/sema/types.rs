//! Host types produced by the importer.
//!
//! A [`HostType`] never owns declarations; records, templates and template parameters are named
//! by [`DeclId`]. Use [`crate::sema::SemanticModel::type_name`] to render one with declaration
//! names.

use std::fmt;

use strum::{Display, EnumIter};

use crate::sema::DeclId;

/// Fundamental host types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum BuiltinType {
    /// `void`
    #[strum(serialize = "void")]
    Void,
    /// `bool`
    #[strum(serialize = "bool")]
    Bool,
    /// 16-bit `wchar_t`
    #[strum(serialize = "wchar_t")]
    WChar,
    /// `unsigned char`
    #[strum(serialize = "unsigned char")]
    UChar,
    /// `signed char`
    #[strum(serialize = "signed char")]
    SChar,
    /// `short`
    #[strum(serialize = "short")]
    Short,
    /// `unsigned short`
    #[strum(serialize = "unsigned short")]
    UShort,
    /// `int`
    #[strum(serialize = "int")]
    Int,
    /// `unsigned int`
    #[strum(serialize = "unsigned int")]
    UInt,
    /// `long long`
    #[strum(serialize = "long long")]
    LongLong,
    /// `unsigned long long`
    #[strum(serialize = "unsigned long long")]
    ULongLong,
    /// `float`
    #[strum(serialize = "float")]
    Float,
    /// `double`
    #[strum(serialize = "double")]
    Double,
    /// The managed string class
    #[strum(serialize = "string")]
    String,
    /// Native-sized signed integer
    #[strum(serialize = "intptr")]
    IntPtr,
    /// Native-sized unsigned integer
    #[strum(serialize = "uintptr")]
    UIntPtr,
}

/// Binding of one template parameter in an instantiation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateArgument {
    /// The template type parameter being bound
    pub param: DeclId,
    /// The bound type
    pub ty: HostType,
}

/// A type in the host semantic model
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HostType {
    /// Fundamental type
    Builtin(BuiltinType),
    /// A record used inline (value semantics)
    Record(DeclId),
    /// Reference to a managed object of the inner type (`T^`)
    Handle(Box<HostType>),
    /// `cli::array<element, rank>`
    Array {
        /// The `cli::array` class template
        template: DeclId,
        /// Element type
        element: Box<HostType>,
        /// Number of dimensions
        rank: u32,
    },
    /// A template type parameter
    TemplateParam {
        /// The parameter declaration
        decl: DeclId,
        /// Zero-based position in its template
        index: u32,
    },
    /// A class template applied to arguments
    Instantiation {
        /// The class template
        template: DeclId,
        /// Parameter bindings, in parameter order
        args: Vec<TemplateArgument>,
    },
}

impl HostType {
    /// Wrap `self` in a handle
    #[must_use]
    pub fn handle(self) -> HostType {
        HostType::Handle(Box::new(self))
    }

    /// True for handle types
    #[must_use]
    pub fn is_handle(&self) -> bool {
        matches!(self, HostType::Handle(_))
    }

    /// The type behind a handle, or `self`
    #[must_use]
    pub fn pointee(&self) -> &HostType {
        match self {
            HostType::Handle(inner) => inner,
            other => other,
        }
    }

    /// The record declaration this type names, looking through handles
    #[must_use]
    pub fn as_record(&self) -> Option<DeclId> {
        match self.pointee() {
            HostType::Record(decl) => Some(*decl),
            _ => None,
        }
    }

    /// The builtin this type names, looking through handles
    #[must_use]
    pub fn as_builtin(&self) -> Option<BuiltinType> {
        match self.pointee() {
            HostType::Builtin(builtin) => Some(*builtin),
            _ => None,
        }
    }
}

impl From<BuiltinType> for HostType {
    fn from(builtin: BuiltinType) -> Self {
        HostType::Builtin(builtin)
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostType::Builtin(builtin) => write!(f, "{builtin}"),
            HostType::Record(decl) => write!(f, "{decl}"),
            HostType::Handle(inner) => write!(f, "{inner}^"),
            HostType::Array { element, rank, .. } => write!(f, "cli::array<{element}, {rank}>"),
            HostType::TemplateParam { index, .. } => write!(f, "${index}"),
            HostType::Instantiation { template, args } => {
                write!(f, "{template}<")?;
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg.ty)?;
                }
                write!(f, ">")
            }
        }
    }
}
