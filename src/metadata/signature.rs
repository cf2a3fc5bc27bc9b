//! Foreign type references.
//!
//! Every type position in the foreign metadata (field types, return and parameter types, base
//! types, interfaces, generic arguments) is described by a [`TypeSig`]. The set of cases is fixed
//! by the metadata format, so the importer dispatches on it with a plain `match`.

use std::fmt;

use crate::metadata::token::Token;

/// A reference to a foreign type, as found in a signature or a type row.
///
/// Values are immutable and cheap to clone. The importer never keeps them beyond the call that
/// received them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSig {
    /// A defined type, named by a `TypeDef` or `TypeRef` token
    Defined(Token),
    /// An array of `element` with the given rank (1 for single-dimensional arrays)
    Array {
        /// Element type
        element: Box<TypeSig>,
        /// Number of dimensions
        rank: u32,
    },
    /// A constructed generic type, e.g. `List<int>`
    GenericInst {
        /// The generic type definition (container class)
        definition: Token,
        /// Generic arguments, in declaration order of the definition's parameters
        args: Vec<TypeSig>,
    },
    /// A reference to a generic parameter of the enclosing type (`!n`) or method (`!!n`)
    GenericParam {
        /// Declared name of the parameter
        name: String,
        /// Zero-based position in the owner's parameter list
        number: u16,
        /// True for method-level parameters (`!!n`)
        method_level: bool,
    },
}

impl TypeSig {
    /// Reference to a defined type
    #[must_use]
    pub fn defined(token: Token) -> Self {
        TypeSig::Defined(token)
    }

    /// Single or multi-dimensional array of `element`
    #[must_use]
    pub fn array(element: TypeSig, rank: u32) -> Self {
        TypeSig::Array {
            element: Box::new(element),
            rank,
        }
    }

    /// Instance of the generic definition with the given arguments
    #[must_use]
    pub fn generic_inst(definition: Token, args: Vec<TypeSig>) -> Self {
        TypeSig::GenericInst { definition, args }
    }

    /// Type-level generic parameter reference
    #[must_use]
    pub fn type_param(name: &str, number: u16) -> Self {
        TypeSig::GenericParam {
            name: name.to_string(),
            number,
            method_level: false,
        }
    }

    /// Method-level generic parameter reference
    #[must_use]
    pub fn method_param(name: &str, number: u16) -> Self {
        TypeSig::GenericParam {
            name: name.to_string(),
            number,
            method_level: true,
        }
    }

    /// The token of the defined type this signature names, if it names one directly
    #[must_use]
    pub fn token(&self) -> Option<Token> {
        match self {
            TypeSig::Defined(token) => Some(*token),
            TypeSig::GenericInst { definition, .. } => Some(*definition),
            TypeSig::Array { .. } | TypeSig::GenericParam { .. } => None,
        }
    }
}

impl From<Token> for TypeSig {
    fn from(token: Token) -> Self {
        TypeSig::Defined(token)
    }
}

impl fmt::Display for TypeSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSig::Defined(token) => write!(f, "type {token}"),
            TypeSig::Array { element, rank } => {
                if *rank <= 1 {
                    write!(f, "{element}[]")
                } else {
                    write!(f, "{element}[{}]", ",".repeat(*rank as usize - 1))
                }
            }
            TypeSig::GenericInst { definition, args } => {
                write!(f, "type {definition}<")?;
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ">")
            }
            TypeSig::GenericParam {
                name, method_level, ..
            } => {
                if *method_level {
                    write!(f, "!!{name}")
                } else {
                    write!(f, "!{name}")
                }
            }
        }
    }
}
