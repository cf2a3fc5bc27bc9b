//! Read-only, on-demand access to one foreign module.
//!
//! [`MetadataView`] wraps a [`MetadataSource`] and adds the navigation the importer needs on top
//! of raw row lookup: `TypeRef` resolution, full names, member enumeration, base type
//! classification and the accessor pre-pass. Nothing is cached; every call goes back to the
//! source.

use std::{collections::HashSet, sync::Arc};

use crate::{
    metadata::{
        rows::{
            AttributeOwner, CustomAttributeRow, FieldRow, GenericParamRow, MethodDefRow,
            PropertyRow, TypeDefRow,
        },
        signature::TypeSig,
        source::MetadataSource,
        token::Token,
    },
    Error::{MemberNotFound, TypeNotFound},
    Result,
};

/// Accessor methods of one type, by method token.
///
/// Produced by [`MetadataView::accessors`] before any method of the type is imported, so the
/// method pass can suppress accessors without waiting for the property pass.
#[derive(Debug, Default, Clone)]
pub struct Accessors {
    methods: HashSet<Token>,
}

impl Accessors {
    /// True if `method` is a getter or setter of one of the type's properties
    #[must_use]
    pub fn contains(&self, method: Token) -> bool {
        self.methods.contains(&method)
    }

    /// Number of accessor methods
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// True if the type has no accessors
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

/// Typed view over a foreign module
#[derive(Clone)]
pub struct MetadataView {
    source: Arc<dyn MetadataSource>,
    root_namespace: String,
}

impl MetadataView {
    /// Create a view over `source`, using `root_namespace` for the well-known base types
    pub fn new(source: Arc<dyn MetadataSource>, root_namespace: &str) -> Self {
        MetadataView {
            source,
            root_namespace: root_namespace.to_string(),
        }
    }

    /// The underlying source
    #[must_use]
    pub fn source(&self) -> &Arc<dyn MetadataSource> {
        &self.source
    }

    /// Name of the viewed module
    #[must_use]
    pub fn module_name(&self) -> &str {
        self.source.module_name()
    }

    /// Root namespace of the well-known types (e.g. `System`)
    #[must_use]
    pub fn root_namespace(&self) -> &str {
        &self.root_namespace
    }

    /// All type definitions of the module
    #[must_use]
    pub fn types(&self) -> Vec<Token> {
        self.source.type_defs()
    }

    /// Locate a type definition by namespace and name
    #[must_use]
    pub fn find_type(&self, namespace: &str, name: &str) -> Option<Token> {
        self.source.find_type(namespace, name)
    }

    /// Resolve a `TypeDef` or `TypeRef` token to the defining `TypeDef` token
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeNotFound`] if the token names neither a local definition nor a
    /// reference the source can locate.
    pub fn resolve_token(&self, token: Token) -> Result<Token> {
        if token.is_type_ref() {
            let reference = self.source.type_ref(token).ok_or(TypeNotFound(token))?;
            return self
                .source
                .find_type(&reference.namespace, &reference.name)
                .ok_or(TypeNotFound(token));
        }

        if token.is_type_def() {
            return Ok(token);
        }

        Err(TypeNotFound(token))
    }

    /// Resolve a `TypeDef` or `TypeRef` token to its definition row
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeNotFound`] if no definition row is available.
    pub fn resolve_type(&self, token: Token) -> Result<TypeDefRow> {
        let definition = self.resolve_token(token)?;
        self.source.type_def(definition).ok_or(TypeNotFound(token))
    }

    /// Namespace and name of a `TypeRef`, for references the source cannot resolve locally
    #[must_use]
    pub fn reference_name(&self, token: Token) -> Option<(String, String)> {
        if !token.is_type_ref() {
            return None;
        }
        self.source
            .type_ref(token)
            .map(|reference| (reference.namespace, reference.name))
    }

    /// Human readable name of a type signature, used in diagnostics
    #[must_use]
    pub fn describe(&self, sig: &TypeSig) -> String {
        match sig {
            TypeSig::Defined(token) => match self.resolve_type(*token) {
                Ok(row) => row.fullname(),
                Err(_) => match self.reference_name(*token) {
                    Some((namespace, name)) if namespace.is_empty() => name,
                    Some((namespace, name)) => format!("{namespace}.{name}"),
                    None => sig.to_string(),
                },
            },
            TypeSig::Array { element, rank } => {
                let commas = ",".repeat(rank.saturating_sub(1) as usize);
                format!("{}[{commas}]", self.describe(element))
            }
            TypeSig::GenericInst { definition, args } => {
                let args: Vec<String> = args.iter().map(|arg| self.describe(arg)).collect();
                format!(
                    "{}<{}>",
                    self.describe(&TypeSig::Defined(*definition)),
                    args.join(", ")
                )
            }
            TypeSig::GenericParam { .. } => sig.to_string(),
        }
    }

    /// The `MethodDef` row for `token`
    ///
    /// # Errors
    /// Returns [`crate::Error::MemberNotFound`] if the source has no such row.
    pub fn method(&self, token: Token) -> Result<MethodDefRow> {
        self.source.method(token).ok_or(MemberNotFound(token))
    }

    /// The `Field` row for `token`
    ///
    /// # Errors
    /// Returns [`crate::Error::MemberNotFound`] if the source has no such row.
    pub fn field(&self, token: Token) -> Result<FieldRow> {
        self.source.field(token).ok_or(MemberNotFound(token))
    }

    /// The `Property` row for `token`
    ///
    /// # Errors
    /// Returns [`crate::Error::MemberNotFound`] if the source has no such row.
    pub fn property(&self, token: Token) -> Result<PropertyRow> {
        self.source.property(token).ok_or(MemberNotFound(token))
    }

    /// Methods of a type, skipping rows the source cannot produce
    #[must_use]
    pub fn methods(&self, row: &TypeDefRow) -> Vec<MethodDefRow> {
        row.methods
            .iter()
            .filter_map(|token| self.source.method(*token))
            .collect()
    }

    /// Fields of a type, skipping rows the source cannot produce
    #[must_use]
    pub fn fields(&self, row: &TypeDefRow) -> Vec<FieldRow> {
        row.fields
            .iter()
            .filter_map(|token| self.source.field(*token))
            .collect()
    }

    /// Properties of a type, skipping rows the source cannot produce
    #[must_use]
    pub fn properties(&self, row: &TypeDefRow) -> Vec<PropertyRow> {
        row.properties
            .iter()
            .filter_map(|token| self.source.property(*token))
            .collect()
    }

    /// Generic parameters of a type, ordered by their position
    ///
    /// # Errors
    /// Returns [`crate::Error::MemberNotFound`] if a parameter row is missing. A partial parameter
    /// list would shift positions, so it is never returned. Numbering gaps or duplicates are
    /// reported as [`crate::Error::Malformed`].
    pub fn generic_params(&self, row: &TypeDefRow) -> Result<Vec<GenericParamRow>> {
        let mut params = row
            .generic_params
            .iter()
            .map(|token| self.source.generic_param(*token).ok_or(MemberNotFound(*token)))
            .collect::<Result<Vec<_>>>()?;
        params.sort_by_key(|param| param.number);

        for (position, param) in params.iter().enumerate() {
            if usize::from(param.number) != position {
                return Err(malformed_error!(
                    "{} - generic parameter '{}' has number {}, expected {}",
                    row.fullname(),
                    param.name,
                    param.number,
                    position
                ));
            }
        }
        Ok(params)
    }

    /// The type declaring `method`
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeNotFound`] if the declaring type row is missing.
    pub fn declaring_type(&self, method: &MethodDefRow) -> Result<TypeDefRow> {
        self.resolve_type(method.declaring_type)
    }

    /// Custom attributes attached to `owner`
    #[must_use]
    pub fn custom_attributes(&self, owner: AttributeOwner) -> Vec<CustomAttributeRow> {
        self.source.custom_attributes(owner)
    }

    /// True if the type is a value type: its base is `<root>.ValueType` or `<root>.Enum`.
    ///
    /// `<root>.Enum` itself derives from `ValueType` but is a reference type.
    #[must_use]
    pub fn is_value_type(&self, row: &TypeDefRow) -> bool {
        if row.namespace == self.root_namespace && row.name == "Enum" {
            return false;
        }

        let Some(TypeSig::Defined(base)) = &row.extends else {
            return false;
        };

        let (namespace, name) = match self.resolve_type(*base) {
            Ok(base_row) => (base_row.namespace, base_row.name),
            Err(_) => match self.reference_name(*base) {
                Some(names) => names,
                None => return false,
            },
        };

        namespace == self.root_namespace && (name == "ValueType" || name == "Enum")
    }

    /// Collect every getter and setter of the type's properties by method token.
    ///
    /// Identity is the only criterion; access flags and names of the methods are not consulted.
    #[must_use]
    pub fn accessors(&self, row: &TypeDefRow) -> Accessors {
        let methods = self
            .properties(row)
            .into_iter()
            .flat_map(|property| [property.getter, property.setter])
            .flatten()
            .collect();
        Accessors { methods }
    }
}
