//! The metadata query capability consumed by the importer.
//!
//! Decoding the binary tables of a foreign module is not the importer's business. Whatever does
//! that work implements [`MetadataSource`] and hands out typed rows by token; the importer only
//! ever goes through this trait (wrapped in a [`crate::metadata::MetadataView`]).
//!
//! [`MetadataStore`] is the in-memory implementation, filled through
//! [`crate::metadata::MetadataBuilder`]. It serves embedders whose decoder output is already
//! materialized, and all of the crate's tests.

use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;

use crate::metadata::{
    rows::{
        AttributeOwner, CustomAttributeRow, FieldRow, GenericParamRow, MethodDefRow, PropertyRow,
        TypeDefRow, TypeRefRow,
    },
    token::Token,
};

/// Row-oriented query interface over one foreign module.
///
/// Lookups return owned rows; a `None` means the source has no such row (or could not decode
/// it), which the importer treats like any other local failure.
pub trait MetadataSource: Send + Sync {
    /// Name of the module this source describes
    fn module_name(&self) -> &str;

    /// The `TypeDef` row for `token`
    fn type_def(&self, token: Token) -> Option<TypeDefRow>;

    /// The `TypeRef` row for `token`
    fn type_ref(&self, token: Token) -> Option<TypeRefRow>;

    /// Locate a type definition by namespace and name
    fn find_type(&self, namespace: &str, name: &str) -> Option<Token>;

    /// All type definitions of the module, in table order
    fn type_defs(&self) -> Vec<Token>;

    /// The `MethodDef` row for `token`
    fn method(&self, token: Token) -> Option<MethodDefRow>;

    /// The `Field` row for `token`
    fn field(&self, token: Token) -> Option<FieldRow>;

    /// The `Property` row for `token`
    fn property(&self, token: Token) -> Option<PropertyRow>;

    /// The `GenericParam` row for `token`
    fn generic_param(&self, token: Token) -> Option<GenericParamRow>;

    /// Custom attributes attached to `owner`, in table order
    fn custom_attributes(&self, owner: AttributeOwner) -> Vec<CustomAttributeRow>;
}

/// In-memory [`MetadataSource`].
///
/// Primary storage is one `SkipMap` per table keyed by token, with secondary indices for name
/// lookup and attribute ownership.
pub struct MetadataStore {
    module: String,
    type_defs: SkipMap<Token, TypeDefRow>,
    type_refs: SkipMap<Token, TypeRefRow>,
    methods: SkipMap<Token, MethodDefRow>,
    fields: SkipMap<Token, FieldRow>,
    properties: SkipMap<Token, PropertyRow>,
    generic_params: SkipMap<Token, GenericParamRow>,
    custom_attributes: SkipMap<Token, CustomAttributeRow>,
    types_by_name: DashMap<(String, String), Token>,
    attributes_by_owner: DashMap<AttributeOwner, Vec<Token>>,
}

impl MetadataStore {
    /// Create an empty store for the named module
    #[must_use]
    pub fn new(module: &str) -> Self {
        MetadataStore {
            module: module.to_string(),
            type_defs: SkipMap::new(),
            type_refs: SkipMap::new(),
            methods: SkipMap::new(),
            fields: SkipMap::new(),
            properties: SkipMap::new(),
            generic_params: SkipMap::new(),
            custom_attributes: SkipMap::new(),
            types_by_name: DashMap::new(),
            attributes_by_owner: DashMap::new(),
        }
    }

    /// Insert (or replace) a type definition
    pub fn insert_type_def(&self, row: TypeDefRow) {
        self.types_by_name
            .insert((row.namespace.clone(), row.name.clone()), row.token);
        self.type_defs.insert(row.token, row);
    }

    /// Insert (or replace) a type reference
    pub fn insert_type_ref(&self, row: TypeRefRow) {
        self.type_refs.insert(row.token, row);
    }

    /// Insert (or replace) a method
    pub fn insert_method(&self, row: MethodDefRow) {
        self.methods.insert(row.token, row);
    }

    /// Insert (or replace) a field
    pub fn insert_field(&self, row: FieldRow) {
        self.fields.insert(row.token, row);
    }

    /// Insert (or replace) a property
    pub fn insert_property(&self, row: PropertyRow) {
        self.properties.insert(row.token, row);
    }

    /// Insert (or replace) a generic parameter
    pub fn insert_generic_param(&self, row: GenericParamRow) {
        self.generic_params.insert(row.token, row);
    }

    /// Insert a custom attribute and index it under its owner
    pub fn insert_custom_attribute(&self, row: CustomAttributeRow) {
        self.attributes_by_owner
            .entry(row.owner)
            .or_default()
            .push(row.token);
        self.custom_attributes.insert(row.token, row);
    }

    /// Remove a method row; references to it elsewhere are left dangling
    pub fn remove_method(&self, token: Token) -> bool {
        self.methods.remove(&token).is_some()
    }

    /// Number of type definitions
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.type_defs.len()
    }

    /// Find a method of a type by name (first match in table order)
    #[must_use]
    pub fn method_by_name(&self, type_token: Token, name: &str) -> Option<Token> {
        let type_def = self.type_defs.get(&type_token)?;
        type_def.value().methods.iter().copied().find(|method| {
            self.methods
                .get(method)
                .is_some_and(|entry| entry.value().name == name)
        })
    }

    /// Find a field of a type by name
    #[must_use]
    pub fn field_by_name(&self, type_token: Token, name: &str) -> Option<Token> {
        let type_def = self.type_defs.get(&type_token)?;
        type_def.value().fields.iter().copied().find(|field| {
            self.fields
                .get(field)
                .is_some_and(|entry| entry.value().name == name)
        })
    }
}

impl MetadataSource for MetadataStore {
    fn module_name(&self) -> &str {
        &self.module
    }

    fn type_def(&self, token: Token) -> Option<TypeDefRow> {
        self.type_defs.get(&token).map(|entry| entry.value().clone())
    }

    fn type_ref(&self, token: Token) -> Option<TypeRefRow> {
        self.type_refs.get(&token).map(|entry| entry.value().clone())
    }

    fn find_type(&self, namespace: &str, name: &str) -> Option<Token> {
        self.types_by_name
            .get(&(namespace.to_string(), name.to_string()))
            .map(|entry| *entry.value())
    }

    fn type_defs(&self) -> Vec<Token> {
        self.type_defs.iter().map(|entry| *entry.key()).collect()
    }

    fn method(&self, token: Token) -> Option<MethodDefRow> {
        self.methods.get(&token).map(|entry| entry.value().clone())
    }

    fn field(&self, token: Token) -> Option<FieldRow> {
        self.fields.get(&token).map(|entry| entry.value().clone())
    }

    fn property(&self, token: Token) -> Option<PropertyRow> {
        self.properties.get(&token).map(|entry| entry.value().clone())
    }

    fn generic_param(&self, token: Token) -> Option<GenericParamRow> {
        self.generic_params
            .get(&token)
            .map(|entry| entry.value().clone())
    }

    fn custom_attributes(&self, owner: AttributeOwner) -> Vec<CustomAttributeRow> {
        let Some(tokens) = self.attributes_by_owner.get(&owner) else {
            return Vec::new();
        };

        tokens
            .iter()
            .filter_map(|token| {
                self.custom_attributes
                    .get(token)
                    .map(|entry| entry.value().clone())
            })
            .collect()
    }
}
