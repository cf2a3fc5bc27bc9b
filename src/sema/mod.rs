//! The host side: an arena-backed semantic model.
//!
//! [`SemanticModel`] owns every declaration; everything else (the importer, its memo, other
//! declarations, host types) refers to them through [`DeclId`] handles. Cyclic references between
//! records are therefore plain ids and never need shared ownership.
//!
//! Creating a declaration ([`SemanticModel::create`]) and making it visible in a context
//! ([`SemanticModel::add_decl`]) are separate steps. Property accessors rely on this: they exist
//! as functions, linked from their property, without ever being found by name lookup.
//!
//! # Key Types
//! - [`SemanticModel`] - declaration arena plus per-context name index
//! - [`Decl`] / [`DeclKind`] - a declaration and its payload
//! - [`HostType`] - types built from builtins, records, handles, arrays and templates
//! - [`AccessSpecifier`] - host access levels
//!
//! # Thread Safety
//! The arena is an append-only `boxcar::Vec` and the name index a `DashMap`, so the model is
//! `Send + Sync` and can be shared (`Arc<SemanticModel>`) by several importers.

mod access;
mod decl;
mod types;

use std::fmt;

use dashmap::DashMap;

pub use access::AccessSpecifier;
pub use decl::{
    AttributeArgument, AttributeArgumentKind, BaseSpecifier, ClassTemplateDecl, CliMethodData,
    CliRecordData, CompletionState, Decl, DeclKind, DeclName, FunctionDecl, FunctionKind,
    HostAttribute, OverloadedOperator, PropertyDecl, RecordDecl, RecordKind,
};
pub use types::{BuiltinType, HostType, TemplateArgument};

use crate::{Error::DeclNotFound, Result};

/// Non-owning handle to a declaration in a [`SemanticModel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeclId(pub u32);

impl DeclId {
    /// The translation unit every model starts with
    pub const TRANSLATION_UNIT: DeclId = DeclId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "decl#{}", self.0)
    }
}

/// The host compiler's declaration graph
pub struct SemanticModel {
    decls: boxcar::Vec<Decl>,
    lookup: DashMap<(DeclId, String), Vec<DeclId>>,
}

impl SemanticModel {
    /// A model holding only the translation unit
    #[must_use]
    pub fn new() -> Self {
        let decls = boxcar::Vec::new();
        decls.push(Decl::new(
            DeclName::ident(""),
            None,
            DeclKind::TranslationUnit,
            true,
        ));

        SemanticModel {
            decls,
            lookup: DashMap::new(),
        }
    }

    /// The root declaration
    #[must_use]
    pub fn translation_unit(&self) -> DeclId {
        DeclId::TRANSLATION_UNIT
    }

    /// Number of declarations, including unregistered ones
    #[must_use]
    pub fn len(&self) -> usize {
        self.decls.count()
    }

    /// True if only the translation unit exists
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Create a declaration without registering it in any context
    pub fn create(&self, name: DeclName, parent: Option<DeclId>, kind: DeclKind) -> DeclId {
        self.push(Decl::new(name, parent, kind, false))
    }

    /// Create a declaration marked as implicit (synthesized)
    pub fn create_implicit(&self, name: DeclName, parent: Option<DeclId>, kind: DeclKind) -> DeclId {
        self.push(Decl::new(name, parent, kind, true))
    }

    fn push(&self, decl: Decl) -> DeclId {
        let index = self.decls.push(decl);
        DeclId(u32::try_from(index).unwrap_or(u32::MAX))
    }

    /// Make `decl` visible in `context`, under its name's lookup key.
    ///
    /// Registering the same declaration twice is a no-op.
    ///
    /// # Errors
    /// Returns [`crate::Error::DeclNotFound`] if either handle is invalid.
    pub fn add_decl(&self, context: DeclId, decl: DeclId) -> Result<()> {
        let context_decl = self.get(context)?;
        let key = self.get(decl)?.name().lookup_key();

        let mut entry = self.lookup.entry((context, key)).or_default();
        if entry.contains(&decl) {
            return Ok(());
        }
        entry.push(decl);
        context_decl.add_child(decl);
        Ok(())
    }

    /// Access a declaration
    ///
    /// # Errors
    /// Returns [`crate::Error::DeclNotFound`] if the handle is invalid.
    pub fn get(&self, id: DeclId) -> Result<&Decl> {
        self.decls.get(id.index()).ok_or(DeclNotFound(id))
    }

    /// Declarations registered in `context` under `key`, in registration order
    #[must_use]
    pub fn lookup(&self, context: DeclId, key: &str) -> Vec<DeclId> {
        self.lookup
            .get(&(context, key.to_string()))
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Declarations registered in `context`, in registration order
    #[must_use]
    pub fn children(&self, context: DeclId) -> Vec<DeclId> {
        self.get(context)
            .map(Decl::children)
            .unwrap_or_default()
    }

    /// The record payload of `id`
    ///
    /// # Errors
    /// Returns [`crate::Error::DeclNotFound`] if `id` is not a record.
    pub fn record(&self, id: DeclId) -> Result<&RecordDecl> {
        self.get(id)?.as_record().ok_or(DeclNotFound(id))
    }

    /// The function payload of `id`
    ///
    /// # Errors
    /// Returns [`crate::Error::DeclNotFound`] if `id` is not a function.
    pub fn function(&self, id: DeclId) -> Result<&FunctionDecl> {
        self.get(id)?.as_function().ok_or(DeclNotFound(id))
    }

    /// The class template payload of `id`
    ///
    /// # Errors
    /// Returns [`crate::Error::DeclNotFound`] if `id` is not a class template.
    pub fn template(&self, id: DeclId) -> Result<&ClassTemplateDecl> {
        self.get(id)?.as_template().ok_or(DeclNotFound(id))
    }

    /// Set the access of a declaration; the first assignment wins
    ///
    /// # Errors
    /// Returns [`crate::Error::DeclNotFound`] if the handle is invalid.
    pub fn set_access(&self, id: DeclId, access: AccessSpecifier) -> Result<bool> {
        Ok(self.get(id)?.set_access(access))
    }

    /// Attach an attribute instance to a declaration
    ///
    /// # Errors
    /// Returns [`crate::Error::DeclNotFound`] if the handle is invalid.
    pub fn add_attribute(&self, id: DeclId, attribute: HostAttribute) -> Result<()> {
        self.get(id)?.add_attribute(attribute);
        Ok(())
    }

    /// All declarations with their handles, in creation order
    pub fn iter(&self) -> impl Iterator<Item = (DeclId, &Decl)> {
        self.decls
            .iter()
            .map(|(index, decl)| (DeclId(u32::try_from(index).unwrap_or(u32::MAX)), decl))
    }

    /// Every record in the model, registered or not
    pub fn records(&self) -> impl Iterator<Item = (DeclId, &RecordDecl)> {
        self.iter()
            .filter_map(|(id, decl)| decl.as_record().map(|record| (id, record)))
    }

    /// Qualified host name (`A::B::C`) of a declaration
    #[must_use]
    pub fn qualified_name(&self, id: DeclId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(decl_id) = current {
            let Ok(decl) = self.get(decl_id) else {
                break;
            };
            if matches!(decl.kind(), DeclKind::TranslationUnit) {
                break;
            }
            segments.push(decl.name().to_string());
            current = decl.parent();
        }
        segments.reverse();
        segments.join("::")
    }

    /// Render a host type with declaration names
    #[must_use]
    pub fn type_name(&self, ty: &HostType) -> String {
        match ty {
            HostType::Builtin(builtin) => builtin.to_string(),
            HostType::Record(id) => self.qualified_name(*id),
            HostType::Handle(inner) => format!("{}^", self.type_name(inner)),
            HostType::Array { element, rank, .. } => {
                format!("cli::array<{}, {rank}>", self.type_name(element))
            }
            HostType::TemplateParam { decl, .. } => self
                .get(*decl)
                .map(|param| param.name().to_string())
                .unwrap_or_else(|_| ty.to_string()),
            HostType::Instantiation { template, args } => {
                let args: Vec<String> = args.iter().map(|arg| self.type_name(&arg.ty)).collect();
                format!("{}<{}>", self.qualified_name(*template), args.join(", "))
            }
        }
    }
}

impl Default for SemanticModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_unit() {
        let model = SemanticModel::new();
        assert_eq!(model.len(), 1);
        assert!(model.is_empty());
        assert!(matches!(
            model.get(DeclId::TRANSLATION_UNIT).unwrap().kind(),
            DeclKind::TranslationUnit
        ));
        assert!(matches!(model.get(DeclId(9)), Err(DeclNotFound(DeclId(9)))));
    }

    #[test]
    fn test_create_is_not_add() {
        let model = SemanticModel::new();
        let tu = model.translation_unit();
        let ns = model.create(DeclName::ident("System"), Some(tu), DeclKind::Namespace);

        assert!(model.lookup(tu, "System").is_empty());
        model.add_decl(tu, ns).unwrap();
        model.add_decl(tu, ns).unwrap();
        assert_eq!(model.lookup(tu, "System"), vec![ns]);
        assert_eq!(model.children(tu), vec![ns]);
    }

    #[test]
    fn test_overloads_share_key() {
        let model = SemanticModel::new();
        let tu = model.translation_unit();
        let first = model.create(
            DeclName::ident("Write"),
            Some(tu),
            DeclKind::Function(FunctionDecl::new(
                FunctionKind::Method,
                BuiltinType::Void.into(),
                true,
                false,
                None,
            )),
        );
        let second = model.create(
            DeclName::ident("Write"),
            Some(tu),
            DeclKind::Function(FunctionDecl::new(
                FunctionKind::Method,
                BuiltinType::Void.into(),
                true,
                false,
                None,
            )),
        );
        model.add_decl(tu, first).unwrap();
        model.add_decl(tu, second).unwrap();

        assert_eq!(model.lookup(tu, "Write"), vec![first, second]);
        assert!(model.function(first).is_ok());
        assert!(model.record(first).is_err());
    }

    #[test]
    fn test_access_first_wins() {
        let model = SemanticModel::new();
        let field = model.create(
            DeclName::ident("x"),
            None,
            DeclKind::Field {
                ty: BuiltinType::Int.into(),
            },
        );
        assert!(model.set_access(field, AccessSpecifier::Internal).unwrap());
        assert!(!model.set_access(field, AccessSpecifier::Public).unwrap());
        assert_eq!(
            model.get(field).unwrap().access(),
            Some(AccessSpecifier::Internal)
        );
    }

    #[test]
    fn test_qualified_and_type_names() {
        let model = SemanticModel::new();
        let tu = model.translation_unit();
        let system = model.create(DeclName::ident("System"), Some(tu), DeclKind::Namespace);
        let object = model.create(
            DeclName::ident("Object"),
            Some(system),
            DeclKind::Record(RecordDecl::new(RecordKind::Reference, None, Vec::new())),
        );

        assert_eq!(model.qualified_name(object), "System::Object");
        assert_eq!(
            model.type_name(&HostType::Record(object).handle()),
            "System::Object^"
        );
    }
}
