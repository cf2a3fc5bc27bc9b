//! Declarations of the host semantic model.
//!
//! A [`Decl`] is created once and never moved; fields that are only known after creation (access,
//! base, described template, attributes, children, parameters) are set-once or append-only, so
//! the importer can keep filling a declaration while other code already holds its [`DeclId`].

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        OnceLock, RwLock,
    },
};

use crate::{
    metadata::{rows::CustomAttributeArgument, token::Token},
    sema::{access::AccessSpecifier, types::HostType, DeclId},
};

/// Overloadable operators the importer synthesizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverloadedOperator {
    /// `operator==`
    Equal,
    /// `operator!=`
    NotEqual,
}

impl OverloadedOperator {
    /// Spelling of the operator
    #[must_use]
    pub fn spelling(self) -> &'static str {
        match self {
            OverloadedOperator::Equal => "==",
            OverloadedOperator::NotEqual => "!=",
        }
    }
}

/// Declaration name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeclName {
    /// Plain identifier
    Identifier(String),
    /// Constructor of the enclosing record
    Constructor,
    /// Operator function
    Operator(OverloadedOperator),
}

impl DeclName {
    /// Identifier name
    #[must_use]
    pub fn ident(name: &str) -> Self {
        DeclName::Identifier(name.to_string())
    }

    /// The key this name is registered under in its context
    #[must_use]
    pub fn lookup_key(&self) -> String {
        match self {
            DeclName::Identifier(name) => name.clone(),
            DeclName::Constructor => ".ctor".to_string(),
            DeclName::Operator(op) => format!("operator{}", op.spelling()),
        }
    }

    /// True for the empty identifier
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, DeclName::Identifier(name) if name.is_empty())
    }
}

impl fmt::Display for DeclName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lookup_key())
    }
}

/// Completion state of an imported record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionState {
    /// Name, namespace and kind known; no base or members
    Scaffolded,
    /// Base, interfaces and members are being added
    Populating,
    /// Members finalized
    Complete,
}

/// Kind of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Interface class, used through handles
    Interface,
    /// Value class, used inline
    Value,
    /// Reference class, used through handles
    Reference,
}

/// Identity of the foreign type a record was imported from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliRecordData {
    /// `TypeDef` token in the owning module
    pub token: Token,
    /// Full foreign name (`Namespace.Name`)
    pub full_name: String,
    /// Name of the owning module
    pub module: String,
}

/// A base class or interface relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseSpecifier {
    /// The base type
    pub ty: HostType,
    /// Access of the relation
    pub access: AccessSpecifier,
    /// True for interface relations
    pub is_interface: bool,
}

/// A record (class) declaration
#[derive(Debug)]
pub struct RecordDecl {
    kind: RecordKind,
    cli: Option<CliRecordData>,
    state: RwLock<CompletionState>,
    base: OnceLock<BaseSpecifier>,
    interfaces: boxcar::Vec<BaseSpecifier>,
    template: OnceLock<DeclId>,
    generic_params: Vec<String>,
}

impl RecordDecl {
    /// A new record in the [`CompletionState::Scaffolded`] state
    #[must_use]
    pub fn new(kind: RecordKind, cli: Option<CliRecordData>, generic_params: Vec<String>) -> Self {
        RecordDecl {
            kind,
            cli,
            state: RwLock::new(CompletionState::Scaffolded),
            base: OnceLock::new(),
            interfaces: boxcar::Vec::new(),
            template: OnceLock::new(),
            generic_params,
        }
    }

    /// Record kind
    #[must_use]
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Foreign identity, absent for synthesized records
    #[must_use]
    pub fn cli(&self) -> Option<&CliRecordData> {
        self.cli.as_ref()
    }

    /// Current completion state
    #[must_use]
    pub fn state(&self) -> CompletionState {
        *read_lock!(self.state)
    }

    /// Move to `state`
    pub fn set_state(&self, state: CompletionState) {
        *write_lock!(self.state) = state;
    }

    /// The sole base class, if one resolved
    #[must_use]
    pub fn base(&self) -> Option<&BaseSpecifier> {
        self.base.get()
    }

    /// Attach the base class; returns false if one is already attached
    pub fn set_base(&self, base: BaseSpecifier) -> bool {
        self.base.set(base).is_ok()
    }

    /// Attach an interface relation
    pub fn add_interface(&self, interface: BaseSpecifier) {
        self.interfaces.push(interface);
    }

    /// Interface relations, in attachment order
    pub fn interfaces(&self) -> impl Iterator<Item = &BaseSpecifier> {
        self.interfaces.iter().map(|(_, interface)| interface)
    }

    /// The class template describing this record, for generic records
    #[must_use]
    pub fn described_template(&self) -> Option<DeclId> {
        self.template.get().copied()
    }

    /// Link the describing class template; returns false if already linked
    pub fn set_described_template(&self, template: DeclId) -> bool {
        self.template.set(template).is_ok()
    }

    /// Declared generic parameter names, in order
    #[must_use]
    pub fn generic_params(&self) -> &[String] {
        &self.generic_params
    }

    /// True for interface and reference records, which are used through handles
    #[must_use]
    pub fn is_handle_kind(&self) -> bool {
        self.kind != RecordKind::Value
    }
}

/// A class template wrapping a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTemplateDecl {
    /// Template type parameters, in order
    pub params: Vec<DeclId>,
    /// The templated record
    pub templated: DeclId,
}

/// Kind of a function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// Ordinary member function
    Method,
    /// Constructor
    Constructor,
    /// Operator function
    Operator,
}

/// Identity of the foreign method a function was imported from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliMethodData {
    /// `MethodDef` token
    pub token: Token,
    /// Full name (`Namespace.Type::Method`)
    pub full_name: String,
}

/// A function declaration
#[derive(Debug)]
pub struct FunctionDecl {
    kind: FunctionKind,
    return_type: HostType,
    params: boxcar::Vec<DeclId>,
    is_static: bool,
    is_variadic: bool,
    param_array: AtomicBool,
    cli: Option<CliMethodData>,
}

impl FunctionDecl {
    /// A new function without parameters
    #[must_use]
    pub fn new(
        kind: FunctionKind,
        return_type: HostType,
        is_static: bool,
        is_variadic: bool,
        cli: Option<CliMethodData>,
    ) -> Self {
        FunctionDecl {
            kind,
            return_type,
            params: boxcar::Vec::new(),
            is_static,
            is_variadic,
            param_array: AtomicBool::new(false),
            cli,
        }
    }

    /// Function kind
    #[must_use]
    pub fn kind(&self) -> FunctionKind {
        self.kind
    }

    /// Return type
    #[must_use]
    pub fn return_type(&self) -> &HostType {
        &self.return_type
    }

    /// Parameter declarations, in declared order
    #[must_use]
    pub fn params(&self) -> Vec<DeclId> {
        self.params.iter().map(|(_, param)| *param).collect()
    }

    /// Append a parameter declaration
    pub fn add_param(&self, param: DeclId) {
        self.params.push(param);
    }

    /// True for static functions
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// True for variadic functions
    #[must_use]
    pub fn is_variadic(&self) -> bool {
        self.is_variadic
    }

    /// True if the last parameter is a parameter array
    #[must_use]
    pub fn is_param_array(&self) -> bool {
        self.param_array.load(Ordering::Acquire)
    }

    /// Flag the last parameter as a parameter array
    pub fn set_param_array(&self) {
        self.param_array.store(true, Ordering::Release);
    }

    /// Foreign identity, absent for synthesized functions
    #[must_use]
    pub fn cli(&self) -> Option<&CliMethodData> {
        self.cli.as_ref()
    }
}

/// A property declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDecl {
    /// Property type
    pub ty: HostType,
    /// Indexer parameter types, empty for plain properties
    pub indexer_types: Vec<HostType>,
    /// Getter function, not registered as an ordinary member
    pub getter: Option<DeclId>,
    /// Setter function, not registered as an ordinary member
    pub setter: Option<DeclId>,
}

/// What a declaration is
#[derive(Debug)]
pub enum DeclKind {
    /// The root of the declaration tree
    TranslationUnit,
    /// A namespace
    Namespace,
    /// A record
    Record(RecordDecl),
    /// A class template
    ClassTemplate(ClassTemplateDecl),
    /// A template type parameter
    TemplateTypeParam {
        /// Zero-based position
        index: u32,
    },
    /// A function
    Function(FunctionDecl),
    /// An instance field
    Field {
        /// Field type
        ty: HostType,
    },
    /// A static-storage variable (static field)
    Var {
        /// Variable type
        ty: HostType,
    },
    /// A property
    Property(PropertyDecl),
    /// A function parameter
    Param {
        /// Parameter type
        ty: HostType,
        /// Zero-based position
        index: u32,
    },
}

impl DeclKind {
    /// Short description of the kind, used in diagnostics
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            DeclKind::TranslationUnit => "translation unit",
            DeclKind::Namespace => "namespace",
            DeclKind::Record(_) => "record",
            DeclKind::ClassTemplate(_) => "class template",
            DeclKind::TemplateTypeParam { .. } => "template type parameter",
            DeclKind::Function(_) => "function",
            DeclKind::Field { .. } => "field",
            DeclKind::Var { .. } => "variable",
            DeclKind::Property(_) => "property",
            DeclKind::Param { .. } => "parameter",
        }
    }
}

/// Role of an argument of a reconstructed attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeArgumentKind {
    /// Constructor argument
    Positional,
    /// Named field argument
    Field,
    /// Named property argument
    Property,
}

/// One argument of a reconstructed attribute
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeArgument {
    /// Argument role
    pub kind: AttributeArgumentKind,
    /// Field or property name, empty for positional arguments
    pub name: String,
    /// Decoded foreign value, carried uninterpreted
    pub value: Option<CustomAttributeArgument>,
}

/// A custom attribute instance attached to a declaration
#[derive(Debug, Clone, PartialEq)]
pub struct HostAttribute {
    /// The attribute class record
    pub class: DeclId,
    /// The constructor used
    pub constructor: DeclId,
    /// Arguments: positional, then named fields, then named properties
    pub args: Vec<AttributeArgument>,
}

/// A declaration in the host semantic model
#[derive(Debug)]
pub struct Decl {
    name: DeclName,
    parent: Option<DeclId>,
    kind: DeclKind,
    access: OnceLock<AccessSpecifier>,
    implicit: bool,
    attributes: boxcar::Vec<HostAttribute>,
    children: boxcar::Vec<DeclId>,
}

impl Decl {
    pub(crate) fn new(name: DeclName, parent: Option<DeclId>, kind: DeclKind, implicit: bool) -> Self {
        Decl {
            name,
            parent,
            kind,
            access: OnceLock::new(),
            implicit,
            attributes: boxcar::Vec::new(),
            children: boxcar::Vec::new(),
        }
    }

    /// Declaration name
    #[must_use]
    pub fn name(&self) -> &DeclName {
        &self.name
    }

    /// Semantic parent
    #[must_use]
    pub fn parent(&self) -> Option<DeclId> {
        self.parent
    }

    /// What the declaration is
    #[must_use]
    pub fn kind(&self) -> &DeclKind {
        &self.kind
    }

    /// Access specifier, once set
    #[must_use]
    pub fn access(&self) -> Option<AccessSpecifier> {
        self.access.get().copied()
    }

    pub(crate) fn set_access(&self, access: AccessSpecifier) -> bool {
        self.access.set(access).is_ok()
    }

    /// True for declarations synthesized rather than imported
    #[must_use]
    pub fn is_implicit(&self) -> bool {
        self.implicit
    }

    /// Attached attributes, in attachment order
    #[must_use]
    pub fn attributes(&self) -> Vec<&HostAttribute> {
        self.attributes.iter().map(|(_, attribute)| attribute).collect()
    }

    pub(crate) fn add_attribute(&self, attribute: HostAttribute) {
        self.attributes.push(attribute);
    }

    /// Registered children, in registration order
    #[must_use]
    pub fn children(&self) -> Vec<DeclId> {
        self.children.iter().map(|(_, child)| *child).collect()
    }

    pub(crate) fn add_child(&self, child: DeclId) {
        self.children.push(child);
    }

    /// The record payload, for record declarations
    #[must_use]
    pub fn as_record(&self) -> Option<&RecordDecl> {
        match &self.kind {
            DeclKind::Record(record) => Some(record),
            _ => None,
        }
    }

    /// The function payload, for function declarations
    #[must_use]
    pub fn as_function(&self) -> Option<&FunctionDecl> {
        match &self.kind {
            DeclKind::Function(function) => Some(function),
            _ => None,
        }
    }

    /// The template payload, for class template declarations
    #[must_use]
    pub fn as_template(&self) -> Option<&ClassTemplateDecl> {
        match &self.kind {
            DeclKind::ClassTemplate(template) => Some(template),
            _ => None,
        }
    }

    /// The property payload, for property declarations
    #[must_use]
    pub fn as_property(&self) -> Option<&PropertyDecl> {
        match &self.kind {
            DeclKind::Property(property) => Some(property),
            _ => None,
        }
    }

    /// The declared type of fields, variables and parameters
    #[must_use]
    pub fn value_type(&self) -> Option<&HostType> {
        match &self.kind {
            DeclKind::Field { ty } | DeclKind::Var { ty } | DeclKind::Param { ty, .. } => Some(ty),
            DeclKind::Property(property) => Some(&property.ty),
            _ => None,
        }
    }
}
