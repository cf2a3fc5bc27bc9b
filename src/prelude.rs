//! # dotbridge Prelude
//!
//! This module provides a convenient prelude for the most commonly used types of the dotbridge
//! library. Import it to get quick access to everything needed to describe a foreign module,
//! import it and inspect the result.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dotbridge operations
pub use crate::Error;

/// The result type used throughout dotbridge
pub use crate::Result;

/// Configuration of the importer
pub use crate::config::ImportConfig;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// The importer and the outcome of a whole-module import
pub use crate::import::{ImportSummary, Importer};

/// The fixed primitive mapping
pub use crate::import::primitives::{PrimitiveKind, PrimitiveTable};

// ================================================================================================
// Foreign Side
// ================================================================================================

/// Metadata token type for referencing table entries
pub use crate::metadata::token::Token;

/// Foreign type references
pub use crate::metadata::signature::TypeSig;

/// The metadata query capability and its in-memory implementation
pub use crate::metadata::source::{MetadataSource, MetadataStore};

/// Fluent construction of in-memory metadata
pub use crate::metadata::builder::MetadataBuilder;

/// Member access flags and attribute values
pub use crate::metadata::{flags::MemberAccess, rows::AttributeOwner, rows::CustomAttributeArgument};

// ================================================================================================
// Host Side
// ================================================================================================

/// The semantic model and its declarations
pub use crate::sema::{
    AccessSpecifier, BuiltinType, CompletionState, Decl, DeclId, DeclKind, DeclName, HostType,
    RecordKind, SemanticModel,
};
