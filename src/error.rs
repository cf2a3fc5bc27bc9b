use thiserror::Error;

use crate::{metadata::token::Token, sema::DeclId};

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Import failures are local: a failed base, member, property or attribute is dropped from the
/// declaration being built and the error never escapes past the member that caused it. Only the
/// top-level entry points ([`crate::Importer::import_type`], [`crate::Importer::import_definition`])
/// hand these values back to the caller.
///
/// # Error Categories
///
/// ## Metadata Errors
/// - [`Error::TypeNotFound`] - A type token has no row in the metadata source
/// - [`Error::MemberNotFound`] - A method, field, property or generic parameter row is missing
/// - [`Error::MalformedMember`] - A member row is structurally unusable (e.g. zero-length name)
/// - [`Error::Malformed`] - Generic structural corruption, with the detecting source location
///
/// ## Import Errors
/// - [`Error::UnresolvableType`] - A type could not be mapped into the host model
/// - [`Error::UnresolvableGenericParameter`] - No enclosing template, or no parameter of that name
/// - [`Error::Scaffold`] - The namespace chain or record scaffold could not be created
/// - [`Error::NotImplemented`] - A metadata construct the importer deliberately does not support
/// - [`Error::RecursionLimit`] - A signature nested deeper than the configured limit
///
/// ## Host Model Errors
/// - [`Error::DeclNotFound`] - A declaration handle does not name a declaration of the expected kind
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The file is damaged and could not be used.
    ///
    /// The error includes the source location where the malformation was detected for debugging
    /// purposes.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Failed to find a type row for this token.
    ///
    /// Covers both missing `TypeDef` rows and `TypeRef` rows whose target the metadata source
    /// cannot locate.
    #[error("Failed to find type in metadata - {0}")]
    TypeNotFound(Token),

    /// Failed to find a member row (method, field, property, generic parameter) for this token.
    #[error("Failed to find member in metadata - {0}")]
    MemberNotFound(Token),

    /// The member row can not be imported as-is.
    ///
    /// Zero-length names and static constructors end up here; the member pass skips them
    /// silently.
    #[error("Malformed member - {0}")]
    MalformedMember(Token),

    /// The type could not be mapped into the host semantic model.
    #[error("Unresolvable type - {0}")]
    UnresolvableType(String),

    /// A generic parameter reference had no enclosing template, or the template has no
    /// parameter with this name.
    #[error("Unresolvable generic parameter - {0}")]
    UnresolvableGenericParameter(String),

    /// The namespace chain or the record scaffold for a type could not be created.
    ///
    /// This is the only failure that aborts the import of a whole type.
    #[error("Failed to scaffold declaration - {0}")]
    Scaffold(String),

    /// The metadata uses a construct the importer does not support.
    #[error("Not implemented - {0}")]
    NotImplemented(&'static str),

    /// Recursion limit reached.
    ///
    /// To prevent stack overflow on pathologically nested signatures (arrays of arrays, generic
    /// arguments), a maximum nesting depth is enforced. The associated value shows the limit that
    /// was reached.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// The declaration handle does not name a declaration of the expected kind.
    #[error("Failed to find declaration in semantic model - {0}")]
    DeclNotFound(DeclId),
}
