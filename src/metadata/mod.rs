//! The foreign side: typed access to .NET metadata.
//!
//! This module describes what the importer consumes. Decoding the binary table format is left to
//! whoever implements [`MetadataSource`]; everything here works on already decoded rows.
//!
//! # Key Components
//!
//! - [`token`] - Metadata tokens, the sole identity of a foreign entity
//! - [`flags`] - Type, method and field attribute flags
//! - [`signature`] - [`TypeSig`], the foreign type reference
//! - [`rows`] - Typed rows for types, members, generic parameters and custom attributes
//! - [`source`] - The [`MetadataSource`] capability and the in-memory [`MetadataStore`]
//! - [`builder`] - [`MetadataBuilder`], a fluent way to fill a [`MetadataStore`]
//! - [`view`] - [`MetadataView`], navigation on top of a source
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use dotbridge::metadata::{MetadataBuilder, MetadataView};
//!
//! let mut builder = MetadataBuilder::new("corlib.dll");
//! let object = builder.class("System", "Object", |t| t);
//! let value_type = builder.class("System", "ValueType", |t| t.extends(object));
//! let point = builder.class("Demo", "Point", |t| t.extends(value_type));
//!
//! let view = MetadataView::new(Arc::new(builder.build()), "System");
//! let row = view.resolve_type(point)?;
//! assert_eq!(row.fullname(), "Demo.Point");
//! assert!(view.is_value_type(&row));
//! # Ok::<(), dotbridge::Error>(())
//! ```

/// Fluent construction of in-memory metadata
pub mod builder;
/// Type, method and field attribute flags
pub mod flags;
/// Typed metadata rows
pub mod rows;
/// Foreign type references
pub mod signature;
/// The metadata query capability and its in-memory implementation
pub mod source;
/// Commonly used metadata token type
pub mod token;
/// Navigation over a metadata source
pub mod view;

pub use builder::{AttributeBuilder, MetadataBuilder, MethodBuilder, PropertyBuilder, TypeDefBuilder};
pub use rows::{
    AttributeOwner, CustomAttributeArgument, CustomAttributeNamedArgument, CustomAttributeRow,
    FieldRow, GenericParamOwner, GenericParamRow, MethodDefRow, ParamRow, PropertyRow, TypeDefRow,
    TypeRefRow,
};
pub use signature::TypeSig;
pub use source::{MetadataSource, MetadataStore};
pub use token::Token;
pub use view::{Accessors, MetadataView};
