// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # dotbridge
//!
//! Lazy, memoized import of .NET (ECMA-335) metadata into a host compiler's semantic model.
//!
//! A compiler that wants to consume .NET assemblies needs more than a metadata parser: every
//! foreign type has to become a host declaration (a record with bases, methods, fields,
//! properties, attributes, generic templates) that the rest of the compiler can name, look up
//! and type-check against. `dotbridge` performs that translation on demand. Types are imported
//! the first time they are referenced, each foreign type becomes exactly one host record, and
//! arbitrary reference cycles between types (a class referencing itself, two classes referencing
//! each other) terminate.
//!
//! ## Features
//!
//! - **Lazy** - Nothing is imported until a type is referenced; its dependencies follow on demand
//! - **Memoized** - One record per foreign type, one function per foreign method, per module
//! - **Cycle-safe** - Records are registered before their members are imported
//! - **Local failure** - An unresolvable member drops that member only, never its record
//! - **Generics** - Generic types become class templates, instantiations bind template arguments
//! - **Attributes** - Custom attributes are reconstructed with their constructor and arguments
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use dotbridge::prelude::*;
//!
//! let mut builder = MetadataBuilder::new("corlib.dll");
//! let object = builder.class("System", "Object", |t| t);
//! let void = builder.class("System", "Void", |t| t.extends(object));
//! let int = builder.class("System", "Int32", |t| t.extends(object));
//! let counter = builder.class("Demo", "Counter", |t| {
//!     t.extends(object)
//!         .field("count", int)
//!         .method("Increment", void, |m| m.param("by", int))
//! });
//!
//! let importer = Importer::new(Arc::new(builder.build()), Arc::new(SemanticModel::new()));
//! let record = importer.import_definition(counter)?;
//!
//! let model = importer.model();
//! assert_eq!(model.qualified_name(record), "Demo::Counter");
//! assert_eq!(model.lookup(record, "Increment").len(), 1);
//! # Ok::<(), dotbridge::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata`] - The foreign side: tokens, rows, type signatures, the [`metadata::MetadataSource`]
//!   seam and an in-memory store with a fluent builder
//! - [`sema`] - The host side: an arena-backed [`sema::SemanticModel`] of declarations and types
//! - [`import`] - The [`Importer`] connecting both
//! - [`config`] - [`ImportConfig`] presets and limits
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Logging
//!
//! The importer emits `tracing` events: a `debug` span per module import and per scaffolded
//! record, a `debug` event for every member, base or attribute dropped on failure, and `trace`
//! events on memo hits. Install any `tracing` subscriber to see them.
//!
//! ## Thread Safety
//!
//! [`sema::SemanticModel`], [`metadata::MetadataStore`] and [`Importer`] are `Send + Sync`. A
//! model can be shared between the importers of several modules; a type a module only references
//! is picked up from the records another importer already declared.

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust
/// use dotbridge::prelude::*;
///
/// let model = SemanticModel::new();
/// assert!(model.is_empty());
/// ```
pub mod prelude;

/// Import configuration presets and limits
pub mod config;

pub mod import;
pub mod metadata;
pub mod sema;

/// `dotbridge` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `dotbridge` Error type
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use dotbridge::{metadata::{MetadataStore, Token, TypeSig}, sema::SemanticModel, Error, Importer};
///
/// let importer = Importer::new(Arc::new(MetadataStore::new("empty.dll")), Arc::new(SemanticModel::new()));
/// match importer.import_type(&TypeSig::Defined(Token::new(0x0200_0001)), None) {
///     Err(Error::TypeNotFound(token)) => assert_eq!(token.value(), 0x0200_0001),
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
pub use error::Error;

/// Main entry point: imports the types of one foreign module
pub use import::{ImportSummary, Importer};

/// Configuration of an [`Importer`]
pub use config::ImportConfig;
