//! The importer: foreign metadata in, host declarations out.
//!
//! An [`Importer`] binds one foreign module (through a [`MetadataView`]) to a shared
//! [`SemanticModel`] and materializes foreign types on demand. Everything is driven from
//! [`Importer::import_type`]: primitives map to builtins, arrays to `cli::array` instantiations,
//! generic parameters to template parameters of the enclosing record, and nominal types to
//! records created by Scaffold-or-Fetch, which in turn imports bases, members, properties and
//! attributes, recursing back into `import_type` for every type it meets.
//!
//! # Architecture
//!
//! - [`primitives`] - the fixed primitive mapping
//! - [`namespace`] - namespace chain creation
//! - [`memo`] - the identity-keyed declaration memo, the cycle breaker
//! - `types` - type import and Scaffold-or-Fetch
//! - `members` - bases, methods, fields, properties, implicit operators
//! - [`access`] - foreign to host access mapping
//! - `attributes` - custom attribute reconstruction
//! - `generics` - template synthesis, parameter resolution, argument binding
//!
//! # Failure Policy
//!
//! Failures are local. A member, base, property or attribute that cannot be imported is dropped
//! and logged at debug level; the declaration it belonged to still completes. Only the failure to
//! scaffold a record (bad namespace, missing generic parameter rows, unsupported generics) fails
//! the import of that type, and [`Importer::import_all`] carries on with the next.
//!
//! # Population Order
//!
//! Scaffolds are memoized first and populated later, from a queue drained by the outermost
//! import call. Deep base or field chains therefore cost queue entries, not stack frames; the
//! only recursion left is the nesting of a single signature, bounded by
//! [`ImportConfig::max_recursion_depth`].
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use dotbridge::{metadata::{MetadataBuilder, TypeSig}, sema::SemanticModel, Importer};
//!
//! let mut builder = MetadataBuilder::new("corlib.dll");
//! let object = builder.class("System", "Object", |t| t);
//! let int = builder.class("System", "Int32", |t| t.extends(object));
//! let node = builder.define_type("Demo", "Node");
//! builder.with_type(node, |t| t.extends(object).field("next", node).field("value", int))?;
//!
//! let importer = Importer::new(Arc::new(builder.build()), Arc::new(SemanticModel::new()));
//! let ty = importer.import_type(&TypeSig::Defined(node), None)?;
//! assert_eq!(importer.model().type_name(&ty), "Demo::Node^");
//! # Ok::<(), dotbridge::Error>(())
//! ```

pub mod access;
mod attributes;
mod generics;
mod members;
pub mod memo;
pub mod namespace;
pub mod primitives;
mod types;

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use crate::{
    config::ImportConfig,
    import::{
        memo::DeclMemo,
        primitives::{PrimitiveTable, STANDARD_ROOT_NAMESPACE},
    },
    metadata::{rows::TypeDefRow, source::MetadataSource, token::Token, view::MetadataView},
    sema::{CompletionState, DeclId, SemanticModel},
    Error::{self, RecursionLimit},
    Result,
};

/// Name of the global module type, which is never imported as a record
const MODULE_TYPE_NAME: &str = "<Module>";

/// Outcome of [`Importer::import_all`]
#[derive(Debug, Default)]
pub struct ImportSummary {
    /// Types imported, with their record
    pub imported: Vec<(Token, DeclId)>,
    /// Types whose scaffold could not be created
    pub failed: Vec<(Token, Error)>,
}

impl ImportSummary {
    /// True if every type was imported
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of imported types
    #[must_use]
    pub fn imported_count(&self) -> usize {
        self.imported.len()
    }

    /// Number of failed types
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

/// Releases one nesting level when dropped
struct DepthGuard<'a> {
    depth: &'a AtomicUsize,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Restores the nesting depth of the caller and clears the draining flag when dropped
struct DrainGuard<'a> {
    draining: &'a AtomicBool,
    depth: &'a AtomicUsize,
    outer_depth: usize,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.depth.store(self.outer_depth, Ordering::Release);
        self.draining.store(false, Ordering::Release);
    }
}

/// A scaffolded record whose members have not been imported yet
struct PendingRecord {
    record: DeclId,
    row: TypeDefRow,
}

/// Imports the types of one foreign module into a semantic model
pub struct Importer {
    view: MetadataView,
    model: Arc<SemanticModel>,
    memo: DeclMemo,
    primitives: Arc<PrimitiveTable>,
    config: ImportConfig,
    depth: AtomicUsize,
    pending: Mutex<VecDeque<PendingRecord>>,
    draining: AtomicBool,
}

impl Importer {
    /// Create an importer with the default configuration
    ///
    /// ## Arguments
    /// * 'source' - The foreign module
    /// * 'model' - The semantic model receiving declarations; may be shared with other importers
    pub fn new(source: Arc<dyn MetadataSource>, model: Arc<SemanticModel>) -> Self {
        Self::with_config(source, model, ImportConfig::default())
    }

    /// Create an importer with an explicit configuration
    pub fn with_config(
        source: Arc<dyn MetadataSource>,
        model: Arc<SemanticModel>,
        config: ImportConfig,
    ) -> Self {
        let primitives = if config.root_namespace == STANDARD_ROOT_NAMESPACE {
            PrimitiveTable::standard()
        } else {
            Arc::new(PrimitiveTable::new(&config.root_namespace))
        };

        Importer {
            view: MetadataView::new(source, &config.root_namespace),
            model,
            memo: DeclMemo::new(),
            primitives,
            config,
            depth: AtomicUsize::new(0),
            pending: Mutex::new(VecDeque::new()),
            draining: AtomicBool::new(false),
        }
    }

    /// Replace the primitive table, e.g. with one bound to the core library's tokens
    #[must_use]
    pub fn with_primitives(mut self, primitives: Arc<PrimitiveTable>) -> Self {
        self.primitives = primitives;
        self
    }

    /// The foreign module
    #[must_use]
    pub fn view(&self) -> &MetadataView {
        &self.view
    }

    /// The semantic model
    #[must_use]
    pub fn model(&self) -> &Arc<SemanticModel> {
        &self.model
    }

    /// The declaration memo of this module
    #[must_use]
    pub fn memo(&self) -> &DeclMemo {
        &self.memo
    }

    /// The primitive table in use
    #[must_use]
    pub fn primitives(&self) -> &PrimitiveTable {
        &self.primitives
    }

    /// The active configuration
    #[must_use]
    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Import every type definition of the module.
    ///
    /// Each type is imported independently; a failure is recorded and the walk continues.
    #[tracing::instrument(level = "debug", skip_all, fields(module = %self.view.module_name()))]
    pub fn import_all(&self) -> ImportSummary {
        let mut summary = ImportSummary::default();
        for token in self.view.types() {
            let is_module_type = self
                .view
                .source()
                .type_def(token)
                .is_some_and(|row| row.namespace.is_empty() && row.name == MODULE_TYPE_NAME);
            if is_module_type {
                continue;
            }

            match self.import_definition(token) {
                Ok(decl) => summary.imported.push((token, decl)),
                Err(error) => {
                    tracing::debug!(%token, %error, "type import failed");
                    summary.failed.push((token, error));
                }
            }
        }

        tracing::debug!(
            imported = summary.imported_count(),
            failed = summary.failed_count(),
            "module import finished"
        );
        summary
    }

    /// Queue a freshly scaffolded record for population
    fn defer_population(&self, record: DeclId, row: TypeDefRow) {
        lock!(self.pending).push_back(PendingRecord { record, row });
    }

    /// Populate queued records until none is left.
    ///
    /// Only the outermost caller drains. Records scaffolded while a record is being populated are
    /// queued and picked up by the running loop, so the stack never grows with the depth of the
    /// type graph. A re-entrant request meanwhile gets the scaffold from the memo. Every record is
    /// populated at nesting depth zero, whatever signature triggered its scaffold.
    fn drain_pending(&self) {
        if self.draining.swap(true, Ordering::AcqRel) {
            return;
        }
        let _draining = DrainGuard {
            draining: &self.draining,
            depth: &self.depth,
            outer_depth: self.depth.swap(0, Ordering::AcqRel),
        };

        loop {
            let next = lock!(self.pending).pop_front();
            let Some(PendingRecord { record, row }) = next else {
                break;
            };
            let Ok(record_decl) = self.model.record(record) else {
                continue;
            };

            record_decl.set_state(CompletionState::Populating);
            self.populate_record(record, &row);
            record_decl.set_state(CompletionState::Complete);
        }
    }

    fn enter(&self) -> Result<DepthGuard<'_>> {
        let depth = self.depth.fetch_add(1, Ordering::AcqRel) + 1;
        let guard = DepthGuard { depth: &self.depth };
        if depth > self.config.max_recursion_depth {
            return Err(RecursionLimit(self.config.max_recursion_depth));
        }
        Ok(guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{corlib, importer, system};

    #[test]
    fn test_depth_guard_releases() {
        let importer = Importer::with_config(
            Arc::new(corlib().build()),
            Arc::new(SemanticModel::new()),
            ImportConfig::default().with_max_recursion_depth(1),
        );

        {
            let _outer = importer.enter().unwrap();
            assert!(matches!(importer.enter(), Err(RecursionLimit(1))));
        }
        assert!(importer.enter().is_ok());
        assert_eq!(importer.depth.load(Ordering::Acquire), 0);
    }

    #[test]
    fn test_population_waits_for_outermost_drain() {
        let mut builder = corlib();
        let object = system(&builder, "Object");
        let widget = builder.class("Demo", "Widget", |t| t.extends(object).field("owner", object));
        let importer = importer(builder);

        let _outer = importer.enter().unwrap();
        importer.draining.store(true, Ordering::Release);
        let record = importer.import_definition(widget).unwrap();
        let record_decl = importer.model().record(record).unwrap();
        assert_eq!(record_decl.state(), CompletionState::Scaffolded);
        assert!(importer.model().lookup(record, "owner").is_empty());

        importer.draining.store(false, Ordering::Release);
        importer.drain_pending();
        assert_eq!(record_decl.state(), CompletionState::Complete);
        assert!(record_decl.base().is_some());
        assert_eq!(importer.model().lookup(record, "owner").len(), 1);
        assert!(lock!(importer.pending).is_empty());
        assert_eq!(importer.depth.load(Ordering::Acquire), 1);
        assert!(!importer.draining.load(Ordering::Acquire));
    }

    #[test]
    fn test_import_all_skips_module_type() {
        let mut builder = corlib();
        builder.class("", MODULE_TYPE_NAME, |t| t);
        let store = builder.build();
        let type_count = store.type_count();

        let importer = Importer::new(Arc::new(store), Arc::new(SemanticModel::new()));
        let summary = importer.import_all();
        assert!(summary.is_complete());
        assert_eq!(summary.imported_count(), type_count - 1);
        assert!(importer
            .model()
            .lookup(importer.model().translation_unit(), MODULE_TYPE_NAME)
            .is_empty());
    }

    #[test]
    fn test_custom_root_namespace() {
        let importer = Importer::with_config(
            Arc::new(corlib().build()),
            Arc::new(SemanticModel::new()),
            ImportConfig::default().with_root_namespace("Mono"),
        );
        assert_eq!(importer.primitives().root_namespace(), "Mono");
        assert_eq!(importer.view().root_namespace(), "Mono");
    }
}
