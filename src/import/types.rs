//! Type import and Scaffold-or-Fetch.

use crate::{
    import::{
        memo::MemoKey,
        namespace::{find_namespace, resolve_namespace},
        Importer,
    },
    metadata::{rows::TypeDefRow, signature::TypeSig, token::Token},
    sema::{
        AccessSpecifier, BaseSpecifier, CliRecordData, CompletionState, DeclId, DeclKind,
        DeclName, HostType, RecordDecl, RecordKind,
    },
    Error::{TypeNotFound, UnresolvableType},
    Result,
};

/// Namespace of the synthesized array template
const CLI_NAMESPACE: &str = "cli";
/// Name of the synthesized array template
const ARRAY_TEMPLATE_NAME: &str = "array";

/// A nominal type, as far as this module can see it
enum Nominal {
    /// Defined in this module
    Local(TypeDefRow),
    /// Referenced by name, defined elsewhere
    Foreign { namespace: String, name: String },
}

fn full_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}.{name}")
    }
}

impl Importer {
    /// Import a foreign type into the host model.
    ///
    /// ## Arguments
    /// * 'sig' - The foreign type
    /// * 'enclosing' - The record (or class template) whose generic parameters `!n` references
    ///   resolve against
    ///
    /// # Errors
    /// Fails if the type, or any type it is built from, cannot be mapped, or if the signature
    /// nests deeper than [`ImportConfig::max_recursion_depth`](crate::ImportConfig). Nothing is
    /// rolled back: records scaffolded on the way stay in the model and the memo.
    pub fn import_type(&self, sig: &TypeSig, enclosing: Option<DeclId>) -> Result<HostType> {
        let _depth = self.enter()?;
        match sig {
            TypeSig::Defined(token) => self.import_nominal(*token),
            TypeSig::Array { element, rank } => self.import_array(element, *rank, enclosing),
            TypeSig::GenericParam {
                name, method_level, ..
            } => self.resolve_generic_param(name, *method_level, enclosing),
            TypeSig::GenericInst { definition, args } => {
                self.import_generic_inst(*definition, args, enclosing)
            }
        }
    }

    /// Scaffold-or-Fetch the record of a `TypeDef` (or resolvable `TypeRef`) token.
    ///
    /// Unlike [`Importer::import_type`] this never takes the primitive fast path, so it also
    /// materializes the records of fundamental types.
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeNotFound`] for unknown tokens and any scaffold failure.
    pub fn import_definition(&self, token: Token) -> Result<DeclId> {
        let row = self.view.resolve_type(token)?;
        self.scaffold_or_fetch(&row)
    }

    fn resolve_nominal(&self, token: Token) -> Result<Nominal> {
        match self.view.resolve_type(token) {
            Ok(row) => Ok(Nominal::Local(row)),
            Err(error) => match self.view.reference_name(token) {
                Some((namespace, name)) => Ok(Nominal::Foreign { namespace, name }),
                None => Err(error),
            },
        }
    }

    fn import_nominal(&self, token: Token) -> Result<HostType> {
        match self.resolve_nominal(token)? {
            Nominal::Local(row) => {
                let module = self.view.module_name();
                if let Some(entry) = self.primitives.lookup(module, row.token, &row.fullname()) {
                    return Ok(entry.host.clone());
                }
                let record = self.scaffold_or_fetch(&row)?;
                self.record_type(record)
            }
            Nominal::Foreign { namespace, name } => {
                if let Some(entry) = self.primitives.lookup_name(&full_name(&namespace, &name)) {
                    return Ok(entry.host.clone());
                }
                let record = self
                    .find_imported(&namespace, &name)
                    .ok_or(TypeNotFound(token))?;
                self.record_type(record)
            }
        }
    }

    fn import_generic_inst(
        &self,
        definition: Token,
        args: &[TypeSig],
        enclosing: Option<DeclId>,
    ) -> Result<HostType> {
        let record = match self.resolve_nominal(definition)? {
            Nominal::Local(row) => self.scaffold_or_fetch(&row)?,
            Nominal::Foreign { namespace, name } => self
                .find_imported(&namespace, &name)
                .ok_or(TypeNotFound(definition))?,
        };

        let record_decl = self.model.record(record)?;
        let template = record_decl.described_template().ok_or_else(|| {
            UnresolvableType(format!(
                "{} is instantiated but not generic",
                self.model.qualified_name(record)
            ))
        })?;

        let args = self.bind_generic_args(template, args, enclosing)?;
        let instantiation = HostType::Instantiation { template, args };
        if record_decl.is_handle_kind() {
            Ok(instantiation.handle())
        } else {
            Ok(instantiation)
        }
    }

    fn import_array(
        &self,
        element: &TypeSig,
        rank: u32,
        enclosing: Option<DeclId>,
    ) -> Result<HostType> {
        let element = self.import_type(element, enclosing)?;
        let template = self.array_template()?;
        Ok(HostType::Array {
            template,
            element: Box::new(element),
            rank,
        }
        .handle())
    }

    /// The host type a record is used through: inline for value records, a handle otherwise
    pub(crate) fn record_type(&self, record: DeclId) -> Result<HostType> {
        let ty = HostType::Record(record);
        if self.model.record(record)?.is_handle_kind() {
            Ok(ty.handle())
        } else {
            Ok(ty)
        }
    }

    /// A CLI record of this full name already declared in `namespace` (directly, or as the
    /// record of a class template)
    fn find_existing_record(
        &self,
        namespace: DeclId,
        name: &str,
        full_name: &str,
    ) -> Option<DeclId> {
        self.model
            .lookup(namespace, name)
            .into_iter()
            .find_map(|candidate| {
                let decl = self.model.get(candidate).ok()?;
                let record = match decl.kind() {
                    DeclKind::Record(_) => candidate,
                    DeclKind::ClassTemplate(template) => template.templated,
                    _ => return None,
                };
                let cli = self.model.record(record).ok()?.cli()?;
                (cli.full_name == full_name).then_some(record)
            })
    }

    /// A record imported by any importer sharing the model
    fn find_imported(&self, namespace: &str, name: &str) -> Option<DeclId> {
        let context = find_namespace(&self.model, namespace)?;
        self.find_existing_record(context, name, &full_name(namespace, name))
    }

    /// Memo hit, adopted record or new scaffold. A new scaffold is queued for population, and the
    /// queue is drained before returning unless an outer call is already draining it.
    #[tracing::instrument(level = "debug", skip_all, fields(ty = %row.fullname(), token = %row.token))]
    pub(crate) fn scaffold_or_fetch(&self, row: &TypeDefRow) -> Result<DeclId> {
        let key = MemoKey::record(row.token);
        if let Some(existing) = self.memo.get(key) {
            tracing::trace!("memo hit");
            return Ok(existing);
        }

        let namespace = resolve_namespace(&self.model, &row.namespace)?;
        let full_name = row.fullname();
        if let Some(existing) = self.find_existing_record(namespace, &row.name, &full_name) {
            tracing::trace!("adopting record declared by another module");
            return Ok(self.memo.insert(key, existing));
        }

        let generic_params = self.validate_generic_params(row)?;

        let kind = if row.is_interface() {
            RecordKind::Interface
        } else if self.view.is_value_type(row) {
            RecordKind::Value
        } else {
            RecordKind::Reference
        };

        let record = self.model.create(
            DeclName::ident(&row.name),
            Some(namespace),
            DeclKind::Record(RecordDecl::new(
                kind,
                Some(CliRecordData {
                    token: row.token,
                    full_name,
                    module: self.view.module_name().to_string(),
                }),
                generic_params.iter().map(|param| param.name.clone()).collect(),
            )),
        );

        if generic_params.is_empty() {
            self.model.add_decl(namespace, record)?;
        } else {
            let template = self.synthesize_template(record, namespace)?;
            self.model.add_decl(namespace, template)?;
        }

        let scaffold = record;
        let record = self.memo.insert(key, record);
        if record == scaffold {
            self.defer_population(record, row.clone());
        }
        self.drain_pending();

        Ok(record)
    }

    /// The `cli::array<T, Rank>` class template, created on first use
    pub(crate) fn array_template(&self) -> Result<DeclId> {
        let key = MemoKey::array_template();
        if let Some(existing) = self.memo.get(key) {
            return Ok(existing);
        }

        let namespace = resolve_namespace(&self.model, CLI_NAMESPACE)?;
        let existing = self
            .model
            .lookup(namespace, ARRAY_TEMPLATE_NAME)
            .into_iter()
            .find(|candidate| self.model.template(*candidate).is_ok());
        if let Some(existing) = existing {
            return Ok(self.memo.insert(key, existing));
        }

        let record = self.model.create_implicit(
            DeclName::ident(ARRAY_TEMPLATE_NAME),
            Some(namespace),
            DeclKind::Record(RecordDecl::new(
                RecordKind::Reference,
                None,
                vec!["T".to_string(), "Rank".to_string()],
            )),
        );
        let template = self.synthesize_template(record, namespace)?;
        self.model.add_decl(namespace, template)?;
        let template = self.memo.insert(key, template);

        let record_decl = self.model.record(record)?;
        record_decl.set_state(CompletionState::Populating);
        let root = self.view.root_namespace();
        let base = match self.view.find_type(root, "Array") {
            Some(array) => self.import_type(&TypeSig::Defined(array), None),
            None => self
                .find_imported(root, "Array")
                .ok_or_else(|| UnresolvableType(self.config.root_type("Array")))
                .and_then(|array| self.record_type(array)),
        };
        match base {
            Ok(base) => {
                record_decl.set_base(BaseSpecifier {
                    ty: base,
                    access: AccessSpecifier::Public,
                    is_interface: false,
                });
            }
            Err(error) => tracing::debug!(%error, "array template base dropped"),
        }
        record_decl.set_state(CompletionState::Complete);

        Ok(template)
    }
}
