//! Member Importer: bases, methods, fields, properties and implicit operators of a record.

use crate::{
    import::{access::map_access_flags, memo::MemoKey, Importer},
    metadata::{
        rows::{AttributeOwner, FieldRow, MethodDefRow, PropertyRow, TypeDefRow},
        signature::TypeSig,
        token::Token,
    },
    sema::{
        AccessSpecifier, BaseSpecifier, BuiltinType, CliMethodData, DeclId, DeclKind, DeclName,
        FunctionDecl, FunctionKind, HostType, OverloadedOperator, PropertyDecl,
    },
    Error::MalformedMember,
    Result,
};

impl Importer {
    /// Fill a scaffolded record. Every failure in here is absorbed per member.
    pub(crate) fn populate_record(&self, record: DeclId, row: &TypeDefRow) {
        self.import_bases(record, row);

        let accessors = self.view.accessors(row);
        for method in self.view.methods(row) {
            if method.name.is_empty() || accessors.contains(method.token) {
                continue;
            }
            if method.is_type_initializer() {
                continue;
            }
            if let Err(error) = self.find_create_method(&method, record, true) {
                tracing::debug!(token = %method.token, name = %method.name, %error, "method dropped");
            }
        }

        for field in self.view.fields(row) {
            if field.name.is_empty() {
                continue;
            }
            if let Err(error) = self.import_field(record, &field) {
                tracing::debug!(token = %field.token, name = %field.name, %error, "field dropped");
            }
        }

        if self.config.import_properties {
            for property in self.view.properties(row) {
                if property.name.is_empty() {
                    continue;
                }
                if let Err(error) = self.import_property(record, &property) {
                    tracing::debug!(token = %property.token, name = %property.name, %error, "property dropped");
                }
            }
        }

        if let Err(error) = self.add_implicit_operators(record) {
            tracing::debug!(%error, "implicit operators dropped");
        }

        self.attach_attributes(record, AttributeOwner::Token(row.token));
    }

    fn import_bases(&self, record: DeclId, row: &TypeDefRow) {
        let Ok(record_decl) = self.model.record(record) else {
            return;
        };

        if let Some(base) = &row.extends {
            let is_self = base
                .token()
                .and_then(|token| self.view.resolve_token(token).ok())
                .is_some_and(|token| token == row.token);
            if is_self {
                tracing::debug!("self-referencing base dropped");
            } else {
                match self.import_type(base, Some(record)) {
                    Ok(ty) => {
                        record_decl.set_base(BaseSpecifier {
                            ty,
                            access: AccessSpecifier::Public,
                            is_interface: false,
                        });
                    }
                    Err(error) => {
                        tracing::debug!(base = %self.view.describe(base), %error, "base dropped");
                    }
                }
            }
        }

        for interface in &row.interfaces {
            match self.import_type(interface, Some(record)) {
                Ok(ty) => record_decl.add_interface(BaseSpecifier {
                    ty,
                    access: AccessSpecifier::Public,
                    is_interface: true,
                }),
                Err(error) => {
                    tracing::debug!(interface = %self.view.describe(interface), %error, "interface dropped");
                }
            }
        }
    }

    /// Import one method of an already scaffolded record.
    ///
    /// Looks the method up by identity first (memo, then name plus token among the record's
    /// members) so a method is never declared twice. `add_to_record` is false for property
    /// accessors, which exist as functions but are not found by name lookup.
    pub(crate) fn find_create_method(
        &self,
        method: &MethodDefRow,
        record: DeclId,
        add_to_record: bool,
    ) -> Result<DeclId> {
        let key = MemoKey::method(method.token);
        if let Some(existing) = self.memo.get(key) {
            if add_to_record {
                self.model.add_decl(record, existing)?;
            }
            return Ok(existing);
        }

        if method.name.is_empty() || method.is_type_initializer() {
            return Err(MalformedMember(method.token));
        }

        let is_constructor = method.is_constructor();
        let name = if is_constructor {
            DeclName::Constructor
        } else {
            DeclName::ident(&method.name)
        };

        if let Some(existing) = self.find_declared_method(record, &name, method.token) {
            if add_to_record {
                self.model.add_decl(record, existing)?;
            }
            return Ok(self.memo.insert(key, existing));
        }

        let return_type = if is_constructor {
            HostType::Builtin(BuiltinType::Void)
        } else {
            self.import_type(&method.return_type, Some(record))?
        };
        let param_types = method
            .params
            .iter()
            .map(|param| self.import_type(&param.param_type, Some(record)))
            .collect::<Result<Vec<_>>>()?;

        // resolving the signature may have imported this very method
        if let Some(existing) = self.memo.get(key) {
            if add_to_record {
                self.model.add_decl(record, existing)?;
            }
            return Ok(existing);
        }

        let full_name = match self.model.record(record)?.cli() {
            Some(cli) => format!("{}::{}", cli.full_name, method.name),
            None => method.name.clone(),
        };
        let function = self.model.create(
            name,
            Some(record),
            DeclKind::Function(FunctionDecl::new(
                if is_constructor {
                    FunctionKind::Constructor
                } else {
                    FunctionKind::Method
                },
                return_type,
                method.is_static(),
                method.is_varargs(),
                Some(CliMethodData {
                    token: method.token,
                    full_name,
                }),
            )),
        );
        let function = self.memo.insert(key, function);
        self.model.set_access(function, map_access_flags(method.flags))?;

        let function_decl = self.model.function(function)?;
        for (index, (param, ty)) in method.params.iter().zip(param_types).enumerate() {
            let param_decl = self.model.create(
                DeclName::ident(&param.name),
                Some(function),
                DeclKind::Param {
                    ty,
                    index: u32::try_from(index).unwrap_or(u32::MAX),
                },
            );
            function_decl.add_param(param_decl);
            self.attach_attributes(
                param_decl,
                AttributeOwner::Param {
                    method: method.token,
                    sequence: param.sequence,
                },
            );
        }

        if let Some(last) = method.params.last() {
            if self.is_param_array(method.token, last.sequence) {
                function_decl.set_param_array();
            }
        }

        self.attach_attributes(function, AttributeOwner::Token(method.token));

        if add_to_record {
            self.model.add_decl(record, function)?;
        }
        Ok(function)
    }

    /// A function of `record` registered under `name` with the CLI identity `token`
    fn find_declared_method(&self, record: DeclId, name: &DeclName, token: Token) -> Option<DeclId> {
        self.model
            .lookup(record, &name.lookup_key())
            .into_iter()
            .find(|candidate| {
                self.model
                    .function(*candidate)
                    .ok()
                    .and_then(FunctionDecl::cli)
                    .is_some_and(|cli| cli.token == token)
            })
    }

    /// Import a method by token, scaffolding its declaring record first
    ///
    /// # Errors
    /// Fails if the method or its declaring type cannot be found or imported.
    pub fn import_method(&self, token: Token) -> Result<DeclId> {
        let method = self.view.method(token)?;
        let declaring = self.view.declaring_type(&method)?;
        let record = self.scaffold_or_fetch(&declaring)?;
        let is_accessor = self.view.accessors(&declaring).contains(token);
        self.find_create_method(&method, record, !is_accessor)
    }

    fn import_field(&self, record: DeclId, field: &FieldRow) -> Result<DeclId> {
        let existing = self.model.lookup(record, &field.name).into_iter().find(|candidate| {
            self.model
                .get(*candidate)
                .is_ok_and(|decl| matches!(decl.kind(), DeclKind::Field { .. } | DeclKind::Var { .. }))
        });
        if let Some(existing) = existing {
            return Ok(existing);
        }

        let ty = self.import_type(&field.field_type, Some(record))?;
        let kind = if field.is_static() {
            DeclKind::Var { ty }
        } else {
            DeclKind::Field { ty }
        };

        let decl = self
            .model
            .create(DeclName::ident(&field.name), Some(record), kind);
        self.model.set_access(decl, map_access_flags(field.flags))?;
        self.model.add_decl(record, decl)?;
        Ok(decl)
    }

    fn import_property(&self, record: DeclId, property: &PropertyRow) -> Result<DeclId> {
        let existing = self
            .model
            .lookup(record, &property.name)
            .into_iter()
            .find(|candidate| {
                self.model
                    .get(*candidate)
                    .is_ok_and(|decl| decl.as_property().is_some())
            });
        if let Some(existing) = existing {
            return Ok(existing);
        }

        let getter = property.getter.map(|token| self.view.method(token)).transpose()?;
        let setter = property.setter.map(|token| self.view.method(token)).transpose()?;

        let property_sig = match (&getter, &setter) {
            (Some(getter), _) => getter.return_type.clone(),
            (None, Some(setter)) => setter
                .params
                .last()
                .map(|param| param.param_type.clone())
                .ok_or(MalformedMember(property.token))?,
            (None, None) => return Err(MalformedMember(property.token)),
        };
        let ty = self.import_type(&property_sig, Some(record))?;

        let indexer_types = self
            .indexer_signature(getter.as_ref(), setter.as_ref())
            .iter()
            .map(|sig| self.import_type(sig, Some(record)))
            .collect::<Result<Vec<_>>>()?;

        let getter_decl = getter
            .as_ref()
            .map(|method| self.find_create_method(method, record, false))
            .transpose()?;
        let setter_decl = setter
            .as_ref()
            .map(|method| self.find_create_method(method, record, false))
            .transpose()?;

        let access = getter
            .as_ref()
            .or(setter.as_ref())
            .map_or(AccessSpecifier::Public, |method| map_access_flags(method.flags));

        let decl = self.model.create(
            DeclName::ident(&property.name),
            Some(record),
            DeclKind::Property(PropertyDecl {
                ty,
                indexer_types,
                getter: getter_decl,
                setter: setter_decl,
            }),
        );
        self.model.set_access(decl, access)?;
        self.model.add_decl(record, decl)?;
        self.attach_attributes(decl, AttributeOwner::Token(property.token));
        Ok(decl)
    }

    /// Indexer parameter types: the getter's parameters, and the setter's minus the trailing
    /// value, merged by position (the getter wins where both have one)
    fn indexer_signature(
        &self,
        getter: Option<&MethodDefRow>,
        setter: Option<&MethodDefRow>,
    ) -> Vec<TypeSig> {
        let from_getter: Vec<&TypeSig> = getter
            .map(|method| method.params.iter().map(|param| &param.param_type).collect())
            .unwrap_or_default();
        let from_setter: Vec<&TypeSig> = setter
            .map(|method| {
                let count = method.params.len().saturating_sub(1);
                method.params[..count]
                    .iter()
                    .map(|param| &param.param_type)
                    .collect()
            })
            .unwrap_or_default();

        let length = from_getter.len().max(from_setter.len());
        (0..length)
            .filter_map(|position| {
                from_getter
                    .get(position)
                    .or_else(|| from_setter.get(position))
                    .map(|sig| (*sig).clone())
            })
            .collect()
    }

    /// Declare `operator==` and `operator!=` on every imported record
    fn add_implicit_operators(&self, record: DeclId) -> Result<()> {
        let self_type = HostType::Record(record).handle();

        for op in [OverloadedOperator::Equal, OverloadedOperator::NotEqual] {
            let name = DeclName::Operator(op);
            let declared = self
                .model
                .lookup(record, &name.lookup_key())
                .into_iter()
                .any(|candidate| self.model.get(candidate).is_ok_and(|decl| decl.is_implicit()));
            if declared {
                continue;
            }

            let function = self.model.create_implicit(
                name,
                Some(record),
                DeclKind::Function(FunctionDecl::new(
                    FunctionKind::Operator,
                    HostType::Builtin(BuiltinType::Bool),
                    true,
                    false,
                    None,
                )),
            );
            let function_decl = self.model.function(function)?;
            for (index, param) in ["x", "y"].into_iter().enumerate() {
                let param = self.model.create_implicit(
                    DeclName::ident(param),
                    Some(function),
                    DeclKind::Param {
                        ty: self_type.clone(),
                        index: u32::try_from(index).unwrap_or(u32::MAX),
                    },
                );
                function_decl.add_param(param);
            }
            self.model.set_access(function, AccessSpecifier::Public)?;
            self.model.add_decl(record, function)?;
        }
        Ok(())
    }
}
