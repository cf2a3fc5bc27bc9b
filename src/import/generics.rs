//! Generic Binder: template synthesis, parameter resolution, argument binding.

use crate::{
    import::Importer,
    metadata::{
        rows::{GenericParamOwner, GenericParamRow, TypeDefRow},
        signature::TypeSig,
    },
    sema::{ClassTemplateDecl, DeclId, DeclKind, DeclName, HostType, TemplateArgument},
    Error::{NotImplemented, Scaffold, UnresolvableGenericParameter, UnresolvableType},
    Result,
};

const METHOD_GENERICS: &str = "method-level generic parameters";

impl Importer {
    /// The generic parameters of a type, in order, or the reason no template can be built
    pub(crate) fn validate_generic_params(&self, row: &TypeDefRow) -> Result<Vec<GenericParamRow>> {
        let params = self
            .view
            .generic_params(row)
            .map_err(|error| Scaffold(format!("{}: {error}", row.fullname())))?;

        if params
            .iter()
            .any(|param| matches!(param.owner, GenericParamOwner::Method(_)))
        {
            return Err(NotImplemented(METHOD_GENERICS));
        }
        Ok(params)
    }

    /// Wrap a generic record in a class template with one type parameter per declared name.
    ///
    /// The template is created next to the record (same name, same namespace) and linked as its
    /// described template; registering it in the namespace is left to the caller.
    pub(crate) fn synthesize_template(&self, record: DeclId, namespace: DeclId) -> Result<DeclId> {
        let record_decl = self.model.get(record)?;
        let names = self.model.record(record)?.generic_params();

        let mut params = Vec::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            let index = u32::try_from(index)
                .map_err(|_| Scaffold(format!("too many generic parameters on {name}")))?;
            params.push(self.model.create(
                DeclName::ident(name),
                Some(record),
                DeclKind::TemplateTypeParam { index },
            ));
        }

        let kind = DeclKind::ClassTemplate(ClassTemplateDecl {
            params,
            templated: record,
        });
        let name = record_decl.name().clone();
        let template = if record_decl.is_implicit() {
            self.model.create_implicit(name, Some(namespace), kind)
        } else {
            self.model.create(name, Some(namespace), kind)
        };

        if !self.model.record(record)?.set_described_template(template) {
            return Err(Scaffold(format!(
                "{} already has a template",
                self.model.qualified_name(record)
            )));
        }
        Ok(template)
    }

    /// Resolve a generic parameter reference against the enclosing record's template
    pub(crate) fn resolve_generic_param(
        &self,
        name: &str,
        method_level: bool,
        enclosing: Option<DeclId>,
    ) -> Result<HostType> {
        if method_level {
            return Err(NotImplemented(METHOD_GENERICS));
        }

        let enclosing = enclosing
            .ok_or_else(|| UnresolvableGenericParameter(format!("!{name} outside a generic type")))?;
        let template = match self.model.get(enclosing)?.kind() {
            DeclKind::ClassTemplate(_) => Some(enclosing),
            DeclKind::Record(record) => record.described_template(),
            _ => None,
        }
        .ok_or_else(|| {
            UnresolvableGenericParameter(format!(
                "!{name} in non-generic {}",
                self.model.qualified_name(enclosing)
            ))
        })?;

        let wanted = DeclName::ident(name);
        for param in &self.model.template(template)?.params {
            let decl = self.model.get(*param)?;
            if let DeclKind::TemplateTypeParam { index } = decl.kind() {
                if *decl.name() == wanted {
                    return Ok(HostType::TemplateParam {
                        decl: *param,
                        index: *index,
                    });
                }
            }
        }

        Err(UnresolvableGenericParameter(format!(
            "{} has no parameter !{name}",
            self.model.qualified_name(template)
        )))
    }

    /// Import every argument and bind it to the template parameter at the same position.
    ///
    /// All or nothing: a single unresolvable argument fails the binding.
    pub(crate) fn bind_generic_args(
        &self,
        template: DeclId,
        args: &[TypeSig],
        enclosing: Option<DeclId>,
    ) -> Result<Vec<TemplateArgument>> {
        let params = &self.model.template(template)?.params;
        if params.len() != args.len() {
            return Err(UnresolvableType(format!(
                "{} takes {} arguments, got {}",
                self.model.qualified_name(template),
                params.len(),
                args.len()
            )));
        }

        params
            .iter()
            .zip(args)
            .map(|(param, arg)| {
                Ok(TemplateArgument {
                    param: *param,
                    ty: self.import_type(arg, enclosing)?,
                })
            })
            .collect()
    }
}
