//! Custom attribute reconstruction.

use crate::{
    import::Importer,
    metadata::{
        rows::{AttributeOwner, CustomAttributeRow},
        token::Token,
    },
    sema::{AttributeArgument, AttributeArgumentKind, DeclId, HostAttribute},
    Result,
};

/// Name of the attribute marking a parameter array, under the root namespace
const PARAM_ARRAY_ATTRIBUTE: &str = "ParamArrayAttribute";

impl Importer {
    /// Reconstruct every custom attribute of `owner` and attach it to `decl`.
    ///
    /// An attribute whose class or constructor cannot be imported is dropped as a whole.
    pub(crate) fn attach_attributes(&self, decl: DeclId, owner: AttributeOwner) {
        if !self.config.import_custom_attributes {
            return;
        }

        for row in self.view.custom_attributes(owner) {
            let attribute = match self.reconstruct_attribute(&row) {
                Ok(attribute) => attribute,
                Err(error) => {
                    tracing::debug!(token = %row.token, %error, "attribute dropped");
                    continue;
                }
            };
            if let Err(error) = self.model.add_attribute(decl, attribute) {
                tracing::debug!(token = %row.token, %error, "attribute dropped");
            }
        }
    }

    fn reconstruct_attribute(&self, row: &CustomAttributeRow) -> Result<HostAttribute> {
        let constructor = self.view.method(row.constructor)?;
        let declaring = self.view.declaring_type(&constructor)?;
        let class = self.scaffold_or_fetch(&declaring)?;
        let constructor = self.find_create_method(&constructor, class, true)?;

        let positional = row.fixed_args.iter().map(|value| AttributeArgument {
            kind: AttributeArgumentKind::Positional,
            name: String::new(),
            value: Some(value.clone()),
        });
        let fields = row
            .named_args
            .iter()
            .filter(|named| named.is_field)
            .map(|named| AttributeArgument {
                kind: AttributeArgumentKind::Field,
                name: named.name.clone(),
                value: Some(named.value.clone()),
            });
        let properties = row
            .named_args
            .iter()
            .filter(|named| !named.is_field)
            .map(|named| AttributeArgument {
                kind: AttributeArgumentKind::Property,
                name: named.name.clone(),
                value: Some(named.value.clone()),
            });

        Ok(HostAttribute {
            class,
            constructor,
            args: positional.chain(fields).chain(properties).collect(),
        })
    }

    /// True if the parameter carries `<root>.ParamArrayAttribute`.
    ///
    /// Reads the raw metadata so the answer does not depend on attribute import being enabled.
    pub(crate) fn is_param_array(&self, method: Token, sequence: u16) -> bool {
        let expected = self.config.root_type(PARAM_ARRAY_ATTRIBUTE);
        self.view
            .custom_attributes(AttributeOwner::Param { method, sequence })
            .iter()
            .any(|row| {
                self.view
                    .method(row.constructor)
                    .and_then(|constructor| self.view.declaring_type(&constructor))
                    .is_ok_and(|declaring| declaring.fullname() == expected)
            })
    }
}
