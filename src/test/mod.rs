//! Fixtures shared by the unit tests: a small core library and importer shortcuts.

use std::sync::Arc;

use crate::{
    import::{primitives::PrimitiveKind, Importer},
    metadata::{
        builder::MetadataBuilder,
        source::MetadataSource,
        token::Token,
    },
    sema::SemanticModel,
};
use strum::IntoEnumIterator;

/// A core library: `Object`, `ValueType`, `Enum`, every primitive, `Array`, `Attribute`,
/// `ParamArrayAttribute` and the generic `System.Collections.Generic.List`1`.
pub fn corlib() -> MetadataBuilder {
    let mut builder = MetadataBuilder::new("corlib.dll");

    let object = builder.define_type("System", "Object");
    let value_type = builder.class("System", "ValueType", |t| t.extends(object));
    builder.class("System", "Enum", |t| t.extends(value_type));

    for kind in PrimitiveKind::iter() {
        let base = if kind.is_reference() { object } else { value_type };
        builder.class("System", kind.name(), |t| t.extends(base));
    }
    let void = system(&builder, "Void");
    let boolean = system(&builder, "Boolean");
    let int = system(&builder, "Int32");
    let string = system(&builder, "String");

    builder
        .with_type(object, |t| {
            t.constructor(void, |m| m)
                .method("Equals", boolean, |m| m.param("obj", object).virtual_())
                .method("ToString", string, |m| m.virtual_())
        })
        .unwrap();

    builder.class("System", "Array", |t| {
        t.extends(object)
            .property("Length", int, |p| p.get())
    });
    let attribute = builder.class("System", "Attribute", |t| {
        t.extends(object).constructor(void, |m| m)
    });
    builder.class("System", "ParamArrayAttribute", |t| {
        t.extends(attribute).constructor(void, |m| m)
    });

    let list = builder.define_type("System.Collections.Generic", "List`1");
    builder
        .with_type(list, |t| {
            t.extends(object)
                .generic_param("T")
                .constructor(void, |m| m)
                .property("Count", int, |p| p.get())
        })
        .unwrap();

    builder
}

/// Token of a type defined in the `System` namespace of `builder`
pub fn system(builder: &MetadataBuilder, name: &str) -> Token {
    builder
        .store()
        .find_type("System", name)
        .unwrap_or_else(|| panic!("System.{name} is not defined"))
}

/// An importer over `builder` with a fresh model and the default configuration
pub fn importer(builder: MetadataBuilder) -> Importer {
    Importer::new(Arc::new(builder.build()), Arc::new(SemanticModel::new()))
}
