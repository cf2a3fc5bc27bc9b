//! Integration tests for importing foreign metadata into a semantic model.
//!
//! Every test builds its foreign module with `MetadataBuilder`, on top of a small core library
//! that defines the root types and the full primitive set.

use std::sync::Arc;

use dotbridge::{
    import::{
        memo::{MemoKey, MemoKind},
        primitives::PrimitiveKind,
    },
    metadata::{flags::MemberAccess, AttributeOwner, CustomAttributeArgument, MetadataBuilder},
    prelude::*,
    sema::{AttributeArgumentKind, HostAttribute},
};
use strum::IntoEnumIterator;

/// Core library with the root types every module needs
fn corlib(module: &str) -> MetadataBuilder {
    let mut builder = MetadataBuilder::new(module);
    let object = builder.class("System", "Object", |t| t);
    let value_type = builder.class("System", "ValueType", |t| t.extends(object));
    builder.class("System", "Enum", |t| t.extends(value_type));
    for kind in PrimitiveKind::iter() {
        let base = if kind.is_reference() { object } else { value_type };
        builder.class("System", kind.name(), |t| t.extends(base));
    }
    builder.class("System", "Array", |t| t.extends(object));
    let attribute = builder.class("System", "Attribute", |t| t.extends(object));
    let void = system(&builder, "Void");
    builder.class("System", "ParamArrayAttribute", |t| {
        t.extends(attribute).constructor(void, |m| m)
    });
    builder
}

fn system(builder: &MetadataBuilder, name: &str) -> Token {
    builder.store().find_type("System", name).unwrap()
}

fn importer(builder: MetadataBuilder) -> Importer {
    Importer::new(Arc::new(builder.build()), Arc::new(SemanticModel::new()))
}

fn records_named(model: &SemanticModel, qualified: &str) -> usize {
    model
        .records()
        .filter(|(id, _)| model.qualified_name(*id) == qualified)
        .count()
}

#[test]
fn test_import_is_idempotent() -> Result<()> {
    let mut builder = corlib("app.dll");
    let object = system(&builder, "Object");
    let int = system(&builder, "Int32");
    let point = builder.class("Demo", "Point", |t| t.extends(object).field("x", int));
    let importer = importer(builder);

    let first = importer.import_type(&point.into(), None)?;
    let declarations = importer.model().len();
    let second = importer.import_type(&point.into(), None)?;

    assert_eq!(first, second);
    assert_eq!(importer.model().len(), declarations);
    assert_eq!(
        importer.memo().get(MemoKey::record(point)),
        first.as_record()
    );
    Ok(())
}

#[test]
fn test_self_and_mutual_cycles_terminate() -> Result<()> {
    let mut builder = corlib("app.dll");
    let object = system(&builder, "Object");
    let node = builder.define_type("Demo", "Node");
    let parent = builder.define_type("Demo", "Parent");
    let child = builder.define_type("Demo", "Child");
    builder.with_type(node, |t| {
        t.extends(object)
            .field("next", node)
            .method("Clone", node, |m| m.param("other", node))
    })?;
    builder.with_type(parent, |t| t.extends(object).field("first", child))?;
    builder.with_type(child, |t| t.extends(parent).field("owner", parent))?;
    let importer = importer(builder);

    importer.import_definition(node)?;
    importer.import_definition(child)?;

    let model = importer.model();
    assert_eq!(records_named(model, "Demo::Node"), 1);
    assert_eq!(records_named(model, "Demo::Parent"), 1);
    assert_eq!(records_named(model, "Demo::Child"), 1);
    for (_, record) in model.records() {
        assert_eq!(record.state(), CompletionState::Complete);
    }

    let child = importer.import_definition(child)?;
    let parent = importer.import_definition(parent)?;
    let base = model.record(child)?.base().map(|base| base.ty.clone());
    assert_eq!(base, Some(HostType::Record(parent).handle()));
    let first = model.get(model.lookup(parent, "first")[0])?;
    assert_eq!(first.value_type(), Some(&HostType::Record(child).handle()));
    Ok(())
}

#[test]
fn test_primitives_are_exact() -> Result<()> {
    let builder = corlib("corlib.dll");
    let tokens: Vec<_> = PrimitiveKind::iter()
        .map(|kind| (kind, system(&builder, kind.name())))
        .collect();
    let importer = importer(builder);

    let expected = [
        (PrimitiveKind::Void, "void"),
        (PrimitiveKind::Boolean, "bool"),
        (PrimitiveKind::Char, "wchar_t"),
        (PrimitiveKind::Byte, "unsigned char"),
        (PrimitiveKind::SByte, "signed char"),
        (PrimitiveKind::Int16, "short"),
        (PrimitiveKind::UInt16, "unsigned short"),
        (PrimitiveKind::Int32, "int"),
        (PrimitiveKind::UInt32, "unsigned int"),
        (PrimitiveKind::Int64, "long long"),
        (PrimitiveKind::UInt64, "unsigned long long"),
        (PrimitiveKind::Single, "float"),
        (PrimitiveKind::Double, "double"),
        (PrimitiveKind::String, "string^"),
        (PrimitiveKind::IntPtr, "intptr"),
        (PrimitiveKind::UIntPtr, "uintptr"),
    ];
    assert_eq!(expected.len(), tokens.len());

    for ((kind, token), (expected_kind, name)) in tokens.iter().zip(expected) {
        assert_eq!(*kind, expected_kind);
        let ty = importer.import_type(&(*token).into(), None)?;
        assert_eq!(ty, kind.host_type());
        assert_eq!(importer.model().type_name(&ty), name, "{kind:?}");
    }
    assert_eq!(importer.memo().count(MemoKind::Record), 0);
    Ok(())
}

#[test]
fn test_primitive_tokens_bound_to_core_library() -> Result<()> {
    let builder = corlib("corlib.dll");
    let boolean = system(&builder, "Boolean");
    let store = Arc::new(builder.build());
    let table = PrimitiveTable::from_source("System", store.as_ref());

    assert_eq!(table.bound_module(), Some("corlib.dll"));
    assert_eq!(table.get(PrimitiveKind::Boolean).and_then(|e| e.token), Some(boolean));

    let importer = Importer::new(store, Arc::new(SemanticModel::new()))
        .with_primitives(Arc::new(table));
    assert_eq!(
        importer.import_type(&boolean.into(), None)?,
        HostType::Builtin(BuiltinType::Bool)
    );

    // the fundamental type's own record is still reachable
    let record = importer.import_definition(boolean)?;
    assert_eq!(importer.model().qualified_name(record), "System::Boolean");
    assert_eq!(importer.model().record(record)?.kind(), RecordKind::Value);
    Ok(())
}

#[test]
fn test_access_mapping_is_total() -> Result<()> {
    let mut builder = corlib("app.dll");
    let object = system(&builder, "Object");
    let int = system(&builder, "Int32");
    let all: Vec<MemberAccess> = MemberAccess::iter()
        .filter(|access| *access != MemberAccess::CompilerControlled)
        .collect();
    let holder = builder.define_type("Demo", "Holder");
    builder.with_type(holder, |t| {
        all.iter().fold(t.extends(object), |t, access| {
            t.field_with(&format!("{access:?}"), int, access.bits())
        })
    })?;
    let importer = importer(builder);
    let record = importer.import_definition(holder)?;
    let model = importer.model();

    let expected = [
        (MemberAccess::Private, AccessSpecifier::Private),
        (MemberAccess::FamAndAssem, AccessSpecifier::ProtectedPrivate),
        (MemberAccess::Assem, AccessSpecifier::Internal),
        (MemberAccess::Family, AccessSpecifier::Protected),
        (MemberAccess::FamOrAssem, AccessSpecifier::ProtectedPublic),
        (MemberAccess::Public, AccessSpecifier::Public),
    ];
    assert_eq!(expected.len(), all.len());
    for (access, specifier) in expected {
        let field = model.lookup(record, &format!("{access:?}"))[0];
        assert_eq!(model.get(field)?.access(), Some(specifier), "{access:?}");
    }
    Ok(())
}

#[test]
fn test_accessors_are_suppressed() -> Result<()> {
    let mut builder = corlib("app.dll");
    let object = system(&builder, "Object");
    let void = system(&builder, "Void");
    let int = system(&builder, "Int32");
    let counter = builder.class("Demo", "Counter", |t| {
        t.extends(object)
            .property("Value", int, |p| p.get().set(void))
            .method("get_Unrelated", int, |m| m)
            .method("Reset", void, |m| m)
    });
    let importer = importer(builder);
    let record = importer.import_definition(counter)?;
    let model = importer.model();

    let properties: Vec<_> = model
        .children(record)
        .into_iter()
        .filter(|child| model.get(*child).is_ok_and(|decl| decl.as_property().is_some()))
        .collect();
    assert_eq!(properties.len(), 1);
    assert!(model.lookup(record, "get_Value").is_empty());
    assert!(model.lookup(record, "set_Value").is_empty());
    assert_eq!(model.lookup(record, "get_Unrelated").len(), 1);
    assert_eq!(model.lookup(record, "Reset").len(), 1);

    let property = model.get(properties[0])?.as_property().cloned();
    let property = property.unwrap();
    assert!(property.getter.is_some());
    assert!(property.setter.is_some());
    Ok(())
}

#[test]
fn test_unresolvable_base_degrades() -> Result<()> {
    let mut builder = corlib("app.dll");
    let int = system(&builder, "Int32");
    let void = system(&builder, "Void");
    let missing = builder.type_ref("Elsewhere", "Base");
    let derived = builder.class("Demo", "Derived", |t| {
        t.extends(missing)
            .implements(missing)
            .field("count", int)
            .field("broken", missing)
            .method("Run", void, |m| m.param("n", int))
            .property("Size", int, |p| p.get())
    });
    let importer = importer(builder);
    let record = importer.import_definition(derived)?;
    let model = importer.model();

    let record_decl = model.record(record)?;
    assert!(record_decl.base().is_none());
    assert_eq!(record_decl.interfaces().count(), 0);
    assert_eq!(record_decl.state(), CompletionState::Complete);
    assert_eq!(model.lookup(record, "count").len(), 1);
    assert!(model.lookup(record, "broken").is_empty());
    assert_eq!(model.lookup(record, "Run").len(), 1);
    assert_eq!(model.lookup(record, "Size").len(), 1);
    Ok(())
}

#[test]
fn test_generic_round_trip() -> Result<()> {
    let mut builder = corlib("app.dll");
    let object = system(&builder, "Object");
    let int = system(&builder, "Int32");
    let string = system(&builder, "String");
    let map = builder.define_type("Demo", "Map`2");
    builder.with_type(map, |t| {
        t.extends(object)
            .generic_param("K")
            .generic_param("V")
            .field("key", TypeSig::type_param("K", 0))
            .field("values", TypeSig::array(TypeSig::type_param("V", 1), 1))
    })?;
    let user = builder.class("Demo", "User", |t| {
        t.extends(object)
            .field("lookup", TypeSig::generic_inst(map, vec![string.into(), int.into()]))
    });
    let importer = importer(builder);
    let user = importer.import_definition(user)?;
    let model = importer.model();

    let lookup = model.get(model.lookup(user, "lookup")[0])?;
    let Some(HostType::Instantiation { template, args }) = lookup.value_type().map(HostType::pointee)
    else {
        panic!("expected an instantiation");
    };

    let template_decl = model.template(*template)?;
    let names: Vec<String> = template_decl
        .params
        .iter()
        .map(|param| model.get(*param).map(|decl| decl.name().to_string()))
        .collect::<Result<_>>()?;
    assert_eq!(names, ["K", "V"]);

    let bound: Vec<_> = args.iter().map(|arg| arg.param).collect();
    assert_eq!(bound, template_decl.params);
    assert_eq!(
        model.type_name(lookup.value_type().unwrap()),
        "Demo::Map`2<string^, int>^"
    );

    let map = template_decl.templated;
    let values = model.get(model.lookup(map, "values")[0])?;
    assert_eq!(model.type_name(values.value_type().unwrap()), "cli::array<V, 1>^");
    Ok(())
}

#[test]
fn test_method_level_generics_not_supported() {
    let mut builder = corlib("app.dll");
    let object = system(&builder, "Object");
    let void = system(&builder, "Void");
    let util = builder.class("Demo", "Util", |t| {
        t.extends(object)
            .method("Identity", void, |m| m.param("value", TypeSig::method_param("T", 0)))
            .method("Plain", void, |m| m)
    });
    let importer = importer(builder);
    let record = importer.import_definition(util).unwrap();

    assert!(importer.model().lookup(record, "Identity").is_empty());
    assert_eq!(importer.model().lookup(record, "Plain").len(), 1);
}

#[test]
fn test_attributes_and_param_arrays() -> Result<()> {
    let mut builder = corlib("app.dll");
    let object = system(&builder, "Object");
    let void = system(&builder, "Void");
    let string = system(&builder, "String");
    let attribute = system(&builder, "Attribute");
    let param_array = system(&builder, "ParamArrayAttribute");
    let param_array_ctor = builder.method_by_name(param_array, ".ctor").unwrap();

    let boolean = system(&builder, "Boolean");

    let obsolete = builder.class("Demo", "ObsoleteAttribute", |t| {
        t.extends(attribute)
            .constructor(void, |m| m.param("message", string))
            .field("IsError", boolean)
    });
    let obsolete_ctor = builder.method_by_name(obsolete, ".ctor").unwrap();
    let logger = builder.class("Demo", "Logger", |t| {
        t.extends(object).method("Write", void, |m| {
            m.param("format", string)
                .param("args", TypeSig::array(object.into(), 1))
        })
    });
    let write = builder.method_by_name(logger, "Write").unwrap();
    builder.attribute(AttributeOwner::Token(write), obsolete_ctor, |a| {
        a.property("DiagnosticId", CustomAttributeArgument::String(Some("X1".to_string())))
            .positional(CustomAttributeArgument::String(Some("use Log".to_string())))
            .field("IsError", CustomAttributeArgument::Bool(true))
    });
    builder.attribute(
        AttributeOwner::Param {
            method: write,
            sequence: 2,
        },
        param_array_ctor,
        |a| a,
    );
    let importer = importer(builder);

    let write = importer.import_method(write)?;
    let model = importer.model();
    assert!(model.function(write)?.is_param_array());

    let attributes: Vec<HostAttribute> = model.get(write)?.attributes().into_iter().cloned().collect();
    assert_eq!(attributes.len(), 1);
    assert_eq!(model.qualified_name(attributes[0].class), "Demo::ObsoleteAttribute");
    let order: Vec<_> = attributes[0]
        .args
        .iter()
        .map(|arg| (arg.kind, arg.name.as_str()))
        .collect();
    assert_eq!(
        order,
        [
            (AttributeArgumentKind::Positional, ""),
            (AttributeArgumentKind::Field, "IsError"),
            (AttributeArgumentKind::Property, "DiagnosticId"),
        ]
    );
    Ok(())
}

#[test]
fn test_varargs_and_static_constructors() -> Result<()> {
    let mut builder = corlib("app.dll");
    let object = system(&builder, "Object");
    let void = system(&builder, "Void");
    let string = system(&builder, "String");
    let console = builder.class("Demo", "Console", |t| {
        t.extends(object)
            .type_initializer(void)
            .constructor(void, |m| m)
            .method("Printf", void, |m| m.param("format", string).varargs().static_())
    });
    let importer = importer(builder);
    let record = importer.import_definition(console)?;
    let model = importer.model();

    assert!(model.lookup(record, ".cctor").is_empty());
    assert_eq!(model.lookup(record, ".ctor").len(), 1);
    let printf = model.function(model.lookup(record, "Printf")[0])?;
    assert!(printf.is_variadic());
    assert!(printf.is_static());
    Ok(())
}

#[test]
fn test_cross_module_types_share_records() -> Result<()> {
    let model = Arc::new(SemanticModel::new());

    let core = corlib("corlib.dll");
    let object = system(&core, "Object");
    let core_importer = Importer::new(Arc::new(core.build()), model.clone());
    let object_record = core_importer.import_definition(object)?;

    let mut app = MetadataBuilder::new("app.dll");
    let object_ref = app.type_ref("System", "Object");
    let int_ref = app.type_ref("System", "Int32");
    let widget = app.class("Demo", "Widget", |t| t.extends(object_ref).field("size", int_ref));
    let app_importer = Importer::new(Arc::new(app.build()), model.clone());
    let widget = app_importer.import_definition(widget)?;

    let base = model.record(widget)?.base().map(|base| base.ty.clone());
    assert_eq!(base, Some(HostType::Record(object_record).handle()));
    let size = model.get(model.lookup(widget, "size")[0])?;
    assert_eq!(size.value_type(), Some(&HostType::Builtin(BuiltinType::Int)));
    assert_eq!(records_named(&model, "System::Object"), 1);
    Ok(())
}

#[test]
fn test_import_all_continues_past_failures() {
    let mut builder = corlib("app.dll");
    let object = system(&builder, "Object");
    builder.class("Demo", "Good", |t| t.extends(object));
    let bad = builder.class("Demo.", "Bad", |t| t.extends(object));
    builder.class("Demo", "AlsoGood", |t| t.extends(object));
    let store = builder.build();
    let total = store.type_count();
    let importer = Importer::new(Arc::new(store), Arc::new(SemanticModel::new()));

    let summary = importer.import_all();
    assert!(!summary.is_complete());
    assert_eq!(summary.failed_count(), 1);
    assert_eq!(summary.failed[0].0, bad);
    assert!(matches!(summary.failed[0].1, Error::Scaffold(_)));
    assert_eq!(summary.imported_count(), total - 1);
}

#[test]
fn test_deep_chains_import_completely() -> Result<()> {
    let mut builder = corlib("app.dll");
    let object = system(&builder, "Object");
    let mut previous = object;
    let mut chain = Vec::new();
    for index in 0..5000 {
        previous = builder.class("Deep", &format!("Level{index}"), |t| {
            t.extends(previous).field("parent", previous)
        });
        chain.push(previous);
    }
    let importer = importer(builder);

    let deepest = importer.import_definition(chain[chain.len() - 1])?;
    let model = importer.model();
    assert_eq!(model.record(deepest)?.state(), CompletionState::Complete);

    for (index, token) in chain.iter().enumerate() {
        let record = importer
            .memo()
            .get(MemoKey::record(*token))
            .ok_or(Error::TypeNotFound(*token))?;
        let record_decl = model.record(record)?;
        assert_eq!(record_decl.state(), CompletionState::Complete);

        let expected = if index == 0 {
            "System::Object^".to_string()
        } else {
            format!("Deep::Level{}^", index - 1)
        };
        let base = record_decl.base().map(|base| model.type_name(&base.ty));
        assert_eq!(base.as_deref(), Some(expected.as_str()), "Level{index}");
        assert_eq!(model.lookup(record, "parent").len(), 1);
    }
    Ok(())
}

#[test]
fn test_recursion_limit_bounds_signature_nesting() -> Result<()> {
    let mut builder = corlib("app.dll");
    let object = system(&builder, "Object");
    let int = system(&builder, "Int32");
    let nested = |levels: u32| {
        (0..levels).fold(TypeSig::Defined(int), |element, _| TypeSig::array(element, 1))
    };

    let mut previous = object;
    let mut chain = Vec::new();
    for index in 0..8 {
        previous = builder.class("Deep", &format!("Level{index}"), |t| t.extends(previous));
        chain.push(previous);
    }
    let holder = builder.class("Deep", "Holder", |t| {
        t.extends(previous)
            .field("shallow", nested(3))
            .field("deep", nested(5))
    });
    let importer = Importer::with_config(
        Arc::new(builder.build()),
        Arc::new(SemanticModel::new()),
        ImportConfig::default().with_max_recursion_depth(4),
    );

    let record = importer.import_definition(holder)?;
    let model = importer.model();
    assert_eq!(model.lookup(record, "shallow").len(), 1);
    assert!(model.lookup(record, "deep").is_empty());
    assert!(matches!(
        importer.import_type(&nested(5), None),
        Err(Error::RecursionLimit(4))
    ));

    for token in &chain {
        let level = importer
            .memo()
            .get(MemoKey::record(*token))
            .ok_or(Error::TypeNotFound(*token))?;
        assert!(model.record(level)?.base().is_some());
        assert_eq!(model.record(level)?.state(), CompletionState::Complete);
    }
    Ok(())
}
