//! Benchmarks for importing a synthetic module.
//!
//! Measures a cold whole-module import (every record scaffolded and populated) and the cost of a
//! warm re-import, which is answered entirely by the declaration memo.

extern crate dotbridge;

use std::{hint::black_box, sync::Arc};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dotbridge::{
    import::primitives::PrimitiveKind,
    metadata::{MetadataBuilder, MetadataSource, MetadataStore, TypeSig},
    sema::SemanticModel,
    Importer,
};
use strum::IntoEnumIterator;

/// A module with `count` classes; each references the previous one, a generic list of itself and
/// an array of primitives, and exposes a property.
fn synthetic_module(count: usize) -> Arc<MetadataStore> {
    let mut builder = MetadataBuilder::new("bench.dll");
    let object = builder.class("System", "Object", |t| t);
    let value_type = builder.class("System", "ValueType", |t| t.extends(object));
    for kind in PrimitiveKind::iter() {
        let base = if kind.is_reference() { object } else { value_type };
        builder.class("System", kind.name(), |t| t.extends(base));
    }
    builder.class("System", "Array", |t| t.extends(object));

    let find = |builder: &MetadataBuilder, name: &str| builder.store().find_type("System", name);
    let (Some(void), Some(int), Some(string)) = (
        find(&builder, "Void"),
        find(&builder, "Int32"),
        find(&builder, "String"),
    ) else {
        panic!("core types missing");
    };

    let list = builder.define_type("System.Collections.Generic", "List`1");
    builder
        .with_type(list, |t| {
            t.extends(object)
                .generic_param("T")
                .field("items", TypeSig::array(TypeSig::type_param("T", 0), 1))
                .method("Add", void, |m| m.param("item", TypeSig::type_param("T", 0)))
                .property("Count", int, |p| p.get())
        })
        .unwrap();

    let mut previous = object;
    for index in 0..count {
        let token = builder.define_type(&format!("Bench.Ns{}", index % 8), &format!("Type{index}"));
        builder
            .with_type(token, |t| {
                t.extends(object)
                    .field("previous", previous)
                    .field("siblings", TypeSig::generic_inst(list, vec![token.into()]))
                    .field("values", TypeSig::array(int.into(), 1))
                    .constructor(void, |m| m.param("name", string))
                    .method("Visit", previous, |m| m.param("depth", int))
                    .property("Name", string, |p| p.get().set(void))
            })
            .unwrap();
        previous = token;
    }

    Arc::new(builder.build())
}

fn bench_import_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("import_all");
    for count in [64_usize, 512] {
        let store = synthetic_module(count);
        group.throughput(Throughput::Elements(store.type_defs().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &store, |b, store| {
            b.iter(|| {
                let importer = Importer::new(store.clone(), Arc::new(SemanticModel::new()));
                black_box(importer.import_all())
            });
        });
    }
    group.finish();
}

fn bench_memo_hits(c: &mut Criterion) {
    let importer = Importer::new(synthetic_module(512), Arc::new(SemanticModel::new()));
    let summary = importer.import_all();
    let types: Vec<TypeSig> = summary
        .imported
        .iter()
        .map(|(token, _)| TypeSig::Defined(*token))
        .collect();

    c.bench_function("import_type_memoized", |b| {
        b.iter(|| {
            for sig in &types {
                black_box(importer.import_type(black_box(sig), None).ok());
            }
        });
    });
}

criterion_group!(benches, bench_import_all, bench_memo_hits);
criterion_main!(benches);
