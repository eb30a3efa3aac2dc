//! Benchmarks for catalog construction and lookups.
//!
//! Benchmark groups:
//! - `catalog_build`: page tree flattening for balanced trees of various sizes
//! - `catalog_lookup`: `find_page` and `find_dest` on a built catalog

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::collections::HashMap;
use std::hint::black_box;
use std::time::Duration;

use folio_core::{CachedResolver, Catalog, ObjectStore, PDFObjRef, PDFObject};

// =============================================================================
// Data Generation
// =============================================================================

fn dict(entries: Vec<(&str, PDFObject)>) -> PDFObject {
    PDFObject::Dict(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<HashMap<_, _>>(),
    )
}

fn name(s: &str) -> PDFObject {
    PDFObject::Name(s.to_string())
}

/// Add a balanced subtree holding `n` leaves with the given fan-out.
fn add_subtree(store: &mut ObjectStore, n: usize, fanout: usize, leaves: &mut Vec<PDFObjRef>) -> PDFObjRef {
    if n <= fanout {
        let kids = (0..n)
            .map(|_| {
                let r = store.add(dict(vec![("Type", name("Page"))]));
                leaves.push(r);
                PDFObject::Ref(r)
            })
            .collect();
        return store.add(dict(vec![
            ("Type", name("Pages")),
            ("Kids", PDFObject::Array(kids)),
            ("Count", PDFObject::Int(n as i64)),
        ]));
    }
    let per_kid = n.div_ceil(fanout);
    let mut kids = Vec::new();
    let mut remaining = n;
    while remaining > 0 {
        let take = remaining.min(per_kid);
        kids.push(PDFObject::Ref(add_subtree(store, take, fanout, leaves)));
        remaining -= take;
    }
    store.add(dict(vec![
        ("Type", name("Pages")),
        ("Kids", PDFObject::Array(kids)),
        ("Count", PDFObject::Int(n as i64)),
    ]))
}

/// Document with `n` pages and one named destination per page.
fn generate_document(n: usize) -> (ObjectStore, Vec<PDFObjRef>) {
    let mut store = ObjectStore::new();
    let mut leaves = Vec::with_capacity(n);
    let pages = add_subtree(&mut store, n, 8, &mut leaves);

    let mut names = Vec::with_capacity(n * 2);
    for (i, leaf) in leaves.iter().enumerate() {
        names.push(PDFObject::String(format!("dest{i:08}").into_bytes()));
        names.push(PDFObject::Array(vec![PDFObject::Ref(*leaf), name("Fit")]));
    }
    let tree = dict(vec![("Names", PDFObject::Array(names))]);

    store.set_root(dict(vec![
        ("Type", name("Catalog")),
        ("Pages", PDFObject::Ref(pages)),
        ("Names", dict(vec![("Dests", tree)])),
    ]));
    (store, leaves)
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog_build");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(3));

    for size in [100, 1_000, 10_000] {
        let (store, _) = generate_document(size);
        group.bench_with_input(BenchmarkId::new("direct", size), &store, |b, store| {
            b.iter(|| black_box(Catalog::new(store).num_pages()))
        });
        group.bench_with_input(BenchmarkId::new("cached", size), &store, |b, store| {
            b.iter(|| {
                let catalog = Catalog::new(CachedResolver::with_default_capacity(store));
                black_box(catalog.num_pages())
            })
        });
    }
    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog_lookup");
    let (store, leaves) = generate_document(1_000);
    let catalog = Catalog::new(&store);

    group.bench_function("find_page_last", |b| {
        let last = leaves[leaves.len() - 1];
        b.iter(|| black_box(catalog.find_page(last.objid, last.genno)))
    });
    group.bench_function("find_page_missing", |b| {
        b.iter(|| black_box(catalog.find_page(u32::MAX - 1, 0)))
    });
    group.bench_function("find_dest", |b| {
        b.iter(|| black_box(catalog.find_dest(b"dest00000500")))
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_lookup);
criterion_main!(benches);
