//! Benchmarks for loading, decoding and editing maps.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use archmap::parser::parse_archetypes;
use archmap::validation::Diagnostics;
use archmap::{decode_map, encode_map, load_registry, ArchetypeRegistry, Config, MapModel, PlaceOptions};

fn world_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("world")
}

fn load_fixture(path: &str) -> String {
    fs::read_to_string(world_dir().join(path)).unwrap()
}

fn world_registry() -> Arc<ArchetypeRegistry> {
    let root = world_dir();
    let config = Config::load(&root.join("archmap.yaml")).unwrap();
    let mut diagnostics = Diagnostics::new();
    Arc::new(load_registry(&config, &root, &mut diagnostics).unwrap())
}

/// A map filled with grass, with a tree every few cells.
fn large_map(registry: &Arc<ArchetypeRegistry>, size: usize) -> MapModel {
    let mut map = MapModel::new(Arc::clone(registry), size, size);
    let grass = registry.id_of("grass").unwrap();
    let tree = registry.id_of("bigtree").unwrap();
    for x in 0..size as i32 {
        for y in 0..size as i32 {
            map.add_arch(grass, x, y, PlaceOptions::default()).unwrap();
            if x % 4 == 0 && y % 4 == 0 {
                map.add_arch(tree, x, y, PlaceOptions::default()).unwrap();
            }
        }
    }
    map
}

// -- Parsing benchmarks --

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");

    let walls = load_fixture("arch/walls/stone.arc");
    let square = load_fixture("maps/town/square");
    let registry = world_registry();

    group.bench_function("parse_archetypes_walls", |b| {
        b.iter(|| {
            let mut diagnostics = Diagnostics::new();
            parse_archetypes(black_box(&walls), Some("walls"), &mut diagnostics)
        })
    });

    group.bench_function("load_registry", |b| b.iter(world_registry));

    group.bench_function("decode_square", |b| {
        b.iter(|| {
            let mut diagnostics = Diagnostics::new();
            decode_map(black_box(&square), Arc::clone(&registry), &mut diagnostics).unwrap()
        })
    });

    let large = encode_map(&large_map(&registry, 64));
    group.bench_function("decode_64x64", |b| {
        b.iter(|| {
            let mut diagnostics = Diagnostics::new();
            decode_map(black_box(&large), Arc::clone(&registry), &mut diagnostics).unwrap()
        })
    });

    group.finish();
}

// -- Editing benchmarks --

fn bench_editing(c: &mut Criterion) {
    let mut group = c.benchmark_group("editing");
    let registry = world_registry();

    let map = large_map(&registry, 64);
    group.bench_function("encode_64x64", |b| b.iter(|| encode_map(black_box(&map))));

    group.bench_function("autojoin_wall_ring", |b| {
        let wall = registry.id_of("wall_00").unwrap();
        b.iter(|| {
            let mut map = MapModel::new(Arc::clone(&registry), 32, 32);
            for i in 0..32 {
                map.add_arch(wall, i, 0, PlaceOptions::joined()).unwrap();
                map.add_arch(wall, i, 31, PlaceOptions::joined()).unwrap();
            }
            for i in 1..31 {
                map.add_arch(wall, 0, i, PlaceOptions::joined()).unwrap();
                map.add_arch(wall, 31, i, PlaceOptions::joined()).unwrap();
            }
            map
        })
    });

    group.bench_function("resize_64_to_32", |b| {
        b.iter_with_setup(
            || large_map(&registry, 64),
            |mut map| {
                map.resize(32, 32);
                map
            },
        )
    });

    group.finish();
}

criterion_group!(benches, bench_parsing, bench_editing);
criterion_main!(benches);
