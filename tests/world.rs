//! End-to-end tests against the fixture project in `tests/fixtures/world`.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use pretty_assertions::assert_eq;

use archmap::diff::{diff_lines, reconstruct};
use archmap::{
    discover, encode_map, validate_map, EditError, EditSession, EditType, FaceLookup, MapModel,
    MultiState, PlaceOptions,
};
use archmap::validation::Diagnostics;

fn world() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("world")
}

fn square() -> PathBuf {
    world().join("maps").join("town").join("square")
}

fn session() -> EditSession {
    let project = discover(world()).unwrap();
    let mut diagnostics = Diagnostics::new();
    let session = EditSession::from_project(&project, &mut diagnostics).unwrap();
    assert!(!diagnostics.has_errors(), "{:?}", diagnostics);
    session
}

fn empty_map(session: &EditSession, width: usize, height: usize) -> MapModel {
    MapModel::new(Arc::clone(session.registry()), width, height)
}

fn add(map: &mut MapModel, name: &str, x: i32, y: i32, options: PlaceOptions) -> archmap::InstanceId {
    let arch = map.registry().id_of(name).unwrap();
    map.add_arch(arch, x, y, options).unwrap()
}

/// Archetype names in a cell, bottom to top.
fn names_at(map: &MapModel, x: i32, y: i32) -> Vec<String> {
    map.cell(x, y)
        .map(|id| map.get(id).unwrap().arch_name.clone())
        .collect()
}

#[test]
fn test_world_registry() {
    let session = session();
    let registry = session.registry();

    assert!(registry.by_name("grass").is_some());
    assert_eq!(registry.tails(registry.id_of("bigtree").unwrap()).len(), 3);
    assert!(registry.by_name("sword_of_fire").unwrap().artifact);
    assert_eq!(registry.type_name(122).to_string(), "CONTAINER");

    let categories: Vec<&str> = registry.categories().collect();
    for expected in ["floor", "walls", "system/events", "artifacts"] {
        assert!(categories.contains(&expected), "{:?}", categories);
    }
    assert_eq!(registry.join_lists().len(), 1);
    assert!(session.faces().unwrap().face("tree.114").is_some());
}

#[test]
fn test_round_trip_reproduces_file() {
    let mut session = session();
    let mut diagnostics = Diagnostics::new();
    let map = session.open_map(&square(), &mut diagnostics).unwrap();
    assert!(diagnostics.is_ok(), "{:?}", diagnostics);

    let source = fs::read_to_string(square()).unwrap();
    assert_eq!(encode_map(&map.read()), source);
}

#[test]
fn test_fixture_map_validates() {
    let mut session = session();
    let mut diagnostics = Diagnostics::new();
    let map = session.open_map(&square(), &mut diagnostics).unwrap();

    let faces = session.faces().map(|f| f as &dyn FaceLookup);
    let result = validate_map(&map.read(), faces);
    assert!(result.is_ok(), "{:?}", result);
}

#[test]
fn test_configured_edit_types() {
    let mut session = session();
    let mut diagnostics = Diagnostics::new();
    let map = session.open_map(&square(), &mut diagnostics).unwrap();
    let map = map.read();

    assert_eq!(map.filter(EditType::MONSTER).len(), 1);
    assert_eq!(map.filter(EditType::BACKGROUND).len(), 2);
    // Two walls and the tree, which blocks movement without a type.
    assert_eq!(map.filter(EditType::WALL).len(), 3);
}

#[test]
fn test_diff_idempotence() {
    let mut session = session();
    let mut diagnostics = Diagnostics::new();
    let map = session.open_map(&square(), &mut diagnostics).unwrap();
    let map = map.read();

    let grass = map.cell(0, 0).next().unwrap();
    assert!(map.get(grass).unwrap().attributes.is_empty());

    let chest = map.cell(0, 0).nth(1).unwrap();
    let inst = map.get(chest).unwrap();
    let arch = map.archetype_of(inst).unwrap();
    let full = reconstruct(&inst.attributes, &arch.attributes);
    assert_eq!(diff_lines(&full, &arch.attributes), inst.attributes);
    assert!(full.contains(&"weight 500".to_string()));
    assert!(full.contains(&"container 10000".to_string()));
}

#[test]
fn test_multi_tile_expansion() {
    let mut session = session();
    let mut diagnostics = Diagnostics::new();
    let map = session.open_map(&square(), &mut diagnostics).unwrap();
    let map = map.read();

    let tree = map.cell(4, 0).next().unwrap();
    assert_eq!(map.multi_state(tree), MultiState::Expanded);
    let positions: Vec<(i32, i32)> = map
        .multi_parts(tree)
        .into_iter()
        .map(|id| (map.get(id).unwrap().x, map.get(id).unwrap().y))
        .collect();
    assert_eq!(positions, vec![(4, 0), (5, 0), (4, 1), (5, 1)]);
    assert_eq!(names_at(&map, 5, 1), vec!["bigtree_4"]);
}

#[test]
fn test_autojoin_closure() {
    let session = session();
    let mut map = empty_map(&session, 5, 5);

    for (x, y) in [(2, 3), (3, 2), (2, 1), (1, 2)] {
        add(&mut map, "wall_00", x, y, PlaceOptions::joined());
    }
    add(&mut map, "wall_00", 2, 2, PlaceOptions::joined());
    assert_eq!(names_at(&map, 2, 2), vec!["wall_15"]);
    assert_eq!(names_at(&map, 2, 3), vec!["wall_04"]);
    assert_eq!(names_at(&map, 3, 2), vec!["wall_08"]);

    let east = map.cell(3, 2).next().unwrap();
    map.remove_and_join(east).unwrap();
    assert_eq!(names_at(&map, 2, 2), vec!["wall_13"]);
    assert!(names_at(&map, 3, 2).is_empty());
}

#[test]
fn test_wall_scenario() {
    let session = session();
    let mut map = empty_map(&session, 4, 4);

    add(&mut map, "wall_00", 1, 1, PlaceOptions::joined());
    assert_eq!(names_at(&map, 1, 1), vec!["wall_00"]);

    add(&mut map, "wall_00", 1, 2, PlaceOptions::joined());
    assert_eq!(names_at(&map, 1, 2), vec!["wall_04"]);
    assert_eq!(names_at(&map, 1, 1), vec!["wall_01"]);
}

#[test]
fn test_resize_removes_cut_multis() {
    let session = session();
    let mut map = empty_map(&session, 10, 10);
    add(&mut map, "bigtree", 8, 8, PlaceOptions::default());
    add(&mut map, "grass", 7, 7, PlaceOptions::default());
    assert_eq!(map.instance_count(), 5);

    map.resize(8, 8);

    assert_eq!(map.instance_count(), 1);
    assert_eq!(names_at(&map, 7, 7), vec!["grass"]);
    for (_, inst) in map.instances() {
        assert!(inst.multi_head.is_none());
        assert!(map.contains(inst.x, inst.y));
    }
    assert!(!validate_map(&map, None).has_errors());
}

#[test]
fn test_placement_exclusivity() {
    let session = session();
    let mut map = empty_map(&session, 3, 3);
    add(&mut map, "grass", 1, 1, PlaceOptions::default());
    let before = encode_map(&map);

    let grass = map.registry().id_of("grass").unwrap();
    let err = map.add_arch(grass, 1, 1, PlaceOptions::default()).unwrap_err();
    assert!(matches!(err, EditError::Occupied { .. }));
    assert_eq!(encode_map(&map), before);
    assert_eq!(map.instance_count(), 1);

    let options = PlaceOptions {
        exclusive: false,
        ..PlaceOptions::default()
    };
    map.add_arch(grass, 1, 1, options).unwrap();
    assert_eq!(names_at(&map, 1, 1), vec!["grass", "grass"]);
}

#[test]
fn test_save_to_new_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session();
    let mut diagnostics = Diagnostics::new();
    let map = session.open_map(&square(), &mut diagnostics).unwrap();

    let path = dir.path().join("copy");
    let copy = session.new_map(&path, "copy", 1, 1);
    let text = encode_map(&map.read());
    *copy.write() = archmap::decode_map(&text, Arc::clone(session.registry()), &mut diagnostics).unwrap();

    session.save_map(&path).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), text);
}
