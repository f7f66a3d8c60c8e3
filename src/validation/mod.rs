//! Diagnostics and map validation.
//!
//! Parsers and the map model report recoverable problems as
//! [`Diagnostic`]s. [`validate_map`] runs the consistency checks against a
//! loaded map. Used by `archmap validate` and before saving.

mod checks;
mod diagnostic;

pub use checks::{
    check_events, check_faces, check_inventories, check_multi_parts, check_stack_links,
    check_unresolved,
};
pub use diagnostic::{Diagnostic, DiagnosticSink, Diagnostics, Severity};

use crate::map::MapModel;
use crate::types::FaceLookup;

/// Run all validation checks against a map.
///
/// Face names are only checked when a face list is given.
pub fn validate_map(map: &MapModel, faces: Option<&dyn FaceLookup>) -> Diagnostics {
    let mut result = Diagnostics::new();

    result.merge(check_stack_links(map));
    result.merge(check_inventories(map));
    result.merge(check_multi_parts(map));
    result.merge(check_unresolved(map));
    result.merge(check_events(map));
    if let Some(faces) = faces {
        result.merge(check_faces(map, faces));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::PlaceOptions;
    use crate::testing::registry;
    use crate::types::FaceSet;

    #[test]
    fn test_validate_empty_map() {
        let map = MapModel::new(registry(), 3, 3);
        assert!(validate_map(&map, None).is_ok());
    }

    #[test]
    fn test_validate_placed_objects() {
        let mut map = MapModel::new(registry(), 3, 3);
        let floor = map.registry().id_of("floor").unwrap();
        map.add_arch(floor, 1, 1, PlaceOptions::default()).unwrap();

        assert!(!validate_map(&map, None).has_errors());
    }

    #[test]
    fn test_validate_with_faces() {
        let mut map = MapModel::new(registry(), 3, 3);
        let floor = map.registry().id_of("floor").unwrap();
        let id = map.add_arch(floor, 0, 0, PlaceOptions::default()).unwrap();
        map.get_mut(id).unwrap().face = Some("nowhere.111".to_string());

        let faces = FaceSet::new();
        assert!(validate_map(&map, None).is_ok());
        assert!(validate_map(&map, Some(&faces)).has_warnings());
    }

    #[test]
    fn test_validate_catches_broken_stack() {
        let mut map = MapModel::new(registry(), 3, 3);
        let floor = map.registry().id_of("floor").unwrap();
        let id = map.add_arch(floor, 2, 2, PlaceOptions::default()).unwrap();
        map.get_mut(id).unwrap().location = crate::types::Location::Detached;

        let result = validate_map(&map, None);
        assert!(result.has_errors());

        map.get_mut(id).unwrap().location = crate::types::Location::Grid;
        assert!(!validate_map(&map, None).has_errors());
    }
}
