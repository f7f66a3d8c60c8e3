//! Consistency checks for a loaded map.
//!
//! Each check takes a `&MapModel` and returns the `Diagnostics` it found.
//! Checks only read; [`MapModel::repair_links`] fixes what the link checks
//! report.

use std::collections::HashSet;

use crate::map::MapModel;
use crate::types::{FaceLookup, InstanceId, Location, ScriptedEvent, EVENT_TYPE};

use super::diagnostic::{Diagnostic, DiagnosticSink, Diagnostics};

/// Walk one list and report broken links.
///
/// `placed` says whether a member sits where the list expects it.
fn check_list(
    map: &MapModel,
    owner: &str,
    first: Option<InstanceId>,
    last: Option<InstanceId>,
    placed: impl Fn(InstanceId, Location, i32, i32) -> bool,
    result: &mut Diagnostics,
) {
    let mut seen = HashSet::new();
    let mut prev = None;
    let mut current = first;

    while let Some(id) = current {
        if !seen.insert(id) {
            result.push(Diagnostic::error(
                "archmap::integrity::cycle",
                format!("The list of {} loops back to {}", owner, id),
            ));
            return;
        }
        let Some(inst) = map.get(id) else {
            result.push(
                Diagnostic::error(
                    "archmap::integrity::broken-link",
                    format!("The list of {} links to missing instance {}", owner, id),
                )
                .with_help("Run a link repair before saving"),
            );
            return;
        };
        if inst.prev != prev {
            result.push(Diagnostic::error(
                "archmap::integrity::prev-link",
                format!("'{}' {} in {} has a wrong predecessor", inst.arch_name, id, owner),
            ));
        }
        if !placed(id, inst.location, inst.x, inst.y) {
            result.push(Diagnostic::error(
                "archmap::integrity::misplaced",
                format!(
                    "'{}' {} is linked into {} but claims {:?} at ({}, {})",
                    inst.arch_name, id, owner, inst.location, inst.x, inst.y
                ),
            ));
        }
        prev = Some(id);
        current = inst.next;
    }

    if prev != last {
        result.push(Diagnostic::error(
            "archmap::integrity::last-link",
            format!("The last-element pointer of {} is wrong", owner),
        ));
    }
}

/// Every cell stack is a well formed list of instances at that cell.
pub fn check_stack_links(map: &MapModel) -> Diagnostics {
    let mut result = Diagnostics::new();
    let grid = map.grid();

    for (x, y) in grid.positions() {
        let Some(cell) = grid.cell(x, y) else {
            continue;
        };
        if cell.is_empty() && cell.top.is_none() {
            continue;
        }
        check_list(
            map,
            &format!("cell ({}, {})", x, y),
            cell.bottom,
            cell.top,
            |_, location, ix, iy| location == Location::Grid && ix == x && iy == y,
            &mut result,
        );
    }
    result
}

/// Every inventory is a well formed list whose members point back at
/// their container.
pub fn check_inventories(map: &MapModel) -> Diagnostics {
    let mut result = Diagnostics::new();

    for (container, inst) in map.instances() {
        if inst.inv_first.is_none() && inst.inv_last.is_none() {
            continue;
        }
        check_list(
            map,
            &format!("inventory of '{}' {}", inst.arch_name, container),
            inst.inv_first,
            inst.inv_last,
            |_, location, _, _| location == Location::Inventory(container),
            &mut result,
        );
    }
    result
}

/// Placed multi-tile objects have all their tails at the right offsets,
/// and every tail has a live head.
pub fn check_multi_parts(map: &MapModel) -> Diagnostics {
    let mut result = Diagnostics::new();
    let registry = map.registry();

    for (id, inst) in map.instances() {
        if let Some(head) = inst.multi_head {
            if map.get(head).is_none() {
                result.push(Diagnostic::error(
                    "archmap::integrity::dangling-tail",
                    format!("Tail '{}' {} refers to missing head {}", inst.arch_name, id, head),
                ));
            }
            continue;
        }
        if let Some(next) = inst.multi_next {
            if map.get(next).is_none() {
                result.push(Diagnostic::error(
                    "archmap::integrity::dangling-head",
                    format!("Head '{}' {} links to missing tail {}", inst.arch_name, id, next),
                ));
                continue;
            }
        }
        let Some(arch) = inst.arch else {
            continue;
        };
        let tails = registry.tails(arch);
        if tails.is_empty() || inst.location != Location::Grid {
            continue;
        }

        let parts = map.multi_parts(id);
        if parts.len() - 1 != tails.len() {
            result.push(
                Diagnostic::error(
                    "archmap::integrity::incomplete-multi",
                    format!(
                        "'{}' at ({}, {}) has {} of {} tails",
                        inst.arch_name,
                        inst.x,
                        inst.y,
                        parts.len() - 1,
                        tails.len()
                    ),
                )
                .with_help("Remove and place the object again"),
            );
        }

        for (&part, tail_arch) in parts[1..].iter().zip(tails) {
            let Some(tail) = map.get(part) else {
                continue;
            };
            let expected = (inst.x + tail_arch.multi.offset.0, inst.y + tail_arch.multi.offset.1);
            if tail.multi_head != Some(id) {
                result.push(Diagnostic::error(
                    "archmap::integrity::tail-head",
                    format!("Tail {} of '{}' {} points to another head", part, inst.arch_name, id),
                ));
            }
            if (tail.x, tail.y) != expected {
                result.push(Diagnostic::error(
                    "archmap::integrity::tail-offset",
                    format!(
                        "Tail '{}' of '{}' is at ({}, {}) instead of ({}, {})",
                        tail.arch_name, inst.arch_name, tail.x, tail.y, expected.0, expected.1
                    ),
                ));
            }
        }
    }
    result
}

/// Instances whose archetype name is unknown.
pub fn check_unresolved(map: &MapModel) -> Diagnostics {
    let mut result = Diagnostics::new();
    for (id, inst) in map.instances() {
        if inst.arch.is_none() {
            result.push(
                Diagnostic::warning(
                    "archmap::ref::unresolved-archetype",
                    format!("{} uses unknown archetype '{}'", id, inst.arch_name),
                )
                .with_help("The object is kept and saved unchanged"),
            );
        }
    }
    result
}

/// Faces that the face list does not know.
pub fn check_faces(map: &MapModel, faces: &dyn FaceLookup) -> Diagnostics {
    let mut result = Diagnostics::new();
    let mut reported = HashSet::new();

    for (_, inst) in map.instances() {
        let arch = map.archetype_of(inst);
        let Some(face) = inst.effective_face(arch) else {
            continue;
        };
        if faces.face(face).is_none() && reported.insert(face.to_string()) {
            result.push(Diagnostic::warning(
                "archmap::ref::unknown-face",
                format!("Face '{}' used by '{}' is unknown", face, inst.arch_name),
            ));
        }
    }
    result
}

/// Scripted events that would be dropped on the next load.
pub fn check_events(map: &MapModel) -> Diagnostics {
    let mut result = Diagnostics::new();
    for (id, inst) in map.instances() {
        let arch = map.archetype_of(inst);
        if inst.effective_type(arch) != EVENT_TYPE {
            continue;
        }
        let event = ScriptedEvent::from_instance(inst, arch);
        if event.path.trim().is_empty() {
            result.push(
                Diagnostic::warning(
                    "archmap::ref::event-without-path",
                    format!("Event {} ({}) has no script path", id, inst.arch_name),
                )
                .with_help("Set the script path with a 'race' line"),
            );
        }
    }
    result
}
